// SPDX-FileCopyrightText: 2026 PRR Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Identifiers, kinds, and tiers shared across the PRR crates.

use std::borrow::Borrow;
use std::fmt;

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

macro_rules! string_key {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        pub struct $name(pub String);

        impl $name {
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<&str> for $name {
            fn from(value: &str) -> Self {
                Self(value.to_string())
            }
        }

        impl From<String> for $name {
            fn from(value: String) -> Self {
                Self(value)
            }
        }

        impl Borrow<str> for $name {
            fn borrow(&self) -> &str {
                &self.0
            }
        }
    };
}

string_key!(
    /// Unique key of a terminal.
    TerminalKey
);

string_key!(
    /// Unique key of a client.
    ClientKey
);

/// Network-wide communication number, assigned in increasing order from 1.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct CommunicationId(pub u32);

impl fmt::Display for CommunicationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Interactive session flavours.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "UPPERCASE", ascii_case_insensitive)]
pub enum InteractiveKind {
    Voice,
    Video,
}

/// Flat communication kind used for display and tariff dispatch.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "UPPERCASE", ascii_case_insensitive)]
pub enum CommunicationKind {
    Text,
    Voice,
    Video,
}

impl From<InteractiveKind> for CommunicationKind {
    fn from(kind: InteractiveKind) -> Self {
        match kind {
            InteractiveKind::Voice => CommunicationKind::Voice,
            InteractiveKind::Video => CommunicationKind::Video,
        }
    }
}

/// Pricing tier of a client.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "UPPERCASE", ascii_case_insensitive)]
pub enum ClientType {
    #[default]
    Normal,
    Gold,
    Platinum,
}

/// Hardware model of a terminal. Basic terminals cannot place or take video.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "UPPERCASE", ascii_case_insensitive)]
pub enum TerminalKind {
    Basic,
    Fancy,
}

impl TerminalKind {
    pub fn supports(self, kind: InteractiveKind) -> bool {
        match (self, kind) {
            (_, InteractiveKind::Voice) => true,
            (TerminalKind::Fancy, InteractiveKind::Video) => true,
            (TerminalKind::Basic, InteractiveKind::Video) => false,
        }
    }
}

/// The tag of a terminal state, without the saved prior state of Busy.
///
/// Displays with the record-form names (`IDLE`, `OFF`, `SILENCE`, `BUSY`).
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[strum(ascii_case_insensitive)]
pub enum StateTag {
    #[strum(to_string = "IDLE", serialize = "ON")]
    On,
    #[strum(serialize = "OFF")]
    Off,
    #[strum(to_string = "SILENCE", serialize = "SILENT")]
    Silent,
    #[strum(serialize = "BUSY")]
    Busy,
}

/// What changed about a terminal's availability, as seen by its observers.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
pub enum NotificationKind {
    #[strum(serialize = "O2I")]
    OffToIdle,
    #[strum(serialize = "O2S")]
    OffToSilent,
    #[strum(serialize = "B2I")]
    BusyToIdle,
    #[strum(serialize = "B2S")]
    BusyToSilent,
    #[strum(serialize = "S2I")]
    SilentToIdle,
}

/// One notification record, queued on a client until read.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    pub terminal: TerminalKey,
    pub kind: NotificationKind,
}

impl fmt::Display for Notification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}|{}", self.kind, self.terminal)
    }
}

/// How a client wants its notifications handed over.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum DeliveryMethod {
    /// Kept in the client's queue until the client is shown.
    #[default]
    Queued,
    /// Handed to a sink right after the command that produced it.
    Immediate,
}

/// Round a monetary amount the way records display it.
pub fn rounded(amount: f64) -> i64 {
    amount.round() as i64
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use super::*;

    #[test]
    fn state_tag_uses_record_names() {
        assert_eq!(StateTag::On.to_string(), "IDLE");
        assert_eq!(StateTag::Silent.to_string(), "SILENCE");
        assert_eq!(StateTag::from_str("on").unwrap(), StateTag::On);
        assert_eq!(StateTag::from_str("SILENCE").unwrap(), StateTag::Silent);
        assert_eq!(StateTag::from_str("silent").unwrap(), StateTag::Silent);
        assert!(StateTag::from_str("sleeping").is_err());
    }

    #[test]
    fn basic_terminals_lack_video() {
        assert!(TerminalKind::Basic.supports(InteractiveKind::Voice));
        assert!(!TerminalKind::Basic.supports(InteractiveKind::Video));
        assert!(TerminalKind::Fancy.supports(InteractiveKind::Video));
    }

    #[test]
    fn kinds_parse_case_insensitively() {
        assert_eq!(InteractiveKind::from_str("voice").unwrap(), InteractiveKind::Voice);
        assert_eq!(TerminalKind::from_str("Fancy").unwrap(), TerminalKind::Fancy);
        assert_eq!(ClientType::from_str("gold").unwrap(), ClientType::Gold);
        assert_eq!(CommunicationKind::from(InteractiveKind::Video), CommunicationKind::Video);
    }

    #[test]
    fn notification_record_form() {
        let n = Notification {
            terminal: "t1".into(),
            kind: NotificationKind::OffToIdle,
        };
        assert_eq!(n.to_string(), "O2I|t1");
    }

    #[test]
    fn delivery_method_serializes_lowercase() {
        let json = serde_json::to_string(&DeliveryMethod::Immediate).unwrap();
        assert_eq!(json, "\"immediate\"");
        assert_eq!(DeliveryMethod::default(), DeliveryMethod::Queued);
    }

    #[test]
    fn rounding_is_half_away_from_zero() {
        assert_eq!(rounded(2.5), 3);
        assert_eq!(rounded(2.49), 2);
        assert_eq!(rounded(0.0), 0);
        assert_eq!(rounded(-2.5), -3);
    }
}
