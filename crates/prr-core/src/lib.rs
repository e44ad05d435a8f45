// SPDX-FileCopyrightText: 2026 PRR Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Core library for the PRR telecommunications network.
//!
//! This crate provides the error taxonomy, the shared identifier and kind
//! types, the terminal availability state machine, communication records,
//! and the traits the network uses to reach its collaborators (tariffs and
//! notification delivery).

pub mod communication;
pub mod error;
pub mod state;
pub mod traits;
pub mod types;

// Re-export key items at crate root for ergonomic imports.
pub use communication::{Communication, Exchange, Participants};
pub use error::PrrError;
pub use state::{RestState, TerminalState};
pub use traits::{NotificationSink, TariffPolicy};
pub use types::{
    ClientKey, ClientType, CommunicationId, CommunicationKind, DeliveryMethod, InteractiveKind,
    Notification, NotificationKind, StateTag, TerminalKey, TerminalKind,
};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_taxonomy_is_constructible() {
        let _unknown_terminal = PrrError::unknown_terminal("t1");
        let _unknown_client = PrrError::unknown_client("c1");
        let _duplicate = PrrError::DuplicateClientKey { key: "c1".into() };
        let _same = PrrError::SameState {
            state: StateTag::Off,
        };
        let _unavailable = PrrError::Unavailable {
            key: "t2".into(),
            state: StateTag::Busy,
        };
        let _unsupported = PrrError::UnsupportedOperation {
            key: "t2".into(),
            kind: InteractiveKind::Video,
        };
        let _no_active = PrrError::NoActiveCommunication;
        let _payment = PrrError::InvalidPayment {
            id: CommunicationId(1),
        };
    }

    #[test]
    fn vec_sink_records_in_order() {
        let mut sink: Vec<(ClientKey, Notification)> = Vec::new();
        let first = Notification {
            terminal: "t1".into(),
            kind: NotificationKind::OffToIdle,
        };
        let second = Notification {
            terminal: "t2".into(),
            kind: NotificationKind::BusyToIdle,
        };
        sink.deliver(&"c1".into(), &first);
        sink.deliver(&"c2".into(), &second);
        assert_eq!(sink.len(), 2);
        assert_eq!(sink[0].1, first);
        assert_eq!(sink[1].0, ClientKey::from("c2"));
    }
}
