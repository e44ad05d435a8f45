// SPDX-FileCopyrightText: 2026 PRR Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration model structs for the PRR network.
//!
//! All structs use `#[serde(deny_unknown_fields)]` so a misspelled key is
//! reported at startup instead of silently falling back to a default.

use prr_core::DeliveryMethod;
use serde::{Deserialize, Serialize};

/// Top-level PRR configuration.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct PrrConfig {
    /// Defaults applied to newly registered clients.
    #[serde(default)]
    pub network: NetworkConfig,

    /// Tariff tables per client tier.
    #[serde(default)]
    pub tariff: TariffConfig,

    /// Client tier promotion and demotion rules.
    #[serde(default)]
    pub tiers: TierConfig,

    /// Logging settings for the binary.
    #[serde(default)]
    pub log: LogConfig,
}

/// Defaults for new clients.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct NetworkConfig {
    /// Whether a newly registered client receives notifications.
    #[serde(default = "default_true")]
    pub notifications_enabled: bool,

    /// Delivery method for newly registered clients.
    #[serde(default)]
    pub delivery: DeliveryMethod,
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            notifications_enabled: true,
            delivery: DeliveryMethod::Queued,
        }
    }
}

fn default_true() -> bool {
    true
}

/// A price made of a flat part and a per-unit part.
#[derive(Debug, Clone, Copy, Default, PartialEq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct Rate {
    #[serde(default)]
    pub flat: f64,
    #[serde(default)]
    pub per_unit: f64,
}

impl Rate {
    pub const fn flat(amount: f64) -> Self {
        Self {
            flat: amount,
            per_unit: 0.0,
        }
    }

    pub const fn per_unit(amount: f64) -> Self {
        Self {
            flat: 0.0,
            per_unit: amount,
        }
    }

    pub fn apply(&self, units: u32) -> f64 {
        self.flat + self.per_unit * units as f64
    }
}

/// Prices for one client tier.
///
/// Text messages fall into three length bands (see [`TariffConfig`] for the
/// limits); voice and video are charged per unit of duration.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct TierTariff {
    pub text_short: Rate,
    pub text_medium: Rate,
    pub text_long: Rate,
    pub voice_per_unit: f64,
    pub video_per_unit: f64,
}

impl TierTariff {
    pub fn normal() -> Self {
        Self {
            text_short: Rate::flat(10.0),
            text_medium: Rate::flat(16.0),
            text_long: Rate::per_unit(2.0),
            voice_per_unit: 20.0,
            video_per_unit: 30.0,
        }
    }

    pub fn gold() -> Self {
        Self {
            text_short: Rate::flat(10.0),
            text_medium: Rate::flat(10.0),
            text_long: Rate::per_unit(2.0),
            voice_per_unit: 10.0,
            video_per_unit: 20.0,
        }
    }

    pub fn platinum() -> Self {
        Self {
            text_short: Rate::flat(0.0),
            text_medium: Rate::flat(4.0),
            text_long: Rate::flat(4.0),
            voice_per_unit: 10.0,
            video_per_unit: 10.0,
        }
    }
}

/// Tariff configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct TariffConfig {
    /// Fraction taken off interactive sessions between friends (0.0..=1.0).
    #[serde(default = "default_friend_discount")]
    pub friend_discount: f64,

    /// Texts shorter than this many characters use the short band.
    #[serde(default = "default_short_text_limit")]
    pub short_text_limit: u32,

    /// Texts shorter than this (and not short) use the medium band.
    #[serde(default = "default_medium_text_limit")]
    pub medium_text_limit: u32,

    #[serde(default = "TierTariff::normal")]
    pub normal: TierTariff,

    #[serde(default = "TierTariff::gold")]
    pub gold: TierTariff,

    #[serde(default = "TierTariff::platinum")]
    pub platinum: TierTariff,
}

impl Default for TariffConfig {
    fn default() -> Self {
        Self {
            friend_discount: default_friend_discount(),
            short_text_limit: default_short_text_limit(),
            medium_text_limit: default_medium_text_limit(),
            normal: TierTariff::normal(),
            gold: TierTariff::gold(),
            platinum: TierTariff::platinum(),
        }
    }
}

fn default_friend_discount() -> f64 {
    0.5
}

fn default_short_text_limit() -> u32 {
    50
}

fn default_medium_text_limit() -> u32 {
    100
}

/// Client tier review thresholds.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct TierConfig {
    /// A Normal client whose balance (paid minus debt) exceeds this becomes Gold.
    #[serde(default = "default_gold_promotion_balance")]
    pub gold_promotion_balance: f64,

    /// Consecutive video sessions that promote a Gold client to Platinum.
    #[serde(default = "default_platinum_video_streak")]
    pub platinum_video_streak: u32,

    /// Consecutive texts that move a Platinum client down to Gold.
    #[serde(default = "default_gold_text_streak")]
    pub gold_text_streak: u32,
}

impl Default for TierConfig {
    fn default() -> Self {
        Self {
            gold_promotion_balance: default_gold_promotion_balance(),
            platinum_video_streak: default_platinum_video_streak(),
            gold_text_streak: default_gold_text_streak(),
        }
    }
}

fn default_gold_promotion_balance() -> f64 {
    500.0
}

fn default_platinum_video_streak() -> u32 {
    5
}

fn default_gold_text_streak() -> u32 {
    2
}

/// Logging configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct LogConfig {
    /// Level filter (trace, debug, info, warn, error). `RUST_LOG` takes precedence.
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "warn".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rate_combines_flat_and_per_unit() {
        let rate = Rate {
            flat: 3.0,
            per_unit: 0.5,
        };
        assert!((rate.apply(10) - 8.0).abs() < f64::EPSILON);
        assert!((Rate::flat(4.0).apply(1_000) - 4.0).abs() < f64::EPSILON);
    }

    #[test]
    fn tiers_get_distinct_defaults() {
        let tariff = TariffConfig::default();
        assert_ne!(tariff.normal, tariff.gold);
        assert_ne!(tariff.gold, tariff.platinum);
        assert!((tariff.normal.voice_per_unit - 20.0).abs() < f64::EPSILON);
    }
}
