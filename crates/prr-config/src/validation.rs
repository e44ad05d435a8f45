// SPDX-FileCopyrightText: 2026 PRR Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Post-deserialization validation for configuration values.
//!
//! Checks what serde cannot: rates are non-negative, the friend discount is a
//! fraction, text bands are ordered, and the log level is one we know.

use crate::diagnostic::ConfigError;
use crate::model::{PrrConfig, Rate, TierTariff};

const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

/// Validate a deserialized configuration.
///
/// Collects every problem instead of stopping at the first.
pub fn validate_config(config: &PrrConfig) -> Result<(), Vec<ConfigError>> {
    let mut errors = Vec::new();
    let tariff = &config.tariff;

    if !(0.0..=1.0).contains(&tariff.friend_discount) {
        errors.push(ConfigError::validation(format!(
            "tariff.friend_discount must be between 0 and 1, got {}",
            tariff.friend_discount
        )));
    }

    if tariff.short_text_limit >= tariff.medium_text_limit {
        errors.push(ConfigError::validation(format!(
            "tariff.short_text_limit ({}) must be below tariff.medium_text_limit ({})",
            tariff.short_text_limit, tariff.medium_text_limit
        )));
    }

    for (name, tier) in [
        ("normal", &tariff.normal),
        ("gold", &tariff.gold),
        ("platinum", &tariff.platinum),
    ] {
        check_tier(name, tier, &mut errors);
    }

    if config.tiers.gold_promotion_balance < 0.0 {
        errors.push(ConfigError::validation(format!(
            "tiers.gold_promotion_balance must be non-negative, got {}",
            config.tiers.gold_promotion_balance
        )));
    }
    if config.tiers.platinum_video_streak == 0 {
        errors.push(ConfigError::validation(
            "tiers.platinum_video_streak must be at least 1",
        ));
    }
    if config.tiers.gold_text_streak == 0 {
        errors.push(ConfigError::validation(
            "tiers.gold_text_streak must be at least 1",
        ));
    }

    let level = config.log.level.trim().to_ascii_lowercase();
    if !LOG_LEVELS.contains(&level.as_str()) {
        errors.push(ConfigError::validation(format!(
            "log.level `{}` is not one of {}",
            config.log.level,
            LOG_LEVELS.join(", ")
        )));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn check_tier(name: &str, tier: &TierTariff, errors: &mut Vec<ConfigError>) {
    let rates: [(&str, Rate); 3] = [
        ("text_short", tier.text_short),
        ("text_medium", tier.text_medium),
        ("text_long", tier.text_long),
    ];
    for (field, rate) in rates {
        if rate.flat < 0.0 || rate.per_unit < 0.0 {
            errors.push(ConfigError::validation(format!(
                "tariff.{name}.{field} must be non-negative"
            )));
        }
    }
    for (field, value) in [
        ("voice_per_unit", tier.voice_per_unit),
        ("video_per_unit", tier.video_per_unit),
    ] {
        if value < 0.0 {
            errors.push(ConfigError::validation(format!(
                "tariff.{name}.{field} must be non-negative, got {value}"
            )));
        }
    }
}
