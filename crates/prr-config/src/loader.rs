// SPDX-FileCopyrightText: 2026 PRR Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration loader using Figment for layered config merging.
//!
//! Lookup order: `./prr.toml` > `~/.config/prr/prr.toml` > `/etc/prr/prr.toml`,
//! with environment variable overrides via the `PRR_` prefix.

#![allow(clippy::result_large_err)] // figment::Error is external and cannot be boxed without wrapper

use std::path::{Path, PathBuf};

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};

use crate::model::PrrConfig;

pub(crate) const LOCAL_CONFIG: &str = "prr.toml";
pub(crate) const SYSTEM_CONFIG: &str = "/etc/prr/prr.toml";

pub(crate) fn user_config_path() -> PathBuf {
    dirs::config_dir()
        .map(|d| d.join("prr/prr.toml"))
        .unwrap_or_default()
}

/// Load configuration from the standard hierarchy with env var overrides.
///
/// Merge order (later overrides earlier):
/// 1. Compiled defaults
/// 2. `/etc/prr/prr.toml`
/// 3. `~/.config/prr/prr.toml`
/// 4. `./prr.toml`
/// 5. `PRR_*` environment variables
pub fn load_config() -> Result<PrrConfig, figment::Error> {
    build_figment().extract()
}

/// Load configuration from a TOML string on top of the defaults. No env, no files.
pub fn load_config_from_str(toml_content: &str) -> Result<PrrConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(PrrConfig::default()))
        .merge(Toml::string(toml_content))
        .extract()
}

/// Load configuration from an explicit file path with env var overrides.
pub fn load_config_from_path(path: &Path) -> Result<PrrConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(PrrConfig::default()))
        .merge(Toml::file(path))
        .merge(env_provider())
        .extract()
}

/// The Figment behind [`load_config`], before extraction.
pub fn build_figment() -> Figment {
    Figment::new()
        .merge(Serialized::defaults(PrrConfig::default()))
        .merge(Toml::file(SYSTEM_CONFIG))
        .merge(Toml::file(user_config_path()))
        .merge(Toml::file(LOCAL_CONFIG))
        .merge(env_provider())
}

/// Environment provider with explicit section mapping.
///
/// `PRR_TARIFF_FRIEND_DISCOUNT` must become `tariff.friend_discount`, and
/// `PRR_TARIFF_GOLD_VOICE_PER_UNIT` must become `tariff.gold.voice_per_unit`;
/// a plain `split("_")` would break every underscore-containing key.
fn env_provider() -> Env {
    Env::prefixed("PRR_").map(|key| env_key_to_path(key.as_str()).into())
}

pub(crate) fn env_key_to_path(key: &str) -> String {
    const SECTIONS: [&str; 4] = ["network", "tariff", "tiers", "log"];
    const TIERS: [&str; 3] = ["normal", "gold", "platinum"];

    for section in SECTIONS {
        let Some(rest) = key.strip_prefix(section).and_then(|r| r.strip_prefix('_')) else {
            continue;
        };
        if section == "tariff" {
            for tier in TIERS {
                if let Some(field) = rest.strip_prefix(tier).and_then(|r| r.strip_prefix('_')) {
                    return format!("tariff.{tier}.{field}");
                }
            }
        }
        return format!("{section}.{rest}");
    }
    key.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn env_keys_map_to_sections() {
        assert_eq!(env_key_to_path("log_level"), "log.level");
        assert_eq!(
            env_key_to_path("network_notifications_enabled"),
            "network.notifications_enabled"
        );
        assert_eq!(
            env_key_to_path("tariff_friend_discount"),
            "tariff.friend_discount"
        );
        assert_eq!(
            env_key_to_path("tiers_gold_promotion_balance"),
            "tiers.gold_promotion_balance"
        );
    }

    #[test]
    fn env_keys_reach_tier_tables() {
        assert_eq!(
            env_key_to_path("tariff_gold_voice_per_unit"),
            "tariff.gold.voice_per_unit"
        );
        assert_eq!(
            env_key_to_path("tariff_platinum_video_per_unit"),
            "tariff.platinum.video_per_unit"
        );
    }

    #[test]
    fn unknown_sections_pass_through() {
        assert_eq!(env_key_to_path("something_else"), "something_else");
    }
}
