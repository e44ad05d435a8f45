// SPDX-FileCopyrightText: 2026 PRR Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration system for the PRR network.
//!
//! Provides TOML configuration parsing with strict validation
//! (`deny_unknown_fields`), XDG file hierarchy lookup, `PRR_*` environment
//! overrides, and miette diagnostics with typo suggestions.
//!
//! # Usage
//!
//! ```no_run
//! use prr_config::load_and_validate;
//!
//! let config = load_and_validate().expect("config errors");
//! println!("friend discount: {}", config.tariff.friend_discount);
//! ```

pub mod diagnostic;
pub mod loader;
pub mod model;
pub mod validation;

use std::path::Path;

pub use diagnostic::{render_errors, ConfigError};
pub use loader::{load_config, load_config_from_path, load_config_from_str};
pub use model::PrrConfig;

/// Load configuration from the XDG hierarchy and validate it.
pub fn load_and_validate() -> Result<PrrConfig, Vec<ConfigError>> {
    finish(loader::load_config(), collect_toml_sources)
}

/// Load configuration from a TOML string and validate it.
pub fn load_and_validate_str(toml_content: &str) -> Result<PrrConfig, Vec<ConfigError>> {
    finish(loader::load_config_from_str(toml_content), || {
        vec![("<inline>".to_string(), toml_content.to_string())]
    })
}

/// Load configuration from an explicit file and validate it.
pub fn load_and_validate_path(path: &Path) -> Result<PrrConfig, Vec<ConfigError>> {
    finish(loader::load_config_from_path(path), || {
        std::fs::read_to_string(path)
            .map(|content| vec![(path.display().to_string(), content)])
            .unwrap_or_default()
    })
}

fn finish(
    loaded: Result<PrrConfig, figment::Error>,
    sources: impl FnOnce() -> Vec<(String, String)>,
) -> Result<PrrConfig, Vec<ConfigError>> {
    match loaded {
        Ok(config) => {
            validation::validate_config(&config)?;
            tracing::debug!(
                friend_discount = config.tariff.friend_discount,
                log_level = %config.log.level,
                "configuration loaded"
            );
            Ok(config)
        }
        Err(err) => Err(diagnostic::figment_to_config_errors(err, &sources())),
    }
}

/// Read the TOML files of the hierarchy so diagnostics can point into them.
fn collect_toml_sources() -> Vec<(String, String)> {
    let candidates = [
        std::env::current_dir()
            .map(|d| d.join(loader::LOCAL_CONFIG))
            .unwrap_or_else(|_| loader::LOCAL_CONFIG.into()),
        loader::user_config_path(),
        loader::SYSTEM_CONFIG.into(),
    ];

    candidates
        .into_iter()
        .filter_map(|path| {
            std::fs::read_to_string(&path)
                .ok()
                .map(|content| (path.display().to_string(), content))
        })
        .collect()
}
