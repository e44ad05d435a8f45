// SPDX-FileCopyrightText: 2026 PRR Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Line-oriented network import.
//!
//! ```text
//! # comment
//! CLIENT|c1|Ana Silva|123456
//! BASIC|t1|c1|ON
//! FANCY|t2|c1|SILENCE
//! FRIENDS|t1|t2,t3
//! ```
//!
//! Clients and terminals are registered in file order. Friend lists are
//! applied after every terminal exists, so they may name terminals defined
//! further down. The import builds a fresh network: a failure discards it.

use std::path::Path;
use std::str::FromStr;

use tracing::{debug, info};

use prr_config::PrrConfig;
use prr_core::{PrrError, StateTag, TerminalKind};

use crate::network::Network;

/// Build a network from import text.
pub fn import_str(source: &str, config: &PrrConfig) -> Result<Network, PrrError> {
    let mut network = Network::new(config);
    let mut friendships: Vec<(usize, &str, &str)> = Vec::new();
    let mut records = 0;

    for (index, raw) in source.lines().enumerate() {
        let line = index + 1;
        let trimmed = raw.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }
        let fields: Vec<&str> = trimmed.split('|').map(str::trim).collect();
        match fields.as_slice() {
            ["CLIENT", key, name, tax_id] => {
                let tax_id = tax_id.parse::<u32>().map_err(|_| PrrError::Import {
                    line,
                    message: format!("tax id `{tax_id}` is not a number"),
                })?;
                network
                    .register_client(key, name, tax_id)
                    .map_err(|e| at(line, e))?;
            }
            [kind @ ("BASIC" | "FANCY"), key, owner, state] => {
                let kind = TerminalKind::from_str(kind).map_err(|e| at(line, e))?;
                let state = StateTag::from_str(state).map_err(|_| PrrError::Import {
                    line,
                    message: format!("unknown terminal state `{state}`"),
                })?;
                network
                    .register_terminal(key, kind, owner, state)
                    .map_err(|e| at(line, e))?;
            }
            ["FRIENDS", key, friends] => friendships.push((line, *key, *friends)),
            _ => {
                return Err(PrrError::Import {
                    line,
                    message: format!("unrecognized record `{trimmed}`"),
                });
            }
        }
        records += 1;
    }

    for (line, key, friends) in friendships {
        for friend in friends.split(',').map(str::trim).filter(|f| !f.is_empty()) {
            network.add_friend(key, friend).map_err(|e| at(line, e))?;
        }
    }

    network.mark_clean();
    info!(records, "network imported");
    Ok(network)
}

/// Build a network from an import file.
pub fn import_file(path: &Path, config: &PrrConfig) -> Result<Network, PrrError> {
    debug!(path = %path.display(), "reading import file");
    let source = std::fs::read_to_string(path)?;
    import_str(&source, config)
}

fn at(line: usize, error: impl std::fmt::Display) -> PrrError {
    PrrError::Import {
        line,
        message: error.to_string(),
    }
}
