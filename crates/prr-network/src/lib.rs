// SPDX-FileCopyrightText: 2026 PRR Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The PRR network: terminals, clients, notifications, and the coordinator
//! that runs every command against them.
//!
//! # Usage
//!
//! ```
//! use prr_core::{InteractiveKind, StateTag, TerminalKind};
//! use prr_network::Network;
//!
//! let mut net = Network::default();
//! net.register_client("c1", "Ana", 1).unwrap();
//! net.register_client("c2", "Rui", 2).unwrap();
//! net.register_terminal("t1", TerminalKind::Basic, "c1", StateTag::On).unwrap();
//! net.register_terminal("t2", TerminalKind::Basic, "c2", StateTag::On).unwrap();
//!
//! net.send_interactive("t1", "t2", InteractiveKind::Voice).unwrap();
//! assert_eq!(net.end_active_communication("t1", 30).unwrap(), 600);
//! ```

pub mod client;
pub mod import;
pub mod network;
pub mod notification;
pub mod terminal;

pub use client::{Client, ClientRecord};
pub use import::{import_file, import_str};
pub use network::{Balance, Network};
pub use terminal::{ActiveSession, Terminal};
