// SPDX-FileCopyrightText: 2026 PRR Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error types for the PRR network.

use thiserror::Error;

use crate::types::{ClientKey, CommunicationId, InteractiveKind, StateTag, TerminalKey};

/// The error type returned by every fallible registry, terminal, and client operation.
///
/// An operation that returns an error has not mutated anything.
#[derive(Debug, Error)]
pub enum PrrError {
    /// No terminal is registered under the key.
    #[error("unknown terminal key `{key}`")]
    UnknownTerminalKey { key: TerminalKey },

    /// No client is registered under the key.
    #[error("unknown client key `{key}`")]
    UnknownClientKey { key: ClientKey },

    /// A client registration reused an existing client key.
    #[error("duplicate client key `{key}`")]
    DuplicateClientKey { key: ClientKey },

    /// A terminal registration reused an existing terminal key.
    #[error("duplicate terminal key `{key}`")]
    DuplicateTerminalKey { key: TerminalKey },

    /// A key is empty or contains a record separator.
    #[error("invalid key `{key}`: {reason}")]
    InvalidKey { key: String, reason: String },

    /// A state change requested the state the terminal is already in.
    #[error("terminal is already {state}")]
    SameState { state: StateTag },

    /// A state change that only a session may perform (entering or leaving Busy).
    #[error("terminal `{key}` cannot go from {from} to {to}")]
    InvalidTransition {
        key: TerminalKey,
        from: StateTag,
        to: StateTag,
    },

    /// The destination cannot accept the communication in its current state.
    #[error("terminal `{key}` is unavailable ({state})")]
    Unavailable { key: TerminalKey, state: StateTag },

    /// The originator cannot start a communication in its current state.
    #[error("terminal `{key}` cannot start a communication while {state}")]
    CannotStart { key: TerminalKey, state: StateTag },

    /// The originator or destination does not support the interactive kind.
    #[error("terminal `{key}` does not support {kind} communications")]
    UnsupportedOperation { key: TerminalKey, kind: InteractiveKind },

    /// End requested with no open session, or by a terminal that did not start it.
    #[error("no active communication")]
    NoActiveCommunication,

    /// Payment for a communication that is not owned, not finished, or already paid.
    #[error("invalid payment for communication {id}")]
    InvalidPayment { id: CommunicationId },

    #[error("notifications already enabled for client `{key}`")]
    NotificationsAlreadyEnabled { key: ClientKey },

    #[error("notifications already disabled for client `{key}`")]
    NotificationsAlreadyDisabled { key: ClientKey },

    /// A malformed record in an import source.
    #[error("import error at line {line}: {message}")]
    Import { line: usize, message: String },

    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration errors surfaced outside the config loader.
    #[error("configuration error: {0}")]
    Config(String),
}

impl PrrError {
    pub fn unknown_terminal(key: impl Into<TerminalKey>) -> Self {
        PrrError::UnknownTerminalKey { key: key.into() }
    }

    pub fn unknown_client(key: impl Into<ClientKey>) -> Self {
        PrrError::UnknownClientKey { key: key.into() }
    }
}
