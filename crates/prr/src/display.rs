// SPDX-FileCopyrightText: 2026 PRR Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! User-facing messages for network errors.

use prr_core::PrrError;

/// Render an error the way the shell shows it to a person.
pub fn describe(error: &PrrError) -> String {
    match error {
        PrrError::UnknownTerminalKey { key } => format!("Terminal '{key}' does not exist."),
        PrrError::UnknownClientKey { key } => format!("Client '{key}' does not exist."),
        PrrError::DuplicateClientKey { key } => format!("Client '{key}' already exists."),
        PrrError::DuplicateTerminalKey { key } => format!("Terminal '{key}' already exists."),
        PrrError::InvalidKey { key, reason } => format!("Invalid key '{key}': {reason}."),
        PrrError::SameState { state } => format!("Terminal is already {state}."),
        PrrError::InvalidTransition { key, from, to } => {
            format!("Terminal '{key}' cannot change from {from} to {to}.")
        }
        PrrError::Unavailable { key, state } => {
            format!("Terminal '{key}' is unavailable ({state}).")
        }
        PrrError::CannotStart { key, state } => {
            format!("Terminal '{key}' cannot start a communication while {state}.")
        }
        PrrError::UnsupportedOperation { key, kind } => {
            format!("Terminal '{key}' does not support {kind} communications.")
        }
        PrrError::NoActiveCommunication => "There is no active communication.".to_string(),
        PrrError::InvalidPayment { id } => format!("Communication {id} cannot be paid."),
        PrrError::NotificationsAlreadyEnabled { key } => {
            format!("Notifications are already enabled for client '{key}'.")
        }
        PrrError::NotificationsAlreadyDisabled { key } => {
            format!("Notifications are already disabled for client '{key}'.")
        }
        PrrError::Import { line, message } => format!("Import failed at line {line}: {message}."),
        PrrError::Io(err) => format!("I/O error: {err}."),
        PrrError::Config(message) => format!("Configuration error: {message}."),
    }
}

#[cfg(test)]
mod tests {
    use prr_core::{CommunicationId, InteractiveKind, StateTag};

    use super::*;

    #[test]
    fn names_the_terminal_and_state() {
        let err = PrrError::Unavailable {
            key: "t2".into(),
            state: StateTag::Silent,
        };
        assert_eq!(describe(&err), "Terminal 't2' is unavailable (SILENCE).");
    }

    #[test]
    fn every_kind_has_a_sentence() {
        let errors = [
            PrrError::unknown_terminal("t1"),
            PrrError::unknown_client("c1"),
            PrrError::DuplicateClientKey { key: "c1".into() },
            PrrError::SameState {
                state: StateTag::Off,
            },
            PrrError::UnsupportedOperation {
                key: "t1".into(),
                kind: InteractiveKind::Video,
            },
            PrrError::NoActiveCommunication,
            PrrError::InvalidPayment {
                id: CommunicationId(3),
            },
            PrrError::Import {
                line: 4,
                message: "bad".into(),
            },
        ];
        for err in &errors {
            let text = describe(err);
            assert!(text.ends_with('.'), "{text}");
            assert!(text.chars().next().is_some_and(char::is_uppercase), "{text}");
        }
    }

    #[test]
    fn payment_message_names_the_id() {
        let err = PrrError::InvalidPayment {
            id: CommunicationId(12),
        };
        assert_eq!(describe(&err), "Communication 12 cannot be paid.");
    }
}
