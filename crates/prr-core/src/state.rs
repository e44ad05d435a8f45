// SPDX-FileCopyrightText: 2026 PRR Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Terminal availability FSM.
//!
//! A terminal is On (idle), Off, Silent, or Busy. Busy is only ever entered
//! by starting or accepting an interactive session and remembers the resting
//! state to return to when that session ends:
//!
//! ```text
//!   On <----> Off <----> Silent        (any resting state to any other)
//!   On/Silent -- session --> Busy{prior} -- end --> prior
//! ```
//!
//! Capability queries are pure; transitions return the next state instead of
//! mutating in place so callers can validate both sides of a session before
//! committing either.

use serde::{Deserialize, Serialize};

use crate::error::PrrError;
use crate::types::{NotificationKind, StateTag};

/// A state a terminal can rest in while not in a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RestState {
    On,
    Silent,
}

impl From<RestState> for TerminalState {
    fn from(state: RestState) -> Self {
        match state {
            RestState::On => TerminalState::On,
            RestState::Silent => TerminalState::Silent,
        }
    }
}

/// Availability of a terminal.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum TerminalState {
    #[default]
    On,
    Off,
    Silent,
    Busy { prior: RestState },
}

impl TerminalState {
    pub fn tag(&self) -> StateTag {
        match self {
            TerminalState::On => StateTag::On,
            TerminalState::Off => StateTag::Off,
            TerminalState::Silent => StateTag::Silent,
            TerminalState::Busy { .. } => StateTag::Busy,
        }
    }

    /// Idle and silent terminals may place calls and send texts.
    pub fn can_start_communication(&self) -> bool {
        matches!(self, TerminalState::On | TerminalState::Silent)
    }

    pub fn can_receive_text(&self) -> bool {
        matches!(self, TerminalState::On | TerminalState::Silent)
    }

    /// Only an idle terminal takes a call. Whether the hardware supports the
    /// kind is a separate question answered by the terminal's model.
    pub fn can_receive_interactive(&self) -> bool {
        matches!(self, TerminalState::On)
    }

    /// True only while Busy with a session this terminal originated.
    pub fn can_end_current_communication(&self, is_originator: bool) -> bool {
        matches!(self, TerminalState::Busy { .. }) && is_originator
    }

    /// Tag equality: two Busy states with different priors are the same type.
    pub fn is_same_type(&self, other: &TerminalState) -> bool {
        self.tag() == other.tag()
    }

    /// Validate a requested change and return the state to install.
    ///
    /// Leaving Busy drops the saved prior along with the old value.
    pub fn transition(self, next: TerminalState) -> Result<TerminalState, PrrError> {
        if self.is_same_type(&next) {
            return Err(PrrError::SameState { state: self.tag() });
        }
        Ok(next)
    }

    /// The Busy state entered from this one, if a session may start here.
    pub fn occupy(self) -> Option<TerminalState> {
        match self {
            TerminalState::On => Some(TerminalState::Busy {
                prior: RestState::On,
            }),
            TerminalState::Silent => Some(TerminalState::Busy {
                prior: RestState::Silent,
            }),
            TerminalState::Off | TerminalState::Busy { .. } => None,
        }
    }

    /// The resting state named by a tag; Busy cannot be requested directly.
    pub fn resting(tag: StateTag) -> Option<TerminalState> {
        match tag {
            StateTag::On => Some(TerminalState::On),
            StateTag::Off => Some(TerminalState::Off),
            StateTag::Silent => Some(TerminalState::Silent),
            StateTag::Busy => None,
        }
    }

    /// The state saved when Busy was entered.
    pub fn release(self) -> Option<TerminalState> {
        match self {
            TerminalState::Busy { prior } => Some(prior.into()),
            _ => None,
        }
    }
}

/// The notification observers get when a terminal moves between two states.
///
/// Only moves towards availability are announced.
pub fn availability_change(from: StateTag, to: StateTag) -> Option<NotificationKind> {
    match (from, to) {
        (StateTag::Off, StateTag::On) => Some(NotificationKind::OffToIdle),
        (StateTag::Off, StateTag::Silent) => Some(NotificationKind::OffToSilent),
        (StateTag::Busy, StateTag::On) => Some(NotificationKind::BusyToIdle),
        (StateTag::Busy, StateTag::Silent) => Some(NotificationKind::BusyToSilent),
        (StateTag::Silent, StateTag::On) => Some(NotificationKind::SilentToIdle),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;

    fn any_state() -> impl Strategy<Value = TerminalState> {
        prop_oneof![
            Just(TerminalState::On),
            Just(TerminalState::Off),
            Just(TerminalState::Silent),
            Just(TerminalState::Busy {
                prior: RestState::On
            }),
            Just(TerminalState::Busy {
                prior: RestState::Silent
            }),
        ]
    }

    #[test]
    fn capability_table() {
        let busy = TerminalState::Busy {
            prior: RestState::On,
        };

        assert!(TerminalState::On.can_start_communication());
        assert!(TerminalState::Silent.can_start_communication());
        assert!(!TerminalState::Off.can_start_communication());
        assert!(!busy.can_start_communication());

        assert!(TerminalState::On.can_receive_text());
        assert!(TerminalState::Silent.can_receive_text());
        assert!(!TerminalState::Off.can_receive_text());
        assert!(!busy.can_receive_text());

        assert!(TerminalState::On.can_receive_interactive());
        assert!(!TerminalState::Silent.can_receive_interactive());
        assert!(!TerminalState::Off.can_receive_interactive());
        assert!(!busy.can_receive_interactive());
    }

    #[test]
    fn only_the_busy_originator_may_end() {
        let busy = TerminalState::Busy {
            prior: RestState::Silent,
        };
        assert!(busy.can_end_current_communication(true));
        assert!(!busy.can_end_current_communication(false));
        assert!(!TerminalState::On.can_end_current_communication(true));
    }

    #[test]
    fn busy_priors_compare_as_same_type() {
        let a = TerminalState::Busy {
            prior: RestState::On,
        };
        let b = TerminalState::Busy {
            prior: RestState::Silent,
        };
        assert!(a.is_same_type(&b));
        assert!(!a.is_same_type(&TerminalState::On));
    }

    #[test]
    fn occupy_then_release_restores_prior() {
        for rest in [TerminalState::On, TerminalState::Silent] {
            let busy = rest.occupy().expect("resting states can be occupied");
            assert_eq!(busy.tag(), StateTag::Busy);
            assert_eq!(busy.release(), Some(rest));
        }
        assert_eq!(TerminalState::Off.occupy(), None);
        assert_eq!(TerminalState::On.release(), None);
    }

    #[test]
    fn leaving_busy_discards_prior() {
        let busy = TerminalState::Busy {
            prior: RestState::Silent,
        };
        let next = busy.transition(TerminalState::Off).unwrap();
        assert_eq!(next, TerminalState::Off);
        assert_eq!(next.release(), None);
    }

    #[test]
    fn only_moves_towards_availability_are_announced() {
        assert_eq!(
            availability_change(StateTag::Off, StateTag::On),
            Some(NotificationKind::OffToIdle)
        );
        assert_eq!(
            availability_change(StateTag::Busy, StateTag::Silent),
            Some(NotificationKind::BusyToSilent)
        );
        assert_eq!(availability_change(StateTag::On, StateTag::Off), None);
        assert_eq!(availability_change(StateTag::On, StateTag::Silent), None);
        assert_eq!(availability_change(StateTag::Silent, StateTag::Off), None);
    }

    proptest! {
        #[test]
        fn transition_rejects_exactly_same_tag(from in any_state(), to in any_state()) {
            let result = from.transition(to);
            if from.tag() == to.tag() {
                let is_same_state = matches!(result, Err(PrrError::SameState { .. }));
                prop_assert!(is_same_state);
            } else {
                prop_assert_eq!(result.unwrap(), to);
            }
        }

        #[test]
        fn busy_is_never_a_resting_state(state in any_state()) {
            if let Some(busy) = state.occupy() {
                prop_assert!(busy.release().is_some());
                prop_assert!(busy.occupy().is_none());
            }
        }
    }
}
