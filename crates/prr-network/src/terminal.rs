// SPDX-FileCopyrightText: 2026 PRR Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The terminal aggregate: availability, balances, the active session,
//! friends, observers, and the communication logs.
//!
//! Every `check_*` method is a pure precondition. Mutating methods are only
//! called by the network after all preconditions for both sides of an
//! operation have passed, so a failed command never leaves half a change.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use serde::Serialize;

use prr_core::types::rounded;
use prr_core::{
    ClientKey, ClientType, Communication, CommunicationId, InteractiveKind, NotificationKind,
    PrrError, StateTag, TariffPolicy, TerminalKey, TerminalKind, TerminalState,
};

use crate::client::Client;
use crate::notification;

/// The interactive session a terminal is taking part in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ActiveSession {
    pub id: CommunicationId,
    /// This terminal placed the call and is the only side that may end it.
    pub originator: bool,
}

#[derive(Debug, Clone)]
pub struct Terminal {
    key: TerminalKey,
    owner: ClientKey,
    kind: TerminalKind,
    state: TerminalState,
    active: Option<ActiveSession>,
    friends: BTreeSet<TerminalKey>,
    observers: Vec<ClientKey>,
    sent: Vec<Communication>,
    received: Vec<CommunicationId>,
}

impl Terminal {
    pub fn new(
        key: TerminalKey,
        kind: TerminalKind,
        owner: ClientKey,
        state: TerminalState,
    ) -> Self {
        Self {
            key,
            owner,
            kind,
            state,
            active: None,
            friends: BTreeSet::new(),
            observers: Vec::new(),
            sent: Vec::new(),
            received: Vec::new(),
        }
    }

    pub fn key(&self) -> &TerminalKey {
        &self.key
    }

    pub fn owner(&self) -> &ClientKey {
        &self.owner
    }

    pub fn kind(&self) -> TerminalKind {
        self.kind
    }

    pub fn state(&self) -> TerminalState {
        self.state
    }

    /// Sum of the prices of paid sent communications.
    pub fn paid(&self) -> f64 {
        self.priced(true)
    }

    /// Sum of the prices of finished, unpaid sent communications.
    pub fn debt(&self) -> f64 {
        self.priced(false)
    }

    fn priced(&self, paid: bool) -> f64 {
        self.sent
            .iter()
            .filter(|c| c.is_paid() == paid)
            .filter_map(Communication::price)
            .fold(0.0, |total, price| total + price)
    }

    /// Paid minus debt.
    pub fn balance(&self) -> f64 {
        self.paid() - self.debt()
    }

    pub fn active(&self) -> Option<ActiveSession> {
        self.active
    }

    pub fn friends(&self) -> &BTreeSet<TerminalKey> {
        &self.friends
    }

    pub fn is_friend(&self, key: &TerminalKey) -> bool {
        self.friends.contains(key)
    }

    pub fn observers(&self) -> &[ClientKey] {
        &self.observers
    }

    /// Communications this terminal sent, in creation order.
    pub fn sent(&self) -> &[Communication] {
        &self.sent
    }

    /// Ids of communications this terminal received, in creation order.
    pub fn received(&self) -> &[CommunicationId] {
        &self.received
    }

    /// A terminal that has neither sent nor received anything.
    pub fn is_unused(&self) -> bool {
        self.sent.is_empty() && self.received.is_empty()
    }

    pub fn sent_communication(&self, id: CommunicationId) -> Option<&Communication> {
        self.sent.iter().find(|c| c.id() == id)
    }

    // --- preconditions ---

    pub fn check_can_start(&self) -> Result<(), PrrError> {
        if self.state.can_start_communication() {
            Ok(())
        } else {
            Err(PrrError::CannotStart {
                key: self.key.clone(),
                state: self.state.tag(),
            })
        }
    }

    pub fn check_can_receive_text(&self) -> Result<(), PrrError> {
        if self.state.can_receive_text() {
            Ok(())
        } else {
            Err(self.unavailable())
        }
    }

    pub fn check_supports(&self, kind: InteractiveKind) -> Result<(), PrrError> {
        if self.kind.supports(kind) {
            Ok(())
        } else {
            Err(PrrError::UnsupportedOperation {
                key: self.key.clone(),
                kind,
            })
        }
    }

    /// Hardware first, then availability.
    pub fn check_can_receive_interactive(&self, kind: InteractiveKind) -> Result<(), PrrError> {
        self.check_supports(kind)?;
        if self.state.can_receive_interactive() {
            Ok(())
        } else {
            Err(self.unavailable())
        }
    }

    /// The Busy state this terminal would enter for a new session.
    pub(crate) fn occupied_state(&self) -> Result<TerminalState, PrrError> {
        self.state.occupy().ok_or_else(|| self.unavailable())
    }

    fn unavailable(&self) -> PrrError {
        PrrError::Unavailable {
            key: self.key.clone(),
            state: self.state.tag(),
        }
    }

    // --- mutations ---

    pub(crate) fn record_sent(&mut self, communication: Communication) {
        self.sent.push(communication);
    }

    pub(crate) fn record_received(&mut self, id: CommunicationId) {
        self.received.push(id);
    }

    pub(crate) fn enter_session(&mut self, busy: TerminalState, session: ActiveSession) {
        self.state = busy;
        self.active = Some(session);
    }

    /// Close the session this terminal originated.
    ///
    /// Prices the communication, which adds its exact price to the debt, and
    /// restores the state saved when the session began. Returns the price
    /// and the closed session.
    pub(crate) fn close_session(
        &mut self,
        units: u32,
        policy: &dyn TariffPolicy,
        client_type: ClientType,
    ) -> Result<(f64, ActiveSession), PrrError> {
        let session = self
            .active
            .filter(|s| s.originator && self.state.can_end_current_communication(s.originator))
            .ok_or(PrrError::NoActiveCommunication)?;
        let restored = self
            .state
            .release()
            .ok_or(PrrError::NoActiveCommunication)?;
        let communication = self
            .sent
            .iter_mut()
            .find(|c| c.id() == session.id)
            .ok_or(PrrError::NoActiveCommunication)?;

        let price = communication.close(units, policy, client_type)?;
        self.state = restored;
        self.active = None;
        Ok((price, session))
    }

    /// Leave a session this terminal received. Returns false if it was not in it.
    pub(crate) fn leave_session(&mut self, id: CommunicationId) -> bool {
        if !self.active.is_some_and(|s| s.id == id && !s.originator) {
            return false;
        }
        match self.state.release() {
            Some(restored) => {
                self.state = restored;
                self.active = None;
                true
            }
            None => false,
        }
    }

    /// Move the exact price of a finished, unpaid sent communication from
    /// debt to paid.
    pub(crate) fn pay(&mut self, id: CommunicationId) -> Result<f64, PrrError> {
        let communication = self
            .sent
            .iter_mut()
            .find(|c| c.id() == id)
            .ok_or(PrrError::InvalidPayment { id })?;
        let price = communication
            .price()
            .ok_or(PrrError::InvalidPayment { id })?;
        communication.mark_paid()?;
        Ok(price)
    }

    /// Install a resting state requested by a user.
    ///
    /// Busy is entered and left only through sessions. Returns the tag of
    /// the state that was replaced.
    pub(crate) fn change_state(&mut self, requested: StateTag) -> Result<StateTag, PrrError> {
        let from = self.state.tag();
        if from == requested {
            return Err(PrrError::SameState { state: from });
        }
        let next = match TerminalState::resting(requested) {
            Some(next) if from != StateTag::Busy => next,
            _ => {
                return Err(PrrError::InvalidTransition {
                    key: self.key.clone(),
                    from,
                    to: requested,
                });
            }
        };
        self.state = self.state.transition(next)?;
        Ok(from)
    }

    /// Returns false for self and for an existing friend.
    pub(crate) fn add_friend(&mut self, friend: TerminalKey) -> bool {
        if friend == self.key {
            return false;
        }
        self.friends.insert(friend)
    }

    pub(crate) fn remove_friend(&mut self, friend: &TerminalKey) -> bool {
        self.friends.remove(friend)
    }

    pub(crate) fn add_observer(&mut self, client: ClientKey) -> bool {
        if self.observers.contains(&client) {
            return false;
        }
        self.observers.push(client);
        true
    }

    /// Queue a notification on every observing client that accepts them.
    ///
    /// Subscriptions are one-shot: the observer list is emptied afterwards.
    /// Returns the number of notifications queued.
    pub fn notify_observers(
        &mut self,
        kind: NotificationKind,
        clients: &mut BTreeMap<ClientKey, Client>,
    ) -> usize {
        if self.observers.is_empty() {
            return 0;
        }
        let observers = std::mem::take(&mut self.observers);
        notification::dispatch(&self.key, kind, &observers, clients)
    }
}

/// Record form: `key|owner|STATE|debt|paid[|friend,friend]`.
impl fmt::Display for Terminal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}|{}|{}|{}|{}",
            self.key,
            self.owner,
            self.state.tag(),
            rounded(self.debt()),
            rounded(self.paid())
        )?;
        if !self.friends.is_empty() {
            let friends: Vec<&str> = self.friends.iter().map(TerminalKey::as_str).collect();
            write!(f, "|{}", friends.join(","))?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use prr_core::{Participants, RestState};
    use prr_tariff::TariffTable;

    use super::*;

    fn terminal(key: &str, kind: TerminalKind, state: TerminalState) -> Terminal {
        Terminal::new(key.into(), kind, "c1".into(), state)
    }

    fn open_call(terminal: &mut Terminal, id: u32) {
        let busy = terminal.occupied_state().unwrap();
        terminal.record_sent(Communication::interactive(
            CommunicationId(id),
            Participants {
                sender: terminal.key().clone(),
                receiver: "t2".into(),
                between_friends: false,
            },
            InteractiveKind::Voice,
        ));
        terminal.enter_session(
            busy,
            ActiveSession {
                id: CommunicationId(id),
                originator: true,
            },
        );
    }

    #[test]
    fn record_form_lists_sorted_friends() {
        let mut t = terminal("t1", TerminalKind::Basic, TerminalState::On);
        assert_eq!(t.to_string(), "t1|c1|IDLE|0|0");
        t.add_friend("t3".into());
        t.add_friend("t2".into());
        t.record_sent(Communication::text(
            CommunicationId(1),
            Participants {
                sender: "t1".into(),
                receiver: "t2".into(),
                between_friends: true,
            },
            "hello",
            &TariffTable::default(),
            ClientType::Normal,
        ));
        assert_eq!(t.to_string(), "t1|c1|IDLE|10|0|t2,t3");
    }

    #[test]
    fn off_and_busy_terminals_cannot_start() {
        let off = terminal("t1", TerminalKind::Fancy, TerminalState::Off);
        assert!(matches!(
            off.check_can_start(),
            Err(PrrError::CannotStart { state: StateTag::Off, .. })
        ));
        let silent = terminal("t2", TerminalKind::Fancy, TerminalState::Silent);
        assert!(silent.check_can_start().is_ok());
    }

    #[test]
    fn basic_terminal_rejects_video_before_checking_state() {
        let t = terminal("t2", TerminalKind::Basic, TerminalState::Off);
        assert!(matches!(
            t.check_can_receive_interactive(InteractiveKind::Video),
            Err(PrrError::UnsupportedOperation { .. })
        ));
        assert!(matches!(
            t.check_can_receive_interactive(InteractiveKind::Voice),
            Err(PrrError::Unavailable { state: StateTag::Off, .. })
        ));
    }

    #[test]
    fn closing_restores_the_prior_state() {
        let table = TariffTable::default();
        let mut t = terminal("t1", TerminalKind::Basic, TerminalState::Silent);
        open_call(&mut t, 1);
        assert_eq!(
            t.state(),
            TerminalState::Busy {
                prior: RestState::Silent
            }
        );

        let (price, session) = t.close_session(30, &table, ClientType::Normal).unwrap();
        assert!((price - 600.0).abs() < f64::EPSILON);
        assert_eq!(session.id, CommunicationId(1));
        assert_eq!(t.state(), TerminalState::Silent);
        assert_eq!(t.active(), None);
        assert!((t.debt() - 600.0).abs() < f64::EPSILON);
    }

    #[test]
    fn receiver_cannot_close() {
        let table = TariffTable::default();
        let mut t = terminal("t2", TerminalKind::Basic, TerminalState::On);
        let busy = t.occupied_state().unwrap();
        t.enter_session(
            busy,
            ActiveSession {
                id: CommunicationId(4),
                originator: false,
            },
        );
        assert!(matches!(
            t.close_session(3, &table, ClientType::Normal),
            Err(PrrError::NoActiveCommunication)
        ));
        assert!(t.leave_session(CommunicationId(4)));
        assert_eq!(t.state(), TerminalState::On);
    }

    #[test]
    fn payment_moves_exact_price_once() {
        let table = TariffTable::default();
        let mut t = terminal("t1", TerminalKind::Basic, TerminalState::On);
        open_call(&mut t, 7);
        assert!(t.pay(CommunicationId(7)).is_err());
        t.close_session(2, &table, ClientType::Gold).unwrap();

        let price = t.pay(CommunicationId(7)).unwrap();
        assert!((price - 20.0).abs() < f64::EPSILON);
        assert!((t.paid() - 20.0).abs() < f64::EPSILON);
        assert!(t.debt().abs() < f64::EPSILON);
        assert!(matches!(
            t.pay(CommunicationId(7)),
            Err(PrrError::InvalidPayment { .. })
        ));
        assert!(matches!(
            t.pay(CommunicationId(99)),
            Err(PrrError::InvalidPayment { .. })
        ));
    }

    #[test]
    fn manual_changes_never_touch_busy() {
        let mut t = terminal("t1", TerminalKind::Basic, TerminalState::On);
        assert!(matches!(
            t.change_state(StateTag::On),
            Err(PrrError::SameState { state: StateTag::On })
        ));
        assert!(matches!(
            t.change_state(StateTag::Busy),
            Err(PrrError::InvalidTransition { .. })
        ));
        assert_eq!(t.change_state(StateTag::Off).unwrap(), StateTag::On);

        let mut busy = terminal("t2", TerminalKind::Basic, TerminalState::On);
        open_call(&mut busy, 1);
        assert!(matches!(
            busy.change_state(StateTag::Busy),
            Err(PrrError::SameState { .. })
        ));
        assert!(matches!(
            busy.change_state(StateTag::Off),
            Err(PrrError::InvalidTransition { .. })
        ));
    }

    #[test]
    fn friends_ignore_self_and_duplicates() {
        let mut t = terminal("t1", TerminalKind::Basic, TerminalState::On);
        assert!(!t.add_friend("t1".into()));
        assert!(t.add_friend("t2".into()));
        assert!(!t.add_friend("t2".into()));
        assert!(t.remove_friend(&"t2".into()));
        assert!(!t.remove_friend(&"t2".into()));
        assert!(t.friends().is_empty());
    }

    #[test]
    fn notifying_without_observers_is_a_no_op() {
        let mut t = terminal("t1", TerminalKind::Basic, TerminalState::On);
        let mut clients = BTreeMap::new();
        assert_eq!(t.notify_observers(NotificationKind::OffToIdle, &mut clients), 0);
    }
}
