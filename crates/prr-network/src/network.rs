// SPDX-FileCopyrightText: 2026 PRR Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The network coordinator.
//!
//! Owns every client and terminal, assigns communication ids, and runs each
//! command to completion: all preconditions are checked before anything is
//! mutated, so an `Err` leaves the network exactly as it was. Every
//! successful mutation raises the dirty flag for a persistence layer.

use std::collections::BTreeMap;
use std::fmt;

use serde::Serialize;
use tracing::{debug, info};

use prr_config::PrrConfig;
use prr_config::model::NetworkConfig;
use prr_core::state::availability_change;
use prr_core::types::rounded;
use prr_core::{
    ClientKey, ClientType, Communication, CommunicationId, CommunicationKind, DeliveryMethod,
    InteractiveKind, Notification, NotificationSink, Participants, PrrError, StateTag,
    TariffPolicy, TerminalKey, TerminalKind, TerminalState,
};
use prr_tariff::{TariffTable, TierRules};

use crate::client::Client;
use crate::notification;
use crate::terminal::{ActiveSession, Terminal};

/// Characters that would break the pipe-delimited record forms.
const RESERVED_KEY_CHARS: [char; 2] = ['|', ','];

/// Paid and debt totals, for one client or the whole network.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct Balance {
    pub paid: f64,
    pub debt: f64,
}

impl Balance {
    pub fn net(&self) -> f64 {
        self.paid - self.debt
    }

    fn of<'a>(terminals: impl Iterator<Item = &'a Terminal>) -> Self {
        terminals.fold(Self::default(), |acc, t| Self {
            paid: acc.paid + t.paid(),
            debt: acc.debt + t.debt(),
        })
    }
}

pub struct Network {
    clients: BTreeMap<ClientKey, Client>,
    terminals: BTreeMap<TerminalKey, Terminal>,
    /// Which terminal's log owns each communication.
    senders: BTreeMap<CommunicationId, TerminalKey>,
    tariff: Box<dyn TariffPolicy>,
    tiers: TierRules,
    defaults: NetworkConfig,
    next_id: u32,
    dirty: bool,
}

impl fmt::Debug for Network {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Network")
            .field("clients", &self.clients.len())
            .field("terminals", &self.terminals.len())
            .field("communications", &self.senders.len())
            .field("dirty", &self.dirty)
            .finish_non_exhaustive()
    }
}

impl Default for Network {
    fn default() -> Self {
        Self::new(&PrrConfig::default())
    }
}

impl Network {
    /// A network priced by the configured tariff table.
    pub fn new(config: &PrrConfig) -> Self {
        Self::with_policy(
            Box::new(TariffTable::from_config(&config.tariff)),
            TierRules::from_config(&config.tiers),
            config.network.clone(),
        )
    }

    pub fn with_policy(
        tariff: Box<dyn TariffPolicy>,
        tiers: TierRules,
        defaults: NetworkConfig,
    ) -> Self {
        Self {
            clients: BTreeMap::new(),
            terminals: BTreeMap::new(),
            senders: BTreeMap::new(),
            tariff,
            tiers,
            defaults,
            next_id: 1,
            dirty: false,
        }
    }

    // --- registry ---

    pub fn register_client(&mut self, key: &str, name: &str, tax_id: u32) -> Result<(), PrrError> {
        validate_key(key)?;
        if self.clients.contains_key(key) {
            return Err(PrrError::DuplicateClientKey { key: key.into() });
        }
        let client = Client::new(key.into(), name, tax_id, &self.defaults);
        self.clients.insert(key.into(), client);
        info!(client = key, "client registered");
        self.mark_dirty();
        Ok(())
    }

    /// Register a terminal in a resting state (On, Off, or Silent).
    pub fn register_terminal(
        &mut self,
        key: &str,
        kind: TerminalKind,
        owner: &str,
        state: StateTag,
    ) -> Result<(), PrrError> {
        validate_key(key)?;
        if self.terminals.contains_key(key) {
            return Err(PrrError::DuplicateTerminalKey { key: key.into() });
        }
        let Some(initial) = TerminalState::resting(state) else {
            return Err(PrrError::InvalidTransition {
                key: key.into(),
                from: StateTag::On,
                to: state,
            });
        };
        let client = self
            .clients
            .get_mut(owner)
            .ok_or_else(|| PrrError::unknown_client(owner))?;

        client.add_terminal(key.into());
        self.terminals.insert(
            key.into(),
            Terminal::new(key.into(), kind, owner.into(), initial),
        );
        info!(terminal = key, client = owner, %kind, %state, "terminal registered");
        self.mark_dirty();
        Ok(())
    }

    pub fn lookup_terminal(&self, key: &str) -> Result<&Terminal, PrrError> {
        self.terminals
            .get(key)
            .ok_or_else(|| PrrError::unknown_terminal(key))
    }

    pub fn lookup_client(&self, key: &str) -> Result<&Client, PrrError> {
        self.clients
            .get(key)
            .ok_or_else(|| PrrError::unknown_client(key))
    }

    fn terminal_mut(&mut self, key: &str) -> Result<&mut Terminal, PrrError> {
        self.terminals
            .get_mut(key)
            .ok_or_else(|| PrrError::unknown_terminal(key))
    }

    fn client_mut(&mut self, key: &str) -> Result<&mut Client, PrrError> {
        self.clients
            .get_mut(key)
            .ok_or_else(|| PrrError::unknown_client(key))
    }

    fn owner_type(&self, terminal: &Terminal) -> Result<ClientType, PrrError> {
        Ok(self.lookup_client(terminal.owner().as_str())?.client_type())
    }

    // --- dirty signal ---

    pub fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Called by whatever persisted the network.
    pub fn mark_clean(&mut self) {
        self.dirty = false;
    }

    // --- communications ---

    /// Send a text from `origin` to `dest`. Returns its exact price, which is
    /// added to the origin's debt.
    pub fn send_text(&mut self, origin: &str, dest: &str, message: &str) -> Result<f64, PrrError> {
        let sender = self.lookup_terminal(origin)?;
        let receiver = self.lookup_terminal(dest)?;
        sender.check_can_start()?;
        receiver.check_can_receive_text()?;

        let client_type = self.owner_type(sender)?;
        let id = CommunicationId(self.next_id);
        let participants = Participants {
            sender: sender.key().clone(),
            receiver: receiver.key().clone(),
            between_friends: sender.is_friend(receiver.key()),
        };
        let owner = sender.owner().clone();
        let communication =
            Communication::text(id, participants, message, self.tariff.as_ref(), client_type);
        let price = communication.price().unwrap_or_default();

        let sender = self.terminal_mut(origin)?;
        sender.record_sent(communication);
        self.terminal_mut(dest)?.record_received(id);
        self.senders.insert(id, origin.into());
        self.next_id += 1;

        debug!(%id, terminal = origin, receiver = dest, price, "text sent");
        self.review_tier(&owner, Some(CommunicationKind::Text))?;
        self.mark_dirty();
        Ok(price)
    }

    /// Start a voice or video session. Both ends become Busy until the
    /// originator ends it.
    pub fn send_interactive(
        &mut self,
        origin: &str,
        dest: &str,
        kind: InteractiveKind,
    ) -> Result<CommunicationId, PrrError> {
        let sender = self.lookup_terminal(origin)?;
        let receiver = self.lookup_terminal(dest)?;
        sender.check_can_start()?;
        if sender.key() == receiver.key() {
            return Err(PrrError::Unavailable {
                key: receiver.key().clone(),
                state: StateTag::Busy,
            });
        }
        sender.check_supports(kind)?;
        receiver.check_can_receive_interactive(kind)?;

        let sender_busy = sender.occupied_state()?;
        let receiver_busy = receiver.occupied_state()?;
        let id = CommunicationId(self.next_id);
        let participants = Participants {
            sender: sender.key().clone(),
            receiver: receiver.key().clone(),
            between_friends: sender.is_friend(receiver.key()),
        };

        let sender = self.terminal_mut(origin)?;
        sender.record_sent(Communication::interactive(id, participants, kind));
        sender.enter_session(
            sender_busy,
            ActiveSession {
                id,
                originator: true,
            },
        );
        let receiver = self.terminal_mut(dest)?;
        receiver.record_received(id);
        receiver.enter_session(
            receiver_busy,
            ActiveSession {
                id,
                originator: false,
            },
        );
        self.senders.insert(id, origin.into());
        self.next_id += 1;

        debug!(%id, terminal = origin, receiver = dest, %kind, "session started");
        self.mark_dirty();
        Ok(id)
    }

    /// End the session `origin` started, after `units` of duration.
    ///
    /// Returns the rounded price; the exact price is added to the debt.
    pub fn end_active_communication(&mut self, origin: &str, units: u32) -> Result<i64, PrrError> {
        let terminal = self.lookup_terminal(origin)?;
        let client_type = self.owner_type(terminal)?;
        let owner = terminal.owner().clone();

        let terminal = self
            .terminals
            .get_mut(origin)
            .ok_or_else(|| PrrError::unknown_terminal(origin))?;
        let (price, session) =
            terminal.close_session(units, self.tariff.as_ref(), client_type)?;
        let (kind, receiver) = terminal
            .sent_communication(session.id)
            .map(|c| (c.kind(), c.receiver().clone()))
            .ok_or(PrrError::NoActiveCommunication)?;
        let restored = terminal.state().tag();

        self.announce(origin, StateTag::Busy, restored);
        if let Some(peer) = self.terminals.get_mut(receiver.as_str()) {
            if peer.leave_session(session.id) {
                let restored = peer.state().tag();
                self.announce(receiver.as_str(), StateTag::Busy, restored);
            }
        }

        debug!(id = %session.id, terminal = origin, units, price, "session ended");
        self.review_tier(&owner, Some(kind))?;
        self.mark_dirty();
        Ok(rounded(price))
    }

    /// Pay communication `id`, which must have been sent by `origin`.
    pub fn pay_communication(&mut self, origin: &str, id: CommunicationId) -> Result<(), PrrError> {
        let owner = self.lookup_terminal(origin)?.owner().clone();
        self.lookup_client(owner.as_str())?;
        let price = self.terminal_mut(origin)?.pay(id)?;

        debug!(%id, terminal = origin, price, "communication paid");
        self.review_tier(&owner, None)?;
        self.mark_dirty();
        Ok(())
    }

    // --- terminal management ---

    pub fn change_state(&mut self, key: &str, state: StateTag) -> Result<(), PrrError> {
        let from = self.terminal_mut(key)?.change_state(state)?;
        debug!(terminal = key, %from, to = %state, "state changed");
        self.announce(key, from, state);
        self.mark_dirty();
        Ok(())
    }

    /// Returns false when nothing changed (self or already a friend).
    pub fn add_friend(&mut self, key: &str, friend: &str) -> Result<bool, PrrError> {
        self.lookup_terminal(friend)?;
        let added = self.terminal_mut(key)?.add_friend(friend.into());
        if added {
            self.mark_dirty();
        }
        Ok(added)
    }

    /// Returns false when `friend` was not a friend.
    pub fn remove_friend(&mut self, key: &str, friend: &str) -> Result<bool, PrrError> {
        self.lookup_terminal(friend)?;
        let removed = self.terminal_mut(key)?.remove_friend(&friend.into());
        if removed {
            self.mark_dirty();
        }
        Ok(removed)
    }

    // --- notifications ---

    /// Ask to be told the next time `terminal` becomes more available.
    pub fn subscribe(&mut self, terminal: &str, client: &str) -> Result<(), PrrError> {
        self.lookup_client(client)?;
        if self.terminal_mut(terminal)?.add_observer(client.into()) {
            debug!(terminal, client, "observer subscribed");
            self.mark_dirty();
        }
        Ok(())
    }

    pub fn enable_notifications(&mut self, client: &str) -> Result<(), PrrError> {
        self.client_mut(client)?.enable_notifications()?;
        self.mark_dirty();
        Ok(())
    }

    pub fn disable_notifications(&mut self, client: &str) -> Result<(), PrrError> {
        self.client_mut(client)?.disable_notifications()?;
        self.mark_dirty();
        Ok(())
    }

    pub fn set_delivery(&mut self, client: &str, delivery: DeliveryMethod) -> Result<(), PrrError> {
        self.client_mut(client)?.set_delivery(delivery);
        self.mark_dirty();
        Ok(())
    }

    /// Read and clear a client's queued notifications.
    pub fn take_notifications(&mut self, client: &str) -> Result<Vec<Notification>, PrrError> {
        let client = self.client_mut(client)?;
        let notifications = client.take_notifications();
        if !notifications.is_empty() {
            self.mark_dirty();
        }
        Ok(notifications)
    }

    /// Hand the queues of immediate-delivery clients to `sink`.
    pub fn flush_notifications(&mut self, sink: &mut dyn NotificationSink) -> usize {
        let delivered = notification::deliver_immediate(self.clients.values_mut(), sink);
        if delivered > 0 {
            debug!(delivered, "notifications delivered");
            self.mark_dirty();
        }
        delivered
    }

    fn announce(&mut self, key: &str, from: StateTag, to: StateTag) {
        let Some(kind) = availability_change(from, to) else {
            return;
        };
        if let Some(terminal) = self.terminals.get_mut(key) {
            let queued = terminal.notify_observers(kind, &mut self.clients);
            if queued > 0 {
                debug!(terminal = key, %kind, queued, "observers notified");
            }
        }
    }

    // --- tiers ---

    fn review_tier(
        &mut self,
        owner: &ClientKey,
        kind: Option<CommunicationKind>,
    ) -> Result<(), PrrError> {
        let balance = self.client_balance(owner.as_str())?;
        let rules = &self.tiers;
        let client = self
            .clients
            .get_mut(owner.as_str())
            .ok_or_else(|| PrrError::unknown_client(owner.as_str()))?;
        if let Some(kind) = kind {
            client.record_communication(kind);
        }
        let current = client.client_type();
        let next = rules.review(current, balance.net(), client.streak());
        if client.set_client_type(next) {
            info!(client = %owner, from = %current, to = %next, "client tier changed");
        }
        Ok(())
    }

    // --- queries ---

    pub fn clients(&self) -> impl Iterator<Item = &Client> {
        self.clients.values()
    }

    pub fn terminals(&self) -> impl Iterator<Item = &Terminal> {
        self.terminals.values()
    }

    pub fn unused_terminals(&self) -> impl Iterator<Item = &Terminal> {
        self.terminals().filter(|t| t.is_unused())
    }

    pub fn terminals_with_positive_balance(&self) -> impl Iterator<Item = &Terminal> {
        self.terminals().filter(|t| t.balance() > 0.0)
    }

    pub fn clients_with_debt(&self) -> impl Iterator<Item = &Client> {
        self.clients().filter(|c| self.balance_of(c).debt > 0.0)
    }

    pub fn clients_without_debt(&self) -> impl Iterator<Item = &Client> {
        self.clients().filter(|c| self.balance_of(c).debt <= 0.0)
    }

    pub fn communication(&self, id: CommunicationId) -> Option<&Communication> {
        let sender = self.senders.get(&id)?;
        self.terminals.get(sender)?.sent_communication(id)
    }

    /// Every communication, in id order.
    pub fn communications(&self) -> Vec<&Communication> {
        self.senders
            .keys()
            .filter_map(|id| self.communication(*id))
            .collect()
    }

    /// Communications sent by the client's terminals, in id order.
    pub fn communications_from_client(&self, key: &str) -> Result<Vec<&Communication>, PrrError> {
        let client = self.lookup_client(key)?;
        let mut sent: Vec<&Communication> = self
            .owned_terminals(client)
            .flat_map(|t| t.sent().iter())
            .collect();
        sent.sort_by_key(|c| c.id());
        Ok(sent)
    }

    /// Communications received by the client's terminals, in id order.
    pub fn communications_to_client(&self, key: &str) -> Result<Vec<&Communication>, PrrError> {
        let client = self.lookup_client(key)?;
        let mut received: Vec<&Communication> = self
            .owned_terminals(client)
            .flat_map(|t| t.received().iter())
            .filter_map(|id| self.communication(*id))
            .collect();
        received.sort_by_key(|c| c.id());
        Ok(received)
    }

    /// Sum of the balances of the client's terminals.
    pub fn client_balance(&self, key: &str) -> Result<Balance, PrrError> {
        Ok(self.balance_of(self.lookup_client(key)?))
    }

    pub fn global_balance(&self) -> Balance {
        Balance::of(self.terminals.values())
    }

    pub fn client_record(&self, key: &str) -> Result<String, PrrError> {
        let client = self.lookup_client(key)?;
        let balance = self.balance_of(client);
        Ok(client.record(balance.paid, balance.debt).to_string())
    }

    fn balance_of(&self, client: &Client) -> Balance {
        Balance::of(self.owned_terminals(client))
    }

    fn owned_terminals<'a>(&'a self, client: &'a Client) -> impl Iterator<Item = &'a Terminal> {
        client
            .terminals()
            .iter()
            .filter_map(|key| self.terminals.get(key))
    }
}

fn validate_key(key: &str) -> Result<(), PrrError> {
    let reason = if key.trim().is_empty() {
        "key must not be empty"
    } else if key.contains(RESERVED_KEY_CHARS) {
        "key must not contain `|` or `,`"
    } else {
        return Ok(());
    };
    Err(PrrError::InvalidKey {
        key: key.to_string(),
        reason: reason.to_string(),
    })
}
