// SPDX-FileCopyrightText: 2026 PRR Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Clients: owners of terminals and receivers of availability notifications.

use std::collections::BTreeSet;
use std::fmt;

use prr_config::model::NetworkConfig;
use prr_core::types::rounded;
use prr_core::{
    ClientKey, ClientType, CommunicationKind, DeliveryMethod, Notification, PrrError, TerminalKey,
};
use prr_tariff::Streak;

#[derive(Debug, Clone)]
pub struct Client {
    key: ClientKey,
    name: String,
    tax_id: u32,
    client_type: ClientType,
    notifications_enabled: bool,
    delivery: DeliveryMethod,
    terminals: BTreeSet<TerminalKey>,
    inbox: Vec<Notification>,
    streak: Streak,
}

impl Client {
    /// A new Normal client with notification settings taken from `defaults`.
    pub fn new(
        key: ClientKey,
        name: impl Into<String>,
        tax_id: u32,
        defaults: &NetworkConfig,
    ) -> Self {
        Self {
            key,
            name: name.into(),
            tax_id,
            client_type: ClientType::Normal,
            notifications_enabled: defaults.notifications_enabled,
            delivery: defaults.delivery,
            terminals: BTreeSet::new(),
            inbox: Vec::new(),
            streak: Streak::default(),
        }
    }

    pub fn key(&self) -> &ClientKey {
        &self.key
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn tax_id(&self) -> u32 {
        self.tax_id
    }

    pub fn client_type(&self) -> ClientType {
        self.client_type
    }

    pub fn notifications_enabled(&self) -> bool {
        self.notifications_enabled
    }

    pub fn delivery(&self) -> DeliveryMethod {
        self.delivery
    }

    pub fn terminals(&self) -> &BTreeSet<TerminalKey> {
        &self.terminals
    }

    /// Notifications queued and not yet read.
    pub fn pending_notifications(&self) -> &[Notification] {
        &self.inbox
    }

    pub fn streak(&self) -> &Streak {
        &self.streak
    }

    pub fn enable_notifications(&mut self) -> Result<(), PrrError> {
        if self.notifications_enabled {
            return Err(PrrError::NotificationsAlreadyEnabled {
                key: self.key.clone(),
            });
        }
        self.notifications_enabled = true;
        Ok(())
    }

    pub fn disable_notifications(&mut self) -> Result<(), PrrError> {
        if !self.notifications_enabled {
            return Err(PrrError::NotificationsAlreadyDisabled {
                key: self.key.clone(),
            });
        }
        self.notifications_enabled = false;
        Ok(())
    }

    pub fn set_delivery(&mut self, delivery: DeliveryMethod) {
        self.delivery = delivery;
    }

    /// Queue a notification. Dropped when notifications are disabled.
    pub fn notify(&mut self, notification: Notification) -> bool {
        if !self.notifications_enabled {
            return false;
        }
        self.inbox.push(notification);
        true
    }

    /// Drain the queue. Reading is what marks notifications delivered.
    pub fn take_notifications(&mut self) -> Vec<Notification> {
        std::mem::take(&mut self.inbox)
    }

    pub(crate) fn add_terminal(&mut self, key: TerminalKey) {
        self.terminals.insert(key);
    }

    pub(crate) fn record_communication(&mut self, kind: CommunicationKind) {
        self.streak.record(kind);
    }

    /// Install a new tier. A change restarts the streak.
    pub(crate) fn set_client_type(&mut self, client_type: ClientType) -> bool {
        if self.client_type == client_type {
            return false;
        }
        self.client_type = client_type;
        self.streak.reset();
        true
    }

    /// The client record, with balances aggregated over its terminals.
    pub fn record(&self, paid: f64, debt: f64) -> ClientRecord<'_> {
        ClientRecord {
            client: self,
            paid,
            debt,
        }
    }
}

/// `CLIENT|key|name|taxId|TIER|YES/NO|terminals|debt|paid`.
pub struct ClientRecord<'a> {
    client: &'a Client,
    paid: f64,
    debt: f64,
}

impl fmt::Display for ClientRecord<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let c = self.client;
        write!(
            f,
            "CLIENT|{}|{}|{}|{}|{}|{}|{}|{}",
            c.key,
            c.name,
            c.tax_id,
            c.client_type,
            if c.notifications_enabled { "YES" } else { "NO" },
            c.terminals.len(),
            rounded(self.debt),
            rounded(self.paid)
        )
    }
}

#[cfg(test)]
mod tests {
    use prr_core::NotificationKind;

    use super::*;

    fn client() -> Client {
        Client::new("c1".into(), "Ana", 123, &NetworkConfig::default())
    }

    fn note(kind: NotificationKind) -> Notification {
        Notification {
            terminal: "t1".into(),
            kind,
        }
    }

    #[test]
    fn record_form() {
        let mut c = client();
        c.add_terminal("t1".into());
        assert_eq!(
            c.record(20.4, 9.6).to_string(),
            "CLIENT|c1|Ana|123|NORMAL|YES|1|10|20"
        );
        c.disable_notifications().unwrap();
        assert!(c.record(0.0, 0.0).to_string().contains("|NO|"));
    }

    #[test]
    fn toggling_notifications_twice_fails() {
        let mut c = client();
        assert!(matches!(
            c.enable_notifications(),
            Err(PrrError::NotificationsAlreadyEnabled { .. })
        ));
        c.disable_notifications().unwrap();
        assert!(matches!(
            c.disable_notifications(),
            Err(PrrError::NotificationsAlreadyDisabled { .. })
        ));
        c.enable_notifications().unwrap();
    }

    #[test]
    fn disabled_clients_drop_notifications() {
        let mut c = client();
        c.disable_notifications().unwrap();
        assert!(!c.notify(note(NotificationKind::OffToIdle)));
        assert!(c.pending_notifications().is_empty());
    }

    #[test]
    fn reading_drains_the_queue_in_order() {
        let mut c = client();
        c.notify(note(NotificationKind::OffToIdle));
        c.notify(note(NotificationKind::BusyToSilent));
        let read = c.take_notifications();
        assert_eq!(read.len(), 2);
        assert_eq!(read[0].kind, NotificationKind::OffToIdle);
        assert!(c.take_notifications().is_empty());
    }

    #[test]
    fn tier_change_restarts_streak() {
        let mut c = client();
        c.record_communication(CommunicationKind::Video);
        assert!(!c.set_client_type(ClientType::Normal));
        assert_eq!(c.streak().of(CommunicationKind::Video), 1);
        assert!(c.set_client_type(ClientType::Gold));
        assert_eq!(c.streak().of(CommunicationKind::Video), 0);
    }

    #[test]
    fn defaults_come_from_network_config() {
        let defaults = NetworkConfig {
            notifications_enabled: false,
            delivery: DeliveryMethod::Immediate,
        };
        let c = Client::new("c2".into(), "Rui", 7, &defaults);
        assert!(!c.notifications_enabled());
        assert_eq!(c.delivery(), DeliveryMethod::Immediate);
        assert_eq!(c.client_type(), ClientType::Normal);
    }
}
