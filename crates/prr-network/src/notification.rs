// SPDX-FileCopyrightText: 2026 PRR Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Notification fan-out and delivery.

use std::collections::BTreeMap;

use prr_core::{
    ClientKey, DeliveryMethod, Notification, NotificationKind, NotificationSink, TerminalKey,
};

use crate::client::Client;

/// Queue one record per observer, in subscription order.
///
/// Observers that are no longer registered or have notifications disabled
/// are skipped. Returns the number queued.
pub(crate) fn dispatch(
    terminal: &TerminalKey,
    kind: NotificationKind,
    observers: &[ClientKey],
    clients: &mut BTreeMap<ClientKey, Client>,
) -> usize {
    let mut queued = 0;
    for key in observers {
        let Some(client) = clients.get_mut(key) else {
            continue;
        };
        if client.notify(Notification {
            terminal: terminal.clone(),
            kind,
        }) {
            queued += 1;
        }
    }
    queued
}

/// Hand every queued notification of immediate-delivery clients to `sink`.
pub(crate) fn deliver_immediate<'a>(
    clients: impl Iterator<Item = &'a mut Client>,
    sink: &mut dyn NotificationSink,
) -> usize {
    let mut delivered = 0;
    for client in clients.filter(|c| c.delivery() == DeliveryMethod::Immediate) {
        for notification in client.take_notifications() {
            sink.deliver(client.key(), &notification);
            delivered += 1;
        }
    }
    delivered
}

#[cfg(test)]
mod tests {
    use prr_config::model::NetworkConfig;

    use super::*;

    fn clients() -> BTreeMap<ClientKey, Client> {
        let defaults = NetworkConfig::default();
        ["c1", "c2", "c3"]
            .into_iter()
            .map(|k| (ClientKey::from(k), Client::new(k.into(), k, 1, &defaults)))
            .collect()
    }

    #[test]
    fn skips_disabled_and_unknown_observers() {
        let mut clients = clients();
        clients
            .get_mut("c2")
            .unwrap()
            .disable_notifications()
            .unwrap();
        let observers: Vec<ClientKey> = vec!["c3".into(), "c2".into(), "ghost".into(), "c1".into()];

        let queued = dispatch(
            &"t9".into(),
            NotificationKind::SilentToIdle,
            &observers,
            &mut clients,
        );
        assert_eq!(queued, 2);
        assert_eq!(clients["c1"].pending_notifications().len(), 1);
        assert!(clients["c2"].pending_notifications().is_empty());
        assert_eq!(
            clients["c3"].pending_notifications()[0].to_string(),
            "S2I|t9"
        );
    }

    #[test]
    fn only_immediate_clients_are_flushed() {
        let mut clients = clients();
        clients
            .get_mut("c1")
            .unwrap()
            .set_delivery(DeliveryMethod::Immediate);
        let observers: Vec<ClientKey> = vec!["c1".into(), "c2".into()];
        dispatch(&"t1".into(), NotificationKind::OffToIdle, &observers, &mut clients);

        let mut sink: Vec<(ClientKey, Notification)> = Vec::new();
        let delivered = deliver_immediate(clients.values_mut(), &mut sink);
        assert_eq!(delivered, 1);
        assert_eq!(sink[0].0, ClientKey::from("c1"));
        assert!(clients["c1"].pending_notifications().is_empty());
        assert_eq!(clients["c2"].pending_notifications().len(), 1);
    }
}
