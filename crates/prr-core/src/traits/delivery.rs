// SPDX-FileCopyrightText: 2026 PRR Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Notification delivery seam.
//!
//! The network only ever enqueues notifications on clients. Clients that ask
//! for immediate delivery have their queue drained into a sink supplied by
//! the command layer after each command.

use crate::types::{ClientKey, Notification};

/// Receives notifications drained from clients with immediate delivery.
pub trait NotificationSink {
    fn deliver(&mut self, client: &ClientKey, notification: &Notification);
}

/// Collects deliveries in order; used by tests and batch tooling.
impl NotificationSink for Vec<(ClientKey, Notification)> {
    fn deliver(&mut self, client: &ClientKey, notification: &Notification) {
        self.push((client.clone(), notification.clone()));
    }
}
