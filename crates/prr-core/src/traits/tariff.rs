// SPDX-FileCopyrightText: 2026 PRR Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Pricing seam.

use crate::communication::Communication;
use crate::types::ClientType;

/// Prices a communication for a client tier.
///
/// Implementations must be pure and total over every kind and unit count:
/// the same inputs always yield the same non-negative amount.
pub trait TariffPolicy: Send + Sync {
    /// Price `communication`, whose units are already set, for a client of `client_type`.
    fn price(&self, communication: &Communication, client_type: ClientType) -> f64;
}
