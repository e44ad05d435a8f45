// SPDX-FileCopyrightText: 2026 PRR Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Seams between the network core and its collaborators.

pub mod delivery;
pub mod tariff;

pub use delivery::NotificationSink;
pub use tariff::TariffPolicy;
