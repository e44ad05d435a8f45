// SPDX-FileCopyrightText: 2026 PRR Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Pricing and client tiers for the PRR network.
//!
//! This crate provides:
//! - **Tariff table**: the configurable [`TariffPolicy`](prr_core::TariffPolicy)
//!   that prices texts by length band and sessions per unit of duration
//! - **Tier rules**: promotion and demotion of clients between Normal, Gold,
//!   and Platinum based on balance and communication streaks

pub mod pricing;
pub mod tiers;

pub use pricing::TariffTable;
pub use tiers::{Streak, TierRules};
