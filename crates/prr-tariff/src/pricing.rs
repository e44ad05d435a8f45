// SPDX-FileCopyrightText: 2026 PRR Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Tariff tables and price calculation.
//!
//! Default tables (currency units):
//!
//! | tier     | text < 50 | text < 100 | text ≥ 100 | voice/unit | video/unit |
//! |----------|-----------|------------|------------|------------|------------|
//! | Normal   | 10        | 16         | 2 × chars  | 20         | 30         |
//! | Gold     | 10        | 10         | 2 × chars  | 10         | 20         |
//! | Platinum | 0         | 4          | 4          | 10         | 10         |
//!
//! Voice and video between friends get the configured discount (50% by default).

use prr_config::model::{TariffConfig, TierTariff};
use prr_core::{ClientType, Communication, CommunicationKind, TariffPolicy};
use tracing::debug;

/// A configurable tariff policy covering every tier.
#[derive(Debug, Clone)]
pub struct TariffTable {
    friend_discount: f64,
    short_text_limit: u32,
    medium_text_limit: u32,
    normal: TierTariff,
    gold: TierTariff,
    platinum: TierTariff,
}

impl TariffTable {
    pub fn from_config(config: &TariffConfig) -> Self {
        debug!(
            friend_discount = config.friend_discount,
            short_text_limit = config.short_text_limit,
            medium_text_limit = config.medium_text_limit,
            "tariff table built"
        );
        Self {
            friend_discount: config.friend_discount,
            short_text_limit: config.short_text_limit,
            medium_text_limit: config.medium_text_limit,
            normal: config.normal,
            gold: config.gold,
            platinum: config.platinum,
        }
    }

    pub fn tier(&self, client_type: ClientType) -> &TierTariff {
        match client_type {
            ClientType::Normal => &self.normal,
            ClientType::Gold => &self.gold,
            ClientType::Platinum => &self.platinum,
        }
    }

    /// Price of a text of `units` characters.
    pub fn text_price(&self, client_type: ClientType, units: u32) -> f64 {
        let tier = self.tier(client_type);
        let band = if units < self.short_text_limit {
            tier.text_short
        } else if units < self.medium_text_limit {
            tier.text_medium
        } else {
            tier.text_long
        };
        band.apply(units)
    }

    /// Price of a closed voice or video session of `units` duration.
    pub fn session_price(
        &self,
        client_type: ClientType,
        kind: CommunicationKind,
        units: u32,
        between_friends: bool,
    ) -> f64 {
        let tier = self.tier(client_type);
        let per_unit = match kind {
            CommunicationKind::Video => tier.video_per_unit,
            CommunicationKind::Voice | CommunicationKind::Text => tier.voice_per_unit,
        };
        let full = per_unit * units as f64;
        if between_friends {
            full * (1.0 - self.friend_discount)
        } else {
            full
        }
    }
}

impl Default for TariffTable {
    fn default() -> Self {
        Self::from_config(&TariffConfig::default())
    }
}

impl TariffPolicy for TariffTable {
    fn price(&self, communication: &Communication, client_type: ClientType) -> f64 {
        let units = communication.units().unwrap_or(0);
        match communication.kind() {
            CommunicationKind::Text => self.text_price(client_type, units),
            kind => self.session_price(
                client_type,
                kind,
                units,
                communication.is_between_friends(),
            ),
        }
    }
}
