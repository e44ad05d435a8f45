// SPDX-FileCopyrightText: 2026 PRR Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Client tier review.
//!
//! After every payment and every finished communication the owning client's
//! tier is reviewed against its balance (paid minus debt, summed over its
//! terminals) and its current communication streak:
//!
//! - Normal → Gold when the balance exceeds `gold_promotion_balance`
//! - Gold or Platinum → Normal when the balance is negative
//! - Gold → Platinum after `platinum_video_streak` consecutive videos
//! - Platinum → Gold after `gold_text_streak` consecutive texts

use prr_config::model::TierConfig;
use prr_core::{ClientType, CommunicationKind};

/// Run of consecutive communications of the same kind sent by a client.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Streak {
    kind: Option<CommunicationKind>,
    length: u32,
}

impl Streak {
    pub fn record(&mut self, kind: CommunicationKind) {
        if self.kind == Some(kind) {
            self.length += 1;
        } else {
            self.kind = Some(kind);
            self.length = 1;
        }
    }

    /// Length of the current run if it is of `kind`, else 0.
    pub fn of(&self, kind: CommunicationKind) -> u32 {
        if self.kind == Some(kind) { self.length } else { 0 }
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

/// Thresholds for moving clients between tiers.
#[derive(Debug, Clone)]
pub struct TierRules {
    gold_promotion_balance: f64,
    platinum_video_streak: u32,
    gold_text_streak: u32,
}

impl TierRules {
    pub fn from_config(config: &TierConfig) -> Self {
        Self {
            gold_promotion_balance: config.gold_promotion_balance,
            platinum_video_streak: config.platinum_video_streak,
            gold_text_streak: config.gold_text_streak,
        }
    }

    /// The tier a client of `current` tier should have now.
    pub fn review(&self, current: ClientType, balance: f64, streak: &Streak) -> ClientType {
        match current {
            ClientType::Normal if balance > self.gold_promotion_balance => ClientType::Gold,
            ClientType::Gold | ClientType::Platinum if balance < 0.0 => ClientType::Normal,
            ClientType::Gold
                if streak.of(CommunicationKind::Video) >= self.platinum_video_streak =>
            {
                ClientType::Platinum
            }
            ClientType::Platinum
                if streak.of(CommunicationKind::Text) >= self.gold_text_streak =>
            {
                ClientType::Gold
            }
            unchanged => unchanged,
        }
    }
}

impl Default for TierRules {
    fn default() -> Self {
        Self::from_config(&TierConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn streak_of(kind: CommunicationKind, n: u32) -> Streak {
        let mut streak = Streak::default();
        for _ in 0..n {
            streak.record(kind);
        }
        streak
    }

    #[test]
    fn streak_restarts_on_kind_change() {
        let mut streak = streak_of(CommunicationKind::Video, 3);
        assert_eq!(streak.of(CommunicationKind::Video), 3);
        streak.record(CommunicationKind::Text);
        assert_eq!(streak.of(CommunicationKind::Video), 0);
        assert_eq!(streak.of(CommunicationKind::Text), 1);
        streak.reset();
        assert_eq!(streak, Streak::default());
    }

    #[test]
    fn normal_promotes_to_gold_above_threshold() {
        let rules = TierRules::default();
        let none = Streak::default();
        assert_eq!(rules.review(ClientType::Normal, 500.0, &none), ClientType::Normal);
        assert_eq!(rules.review(ClientType::Normal, 500.5, &none), ClientType::Gold);
    }

    #[test]
    fn negative_balance_demotes_to_normal() {
        let rules = TierRules::default();
        let videos = streak_of(CommunicationKind::Video, 10);
        assert_eq!(rules.review(ClientType::Gold, -1.0, &videos), ClientType::Normal);
        assert_eq!(
            rules.review(ClientType::Platinum, -0.5, &Streak::default()),
            ClientType::Normal
        );
    }

    #[test]
    fn video_streak_promotes_gold_to_platinum() {
        let rules = TierRules::default();
        assert_eq!(
            rules.review(ClientType::Gold, 0.0, &streak_of(CommunicationKind::Video, 4)),
            ClientType::Gold
        );
        assert_eq!(
            rules.review(ClientType::Gold, 0.0, &streak_of(CommunicationKind::Video, 5)),
            ClientType::Platinum
        );
    }

    #[test]
    fn text_streak_moves_platinum_to_gold() {
        let rules = TierRules::default();
        assert_eq!(
            rules.review(ClientType::Platinum, 10.0, &streak_of(CommunicationKind::Text, 2)),
            ClientType::Gold
        );
        assert_eq!(
            rules.review(ClientType::Platinum, 10.0, &streak_of(CommunicationKind::Voice, 9)),
            ClientType::Platinum
        );
    }
}
