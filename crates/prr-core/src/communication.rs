// SPDX-FileCopyrightText: 2026 PRR Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Communication records and their open → finished → paid lifecycle.
//!
//! Text messages are finished and priced the moment they are sent.
//! Interactive sessions start open, with neither units nor price, and are
//! priced exactly once when closed. A record is paid only after it is finished.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::PrrError;
use crate::traits::TariffPolicy;
use crate::types::{
    rounded, ClientType, CommunicationId, CommunicationKind, InteractiveKind, TerminalKey,
};

/// Kind-specific payload of a communication.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Exchange {
    Text { message: String },
    Interactive { kind: InteractiveKind },
}

/// Who talks to whom, fixed when the communication is created.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Participants {
    pub sender: TerminalKey,
    pub receiver: TerminalKey,
    /// The receiver was in the sender's friend set at creation time.
    pub between_friends: bool,
}

/// A single exchange between two terminals.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Communication {
    id: CommunicationId,
    participants: Participants,
    exchange: Exchange,
    units: Option<u32>,
    price: Option<f64>,
    paid: bool,
}

impl Communication {
    /// Create a finished text communication priced against `client_type`.
    ///
    /// Units are the number of characters in the message.
    pub fn text(
        id: CommunicationId,
        participants: Participants,
        message: &str,
        policy: &dyn TariffPolicy,
        client_type: ClientType,
    ) -> Self {
        let mut communication = Self {
            id,
            participants,
            exchange: Exchange::Text {
                message: message.to_string(),
            },
            units: Some(message.chars().count() as u32),
            price: None,
            paid: false,
        };
        communication.price = Some(policy.price(&communication, client_type));
        communication
    }

    /// Create an open interactive communication.
    pub fn interactive(
        id: CommunicationId,
        participants: Participants,
        kind: InteractiveKind,
    ) -> Self {
        Self {
            id,
            participants,
            exchange: Exchange::Interactive { kind },
            units: None,
            price: None,
            paid: false,
        }
    }

    /// Close an open interactive communication after `units` of duration.
    ///
    /// Returns the exact price. Text records and already closed sessions
    /// have nothing to close.
    pub fn close(
        &mut self,
        units: u32,
        policy: &dyn TariffPolicy,
        client_type: ClientType,
    ) -> Result<f64, PrrError> {
        if matches!(self.exchange, Exchange::Text { .. }) || self.is_finished() {
            return Err(PrrError::NoActiveCommunication);
        }
        self.units = Some(units);
        let price = policy.price(self, client_type);
        self.price = Some(price);
        Ok(price)
    }

    pub fn mark_paid(&mut self) -> Result<(), PrrError> {
        if !self.is_finished() || self.paid {
            return Err(PrrError::InvalidPayment { id: self.id });
        }
        self.paid = true;
        Ok(())
    }

    pub fn id(&self) -> CommunicationId {
        self.id
    }

    pub fn sender(&self) -> &TerminalKey {
        &self.participants.sender
    }

    pub fn receiver(&self) -> &TerminalKey {
        &self.participants.receiver
    }

    pub fn is_between_friends(&self) -> bool {
        self.participants.between_friends
    }

    pub fn exchange(&self) -> &Exchange {
        &self.exchange
    }

    pub fn kind(&self) -> CommunicationKind {
        match &self.exchange {
            Exchange::Text { .. } => CommunicationKind::Text,
            Exchange::Interactive { kind } => (*kind).into(),
        }
    }

    /// Characters for text, duration for a closed session, `None` while open.
    pub fn units(&self) -> Option<u32> {
        self.units
    }

    /// Defined once the communication is finished.
    pub fn price(&self) -> Option<f64> {
        self.price
    }

    pub fn is_finished(&self) -> bool {
        self.price.is_some()
    }

    pub fn is_paid(&self) -> bool {
        self.paid
    }
}

/// Record form: `KIND|id|sender|receiver|units|price|ONGOING|FINISHED`.
impl fmt::Display for Communication {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}|{}|{}|{}|{}|{}|{}",
            self.kind(),
            self.id,
            self.participants.sender,
            self.participants.receiver,
            self.units.unwrap_or(0),
            rounded(self.price.unwrap_or(0.0)),
            if self.is_finished() { "FINISHED" } else { "ONGOING" }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// One unit of currency per unit, doubled for Normal clients.
    struct PerUnit;

    impl TariffPolicy for PerUnit {
        fn price(&self, communication: &Communication, client_type: ClientType) -> f64 {
            let units = communication.units().unwrap_or(0) as f64;
            match client_type {
                ClientType::Normal => units * 2.0,
                _ => units,
            }
        }
    }

    fn participants() -> Participants {
        Participants {
            sender: "t1".into(),
            receiver: "t2".into(),
            between_friends: false,
        }
    }

    #[test]
    fn text_is_finished_and_priced_at_creation() {
        let c = Communication::text(
            CommunicationId(1),
            participants(),
            "hello",
            &PerUnit,
            ClientType::Normal,
        );
        assert!(c.is_finished());
        assert!(!c.is_paid());
        assert_eq!(c.units(), Some(5));
        assert_eq!(c.price(), Some(10.0));
        assert_eq!(c.kind(), CommunicationKind::Text);
    }

    #[test]
    fn text_units_count_characters_not_bytes() {
        let c = Communication::text(
            CommunicationId(1),
            participants(),
            "olá",
            &PerUnit,
            ClientType::Gold,
        );
        assert_eq!(c.units(), Some(3));
    }

    #[test]
    fn interactive_is_open_until_closed() {
        let mut c =
            Communication::interactive(CommunicationId(2), participants(), InteractiveKind::Voice);
        assert!(!c.is_finished());
        assert_eq!(c.units(), None);
        assert_eq!(c.price(), None);
        assert_eq!(c.to_string(), "VOICE|2|t1|t2|0|0|ONGOING");

        let price = c.close(30, &PerUnit, ClientType::Gold).unwrap();
        assert!((price - 30.0).abs() < f64::EPSILON);
        assert!(c.is_finished());
        assert_eq!(c.units(), Some(30));
        assert_eq!(c.to_string(), "VOICE|2|t1|t2|30|30|FINISHED");
    }

    #[test]
    fn close_happens_once() {
        let mut c =
            Communication::interactive(CommunicationId(3), participants(), InteractiveKind::Video);
        c.close(10, &PerUnit, ClientType::Normal).unwrap();
        let err = c.close(99, &PerUnit, ClientType::Normal).unwrap_err();
        assert!(matches!(err, PrrError::NoActiveCommunication));
        assert_eq!(c.units(), Some(10));
        assert_eq!(c.price(), Some(20.0));
    }

    #[test]
    fn text_cannot_be_closed() {
        let mut c = Communication::text(
            CommunicationId(4),
            participants(),
            "hi",
            &PerUnit,
            ClientType::Normal,
        );
        assert!(c.close(5, &PerUnit, ClientType::Normal).is_err());
        assert_eq!(c.units(), Some(2));
    }

    #[test]
    fn payment_requires_finished_and_unpaid() {
        let mut open =
            Communication::interactive(CommunicationId(5), participants(), InteractiveKind::Voice);
        assert!(matches!(
            open.mark_paid(),
            Err(PrrError::InvalidPayment { id }) if id == CommunicationId(5)
        ));

        open.close(1, &PerUnit, ClientType::Normal).unwrap();
        open.mark_paid().unwrap();
        assert!(open.is_paid());
        assert!(open.mark_paid().is_err());
    }
}
