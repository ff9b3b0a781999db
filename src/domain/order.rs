use super::identity::Identity;
use super::money::Amount;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Sequential order identifier, assigned from 0 and never reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OrderId(pub u64);

impl OrderId {
    pub fn next(self) -> Self {
        Self(self.0 + 1)
    }
}

impl fmt::Display for OrderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Lifecycle of an order.
///
/// ```text
/// Created --confirm--> Confirmed --ask_refund--> RefundAsked --refund--> Refunded
/// Created --delete--> Deleted
/// Created --ask_refund--> Refunded
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderState {
    Created,
    Confirmed,
    Deleted,
    RefundAsked,
    Refunded,
}

impl OrderState {
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Deleted | Self::Refunded)
    }

    /// Whether an order in this state counts toward the escrow's held balance.
    pub fn is_held(self) -> bool {
        matches!(self, Self::Created | Self::RefundAsked)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Created => "created",
            Self::Confirmed => "confirmed",
            Self::Deleted => "deleted",
            Self::RefundAsked => "refund_asked",
            Self::Refunded => "refunded",
        }
    }
}

impl fmt::Display for OrderState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An escrowed purchase between a buyer and a registered seller.
///
/// Only `state` changes after creation; the other fields are private so the
/// rest of the crate can read them but never rewrite them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
    id: OrderId,
    buyer: Identity,
    seller: Identity,
    amount: Amount,
    state: OrderState,
}

impl Order {
    /// Creates a new order in the `Created` state.
    pub fn new(id: OrderId, buyer: Identity, seller: Identity, amount: Amount) -> Self {
        Self {
            id,
            buyer,
            seller,
            amount,
            state: OrderState::Created,
        }
    }

    pub fn id(&self) -> OrderId {
        self.id
    }

    pub fn buyer(&self) -> &Identity {
        &self.buyer
    }

    pub fn seller(&self) -> &Identity {
        &self.seller
    }

    pub fn amount(&self) -> Amount {
        self.amount
    }

    pub fn state(&self) -> OrderState {
        self.state
    }

    /// Returns a copy of this order moved to `state`.
    pub fn with_state(&self, state: OrderState) -> Self {
        Self {
            state,
            ..self.clone()
        }
    }

    /// Whether `addr` is the buyer or the seller of this order.
    pub fn involves(&self, addr: &Identity) -> bool {
        &self.buyer == addr || &self.seller == addr
    }

    pub(crate) fn set_state(&mut self, state: OrderState) {
        self.state = state;
    }
}
