//! Access policy for order transitions.
//!
//! Each action on an existing order is allowed for exactly one role and from a
//! fixed set of source states. The table below is the single source of truth
//! for both the permission check and the resulting state.

use super::identity::Identity;
use super::order::{Order, OrderState};
use crate::error::{EscrowError, Result};
use std::fmt;

/// The part a caller plays on a given order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    Buyer,
    Seller,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Role::Buyer => f.write_str("buyer"),
            Role::Seller => f.write_str("seller"),
        }
    }
}

/// A transition requested on an existing order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Confirm,
    Delete,
    AskRefund,
    RefundBuyer,
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Action::Confirm => "confirm",
            Action::Delete => "delete",
            Action::AskRefund => "ask refund",
            Action::RefundBuyer => "refund buyer",
        };
        f.write_str(name)
    }
}

/// (action, required role, from, to)
const POLICY: &[(Action, Role, OrderState, OrderState)] = &[
    (Action::Confirm, Role::Buyer, OrderState::Created, OrderState::Confirmed),
    (Action::Delete, Role::Seller, OrderState::Created, OrderState::Deleted),
    (Action::AskRefund, Role::Buyer, OrderState::Created, OrderState::Refunded),
    (Action::AskRefund, Role::Buyer, OrderState::Confirmed, OrderState::RefundAsked),
    (Action::RefundBuyer, Role::Seller, OrderState::RefundAsked, OrderState::Refunded),
];

impl Action {
    pub fn required_role(self) -> Role {
        match self {
            Action::Confirm | Action::AskRefund => Role::Buyer,
            Action::Delete | Action::RefundBuyer => Role::Seller,
        }
    }

    /// The state this action leads to from `from`, if it is permitted there.
    pub fn transition(self, from: OrderState) -> Option<OrderState> {
        POLICY
            .iter()
            .find(|(action, _, source, _)| *action == self && *source == from)
            .map(|(_, _, _, target)| *target)
    }
}

/// Whether `caller` holds `role` on `order`, compared against the identities
/// stored on the record.
pub fn holds_role(caller: &Identity, order: &Order, role: Role) -> bool {
    match role {
        Role::Buyer => caller == order.buyer(),
        Role::Seller => caller == order.seller(),
    }
}

/// Checks that `caller` may perform `action` on `order` in its current state
/// and returns the state the order moves to.
///
/// The role is checked before the state.
pub fn authorize(action: Action, caller: &Identity, order: &Order) -> Result<OrderState> {
    let required = action.required_role();
    if !holds_role(caller, order, required) {
        return Err(EscrowError::Unauthorized {
            caller: caller.clone(),
            order: order.id(),
            required,
        });
    }
    action
        .transition(order.state())
        .ok_or(EscrowError::InvalidState {
            order: order.id(),
            state: order.state(),
            action,
        })
}
