use crate::domain::identity::Identity;
use crate::domain::order::{OrderId, OrderState};
use rust_decimal::Decimal;

/// A mutating request from the client layer, carrying the resolved caller.
#[derive(Debug, Clone, PartialEq)]
pub enum Operation {
    RegisterSeller {
        caller: Identity,
    },
    CreateOrder {
        caller: Identity,
        seller: Identity,
        amount: Decimal,
    },
    ConfirmOrder {
        caller: Identity,
        order: OrderId,
    },
    DeleteOrder {
        caller: Identity,
        order: OrderId,
    },
    AskRefund {
        caller: Identity,
        order: OrderId,
    },
    RefundBuyer {
        caller: Identity,
        order: OrderId,
        sent: Decimal,
    },
}

impl Operation {
    pub fn caller(&self) -> &Identity {
        match self {
            Operation::RegisterSeller { caller }
            | Operation::CreateOrder { caller, .. }
            | Operation::ConfirmOrder { caller, .. }
            | Operation::DeleteOrder { caller, .. }
            | Operation::AskRefund { caller, .. }
            | Operation::RefundBuyer { caller, .. } => caller,
        }
    }
}

/// What a committed operation changed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    SellerRegistered(Identity),
    OrderCreated(OrderId),
    Transitioned {
        order: OrderId,
        from: OrderState,
        to: OrderState,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_caller_is_reported_for_every_operation() {
        let caller = Identity::from("0xb1");
        let ops = [
            Operation::RegisterSeller {
                caller: caller.clone(),
            },
            Operation::CreateOrder {
                caller: caller.clone(),
                seller: Identity::from("0xs1"),
                amount: dec!(0.1),
            },
            Operation::ConfirmOrder {
                caller: caller.clone(),
                order: OrderId(0),
            },
            Operation::DeleteOrder {
                caller: caller.clone(),
                order: OrderId(0),
            },
            Operation::AskRefund {
                caller: caller.clone(),
                order: OrderId(0),
            },
            Operation::RefundBuyer {
                caller: caller.clone(),
                order: OrderId(0),
                sent: dec!(0.1),
            },
        ];
        assert!(ops.iter().all(|op| op.caller() == &caller));
    }
}
