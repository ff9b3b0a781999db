use crate::domain::access::{Action, Role};
use crate::domain::identity::Identity;
use crate::domain::order::{OrderId, OrderState};
use rust_decimal::Decimal;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum EscrowError {
    #[error("{0} is already registered as a seller")]
    AlreadyRegistered(Identity),
    #[error("{0} is not a registered seller")]
    NotRegisteredSeller(Identity),
    #[error("Invalid amount {0}: deposits must be positive")]
    InvalidAmount(Decimal),
    #[error("Order {0} not found")]
    NotFound(OrderId),
    #[error("{caller} is not the {required} of order {order}")]
    Unauthorized {
        caller: Identity,
        order: OrderId,
        required: Role,
    },
    #[error("Cannot {action} order {order} while it is {state}")]
    InvalidState {
        order: OrderId,
        state: OrderState,
        action: Action,
    },
    #[error("Refund for order {order} must be exactly {expected}, got {sent}")]
    AmountMismatch {
        order: OrderId,
        expected: Decimal,
        sent: Decimal,
    },
    #[error("{0} is not registered in our platform")]
    UnregisteredUser(Identity),
    #[error("Malformed command: {0}")]
    MalformedCommand(String),
    #[error("CSV error: {0}")]
    CsvError(#[from] csv::Error),
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),
    #[cfg(feature = "storage-rocksdb")]
    #[error("Storage error: {0}")]
    StorageError(#[from] rocksdb::Error),
    #[error("Internal error: {0}")]
    InternalError(Box<dyn std::error::Error + Send + Sync>),
}

impl EscrowError {
    /// Whether this error is a rejected operation (a violated precondition)
    /// rather than an infrastructure failure.
    pub fn is_rejection(&self) -> bool {
        matches!(
            self,
            Self::AlreadyRegistered(_)
                | Self::NotRegisteredSeller(_)
                | Self::InvalidAmount(_)
                | Self::NotFound(_)
                | Self::Unauthorized { .. }
                | Self::InvalidState { .. }
                | Self::AmountMismatch { .. }
                | Self::UnregisteredUser(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, EscrowError>;
