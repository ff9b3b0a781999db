use crate::domain::identity::Identity;

/// Fractional digits of the chain's native unit (wei per ether).
pub const DEFAULT_AMOUNT_SCALE: u32 = 18;

/// Identity recorded as owner when none is configured.
pub const DEFAULT_OWNER: &str = "owner";

/// Settings fixed for the lifetime of a ledger.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EscrowConfig {
    /// Identity that deployed the ledger. Informational only.
    pub owner: Identity,
    /// Maximum number of fractional digits accepted in an order amount.
    pub amount_scale: u32,
}

impl Default for EscrowConfig {
    fn default() -> Self {
        Self {
            owner: Identity::from(DEFAULT_OWNER),
            amount_scale: DEFAULT_AMOUNT_SCALE,
        }
    }
}

impl EscrowConfig {
    pub fn with_owner(owner: impl Into<Identity>) -> Self {
        Self {
            owner: owner.into(),
            ..Self::default()
        }
    }
}
