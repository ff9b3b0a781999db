use super::identity::Identity;
use super::money::Balance;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Net position of one participant against the escrow.
///
/// Payments into the escrow debit the balance and payouts credit it, so a
/// buyer with an open order sits below zero until the order is settled.
#[derive(Debug, Serialize, Deserialize, PartialEq, Eq, Clone)]
pub struct FundsAccount {
    pub holder: Identity,
    pub balance: Balance,
}

impl FundsAccount {
    pub fn new(holder: Identity) -> Self {
        Self {
            holder,
            balance: Balance::ZERO,
        }
    }

    /// Records funds paid out of the escrow to the holder.
    pub fn credit(&mut self, amount: Balance) {
        self.balance += amount;
    }

    /// Records funds paid by the holder into (or through) the escrow.
    pub fn debit(&mut self, amount: Balance) {
        self.balance -= amount;
    }
}

/// All participant accounts, keyed by holder.
#[derive(Debug, Default, Clone)]
pub struct FundsBook {
    accounts: BTreeMap<Identity, FundsAccount>,
}

impl FundsBook {
    pub fn new() -> Self {
        Self::default()
    }

    /// The holder's account, or a fresh zero account if it has never moved funds.
    pub fn account(&self, holder: &Identity) -> FundsAccount {
        self.accounts
            .get(holder)
            .cloned()
            .unwrap_or_else(|| FundsAccount::new(holder.clone()))
    }

    pub fn balance_of(&self, holder: &Identity) -> Balance {
        self.accounts
            .get(holder)
            .map(|a| a.balance)
            .unwrap_or(Balance::ZERO)
    }

    pub fn store(&mut self, account: FundsAccount) {
        self.accounts.insert(account.holder.clone(), account);
    }

    pub fn all(&self) -> Vec<FundsAccount> {
        self.accounts.values().cloned().collect()
    }
}
