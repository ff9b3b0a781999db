use super::identity::Identity;
use crate::error::{EscrowError, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// A registered seller. Immutable once created; there is no de-registration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Seller {
    /// Registration sequence number, starting at 0.
    pub seq: u64,
    pub address: Identity,
    pub registered: bool,
}

/// Tracks which addresses are registered sellers, in registration order.
#[derive(Debug, Default, Clone)]
pub struct SellerRegistry {
    sellers: Vec<Seller>,
    index: HashSet<Identity>,
}

impl SellerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds the seller record `caller` would get on registration, without
    /// recording it.
    pub fn stage(&self, caller: &Identity) -> Result<Seller> {
        if self.is_registered(caller) {
            return Err(EscrowError::AlreadyRegistered(caller.clone()));
        }
        Ok(Seller {
            seq: self.sellers.len() as u64,
            address: caller.clone(),
            registered: true,
        })
    }

    /// Checks that `seller` may be recorded as registration number `seq`,
    /// without recording it.
    pub fn check(&self, seller: &Seller, seq: u64) -> Result<()> {
        if !seller.registered {
            return Err(EscrowError::InternalError(
                format!("seller record for {} is not marked registered", seller.address).into(),
            ));
        }
        if self.is_registered(&seller.address) {
            return Err(EscrowError::AlreadyRegistered(seller.address.clone()));
        }
        if seller.seq != seq {
            return Err(EscrowError::InternalError(
                format!(
                    "seller {} has sequence {}, expected {}",
                    seller.address, seller.seq, seq
                )
                .into(),
            ));
        }
        Ok(())
    }

    /// Records a seller. Fails if the address is already registered, the
    /// record is out of sequence or not marked registered.
    pub fn insert(&mut self, seller: Seller) -> Result<()> {
        self.check(&seller, self.total_sellers())?;
        self.index.insert(seller.address.clone());
        self.sellers.push(seller);
        Ok(())
    }

    pub fn register(&mut self, caller: &Identity) -> Result<()> {
        let seller = self.stage(caller)?;
        self.insert(seller)
    }

    pub fn is_registered(&self, addr: &Identity) -> bool {
        self.index.contains(addr)
    }

    pub fn list_sellers(&self) -> Vec<Identity> {
        self.sellers.iter().map(|s| s.address.clone()).collect()
    }

    pub fn sellers(&self) -> &[Seller] {
        &self.sellers
    }

    pub fn total_sellers(&self) -> u64 {
        self.sellers.len() as u64
    }
}
