use super::identity::Identity;
use super::money::Balance;
use super::order::{Order, OrderId, OrderState};
use super::seller::SellerRegistry;
use crate::error::{EscrowError, Result};

/// Owns every order ever created, indexed by id.
///
/// Orders are never removed: ids are assigned contiguously from 0, so the
/// position in `orders` is the id. The held balance is always recomputed
/// from the records rather than tracked in a separate counter.
#[derive(Debug, Default, Clone)]
pub struct OrderLedger {
    orders: Vec<Order>,
}

impl OrderLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// The id the next inserted order must carry.
    pub fn next_id(&self) -> OrderId {
        OrderId(self.orders.len() as u64)
    }

    /// Appends a new order. The order must carry `next_id()`.
    pub fn insert(&mut self, order: Order) -> Result<()> {
        let expected = self.next_id();
        if order.id() != expected {
            return Err(EscrowError::InternalError(
                format!("order {} inserted out of sequence, expected {}", order.id(), expected)
                    .into(),
            ));
        }
        self.orders.push(order);
        Ok(())
    }

    pub fn get(&self, id: OrderId) -> Option<&Order> {
        usize::try_from(id.0).ok().and_then(|i| self.orders.get(i))
    }

    /// Like [`get`](Self::get) but reports unknown ids as `NotFound`.
    pub fn require(&self, id: OrderId) -> Result<&Order> {
        self.get(id).ok_or(EscrowError::NotFound(id))
    }

    pub fn set_state(&mut self, id: OrderId, state: OrderState) -> Result<()> {
        let order = usize::try_from(id.0)
            .ok()
            .and_then(|i| self.orders.get_mut(i))
            .ok_or(EscrowError::NotFound(id))?;
        order.set_state(state);
        Ok(())
    }

    /// Checks that `order` may be applied when `next` is the next free id:
    /// a new record must carry `next`, an existing one must keep its
    /// identity fields.
    pub fn check(&self, order: &Order, next: OrderId) -> Result<()> {
        match self.get(order.id()) {
            None if order.id() == next => Ok(()),
            None => Err(EscrowError::InternalError(
                format!("order {} inserted out of sequence, expected {}", order.id(), next).into(),
            )),
            Some(existing) => {
                if existing.buyer() != order.buyer()
                    || existing.seller() != order.seller()
                    || existing.amount() != order.amount()
                {
                    return Err(EscrowError::InternalError(
                        format!("order {} immutable fields changed", order.id()).into(),
                    ));
                }
                Ok(())
            }
        }
    }

    /// Applies a staged order record: appends it if new, otherwise moves the
    /// existing record to the staged state.
    pub fn upsert(&mut self, order: Order) -> Result<()> {
        self.check(&order, self.next_id())?;
        if self.get(order.id()).is_some() {
            self.set_state(order.id(), order.state())
        } else {
            self.insert(order)
        }
    }

    /// Sum of the amounts of all orders in a held state.
    pub fn held_balance(&self) -> Balance {
        self.orders
            .iter()
            .filter(|o| o.state().is_held())
            .map(|o| Balance::from(o.amount()))
            .sum()
    }

    pub fn all(&self) -> &[Order] {
        &self.orders
    }

    pub fn total_orders(&self) -> u64 {
        self.orders.len() as u64
    }

    pub fn has_buyer(&self, addr: &Identity) -> bool {
        self.orders.iter().any(|o| o.buyer() == addr)
    }

    /// All orders where `addr` is buyer or seller, in creation order.
    ///
    /// An address must be a registered seller or the buyer of at least one
    /// order to be queried.
    pub fn orders_of(&self, addr: &Identity, registry: &SellerRegistry) -> Result<Vec<Order>> {
        if !registry.is_registered(addr) && !self.has_buyer(addr) {
            return Err(EscrowError::UnregisteredUser(addr.clone()));
        }
        Ok(self
            .orders
            .iter()
            .filter(|o| o.involves(addr))
            .cloned()
            .collect())
    }
}
