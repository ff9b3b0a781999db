use super::operation::{Operation, Outcome};
use crate::config::EscrowConfig;
use crate::domain::access::{self, Action};
use crate::domain::account::{FundsAccount, FundsBook};
use crate::domain::identity::Identity;
use crate::domain::ledger::OrderLedger;
use crate::domain::money::{Amount, Balance};
use crate::domain::order::{Order, OrderId, OrderState};
use crate::domain::ports::{ChangeSet, LedgerStoreBox};
use crate::domain::seller::SellerRegistry;
use crate::error::{EscrowError, Result};
use rust_decimal::Decimal;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

/// Committed in-memory view of the ledger.
#[derive(Debug, Default)]
struct LedgerState {
    registry: SellerRegistry,
    ledger: OrderLedger,
    book: FundsBook,
}

impl LedgerState {
    /// Checks a whole change set against this state without touching it.
    /// A change set that passes always applies cleanly.
    fn validate(&self, changes: &ChangeSet) -> Result<()> {
        let mut staged: Vec<&Identity> = Vec::new();
        let mut seq = self.registry.total_sellers();
        for seller in &changes.sellers {
            if staged.contains(&&seller.address) {
                return Err(EscrowError::AlreadyRegistered(seller.address.clone()));
            }
            self.registry.check(seller, seq)?;
            staged.push(&seller.address);
            seq += 1;
        }

        let mut next = self.ledger.next_id();
        for order in &changes.orders {
            if !self.registry.is_registered(order.seller()) && !staged.contains(&order.seller()) {
                return Err(EscrowError::NotRegisteredSeller(order.seller().clone()));
            }
            self.ledger.check(order, next)?;
            if order.id() == next {
                next = next.next();
            }
        }
        Ok(())
    }

    /// Applies a change set, all of it or none of it.
    fn apply(&mut self, changes: ChangeSet) -> Result<()> {
        self.validate(&changes)?;
        for seller in changes.sellers {
            self.registry.insert(seller)?;
        }
        for order in changes.orders {
            self.ledger.upsert(order)?;
        }
        for account in changes.accounts {
            self.book.store(account);
        }
        Ok(())
    }
}

/// One funds movement. `None` on either side is the escrow itself.
struct Transfer<'a> {
    from: Option<&'a Identity>,
    to: Option<&'a Identity>,
    amount: Balance,
}

/// Posts `transfers` against the committed accounts and returns every
/// account that changed, without touching `book`.
fn post(book: &FundsBook, transfers: &[Transfer<'_>]) -> Vec<FundsAccount> {
    let mut touched: Vec<FundsAccount> = Vec::new();
    let mut entry = |holder: &Identity| -> usize {
        match touched.iter().position(|a| &a.holder == holder) {
            Some(i) => i,
            None => {
                touched.push(book.account(holder));
                touched.len() - 1
            }
        }
    };
    let mut legs = Vec::new();
    for transfer in transfers {
        if let Some(from) = transfer.from {
            legs.push((entry(from), -transfer.amount));
        }
        if let Some(to) = transfer.to {
            legs.push((entry(to), transfer.amount));
        }
    }
    for (i, delta) in legs {
        if delta < Balance::ZERO {
            touched[i].debit(-delta);
        } else {
            touched[i].credit(delta);
        }
    }
    touched
}

/// The escrow façade.
///
/// `EscrowEngine` owns the committed ledger state behind a single lock.
/// Mutating operations hold the write lock for their whole duration: they
/// validate against the committed state, stage a [`ChangeSet`], commit it to
/// the store and only then apply it in memory. A failed check or a failed
/// commit leaves everything untouched. Queries take the read lock and always
/// see fully applied operations.
pub struct EscrowEngine {
    store: LedgerStoreBox,
    state: RwLock<LedgerState>,
    config: EscrowConfig,
}

impl EscrowEngine {
    /// Opens an engine over `store`, rebuilding the ledger from whatever the
    /// store already holds.
    ///
    /// # Arguments
    ///
    /// * `store` - The persistence backend.
    /// * `config` - Owner and amount precision.
    pub async fn open(store: LedgerStoreBox, config: EscrowConfig) -> Result<Self> {
        let recovered = ChangeSet {
            sellers: store.sellers().await?,
            orders: store.orders().await?,
            accounts: store.accounts().await?,
        };
        let mut state = LedgerState::default();
        state.apply(recovered)?;

        info!(
            owner = %config.owner,
            sellers = state.registry.total_sellers(),
            orders = state.ledger.total_orders(),
            "escrow ledger opened"
        );

        Ok(Self {
            store,
            state: RwLock::new(state),
            config,
        })
    }

    pub fn owner(&self) -> &Identity {
        &self.config.owner
    }

    /// Dispatches an operation to the matching typed method.
    pub async fn execute(&self, op: Operation) -> Result<Outcome> {
        match op {
            Operation::RegisterSeller { caller } => {
                self.register_seller(&caller).await?;
                Ok(Outcome::SellerRegistered(caller))
            }
            Operation::CreateOrder {
                caller,
                seller,
                amount,
            } => self
                .create_order(&caller, &seller, amount)
                .await
                .map(Outcome::OrderCreated),
            Operation::ConfirmOrder { caller, order } => self.confirm_order(&caller, order).await,
            Operation::DeleteOrder { caller, order } => self.delete_order(&caller, order).await,
            Operation::AskRefund { caller, order } => self.ask_refund(&caller, order).await,
            Operation::RefundBuyer {
                caller,
                order,
                sent,
            } => self.refund_buyer(&caller, order, sent).await,
        }
    }

    /// Registers `caller` as a seller. A second registration always fails.
    pub async fn register_seller(&self, caller: &Identity) -> Result<()> {
        let mut state = self.state.write().await;
        let seller = state.registry.stage(caller)?;
        let changes = ChangeSet {
            sellers: vec![seller],
            ..ChangeSet::default()
        };
        self.commit(&mut state, changes).await?;
        info!(seller = %caller, "seller registered");
        Ok(())
    }

    /// Places an order: the buyer deposits exactly `amount` into custody and
    /// the order is recorded as `Created`, in one step.
    pub async fn create_order(
        &self,
        caller: &Identity,
        seller: &Identity,
        amount: Decimal,
    ) -> Result<OrderId> {
        let mut state = self.state.write().await;
        if !state.registry.is_registered(seller) {
            return Err(EscrowError::NotRegisteredSeller(seller.clone()));
        }
        let amount = self.validate_amount(amount)?;

        let id = state.ledger.next_id();
        let order = Order::new(id, caller.clone(), seller.clone(), amount);
        let accounts = post(
            &state.book,
            &[Transfer {
                from: Some(caller),
                to: None,
                amount: amount.into(),
            }],
        );
        let changes = ChangeSet {
            orders: vec![order],
            accounts,
            ..ChangeSet::default()
        };
        self.commit(&mut state, changes).await?;

        info!(order = %id, buyer = %caller, seller = %seller, %amount, "order created");
        Ok(id)
    }

    /// Buyer confirms receipt; the held amount is released to the seller.
    pub async fn confirm_order(&self, caller: &Identity, id: OrderId) -> Result<Outcome> {
        self.transition(Action::Confirm, caller, id, None).await
    }

    /// Seller cancels an unconfirmed order; the held amount returns to the buyer.
    pub async fn delete_order(&self, caller: &Identity, id: OrderId) -> Result<Outcome> {
        self.transition(Action::Delete, caller, id, None).await
    }

    /// Buyer asks for a refund.
    ///
    /// While the order is `Created` the escrow still holds the funds, so the
    /// buyer is refunded immediately and the order becomes `Refunded`. Once
    /// `Confirmed` the funds are with the seller: no funds move and the order
    /// becomes `RefundAsked`, awaiting [`refund_buyer`](Self::refund_buyer).
    pub async fn ask_refund(&self, caller: &Identity, id: OrderId) -> Result<Outcome> {
        self.transition(Action::AskRefund, caller, id, None).await
    }

    /// Seller repays a buyer who asked for a refund after confirmation.
    ///
    /// `sent` must equal the order amount exactly. Otherwise the payment is
    /// handed back to the seller and the call fails with `AmountMismatch`.
    pub async fn refund_buyer(
        &self,
        caller: &Identity,
        id: OrderId,
        sent: Decimal,
    ) -> Result<Outcome> {
        self.transition(Action::RefundBuyer, caller, id, Some(sent))
            .await
    }

    async fn transition(
        &self,
        action: Action,
        caller: &Identity,
        id: OrderId,
        sent: Option<Decimal>,
    ) -> Result<Outcome> {
        let mut state = self.state.write().await;
        let order = state.ledger.require(id)?;
        let from = order.state();
        let to = access::authorize(action, caller, order)?;
        let amount = Balance::from(order.amount());

        let changes = {
            let transfers = match (action, to) {
                (Action::Confirm, _) => vec![Transfer {
                    from: None,
                    to: Some(order.seller()),
                    amount,
                }],
                (Action::Delete, _) | (Action::AskRefund, OrderState::Refunded) => vec![Transfer {
                    from: None,
                    to: Some(order.buyer()),
                    amount,
                }],
                (Action::AskRefund, _) => Vec::new(),
                (Action::RefundBuyer, _) => {
                    let sent = sent.unwrap_or(Decimal::ZERO);
                    if sent != amount.value() {
                        warn!(
                            order = %id,
                            seller = %caller,
                            %sent,
                            expected = %amount,
                            "refund amount mismatch, payment returned to sender"
                        );
                        return Err(EscrowError::AmountMismatch {
                            order: id,
                            expected: amount.value(),
                            sent,
                        });
                    }
                    vec![Transfer {
                        from: Some(order.seller()),
                        to: Some(order.buyer()),
                        amount,
                    }]
                }
            };
            ChangeSet {
                orders: vec![order.with_state(to)],
                accounts: post(&state.book, &transfers),
                ..ChangeSet::default()
            }
        };
        debug!(order = %id, %action, %from, %to, "transition staged");
        self.commit(&mut state, changes).await?;

        info!(order = %id, caller = %caller, %from, %to, %amount, "order {action}");
        Ok(Outcome::Transitioned { order: id, from, to })
    }

    /// Validates `changes`, persists them, then applies them to the in-memory
    /// state. Nothing is written or applied if validation or the store
    /// commit fails.
    async fn commit(&self, state: &mut LedgerState, changes: ChangeSet) -> Result<()> {
        state.validate(&changes)?;
        self.store.commit(changes.clone()).await?;
        state.apply(changes)
    }

    fn validate_amount(&self, value: Decimal) -> Result<Amount> {
        let amount = Amount::new(value)?;
        if value.normalize().scale() > self.config.amount_scale {
            return Err(EscrowError::InvalidAmount(value));
        }
        Ok(amount)
    }

    pub async fn get_order(&self, id: OrderId) -> Result<Order> {
        let state = self.state.read().await;
        state.ledger.require(id).cloned()
    }

    /// Every order ever created, in creation order.
    pub async fn get_orders(&self) -> Vec<Order> {
        self.state.read().await.ledger.all().to_vec()
    }

    pub async fn orders_of(&self, addr: &Identity) -> Result<Vec<Order>> {
        let state = self.state.read().await;
        state.ledger.orders_of(addr, &state.registry)
    }

    /// Funds currently held by the escrow.
    pub async fn get_balance(&self) -> Balance {
        self.state.read().await.ledger.held_balance()
    }

    pub async fn get_total_orders(&self) -> u64 {
        self.state.read().await.ledger.total_orders()
    }

    pub async fn get_total_sellers(&self) -> u64 {
        self.state.read().await.registry.total_sellers()
    }

    pub async fn list_sellers(&self) -> Vec<Identity> {
        self.state.read().await.registry.list_sellers()
    }

    pub async fn is_registered(&self, addr: &Identity) -> bool {
        self.state.read().await.registry.is_registered(addr)
    }

    /// Net position of `holder` against the escrow.
    pub async fn balance_of(&self, holder: &Identity) -> Balance {
        self.state.read().await.book.balance_of(holder)
    }

    pub async fn accounts(&self) -> Vec<FundsAccount> {
        self.state.read().await.book.all()
    }
}
