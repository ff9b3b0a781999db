#![allow(dead_code)]

use escrow_ledger::application::engine::EscrowEngine;
use escrow_ledger::config::EscrowConfig;
use escrow_ledger::domain::identity::Identity;
use escrow_ledger::domain::money::Balance;
use escrow_ledger::domain::order::{OrderId, OrderState};
use escrow_ledger::infrastructure::in_memory::InMemoryLedgerStore;
use rust_decimal_macros::dec;
use std::io::Write;
use tempfile::NamedTempFile;

pub fn id(address: &str) -> Identity {
    Identity::from(address)
}

pub async fn empty_engine() -> EscrowEngine {
    EscrowEngine::open(Box::new(InMemoryLedgerStore::new()), EscrowConfig::default())
        .await
        .expect("Failed to open engine")
}

/// Two registered sellers and three open orders, all to seller1:
/// order 0 (buyer1, 0.1), order 1 (buyer2, 0.2), order 2 (buyer2, 0.3).
pub async fn marketplace() -> EscrowEngine {
    let engine = empty_engine().await;
    engine.register_seller(&id("seller1")).await.unwrap();
    engine.register_seller(&id("seller2")).await.unwrap();
    for (buyer, amount) in [("buyer1", dec!(0.1)), ("buyer2", dec!(0.2)), ("buyer2", dec!(0.3))] {
        engine
            .create_order(&id(buyer), &id("seller1"), amount)
            .await
            .unwrap();
    }
    engine
}

pub const ORDER_0: OrderId = OrderId(0);
pub const ORDER_1: OrderId = OrderId(1);
pub const ORDER_2: OrderId = OrderId(2);

/// Recomputes the held balance from the order list: every order still
/// `Created` or waiting on a seller refund.
pub async fn expected_held(engine: &EscrowEngine) -> Balance {
    engine
        .get_orders()
        .await
        .iter()
        .filter(|o| matches!(o.state(), OrderState::Created | OrderState::RefundAsked))
        .map(|o| Balance::from(o.amount()))
        .sum()
}

/// Writes a command file with the standard header followed by `rows`.
pub fn command_file(rows: &[&str]) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    writeln!(file, "op, caller, counterparty, order, amount").unwrap();
    for row in rows {
        writeln!(file, "{row}").unwrap();
    }
    file
}
