use escrow_ledger::domain::money::Balance;
use escrow_ledger::domain::order::{OrderId, OrderState};
use escrow_ledger::error::EscrowError;
use rust_decimal_macros::dec;
use std::collections::HashSet;
use std::sync::Arc;

mod common;
use common::{ORDER_0, empty_engine, expected_held, id, marketplace};

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_racing_confirms_apply_once() {
    let engine = Arc::new(marketplace().await);

    let handles: Vec<_> = (0..16)
        .map(|_| {
            let engine = Arc::clone(&engine);
            tokio::spawn(async move { engine.confirm_order(&id("buyer1"), ORDER_0).await })
        })
        .collect();

    let mut applied = 0;
    for handle in handles {
        match handle.await.unwrap() {
            Ok(_) => applied += 1,
            Err(e) => assert!(matches!(e, EscrowError::InvalidState { .. })),
        }
    }

    assert_eq!(applied, 1);
    assert_eq!(
        engine.balance_of(&id("seller1")).await,
        Balance::new(dec!(0.1))
    );
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_confirm_and_delete_race_has_one_winner() {
    let engine = Arc::new(empty_engine().await);
    engine.register_seller(&id("s1")).await.unwrap();
    for _ in 0..20 {
        engine
            .create_order(&id("b1"), &id("s1"), dec!(1))
            .await
            .unwrap();
    }

    let mut handles = Vec::new();
    for i in 0..20 {
        let order = OrderId(i);
        let confirm = Arc::clone(&engine);
        let delete = Arc::clone(&engine);
        handles.push(tokio::spawn(async move {
            confirm.confirm_order(&id("b1"), order).await.is_ok()
        }));
        handles.push(tokio::spawn(async move {
            delete.delete_order(&id("s1"), order).await.is_ok()
        }));
    }
    let mut results = Vec::new();
    for handle in handles {
        results.push(handle.await.unwrap());
    }

    for pair in results.chunks(2) {
        assert!(pair[0] ^ pair[1], "exactly one of confirm/delete must win");
    }

    let orders = engine.get_orders().await;
    let confirmed = orders
        .iter()
        .filter(|o| o.state() == OrderState::Confirmed)
        .count() as i64;
    let deleted = orders
        .iter()
        .filter(|o| o.state() == OrderState::Deleted)
        .count() as i64;
    assert_eq!(confirmed + deleted, 20);
    assert_eq!(
        engine.balance_of(&id("s1")).await,
        Balance::new(confirmed.into())
    );
    assert_eq!(
        engine.balance_of(&id("b1")).await,
        Balance::new((-confirmed).into())
    );
    assert_eq!(engine.get_balance().await, Balance::ZERO);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_creates_get_unique_ids() {
    let engine = Arc::new(empty_engine().await);
    engine.register_seller(&id("s1")).await.unwrap();

    let handles: Vec<_> = (0..50)
        .map(|i| {
            let engine = Arc::clone(&engine);
            tokio::spawn(async move {
                let buyer = id(&format!("b{i}"));
                engine.create_order(&buyer, &id("s1"), dec!(0.01)).await
            })
        })
        .collect();

    let mut ids = HashSet::new();
    for handle in handles {
        ids.insert(handle.await.unwrap().unwrap());
    }

    assert_eq!(ids.len(), 50);
    assert!(ids.iter().all(|id| id.0 < 50));
    assert_eq!(engine.get_total_orders().await, 50);
    assert_eq!(engine.get_balance().await, Balance::new(dec!(0.5)));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_readers_never_see_partial_transitions() {
    let engine = Arc::new(marketplace().await);

    let reader = {
        let engine = Arc::clone(&engine);
        tokio::spawn(async move {
            let legal = [dec!(0.6), dec!(0.5), dec!(0.3), dec!(0)].map(Balance::new);
            let mut last = Balance::new(dec!(0.6));
            for _ in 0..200 {
                let held = engine.get_balance().await;
                assert!(legal.contains(&held), "observed partial state: {held}");
                assert!(held <= last);
                last = held;
                tokio::task::yield_now().await;
            }
        })
    };

    engine.confirm_order(&id("buyer1"), ORDER_0).await.unwrap();
    engine.ask_refund(&id("buyer2"), OrderId(1)).await.unwrap();
    engine
        .delete_order(&id("seller1"), OrderId(2))
        .await
        .unwrap();

    reader.await.unwrap();
    assert_eq!(engine.get_balance().await, expected_held(&engine).await);
    assert_eq!(engine.get_balance().await, Balance::ZERO);
}
