mod common;

use crate::common::small_engine;
use me_core::engine::codec;
use me_core::engine::types::{MessageBody, Message, Order, OrderType, Side};

fn new_order(security_id: i64, order: Order) -> Vec<u8> {
    codec::encode(&Message::new(security_id, MessageBody::NewOrder(order)))
}

#[test]
fn test_lifecycle_initial_order_is_echoed_before_any_match() {
    let engine = small_engine(1);
    let channels = engine.channels().clone();

    channels
        .request_tx
        .send(new_order(0, Order::new(Side::Buy, 10, OrderType::Limit, 100, 1, 1000)))
        .unwrap();
    channels
        .request_tx
        .send(codec::encode(&Message::new(0, MessageBody::Panic)))
        .unwrap();

    engine.run();

    let first = codec::decode(&channels.response_rx.try_recv().unwrap()).unwrap();
    assert!(matches!(first.body, MessageBody::NewOrder(o) if o.order_id == 1));
}

#[test]
fn test_lifecycle_full_match_emits_trade_then_executed_for_both_sides() {
    let engine = small_engine(1);
    let channels = engine.channels().clone();

    channels
        .request_tx
        .send(new_order(0, Order::new(Side::Sell, 10, OrderType::Limit, 100, 1, 1000)))
        .unwrap();
    channels
        .request_tx
        .send(new_order(0, Order::new(Side::Buy, 10, OrderType::Limit, 100, 2, 1001)))
        .unwrap();
    channels
        .request_tx
        .send(codec::encode(&Message::new(0, MessageBody::Panic)))
        .unwrap();

    engine.run();

    let mut received = Vec::new();
    while let Ok(raw) = channels.response_rx.try_recv() {
        received.push(codec::decode(&raw).unwrap());
    }

    assert!(received.iter().any(|m| matches!(m.body, MessageBody::Trade(t) if t.matched_id == 1)));
    let executed_ids: Vec<_> = received
        .iter()
        .filter_map(|m| match m.body {
            MessageBody::OrderExecuted(o) => Some(o.order_id),
            _ => None,
        })
        .collect();
    assert!(executed_ids.contains(&1));
    assert!(executed_ids.contains(&2));
}

#[test]
fn test_lifecycle_cancelled_order_never_matches() {
    let engine = small_engine(1);
    let channels = engine.channels().clone();

    channels
        .request_tx
        .send(new_order(0, Order::new(Side::Buy, 10, OrderType::Limit, 100, 1, 1000)))
        .unwrap();
    channels
        .request_tx
        .send(codec::encode(&Message::new(0, MessageBody::CancelOrder(1))))
        .unwrap();
    channels
        .request_tx
        .send(new_order(0, Order::new(Side::Sell, 10, OrderType::Limit, 100, 2, 1001)))
        .unwrap();
    channels
        .request_tx
        .send(codec::encode(&Message::new(0, MessageBody::Panic)))
        .unwrap();

    engine.run();

    let mut received = Vec::new();
    while let Ok(raw) = channels.response_rx.try_recv() {
        received.push(codec::decode(&raw).unwrap());
    }
    assert!(!received.iter().any(|m| matches!(m.body, MessageBody::Trade(_))));
}

#[test]
fn test_lifecycle_shutdown_panic_is_the_final_response_record() {
    let engine = small_engine(1);
    let channels = engine.channels().clone();

    channels
        .request_tx
        .send(codec::encode(&Message::new(0, MessageBody::Panic)))
        .unwrap();

    engine.run();

    let mut received = Vec::new();
    while let Ok(raw) = channels.response_rx.try_recv() {
        received.push(codec::decode(&raw).unwrap());
    }
    assert!(matches!(received.last().unwrap().body, MessageBody::Panic));
}

#[test]
fn test_lifecycle_multiple_securities_stay_independent() {
    let engine = small_engine(3);
    let channels = engine.channels().clone();

    channels
        .request_tx
        .send(new_order(0, Order::new(Side::Sell, 5, OrderType::Limit, 50, 1, 1)))
        .unwrap();
    channels
        .request_tx
        .send(new_order(1, Order::new(Side::Sell, 5, OrderType::Limit, 50, 2, 2)))
        .unwrap();
    channels
        .request_tx
        .send(new_order(0, Order::new(Side::Buy, 5, OrderType::Limit, 50, 3, 3)))
        .unwrap();
    channels
        .request_tx
        .send(codec::encode(&Message::new(0, MessageBody::Panic)))
        .unwrap();

    engine.run();

    let mut received = Vec::new();
    while let Ok(raw) = channels.response_rx.try_recv() {
        received.push(codec::decode(&raw).unwrap());
    }

    let security_0_trades = received
        .iter()
        .filter(|m| m.security_id == 0 && matches!(m.body, MessageBody::Trade(_)))
        .count();
    let security_1_trades = received
        .iter()
        .filter(|m| m.security_id == 1 && matches!(m.body, MessageBody::Trade(_)))
        .count();
    assert_eq!(security_0_trades, 1);
    assert_eq!(security_1_trades, 0, "security 1's resting sell never saw an aggressor");
}
