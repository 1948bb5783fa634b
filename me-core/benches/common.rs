use me_core::engine::types::{Order, OrderType, Side};

/// Quickly generate a simple limit order for benchmarking.
pub fn make_limit_order(id: u64, side: Side, price: i64, qty: i64, ts: u64) -> Order {
    Order::new(side, qty, OrderType::Limit, price, id, ts)
}

/// Quickly generate a market order for benchmarking.
pub fn make_market_order(id: u64, side: Side, qty: i64, ts: u64) -> Order {
    Order::new(side, qty, OrderType::Market, 0, id, ts)
}
