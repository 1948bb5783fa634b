use std::sync::Arc;

use me_core::engine::arena::SystemAllocator;
use me_core::engine::dispatcher::{Channels, EngineContext};
use me_core::engine::types::{Order, OrderType, Side};

/// Quickly generate a limit order for testing.
pub fn make_limit_order(id: u64, side: Side, price: i64, qty: i64, ts: u64) -> Order {
    Order::new(side, qty, OrderType::Limit, price, id, ts)
}

/// Quickly generate a market order for testing.
pub fn make_market_order(id: u64, side: Side, qty: i64, ts: u64) -> Order {
    Order::new(side, qty, OrderType::Market, 0, id, ts)
}

/// Boots a small single-worker engine suitable for deterministic
/// request/response assertions (spec.md §8's "deterministic function of
/// the input sequence given a fixed worker count = 1").
pub fn small_engine(n_securities: usize) -> EngineContext {
    EngineContext::init(
        1 << 20,
        n_securities,
        Arc::new(SystemAllocator),
        Channels::bounded(4096),
        None,
    )
    .expect("small test engine should always init")
    .with_worker_count(1)
}
