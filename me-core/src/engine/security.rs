//! Security context (C3): one buy book, one sell book, the last-trade
//! price, and the lock that serializes mutation of all three.

use std::sync::Arc;

use parking_lot::Mutex;

use super::arena::Allocator;
use super::book::Book;
use super::types::{BuySide, SecurityId, SellSide};

/// The mutable state of one security, guarded as a single unit so the
/// matching core observes a consistent `{buy, sell, market_price}` view
/// under one lock acquisition (spec.md §4.3).
pub struct SecurityState {
    pub buy: Book<BuySide>,
    pub sell: Book<SellSide>,
    pub market_price: i64,
}

pub struct SecurityContext {
    state: Mutex<SecurityState>,
}

impl SecurityContext {
    /// `initial_price` seeds `market_price`. Callers wanting source-exact
    /// fidelity pass `security_id` itself (id 0 ⇒ 0); `EngineContext::init`
    /// additionally accepts an `initial_prices` override (spec.md §9, Open
    /// Question #1).
    pub fn new(segment_capacity: usize, allocator: Arc<dyn Allocator>, initial_price: i64) -> Self {
        Self {
            state: Mutex::new(SecurityState {
                buy: Book::new(segment_capacity, Arc::clone(&allocator)),
                sell: Book::new(segment_capacity, allocator),
                market_price: initial_price,
            }),
        }
    }

    pub fn lock(&self) -> parking_lot::MutexGuard<'_, SecurityState> {
        self.state.lock()
    }
}

/// Source-fidelity seed: `market_price` starts at `security_id` (id 0 ⇒ 0).
pub fn default_initial_price(security_id: SecurityId) -> i64 {
    security_id
}
