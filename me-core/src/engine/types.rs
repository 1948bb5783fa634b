//! Wire-level data model: orders, trades, messages, and the side-aware
//! price-time comparator.

/// Client-assigned, per-security-unique order identifier.
pub type OrderId = u64;

/// Security identifier as carried on the wire (`i64`, see `codec`).
pub type SecurityId = i64;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    Buy,
    Sell,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrderType {
    Market,
    Limit,
}

/// An order as carried on the wire and resident in a `Book`.
///
/// `quantity` and `price` are signed: quantity is semantically non-negative
/// on input but is allowed to go transiently `<= 0` mid-sweep (see
/// `matching`), matching the source's mixed signed/unsigned convention.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Order {
    pub side: Side,
    pub quantity: i64,
    pub order_type: OrderType,
    pub price: i64,
    pub order_id: OrderId,
    pub timestamp: u64,
}

impl Order {
    pub fn new(
        side: Side,
        quantity: i64,
        order_type: OrderType,
        price: i64,
        order_id: OrderId,
        timestamp: u64,
    ) -> Self {
        Self {
            side,
            quantity,
            order_type,
            price,
            order_id,
            timestamp,
        }
    }
}

/// A trade event. The wire format has no separate execution-price field;
/// `aggressor.price` is overwritten with the resting order's price and
/// `aggressor.quantity` with the quantity actually traded on this leg
/// before the `Trade` is built (see `matching::run_sweep`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Trade {
    pub aggressor: Order,
    pub matched_id: OrderId,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageBody {
    NewOrder(Order),
    CancelOrder(OrderId),
    SetMarketPrice(i64),
    Trade(Trade),
    OrderExecuted(Order),
    Panic,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Message {
    pub security_id: SecurityId,
    pub body: MessageBody,
}

impl Message {
    pub fn new(security_id: SecurityId, body: MessageBody) -> Self {
        Self { security_id, body }
    }
}

/// Side-aware "better than" comparator used by `Book`. BUY favors higher
/// price, SELL favors lower price; both favor earlier timestamps on ties.
pub trait PriceTimeOrder: Send + Sync + 'static {
    fn is_better(a: &Order, b: &Order) -> bool;
}

pub struct BuySide;
pub struct SellSide;

impl PriceTimeOrder for BuySide {
    fn is_better(a: &Order, b: &Order) -> bool {
        a.price > b.price || (a.price == b.price && a.timestamp < b.timestamp)
    }
}

impl PriceTimeOrder for SellSide {
    fn is_better(a: &Order, b: &Order) -> bool {
        a.price < b.price || (a.price == b.price && a.timestamp < b.timestamp)
    }
}
