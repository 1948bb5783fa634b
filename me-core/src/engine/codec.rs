//! Message codec (C6): fixed-size binary record layout for all in/out
//! messages, per spec.md §6:
//!
//! ```text
//!  0  u32  msg_type        # 0=NEW 1=CANCEL 2=SET_PRICE 3=TRADE 4=EXECUTED 5=PANIC
//!  4  i64  security_id
//! 12  union{ Order | i64 set_price | Trade | u64 to_cancel }  # padded to max variant
//! ```
//! with `Order = {u32 side, i64 quantity, u32 type, i64 price, u64 order_id,
//! u64 timestamp}` and `Trade = {Order aggressor, u64 matched_id}`. The
//! exact byte layout below is this crate's own choice (little-endian,
//! fixed-width fields written in declaration order); the contract only
//! requires the same layout for reader and writer, which a single shared
//! `encode`/`decode` pair trivially guarantees.

use super::types::{Message, MessageBody, Order, OrderType, SecurityId, Side, Trade};

pub mod msg_type {
    pub const NEW_ORDER: u32 = 0;
    pub const CANCEL_ORDER: u32 = 1;
    pub const SET_MARKET_PRICE: u32 = 2;
    pub const TRADE: u32 = 3;
    pub const ORDER_EXECUTED: u32 = 4;
    pub const PANIC: u32 = 5;
}

const ORDER_LEN: usize = 4 + 8 + 4 + 8 + 8 + 8; // side + quantity + type + price + order_id + timestamp
const TRADE_LEN: usize = ORDER_LEN + 8; // aggressor Order + matched_id
const PAYLOAD_LEN: usize = TRADE_LEN; // Trade is the largest variant
const HEADER_LEN: usize = 4 + 8; // msg_type + security_id

/// Total size, in bytes, of every wire record.
pub const MESSAGE_LEN: usize = HEADER_LEN + PAYLOAD_LEN;

fn write_order(buf: &mut [u8], o: &Order) {
    let side: u32 = match o.side {
        Side::Buy => 0,
        Side::Sell => 1,
    };
    let ty: u32 = match o.order_type {
        OrderType::Market => 0,
        OrderType::Limit => 1,
    };
    buf[0..4].copy_from_slice(&side.to_le_bytes());
    buf[4..12].copy_from_slice(&o.quantity.to_le_bytes());
    buf[12..16].copy_from_slice(&ty.to_le_bytes());
    buf[16..24].copy_from_slice(&o.price.to_le_bytes());
    buf[24..32].copy_from_slice(&o.order_id.to_le_bytes());
    buf[32..40].copy_from_slice(&o.timestamp.to_le_bytes());
}

fn read_order(buf: &[u8]) -> Option<Order> {
    let side = match u32::from_le_bytes(buf[0..4].try_into().ok()?) {
        0 => Side::Buy,
        1 => Side::Sell,
        _ => return None,
    };
    let quantity = i64::from_le_bytes(buf[4..12].try_into().ok()?);
    let order_type = match u32::from_le_bytes(buf[12..16].try_into().ok()?) {
        0 => OrderType::Market,
        1 => OrderType::Limit,
        _ => return None,
    };
    let price = i64::from_le_bytes(buf[16..24].try_into().ok()?);
    let order_id = u64::from_le_bytes(buf[24..32].try_into().ok()?);
    let timestamp = u64::from_le_bytes(buf[32..40].try_into().ok()?);
    Some(Order::new(side, quantity, order_type, price, order_id, timestamp))
}

/// Encodes `msg` into a fixed-size `MESSAGE_LEN`-byte record.
pub fn encode(msg: &Message) -> Vec<u8> {
    let mut buf = vec![0u8; MESSAGE_LEN];
    let tag = match &msg.body {
        MessageBody::NewOrder(_) => msg_type::NEW_ORDER,
        MessageBody::CancelOrder(_) => msg_type::CANCEL_ORDER,
        MessageBody::SetMarketPrice(_) => msg_type::SET_MARKET_PRICE,
        MessageBody::Trade(_) => msg_type::TRADE,
        MessageBody::OrderExecuted(_) => msg_type::ORDER_EXECUTED,
        MessageBody::Panic => msg_type::PANIC,
    };
    buf[0..4].copy_from_slice(&tag.to_le_bytes());
    buf[4..12].copy_from_slice(&msg.security_id.to_le_bytes());

    let payload = &mut buf[HEADER_LEN..];
    match &msg.body {
        MessageBody::NewOrder(o) | MessageBody::OrderExecuted(o) => {
            write_order(&mut payload[..ORDER_LEN], o)
        }
        MessageBody::CancelOrder(id) => payload[0..8].copy_from_slice(&id.to_le_bytes()),
        MessageBody::SetMarketPrice(p) => payload[0..8].copy_from_slice(&p.to_le_bytes()),
        MessageBody::Trade(t) => {
            write_order(&mut payload[..ORDER_LEN], &t.aggressor);
            payload[ORDER_LEN..ORDER_LEN + 8].copy_from_slice(&t.matched_id.to_le_bytes());
        }
        MessageBody::Panic => {}
    }
    buf
}

/// Decodes a `MESSAGE_LEN`-byte record. Returns `None` on malformed input
/// (wrong length or an unrecognized tag/sub-field); per spec.md §7, an
/// undecodable record inside the dispatch loop is ignored, not fatal.
pub fn decode(buf: &[u8]) -> Option<Message> {
    if buf.len() != MESSAGE_LEN {
        return None;
    }
    let tag = u32::from_le_bytes(buf[0..4].try_into().ok()?);
    let security_id: SecurityId = i64::from_le_bytes(buf[4..12].try_into().ok()?);
    let payload = &buf[HEADER_LEN..];

    let body = match tag {
        msg_type::NEW_ORDER => MessageBody::NewOrder(read_order(&payload[..ORDER_LEN])?),
        msg_type::ORDER_EXECUTED => MessageBody::OrderExecuted(read_order(&payload[..ORDER_LEN])?),
        msg_type::CANCEL_ORDER => {
            MessageBody::CancelOrder(u64::from_le_bytes(payload[0..8].try_into().ok()?))
        }
        msg_type::SET_MARKET_PRICE => {
            MessageBody::SetMarketPrice(i64::from_le_bytes(payload[0..8].try_into().ok()?))
        }
        msg_type::TRADE => {
            let aggressor = read_order(&payload[..ORDER_LEN])?;
            let matched_id = u64::from_le_bytes(payload[ORDER_LEN..ORDER_LEN + 8].try_into().ok()?);
            MessageBody::Trade(Trade { aggressor, matched_id })
        }
        msg_type::PANIC => MessageBody::Panic,
        _ => return None,
    };

    Some(Message::new(security_id, body))
}
