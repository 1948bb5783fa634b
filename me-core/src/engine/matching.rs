//! Matching core (C4): `process(msg)` dispatch plus the four sweep
//! algorithms (market/limit × buy/sell), all built on one generic sweep
//! routine parameterized by the opposite book's side comparator
//! (Re-architecture item 1, spec.md §9).

use super::book::Book;
use super::security::SecurityState;
use super::types::{Message, MessageBody, Order, OrderType, PriceTimeOrder, SecurityId, Side, Trade};

enum SweepOutcome {
    /// The aggressor's remaining quantity reached zero; its
    /// `ORDER_EXECUTED` has already been emitted.
    AggressorFilled,
    /// The opposite book ran dry before the aggressor was filled.
    BookExhausted,
    /// A limit aggressor's price no longer crosses the best resting price.
    PriceGated,
}

/// Runs one matching sweep of `aggressor` against `opposite`, pushing every
/// `TRADE` / `SET_MARKET_PRICE` / `ORDER_EXECUTED` message onto `out` in
/// the exact order spec.md §4.4.3 describes. `price_gate` returns `false`
/// once a limit aggressor's price no longer crosses the best resting
/// price; market aggressors pass a gate that always returns `true`.
fn run_sweep<O: PriceTimeOrder>(
    security_id: SecurityId,
    aggressor: &mut Order,
    opposite: &mut Book<O>,
    market_price: &mut i64,
    price_gate: impl Fn(i64) -> bool,
    out: &mut Vec<Message>,
) -> SweepOutcome {
    loop {
        if aggressor.quantity <= 0 {
            return SweepOutcome::AggressorFilled;
        }
        let Some(resting) = opposite.peek().copied() else {
            return SweepOutcome::BookExhausted;
        };
        if !price_gate(resting.price) {
            return SweepOutcome::PriceGated;
        }

        let traded = aggressor.quantity.min(resting.quantity);
        let new_rem = aggressor.quantity - traded;
        let new_r_q = resting.quantity - traded;

        let mut trade_snapshot = *aggressor;
        trade_snapshot.price = resting.price;
        trade_snapshot.quantity = traded;
        out.push(Message::new(
            security_id,
            MessageBody::Trade(Trade {
                aggressor: trade_snapshot,
                matched_id: resting.order_id,
            }),
        ));

        if *market_price != resting.price {
            *market_price = resting.price;
            out.push(Message::new(
                security_id,
                MessageBody::SetMarketPrice(resting.price),
            ));
        }

        aggressor.quantity = new_rem;

        if new_r_q <= 0 {
            let mut executed = resting;
            executed.quantity = new_r_q;
            out.push(Message::new(security_id, MessageBody::OrderExecuted(executed)));
            opposite.pop_best();

            if new_rem <= 0 {
                out.push(Message::new(
                    security_id,
                    MessageBody::OrderExecuted(*aggressor),
                ));
                return SweepOutcome::AggressorFilled;
            }
            // resting fully consumed, aggressor has remainder: continue the loop.
        } else {
            // resting survives partially; by construction new_rem == 0 here
            // (traded == aggressor.quantity whenever resting.quantity wasn't
            // the binding minimum), i.e. the aggressor has been fully
            // filled even though it leaves a resting survivor (spec.md §9,
            // Open Question #5).
            opposite.set_root_quantity(new_r_q);
            out.push(Message::new(
                security_id,
                MessageBody::OrderExecuted(*aggressor),
            ));
            return SweepOutcome::AggressorFilled;
        }
    }
}

/// `process(msg)`: dispatches on `body` under the caller-held security
/// lock, mutating `state` and appending every outbound message to `out` in
/// emission order.
pub fn process(
    state: &mut SecurityState,
    security_id: SecurityId,
    body: MessageBody,
    out: &mut Vec<Message>,
) {
    match body {
        MessageBody::SetMarketPrice(price) => {
            state.market_price = price;
            out.push(Message::new(security_id, MessageBody::SetMarketPrice(price)));
        }
        MessageBody::NewOrder(order) => {
            out.push(Message::new(security_id, MessageBody::NewOrder(order)));
            process_new_order(state, security_id, order, out);
        }
        MessageBody::CancelOrder(order_id) => {
            if !state.buy.remove_by_id(order_id) {
                state.sell.remove_by_id(order_id);
            }
            out.push(Message::new(security_id, MessageBody::CancelOrder(order_id)));
        }
        MessageBody::Panic => {
            // No-op here: shutdown is the dispatcher's concern (spec.md §4.5).
        }
        // Only ever produced by the engine itself, never received as input.
        MessageBody::Trade(_) | MessageBody::OrderExecuted(_) => {}
    }
}

fn process_new_order(
    state: &mut SecurityState,
    security_id: SecurityId,
    mut order: Order,
    out: &mut Vec<Message>,
) {
    match (order.side, order.order_type) {
        (Side::Buy, OrderType::Market) => {
            let outcome = run_sweep(
                security_id,
                &mut order,
                &mut state.sell,
                &mut state.market_price,
                |_| true,
                out,
            );
            if let SweepOutcome::BookExhausted = outcome {
                order.order_type = OrderType::Limit;
                order.price = state.market_price;
                out.push(Message::new(security_id, MessageBody::NewOrder(order)));
                state.buy.insert(order);
            }
        }
        (Side::Sell, OrderType::Market) => {
            let outcome = run_sweep(
                security_id,
                &mut order,
                &mut state.buy,
                &mut state.market_price,
                |_| true,
                out,
            );
            if let SweepOutcome::BookExhausted = outcome {
                order.order_type = OrderType::Limit;
                order.price = state.market_price;
                out.push(Message::new(security_id, MessageBody::NewOrder(order)));
                state.sell.insert(order);
            }
        }
        (Side::Buy, OrderType::Limit) => {
            let limit_price = order.price;
            let outcome = run_sweep(
                security_id,
                &mut order,
                &mut state.sell,
                &mut state.market_price,
                |resting_price| limit_price >= resting_price,
                out,
            );
            if !matches!(outcome, SweepOutcome::AggressorFilled) {
                state.buy.insert(order);
            }
        }
        (Side::Sell, OrderType::Limit) => {
            let limit_price = order.price;
            let outcome = run_sweep(
                security_id,
                &mut order,
                &mut state.buy,
                &mut state.market_price,
                |resting_price| limit_price <= resting_price,
                out,
            );
            if !matches!(outcome, SweepOutcome::AggressorFilled) {
                state.sell.insert(order);
            }
        }
    }
}
