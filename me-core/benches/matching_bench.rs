mod common;
use common::*;
use criterion::{Criterion, Throughput, criterion_group, criterion_main};
use me_core::engine::arena::SystemAllocator;
use me_core::engine::book::Book;
use me_core::engine::matching::process;
use me_core::engine::security::SecurityState;
use me_core::engine::types::{MessageBody, Side};
use rand::Rng;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::thread;

fn fresh_state(capacity: usize, market_price: i64) -> SecurityState {
    SecurityState {
        buy: Book::new(capacity, Arc::new(SystemAllocator)),
        sell: Book::new(capacity, Arc::new(SystemAllocator)),
        market_price,
    }
}

fn bench_matching(c: &mut Criterion) {
    let mut group = c.benchmark_group("matching for 10k orders");
    group.throughput(Throughput::Elements(10_000));
    group.bench_function("process 10k crossing limit orders", |b| {
        b.iter_batched(
            || {
                let mut state = fresh_state(64, 1250);
                let mut out = Vec::new();
                for i in 0..10_000u64 {
                    let sell = make_limit_order(i, Side::Sell, 1000 + (i % 500) as i64, 10, 3000 + i);
                    process(&mut state, 1, MessageBody::NewOrder(sell), &mut out);
                    out.clear();
                }
                state
            },
            |mut state| {
                let mut out = Vec::new();
                for i in 10_000..20_000u64 {
                    let buy = make_limit_order(i, Side::Buy, 1500, 10, 4000 + i);
                    process(&mut state, 1, MessageBody::NewOrder(buy), &mut out);
                    out.clear();
                }
                state
            },
            criterion::BatchSize::LargeInput,
        );
    });
    group.finish();
}

fn stress_multi_thread_benchmark(c: &mut Criterion) {
    use std::sync::Mutex;
    let state = Arc::new(Mutex::new(fresh_state(64, 1000)));

    let insert_counter = Arc::new(AtomicU64::new(0));
    let cancel_counter = Arc::new(AtomicU64::new(0));

    let mut group = c.benchmark_group("stress matching");
    group.throughput(Throughput::Elements(1));
    group.bench_function("concurrent insert/cancel/process TPS", |b| {
        let running = Arc::new(AtomicBool::new(true));

        let state_insert = Arc::clone(&state);
        let insert_counter_clone = Arc::clone(&insert_counter);
        let insert_thread_running = running.clone();
        let insert_thread = thread::spawn(move || {
            let mut i = 0u64;
            let mut out = Vec::new();
            while insert_thread_running.load(Ordering::Relaxed) {
                i += 1;
                let mut rng = rand::rng();
                let is_limit = rng.random_bool(0.7); // 70% limit, 30% market
                let is_buy = rng.random_bool(0.5);
                let side = if is_buy { Side::Buy } else { Side::Sell };
                let order = if is_limit {
                    make_limit_order(i, side, 1000 - (i % 500) as i64, 10, 1000 + i)
                } else {
                    make_market_order(i, side, 10, 2000 + i)
                };
                let mut state = state_insert.lock().unwrap();
                process(&mut state, 1, MessageBody::NewOrder(order), &mut out);
                out.clear();
                insert_counter_clone.fetch_add(1, Ordering::Relaxed);
            }
        });

        let state_cancel = Arc::clone(&state);
        let cancel_counter_clone = Arc::clone(&cancel_counter);
        let cancel_thread_running = running.clone();
        let cancel_thread = thread::spawn(move || {
            let mut rng = rand::rng();
            let mut out = Vec::new();
            while cancel_thread_running.load(Ordering::Relaxed) {
                let random_id = rng.random_range(0..100_000_000u64);
                let mut state = state_cancel.lock().unwrap();
                process(&mut state, 1, MessageBody::CancelOrder(random_id), &mut out);
                out.clear();
                cancel_counter_clone.fetch_add(1, Ordering::Relaxed);
            }
        });

        b.iter(|| {
            let mut state = state.lock().unwrap();
            let mut out = Vec::new();
            process(
                &mut state,
                1,
                MessageBody::NewOrder(make_limit_order(u64::MAX, Side::Buy, 1000, 10, 0)),
                &mut out,
            );
        });

        running.store(false, Ordering::Relaxed);
        insert_thread.join().unwrap();
        cancel_thread.join().unwrap();
    });
    group.finish();
}

criterion_group!(benches, bench_matching, stress_multi_thread_benchmark);
criterion_main!(benches);
