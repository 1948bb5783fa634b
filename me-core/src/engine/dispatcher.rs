//! Dispatcher (C5): the worker pool that drains the request channel,
//! routes by security id, serializes per-security mutation, and propagates
//! the in-band `PANIC` shutdown signal (spec.md §4.5).

use std::sync::Arc;

use crossbeam::channel::{Receiver, Sender, bounded};

use super::arena::{Allocator, Arena};
use super::codec;
use super::error::InitError;
use super::matching;
use super::security::{SecurityContext, default_initial_price};
use super::types::{Message, MessageBody};

/// The two named, bounded byte-record channels from spec.md §6
/// (`request`: clients → engine, `response`: engine → clients), realized
/// as injected `crossbeam::channel` handles per Re-architecture item 3
/// rather than process-global OS queues. The original source bound these
/// to POSIX message queues named `/fintexmeincoming` and
/// `/fintexmeoutcoming`; production deployments that need a real
/// cross-process transport can still bind a `Channels`' endpoints to such
/// a queue without changing anything in `EngineContext`.
#[derive(Clone)]
pub struct Channels {
    pub request_tx: Sender<Vec<u8>>,
    pub request_rx: Receiver<Vec<u8>>,
    pub response_tx: Sender<Vec<u8>>,
    pub response_rx: Receiver<Vec<u8>>,
}

impl Channels {
    pub fn bounded(capacity: usize) -> Self {
        let (request_tx, request_rx) = bounded(capacity);
        let (response_tx, response_rx) = bounded(capacity);
        Self {
            request_tx,
            request_rx,
            response_tx,
            response_rx,
        }
    }
}

pub struct EngineContext {
    n_securities: usize,
    worker_count: usize,
    contexts: Vec<SecurityContext>,
    channels: Channels,
    _arena: Arena,
}

impl EngineContext {
    /// `init(memory_budget, n_securities, allocator) → EngineContext |
    /// error(DOMAIN)` per spec.md §4.1. `initial_prices`, when non-empty,
    /// overrides the id-seeded `market_price` default (spec.md §9, Open
    /// Question #1); it must have exactly `n_securities` entries if
    /// supplied.
    pub fn init(
        memory_budget: usize,
        n_securities: usize,
        allocator: Arc<dyn Allocator>,
        channels: Channels,
        initial_prices: Option<&[i64]>,
    ) -> Result<Self, InitError> {
        let arena = Arena::init(memory_budget, n_securities, allocator).map_err(|_| InitError::Domain)?;
        if let Some(prices) = initial_prices {
            if prices.len() != n_securities {
                return Err(InitError::Domain);
            }
        }

        let book_allocator = arena.allocator();
        let contexts = (0..n_securities)
            .map(|id| {
                let initial_price = initial_prices
                    .map(|p| p[id])
                    .unwrap_or_else(|| default_initial_price(id as i64));
                SecurityContext::new(arena.capacity, Arc::clone(&book_allocator), initial_price)
            })
            .collect();

        Ok(Self {
            n_securities,
            worker_count: std::thread::available_parallelism()
                .map(|n| n.get())
                .unwrap_or(1),
            contexts,
            channels,
            _arena: arena,
        })
    }

    pub fn channels(&self) -> &Channels {
        &self.channels
    }

    pub fn with_worker_count(mut self, worker_count: usize) -> Self {
        self.worker_count = worker_count.max(1);
        self
    }

    fn valid_security(&self, id: i64) -> Option<usize> {
        usize::try_from(id).ok().filter(|&id| id < self.n_securities)
    }

    /// Launches the worker pool and blocks until every worker has exited
    /// (i.e. until `PANIC` has propagated through the whole pool), then
    /// emits the final `PANIC` on the response channel (spec.md §4.5).
    pub fn run(&self) {
        tracing::info!(workers = self.worker_count, "starting matching engine worker pool");
        std::thread::scope(|scope| {
            for worker in 0..self.worker_count {
                scope.spawn(move || self.worker_loop(worker));
            }
        });
        let panic = Message::new(0, MessageBody::Panic);
        let _ = self.channels.response_tx.send(codec::encode(&panic));
        tracing::info!("matching engine worker pool drained, shutdown complete");
    }

    fn worker_loop(&self, worker: usize) {
        tracing::debug!(worker, "worker started");
        loop {
            let Ok(raw) = self.channels.request_rx.recv() else {
                tracing::warn!(worker, "request channel closed, worker exiting");
                break;
            };
            let Some(msg) = codec::decode(&raw) else {
                tracing::warn!(worker, "dropping malformed record");
                continue;
            };
            let Message { security_id, body } = msg;
            let is_panic = matches!(body, MessageBody::Panic);

            if let Some(idx) = self.valid_security(security_id) {
                let mut out = Vec::new();
                // Hold the security lock across the channel send, not just the
                // book mutation: releasing it first would let a second worker
                // for the same security race its own send in between, breaking
                // the per-security total order spec.md §5/§9 requires.
                let mut state = self.contexts[idx].lock();
                matching::process(&mut state, security_id, body, &mut out);
                for m in &out {
                    let _ = self.channels.response_tx.send(codec::encode(m));
                }
            }

            if is_panic {
                tracing::debug!(worker, "observed PANIC, re-broadcasting and exiting");
                let _ = self.channels.request_tx.send(raw);
                break;
            }
        }
    }
}
