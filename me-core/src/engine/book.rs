//! Book (C2): a segmented binary heap obeying price-time priority, with a
//! fixed-capacity primary segment and an on-demand overflow chain.

use std::marker::PhantomData;
use std::sync::Arc;

use super::arena::{AllocationHandle, Allocator};
use super::types::{Order, OrderId, PriceTimeOrder};

struct Segment {
    used: usize,
    orders: Vec<Order>,
    /// Held for the segment's lifetime so a tracking allocator observes
    /// live overflow bytes; `None` for the primary segment, whose capacity
    /// is accounted for once at `Arena::init` time.
    _reservation: Option<AllocationHandle>,
}

impl Segment {
    fn primary(capacity: usize) -> Self {
        Self {
            used: 0,
            orders: Vec::with_capacity(capacity),
            _reservation: None,
        }
    }

    fn overflow(capacity: usize, reservation: AllocationHandle) -> Self {
        Self {
            used: 0,
            orders: Vec::with_capacity(capacity),
            _reservation: Some(reservation),
        }
    }
}

/// Per-side priority structure. `S` selects the price-time comparator
/// (`BuySide` or `SellSide`) so the two sides of a security share one
/// implementation (Re-architecture item 1 in spec.md §9).
pub struct Book<S> {
    capacity: usize,
    primary: Segment,
    /// Chain of same-capacity segments holding the tail of the heap, per
    /// spec.md §3. Elements here are not kept in heap order among
    /// themselves; whenever a slot opens up in the primary segment, the
    /// single best element across every overflow segment is pulled in,
    /// so the primary root always stays the overall best resident order.
    overflow: Vec<Segment>,
    allocator: Arc<dyn Allocator>,
    _comparator: PhantomData<S>,
}

impl<S: PriceTimeOrder> Book<S> {
    pub fn new(capacity: usize, allocator: Arc<dyn Allocator>) -> Self {
        Self {
            capacity,
            primary: Segment::primary(capacity),
            overflow: Vec::new(),
            allocator,
            _comparator: PhantomData,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.primary.used == 0
    }

    pub fn len(&self) -> usize {
        self.primary.used + self.overflow.iter().map(|s| s.used).sum::<usize>()
    }

    /// Returns the root of the primary heap. `None` if empty (the spec
    /// leaves `peek` on an empty book undefined; this crate returns `None`
    /// rather than reproducing undefined behavior).
    pub fn peek(&self) -> Option<&Order> {
        (self.primary.used > 0).then(|| &self.primary.orders[0])
    }

    /// Overwrites the root's `quantity` in place. Valid because heap order
    /// here is a function of `price`/`timestamp` only, never `quantity`.
    pub fn set_root_quantity(&mut self, quantity: i64) {
        if self.primary.used > 0 {
            self.primary.orders[0].quantity = quantity;
        }
    }

    /// Inserts `order`, preserving the heap property. When the primary
    /// segment is full, compares against its current last slot: if that
    /// slot is better, `order` spills unchanged into the overflow chain;
    /// otherwise the last slot is evicted to overflow and `order` is sifted
    /// into the vacated primary slot. This keeps the better orders
    /// cache-resident (spec.md §4.2, Open Question #3).
    pub fn insert(&mut self, order: Order) {
        if self.primary.used < self.capacity {
            self.primary.orders.push(order);
            let idx = self.primary.used;
            self.primary.used += 1;
            self.try_sift_up(idx);
            return;
        }

        let last_idx = self.capacity - 1;
        let primary_last = self.primary.orders[last_idx];
        if S::is_better(&primary_last, &order) {
            self.overflow_push(order);
        } else {
            self.overflow_push(primary_last);
            self.primary.orders[last_idx] = order;
            self.try_sift_up(last_idx);
        }
    }

    /// Removes and returns the root. The last primary element takes its
    /// place and is sifted down; if the overflow chain is non-empty, the
    /// single best order across every overflow segment is then drawn back
    /// into the primary via `insert`, keeping the primary full while
    /// overflow has content (spec.md §4.2). Refilling with the overflow's
    /// best order, not merely the oldest one, is what keeps the primary
    /// root the true best among all resident orders once a book has spilled
    /// into overflow: a later, better arrival must never be stuck behind an
    /// earlier, worse one.
    pub fn pop_best(&mut self) -> Option<Order> {
        if self.primary.used == 0 {
            return None;
        }
        let root = self.primary.orders[0];
        let moved = self.primary.orders.pop().expect("used > 0");
        self.primary.used -= 1;
        if self.primary.used > 0 {
            self.primary.orders[0] = moved;
            self.sift_down(0);
        }
        if let Some(refill) = self.overflow_pop_best() {
            self.insert(refill);
        }
        Some(root)
    }

    /// Linear scan over all segments for `order_id`. On a primary hit,
    /// swaps with the last live primary element, shrinks, and restores the
    /// heap by trying sift-up then falling back to sift-down from that
    /// position (spec.md §9, Open Question #2), never the source's
    /// non-reheapifying descent. On an overflow hit, the element is simply
    /// removed from its segment (overflow is not heap-ordered). Returns
    /// whether an order was found; emits nothing (the caller is responsible
    /// for any acknowledgement).
    pub fn remove_by_id(&mut self, id: OrderId) -> bool {
        if let Some(idx) = self.primary.orders[..self.primary.used]
            .iter()
            .position(|o| o.order_id == id)
        {
            self.remove_primary_at(idx);
            if let Some(refill) = self.overflow_pop_best() {
                self.insert(refill);
            }
            return true;
        }

        for seg in &mut self.overflow {
            if let Some(idx) = seg.orders[..seg.used].iter().position(|o| o.order_id == id) {
                seg.orders.remove(idx);
                seg.used -= 1;
                self.overflow.retain(|s| s.used > 0);
                return true;
            }
        }
        false
    }

    fn remove_primary_at(&mut self, idx: usize) {
        let last_idx = self.primary.used - 1;
        if idx != last_idx {
            self.primary.orders[idx] = self.primary.orders[last_idx];
        }
        self.primary.orders.pop();
        self.primary.used -= 1;
        if idx < self.primary.used && !self.try_sift_up(idx) {
            self.sift_down(idx);
        }
    }

    fn overflow_push(&mut self, order: Order) {
        if let Some(last) = self.overflow.last_mut() {
            if last.used < self.capacity {
                last.orders.push(order);
                last.used += 1;
                return;
            }
        }
        let reservation = self
            .allocator
            .allocate(self.capacity * std::mem::size_of::<Order>());
        let mut seg = Segment::overflow(self.capacity, reservation);
        seg.orders.push(order);
        seg.used = 1;
        self.overflow.push(seg);
    }

    /// Scans every overflow segment for the single best order (per `S`)
    /// and removes it. O(n) in the number of live overflow orders, the
    /// same complexity class as `remove_by_id`'s own linear scan; this is
    /// the price of keeping the primary root globally correct without a
    /// fully heap-ordered overflow chain.
    fn overflow_pop_best(&mut self) -> Option<Order> {
        let mut best: Option<(usize, usize)> = None;
        for (seg_idx, seg) in self.overflow.iter().enumerate() {
            for (idx, order) in seg.orders[..seg.used].iter().enumerate() {
                let is_better = match best {
                    None => true,
                    Some((best_seg, best_idx)) => {
                        S::is_better(order, &self.overflow[best_seg].orders[best_idx])
                    }
                };
                if is_better {
                    best = Some((seg_idx, idx));
                }
            }
        }
        let (seg_idx, idx) = best?;
        let seg = &mut self.overflow[seg_idx];
        let order = seg.orders.remove(idx);
        seg.used -= 1;
        if seg.used == 0 {
            self.overflow.remove(seg_idx);
        }
        Some(order)
    }

    /// Sifts `idx` toward the root while a parent compares worse. Returns
    /// whether at least one swap happened, so callers that only need a
    /// fallback trigger (`remove_primary_at`) can skip `sift_down` when
    /// sift-up already moved the element.
    fn try_sift_up(&mut self, mut idx: usize) -> bool {
        let mut moved = false;
        while idx > 0 {
            let parent = (idx - 1) / 2;
            if S::is_better(&self.primary.orders[idx], &self.primary.orders[parent]) {
                self.primary.orders.swap(idx, parent);
                idx = parent;
                moved = true;
            } else {
                break;
            }
        }
        moved
    }

    fn sift_down(&mut self, mut idx: usize) {
        loop {
            let left = 2 * idx + 1;
            let right = 2 * idx + 2;
            let mut best = idx;
            if left < self.primary.used
                && S::is_better(&self.primary.orders[left], &self.primary.orders[best])
            {
                best = left;
            }
            if right < self.primary.used
                && S::is_better(&self.primary.orders[right], &self.primary.orders[best])
            {
                best = right;
            }
            if best == idx {
                break;
            }
            self.primary.orders.swap(idx, best);
            idx = best;
        }
    }
}
