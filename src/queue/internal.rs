//! Internal BoundedQueue implementation with FIFO wait lists
//!
//! This module provides the core queue functionality with:
//! - A fixed-capacity buffer of accepted items
//! - Ordered wait lists for blocked producers and consumers
//! - Direct hand-off from an arriving producer to the earliest waiting consumer
//! - Identity-based withdrawal of abandoned waiters, with reclamation of
//!   items whose delivery a cancelled consumer never observed

use crate::queue::error::{QueueError, QueueResult};
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use tokio::sync::oneshot;

/// Capacity used when the caller does not supply one
pub const DEFAULT_CAPACITY: usize = 16;

/// A producer blocked on a full buffer, holding its item until admitted
#[derive(Debug)]
struct ProducerWaiter<T> {
    id: u64,
    item: T,
    /// Fires once the item is accepted into the buffer; firing is the
    /// commit point for acceptance
    signal: oneshot::Sender<()>,
}

/// A consumer blocked on an empty buffer
///
/// Delivery is two-phase: an enqueue fills `slot` under the state lock
/// and fires `signal`; the suspended dequeue drains the slot when next
/// polled. If the dequeue is dropped between the two phases, its guard
/// drains the slot back into the queue so the accepted item is not lost.
#[derive(Debug)]
struct ConsumerWaiter<T> {
    id: u64,
    /// Shared with the suspended dequeue call and its withdrawal guard
    slot: Arc<Mutex<Option<T>>>,
    /// Fires once an item has been placed in the slot
    signal: oneshot::Sender<()>,
}

/// Which wait list a parked waiter belongs to
#[derive(Debug, Clone, Copy)]
enum Side {
    Producer,
    Consumer,
}

/// Mutable queue state; every transition happens under one lock
#[derive(Debug)]
struct QueueState<T> {
    /// Accepted items in arrival order; never longer than capacity except
    /// transiently while a reclaimed delivery drains back out
    buffer: VecDeque<T>,

    /// Producers blocked on a full buffer, in arrival order
    producers: VecDeque<ProducerWaiter<T>>,

    /// Consumers blocked on an empty buffer, in arrival order
    consumers: VecDeque<ConsumerWaiter<T>>,

    /// Monotonic identity source for waiter withdrawal
    next_waiter_id: u64,
}

impl<T> QueueState<T> {
    fn new() -> Self {
        Self {
            buffer: VecDeque::new(),
            producers: VecDeque::new(),
            consumers: VecDeque::new(),
            next_waiter_id: 1,
        }
    }

    fn park_producer(&mut self, item: T) -> (u64, oneshot::Receiver<()>) {
        let (tx, rx) = oneshot::channel();
        let id = self.next_waiter_id;
        self.next_waiter_id += 1;
        self.producers.push_back(ProducerWaiter {
            id,
            item,
            signal: tx,
        });
        (id, rx)
    }

    #[allow(clippy::type_complexity)]
    fn park_consumer(&mut self) -> (u64, Arc<Mutex<Option<T>>>, oneshot::Receiver<()>) {
        let (tx, rx) = oneshot::channel();
        let slot = Arc::new(Mutex::new(None));
        let id = self.next_waiter_id;
        self.next_waiter_id += 1;
        self.consumers.push_back(ConsumerWaiter {
            id,
            slot: Arc::clone(&slot),
            signal: tx,
        });
        (id, slot, rx)
    }

    /// Hand an item to the earliest live consumer waiter
    ///
    /// Returns the waiter id on success, or gives the item back when
    /// every parked consumer turns out to be abandoned.
    fn hand_to_consumer(&mut self, mut item: T) -> Result<u64, T> {
        while let Some(waiter) = self.consumers.pop_front() {
            let ConsumerWaiter { id, slot, signal } = waiter;
            *slot.lock().unwrap() = Some(item);
            match signal.send(()) {
                Ok(()) => return Ok(id),
                // Receiver gone without withdrawal (leaked future); take
                // the item back and try the next waiter.
                Err(()) => {
                    item = slot
                        .lock()
                        .unwrap()
                        .take()
                        .expect("undelivered slot drained while the state lock was held");
                }
            }
        }

        Err(item)
    }
}

/// BoundedQueue provides fixed-capacity FIFO delivery with backpressure
/// on both sides
///
/// Enqueue suspends while the buffer is full and no consumer is waiting;
/// dequeue suspends while the buffer is empty. Blocked callers on either
/// side are served strictly in the order their calls reached the queue,
/// independent of how the scheduler interleaves their continuations.
///
/// # Thread Safety
///
/// The queue is fully thread-safe and can be shared across tasks or
/// threads behind an `Arc<BoundedQueue<T>>`. The internal lock is never
/// held across a suspension point.
#[derive(Debug)]
pub struct BoundedQueue<T> {
    state: Mutex<QueueState<T>>,

    /// Configured bound, immutable after construction
    capacity: usize,
}

impl<T> BoundedQueue<T> {
    /// Create a queue with [`DEFAULT_CAPACITY`]
    pub fn new() -> Self {
        Self {
            state: Mutex::new(QueueState::new()),
            capacity: DEFAULT_CAPACITY,
        }
    }

    /// Create a queue with an explicit capacity
    ///
    /// Fails with [`QueueError::InvalidCapacity`] when `capacity` is zero;
    /// the buffer and both wait lists start empty on success.
    pub fn with_capacity(capacity: usize) -> QueueResult<Self> {
        if capacity == 0 {
            return Err(QueueError::InvalidCapacity { capacity });
        }

        Ok(Self {
            state: Mutex::new(QueueState::new()),
            capacity,
        })
    }

    /// Get the configured bound
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Get the current buffer length
    ///
    /// Equals `capacity` while producers are blocked with no consumer
    /// present. May exceed `capacity` transiently after a cancelled
    /// delivery is reclaimed into a buffer that refilled meanwhile;
    /// dequeues drain the excess before any further producer is admitted.
    pub fn occupancy(&self) -> usize {
        self.state.lock().unwrap().buffer.len()
    }

    /// Check whether the buffer currently holds no items
    pub fn is_empty(&self) -> bool {
        self.occupancy() == 0
    }

    /// Get the current count of blocked dequeue calls
    pub fn waiting_consumers(&self) -> usize {
        self.state.lock().unwrap().consumers.len()
    }

    /// Get the current count of blocked enqueue calls
    pub fn waiting_producers(&self) -> usize {
        self.state.lock().unwrap().producers.len()
    }

    /// Insert an item, waiting for room when the buffer is full
    ///
    /// Completes immediately when a consumer is already waiting (the item
    /// is handed over directly, bypassing the buffer) or when the buffer
    /// has room. Otherwise the call suspends until a dequeue frees a slot
    /// and admits this item, in arrival order among blocked producers.
    ///
    /// Cancel-safe: dropping the returned future withdraws the item while
    /// it is still parked, and it is then never delivered. Once a dequeue
    /// has admitted the item, acceptance stands even if this future never
    /// observes it.
    pub async fn enqueue(&self, item: T) {
        let (id, accepted) = {
            let mut state = self.state.lock().unwrap();

            // A waiting consumer implies an empty buffer; hand the item
            // over directly without touching the buffer.
            let item = match state.hand_to_consumer(item) {
                Ok(waiter_id) => {
                    log::trace!(
                        "enqueue: item handed directly to consumer waiter {}",
                        waiter_id
                    );
                    return;
                }
                Err(item) => item,
            };

            if state.buffer.len() < self.capacity {
                state.buffer.push_back(item);
                return;
            }

            // Buffer full and nobody waiting to consume: park at the
            // producer wait-list tail.
            let (id, rx) = state.park_producer(item);
            log::trace!(
                "enqueue: buffer full, producer waiter {} parked ({} waiting)",
                id,
                state.producers.len()
            );
            (id, rx)
        };

        let guard = WithdrawGuard::producer(self, id);
        // The signal fires exactly once, when a dequeue admits the item;
        // it cannot be dropped unfired while this future is alive.
        accepted
            .await
            .expect("producer completion signal dropped before acceptance");
        guard.completed();
    }

    /// Remove and return the next item, waiting when the buffer is empty
    ///
    /// Pops the buffer head in strict FIFO order; freeing a slot admits
    /// the earliest blocked producer before this call returns. On an
    /// empty buffer the call suspends until an enqueue hands it an item,
    /// in arrival order among blocked consumers.
    ///
    /// Cancel-safe: dropping the returned future withdraws the waiter,
    /// and an item already committed to it is reclaimed by the queue
    /// ahead of everything accepted later, never lost.
    pub async fn dequeue(&self) -> T {
        let (id, slot, delivery) = {
            let mut state = self.state.lock().unwrap();

            if let Some(item) = state.buffer.pop_front() {
                // The freed slot admits the earliest blocked producer,
                // keeping one-slot-in/one-slot-out balance. A reclaimed
                // delivery can leave the buffer over capacity; admission
                // waits until the excess has drained.
                if state.buffer.len() < self.capacity {
                    while let Some(waiter) = state.producers.pop_front() {
                        let ProducerWaiter {
                            id,
                            item: held,
                            signal,
                        } = waiter;
                        if signal.send(()).is_ok() {
                            state.buffer.push_back(held);
                            log::trace!("dequeue: admitted item from producer waiter {}", id);
                            break;
                        }
                        // Producer abandoned without withdrawal; its item
                        // is discarded, never admitted.
                        log::trace!("dequeue: skipped abandoned producer waiter {}", id);
                    }
                }
                return item;
            }

            // Buffer empty (so no producer is parked either): wait at the
            // consumer wait-list tail.
            let (id, slot, rx) = state.park_consumer();
            log::trace!(
                "dequeue: buffer empty, consumer waiter {} parked ({} waiting)",
                id,
                state.consumers.len()
            );
            (id, slot, rx)
        };

        let guard = WithdrawGuard::consumer(self, id, Arc::clone(&slot));
        // The signal fires exactly once, after an item has been committed
        // to the slot; it cannot be dropped unfired while this future is
        // alive.
        delivery
            .await
            .expect("consumer completion signal dropped before delivery");
        let item = slot
            .lock()
            .unwrap()
            .take()
            .expect("consumer signal fired with an empty slot");
        guard.completed();
        item
    }

    /// Remove an abandoned producer waiter by identity without firing
    /// its signal
    ///
    /// No-op when the waiter already left its list: a dequeue admitted
    /// the item first, and acceptance stands.
    fn withdraw_producer(&self, id: u64) {
        // Runs from Drop; a poisoned lock during unwind must not turn
        // into a double panic.
        let Ok(mut state) = self.state.lock() else {
            return;
        };

        if let Some(index) = state.producers.iter().position(|waiter| waiter.id == id) {
            state.producers.remove(index);
            log::trace!("withdrew abandoned {:?} waiter {}", Side::Producer, id);
        }
    }

    /// Remove an abandoned consumer waiter, reclaiming an undelivered item
    ///
    /// While the waiter is still parked it is removed without firing its
    /// signal. When an enqueue already committed an item to its slot, the
    /// item is reclaimed under the state lock and re-enters the queue:
    /// handed to the next waiting consumer when one exists, otherwise
    /// placed back at the buffer head so it stays first in line.
    fn withdraw_consumer(&self, id: u64, slot: Arc<Mutex<Option<T>>>) {
        // Runs from Drop; a poisoned lock during unwind must not turn
        // into a double panic.
        let Ok(mut state) = self.state.lock() else {
            return;
        };

        if let Some(index) = state.consumers.iter().position(|waiter| waiter.id == id) {
            state.consumers.remove(index);
            log::trace!("withdrew abandoned {:?} waiter {}", Side::Consumer, id);
            return;
        }

        // The waiter already left the list: a hand-off committed an item
        // to this call before the drop. Reclaim whatever was never
        // drained so the accepted item survives the abandoned future.
        let undelivered = match slot.lock() {
            Ok(mut undelivered) => undelivered.take(),
            Err(_) => return,
        };
        if let Some(item) = undelivered {
            match state.hand_to_consumer(item) {
                Ok(waiter_id) => {
                    log::trace!(
                        "reclaimed undelivered item handed to consumer waiter {}",
                        waiter_id
                    );
                }
                Err(item) => {
                    // Accepted before anything currently buffered, so it
                    // re-enters at the head.
                    state.buffer.push_front(item);
                    log::trace!("reclaimed undelivered item returned to buffer head");
                }
            }
        }
    }
}

impl<T> Default for BoundedQueue<T> {
    fn default() -> Self {
        Self::new()
    }
}

/// Excises a parked waiter when its call is abandoned mid-wait
///
/// Held by a suspended enqueue/dequeue across its await point. Dropping
/// the future (external timeout, cancelled task) drops the guard, which
/// removes the waiter from its list so no slot leaks and no signal is
/// fired for a caller that is gone. For consumers the guard also carries
/// the delivery slot, so an item committed between hand-off and drop is
/// reclaimed rather than lost.
struct WithdrawGuard<'a, T> {
    queue: &'a BoundedQueue<T>,
    id: u64,
    side: Side,
    /// Delivery slot to drain on cancellation; producers carry none
    slot: Option<Arc<Mutex<Option<T>>>>,
}

impl<'a, T> WithdrawGuard<'a, T> {
    fn producer(queue: &'a BoundedQueue<T>, id: u64) -> Self {
        Self {
            queue,
            id,
            side: Side::Producer,
            slot: None,
        }
    }

    fn consumer(queue: &'a BoundedQueue<T>, id: u64, slot: Arc<Mutex<Option<T>>>) -> Self {
        Self {
            queue,
            id,
            side: Side::Consumer,
            slot: Some(slot),
        }
    }

    /// Disarm the guard once the operation completed normally
    fn completed(self) {
        std::mem::forget(self);
    }
}

impl<T> Drop for WithdrawGuard<'_, T> {
    fn drop(&mut self) {
        match self.side {
            Side::Producer => self.queue.withdraw_producer(self.id),
            Side::Consumer => {
                if let Some(slot) = self.slot.take() {
                    self.queue.withdraw_consumer(self.id, slot);
                }
            }
        }
    }
}
