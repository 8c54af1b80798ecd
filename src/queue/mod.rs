//! Bounded Queue Component
//!
//! A fixed-capacity, order-preserving asynchronous producer/consumer queue
//! with backpressure on both sides: enqueue suspends while the buffer is
//! full, dequeue suspends while it is empty.
//!
//! # Overview
//!
//! This module provides a generic producer/consumer queue that enables
//! asynchronous hand-off between components. Key features include:
//!
//! - **Multiple Producers**: Any number of callers can enqueue concurrently
//! - **Multiple Consumers**: Any number of callers can dequeue concurrently
//! - **Strict FIFO**: Items and blocked callers are served in arrival order
//! - **Backpressure**: Producers stall at capacity instead of overrunning it
//! - **Cancel Safety**: Dropping a pending call withdraws its waiter; an
//!   item already accepted by the queue is reclaimed, never lost
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────┐     ┌──────────────┐     ┌──────────────┐
//! │  Producer A  │     │  Producer B  │     │  Producer C  │
//! └──────┬───────┘     └──────┬───────┘     └──────┬───────┘
//!        │ enqueue            │ enqueue            │ enqueue
//!        ▼                    ▼                    ▼
//! ┌─────────────────────────────────────────────────────────┐
//! │                       BoundedQueue                      │
//! │                                                         │
//! │  producer wait list        buffer (len <= capacity)     │
//! │  ┌───┬───┬───┐             ┌───┬───┬───┬───┐            │
//! │  │ p │ p │ p │ ──admit──▶  │ 1 │ 2 │ 3 │ 4 │ ──pop──▶   │
//! │  └───┴───┴───┘             └───┴───┴───┴───┘            │
//! │  (blocked when full)                                    │
//! │                            consumer wait list           │
//! │         direct hand-off──▶ ┌───┬───┬───┐                │
//! │         (buffer empty)     │ c │ c │ c │                │
//! │                            └───┴───┴───┘                │
//! │                            (blocked when empty)         │
//! └────────┬───────────────────┬───────────────┬────────────┘
//!          │ dequeue           │ dequeue       │ dequeue
//! ┌────────┴──┐          ┌─────┴─────┐   ┌─────┴─────┐
//! │Consumer A │          │Consumer B │   │Consumer C │
//! └───────────┘          └───────────┘   └───────────┘
//! ```
//!
//! Every state transition (buffer append/remove, waiter park/fire/withdraw)
//! is a single critical section, so the FIFO guarantee holds across any
//! interleaving of callers: the k-th dequeue to complete receives the k-th
//! item whose enqueue completed acceptance.
//!
//! # Example Usage
//!
//! ```rust,no_run
//! use async_bounded_queue::BoundedQueue;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! // Capacity-bounded queue; construction validates the capacity
//! let queue = BoundedQueue::with_capacity(4)?;
//!
//! // Completes immediately while the buffer has room
//! queue.enqueue("job").await;
//!
//! // Strict FIFO delivery
//! let job = queue.dequeue().await;
//! assert_eq!(job, "job");
//! # Ok(())
//! # }
//! ```

mod error;
mod internal;

pub mod api;

pub use error::{QueueError, QueueResult};
pub use internal::{BoundedQueue, DEFAULT_CAPACITY};

#[cfg(test)]
mod tests;
