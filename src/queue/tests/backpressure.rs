//! Backpressure tests: callers stall rather than overrun or underrun the buffer

#[cfg(test)]
mod tests {
    use crate::queue::api::BoundedQueue;
    use futures::{pin_mut, poll};
    use std::task::Poll;

    #[tokio::test]
    async fn test_dequeue_on_empty_queue_stays_pending() {
        let queue: BoundedQueue<u32> = BoundedQueue::new();

        let pending = queue.dequeue();
        pin_mut!(pending);

        assert!(poll!(pending.as_mut()).is_pending());
        assert_eq!(queue.waiting_consumers(), 1);

        // Still pending on a later poll; nothing arrived to satisfy it.
        assert!(poll!(pending.as_mut()).is_pending());
        assert_eq!(queue.waiting_consumers(), 1);
        assert_eq!(queue.waiting_producers(), 0);
    }

    #[tokio::test]
    async fn test_pending_dequeue_is_resolved_by_later_enqueue() {
        let queue: BoundedQueue<u32> = BoundedQueue::new();

        let pending = queue.dequeue();
        pin_mut!(pending);
        assert!(poll!(pending.as_mut()).is_pending());

        queue.enqueue(10).await;

        assert_eq!(poll!(pending.as_mut()), Poll::Ready(10));
        assert_eq!(queue.waiting_consumers(), 0);
    }

    #[tokio::test]
    async fn test_direct_handoff_bypasses_the_buffer() {
        let queue = BoundedQueue::with_capacity(1).unwrap();

        let pending = queue.dequeue();
        pin_mut!(pending);
        assert!(poll!(pending.as_mut()).is_pending());

        queue.enqueue(7).await;

        // Handed straight to the waiter, never buffered.
        assert_eq!(queue.occupancy(), 0);
        assert_eq!(poll!(pending.as_mut()), Poll::Ready(7));
    }

    #[tokio::test]
    async fn test_enqueue_on_full_queue_stays_pending() {
        let queue = BoundedQueue::with_capacity(1).unwrap();
        queue.enqueue(1).await;

        let blocked = queue.enqueue(2);
        pin_mut!(blocked);

        assert!(poll!(blocked.as_mut()).is_pending());
        assert_eq!(queue.waiting_producers(), 1);

        // Occupancy sits at the configured bound while a producer blocks.
        assert_eq!(queue.occupancy(), queue.capacity());
    }

    #[tokio::test]
    async fn test_dequeue_frees_a_slot_for_the_blocked_producer() {
        let queue = BoundedQueue::with_capacity(1).unwrap();
        queue.enqueue(1).await;

        let blocked = queue.enqueue(2);
        pin_mut!(blocked);
        assert!(poll!(blocked.as_mut()).is_pending());

        assert_eq!(queue.dequeue().await, 1);

        // The blocked item was admitted under the dequeue's critical
        // section, before the producer future is even polled again.
        assert_eq!(queue.occupancy(), 1);
        assert_eq!(queue.waiting_producers(), 0);

        assert!(poll!(blocked.as_mut()).is_ready());
        assert_eq!(queue.dequeue().await, 2);
    }

    #[tokio::test]
    async fn test_blocked_producers_are_admitted_in_arrival_order() {
        let queue = BoundedQueue::with_capacity(1).unwrap();
        queue.enqueue(1).await;

        let second = queue.enqueue(2);
        let third = queue.enqueue(3);
        pin_mut!(second, third);
        assert!(poll!(second.as_mut()).is_pending());
        assert!(poll!(third.as_mut()).is_pending());
        assert_eq!(queue.waiting_producers(), 2);

        assert_eq!(queue.dequeue().await, 1);
        assert_eq!(queue.dequeue().await, 2);
        assert_eq!(queue.dequeue().await, 3);

        assert!(poll!(second.as_mut()).is_ready());
        assert!(poll!(third.as_mut()).is_ready());
        assert!(queue.is_empty());
        assert_eq!(queue.waiting_producers(), 0);
    }
}
