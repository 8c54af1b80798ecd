pub mod queue;

pub use queue::{BoundedQueue, QueueError, QueueResult, DEFAULT_CAPACITY};
