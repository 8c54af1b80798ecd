//! Queue Error Types

#[derive(Debug, thiserror::Error)]
pub enum QueueError {
    #[error("Invalid queue capacity: {capacity} (capacity must be a positive integer)")]
    InvalidCapacity { capacity: usize },
}

/// Result type for queue operations
pub type QueueResult<T> = Result<T, QueueError>;
