//! Public API for the bounded queue
//!
//! This module provides the complete public API for the bounded queue.
//! External modules should import from here rather than directly from
//! internal modules. See module documentation for complete usage examples
//! and architecture details.

// Core queue type
pub use crate::queue::internal::{BoundedQueue, DEFAULT_CAPACITY};

// Error handling
pub use crate::queue::error::{QueueError, QueueResult};
