//! Test modules for the bounded queue
//!
//! This module organizes all the test suites for the bounded queue.
//! Tests are organized by functional area for better maintainability.

mod backpressure;
