//! Algorithm-level tests for the ranking path.
