//! # Zephyr Bench
//!
//! Benchmarking utilities for Zephyr performance testing.

pub mod encoding;
pub mod fixtures;
