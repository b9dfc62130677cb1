//! # dyncodec Bench
//!
//! Shared message fixtures for the dyncodec benchmarks.

pub mod fixtures;
