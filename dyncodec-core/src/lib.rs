//! # dyncodec Core
//!
//! Building blocks shared by the dyncodec schema, codec and registry crates.
//!
//! This crate provides:
//! - [`PrimitiveKind`] and the [`Scalar`] trait for fixed-width values
//! - [`EncodeBuffer`], a growable output buffer with fallible growth
//! - [`ReadCursor`], a bounds-checked reader over untrusted input
//! - [`CodecConfig`] limits (recursion depth, decode caps)
//! - Error types for encode/decode operations

pub mod config;
pub mod decoder;
pub mod encoder;
pub mod error;
pub mod types;

pub use config::CodecConfig;
pub use decoder::ReadCursor;
pub use encoder::{COUNT_WIDTH, EncodeBuffer};
pub use error::{Error, Result};
pub use types::{PrimitiveKind, Scalar};
