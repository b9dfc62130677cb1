//! # dyncodec Registry
//!
//! A [`TypeRegistry`] maps each (type name, typesupport identifier) pair to
//! one shared [`MessageCodec`](dyncodec_codec::MessageCodec), built on first
//! use and reused by every later caller.
//!
//! Entries live until [`TypeRegistry::remove`] or [`TypeRegistry::clear`] is
//! called by the owner of the session.

pub mod registry;

pub use registry::{RegistryStats, TypeKey, TypeRegistry};
