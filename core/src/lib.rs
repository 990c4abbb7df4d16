//! Core components for signing object storage requests.
//!
//! This crate carries the service-independent pieces of the signing
//! workspace: the error taxonomy, cryptographic hash helpers, time
//! formatting together with an injectable clock, and redaction of
//! sensitive values in `Debug` output.
//!
//! Service crates (such as `objsign-s3`) build their signers on top of
//! these primitives.

// Make sure all our public APIs have docs.
#![warn(missing_docs)]

pub mod hash;
pub mod time;
pub mod utils;

mod error;
pub use error::{Error, ErrorKind, Result};
