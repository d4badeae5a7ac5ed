//! # abikit-crypto
//!
//! Hash provider for abikit.
//!
//! - Keccak-256 hashing
//! - 4-byte selectors
//! - EIP-55 checksummed address rendering

#![warn(missing_docs)]
#![warn(clippy::all)]

mod hash;

pub use hash::{keccak256, selector, to_checksum, Selector};
