//! # abikit-primitives
//!
//! Fixed-width primitive types shared by the abikit crates.
//!
//! ABI words are 32 bytes wide; addresses occupy the low 20 bytes of a word
//! and hashes fill a whole word. Both types parse from and render to
//! `0x`-prefixed hex.

#![warn(missing_docs)]
#![warn(clippy::all)]

mod address;
mod hash;

pub use address::{Address, AddressError};
pub use hash::{HashError, H256};

// Re-export primitive-types for U256
pub use primitive_types::U256;

/// Width of one ABI word in bytes
pub const WORD_SIZE: usize = 32;

/// A single 32-byte ABI word
pub type Word = [u8; WORD_SIZE];

/// Strip an optional `0x`/`0X` prefix from a hex string
pub fn strip_hex_prefix(s: &str) -> &str {
    s.strip_prefix("0x")
        .or_else(|| s.strip_prefix("0X"))
        .unwrap_or(s)
}
