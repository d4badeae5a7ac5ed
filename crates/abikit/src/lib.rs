//! # abikit
//!
//! Solidity ABI codec and overload-aware item resolution.
//!
//! ## Features
//!
//! - **abi**: type grammar, value model, head/tail encoder and decoder,
//!   packed encoding
//! - **Abi**: JSON and human-readable ABI loading
//! - **resolve**: overload selection with ambiguity detection
//! - **Items**: call data, results, event logs, revert data, deploy data
//! - **Contract**: resolve-then-encode helpers for a deployed contract
//!
//! ## Quick Start
//!
//! ```rust
//! use abikit::{Abi, DecodeAs, Query, ResolveOptions, Value};
//!
//! let abi = Abi::parse_human_readable(&[
//!     "function balanceOf(address owner) view returns (uint256)",
//!     "function transfer(address to, uint256 amount) returns (bool)",
//! ])
//! .unwrap();
//!
//! // Encode a call
//! let transfer = abi.function("transfer").unwrap();
//! let data = transfer
//!     .encode_data(&[
//!         Value::from("0x742d35Cc6634C0532925a3b844Bc9e7595f0aB3d"),
//!         Value::uint(1000),
//!     ])
//!     .unwrap();
//! assert_eq!(&data[..4], &[0xa9, 0x05, 0x9c, 0xbb]);
//!
//! // Find the function from raw call data
//! let resolved = abi.resolve(&Query::Hash(data.clone()), ResolveOptions::default()).unwrap();
//! assert_eq!(resolved.item.name(), "transfer");
//!
//! // Decode a result
//! let mut output = [0u8; 32];
//! output[31] = 1;
//! let result = transfer.decode_result(&output, DecodeAs::Positional).unwrap();
//! assert_eq!(result, Value::Bool(true));
//! ```
//!
//! ## Contract Interaction
//!
//! ```rust
//! use abikit::{contract, Address, Value};
//!
//! let token = Address::from_hex("0xA0b86991c6218b36c1d19D4a2e9Eb0cE3606eB48").unwrap();
//! let contract = contract::erc20(token).unwrap();
//!
//! let owner = Value::from("0x742d35Cc6634C0532925a3b844Bc9e7595f0aB3d");
//! let data = contract.encode_call("balanceOf", &[owner]).unwrap();
//! assert_eq!(data.len(), 36);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod abi;
pub mod contract;
mod error;
pub mod human;
pub mod item;
pub mod resolve;
pub mod signature;

// Re-export main types
pub use abi::{DecodeAs, Param, ParamType, Value, I256};
pub use contract::Contract;
pub use error::{AbiError, Result};
pub use item::{
    Abi, AbiItem, ConstructorDef, DecodedError, DecodedLog, ErrorDef, EventDef, FallbackDef, FunctionDef, ReceiveDef,
    StateMutability,
};
pub use resolve::{get_ambiguous_types, Query, ResolveOptions, Resolved};

// Re-export primitives for convenience
pub use abikit_primitives::{Address, H256, U256};
