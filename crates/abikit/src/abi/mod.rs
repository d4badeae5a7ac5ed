//! Solidity ABI parameter codec
//!
//! This module provides functionality for:
//! - Parsing ABI type strings into [`ParamType`]s
//! - Checking whether a [`Value`] fits a type
//! - Encoding and decoding parameter lists with the head/tail layout
//! - Packed encoding
//!
//! # Example
//!
//! ```rust
//! use abikit::abi::{decode, encode, Param, ParamType, Value};
//!
//! let params = vec![
//!     Param::new("amount", ParamType::Uint(256)),
//!     Param::new("memo", ParamType::String),
//! ];
//! let values = vec![Value::uint(420), Value::from("ox")];
//!
//! let data = encode(&params, &values).unwrap();
//! assert_eq!(data.len(), 128);
//! assert_eq!(decode(&params, &data).unwrap(), values);
//! ```

pub(crate) mod classify;
pub(crate) mod decode;
pub(crate) mod encode;
mod packed;
pub(crate) mod param_type;
mod value;

pub use classify::is_arg_of_type;
pub use decode::{decode, decode_as, decode_output, DecodeAs};
pub use encode::{encode, encode_function_call, encode_hex};
pub use packed::encode_packed;
pub use param_type::{Param, ParamType};
pub use value::{I256, Value};
