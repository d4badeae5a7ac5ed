//! Custom errors and revert data

use std::fmt;

use abikit_crypto::Selector;
use abikit_primitives::U256;

use super::function::strip_selector;
use super::{Abi, ErrorDef};
use crate::abi::{decode, encode_function_call, Param, ParamType, Value};
use crate::error::{AbiError, Result};
use crate::resolve::{Query, ResolveOptions};
use crate::signature::{panic_reason, signature_of, ERROR_SELECTOR, PANIC_SELECTOR};

/// Decoded revert data
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DecodedError {
    /// `Error(string)` from `require`/`revert` with a message
    Revert(String),
    /// `Panic(uint256)` raised by the compiler
    Panic {
        /// Panic code
        code: U256,
        /// Known meaning of the code
        reason: Option<&'static str>,
    },
    /// A custom error declared in the ABI
    Custom {
        /// Error name
        name: String,
        /// Decoded arguments
        args: Vec<Value>,
    },
}

impl fmt::Display for DecodedError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DecodedError::Revert(message) => write!(f, "reverted: {}", message),
            DecodedError::Panic { code, reason: Some(reason) } => write!(f, "panic 0x{:x}: {}", code, reason),
            DecodedError::Panic { code, reason: None } => write!(f, "panic 0x{:x}", code),
            DecodedError::Custom { name, args } => {
                write!(f, "{}(", name)?;
                for (i, arg) in args.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{}", arg)?;
                }
                f.write_str(")")
            }
        }
    }
}

impl ErrorDef {
    /// The built-in `Error(string)`
    pub fn revert_string() -> Self {
        Self::new("Error", vec![Param::new("message", ParamType::String)])
    }

    /// The built-in `Panic(uint256)`
    pub fn panic() -> Self {
        Self::new("Panic", vec![Param::new("code", ParamType::Uint(256))])
    }

    /// Canonical signature
    pub fn signature(&self) -> String {
        signature_of(&self.name, &self.inputs)
    }

    /// 4-byte selector
    pub fn selector(&self) -> Selector {
        abikit_crypto::selector(&self.signature())
    }

    /// Encode revert data for this error
    pub fn encode_data(&self, args: &[Value]) -> Result<Vec<u8>> {
        encode_function_call(self.selector(), &self.inputs, args)
    }

    /// Decode revert data for this error
    pub fn decode_data(&self, data: &[u8]) -> Result<Vec<Value>> {
        let args = strip_selector(self.selector(), &self.signature(), data)?;
        decode(&self.inputs, args)
    }
}

impl Abi {
    /// Decode revert data.
    ///
    /// The built-in `Error(string)` and `Panic(uint256)` are always
    /// recognised; anything else must be a custom error in this ABI.
    pub fn decode_error(&self, data: &[u8]) -> Result<DecodedError> {
        if data.len() < 4 {
            return Err(AbiError::InvalidSelectorSize {
                expected: 4,
                given: data.len(),
            });
        }

        if data[..4] == ERROR_SELECTOR {
            let args = ErrorDef::revert_string().decode_data(data)?;
            let message = args.first().and_then(Value::as_str).unwrap_or_default();
            return Ok(DecodedError::Revert(message.to_owned()));
        }
        if data[..4] == PANIC_SELECTOR {
            let args = ErrorDef::panic().decode_data(data)?;
            let code = args.first().and_then(Value::as_uint).unwrap_or_default();
            return Ok(DecodedError::Panic {
                code,
                reason: panic_reason(code),
            });
        }

        let query = Query::Hash(data[..4].to_vec());
        let error = self.resolve_error(&query, ResolveOptions::default())?;
        Ok(DecodedError::Custom {
            name: error.name.clone(),
            args: error.decode_data(data)?,
        })
    }
}
