//! Function call data and results

use abikit_crypto::Selector;

use super::FunctionDef;
use crate::abi::{decode, decode_output, encode, encode_function_call, DecodeAs, Value};
use crate::error::{AbiError, Result};
use crate::signature::signature_of;

impl FunctionDef {
    /// Canonical signature, e.g. `transfer(address,uint256)`
    pub fn signature(&self) -> String {
        signature_of(&self.name, &self.inputs)
    }

    /// 4-byte function selector
    pub fn selector(&self) -> Selector {
        abikit_crypto::selector(&self.signature())
    }

    /// Encode call data: selector followed by the encoded arguments
    pub fn encode_data(&self, args: &[Value]) -> Result<Vec<u8>> {
        encode_function_call(self.selector(), &self.inputs, args)
    }

    /// Decode call data produced by [`FunctionDef::encode_data`]
    pub fn decode_data(&self, data: &[u8]) -> Result<Vec<Value>> {
        let args = strip_selector(self.selector(), &self.signature(), data)?;
        decode(&self.inputs, args)
    }

    /// Encode return data
    pub fn encode_result(&self, values: &[Value]) -> Result<Vec<u8>> {
        encode(&self.outputs, values)
    }

    /// Decode return data; a single output is returned bare
    pub fn decode_result(&self, data: &[u8], shape: DecodeAs) -> Result<Value> {
        decode_output(&self.outputs, data, shape)
    }
}

/// Check the 4-byte prefix of call or revert data and return the rest
pub(crate) fn strip_selector<'d>(expected: Selector, signature: &str, data: &'d [u8]) -> Result<&'d [u8]> {
    if data.len() < 4 {
        return Err(AbiError::InvalidSelectorSize {
            expected: 4,
            given: data.len(),
        });
    }
    let (given, rest) = data.split_at(4);
    if given != &expected[..] {
        return Err(AbiError::SelectorMismatch {
            expected: format!("0x{}", hex::encode(expected)),
            given: format!("0x{}", hex::encode(given)),
            signature: signature.to_owned(),
        });
    }
    Ok(rest)
}
