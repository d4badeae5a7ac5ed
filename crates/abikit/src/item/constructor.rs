//! Contract deployment data

use super::{Abi, ConstructorDef};
use crate::abi::{decode, encode, Value};
use crate::error::{AbiError, Result};
use crate::signature::signature_of;

impl ConstructorDef {
    /// Canonical signature, e.g. `constructor(uint256)`
    pub fn signature(&self) -> String {
        signature_of("constructor", &self.inputs)
    }

    /// Deployment data: creation bytecode followed by the encoded arguments
    pub fn encode_deploy(&self, bytecode: &[u8], args: &[Value]) -> Result<Vec<u8>> {
        let mut data = bytecode.to_vec();
        data.extend(encode(&self.inputs, args)?);
        Ok(data)
    }

    /// Decode the constructor arguments appended to `bytecode` in `data`
    pub fn decode_deploy(&self, bytecode: &[u8], data: &[u8]) -> Result<Vec<Value>> {
        let args = data
            .strip_prefix(bytecode)
            .ok_or_else(|| AbiError::BytecodeMismatch(self.signature()))?;
        decode(&self.inputs, args)
    }
}

impl Abi {
    /// Deployment data for this ABI's constructor.
    ///
    /// An ABI without a constructor only deploys without arguments.
    pub fn encode_deploy(&self, bytecode: &[u8], args: &[Value]) -> Result<Vec<u8>> {
        match self.constructor() {
            Some(constructor) => constructor.encode_deploy(bytecode, args),
            None if args.is_empty() => Ok(bytecode.to_vec()),
            None => Err(AbiError::ItemNotFound("constructor".to_owned())),
        }
    }
}
