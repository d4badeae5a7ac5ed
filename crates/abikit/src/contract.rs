//! Contract interaction helpers

use abikit_primitives::{Address, H256};
use bytes::Bytes;

use crate::abi::{decode, DecodeAs, Param, ParamType, Value};
use crate::error::{AbiError, Result};
use crate::item::{Abi, AbiItem, DecodedError, DecodedLog, EventDef, FunctionDef};
use crate::resolve::{Query, ResolveOptions};

/// Human-readable ERC-20 interface
pub const ERC20_ABI: &[&str] = &[
    "function name() view returns (string)",
    "function symbol() view returns (string)",
    "function decimals() view returns (uint8)",
    "function totalSupply() view returns (uint256)",
    "function balanceOf(address owner) view returns (uint256)",
    "function transfer(address to, uint256 amount) returns (bool)",
    "function approve(address spender, uint256 amount) returns (bool)",
    "function allowance(address owner, address spender) view returns (uint256)",
    "function transferFrom(address from, address to, uint256 amount) returns (bool)",
    "event Transfer(address indexed from, address indexed to, uint256 value)",
    "event Approval(address indexed owner, address indexed spender, uint256 value)",
];

/// Contract helper for encoding/decoding function calls.
///
/// Calls are resolved against the ABI with their arguments, so overloaded
/// functions pick the overload the arguments fit.
#[derive(Debug, Clone)]
pub struct Contract {
    /// Contract address
    address: Address,
    /// Contract interface
    abi: Abi,
}

impl Contract {
    /// Create a new contract helper
    pub fn new(address: Address, abi: Abi) -> Self {
        Self { address, abi }
    }

    /// Create a contract helper from human-readable declarations
    pub fn from_human_readable(address: Address, declarations: &[&str]) -> Result<Self> {
        Ok(Self::new(address, Abi::parse_human_readable(declarations)?))
    }

    /// Get the contract address
    pub fn address(&self) -> &Address {
        &self.address
    }

    /// Get the contract interface
    pub fn abi(&self) -> &Abi {
        &self.abi
    }

    /// Get a function by name
    pub fn function(&self, name: &str) -> Option<&FunctionDef> {
        self.abi.function(name).ok()
    }

    /// Encode a function call
    pub fn encode_call(&self, function_name: &str, args: &[Value]) -> Result<Bytes> {
        let query = Query::NameWithArgs {
            name: function_name,
            args,
        };
        let function = self.abi.resolve_function(&query, ResolveOptions { prepare: false })?;
        Ok(Bytes::from(function.encode_data(args)?))
    }

    /// Decode call data sent to this contract
    pub fn decode_call(&self, data: &[u8]) -> Result<(&FunctionDef, Vec<Value>)> {
        if data.len() < 4 {
            return Err(AbiError::InvalidSelectorSize {
                expected: 4,
                given: data.len(),
            });
        }
        let function = self
            .abi
            .resolve_function(&Query::Hash(data[..4].to_vec()), ResolveOptions { prepare: false })?;
        Ok((function, function.decode_data(data)?))
    }

    /// Decode function output
    pub fn decode_output(&self, function_name: &str, data: &[u8]) -> Result<Vec<Value>> {
        let function = self.abi.function(function_name)?;
        decode(&function.outputs, data)
    }

    /// Decode function output, unwrapping single return values
    pub fn decode_result(&self, function_name: &str, data: &[u8], shape: DecodeAs) -> Result<Value> {
        self.abi.function(function_name)?.decode_result(data, shape)
    }

    /// Decode revert data
    pub fn decode_error(&self, data: &[u8]) -> Result<DecodedError> {
        self.abi.decode_error(data)
    }

    /// Decode a log emitted by this contract, looking the event up by its
    /// signature topic
    pub fn decode_log(&self, topics: &[H256], data: &[u8], shape: DecodeAs) -> Result<DecodedLog> {
        let topic = topics.first().ok_or_else(|| AbiError::TopicCountMismatch {
            signature: String::new(),
            expected: 1,
            given: 0,
        })?;
        let event = self
            .abi
            .resolve_event(&Query::Hash(topic.as_bytes().to_vec()), ResolveOptions { prepare: false })?;
        event.decode_log(topics, data, shape)
    }
}

/// Builder for creating common contract interfaces
pub struct ContractBuilder {
    address: Address,
    abi: Abi,
}

impl ContractBuilder {
    /// Create a new contract builder
    pub fn new(address: Address) -> Self {
        Self {
            address,
            abi: Abi::new(),
        }
    }

    /// Add a function with unnamed parameters
    pub fn function(mut self, name: &str, inputs: Vec<ParamType>, outputs: Vec<ParamType>) -> Self {
        self.abi.push(FunctionDef::new(
            name,
            inputs.into_iter().map(Param::unnamed).collect(),
            outputs.into_iter().map(Param::unnamed).collect(),
        ));
        self
    }

    /// Add an event
    pub fn event(mut self, name: &str, inputs: Vec<Param>) -> Self {
        self.abi.push(EventDef::new(name, inputs));
        self
    }

    /// Add any ABI item
    pub fn item(mut self, item: impl Into<AbiItem>) -> Self {
        self.abi.push(item);
        self
    }

    /// Build the contract
    pub fn build(self) -> Contract {
        Contract {
            address: self.address,
            abi: self.abi,
        }
    }
}

/// Create an ERC20 contract helper from [`ERC20_ABI`]
pub fn erc20(address: Address) -> Result<Contract> {
    Contract::from_human_readable(address, ERC20_ABI)
}
