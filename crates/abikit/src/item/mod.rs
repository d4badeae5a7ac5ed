//! ABI items and the ABI document
//!
//! An [`Abi`] is an ordered list of [`AbiItem`]s as emitted by the Solidity
//! compiler. Item order is significant: overload resolution breaks ties by
//! position.

mod constructor;
mod event;
mod function;
mod revert;

use serde::{Deserialize, Serialize};

use crate::abi::Param;
use crate::error::Result;
use crate::signature;

pub use event::DecodedLog;
pub use revert::DecodedError;

/// Function state mutability
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StateMutability {
    /// Does not read or modify state
    Pure,
    /// Reads but does not modify state
    View,
    /// Modifies state, rejects value
    #[default]
    NonPayable,
    /// Modifies state, accepts value
    Payable,
}

impl StateMutability {
    fn payable() -> Self {
        StateMutability::Payable
    }
}

/// Function definition
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FunctionDef {
    /// Function name
    pub name: String,
    /// Input parameters
    #[serde(default)]
    pub inputs: Vec<Param>,
    /// Output parameters
    #[serde(default)]
    pub outputs: Vec<Param>,
    /// State mutability
    #[serde(default)]
    pub state_mutability: StateMutability,
}

impl FunctionDef {
    /// Create a non-payable function definition
    pub fn new(name: impl Into<String>, inputs: Vec<Param>, outputs: Vec<Param>) -> Self {
        Self {
            name: name.into(),
            inputs,
            outputs,
            state_mutability: StateMutability::NonPayable,
        }
    }
}

/// Event definition
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventDef {
    /// Event name
    pub name: String,
    /// Inputs; `indexed` ones are stored in topics
    #[serde(default)]
    pub inputs: Vec<Param>,
    /// Anonymous events have no signature topic
    #[serde(default)]
    pub anonymous: bool,
}

impl EventDef {
    /// Create a non-anonymous event definition
    pub fn new(name: impl Into<String>, inputs: Vec<Param>) -> Self {
        Self {
            name: name.into(),
            inputs,
            anonymous: false,
        }
    }
}

/// Custom error definition
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorDef {
    /// Error name
    pub name: String,
    /// Error parameters
    #[serde(default)]
    pub inputs: Vec<Param>,
}

impl ErrorDef {
    /// Create an error definition
    pub fn new(name: impl Into<String>, inputs: Vec<Param>) -> Self {
        Self {
            name: name.into(),
            inputs,
        }
    }
}

/// Constructor definition
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConstructorDef {
    /// Constructor parameters
    #[serde(default)]
    pub inputs: Vec<Param>,
    /// State mutability
    #[serde(default)]
    pub state_mutability: StateMutability,
}

/// Fallback function definition
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FallbackDef {
    /// State mutability
    #[serde(default)]
    pub state_mutability: StateMutability,
}

/// Receive function definition
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReceiveDef {
    /// State mutability, always payable
    #[serde(default = "StateMutability::payable")]
    pub state_mutability: StateMutability,
}

impl Default for ReceiveDef {
    fn default() -> Self {
        Self {
            state_mutability: StateMutability::Payable,
        }
    }
}

/// One entry of a contract interface
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum AbiItem {
    /// Function
    Function(FunctionDef),
    /// Event
    Event(EventDef),
    /// Custom error
    Error(ErrorDef),
    /// Constructor
    Constructor(ConstructorDef),
    /// Fallback function
    Fallback(FallbackDef),
    /// Receive function
    Receive(ReceiveDef),
}

impl AbiItem {
    /// Item type as written in the JSON ABI
    pub fn item_type(&self) -> &'static str {
        match self {
            AbiItem::Function(_) => "function",
            AbiItem::Event(_) => "event",
            AbiItem::Error(_) => "error",
            AbiItem::Constructor(_) => "constructor",
            AbiItem::Fallback(_) => "fallback",
            AbiItem::Receive(_) => "receive",
        }
    }

    /// Item name; empty for constructor, fallback and receive
    pub fn name(&self) -> &str {
        match self {
            AbiItem::Function(f) => &f.name,
            AbiItem::Event(e) => &e.name,
            AbiItem::Error(e) => &e.name,
            AbiItem::Constructor(_) | AbiItem::Fallback(_) | AbiItem::Receive(_) => "",
        }
    }

    /// Input parameters
    pub fn inputs(&self) -> &[Param] {
        match self {
            AbiItem::Function(f) => &f.inputs,
            AbiItem::Event(e) => &e.inputs,
            AbiItem::Error(e) => &e.inputs,
            AbiItem::Constructor(c) => &c.inputs,
            AbiItem::Fallback(_) | AbiItem::Receive(_) => &[],
        }
    }

    /// Output parameters; only functions have any
    pub fn outputs(&self) -> &[Param] {
        match self {
            AbiItem::Function(f) => &f.outputs,
            _ => &[],
        }
    }

    /// State mutability of callable items
    pub fn state_mutability(&self) -> Option<StateMutability> {
        match self {
            AbiItem::Function(f) => Some(f.state_mutability),
            AbiItem::Constructor(c) => Some(c.state_mutability),
            AbiItem::Fallback(f) => Some(f.state_mutability),
            AbiItem::Receive(r) => Some(r.state_mutability),
            AbiItem::Event(_) | AbiItem::Error(_) => None,
        }
    }

    /// Whether this is an anonymous event
    pub fn is_anonymous(&self) -> bool {
        matches!(self, AbiItem::Event(e) if e.anonymous)
    }

    /// Canonical signature, e.g. `transfer(address,uint256)`
    pub fn signature(&self) -> String {
        signature::format_signature(self)
    }

    /// Topic for events, selector for everything else
    pub fn hash(&self) -> Vec<u8> {
        signature::compute_hash(self)
    }
}

impl From<FunctionDef> for AbiItem {
    fn from(f: FunctionDef) -> Self {
        AbiItem::Function(f)
    }
}

impl From<EventDef> for AbiItem {
    fn from(e: EventDef) -> Self {
        AbiItem::Event(e)
    }
}

impl From<ErrorDef> for AbiItem {
    fn from(e: ErrorDef) -> Self {
        AbiItem::Error(e)
    }
}

impl From<ConstructorDef> for AbiItem {
    fn from(c: ConstructorDef) -> Self {
        AbiItem::Constructor(c)
    }
}

/// A contract interface: an ordered list of items
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Abi {
    items: Vec<AbiItem>,
}

impl Abi {
    /// Create an empty ABI
    pub fn new() -> Self {
        Self::default()
    }

    /// Load a JSON ABI as produced by `solc`
    pub fn from_json(json: &str) -> Result<Self> {
        let abi: Abi = serde_json::from_str(json)?;
        tracing::debug!(items = abi.items.len(), "loaded JSON ABI");
        Ok(abi)
    }

    /// Render as a JSON ABI
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    /// Parse human-readable declarations such as
    /// `function transfer(address to, uint256 amount) returns (bool)`
    pub fn parse_human_readable(declarations: &[&str]) -> Result<Self> {
        let items = declarations
            .iter()
            .map(|d| crate::human::parse(d))
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { items })
    }

    /// Append an item
    pub fn push(&mut self, item: impl Into<AbiItem>) {
        self.items.push(item.into());
    }

    /// Append an item with builder pattern
    pub fn with(mut self, item: impl Into<AbiItem>) -> Self {
        self.items.push(item.into());
        self
    }

    /// Items in declaration order
    pub fn items(&self) -> &[AbiItem] {
        &self.items
    }

    /// Iterate over items
    pub fn iter(&self) -> std::slice::Iter<'_, AbiItem> {
        self.items.iter()
    }

    /// Number of items
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Check if the ABI has no items
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// All function definitions
    pub fn functions(&self) -> impl Iterator<Item = &FunctionDef> {
        self.items.iter().filter_map(|item| match item {
            AbiItem::Function(f) => Some(f),
            _ => None,
        })
    }

    /// All event definitions
    pub fn events(&self) -> impl Iterator<Item = &EventDef> {
        self.items.iter().filter_map(|item| match item {
            AbiItem::Event(e) => Some(e),
            _ => None,
        })
    }

    /// All custom error definitions
    pub fn errors(&self) -> impl Iterator<Item = &ErrorDef> {
        self.items.iter().filter_map(|item| match item {
            AbiItem::Error(e) => Some(e),
            _ => None,
        })
    }

    /// The constructor, if declared
    pub fn constructor(&self) -> Option<&ConstructorDef> {
        self.items.iter().find_map(|item| match item {
            AbiItem::Constructor(c) => Some(c),
            _ => None,
        })
    }
}

impl From<Vec<AbiItem>> for Abi {
    fn from(items: Vec<AbiItem>) -> Self {
        Self { items }
    }
}

impl FromIterator<AbiItem> for Abi {
    fn from_iter<I: IntoIterator<Item = AbiItem>>(iter: I) -> Self {
        Self {
            items: iter.into_iter().collect(),
        }
    }
}

impl<'a> IntoIterator for &'a Abi {
    type Item = &'a AbiItem;
    type IntoIter = std::slice::Iter<'a, AbiItem>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}
