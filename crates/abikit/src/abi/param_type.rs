//! ABI type grammar
//!
//! A [`ParamType`] is the parsed, immutable form of an ABI type string such
//! as `uint256`, `bytes20`, `(address,bool)[]` or `tuple[3]`. Tuple members
//! are named [`Param`]s so that struct values can be matched by name.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{AbiError, Result};

/// Size of one ABI word in bytes
pub(crate) const WORD: usize = 32;

/// Solidity parameter types
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ParamType {
    /// Address
    Address,
    /// Boolean
    Bool,
    /// Unsigned integer with bit size (8, 16, ..., 256)
    Uint(usize),
    /// Signed integer with bit size
    Int(usize),
    /// Fixed-size bytes (size 1-32)
    FixedBytes(usize),
    /// Dynamic bytes
    Bytes,
    /// UTF-8 string
    String,
    /// External function pointer (address + selector, 24 bytes)
    Function,
    /// Tuple with named components
    Tuple(Vec<Param>),
    /// Dynamic array
    Array(Box<ParamType>),
    /// Fixed-size array
    FixedArray(Box<ParamType>, usize),
}

/// A named parameter: a function input/output, event input, or tuple component
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "RawParam", into = "RawParam")]
pub struct Param {
    /// Parameter name, possibly empty
    pub name: String,
    /// Parameter type
    pub kind: ParamType,
    /// Whether an event input is stored in a topic
    pub indexed: bool,
    /// Solidity-level type name from the compiler, e.g. `struct Foo.Bar`
    pub internal_type: Option<String>,
}

impl Param {
    /// Create a named, non-indexed parameter
    pub fn new(name: impl Into<String>, kind: ParamType) -> Self {
        Self {
            name: name.into(),
            kind,
            indexed: false,
            internal_type: None,
        }
    }

    /// Create an unnamed parameter
    pub fn unnamed(kind: ParamType) -> Self {
        Self::new("", kind)
    }

    /// Mark the parameter as an indexed event input
    pub fn indexed(mut self) -> Self {
        self.indexed = true;
        self
    }
}

impl ParamType {
    /// Parse an ABI type string.
    ///
    /// `components` supplies the members of a `tuple` base type and is
    /// required for it; it is ignored for every other base type. Inline tuple
    /// syntax (`(uint256,bool)[]`) is accepted without components.
    pub fn parse(s: &str, components: Option<Vec<Param>>) -> Result<Self> {
        let s = s.trim();
        let (base, suffixes) = split_array_suffixes(s)?;

        let mut kind = if base == "tuple" {
            let components = components.ok_or_else(|| AbiError::MissingComponents(s.to_owned()))?;
            ParamType::Tuple(components)
        } else if base.starts_with('(') {
            parse_inline_tuple(base)?
        } else {
            parse_elementary(base).ok_or_else(|| AbiError::InvalidType(s.to_owned()))?
        };

        for length in suffixes {
            kind = match length {
                Some(n) => ParamType::FixedArray(Box::new(kind), n),
                None => ParamType::Array(Box::new(kind)),
            };
        }
        if kind.head_size().is_none() {
            return Err(AbiError::InvalidType(s.to_owned()));
        }
        Ok(kind)
    }

    /// Check if this type is dynamic (variable length)
    pub fn is_dynamic(&self) -> bool {
        match self {
            ParamType::Bytes | ParamType::String | ParamType::Array(_) => true,
            ParamType::FixedArray(inner, _) => inner.is_dynamic(),
            ParamType::Tuple(components) => components.iter().any(|c| c.kind.is_dynamic()),
            _ => false,
        }
    }

    /// Number of bytes this type occupies in the head of its enclosing block.
    ///
    /// Dynamic types take one offset word; static tuples and fixed arrays
    /// are laid out inline. `None` when the size overflows `usize`.
    pub fn head_size(&self) -> Option<usize> {
        if self.is_dynamic() {
            return Some(WORD);
        }
        match self {
            ParamType::FixedArray(inner, n) => inner.head_size()?.checked_mul(*n),
            ParamType::Tuple(components) => total_head_size(components.iter().map(|c| &c.kind)),
            _ => Some(WORD),
        }
    }

    /// Whether every integer and fixed-bytes width in this type is legal
    pub fn has_valid_widths(&self) -> bool {
        match self {
            ParamType::Uint(bits) | ParamType::Int(bits) => is_valid_int_width(*bits),
            ParamType::FixedBytes(size) => (1..=32).contains(size),
            ParamType::Array(inner) | ParamType::FixedArray(inner, _) => inner.has_valid_widths(),
            ParamType::Tuple(components) => components.iter().all(|c| c.kind.has_valid_widths()),
            _ => true,
        }
    }

    /// Type string in JSON ABI form, with tuples rendered as `tuple`
    pub fn type_name(&self) -> String {
        match self {
            ParamType::Tuple(_) => "tuple".to_owned(),
            ParamType::Array(inner) => format!("{}[]", inner.type_name()),
            ParamType::FixedArray(inner, n) => format!("{}[{}]", inner.type_name(), n),
            other => other.to_string(),
        }
    }

    /// Components of the innermost tuple, looking through array wrappers
    pub fn components(&self) -> Option<&[Param]> {
        match self {
            ParamType::Tuple(components) => Some(components),
            ParamType::Array(inner) | ParamType::FixedArray(inner, _) => inner.components(),
            _ => None,
        }
    }
}

/// Canonical signature form: tuples render as `(t1,t2)`.
impl fmt::Display for ParamType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParamType::Address => f.write_str("address"),
            ParamType::Bool => f.write_str("bool"),
            ParamType::Uint(bits) => write!(f, "uint{}", bits),
            ParamType::Int(bits) => write!(f, "int{}", bits),
            ParamType::FixedBytes(size) => write!(f, "bytes{}", size),
            ParamType::Bytes => f.write_str("bytes"),
            ParamType::String => f.write_str("string"),
            ParamType::Function => f.write_str("function"),
            ParamType::Tuple(components) => {
                f.write_str("(")?;
                for (i, c) in components.iter().enumerate() {
                    if i > 0 {
                        f.write_str(",")?;
                    }
                    write!(f, "{}", c.kind)?;
                }
                f.write_str(")")
            }
            ParamType::Array(inner) => write!(f, "{}[]", inner),
            ParamType::FixedArray(inner, n) => write!(f, "{}[{}]", inner, n),
        }
    }
}

impl FromStr for ParamType {
    type Err = AbiError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s, None)
    }
}

/// Summed head size of a block, `None` on overflow
pub(crate) fn total_head_size<'a>(kinds: impl IntoIterator<Item = &'a ParamType>) -> Option<usize> {
    kinds
        .into_iter()
        .try_fold(0usize, |total, kind| total.checked_add(kind.head_size()?))
}

/// Head size of a block, or `InvalidType` naming the block when it overflows
pub(crate) fn block_head_size(kinds: &[&ParamType]) -> Result<usize> {
    total_head_size(kinds.iter().copied()).ok_or_else(|| {
        let rendered: Vec<String> = kinds.iter().map(|k| k.to_string()).collect();
        AbiError::InvalidType(format!("({})", rendered.join(",")))
    })
}

pub(crate) fn is_valid_int_width(bits: usize) -> bool {
    bits % 8 == 0 && (8..=256).contains(&bits)
}

/// Split `T[2][]` into `("T", [Some(2), None])`
fn split_array_suffixes(s: &str) -> Result<(&str, Vec<Option<usize>>)> {
    let invalid = || AbiError::InvalidType(s.to_owned());

    let base_end = if s.starts_with('(') {
        matching_paren(s).ok_or_else(invalid)? + 1
    } else {
        s.find('[').unwrap_or(s.len())
    };
    let (base, mut rest) = s.split_at(base_end);

    let mut suffixes = Vec::new();
    while !rest.is_empty() {
        let inner = rest.strip_prefix('[').ok_or_else(invalid)?;
        let close = inner.find(']').ok_or_else(invalid)?;
        let digits = &inner[..close];
        if digits.is_empty() {
            suffixes.push(None);
        } else {
            if !digits.bytes().all(|b| b.is_ascii_digit()) {
                return Err(invalid());
            }
            let n: usize = digits.parse().map_err(|_| invalid())?;
            suffixes.push(Some(n));
        }
        rest = &inner[close + 1..];
    }
    Ok((base, suffixes))
}

/// Index of the paren closing the one at position 0
fn matching_paren(s: &str) -> Option<usize> {
    let mut depth = 0usize;
    for (i, c) in s.char_indices() {
        match c {
            '(' => depth += 1,
            ')' => {
                depth = depth.checked_sub(1)?;
                if depth == 0 {
                    return Some(i);
                }
            }
            _ => {}
        }
    }
    None
}

/// Split on `sep` outside of any parentheses
pub(crate) fn split_top_level(s: &str, sep: char) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut depth = 0usize;
    let mut start = 0;
    for (i, c) in s.char_indices() {
        match c {
            '(' => depth += 1,
            ')' => depth = depth.saturating_sub(1),
            c if c == sep && depth == 0 => {
                parts.push(&s[start..i]);
                start = i + c.len_utf8();
            }
            _ => {}
        }
    }
    parts.push(&s[start..]);
    parts
}

fn parse_inline_tuple(base: &str) -> Result<ParamType> {
    let inner = &base[1..base.len() - 1];
    if inner.trim().is_empty() {
        return Ok(ParamType::Tuple(Vec::new()));
    }
    let components = split_top_level(inner, ',')
        .into_iter()
        .map(|member| ParamType::parse(member, None).map(Param::unnamed))
        .collect::<Result<Vec<_>>>()?;
    Ok(ParamType::Tuple(components))
}

fn parse_elementary(base: &str) -> Option<ParamType> {
    match base {
        "address" => return Some(ParamType::Address),
        "bool" => return Some(ParamType::Bool),
        "string" => return Some(ParamType::String),
        "bytes" => return Some(ParamType::Bytes),
        "function" => return Some(ParamType::Function),
        "uint" => return Some(ParamType::Uint(256)),
        "int" => return Some(ParamType::Int(256)),
        _ => {}
    }

    if let Some(bits) = base.strip_prefix("uint") {
        return parse_width(bits).filter(|b| is_valid_int_width(*b)).map(ParamType::Uint);
    }
    if let Some(bits) = base.strip_prefix("int") {
        return parse_width(bits).filter(|b| is_valid_int_width(*b)).map(ParamType::Int);
    }
    if let Some(size) = base.strip_prefix("bytes") {
        return parse_width(size)
            .filter(|n| (1..=32).contains(n))
            .map(ParamType::FixedBytes);
    }
    None
}

/// Parse a decimal width without sign or leading zeros
fn parse_width(digits: &str) -> Option<usize> {
    if digits.is_empty() || digits.starts_with('0') || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    digits.parse().ok()
}

/// JSON ABI parameter shape
#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawParam {
    #[serde(default)]
    name: String,
    #[serde(rename = "type")]
    kind: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    components: Option<Vec<Param>>,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    indexed: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    internal_type: Option<String>,
}

impl TryFrom<RawParam> for Param {
    type Error = AbiError;

    fn try_from(raw: RawParam) -> Result<Self> {
        Ok(Param {
            kind: ParamType::parse(&raw.kind, raw.components)?,
            name: raw.name,
            indexed: raw.indexed,
            internal_type: raw.internal_type,
        })
    }
}

impl From<Param> for RawParam {
    fn from(param: Param) -> Self {
        RawParam {
            kind: param.kind.type_name(),
            components: param.kind.components().map(<[Param]>::to_vec),
            name: param.name,
            indexed: param.indexed,
            internal_type: param.internal_type,
        }
    }
}
