//! ABI encoding

use abikit_crypto::Selector;
use abikit_primitives::{Address, U256};

use super::param_type::{block_head_size, is_valid_int_width, Param, ParamType, WORD};
use super::value::{I256, Value};
use crate::error::{AbiError, Result};

/// Encode values according to the Solidity ABI head/tail layout.
///
/// `params` and `values` must have the same length.
pub fn encode(params: &[Param], values: &[Value]) -> Result<Vec<u8>> {
    if params.len() != values.len() {
        return Err(AbiError::LengthMismatch {
            expected: params.len(),
            given: values.len(),
        });
    }
    tracing::trace!(params = params.len(), "encoding ABI parameters");

    let items: Vec<(&ParamType, &Value)> = params.iter().map(|p| &p.kind).zip(values).collect();
    encode_block(&items)
}

/// Encode values and render the result as `0x`-prefixed hex
pub fn encode_hex(params: &[Param], values: &[Value]) -> Result<String> {
    Ok(format!("0x{}", hex::encode(encode(params, values)?)))
}

/// Encode function call (selector + params)
pub fn encode_function_call(selector: Selector, params: &[Param], values: &[Value]) -> Result<Vec<u8>> {
    let mut result = selector.to_vec();
    result.extend(encode(params, values)?);
    Ok(result)
}

/// Encode one head/tail block.
///
/// Offsets in the head are relative to the start of this block.
fn encode_block(items: &[(&ParamType, &Value)]) -> Result<Vec<u8>> {
    // Calculate head size (fixed part)
    let kinds: Vec<&ParamType> = items.iter().map(|(kind, _)| *kind).collect();
    let head_size = block_head_size(&kinds)?;

    // capacity bounded by the values actually supplied
    let mut head = Vec::with_capacity(head_size.min(items.len() * WORD));
    let mut tail = Vec::new();

    for (kind, value) in items {
        let encoded = encode_value(kind, value)?;
        if kind.is_dynamic() {
            head.extend(encode_usize(head_size + tail.len()));
            tail.extend(encoded);
        } else {
            head.extend(encoded);
        }
    }

    head.extend(tail);
    Ok(head)
}

/// Encode a single value: inline bytes for static types, tail content for
/// dynamic ones
fn encode_value(kind: &ParamType, value: &Value) -> Result<Vec<u8>> {
    match kind {
        ParamType::Address => Ok(address_of(value)?.to_word().to_vec()),
        ParamType::Bool => match value {
            Value::Bool(b) => Ok(encode_u256(&U256::from(*b as u8))),
            _ => Err(invalid_argument(kind, value)),
        },
        ParamType::Uint(bits) => {
            check_int_width(kind, *bits)?;
            Ok(encode_u256(&checked_uint(kind, *bits, value)?))
        }
        ParamType::Int(bits) => {
            check_int_width(kind, *bits)?;
            let int = checked_int(kind, *bits, value)?;
            Ok(encode_u256(&int.to_twos_complement()))
        }
        ParamType::FixedBytes(size) => {
            if !(1..=32).contains(size) {
                return Err(AbiError::InvalidType(kind.to_string()));
            }
            encode_fixed_bytes(*size, &bytes_of(kind, value)?)
        }
        // address (20) followed by selector (4)
        ParamType::Function => encode_fixed_bytes(24, &bytes_of(kind, value)?),
        ParamType::Bytes => Ok(encode_bytes(&bytes_of(kind, value)?)),
        ParamType::String => match value {
            Value::String(s) => Ok(encode_bytes(s.as_bytes())),
            _ => Err(invalid_argument(kind, value)),
        },
        ParamType::Array(inner) => {
            let items = sequence_of(kind, value)?;
            let mut result = encode_usize(items.len());
            let block: Vec<_> = items.iter().map(|v| (inner.as_ref(), v)).collect();
            result.extend(encode_block(&block)?);
            Ok(result)
        }
        ParamType::FixedArray(inner, size) => {
            let items = sequence_of(kind, value)?;
            if items.len() != *size {
                return Err(AbiError::ArrayLengthMismatch {
                    kind: kind.to_string(),
                    expected: *size,
                    given: items.len(),
                });
            }
            let block: Vec<_> = items.iter().map(|v| (inner.as_ref(), v)).collect();
            encode_block(&block)
        }
        ParamType::Tuple(components) => {
            let values = tuple_values(components, value)?;
            let block: Vec<_> = components.iter().map(|c| &c.kind).zip(values).collect();
            encode_block(&block)
        }
    }
}

/// Order a tuple value's members by component
pub(crate) fn tuple_values<'v>(components: &[Param], value: &'v Value) -> Result<Vec<&'v Value>> {
    match value {
        Value::Struct(_) => {
            let mut found = Vec::with_capacity(components.len());
            let mut missing = Vec::new();
            for c in components {
                match value.field(&c.name) {
                    Some(v) => found.push(v),
                    None => missing.push(c.name.clone()),
                }
            }
            if !missing.is_empty() {
                return Err(AbiError::MissingComponent { names: missing });
            }
            Ok(found)
        }
        Value::Tuple(items) | Value::Array(items) => {
            if items.len() != components.len() {
                return Err(AbiError::LengthMismatch {
                    expected: components.len(),
                    given: items.len(),
                });
            }
            Ok(items.iter().collect())
        }
        _ => Err(invalid_argument(&ParamType::Tuple(components.to_vec()), value)),
    }
}

pub(crate) fn sequence_of<'v>(kind: &ParamType, value: &'v Value) -> Result<&'v [Value]> {
    value.as_slice().ok_or_else(|| invalid_argument(kind, value))
}

pub(crate) fn address_of(value: &Value) -> Result<Address> {
    match value {
        Value::Address(a) => Ok(*a),
        Value::String(s) => Address::from_hex(s).map_err(|_| AbiError::InvalidAddress(s.clone())),
        Value::Bytes(b) => {
            Address::from_slice(b).map_err(|_| AbiError::InvalidAddress(format!("0x{}", hex::encode(b))))
        }
        _ => Err(invalid_argument(&ParamType::Address, value)),
    }
}

/// Raw bytes of a byte-like value; hex strings must carry a `0x` prefix
pub(crate) fn bytes_of(kind: &ParamType, value: &Value) -> Result<Vec<u8>> {
    match value {
        Value::Bytes(b) => Ok(b.clone()),
        Value::String(s) => match s.strip_prefix("0x") {
            Some(digits) => Ok(hex::decode(digits)?),
            None => Err(invalid_argument(kind, value)),
        },
        _ => Err(invalid_argument(kind, value)),
    }
}

pub(crate) fn check_int_width(kind: &ParamType, bits: usize) -> Result<()> {
    if is_valid_int_width(bits) {
        Ok(())
    } else {
        Err(AbiError::InvalidType(kind.to_string()))
    }
}

/// Unsigned value checked against `[0, 2^bits)`
pub(crate) fn checked_uint(kind: &ParamType, bits: usize, value: &Value) -> Result<U256> {
    let max = uint_max(bits);
    let out_of_range = |rendered: String| AbiError::IntegerOutOfRange {
        value: rendered,
        kind: kind.to_string(),
        min: "0".to_owned(),
        max: max.to_string(),
    };
    let v = match value {
        Value::Uint(v) => *v,
        Value::Int(i) if i.is_negative() => return Err(out_of_range(i.to_string())),
        Value::Int(i) => i.abs(),
        _ => return Err(invalid_argument(kind, value)),
    };
    if v > max {
        return Err(out_of_range(v.to_string()));
    }
    Ok(v)
}

/// Signed value checked against `[-2^(bits-1), 2^(bits-1))`
pub(crate) fn checked_int(kind: &ParamType, bits: usize, value: &Value) -> Result<I256> {
    let int = match value {
        Value::Int(i) => *i,
        Value::Uint(v) => I256::new(*v, false),
        _ => return Err(invalid_argument(kind, value)),
    };
    // 2^(bits-1): magnitude of the minimum
    let limit = U256::one() << (bits - 1);
    let in_range = if int.is_negative() {
        int.abs() <= limit
    } else {
        int.abs() < limit
    };
    if !in_range {
        return Err(AbiError::IntegerOutOfRange {
            value: int.to_string(),
            kind: kind.to_string(),
            min: format!("-{}", limit),
            max: (limit - U256::one()).to_string(),
        });
    }
    Ok(int)
}

pub(crate) fn uint_max(bits: usize) -> U256 {
    if bits >= 256 {
        U256::MAX
    } else {
        (U256::one() << bits) - U256::one()
    }
}

pub(crate) fn invalid_argument(kind: &ParamType, value: &Value) -> AbiError {
    AbiError::InvalidArgumentType {
        expected: kind.to_string(),
        value: value.to_string(),
    }
}

/// Right-pad fixed-size bytes into one word
fn encode_fixed_bytes(size: usize, data: &[u8]) -> Result<Vec<u8>> {
    if data.len() > size {
        return Err(AbiError::BytesSizeMismatch {
            expected: size,
            given: data.len(),
        });
    }
    let mut buf = vec![0u8; WORD];
    buf[..data.len()].copy_from_slice(data);
    Ok(buf)
}

/// Encode a U256 as 32 bytes
pub(crate) fn encode_u256(value: &U256) -> Vec<u8> {
    let mut bytes = [0u8; WORD];
    value.to_big_endian(&mut bytes);
    bytes.to_vec()
}

fn encode_usize(value: usize) -> Vec<u8> {
    encode_u256(&U256::from(value))
}

/// Encode dynamic bytes: length word, then data right-padded to a word boundary
fn encode_bytes(data: &[u8]) -> Vec<u8> {
    let mut result = encode_usize(data.len());

    let padded_len = data.len().div_ceil(WORD) * WORD;
    let mut padded = vec![0u8; padded_len];
    padded[..data.len()].copy_from_slice(data);
    result.extend(padded);

    result
}
