//! Non-standard packed encoding (`abi.encodePacked`)
//!
//! Scalars use their natural width, `bytes`/`string` are emitted raw without
//! a length, and array elements are padded to a full word. Tuples have no
//! packed form.

use super::encode::{
    address_of, bytes_of, check_int_width, checked_int, checked_uint, encode_u256, invalid_argument,
    sequence_of,
};
use super::param_type::{Param, ParamType, WORD};
use super::value::Value;
use crate::error::{AbiError, Result};

/// Packed-encode `values` against `params`
pub fn encode_packed(params: &[Param], values: &[Value]) -> Result<Vec<u8>> {
    if params.len() != values.len() {
        return Err(AbiError::LengthMismatch {
            expected: params.len(),
            given: values.len(),
        });
    }

    let mut out = Vec::new();
    for (param, value) in params.iter().zip(values) {
        out.extend(pack(&param.kind, value, false)?);
    }
    Ok(out)
}

/// Packed encoding of one value; `in_array` pads static scalars to a word
fn pack(kind: &ParamType, value: &Value, in_array: bool) -> Result<Vec<u8>> {
    let packed = match kind {
        ParamType::Address => address_of(value)?.as_bytes().to_vec(),
        ParamType::Bool => match value {
            Value::Bool(b) => vec![*b as u8],
            _ => return Err(invalid_argument(kind, value)),
        },
        ParamType::Uint(bits) => {
            check_int_width(kind, *bits)?;
            let word = encode_u256(&checked_uint(kind, *bits, value)?);
            word[WORD - bits / 8..].to_vec()
        }
        ParamType::Int(bits) => {
            check_int_width(kind, *bits)?;
            let word = encode_u256(&checked_int(kind, *bits, value)?.to_twos_complement());
            word[WORD - bits / 8..].to_vec()
        }
        ParamType::FixedBytes(size) => {
            if *size == 0 || *size > WORD {
                return Err(AbiError::InvalidType(kind.to_string()));
            }
            let data = bytes_of(kind, value)?;
            if data.len() > *size {
                return Err(AbiError::BytesSizeMismatch {
                    expected: *size,
                    given: data.len(),
                });
            }
            let mut buf = vec![0u8; *size];
            buf[..data.len()].copy_from_slice(&data);
            buf
        }
        ParamType::Function => {
            let data = bytes_of(kind, value)?;
            if data.len() > 24 {
                return Err(AbiError::BytesSizeMismatch {
                    expected: 24,
                    given: data.len(),
                });
            }
            let mut buf = vec![0u8; 24];
            buf[..data.len()].copy_from_slice(&data);
            buf
        }
        // Raw payload even inside arrays
        ParamType::Bytes => return bytes_of(kind, value),
        ParamType::String => match value {
            Value::String(s) => return Ok(s.as_bytes().to_vec()),
            _ => return Err(invalid_argument(kind, value)),
        },
        ParamType::Array(inner) => return pack_elements(inner, sequence_of(kind, value)?),
        ParamType::FixedArray(inner, n) => {
            let items = sequence_of(kind, value)?;
            if items.len() != *n {
                return Err(AbiError::ArrayLengthMismatch {
                    kind: kind.to_string(),
                    expected: *n,
                    given: items.len(),
                });
            }
            return pack_elements(inner, items);
        }
        ParamType::Tuple(_) => return Err(AbiError::InvalidType(kind.to_string())),
    };

    if in_array {
        Ok(pad_to_word(kind, packed))
    } else {
        Ok(packed)
    }
}

fn pack_elements(inner: &ParamType, items: &[Value]) -> Result<Vec<u8>> {
    let mut out = Vec::with_capacity(items.len() * WORD);
    for item in items {
        out.extend(pack(inner, item, true)?);
    }
    Ok(out)
}

/// Numbers and addresses are left-padded, byte strings right-padded
fn pad_to_word(kind: &ParamType, packed: Vec<u8>) -> Vec<u8> {
    let mut word = vec![0u8; WORD];
    match kind {
        ParamType::FixedBytes(_) | ParamType::Function => word[..packed.len()].copy_from_slice(&packed),
        ParamType::Int(_) => {
            // sign-extend
            if packed.first().map_or(false, |b| b & 0x80 != 0) {
                word.fill(0xff);
            }
            word[WORD - packed.len()..].copy_from_slice(&packed);
        }
        _ => word[WORD - packed.len()..].copy_from_slice(&packed),
    }
    word
}
