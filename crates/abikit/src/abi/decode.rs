//! ABI decoding

use std::cell::Cell;
use std::collections::HashSet;

use abikit_primitives::{Address, U256};

use super::param_type::{block_head_size, Param, ParamType, WORD};
use super::value::{I256, Value};
use crate::error::{AbiError, Result};

/// Shape of decoded parameter lists and tuples
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DecodeAs {
    /// `Value::Tuple` in declaration order
    #[default]
    Positional,
    /// `Value::Struct` keyed by name, when every name is present and unique
    Named,
}

/// Decode values from ABI-encoded data, positionally
pub fn decode(params: &[Param], data: &[u8]) -> Result<Vec<Value>> {
    decode_values(params, data, DecodeAs::Positional)
}

/// Decode a parameter list into a single tuple or struct value
pub fn decode_as(params: &[Param], data: &[u8], shape: DecodeAs) -> Result<Value> {
    let values = decode_values(params, data, shape)?;
    Ok(wrap_values(params, values, shape))
}

/// Decode function return data.
///
/// A single output is returned bare instead of inside a one-element tuple.
pub fn decode_output(params: &[Param], data: &[u8], shape: DecodeAs) -> Result<Value> {
    let mut values = decode_values(params, data, shape)?;
    if values.len() == 1 {
        if let Some(value) = values.pop() {
            return Ok(value);
        }
    }
    Ok(wrap_values(params, values, shape))
}

pub(crate) fn decode_values(params: &[Param], data: &[u8], shape: DecodeAs) -> Result<Vec<Value>> {
    if params.is_empty() {
        return Ok(Vec::new());
    }
    if let Some(bad) = params.iter().find(|p| !p.kind.has_valid_widths()) {
        return Err(AbiError::InvalidType(bad.kind.to_string()));
    }

    let kinds: Vec<&ParamType> = params.iter().map(|p| &p.kind).collect();
    let head_size = block_head_size(&kinds)?;
    if data.len() < head_size {
        return Err(AbiError::DataSizeTooSmall {
            expected: head_size,
            given: data.len(),
        });
    }
    tracing::trace!(params = params.len(), size = data.len(), "decoding ABI parameters");

    let cursor = Cursor::new(data, shape);
    cursor.decode_block(&kinds, 0)
}

/// Turn a decoded parameter list into a struct when names allow it
pub(crate) fn wrap_values(params: &[Param], values: Vec<Value>, shape: DecodeAs) -> Value {
    if shape == DecodeAs::Named && has_usable_names(params) {
        Value::Struct(params.iter().map(|p| p.name.clone()).zip(values).collect())
    } else {
        Value::Tuple(values)
    }
}

fn has_usable_names(params: &[Param]) -> bool {
    let mut seen = HashSet::with_capacity(params.len());
    params.iter().all(|p| !p.name.is_empty() && seen.insert(p.name.as_str()))
}

/// Read-only view over the buffer for one decode call.
///
/// Block bases are passed down explicitly; the cursor itself holds no
/// position. Tail offsets may alias, so the total number of array elements
/// produced is capped at the input size in bytes.
struct Cursor<'a> {
    data: &'a [u8],
    shape: DecodeAs,
    elements_left: Cell<usize>,
}

impl<'a> Cursor<'a> {
    fn new(data: &'a [u8], shape: DecodeAs) -> Self {
        Self {
            data,
            shape,
            elements_left: Cell::new(data.len()),
        }
    }

    /// Account for `len` array elements against the per-call budget
    fn take_elements(&self, len: usize) -> Result<()> {
        let left = self.elements_left.get();
        if len > left {
            return Err(AbiError::ElementLimitExceeded { limit: self.data.len() });
        }
        self.elements_left.set(left - len);
        Ok(())
    }

    /// Decode one head/tail block starting at `base`
    fn decode_block(&self, kinds: &[&ParamType], base: usize) -> Result<Vec<Value>> {
        let mut values = Vec::with_capacity(kinds.len());
        let mut head = base;

        for kind in kinds {
            let size = kind.head_size().ok_or_else(|| AbiError::InvalidType(kind.to_string()))?;
            let position = if kind.is_dynamic() {
                let offset = self.read_usize(head)?;
                base.checked_add(offset).ok_or_else(|| self.out_of_bounds(usize::MAX))?
            } else {
                head
            };
            values.push(self.decode_at(kind, position)?);
            head = head.checked_add(size).ok_or_else(|| self.out_of_bounds(usize::MAX))?;
        }

        Ok(values)
    }

    /// Decode a value whose encoding starts at `position`: inline for static
    /// types, the tail content for dynamic ones
    fn decode_at(&self, kind: &ParamType, position: usize) -> Result<Value> {
        match kind {
            ParamType::Address => Ok(Value::Address(Address::from_word(self.word(position)?))),
            ParamType::Bool => {
                let word = self.word(position)?;
                match U256::from_big_endian(word) {
                    v if v.is_zero() => Ok(Value::Bool(false)),
                    v if v == U256::one() => Ok(Value::Bool(true)),
                    _ => Err(AbiError::InvalidBoolean(format!("0x{}", hex::encode(word)))),
                }
            }
            ParamType::Uint(_) => Ok(Value::Uint(U256::from_big_endian(self.word(position)?))),
            ParamType::Int(_) => {
                let word = U256::from_big_endian(self.word(position)?);
                Ok(Value::Int(I256::from_twos_complement(word)))
            }
            ParamType::FixedBytes(size) => Ok(Value::Bytes(self.word(position)?[..*size].to_vec())),
            ParamType::Function => Ok(Value::Bytes(self.word(position)?[..24].to_vec())),
            ParamType::Bytes => Ok(Value::Bytes(self.length_prefixed(position)?.to_vec())),
            ParamType::String => {
                let bytes = self.length_prefixed(position)?;
                let s = std::str::from_utf8(bytes).map_err(|e| AbiError::InvalidUtf8(e.to_string()))?;
                Ok(Value::String(s.to_owned()))
            }
            ParamType::Array(inner) => {
                let len = self.read_usize(position)?;
                let start = position + WORD;
                self.check_element_space(inner, len, start)?;
                self.take_elements(len)?;
                let kinds = vec![inner.as_ref(); len];
                Ok(Value::Array(self.decode_block(&kinds, start)?))
            }
            ParamType::FixedArray(inner, len) => {
                self.check_element_space(inner, *len, position)?;
                self.take_elements(*len)?;
                let kinds = vec![inner.as_ref(); *len];
                Ok(Value::Array(self.decode_block(&kinds, position)?))
            }
            ParamType::Tuple(components) => {
                let kinds: Vec<&ParamType> = components.iter().map(|c| &c.kind).collect();
                let values = self.decode_block(&kinds, position)?;
                Ok(wrap_values(components, values, self.shape))
            }
        }
    }

    /// Reject element counts whose heads cannot fit in the rest of the buffer
    fn check_element_space(&self, inner: &ParamType, len: usize, start: usize) -> Result<()> {
        let available = self.data.len().saturating_sub(start);
        let fits = match inner.head_size() {
            None => false,
            Some(0) => len <= self.data.len(),
            Some(size) => len.checked_mul(size).map_or(false, |needed| needed <= available),
        };
        if fits {
            Ok(())
        } else {
            Err(self.out_of_bounds(start))
        }
    }

    /// Length word at `position` followed by that many bytes
    fn length_prefixed(&self, position: usize) -> Result<&'a [u8]> {
        let len = self.read_usize(position)?;
        let start = position + WORD;
        let end = start.checked_add(len).ok_or_else(|| self.out_of_bounds(usize::MAX))?;
        self.data.get(start..end).ok_or_else(|| self.out_of_bounds(end))
    }

    fn word(&self, position: usize) -> Result<&'a [u8; WORD]> {
        position
            .checked_add(WORD)
            .and_then(|end| self.data.get(position..end))
            .and_then(|slice| slice.try_into().ok())
            .ok_or_else(|| self.out_of_bounds(position))
    }

    /// Word at `position` as an offset or length; anything beyond the buffer
    /// size is out of bounds
    fn read_usize(&self, position: usize) -> Result<usize> {
        let value = U256::from_big_endian(self.word(position)?);
        if value > U256::from(self.data.len()) {
            let offset = if value > U256::from(usize::MAX) {
                usize::MAX
            } else {
                value.as_usize()
            };
            return Err(self.out_of_bounds(offset));
        }
        Ok(value.as_usize())
    }

    fn out_of_bounds(&self, offset: usize) -> AbiError {
        AbiError::OffsetOutOfBounds {
            offset,
            size: self.data.len(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::abi::encode::{encode, encode_u256};

    fn params(types: &[&str]) -> Vec<Param> {
        types
            .iter()
            .map(|t| Param::unnamed(t.parse().unwrap()))
            .collect()
    }

    fn word(n: u64) -> Vec<u8> {
        encode_u256(&U256::from(n))
    }

    // ==================== Scalars ====================

    #[test]
    fn test_decode_address() {
        let addr = Address::from_hex("0x742d35Cc6634C0532925a3b844Bc9e7595f0aB3d").unwrap();
        let mut encoded = [0u8; 32];
        encoded[12..32].copy_from_slice(addr.as_bytes());

        let values = decode(&params(&["address"]), &encoded).unwrap();
        assert_eq!(values, vec![Value::Address(addr)]);
    }

    #[test]
    fn test_decode_uint_and_bool() {
        let data = [word(100), word(1), word(0)].concat();
        let values = decode(&params(&["uint256", "bool", "bool"]), &data).unwrap();
        assert_eq!(values, vec![Value::uint(100), Value::Bool(true), Value::Bool(false)]);
    }

    #[test]
    fn test_decode_invalid_bool() {
        let result = decode(&params(&["bool"]), &word(2));
        assert!(matches!(result, Err(AbiError::InvalidBoolean(_))));
    }

    #[test]
    fn test_decode_int_negative() {
        // -1 in two's complement is all 1s
        let values = decode(&params(&["int256"]), &[0xffu8; 32]).unwrap();
        assert_eq!(values, vec![Value::int(-1)]);

        let values = decode(&params(&["int8"]), &word(127)).unwrap();
        assert_eq!(values, vec![Value::int(127)]);
    }

    #[test]
    fn test_decode_fixed_bytes() {
        let data = [0x42u8; 32];
        assert_eq!(
            decode(&params(&["bytes32"]), &data).unwrap(),
            vec![Value::bytes(data.to_vec())]
        );
        assert_eq!(
            decode(&params(&["bytes2"]), &data).unwrap(),
            vec![Value::bytes(vec![0x42, 0x42])]
        );
    }

    // ==================== Dynamic types ====================

    #[test]
    fn test_decode_dynamic_bytes() {
        let original = vec![0x01, 0x02, 0x03];

        let mut encoded = vec![0u8; 96];
        encoded[31] = 32;
        encoded[63] = 3;
        encoded[64..67].copy_from_slice(&original);

        let values = decode(&params(&["bytes"]), &encoded).unwrap();
        assert_eq!(values, vec![Value::Bytes(original)]);
    }

    #[test]
    fn test_decode_string_after_static() {
        let encoded = encode(&params(&["uint256", "string"]), &[Value::uint(420), Value::from("ox")]).unwrap();
        let values = decode(&params(&["uint256", "string"]), &encoded).unwrap();
        assert_eq!(values, vec![Value::uint(420), Value::from("ox")]);
    }

    #[test]
    fn test_decode_invalid_utf8() {
        let data = [word(32), word(1), vec![0xff; 32]].concat();
        assert!(matches!(
            decode(&params(&["string"]), &data),
            Err(AbiError::InvalidUtf8(_))
        ));
    }

    #[test]
    fn test_decode_nested_dynamic() {
        let p = params(&["(uint256,string[])[]", "bytes"]);
        let values = vec![
            Value::Array(vec![
                Value::Tuple(vec![Value::uint(1), Value::Array(vec![Value::from("a"), Value::from("bc")])]),
                Value::Tuple(vec![Value::uint(2), Value::Array(vec![])]),
            ]),
            Value::bytes(vec![0xde, 0xad]),
        ];
        let encoded = encode(&p, &values).unwrap();
        assert_eq!(decode(&p, &encoded).unwrap(), values);
    }

    #[test]
    fn test_decode_static_tuple_and_fixed_array_inline() {
        let p = params(&["(uint8,bool)", "uint16[2]", "string"]);
        let values = vec![
            Value::Tuple(vec![Value::uint(3), Value::Bool(true)]),
            Value::Array(vec![Value::uint(4), Value::uint(5)]),
            Value::from("tail"),
        ];
        let encoded = encode(&p, &values).unwrap();
        // 5 inline head words, string offset points past them
        assert_eq!(&encoded[128..160], &word(160)[..]);
        assert_eq!(decode(&p, &encoded).unwrap(), values);
    }

    // ==================== Named output ====================

    #[test]
    fn test_decode_named() {
        let p = vec![
            Param::new("owner", ParamType::Address),
            Param::new("amount", ParamType::Uint(256)),
        ];
        let data = [word(0), word(9)].concat();
        let value = decode_as(&p, &data, DecodeAs::Named).unwrap();
        assert_eq!(value.field("amount"), Some(&Value::uint(9)));
        assert_eq!(value.field("owner"), Some(&Value::Address(Address::ZERO)));

        let positional = decode_as(&p, &data, DecodeAs::Positional).unwrap();
        assert_eq!(positional, Value::Tuple(vec![Value::Address(Address::ZERO), Value::uint(9)]));
    }

    #[test]
    fn test_decode_named_falls_back_to_positional() {
        let unnamed = vec![Param::new("a", ParamType::Bool), Param::unnamed(ParamType::Bool)];
        let duplicate = vec![Param::new("a", ParamType::Bool), Param::new("a", ParamType::Bool)];
        let data = [word(1), word(0)].concat();
        let expected = Value::Tuple(vec![Value::Bool(true), Value::Bool(false)]);

        assert_eq!(decode_as(&unnamed, &data, DecodeAs::Named).unwrap(), expected);
        assert_eq!(decode_as(&duplicate, &data, DecodeAs::Named).unwrap(), expected);
    }

    #[test]
    fn test_decode_named_nested_struct() {
        let inner = ParamType::Tuple(vec![
            Param::new("x", ParamType::Uint(8)),
            Param::new("y", ParamType::Uint(8)),
        ]);
        let p = vec![Param::new("point", inner)];
        let data = [word(1), word(2)].concat();
        let value = decode_as(&p, &data, DecodeAs::Named).unwrap();
        let point = value.field("point").unwrap();
        assert_eq!(point.field("y"), Some(&Value::uint(2)));
    }

    #[test]
    fn test_decode_output_unwraps_single() {
        let p = params(&["uint256"]);
        assert_eq!(decode_output(&p, &word(7), DecodeAs::Positional).unwrap(), Value::uint(7));

        let p = params(&["uint256", "bool"]);
        let data = [word(7), word(1)].concat();
        assert_eq!(
            decode_output(&p, &data, DecodeAs::Positional).unwrap(),
            Value::Tuple(vec![Value::uint(7), Value::Bool(true)])
        );
    }

    // ==================== Errors ====================

    #[test]
    fn test_decode_short_data() {
        let result = decode(&params(&["uint256"]), &[0u8; 2]);
        assert_eq!(result, Err(AbiError::DataSizeTooSmall { expected: 32, given: 2 }));

        let result = decode(&params(&["uint256[3]"]), &[0u8; 64]);
        assert_eq!(result, Err(AbiError::DataSizeTooSmall { expected: 96, given: 64 }));
    }

    #[test]
    fn test_decode_empty_params_accepts_any_data() {
        assert_eq!(decode(&[], &[]).unwrap(), vec![]);
        assert_eq!(decode(&[], &[1, 2, 3]).unwrap(), vec![]);
    }

    #[test]
    fn test_decode_offset_out_of_bounds() {
        // offset points past the end
        let data = word(0x1000);
        assert!(matches!(
            decode(&params(&["bytes"]), &data),
            Err(AbiError::OffsetOutOfBounds { .. })
        ));

        // length prefix larger than what remains
        let data = [word(32), word(64), vec![0u8; 32]].concat();
        assert!(matches!(
            decode(&params(&["string"]), &data),
            Err(AbiError::OffsetOutOfBounds { .. })
        ));

        // huge offset
        let data = vec![0xffu8; 32];
        assert_eq!(
            decode(&params(&["bytes"]), &data),
            Err(AbiError::OffsetOutOfBounds { offset: usize::MAX, size: 32 })
        );
    }

    #[test]
    fn test_decode_array_length_exceeds_buffer() {
        // claims 1000 elements with only one word of space
        let data = [word(32), word(1000), word(1)].concat();
        assert!(matches!(
            decode(&params(&["uint256[]"]), &data),
            Err(AbiError::OffsetOutOfBounds { .. })
        ));
    }

    #[test]
    fn test_decode_aliased_offsets_hit_element_limit() {
        // 128 inner arrays all pointing at the same 128-element array
        let n = 128;
        let mut data = [word(32), word(n)].concat();
        for _ in 0..n {
            data.extend(word(n * 32));
        }
        data.extend(word(n));
        for i in 0..n {
            data.extend(word(i));
        }

        assert_eq!(
            decode(&params(&["uint256[][]"]), &data),
            Err(AbiError::ElementLimitExceeded { limit: data.len() })
        );
    }

    #[test]
    fn test_decode_shared_offset_within_budget() {
        // two elements sharing one inner array is still accepted
        let data = [word(32), word(2), word(64), word(64), word(1), word(9)].concat();
        let inner = Value::Array(vec![Value::uint(9)]);
        assert_eq!(
            decode(&params(&["uint256[][]"]), &data).unwrap(),
            vec![Value::Array(vec![inner.clone(), inner])]
        );
    }

    #[test]
    fn test_decode_oversized_fixed_array_kind() {
        let huge = ParamType::FixedArray(Box::new(ParamType::Uint(256)), usize::MAX / 16);
        let p = vec![Param::unnamed(huge.clone())];
        assert_eq!(decode(&p, &[0u8; 64]), Err(AbiError::InvalidType(format!("({})", huge))));

        // nested inside a dynamic tuple the outer head still fits
        let tuple = ParamType::Tuple(vec![Param::unnamed(ParamType::String), Param::unnamed(huge.clone())]);
        let p = vec![Param::unnamed(tuple)];
        let data = [word(32), vec![0u8; 64]].concat();
        assert!(matches!(decode(&p, &data), Err(AbiError::InvalidType(_))));

        let p = vec![Param::unnamed(ParamType::Array(Box::new(huge)))];
        let data = [word(32), word(1), vec![0u8; 64]].concat();
        assert!(matches!(decode(&p, &data), Err(AbiError::OffsetOutOfBounds { .. })));
    }

    #[test]
    fn test_decode_malformed_width() {
        let p = vec![Param::unnamed(ParamType::Int(3))];
        assert_eq!(decode(&p, &word(1)), Err(AbiError::InvalidType("int3".to_owned())));
    }

    #[test]
    fn test_decode_does_not_mutate_input() {
        let data = [word(32), word(2), word(1), word(2)].concat();
        let copy = data.clone();
        let _ = decode(&params(&["uint256[]"]), &data).unwrap();
        assert_eq!(data, copy);
    }
}
