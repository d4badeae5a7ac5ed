//! Structural value/type compatibility
//!
//! [`is_arg_of_type`] never fails: a mismatch is `false` so overload
//! resolution can move on to the next candidate. Range and size problems are
//! left for the encoder to report.

use abikit_primitives::Address;

use super::param_type::{is_valid_int_width, Param, ParamType};
use super::value::Value;

/// Whether `value` has the right shape to be encoded as `kind`
pub fn is_arg_of_type(value: &Value, kind: &ParamType) -> bool {
    match kind {
        ParamType::Address => match value {
            Value::Address(_) => true,
            Value::String(s) => Address::is_hex_address(s),
            _ => false,
        },
        ParamType::Bool => matches!(value, Value::Bool(_)),
        ParamType::Uint(bits) | ParamType::Int(bits) => {
            is_valid_int_width(*bits) && matches!(value, Value::Uint(_) | Value::Int(_))
        }
        ParamType::FixedBytes(_) | ParamType::Bytes | ParamType::Function => is_byte_like(value),
        ParamType::String => matches!(value, Value::String(_)),
        ParamType::Array(inner) => match value.as_slice() {
            Some(items) => items.iter().all(|item| is_arg_of_type(item, inner)),
            None => false,
        },
        ParamType::FixedArray(inner, n) => match value.as_slice() {
            Some(items) => items.len() == *n && items.iter().all(|item| is_arg_of_type(item, inner)),
            None => false,
        },
        ParamType::Tuple(components) => is_tuple_arg(value, components),
    }
}

/// Raw bytes or a `0x`-prefixed hex string
pub(crate) fn is_byte_like(value: &Value) -> bool {
    match value {
        Value::Bytes(_) => true,
        Value::String(s) => is_hex(s),
        _ => false,
    }
}

/// `0x` followed by any number of hex digits
pub(crate) fn is_hex(s: &str) -> bool {
    s.strip_prefix("0x")
        .map(|digits| digits.bytes().all(|b| b.is_ascii_hexdigit()))
        .unwrap_or(false)
}

fn is_tuple_arg(value: &Value, components: &[Param]) -> bool {
    match value {
        Value::Struct(_) => components.iter().all(|c| {
            value
                .field(&c.name)
                .map(|field| is_arg_of_type(field, &c.kind))
                .unwrap_or(false)
        }),
        Value::Tuple(items) | Value::Array(items) => {
            items.len() == components.len()
                && items
                    .iter()
                    .zip(components)
                    .all(|(item, c)| is_arg_of_type(item, &c.kind))
        }
        _ => false,
    }
}
