//! Canonical signatures, selectors and topics
//!
//! Also holds the compiler's built-in revert errors and the panic code table.

use abikit_crypto::{keccak256, Selector};
use abikit_primitives::{H256, U256};

use crate::abi::Param;
use crate::item::AbiItem;

/// Signature of the built-in revert error
pub const ERROR_SIGNATURE: &str = "Error(string)";

/// Selector of `Error(string)`
pub const ERROR_SELECTOR: Selector = [0x08, 0xc3, 0x79, 0xa0];

/// Signature of the built-in panic error
pub const PANIC_SIGNATURE: &str = "Panic(uint256)";

/// Selector of `Panic(uint256)`
pub const PANIC_SELECTOR: Selector = [0x4e, 0x48, 0x7b, 0x71];

/// Panic codes emitted by the Solidity compiler and what they mean
pub const PANIC_REASONS: &[(u64, &str)] = &[
    (0x00, "generic compiler inserted panic"),
    (0x01, "assertion failed"),
    (0x11, "arithmetic operation resulted in underflow or overflow"),
    (0x12, "division or modulo by zero"),
    (0x21, "attempted to convert to an invalid enum value"),
    (0x22, "attempted to access an incorrectly encoded storage byte array"),
    (0x31, "performed `.pop()` on an empty array"),
    (0x32, "array index is out of bounds"),
    (0x41, "allocated too much memory or created an array which is too large"),
    (0x51, "called a zero-initialized variable of internal function type"),
];

/// Look up the reason for a panic code
pub fn panic_reason(code: U256) -> Option<&'static str> {
    if code > U256::from(u64::MAX) {
        return None;
    }
    let code = code.as_u64();
    PANIC_REASONS
        .iter()
        .find(|(c, _)| *c == code)
        .map(|(_, reason)| *reason)
}

/// `name(type1,type2,...)` for a parameter list
pub fn signature_of(name: &str, inputs: &[Param]) -> String {
    let types: Vec<String> = inputs.iter().map(|p| p.kind.to_string()).collect();
    format!("{}({})", name, types.join(","))
}

/// Canonical signature of an item.
///
/// Parameter names and `indexed` markers are omitted. Constructor, fallback
/// and receive items use their item type as the name.
pub fn format_signature(item: &AbiItem) -> String {
    match item {
        AbiItem::Function(f) => signature_of(&f.name, &f.inputs),
        AbiItem::Event(e) => signature_of(&e.name, &e.inputs),
        AbiItem::Error(e) => signature_of(&e.name, &e.inputs),
        AbiItem::Constructor(c) => signature_of("constructor", &c.inputs),
        AbiItem::Fallback(_) => "fallback()".to_owned(),
        AbiItem::Receive(_) => "receive()".to_owned(),
    }
}

/// Hash identifying an item: the 32-byte topic for events, the 4-byte
/// selector for everything else
pub fn compute_hash(item: &AbiItem) -> Vec<u8> {
    let hash = keccak256(format_signature(item).as_bytes());
    match item {
        AbiItem::Event(_) => hash.as_bytes().to_vec(),
        _ => hash.as_bytes()[..4].to_vec(),
    }
}

/// 4-byte selector of an item's signature
pub fn selector(item: &AbiItem) -> Selector {
    abikit_crypto::selector(&format_signature(item))
}

/// 32-byte topic of an item's signature
pub fn topic(item: &AbiItem) -> H256 {
    keccak256(format_signature(item).as_bytes())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::abi::ParamType;
    use crate::item::{ErrorDef, EventDef, FunctionDef};

    fn transfer_event() -> AbiItem {
        AbiItem::Event(EventDef::new(
            "Transfer",
            vec![
                Param::new("from", ParamType::Address).indexed(),
                Param::new("to", ParamType::Address).indexed(),
                Param::new("value", ParamType::Uint(256)),
            ],
        ))
    }

    // ==================== Signatures ====================

    #[test]
    fn test_format_signature_omits_names() {
        let item = AbiItem::Function(FunctionDef::new(
            "transfer",
            vec![
                Param::new("to", ParamType::Address),
                Param::new("amount", ParamType::Uint(256)),
            ],
            vec![Param::unnamed(ParamType::Bool)],
        ));
        assert_eq!(format_signature(&item), "transfer(address,uint256)");
        assert_eq!(format_signature(&transfer_event()), "Transfer(address,address,uint256)");
    }

    #[test]
    fn test_format_signature_nested_tuples() {
        let order = ParamType::Tuple(vec![
            Param::new("maker", ParamType::Address),
            Param::new(
                "assets",
                ParamType::Array(Box::new(ParamType::Tuple(vec![
                    Param::new("token", ParamType::Address),
                    Param::new("ids", ParamType::FixedArray(Box::new(ParamType::Uint(256)), 2)),
                ]))),
            ),
        ]);
        let item = AbiItem::Function(FunctionDef::new("fill", vec![Param::new("order", order)], vec![]));
        assert_eq!(format_signature(&item), "fill((address,(address,uint256[2])[]))");
    }

    // ==================== Hashes ====================

    #[test]
    fn test_compute_hash_lengths() {
        let event = transfer_event();
        assert_eq!(
            hex::encode(compute_hash(&event)),
            "ddf252ad1be2c89b69c2b068fc378daa952ba7f163c4a11628f55a4df523b3ef"
        );
        assert_eq!(compute_hash(&event), topic(&event).as_bytes().to_vec());

        let function = AbiItem::Function(FunctionDef::new(
            "balanceOf",
            vec![Param::new("owner", ParamType::Address)],
            vec![],
        ));
        assert_eq!(compute_hash(&function), vec![0x70, 0xa0, 0x82, 0x31]);
        assert_eq!(selector(&function), [0x70, 0xa0, 0x82, 0x31]);
    }

    #[test]
    fn test_builtin_selectors() {
        let error = AbiItem::Error(ErrorDef::new("Error", vec![Param::unnamed(ParamType::String)]));
        let panic = AbiItem::Error(ErrorDef::new("Panic", vec![Param::unnamed(ParamType::Uint(256))]));

        assert_eq!(format_signature(&error), ERROR_SIGNATURE);
        assert_eq!(format_signature(&panic), PANIC_SIGNATURE);
        assert_eq!(selector(&error), ERROR_SELECTOR);
        assert_eq!(selector(&panic), PANIC_SELECTOR);
    }

    #[test]
    fn test_panic_reason() {
        assert_eq!(panic_reason(U256::from(0x11)), Some("arithmetic operation resulted in underflow or overflow"));
        assert_eq!(panic_reason(U256::from(0x01)), Some("assertion failed"));
        assert_eq!(panic_reason(U256::from(0x99)), None);
        assert_eq!(panic_reason(U256::MAX), None);
    }
}
