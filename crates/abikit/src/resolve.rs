//! Overload-aware item resolution
//!
//! Resolution runs in two phases. Candidates matching the query are first
//! filtered by arity and [`is_arg_of_type`]; the survivors are then checked
//! pairwise for types that would accept the same argument but encode it
//! differently. Such a pair is reported as [`AbiError::Ambiguity`] instead
//! of guessing.

use std::fmt;

use abikit_primitives::Address;

use crate::abi::encode::tuple_values;
use crate::abi::{is_arg_of_type, Param, ParamType, Value};
use crate::error::{AbiError, Result};
use crate::item::{Abi, AbiItem, ErrorDef, EventDef, FunctionDef};

/// What to look up
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Query<'a> {
    /// Item name, or `constructor`/`fallback`/`receive`
    Name(&'a str),
    /// Item name plus the arguments it will be called with
    NameWithArgs {
        /// Item name
        name: &'a str,
        /// Call arguments
        args: &'a [Value],
    },
    /// Selector, event topic, or raw call data starting with a selector
    Hash(Vec<u8>),
}

impl<'a> Query<'a> {
    /// Parse a query string: `0x`-prefixed hex is a hash, anything else a name
    pub fn parse(s: &'a str) -> Result<Self> {
        match s.strip_prefix("0x") {
            Some(digits) => Ok(Query::Hash(hex::decode(digits)?)),
            None => Ok(Query::Name(s)),
        }
    }

    fn args(&self) -> Option<&'a [Value]> {
        match self {
            Query::NameWithArgs { args, .. } => Some(*args),
            _ => None,
        }
    }

    fn matches(&self, item: &AbiItem) -> bool {
        match self {
            Query::Name(name) | Query::NameWithArgs { name, .. } => match item {
                AbiItem::Constructor(_) | AbiItem::Fallback(_) | AbiItem::Receive(_) => {
                    item.item_type() == *name
                }
                _ => item.name() == *name,
            },
            Query::Hash(bytes) => match item {
                AbiItem::Event(_) => bytes.len() >= 32 && item.hash() == bytes[..32],
                AbiItem::Function(_) | AbiItem::Error(_) => bytes.len() >= 4 && item.hash() == bytes[..4],
                _ => false,
            },
        }
    }
}

impl fmt::Display for Query<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Query::Name(name) | Query::NameWithArgs { name, .. } => f.write_str(name),
            Query::Hash(bytes) => write!(f, "0x{}", hex::encode(bytes)),
        }
    }
}

/// Resolution options
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolveOptions {
    /// Attach the item's selector or topic to the result
    pub prepare: bool,
}

impl Default for ResolveOptions {
    fn default() -> Self {
        Self { prepare: true }
    }
}

/// The item a query resolved to
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolved<'a> {
    /// Selected item
    pub item: &'a AbiItem,
    /// Selector or topic, when prepared
    pub hash: Option<Vec<u8>>,
    /// Other overloads of the same name that were not selected
    pub overloads: Vec<&'a AbiItem>,
}

impl Abi {
    /// Resolve a query to a single item
    pub fn resolve(&self, query: &Query<'_>, options: ResolveOptions) -> Result<Resolved<'_>> {
        self.resolve_where(query, options, |_| true)
    }

    /// Resolve a query to a function
    pub fn resolve_function(&self, query: &Query<'_>, options: ResolveOptions) -> Result<&FunctionDef> {
        match self.resolve_where(query, options, |item| matches!(item, AbiItem::Function(_)))?.item {
            AbiItem::Function(f) => Ok(f),
            _ => Err(AbiError::ItemNotFound(query.to_string())),
        }
    }

    /// Resolve a query to an event
    pub fn resolve_event(&self, query: &Query<'_>, options: ResolveOptions) -> Result<&EventDef> {
        match self.resolve_where(query, options, |item| matches!(item, AbiItem::Event(_)))?.item {
            AbiItem::Event(e) => Ok(e),
            _ => Err(AbiError::ItemNotFound(query.to_string())),
        }
    }

    /// Resolve a query to a custom error
    pub fn resolve_error(&self, query: &Query<'_>, options: ResolveOptions) -> Result<&ErrorDef> {
        match self.resolve_where(query, options, |item| matches!(item, AbiItem::Error(_)))?.item {
            AbiItem::Error(e) => Ok(e),
            _ => Err(AbiError::ItemNotFound(query.to_string())),
        }
    }

    /// Function by name; overloads resolve to the one with the fewest inputs
    pub fn function(&self, name: &str) -> Result<&FunctionDef> {
        self.resolve_function(&Query::Name(name), ResolveOptions { prepare: false })
    }

    /// Event by name
    pub fn event(&self, name: &str) -> Result<&EventDef> {
        self.resolve_event(&Query::Name(name), ResolveOptions { prepare: false })
    }

    /// Custom error by name
    pub fn error(&self, name: &str) -> Result<&ErrorDef> {
        self.resolve_error(&Query::Name(name), ResolveOptions { prepare: false })
    }

    fn resolve_where<F>(&self, query: &Query<'_>, options: ResolveOptions, kind: F) -> Result<Resolved<'_>>
    where
        F: Fn(&AbiItem) -> bool,
    {
        let candidates: Vec<&AbiItem> = self.iter().filter(|item| kind(item) && query.matches(item)).collect();

        let (item, overloads) = match candidates.len() {
            0 => return Err(AbiError::ItemNotFound(query.to_string())),
            1 => (candidates[0], Vec::new()),
            _ => select(&candidates, query.args())?,
        };

        tracing::debug!(
            query = %query,
            candidates = candidates.len(),
            selected = %item.signature(),
            "resolved ABI item"
        );

        Ok(Resolved {
            item,
            hash: options.prepare.then(|| item.hash()),
            overloads,
        })
    }
}

/// Pick one of several overloads
fn select<'a>(candidates: &[&'a AbiItem], args: Option<&[Value]>) -> Result<(&'a AbiItem, Vec<&'a AbiItem>)> {
    let others = |chosen: &AbiItem| -> Vec<&'a AbiItem> {
        candidates
            .iter()
            .copied()
            .filter(|c| !std::ptr::eq(*c, chosen))
            .collect()
    };

    let args = match args {
        Some(args) => args,
        None => {
            // Without arguments the item taking the fewest inputs wins
            let chosen = candidates
                .iter()
                .copied()
                .min_by_key(|c| c.inputs().len())
                .ok_or_else(|| AbiError::ItemNotFound(String::new()))?;
            return Ok((chosen, others(chosen)));
        }
    };

    let survivors: Vec<&AbiItem> = candidates
        .iter()
        .copied()
        .filter(|c| accepts(c.inputs(), args))
        .collect();

    let chosen = match survivors.first() {
        Some(chosen) => *chosen,
        None => {
            // Let the encoder report the precise mismatch
            tracing::debug!(candidates = candidates.len(), "no overload accepts the arguments");
            return Ok((candidates[0], others(candidates[0])));
        }
    };

    for (i, first) in survivors.iter().enumerate() {
        for second in &survivors[i + 1..] {
            if let Some((first_type, second_type)) = get_ambiguous_types(first.inputs(), second.inputs(), args) {
                tracing::debug!(
                    first = %first.signature(),
                    second = %second.signature(),
                    "ambiguous overloads"
                );
                return Err(AbiError::Ambiguity {
                    first_type,
                    first_signature: first.signature(),
                    second_type,
                    second_signature: second.signature(),
                });
            }
        }
    }

    let overloads = candidates
        .iter()
        .copied()
        .filter(|c| c.inputs().len() == args.len())
        .filter(|c| !survivors.iter().any(|s| std::ptr::eq(*s, *c)))
        .collect();
    Ok((chosen, overloads))
}

fn accepts(inputs: &[Param], args: &[Value]) -> bool {
    inputs.len() == args.len()
        && inputs
            .iter()
            .zip(args)
            .all(|(input, arg)| is_arg_of_type(arg, &input.kind))
}

/// First pair of parameter types, one from each list, that would both accept
/// the corresponding argument yet encode it differently.
///
/// Tuple components and array elements are compared recursively.
pub fn get_ambiguous_types(source: &[Param], target: &[Param], args: &[Value]) -> Option<(String, String)> {
    source
        .iter()
        .zip(target)
        .zip(args)
        .find_map(|((s, t), arg)| ambiguous_kinds(&s.kind, &t.kind, arg))
}

fn ambiguous_kinds(source: &ParamType, target: &ParamType, arg: &Value) -> Option<(String, String)> {
    match (source, target) {
        (ParamType::Tuple(sc), ParamType::Tuple(tc)) => {
            if sc.len() != tc.len() {
                return None;
            }
            let values = tuple_values(sc, arg).ok()?;
            sc.iter()
                .zip(tc)
                .zip(values)
                .find_map(|((s, t), v)| ambiguous_kinds(&s.kind, &t.kind, v))
        }
        (
            ParamType::Array(s) | ParamType::FixedArray(s, _),
            ParamType::Array(t) | ParamType::FixedArray(t, _),
        ) => arg.as_slice()?.iter().find_map(|v| ambiguous_kinds(s, t, v)),
        _ if is_ambiguous_pair(source, target, arg) || is_ambiguous_pair(target, source, arg) => {
            Some((source.to_string(), target.to_string()))
        }
        _ => None,
    }
}

fn is_ambiguous_pair(a: &ParamType, b: &ParamType, arg: &Value) -> bool {
    match (a, b) {
        (ParamType::Address, ParamType::FixedBytes(20)) => true,
        (ParamType::Address, ParamType::String) | (ParamType::Address, ParamType::Bytes) => {
            matches!(arg, Value::String(s) if Address::is_hex_address(s))
        }
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ADDR: &str = "0xd8da6bf26964af9d7eed9e03e53415d37aa96045";

    fn abi(declarations: &[&str]) -> Abi {
        Abi::parse_human_readable(declarations).unwrap()
    }

    // ==================== Lookup ====================

    #[test]
    fn test_resolve_by_name() {
        let abi = abi(&["function balanceOf(address owner) view returns (uint256)"]);
        let resolved = abi.resolve(&Query::Name("balanceOf"), ResolveOptions::default()).unwrap();

        assert_eq!(resolved.item.signature(), "balanceOf(address)");
        assert_eq!(resolved.hash, Some(vec![0x70, 0xa0, 0x82, 0x31]));
        assert!(resolved.overloads.is_empty());
    }

    #[test]
    fn test_resolve_without_prepare() {
        let abi = abi(&["function balanceOf(address owner) view returns (uint256)"]);
        let resolved = abi
            .resolve(&Query::Name("balanceOf"), ResolveOptions { prepare: false })
            .unwrap();
        assert_eq!(resolved.hash, None);
    }

    #[test]
    fn test_resolve_not_found() {
        let abi = abi(&["function balanceOf(address owner) view returns (uint256)"]);
        assert_eq!(
            abi.resolve(&Query::Name("transfer"), ResolveOptions::default()),
            Err(AbiError::ItemNotFound("transfer".to_owned()))
        );
        assert_eq!(
            abi.resolve(&Query::Hash(vec![1, 2, 3, 4]), ResolveOptions::default()),
            Err(AbiError::ItemNotFound("0x01020304".to_owned()))
        );
    }

    #[test]
    fn test_resolve_by_selector_and_call_data() {
        let abi = abi(&[
            "function transfer(address to, uint256 amount) returns (bool)",
            "function approve(address spender, uint256 amount) returns (bool)",
        ]);

        let resolved = abi.resolve(&Query::parse("0x095ea7b3").unwrap(), ResolveOptions::default()).unwrap();
        assert_eq!(resolved.item.name(), "approve");

        let call = abi
            .function("transfer")
            .unwrap()
            .encode_data(&[Value::from(ADDR), Value::uint(1)])
            .unwrap();
        let resolved = abi.resolve(&Query::Hash(call), ResolveOptions::default()).unwrap();
        assert_eq!(resolved.item.name(), "transfer");
    }

    #[test]
    fn test_resolve_event_by_topic() {
        let abi = abi(&[
            "event Transfer(address indexed from, address indexed to, uint256 value)",
            "function transfer(address to, uint256 amount) returns (bool)",
        ]);
        let topic = abi.event("Transfer").unwrap().topic();

        let resolved = abi
            .resolve(&Query::Hash(topic.as_bytes().to_vec()), ResolveOptions::default())
            .unwrap();
        assert_eq!(resolved.item.item_type(), "event");
        assert_eq!(resolved.hash, Some(topic.as_bytes().to_vec()));
    }

    #[test]
    fn test_resolve_kind_filters() {
        let abi = abi(&[
            "event Transfer(address indexed from, address indexed to, uint256 value)",
            "function Transfer()",
        ]);
        assert_eq!(abi.event("Transfer").unwrap().inputs.len(), 3);
        assert_eq!(abi.function("Transfer").unwrap().inputs.len(), 0);
        assert!(matches!(abi.error("Transfer"), Err(AbiError::ItemNotFound(_))));
    }

    #[test]
    fn test_resolve_constructor_by_type() {
        let abi = abi(&["constructor(uint256 supply)", "function supply() view returns (uint256)"]);
        let resolved = abi.resolve(&Query::Name("constructor"), ResolveOptions::default()).unwrap();
        assert_eq!(resolved.item.signature(), "constructor(uint256)");
    }

    #[test]
    fn test_query_parse() {
        assert_eq!(Query::parse("transfer").unwrap(), Query::Name("transfer"));
        assert_eq!(Query::parse("0xa9059cbb").unwrap(), Query::Hash(vec![0xa9, 0x05, 0x9c, 0xbb]));
        assert!(matches!(Query::parse("0xzz"), Err(AbiError::InvalidHex(_))));
    }

    // ==================== Overloads ====================

    #[test]
    fn test_overload_prefers_fewest_inputs_without_args() {
        let abi = abi(&["function foo(uint256 a)", "function foo()"]);
        let resolved = abi.resolve(&Query::Name("foo"), ResolveOptions::default()).unwrap();

        assert_eq!(resolved.item.signature(), "foo()");
        assert_eq!(resolved.overloads.len(), 1);
        assert_eq!(resolved.overloads[0].signature(), "foo(uint256)");
    }

    #[test]
    fn test_overload_selected_by_args() {
        let abi = abi(&[
            "function foo(uint256 a)",
            "function foo(string a)",
            "function foo(bool a)",
            "function foo(uint256 a, uint256 b)",
        ]);
        let args = [Value::from("hello")];
        let resolved = abi
            .resolve(&Query::NameWithArgs { name: "foo", args: &args }, ResolveOptions::default())
            .unwrap();

        assert_eq!(resolved.item.signature(), "foo(string)");
        let overloads: Vec<String> = resolved.overloads.iter().map(|o| o.signature()).collect();
        assert_eq!(overloads, vec!["foo(uint256)", "foo(bool)"]);
    }

    #[test]
    fn test_overload_by_arity() {
        let abi = abi(&["function foo(uint256 a)", "function foo(uint256 a, uint256 b)"]);
        let args = [Value::uint(1), Value::uint(2)];
        let resolved = abi
            .resolve(&Query::NameWithArgs { name: "foo", args: &args }, ResolveOptions::default())
            .unwrap();
        assert_eq!(resolved.item.signature(), "foo(uint256,uint256)");
    }

    #[test]
    fn test_overload_no_match_falls_back_to_first() {
        let abi = abi(&["function foo(uint256 a)", "function foo(bool a)"]);
        let args = [Value::from("nope")];
        let resolved = abi
            .resolve(&Query::NameWithArgs { name: "foo", args: &args }, ResolveOptions::default())
            .unwrap();
        assert_eq!(resolved.item.signature(), "foo(uint256)");
        assert_eq!(resolved.overloads.len(), 1);
    }

    // ==================== Ambiguity ====================

    #[test]
    fn test_address_bytes20_ambiguous() {
        let abi = abi(&["function foo(address a)", "function foo(bytes20 b)"]);
        let args = [Value::from(ADDR)];
        let result = abi.resolve(&Query::NameWithArgs { name: "foo", args: &args }, ResolveOptions::default());

        assert_eq!(
            result,
            Err(AbiError::Ambiguity {
                first_type: "address".to_owned(),
                first_signature: "foo(address)".to_owned(),
                second_type: "bytes20".to_owned(),
                second_signature: "foo(bytes20)".to_owned(),
            })
        );
    }

    #[test]
    fn test_invalid_address_selects_bytes20() {
        let abi = abi(&["function foo(address a)", "function foo(bytes20 b)"]);
        let args = [Value::from(format!("{}ff", ADDR))];
        let resolved = abi
            .resolve(&Query::NameWithArgs { name: "foo", args: &args }, ResolveOptions::default())
            .unwrap();
        assert_eq!(resolved.item.signature(), "foo(bytes20)");
    }

    #[test]
    fn test_address_string_ambiguous_only_for_address_shaped_args() {
        let abi = abi(&["function foo(string s)", "function foo(address a)"]);

        let args = [Value::from(ADDR)];
        let result = abi.resolve(&Query::NameWithArgs { name: "foo", args: &args }, ResolveOptions::default());
        assert!(matches!(result, Err(AbiError::Ambiguity { ref first_type, .. }) if first_type == "string"));

        let args = [Value::from("vitalik")];
        let resolved = abi
            .resolve(&Query::NameWithArgs { name: "foo", args: &args }, ResolveOptions::default())
            .unwrap();
        assert_eq!(resolved.item.signature(), "foo(string)");
    }

    #[test]
    fn test_address_bytes_ambiguous() {
        let abi = abi(&["function foo(bytes b)", "function foo(address a)"]);
        let args = [Value::from(ADDR)];
        assert!(matches!(
            abi.resolve(&Query::NameWithArgs { name: "foo", args: &args }, ResolveOptions::default()),
            Err(AbiError::Ambiguity { .. })
        ));

        // a native address value never matches `bytes`
        let args = [Value::Address(Address::ZERO)];
        let resolved = abi
            .resolve(&Query::NameWithArgs { name: "foo", args: &args }, ResolveOptions::default())
            .unwrap();
        assert_eq!(resolved.item.signature(), "foo(address)");
    }

    #[test]
    fn test_ambiguity_inside_tuples_and_arrays() {
        let source = vec![Param::new("p", "(uint256,address)".parse().unwrap())];
        let target = vec![Param::new("p", "(uint256,bytes20)".parse().unwrap())];
        let args = [Value::Tuple(vec![Value::uint(1), Value::from(ADDR)])];
        assert_eq!(
            get_ambiguous_types(&source, &target, &args),
            Some(("address".to_owned(), "bytes20".to_owned()))
        );

        let source = vec![Param::unnamed("address[]".parse().unwrap())];
        let target = vec![Param::unnamed("string[]".parse().unwrap())];
        let args = [Value::Array(vec![Value::from("plain"), Value::from(ADDR)])];
        assert_eq!(
            get_ambiguous_types(&source, &target, &args),
            Some(("address".to_owned(), "string".to_owned()))
        );

        let args = [Value::Array(vec![Value::from("plain")])];
        assert_eq!(get_ambiguous_types(&source, &target, &args), None);
    }

    #[test]
    fn test_ambiguity_across_dynamic_and_fixed_arrays() {
        let abi = abi(&["function foo(address[] a)", "function foo(bytes20[1] b)"]);
        let args = [Value::Array(vec![Value::from(ADDR)])];
        let result = abi.resolve(&Query::NameWithArgs { name: "foo", args: &args }, ResolveOptions::default());

        assert_eq!(
            result,
            Err(AbiError::Ambiguity {
                first_type: "address".to_owned(),
                first_signature: "foo(address[])".to_owned(),
                second_type: "bytes20".to_owned(),
                second_signature: "foo(bytes20[1])".to_owned(),
            })
        );

        let source = vec![Param::unnamed("bytes20[2]".parse().unwrap())];
        let target = vec![Param::unnamed("address[]".parse().unwrap())];
        let args = [Value::Array(vec![Value::from(ADDR), Value::from(ADDR)])];
        assert_eq!(
            get_ambiguous_types(&source, &target, &args),
            Some(("bytes20".to_owned(), "address".to_owned()))
        );
    }

    #[test]
    fn test_unambiguous_overloads_with_same_arity() {
        let source = vec![Param::unnamed(ParamType::Uint(256))];
        let target = vec![Param::unnamed(ParamType::Int(256))];
        assert_eq!(get_ambiguous_types(&source, &target, &[Value::uint(1)]), None);
    }
}
