//! Human-readable ABI declarations
//!
//! Parses Solidity-like one-line declarations:
//!
//! ```text
//! function transfer(address to, uint256 amount) external returns (bool)
//! event Transfer(address indexed from, address indexed to, uint256 value)
//! error InsufficientBalance(uint256 available, uint256 required)
//! constructor(string name) payable
//! fallback() external payable
//! receive() external payable
//! ```
//!
//! Tuples are written inline, optionally prefixed with `tuple`. Visibility,
//! `virtual`/`override` and data locations are accepted and ignored. `struct`
//! and `enum` declarations are not supported.

use crate::abi::{Param, ParamType};
use crate::error::{AbiError, Result};
use crate::item::{
    AbiItem, ConstructorDef, ErrorDef, EventDef, FallbackDef, FunctionDef, ReceiveDef, StateMutability,
};

/// Parse one declaration into an ABI item
pub fn parse(declaration: &str) -> Result<AbiItem> {
    let s = declaration.trim();
    let keyword = s
        .split(|c: char| !c.is_ascii_alphabetic())
        .next()
        .unwrap_or_default();

    match keyword {
        "function" => Parser::exec(s, |p| p.function()).map(AbiItem::Function),
        "event" => Parser::exec(s, |p| p.event()).map(AbiItem::Event),
        "error" => Parser::exec(s, |p| p.error()).map(AbiItem::Error),
        "constructor" => Parser::exec(s, |p| p.constructor()).map(AbiItem::Constructor),
        "fallback" => Parser::exec(s, |p| p.fallback()).map(AbiItem::Fallback),
        "receive" => Parser::exec(s, |p| p.receive()).map(AbiItem::Receive),
        _ => Err(AbiError::Parse {
            message: "expected declaration".to_owned(),
            position: 0,
        }),
    }
}

const MODIFIERS: &[&str] = &[
    "external",
    "public",
    "internal",
    "private",
    "virtual",
    "override",
    "pure",
    "view",
    "payable",
    "nonpayable",
];

const LOCATIONS: &[&str] = &["memory", "calldata", "storage"];

/// Declaration parser over a string buffer; `pos` is the byte offset used in
/// error reports
#[derive(Clone)]
struct Parser<'a> {
    buf: &'a str,
    pos: usize,
}

impl<'a> Parser<'a> {
    fn exec<T, F>(buf: &'a str, f: F) -> Result<T>
    where
        F: FnOnce(&mut Self) -> Result<T>,
    {
        let mut parser = Self { buf, pos: 0 };
        let result = f(&mut parser)?;
        parser.end()?;
        Ok(result)
    }

    fn expected(&self, what: &str) -> AbiError {
        AbiError::Parse {
            message: format!("expected {}", what),
            position: self.pos,
        }
    }

    fn rest(&self) -> &'a str {
        self.buf.get(self.pos..).unwrap_or_default()
    }

    /// Run `f` on a copy of the parser and only commit its progress on
    /// success. `f` also gets the untouched parser for error positions.
    fn tri<T, F>(&mut self, f: F) -> Result<T>
    where
        F: FnOnce(&Self, &mut Self) -> Result<T>,
    {
        let mut sub = self.clone();
        let result = f(&*self, &mut sub)?;
        *self = sub;
        Ok(result)
    }

    fn scan<F>(&mut self, f: F) -> &'a str
    where
        F: Fn(char) -> bool,
    {
        let rest = self.rest();
        let len = rest.find(|c: char| !f(c)).unwrap_or(rest.len());
        self.pos += len;
        &rest[..len]
    }

    fn whitespace(&mut self) {
        self.scan(char::is_whitespace);
    }

    fn take(&mut self, c: char) -> Result<()> {
        self.tri(|_, sub| {
            sub.whitespace();
            if !sub.rest().starts_with(c) {
                return Err(sub.expected(&format!("`{}`", c)));
            }
            sub.pos += c.len_utf8();
            Ok(())
        })
    }

    fn word(&mut self) -> &'a str {
        self.whitespace();
        let rest = self.rest();
        if rest.starts_with(|c: char| c.is_ascii_digit()) {
            return "";
        }
        self.scan(|c| c.is_ascii_alphanumeric() || c == '_' || c == '$')
    }

    fn ident(&mut self) -> Result<&'a str> {
        self.tri(|this, sub| {
            let word = sub.word();
            if word.is_empty() {
                return Err(this.expected("identifier"));
            }
            Ok(word)
        })
    }

    fn keyword(&mut self, keyword: &'static str) -> Result<()> {
        self.keyword_of(keyword, &[keyword])?;
        Ok(())
    }

    fn keyword_of(&mut self, name: &str, keywords: &[&str]) -> Result<&'a str> {
        self.tri(|this, sub| {
            let word = sub.word();
            if !keywords.contains(&word) {
                return Err(this.expected(name));
            }
            Ok(word)
        })
    }

    fn kind(&mut self) -> Result<ParamType> {
        self.tri(|this, sub| {
            sub.whitespace();
            let rest = sub.rest();
            if rest.starts_with('(') || rest.starts_with("tuple(") {
                if rest.starts_with("tuple") {
                    sub.pos += "tuple".len();
                }
                let components = sub.fields(Self::component)?;
                let mut kind = ParamType::Tuple(components);
                while let Ok(length) = sub.array_suffix() {
                    kind = match length {
                        Some(n) => ParamType::FixedArray(Box::new(kind), n),
                        None => ParamType::Array(Box::new(kind)),
                    };
                }
                Ok(kind)
            } else {
                let token = sub.scan(|c| !c.is_whitespace() && !matches!(c, ',' | '(' | ')'));
                ParamType::parse(token, None).map_err(|_| this.expected("Solidity type"))
            }
        })
    }

    fn array_suffix(&mut self) -> Result<Option<usize>> {
        self.tri(|_, sub| {
            sub.take('[')?;
            let length = match sub.scan(|c| c.is_ascii_digit()) {
                "" => None,
                n => Some(n.parse().map_err(|_| sub.expected("fixed array length"))?),
            };
            sub.take(']')?;
            Ok(length)
        })
    }

    fn name(&mut self) -> String {
        self.ident().unwrap_or_default().to_owned()
    }

    fn component(&mut self) -> Result<Param> {
        let kind = self.kind()?;
        Ok(Param::new(self.name(), kind))
    }

    fn param(&mut self) -> Result<Param> {
        let kind = self.kind()?;
        if kind == ParamType::Address {
            let _ = self.keyword("payable");
        }
        let _ = self.keyword_of("data location", LOCATIONS);
        Ok(Param::new(self.name(), kind))
    }

    fn event_param(&mut self) -> Result<Param> {
        let kind = self.kind()?;
        let indexed = self.keyword("indexed").is_ok();
        let mut param = Param::new(self.name(), kind);
        param.indexed = indexed;
        Ok(param)
    }

    fn fields<T, F>(&mut self, mut f: F) -> Result<Vec<T>>
    where
        F: FnMut(&mut Self) -> Result<T>,
    {
        self.tri(|_, sub| {
            sub.take('(')?;
            let mut fields = Vec::new();
            if sub.take(')').is_ok() {
                return Ok(fields);
            }
            loop {
                fields.push(f(sub)?);
                if sub.take(',').is_err() {
                    break;
                }
            }
            sub.take(')')?;
            Ok(fields)
        })
    }

    /// Modifiers after the parameter list; returns the declared mutability
    fn modifiers(&mut self) -> StateMutability {
        let mut state_mutability = StateMutability::NonPayable;
        while let Ok(modifier) = self.keyword_of("modifier", MODIFIERS) {
            state_mutability = match modifier {
                "pure" => StateMutability::Pure,
                "view" => StateMutability::View,
                "payable" => StateMutability::Payable,
                "nonpayable" => StateMutability::NonPayable,
                _ => state_mutability,
            };
        }
        state_mutability
    }

    fn function(&mut self) -> Result<FunctionDef> {
        self.keyword("function")?;
        let name = self.ident()?.to_owned();
        let inputs = self.fields(Self::param)?;
        let state_mutability = self.modifiers();
        let outputs = match self.keyword("returns") {
            Ok(()) => self.fields(Self::param)?,
            Err(_) => Vec::new(),
        };
        Ok(FunctionDef {
            name,
            inputs,
            outputs,
            state_mutability,
        })
    }

    fn event(&mut self) -> Result<EventDef> {
        self.keyword("event")?;
        let name = self.ident()?.to_owned();
        let inputs = self.fields(Self::event_param)?;
        let anonymous = self.keyword("anonymous").is_ok();
        Ok(EventDef {
            name,
            inputs,
            anonymous,
        })
    }

    fn error(&mut self) -> Result<ErrorDef> {
        self.keyword("error")?;
        let name = self.ident()?.to_owned();
        let inputs = self.fields(Self::param)?;
        Ok(ErrorDef { name, inputs })
    }

    fn constructor(&mut self) -> Result<ConstructorDef> {
        self.keyword("constructor")?;
        let inputs = self.fields(Self::param)?;
        let state_mutability = self.modifiers();
        Ok(ConstructorDef {
            inputs,
            state_mutability,
        })
    }

    fn fallback(&mut self) -> Result<FallbackDef> {
        self.keyword("fallback")?;
        self.fields(Self::param)?;
        let state_mutability = self.modifiers();
        if self.keyword("returns").is_ok() {
            self.fields(Self::param)?;
        }
        Ok(FallbackDef { state_mutability })
    }

    fn receive(&mut self) -> Result<ReceiveDef> {
        self.keyword("receive")?;
        self.take('(')?;
        self.take(')')?;
        self.modifiers();
        Ok(ReceiveDef::default())
    }

    fn end(mut self) -> Result<()> {
        let _ = self.take(';');
        self.whitespace();
        if !self.rest().is_empty() {
            return Err(self.expected("end of declaration"));
        }
        Ok(())
    }
}
