//! Event topics and log decoding

use abikit_crypto::keccak256;
use abikit_primitives::H256;

use super::EventDef;
use crate::abi::decode::{decode_values, wrap_values};
use crate::abi::encode::{bytes_of, invalid_argument};
use crate::abi::{encode, DecodeAs, Param, ParamType, Value};
use crate::error::{AbiError, Result};
use crate::signature::signature_of;

/// A decoded event log
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedLog {
    /// Event name
    pub name: String,
    /// Arguments in declaration order, as a tuple or struct.
    ///
    /// Indexed arguments of reference types (strings, bytes, arrays and
    /// tuples) only exist as their keccak256 hash and decode to
    /// [`Value::Bytes`].
    pub args: Value,
}

impl EventDef {
    /// Canonical signature, e.g. `Transfer(address,address,uint256)`
    pub fn signature(&self) -> String {
        signature_of(&self.name, &self.inputs)
    }

    /// Signature topic
    pub fn topic(&self) -> H256 {
        keccak256(self.signature().as_bytes())
    }

    fn indexed(&self) -> impl Iterator<Item = &Param> {
        self.inputs.iter().filter(|p| p.indexed)
    }

    /// Encode filter topics.
    ///
    /// `args` lines up with the indexed inputs; `None` (or a missing trailing
    /// argument) leaves the topic as a wildcard. The signature topic comes
    /// first unless the event is anonymous.
    pub fn encode_topics(&self, args: &[Option<Value>]) -> Result<Vec<Option<H256>>> {
        let indexed: Vec<&Param> = self.indexed().collect();
        if args.len() > indexed.len() {
            return Err(AbiError::LengthMismatch {
                expected: indexed.len(),
                given: args.len(),
            });
        }

        let mut topics = Vec::with_capacity(indexed.len() + 1);
        if !self.anonymous {
            topics.push(Some(self.topic()));
        }
        for (i, param) in indexed.iter().enumerate() {
            let topic = match args.get(i) {
                Some(Some(value)) => Some(encode_topic(param, value)?),
                _ => None,
            };
            topics.push(topic);
        }
        Ok(topics)
    }

    /// Decode a log from its topics and data
    pub fn decode_log(&self, topics: &[H256], data: &[u8], shape: DecodeAs) -> Result<DecodedLog> {
        let skip = if self.anonymous { 0 } else { 1 };
        let expected = self.indexed().count() + skip;
        if topics.len() != expected {
            return Err(AbiError::TopicCountMismatch {
                signature: self.signature(),
                expected,
                given: topics.len(),
            });
        }
        if !self.anonymous && topics[0] != self.topic() {
            return Err(AbiError::TopicMismatch {
                expected: self.topic().to_hex(),
                given: topics[0].to_hex(),
                signature: self.signature(),
            });
        }

        let unindexed: Vec<Param> = self.inputs.iter().filter(|p| !p.indexed).cloned().collect();
        let mut data_values = decode_values(&unindexed, data, shape)?.into_iter();
        let mut topic_values = topics[skip..].iter();

        let mut values = Vec::with_capacity(self.inputs.len());
        for param in &self.inputs {
            let value = if param.indexed {
                match topic_values.next() {
                    Some(topic) => decode_topic(param, topic, shape)?,
                    None => break,
                }
            } else {
                match data_values.next() {
                    Some(value) => value,
                    None => break,
                }
            };
            values.push(value);
        }

        tracing::trace!(event = %self.name, args = values.len(), "decoded event log");
        Ok(DecodedLog {
            name: self.name.clone(),
            args: wrap_values(&self.inputs, values, shape),
        })
    }
}

/// Value types are stored in place; everything else is hashed
fn is_hashed(kind: &ParamType) -> bool {
    matches!(
        kind,
        ParamType::String | ParamType::Bytes | ParamType::Array(_) | ParamType::FixedArray(..) | ParamType::Tuple(_)
    )
}

fn encode_topic(param: &Param, value: &Value) -> Result<H256> {
    match &param.kind {
        ParamType::String => match value {
            Value::String(s) => Ok(keccak256(s.as_bytes())),
            _ => Err(invalid_argument(&param.kind, value)),
        },
        ParamType::Bytes => Ok(keccak256(&bytes_of(&param.kind, value)?)),
        // filtering on hashed composite values is not supported
        kind if is_hashed(kind) => Err(AbiError::InvalidType(kind.to_string())),
        _ => {
            let word = encode(std::slice::from_ref(param), std::slice::from_ref(value))?;
            let mut topic = [0u8; 32];
            topic.copy_from_slice(&word);
            Ok(H256::from_bytes(topic))
        }
    }
}

fn decode_topic(param: &Param, topic: &H256, shape: DecodeAs) -> Result<Value> {
    if is_hashed(&param.kind) {
        return Ok(Value::Bytes(topic.as_bytes().to_vec()));
    }
    let mut values = decode_values(std::slice::from_ref(param), topic.as_bytes(), shape)?;
    values.pop().ok_or_else(|| AbiError::DataSizeTooSmall {
        expected: 32,
        given: 0,
    })
}
