//! Wire format: one JSON object per WebSocket text frame.
//!
//! ```text
//! { "type": 0, "data": null }          query latest block
//! { "type": 1, "data": null }          query whole chain
//! { "type": 2, "data": [Block, ...] }  chain response
//! ```

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::blockchain::Block;
use crate::error::DecodeError;

pub const QUERY_LATEST: u64 = 0;
pub const QUERY_ALL: u64 = 1;
pub const RESPONSE_CHAIN: u64 = 2;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Message {
    QueryLatest,
    QueryAll,
    ResponseChain(Vec<Block>),
}

#[derive(Serialize)]
struct OutgoingFrame<'a> {
    #[serde(rename = "type")]
    kind: u64,
    data: Option<&'a [Block]>,
}

#[derive(Deserialize)]
struct IncomingFrame {
    #[serde(rename = "type")]
    kind: u64,
    #[serde(default)]
    data: Value,
}

impl Message {
    pub fn kind(&self) -> u64 {
        match self {
            Message::QueryLatest => QUERY_LATEST,
            Message::QueryAll => QUERY_ALL,
            Message::ResponseChain(_) => RESPONSE_CHAIN,
        }
    }

    pub fn encode(&self) -> Result<String, serde_json::Error> {
        let data = match self {
            Message::ResponseChain(blocks) => Some(blocks.as_slice()),
            _ => None,
        };
        serde_json::to_string(&OutgoingFrame {
            kind: self.kind(),
            data,
        })
    }

    /// Parse a frame. Chain responses are accepted both as a block array
    /// and as a string holding the JSON-encoded array, which is how
    /// older nodes send them.
    pub fn decode(frame: &str) -> Result<Message, DecodeError> {
        let incoming: IncomingFrame = serde_json::from_str(frame)?;
        match incoming.kind {
            QUERY_LATEST => Ok(Message::QueryLatest),
            QUERY_ALL => Ok(Message::QueryAll),
            RESPONSE_CHAIN => {
                let blocks = match incoming.data {
                    Value::Array(items) => serde_json::from_value(Value::Array(items))?,
                    Value::String(encoded) => serde_json::from_str(&encoded)?,
                    _ => return Err(DecodeError::MissingChain),
                };
                Ok(Message::ResponseChain(blocks))
            }
            other => Err(DecodeError::UnknownType(other)),
        }
    }
}
