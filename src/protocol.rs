//! Message types exchanged between host and worker.
//!
//! Inbound: `{"type":"BUILD","payload":{"files":[..]}}`,
//! `{"type":"SEARCH","payload":{"query":".."}}`,
//! `{"type":"GET","payload":{"id":..}}`, `{"type":"PING"}`.
//!
//! Outbound messages carry their fields at the top level next to `type`,
//! e.g. `{"type":"PROGRESS","loaded":1,"total":2,"file":"a.json"}`.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::models::{scalar_text, Record, SearchResult};
use crate::progress::LoadEvent;

/// Host → worker.
///
/// Decoded leniently: a missing or null `payload`, or a missing field in
/// it, falls back to an empty file list, an empty query, or a null id.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(try_from = "Envelope")]
pub enum Command {
    /// Load these sources and replace the index.
    Build { files: Vec<String> },
    Search { query: String },
    /// Look up one record by id.
    Get { id: Value },
    Ping,
    /// An inbound line that could not be decoded. Answered with `ERROR` in
    /// sequence with every other reply.
    Malformed { message: String },
}

impl Command {
    /// Decode one inbound line. Never fails; bad input becomes
    /// [`Command::Malformed`].
    pub fn decode(line: &str) -> Command {
        serde_json::from_str(line).unwrap_or_else(|e| Command::Malformed {
            message: format!("invalid message: {}", e),
        })
    }
}

#[derive(Deserialize)]
struct Envelope {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    payload: Value,
}

impl TryFrom<Envelope> for Command {
    type Error = String;

    fn try_from(envelope: Envelope) -> Result<Self, Self::Error> {
        let payload = &envelope.payload;
        match envelope.kind.as_str() {
            "BUILD" => Ok(Command::Build {
                files: payload
                    .get("files")
                    .and_then(Value::as_array)
                    .map(|files| files.iter().filter_map(scalar_text).collect())
                    .unwrap_or_default(),
            }),
            "SEARCH" => Ok(Command::Search {
                query: payload
                    .get("query")
                    .and_then(scalar_text)
                    .unwrap_or_default(),
            }),
            "GET" => Ok(Command::Get {
                id: payload.get("id").cloned().unwrap_or(Value::Null),
            }),
            "PING" => Ok(Command::Ping),
            other => Err(format!("unknown message type: {}", other)),
        }
    }
}

/// Worker → host.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Event {
    Progress {
        loaded: usize,
        total: usize,
        #[serde(skip_serializing_if = "Option::is_none")]
        file: Option<String>,
    },
    Warn {
        file: String,
        message: String,
    },
    /// Terminal failure of one build, or an undecodable inbound message.
    Error {
        message: String,
    },
    /// Terminal success of one build.
    Ready {
        count: usize,
    },
    Results {
        items: Vec<SearchResult>,
    },
    NotReady,
    Pong,
    Record {
        item: Record,
    },
    NotFound {
        id: Value,
    },
}

impl From<LoadEvent> for Event {
    fn from(event: LoadEvent) -> Self {
        match event {
            LoadEvent::Warning { uri, message } => Event::Warn { file: uri, message },
            LoadEvent::Loaded { uri, loaded, total } => Event::Progress {
                loaded,
                total,
                file: Some(uri),
            },
        }
    }
}
