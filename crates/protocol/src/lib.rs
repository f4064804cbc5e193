//! periodgrid Session Protocol, v1 wire format
//!
//! This crate defines the message types exchanged by `pgrid session`.
//! The wire format is JSONL (newline-delimited JSON) over stdin/stdout:
//! one client message per input line, exactly one server message per reply.
//!
//! # Protocol Version
//!
//! This is **protocol v1**. Changes require:
//! 1. Version bump in PROTOCOL_VERSION
//! 2. New golden vectors in `crates/protocol/tests/golden/`
//!
//! # Usage
//!
//! ```ignore
//! use periodgrid_protocol::{parse_line, ServerMessage};
//!
//! let msg = parse_line(r#"{"type":"add_row","id":"1"}"#)?;
//! let reply = ServerMessage::error(msg.id(), "bad_request", "nope");
//! let json = reply.to_line()?;
//! ```

use periodgrid_engine::{CellPos, GridState, ValidationError};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Current protocol version. Increment for breaking changes.
pub const PROTOCOL_VERSION: u32 = 1;

/// Error codes carried by `ServerMessage::Error`.
pub mod codes {
    /// Line is not a valid client message.
    pub const BAD_REQUEST: &str = "bad_request";
    /// Cell input is not a finite number.
    pub const BAD_INPUT: &str = "bad_input";
    /// Address outside the current grid shape.
    pub const OUT_OF_BOUNDS: &str = "out_of_bounds";
    /// Grid shape rejected.
    pub const BAD_STATE: &str = "bad_state";
}

#[derive(Debug, Error)]
pub enum ProtocolError {
    #[error("empty line")]
    EmptyLine,
    #[error("malformed message: {0}")]
    Malformed(#[from] serde_json::Error),
}

// =============================================================================
// Client → Server Messages
// =============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientMessage {
    AddRow(RequestMessage),
    AddTable(RequestMessage),
    SetCell(SetCellMessage),
    Submit(RequestMessage),
    Snapshot(RequestMessage),
}

impl ClientMessage {
    pub fn id(&self) -> &str {
        match self {
            ClientMessage::AddRow(m)
            | ClientMessage::AddTable(m)
            | ClientMessage::Submit(m)
            | ClientMessage::Snapshot(m) => &m.id,
            ClientMessage::SetCell(m) => &m.id,
        }
    }
}

/// A message with no payload beyond its id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RequestMessage {
    pub id: String,
}

/// Store one raw input value. An empty `value` clears the cell.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SetCellMessage {
    pub id: String,
    pub table: usize,
    pub row: usize,
    pub column: usize,
    #[serde(default)]
    pub value: String,
}

impl SetCellMessage {
    pub fn pos(&self) -> CellPos {
        CellPos::new(self.table, self.row, self.column)
    }
}

/// Parse one input line.
pub fn parse_line(line: &str) -> Result<ClientMessage, ProtocolError> {
    let line = line.trim();
    if line.is_empty() {
        return Err(ProtocolError::EmptyLine);
    }
    Ok(serde_json::from_str(line)?)
}

// =============================================================================
// Server → Client Messages
// =============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerMessage {
    State(StateMessage),
    SubmitResult(SubmitResultMessage),
    Error(ErrorMessage),
}

impl ServerMessage {
    pub fn state(id: impl Into<String>, state: GridState) -> Self {
        ServerMessage::State(StateMessage { id: id.into(), state })
    }

    pub fn error(id: impl Into<String>, code: &str, message: impl Into<String>) -> Self {
        ServerMessage::Error(ErrorMessage {
            id: id.into(),
            code: code.to_string(),
            message: message.into(),
        })
    }

    /// Serialize without the trailing newline.
    pub fn to_line(&self) -> Result<String, ProtocolError> {
        Ok(serde_json::to_string(self)?)
    }
}

/// Current grid after a resize, edit or snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StateMessage {
    pub id: String,
    pub state: GridState,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubmitStatus {
    Valid,
    Invalid,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubmitResultMessage {
    pub id: String,
    pub status: SubmitStatus,
    #[serde(default)]
    pub errors: Vec<ErrorEntry>,
    pub message: String,
    pub state: GridState,
}

/// One validation finding, addressable by cell or by form field name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorEntry {
    /// `None` for the structural error
    pub key: Option<CellPos>,
    /// `tables][t][r][c`, empty for the structural error
    pub field: String,
    pub message: String,
}

impl ErrorEntry {
    pub fn new(error: &ValidationError, message: impl Into<String>) -> Self {
        ErrorEntry {
            key: error.key(),
            field: error.field_path(),
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorMessage {
    pub id: String,
    pub code: String,
    pub message: String,
}
