//! JSONL editing session.
//!
//! Reads one client message per line and answers each with exactly one
//! server message. The session holds the only copy of the grid state for its
//! lifetime; a rejected action leaves it unchanged.

use std::io::{self, BufRead, Write};

use periodgrid_config::settings::MessageSettings;
use periodgrid_engine::{actions, Action, ActionError, GridError, GridState};
use periodgrid_protocol::{
    codes, parse_line, ClientMessage, ProtocolError, ServerMessage, SubmitResultMessage,
};

use crate::verdict::Verdict;

/// Counters reported when the input stream ends.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SessionStats {
    pub handled: usize,
    pub rejected: usize,
}

pub struct Session {
    state: GridState,
    messages: MessageSettings,
}

impl Session {
    pub fn new(state: GridState, messages: MessageSettings) -> Self {
        Self { state, messages }
    }

    pub fn state(&self) -> &GridState {
        &self.state
    }

    /// Handle one client message.
    pub fn handle(&mut self, msg: ClientMessage) -> ServerMessage {
        let id = msg.id().to_string();
        let action = match msg {
            ClientMessage::Snapshot(_) => return ServerMessage::state(id, self.state.clone()),
            ClientMessage::AddRow(_) => Action::AddRow,
            ClientMessage::AddTable(_) => Action::AddTable,
            ClientMessage::Submit(_) => Action::Submit,
            ClientMessage::SetCell(set) => Action::SetCell {
                pos: set.pos(),
                input: set.value,
            },
        };

        match actions::apply(self.state.clone(), action) {
            Ok(outcome) => {
                self.state = outcome.state;
                if matches!(outcome.status, actions::Status::Valid(_) | actions::Status::Invalid(_)) {
                    let verdict = Verdict::from_status(&outcome.status, &self.messages);
                    ServerMessage::SubmitResult(SubmitResultMessage {
                        id,
                        status: verdict.status,
                        errors: verdict.errors,
                        message: verdict.message,
                        state: self.state.clone(),
                    })
                } else {
                    ServerMessage::state(id, self.state.clone())
                }
            }
            Err(err) => {
                log::debug!("action {} rejected: {}", id, err);
                ServerMessage::error(id, error_code(&err), err.to_string())
            }
        }
    }

    /// Handle one raw input line. Blank lines produce no reply.
    pub fn handle_line(&mut self, line: &str) -> Option<ServerMessage> {
        match parse_line(line) {
            Ok(msg) => Some(self.handle(msg)),
            Err(ProtocolError::EmptyLine) => None,
            Err(err) => Some(ServerMessage::error(
                salvage_id(line),
                codes::BAD_REQUEST,
                err.to_string(),
            )),
        }
    }

    /// Serve until `input` is exhausted.
    ///
    /// Lines that are not valid UTF-8 are answered with a `bad_request` error.
    pub fn run<R: BufRead, W: Write>(&mut self, mut input: R, mut output: W) -> io::Result<SessionStats> {
        let mut stats = SessionStats::default();
        let mut buf = Vec::new();
        loop {
            buf.clear();
            if input.read_until(b'\n', &mut buf)? == 0 {
                break;
            }
            let line = String::from_utf8_lossy(&buf);
            let line = line.trim_end_matches(['\n', '\r']);
            let Some(reply) = self.handle_line(line) else {
                continue;
            };
            stats.handled += 1;
            if matches!(reply, ServerMessage::Error(_)) {
                stats.rejected += 1;
            }

            let text = reply
                .to_line()
                .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
            writeln!(output, "{}", text)?;
            output.flush()?;
        }
        log::info!("session ended: {} messages, {} rejected", stats.handled, stats.rejected);
        Ok(stats)
    }
}

fn error_code(err: &ActionError) -> &'static str {
    match err {
        ActionError::Input { .. } => codes::BAD_INPUT,
        ActionError::Grid(GridError::OutOfBounds { .. }) => codes::OUT_OF_BOUNDS,
        ActionError::Grid(_) => codes::BAD_STATE,
    }
}

/// Best-effort id of a line that failed to parse as a client message.
fn salvage_id(line: &str) -> String {
    serde_json::from_str::<serde_json::Value>(line)
        .ok()
        .and_then(|v| v.get("id").and_then(|id| id.as_str()).map(String::from))
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use periodgrid_engine::{CellPos, CellValue, Grid};
    use periodgrid_protocol::SubmitStatus;

    fn session() -> Session {
        Session::new(Grid::new(2026), MessageSettings::default())
    }

    #[test]
    fn test_resize_replies_with_state() {
        let mut s = session();
        match s.handle_line(r#"{"type":"add_row","id":"1"}"#) {
            Some(ServerMessage::State(msg)) => {
                assert_eq!(msg.id, "1");
                assert_eq!(msg.state.years(), vec![2026, 2025]);
            }
            other => panic!("expected State, got {:?}", other),
        }
        assert_eq!(s.state().row_count(), 2);
    }

    #[test]
    fn test_bad_input_keeps_state() {
        let mut s = session();
        s.handle_line(r#"{"type":"set_cell","id":"1","table":0,"row":0,"column":0,"value":"4"}"#);
        let reply = s.handle_line(r#"{"type":"set_cell","id":"2","table":0,"row":0,"column":0,"value":"x"}"#);

        match reply {
            Some(ServerMessage::Error(err)) => {
                assert_eq!(err.id, "2");
                assert_eq!(err.code, codes::BAD_INPUT);
            }
            other => panic!("expected Error, got {:?}", other),
        }
        assert_eq!(s.state().cell(CellPos::new(0, 0, 0)), Some(CellValue::Value(4.0)));
    }

    #[test]
    fn test_out_of_bounds() {
        let mut s = session();
        let reply = s.handle_line(r#"{"type":"set_cell","id":"9","table":0,"row":1,"column":0,"value":"1"}"#);
        assert!(matches!(reply, Some(ServerMessage::Error(ref e)) if e.code == codes::OUT_OF_BOUNDS));
    }

    #[test]
    fn test_malformed_line_salvages_id() {
        let mut s = session();
        match s.handle_line(r#"{"type":"drop_table","id":"q"}"#) {
            Some(ServerMessage::Error(err)) => {
                assert_eq!(err.id, "q");
                assert_eq!(err.code, codes::BAD_REQUEST);
            }
            other => panic!("expected Error, got {:?}", other),
        }
        assert!(s.handle_line("   ").is_none());
    }

    #[test]
    fn test_submit_result() {
        let mut s = session();
        match s.handle_line(r#"{"type":"submit","id":"s"}"#) {
            Some(ServerMessage::SubmitResult(result)) => {
                assert_eq!(result.status, SubmitStatus::Invalid);
                assert_eq!(result.message, "Please fill out the table.");
            }
            other => panic!("expected SubmitResult, got {:?}", other),
        }

        s.handle_line(r#"{"type":"set_cell","id":"1","table":0,"row":0,"column":0,"value":"3"}"#);
        match s.handle_line(r#"{"type":"submit","id":"t"}"#) {
            Some(ServerMessage::SubmitResult(result)) => {
                assert_eq!(result.status, SubmitStatus::Valid);
                assert!(result.state.has_totals());
            }
            other => panic!("expected SubmitResult, got {:?}", other),
        }
    }

    #[test]
    fn test_run_answers_every_line() {
        let input = concat!(
            r#"{"type":"add_table","id":"1"}"#, "\n",
            "\n",
            "not json\n",
            r#"{"type":"snapshot","id":"2"}"#, "\n",
        );
        let mut out = Vec::new();
        let mut s = session();
        let stats = s.run(input.as_bytes(), &mut out).unwrap();

        assert_eq!(stats, SessionStats { handled: 3, rejected: 1 });
        let replies: Vec<ServerMessage> = String::from_utf8(out)
            .unwrap()
            .lines()
            .map(|l| serde_json::from_str(l).unwrap())
            .collect();
        assert_eq!(replies.len(), 3);
        assert!(matches!(&replies[1], ServerMessage::Error(e) if e.id.is_empty()));
        assert!(matches!(&replies[2], ServerMessage::State(m) if m.state.table_count() == 2));
    }

    #[test]
    fn test_run_survives_non_utf8_line() {
        let mut input = Vec::new();
        input.extend_from_slice(br#"{"type":"set_cell","id":"1","table":0,"row":0,"column":0,"value":"6"}"#);
        input.extend_from_slice(b"\n\xff\xfe\n");
        input.extend_from_slice(br#"{"type":"snapshot","id":"2"}"#);
        input.extend_from_slice(b"\r\n");

        let mut out = Vec::new();
        let mut s = session();
        let stats = s.run(input.as_slice(), &mut out).unwrap();

        assert_eq!(stats, SessionStats { handled: 3, rejected: 1 });
        let replies: Vec<ServerMessage> = String::from_utf8(out)
            .unwrap()
            .lines()
            .map(|l| serde_json::from_str(l).unwrap())
            .collect();
        assert!(matches!(&replies[1], ServerMessage::Error(e) if e.code == codes::BAD_REQUEST));
        match &replies[2] {
            ServerMessage::State(m) => {
                assert_eq!(m.id, "2");
                assert_eq!(m.state.cell(CellPos::new(0, 0, 0)), Some(CellValue::Value(6.0)));
            }
            other => panic!("expected State, got {:?}", other),
        }
    }
}
