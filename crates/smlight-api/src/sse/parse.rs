//! Incremental `text/event-stream` decoder.
//!
//! Byte chunks go in via [`EventDecoder::push`]; complete events come out
//! of [`EventDecoder::next_event`]. Handles a leading BOM, LF / CR / CRLF
//! line endings (including a CRLF split across chunks), comments, and
//! multi-line `data:` fields. `retry:` is ignored because the connection
//! manager owns its own retry policy.

use bytes::{Buf, BytesMut};

use super::event::MessageEvent;
use crate::error::Error;

const LF: u8 = b'\n';
const CR: u8 = b'\r';
const BOM: &[u8] = "\u{FEFF}".as_bytes();
const DEFAULT_EVENT_TYPE: &str = "message";

/// Upper bound on bytes held for one unfinished line plus the pending
/// event's data. Device events are a few hundred bytes at most.
pub const MAX_PENDING_BYTES: usize = 64 * 1024;

/// Stateful SSE line parser for one connection.
#[derive(Debug, Default)]
pub struct EventDecoder {
    buffer: BytesMut,
    event_type: Option<String>,
    data: Option<String>,
    id: Option<String>,
    started: bool,
}

impl EventDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a chunk received from the transport.
    pub fn push(&mut self, chunk: &[u8]) {
        self.buffer.extend_from_slice(chunk);
    }

    /// Fail if the peer has sent more than [`MAX_PENDING_BYTES`] without
    /// completing a line or an event.
    ///
    /// Call after draining [`next_event`](Self::next_event). On overflow
    /// the decoder is reset and [`Error::Stream`] is returned, so the
    /// caller can drop the connection.
    pub fn check_limit(&mut self) -> Result<(), Error> {
        let pending = self.buffer.len() + self.data.as_ref().map_or(0, String::len);
        if pending > MAX_PENDING_BYTES {
            *self = Self::default();
            return Err(Error::Stream(format!(
                "{pending} bytes pending without an event boundary (limit {MAX_PENDING_BYTES})"
            )));
        }
        Ok(())
    }

    /// Parse buffered lines until one event is complete.
    ///
    /// Returns `None` when more bytes are needed.
    pub fn next_event(&mut self) -> Option<MessageEvent> {
        if !self.started {
            if self.buffer.len() < BOM.len() && BOM.starts_with(&self.buffer) {
                return None;
            }
            if self.buffer.starts_with(BOM) {
                self.buffer.advance(BOM.len());
            }
            self.started = true;
        }

        while let Some(line) = self.take_line() {
            if let Some(event) = self.process_line(&line) {
                return Some(event);
            }
        }
        None
    }

    /// Split one line off the buffer, without its terminator.
    fn take_line(&mut self) -> Option<String> {
        let pos = self.buffer.iter().position(|b| *b == LF || *b == CR)?;
        let terminator_len = match self.buffer[pos] {
            CR => match self.buffer.get(pos + 1) {
                Some(&LF) => 2,
                Some(_) => 1,
                // Lone CR at the end of the buffer: the LF may be in the
                // next chunk, so the line waits for one more byte. With
                // CR-only framing the last event of a burst is held until
                // the next keep-alive arrives.
                None => return None,
            },
            _ => 1,
        };
        let line = self.buffer.split_to(pos);
        self.buffer.advance(terminator_len);
        Some(String::from_utf8_lossy(&line).into_owned())
    }

    fn process_line(&mut self, line: &str) -> Option<MessageEvent> {
        if line.is_empty() {
            return self.dispatch();
        }
        if line.starts_with(':') {
            return None;
        }

        let (field, value) = match line.split_once(':') {
            Some((field, value)) => (field, value.strip_prefix(' ').unwrap_or(value)),
            None => (line, ""),
        };

        match field {
            "event" => self.event_type = Some(value.to_owned()),
            "data" => match self.data.as_mut() {
                Some(data) => {
                    data.push('\n');
                    data.push_str(value);
                }
                None => self.data = Some(value.to_owned()),
            },
            "id" if !value.contains('\0') => self.id = Some(value.to_owned()),
            _ => {}
        }
        None
    }

    /// Emit the pending event on a blank line. Events without data are
    /// discarded; the last seen id carries over.
    fn dispatch(&mut self) -> Option<MessageEvent> {
        let event_type = self.event_type.take();
        let data = self.data.take()?;
        Some(MessageEvent {
            event_type: event_type
                .filter(|t| !t.is_empty())
                .unwrap_or_else(|| DEFAULT_EVENT_TYPE.to_owned()),
            data,
            id: self.id.clone(),
        })
    }
}
