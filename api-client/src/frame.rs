use serde::Deserialize;
use serde_json::Value;
use tracing::debug;

pub const EVENT_CONVERSATION_INFO: &str = "CONVERSATION_INFO";
pub const EVENT_TEXT: &str = "TEXT";
pub const EVENT_ERROR: &str = "ERROR";

pub const KIND_CONVERSATION_INFO: i64 = 1;
pub const KIND_TEXT: i64 = 2;

/// One complete semantic unit reconstructed from the line stream.
#[derive(Debug, Clone, PartialEq)]
pub enum Frame {
    /// Field-block framing: an `event:`/`data:` pair terminated by a
    /// blank line.
    Event(EventFrame),
    /// Json-lines framing: one independently parsed object per line.
    Json(JsonLineFrame),
}

impl Frame {
    /// True when the frame itself signals stream completion, independent
    /// of read-loop exhaustion.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Frame::Json(frame) if frame.completed)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct EventFrame {
    pub name: String,
    pub data: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct JsonLineFrame {
    #[serde(rename = "type")]
    pub kind: i64,
    #[serde(default)]
    pub data: Option<Value>,
    #[serde(default)]
    pub completed: bool,
}

/// A framing convention: groups decoded text into discrete frames.
///
/// Implementations own the trailing partial line between chunks, so
/// frames survive arbitrary chunk splits. The partial-line state never
/// contains a line terminator.
pub trait Framing: Send {
    /// Consume a decoded text chunk and return every frame it completes.
    fn push_chunk(&mut self, text: &str) -> Vec<Frame>;

    /// Called once at end of stream; may emit a final frame from
    /// buffered text.
    fn finish(&mut self) -> Vec<Frame> {
        Vec::new()
    }
}

/// Field-block framing: `event: <name>` and `data: <payload>` lines
/// followed by a blank-line terminator. Unknown field lines are ignored
/// for forward compatibility.
#[derive(Debug, Default)]
pub struct FieldBlockFraming {
    partial_line: String,
    event_name: Option<String>,
    event_data: Option<String>,
}

impl FieldBlockFraming {
    pub fn new() -> Self {
        Self::default()
    }

    fn push_line(&mut self, line: &str, frames: &mut Vec<Frame>) {
        if let Some(name) = line.strip_prefix("event:") {
            self.event_name = Some(name.trim().to_string());
        } else if let Some(data) = line.strip_prefix("data:") {
            // Strip the single conventional separator space and nothing
            // else; the rest of the payload is kept byte for byte.
            let data = data.strip_prefix(' ').unwrap_or(data);
            self.event_data = Some(data.to_string());
        } else if line.is_empty() {
            // Blank line terminates the block. A name without data (or
            // data without a name) is dropped, and the accumulator is
            // reset either way.
            if let (Some(name), Some(data)) = (self.event_name.take(), self.event_data.take()) {
                frames.push(Frame::Event(EventFrame { name, data }));
            }
        }
    }
}

impl Framing for FieldBlockFraming {
    fn push_chunk(&mut self, text: &str) -> Vec<Frame> {
        let mut frames = Vec::new();
        let mut buf = std::mem::take(&mut self.partial_line);
        buf.push_str(text);

        let mut start = 0;
        while let Some(offset) = buf[start..].find('\n') {
            self.push_line(&buf[start..start + offset], &mut frames);
            start += offset + 1;
        }
        self.partial_line = buf[start..].to_string();
        frames
    }
}

/// Json-lines framing: each non-blank `\n`-terminated line is one JSON
/// frame. Malformed lines are skipped so a single bad frame cannot lose
/// the rest of the stream.
#[derive(Debug, Default)]
pub struct JsonLinesFraming {
    partial_line: String,
}

impl JsonLinesFraming {
    pub fn new() -> Self {
        Self::default()
    }

    fn parse_line(line: &str) -> Option<Frame> {
        if line.trim().is_empty() {
            return None;
        }
        match serde_json::from_str::<JsonLineFrame>(line) {
            Ok(frame) => Some(Frame::Json(frame)),
            Err(err) => {
                debug!("skipping malformed frame line: {err}");
                None
            }
        }
    }
}

impl Framing for JsonLinesFraming {
    fn push_chunk(&mut self, text: &str) -> Vec<Frame> {
        let mut frames = Vec::new();
        let mut buf = std::mem::take(&mut self.partial_line);
        buf.push_str(text);

        let mut start = 0;
        while let Some(offset) = buf[start..].find('\n') {
            if let Some(frame) = Self::parse_line(&buf[start..start + offset]) {
                frames.push(frame);
            }
            start += offset + 1;
        }
        self.partial_line = buf[start..].to_string();
        frames
    }

    fn finish(&mut self) -> Vec<Frame> {
        let line = std::mem::take(&mut self.partial_line);
        Self::parse_line(&line).into_iter().collect()
    }
}
