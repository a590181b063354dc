use jarvis_protocol::ChatConversation;
use serde_json::Value;
use tracing::warn;

use crate::frame::EVENT_CONVERSATION_INFO;
use crate::frame::EVENT_ERROR;
use crate::frame::EVENT_TEXT;
use crate::frame::EventFrame;
use crate::frame::Frame;
use crate::frame::JsonLineFrame;
use crate::frame::KIND_CONVERSATION_INFO;
use crate::frame::KIND_TEXT;

/// Callback surface exposed to the UI layer. Every method defaults to a
/// no-op so callers implement only what they render.
///
/// `on_text` carries the freshly appended fragment (field-block
/// framing); `on_content_update` carries the full accumulation so far
/// (json-lines framing). Exactly one of `on_complete`/`on_error` fires
/// as the terminal callback of a stream; `on_error` may additionally
/// fire earlier for non-fatal notifications such as a malformed
/// conversation-info payload.
pub trait ChatHandler {
    fn on_conversation_info(&mut self, _info: ChatConversation) {}
    fn on_text(&mut self, _fragment: &str) {}
    fn on_content_update(&mut self, _full_text: &str) {}
    fn on_error(&mut self, _message: &str) {}
    fn on_complete(&mut self) {}
}

/// Whether the read loop should keep pulling chunks after a frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Complete,
}

/// Interprets frames and routes each to exactly one callback category,
/// owning the running transcript for the lifetime of one stream.
#[derive(Debug, Default)]
pub struct EventDispatcher {
    transcript: String,
}

impl EventDispatcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Concatenation of every text fragment seen so far; grows only by
    /// appending, and is reset only by constructing a fresh dispatcher
    /// for the next stream.
    pub fn transcript(&self) -> &str {
        &self.transcript
    }

    pub fn dispatch(&mut self, frame: Frame, handler: &mut dyn ChatHandler) -> Flow {
        match frame {
            Frame::Event(frame) => {
                self.dispatch_event(frame, handler);
                Flow::Continue
            }
            Frame::Json(frame) => self.dispatch_json(frame, handler),
        }
    }

    fn dispatch_event(&mut self, frame: EventFrame, handler: &mut dyn ChatHandler) {
        match frame.name.as_str() {
            EVENT_CONVERSATION_INFO => {
                match serde_json::from_str::<ChatConversation>(&frame.data) {
                    Ok(info) => handler.on_conversation_info(info),
                    // Recoverable: notify and keep streaming.
                    Err(err) => handler.on_error(&format!("malformed conversation info: {err}")),
                }
            }
            EVENT_TEXT => {
                if !frame.data.is_empty() {
                    self.transcript.push_str(&frame.data);
                    handler.on_text(&frame.data);
                }
            }
            EVENT_ERROR => handler.on_error(&frame.data),
            other => warn!("ignoring unknown event type: {other}"),
        }
    }

    fn dispatch_json(&mut self, frame: JsonLineFrame, handler: &mut dyn ChatHandler) -> Flow {
        let JsonLineFrame {
            kind,
            data,
            completed,
        } = frame;

        match kind {
            KIND_CONVERSATION_INFO => {
                if let Some(payload) = data {
                    match serde_json::from_value::<ChatConversation>(payload) {
                        Ok(info) => handler.on_conversation_info(info),
                        Err(err) => {
                            handler.on_error(&format!("malformed conversation info: {err}"));
                        }
                    }
                }
            }
            KIND_TEXT => {
                let fragment = data.as_ref().and_then(Value::as_str).unwrap_or_default();
                self.transcript.push_str(fragment);
                handler.on_content_update(&self.transcript);
            }
            other => {
                if !completed {
                    warn!("ignoring unknown frame kind: {other}");
                }
            }
        }

        if completed { Flow::Complete } else { Flow::Continue }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[derive(Debug, Default, PartialEq)]
    struct Recorded {
        conversations: Vec<ChatConversation>,
        texts: Vec<String>,
        contents: Vec<String>,
        errors: Vec<String>,
        completions: usize,
    }

    impl ChatHandler for Recorded {
        fn on_conversation_info(&mut self, info: ChatConversation) {
            self.conversations.push(info);
        }
        fn on_text(&mut self, fragment: &str) {
            self.texts.push(fragment.to_string());
        }
        fn on_content_update(&mut self, full_text: &str) {
            self.contents.push(full_text.to_string());
        }
        fn on_error(&mut self, message: &str) {
            self.errors.push(message.to_string());
        }
        fn on_complete(&mut self) {
            self.completions += 1;
        }
    }

    fn text_event(data: &str) -> Frame {
        Frame::Event(EventFrame {
            name: EVENT_TEXT.to_string(),
            data: data.to_string(),
        })
    }

    fn json_text(data: &str, completed: bool) -> Frame {
        Frame::Json(JsonLineFrame {
            kind: KIND_TEXT,
            data: Some(serde_json::json!(data)),
            completed,
        })
    }

    #[test]
    fn field_block_text_passes_the_delta() {
        let mut dispatcher = EventDispatcher::new();
        let mut handler = Recorded::default();

        dispatcher.dispatch(text_event("he"), &mut handler);
        dispatcher.dispatch(text_event("llo"), &mut handler);

        assert_eq!(handler.texts, vec!["he", "llo"]);
        assert_eq!(dispatcher.transcript(), "hello");
    }

    #[test]
    fn empty_text_fragment_is_not_surfaced() {
        let mut dispatcher = EventDispatcher::new();
        let mut handler = Recorded::default();

        dispatcher.dispatch(text_event(""), &mut handler);
        assert_eq!(handler.texts, Vec::<String>::new());
    }

    #[test]
    fn json_text_passes_the_full_accumulation() {
        let mut dispatcher = EventDispatcher::new();
        let mut handler = Recorded::default();

        assert_eq!(
            dispatcher.dispatch(json_text("he", false), &mut handler),
            Flow::Continue
        );
        assert_eq!(
            dispatcher.dispatch(json_text("llo", false), &mut handler),
            Flow::Continue
        );

        assert_eq!(handler.contents, vec!["he", "hello"]);
    }

    #[test]
    fn completed_frame_is_processed_then_terminates() {
        let mut dispatcher = EventDispatcher::new();
        let mut handler = Recorded::default();

        assert_eq!(
            dispatcher.dispatch(json_text("done", true), &mut handler),
            Flow::Complete
        );
        assert_eq!(handler.contents, vec!["done"]);
    }

    #[test]
    fn malformed_conversation_info_is_a_non_fatal_error() {
        let mut dispatcher = EventDispatcher::new();
        let mut handler = Recorded::default();

        let flow = dispatcher.dispatch(
            Frame::Event(EventFrame {
                name: EVENT_CONVERSATION_INFO.to_string(),
                data: "{not json".to_string(),
            }),
            &mut handler,
        );

        assert_eq!(flow, Flow::Continue);
        assert_eq!(handler.errors.len(), 1);
        assert_eq!(handler.completions, 0);
    }

    #[test]
    fn conversation_info_payload_reaches_the_callback() {
        let mut dispatcher = EventDispatcher::new();
        let mut handler = Recorded::default();

        dispatcher.dispatch(
            Frame::Event(EventFrame {
                name: EVENT_CONVERSATION_INFO.to_string(),
                data: r#"{"id":1,"seq":"abc","title":"t","createTime":"x","updateTime":"y"}"#
                    .to_string(),
            }),
            &mut handler,
        );

        assert_eq!(handler.conversations.len(), 1);
        assert_eq!(handler.conversations[0].seq, "abc");
    }

    #[test]
    fn error_event_is_forwarded_without_terminating() {
        let mut dispatcher = EventDispatcher::new();
        let mut handler = Recorded::default();

        let flow = dispatcher.dispatch(
            Frame::Event(EventFrame {
                name: EVENT_ERROR.to_string(),
                data: "backend hiccup".to_string(),
            }),
            &mut handler,
        );

        assert_eq!(flow, Flow::Continue);
        assert_eq!(handler.errors, vec!["backend hiccup"]);
    }

    #[test]
    fn unknown_event_names_are_ignored() {
        let mut dispatcher = EventDispatcher::new();
        let mut handler = Recorded::default();

        let flow = dispatcher.dispatch(
            Frame::Event(EventFrame {
                name: "HEARTBEAT".to_string(),
                data: "ping".to_string(),
            }),
            &mut handler,
        );

        assert_eq!(flow, Flow::Continue);
        assert_eq!(handler, Recorded::default());
    }

    #[test]
    fn null_json_text_payload_appends_nothing_but_still_notifies() {
        let mut dispatcher = EventDispatcher::new();
        let mut handler = Recorded::default();

        dispatcher.dispatch(json_text("hi", false), &mut handler);
        dispatcher.dispatch(
            Frame::Json(JsonLineFrame {
                kind: KIND_TEXT,
                data: None,
                completed: false,
            }),
            &mut handler,
        );

        assert_eq!(handler.contents, vec!["hi", "hi"]);
    }
}
