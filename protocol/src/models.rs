use serde::Deserialize;
use serde::Serialize;

/// Model selector accepted by the chat backend.
#[derive(Debug, Serialize, Deserialize, Default, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(rename_all = "camelCase")]
pub enum ModelId {
    #[default]
    QwPlus,
    QwTurbo,
}

impl ModelId {
    pub fn as_str(self) -> &'static str {
        match self {
            ModelId::QwPlus => "qwPlus",
            ModelId::QwTurbo => "qwTurbo",
        }
    }
}

/// One chat turn's outbound request body.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ChatRequest {
    /// Sequence token of the conversation to continue; empty to start a
    /// new conversation.
    pub conversation_seq: String,
    pub model: ModelId,
    pub user_text: String,
}

/// Conversation metadata sent by the server near the start of a stream.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ChatConversation {
    pub id: i64,
    /// Sequence token identifying the conversation on subsequent turns.
    pub seq: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<i64>,
    pub title: String,
    pub create_time: String,
    pub update_time: String,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn chat_request_serializes_with_camel_case_keys() {
        let request = ChatRequest {
            conversation_seq: String::new(),
            model: ModelId::QwTurbo,
            user_text: "hello".to_string(),
        };

        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "conversationSeq": "",
                "model": "qwTurbo",
                "userText": "hello",
            })
        );
    }

    #[test]
    fn conversation_deserializes_without_user_id() {
        let conversation: ChatConversation = serde_json::from_str(
            r#"{"id":1,"seq":"abc","title":"t","createTime":"x","updateTime":"y"}"#,
        )
        .unwrap();

        assert_eq!(
            conversation,
            ChatConversation {
                id: 1,
                seq: "abc".to_string(),
                user_id: None,
                title: "t".to_string(),
                create_time: "x".to_string(),
                update_time: "y".to_string(),
            }
        );
    }

    #[test]
    fn model_id_matches_wire_literals() {
        assert_eq!(
            serde_json::to_string(&ModelId::QwPlus).unwrap(),
            "\"qwPlus\""
        );
        assert_eq!(ModelId::QwTurbo.as_str(), "qwTurbo");
    }
}
