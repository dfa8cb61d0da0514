pub mod models;

use serde::{Deserialize, Serialize};

use crate::core::message::Role;

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

impl ChatMessage {
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
        }
    }
}

#[derive(Serialize, Debug)]
pub struct ChatRequest {
    pub model: String,
    pub messages: Vec<ChatMessage>,
    pub temperature: f32,
    pub max_tokens: u32,
}

#[derive(Deserialize, Debug)]
pub struct ChatCompletionMessage {
    pub content: Option<String>,
}

#[derive(Deserialize, Debug)]
pub struct ChatCompletionChoice {
    pub message: ChatCompletionMessage,
    #[serde(default)]
    pub finish_reason: Option<String>,
}

#[derive(Deserialize, Debug)]
pub struct ChatCompletionResponse {
    pub choices: Vec<ChatCompletionChoice>,
}

#[derive(Deserialize, Debug, Clone, Default)]
pub struct ModelCapabilities {
    pub completion: Option<bool>,
}

#[derive(Deserialize, Debug, Clone)]
pub struct ModelInfo {
    pub id: String,
    pub name: Option<String>,
    pub description: Option<String>,
    pub context_length: Option<u64>,
    pub capabilities: Option<ModelCapabilities>,
}

impl ModelInfo {
    /// Models advertising completion support, or any context window at all,
    /// are usable for chat.
    pub fn supports_completion(&self) -> bool {
        let advertised = self
            .capabilities
            .as_ref()
            .and_then(|caps| caps.completion)
            .unwrap_or(false);
        advertised || self.context_length.unwrap_or(0) > 0
    }

    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or(&self.id)
    }
}

#[derive(Deserialize, Debug)]
pub struct ModelsResponse {
    pub data: Vec<ModelInfo>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chat_request_serializes_wire_shape() {
        let request = ChatRequest {
            model: "openai/gpt-4o".into(),
            messages: vec![
                ChatMessage::new(Role::System, "Base."),
                ChatMessage::new(Role::User, "Hi"),
            ],
            temperature: 0.5,
            max_tokens: 4000,
        };
        let value = serde_json::to_value(&request).expect("serialize");
        assert_eq!(
            value,
            serde_json::json!({
                "model": "openai/gpt-4o",
                "messages": [
                    {"role": "system", "content": "Base."},
                    {"role": "user", "content": "Hi"}
                ],
                "temperature": 0.5,
                "max_tokens": 4000
            })
        );
    }

    #[test]
    fn completion_response_parses_content() {
        let raw = r#"{"id":"x","choices":[{"index":0,"message":{"role":"assistant","content":"Hello"},"finish_reason":"stop"}]}"#;
        let parsed: ChatCompletionResponse = serde_json::from_str(raw).expect("parse");
        assert_eq!(parsed.choices[0].message.content.as_deref(), Some("Hello"));
        assert_eq!(parsed.choices[0].finish_reason.as_deref(), Some("stop"));
    }

    #[test]
    fn model_completion_support_heuristic() {
        let raw = r#"{"data":[
            {"id":"a","capabilities":{"completion":true}},
            {"id":"b","context_length":8192},
            {"id":"c","context_length":0},
            {"id":"d"}
        ]}"#;
        let parsed: ModelsResponse = serde_json::from_str(raw).expect("parse");
        let supported: Vec<&str> = parsed
            .data
            .iter()
            .filter(|m| m.supports_completion())
            .map(|m| m.id.as_str())
            .collect();
        assert_eq!(supported, vec!["a", "b"]);
    }
}
