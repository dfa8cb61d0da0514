//! Single-shot chat completion client.
//!
//! One request maps to exactly one response. Failures of any kind surface as
//! [`CompletionError`]; nothing is retried.

use std::error::Error as StdError;
use std::fmt;

use async_trait::async_trait;
use reqwest::StatusCode;
use tracing::debug;

use crate::api::{ChatCompletionResponse, ChatMessage, ChatRequest};
use crate::core::constants::{APP_REFERER, APP_TITLE, DEFAULT_MAX_TOKENS, FALLBACK_SYSTEM_PROMPT};
use crate::core::message::Role;
use crate::utils::url::construct_api_url;

const CONVERSATION_CONTEXT_LEAD_IN: &str =
    "Here is additional context that may be relevant to the conversation:";
const PROMPT_CONTEXT_LEAD_IN: &str = "Here is additional context that may be relevant:";

#[derive(Debug)]
pub enum CompletionError {
    /// The request never produced a response (DNS, TLS, connection reset...).
    Transport(reqwest::Error),
    /// The API answered with a non-2xx status.
    Status { status: StatusCode, body: String },
    /// The response body was not a chat completion.
    Decode(reqwest::Error),
    /// The response parsed but carried no message content.
    EmptyResponse,
}

impl fmt::Display for CompletionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CompletionError::Transport(err) => write!(f, "Request failed: {err}"),
            CompletionError::Status { status, body } => write!(
                f,
                "API request failed with status {status}: {}",
                format_api_error(body)
            ),
            CompletionError::Decode(err) => write!(f, "Unexpected API response: {err}"),
            CompletionError::EmptyResponse => write!(f, "API response contained no message"),
        }
    }
}

impl StdError for CompletionError {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        match self {
            CompletionError::Transport(err) | CompletionError::Decode(err) => Some(err),
            _ => None,
        }
    }
}

fn extract_error_summary(value: &serde_json::Value) -> Option<String> {
    let summary = value
        .pointer("/error/message")
        .and_then(|v| v.as_str())
        .map(str::to_owned)
        .or_else(|| {
            value
                .get("error")
                .and_then(|v| v.as_str().map(str::to_owned))
        })
        .or_else(|| {
            value
                .get("message")
                .and_then(|v| v.as_str().map(str::to_owned))
        });

    summary.map(|text| text.split_whitespace().collect::<Vec<_>>().join(" "))
}

/// Reduce an error body to one readable line: the JSON `error.message` when
/// present, otherwise the trimmed body.
pub fn format_api_error(error_text: &str) -> String {
    let trimmed = error_text.trim();

    if trimmed.is_empty() {
        return "<empty body>".to_string();
    }

    if let Ok(json_value) = serde_json::from_str::<serde_json::Value>(trimmed) {
        if let Some(summary) = extract_error_summary(&json_value).filter(|s| !s.is_empty()) {
            return summary;
        }
        return json_value.to_string();
    }

    trimmed.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Append retrieved knowledge to the leading system message of an outgoing
/// message list. Lists that do not start with a system message, and empty
/// contexts, are left untouched.
pub fn inject_knowledge_context(messages: &mut [ChatMessage], knowledge_context: Option<&str>) {
    let Some(context) = knowledge_context.filter(|c| !c.is_empty()) else {
        return;
    };
    if let Some(first) = messages.first_mut() {
        if first.role == Role::System {
            first.content = format!(
                "{}\n\n{}\n\n{}",
                first.content, CONVERSATION_CONTEXT_LEAD_IN, context
            );
        }
    }
}

/// Build the `[system, user]` pair used for one-off prompts.
pub fn prompt_messages(
    prompt: &str,
    system_prompt: Option<&str>,
    knowledge_context: Option<&str>,
) -> Vec<ChatMessage> {
    let system_prompt = system_prompt.unwrap_or(FALLBACK_SYSTEM_PROMPT);
    let system_content = match knowledge_context.filter(|c| !c.is_empty()) {
        Some(context) => format!("{system_prompt}\n\n{PROMPT_CONTEXT_LEAD_IN}\n\n{context}"),
        None => system_prompt.to_string(),
    };
    vec![
        ChatMessage::new(Role::System, system_content),
        ChatMessage::new(Role::User, prompt),
    ]
}

pub(crate) fn with_app_headers(
    request: reqwest::RequestBuilder,
    api_key: &str,
) -> reqwest::RequestBuilder {
    request
        .header("Content-Type", "application/json")
        .header("Authorization", format!("Bearer {api_key}"))
        .header("HTTP-Referer", APP_REFERER)
        .header("X-Title", APP_TITLE)
}

/// Everything needed for one completion call apart from credentials.
#[derive(Debug, Clone)]
pub struct CompletionRequest {
    pub model: String,
    pub messages: Vec<ChatMessage>,
    pub temperature: f32,
    pub knowledge_context: Option<String>,
}

/// Seam between the workspace store and the network.
#[async_trait]
pub trait CompletionBackend: Send + Sync {
    async fn complete(
        &self,
        api_key: &str,
        request: CompletionRequest,
    ) -> Result<String, CompletionError>;
}

#[derive(Clone, Debug)]
pub struct CompletionClient {
    client: reqwest::Client,
    base_url: String,
    max_tokens: u32,
}

impl CompletionClient {
    pub fn new(client: reqwest::Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into(),
            max_tokens: DEFAULT_MAX_TOKENS,
        }
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    pub async fn call_completion(
        &self,
        model_id: &str,
        mut messages: Vec<ChatMessage>,
        temperature: f32,
        api_key: &str,
        knowledge_context: Option<&str>,
    ) -> Result<String, CompletionError> {
        inject_knowledge_context(&mut messages, knowledge_context);
        self.send(model_id, messages, temperature, api_key).await
    }

    pub async fn call_with_prompt(
        &self,
        model_id: &str,
        prompt: &str,
        system_prompt: Option<&str>,
        temperature: f32,
        api_key: &str,
        knowledge_context: Option<&str>,
    ) -> Result<String, CompletionError> {
        let messages = prompt_messages(prompt, system_prompt, knowledge_context);
        self.send(model_id, messages, temperature, api_key).await
    }

    async fn send(
        &self,
        model_id: &str,
        messages: Vec<ChatMessage>,
        temperature: f32,
        api_key: &str,
    ) -> Result<String, CompletionError> {
        let request = ChatRequest {
            model: model_id.to_string(),
            messages,
            temperature,
            max_tokens: self.max_tokens,
        };
        let chat_url = construct_api_url(&self.base_url, "chat/completions");
        debug!(
            model = %request.model,
            messages = request.messages.len(),
            temperature = request.temperature,
            "Sending chat completion request"
        );

        let response = with_app_headers(self.client.post(chat_url), api_key)
            .json(&request)
            .send()
            .await
            .map_err(CompletionError::Transport)?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "<no body>".to_string());
            return Err(CompletionError::Status { status, body });
        }

        let parsed = response
            .json::<ChatCompletionResponse>()
            .await
            .map_err(CompletionError::Decode)?;
        let content = parsed
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or(CompletionError::EmptyResponse)?;
        debug!(chars = content.len(), "Chat completion received");
        Ok(content)
    }
}

#[async_trait]
impl CompletionBackend for CompletionClient {
    async fn complete(
        &self,
        api_key: &str,
        request: CompletionRequest,
    ) -> Result<String, CompletionError> {
        self.call_completion(
            &request.model,
            request.messages,
            request.temperature,
            api_key,
            request.knowledge_context.as_deref(),
        )
        .await
    }
}
