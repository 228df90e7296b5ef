//! Provider adapter registry
//!
//! One uniform interface over the supported LLM providers: endpoint, auth
//! header shape, request body shape and response-chunk extraction. Adapter
//! lookup is a pure function keyed by the [`Provider`] enum; an unsupported
//! provider id fails as a configuration error before any network call.
//!
//! Extraction tolerance is deliberately per-provider: OpenAI and Anthropic
//! payload variants are handled leniently (an absent field yields an empty
//! fragment), while DeepSeek and Volcengine extraction raises a descriptive
//! parsing error on any structurally invalid payload.

use std::str::FromStr;

use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use serde_json::{json, Value};

use crate::core_types::{Message, Role};
use crate::errors::ReaderError;

pub mod pump;

const ANTHROPIC_VERSION: &str = "2023-06-01";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Provider {
    OpenAi,
    Anthropic,
    DeepSeek,
    Volcengine,
}

impl FromStr for Provider {
    type Err = ReaderError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "openai" => Ok(Provider::OpenAi),
            "anthropic" => Ok(Provider::Anthropic),
            "deepseek" => Ok(Provider::DeepSeek),
            "volcengine" => Ok(Provider::Volcengine),
            other => Err(ReaderError::Config(format!(
                "Unsupported LLM provider: {}",
                other
            ))),
        }
    }
}

impl Provider {
    pub fn id(self) -> &'static str {
        match self {
            Provider::OpenAi => "openai",
            Provider::Anthropic => "anthropic",
            Provider::DeepSeek => "deepseek",
            Provider::Volcengine => "volcengine",
        }
    }

    /// Returns the adapter for this provider. Pure; no side effects.
    pub fn adapter(self) -> ProviderAdapter {
        match self {
            Provider::OpenAi => ProviderAdapter {
                provider: self,
                endpoint: "https://api.openai.com/v1/chat/completions",
                model: "gpt-4o-mini",
                streaming: true,
                strict: false,
            },
            Provider::Anthropic => ProviderAdapter {
                provider: self,
                endpoint: "https://api.anthropic.com/v1/messages",
                model: "claude-2",
                streaming: true,
                strict: false,
            },
            Provider::DeepSeek => ProviderAdapter {
                provider: self,
                endpoint: "https://api.deepseek.com/chat/completions",
                model: "deepseek-chat",
                streaming: false,
                strict: true,
            },
            Provider::Volcengine => ProviderAdapter {
                provider: self,
                endpoint: "https://ark.cn-beijing.volces.com/api/v3/chat/completions",
                model: "deepseek-v3-241226",
                streaming: false,
                strict: true,
            },
        }
    }
}

/// Per-provider configuration bundle consumed by the response pump.
#[derive(Debug, Clone)]
pub struct ProviderAdapter {
    pub provider: Provider,
    pub endpoint: &'static str,
    pub model: &'static str,
    /// Whether the provider delivers incremental SSE fragments.
    pub streaming: bool,
    strict: bool,
}

impl ProviderAdapter {
    /// Provider-specific auth headers for one request.
    pub fn headers(&self, token: &str) -> Result<HeaderMap, ReaderError> {
        let value = |v: &str| {
            HeaderValue::from_str(v)
                .map_err(|_| ReaderError::Config("Token contains invalid header characters".to_string()))
        };

        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        match self.provider {
            Provider::Anthropic => {
                headers.insert("x-api-key", value(token)?);
                headers.insert("anthropic-version", HeaderValue::from_static(ANTHROPIC_VERSION));
            }
            _ => {
                headers.insert(AUTHORIZATION, value(&format!("Bearer {}", token))?);
            }
        }
        Ok(headers)
    }

    /// Provider-specific request body for the given message list. Streaming
    /// providers set the `stream` flag; DeepSeek and Volcengine prepend the
    /// plot-analysis system message when the caller supplied none.
    pub fn request_body(&self, messages: &[Message]) -> Value {
        match self.provider {
            Provider::Anthropic => {
                // The Messages API takes system text as a top-level field.
                let system: Vec<&str> = messages
                    .iter()
                    .filter(|m| m.role == Role::System)
                    .map(|m| m.content.as_str())
                    .collect();
                let turns: Vec<Value> = messages
                    .iter()
                    .filter(|m| m.role != Role::System)
                    .map(|m| json!({ "role": role_name(&m.role), "content": m.content }))
                    .collect();
                let mut body = json!({
                    "model": self.model,
                    "max_tokens": 1000,
                    "messages": turns,
                    "stream": true,
                });
                if !system.is_empty() {
                    body["system"] = json!(system.join("\n\n"));
                }
                body
            }
            Provider::OpenAi => json!({
                "model": self.model,
                "messages": format_messages(messages),
                "stream": true,
            }),
            Provider::DeepSeek | Provider::Volcengine => {
                let mut turns = Vec::with_capacity(messages.len() + 1);
                if !messages.iter().any(|m| m.role == Role::System) {
                    turns.push(json!({
                        "role": "system",
                        "content": "You are an expert in analyzing plot cues from text",
                    }));
                }
                turns.extend(format_messages(messages));
                json!({
                    "model": self.model,
                    "messages": turns,
                    "stream": self.streaming,
                })
            }
        }
    }

    /// Pulls the incremental text fragment out of one decoded chunk.
    ///
    /// Lenient providers return an empty string when the expected field is
    /// absent; strict providers return a parsing error naming the missing
    /// piece of the payload.
    pub fn extract_fragment(&self, chunk: &Value) -> Result<String, ReaderError> {
        if self.strict {
            return extract_strict(chunk);
        }
        Ok(match self.provider {
            Provider::OpenAi => chunk
                .pointer("/choices/0/delta/content")
                .or_else(|| chunk.pointer("/choices/0/message/content"))
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_string(),
            Provider::Anthropic => chunk
                .pointer("/delta/text")
                .or_else(|| chunk.pointer("/content_block/text"))
                .or_else(|| chunk.pointer("/content/0/text"))
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_string(),
            _ => String::new(),
        })
    }
}

fn extract_strict(chunk: &Value) -> Result<String, ReaderError> {
    let choices = chunk
        .get("choices")
        .and_then(Value::as_array)
        .ok_or_else(|| {
            ReaderError::Parsing("Response is missing `choices` or it is not an array".to_string())
        })?;
    let first = choices
        .first()
        .ok_or_else(|| ReaderError::Parsing("Response `choices` array is empty".to_string()))?;
    if let Some(text) = first.pointer("/message/content").and_then(Value::as_str) {
        return Ok(text.to_string());
    }
    if let Some(text) = first.pointer("/delta/content").and_then(Value::as_str) {
        return Ok(text.to_string());
    }
    Err(ReaderError::Parsing(
        "Response is missing `choices[0].message.content`".to_string(),
    ))
}

fn format_messages(messages: &[Message]) -> Vec<Value> {
    messages
        .iter()
        .map(|m| json!({ "role": role_name(&m.role), "content": m.content }))
        .collect()
}

fn role_name(role: &Role) -> &'static str {
    match role {
        Role::System => "system",
        Role::User => "user",
        Role::Assistant => "assistant",
    }
}
