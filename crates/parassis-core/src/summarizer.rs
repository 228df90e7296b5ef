//! Request orchestration for thread summaries and page-scoped chat
//!
//! `generate_thread_summary` runs the linear request lifecycle: fetch the
//! target page, assemble the context window and breadcrumb, resolve the
//! provider and language, pre-summarize over-budget pages, build the prompt
//! and drive the response pump. `chat_with_ai` is the shorter parallel
//! machine over a caller-supplied message list. Neither lets an error escape:
//! every failure converges on one `sink.error` call plus an empty return, so
//! the caller is always left in a defined state.

use log::debug;
use reqwest::Client;

use crate::context::{self, MAX_CONTEXT_CHARS};
use crate::core_types::{Message, SummarySink, ThreadContext};
use crate::errors::ReaderError;
use crate::llm::{pump, Provider, ProviderAdapter};
use crate::prompt::{self, DEFAULT_LANGUAGE};
use crate::store::{keys, PageStore, SettingsStore};

/// Generates the thread summary for `target_id`, streaming fragments into
/// the sink. Returns the aggregated text, or an empty string after routing
/// any failure to `sink.error`.
pub async fn generate_thread_summary(
    pages: &dyn PageStore,
    settings: &dyn SettingsStore,
    target_id: u64,
    sink: &dyn SummarySink,
) -> String {
    match run_summary(pages, settings, target_id, sink).await {
        Ok(text) => text,
        Err(e) => {
            sink.error(&format!("Error generating summary: {}", e));
            String::new()
        }
    }
}

async fn run_summary(
    pages: &dyn PageStore,
    settings: &dyn SettingsStore,
    target_id: u64,
    sink: &dyn SummarySink,
) -> Result<String, ReaderError> {
    sink.status("Fetching current content...");
    let target = context::target_page(pages, target_id).await?;

    sink.status("Fetching previous contents...");
    let prior = context::prior_context(pages, target_id).await?;
    let breadcrumb = context::breadcrumb(pages, target_id).await?;

    sink.status("Getting LLM token...");
    let dispatch = Dispatch::resolve(settings).await?;

    let language = settings
        .value(keys::LANGUAGE)
        .await?
        .unwrap_or_else(|| DEFAULT_LANGUAGE.to_string());
    let math = settings
        .value(keys::MATH_RENDERING)
        .await?
        .map(|v| v == "true")
        .unwrap_or(false);
    debug!("User language: {}", language);

    let client = Client::new();

    let current = if target.content.chars().count() > MAX_CONTEXT_CHARS {
        sink.status("Summarizing long content...");
        let condensed = prompt::condense_prompt(&target.content);
        dispatch
            .call(&client, &[Message::user(condensed)], sink)
            .await?
    } else {
        target.content.clone()
    };

    sink.status("Generating thread summary...");
    let ctx = ThreadContext {
        target,
        context: prior,
        breadcrumb,
    };
    let instruction = prompt::thread_prompt(&ctx, &current, &language, math);
    debug!("Prompt length: {} chars", instruction.chars().count());

    let summary = dispatch
        .call(&client, &[Message::user(instruction)], sink)
        .await?;
    sink.status("Thread summary generation complete");
    Ok(summary)
}

/// Runs one interactive chat turn grounded in the page at `target_id`.
/// `history` is the accumulated conversation; the grounding system message
/// is prepended here. Same failure semantics as summary generation.
pub async fn chat_with_ai(
    pages: &dyn PageStore,
    settings: &dyn SettingsStore,
    target_id: u64,
    history: &[Message],
    sink: &dyn SummarySink,
) -> String {
    match run_chat(pages, settings, target_id, history, sink).await {
        Ok(text) => text,
        Err(e) => {
            sink.error(&format!("Error in chat: {}", e));
            String::new()
        }
    }
}

async fn run_chat(
    pages: &dyn PageStore,
    settings: &dyn SettingsStore,
    target_id: u64,
    history: &[Message],
    sink: &dyn SummarySink,
) -> Result<String, ReaderError> {
    sink.status("Fetching current content...");
    let target = context::target_page(pages, target_id).await?;

    sink.status("Getting LLM token...");
    let dispatch = Dispatch::resolve(settings).await?;

    sink.status("Waiting for the assistant...");
    let messages = prompt::chat_messages(&target.content, history);
    let client = Client::new();
    let reply = dispatch.call(&client, &messages, sink).await?;
    sink.status("Chat response complete");
    Ok(reply)
}

/// Resolved provider configuration for one request: adapter, endpoint and
/// token. Resolution happens before any network call so configuration
/// errors surface immediately.
struct Dispatch {
    adapter: ProviderAdapter,
    endpoint: String,
    token: String,
}

impl Dispatch {
    async fn resolve(settings: &dyn SettingsStore) -> Result<Self, ReaderError> {
        let provider_id = settings
            .value(keys::LLM_PROVIDER)
            .await?
            .ok_or_else(|| ReaderError::Config("No LLM provider configured".to_string()))?;
        let provider: Provider = provider_id.parse()?;
        let token = settings
            .value(keys::LLM_TOKEN)
            .await?
            .filter(|t| !t.is_empty())
            .ok_or_else(|| ReaderError::Config("No LLM token found".to_string()))?;

        let adapter = provider.adapter();
        let endpoint = settings
            .value(keys::LLM_ENDPOINT)
            .await?
            .filter(|e| !e.is_empty())
            .unwrap_or_else(|| adapter.endpoint.to_string());

        Ok(Self {
            adapter,
            endpoint,
            token,
        })
    }

    async fn call(
        &self,
        client: &Client,
        messages: &[Message],
        sink: &dyn SummarySink,
    ) -> Result<String, ReaderError> {
        let body = self.adapter.request_body(messages);
        pump::run(client, &self.adapter, &self.endpoint, &self.token, body, sink).await
    }
}
