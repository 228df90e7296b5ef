//! Streaming response pump
//!
//! Executes one HTTP call against a provider endpoint and assembles the full
//! response text, forwarding each fragment to the sink as it arrives. Two
//! delivery modes exist, selected by the adapter's capability flag: SSE
//! streaming (per-line extraction with lenient recovery from malformed
//! lines) and single-document JSON (one strict extraction).
//!
//! The accumulator invariant: the returned string equals the concatenation,
//! in emission order, of every fragment forwarded through the sink during
//! this call.

use futures_util::StreamExt;
use log::{debug, warn};
use reqwest::Client;
use serde_json::Value;

use crate::core_types::SummarySink;
use crate::errors::ReaderError;
use crate::llm::ProviderAdapter;

/// SSE payload prefix.
const DATA_PREFIX: &str = "data: ";
/// Terminal sentinel payload ending an SSE stream.
const DONE_SENTINEL: &str = "[DONE]";

/// Performs one POST to `endpoint` and returns the assembled response text.
pub async fn run(
    client: &Client,
    adapter: &ProviderAdapter,
    endpoint: &str,
    token: &str,
    body: Value,
    sink: &dyn SummarySink,
) -> Result<String, ReaderError> {
    debug!(
        "Calling LLM API - provider: {}, endpoint: {}",
        adapter.provider.id(),
        endpoint
    );

    let response = client
        .post(endpoint)
        .headers(adapter.headers(token)?)
        .json(&body)
        .send()
        .await
        .map_err(|e| ReaderError::Llm(format!("HTTP request failed: {}", e)))?;

    let status = response.status();
    if !status.is_success() {
        let error_body = response.text().await.unwrap_or_default();
        return Err(ReaderError::Llm(format!(
            "LLM API call failed: {} {}\n{}",
            status.as_u16(),
            status.canonical_reason().unwrap_or("Unknown"),
            error_body
        )));
    }

    if adapter.streaming {
        consume_stream(response, adapter, sink).await
    } else {
        consume_single(response, adapter, sink).await
    }
}

/// Streaming mode: demultiplexes the SSE body into ordered text fragments.
/// Lines are reassembled across chunk boundaries; a line that fails to parse
/// as JSON is logged and skipped without aborting the stream.
async fn consume_stream(
    response: reqwest::Response,
    adapter: &ProviderAdapter,
    sink: &dyn SummarySink,
) -> Result<String, ReaderError> {
    let mut stream = response.bytes_stream();
    let mut buffer = String::new();
    let mut full_text = String::new();
    let mut chunk_count = 0usize;

    while let Some(chunk) = stream.next().await {
        let chunk =
            chunk.map_err(|e| ReaderError::Llm(format!("Error reading response stream: {}", e)))?;
        buffer.push_str(&String::from_utf8_lossy(&chunk));
        chunk_count += 1;
        sink.status(&format!("Processing response chunk {}...", chunk_count));

        while let Some(newline) = buffer.find('\n') {
            let line: String = buffer.drain(..=newline).collect();
            handle_line(line.trim_end(), adapter, sink, &mut full_text)?;
        }
    }
    if !buffer.is_empty() {
        handle_line(buffer.trim_end(), adapter, sink, &mut full_text)?;
    }

    debug!("Complete response length: {} chars", full_text.len());
    Ok(full_text)
}

fn handle_line(
    line: &str,
    adapter: &ProviderAdapter,
    sink: &dyn SummarySink,
    full_text: &mut String,
) -> Result<(), ReaderError> {
    let Some(payload) = line.strip_prefix(DATA_PREFIX) else {
        return Ok(());
    };
    if payload == DONE_SENTINEL {
        return Ok(());
    }
    match serde_json::from_str::<Value>(payload) {
        Ok(parsed) => {
            let fragment = adapter.extract_fragment(&parsed)?;
            if !fragment.is_empty() {
                full_text.push_str(&fragment);
                sink.fragment(&fragment);
            }
        }
        Err(e) => warn!("Failed to parse stream line as JSON: {}", e),
    }
    Ok(())
}

/// Non-streaming mode: the whole body is one JSON document and the adapter's
/// strict extractor decides whether it is structurally valid.
async fn consume_single(
    response: reqwest::Response,
    adapter: &ProviderAdapter,
    sink: &dyn SummarySink,
) -> Result<String, ReaderError> {
    let text = response
        .text()
        .await
        .map_err(|e| ReaderError::Llm(format!("Failed to read response: {}", e)))?;
    let parsed: Value = serde_json::from_str(&text)
        .map_err(|e| ReaderError::Parsing(format!("Invalid JSON response: {}", e)))?;
    let content = adapter.extract_fragment(&parsed)?;
    sink.fragment(&content);
    Ok(content)
}
