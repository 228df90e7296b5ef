// src/test_utils/mock_llm_server.rs
use std::collections::VecDeque;
use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::body::{Body, Bytes};
use axum::extract::State;
use axum::http::{header, Response, StatusCode};
use axum::Router;
use futures_util::StreamExt;
use serde_json::Value;
use tokio::net::TcpListener;

/// One canned reply the mock server pops per incoming request.
#[derive(Debug, Clone)]
pub enum CannedResponse {
    /// An SSE body delivered in one piece.
    Sse(String),
    /// An SSE body delivered as separate network chunks, for exercising
    /// line reassembly across chunk boundaries.
    SseChunks(Vec<String>),
    /// A single JSON document.
    Json(Value),
    /// A non-2xx status with a plain-text body.
    Error(u16, String),
}

#[derive(Clone)]
struct MockServerState {
    responses: Arc<Mutex<VecDeque<CannedResponse>>>,
    requests: Arc<Mutex<Vec<String>>>,
}

async fn handler(State(state): State<MockServerState>, body: String) -> Response<Body> {
    log::debug!("Mock LLM server received request: {}", body);
    state.requests.lock().unwrap().push(body);

    let canned = state.responses.lock().unwrap().pop_front();
    match canned {
        Some(CannedResponse::Sse(body)) => Response::builder()
            .status(StatusCode::OK)
            .header(header::CONTENT_TYPE, "text/event-stream")
            .body(Body::from(body))
            .unwrap(),
        Some(CannedResponse::SseChunks(chunks)) => {
            let stream = futures_util::stream::iter(chunks).then(|chunk| async move {
                tokio::time::sleep(Duration::from_millis(10)).await;
                Ok::<Bytes, Infallible>(Bytes::from(chunk))
            });
            Response::builder()
                .status(StatusCode::OK)
                .header(header::CONTENT_TYPE, "text/event-stream")
                .body(Body::from_stream(stream))
                .unwrap()
        }
        Some(CannedResponse::Json(value)) => Response::builder()
            .status(StatusCode::OK)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(value.to_string()))
            .unwrap(),
        Some(CannedResponse::Error(status, body)) => Response::builder()
            .status(StatusCode::from_u16(status).unwrap())
            .body(Body::from(body))
            .unwrap(),
        None => {
            log::error!("Mock LLM server ran out of responses!");
            Response::builder()
                .status(StatusCode::SERVICE_UNAVAILABLE)
                .body(Body::from("no canned responses left"))
                .unwrap()
        }
    }
}

pub struct MockLlmServer {
    addr: SocketAddr,
    shutdown_tx: tokio::sync::oneshot::Sender<()>,
    recorded_requests: Arc<Mutex<Vec<String>>>,
}

impl MockLlmServer {
    pub async fn start(responses: Vec<CannedResponse>) -> Self {
        let state = MockServerState {
            responses: Arc::new(Mutex::new(VecDeque::from(responses))),
            requests: Arc::new(Mutex::new(Vec::new())),
        };
        let recorded_requests = state.requests.clone();

        // Any path works: adapters only vary the endpoint they are handed.
        let app = Router::new().fallback(handler).with_state(state);

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap_or_else(|e| {
            panic!("Failed to bind mock server to 127.0.0.1:0. Error: {}", e);
        });
        let addr = listener.local_addr().unwrap();
        log::info!("Mock LLM server listening on {}", addr);

        let (shutdown_tx, shutdown_rx) = tokio::sync::oneshot::channel::<()>();

        tokio::spawn(async move {
            axum::serve(listener, app)
                .with_graceful_shutdown(async {
                    shutdown_rx.await.ok();
                })
                .await
                .unwrap_or_else(|e| {
                    log::error!("Mock LLM server error: {}", e);
                });
        });

        MockLlmServer {
            addr,
            shutdown_tx,
            recorded_requests,
        }
    }

    pub fn address(&self) -> String {
        format!("http://{}", self.addr)
    }

    pub fn request_count(&self) -> usize {
        self.recorded_requests.lock().unwrap().len()
    }

    /// Raw request bodies in arrival order.
    pub fn requests(&self) -> Vec<String> {
        self.recorded_requests.lock().unwrap().clone()
    }

    pub async fn shutdown(self) {
        if self.shutdown_tx.send(()).is_err() {
            log::warn!("Mock LLM server shutdown signal already sent or receiver dropped.");
        }
    }
}
