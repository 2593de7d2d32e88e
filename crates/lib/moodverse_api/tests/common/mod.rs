//! Shared helpers for router-level integration tests.
#![allow(dead_code)]

use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::Router;
use axum::body::Body;
use axum::http::{Request, Response};
use moodverse_api::{AppState, config::ApiConfig};
use moodverse_core::upstream::anthropic::{ContentBlock, MessagesResponse};
use moodverse_core::upstream::{CompletionClient, UpstreamResponse};
use moodverse_core::{PortraitError, PortraitResult};

/// Canned provider behaviour.
#[derive(Clone)]
pub enum Reply {
    Text(String),
    Failure { status: Option<u16>, detail: String },
}

/// Completion client that records prompts and answers with a fixed reply.
pub struct StubCompletions {
    reply: Reply,
    pub prompts: Mutex<Vec<String>>,
}

impl StubCompletions {
    pub fn new(reply: Reply) -> Arc<Self> {
        Arc::new(Self {
            reply,
            prompts: Mutex::new(Vec::new()),
        })
    }

    pub fn text(text: &str) -> Arc<Self> {
        Self::new(Reply::Text(text.to_string()))
    }

    pub fn last_prompt(&self) -> Option<String> {
        self.prompts.lock().unwrap().last().cloned()
    }
}

#[async_trait]
impl CompletionClient for StubCompletions {
    async fn complete(&self, prompt: &str) -> PortraitResult<UpstreamResponse> {
        self.prompts.lock().unwrap().push(prompt.to_string());
        match &self.reply {
            Reply::Text(text) => Ok(UpstreamResponse::Messages(MessagesResponse {
                content: vec![ContentBlock::text(text.clone())],
            })),
            Reply::Failure { status, detail } => Err(PortraitError::Upstream {
                status: *status,
                detail: detail.clone(),
            }),
        }
    }
}

pub const READING_TEXT: &str = "```json\n{\"portrait_title\":\"Amber Tide Rising\",\"soul_color_primary\":\"#E8A33D\",\"mood_chips\":[\"warm\",\"open\"]}\n```";

/// Router over a stub provider; static assets come from a directory that does not exist.
pub fn app(stub: Arc<StubCompletions>) -> Router {
    app_with_config(stub, test_config())
}

pub fn app_with_config(stub: Arc<StubCompletions>, config: ApiConfig) -> Router {
    moodverse_api::router(AppState::new(config, stub))
}

pub fn test_config() -> ApiConfig {
    ApiConfig {
        bind_addr: "127.0.0.1:0".into(),
        static_dir: PathBuf::from("/nonexistent/moodverse-static"),
        ..ApiConfig::default()
    }
}

pub fn post_portrait(client: &str, body: &serde_json::Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/api/generate-portrait")
        .header("content-type", "application/json")
        .header("x-forwarded-for", client)
        .body(Body::from(body.to_string()))
        .unwrap()
}

pub fn get(client: &str, uri: &str) -> Request<Body> {
    Request::builder()
        .uri(uri)
        .header("x-forwarded-for", client)
        .body(Body::empty())
        .unwrap()
}

pub async fn body_json(resp: Response<Body>) -> serde_json::Value {
    let body = axum::body::to_bytes(resp.into_body(), usize::MAX)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("parse JSON")
}
