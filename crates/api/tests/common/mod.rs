#![allow(dead_code)]

use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{header, Method, Request, Response};
use axum::Router;
use http_body_util::BodyExt;
use serde_json::{json, Value};
use storyreel_api::auth::jwt::{generate_access_token, JwtConfig};
use storyreel_api::config::ServerConfig;
use storyreel_api::router::build_app_router;
use storyreel_api::state::AppState;
use storyreel_genai::{GenerationBackend, GenerationError, ImagePrompt};
use storyreel_store::MemoryRemote;
use tower::ServiceExt;

/// Build a test `ServerConfig` with safe defaults.
pub fn test_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:9002".to_string()],
        request_timeout_secs: 30,
        generation_timeout_secs: 30,
        max_body_bytes: 16 * 1024 * 1024,
        jwt: JwtConfig {
            secret: "test-secret-that-is-long-enough-for-hmac".to_string(),
            access_token_expiry_mins: 15,
        },
    }
}

/// Signed access token for `owner_id` under [`test_config`].
pub fn token_for(owner_id: &str) -> String {
    generate_access_token(owner_id, &test_config().jwt).unwrap()
}

// ---------------------------------------------------------------------------
// Fake generation backend
// ---------------------------------------------------------------------------

/// Canned structured output plus numbered image URLs.
///
/// A hanging generator never answers a structured call.
pub struct FakeGenerator {
    pub structured: Option<Value>,
    pub failing_subjects: HashSet<String>,
    pub hang: AtomicBool,
    pub structured_calls: AtomicUsize,
    pub image_prompts: Mutex<Vec<ImagePrompt>>,
}

impl FakeGenerator {
    pub fn returning(structured: Option<Value>) -> Self {
        Self {
            structured,
            failing_subjects: HashSet::new(),
            hang: AtomicBool::new(false),
            structured_calls: AtomicUsize::new(0),
            image_prompts: Mutex::new(Vec::new()),
        }
    }

    pub fn failing(mut self, subject: &str) -> Self {
        self.failing_subjects.insert(subject.to_string());
        self
    }

    pub fn hanging(self) -> Self {
        self.hang.store(true, Ordering::SeqCst);
        self
    }

    pub fn structured_calls(&self) -> usize {
        self.structured_calls.load(Ordering::SeqCst)
    }
}

impl Default for FakeGenerator {
    fn default() -> Self {
        Self::returning(Some(json!({
            "themes": ["hope"],
            "characters": ["Mira"],
            "structure": "Three acts.",
            "summary": "Mira finds her way home."
        })))
    }
}

#[async_trait]
impl GenerationBackend for FakeGenerator {
    async fn generate_structured(&self, _prompt: &str) -> Result<Option<Value>, GenerationError> {
        self.structured_calls.fetch_add(1, Ordering::SeqCst);
        if self.hang.load(Ordering::SeqCst) {
            std::future::pending::<()>().await;
        }
        Ok(self.structured.clone())
    }

    async fn generate_image(&self, prompt: &ImagePrompt) -> Result<Option<String>, GenerationError> {
        let n = {
            let mut prompts = self.image_prompts.lock().unwrap();
            prompts.push(prompt.clone());
            prompts.len()
        };
        if self.failing_subjects.contains(&prompt.subject) {
            return Err(GenerationError::Api {
                status: 500,
                body: "render failed".into(),
            });
        }
        Ok(Some(format!("https://img.test/{n}.png")))
    }
}

// ---------------------------------------------------------------------------
// App construction
// ---------------------------------------------------------------------------

pub struct TestApp {
    pub router: Router,
    pub remote: Arc<MemoryRemote>,
    pub generator: Arc<FakeGenerator>,
}

/// Full application router over an in-memory remote, sharing the production
/// middleware stack.
pub fn build_test_app() -> TestApp {
    build_test_app_with(FakeGenerator::default())
}

pub fn build_test_app_with(generator: FakeGenerator) -> TestApp {
    build_test_app_with_config(generator, test_config())
}

pub fn build_test_app_with_config(generator: FakeGenerator, config: ServerConfig) -> TestApp {
    let remote = Arc::new(MemoryRemote::new());
    let generator = Arc::new(generator);

    let state = AppState {
        persistence: remote.clone(),
        generator: generator.clone(),
        config: Arc::new(config.clone()),
    };

    TestApp {
        router: build_app_router(state, &config),
        remote,
        generator,
    }
}

/// Serve `app` on an ephemeral local port and return its base URL.
pub async fn spawn_server(app: &TestApp) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let router = app.router.clone();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    format!("http://{addr}")
}

// ---------------------------------------------------------------------------
// Request helpers
// ---------------------------------------------------------------------------

pub async fn body_json(response: Response<Body>) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

pub async fn send(
    app: &Router,
    method: Method,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> Response<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    let request = match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };
    app.clone().oneshot(request).await.unwrap()
}

pub async fn get(app: &Router, uri: &str, token: Option<&str>) -> Response<Body> {
    send(app, Method::GET, uri, token, None).await
}

pub async fn post_json(app: &Router, uri: &str, token: Option<&str>, body: Value) -> Response<Body> {
    send(app, Method::POST, uri, token, Some(body)).await
}

pub async fn patch_json(app: &Router, uri: &str, token: Option<&str>, body: Value) -> Response<Body> {
    send(app, Method::PATCH, uri, token, Some(body)).await
}

pub async fn delete(app: &Router, uri: &str, token: Option<&str>) -> Response<Body> {
    send(app, Method::DELETE, uri, token, None).await
}

/// Create a project through the API and return its JSON.
pub async fn create_project(app: &Router, token: &str, title: &str) -> Value {
    let response = post_json(
        app,
        "/api/v1/projects",
        Some(token),
        json!({ "title": title, "story_text": "Once upon a time." }),
    )
    .await;
    assert_eq!(response.status(), 201);
    body_json(response).await["data"].clone()
}
