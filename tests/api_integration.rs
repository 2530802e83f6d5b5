//! Integration tests for the workspace and chat HTTP API.
//!
//! Each test spins up the Axum app on a random port over a temporary
//! workspace, with stub LLM providers behind the real agents, and exercises
//! the REST / JSON-lines contract with reqwest.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use futures_util::stream;
use serde_json::Value;
use tempfile::TempDir;
use tokio::net::TcpListener;
use tokio::time::timeout;

use md_assist::agents::{AgentRegistry, GeminiAgent, OpenAiAgent};
use md_assist::api::{self, AppState};
use md_assist::error::LlmError;
use md_assist::llm::{LlmProvider, PromptRequest, TextStream};
use md_assist::workspace::WorkspaceStore;

/// Maximum time any test is allowed to run before we consider it hung.
const TEST_TIMEOUT: Duration = Duration::from_secs(5);

const UI_ORIGIN: &str = "http://localhost:5173";

/// Stub LLM provider replaying canned fragments (no real API calls).
struct StubLlm {
    fragments: Vec<Result<&'static str, &'static str>>,
    calls: Arc<AtomicUsize>,
}

#[async_trait]
impl LlmProvider for StubLlm {
    fn provider_name(&self) -> &str {
        "stub"
    }
    fn model_name(&self) -> &str {
        "stub"
    }
    async fn stream(&self, _request: PromptRequest) -> Result<TextStream, LlmError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let items: Vec<Result<String, LlmError>> = self
            .fragments
            .iter()
            .map(|f| match f {
                Ok(text) => Ok(text.to_string()),
                Err(reason) => Err(LlmError::Stream {
                    provider: "stub".to_string(),
                    reason: reason.to_string(),
                }),
            })
            .collect();
        Ok(Box::pin(stream::iter(items)))
    }
}

struct TestServer {
    base: String,
    dir: TempDir,
    calls: Arc<AtomicUsize>,
}

impl TestServer {
    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base, path)
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

/// Start the app on a random port.
///
/// Registered agents: `stub-ask` and `stub-edit` (OpenAI agent over a stub
/// provider), `stub-empty` (Gemini agent over a provider that says nothing)
/// and `stub-broken` (fails mid-stream).
async fn start_server() -> TestServer {
    let dir = TempDir::new().unwrap();
    std::fs::write(dir.path().join("notes.md"), "# Notes\n\nCats are great.\n").unwrap();
    std::fs::write(dir.path().join("draft.txt"), "not markdown").unwrap();
    std::fs::create_dir(dir.path().join("sub")).unwrap();

    let calls = Arc::new(AtomicUsize::new(0));
    let stub = |fragments: Vec<Result<&'static str, &'static str>>| -> Arc<dyn LlmProvider> {
        Arc::new(StubLlm {
            fragments,
            calls: Arc::clone(&calls),
        })
    };

    let mut agents = AgentRegistry::new();
    agents.register_agent(
        "stub-ask",
        Arc::new(OpenAiAgent::new(stub(vec![
            Ok("The note "),
            Ok("is about cats."),
        ]))),
    );
    agents.register_agent(
        "stub-edit",
        Arc::new(OpenAiAgent::new(stub(vec![
            Ok("```markdown\n# Notes\n\n"),
            Ok("Dogs are great.\n```"),
        ]))),
    );
    agents.register_agent("stub-empty", Arc::new(GeminiAgent::new(stub(vec![]))));
    agents.register_agent(
        "stub-broken",
        Arc::new(OpenAiAgent::new(stub(vec![
            Ok("partial"),
            Err("connection reset"),
        ]))),
    );

    let workspace = WorkspaceStore::open(dir.path()).await.unwrap();
    let app = api::app(AppState::new(workspace, agents), UI_ORIGIN).unwrap();

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();

    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    // Give the server a moment to start accepting connections.
    tokio::time::sleep(Duration::from_millis(50)).await;

    TestServer {
        base: format!("http://127.0.0.1:{port}"),
        dir,
        calls,
    }
}

/// Split a JSON-lines body into parsed objects.
fn parse_jsonl(body: &str) -> Vec<Value> {
    assert!(body.ends_with('\n'), "body must end with a newline");
    body.lines()
        .map(|line| serde_json::from_str(line).expect("each line must be valid JSON"))
        .collect()
}

// ── Health / CORS ───────────────────────────────────────────────────

#[tokio::test]
async fn health_returns_ok() {
    timeout(TEST_TIMEOUT, async {
        let server = start_server().await;
        let resp = reqwest::get(server.url("/api/health")).await.unwrap();
        assert_eq!(resp.status(), 200);
        let json: Value = resp.json().await.unwrap();
        assert_eq!(json, serde_json::json!({"ok": true}));
    })
    .await
    .expect("test timed out");
}

#[tokio::test]
async fn cors_allows_ui_origin() {
    timeout(TEST_TIMEOUT, async {
        let server = start_server().await;
        let resp = reqwest::Client::new()
            .get(server.url("/api/health"))
            .header("Origin", UI_ORIGIN)
            .send()
            .await
            .unwrap();
        assert_eq!(
            resp.headers()
                .get("access-control-allow-origin")
                .and_then(|v| v.to_str().ok()),
            Some(UI_ORIGIN)
        );
        assert_eq!(
            resp.headers()
                .get("access-control-allow-credentials")
                .and_then(|v| v.to_str().ok()),
            Some("true")
        );
    })
    .await
    .expect("test timed out");
}

// ── Files ───────────────────────────────────────────────────────────

#[tokio::test]
async fn list_root_shows_dirs_then_markdown() {
    timeout(TEST_TIMEOUT, async {
        let server = start_server().await;
        let resp = reqwest::get(server.url("/api/files?path=")).await.unwrap();
        assert_eq!(resp.status(), 200);

        let entries: Vec<Value> = resp.json().await.unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0]["name"], "sub");
        assert_eq!(entries[0]["is_dir"], true);
        assert_eq!(entries[1]["name"], "notes.md");
        assert_eq!(entries[1]["is_dir"], false);
        assert_eq!(entries[1]["path"], "notes.md");
        assert!(entries[1]["modified_at"].is_string());
        assert!(entries[1]["size"].as_u64().unwrap() > 0);
    })
    .await
    .expect("test timed out");
}

#[tokio::test]
async fn list_errors() {
    timeout(TEST_TIMEOUT, async {
        let server = start_server().await;

        let resp = reqwest::get(server.url("/api/files?path=ghost")).await.unwrap();
        assert_eq!(resp.status(), 404);

        let resp = reqwest::get(server.url("/api/files?path=../")).await.unwrap();
        assert_eq!(resp.status(), 400);
        let json: Value = resp.json().await.unwrap();
        assert_eq!(json["detail"], "Invalid path");

        let resp = reqwest::get(server.url("/api/files?path=notes.md")).await.unwrap();
        assert_eq!(resp.status(), 400);
    })
    .await
    .expect("test timed out");
}

#[tokio::test]
async fn read_file_and_missing_file() {
    timeout(TEST_TIMEOUT, async {
        let server = start_server().await;

        let resp = reqwest::get(server.url("/api/file?path=notes.md")).await.unwrap();
        assert_eq!(resp.status(), 200);
        let json: Value = resp.json().await.unwrap();
        assert_eq!(json["path"], "notes.md");
        assert_eq!(json["content"], "# Notes\n\nCats are great.\n");

        let resp = reqwest::get(server.url("/api/file?path=draft.txt")).await.unwrap();
        assert_eq!(resp.status(), 404);
        let json: Value = resp.json().await.unwrap();
        assert_eq!(json["detail"], "File not found");
    })
    .await
    .expect("test timed out");
}

#[tokio::test]
async fn write_then_read_roundtrip() {
    timeout(TEST_TIMEOUT, async {
        let server = start_server().await;
        let client = reqwest::Client::new();

        let resp = client
            .put(server.url("/api/file?path=sub/new.md"))
            .json(&serde_json::json!({"content": "# Fresh\n"}))
            .send()
            .await
            .unwrap();
        assert_eq!(resp.status(), 200);
        let json: Value = resp.json().await.unwrap();
        assert_eq!(json, serde_json::json!({"ok": true}));

        let resp = reqwest::get(server.url("/api/file?path=sub/new.md")).await.unwrap();
        let json: Value = resp.json().await.unwrap();
        assert_eq!(json["content"], "# Fresh\n");
        assert_eq!(
            std::fs::read_to_string(server.dir.path().join("sub/new.md")).unwrap(),
            "# Fresh\n"
        );
    })
    .await
    .expect("test timed out");
}

#[tokio::test]
async fn write_without_body_creates_empty_file() {
    timeout(TEST_TIMEOUT, async {
        let server = start_server().await;
        let resp = reqwest::Client::new()
            .put(server.url("/api/file?path=empty.md"))
            .send()
            .await
            .unwrap();
        assert_eq!(resp.status(), 200);
        assert_eq!(
            std::fs::read_to_string(server.dir.path().join("empty.md")).unwrap(),
            ""
        );
    })
    .await
    .expect("test timed out");
}

#[tokio::test]
async fn write_rejections() {
    timeout(TEST_TIMEOUT, async {
        let server = start_server().await;
        let client = reqwest::Client::new();
        let body = serde_json::json!({"content": "x"});

        for path in ["notes.txt", "missing/new.md", "../escape.md"] {
            let resp = client
                .put(server.url(&format!("/api/file?path={path}")))
                .json(&body)
                .send()
                .await
                .unwrap();
            assert_eq!(resp.status(), 400, "path {path}");
        }
        assert!(!server.dir.path().join("notes.txt").exists());
    })
    .await
    .expect("test timed out");
}

// ── Chat (streaming) ────────────────────────────────────────────────

async fn post_chat(server: &TestServer, body: Value) -> reqwest::Response {
    reqwest::Client::new()
        .post(server.url("/api/ai/chat"))
        .json(&body)
        .send()
        .await
        .unwrap()
}

#[tokio::test]
async fn chat_ask_streams_deltas_then_final() {
    timeout(TEST_TIMEOUT, async {
        let server = start_server().await;
        let resp = post_chat(
            &server,
            serde_json::json!({
                "path": "notes.md",
                "mode": "ask",
                "message": "summarize",
                "agent_id": "stub-ask"
            }),
        )
        .await;

        assert_eq!(resp.status(), 200);
        assert_eq!(
            resp.headers()
                .get("content-type")
                .and_then(|v| v.to_str().ok()),
            Some("application/jsonl")
        );

        let lines = parse_jsonl(&resp.text().await.unwrap());
        assert_eq!(
            lines,
            vec![
                serde_json::json!({"type": "delta", "text": "The note "}),
                serde_json::json!({"type": "delta", "text": "is about cats."}),
                serde_json::json!({"type": "final", "answer": "The note is about cats."}),
            ]
        );
        assert_eq!(server.calls(), 1);
    })
    .await
    .expect("test timed out");
}

#[tokio::test]
async fn chat_edit_final_carries_extracted_document() {
    timeout(TEST_TIMEOUT, async {
        let server = start_server().await;
        let resp = post_chat(
            &server,
            serde_json::json!({
                "path": "notes.md",
                "mode": "edit",
                "message": "replace cats with dogs",
                "agent_id": "stub-edit",
                "selection": "Cats are great."
            }),
        )
        .await;

        assert_eq!(resp.status(), 200);
        let lines = parse_jsonl(&resp.text().await.unwrap());
        let finals: Vec<&Value> = lines.iter().filter(|l| l["type"] == "final").collect();
        assert_eq!(finals.len(), 1);
        assert_eq!(lines.last().unwrap()["type"], "final");
        assert_eq!(
            lines.last().unwrap()["proposedContent"],
            "# Notes\n\nDogs are great."
        );
        // Editing only proposes; the file itself is untouched.
        assert_eq!(
            std::fs::read_to_string(server.dir.path().join("notes.md")).unwrap(),
            "# Notes\n\nCats are great.\n"
        );
    })
    .await
    .expect("test timed out");
}

#[tokio::test]
async fn chat_unknown_agent_lists_valid_ids() {
    timeout(TEST_TIMEOUT, async {
        let server = start_server().await;
        let resp = post_chat(
            &server,
            serde_json::json!({
                "path": "notes.md",
                "mode": "ask",
                "message": "summarize",
                "agent_id": "missing"
            }),
        )
        .await;

        assert_eq!(resp.status(), 400);
        let json: Value = resp.json().await.unwrap();
        let detail = json["detail"].as_str().unwrap();
        for id in ["stub-ask", "stub-edit", "stub-empty", "stub-broken"] {
            assert!(detail.contains(id), "detail should list {id}: {detail}");
        }
        assert_eq!(server.calls(), 0);
    })
    .await
    .expect("test timed out");
}

#[tokio::test]
async fn chat_missing_file_is_404_before_any_provider_call() {
    timeout(TEST_TIMEOUT, async {
        let server = start_server().await;
        let resp = post_chat(
            &server,
            serde_json::json!({
                "path": "nope.md",
                "mode": "ask",
                "message": "summarize",
                "agent_id": "stub-ask"
            }),
        )
        .await;
        assert_eq!(resp.status(), 404);
        assert_eq!(server.calls(), 0);
    })
    .await
    .expect("test timed out");
}

#[tokio::test]
async fn chat_invalid_mode_is_400() {
    timeout(TEST_TIMEOUT, async {
        let server = start_server().await;
        let resp = post_chat(
            &server,
            serde_json::json!({
                "path": "notes.md",
                "mode": "shout",
                "message": "summarize",
                "agent_id": "stub-ask"
            }),
        )
        .await;
        assert_eq!(resp.status(), 400);
        let json: Value = resp.json().await.unwrap();
        assert_eq!(json["detail"], "Invalid mode");
        assert_eq!(server.calls(), 0);
    })
    .await
    .expect("test timed out");
}

#[tokio::test]
async fn chat_empty_provider_response_is_500_without_final() {
    timeout(TEST_TIMEOUT, async {
        let server = start_server().await;
        let resp = post_chat(
            &server,
            serde_json::json!({
                "path": "notes.md",
                "mode": "ask",
                "message": "summarize",
                "agent_id": "stub-empty"
            }),
        )
        .await;

        assert_eq!(resp.status(), 500);
        let body = resp.text().await.unwrap();
        assert!(!body.contains("\"final\""));
        let json: Value = serde_json::from_str(&body).unwrap();
        assert!(json["detail"].as_str().unwrap().contains("empty"));
    })
    .await
    .expect("test timed out");
}

#[tokio::test]
async fn chat_mid_stream_failure_aborts_body() {
    timeout(TEST_TIMEOUT, async {
        let server = start_server().await;
        let result = reqwest::Client::new()
            .post(server.url("/api/ai/chat"))
            .json(&serde_json::json!({
                "path": "notes.md",
                "mode": "ask",
                "message": "summarize",
                "agent_id": "stub-broken"
            }))
            .send()
            .await;

        // The delta and the failure arrive together, so the connection may be
        // torn down before the response head reaches the client. Either way
        // no final chunk is ever delivered.
        match result {
            Err(_) => {}
            Ok(resp) => {
                assert_eq!(resp.status(), 200);
                if let Ok(body) = resp.text().await {
                    assert!(!body.contains("\"final\""));
                }
            }
        }
        assert_eq!(server.calls(), 1);
    })
    .await
    .expect("test timed out");
}

// ── Chat (synchronous) ──────────────────────────────────────────────

#[tokio::test]
async fn chat_sync_returns_single_document() {
    timeout(TEST_TIMEOUT, async {
        let server = start_server().await;
        let client = reqwest::Client::new();

        let resp = client
            .post(server.url("/api/ai/chat/sync"))
            .json(&serde_json::json!({
                "path": "notes.md",
                "mode": "ask",
                "message": "summarize",
                "agent_id": "stub-ask"
            }))
            .send()
            .await
            .unwrap();
        assert_eq!(resp.status(), 200);
        let json: Value = resp.json().await.unwrap();
        assert_eq!(json, serde_json::json!({"answer": "The note is about cats."}));

        let resp = client
            .post(server.url("/api/ai/chat/sync"))
            .json(&serde_json::json!({
                "path": "notes.md",
                "mode": "edit",
                "message": "dogs",
                "agent_id": "stub-edit"
            }))
            .send()
            .await
            .unwrap();
        let json: Value = resp.json().await.unwrap();
        assert_eq!(
            json,
            serde_json::json!({"proposedContent": "# Notes\n\nDogs are great."})
        );
    })
    .await
    .expect("test timed out");
}
