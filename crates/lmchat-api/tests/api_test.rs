use std::sync::{Arc, Mutex};
use std::time::Duration;

use anyhow::Result;
use async_trait::async_trait;
use axum::http::StatusCode;
use chrono::{DateTime, Utc};
use axum_test::TestServer;
use serde_json::{json, Value};

use lmchat_api::{build_router, config::Config, state::AppState};
use lmchat_llm::{ChatClient, ChatRequest, ChatResponse};
use lmchat_media::{
    AudioTranscription, MediaError, MediaRequest, OcrResponse, TextExtractor, Transcriber,
};
use lmchat_persist::{
    DBMessage, InMemoryPersistenceClient, MessageStore, NewMessage, NewThread, PersistError,
    PersistenceClient, Thread, ThreadPatch, ThreadStore,
};
use lmchat_types::MessagePage;

const TEST_CONFIG: &str = r#"
    [server]
    host = "127.0.0.1"
    port = 0

    [cors]
    enabled = true
    origins = ["*"]

    [storage]
    backend = "memory"
    database = "lmchat_test"

    [llm]
    base_url = "http://127.0.0.1:1234"
    model = "test-model"
    temperature = 0.3

    [media]
    ocr_base_url = "http://127.0.0.1:8001"
    audio_base_url = "http://127.0.0.1:8002"

    [logging]
    level = "debug"
    format = "pretty"
"#;

/// Model stub that echoes the last user message, or fails
struct StubLlm {
    fail: bool,
    requests: Mutex<Vec<ChatRequest>>,
}

#[async_trait]
impl ChatClient for StubLlm {
    async fn chat(&self, request: ChatRequest) -> Result<ChatResponse> {
        let last = request
            .messages
            .last()
            .map(|m| m.content().to_string())
            .unwrap_or_default();
        self.requests.lock().unwrap().push(request);

        if self.fail {
            anyhow::bail!("Model server error (503 Service Unavailable): loading model");
        }
        Ok(ChatResponse {
            content: format!("echo: {}", last),
            usage: None,
            finish_reason: Some("stop".to_string()),
            raw: json!({ "id": "chatcmpl-test" }),
        })
    }

    async fn health(&self) -> bool {
        !self.fail
    }
}

struct StubMedia {
    fail: bool,
}

#[async_trait]
impl TextExtractor for StubMedia {
    async fn extract_text(&self, request: &MediaRequest) -> lmchat_media::Result<OcrResponse> {
        if self.fail {
            return Err(MediaError::Upstream {
                service: "OCR",
                status: 500,
                body: "OCR processing failed".to_string(),
            });
        }
        Ok(OcrResponse {
            text: "Invoice total: 42".to_string(),
            bucket: request.bucket.clone(),
            key: request.key.clone(),
        })
    }
}

#[async_trait]
impl Transcriber for StubMedia {
    async fn transcribe(&self, _request: &MediaRequest) -> lmchat_media::Result<AudioTranscription> {
        Ok(AudioTranscription {
            text: Some("remind me to call Sam".to_string()),
            duration_seconds: Some(2.0),
            ..AudioTranscription::default()
        })
    }
}

/// In-memory store whose memory writes are refused
#[derive(Default)]
struct MemoryRefusingStore {
    inner: InMemoryPersistenceClient,
}

#[async_trait]
impl MessageStore for MemoryRefusingStore {
    async fn append_message(&self, message: NewMessage) -> lmchat_persist::Result<DBMessage> {
        self.inner.append_message(message).await
    }

    async fn query_page(
        &self,
        thread_id: &str,
        before: Option<DateTime<Utc>>,
        limit: usize,
    ) -> lmchat_persist::Result<MessagePage<DBMessage>> {
        self.inner.query_page(thread_id, before, limit).await
    }

    async fn delete_messages(&self, thread_id: &str) -> lmchat_persist::Result<u64> {
        self.inner.delete_messages(thread_id).await
    }
}

#[async_trait]
impl ThreadStore for MemoryRefusingStore {
    async fn create_thread(&self, thread: NewThread) -> lmchat_persist::Result<Thread> {
        self.inner.create_thread(thread).await
    }

    async fn get_thread(&self, thread_id: &str) -> lmchat_persist::Result<Option<Thread>> {
        self.inner.get_thread(thread_id).await
    }

    async fn list_threads(
        &self,
        limit: Option<i64>,
        skip: Option<u64>,
    ) -> lmchat_persist::Result<Vec<Thread>> {
        self.inner.list_threads(limit, skip).await
    }

    async fn update_thread(&self, thread_id: &str, patch: ThreadPatch) -> lmchat_persist::Result<Thread> {
        self.inner.update_thread(thread_id, patch).await
    }

    async fn push_memory(
        &self,
        _thread_id: &str,
        _entry: String,
        _capacity: usize,
    ) -> lmchat_persist::Result<Vec<String>> {
        Err(PersistError::Connection("memory write refused".to_string()))
    }

    async fn delete_thread(&self, thread_id: &str) -> lmchat_persist::Result<bool> {
        self.inner.delete_thread(thread_id).await
    }

    async fn ping(&self) -> lmchat_persist::Result<()> {
        self.inner.ping().await
    }
}

struct Harness {
    server: TestServer,
    store: Arc<InMemoryPersistenceClient>,
    llm: Arc<StubLlm>,
}

fn build_server(
    persist: Arc<dyn PersistenceClient>,
    llm: Arc<StubLlm>,
    media_fails: bool,
) -> TestServer {
    let config: Config = toml::from_str(TEST_CONFIG).unwrap();
    let media = Arc::new(StubMedia { fail: media_fails });
    let state = Arc::new(AppState::new(config, persist, llm, media.clone(), media));
    TestServer::new(build_router(state)).unwrap()
}

fn stub_llm(fail: bool) -> Arc<StubLlm> {
    Arc::new(StubLlm {
        fail,
        requests: Mutex::new(Vec::new()),
    })
}

fn harness_with(llm_fails: bool, media_fails: bool) -> Harness {
    let store = Arc::new(InMemoryPersistenceClient::new());
    let llm = stub_llm(llm_fails);
    let server = build_server(store.clone(), llm.clone(), media_fails);

    Harness { server, store, llm }
}

fn harness() -> Harness {
    harness_with(false, false)
}

async fn create_thread(server: &TestServer, title: &str) -> String {
    let response = server.post("/threads").json(&json!({ "title": title })).await;
    response.assert_status(StatusCode::CREATED);
    response.json::<Value>()["thread_id"].as_str().unwrap().to_string()
}

#[tokio::test]
async fn test_health_reports_services() {
    let h = harness();
    let response = h.server.get("/health").await;
    response.assert_status_ok();

    let body: Value = response.json();
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["services"]["store"], "connected");
    assert_eq!(body["services"]["llm"], "available");

    let h = harness_with(true, false);
    let body: Value = h.server.get("/health").await.json();
    assert_eq!(body["status"], "degraded");
    assert_eq!(body["services"]["llm"], "unavailable");
}

#[tokio::test]
async fn test_create_thread_uses_defaults() {
    let h = harness();
    let response = h.server.post("/threads").json(&json!({ "title": "   " })).await;
    response.assert_status(StatusCode::CREATED);

    let body: Value = response.json();
    assert_eq!(body["title"], "New Chat");
    assert_eq!(body["model"], "test-model");
    assert_eq!(body["memory"], json!([]));

    let thread_id = body["thread_id"].as_str().unwrap();
    let fetched: Value = h.server.get(&format!("/threads/{}", thread_id)).await.json();
    assert_eq!(fetched["thread_id"], thread_id);
}

#[tokio::test]
async fn test_send_turn_persists_both_messages_and_memory() {
    let h = harness();
    let thread_id = create_thread(&h.server, "Chat").await;

    let response = h
        .server
        .post(&format!("/threads/{}/messages", thread_id))
        .json(&json!({ "text": "Hello" }))
        .await;
    response.assert_status_ok();

    let turn: Value = response.json();
    assert_eq!(turn["assistant_text"], "echo: Hello");

    // model saw the system prompt and the single user message
    {
        let requests = h.llm.requests.lock().unwrap();
        assert_eq!(requests.len(), 1);
        let roles: Vec<_> = requests[0].messages.iter().map(|m| m.role().to_string()).collect();
        assert_eq!(roles, vec!["system", "user"]);
        assert_eq!(requests[0].model, "test-model");
        assert_eq!(requests[0].options.temperature, Some(0.3));
    }

    let page: Value = h.server.get(&format!("/threads/{}/messages", thread_id)).await.json();
    let messages = page["messages"].as_array().unwrap();
    assert_eq!(messages.len(), 2);
    assert_eq!(messages[0]["message_id"], turn["assistant_message_id"]);
    assert_eq!(messages[0]["sender"], "assistant");
    assert_eq!(messages[1]["message_id"], turn["user_message_id"]);
    assert_eq!(page["has_more"], false);

    let thread: Value = h.server.get(&format!("/threads/{}", thread_id)).await.json();
    assert_eq!(thread["memory"], json!(["User: Hello\nAssistant: echo: Hello"]));
}

#[tokio::test]
async fn test_model_failure_keeps_user_message() {
    let h = harness_with(true, false);
    let thread_id = create_thread(&h.server, "Chat").await;

    let response = h
        .server
        .post(&format!("/threads/{}/messages", thread_id))
        .json(&json!({ "text": "Are you there?" }))
        .await;
    response.assert_status(StatusCode::BAD_GATEWAY);
    assert_eq!(response.json::<Value>()["code"], "llm-error");

    let page: Value = h.server.get(&format!("/threads/{}/messages", thread_id)).await.json();
    let messages = page["messages"].as_array().unwrap();
    assert_eq!(messages.len(), 1);
    assert_eq!(messages[0]["content"], "Are you there?");
    assert_eq!(messages[0]["sender"], "user");
}

#[tokio::test]
async fn test_send_turn_validation_and_not_found() {
    let h = harness();
    let thread_id = create_thread(&h.server, "Chat").await;

    let response = h
        .server
        .post(&format!("/threads/{}/messages", thread_id))
        .json(&json!({ "text": "  " }))
        .await;
    response.assert_status(StatusCode::BAD_REQUEST);
    assert_eq!(response.json::<Value>()["code"], "invalid-text");

    let response = h
        .server
        .post("/threads/does-not-exist/messages")
        .json(&json!({ "text": "hi" }))
        .await;
    response.assert_status(StatusCode::NOT_FOUND);
    assert_eq!(response.json::<Value>()["code"], "thread-not-found");

    // nothing reached the model or the store
    assert!(h.llm.requests.lock().unwrap().is_empty());
    assert!(h.store.query_page(&thread_id, None, 10).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_memory_write_failure_keeps_turn() {
    let store = Arc::new(MemoryRefusingStore::default());
    let server = build_server(store.clone(), stub_llm(false), false);
    let thread_id = create_thread(&server, "Chat").await;

    let response = server
        .post(&format!("/threads/{}/messages", thread_id))
        .json(&json!({ "text": "Hello" }))
        .await;
    response.assert_status_ok();
    assert_eq!(response.json::<Value>()["assistant_text"], "echo: Hello");

    let page = store.query_page(&thread_id, None, 10).await.unwrap();
    assert_eq!(page.len(), 2);
    let thread = store.get_thread(&thread_id).await.unwrap().unwrap();
    assert!(thread.memory.is_empty());
}

#[tokio::test]
async fn test_malformed_bodies_return_error_codes() {
    let h = harness();
    let thread_id = create_thread(&h.server, "Chat").await;

    for body in [json!({}), json!({ "text": 5 })] {
        let response = h
            .server
            .post(&format!("/threads/{}/messages", thread_id))
            .json(&body)
            .await;
        response.assert_status(StatusCode::BAD_REQUEST);
        let error: Value = response.json();
        assert_eq!(error["code"], "invalid-text");
        assert!(error["error"].as_str().unwrap().contains("text"));
    }

    let response = h
        .server
        .patch(&format!("/threads/{}", thread_id))
        .json(&json!({ "name": "x" }))
        .await;
    response.assert_status(StatusCode::BAD_REQUEST);
    assert_eq!(response.json::<Value>()["code"], "invalid-title");

    let response = h.server.post("/media/ocr").json(&json!({ "bucket": "b" })).await;
    response.assert_status(StatusCode::BAD_REQUEST);
    assert_eq!(response.json::<Value>()["code"], "invalid-request");

    assert!(h.llm.requests.lock().unwrap().is_empty());
    assert!(h.store.query_page(&thread_id, None, 10).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_malformed_query_returns_error_code() {
    let h = harness();
    let thread_id = create_thread(&h.server, "Chat").await;

    let response = h
        .server
        .get(&format!("/threads/{}/messages", thread_id))
        .add_query_param("before", "yesterday")
        .await;
    response.assert_status(StatusCode::BAD_REQUEST);
    assert_eq!(response.json::<Value>()["code"], "invalid-request");

    let response = h.server.get("/threads").add_query_param("limit", "many").await;
    response.assert_status(StatusCode::BAD_REQUEST);
    assert_eq!(response.json::<Value>()["code"], "invalid-request");
}

#[tokio::test]
async fn test_paging_walks_history_with_before() {
    let h = harness();
    let thread_id = create_thread(&h.server, "Long").await;
    for i in 0..45 {
        h.store
            .append_message(NewMessage::user(&thread_id, format!("m{i}")))
            .await
            .unwrap();
        // distinct timestamps keep the cursor exact
        tokio::time::sleep(Duration::from_millis(2)).await;
    }

    let first: Value = h
        .server
        .get(&format!("/threads/{}/messages", thread_id))
        .add_query_param("limit", 30)
        .await
        .json();
    let messages = first["messages"].as_array().unwrap();
    assert_eq!(messages.len(), 30);
    assert_eq!(first["has_more"], true);
    assert_eq!(messages[0]["content"], "m44");

    let oldest = messages[29]["created_at"].as_str().unwrap();
    let second: Value = h
        .server
        .get(&format!("/threads/{}/messages", thread_id))
        .add_query_param("limit", 30)
        .add_query_param("before", oldest)
        .await
        .json();
    let messages = second["messages"].as_array().unwrap();
    assert_eq!(messages.len(), 15);
    assert_eq!(second["has_more"], false);
    assert_eq!(messages[14]["content"], "m0");
}

#[tokio::test]
async fn test_page_size_is_capped() {
    let h = harness();
    let thread_id = create_thread(&h.server, "Chat").await;
    for i in 0..3 {
        h.store.append_message(NewMessage::user(&thread_id, format!("m{i}"))).await.unwrap();
    }

    let page: Value = h
        .server
        .get(&format!("/threads/{}/messages", thread_id))
        .add_query_param("limit", 1000)
        .await
        .json();
    assert_eq!(page["messages"].as_array().unwrap().len(), 3);
    assert_eq!(page["has_more"], false);
}

#[tokio::test]
async fn test_rename_and_delete_cascade() {
    let h = harness();
    let thread_id = create_thread(&h.server, "Draft").await;
    h.store.append_message(NewMessage::user(&thread_id, "hello")).await.unwrap();

    let renamed: Value = h
        .server
        .patch(&format!("/threads/{}", thread_id))
        .json(&json!({ "title": " Trip plans " }))
        .await
        .json();
    assert_eq!(renamed["title"], "Trip plans");

    let response = h
        .server
        .patch(&format!("/threads/{}", thread_id))
        .json(&json!({ "title": "" }))
        .await;
    response.assert_status(StatusCode::BAD_REQUEST);
    assert_eq!(response.json::<Value>()["code"], "invalid-title");

    h.server
        .delete(&format!("/threads/{}", thread_id))
        .await
        .assert_status(StatusCode::NO_CONTENT);
    h.server
        .get(&format!("/threads/{}", thread_id))
        .await
        .assert_status(StatusCode::NOT_FOUND);
    assert!(h.store.query_page(&thread_id, None, 10).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_list_threads_newest_first() {
    let h = harness();
    let first = create_thread(&h.server, "First").await;
    tokio::time::sleep(Duration::from_millis(2)).await;
    let second = create_thread(&h.server, "Second").await;

    let body: Value = h.server.get("/threads").add_query_param("limit", 1).await.json();
    let threads = body["threads"].as_array().unwrap();
    assert_eq!(threads.len(), 1);
    assert_eq!(threads[0]["thread_id"], second.as_str());
    assert_eq!(body["has_more"], true);

    let body: Value = h
        .server
        .get("/threads")
        .add_query_param("limit", 1)
        .add_query_param("skip", 1)
        .await
        .json();
    assert_eq!(body["threads"][0]["thread_id"], first.as_str());
    assert_eq!(body["has_more"], false);
}

#[tokio::test]
async fn test_document_attachment_becomes_a_turn() {
    let h = harness();
    let thread_id = create_thread(&h.server, "Docs").await;

    let response = h
        .server
        .post(&format!("/threads/{}/attachments", thread_id))
        .json(&json!({
            "bucket": "uploads",
            "key": "chat/invoice.pdf",
            "mime_type": "application/pdf",
            "command": "What is the total?",
            "file_name": "invoice.pdf"
        }))
        .await;
    response.assert_status_ok();

    let body: Value = response.json();
    assert_eq!(
        body["prompt"],
        "File command: What is the total?\n\nHere is the extracted text from invoice.pdf:\n\nInvoice total: 42"
    );
    assert!(body["assistant_text"].as_str().unwrap().ends_with("Invoice total: 42"));
    assert!(body["user_message_id"].is_string());
}

#[tokio::test]
async fn test_audio_attachment_uses_transcription() {
    let h = harness();
    let thread_id = create_thread(&h.server, "Voice").await;

    let body: Value = h
        .server
        .post(&format!("/threads/{}/attachments", thread_id))
        .json(&json!({
            "bucket": "uploads",
            "key": "chat/note.webm",
            "mime_type": "audio/webm"
        }))
        .await
        .json();

    let prompt = body["prompt"].as_str().unwrap();
    assert!(prompt.starts_with("Audio command: No specific command provided."));
    assert!(prompt.contains("Here is the transcription from an uploaded file:"));
    assert!(prompt.ends_with("remind me to call Sam"));
}

#[tokio::test]
async fn test_media_failures_abort_without_messages() {
    let h = harness_with(false, true);
    let thread_id = create_thread(&h.server, "Docs").await;

    let response = h
        .server
        .post(&format!("/threads/{}/attachments", thread_id))
        .json(&json!({ "bucket": "uploads", "key": "a.png", "mime_type": "image/png" }))
        .await;
    response.assert_status(StatusCode::BAD_GATEWAY);
    assert_eq!(response.json::<Value>()["code"], "ocr-error");
    assert!(h.store.query_page(&thread_id, None, 10).await.unwrap().is_empty());

    let response = h
        .server
        .post("/media/ocr")
        .json(&json!({ "bucket": " ", "key": "a.png", "mime_type": "image/png" }))
        .await;
    response.assert_status(StatusCode::BAD_REQUEST);
    assert_eq!(response.json::<Value>()["code"], "invalid-media");
}

#[tokio::test]
async fn test_transcribe_proxy_returns_camel_case() {
    let h = harness();
    let body: Value = h
        .server
        .post("/media/transcribe")
        .json(&json!({ "bucket": "uploads", "key": "n.webm", "mime_type": "audio/webm" }))
        .await
        .json();

    assert_eq!(body["text"], "remind me to call Sam");
    assert_eq!(body["durationSeconds"], 2.0);
}
