use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use serde_json::{json, Value};
use tower::ServiceExt;

use super::router::router;
use crate::core::config::{AppPaths, AppSettings, ConfigService};
use crate::history::ChatMessage;
use crate::state::AppState;
use crate::test_support::{FakeChatStore, FakeLlm, FakeVectorStore};

struct TestApp {
    app: Router,
    llm: Arc<FakeLlm>,
    vectors: Arc<FakeVectorStore>,
    chats: Arc<FakeChatStore>,
    _dir: tempfile::TempDir,
}

fn test_app() -> TestApp {
    let dir = tempfile::tempdir().unwrap();
    let paths = Arc::new(AppPaths::with_data_dir(
        dir.path().to_path_buf(),
        dir.path().to_path_buf(),
    ));
    std::fs::write(
        dir.path().join("secrets.yaml"),
        "vector_store:\n  api_key: pc-secret\n",
    )
    .unwrap();

    let llm = Arc::new(
        FakeLlm::with_models(&["nomic-embed-text", "llama3"]).with_answer("It ships in March."),
    );
    let vectors = Arc::new(FakeVectorStore::default());
    let chats = Arc::new(FakeChatStore::with_session("s1", "team-1", None));

    let state = AppState::from_parts(
        paths.clone(),
        ConfigService::new(paths),
        AppSettings::default(),
        llm.clone(),
        vectors.clone(),
        chats.clone(),
    );

    TestApp {
        app: router(Arc::new(state)),
        llm,
        vectors,
        chats,
        _dir: dir,
    }
}

fn post_json(uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, body)
}

#[tokio::test]
async fn health_is_ok() {
    let t = test_app();
    let (status, body) = send(&t.app, get("/health")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "status": "ok" }));
}

#[tokio::test]
async fn chat_returns_answer_and_persists() {
    let t = test_app();

    let (status, body) = send(
        &t.app,
        post_json(
            "/chat",
            json!({ "message": "When do we ship?", "sessionId": "s1", "teamId": "team-1" }),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "status": "success", "message": "It ships in March." }));
    assert_eq!(t.chats.messages("s1").len(), 2);
    assert_eq!(t.vectors.query_teams(), vec!["team-1".to_string()]);
}

#[tokio::test]
async fn chat_requires_all_fields() {
    let t = test_app();

    for body in [
        json!({ "sessionId": "s1", "teamId": "team-1" }),
        json!({ "message": "hi", "teamId": "team-1" }),
        json!({ "message": "hi", "sessionId": "s1", "teamId": "  " }),
    ] {
        let (status, body) = send(&t.app, post_json("/chat", body)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["status"], "error");
    }
    assert!(t.llm.prompts().is_empty());
}

#[tokio::test]
async fn chain_failure_maps_to_server_error() {
    let t = test_app();
    t.llm.fail_generate();

    let (status, body) = send(
        &t.app,
        post_json(
            "/chat",
            json!({ "message": "q", "sessionId": "s1", "teamId": "team-1" }),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(body["message"]
        .as_str()
        .unwrap()
        .starts_with("RAG chain invocation failed"));
}

#[tokio::test]
async fn sessions_can_be_created_listed_and_read() {
    let t = test_app();

    let (status, created) = send(&t.app, post_json("/api/sessions", json!({ "teamId": "team-2" }))).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(created["session"]["team_id"], "team-2");

    let (_, listed) = send(&t.app, get("/api/sessions?teamId=team-2")).await;
    assert_eq!(listed["sessions"].as_array().unwrap().len(), 1);

    t.chats.seed_messages(
        "s1",
        vec![ChatMessage::user("hi"), ChatMessage::assistant("hello")],
    );
    let (status, messages) = send(&t.app, get("/api/sessions/s1/messages?teamId=team-1")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(messages["messages"][0]["role"], "user");
    assert_eq!(messages["messages"][1]["content"], "hello");

    let (status, _) = send(&t.app, get("/api/sessions/missing/messages?teamId=team-1")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = send(&t.app, get("/api/sessions")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn documents_are_indexed_and_deleted() {
    let t = test_app();

    let (status, body) = send(
        &t.app,
        post_json(
            "/api/documents",
            json!({ "teamId": "team-1", "fileId": "f1", "fileName": "a.pdf", "text": "Hello world." }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["chunks"], 1);
    assert_eq!(t.vectors.upserted()[0].metadata["team_id"], "team-1");

    let request = Request::builder()
        .method("DELETE")
        .uri("/api/documents/f1?teamId=team-1")
        .body(Body::empty())
        .unwrap();
    let (status, _) = send(&t.app, request).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        t.vectors.deleted_filters()[0],
        json!({ "file_id": { "$eq": "f1" }, "team_id": { "$eq": "team-1" } })
    );
}

#[tokio::test]
async fn config_endpoint_redacts_secrets() {
    let t = test_app();

    let (status, body) = send(&t.app, get("/api/config")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["vector_store"]["api_key"], "****");
}

#[tokio::test]
async fn status_reports_backend_reachability() {
    let t = test_app();
    let (_, body) = send(&t.app, get("/api/status")).await;
    assert_eq!(body["inference"]["reachable"], true);
    assert_eq!(body["inference"]["generation_model"], "llama3");

    t.llm.fail_list();
    let (_, body) = send(&t.app, get("/api/status")).await;
    assert_eq!(body["status"], "degraded");
}

#[tokio::test]
async fn session_messages_stay_within_the_owning_team() {
    let t = test_app();
    t.chats
        .seed_messages("s1", vec![ChatMessage::user("team one only")]);

    let (status, body) = send(&t.app, get("/api/sessions/s1/messages?teamId=team-2")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(!body.to_string().contains("team one only"));

    let (status, _) = send(&t.app, get("/api/sessions/s1/messages")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = send(
        &t.app,
        post_json(
            "/chat",
            json!({ "message": "q", "sessionId": "s1", "teamId": "team-2" }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["status"], "error");
    assert_eq!(t.chats.messages("s1").len(), 1);
}
