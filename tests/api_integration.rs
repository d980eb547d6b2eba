use axum::http::StatusCode;
use axum_test::TestServer;
use interview_coach::AppState;
use interview_coach::catalog::QuestionCatalog;
use interview_coach::config::WebConfig;
use interview_coach::feedback::FeedbackGenerator;
use interview_coach::server::build_router;
use interview_coach::session::{InMemorySessionStore, ManualClock};
use serde_json::{Value, json};
use std::sync::Arc;
use std::time::Duration;
use stubs::{FailingFeedback, StubFeedback};

mod stubs {
    use interview_coach::feedback::{FeedbackError, FeedbackGenerator};
    use interview_coach::llm::LlmError;

    /// Echoes the style and answer back as feedback.
    #[derive(Debug)]
    pub struct StubFeedback;

    #[async_trait::async_trait]
    impl FeedbackGenerator for StubFeedback {
        async fn generate(&self, answer: &str, style: &str) -> Result<String, FeedbackError> {
            Ok(format!("[{style}] {answer}"))
        }
    }

    #[derive(Debug)]
    pub struct FailingFeedback;

    #[async_trait::async_trait]
    impl FeedbackGenerator for FailingFeedback {
        async fn generate(&self, _answer: &str, _style: &str) -> Result<String, FeedbackError> {
            Err(FeedbackError::Upstream(LlmError::Api {
                status: 503,
                message: "model overloaded".to_string(),
            }))
        }
    }
}

const SESSION_COOKIE: &str = "session_id";

fn catalog() -> QuestionCatalog {
    QuestionCatalog::new([
        ("Behavioral", vec!["Tell me about a conflict.", "Describe a failure."]),
        ("Technical", vec!["Explain a hash map."]),
    ])
}

fn web(index_file: &str) -> WebConfig {
    WebConfig {
        static_dir: "frontend".to_string(),
        index_file: index_file.to_string(),
    }
}

fn build_server(
    store: Arc<InMemorySessionStore>,
    feedback: Arc<dyn FeedbackGenerator>,
    web: WebConfig,
) -> TestServer {
    let state = AppState {
        catalog: Arc::new(catalog()),
        sessions: store,
        feedback,
        web: Arc::new(web),
    };
    TestServer::new(build_router(state)).expect("Failed to start test server")
}

fn default_server() -> (TestServer, Arc<InMemorySessionStore>) {
    let store = Arc::new(InMemorySessionStore::new(Duration::from_secs(3600)));
    let server = build_server(
        Arc::clone(&store),
        Arc::new(StubFeedback),
        web("missing/index.html"),
    );
    (server, store)
}

fn entry(category: &str, question: &str) -> Value {
    json!({
        "category": category,
        "question": question,
        "answer": format!("A for {question}"),
        "feedback": format!("F for {question}"),
        "feedback_style": "Detailed"
    })
}

#[tokio::test]
async fn test_categories_are_listed_in_catalog_order() {
    let (server, store) = default_server();

    let response = server.get("/api/categories").await;
    assert_eq!(response.status_code(), StatusCode::OK);
    assert_eq!(
        response.json::<Value>(),
        json!({ "categories": ["Behavioral", "Technical"] })
    );

    // Stateless: no session, no cookie.
    assert!(response.maybe_cookie(SESSION_COOKIE).is_none());
    assert!(store.is_empty());
}

#[tokio::test]
async fn test_question_sets_session_cookie() {
    let (server, store) = default_server();

    let response = server.get("/api/question/Technical").await;
    assert_eq!(response.status_code(), StatusCode::OK);
    assert_eq!(
        response.json::<Value>(),
        json!({ "question": "Explain a hash map.", "category": "Technical" })
    );

    let cookie = response.cookie(SESSION_COOKIE);
    assert_eq!(cookie.max_age(), Some(time::Duration::seconds(3600)));
    assert_eq!(cookie.path(), Some("/"));
    assert_eq!(store.len(), 1);
}

#[tokio::test]
async fn test_unknown_category_does_not_touch_sessions() {
    let (server, store) = default_server();

    let response = server.get("/api/question/UnknownCategory").await;
    assert_eq!(response.status_code(), StatusCode::NOT_FOUND);
    assert_eq!(
        response.json::<Value>(),
        json!({ "detail": "Category not found" })
    );
    assert!(response.maybe_cookie(SESSION_COOKIE).is_none());
    assert!(store.is_empty());
}

#[tokio::test]
async fn test_history_scenario() {
    let (server, _store) = default_server();

    let first = server.get("/api/history").await;
    let cookie = first.cookie(SESSION_COOKIE);
    assert_eq!(first.json::<Value>(), json!({ "history": [] }));

    let recorded = json!({
        "category": "Behavioral",
        "question": "Q1",
        "answer": "A1",
        "feedback": "F1",
        "feedback_style": "Detailed"
    });
    let response = server
        .post("/api/history")
        .add_cookie(cookie.clone())
        .json(&recorded)
        .await;
    assert_eq!(response.status_code(), StatusCode::OK);
    assert_eq!(response.json::<Value>(), json!({ "status": "success" }));
    assert_eq!(response.cookie(SESSION_COOKIE).value(), cookie.value());

    let all = server.get("/api/history").add_cookie(cookie.clone()).await;
    assert_eq!(all.json::<Value>(), json!({ "history": [recorded] }));

    let explicit_all = server
        .get("/api/history")
        .add_query_param("category", "All")
        .add_cookie(cookie.clone())
        .await;
    assert_eq!(explicit_all.json::<Value>(), json!({ "history": [recorded] }));

    let other = server
        .get("/api/history")
        .add_query_param("category", "Other")
        .add_cookie(cookie.clone())
        .await;
    assert_eq!(other.json::<Value>(), json!({ "history": [] }));

    let cleared = server.delete("/api/history").add_cookie(cookie.clone()).await;
    assert_eq!(cleared.json::<Value>(), json!({ "status": "success" }));

    let after = server.get("/api/history").add_cookie(cookie).await;
    assert_eq!(after.json::<Value>(), json!({ "history": [] }));
}

#[tokio::test]
async fn test_requests_without_cookie_get_fresh_sessions() {
    let (server, store) = default_server();

    let a = server.get("/api/history").await.cookie(SESSION_COOKIE);
    let b = server.get("/api/history").await.cookie(SESSION_COOKIE);

    assert_ne!(a.value(), b.value());
    assert_eq!(store.len(), 2);
}

#[tokio::test]
async fn test_sessions_are_isolated() {
    let (server, _store) = default_server();

    let alice = server.get("/api/history").await.cookie(SESSION_COOKIE);
    let bob = server.get("/api/history").await.cookie(SESSION_COOKIE);

    server
        .post("/api/history")
        .add_cookie(alice.clone())
        .json(&entry("Behavioral", "Q1"))
        .await;

    let bobs = server.get("/api/history").add_cookie(bob).await;
    assert_eq!(bobs.json::<Value>(), json!({ "history": [] }));

    let alices = server.get("/api/history").add_cookie(alice).await;
    assert_eq!(alices.json::<Value>()["history"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_expired_session_is_replaced() {
    let clock = Arc::new(ManualClock::new(chrono::Utc::now()));
    let store = Arc::new(InMemorySessionStore::with_clock(
        Duration::from_secs(60),
        Arc::<ManualClock>::clone(&clock),
    ));
    let server = build_server(
        Arc::clone(&store),
        Arc::new(StubFeedback),
        web("missing/index.html"),
    );

    let cookie = server.get("/api/history").await.cookie(SESSION_COOKIE);
    server
        .post("/api/history")
        .add_cookie(cookie.clone())
        .json(&entry("Behavioral", "Q1"))
        .await;

    clock.advance(Duration::from_secs(61));

    let response = server.get("/api/history").add_cookie(cookie.clone()).await;
    assert_ne!(response.cookie(SESSION_COOKIE).value(), cookie.value());
    assert_eq!(response.json::<Value>(), json!({ "history": [] }));
    assert_eq!(store.len(), 1);
}

#[tokio::test]
async fn test_delete_single_entry() {
    let (server, _store) = default_server();
    let cookie = server.get("/api/history").await.cookie(SESSION_COOKIE);
    for q in ["Q1", "Q2"] {
        server
            .post("/api/history")
            .add_cookie(cookie.clone())
            .json(&entry("Behavioral", q))
            .await;
    }

    let missing = server.delete("/api/history/5").add_cookie(cookie.clone()).await;
    assert_eq!(missing.status_code(), StatusCode::NOT_FOUND);
    assert_eq!(missing.cookie(SESSION_COOKIE).value(), cookie.value());

    let negative = server.delete("/api/history/-1").add_cookie(cookie.clone()).await;
    assert_eq!(negative.status_code(), StatusCode::NOT_FOUND);

    let removed = server.delete("/api/history/0").add_cookie(cookie.clone()).await;
    assert_eq!(removed.status_code(), StatusCode::OK);
    assert_eq!(removed.json::<Value>(), json!({ "status": "success" }));

    let history = server.get("/api/history").add_cookie(cookie).await;
    assert_eq!(
        history.json::<Value>(),
        json!({ "history": [entry("Behavioral", "Q2")] })
    );
}

#[tokio::test]
async fn test_batch_delete_is_all_or_nothing() {
    let (server, _store) = default_server();
    let cookie = server.get("/api/history").await.cookie(SESSION_COOKIE);
    for q in ["Q1", "Q2", "Q3"] {
        server
            .post("/api/history")
            .add_cookie(cookie.clone())
            .json(&entry("Behavioral", q))
            .await;
    }

    let rejected = server
        .delete("/api/history/batch")
        .add_cookie(cookie.clone())
        .json(&json!({ "indices": [0, 7, 9] }))
        .await;
    assert_eq!(rejected.status_code(), StatusCode::BAD_REQUEST);
    assert_eq!(
        rejected.json::<Value>(),
        json!({ "detail": "Invalid index: 7" })
    );

    let untouched = server.get("/api/history").add_cookie(cookie.clone()).await;
    assert_eq!(untouched.json::<Value>()["history"].as_array().unwrap().len(), 3);

    let accepted = server
        .delete("/api/history/batch")
        .add_cookie(cookie.clone())
        .json(&json!({ "indices": [2, 0] }))
        .await;
    assert_eq!(accepted.status_code(), StatusCode::OK);

    let remaining = server.get("/api/history").add_cookie(cookie).await;
    assert_eq!(
        remaining.json::<Value>(),
        json!({ "history": [entry("Behavioral", "Q2")] })
    );
}

#[tokio::test]
async fn test_evaluate_returns_feedback() {
    let (server, _store) = default_server();

    let response = server
        .post("/api/evaluate")
        .json(&json!({ "answer": "I resolved it." }))
        .await;
    assert_eq!(response.status_code(), StatusCode::OK);
    assert_eq!(
        response.json::<Value>(),
        json!({ "feedback": "[Detailed] I resolved it." })
    );
    assert!(response.maybe_cookie(SESSION_COOKIE).is_some());

    let concise = server
        .post("/api/evaluate")
        .json(&json!({ "answer": "I resolved it.", "style": "Concise" }))
        .await;
    assert_eq!(
        concise.json::<Value>(),
        json!({ "feedback": "[Concise] I resolved it." })
    );
}

#[tokio::test]
async fn test_evaluate_upstream_failure() {
    let store = Arc::new(InMemorySessionStore::default());
    let server = build_server(store, Arc::new(FailingFeedback), web("missing/index.html"));

    let response = server
        .post("/api/evaluate")
        .json(&json!({ "answer": "I resolved it." }))
        .await;
    assert_eq!(response.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(
        response.json::<Value>(),
        json!({ "detail": "Error evaluating answer: API error (503): model overloaded" })
    );
    assert!(response.maybe_cookie(SESSION_COOKIE).is_some());
}

#[tokio::test]
async fn test_fallback_serves_index_for_client_routes() {
    let dir = tempfile::tempdir().unwrap();
    let index = dir.path().join("index.html");
    std::fs::write(&index, "<h1>Interview Coach</h1>").unwrap();

    let store = Arc::new(InMemorySessionStore::default());
    let server = build_server(
        store,
        Arc::new(StubFeedback),
        web(index.to_str().unwrap()),
    );

    let page = server.get("/practice/behavioral").await;
    assert_eq!(page.status_code(), StatusCode::OK);
    assert_eq!(page.text(), "<h1>Interview Coach</h1>");

    let root = server.get("/").await;
    assert_eq!(root.status_code(), StatusCode::OK);

    let api = server.get("/api/does-not-exist").await;
    assert_eq!(api.status_code(), StatusCode::NOT_FOUND);
    assert_eq!(api.json::<Value>(), json!({ "detail": "Not Found" }));
}

#[tokio::test]
async fn test_malformed_history_body_keeps_session_contract() {
    let (server, store) = default_server();

    let first = server
        .post("/api/history")
        .json(&json!({ "category": "x" }))
        .await;
    assert_eq!(first.status_code(), StatusCode::BAD_REQUEST);
    assert!(first.json::<Value>()["detail"].is_string());
    let cookie = first.cookie(SESSION_COOKIE);

    // The client holds on to the session it was handed.
    for _ in 0..2 {
        let again = server
            .post("/api/history")
            .add_cookie(cookie.clone())
            .json(&json!({ "category": "x" }))
            .await;
        assert_eq!(again.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(again.cookie(SESSION_COOKIE).value(), cookie.value());
    }
    assert_eq!(store.len(), 1);

    let history = server.get("/api/history").add_cookie(cookie.clone()).await;
    assert_eq!(history.json::<Value>(), json!({ "history": [] }));
    assert_eq!(history.cookie(SESSION_COOKIE).value(), cookie.value());
}

#[tokio::test]
async fn test_non_numeric_index_is_bad_request() {
    let (server, store) = default_server();
    let cookie = server.get("/api/history").await.cookie(SESSION_COOKIE);
    server
        .post("/api/history")
        .add_cookie(cookie.clone())
        .json(&entry("Behavioral", "Q1"))
        .await;

    let response = server.delete("/api/history/abc").add_cookie(cookie.clone()).await;
    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
    assert!(response.json::<Value>()["detail"].is_string());
    assert_eq!(response.cookie(SESSION_COOKIE).value(), cookie.value());
    assert_eq!(store.len(), 1);

    let history = server.get("/api/history").add_cookie(cookie).await;
    assert_eq!(history.json::<Value>()["history"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_malformed_batch_and_evaluate_bodies() {
    let (server, _store) = default_server();
    let cookie = server.get("/api/history").await.cookie(SESSION_COOKIE);

    let batch = server
        .delete("/api/history/batch")
        .add_cookie(cookie.clone())
        .json(&json!({ "indices": "all of them" }))
        .await;
    assert_eq!(batch.status_code(), StatusCode::BAD_REQUEST);
    assert!(batch.json::<Value>()["detail"].is_string());
    assert_eq!(batch.cookie(SESSION_COOKIE).value(), cookie.value());

    let evaluate = server
        .post("/api/evaluate")
        .add_cookie(cookie.clone())
        .json(&json!({ "answer": 42 }))
        .await;
    assert_eq!(evaluate.status_code(), StatusCode::BAD_REQUEST);
    assert!(evaluate.json::<Value>()["detail"].is_string());
    assert_eq!(evaluate.cookie(SESSION_COOKIE).value(), cookie.value());

    let unlabeled = server
        .post("/api/evaluate")
        .add_cookie(cookie.clone())
        .text("I resolved it.")
        .await;
    assert_eq!(unlabeled.status_code(), StatusCode::BAD_REQUEST);
    assert_eq!(unlabeled.cookie(SESSION_COOKIE).value(), cookie.value());
}
