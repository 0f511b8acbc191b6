use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use axum_test::TestServer;
use serde_json::json;
use tokio::sync::Mutex;

use cinefile_api::api::{create_router, AppState};
use cinefile_api::error::{AppError, AppResult};
use cinefile_api::models::{Film, SearchHit};
use cinefile_api::services::providers::{CompletionClient, FilmStore};
use cinefile_api::services::NO_MATCHES_MESSAGE;

/// In-memory film store standing in for Chroma.
///
/// Queries score each record by how many query words appear in its
/// embedding document, most overlap first with insertion order as the
/// tiebreak, so result ordering is deterministic.
#[derive(Default)]
struct InMemoryStore {
    films: Mutex<Vec<Film>>,
}

#[async_trait]
impl FilmStore for InMemoryStore {
    async fn insert(&self, film: &Film) -> AppResult<String> {
        let id = film.record_id();
        self.films.lock().await.push(film.clone());
        Ok(id)
    }

    async fn fetch_all(&self) -> AppResult<Vec<Film>> {
        Ok(self.films.lock().await.clone())
    }

    async fn query(&self, text: &str, limit: usize) -> AppResult<Vec<SearchHit>> {
        let films = self.films.lock().await;
        let query_words: Vec<String> = text
            .to_lowercase()
            .split_whitespace()
            .map(str::to_string)
            .collect();

        let mut scored: Vec<(usize, Film)> = films
            .iter()
            .map(|film| {
                let document = film.embedding_text().to_lowercase();
                let score = query_words
                    .iter()
                    .filter(|word| document.contains(word.as_str()))
                    .count();
                (score, film.clone())
            })
            .collect();
        scored.sort_by(|a, b| b.0.cmp(&a.0));

        Ok(scored
            .into_iter()
            .take(limit)
            .map(|(score, film)| SearchHit {
                film,
                distance: 1.0 / (1.0 + score as f64),
            })
            .collect())
    }
}

/// Store whose every operation fails, for surfacing-error tests
struct FailingStore;

#[async_trait]
impl FilmStore for FailingStore {
    async fn insert(&self, _film: &Film) -> AppResult<String> {
        Err(AppError::Store("collection unreachable".to_string()))
    }

    async fn fetch_all(&self) -> AppResult<Vec<Film>> {
        Err(AppError::Store("collection unreachable".to_string()))
    }

    async fn query(&self, _text: &str, _limit: usize) -> AppResult<Vec<SearchHit>> {
        Err(AppError::Store("collection unreachable".to_string()))
    }
}

/// Completion client returning a fixed reply and counting invocations
struct ScriptedCompletion {
    reply: Result<String, String>,
    calls: AtomicUsize,
}

impl ScriptedCompletion {
    fn ok(reply: &str) -> Self {
        Self {
            reply: Ok(reply.to_string()),
            calls: AtomicUsize::new(0),
        }
    }

    fn failing(message: &str) -> Self {
        Self {
            reply: Err(message.to_string()),
            calls: AtomicUsize::new(0),
        }
    }
}

#[async_trait]
impl CompletionClient for ScriptedCompletion {
    async fn complete(&self, _system: &str, _user: &str) -> AppResult<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match &self.reply {
            Ok(text) => Ok(text.clone()),
            Err(message) => Err(AppError::Completion(message.clone())),
        }
    }
}

fn create_test_server(
    store: Arc<dyn FilmStore>,
    completion: Option<Arc<dyn CompletionClient>>,
) -> TestServer {
    let state = AppState::new(store, completion);
    let app = create_router(state);
    TestServer::new(app).unwrap()
}

fn alien() -> serde_json::Value {
    json!({
        "title": "Alien",
        "genre": "Sci-Fi",
        "director": "Ridley Scott",
        "year": 1979,
        "description": "The crew of a commercial spacecraft encounters a deadly lifeform.",
        "timeslot": "Night (21:00-24:00)",
        "rating": 9
    })
}

#[tokio::test]
async fn test_health_check() {
    let server = create_test_server(Arc::new(InMemoryStore::default()), None);

    let response = server.get("/health").await;

    response.assert_status_ok();
    let body: serde_json::Value = response.json();
    assert_eq!(body["status"], "healthy");
}

#[tokio::test]
async fn test_add_film_then_fetch_all_preserves_metadata() {
    let server = create_test_server(Arc::new(InMemoryStore::default()), None);

    let response = server.post("/api/v1/films").json(&alien()).await;
    response.assert_status(axum::http::StatusCode::CREATED);
    let created: serde_json::Value = response.json();
    assert!(created["id"].as_str().unwrap().starts_with("Alien_1979_"));
    assert_eq!(created["film"]["title"], "Alien");

    let response = server.get("/api/v1/films").await;
    response.assert_status_ok();
    let listing: serde_json::Value = response.json();
    assert_eq!(listing["total"], 1);
    assert_eq!(listing["films"][0]["title"], "Alien");
    assert_eq!(listing["films"][0]["year"], 1979);
    assert_eq!(listing["films"][0]["rating"], 9.0);
    assert_eq!(listing["films"][0]["timeslot"], "Night (21:00-24:00)");
}

#[tokio::test]
async fn test_add_film_applies_defaults() {
    let server = create_test_server(Arc::new(InMemoryStore::default()), None);

    let response = server
        .post("/api/v1/films")
        .json(&json!({
            "title": "Paris, Texas",
            "genre": "Drama",
            "director": "Wim Wenders",
            "year": 1984,
            "description": "A drifter reconnects with his family."
        }))
        .await;

    response.assert_status(axum::http::StatusCode::CREATED);
    let created: serde_json::Value = response.json();
    assert_eq!(created["film"]["timeslot"], "All Day");
    assert_eq!(created["film"]["rating"], 7.0);
}

#[tokio::test]
async fn test_add_film_invalid_year_rejected_without_insert() {
    let store = Arc::new(InMemoryStore::default());
    let server = create_test_server(store.clone(), None);

    let mut film = alien();
    film["year"] = json!(1800);

    let response = server.post("/api/v1/films").json(&film).await;
    response.assert_status(axum::http::StatusCode::BAD_REQUEST);
    let body: serde_json::Value = response.json();
    assert!(body["error"].as_str().unwrap().contains("invalid year: 1800"));

    // Nothing reached the store
    let response = server.get("/api/v1/films").await;
    let listing: serde_json::Value = response.json();
    assert_eq!(listing["total"], 0);
}

#[tokio::test]
async fn test_add_film_store_failure_is_bad_gateway() {
    let server = create_test_server(Arc::new(FailingStore), None);

    let response = server.post("/api/v1/films").json(&alien()).await;

    response.assert_status(axum::http::StatusCode::BAD_GATEWAY);
    let body: serde_json::Value = response.json();
    assert!(body["error"].as_str().unwrap().contains("collection unreachable"));
}

#[tokio::test]
async fn test_import_mixed_batch_reports_per_record_failures() {
    let store = Arc::new(InMemoryStore::default());
    let server = create_test_server(store.clone(), None);

    let response = server
        .post("/api/v1/films/import")
        .json(&json!([
            alien(),
            { "title": "Too Old", "genre": "Drama", "director": "X",
              "year": 1800, "description": "y" },
            { "title": "Heat", "genre": "Crime", "director": "Michael Mann",
              "year": 1995, "description": "Cops and robbers in LA." },
        ]))
        .await;

    response.assert_status_ok();
    let summary: serde_json::Value = response.json();
    assert_eq!(summary["succeeded"], 2);
    assert_eq!(summary["failed"], 1);
    assert_eq!(summary["failures"][0]["position"], 2);
    assert_eq!(summary["failures"][0]["title"], "Too Old");
    assert!(summary["failures"][0]["reason"]
        .as_str()
        .unwrap()
        .contains("invalid year: 1800"));

    // The valid records were persisted
    let listing: serde_json::Value = server.get("/api/v1/films").await.json();
    assert_eq!(listing["total"], 2);
}

#[tokio::test]
async fn test_import_non_array_payload_is_hard_failure() {
    let server = create_test_server(Arc::new(InMemoryStore::default()), None);

    let response = server
        .post("/api/v1/films/import")
        .json(&json!({ "title": "Not A List" }))
        .await;

    response.assert_status(axum::http::StatusCode::BAD_REQUEST);
    let body: serde_json::Value = response.json();
    assert!(body["error"].as_str().unwrap().contains("JSON array"));
}

#[tokio::test]
async fn test_search_empty_store_returns_empty_results() {
    let server = create_test_server(Arc::new(InMemoryStore::default()), None);

    let response = server
        .post("/api/v1/films/search")
        .json(&json!({ "query": "space horror" }))
        .await;

    response.assert_status_ok();
    let body: serde_json::Value = response.json();
    assert_eq!(body["results"].as_array().unwrap().len(), 0);
}

#[tokio::test]
async fn test_search_orders_results_and_honors_limit() {
    let server = create_test_server(Arc::new(InMemoryStore::default()), None);

    server.post("/api/v1/films").json(&alien()).await;
    server
        .post("/api/v1/films")
        .json(&json!({
            "title": "Heat", "genre": "Crime", "director": "Michael Mann",
            "year": 1995, "description": "Cops and robbers in LA.", "rating": 8.5
        }))
        .await;

    let response = server
        .post("/api/v1/films/search")
        .json(&json!({ "query": "spacecraft lifeform", "limit": 1 }))
        .await;

    response.assert_status_ok();
    let body: serde_json::Value = response.json();
    let results = body["results"].as_array().unwrap();
    assert_eq!(results.len(), 1);
    assert_eq!(results[0]["film"]["title"], "Alien");
}

#[tokio::test]
async fn test_search_store_failure_is_an_error_not_empty() {
    let server = create_test_server(Arc::new(FailingStore), None);

    let response = server
        .post("/api/v1/films/search")
        .json(&json!({ "query": "anything" }))
        .await;

    response.assert_status(axum::http::StatusCode::BAD_GATEWAY);
}

#[tokio::test]
async fn test_chat_flow_accumulates_turns_per_session() {
    let store = Arc::new(InMemoryStore::default());
    let completion = Arc::new(ScriptedCompletion::ok("Watch Alien tonight."));
    let server = create_test_server(store.clone(), Some(completion.clone()));

    server.post("/api/v1/films").json(&alien()).await;

    let response = server
        .post("/api/v1/chat")
        .json(&json!({ "message": "something with spacecraft" }))
        .await;
    response.assert_status_ok();
    let first: serde_json::Value = response.json();
    assert_eq!(first["reply"], "Watch Alien tonight.");
    assert_eq!(first["turns"].as_array().unwrap().len(), 2);
    assert_eq!(first["turns"][0]["role"], "user");
    assert_eq!(first["turns"][1]["role"], "assistant");
    let session_id = first["session_id"].as_str().unwrap().to_string();

    let response = server
        .post("/api/v1/chat")
        .json(&json!({ "session_id": session_id, "message": "anything shorter?" }))
        .await;
    let second: serde_json::Value = response.json();
    assert_eq!(second["session_id"].as_str().unwrap(), session_id);
    assert_eq!(second["turns"].as_array().unwrap().len(), 4);
    assert_eq!(completion.calls.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn test_chat_empty_catalog_skips_completion_call() {
    let completion = Arc::new(ScriptedCompletion::ok("should never be used"));
    let server = create_test_server(
        Arc::new(InMemoryStore::default()),
        Some(completion.clone()),
    );

    let response = server
        .post("/api/v1/chat")
        .json(&json!({ "message": "a heist movie" }))
        .await;

    response.assert_status_ok();
    let body: serde_json::Value = response.json();
    assert_eq!(body["reply"], NO_MATCHES_MESSAGE);
    assert_eq!(completion.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_chat_completion_failure_still_records_a_turn() {
    let store = Arc::new(InMemoryStore::default());
    let completion = Arc::new(ScriptedCompletion::failing("deployment offline"));
    let server = create_test_server(store, Some(completion));

    server.post("/api/v1/films").json(&alien()).await;

    let response = server
        .post("/api/v1/chat")
        .json(&json!({ "message": "something with spacecraft" }))
        .await;

    response.assert_status_ok();
    let body: serde_json::Value = response.json();
    let reply = body["reply"].as_str().unwrap();
    assert!(reply.starts_with("Error getting AI recommendation:"));
    assert!(reply.contains("deployment offline"));
    assert_eq!(body["turns"].as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn test_chat_without_completion_configured() {
    let server = create_test_server(Arc::new(InMemoryStore::default()), None);

    let response = server
        .post("/api/v1/chat")
        .json(&json!({ "message": "anything" }))
        .await;

    response.assert_status_ok();
    let body: serde_json::Value = response.json();
    assert!(body["reply"]
        .as_str()
        .unwrap()
        .contains("Azure OpenAI is not configured"));
    assert_eq!(body["turns"].as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn test_chat_search_failure_becomes_assistant_text() {
    let completion = Arc::new(ScriptedCompletion::ok("unused"));
    let server = create_test_server(Arc::new(FailingStore), Some(completion.clone()));

    let response = server
        .post("/api/v1/chat")
        .json(&json!({ "message": "anything" }))
        .await;

    response.assert_status_ok();
    let body: serde_json::Value = response.json();
    assert!(body["reply"]
        .as_str()
        .unwrap()
        .starts_with("Error searching films:"));
    assert_eq!(completion.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_chat_rejects_empty_message() {
    let server = create_test_server(Arc::new(InMemoryStore::default()), None);

    let response = server
        .post("/api/v1/chat")
        .json(&json!({ "message": "   " }))
        .await;

    response.assert_status(axum::http::StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_chat_reset_clears_the_conversation() {
    let store = Arc::new(InMemoryStore::default());
    let completion = Arc::new(ScriptedCompletion::ok("A fine pick."));
    let server = create_test_server(store, Some(completion));

    server.post("/api/v1/films").json(&alien()).await;

    let first: serde_json::Value = server
        .post("/api/v1/chat")
        .json(&json!({ "message": "something with spacecraft" }))
        .await
        .json();
    let session_id = first["session_id"].as_str().unwrap().to_string();

    let response = server
        .post("/api/v1/chat/reset")
        .json(&json!({ "session_id": session_id }))
        .await;
    response.assert_status_ok();
    let reset: serde_json::Value = response.json();
    assert_eq!(reset["turns"].as_array().unwrap().len(), 0);

    // The next message starts a fresh conversation under the same session
    let next: serde_json::Value = server
        .post("/api/v1/chat")
        .json(&json!({ "session_id": session_id, "message": "start over" }))
        .await
        .json();
    assert_eq!(next["turns"].as_array().unwrap().len(), 2);
}
