use axum::{extract::State, http::StatusCode, Json};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::models::{ChatTurn, Conversation, Film, ImportSummary, SearchHit};
use crate::services;
use crate::services::search::DEFAULT_RESULT_COUNT;

use super::AppState;

/// Shown as the assistant turn when the completion service is not
/// configured; the chat surface itself stays up.
const NOT_CONFIGURED_MESSAGE: &str =
    "Azure OpenAI is not configured. Please add your Azure OpenAI configuration to the .env file.";

// Request/Response types

#[derive(Debug, Serialize)]
pub struct AddFilmResponse {
    pub id: String,
    pub film: Film,
}

#[derive(Debug, Serialize)]
pub struct FilmListResponse {
    pub films: Vec<Film>,
    pub total: usize,
}

#[derive(Debug, Deserialize)]
pub struct SearchRequest {
    pub query: String,
    pub limit: Option<usize>,
}

#[derive(Debug, Serialize)]
pub struct SearchResponse {
    pub results: Vec<SearchHit>,
}

#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    /// Omitted on the first message of a conversation; a fresh session is
    /// allocated and returned.
    pub session_id: Option<Uuid>,
    pub message: String,
}

#[derive(Debug, Serialize)]
pub struct ChatResponse {
    pub session_id: Uuid,
    pub reply: String,
    pub turns: Vec<ChatTurn>,
}

#[derive(Debug, Deserialize)]
pub struct ResetChatRequest {
    pub session_id: Uuid,
}

#[derive(Debug, Serialize)]
pub struct ResetChatResponse {
    pub session_id: Uuid,
    pub turns: Vec<ChatTurn>,
}

// Handlers

/// Health check endpoint
pub async fn health_check() -> (StatusCode, Json<Value>) {
    (StatusCode::OK, Json(json!({ "status": "healthy" })))
}

/// Add a single film to the catalog
pub async fn add_film(
    State(state): State<AppState>,
    Json(film): Json<Film>,
) -> AppResult<(StatusCode, Json<AddFilmResponse>)> {
    film.validate().map_err(AppError::InvalidInput)?;

    let id = state.store.insert(&film).await?;

    Ok((StatusCode::CREATED, Json(AddFilmResponse { id, film })))
}

/// List every film in the catalog
pub async fn list_films(State(state): State<AppState>) -> AppResult<Json<FilmListResponse>> {
    let films = state.store.fetch_all().await?;

    Ok(Json(FilmListResponse {
        total: films.len(),
        films,
    }))
}

/// Bulk import films from a JSON array
///
/// A payload that is not an array is rejected outright; anything else
/// returns 200 with a per-record summary, even when every record failed.
pub async fn import_films(
    State(state): State<AppState>,
    Json(payload): Json<Value>,
) -> AppResult<Json<ImportSummary>> {
    let summary = services::importer::import_films(state.store.as_ref(), &payload).await?;
    Ok(Json(summary))
}

/// Similarity search over the catalog
pub async fn search_films(
    State(state): State<AppState>,
    Json(request): Json<SearchRequest>,
) -> AppResult<Json<SearchResponse>> {
    let limit = request.limit.unwrap_or(DEFAULT_RESULT_COUNT);
    let results = services::search::search_films(state.store.as_ref(), &request.query, limit).await?;

    Ok(Json(SearchResponse { results }))
}

/// One chat turn: search the catalog, generate a recommendation, record
/// both sides of the exchange in the session's conversation.
///
/// The reply is always produced, whatever fails: missing completion
/// configuration, a search failure and a completion failure all become
/// displayable assistant text rather than an aborted turn.
pub async fn chat(
    State(state): State<AppState>,
    Json(request): Json<ChatRequest>,
) -> AppResult<Json<ChatResponse>> {
    if request.message.trim().is_empty() {
        return Err(AppError::InvalidInput(
            "Chat message cannot be empty".to_string(),
        ));
    }

    let session_id = request.session_id.unwrap_or_else(Uuid::new_v4);

    let reply = match &state.completion {
        None => NOT_CONFIGURED_MESSAGE.to_string(),
        Some(client) => {
            // Search must complete before the recommendation prompt is built
            match services::search::search_films(
                state.store.as_ref(),
                &request.message,
                DEFAULT_RESULT_COUNT,
            )
            .await
            {
                Ok(hits) => {
                    services::recommendation::recommend(client.as_ref(), &request.message, &hits)
                        .await
                }
                Err(e) => {
                    tracing::error!(session_id = %session_id, error = %e, "Search failed during chat");
                    format!("Error searching films: {}", e)
                }
            }
        }
    };

    let mut sessions = state.sessions.write().await;
    let conversation = sessions.entry(session_id).or_default();
    conversation.push_user(request.message.as_str());
    conversation.push_assistant(reply.as_str());
    let turns = conversation.turns.clone();

    Ok(Json(ChatResponse {
        session_id,
        reply,
        turns,
    }))
}

/// Start the session's conversation over with an empty turn sequence
pub async fn reset_chat(
    State(state): State<AppState>,
    Json(request): Json<ResetChatRequest>,
) -> Json<ResetChatResponse> {
    let mut sessions = state.sessions.write().await;
    sessions.insert(request.session_id, Conversation::new());

    tracing::info!(session_id = %request.session_id, "Conversation reset");

    Json(ResetChatResponse {
        session_id: request.session_id,
        turns: Vec::new(),
    })
}
