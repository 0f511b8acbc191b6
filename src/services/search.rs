use crate::{
    error::{AppError, AppResult},
    models::SearchHit,
    services::providers::FilmStore,
};

/// Result count used when the caller does not ask for one
pub const DEFAULT_RESULT_COUNT: usize = 5;

/// Similarity search over the film catalog
///
/// The store embeds the query in the same space as the stored documents
/// and returns the nearest records most-similar first. An empty catalog
/// yields an empty result set; only a store failure is an error, so
/// callers can tell "no matches" from "search failed".
pub async fn search_films(
    store: &dyn FilmStore,
    query: &str,
    limit: usize,
) -> AppResult<Vec<SearchHit>> {
    if query.trim().is_empty() {
        return Err(AppError::InvalidInput(
            "Search query cannot be empty".to_string(),
        ));
    }

    let hits = store.query(query, limit).await?;

    tracing::info!(query = %query, results = hits.len(), "Similarity search completed");

    Ok(hits)
}
