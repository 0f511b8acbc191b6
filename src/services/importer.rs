use crate::{
    error::{AppError, AppResult},
    models::{Film, ImportSummary},
    services::providers::FilmStore,
};
use serde_json::Value;

const REQUIRED_FIELDS: [&str; 5] = ["title", "genre", "director", "year", "description"];

/// Imports a batch of film candidates from a parsed JSON document.
///
/// Only a structural problem (the payload not being an array) aborts the
/// import. Every candidate is processed independently: validation and
/// store failures are recorded against the candidate's position and the
/// loop continues, so one malformed record never sinks the batch.
pub async fn import_films(store: &dyn FilmStore, payload: &Value) -> AppResult<ImportSummary> {
    let candidates = payload.as_array().ok_or_else(|| {
        AppError::InvalidInput("import payload must be a JSON array of films".to_string())
    })?;

    let mut summary = ImportSummary::default();

    for (index, candidate) in candidates.iter().enumerate() {
        let position = index + 1;
        let title = candidate
            .get("title")
            .and_then(Value::as_str)
            .map(str::to_string);

        let film = match validate_candidate(candidate) {
            Ok(film) => film,
            Err(reason) => {
                summary.record_failure(position, title, reason);
                continue;
            }
        };

        match store.insert(&film).await {
            Ok(_) => summary.record_success(),
            Err(e) => {
                tracing::warn!(position, title = %film.title, error = %e, "Import insert failed");
                summary.record_failure(position, title, format!("database error: {}", e));
            }
        }
    }

    tracing::info!(
        total = candidates.len(),
        succeeded = summary.succeeded,
        failed = summary.failed,
        "Bulk import finished"
    );

    Ok(summary)
}

/// Validates one candidate into a film record.
///
/// Missing required fields are reported together; defaults for timeslot
/// and rating apply during deserialization; domain checks run last.
fn validate_candidate(candidate: &Value) -> Result<Film, String> {
    let object = candidate
        .as_object()
        .ok_or_else(|| "not a JSON object".to_string())?;

    let missing: Vec<&str> = REQUIRED_FIELDS
        .iter()
        .copied()
        .filter(|field| object.get(*field).map_or(true, Value::is_null))
        .collect();

    if !missing.is_empty() {
        return Err(format!("missing fields: {}", missing.join(", ")));
    }

    let film: Film = serde_json::from_value(candidate.clone())
        .map_err(|e| format!("malformed film object: {}", e))?;

    film.validate()?;

    Ok(film)
}
