use crate::{models::SearchHit, services::providers::CompletionClient};

/// Fixed instruction framing the model as a film-recommendation assistant
const SYSTEM_PROMPT: &str = "You are a helpful film recommendation assistant. \
    Based on the user's query and the available films, provide personalized \
    recommendations with explanations.";

/// Returned without any external call when search produced nothing
pub const NO_MATCHES_MESSAGE: &str =
    "I couldn't find any films matching your criteria. Please try a different search.";

/// Renders retrieved films into the prompt context block.
///
/// Films appear exactly in the order similarity search returned them; this
/// function never reorders.
pub fn build_context(hits: &[SearchHit]) -> String {
    let mut context = String::new();

    for (index, hit) in hits.iter().enumerate() {
        let film = &hit.film;
        context.push_str(&format!(
            "Film {}: {} ({}) - {}\n",
            index + 1,
            film.title,
            film.year,
            film.genre
        ));
        context.push_str(&format!("Director: {}\n", film.director));
        context.push_str(&format!("Description: {}\n", film.description));
        context.push_str(&format!("Rating: {}/10\n", film.rating));
        context.push_str(&format!("Available timeslot: {}\n\n", film.timeslot));
    }

    context
}

/// Generates a natural-language recommendation for the query from the
/// retrieved films.
///
/// Always returns displayable text: empty retrieval short-circuits to the
/// fixed no-matches message, and a completion failure becomes an error
/// string rather than a propagated fault, so the conversation records a
/// turn no matter what.
pub async fn recommend(client: &dyn CompletionClient, query: &str, hits: &[SearchHit]) -> String {
    if hits.is_empty() {
        return NO_MATCHES_MESSAGE.to_string();
    }

    let context = build_context(hits);
    let user_message = format!(
        "User query: {}\n\nAvailable films:\n{}\n\nPlease recommend the most \
         suitable films and explain why they match the user's preferences.",
        query, context
    );

    match client.complete(SYSTEM_PROMPT, &user_message).await {
        Ok(text) => text,
        Err(e) => {
            tracing::error!(error = %e, "Completion request failed");
            format!("Error getting AI recommendation: {}", e)
        }
    }
}
