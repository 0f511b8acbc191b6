use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::fmt::Display;

/// Valid release-year range for catalog entries
pub const YEAR_MIN: i32 = 1900;
pub const YEAR_MAX: i32 = 2024;

/// Valid rating range
pub const RATING_MIN: f64 = 1.0;
pub const RATING_MAX: f64 = 10.0;

pub const DEFAULT_TIMESLOT: &str = "All Day";
pub const DEFAULT_RATING: f64 = 7.0;

/// A film record as stored in the catalog
///
/// `timeslot` and `rating` are optional on the wire and default to
/// "All Day" and 7. Well-known timeslot labels are "Morning (9:00-12:00)",
/// "Afternoon (12:00-17:00)", "Evening (17:00-21:00)", "Night (21:00-24:00)"
/// and "All Day", but free text is accepted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Film {
    pub title: String,
    pub genre: String,
    pub director: String,
    pub year: i32,
    pub description: String,
    #[serde(default = "default_timeslot")]
    pub timeslot: String,
    #[serde(default = "default_rating")]
    pub rating: f64,
}

fn default_timeslot() -> String {
    DEFAULT_TIMESLOT.to_string()
}

fn default_rating() -> f64 {
    DEFAULT_RATING
}

impl Film {
    /// Checks the year and rating domain invariants.
    ///
    /// Called before any write; a violation rejects the record without
    /// touching the store.
    pub fn validate(&self) -> Result<(), String> {
        if self.year < YEAR_MIN || self.year > YEAR_MAX {
            return Err(format!(
                "invalid year: {} (must be between {} and {})",
                self.year, YEAR_MIN, YEAR_MAX
            ));
        }
        if self.rating < RATING_MIN || self.rating > RATING_MAX {
            return Err(format!(
                "invalid rating: {} (must be between {} and {})",
                self.rating, RATING_MIN as i32, RATING_MAX as i32
            ));
        }
        Ok(())
    }

    /// Document text embedded by the vector store.
    ///
    /// This concatenation is the sole retrieval index; changing it changes
    /// what similarity search sees for every record inserted afterwards.
    pub fn embedding_text(&self) -> String {
        format!(
            "Title: {}. Genre: {}. Director: {}. Year: {}. Description: {}. Rating: {}/10",
            self.title, self.genre, self.director, self.year, self.description, self.rating
        )
    }

    /// Generates the storage key for this record.
    ///
    /// Title and year plus an insertion timestamp; duplicate titles and
    /// years produce distinct records.
    pub fn record_id(&self) -> String {
        format!("{}_{}_{}", self.title, self.year, Utc::now().timestamp_micros())
    }
}

/// One similarity-search match: a film and its cosine distance from the
/// query (smaller is more similar)
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SearchHit {
    pub film: Film,
    pub distance: f64,
}

/// A single rejected candidate from a bulk import
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ImportFailure {
    /// 1-based position of the candidate in the submitted array
    pub position: usize,
    pub title: Option<String>,
    pub reason: String,
}

impl Display for ImportFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.title {
            Some(title) => write!(f, "Film {} ({}): {}", self.position, title, self.reason),
            None => write!(f, "Film {}: {}", self.position, self.reason),
        }
    }
}

/// Outcome of a bulk import
///
/// Per-record failures are data, not errors: `succeeded + failed` always
/// equals the submitted batch length. Callers decide success from
/// `failed == 0`, never from rendered text.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ImportSummary {
    pub succeeded: usize,
    pub failed: usize,
    pub failures: Vec<ImportFailure>,
}

impl ImportSummary {
    pub fn record_success(&mut self) {
        self.succeeded += 1;
    }

    pub fn record_failure(&mut self, position: usize, title: Option<String>, reason: String) {
        self.failed += 1;
        self.failures.push(ImportFailure {
            position,
            title,
            reason,
        });
    }

    pub fn all_succeeded(&self) -> bool {
        self.failed == 0
    }
}

/// Speaker of one conversation turn
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    User,
    Assistant,
}

impl Display for ChatRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ChatRole::User => write!(f, "user"),
            ChatRole::Assistant => write!(f, "assistant"),
        }
    }
}

/// One turn of a conversation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatTurn {
    pub role: ChatRole,
    pub content: String,
}

/// An ordered conversation scoped to one session
///
/// Held in server state only; reset produces a fresh empty turn sequence.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Conversation {
    pub turns: Vec<ChatTurn>,
}

impl Conversation {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_user(&mut self, content: impl Into<String>) {
        self.turns.push(ChatTurn {
            role: ChatRole::User,
            content: content.into(),
        });
    }

    pub fn push_assistant(&mut self, content: impl Into<String>) {
        self.turns.push(ChatTurn {
            role: ChatRole::Assistant,
            content: content.into(),
        });
    }

    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }
}
