use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::RwLock;
use uuid::Uuid;

use crate::models::Conversation;
use crate::services::providers::{CompletionClient, FilmStore};

/// Shared application state
///
/// The film store is the only persistence; the completion client is absent
/// when Azure OpenAI is not fully configured, which disables the
/// recommendation path while the rest of the API stays usable.
/// Conversations live here per session, keyed by session ID.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn FilmStore>,
    pub completion: Option<Arc<dyn CompletionClient>>,
    pub sessions: Arc<RwLock<HashMap<Uuid, Conversation>>>,
}

impl AppState {
    /// Creates application state with no active sessions
    pub fn new(store: Arc<dyn FilmStore>, completion: Option<Arc<dyn CompletionClient>>) -> Self {
        Self {
            store,
            completion,
            sessions: Arc::new(RwLock::new(HashMap::new())),
        }
    }
}
