/// External service provider abstractions
///
/// The core orchestrates exactly two external services: a vector store
/// holding the film catalog and a hosted chat-completion model. Both sit
/// behind traits so the orchestration layer can be exercised against mocks
/// and so either backend can be swapped without touching callers.
use crate::{
    error::AppResult,
    models::{Film, SearchHit},
};

pub mod azure_openai;
pub mod chroma;

pub use azure_openai::AzureOpenAiClient;
pub use chroma::ChromaStore;

/// Persistent film catalog backed by a similarity index
///
/// The store derives an embedding from each record's document text at
/// insert time; that embedding is the only retrieval index. Records are
/// never updated or deleted.
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait FilmStore: Send + Sync {
    /// Writes one film plus its embedding document under a fresh key.
    ///
    /// Returns the generated key. A store failure leaves the record
    /// unsaved and is reported to the caller, never swallowed.
    async fn insert(&self, film: &Film) -> AppResult<String>;

    /// Returns every stored record's metadata, in store order.
    ///
    /// An empty catalog yields an empty vec, which is distinct from an
    /// error.
    async fn fetch_all(&self) -> AppResult<Vec<Film>>;

    /// Returns the top `limit` records nearest to `text` by cosine
    /// similarity, most similar first, with their distances.
    async fn query(&self, text: &str, limit: usize) -> AppResult<Vec<SearchHit>>;
}

/// Hosted chat-completion model
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait CompletionClient: Send + Sync {
    /// Requests one completion for a system instruction and user message.
    ///
    /// Returns the generated text verbatim.
    async fn complete(&self, system: &str, user: &str) -> AppResult<String>;
}
