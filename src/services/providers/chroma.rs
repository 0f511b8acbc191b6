/// Chroma vector store provider
///
/// Speaks the Chroma REST API against one collection configured for cosine
/// similarity. The server derives embeddings from the document text we
/// hand it at insert and query time; this adapter never computes vectors
/// itself.
///
/// API flow:
/// 1. Connect: POST /api/v1/collections (get_or_create) → collection UUID
/// 2. Insert:  POST /api/v1/collections/{id}/add
/// 3. Fetch:   POST /api/v1/collections/{id}/get
/// 4. Query:   POST /api/v1/collections/{id}/query → nested result arrays,
///    one row per query text (we always send exactly one)
use crate::{
    error::{AppError, AppResult},
    models::{Film, SearchHit},
    services::providers::FilmStore,
};
use reqwest::Client as HttpClient;
use serde::Deserialize;
use serde_json::json;

#[derive(Clone)]
pub struct ChromaStore {
    http_client: HttpClient,
    base_url: String,
    collection_id: String,
}

/// Response to collection creation/lookup
#[derive(Debug, Deserialize)]
struct CollectionResponse {
    id: String,
    name: String,
}

/// Response to a get (fetch-all) call: flat parallel arrays
#[derive(Debug, Deserialize)]
struct GetResponse {
    #[serde(default)]
    metadatas: Vec<Option<serde_json::Value>>,
}

/// Response to a query call: arrays nested one level per query text
#[derive(Debug, Deserialize)]
struct QueryResponse {
    #[serde(default)]
    metadatas: Vec<Vec<Option<serde_json::Value>>>,
    #[serde(default)]
    distances: Vec<Vec<f64>>,
}

impl ChromaStore {
    /// Resolves the film collection, creating it with a cosine index if it
    /// does not exist yet.
    pub async fn connect(base_url: &str, collection: &str) -> AppResult<Self> {
        let base_url = base_url.trim_end_matches('/').to_string();
        let http_client = HttpClient::new();

        let url = format!("{}/api/v1/collections", base_url);
        let response = http_client
            .post(&url)
            .json(&json!({
                "name": collection,
                "metadata": { "hnsw:space": "cosine" },
                "get_or_create": true,
            }))
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::Store(format!(
                "Chroma returned status {} creating collection: {}",
                status, body
            )));
        }

        let collection: CollectionResponse = response.json().await?;

        tracing::info!(
            collection = %collection.name,
            collection_id = %collection.id,
            "Connected to Chroma collection"
        );

        Ok(Self {
            http_client,
            base_url,
            collection_id: collection.id,
        })
    }

    fn collection_url(&self, operation: &str) -> String {
        format!(
            "{}/api/v1/collections/{}/{}",
            self.base_url, self.collection_id, operation
        )
    }

    /// Flattens a get response into film metadata, skipping entries the
    /// store returned without metadata.
    fn films_from_get(response: GetResponse) -> Vec<Film> {
        response
            .metadatas
            .into_iter()
            .flatten()
            .filter_map(|metadata| serde_json::from_value::<Film>(metadata).ok())
            .collect()
    }

    /// Pairs the first query-result row of metadata with its distances,
    /// preserving the store's most-similar-first order.
    fn hits_from_query(response: QueryResponse) -> Vec<SearchHit> {
        let metadatas = response.metadatas.into_iter().next().unwrap_or_default();
        let distances = response.distances.into_iter().next().unwrap_or_default();

        metadatas
            .into_iter()
            .zip(distances)
            .filter_map(|(metadata, distance)| {
                let film = serde_json::from_value::<Film>(metadata?).ok()?;
                Some(SearchHit { film, distance })
            })
            .collect()
    }
}

#[async_trait::async_trait]
impl FilmStore for ChromaStore {
    async fn insert(&self, film: &Film) -> AppResult<String> {
        let record_id = film.record_id();
        let url = self.collection_url("add");

        let response = self
            .http_client
            .post(&url)
            .json(&json!({
                "ids": [record_id],
                "documents": [film.embedding_text()],
                "metadatas": [film],
            }))
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::Store(format!(
                "Chroma returned status {} on add: {}",
                status, body
            )));
        }

        tracing::info!(record_id = %record_id, title = %film.title, "Film added to store");

        Ok(record_id)
    }

    async fn fetch_all(&self) -> AppResult<Vec<Film>> {
        let url = self.collection_url("get");

        let response = self
            .http_client
            .post(&url)
            .json(&json!({ "include": ["metadatas"] }))
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::Store(format!(
                "Chroma returned status {} on get: {}",
                status, body
            )));
        }

        let get_response: GetResponse = response.json().await?;
        let films = Self::films_from_get(get_response);

        tracing::debug!(total = films.len(), "Fetched catalog from store");

        Ok(films)
    }

    async fn query(&self, text: &str, limit: usize) -> AppResult<Vec<SearchHit>> {
        let url = self.collection_url("query");

        let response = self
            .http_client
            .post(&url)
            .json(&json!({
                "query_texts": [text],
                "n_results": limit,
                "include": ["metadatas", "distances"],
            }))
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::Store(format!(
                "Chroma returned status {} on query: {}",
                status, body
            )));
        }

        let query_response: QueryResponse = response.json().await?;
        Ok(Self::hits_from_query(query_response))
    }
}
