use std::sync::Arc;

use cinefile_api::api::{create_router, AppState};
use cinefile_api::config::Config;
use cinefile_api::services::providers::{AzureOpenAiClient, ChromaStore, CompletionClient};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = Config::from_env()?;

    // The store is the only persistence; without it there is nothing to serve.
    let store = ChromaStore::connect(&config.chroma_url, &config.chroma_collection)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to connect to Chroma at {}: {}", config.chroma_url, e))?;

    let completion: Option<Arc<dyn CompletionClient>> = match config.azure_openai() {
        Some(azure) => Some(Arc::new(AzureOpenAiClient::new(azure))),
        None => {
            tracing::warn!(
                "Azure OpenAI is not fully configured; chat recommendations are disabled"
            );
            None
        }
    };

    let state = AppState::new(Arc::new(store), completion);
    let app = create_router(state);

    let addr = format!("{}:{}", config.host, config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!(addr = %addr, "cinefile-api listening");
    axum::serve(listener, app).await?;

    Ok(())
}
