/// Azure OpenAI chat-completion provider
///
/// Calls the deployment-scoped chat-completions endpoint with a fixed
/// generation profile: bounded output length and moderate randomness.
/// Credentials and addressing all come from environment configuration; if
/// any of them are missing this client is never constructed and the
/// recommendation path stays disabled.
use crate::{
    config::AzureOpenAiConfig,
    error::{AppError, AppResult},
    services::providers::CompletionClient,
};
use reqwest::Client as HttpClient;
use serde::Deserialize;
use serde_json::json;

const MAX_TOKENS: u32 = 500;
const TEMPERATURE: f32 = 0.7;

#[derive(Clone)]
pub struct AzureOpenAiClient {
    http_client: HttpClient,
    config: AzureOpenAiConfig,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}

#[derive(Debug, Deserialize)]
struct ChatMessage {
    content: Option<String>,
}

impl AzureOpenAiClient {
    pub fn new(config: AzureOpenAiConfig) -> Self {
        Self {
            http_client: HttpClient::new(),
            config,
        }
    }

    fn completions_url(&self) -> String {
        format!(
            "{}/openai/deployments/{}/chat/completions",
            self.config.endpoint.trim_end_matches('/'),
            self.config.deployment_name
        )
    }

    /// Pulls the generated text out of a completion response.
    fn extract_content(response: ChatCompletionResponse) -> AppResult<String> {
        response
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or_else(|| {
                AppError::Completion("completion response contained no message content".to_string())
            })
    }
}

#[async_trait::async_trait]
impl CompletionClient for AzureOpenAiClient {
    async fn complete(&self, system: &str, user: &str) -> AppResult<String> {
        let response = self
            .http_client
            .post(self.completions_url())
            .query(&[("api-version", self.config.api_version.as_str())])
            .header("api-key", &self.config.api_key)
            .json(&json!({
                "messages": [
                    { "role": "system", "content": system },
                    { "role": "user", "content": user },
                ],
                "max_tokens": MAX_TOKENS,
                "temperature": TEMPERATURE,
            }))
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::Completion(format!(
                "Azure OpenAI returned status {}: {}",
                status, body
            )));
        }

        let completion: ChatCompletionResponse = response.json().await?;
        let content = Self::extract_content(completion)?;

        tracing::info!(
            deployment = %self.config.deployment_name,
            response_chars = content.len(),
            "Completion received"
        );

        Ok(content)
    }
}
