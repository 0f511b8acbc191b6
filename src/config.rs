use serde::Deserialize;

/// Application configuration loaded from environment variables
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    /// Chroma server base URL
    #[serde(default = "default_chroma_url")]
    pub chroma_url: String,

    /// Chroma collection holding the film catalog
    #[serde(default = "default_chroma_collection")]
    pub chroma_collection: String,

    /// Azure OpenAI API key
    pub azure_openai_api_key: Option<String>,

    /// Azure OpenAI resource endpoint
    pub azure_openai_endpoint: Option<String>,

    /// Azure OpenAI API version
    pub azure_openai_api_version: Option<String>,

    /// Azure OpenAI deployment (model) name
    pub azure_openai_deployment_name: Option<String>,

    /// Server host address
    #[serde(default = "default_host")]
    pub host: String,

    /// Server port
    #[serde(default = "default_port")]
    pub port: u16,
}

/// Azure OpenAI connection settings, present only when fully configured
#[derive(Debug, Clone)]
pub struct AzureOpenAiConfig {
    pub api_key: String,
    pub endpoint: String,
    pub api_version: String,
    pub deployment_name: String,
}

fn default_chroma_url() -> String {
    "http://localhost:8000".to_string()
}

fn default_chroma_collection() -> String {
    "films".to_string()
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    3000
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        envy::from_env::<Config>().map_err(|e| anyhow::anyhow!("Failed to load config: {}", e))
    }

    /// Returns the Azure OpenAI settings if every required value is set.
    ///
    /// Any missing value disables the recommendation path; the rest of the
    /// API stays usable.
    pub fn azure_openai(&self) -> Option<AzureOpenAiConfig> {
        Some(AzureOpenAiConfig {
            api_key: self.azure_openai_api_key.clone()?,
            endpoint: self.azure_openai_endpoint.clone()?,
            api_version: self.azure_openai_api_version.clone()?,
            deployment_name: self.azure_openai_deployment_name.clone()?,
        })
    }
}
