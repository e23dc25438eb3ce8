use std::sync::Arc;

use tracing::{info, warn};

use crate::catalog::CatalogStore;
use crate::config::AppConfig;
use crate::error::AppError;
use crate::llm::{LlmClient, NoopLlmClient, OpenAiClient};
use crate::services::QueryService;

#[derive(Clone)]
pub struct AppState {
    pub catalog: Arc<CatalogStore>,
    pub query: Arc<QueryService>,
}

impl AppState {
    pub fn new(catalog: CatalogStore, llm: Arc<dyn LlmClient>, config: &AppConfig) -> Self {
        let catalog = Arc::new(catalog);
        let query = Arc::new(QueryService::new(catalog.clone(), llm, &config.llm));
        Self { catalog, query }
    }

    /// Loads the catalog and picks the language-model client the config allows.
    pub fn from_config(config: &AppConfig) -> Result<Self, AppError> {
        let catalog = CatalogStore::load(&config.catalog_path)?;

        let llm: Arc<dyn LlmClient> = if config.llm.is_enabled() {
            info!("Using language model {} at {}", config.llm.model, config.llm.base_url);
            Arc::new(OpenAiClient::new(config.llm.clone())?)
        } else {
            warn!("OPENAI_API_KEY is not set; filters come from text heuristics only");
            Arc::new(NoopLlmClient)
        };

        Ok(Self::new(catalog, llm, config))
    }
}
