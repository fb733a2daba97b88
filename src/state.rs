use std::sync::Arc;

use crate::ai::AiClient;
use crate::config::AppConfig;
use crate::store::{self, HealthStore};

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn HealthStore>,
    pub ai: Arc<AiClient>,
    pub config: Arc<AppConfig>,
}

impl AppState {
    pub async fn init() -> anyhow::Result<Self> {
        let config = Arc::new(AppConfig::from_env()?);
        let store = store::init_store(&config).await?;
        let ai = Arc::new(AiClient::new(config.groq_api_key.clone()));
        Ok(Self { store, ai, config })
    }

    pub fn from_parts(
        store: Arc<dyn HealthStore>,
        ai: Arc<AiClient>,
        config: Arc<AppConfig>,
    ) -> Self {
        Self { store, ai, config }
    }
}
