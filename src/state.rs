use std::sync::Arc;

use crate::config::AppConfig;
use crate::goals::sessions::DialogueSessions;
use crate::store::{NutritionStore, SqliteStore};
use crate::vision::openai::OpenAiVision;
use crate::vision::VisionClient;

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn NutritionStore>,
    pub sessions: Arc<DialogueSessions>,
    pub vision: Arc<dyn VisionClient>,
    pub http: reqwest::Client,
    pub config: Arc<AppConfig>,
}

impl AppState {
    pub async fn init() -> anyhow::Result<Self> {
        let config = Arc::new(AppConfig::from_env()?);
        let pool = crate::db::connect(&config.database_url).await?;
        let store = Arc::new(SqliteStore::new(pool)) as Arc<dyn NutritionStore>;
        let http = reqwest::Client::new();
        let vision =
            Arc::new(OpenAiVision::new(&config.openai, http.clone())) as Arc<dyn VisionClient>;
        Ok(Self {
            store,
            sessions: Arc::new(DialogueSessions::new()),
            vision,
            http,
            config,
        })
    }

    pub fn from_parts(
        store: Arc<dyn NutritionStore>,
        vision: Arc<dyn VisionClient>,
        config: Arc<AppConfig>,
    ) -> Self {
        Self {
            store,
            sessions: Arc::new(DialogueSessions::new()),
            vision,
            http: reqwest::Client::new(),
            config,
        }
    }
}
