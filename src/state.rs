use crate::assistant::{self, MealAnalyzer, StaticAnalyzer};
use crate::config::{AppConfig, AssistantConfig, JwtConfig, StorageConfig};
use crate::ledger::MealLedger;
use crate::storage::{FsStorage, MemoryStorage, S3Storage, StorageClient};
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub ledger: Arc<MealLedger>,
    pub assistant: Arc<dyn MealAnalyzer>,
}

impl AppState {
    pub async fn init() -> anyhow::Result<Self> {
        let config = Arc::new(AppConfig::from_env()?);

        let storage: Arc<dyn StorageClient> = match &config.storage {
            StorageConfig::Fs { dir } => Arc::new(FsStorage::new(dir).await?),
            StorageConfig::S3(s3) => Arc::new(S3Storage::new(s3).await?),
        };
        let ledger = Arc::new(MealLedger::open(storage, config.ledger_key.clone()).await);
        let assistant = assistant::from_config(&config.assistant);

        Ok(Self {
            config,
            ledger,
            assistant,
        })
    }

    pub fn from_parts(
        config: Arc<AppConfig>,
        ledger: Arc<MealLedger>,
        assistant: Arc<dyn MealAnalyzer>,
    ) -> Self {
        Self {
            config,
            ledger,
            assistant,
        }
    }

    /// In-memory state for tests: memory-backed ledger, canned assistant,
    /// JWT secret `"test"` with audience `"authenticated"`.
    pub async fn fake(storage: Arc<MemoryStorage>, assistant_reply: &str) -> Self {
        let config = Arc::new(AppConfig {
            jwt: JwtConfig {
                secret: "test".into(),
                audience: "authenticated".into(),
                issuer: None,
            },
            storage: StorageConfig::Fs { dir: "unused".into() },
            ledger_key: "meals".into(),
            assistant: AssistantConfig {
                api_key: None,
                model: "gpt-4".into(),
                base_url: "http://localhost".into(),
            },
        });
        let ledger = Arc::new(MealLedger::open(storage, config.ledger_key.clone()).await);
        let assistant = Arc::new(StaticAnalyzer::new(assistant_reply)) as Arc<dyn MealAnalyzer>;
        Self::from_parts(config, ledger, assistant)
    }
}
