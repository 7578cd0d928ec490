use anyhow::Context;
use serde::Deserialize;

/// Verification settings for tokens issued by the hosted auth backend.
#[derive(Debug, Clone, Deserialize)]
pub struct JwtConfig {
    pub secret: String,
    pub audience: String,
    pub issuer: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct S3Config {
    pub endpoint: String,
    pub bucket: String,
    pub access_key: String,
    pub secret_key: String,
    pub region: String,
}

/// Where the durable copy of the ledger lives.
#[derive(Debug, Clone, Deserialize)]
pub enum StorageConfig {
    Fs { dir: String },
    S3(S3Config),
}

#[derive(Debug, Clone, Deserialize)]
pub struct AssistantConfig {
    pub api_key: Option<String>,
    pub model: String,
    pub base_url: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub jwt: JwtConfig,
    pub storage: StorageConfig,
    pub ledger_key: String,
    pub assistant: AssistantConfig,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let jwt = JwtConfig {
            secret: std::env::var("JWT_SECRET").context("JWT_SECRET must be set")?,
            audience: std::env::var("JWT_AUDIENCE").unwrap_or_else(|_| "authenticated".into()),
            issuer: std::env::var("JWT_ISSUER").ok().filter(|v| !v.is_empty()),
        };

        let backend = std::env::var("STORAGE_BACKEND").unwrap_or_else(|_| "fs".into());
        let storage = match backend.as_str() {
            "fs" => StorageConfig::Fs {
                dir: std::env::var("STORAGE_DIR").unwrap_or_else(|_| "./data".into()),
            },
            "s3" => StorageConfig::S3(S3Config {
                endpoint: std::env::var("S3_ENDPOINT").context("S3_ENDPOINT must be set")?,
                bucket: std::env::var("S3_BUCKET").context("S3_BUCKET must be set")?,
                access_key: std::env::var("S3_ACCESS_KEY").context("S3_ACCESS_KEY must be set")?,
                secret_key: std::env::var("S3_SECRET_KEY").context("S3_SECRET_KEY must be set")?,
                region: std::env::var("S3_REGION").unwrap_or_else(|_| "us-east-1".into()),
            }),
            other => anyhow::bail!("unknown STORAGE_BACKEND {other:?} (expected fs or s3)"),
        };

        let assistant = AssistantConfig {
            api_key: std::env::var("OPENAI_API_KEY").ok().filter(|v| !v.is_empty()),
            model: std::env::var("OPENAI_MODEL").unwrap_or_else(|_| "gpt-4".into()),
            base_url: std::env::var("OPENAI_BASE_URL")
                .unwrap_or_else(|_| "https://api.openai.com/v1".into()),
        };

        Ok(Self {
            jwt,
            storage,
            ledger_key: std::env::var("LEDGER_KEY").unwrap_or_else(|_| "meals".into()),
            assistant,
        })
    }
}
