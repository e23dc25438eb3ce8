use std::env;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use tracing::warn;

use crate::error::AppError;

const DEFAULT_BIND_ADDR: &str = "127.0.0.1:3000";
const DEFAULT_CATALOG_PATH: &str = "data/courses.json";
const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";
const DEFAULT_MODEL: &str = "gpt-3.5-turbo";
const DEFAULT_TIMEOUT_SECS: u64 = 10;
const DEFAULT_MAX_RETRIES: u32 = 1;

#[derive(Clone, Debug)]
pub struct LlmConfig {
    pub api_key: String,
    pub base_url: String,
    pub model: String,
    pub timeout: Duration,
    pub max_retries: u32,
}

impl LlmConfig {
    pub fn is_enabled(&self) -> bool {
        !self.api_key.trim().is_empty()
    }
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            base_url: DEFAULT_BASE_URL.to_string(),
            model: DEFAULT_MODEL.to_string(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            max_retries: DEFAULT_MAX_RETRIES,
        }
    }
}

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub bind_addr: SocketAddr,
    pub catalog_path: PathBuf,
    pub llm: LlmConfig,
}

impl AppConfig {
    pub fn new_from_env() -> Result<Self, AppError> {
        let bind_raw = env::var("BIND_ADDR").unwrap_or_else(|_| DEFAULT_BIND_ADDR.to_string());
        let bind_addr = parse_bind_addr(&bind_raw)?;

        let catalog_path = env::var("CATALOG_PATH")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from(DEFAULT_CATALOG_PATH));

        let llm = LlmConfig {
            api_key: env::var("OPENAI_API_KEY").unwrap_or_default(),
            base_url: env::var("OPENAI_BASE_URL").unwrap_or_else(|_| DEFAULT_BASE_URL.to_string()),
            model: env::var("LLM_MODEL").unwrap_or_else(|_| DEFAULT_MODEL.to_string()),
            timeout: Duration::from_secs(parse_or("LLM_TIMEOUT_SECS", DEFAULT_TIMEOUT_SECS)),
            max_retries: parse_or("LLM_MAX_RETRIES", DEFAULT_MAX_RETRIES),
        };

        Ok(Self {
            bind_addr,
            catalog_path,
            llm,
        })
    }
}

fn parse_bind_addr(raw: &str) -> Result<SocketAddr, AppError> {
    raw.trim()
        .parse::<SocketAddr>()
        .map_err(|_| AppError::Config(format!("BIND_ADDR is not a socket address: {}", raw)))
}

fn parse_or<T: FromStr + Copy + std::fmt::Display>(key: &str, default: T) -> T {
    match env::var(key) {
        Ok(raw) => raw.trim().parse().unwrap_or_else(|_| {
            warn!("{} has invalid value {:?}, using {}", key, raw, default);
            default
        }),
        Err(_) => default,
    }
}
