//! Configuration management for pdf-pager

use std::env;
use std::path::PathBuf;
use std::str::FromStr;

use serde::Deserialize;
use tokio::time::Duration;

use crate::document::{PipelineConfig, DEFAULT_DERIVE_TIMEOUT_SECS, DEFAULT_PAGE_CACHE_CAPACITY};

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub server: ServerConfig,
    pub document: DocumentConfig,
    pub http: HttpConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DocumentConfig {
    pub path: PathBuf,
    pub page_cache_capacity: usize,
    pub derive_timeout_secs: u64,
    pub warm_up: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct HttpConfig {
    pub environment: Environment,
    pub request_timeout_ms: u64,
    pub static_dir: Option<PathBuf>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    Development,
    Production,
}

impl Environment {
    fn parse(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "production" | "prod" => Environment::Production,
            _ => Environment::Development,
        }
    }

    pub fn is_production(&self) -> bool {
        matches!(self, Environment::Production)
    }

    /// `Cache-Control` for page artifacts
    pub fn page_cache_control(&self) -> &'static str {
        match self {
            Environment::Production => "public, max-age=31536000, immutable",
            Environment::Development => "no-cache",
        }
    }

    /// `Cache-Control` for the whole-document stream
    pub fn stream_cache_control(&self) -> &'static str {
        match self {
            Environment::Production => "public, max-age=31536000, immutable",
            Environment::Development => "no-store",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    Pretty,
    Json,
}

impl LogFormat {
    fn parse(value: Option<&str>) -> Self {
        match value.map(|v| v.trim().to_ascii_lowercase()).as_deref() {
            Some("json") => LogFormat::Json,
            _ => LogFormat::Pretty,
        }
    }

    /// Read `LOG_FORMAT`; logging starts before the rest of the config is parsed
    pub fn from_env() -> Self {
        Self::parse(env::var("LOG_FORMAT").ok().as_deref())
    }
}

impl Default for Config {
    fn default() -> Self {
        Config {
            server: ServerConfig {
                host: "0.0.0.0".to_string(),
                port: 3000,
            },
            document: DocumentConfig {
                path: PathBuf::from("assets/document.pdf"),
                page_cache_capacity: DEFAULT_PAGE_CACHE_CAPACITY,
                derive_timeout_secs: DEFAULT_DERIVE_TIMEOUT_SECS,
                warm_up: true,
            },
            http: HttpConfig {
                environment: Environment::Development,
                request_timeout_ms: 15_000,
                static_dir: None,
            },
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build a config from an arbitrary variable source
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Config::default();
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        Config {
            server: ServerConfig {
                host: var("SERVER_HOST").unwrap_or(defaults.server.host),
                port: parse_or(
                    "SERVER_PORT",
                    var("SERVER_PORT").or_else(|| var("PORT")),
                    defaults.server.port,
                ),
            },
            document: DocumentConfig {
                path: var("PDF_PATH")
                    .map(PathBuf::from)
                    .unwrap_or(defaults.document.path),
                page_cache_capacity: parse_or(
                    "PAGE_CACHE_CAPACITY",
                    var("PAGE_CACHE_CAPACITY"),
                    defaults.document.page_cache_capacity,
                ),
                derive_timeout_secs: parse_or(
                    "DERIVE_TIMEOUT_SECS",
                    var("DERIVE_TIMEOUT_SECS"),
                    defaults.document.derive_timeout_secs,
                ),
                warm_up: parse_or("WARM_UP", var("WARM_UP"), defaults.document.warm_up),
            },
            http: HttpConfig {
                environment: var("APP_ENV")
                    .or_else(|| var("NODE_ENV"))
                    .map(|v| Environment::parse(&v))
                    .unwrap_or(defaults.http.environment),
                request_timeout_ms: parse_or(
                    "REQUEST_TIMEOUT_MS",
                    var("REQUEST_TIMEOUT_MS"),
                    defaults.http.request_timeout_ms,
                ),
                static_dir: var("STATIC_DIR").map(PathBuf::from),
            },
        }
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.http.request_timeout_ms)
    }

    pub fn pipeline(&self) -> PipelineConfig {
        PipelineConfig {
            page_cache_capacity: self.document.page_cache_capacity,
            derive_timeout: Duration::from_secs(self.document.derive_timeout_secs),
        }
    }
}

fn parse_or<T: FromStr>(key: &str, value: Option<String>, default: T) -> T {
    match value {
        Some(raw) => raw.trim().parse().unwrap_or_else(|_| {
            tracing::warn!("Invalid value {:?} for {}, using default", raw, key);
            default
        }),
        None => default,
    }
}
