//! Environment-driven settings for the CLI client and the record service.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use deadpool_diesel::postgres::{Manager, Pool};
use url::Url;

use crate::catalog::{builtin_catalog, parse_catalog_spec};
use crate::core::error::ConfigError;
use crate::core::types::ModelCatalog;
use crate::providers::deepl::{DEEPL_API_KEY_ENV, DeepLProvider};
use crate::providers::gemini::{GEMINI_API_KEY_ENV, GeminiProvider};
use crate::providers::openai::{OPENAI_API_KEY_ENV, OpenAiProvider};
use crate::records::RecordClient;
use crate::records::client::DEFAULT_RECORD_SERVICE_URL;
use crate::runtime::ProviderRuntime;
use crate::session::ComparisonSession;
use crate::transport::http::{DEFAULT_TIMEOUT_MS, HttpTransport};

pub const DEFAULT_SERVICE_PORT: u16 = 5000;
pub const DEFAULT_DATABASE_PORT: u16 = 5432;
pub const DEFAULT_POOL_SIZE: usize = 16;
pub const DEFAULT_WAIT_TIMEOUT_MS: u64 = 5_000;
pub const DEFAULT_IDLE_TIMEOUT_MS: u64 = 30_000;

/// Settings for the comparison client.
#[derive(Debug, Clone, PartialEq)]
pub struct ClientConfig {
    pub openai_api_key: Option<String>,
    pub gemini_api_key: Option<String>,
    pub deepl_api_key: Option<String>,
    pub openai_base_url: Option<String>,
    pub gemini_base_url: Option<String>,
    pub deepl_base_url: Option<String>,
    pub record_service_url: String,
    pub timeout_ms: u64,
    pub export_dir: PathBuf,
    pub catalog: ModelCatalog,
}

impl ClientConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Reads every setting through `lookup`. Blank values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| non_blank(lookup(name));

        let timeout_ms = match get("MODEL_COMPARE_TIMEOUT_MS") {
            Some(value) => parse_number("MODEL_COMPARE_TIMEOUT_MS", &value)?,
            None => DEFAULT_TIMEOUT_MS,
        };
        if timeout_ms == 0 {
            return Err(ConfigError::InvalidTimeout { timeout_ms });
        }

        let record_service_url = match get("RECORD_SERVICE_URL") {
            Some(value) => parse_url("RECORD_SERVICE_URL", &value)?,
            None => DEFAULT_RECORD_SERVICE_URL.to_string(),
        };

        let catalog = match get("MODEL_COMPARE_MODELS") {
            Some(spec) => parse_catalog_spec(&spec)?,
            None => builtin_catalog(),
        };
        if catalog.is_empty() {
            return Err(ConfigError::InvalidCatalog {
                reason: "MODEL_COMPARE_MODELS names no models".to_string(),
            });
        }

        Ok(Self {
            openai_api_key: get(OPENAI_API_KEY_ENV),
            gemini_api_key: get(GEMINI_API_KEY_ENV),
            deepl_api_key: get(DEEPL_API_KEY_ENV),
            openai_base_url: get("OPENAI_BASE_URL"),
            gemini_base_url: get("GEMINI_BASE_URL"),
            deepl_base_url: get("DEEPL_BASE_URL"),
            record_service_url,
            timeout_ms,
            export_dir: get("MODEL_COMPARE_EXPORT_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(".")),
            catalog,
        })
    }

    fn transport(&self) -> Result<HttpTransport, ConfigError> {
        HttpTransport::new(self.timeout_ms)
    }

    /// One provider per family, sharing the configured timeout.
    pub fn build_runtime(&self) -> Result<ProviderRuntime, ConfigError> {
        let openai = OpenAiProvider::with_transport(
            self.openai_api_key.clone(),
            self.openai_base_url.clone().unwrap_or_default(),
            self.transport()?,
        );
        let gemini = GeminiProvider::with_transport(
            self.gemini_api_key.clone(),
            self.gemini_base_url.clone().unwrap_or_default(),
            self.transport()?,
        );
        let deepl = DeepLProvider::with_transport(
            self.deepl_api_key.clone(),
            self.deepl_base_url.clone().unwrap_or_default(),
            self.transport()?,
        );

        Ok(ProviderRuntime::builder()
            .with_catalog(self.catalog.clone())
            .with_provider(Arc::new(openai))
            .with_provider(Arc::new(gemini))
            .with_provider(Arc::new(deepl))
            .build())
    }

    pub fn build_session(&self) -> Result<ComparisonSession, ConfigError> {
        let runtime = self.build_runtime()?;
        let records = RecordClient::new(self.record_service_url.clone(), self.timeout_ms)?;
        Ok(ComparisonSession::new(runtime, records))
    }
}

/// Settings for the record service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceConfig {
    pub database_url: String,
    pub port: u16,
    pub pool_size: usize,
    pub wait_timeout: Duration,
    pub idle_timeout: Duration,
}

impl ServiceConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// `DATABASE_URL` wins over the individual `DATABASE_*` parts.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| non_blank(lookup(name));
        let require = |name: &str| {
            get(name).ok_or_else(|| ConfigError::MissingEnv {
                name: name.to_string(),
            })
        };

        let database_url = match get("DATABASE_URL") {
            Some(value) => parse_url("DATABASE_URL", &value)?,
            None => {
                let port = match get("DATABASE_PORT") {
                    Some(value) => parse_number("DATABASE_PORT", &value)?,
                    None => DEFAULT_DATABASE_PORT,
                };
                database_url_from_parts(
                    &require("DATABASE_USER")?,
                    &require("DATABASE_PASSWORD")?,
                    &require("DATABASE_HOST")?,
                    port,
                    &require("DATABASE_NAME")?,
                )?
            }
        };

        let port = Self::port_from_lookup(&lookup)?;
        let pool_size = match get("DATABASE_POOL_SIZE") {
            Some(value) => parse_number("DATABASE_POOL_SIZE", &value)?,
            None => DEFAULT_POOL_SIZE,
        };
        if pool_size == 0 {
            return Err(ConfigError::InvalidValue {
                name: "DATABASE_POOL_SIZE".to_string(),
                reason: "must be at least 1".to_string(),
            });
        }

        let wait_timeout_ms = match get("DATABASE_WAIT_TIMEOUT_MS") {
            Some(value) => parse_number("DATABASE_WAIT_TIMEOUT_MS", &value)?,
            None => DEFAULT_WAIT_TIMEOUT_MS,
        };
        let idle_timeout_ms = match get("DATABASE_IDLE_TIMEOUT_MS") {
            Some(value) => parse_number("DATABASE_IDLE_TIMEOUT_MS", &value)?,
            None => DEFAULT_IDLE_TIMEOUT_MS,
        };
        for timeout_ms in [wait_timeout_ms, idle_timeout_ms] {
            if timeout_ms == 0 {
                return Err(ConfigError::InvalidTimeout { timeout_ms });
            }
        }

        Ok(Self {
            database_url,
            port,
            pool_size,
            wait_timeout: Duration::from_millis(wait_timeout_ms),
            idle_timeout: Duration::from_millis(idle_timeout_ms),
        })
    }

    pub fn port_from_env() -> Result<u16, ConfigError> {
        Self::port_from_lookup(|name| std::env::var(name).ok())
    }

    /// Reads only `PORT`, so a store without a database can still honour it.
    pub fn port_from_lookup<F>(lookup: F) -> Result<u16, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        match non_blank(lookup("PORT")) {
            Some(value) => parse_number("PORT", &value),
            None => Ok(DEFAULT_SERVICE_PORT),
        }
    }

    pub fn bind_address(&self) -> String {
        format!("0.0.0.0:{}", self.port)
    }

    /// Builds the connection pool. No connection is opened until first use.
    pub fn create_database_pool(&self) -> Result<Pool, ConfigError> {
        let manager = Manager::new(self.database_url.clone(), deadpool_diesel::Runtime::Tokio1);

        Pool::builder(manager)
            .max_size(self.pool_size)
            .wait_timeout(Some(self.wait_timeout))
            .runtime(deadpool_diesel::Runtime::Tokio1)
            .build()
            .map_err(|error| ConfigError::InvalidValue {
                name: "DATABASE_URL".to_string(),
                reason: error.to_string(),
            })
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

fn parse_number<T>(name: &str, value: &str) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    value.parse::<T>().map_err(|error| ConfigError::InvalidValue {
        name: name.to_string(),
        reason: format!("`{value}`: {error}"),
    })
}

fn parse_url(name: &str, value: &str) -> Result<String, ConfigError> {
    Url::parse(value)
        .map(|_| value.to_string())
        .map_err(|error| ConfigError::InvalidValue {
            name: name.to_string(),
            reason: format!("`{value}`: {error}"),
        })
}

fn database_url_from_parts(
    user: &str,
    password: &str,
    host: &str,
    port: u16,
    name: &str,
) -> Result<String, ConfigError> {
    let invalid = |field: &str, reason: String| ConfigError::InvalidValue {
        name: field.to_string(),
        reason,
    };

    let mut url = Url::parse(&format!("postgres://{host}"))
        .map_err(|error| invalid("DATABASE_HOST", error.to_string()))?;
    url.set_username(user)
        .map_err(|()| invalid("DATABASE_USER", "cannot be used in a URL".to_string()))?;
    url.set_password(Some(password))
        .map_err(|()| invalid("DATABASE_PASSWORD", "cannot be used in a URL".to_string()))?;
    url.set_port(Some(port))
        .map_err(|()| invalid("DATABASE_PORT", "cannot be used in a URL".to_string()))?;
    url.set_path(name);

    Ok(url.into())
}
