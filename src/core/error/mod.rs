use crate::core::types::ProviderId;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("missing required environment variable {name}")]
    MissingEnv { name: String },
    #[error("invalid value for {name}: {reason}")]
    InvalidValue { name: String, reason: String },
    #[error("invalid timeout: {timeout_ms} ms")]
    InvalidTimeout { timeout_ms: u64 },
    #[error("invalid model catalog: {reason}")]
    InvalidCatalog { reason: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RoutingError {
    #[error("provider not registered: {provider}")]
    ProviderNotRegistered { provider: ProviderId },
    #[error("model route not found: {model}")]
    ModelNotFound { model: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProviderError {
    #[error(
        "provider credentials rejected{context}: {message}",
        context = format_context(Some(.provider), .model.as_deref(), .request_id.as_deref(), None)
    )]
    CredentialsRejected {
        provider: ProviderId,
        model: Option<String>,
        request_id: Option<String>,
        message: String,
    },
    #[error(
        "provider transport error{context}: {message}",
        context = format_context(Some(.provider), .model.as_deref(), None, None)
    )]
    Transport {
        provider: ProviderId,
        model: Option<String>,
        message: String,
    },
    #[error(
        "provider status error{context}: {message}",
        context = format_context(
            Some(.provider),
            .model.as_deref(),
            .request_id.as_deref(),
            Some(*.status_code)
        )
    )]
    Status {
        provider: ProviderId,
        model: Option<String>,
        status_code: u16,
        request_id: Option<String>,
        message: String,
    },
    #[error(
        "provider protocol error{context}: {message}",
        context = format_context(Some(.provider), .model.as_deref(), .request_id.as_deref(), None)
    )]
    Protocol {
        provider: ProviderId,
        model: Option<String>,
        request_id: Option<String>,
        message: String,
    },
    #[error(
        "provider serialization error{context}: {message}",
        context = format_context(Some(.provider), .model.as_deref(), .request_id.as_deref(), None)
    )]
    Serialization {
        provider: ProviderId,
        model: Option<String>,
        request_id: Option<String>,
        message: String,
    },
    #[error(
        "unsupported language{context}: {language}",
        context = format_context(Some(.provider), .model.as_deref(), None, None)
    )]
    UnsupportedLanguage {
        provider: ProviderId,
        model: Option<String>,
        language: String,
    },
}

impl ProviderError {
    pub fn provider(&self) -> ProviderId {
        match self {
            Self::CredentialsRejected { provider, .. }
            | Self::Transport { provider, .. }
            | Self::Status { provider, .. }
            | Self::Protocol { provider, .. }
            | Self::Serialization { provider, .. }
            | Self::UnsupportedLanguage { provider, .. } => *provider,
        }
    }

    /// Moves 401/403 status errors into [`ProviderError::CredentialsRejected`].
    pub fn reject_credentials_on_auth_status(self) -> Self {
        match self {
            Self::Status {
                provider,
                model,
                status_code: 401 | 403,
                request_id,
                message,
            } => Self::CredentialsRejected {
                provider,
                model,
                request_id,
                message,
            },
            other => other,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RuntimeError {
    #[error(transparent)]
    RoutingError(#[from] RoutingError),
    #[error(transparent)]
    ProviderError(#[from] ProviderError),
    #[error("capability mismatch [provider={provider}, model={model}, capability={capability}]")]
    CapabilityMismatch {
        provider: ProviderId,
        model: String,
        capability: String,
    },
}

/// Failures talking to the translation record service.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RecordsError {
    #[error("record service transport error: {message}")]
    Transport { message: String },
    #[error("record service returned status {status_code}: {message}")]
    Status { status_code: u16, message: String },
    #[error("record service payload error: {message}")]
    Serialization { message: String },
}

#[derive(Debug, Error)]
pub enum ClipboardError {
    #[error("clipboard unavailable: {0}")]
    Unavailable(String),
    #[error("clipboard write failed: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("validation error: {message}")]
    Validation { message: String },
    #[error(transparent)]
    Runtime(#[from] RuntimeError),
    #[error(transparent)]
    Records(#[from] RecordsError),
    #[error("export file error: {0}")]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Clipboard(#[from] ClipboardError),
}

fn format_context(
    provider: Option<&ProviderId>,
    model: Option<&str>,
    request_id: Option<&str>,
    status_code: Option<u16>,
) -> String {
    let mut context = Vec::new();

    if let Some(provider) = provider {
        context.push(format!("provider={provider}"));
    }
    if let Some(model) = model {
        context.push(format!("model={model}"));
    }
    if let Some(request_id) = request_id {
        context.push(format!("request_id={request_id}"));
    }
    if let Some(status_code) = status_code {
        context.push(format!("status_code={status_code}"));
    }

    if context.is_empty() {
        String::new()
    } else {
        format!(" [{}]", context.join(", "))
    }
}
