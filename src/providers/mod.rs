pub mod deepl;
pub mod gemini;
pub mod openai;
pub(crate) mod translator_contract;

use crate::core::error::ProviderError;
use crate::core::types::{AdapterContext, ProviderId};

fn normalize_base_url(base_url: impl Into<String>, default_base_url: &str) -> String {
    let value = base_url.into();
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return default_base_url.to_string();
    }

    trimmed.trim_end_matches('/').to_string()
}

fn sanitize_api_key(api_key: Option<String>) -> Option<String> {
    api_key.and_then(|value| {
        let trimmed = value.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(trimmed.to_string())
        }
    })
}

/// Explicit key first, then adapter metadata, then the environment.
fn resolve_api_key(
    explicit: Option<&String>,
    ctx: &AdapterContext,
    metadata_key: &str,
    env_var: &str,
) -> Option<String> {
    if let Some(key) = explicit {
        return Some(key.clone());
    }

    if let Some(key) = ctx.metadata.get(metadata_key) {
        if !key.trim().is_empty() {
            return Some(key.trim().to_string());
        }
    }

    std::env::var(env_var)
        .ok()
        .and_then(|value| sanitize_api_key(Some(value)))
}

fn missing_api_key_error(
    provider: ProviderId,
    model: &str,
    label: &str,
    metadata_key: &str,
    env_var: &str,
) -> ProviderError {
    ProviderError::Protocol {
        provider,
        model: Some(model.to_string()),
        request_id: None,
        message: format!("missing {label} API key; set {metadata_key} metadata or {env_var} env var"),
    }
}

fn protocol_error(provider: ProviderId, model: &str, message: impl Into<String>) -> ProviderError {
    ProviderError::Protocol {
        provider,
        model: Some(model.to_string()),
        request_id: None,
        message: message.into(),
    }
}
