use crate::core::error::{ConfigError, RoutingError};
use crate::core::types::{ModelCatalog, ModelInfo, ProviderId};

const BUILTIN_MODELS: &[(ProviderId, &str)] = &[
    (ProviderId::Openai, "gpt-3.5-turbo"),
    (ProviderId::Openai, "gpt-4"),
    (ProviderId::Openai, "gpt-4-turbo"),
    (ProviderId::Gemini, "gemini-1.5-pro-001"),
    (ProviderId::Gemini, "gemini-1.5-flash-001"),
    (ProviderId::Gemini, "gemini-1.5-pro-002"),
    (ProviderId::Gemini, "gemini-1.5-flash-002"),
    (ProviderId::Deepl, "deepl"),
];

/// The eight models compared by default, in generation order.
pub fn builtin_catalog() -> ModelCatalog {
    ModelCatalog {
        models: BUILTIN_MODELS
            .iter()
            .map(|(provider, model_id)| ModelInfo {
                provider: *provider,
                model_id: (*model_id).to_string(),
            })
            .collect(),
    }
}

pub fn resolve_model_provider(
    catalog: &ModelCatalog,
    model_id: &str,
) -> Result<ProviderId, RoutingError> {
    catalog
        .models
        .iter()
        .find(|model| model.model_id == model_id)
        .map(|model| model.provider)
        .ok_or_else(|| RoutingError::ModelNotFound {
            model: model_id.to_string(),
        })
}

/// Parses a `family:model` list such as `openai:gpt-4,deepl:deepl`.
///
/// Entry order is kept. A repeated model id keeps its first entry.
pub fn parse_catalog_spec(spec: &str) -> Result<ModelCatalog, ConfigError> {
    let mut models: Vec<ModelInfo> = Vec::new();

    for entry in spec.split(',').map(str::trim).filter(|entry| !entry.is_empty()) {
        let (family, model_id) = entry.split_once(':').ok_or_else(|| ConfigError::InvalidCatalog {
            reason: format!("entry `{entry}` must look like family:model"),
        })?;

        let provider = ProviderId::parse(family).ok_or_else(|| ConfigError::InvalidCatalog {
            reason: format!("unknown provider family `{}`", family.trim()),
        })?;

        let model_id = model_id.trim();
        if model_id.is_empty() {
            return Err(ConfigError::InvalidCatalog {
                reason: format!("entry `{entry}` has an empty model id"),
            });
        }

        if models.iter().any(|model| model.model_id == model_id) {
            continue;
        }

        models.push(ModelInfo {
            provider,
            model_id: model_id.to_string(),
        });
    }

    if models.is_empty() {
        return Err(ConfigError::InvalidCatalog {
            reason: "catalog must name at least one model".to_string(),
        });
    }

    Ok(ModelCatalog { models })
}
