use async_trait::async_trait;
use serde_json::{Map, Value, json};

use super::translator_contract::{DecodeEnvelope, ProviderTranslator};
use super::{missing_api_key_error, normalize_base_url, protocol_error, resolve_api_key, sanitize_api_key};
use crate::core::error::{ConfigError, ProviderError};
use crate::core::traits::TranslationProvider;
use crate::core::types::{
    AdapterContext, Prompt, ProviderCapabilities, ProviderId, ProviderRequest, ProviderResponse,
};
use crate::transport::http::{CUSTOM_HEADER_PREFIX, DEFAULT_TIMEOUT_MS, HttpTransport};

const GEMINI_DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com";
pub const GEMINI_API_KEY_ENV: &str = "GOOGLE_API_KEY";
const GEMINI_API_KEY_METADATA: &str = "gemini.api_key";
const GEMINI_API_KEY_HEADER: &str = "x-goog-api-key";

/// `generateContent` client for the `gemini-*` models.
pub struct GeminiProvider {
    transport: HttpTransport,
    translator: GeminiTranslator,
    base_url: String,
    api_key: Option<String>,
}

impl GeminiProvider {
    pub fn new(api_key: Option<String>) -> Result<Self, ConfigError> {
        Self::with_base_url(api_key, GEMINI_DEFAULT_BASE_URL)
    }

    pub fn with_base_url(
        api_key: Option<String>,
        base_url: impl Into<String>,
    ) -> Result<Self, ConfigError> {
        let transport = HttpTransport::new(DEFAULT_TIMEOUT_MS)?;
        Ok(Self::with_transport(api_key, base_url, transport))
    }

    pub fn with_transport(
        api_key: Option<String>,
        base_url: impl Into<String>,
        transport: HttpTransport,
    ) -> Self {
        Self {
            transport,
            translator: GeminiTranslator,
            base_url: normalize_base_url(base_url, GEMINI_DEFAULT_BASE_URL),
            api_key: sanitize_api_key(api_key),
        }
    }

    fn generate_content_url(&self, model_id: &str) -> String {
        let model = model_id.strip_prefix("models/").unwrap_or(model_id);
        format!("{}/v1beta/models/{model}:generateContent", self.base_url)
    }
}

#[async_trait]
impl TranslationProvider for GeminiProvider {
    fn id(&self) -> ProviderId {
        ProviderId::Gemini
    }

    fn capabilities(&self) -> ProviderCapabilities {
        ProviderCapabilities {
            supports_questions: true,
        }
    }

    async fn translate(
        &self,
        req: &ProviderRequest,
        ctx: &AdapterContext,
    ) -> Result<ProviderResponse, ProviderError> {
        let api_key = resolve_api_key(
            self.api_key.as_ref(),
            ctx,
            GEMINI_API_KEY_METADATA,
            GEMINI_API_KEY_ENV,
        )
        .ok_or_else(|| {
            missing_api_key_error(
                ProviderId::Gemini,
                &req.model_id,
                "Google",
                GEMINI_API_KEY_METADATA,
                GEMINI_API_KEY_ENV,
            )
        })?;

        let body = self.translator.encode_request(req)?;

        let mut request_ctx = ctx.clone();
        request_ctx.metadata.insert(
            format!("{CUSTOM_HEADER_PREFIX}{GEMINI_API_KEY_HEADER}"),
            api_key,
        );

        let response_body: Value = self
            .transport
            .post_json(
                ProviderId::Gemini,
                Some(req.model_id.as_str()),
                &self.generate_content_url(&req.model_id),
                &body,
                &request_ctx,
            )
            .await
            .map_err(ProviderError::reject_credentials_on_auth_status)?;

        self.translator.decode_response(&DecodeEnvelope {
            model: req.model_id.clone(),
            body: response_body,
        })
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub(crate) struct GeminiTranslator;

impl ProviderTranslator for GeminiTranslator {
    type RequestPayload = Value;

    fn encode_request(&self, req: &ProviderRequest) -> Result<Self::RequestPayload, ProviderError> {
        if req.model_id.trim().is_empty() {
            return Err(protocol_error(ProviderId::Gemini, &req.model_id, "model id must not be empty"));
        }

        let text = match &req.prompt {
            Prompt::Single { text } => text.clone(),
            Prompt::Chat { .. } | Prompt::Translate { .. } => {
                return Err(protocol_error(
                    ProviderId::Gemini,
                    &req.model_id,
                    "generateContent requires a single prompt",
                ));
            }
        };

        let mut body = Map::new();
        body.insert(
            "contents".to_string(),
            json!([{ "role": "user", "parts": [{ "text": text }] }]),
        );

        let mut generation_config = Map::new();
        if let Some(temperature) = req.temperature {
            generation_config.insert("temperature".to_string(), json!(temperature));
        }
        if let Some(max_output_tokens) = req.max_output_tokens {
            generation_config.insert("maxOutputTokens".to_string(), json!(max_output_tokens));
        }
        if !generation_config.is_empty() {
            body.insert("generationConfig".to_string(), Value::Object(generation_config));
        }

        Ok(Value::Object(body))
    }

    fn decode_response(&self, payload: &DecodeEnvelope) -> Result<ProviderResponse, ProviderError> {
        let model = payload.model.as_str();
        let root = payload.body.as_object().ok_or_else(|| {
            protocol_error(ProviderId::Gemini, model, "gemini response payload must be a JSON object")
        })?;

        if let Some(error) = root.get("error").and_then(Value::as_object) {
            let message = error
                .get("message")
                .and_then(Value::as_str)
                .unwrap_or("unknown error");
            return Err(protocol_error(
                ProviderId::Gemini,
                model,
                format!("gemini error: {message}"),
            ));
        }

        let candidate = root
            .get("candidates")
            .and_then(Value::as_array)
            .and_then(|candidates| candidates.first());

        let Some(candidate) = candidate else {
            let block_reason = root
                .get("promptFeedback")
                .and_then(|feedback| feedback.get("blockReason"))
                .and_then(Value::as_str);
            let message = match block_reason {
                Some(reason) => format!("gemini prompt blocked: {reason}"),
                None => "gemini response has no candidates".to_string(),
            };
            return Err(protocol_error(ProviderId::Gemini, model, message));
        };

        // The SDK's `response.text()` joins every text part of the first candidate.
        let text = candidate
            .get("content")
            .and_then(|content| content.get("parts"))
            .and_then(Value::as_array)
            .map(|parts| {
                parts
                    .iter()
                    .filter_map(|part| part.get("text").and_then(Value::as_str))
                    .collect::<String>()
            })
            .unwrap_or_default();

        if text.is_empty() {
            let finish_reason = candidate
                .get("finishReason")
                .and_then(Value::as_str)
                .unwrap_or("UNKNOWN");
            return Err(protocol_error(
                ProviderId::Gemini,
                model,
                format!("gemini candidate has no text (finishReason={finish_reason})"),
            ));
        }

        Ok(ProviderResponse {
            provider: ProviderId::Gemini,
            model: root
                .get("modelVersion")
                .and_then(Value::as_str)
                .unwrap_or(model)
                .to_string(),
            text,
            raw_provider_response: Some(payload.body.clone()),
        })
    }
}

#[cfg(test)]
mod tests;
