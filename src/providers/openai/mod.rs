use async_trait::async_trait;
use serde_json::{Map, Value, json};

use super::translator_contract::{DecodeEnvelope, ProviderTranslator};
use super::{missing_api_key_error, normalize_base_url, protocol_error, resolve_api_key, sanitize_api_key};
use crate::core::error::{ConfigError, ProviderError};
use crate::core::traits::TranslationProvider;
use crate::core::types::{
    AdapterContext, Prompt, ProviderCapabilities, ProviderId, ProviderRequest, ProviderResponse,
};
use crate::transport::http::{AUTH_BEARER_TOKEN_KEY, DEFAULT_TIMEOUT_MS, HttpTransport};

const OPENAI_DEFAULT_BASE_URL: &str = "https://api.openai.com";
pub const OPENAI_API_KEY_ENV: &str = "OPENAI_API_KEY";
const OPENAI_API_KEY_METADATA: &str = "openai.api_key";

/// Chat Completions client for the `gpt-*` models.
pub struct OpenAiProvider {
    transport: HttpTransport,
    translator: OpenAiTranslator,
    base_url: String,
    api_key: Option<String>,
}

impl OpenAiProvider {
    pub fn new(api_key: Option<String>) -> Result<Self, ConfigError> {
        Self::with_base_url(api_key, OPENAI_DEFAULT_BASE_URL)
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
            translator: OpenAiTranslator,
            base_url: normalize_base_url(base_url, OPENAI_DEFAULT_BASE_URL),
            api_key: sanitize_api_key(api_key),
        }
    }

    fn chat_completions_url(&self) -> String {
        format!("{}/v1/chat/completions", self.base_url)
    }
}

#[async_trait]
impl TranslationProvider for OpenAiProvider {
    fn id(&self) -> ProviderId {
        ProviderId::Openai
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
            OPENAI_API_KEY_METADATA,
            OPENAI_API_KEY_ENV,
        )
        .ok_or_else(|| {
            missing_api_key_error(
                ProviderId::Openai,
                &req.model_id,
                "OpenAI",
                OPENAI_API_KEY_METADATA,
                OPENAI_API_KEY_ENV,
            )
        })?;

        let body = self.translator.encode_request(req)?;

        let mut request_ctx = ctx.clone();
        request_ctx
            .metadata
            .insert(AUTH_BEARER_TOKEN_KEY.to_string(), api_key);

        let response_body: Value = self
            .transport
            .post_json(
                ProviderId::Openai,
                Some(req.model_id.as_str()),
                &self.chat_completions_url(),
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
pub(crate) struct OpenAiTranslator;

impl ProviderTranslator for OpenAiTranslator {
    type RequestPayload = Value;

    fn encode_request(&self, req: &ProviderRequest) -> Result<Self::RequestPayload, ProviderError> {
        if req.model_id.trim().is_empty() {
            return Err(protocol_error(ProviderId::Openai, &req.model_id, "model id must not be empty"));
        }

        let messages = match &req.prompt {
            Prompt::Chat { system, user } => vec![
                json!({ "role": "system", "content": system }),
                json!({ "role": "user", "content": user }),
            ],
            Prompt::Single { text } => vec![json!({ "role": "user", "content": text })],
            Prompt::Translate { .. } => {
                return Err(protocol_error(
                    ProviderId::Openai,
                    &req.model_id,
                    "chat completions require a chat or single prompt",
                ));
            }
        };

        let mut body = Map::new();
        body.insert("model".to_string(), Value::String(req.model_id.clone()));
        body.insert("messages".to_string(), Value::Array(messages));
        if let Some(temperature) = req.temperature {
            body.insert("temperature".to_string(), json!(temperature));
        }
        if let Some(max_output_tokens) = req.max_output_tokens {
            body.insert("max_tokens".to_string(), json!(max_output_tokens));
        }

        Ok(Value::Object(body))
    }

    fn decode_response(&self, payload: &DecodeEnvelope) -> Result<ProviderResponse, ProviderError> {
        let model = payload.model.as_str();
        let root = payload.body.as_object().ok_or_else(|| {
            protocol_error(ProviderId::Openai, model, "openai response payload must be a JSON object")
        })?;

        if let Some(error) = root.get("error").and_then(Value::as_object) {
            let message = error
                .get("message")
                .and_then(Value::as_str)
                .unwrap_or("unknown error");
            let code = error.get("code").and_then(Value::as_str);
            let rendered = match code {
                Some(code) => format!("openai error ({code}): {message}"),
                None => format!("openai error: {message}"),
            };
            return Err(protocol_error(ProviderId::Openai, model, rendered));
        }

        let first_choice = root
            .get("choices")
            .and_then(Value::as_array)
            .and_then(|choices| choices.first())
            .ok_or_else(|| protocol_error(ProviderId::Openai, model, "openai response has no choices"))?;

        let message = first_choice.get("message");
        let content = message
            .and_then(|message| message.get("content"))
            .and_then(Value::as_str);

        let Some(content) = content else {
            if let Some(refusal) = message
                .and_then(|message| message.get("refusal"))
                .and_then(Value::as_str)
            {
                return Err(protocol_error(
                    ProviderId::Openai,
                    model,
                    format!("openai model refused: {refusal}"),
                ));
            }
            return Err(protocol_error(
                ProviderId::Openai,
                model,
                "openai response missing choices[0].message.content",
            ));
        };

        Ok(ProviderResponse {
            provider: ProviderId::Openai,
            model: root
                .get("model")
                .and_then(Value::as_str)
                .unwrap_or(model)
                .to_string(),
            text: content.trim().to_string(),
            raw_provider_response: Some(payload.body.clone()),
        })
    }
}
