use async_trait::async_trait;
use serde_json::Value;

use super::translator_contract::{DecodeEnvelope, ProviderTranslator};
use super::{missing_api_key_error, normalize_base_url, protocol_error, resolve_api_key, sanitize_api_key};
use crate::core::error::{ConfigError, ProviderError};
use crate::core::traits::TranslationProvider;
use crate::core::types::{
    AdapterContext, Prompt, ProviderCapabilities, ProviderId, ProviderRequest, ProviderResponse,
};
use crate::transport::http::{CUSTOM_HEADER_PREFIX, DEFAULT_TIMEOUT_MS, HttpTransport};

const DEEPL_DEFAULT_BASE_URL: &str = "https://api-free.deepl.com";
pub const DEEPL_API_KEY_ENV: &str = "DEEPL_API_KEY";
const DEEPL_API_KEY_METADATA: &str = "deepl.api_key";
const DEEPL_DEFAULT_SOURCE_LANG: &str = "EN";

const DEEPL_LANGUAGE_CODES: &[(&str, &str)] = &[
    ("English", "EN"),
    ("Spanish", "ES"),
    ("French", "FR"),
    ("German", "DE"),
    ("Italian", "IT"),
    ("Dutch", "NL"),
    ("Russian", "RU"),
    ("Chinese (Simplified)", "ZH"),
    ("Japanese", "JA"),
    ("Portuguese", "PT"),
    ("Polish", "PL"),
];

/// Maps a display language name to its DeepL code. Matching ignores case and
/// surrounding whitespace.
pub fn deepl_language_code(language: &str) -> Option<&'static str> {
    let language = language.trim();
    DEEPL_LANGUAGE_CODES
        .iter()
        .find(|(name, _)| name.eq_ignore_ascii_case(language))
        .map(|(_, code)| *code)
}

/// DeepL `/v2/translate` client. Only plain translation prompts are accepted.
pub struct DeepLProvider {
    transport: HttpTransport,
    translator: DeepLTranslator,
    base_url: String,
    api_key: Option<String>,
}

impl DeepLProvider {
    pub fn new(api_key: Option<String>) -> Result<Self, ConfigError> {
        Self::with_base_url(api_key, DEEPL_DEFAULT_BASE_URL)
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
            translator: DeepLTranslator,
            base_url: normalize_base_url(base_url, DEEPL_DEFAULT_BASE_URL),
            api_key: sanitize_api_key(api_key),
        }
    }

    fn translate_url(&self) -> String {
        format!("{}/v2/translate", self.base_url)
    }
}

#[async_trait]
impl TranslationProvider for DeepLProvider {
    fn id(&self) -> ProviderId {
        ProviderId::Deepl
    }

    fn capabilities(&self) -> ProviderCapabilities {
        ProviderCapabilities {
            supports_questions: false,
        }
    }

    async fn translate(
        &self,
        req: &ProviderRequest,
        ctx: &AdapterContext,
    ) -> Result<ProviderResponse, ProviderError> {
        // Unsupported languages fail here, before any key lookup or network call.
        let fields = self.translator.encode_request(req)?;

        let api_key = resolve_api_key(
            self.api_key.as_ref(),
            ctx,
            DEEPL_API_KEY_METADATA,
            DEEPL_API_KEY_ENV,
        )
        .ok_or_else(|| {
            missing_api_key_error(
                ProviderId::Deepl,
                &req.model_id,
                "DeepL",
                DEEPL_API_KEY_METADATA,
                DEEPL_API_KEY_ENV,
            )
        })?;

        let mut request_ctx = ctx.clone();
        request_ctx.metadata.insert(
            format!("{CUSTOM_HEADER_PREFIX}authorization"),
            format!("DeepL-Auth-Key {api_key}"),
        );

        let response_body: Value = self
            .transport
            .post_form(
                ProviderId::Deepl,
                Some(req.model_id.as_str()),
                &self.translate_url(),
                &fields,
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
pub(crate) struct DeepLTranslator;

impl ProviderTranslator for DeepLTranslator {
    type RequestPayload = Vec<(&'static str, String)>;

    fn encode_request(&self, req: &ProviderRequest) -> Result<Self::RequestPayload, ProviderError> {
        let Prompt::Translate {
            text,
            target_language,
        } = &req.prompt
        else {
            return Err(protocol_error(
                ProviderId::Deepl,
                &req.model_id,
                "deepl only accepts translate prompts",
            ));
        };

        let target_lang = deepl_language_code(target_language).ok_or_else(|| {
            ProviderError::UnsupportedLanguage {
                provider: ProviderId::Deepl,
                model: Some(req.model_id.clone()),
                language: target_language.clone(),
            }
        })?;

        Ok(vec![
            ("text", text.clone()),
            ("source_lang", DEEPL_DEFAULT_SOURCE_LANG.to_string()),
            ("target_lang", target_lang.to_string()),
        ])
    }

    fn decode_response(&self, payload: &DecodeEnvelope) -> Result<ProviderResponse, ProviderError> {
        let model = payload.model.as_str();

        if let Some(message) = payload.body.get("message").and_then(Value::as_str) {
            return Err(protocol_error(
                ProviderId::Deepl,
                model,
                format!("deepl error: {message}"),
            ));
        }

        let text = payload
            .body
            .get("translations")
            .and_then(Value::as_array)
            .and_then(|translations| translations.first())
            .and_then(|translation| translation.get("text"))
            .and_then(Value::as_str)
            .ok_or_else(|| {
                protocol_error(
                    ProviderId::Deepl,
                    model,
                    "deepl response missing translations[0].text",
                )
            })?;

        Ok(ProviderResponse {
            provider: ProviderId::Deepl,
            model: model.to_string(),
            text: text.to_string(),
            raw_provider_response: Some(payload.body.clone()),
        })
    }
}
