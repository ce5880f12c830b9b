use serde_json::Value;

use crate::core::error::ProviderError;
use crate::core::types::{ProviderRequest, ProviderResponse};

/// Internal provider-layer translation contract.
///
/// `TranslationProvider` is the runtime-facing extension point (auth,
/// transport, capability declaration). This contract is crate-private and
/// keeps each family's wire shape separate from its I/O: a pure encoder from
/// the canonical request and a pure decoder back to canonical text.
pub(crate) trait ProviderTranslator {
    /// Provider protocol payload used for outbound request encoding.
    type RequestPayload;

    /// Encodes canonical request semantics into a provider protocol payload.
    fn encode_request(&self, req: &ProviderRequest) -> Result<Self::RequestPayload, ProviderError>;

    /// Decodes a provider response body into canonical response semantics.
    fn decode_response(&self, payload: &DecodeEnvelope) -> Result<ProviderResponse, ProviderError>;
}

/// Response body plus the model it was requested for.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct DecodeEnvelope {
    pub model: String,
    pub body: Value,
}
