use async_trait::async_trait;

use crate::core::error::{ClipboardError, ProviderError};
use crate::core::types::{
    AdapterContext, ProviderCapabilities, ProviderId, ProviderRequest, ProviderResponse,
};

/// Capability contract for one provider family: turn a prompt into text.
///
/// Implementations own auth, request shape and response parsing. The runtime
/// picks an implementation from the catalog entry of the model being run.
#[async_trait]
pub trait TranslationProvider: Send + Sync {
    /// Stable provider identifier for routing and diagnostics.
    fn id(&self) -> ProviderId;

    /// Declares what the provider can do; checked by the runtime before dispatch.
    fn capabilities(&self) -> ProviderCapabilities;

    /// Executes a single request and returns the provider's text output.
    async fn translate(
        &self,
        req: &ProviderRequest,
        ctx: &AdapterContext,
    ) -> Result<ProviderResponse, ProviderError>;
}

/// Destination for the "copy results" action.
pub trait Clipboard: Send {
    fn write_text(&mut self, text: &str) -> Result<(), ClipboardError>;
}
