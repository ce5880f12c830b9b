use std::sync::Arc;

use tracing::debug;

use crate::catalog;
use crate::core::error::RuntimeError;
use crate::core::traits::TranslationProvider;
use crate::core::types::{AdapterContext, Classification, ModelCatalog, ProviderResponse};
use crate::prompt::PromptTemplate;
use crate::registry::ProviderRegistry;

pub struct ProviderRuntime {
    registry: ProviderRegistry,
    adapter_context: AdapterContext,
}

pub struct ProviderRuntimeBuilder {
    providers: Vec<Arc<dyn TranslationProvider>>,
    catalog: ModelCatalog,
    adapter_context: AdapterContext,
}

impl ProviderRuntime {
    pub fn builder() -> ProviderRuntimeBuilder {
        ProviderRuntimeBuilder {
            providers: Vec::new(),
            catalog: catalog::builtin_catalog(),
            adapter_context: AdapterContext::default(),
        }
    }

    pub fn catalog(&self) -> &ModelCatalog {
        self.registry.catalog()
    }

    /// Runs one model on the form input using its family's prompt template.
    ///
    /// A question routed to a provider that only translates fails with
    /// [`RuntimeError::CapabilityMismatch`] before any request is built.
    pub async fn translate(
        &self,
        model_id: &str,
        message: &str,
        language: &str,
        classification: Classification,
    ) -> Result<ProviderResponse, RuntimeError> {
        let provider = self.registry.resolve_provider(model_id)?;
        let adapter = self.registry.resolve_adapter(provider)?;

        if !classification.is_translation() && !adapter.capabilities().supports_questions {
            return Err(RuntimeError::CapabilityMismatch {
                provider,
                model: model_id.to_string(),
                capability: "questions".to_string(),
            });
        }

        let request = PromptTemplate::for_provider(provider).build_request(
            model_id,
            message,
            language,
            classification,
        );

        debug!(%provider, model = model_id, %classification, "dispatching translation");
        let response = adapter.translate(&request, &self.adapter_context).await?;

        Ok(response)
    }
}

impl ProviderRuntimeBuilder {
    pub fn with_provider(mut self, provider: Arc<dyn TranslationProvider>) -> Self {
        self.providers.push(provider);
        self
    }

    pub fn with_catalog(mut self, catalog: ModelCatalog) -> Self {
        self.catalog = catalog;
        self
    }

    pub fn with_adapter_context(mut self, adapter_context: AdapterContext) -> Self {
        self.adapter_context = adapter_context;
        self
    }

    pub fn build(self) -> ProviderRuntime {
        let mut registry = ProviderRegistry::new(self.catalog);
        for provider in self.providers {
            registry.register(provider);
        }

        ProviderRuntime {
            registry,
            adapter_context: self.adapter_context,
        }
    }
}
