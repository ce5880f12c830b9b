use std::sync::Arc;

use crate::catalog;
use crate::core::error::RoutingError;
use crate::core::traits::TranslationProvider;
use crate::core::types::{ModelCatalog, ProviderId};

/// Provider implementations keyed by family, plus the catalog used to route
/// a model id to its family.
pub struct ProviderRegistry {
    providers: Vec<(ProviderId, Arc<dyn TranslationProvider>)>,
    catalog: ModelCatalog,
}

impl ProviderRegistry {
    pub fn new(catalog: ModelCatalog) -> Self {
        Self {
            providers: Vec::new(),
            catalog,
        }
    }

    /// Registers a provider, replacing any earlier one for the same family.
    pub fn register(&mut self, provider: Arc<dyn TranslationProvider>) {
        let id = provider.id();

        if let Some((_, existing)) = self
            .providers
            .iter_mut()
            .find(|(registered, _)| *registered == id)
        {
            *existing = provider;
            return;
        }

        self.providers.push((id, provider));
    }

    pub fn resolve_adapter(
        &self,
        provider: ProviderId,
    ) -> Result<Arc<dyn TranslationProvider>, RoutingError> {
        self.providers
            .iter()
            .find(|(registered, _)| *registered == provider)
            .map(|(_, adapter)| Arc::clone(adapter))
            .ok_or(RoutingError::ProviderNotRegistered { provider })
    }

    /// Routes a model id through the catalog and checks its family is registered.
    pub fn resolve_provider(&self, model_id: &str) -> Result<ProviderId, RoutingError> {
        let provider = catalog::resolve_model_provider(&self.catalog, model_id)?;
        self.resolve_adapter(provider)?;
        Ok(provider)
    }

    pub fn catalog(&self) -> &ModelCatalog {
        &self.catalog
    }
}

impl Default for ProviderRegistry {
    fn default() -> Self {
        Self::new(catalog::builtin_catalog())
    }
}
