// SPDX-License-Identifier: AGPL-3.0-or-later
//! Registry + configuration bundle carried by provider-backed handles

use std::fmt;
use std::sync::Arc;

use crate::config::ProviderFileConfig;
use crate::registry::ContentRegistry;

#[derive(Clone)]
pub struct ProviderContext {
    registry: Arc<dyn ContentRegistry>,
    config: Arc<ProviderFileConfig>,
}

impl ProviderContext {
    pub fn new(registry: Arc<dyn ContentRegistry>) -> Self {
        Self::with_config(registry, ProviderFileConfig::default())
    }

    pub fn with_config(registry: Arc<dyn ContentRegistry>, config: ProviderFileConfig) -> Self {
        Self {
            registry,
            config: Arc::new(config),
        }
    }

    pub fn registry(&self) -> &dyn ContentRegistry {
        self.registry.as_ref()
    }

    pub fn config(&self) -> &ProviderFileConfig {
        &self.config
    }

    pub fn shared_config(&self) -> Arc<ProviderFileConfig> {
        Arc::clone(&self.config)
    }
}

impl fmt::Debug for ProviderContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProviderContext")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}
