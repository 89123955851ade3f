//! Provider registry and client resolution.
//!
//! The registry is assembled once at startup and is read-only afterwards, so it
//! can be shared behind an `Arc` by every request without locking.

use std::{collections::BTreeMap, sync::Arc};

use crate::{
    domain::ProviderName,
    errors::Error,
    messaging::port::{Acknowledger, CallbackNormalizer, ChatClient, ChatFilesClient},
    Result,
};

/// Every capability one provider offers.
#[derive(Clone)]
pub struct ProviderEntry {
    chat: Arc<dyn ChatClient>,
    files: Arc<dyn ChatFilesClient>,
    normalizer: Option<Arc<dyn CallbackNormalizer>>,
    acknowledger: Option<Arc<dyn Acknowledger>>,
}

impl ProviderEntry {
    pub fn new(chat: Arc<dyn ChatClient>, files: Arc<dyn ChatFilesClient>) -> Self {
        Self {
            chat,
            files,
            normalizer: None,
            acknowledger: None,
        }
    }

    /// Entry for an adapter that sends both text and files.
    pub fn from_client<C>(client: Arc<C>) -> Self
    where
        C: ChatClient + ChatFilesClient + 'static,
    {
        Self::new(client.clone(), client)
    }

    pub fn with_normalizer(mut self, normalizer: Arc<dyn CallbackNormalizer>) -> Self {
        self.normalizer = Some(normalizer);
        self
    }

    pub fn with_acknowledger(mut self, acknowledger: Arc<dyn Acknowledger>) -> Self {
        self.acknowledger = Some(acknowledger);
        self
    }
}

/// Collects provider entries before freezing them into a [`ProviderRegistry`].
#[derive(Default)]
pub struct RegistryBuilder {
    entries: BTreeMap<ProviderName, ProviderEntry>,
}

impl RegistryBuilder {
    /// Adds a provider. Names are normalized first; a collision with an existing
    /// entry is rejected rather than silently replacing it.
    pub fn register(mut self, provider: &str, entry: ProviderEntry) -> Result<Self> {
        let name = ProviderName::parse(provider)?;
        if self.entries.contains_key(&name) {
            return Err(Error::invalid_argument(format!(
                "provider '{name}' is already registered"
            )));
        }
        self.entries.insert(name, entry);
        Ok(self)
    }

    pub fn build(self) -> ProviderRegistry {
        ProviderRegistry {
            entries: self.entries,
        }
    }
}

/// Immutable map from normalized provider name to its capabilities.
pub struct ProviderRegistry {
    entries: BTreeMap<ProviderName, ProviderEntry>,
}

impl ProviderRegistry {
    pub fn builder() -> RegistryBuilder {
        RegistryBuilder::default()
    }

    /// Registered provider names, sorted.
    pub fn provider_names(&self) -> Vec<String> {
        self.entries.keys().map(|k| k.as_str().to_string()).collect()
    }

    pub fn resolve_chat_client(&self, provider: &str) -> Result<Arc<dyn ChatClient>> {
        self.entry(provider).map(|e| e.chat.clone())
    }

    pub fn resolve_chat_files_client(&self, provider: &str) -> Result<Arc<dyn ChatFilesClient>> {
        self.entry(provider).map(|e| e.files.clone())
    }

    /// Normalizer for an already-normalized name. Absence is not an error.
    pub fn normalizer(&self, provider: &ProviderName) -> Option<Arc<dyn CallbackNormalizer>> {
        self.entries
            .get(provider)
            .and_then(|e| e.normalizer.clone())
    }

    pub fn acknowledger(&self, provider: &ProviderName) -> Option<Arc<dyn Acknowledger>> {
        self.entries
            .get(provider)
            .and_then(|e| e.acknowledger.clone())
    }

    fn entry(&self, provider: &str) -> Result<&ProviderEntry> {
        let name = ProviderName::parse(provider)?;
        self.entries
            .get(&name)
            .ok_or_else(|| Error::UnknownProvider {
                provider: provider.to_string(),
                known: self.provider_names(),
            })
    }
}

impl std::fmt::Debug for ProviderRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProviderRegistry")
            .field("providers", &self.provider_names())
            .finish()
    }
}
