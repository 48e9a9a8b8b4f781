//! Provider Registry
//!
//! Resolves which provider backs a capability for a request and hands out the
//! corresponding client, building it through its `ProviderFactory` on first
//! use and caching it afterwards.
//!
//! Selection policy: explicit provider name, else the configured default for
//! the capability. Unknown, disabled or incapable providers resolve to
//! `NoProviderConfigured` without any network traffic.

pub mod factories;
pub mod factory;

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use tracing::{debug, info, warn};

use crate::config::AiConfig;
use crate::error::GenerationError;
use crate::traits::{
    ImageGenerationCapability, TextGenerationCapability, VideoGenerationCapability,
};
use crate::types::Capability;

pub use factories::{DoubaoProviderFactory, JimengProviderFactory, VectorEngineProviderFactory};
pub use factory::ProviderFactory;

type ClientCache<C> = Mutex<HashMap<String, Arc<C>>>;

/// Registry of provider factories plus per-capability client caches.
pub struct ProviderRegistry {
    factories: HashMap<String, Arc<dyn ProviderFactory>>,
    defaults: HashMap<Capability, String>,
    text_clients: ClientCache<dyn TextGenerationCapability>,
    image_clients: ClientCache<dyn ImageGenerationCapability>,
    video_clients: ClientCache<dyn VideoGenerationCapability>,
}

impl std::fmt::Debug for ProviderRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProviderRegistry")
            .field("providers", &self.providers())
            .field("defaults", &self.defaults)
            .finish()
    }
}

/// Builder for `ProviderRegistry`.
#[derive(Default)]
pub struct ProviderRegistryBuilder {
    factories: Vec<Arc<dyn ProviderFactory>>,
    defaults: HashMap<Capability, String>,
}

impl ProviderRegistryBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a provider factory.
    pub fn register<F: ProviderFactory + 'static>(self, factory: F) -> Self {
        self.register_arc(Arc::new(factory))
    }

    pub fn register_arc(mut self, factory: Arc<dyn ProviderFactory>) -> Self {
        self.factories.push(factory);
        self
    }

    /// Set the default provider for a capability. Blank names are ignored.
    pub fn default_provider(mut self, capability: Capability, name: impl Into<String>) -> Self {
        let name = name.into();
        let name = name.trim();
        if name.is_empty() {
            self.defaults.remove(&capability);
        } else {
            self.defaults.insert(capability, name.to_string());
        }
        self
    }

    /// Validate every enabled provider and build the registry.
    ///
    /// # Errors
    ///
    /// `ConfigurationError` for a duplicate provider name or for an enabled
    /// provider whose configuration is incomplete.
    pub fn build(self) -> Result<ProviderRegistry, GenerationError> {
        let mut factories: HashMap<String, Arc<dyn ProviderFactory>> = HashMap::new();
        for factory in self.factories {
            let id = factory.provider_id().into_owned();
            if factory.is_enabled() {
                factory.validate()?;
            }
            if factories.insert(id.clone(), factory).is_some() {
                return Err(GenerationError::ConfigurationError(format!(
                    "provider '{id}' registered more than once"
                )));
            }
        }

        for (capability, name) in &self.defaults {
            match factories.get(name) {
                None => warn!(
                    capability = %capability,
                    provider = %name,
                    "Default provider is not registered"
                ),
                Some(factory) if !factory.is_enabled() => warn!(
                    capability = %capability,
                    provider = %name,
                    "Default provider is disabled"
                ),
                Some(_) => {}
            }
        }

        let registry = ProviderRegistry {
            factories,
            defaults: self.defaults,
            text_clients: Mutex::new(HashMap::new()),
            image_clients: Mutex::new(HashMap::new()),
            video_clients: Mutex::new(HashMap::new()),
        };
        info!(
            providers = ?registry.providers(),
            enabled = ?registry.enabled_providers(),
            "Provider registry built"
        );
        Ok(registry)
    }
}

impl ProviderRegistry {
    pub fn builder() -> ProviderRegistryBuilder {
        ProviderRegistryBuilder::new()
    }

    /// Register the built-in providers and defaults from configuration.
    pub fn from_config(config: &AiConfig) -> Result<Self, GenerationError> {
        let mut builder = Self::builder()
            .register(VectorEngineProviderFactory::new(
                config.vectorengine.clone(),
                config.text.clone(),
            ))
            .register(JimengProviderFactory::new(config.image.jimeng_proxy.clone()))
            .register(DoubaoProviderFactory::new(
                config.doubao.clone(),
                config.video.clone(),
            ));

        for capability in Capability::ALL {
            if let Some(name) = config.default_provider(capability) {
                builder = builder.default_provider(capability, name);
            }
        }
        builder.build()
    }

    /// Registered provider names, sorted.
    pub fn providers(&self) -> Vec<String> {
        let mut names: Vec<String> = self.factories.keys().cloned().collect();
        names.sort();
        names
    }

    fn enabled_providers(&self) -> Vec<String> {
        let mut names: Vec<String> = self
            .factories
            .iter()
            .filter(|(_, f)| f.is_enabled())
            .map(|(name, _)| name.clone())
            .collect();
        names.sort();
        names
    }

    /// Configured default provider for a capability.
    pub fn default_provider(&self, capability: Capability) -> Option<&str> {
        self.defaults.get(&capability).map(String::as_str)
    }

    /// Pick the provider name that serves `capability`.
    pub fn resolve_provider_name(
        &self,
        capability: Capability,
        explicit: Option<&str>,
    ) -> Result<String, GenerationError> {
        self.resolve(capability, explicit)
            .map(|(name, _)| name.to_string())
    }

    fn resolve<'a>(
        &'a self,
        capability: Capability,
        explicit: Option<&'a str>,
    ) -> Result<(&'a str, &'a Arc<dyn ProviderFactory>), GenerationError> {
        let name = explicit
            .map(str::trim)
            .filter(|n| !n.is_empty())
            .or_else(|| self.default_provider(capability))
            .ok_or_else(|| {
                GenerationError::no_provider(
                    capability,
                    "no provider requested and no default configured",
                )
            })?;

        let factory = self.factories.get(name).ok_or_else(|| {
            GenerationError::no_provider(capability, format!("unknown provider '{name}'"))
        })?;
        if !factory.is_enabled() {
            return Err(GenerationError::no_provider(
                capability,
                format!("provider '{name}' is disabled"),
            ));
        }
        if !factory.capabilities().supports(capability) {
            return Err(GenerationError::no_provider(
                capability,
                format!("provider '{name}' does not support {capability} generation"),
            ));
        }
        Ok((name, factory))
    }

    /// Text client for the explicit provider or the configured default.
    pub fn text(
        &self,
        explicit: Option<&str>,
    ) -> Result<Arc<dyn TextGenerationCapability>, GenerationError> {
        let (name, factory) = self.resolve(Capability::Text, explicit)?;
        cached_or_build(&self.text_clients, Capability::Text, name, || {
            factory.text_client()
        })
    }

    /// Image client for the explicit provider or the configured default.
    pub fn image(
        &self,
        explicit: Option<&str>,
    ) -> Result<Arc<dyn ImageGenerationCapability>, GenerationError> {
        let (name, factory) = self.resolve(Capability::Image, explicit)?;
        cached_or_build(&self.image_clients, Capability::Image, name, || {
            factory.image_client()
        })
    }

    /// Video client for the explicit provider or the configured default.
    pub fn video(
        &self,
        explicit: Option<&str>,
    ) -> Result<Arc<dyn VideoGenerationCapability>, GenerationError> {
        let (name, factory) = self.resolve(Capability::Video, explicit)?;
        cached_or_build(&self.video_clients, Capability::Video, name, || {
            factory.video_client()
        })
    }
}

fn cached_or_build<C, F>(
    cache: &ClientCache<C>,
    capability: Capability,
    name: &str,
    build: F,
) -> Result<Arc<C>, GenerationError>
where
    C: ?Sized,
    F: FnOnce() -> Result<Arc<C>, GenerationError>,
{
    let poisoned = || GenerationError::InternalError("client cache lock poisoned".to_string());

    if let Some(client) = cache.lock().map_err(|_| poisoned())?.get(name) {
        return Ok(Arc::clone(client));
    }

    // Built outside the lock; a concurrent build for the same name loses.
    let client = build()?;
    let mut guard = cache.lock().map_err(|_| poisoned())?;
    let client = guard.entry(name.to_string()).or_insert(client);
    debug!(capability = %capability, provider = %name, "Client cached");
    Ok(Arc::clone(client))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{DoubaoConfig, JimengProxyConfig, VectorEngineConfig};
    use secrecy::SecretString;

    fn enabled_config() -> AiConfig {
        let mut config = AiConfig::default();
        config.vectorengine = VectorEngineConfig {
            enabled: true,
            base_url: "https://api.vectorengine.ai".to_string(),
            api_key: Some(SecretString::from("sk".to_string())),
            ..VectorEngineConfig::default()
        };
        config.image.jimeng_proxy = JimengProxyConfig {
            enabled: false,
            ..JimengProxyConfig::default()
        };
        config.doubao = DoubaoConfig {
            enabled: true,
            base_url: "https://ark.example.com".to_string(),
            api_key: Some(SecretString::from("ark".to_string())),
            model: "doubao-seedance-1-0-pro-250528".to_string(),
            ..DoubaoConfig::default()
        };
        config.default_text_provider = Some("vectorengine".to_string());
        config.default_video_provider = Some("doubao".to_string());
        config
    }

    #[test]
    fn explicit_name_overrides_default() {
        let registry = ProviderRegistry::from_config(&enabled_config()).unwrap();
        assert_eq!(
            registry.resolve_provider_name(Capability::Text, None).unwrap(),
            "vectorengine"
        );
        assert!(matches!(
            registry.resolve_provider_name(Capability::Text, Some("doubao")),
            Err(GenerationError::NoProviderConfigured { capability: Capability::Text, .. })
        ));
    }

    #[test]
    fn missing_default_is_reported_without_building() {
        let registry = ProviderRegistry::from_config(&enabled_config()).unwrap();
        let err = registry.image(None).err();
        assert!(matches!(
            err,
            Some(GenerationError::NoProviderConfigured { capability: Capability::Image, .. })
        ));
    }

    #[test]
    fn disabled_and_unknown_providers_are_not_selected() {
        let registry = ProviderRegistry::from_config(&enabled_config()).unwrap();
        let disabled = registry.image(Some("jimeng")).err().map(|e| e.to_string());
        assert!(disabled.is_some_and(|m| m.contains("disabled")));

        let unknown = registry.video(Some("sora")).err().map(|e| e.to_string());
        assert!(unknown.is_some_and(|m| m.contains("unknown provider 'sora'")));
    }

    #[test]
    fn enabled_provider_with_missing_base_url_fails_build() {
        let mut config = enabled_config();
        config.doubao.base_url = String::new();
        assert!(matches!(
            ProviderRegistry::from_config(&config),
            Err(GenerationError::ConfigurationError(msg)) if msg.contains("doubao")
        ));
    }

    #[test]
    fn disabled_provider_with_incomplete_config_builds() {
        let mut config = enabled_config();
        config.image.jimeng_proxy.base_url = String::new();
        let registry = ProviderRegistry::from_config(&config).unwrap();
        assert_eq!(registry.providers(), vec!["doubao", "jimeng", "vectorengine"]);
        assert_eq!(registry.default_provider(Capability::Video), Some("doubao"));
    }

    #[test]
    fn clients_are_cached_per_provider() {
        let registry = ProviderRegistry::from_config(&enabled_config()).unwrap();
        let first = registry.video(None).unwrap();
        let second = registry.video(Some("doubao")).unwrap();
        assert!(Arc::ptr_eq(&first, &second));
    }

    #[test]
    fn duplicate_registration_is_rejected() {
        let result = ProviderRegistry::builder()
            .register(JimengProviderFactory::new(JimengProxyConfig::default()))
            .register(JimengProviderFactory::new(JimengProxyConfig::default()))
            .build();
        assert!(matches!(result, Err(GenerationError::ConfigurationError(_))));
    }
}
