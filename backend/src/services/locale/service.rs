use crate::config::LocaleConfig;
use crate::models::{RequestView, ResolutionOrder, ResolutionOutcome};
use crate::utils::ConfigError;

use super::key_chain::derive_order;
use super::registry::LocaleRegistry;
use super::resolver::{NoMatchPolicy, resolve};

/// Registry, order and policy bundled for per-request resolution
#[derive(Debug, Clone)]
pub struct LocaleService {
    registry: LocaleRegistry,
    order: ResolutionOrder,
    policy: NoMatchPolicy,
}

impl LocaleService {
    /// Validate the configuration and build everything resolution needs.
    ///
    /// The order is checked before the file system is touched.
    pub fn new(config: &LocaleConfig) -> Result<Self, ConfigError> {
        let order = derive_order(&config.order, &config.name_of)?;
        let registry = LocaleRegistry::build(config)?;
        let policy = NoMatchPolicy {
            reject_on_missing_path_locale: config.reject_on_missing_path_locale,
            strict: config.strict,
        };

        tracing::info!(
            "Locale service ready: order={:?}, strict={}, reject_on_missing_path_locale={}",
            config.order,
            policy.strict,
            policy.reject_on_missing_path_locale
        );

        Ok(Self::from_parts(registry, order, policy))
    }

    pub fn from_parts(registry: LocaleRegistry, order: ResolutionOrder, policy: NoMatchPolicy) -> Self {
        Self { registry, order, policy }
    }

    pub fn get_supported_locales(&self) -> &[String] {
        self.registry.supported()
    }

    pub fn get_default_locale(&self) -> &str {
        self.registry.default_locale()
    }

    pub fn order(&self) -> &ResolutionOrder {
        &self.order
    }

    pub fn resolve_for_request(&self, view: &RequestView) -> ResolutionOutcome {
        resolve(view, &self.order, &self.registry, self.policy)
    }

    /// Resolved locale, or the default when resolution would reject
    pub fn get_locale(&self, view: &RequestView) -> String {
        match self.resolve_for_request(view) {
            ResolutionOutcome::Resolved { locale, .. } => locale,
            ResolutionOutcome::DefaultApplied(locale) => locale,
            ResolutionOutcome::Rejected => self.registry.default_locale().to_string(),
        }
    }
}
