//! Request-time locale resolution for axum services.
//!
//! A `LocaleService` is built once from `LocaleConfig`; the locale middleware
//! then resolves every request against it.

use axum::{Router, routing::get};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

rust_i18n::i18n!("locales", fallback = "en");

pub mod config;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod services;
pub mod utils;

#[cfg(test)]
mod tests;

use config::{HookPoint, LocaleConfig};
use middleware::{LocaleCallback, LocaleHooks, LocaleState, NamedMethods, attach_locale_layer};
use services::locale::LocaleService;
use utils::ConfigError;

pub struct AppState {
    pub locale: LocaleState,
    pub hook_point: HookPoint,
    pub path_param: String,
}

impl AppState {
    /// Build the locale service and hooks; any error must abort start-up
    pub fn new(
        config: &LocaleConfig,
        callback: Option<LocaleCallback>,
        methods: &NamedMethods,
    ) -> Result<Self, ConfigError> {
        let service = LocaleService::new(config)?;
        let hooks = LocaleHooks::from_config(&config.hooks, callback, methods)?;

        Ok(Self {
            locale: LocaleState::new(service, hooks),
            hook_point: config.hooks.event,
            path_param: config.name_of.path.clone(),
        })
    }
}

pub fn build_router(state: Arc<AppState>) -> Router {
    let localized_path = format!("/api/:{}/locale", state.path_param);

    let localized = Router::new()
        .route("/api/locales", get(handlers::locale::list_locales))
        .route("/api/locale", get(handlers::locale::get_request_locale))
        .route(&localized_path, get(handlers::locale::get_request_locale));
    let localized = attach_locale_layer(localized, state.locale.clone(), state.hook_point);

    localized
        .route("/health", get(handlers::locale::health))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
