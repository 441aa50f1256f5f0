//! Locale resolution middleware
//!
//! Projects the request onto a `RequestView`, resolves its locale and either
//! rejects it with 404 or exposes the locale to the rest of the request.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use axum::{
    Router,
    extract::{FromRequestParts, Query, RawPathParams, Request, State},
    http::{header::COOKIE, request::Parts},
    middleware::{Next, from_fn_with_state},
    response::Response,
};

use crate::config::{HookPoint, HooksConfig};
use crate::models::{AttrValue, RequestView, ResolutionOrder, ResolutionOutcome};
use crate::services::locale::LocaleService;
use crate::utils::{ApiError, ConfigError, parse_cookie_header, parse_quality_list, with_locale};

/// Function invoked with the resolved locale before the handler runs
pub type LocaleCallbackFn = Arc<dyn Fn(&mut Request, &str) + Send + Sync>;

/// Callback as configured: a function, or the name of a host-registered method
#[derive(Clone)]
pub enum LocaleCallback {
    InvokeFunction(LocaleCallbackFn),
    InvokeNamedMethod(String),
}

/// Methods the host exposes by name to `hooks.callback`
#[derive(Clone, Default)]
pub struct NamedMethods(HashMap<String, LocaleCallbackFn>);

impl NamedMethods {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register<F>(mut self, name: impl Into<String>, method: F) -> Self
    where
        F: Fn(&mut Request, &str) + Send + Sync + 'static,
    {
        self.0.insert(name.into(), Arc::new(method));
        self
    }

    fn get(&self, name: &str) -> Option<LocaleCallbackFn> {
        self.0.get(name).cloned()
    }
}

/// Zero-argument accessor for the resolved locale, stored in request extensions
/// and usable as an extractor in handlers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestLocale(pub String);

#[async_trait]
impl<S> FromRequestParts<S> for RequestLocale
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<RequestLocale>()
            .cloned()
            .ok_or_else(|| ApiError::internal_error("Locale accessor is not attached to this request"))
    }
}

/// Post-resolution hooks, with any named callback already looked up
#[derive(Clone)]
pub struct LocaleHooks {
    accessor: bool,
    create_if_missing: bool,
    callback: Option<LocaleCallbackFn>,
}

impl fmt::Debug for LocaleHooks {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LocaleHooks")
            .field("accessor", &self.accessor)
            .field("create_if_missing", &self.create_if_missing)
            .field("callback", &self.callback.is_some())
            .finish()
    }
}

impl LocaleHooks {
    /// Resolve hooks once at start-up.
    ///
    /// An explicit `callback` takes precedence over `config.callback`; a
    /// method name that is not in `methods` is a configuration error.
    pub fn from_config(
        config: &HooksConfig,
        callback: Option<LocaleCallback>,
        methods: &NamedMethods,
    ) -> Result<Self, ConfigError> {
        let callback = callback.or_else(|| config.callback.clone().map(LocaleCallback::InvokeNamedMethod));

        let callback = match callback {
            Some(LocaleCallback::InvokeFunction(f)) => Some(f),
            Some(LocaleCallback::InvokeNamedMethod(name)) => {
                Some(methods.get(&name).ok_or(ConfigError::UnknownCallback(name))?)
            },
            None => None,
        };

        Ok(Self { accessor: config.accessor, create_if_missing: config.create_if_missing, callback })
    }

    fn apply(&self, req: &mut Request, locale: &str) {
        if self.accessor {
            let present = req.extensions().get::<RequestLocale>().is_some();
            match (present, self.create_if_missing) {
                (false, true) | (true, false) => {
                    req.extensions_mut().insert(RequestLocale(locale.to_string()));
                },
                (true, true) => {
                    tracing::debug!("Request already carries a locale accessor, leaving it in place");
                },
                (false, false) => {},
            }
        }

        if let Some(callback) = &self.callback {
            callback(req, locale);
        }
    }
}

/// State shared by every invocation of the middleware
#[derive(Clone, Debug)]
pub struct LocaleState {
    pub service: Arc<LocaleService>,
    pub hooks: Arc<LocaleHooks>,
}

impl LocaleState {
    pub fn new(service: LocaleService, hooks: LocaleHooks) -> Self {
        Self { service: Arc::new(service), hooks: Arc::new(hooks) }
    }
}

/// Middleware resolving the request locale
pub async fn locale_middleware(
    State(state): State<LocaleState>,
    path_params: Option<RawPathParams>,
    mut req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let order = state.service.order();
    let view = request_view(&req, path_params.as_ref(), order);

    let locale = match state.service.resolve_for_request(&view) {
        ResolutionOutcome::Resolved { locale, source } => {
            tracing::debug!("Resolved locale {} from {} for {}", locale, source, req.uri());
            locale
        },
        ResolutionOutcome::DefaultApplied(locale) => {
            tracing::debug!("Applied default locale {} for {}", locale, req.uri());
            locale
        },
        ResolutionOutcome::Rejected => {
            let requested = first_candidate(&view, order);
            tracing::warn!("Rejecting {}: unsupported locale {:?}", req.uri(), requested);
            return Err(ApiError::locale_not_found(requested));
        },
    };

    state.hooks.apply(&mut req, &locale);

    Ok(with_locale(locale, next.run(req)).await)
}

/// Install the locale middleware on `router` at the configured lifecycle point.
///
/// `OnRequest` covers every request including unmatched ones; `OnPreHandler`
/// only runs for requests that matched a route. Path parameters of a matched
/// route are visible at either point.
pub fn attach_locale_layer<S>(router: Router<S>, state: LocaleState, event: HookPoint) -> Router<S>
where
    S: Clone + Send + Sync + 'static,
{
    match event {
        HookPoint::OnRequest => router.layer(from_fn_with_state(state, locale_middleware)),
        HookPoint::OnPreHandler => router.route_layer(from_fn_with_state(state, locale_middleware)),
    }
}

/// Build the resolver's view of an axum request.
///
/// Only headers named in `order` are collected; each value is split as a
/// quality-weighted list.
pub fn request_view(
    req: &Request,
    path_params: Option<&RawPathParams>,
    order: &ResolutionOrder,
) -> RequestView {
    let mut view = RequestView::new();

    if let Some(params) = path_params {
        for (key, value) in params.iter() {
            view.path.insert(key.to_string(), AttrValue::from(value));
        }
    }

    match Query::<Vec<(String, String)>>::try_from_uri(req.uri()) {
        Ok(Query(pairs)) => {
            for (key, value) in pairs {
                match view.query.get_mut(&key) {
                    Some(existing) => existing.push(value),
                    None => {
                        view.query.insert(key, AttrValue::Single(value));
                    },
                }
            }
        },
        Err(e) => tracing::debug!("Ignoring malformed query string: {}", e),
    }

    for name in order.header_keys() {
        let values: Vec<String> = req
            .headers()
            .get_all(name)
            .iter()
            .filter_map(|value| value.to_str().ok())
            .flat_map(parse_quality_list)
            .collect();
        if !values.is_empty() {
            view.headers.insert(name.to_string(), AttrValue::Multi(values));
        }
    }

    for header in req.headers().get_all(COOKIE).iter() {
        if let Ok(header) = header.to_str() {
            for (name, value) in parse_cookie_header(header) {
                view.cookies.entry(name).or_insert(value);
            }
        }
    }

    view
}

fn first_candidate(view: &RequestView, order: &ResolutionOrder) -> Option<String> {
    order
        .iter()
        .find_map(|descriptor| view.candidates(descriptor))
        .and_then(|candidates| candidates.first().map(|c| c.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::NameOf;
    use crate::models::LocaleSource;
    use crate::services::locale::derive_order;
    use axum::body::Body;

    fn default_order() -> ResolutionOrder {
        let names: Vec<String> =
            ["path", "cookie", "query", "header"].iter().map(|s| s.to_string()).collect();
        derive_order(&names, &NameOf::default()).unwrap()
    }

    #[test]
    fn test_request_view_collects_sources() {
        let req = Request::builder()
            .uri("/items?lang=tr_TR&lang=en_US&page=2")
            .header("Accept-Language", "fr;q=0.4, de_DE")
            .header("Cookie", "theme=dark; lang=%7B%22lang%22%3A%22ja_JP%22%7D")
            .body(Body::empty())
            .unwrap();

        let view = request_view(&req, None, &default_order());

        assert_eq!(view.query.get("lang"), Some(&AttrValue::from(vec!["tr_TR", "en_US"])));
        assert_eq!(view.query.get("page"), Some(&AttrValue::from("2")));
        assert_eq!(view.headers.get("accept-language"), Some(&AttrValue::from(vec!["de_DE", "fr"])));
        assert!(view.path.is_empty());

        let cookie = crate::models::LookupDescriptor::nested(LocaleSource::Cookie, "lang", "lang");
        assert_eq!(view.candidates(&cookie), Some(vec!["ja_JP"]));
    }

    #[test]
    fn test_unreferenced_headers_are_ignored() {
        let req = Request::builder()
            .uri("/")
            .header("X-Locale", "tr_TR")
            .body(Body::empty())
            .unwrap();

        let view = request_view(&req, None, &default_order());
        assert!(view.headers.is_empty());
    }

    #[test]
    fn test_unknown_named_callback_fails() {
        let config = HooksConfig { callback: Some("setLocale".to_string()), ..HooksConfig::default() };
        let result = LocaleHooks::from_config(&config, None, &NamedMethods::new());
        assert!(matches!(result, Err(ConfigError::UnknownCallback(name)) if name == "setLocale"));
    }

    #[test]
    fn test_named_callback_is_resolved() {
        let config = HooksConfig { callback: Some("setLocale".to_string()), ..HooksConfig::default() };
        let methods = NamedMethods::new().register("setLocale", |_req: &mut Request, _locale: &str| {});
        let hooks = LocaleHooks::from_config(&config, None, &methods).unwrap();
        assert!(hooks.callback.is_some());
    }

    #[test]
    fn test_accessor_guard() {
        let mut req = Request::new(Body::empty());
        req.extensions_mut().insert(RequestLocale("host".to_string()));

        let creating = LocaleHooks { accessor: true, create_if_missing: true, callback: None };
        creating.apply(&mut req, "tr_TR");
        assert_eq!(req.extensions().get::<RequestLocale>(), Some(&RequestLocale("host".to_string())));

        let updating = LocaleHooks { accessor: true, create_if_missing: false, callback: None };
        updating.apply(&mut req, "tr_TR");
        assert_eq!(req.extensions().get::<RequestLocale>(), Some(&RequestLocale("tr_TR".to_string())));

        let mut bare = Request::new(Body::empty());
        updating.apply(&mut bare, "tr_TR");
        assert!(bare.extensions().get::<RequestLocale>().is_none());
    }
}
