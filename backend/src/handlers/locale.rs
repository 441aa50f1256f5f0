use axum::{Json, extract::State};
use std::sync::Arc;

use crate::AppState;
use crate::middleware::RequestLocale;
use crate::models::{ResolvedLocaleResponse, SupportedLocalesResponse};
use crate::utils::ApiResult;

// List supported locales and the default
pub async fn list_locales(
    State(state): State<Arc<AppState>>,
) -> ApiResult<Json<SupportedLocalesResponse>> {
    let service = &state.locale.service;
    tracing::debug!("Listing {} supported locales", service.get_supported_locales().len());

    Ok(Json(SupportedLocalesResponse {
        supported: service.get_supported_locales().to_vec(),
        default: service.get_default_locale().to_string(),
    }))
}

// Locale resolved for this request
pub async fn get_request_locale(
    RequestLocale(locale): RequestLocale,
) -> ApiResult<Json<ResolvedLocaleResponse>> {
    Ok(Json(ResolvedLocaleResponse { locale }))
}

pub async fn health() -> &'static str {
    "OK"
}
