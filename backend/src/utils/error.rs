use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use rust_i18n::t;
use serde::Serialize;
use std::path::PathBuf;
use thiserror::Error;

use super::i18n::current_locale;

/// Start-up errors raised while building the locale service
///
/// Every variant is fatal: the service must not accept traffic without a usable locale set.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Unknown locale source '{0}' in resolution order (expected path, query, header or cookie)")]
    UnknownSource(String),

    #[error("Locale scan directory {} does not exist or is not a directory", .0.display())]
    ScanDirectoryMissing(PathBuf),

    #[error("Locale config file {} does not exist or is not a regular file", .0.display())]
    ConfigFileMissing(PathBuf),

    #[error("Failed to read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse locale config file {}: {message}", .path.display())]
    ConfigFileParse { path: PathBuf, message: String },

    #[error("No locales found")]
    NoLocalesFound,

    #[error("Default locale '{default}' is not one of the supported locales {supported:?}")]
    DefaultNotSupported { default: String, supported: Vec<String> },

    #[error("Locale callback method '{0}' is not registered")]
    UnknownCallback(String),
}

impl ConfigError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io { path: path.into(), source }
    }

    pub fn parse(path: impl Into<PathBuf>, message: impl std::fmt::Display) -> Self {
        Self::ConfigFileParse { path: path.into(), message: message.to_string() }
    }
}

/// API Error with rich context and automatic error trait implementations
#[derive(Error, Debug)]
pub enum ApiError {
    // Resource errors 3xxx
    #[error("No supported locale for request (requested: {requested:?})")]
    LocaleNotFound { requested: Option<String> },

    // System errors 5xxx
    #[error("Internal error: {0}")]
    InternalError(String),
}

impl ApiError {
    /// Helper to create locale rejection error
    pub fn locale_not_found(requested: Option<String>) -> Self {
        Self::LocaleNotFound { requested }
    }

    /// Helper to create internal error
    pub fn internal_error(message: impl Into<String>) -> Self {
        Self::InternalError(message.into())
    }

    pub fn error_code(&self) -> i32 {
        match self {
            Self::LocaleNotFound { .. } => 3001,
            Self::InternalError(_) => 5001,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ApiErrorResponse {
    pub code: i32,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl ApiError {
    /// Get localized error message based on the current request locale
    pub fn localized_message(&self) -> String {
        let locale = current_locale().unwrap_or_else(|| (*rust_i18n::locale()).to_string());
        match self {
            Self::LocaleNotFound { requested: Some(requested) } => {
                t!("locale.not_supported", locale = &locale, requested = requested).to_string()
            },
            Self::LocaleNotFound { requested: None } => {
                t!("locale.not_found", locale = &locale).to_string()
            },
            Self::InternalError(msg) => {
                t!("internal.error", locale = &locale, message = msg).to_string()
            },
        }
    }

    fn details(&self) -> Option<serde_json::Value> {
        match self {
            Self::LocaleNotFound { requested: Some(requested) } => {
                Some(serde_json::json!({ "requested": requested }))
            },
            _ => None,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let code = self.error_code();
        let message = self.localized_message();

        let status = match code {
            3000..=3999 => StatusCode::NOT_FOUND,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };

        if status.is_server_error() {
            tracing::error!("Request failed: {}", self);
        }

        let response = ApiErrorResponse { code, message, details: self.details() };

        (status, Json(response)).into_response()
    }
}

pub type ApiResult<T> = Result<T, ApiError>;
