pub mod error;
pub mod i18n;

pub use error::{ApiError, ApiResult, ConfigError};
pub use i18n::{current_locale, parse_cookie_header, parse_quality_list, with_locale};
