pub mod locale;

pub use locale::{LocaleRegistry, LocaleService, NoMatchPolicy};
