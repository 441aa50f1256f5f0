pub mod locale;

pub use locale::{
    AttrValue, CookieValue, LocaleSource, LookupDescriptor, RequestView, ResolutionOrder,
    ResolutionOutcome, ResolvedLocaleResponse, SupportedLocalesResponse,
};
