pub mod locale;

pub use locale::{
    LocaleCallback, LocaleCallbackFn, LocaleHooks, LocaleState, NamedMethods, RequestLocale,
    attach_locale_layer, locale_middleware, request_view,
};
