use crate::models::{LocaleSource, RequestView, ResolutionOrder, ResolutionOutcome};

use super::registry::LocaleRegistry;

/// What happens when no supported locale is found
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NoMatchPolicy {
    /// Reject when the unmatched candidates came from the path parameter
    pub reject_on_missing_path_locale: bool,
    /// Reject every unmatched request instead of applying the default
    pub strict: bool,
}

impl Default for NoMatchPolicy {
    fn default() -> Self {
        Self { reject_on_missing_path_locale: true, strict: false }
    }
}

impl NoMatchPolicy {
    fn apply(&self, source: Option<LocaleSource>, registry: &LocaleRegistry) -> ResolutionOutcome {
        let path_miss = source == Some(LocaleSource::Path) && self.reject_on_missing_path_locale;
        if path_miss || self.strict {
            ResolutionOutcome::Rejected
        } else {
            ResolutionOutcome::DefaultApplied(registry.default_locale().to_string())
        }
    }
}

/// Resolve the locale for one request.
///
/// Only the first source in `order` that carries a non-empty value is consulted.
/// If none of its candidates is supported the no-match policy applies; later
/// sources are never tried.
pub fn resolve(
    view: &RequestView,
    order: &ResolutionOrder,
    registry: &LocaleRegistry,
    policy: NoMatchPolicy,
) -> ResolutionOutcome {
    for descriptor in order.iter() {
        let Some(candidates) = view.candidates(descriptor) else {
            continue;
        };

        if let Some(locale) = candidates.into_iter().find(|c| registry.is_supported(c)) {
            return ResolutionOutcome::Resolved {
                locale: locale.to_string(),
                source: descriptor.source,
            };
        }

        tracing::debug!("No supported locale in {} '{}'", descriptor.source, descriptor.key);
        return policy.apply(Some(descriptor.source), registry);
    }

    // A routed but empty path parameter counts as a path miss
    let declared_path = order
        .iter()
        .any(|descriptor| view.declares_path_param(descriptor))
        .then_some(LocaleSource::Path);
    policy.apply(declared_path, registry)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::NameOf;
    use crate::models::{AttrValue, CookieValue};
    use crate::services::locale::key_chain::derive_order;
    use std::collections::HashMap;

    fn registry() -> LocaleRegistry {
        LocaleRegistry::new(vec!["en_US".to_string(), "tr_TR".to_string()], None).unwrap()
    }

    fn order(names: &[&str]) -> ResolutionOrder {
        let names: Vec<String> = names.iter().map(|s| s.to_string()).collect();
        derive_order(&names, &NameOf::default()).unwrap()
    }

    fn lang_cookie(value: &str) -> CookieValue {
        let mut inner = HashMap::new();
        inner.insert("lang".to_string(), AttrValue::from(value));
        CookieValue::Structured(inner)
    }

    const LENIENT: NoMatchPolicy = NoMatchPolicy { reject_on_missing_path_locale: true, strict: false };
    const STRICT: NoMatchPolicy = NoMatchPolicy { reject_on_missing_path_locale: true, strict: true };

    #[test]
    fn test_highest_priority_source_wins() {
        let view = RequestView::new()
            .with_query("lang", "en_US")
            .with_header("accept-language", "tr_TR");

        let outcome = resolve(&view, &order(&["header", "query"]), &registry(), LENIENT);
        assert_eq!(
            outcome,
            ResolutionOutcome::Resolved { locale: "tr_TR".to_string(), source: LocaleSource::Header }
        );

        let outcome = resolve(&view, &order(&["query", "header"]), &registry(), LENIENT);
        assert_eq!(
            outcome,
            ResolutionOutcome::Resolved { locale: "en_US".to_string(), source: LocaleSource::Query }
        );
    }

    #[test]
    fn test_first_supported_candidate_in_multi_value() {
        let view = RequestView::new().with_header("accept-language", vec!["fr_FR", "tr_TR", "en_US"]);
        let outcome = resolve(&view, &order(&["header"]), &registry(), LENIENT);
        assert_eq!(
            outcome,
            ResolutionOutcome::Resolved { locale: "tr_TR".to_string(), source: LocaleSource::Header }
        );
    }

    #[test]
    fn test_unsupported_non_path_source_applies_default() {
        let view = RequestView::new().with_query("lang", "fr_FR");
        let outcome = resolve(&view, &order(&["query"]), &registry(), LENIENT);
        assert_eq!(outcome, ResolutionOutcome::DefaultApplied("en_US".to_string()));
    }

    #[test]
    fn test_unsupported_path_source_rejects_regardless_of_strict() {
        let view = RequestView::new().with_path("lang", "fr_FR").with_query("lang", "en_US");
        for policy in [LENIENT, STRICT] {
            assert_eq!(
                resolve(&view, &order(&["path", "query"]), &registry(), policy),
                ResolutionOutcome::Rejected
            );
        }
    }

    #[test]
    fn test_path_rejection_can_be_disabled() {
        let view = RequestView::new().with_path("lang", "fr_FR");
        let policy = NoMatchPolicy { reject_on_missing_path_locale: false, strict: false };
        assert_eq!(
            resolve(&view, &order(&["path"]), &registry(), policy),
            ResolutionOutcome::DefaultApplied("en_US".to_string())
        );
    }

    #[test]
    fn test_strict_rejects_any_miss() {
        let view = RequestView::new().with_query("lang", "fr_FR");
        assert_eq!(
            resolve(&view, &order(&["query"]), &registry(), STRICT),
            ResolutionOutcome::Rejected
        );

        // No candidates at all
        assert_eq!(
            resolve(&RequestView::new(), &order(&["query", "header"]), &registry(), STRICT),
            ResolutionOutcome::Rejected
        );
    }

    #[test]
    fn test_no_fallthrough_after_first_non_empty_source() {
        let view = RequestView::new()
            .with_cookie("lang", lang_cookie("fr_FR"))
            .with_query("lang", "de_DE");
        let outcome = resolve(&view, &order(&["cookie", "query"]), &registry(), LENIENT);
        assert_eq!(outcome, ResolutionOutcome::DefaultApplied("en_US".to_string()));

        // Even when a later source would have matched
        let view = RequestView::new()
            .with_cookie("lang", lang_cookie("fr_FR"))
            .with_query("lang", "tr_TR");
        let outcome = resolve(&view, &order(&["cookie", "query"]), &registry(), LENIENT);
        assert_eq!(outcome, ResolutionOutcome::DefaultApplied("en_US".to_string()));
    }

    #[test]
    fn test_empty_values_are_skipped() {
        let view = RequestView::new()
            .with_query("lang", "")
            .with_cookie("lang", lang_cookie("tr_TR"));
        let outcome = resolve(&view, &order(&["query", "cookie"]), &registry(), LENIENT);
        assert_eq!(
            outcome,
            ResolutionOutcome::Resolved { locale: "tr_TR".to_string(), source: LocaleSource::Cookie }
        );
    }

    #[test]
    fn test_declared_empty_path_param_rejects() {
        let view = RequestView::new().with_path("lang", "");
        assert_eq!(
            resolve(&view, &order(&["path", "query"]), &registry(), LENIENT),
            ResolutionOutcome::Rejected
        );

        // Path not routed at all: plain default
        assert_eq!(
            resolve(&RequestView::new(), &order(&["path", "query"]), &registry(), LENIENT),
            ResolutionOutcome::DefaultApplied("en_US".to_string())
        );
    }

    #[test]
    fn test_exact_match_only() {
        let view = RequestView::new().with_query("lang", "en_us");
        assert_eq!(
            resolve(&view, &order(&["query"]), &registry(), LENIENT),
            ResolutionOutcome::DefaultApplied("en_US".to_string())
        );
    }

    #[test]
    fn test_resolution_is_idempotent() {
        let view = RequestView::new().with_header("accept-language", vec!["fr_FR", "tr_TR"]);
        let order = order(&["path", "cookie", "query", "header"]);
        let registry = registry();

        let first = resolve(&view, &order, &registry, LENIENT);
        let second = resolve(&view, &order, &registry, LENIENT);
        assert_eq!(first, second);
    }
}
