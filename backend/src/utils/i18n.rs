//! Request-scoped locale storage and parsing of the raw header values
//! the resolver reads candidates from.

use std::collections::HashMap;
use std::future::Future;

use crate::models::{AttrValue, CookieValue};

// Task-local storage for the locale resolved for the current request
tokio::task_local! {
    static CURRENT_LOCALE: String;
}

/// Run `fut` with `locale` as the current request locale
pub async fn with_locale<F: Future>(locale: String, fut: F) -> F::Output {
    CURRENT_LOCALE.scope(locale, fut).await
}

/// Get the locale resolved for the current request, if inside a locale scope
pub fn current_locale() -> Option<String> {
    CURRENT_LOCALE.try_with(|l| l.clone()).ok()
}

/// Split a quality-weighted header value into candidates, highest weight first.
///
/// `fr;q=0.5, en_US, de;q=0` yields `["en_US", "fr"]`. Entries with `q=0`, a
/// non-finite weight and the `*` wildcard are dropped; equal weights keep header order.
pub fn parse_quality_list(value: &str) -> Vec<String> {
    let mut entries: Vec<(String, f32)> = value
        .split(',')
        .filter_map(|part| {
            let mut pieces = part.split(';');
            let tag = pieces.next()?.trim();
            if tag.is_empty() || tag == "*" {
                return None;
            }

            let quality = pieces
                .filter_map(|param| {
                    let (name, value) = param.split_once('=')?;
                    if name.trim().eq_ignore_ascii_case("q") {
                        value.trim().parse::<f32>().ok()
                    } else {
                        None
                    }
                })
                .next()
                .unwrap_or(1.0);

            if !quality.is_finite() || quality <= 0.0 {
                None
            } else {
                Some((tag.to_string(), quality))
            }
        })
        .collect();

    // sort_by is stable, ties keep header order
    entries.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));
    entries.into_iter().map(|(tag, _)| tag).collect()
}

/// Parse a `Cookie` header into cookie state.
///
/// Values are percent-decoded; a value holding a JSON object becomes a
/// structured cookie so a nested key can be read from it. The first
/// occurrence of a cookie name wins.
pub fn parse_cookie_header(header: &str) -> HashMap<String, CookieValue> {
    let mut cookies = HashMap::new();

    for pair in header.split(';') {
        let Some((name, raw)) = pair.split_once('=') else {
            continue;
        };
        let name = name.trim();
        if name.is_empty() || cookies.contains_key(name) {
            continue;
        }

        let raw = raw.trim().trim_matches('"');
        let decoded = match urlencoding::decode(raw) {
            Ok(decoded) => decoded.into_owned(),
            Err(_) => raw.to_string(),
        };

        cookies.insert(name.to_string(), cookie_value(decoded));
    }

    cookies
}

fn cookie_value(decoded: String) -> CookieValue {
    match serde_json::from_str::<serde_json::Value>(&decoded) {
        Ok(serde_json::Value::Object(map)) => {
            let inner = map
                .into_iter()
                .filter_map(|(key, value)| json_attr(value).map(|attr| (key, attr)))
                .collect();
            CookieValue::Structured(inner)
        },
        _ => CookieValue::Plain(decoded),
    }
}

fn json_attr(value: serde_json::Value) -> Option<AttrValue> {
    match value {
        serde_json::Value::String(s) => Some(AttrValue::Single(s)),
        serde_json::Value::Array(items) => {
            let values: Vec<String> = items
                .into_iter()
                .filter_map(|item| match item {
                    serde_json::Value::String(s) => Some(s),
                    _ => None,
                })
                .collect();
            Some(AttrValue::Multi(values))
        },
        _ => None,
    }
}
