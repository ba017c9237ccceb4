//! Header name canonicalization.
//!
//! Request headers are stored under `Dash-Separated-Capitalized` names no
//! matter how they arrived (`content-type` from hyper, `CONTENT_TYPE` from a CGI
//! style environment).

use std::collections::BTreeMap;

use axum::http::HeaderMap;

/// Canonicalize a header name: `x_forwarded-FOR` → `X-Forwarded-For`.
pub fn canonical_header_name(name: &str) -> String {
    name.trim()
        .split(['-', '_'])
        .map(capitalize)
        .collect::<Vec<_>>()
        .join("-")
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first
            .to_uppercase()
            .chain(chars.flat_map(char::to_lowercase))
            .collect(),
        None => String::new(),
    }
}

/// Collect a header map under canonical names.
///
/// Repeated headers are joined with `", "`. Values that are not visible ASCII
/// are skipped.
pub fn collect_headers(headers: &HeaderMap) -> BTreeMap<String, String> {
    let mut collected: BTreeMap<String, String> = BTreeMap::new();
    for (name, value) in headers.iter() {
        let Ok(value) = value.to_str() else {
            tracing::debug!(header = %name, "Skipping non-ASCII header value");
            continue;
        };
        collected
            .entry(canonical_header_name(name.as_str()))
            .and_modify(|existing| {
                existing.push_str(", ");
                existing.push_str(value);
            })
            .or_insert_with(|| value.to_string());
    }
    collected
}
