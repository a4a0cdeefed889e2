//! Query-string parsing helper for transport adapters.

use std::borrow::Cow;

use super::ParameterMap;

/// Parse a raw query string into a multi-valued parameter map.
///
/// Repeated keys accumulate their values in order of appearance. Keys and
/// values are percent-decoded; `+` decodes to a space. Undecodable input is
/// kept verbatim rather than rejected.
pub fn parse_query(query: &str) -> ParameterMap {
    let mut result = ParameterMap::default();
    if query.is_empty() {
        return result;
    }

    for pair in query.split('&') {
        if pair.is_empty() {
            continue;
        }
        let (key, value) = match pair.split_once('=') {
            Some((key, value)) => (key, value),
            None => (pair, ""),
        };
        result.entry(decode(key)).or_default().push(decode(value));
    }

    result
}

fn decode(raw: &str) -> String {
    let spaced = raw.replace('+', " ");
    match urlencoding::decode(&spaced) {
        Ok(decoded) => Cow::into_owned(decoded),
        Err(_) => spaced,
    }
}
