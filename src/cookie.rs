//! Raw cookie header parsing
//!
//! A browser hands back its jar for a URL as one string in `Cookie`
//! header form: `name1=value1; name2=value2`. This module turns that
//! string into structured pairs.

/// A single name/value entry decoded from a raw cookie header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CookiePair {
    pub name: String,
    pub value: String,
}

impl CookiePair {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

/// Parse a raw cookie header string into an ordered sequence of pairs.
///
/// Splits on `;`, trims each segment, then splits each segment on the
/// first `=` only, so values may themselves contain `=`. Segments
/// without `=` are dropped silently. Names and values are trimmed.
/// An empty or blank input yields an empty sequence; callers treat that
/// as "no cookies", not as an error.
pub fn parse_raw_header(raw: &str) -> Vec<CookiePair> {
    raw.split(';')
        .filter_map(|segment| {
            let (name, value) = segment.trim().split_once('=')?;
            Some(CookiePair::new(name.trim(), value.trim()))
        })
        .collect()
}

/// Look up a cookie value by name.
///
/// When a name repeats within one header the last occurrence wins,
/// matching map-insertion semantics for repeated keys.
pub fn value_of<'a>(pairs: &'a [CookiePair], name: &str) -> Option<&'a str> {
    pairs
        .iter()
        .rev()
        .find(|pair| pair.name == name)
        .map(|pair| pair.value.as_str())
}
