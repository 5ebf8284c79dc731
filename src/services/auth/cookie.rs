//! Cookie header scanning.
//!
//! Works on plain strings so it can be used (and tested) without a request.

/// Split a `Cookie` header into trimmed `(name, value)` pairs, in order.
///
/// Segments without `=` are skipped. The value is everything after the first
/// `=`, so values may themselves contain `=`.
pub fn cookie_pairs(header: &str) -> impl Iterator<Item = (&str, &str)> {
    header
        .split(';')
        .map(str::trim)
        .filter_map(|segment| segment.split_once('='))
}

/// Value of the first cookie called `name`, if any.
pub fn find_cookie<'a>(header: &'a str, name: &str) -> Option<&'a str> {
    cookie_pairs(header)
        .find(|(key, _)| *key == name)
        .map(|(_, value)| value)
}
