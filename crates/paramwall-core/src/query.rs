//! URL and query-string splitting.
//!
//! Values are borrowed slices of the input; nothing is percent-decoded, so
//! names and values are compared exactly as the client sent them.

/// A URL cut into the pieces the engine works with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UrlParts<'a> {
    /// Everything before `?` (scheme, authority and path for absolute URLs).
    pub prefix: &'a str,
    /// Path used for rule matching.
    pub path: String,
    /// Raw query string without the `?`.
    pub query: &'a str,
    /// Raw fragment without the `#`, if any.
    pub fragment: Option<&'a str>,
}

/// Split `url` into prefix, path, query and fragment.
///
/// Relative URLs (`/path?x=1`, `?x=1`) are split directly. Absolute URLs
/// (`scheme://...`) are checked with the `url` crate; `None` means the URL
/// could not be parsed and must be treated as invalid. In both forms the
/// path is the raw text the client sent, never re-encoded.
pub fn split_url(url: &str) -> Option<UrlParts<'_>> {
    let (rest, fragment) = match url.split_once('#') {
        Some((r, f)) => (r, Some(f)),
        None => (url, None),
    };
    let (prefix, query) = rest.split_once('?').unwrap_or((rest, ""));

    let path = match prefix.split_once("://") {
        Some((_, after_scheme)) => {
            url::Url::parse(prefix).ok()?;
            match after_scheme.find('/') {
                Some(i) => after_scheme[i..].to_string(),
                None => "/".to_string(),
            }
        }
        None => prefix.to_string(),
    };

    Some(UrlParts {
        prefix,
        path,
        query,
        fragment,
    })
}

/// One `name=value` segment of a query string.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QueryParam<'a> {
    /// The segment exactly as it appeared, used when rebuilding a query.
    pub raw: &'a str,
    pub name: &'a str,
    /// Empty when the segment has no `=`.
    pub value: &'a str,
}

/// Iterate the non-empty `&`-separated segments of `query`, splitting each
/// on its first `=`.
pub fn query_params(query: &str) -> impl Iterator<Item = QueryParam<'_>> {
    query.split('&').filter(|s| !s.is_empty()).map(|raw| {
        let (name, value) = raw.split_once('=').unwrap_or((raw, ""));
        QueryParam { raw, name, value }
    })
}

/// Number of raw parameters, counted without building them.
pub fn count_params(query: &str) -> usize {
    query.split('&').filter(|s| !s.is_empty()).count()
}
