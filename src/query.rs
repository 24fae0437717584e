//! Query-string helpers: percent-encoding for parameter values and
//! `URLSearchParams`-style parsing for page URLs.

use percent_encoding::{percent_decode_str, utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use url::form_urlencoded;

/// Bytes `encodeURIComponent` escapes: everything except ASCII
/// alphanumerics and `- _ . ! ~ * ' ( )`.
const URI_COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')');

/// Percent-encode `s` the way `encodeURIComponent` does (`%XX` over the
/// UTF-8 bytes, upper-case hex).
pub fn encode_uri_component(s: &str) -> String {
    utf8_percent_encode(s, URI_COMPONENT).to_string()
}

/// Decode a form-urlencoded component: `+` becomes a space and `%XX`
/// sequences become bytes. Malformed escapes are kept literally.
pub fn url_decode(s: &str) -> String {
    percent_decode_str(&s.replace('+', " "))
        .decode_utf8_lossy()
        .into_owned()
}

/// Parse a query string (with or without the leading `?`) into ordered
/// key/value pairs. Both keys and values are decoded.
pub fn parse_query(query: &str) -> Vec<(String, String)> {
    form_urlencoded::parse(query.trim_start_matches('?').as_bytes())
        .into_owned()
        .collect()
}

/// First value for `key`, mirroring `URLSearchParams.get`.
pub fn query_get(query: &str, key: &str) -> Option<String> {
    form_urlencoded::parse(query.trim_start_matches('?').as_bytes())
        .find(|(k, _)| k == key)
        .map(|(_, v)| v.into_owned())
}
