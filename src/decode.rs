//! Response decoding for `/get?param=...`.
//!
//! The device answers every read with plain text. How that text is
//! interpreted depends only on the parameter key, so the mapping lives in a
//! [`DecoderTable`] instead of being spread through the client.

use std::collections::HashMap;

/// A decoded parameter value.
#[derive(Debug, Clone, PartialEq)]
pub enum ParamValue {
    Text(String),
    Number(f64),
}

impl ParamValue {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            ParamValue::Text(s) => Some(s),
            ParamValue::Number(_) => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            ParamValue::Number(n) => Some(*n),
            ParamValue::Text(_) => None,
        }
    }

    /// `NaN` marks a numeric read whose body held no number; callers treat
    /// it as unset.
    pub fn is_nan(&self) -> bool {
        matches!(self, ParamValue::Number(n) if n.is_nan())
    }
}

/// Numbers print as Rust formats `f64`, with JavaScript's spellings for
/// `NaN` and `Infinity`. That matches `Number#toString` for the integers and
/// short decimals the device uses. Magnitudes JavaScript writes in exponent
/// form (`>= 1e21`, `< 1e-6`) print positionally here, which still parses
/// back to the same value.
impl std::fmt::Display for ParamValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ParamValue::Text(s) => write!(f, "{s}"),
            ParamValue::Number(n) if n.is_nan() => write!(f, "NaN"),
            ParamValue::Number(n) if n.is_infinite() => {
                write!(f, "{}Infinity", if *n < 0.0 { "-" } else { "" })
            }
            ParamValue::Number(n) => write!(f, "{n}"),
        }
    }
}

impl From<&str> for ParamValue {
    fn from(s: &str) -> Self {
        ParamValue::Text(s.to_string())
    }
}

impl From<String> for ParamValue {
    fn from(s: String) -> Self {
        ParamValue::Text(s)
    }
}

impl From<f64> for ParamValue {
    fn from(n: f64) -> Self {
        ParamValue::Number(n)
    }
}

/// Turns a raw response body into a value.
pub type Decoder = fn(&str) -> ParamValue;

/// ECMAScript WhiteSpace and LineTerminator. Unlike `char::is_whitespace`
/// this excludes U+0085 and includes the BOM.
fn is_js_space(c: char) -> bool {
    (c.is_whitespace() && c != '\u{85}') || c == '\u{feff}'
}

/// `String.prototype.trim`.
fn js_trim(s: &str) -> &str {
    s.trim_matches(is_js_space)
}

/// Trimmed string, as-is.
pub fn decode_text(body: &str) -> ParamValue {
    ParamValue::Text(js_trim(body).to_string())
}

/// Trimmed; empty stays the empty string, anything else is a number.
pub fn decode_optional_number(body: &str) -> ParamValue {
    let trimmed = js_trim(body);
    if trimmed.is_empty() {
        ParamValue::Text(String::new())
    } else {
        ParamValue::Number(parse_float(trimmed))
    }
}

/// Leading-prefix float parse; `NaN` when there is no number.
pub fn decode_number(body: &str) -> ParamValue {
    ParamValue::Number(parse_float(body))
}

/// Parse the longest numeric prefix of `s`, the way JavaScript's
/// `parseFloat` does.
///
/// Leading whitespace is skipped, an optional sign is accepted, then either
/// `Infinity` or a decimal literal (`12`, `1.5`, `.5`, `1.`, `2e-3`). An
/// exponent marker without digits is not consumed. Returns `NaN` when no
/// digits are found.
pub fn parse_float(s: &str) -> f64 {
    let t = s.trim_start_matches(is_js_space);
    let b = t.as_bytes();
    let mut i = 0;

    let negative = matches!(b.first(), Some(b'-'));
    if matches!(b.first(), Some(b'+' | b'-')) {
        i += 1;
    }
    if t[i..].starts_with("Infinity") {
        return if negative { f64::NEG_INFINITY } else { f64::INFINITY };
    }

    let int_start = i;
    while i < b.len() && b[i].is_ascii_digit() {
        i += 1;
    }
    let int_digits = i - int_start;

    let mut frac_digits = 0;
    if i < b.len() && b[i] == b'.' {
        let mut k = i + 1;
        while k < b.len() && b[k].is_ascii_digit() {
            k += 1;
        }
        frac_digits = k - (i + 1);
        if int_digits > 0 || frac_digits > 0 {
            i = k;
        }
    }
    if int_digits == 0 && frac_digits == 0 {
        return f64::NAN;
    }

    if i < b.len() && (b[i] == b'e' || b[i] == b'E') {
        let mut k = i + 1;
        if k < b.len() && (b[k] == b'+' || b[k] == b'-') {
            k += 1;
        }
        let digits_start = k;
        while k < b.len() && b[k].is_ascii_digit() {
            k += 1;
        }
        if k > digits_start {
            i = k;
        }
    }

    t[..i].parse().unwrap_or(f64::NAN)
}

/// Key → decoder mapping with a fallback for unknown keys.
#[derive(Debug, Clone)]
pub struct DecoderTable {
    entries: HashMap<String, Decoder>,
    fallback: Decoder,
}

impl DecoderTable {
    /// A table with no per-key entries.
    pub fn new(fallback: Decoder) -> Self {
        Self {
            entries: HashMap::new(),
            fallback,
        }
    }

    /// The table for the Snapclient firmware: host names are strings, the
    /// server port may be blank (meaning "use mDNS / default"), and every
    /// other parameter is numeric.
    pub fn snapclient() -> Self {
        Self::new(decode_number)
            .with("hostname", decode_text)
            .with("snapserver_host", decode_text)
            .with("snapserver_port", decode_optional_number)
    }

    pub fn with(mut self, key: impl Into<String>, decoder: Decoder) -> Self {
        self.insert(key, decoder);
        self
    }

    pub fn insert(&mut self, key: impl Into<String>, decoder: Decoder) {
        self.entries.insert(key.into(), decoder);
    }

    pub fn decoder_for(&self, key: &str) -> Decoder {
        self.entries.get(key).copied().unwrap_or(self.fallback)
    }

    pub fn decode(&self, key: &str, body: &str) -> ParamValue {
        (self.decoder_for(key))(body)
    }
}

impl Default for DecoderTable {
    fn default() -> Self {
        Self::snapclient()
    }
}
