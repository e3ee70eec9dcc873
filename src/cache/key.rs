//! Cache Key Module
//!
//! Structured cache keys and their canonical string encoding.
//!
//! The canonical form is `source:data_type:start_date:end_date`, followed by
//! `?name=value&...` when parameters are present. Parameters are emitted in
//! name order, so two keys built with different insertion orders encode to
//! the same string.
//!
//! Dates, parameter names and parameter values are percent-escaped so that a
//! separator inside them cannot be mistaken for structure: `%`, `:` and `?`
//! in the base segments, `%`, `&` and `=` in the query.

use std::fmt;
use std::str::FromStr;

use crate::error::CacheError;
use crate::models::{DataSource, DataType, ParamValue, QueryParams};

const SEGMENT_SEPARATOR: char = ':';
const QUERY_SEPARATOR: char = '?';
const PAIR_SEPARATOR: char = '&';
const VALUE_SEPARATOR: char = '=';
const ESCAPE: char = '%';

const BASE_RESERVED: [char; 2] = [SEGMENT_SEPARATOR, QUERY_SEPARATOR];
const QUERY_RESERVED: [char; 2] = [PAIR_SEPARATOR, VALUE_SEPARATOR];

// == Cache Key ==
/// Identifies one normalized query result.
///
/// Dates are opaque strings and are never reparsed by the cache.
#[derive(Debug, Clone, PartialEq)]
pub struct CacheKey {
    pub source: DataSource,
    pub data_type: DataType,
    pub start_date: String,
    pub end_date: String,
    /// Empty when the query has no parameters
    pub params: QueryParams,
}

impl CacheKey {
    // == Constructor ==
    /// Creates a key without parameters.
    pub fn new(
        source: DataSource,
        data_type: DataType,
        start_date: impl Into<String>,
        end_date: impl Into<String>,
    ) -> Self {
        Self {
            source,
            data_type,
            start_date: start_date.into(),
            end_date: end_date.into(),
            params: QueryParams::new(),
        }
    }

    /// Adds or replaces a parameter.
    pub fn with_param(mut self, name: impl Into<String>, value: impl Into<ParamValue>) -> Self {
        self.params.insert(name.into(), value.into());
        self
    }

    /// Returns the canonical string form.
    pub fn encode(&self) -> String {
        encode(self)
    }
}

// == Encode ==
/// Converts a structured key into its canonical string.
pub fn encode(key: &CacheKey) -> String {
    let mut out = format!(
        "{}{sep}{}{sep}{}{sep}{}",
        key.source,
        key.data_type,
        escape(&key.start_date, &BASE_RESERVED),
        escape(&key.end_date, &BASE_RESERVED),
        sep = SEGMENT_SEPARATOR
    );

    if !key.params.is_empty() {
        out.push(QUERY_SEPARATOR);
        for (i, (name, value)) in key.params.iter().enumerate() {
            if i > 0 {
                out.push(PAIR_SEPARATOR);
            }
            out.push_str(&escape(name, &QUERY_RESERVED));
            out.push(VALUE_SEPARATOR);
            out.push_str(&escape(&value.to_canonical(), &QUERY_RESERVED));
        }
    }

    out
}

// == Escaping ==
fn escape(raw: &str, reserved: &[char]) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        if c == ESCAPE || reserved.contains(&c) {
            out.push_str(&format!("{}{:02X}", ESCAPE, u32::from(c)));
        } else {
            out.push(c);
        }
    }
    out
}

/// Reverses [`escape`]. A `%` not followed by two hex digits naming an ASCII
/// byte is kept literally.
fn unescape(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut rest = raw;

    while let Some(pos) = rest.find(ESCAPE) {
        out.push_str(&rest[..pos]);
        let tail = &rest[pos + ESCAPE.len_utf8()..];
        let byte = tail
            .get(..2)
            .filter(|hex| hex.bytes().all(|b| b.is_ascii_hexdigit()))
            .and_then(|hex| u8::from_str_radix(hex, 16).ok())
            .filter(u8::is_ascii);

        match byte {
            Some(byte) => {
                out.push(char::from(byte));
                rest = &tail[2..];
            }
            None => {
                out.push(ESCAPE);
                rest = tail;
            }
        }
    }

    out.push_str(rest);
    out
}

// == Decode ==
/// Parses a canonical string, returning `None` when the base key is malformed.
///
/// Query pairs without `=` are skipped rather than failing the whole key.
/// For every key, `decode(&encode(&key)) == Some(key)`.
pub fn decode(s: &str) -> Option<CacheKey> {
    s.parse().ok()
}

impl FromStr for CacheKey {
    type Err = CacheError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (base, query) = match s.split_once(QUERY_SEPARATOR) {
            Some((base, query)) => (base, Some(query)),
            None => (s, None),
        };

        let segments: Vec<&str> = base.split(SEGMENT_SEPARATOR).collect();
        let [source, data_type, start_date, end_date] = segments.as_slice() else {
            return Err(CacheError::InvalidKey(format!(
                "expected 4 segments, found {} in '{}'",
                segments.len(),
                s
            )));
        };

        let mut key = CacheKey::new(
            source.parse()?,
            data_type.parse()?,
            unescape(start_date),
            unescape(end_date),
        );

        if let Some(query) = query {
            for pair in query.split(PAIR_SEPARATOR) {
                if let Some((name, value)) = pair.split_once(VALUE_SEPARATOR) {
                    key.params
                        .insert(unescape(name), ParamValue::parse_canonical(&unescape(value)));
                }
            }
        }

        Ok(key)
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&encode(self))
    }
}
