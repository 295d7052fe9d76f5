//! Alias resolution: first present, numeric-coercible field wins.

use super::flatten::RawStatBag;
use serde_json::Value;

/// Ordered candidate raw-field names for one metric. Earlier names are the
/// more specific spellings; later ones cover schema drift.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AliasSet(&'static [&'static str]);

impl AliasSet {
    /// Panics at compile time when used in a `static`/`const` with no names.
    pub const fn new(names: &'static [&'static str]) -> Self {
        assert!(!names.is_empty(), "alias set must not be empty");
        Self(names)
    }

    pub fn names(&self) -> &'static [&'static str] {
        self.0
    }
}

/// Coerce a raw value to a finite float.
///
/// Numbers pass through, strings are parsed after trimming. Everything else,
/// including NaN and infinities, is treated as absent.
pub fn coerce_f64(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64().filter(|v| v.is_finite()),
        Value::String(s) => parse_number(s),
        _ => None,
    }
}

/// Parse a text cell as a finite float, ignoring surrounding whitespace.
pub fn parse_number(text: &str) -> Option<f64> {
    text.trim().parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Return the first alias present in `bag` whose value coerces to a number.
pub fn resolve(bag: &RawStatBag, aliases: AliasSet) -> Option<f64> {
    aliases
        .names()
        .iter()
        .find_map(|name| bag.get(name).and_then(coerce_f64))
}
