//! Source-independent normalization primitives.
//!
//! - `flatten`: nested `{name, value}` payloads -> flat `RawStatBag`
//! - `resolve`: ordered alias lookup with numeric coercion
//! - `rate`: per-game derivation and rounding

pub mod flatten;
pub mod rate;
pub mod resolve;

pub use flatten::{flatten, RawStatBag};
pub use rate::{per_game, round_to, Precision};
pub use resolve::{coerce_f64, parse_number, resolve, AliasSet};
