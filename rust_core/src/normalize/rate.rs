//! Per-game rate derivation and rounding.

use serde::{Deserialize, Serialize};

/// Decimal places a metric is rounded to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Precision {
    /// Percentages and yardage
    Two,
    /// Rate-counting stats (turnovers, sacks, penalties per game)
    Three,
}

impl Precision {
    pub fn places(self) -> u32 {
        match self {
            Precision::Two => 2,
            Precision::Three => 3,
        }
    }

    pub fn round(self, value: f64) -> f64 {
        round_to(value, self.places())
    }
}

/// Round to `places` decimals, ties to even on the exact binary value.
///
/// A tie only exists when `value * 10^places` is exactly a half-integer;
/// a product that merely rounded onto `.5` goes the way of its true value.
pub fn round_to(value: f64, places: u32) -> f64 {
    if !value.is_finite() {
        return value;
    }
    let factor = 10f64.powi(places as i32);
    let scaled = value * factor;
    let whole = if (scaled - scaled.trunc()).abs() == 0.5 {
        // Exact residual of the product
        let residual = value.mul_add(factor, -scaled);
        if residual > 0.0 {
            scaled.ceil()
        } else if residual < 0.0 {
            scaled.floor()
        } else {
            scaled.round_ties_even()
        }
    } else {
        scaled.round()
    };
    let rounded = whole / factor;
    // Normalize -0.0 so output never prints a negative zero
    if rounded == 0.0 {
        0.0
    } else {
        rounded
    }
}

/// Cumulative total divided by games played.
///
/// Absent when either input is absent or `games_played <= 0`.
pub fn per_game(total: Option<f64>, games_played: Option<f64>, precision: Precision) -> Option<f64> {
    let total = total?;
    let games = games_played?;
    if games <= 0.0 {
        return None;
    }
    Some(precision.round(total / games))
}
