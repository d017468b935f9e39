//! Error types for the wage engine.
//!
//! Regime validation failures are programmer errors surfaced when a
//! table is built or loaded, never per calculation.  The only error a
//! calculation itself can raise is [`ConvergenceError`] from the
//! net-to-gross solve.

use crate::money::{BasisPoints, Vnd};
use thiserror::Error;

/// A bracket table or deduction profile that cannot be used.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegimeError {
    #[error("regime {year} has no tax brackets")]
    NoBrackets { year: i32 },
    #[error("regime {year}: first bracket must start at 0, found {floor}")]
    FirstFloorNotZero { year: i32, floor: Vnd },
    #[error("regime {year}: bracket {index} starts at {floor} but the previous bracket ends at {expected}")]
    NotContiguous {
        year: i32,
        index: usize,
        floor: Vnd,
        expected: Vnd,
    },
    #[error("regime {year}: bracket {index} ceiling {ceiling} is not above its floor {floor}")]
    EmptyBracket {
        year: i32,
        index: usize,
        floor: Vnd,
        ceiling: Vnd,
    },
    #[error("regime {year}: bracket {index} is unbounded but is not the last bracket")]
    UnboundedNotLast { year: i32, index: usize },
    #[error("regime {year}: the last bracket must be unbounded")]
    LastBracketBounded { year: i32 },
    #[error("regime {year}: bracket {index} rate {rate_bp}bp is invalid")]
    InvalidRate {
        year: i32,
        index: usize,
        rate_bp: BasisPoints,
    },
    #[error("regime {year}: bracket {index} quick subtraction is {actual}, marginal sum requires {expected}")]
    QuickSubtractionMismatch {
        year: i32,
        index: usize,
        expected: String,
        actual: Vnd,
    },
    #[error("regime {year}: {field} must not be negative")]
    NegativeAmount { year: i32, field: &'static str },
}

/// The net-to-gross solve could not reproduce the requested net.
///
/// Carries the closest estimate found so callers can retry with a wider
/// bound or report the failure.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("no gross salary reproduces net {target_net} (best gross {best_gross} gives net {best_net} after {iterations} iterations)")]
pub struct ConvergenceError {
    pub target_net: Vnd,
    pub best_gross: Vnd,
    pub best_net: Vnd,
    pub iterations: u32,
}

/// Umbrella error returned by the request dispatcher and regime loader.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error(transparent)]
    Regime(#[from] RegimeError),
    #[error(transparent)]
    Convergence(#[from] ConvergenceError),
    #[error("no tax regime registered for year {0}")]
    UnsupportedYear(i32),
    #[error("failed to read regime file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse regime file {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: serde_json::Error,
    },
}
