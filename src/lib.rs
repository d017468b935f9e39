//! Vietnamese Wage Engine library crate.
//!
//! This crate exposes a deterministic compensation engine for
//! Vietnamese personal income: gross/net salary conversion with capped
//! compulsory insurance, progressive tax evaluation, annual bonus
//! aggregation, year-end tax settlement and job offer ranking.
//! Applications call the calculation functions directly with a
//! [`regime::TaxRegime`] or route serialised requests through
//! [`engine::run_request`].

pub mod annual;
pub mod config;
pub mod contributions;
pub mod deductions;
pub mod engine;
pub mod error;
pub mod models;
pub mod money;
pub mod offers;
pub mod regime;
pub mod salary;
pub mod settlement;
pub mod tax;

pub use error::{ConvergenceError, EngineError, RegimeError};
pub use money::Vnd;
pub use regime::{RegimeTable, TaxRegime};
