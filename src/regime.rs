//! Tax-year regimes.
//!
//! A [`TaxRegime`] bundles the monthly progressive bracket table, the
//! personal and dependent deductions and the compulsory insurance
//! scheme in force for one tax year.  Regimes are validated when they
//! are built, so every calculation can assume a contiguous, consistent
//! table.  They are shared read-only through a [`RegimeTable`].
//!
//! Every regime must keep both contributions and tax non-decreasing in
//! gross salary (non-negative rates, non-negative caps).  The
//! net-to-gross solve in [`crate::salary`] depends on it.

use crate::error::{EngineError, RegimeError};
use crate::money::{BasisPoints, Vnd, BP_SCALE};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Arc;
use tracing::info;

/// One marginal band of the monthly tax table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bracket {
    /// Exclusive lower bound of taxable income for this band.
    pub floor: Vnd,
    /// Inclusive upper bound, `None` for the top band.
    pub ceiling: Option<Vnd>,
    /// Marginal rate in basis points.
    pub rate_bp: BasisPoints,
    /// Constant of the quick formula `income * rate - quick_subtraction`.
    pub quick_subtraction: Vnd,
}

impl Bracket {
    pub fn new(floor: Vnd, ceiling: Option<Vnd>, rate_bp: BasisPoints, quick_subtraction: Vnd) -> Self {
        Self {
            floor,
            ceiling,
            rate_bp,
            quick_subtraction,
        }
    }

    /// Whether `income` falls inside this band.
    pub fn contains(&self, income: Vnd) -> bool {
        income > self.floor && self.ceiling.map_or(true, |ceiling| income <= ceiling)
    }
}

/// Compulsory insurance rates and salary caps for a year.
///
/// Social and health insurance share one cap; unemployment insurance
/// has its own.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InsuranceScheme {
    pub social_rate_bp: BasisPoints,
    pub health_rate_bp: BasisPoints,
    pub unemployment_rate_bp: BasisPoints,
    /// Salary cap applied to social and health insurance.
    pub social_health_cap: Vnd,
    /// Salary cap applied to unemployment insurance.
    pub unemployment_cap: Vnd,
    pub employer_social_rate_bp: BasisPoints,
    pub employer_health_rate_bp: BasisPoints,
    pub employer_unemployment_rate_bp: BasisPoints,
}

impl InsuranceScheme {
    /// Employee rates 8% / 1.5% / 1% and employer rates 17.5% / 3% / 1%.
    pub fn vietnam(social_health_cap: Vnd, unemployment_cap: Vnd) -> Self {
        Self {
            social_rate_bp: 800,
            health_rate_bp: 150,
            unemployment_rate_bp: 100,
            social_health_cap,
            unemployment_cap,
            employer_social_rate_bp: 1_750,
            employer_health_rate_bp: 300,
            employer_unemployment_rate_bp: 100,
        }
    }

    fn rates(&self) -> [BasisPoints; 6] {
        [
            self.social_rate_bp,
            self.health_rate_bp,
            self.unemployment_rate_bp,
            self.employer_social_rate_bp,
            self.employer_health_rate_bp,
            self.employer_unemployment_rate_bp,
        ]
    }
}

/// Unvalidated regime as written in a JSON definition file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegimeDefinition {
    pub year: i32,
    pub name: String,
    pub brackets: Vec<Bracket>,
    /// Monthly personal deduction.
    pub personal_deduction: Vnd,
    /// Monthly deduction per registered dependent.
    pub dependent_deduction: Vnd,
    pub insurance: InsuranceScheme,
}

/// A validated tax-year regime.  Immutable once built.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RegimeDefinition")]
pub struct TaxRegime {
    year: i32,
    name: String,
    brackets: Vec<Bracket>,
    personal_deduction: Vnd,
    dependent_deduction: Vnd,
    insurance: InsuranceScheme,
}

impl TryFrom<RegimeDefinition> for TaxRegime {
    type Error = RegimeError;

    fn try_from(def: RegimeDefinition) -> Result<Self, Self::Error> {
        TaxRegime::new(def)
    }
}

impl TaxRegime {
    /// Validates a definition and freezes it into a regime.
    pub fn new(def: RegimeDefinition) -> Result<Self, RegimeError> {
        validate(&def)?;
        Ok(Self {
            year: def.year,
            name: def.name,
            brackets: def.brackets,
            personal_deduction: def.personal_deduction,
            dependent_deduction: def.dependent_deduction,
            insurance: def.insurance,
        })
    }

    /// Personal income tax table in force until the end of 2025.
    pub fn vn_2025() -> Self {
        let brackets = vec![
            Bracket::new(0, Some(5_000_000), 500, 0),
            Bracket::new(5_000_000, Some(10_000_000), 1_000, 250_000),
            Bracket::new(10_000_000, Some(18_000_000), 1_500, 750_000),
            Bracket::new(18_000_000, Some(32_000_000), 2_000, 1_650_000),
            Bracket::new(32_000_000, Some(52_000_000), 2_500, 3_250_000),
            Bracket::new(52_000_000, Some(80_000_000), 3_000, 5_850_000),
            Bracket::new(80_000_000, None, 3_500, 9_850_000),
        ];
        Self::builtin(RegimeDefinition {
            year: 2025,
            name: "Vietnam PIT 2025 (7 brackets)".to_string(),
            brackets,
            personal_deduction: 11_000_000,
            dependent_deduction: 4_400_000,
            insurance: InsuranceScheme::vietnam(46_800_000, 99_200_000),
        })
    }

    /// Five-bracket table and raised family deductions applying from 2026.
    pub fn vn_2026() -> Self {
        let brackets = vec![
            Bracket::new(0, Some(10_000_000), 500, 0),
            Bracket::new(10_000_000, Some(30_000_000), 1_000, 500_000),
            Bracket::new(30_000_000, Some(60_000_000), 2_000, 3_500_000),
            Bracket::new(60_000_000, Some(100_000_000), 3_000, 9_500_000),
            Bracket::new(100_000_000, None, 3_500, 14_500_000),
        ];
        Self::builtin(RegimeDefinition {
            year: 2026,
            name: "Vietnam PIT 2026 (5 brackets)".to_string(),
            brackets,
            personal_deduction: 15_500_000,
            dependent_deduction: 6_200_000,
            insurance: InsuranceScheme::vietnam(46_800_000, 106_200_000),
        })
    }

    // Shipped tables are covered by tests; a failure here is a defect in
    // the constants above.
    fn builtin(def: RegimeDefinition) -> Self {
        match Self::new(def) {
            Ok(regime) => regime,
            Err(err) => panic!("built-in regime is malformed: {err}"),
        }
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn brackets(&self) -> &[Bracket] {
        &self.brackets
    }

    pub fn personal_deduction(&self) -> Vnd {
        self.personal_deduction
    }

    pub fn dependent_deduction(&self) -> Vnd {
        self.dependent_deduction
    }

    pub fn insurance(&self) -> &InsuranceScheme {
        &self.insurance
    }

    /// Index of the bracket `income` falls in, for a positive income.
    pub fn bracket_index(&self, income: Vnd) -> Option<usize> {
        if income <= 0 {
            return None;
        }
        self.brackets.iter().position(|b| b.contains(income))
    }
}

fn validate(def: &RegimeDefinition) -> Result<(), RegimeError> {
    let year = def.year;
    let first = def.brackets.first().ok_or(RegimeError::NoBrackets { year })?;
    if first.floor != 0 {
        return Err(RegimeError::FirstFloorNotZero {
            year,
            floor: first.floor,
        });
    }
    let last_index = def.brackets.len() - 1;
    let mut previous: Option<&Bracket> = None;
    for (index, bracket) in def.brackets.iter().enumerate() {
        if bracket.rate_bp as i128 > BP_SCALE {
            return Err(RegimeError::InvalidRate {
                year,
                index,
                rate_bp: bracket.rate_bp,
            });
        }
        match bracket.ceiling {
            Some(ceiling) if ceiling <= bracket.floor => {
                return Err(RegimeError::EmptyBracket {
                    year,
                    index,
                    floor: bracket.floor,
                    ceiling,
                })
            }
            Some(_) if index == last_index => return Err(RegimeError::LastBracketBounded { year }),
            None if index != last_index => return Err(RegimeError::UnboundedNotLast { year, index }),
            _ => {}
        }

        // quick[i] = quick[i-1] + floor[i] * (rate[i] - rate[i-1])
        let (prev_rate, prev_quick) = match previous {
            Some(prev) => {
                let expected_floor = prev.ceiling.unwrap_or(prev.floor);
                if bracket.floor != expected_floor {
                    return Err(RegimeError::NotContiguous {
                        year,
                        index,
                        floor: bracket.floor,
                        expected: expected_floor,
                    });
                }
                if bracket.rate_bp < prev.rate_bp {
                    return Err(RegimeError::InvalidRate {
                        year,
                        index,
                        rate_bp: bracket.rate_bp,
                    });
                }
                (prev.rate_bp as i128, prev.quick_subtraction as i128)
            }
            None => (0, 0),
        };
        let expected_scaled =
            prev_quick * BP_SCALE + bracket.floor as i128 * (bracket.rate_bp as i128 - prev_rate);
        if bracket.quick_subtraction as i128 * BP_SCALE != expected_scaled {
            return Err(RegimeError::QuickSubtractionMismatch {
                year,
                index,
                expected: format!("{}", expected_scaled as f64 / BP_SCALE as f64),
                actual: bracket.quick_subtraction,
            });
        }
        previous = Some(bracket);
    }

    if def.insurance.rates().iter().any(|rate| *rate as i128 > BP_SCALE) {
        return Err(RegimeError::InvalidRate {
            year,
            index: 0,
            rate_bp: def.insurance.rates().into_iter().max().unwrap_or_default(),
        });
    }
    let amounts = [
        ("personal_deduction", def.personal_deduction),
        ("dependent_deduction", def.dependent_deduction),
        ("social_health_cap", def.insurance.social_health_cap),
        ("unemployment_cap", def.insurance.unemployment_cap),
    ];
    if let Some((field, _)) = amounts.iter().find(|(_, amount)| *amount < 0) {
        return Err(RegimeError::NegativeAmount { year, field });
    }
    Ok(())
}

/// Year-indexed set of regimes, loaded once and shared read-only.
#[derive(Debug, Clone, Default)]
pub struct RegimeTable {
    regimes: BTreeMap<i32, Arc<TaxRegime>>,
}

impl RegimeTable {
    /// Table holding the shipped 2025 and 2026 regimes.
    pub fn builtin() -> Self {
        let mut table = Self::default();
        table.insert(TaxRegime::vn_2025());
        table.insert(TaxRegime::vn_2026());
        table
    }

    /// Registers a regime, replacing any regime for the same year.
    pub fn insert(&mut self, regime: TaxRegime) {
        self.regimes.insert(regime.year(), Arc::new(regime));
    }

    pub fn get(&self, year: i32) -> Result<Arc<TaxRegime>, EngineError> {
        self.regimes
            .get(&year)
            .cloned()
            .ok_or(EngineError::UnsupportedYear(year))
    }

    pub fn years(&self) -> Vec<i32> {
        self.regimes.keys().copied().collect()
    }
}

/// Load all regime definitions from a directory.
///
/// Every `.json` file is parsed as a [`RegimeDefinition`] and validated.
/// A single malformed file fails the whole load.  Files are read in
/// name order so that duplicate years resolve deterministically (the
/// later file wins when the caller inserts them into a table).
pub fn load_regimes_from_dir(path: &Path) -> Result<Vec<TaxRegime>, EngineError> {
    let io_err = |source| EngineError::Io {
        path: path.display().to_string(),
        source,
    };
    let mut files = Vec::new();
    for entry in std::fs::read_dir(path).map_err(io_err)? {
        let entry = entry.map_err(io_err)?;
        let file_path = entry.path();
        if entry.file_type().map_err(io_err)?.is_file()
            && file_path.extension().map_or(false, |ext| ext == "json")
        {
            files.push(file_path);
        }
    }
    files.sort();

    let mut regimes = Vec::with_capacity(files.len());
    for file in files {
        let shown = file.display().to_string();
        let data = std::fs::read_to_string(&file).map_err(|source| EngineError::Io {
            path: shown.clone(),
            source,
        })?;
        let def: RegimeDefinition = serde_json::from_str(&data).map_err(|source| EngineError::Parse {
            path: shown.clone(),
            source,
        })?;
        let regime = TaxRegime::new(def)?;
        info!(path = %shown, year = regime.year(), "loaded tax regime");
        regimes.push(regime);
    }
    Ok(regimes)
}
