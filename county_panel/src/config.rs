// ********* Input data structures ***********

use std::error::Error;
use std::fmt::Display;

use crate::fips::CountyKey;

/// The number of preparer listings found for one ZIP code.
///
/// A ZIP may appear several times in a table built from multiple files; the
/// apportioner sums the duplicates before splitting.
#[derive(PartialEq, Debug, Clone, Copy)]
pub struct ZipCount {
    pub zip: u32,
    pub count: f64,
}

/// One line of the ZIP to county crosswalk.
#[derive(Eq, PartialEq, Debug, Clone, Copy, Hash)]
pub struct CrosswalkEntry {
    pub zip: u32,
    pub county: CountyKey,
}

/// One row of an IRS Statistics of Income county file.
///
/// The state and county codes are kept as read, since their padding differs
/// between vintages. The overall cut has no income bracket (`agi_stub` is
/// `None`); the AGI cut has one row per county and bracket.
#[derive(PartialEq, Debug, Clone, Default)]
pub struct SoiRecord {
    pub state_fips: String,
    pub county_fips: String,
    pub agi_stub: Option<u32>,
    /// Number of returns
    pub n1: Option<f64>,
    /// Number of returns with a paid preparer's signature
    pub prep: Option<f64>,
    /// Child tax credit: returns, amount (thousands)
    pub n11070: Option<f64>,
    pub a11070: Option<f64>,
    /// Earned income credit: returns, amount (thousands)
    pub n59660: Option<f64>,
    pub a59660: Option<f64>,
    /// Recovery rebate credit (economic impact payment): returns, amount (thousands)
    pub n10971: Option<f64>,
    pub a10971: Option<f64>,
}

// ******** Output data structures *********

/// Diagnostics produced while moving one year of ZIP counts to counties.
#[derive(PartialEq, Debug, Clone)]
pub struct ApportionReport {
    pub year: u16,
    /// Total of the input counts, after deduplication.
    pub input_mass: f64,
    /// Total allocated to counties, before the exclusion step.
    pub apportioned_mass: f64,
    /// Counted ZIP codes that the crosswalk does not know about.
    pub unmatched_zips: usize,
    pub counties_before_exclusion: usize,
    pub counties_after_exclusion: usize,
}

/// Errors that prevent the panel from being built.
///
/// All of them point at a change in the input corpus and are never recovered from.
#[derive(PartialEq, Debug, Clone)]
pub enum PanelError {
    /// A state or county code that does not fit its fixed width.
    InvalidFips { value: String, width: usize },
    /// A census geography label that does not end with a county code.
    InvalidGeoLabel(String),
    /// The same county appears twice in a table that must be keyed by county.
    DuplicateKey { table: String, key: CountyKey },
    /// A joined column already exists in the panel.
    ColumnCollision { table: String, column: String },
    MissingColumn { table: String, column: String },
}

impl Error for PanelError {}

impl Display for PanelError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PanelError::InvalidFips { value, width } => {
                write!(f, "FIPS value {:?} does not fit in {} digits", value, width)
            }
            PanelError::InvalidGeoLabel(label) => {
                write!(f, "geography label {:?} does not end with a county code", label)
            }
            PanelError::DuplicateKey { table, key } => {
                write!(f, "county {} appears more than once in table {}", key, table)
            }
            PanelError::ColumnCollision { table, column } => {
                write!(f, "column {} from table {} is already in the panel", column, table)
            }
            PanelError::MissingColumn { table, column } => {
                write!(f, "table {} has no column {}", table, column)
            }
        }
    }
}

// ********* Configuration **********

/// The settings of one run.
///
/// The value is built once and handed to the components that need it.
#[derive(PartialEq, Debug, Clone)]
pub struct PanelConfig {
    /// Lower-case state abbreviations whose preparer listings are read.
    pub states: Vec<String>,
    pub current_year: u16,
    pub prior_year: u16,
    /// Multiplier expressing prior-year dollars in current-year dollars.
    pub inflation_multiplier: f64,
    /// Highest SOI income bracket counted for the EITC (stub 5: under $75k).
    pub eitc_max_agi_stub: u32,
    /// Highest SOI income bracket counted for the EIP (stub 7: under $200k).
    pub eip_max_agi_stub: u32,
    /// SOI amounts are in thousands of dollars.
    pub unit_scale: f64,
}

impl PanelConfig {
    pub const DEFAULT_CONFIG: PanelConfig = PanelConfig {
        states: Vec::new(),
        current_year: 2021,
        prior_year: 2017,
        inflation_multiplier: 1.0,
        eitc_max_agi_stub: 5,
        eip_max_agi_stub: 7,
        unit_scale: 1000.0,
    };

    /// Suffix of the SOI-derived columns for a given year.
    ///
    /// The current year has no suffix, the prior year uses its last two digits (`_17`).
    pub fn year_suffix(&self, year: u16) -> String {
        if year == self.current_year {
            String::new()
        } else {
            format!("_{:02}", year % 100)
        }
    }
}
