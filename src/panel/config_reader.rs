use std::path::{Path, PathBuf};

use county_panel::{columns::*, PanelConfig};
use serde::{Deserialize, Serialize};
use serde_json::Value as JSValue;

use crate::panel::*;

const DEFAULT_RURAL_URBAN_FILE: &str = "urban_rural/Ruralurbancontinuumcodes2023.xlsx";
const DEFAULT_OUTPUT_PATH: &str = "clean/dat_clean.csv";

#[derive(PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct PanelSettings {
    /// Directory holding the raw inputs.
    #[serde(rename = "dataRoot")]
    pub data_root: String,
    /// Lower-case state abbreviations, as in the preparer file names.
    pub states: Vec<String>,
    #[serde(rename = "currentYear")]
    pub current_year: Option<u16>,
    #[serde(rename = "priorYear")]
    pub prior_year: Option<u16>,
    #[serde(rename = "inflationMultiplier")]
    pub inflation_multiplier: f64,
    #[serde(rename = "eitcMaxAgiStub")]
    pub eitc_max_agi_stub: Option<u32>,
    #[serde(rename = "eipMaxAgiStub")]
    pub eip_max_agi_stub: Option<u32>,
    #[serde(rename = "ruralUrbanFile")]
    pub rural_urban_file: Option<String>,
    #[serde(rename = "outputPath")]
    pub output_path: Option<String>,
    #[serde(rename = "summaryVariables")]
    pub summary_variables: Option<Vec<String>>,
    /// Variable groups of the downstream regressions. Not used here.
    #[serde(rename = "regressionGroups")]
    pub regression_groups: Option<JSValue>,
}

impl PanelSettings {
    pub fn panel_config(&self) -> PanelConfig {
        let d = PanelConfig::DEFAULT_CONFIG;
        PanelConfig {
            states: self.states.clone(),
            current_year: self.current_year.unwrap_or(d.current_year),
            prior_year: self.prior_year.unwrap_or(d.prior_year),
            inflation_multiplier: self.inflation_multiplier,
            eitc_max_agi_stub: self.eitc_max_agi_stub.unwrap_or(d.eitc_max_agi_stub),
            eip_max_agi_stub: self.eip_max_agi_stub.unwrap_or(d.eip_max_agi_stub),
            unit_scale: d.unit_scale,
        }
    }

    pub fn rural_urban_path(&self) -> PathBuf {
        let f = self
            .rural_urban_file
            .clone()
            .unwrap_or_else(|| DEFAULT_RURAL_URBAN_FILE.to_string());
        Path::new(&self.data_root).join(f)
    }

    pub fn output_path(&self) -> String {
        match &self.output_path {
            Some(p) => p.clone(),
            None => Path::new(&self.data_root)
                .join(DEFAULT_OUTPUT_PATH)
                .display()
                .to_string(),
        }
    }

    /// The variables of the summary table, by current-year column name.
    pub fn summary_variables(&self) -> Vec<String> {
        match &self.summary_variables {
            Some(l) => l.clone(),
            None => [SHARE_USING_PP, SHARE_CTC, MEAN_CTC, SHARE_EITC, MEAN_EITC]
                .iter()
                .map(|s| s.to_string())
                .collect(),
        }
    }
}

/// Reads and checks the settings file.
///
/// The data root and the output path are resolved against the directory of the
/// settings file.
pub fn read_settings(path: &str) -> PrepResult<PanelSettings> {
    let contents = fs::read_to_string(path).context(OpeningFileSnafu { path })?;
    let mut settings: PanelSettings =
        serde_json::from_str(&contents).context(ParsingJsonSnafu { path })?;
    let base = Path::new(path).parent().unwrap_or_else(|| Path::new(""));
    settings.data_root = base.join(&settings.data_root).display().to_string();
    settings.output_path = settings
        .output_path
        .map(|p| base.join(p).display().to_string());
    settings.states = settings
        .states
        .iter()
        .map(|s| s.trim().to_lowercase())
        .collect();
    validate_settings(&settings)?;
    info!(
        "Read settings {}: data root {}, states {:?}",
        path, settings.data_root, settings.states
    );
    Ok(settings)
}

fn validate_settings(settings: &PanelSettings) -> PrepResult<()> {
    if settings.states.is_empty() {
        whatever!("No states listed in the settings")
    }
    if let Some(s) = settings.states.iter().find(|s| s.is_empty()) {
        whatever!("Empty state abbreviation {:?} in the settings", s)
    }
    let config = settings.panel_config();
    if config.prior_year >= config.current_year {
        whatever!(
            "The prior year {} must come before the current year {}",
            config.prior_year,
            config.current_year
        )
    }
    if !(config.inflation_multiplier.is_finite() && config.inflation_multiplier > 0.0) {
        whatever!(
            "Inflation multiplier must be positive, got {}",
            config.inflation_multiplier
        )
    }
    Ok(())
}
