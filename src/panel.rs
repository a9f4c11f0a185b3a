use log::{debug, info, warn};

use county_panel::*;
use snafu::{prelude::*, Snafu};

use std::fs;
use std::path::{Path, PathBuf};

use text_diff::print_diff;

use crate::panel::config_reader::*;

mod config_reader;
mod io_census;
mod io_common;
mod io_crosswalk;
mod io_output;
mod io_preparers;
mod io_rucc;
mod io_soi;

#[derive(Debug, Snafu)]
pub enum PrepError {
    #[snafu(display("Error opening file {path}"))]
    OpeningFile {
        source: std::io::Error,
        path: String,
    },
    #[snafu(display("Error parsing the settings in {path}"))]
    ParsingJson {
        source: serde_json::Error,
        path: String,
    },
    #[snafu(display("Expected input file {path} does not exist"))]
    MissingInput { path: String },
    #[snafu(display("Error opening file {path}"))]
    CsvOpen { source: csv::Error, path: String },
    #[snafu(display("{path}:{lineno}: could not read the line"))]
    CsvLineParse {
        source: csv::Error,
        path: String,
        lineno: usize,
    },
    #[snafu(display("{path}:{lineno}: line is too short"))]
    CsvLineTooShort { path: String, lineno: usize },
    #[snafu(display("{path}: no column named {column:?}"))]
    MissingHeader { path: String, column: String },
    #[snafu(display("{path}:{lineno}: {content:?} is not a number"))]
    MalformedNumber {
        path: String,
        lineno: usize,
        content: String,
    },
    #[snafu(display("Error opening file {path}"))]
    OpeningExcel {
        source: calamine::XlsxError,
        path: String,
    },
    #[snafu(display("{path}: the workbook has no worksheet or no rows"))]
    EmptyExcel { path: String },
    #[snafu(display("{path}:{lineno}: unexpected cell {content}"))]
    ExcelWrongCellType {
        path: String,
        lineno: usize,
        content: String,
    },
    #[snafu(display("Could not build the panel"))]
    Panel { source: PanelError },
    #[snafu(display("Error writing {path}"))]
    CsvWrite { source: csv::Error, path: String },
    #[snafu(display("Error writing {path}"))]
    Writing {
        source: std::io::Error,
        path: String,
    },

    #[snafu(whatever, display("{message}"))]
    Whatever {
        message: String,
        #[snafu(source(from(Box<dyn std::error::Error>, Some)))]
        source: Option<Box<dyn std::error::Error>>,
    },
}

pub type PrepResult<T> = Result<T, PrepError>;

/// What a run writes and checks, on top of the settings file.
#[derive(Eq, PartialEq, Debug, Clone, Default)]
pub struct RunOptions {
    pub config_path: String,
    /// Overrides the output path of the settings.
    pub out_path: Option<String>,
    pub summary_path: Option<String>,
    pub reference_path: Option<String>,
}

#[derive(PartialEq, Debug, Clone)]
pub struct RunOutcome {
    pub out_path: String,
    pub counties: usize,
    /// SHA-256 of the panel file.
    pub digest: String,
}

fn read_year(settings: &PanelSettings, year: u16) -> PrepResult<YearSources> {
    let root = Path::new(&settings.data_root);
    let mut zips: Vec<u32> = Vec::new();
    for state in settings.states.iter() {
        let mut state_zips =
            io_preparers::read_listing_zips(&io_preparers::listing_path(root, year, state))?;
        info!("{} {}: {} listings", state, year, state_zips.len());
        zips.append(&mut state_zips);
    }
    let crosswalk = io_crosswalk::read_crosswalk(&io_crosswalk::crosswalk_path(root, year))?;
    let soi_overall = io_soi::read_soi(&io_soi::soi_path(root, year, io_soi::SoiCut::Overall))?;
    let soi_agi = io_soi::read_soi_agi(&io_soi::soi_path(root, year, io_soi::SoiCut::Agi))?;
    Ok(YearSources {
        year,
        preparer_counts: ZipCount::tally(zips),
        crosswalk,
        soi_overall,
        soi_agi,
    })
}

/// Reads every input of the panel. Any missing or malformed file stops the run.
pub fn read_sources(settings: &PanelSettings, config: &PanelConfig) -> PrepResult<PanelSources> {
    let root = Path::new(&settings.data_root);
    let current = read_year(settings, config.current_year)?;
    let prior = read_year(settings, config.prior_year)?;
    let rural_urban = io_rucc::read_rural_urban(&settings.rural_urban_path())?;
    let census = |schema: &io_census::CensusSchema| {
        io_census::read_census_table(&io_census::census_path(root, schema), schema)
    };
    Ok(PanelSources {
        current,
        prior,
        rural_urban,
        demographics: census(&io_census::DEMOGRAPHICS)?,
        education: census(&io_census::EDUCATION)?,
        economics: census(&io_census::ECONOMICS)?,
        marriage: census(&io_census::MARRIAGE)?,
    })
}

fn check_reference(reference_path: &str, produced: &str) -> PrepResult<()> {
    let reference = fs::read_to_string(reference_path).context(OpeningFileSnafu {
        path: reference_path,
    })?;
    if reference != produced {
        warn!("Found differences with the reference panel {}", reference_path);
        print_diff(reference.as_str(), produced, "\n");
        whatever!("Difference detected between the panel and the reference panel")
    }
    info!("Panel matches the reference {}", reference_path);
    Ok(())
}

pub fn run_panel(options: &RunOptions) -> PrepResult<RunOutcome> {
    let settings = read_settings(&options.config_path)?;
    debug!("settings: {:?}", settings);
    let config = settings.panel_config();

    let sources = read_sources(&settings, &config)?;
    let built = build_panel(&sources, &config).context(PanelSnafu {})?;
    for report in built.reports.iter() {
        info!(
            "{}: {} listings, {} apportioned, {} unmatched ZIP codes, {} counties ({} before exclusion)",
            report.year,
            report.input_mass,
            report.apportioned_mass,
            report.unmatched_zips,
            report.counties_after_exclusion,
            report.counties_before_exclusion
        );
    }

    let out_path = match &options.out_path {
        Some(p) => p.clone(),
        None => settings.output_path(),
    };
    let rendered = io_output::render_panel(&built.panel)?;
    if let Some(parent) = Path::new(&out_path).parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent).context(WritingSnafu {
                path: parent.display().to_string(),
            })?;
        }
    }
    fs::write(&out_path, rendered.as_bytes()).context(WritingSnafu {
        path: out_path.clone(),
    })?;
    let digest = sha256::digest(rendered.as_str());
    debug!("run_panel: wrote {} bytes to {}", rendered.len(), out_path);

    if let Some(summary_p) = &options.summary_path {
        let variables = settings.summary_variables();
        let rows = summary::summarize(&built.panel, &variables, &config).context(PanelSnafu {})?;
        io_output::write_summary(&PathBuf::from(summary_p), &rows)?;
        info!("Wrote {} summary rows to {}", rows.len(), summary_p);
    }

    if let Some(reference_p) = &options.reference_path {
        check_reference(reference_p, &rendered)?;
    }

    Ok(RunOutcome {
        out_path,
        counties: built.panel.len(),
        digest,
    })
}
