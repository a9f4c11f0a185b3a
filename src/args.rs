use clap::Parser;

/// Builds the county-level panel of paid tax preparer usage from IRS, Census and USDA files.
#[derive(Parser, Debug, Clone)]
#[clap(author, version, about, long_about = None)]
pub struct Args {
    /// (file path) The JSON settings: data root, states, years and inflation multiplier.
    /// Relative paths in the settings are resolved against the directory of this file.
    #[clap(short, long, value_parser)]
    pub config: String,

    /// (file path, optional) Where to write the panel in CSV format. Setting this option overrides
    /// the output path that may be specified in the settings.
    #[clap(short, long, value_parser)]
    pub out: Option<String>,

    /// (file path, optional) A previously produced panel. If provided, the program checks that the
    /// new panel is identical and prints the differences otherwise.
    #[clap(short, long, value_parser)]
    pub reference: Option<String>,

    /// (file path, optional) If specified, summary statistics of the configured variables are
    /// written in CSV format to the given location.
    #[clap(short, long, value_parser)]
    pub summary: Option<String>,

    // Other arguments
    /// If passed as an argument, will turn on verbose logging to the standard output.
    #[clap(long, takes_value = false)]
    pub verbose: bool,
}
