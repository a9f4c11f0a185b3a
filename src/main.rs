mod args;
mod panel;

use clap::Parser;
use log::{info, warn};
use snafu::ErrorCompat;

use crate::args::Args;
use crate::panel::{run_panel, RunOptions};

fn main() {
    let args = Args::parse();

    let default_filter = if args.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .init();
    info!("args: {:?}", args);

    let options = RunOptions {
        config_path: args.config.clone(),
        out_path: args.out.clone(),
        summary_path: args.summary.clone(),
        reference_path: args.reference.clone(),
    };

    match run_panel(&options) {
        Ok(outcome) => {
            info!(
                "Panel with {} counties written to {} (sha256 {})",
                outcome.counties, outcome.out_path, outcome.digest
            );
        }
        Err(e) => {
            warn!("Error occurred {:?}", e);
            eprintln!("An error occurred:");
            for cause in ErrorCompat::iter_chain(&e) {
                eprintln!("  {}", cause);
            }
            std::process::exit(1);
        }
    }
}
