use crate::reports;
use clap::Args;
use classforge::config::Config;
use classforge::error::AsResult;
use classforge::problem::{Problem, ProblemSettings};
use classforge::provider::{CsvRecordProvider, RecordFilter, RecordProvider};
use std::path::Path;
use tracing::info;

#[derive(Args, Debug, Clone)]
pub struct ValidateArgs {
    #[command(flatten)]
    pub config: Config,

    #[command(flatten)]
    pub filter: RecordFilter,
}

pub fn run(args: &ValidateArgs, config: Config, data: &Path) -> AsResult<()> {
    let provider = CsvRecordProvider::new(data);
    provider.health_check()?;
    info!("🔎 Tables present in {}", data.display());

    let records = args.filter.apply(provider.load_all());
    let problem = Problem::new(records, ProblemSettings::from(&config.model))?;

    reports::print_input_summary(&problem);
    println!("✅ Input is valid");
    Ok(())
}
