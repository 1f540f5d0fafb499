use crate::reports;
use clap::Args;
use classforge::error::AsResult;
use classforge::store::{AssignmentStore, CsvAssignmentStore};
use std::path::PathBuf;
use tracing::{info, warn};

#[derive(Args, Debug, Clone)]
pub struct ReportArgs {
    /// Assignment table written by `optimize`
    #[arg(short, long, default_value = "assignments.csv")]
    pub input: PathBuf,
}

pub fn run(args: &ReportArgs) -> AsResult<()> {
    let store = CsvAssignmentStore::new(&args.input);
    let rows = store.load_all()?;
    info!("📄 Read {} rows from {}", rows.len(), args.input.display());

    if rows.is_empty() {
        warn!("⚠️  Assignment table is empty");
        return Ok(());
    }

    reports::print_assignment_report(&rows);
    Ok(())
}
