use crate::reports;
use clap::Args;
use classforge::config::Config;
use classforge::error::AsResult;
use classforge::optimizer::{extract_best, GenerationStats, OptimizationOptions, Optimizer};
use classforge::problem::{Problem, ProblemSettings};
use classforge::provider::{CsvRecordProvider, RecordFilter, RecordProvider};
use classforge::store::{save_assignment, save_front, CsvAssignmentStore};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::info;

#[derive(Args, Debug, Clone)]
pub struct OptimizeArgs {
    #[command(flatten)]
    pub config: Config,

    #[command(flatten)]
    pub filter: RecordFilter,

    /// Assignment table to (re)write
    #[arg(short, long, default_value = "assignments.csv")]
    pub out: PathBuf,

    /// Optional file receiving the final front's objective vectors
    #[arg(long)]
    pub front_out: Option<PathBuf>,

    /// Tag stored with the front rows
    #[arg(long)]
    pub label: Option<String>,

    /// Run and report without writing anything
    #[arg(long, default_value_t = false)]
    pub dry_run: bool,
}

pub fn run(args: &OptimizeArgs, config: Config, data: &Path) -> AsResult<()> {
    info!("📂 Loading records from: {}", data.display());
    let provider = CsvRecordProvider::new(data);
    let records = args.filter.apply(provider.load_all());

    let problem = Arc::new(Problem::new(records, ProblemSettings::from(&config.model))?);
    let optimizer = Optimizer::new(problem.clone(), OptimizationOptions::from(&config))?;

    let report_every = (config.search.generations / 10).max(1);
    let progress = move |s: &GenerationStats| {
        if s.generation % report_every == 0 {
            info!(
                "Gen {:5} | Front {:4} | Feasible {:4} | Min CV {:.0}",
                s.generation, s.front_size, s.feasible, s.min_violation
            );
        }
    };

    let result = optimizer.run(&progress)?;
    let best = extract_best(&result, config.model.tie_break)?;

    println!("\n=== 🏆 FINAL RESULT ===");
    reports::print_front_summary(problem.profile(), &result.front);
    reports::print_best(problem.profile(), best);
    println!(
        "Objectives: {}",
        best.objectives
            .iter()
            .map(|v| format!("{:.6}", v))
            .collect::<Vec<_>>()
            .join(" ")
    );
    println!(
        "Violations: {}",
        best.violations
            .iter()
            .map(|v| format!("{:.0}", v))
            .collect::<Vec<_>>()
            .join(" ")
    );

    if args.dry_run {
        info!("🧪 Dry run: nothing written");
        return Ok(());
    }

    let store = CsvAssignmentStore::new(&args.out);
    save_assignment(&store, &problem, best)?;

    if let Some(path) = &args.front_out {
        let label = args.label.clone().unwrap_or_else(|| {
            format!(
                "seed{}-pop{}-gen{}",
                config.search.seed, config.search.pop_size, config.search.generations
            )
        });
        save_front(path, &label, &result.front)?;
    }

    Ok(())
}
