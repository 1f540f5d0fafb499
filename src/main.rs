use clap::{ArgMatches, CommandFactory, FromArgMatches, Parser, Subcommand};
use classforge::config::Config;
use classforge::error::AsResult;
use std::path::{Path, PathBuf};
use std::process;
use tracing::{error, info, Level};

mod cmd;
mod reports;

#[derive(Parser, Debug)]
#[command(author, version, about = "Evolutionary student/teacher class assignment", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Directory holding students.csv, teachers.csv, classes.csv, establishments.csv
    #[arg(global = true, short, long, default_value = "data")]
    data: PathBuf,

    /// JSON file with search/model parameters; explicit flags win
    #[arg(global = true, short, long)]
    config: Option<PathBuf>,

    #[arg(global = true, long, default_value_t = false)]
    debug: bool,
}

#[derive(Subcommand, Debug)]
enum Commands {
    Optimize(cmd::optimize::OptimizeArgs),
    Validate(cmd::validate::ValidateArgs),
    Report(cmd::report::ReportArgs),
}

fn main() {
    let matches = Cli::command().get_matches();
    let cli = Cli::from_arg_matches(&matches).unwrap_or_else(|e| e.exit());

    let level = if cli.debug { Level::DEBUG } else { Level::INFO };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .init();

    let outcome = match &cli.command {
        Commands::Optimize(args) => {
            resolve_config(cli.config.as_deref(), &args.config, matches.subcommand_matches("optimize"))
                .and_then(|config| cmd::optimize::run(args, config, &cli.data))
        }
        Commands::Validate(args) => {
            resolve_config(cli.config.as_deref(), &args.config, matches.subcommand_matches("validate"))
                .and_then(|config| cmd::validate::run(args, config, &cli.data))
        }
        Commands::Report(args) => cmd::report::run(args),
    };

    if let Err(e) = outcome {
        error!("❌ {}", e);
        process::exit(1);
    }
}

/// File values form the base, flags typed on the command line override them.
fn resolve_config(path: Option<&Path>, from_cli: &Config, sub: Option<&ArgMatches>) -> AsResult<Config> {
    let config = match path {
        Some(p) => {
            info!("⚙️  Loading config from: {}", p.display());
            let mut file_cfg = Config::load_from_file(p)?;
            if let Some(m) = sub {
                file_cfg.merge_from_cli(from_cli, m);
            }
            file_cfg
        }
        None => from_cli.clone(),
    };
    config.validate()?;
    Ok(config)
}
