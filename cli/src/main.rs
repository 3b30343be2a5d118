mod view;

use std::path::PathBuf;

use anyhow::{anyhow, Result};
use clap::Parser;
use sheetpush_core::{
    parse_entry_args, Config, FileLedgerRepository, FilePendingRepository, PushEntryFailed,
    PushService,
};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "sheetpush")]
#[command(about = "Push tracked time into a monthly spreadsheet ledger", long_about = None)]
struct Cli {
    /// Directory holding config.json and the pending batch (default: ~/.sheetpush)
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(clap::Subcommand)]
enum Commands {
    /// Queue an entry (usage: add petzi_dev_website 1h30 Fixed the login form date:yesterday)
    Add {
        #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
        args: Vec<String>,
    },
    /// List queued entries
    Pending,
    /// Drop a queued entry by ID prefix
    Discard { id: String },
    /// Merge queued entries into the ledger
    Push {
        /// Show the cells that would be written without writing them
        #[arg(long)]
        dry_run: bool,
    },
    /// List projects, activities and their aliases
    Projects,
    /// Create a ledger file with one sheet per month of YEAR
    InitLedger { year: i32 },
}

fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn main() -> Result<()> {
    init_logging();
    let cli = Cli::parse();
    let config = Config::load(cli.data_dir.clone())?;
    tracing::debug!(ledger = %config.ledger_path.display(), "loaded config");

    let service = PushService::new(
        FileLedgerRepository::new(&config.ledger_path),
        FilePendingRepository::new(cli.data_dir)?,
        config.activity_mapping()?,
        config.layout.clone(),
    );

    match cli.command {
        Commands::Add { args } => {
            if args.is_empty() {
                return Err(anyhow!("Usage: add <alias> <duration> [description...] [date:<when>]"));
            }
            let entry = parse_entry_args(&args).into_entry()?;
            let queued = service.push_entry(entry)?;
            println!(
                "Queued {:.2}h on {} for {} (ID: {})",
                queued.entry.duration,
                queued.entry.date,
                queued.entry.alias,
                &queued.id.to_string()[..8]
            );
        }
        Commands::Pending => {
            view::show_pending(&service.pending()?);
        }
        Commands::Discard { id } => {
            let removed = service.discard(&id)?;
            println!(
                "Discarded {} ({}h on {})",
                removed.entry.alias, removed.entry.duration, removed.entry.date
            );
        }
        Commands::Push { dry_run } => match service.flush_pending_entries(dry_run) {
            Ok(report) => view::show_report(&report),
            Err(err) => {
                if let Some(failed) = err.downcast_ref::<PushEntryFailed>() {
                    eprintln!("Push failed: {}", failed);
                    std::process::exit(1);
                }
                return Err(err);
            }
        },
        Commands::Projects => {
            view::show_projects(service.list_projects());
        }
        Commands::InitLedger { year } => {
            let ledger = FileLedgerRepository::scaffold(&config.ledger_path, year, &config.layout)?;
            println!("Ledger for {} created at {}", year, ledger.path().display());
        }
    }
    Ok(())
}
