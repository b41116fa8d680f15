use anyhow::Context;
use clap::{Parser, Subcommand};
use jobsweep::page::{PageSnapshot, SnapshotPage};
use jobsweep::{Category, JobsweepBuilder, JobsweepError};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "jobsweep")]
#[command(about = "Filter-matching and dismissal tracking for job listings", long_about = None)]
#[command(version)]
struct Cli {
    /// Path to the JSON store file
    #[arg(short, long, default_value = "jobsweep.json")]
    store: PathBuf,

    /// Enable debug logging
    #[arg(short, long)]
    debug: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Add filter patterns to a list (comma/semicolon separated)
    Add {
        /// Target list: companies or titles
        category: String,
        /// Raw pattern input, e.g. "Acme, Globex" or "/^senior/"
        patterns: String,
    },
    /// Remove one exact pattern from a list
    Remove {
        /// Target list: companies or titles
        category: String,
        /// The stored pattern string to remove
        pattern: String,
    },
    /// Print both filter lists
    List,
    /// Reset both filter lists (counter and install date are kept)
    Clear,
    /// Print the dismissed counter and install date
    Stats,
    /// Scan a page snapshot and dismiss matching jobs
    Sweep {
        /// Page snapshot JSON file
        snapshot: PathBuf,
        /// Leave the snapshot file unchanged after the sweep
        #[arg(long)]
        no_write: bool,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Setup logging
    if cli.debug {
        tracing_subscriber::fmt::init();
    } else {
        tracing_subscriber::fmt()
            .with_max_level(tracing::Level::WARN)
            .init();
    }

    let sweep = JobsweepBuilder::new()
        .store_file(&cli.store)
        .build()
        .await
        .with_context(|| format!("opening store {}", cli.store.display()))?;
    let store = sweep.store();

    match cli.command {
        Command::Add { category, patterns } => {
            let category: Category = category.parse()?;
            let list = store.add_patterns(category, &patterns).await?;
            println!("{}: {}", category, list.join(", "));
        }
        Command::Remove { category, pattern } => {
            let category: Category = category.parse()?;
            let list = store.remove_pattern(category, &pattern).await?;
            println!("{}: {}", category, list.join(", "));
        }
        Command::List => {
            for category in [Category::Companies, Category::Titles] {
                let list = store.patterns(category).await?;
                println!("{}: {}", category, list.join(", "));
            }
        }
        Command::Clear => {
            store.clear_all().await?;
            println!("filter lists cleared");
        }
        Command::Stats => {
            println!("dismissed: {}", store.dismissed_count().await?);
            println!("installed: {}", store.install_date().await?.to_rfc3339());
        }
        Command::Sweep { snapshot, no_write } => {
            let page_snapshot = PageSnapshot::load(&snapshot)
                .await
                .with_context(|| format!("loading snapshot {}", snapshot.display()))?;
            let page = SnapshotPage::new(&page_snapshot);

            match sweep.sweep(&page).await {
                Ok(report) => {
                    let dismissed = report.dismissed();
                    let confirmed = report.settle().await;
                    println!("dismissed {} job(s), {} confirmed", dismissed, confirmed);
                    if !no_write {
                        page.to_snapshot().save(&snapshot).await?;
                    }
                }
                Err(JobsweepError::NotOnTargetSite) => {
                    // The popup surfaces this as an alert; the CLI prints it
                    eprintln!("error: this snapshot is not from the target job site");
                    std::process::exit(1);
                }
                Err(e) => return Err(e.into()),
            }
        }
    }

    Ok(())
}
