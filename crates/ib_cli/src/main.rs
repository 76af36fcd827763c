use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use tracing::{info, Level};

use ib_analysis::{create_providers, ProviderConfig};
use ib_core::{ArticleStore, Error, Result, SourceStore};
use ib_ingest::{default_sources, Curator, RssFetcher};
use ib_storage::{MemoryStorage, SqliteStorage};
use ib_web::AppState;

#[derive(Parser, Debug)]
#[command(author, version, about = "IntelBrief news curation service", long_about = None)]
struct Cli {
    /// Storage backend: sqlite or memory
    #[arg(long, default_value = "sqlite")]
    storage: String,
    /// Database file for the sqlite backend
    #[arg(long, default_value = "intelbrief.db")]
    db_path: PathBuf,
    #[command(subcommand)]
    command: Commands,
}

#[derive(clap::Subcommand, Debug)]
enum Commands {
    /// Run the HTTP service with the scheduled curation trigger
    Serve {
        #[arg(long, default_value = "0.0.0.0:9002")]
        addr: String,
    },
    /// Run one curation pass and print the summary
    Curate,
    /// Inspect or seed the configured feed sources
    Sources {
        #[command(subcommand)]
        command: SourceCommands,
    },
}

#[derive(clap::Subcommand, Debug)]
enum SourceCommands {
    /// List the sources a run would poll
    List,
    /// Insert the curated default source set, skipping known feeds
    Seed,
}

async fn build_storage(cli: &Cli) -> Result<(Arc<dyn ArticleStore>, Arc<dyn SourceStore>)> {
    match cli.storage.as_str() {
        "memory" => {
            let storage = Arc::new(MemoryStorage::new());
            Ok((storage.clone(), storage))
        }
        "sqlite" => {
            let storage = Arc::new(SqliteStorage::new_with_path(&cli.db_path).await?);
            info!("🏦 Storage backend initialized (sqlite at {})", cli.db_path.display());
            Ok((storage.clone(), storage))
        }
        other => Err(Error::Storage(format!("unknown storage backend: {}", other))),
    }
}

fn build_curator(articles: Arc<dyn ArticleStore>, sources: Arc<dyn SourceStore>) -> Curator {
    let providers = create_providers(&ProviderConfig::from_env());
    Curator::new(articles, sources, Arc::new(RssFetcher::new()), providers)
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt().with_max_level(Level::INFO).init();

    let cli = Cli::parse();
    let (articles, sources) = build_storage(&cli).await?;

    match cli.command {
        Commands::Serve { addr } => {
            let cron_secret = std::env::var("CRON_SECRET")
                .map_err(|_| Error::Config("CRON_SECRET is not set".to_string()))?;
            let curator = build_curator(articles.clone(), sources.clone());
            ib_web::serve(
                AppState {
                    curator,
                    articles,
                    sources,
                    cron_secret,
                },
                &addr,
            )
            .await?;
        }
        Commands::Curate => {
            let curator = build_curator(articles, sources);
            let summary = curator.run().await?;
            println!("{}", summary.message());
            for title in &summary.titles {
                println!("  + {}", title);
            }
        }
        Commands::Sources { command } => match command {
            SourceCommands::List => {
                for source in sources.list_sources().await? {
                    println!("{:<22} {} ({})", source.id, source.name, source.feed_url);
                }
            }
            SourceCommands::Seed => {
                let existing = sources.list_sources().await?;
                let mut seeded = 0;
                for source in default_sources() {
                    if existing.iter().any(|s| s.feed_url == source.feed_url) {
                        continue;
                    }
                    sources.add_source(&source).await?;
                    seeded += 1;
                }
                println!("Seeded {} new sources", seeded);
            }
        },
    }

    Ok(())
}
