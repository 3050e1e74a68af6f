//! sitesearch CLI entry point

use clap::{Parser, Subcommand};
use sitesearch::{
    config::Config,
    crawl::Crawler,
    error::{Error, Result},
    models::Site,
    morph::DictMorphology,
    snippet::SnippetSearch,
    store::{SqliteStore, Store},
};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{error, info};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[derive(Parser)]
#[command(name = "sitesearch")]
#[command(version, about = "Crawl, lemmatize, and index websites; serve search snippets", long_about = None)]
struct Cli {
    /// Path to config file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Crawl and index every configured site (wipes the previous index)
    Crawl,

    /// Fetch and re-index a single page of a configured site
    Page {
        /// URL of the page
        url: String,
    },

    /// Print a highlighted snippet for a query against a stored page
    Snippet {
        /// Site URL the page belongs to
        #[arg(long)]
        site: String,

        /// Site-relative page path
        #[arg(long)]
        path: String,

        /// Search query
        query: String,
    },

    /// Show per-site crawl status
    Status {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        error!("{}", e);
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug"))
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };

    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(filter)
        .init();

    let config_path = cli.config.unwrap_or_else(Config::default_config_path);
    let config = Config::load(&config_path)?;

    let store = Arc::new(SqliteStore::connect(&config.database).await?);

    match cli.command {
        Commands::Crawl => {
            let morph = Arc::new(DictMorphology::load(&config.morphology.dictionary)?);
            let crawler = Arc::new(Crawler::new(store.clone(), morph, &config)?);

            // Ctrl-C requests a cooperative stop; in-flight fetches finish
            let handle = crawler.clone();
            tokio::spawn(async move {
                if tokio::signal::ctrl_c().await.is_ok() {
                    let _ = handle.stop_crawl();
                }
            });

            crawler.start_crawl().await?;
            print_status(&store.list_sites().await?, false);
        }
        Commands::Page { url } => {
            let morph = Arc::new(DictMorphology::load(&config.morphology.dictionary)?);
            let crawler = Crawler::new(store.clone(), morph, &config)?;
            let page = crawler.index_one(&url).await?;
            info!("Indexed {} (HTTP {})", url, page.code);
        }
        Commands::Snippet { site, path, query } => {
            let morph = Arc::new(DictMorphology::load(&config.morphology.dictionary)?);
            let site = store
                .site_by_url(&site)
                .await?
                .ok_or_else(|| Error::SiteNotFound(site))?;
            let page = store
                .page_by_path(site.id, &path)
                .await?
                .ok_or_else(|| Error::PageNotFound(path))?;

            let search = SnippetSearch::new(morph);
            println!("{}", search.snippet(&page.content, &query));
        }
        Commands::Status { json } => {
            print_status(&store.list_sites().await?, json);
        }
    }

    Ok(())
}

fn print_status(sites: &[Site], json: bool) {
    if json {
        match serde_json::to_string_pretty(sites) {
            Ok(text) => println!("{}", text),
            Err(e) => error!("Failed to serialize status: {}", e),
        }
        return;
    }

    if sites.is_empty() {
        println!("No sites indexed yet");
        return;
    }

    for site in sites {
        let error = site
            .last_error
            .as_deref()
            .map(|e| format!(" ({})", e))
            .unwrap_or_default();
        println!("{:10} {} [{}]{}", site.status, site.url, site.name, error);
    }
}
