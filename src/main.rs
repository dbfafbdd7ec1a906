//! Firestash main entry point
//!
//! Command-line front end for scraping single pages and crawling sites
//! through a Firecrawl-compatible service.

use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use firestash::api::ApiClient;
use firestash::config::{load_config_or_default, validate, validate_store_for_save, Config};
use firestash::options::{CrawlField, PageField};
use firestash::output::{render_crawl, render_persist_report, render_scrape};
use firestash::store::open_store;
use firestash::{CrawlFlow, ScrapeFlow};
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

/// Firestash: scrape and crawl through a remote service
///
/// Submits single-page scrapes or multi-page crawl jobs, waits for crawl
/// jobs to finish, prints the returned documents and optionally saves them
/// to a relational store or exports them as JSON.
#[derive(Parser, Debug)]
#[command(name = "firestash")]
#[command(version)]
#[command(about = "Scrape and crawl through a Firecrawl-compatible service", long_about = None)]
struct Cli {
    /// Path to TOML configuration file
    #[arg(short, long, value_name = "CONFIG", global = true)]
    config: Option<PathBuf>,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose", global = true)]
    quiet: bool,

    /// Scrape/crawl service base URL
    #[arg(long, env = "FIRECRAWL_API_URL", global = true)]
    api_url: Option<String>,

    /// Scrape/crawl service API key
    #[arg(long, env = "FIRECRAWL_API_KEY", hide_env_values = true, global = true)]
    api_key: Option<String>,

    /// REST store project URL
    #[arg(long, env = "SUPABASE_URL", global = true)]
    store_url: Option<String>,

    /// REST store API key
    #[arg(long, env = "SUPABASE_KEY", hide_env_values = true, global = true)]
    store_key: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Crawl a site starting at URL and wait for the results
    Crawl {
        /// Start URL
        url: String,

        /// Crawler option as key=value (limit, maxDepth, exclude, includes,
        /// ignoreSitemap, allowBackwardLinks)
        #[arg(long = "crawl", value_name = "KEY=VALUE")]
        crawl_options: Vec<CrawlField>,

        #[command(flatten)]
        actions: Actions,
    },

    /// Scrape a single URL
    Scrape {
        /// Page URL
        url: String,

        #[command(flatten)]
        actions: Actions,
    },

    /// Print the effective configuration and exit
    ShowConfig,
}

#[derive(Args, Debug)]
struct Actions {
    /// Page option as key=value (excludeTags, includeTags, waitFor,
    /// onlyMainContent, includeHtml, includeLinks, formats)
    #[arg(long = "page", value_name = "KEY=VALUE")]
    page_options: Vec<PageField>,

    /// Save results to the configured store
    #[arg(long)]
    save: bool,

    /// Export results as a JSON file
    #[arg(long)]
    download: bool,

    /// Print raw JSON instead of the text rendering
    #[arg(long)]
    json: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // A missing .env file is fine
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();
    setup_logging(cli.verbose, cli.quiet);

    let config = load_effective_config(&cli)?;

    match cli.command {
        Command::Crawl {
            url,
            crawl_options,
            actions,
        } => handle_crawl(&config, &url, crawl_options, actions).await,
        Command::Scrape { url, actions } => handle_scrape(&config, &url, actions).await,
        Command::ShowConfig => handle_show_config(&config),
    }
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("firestash=info,warn"),
            1 => EnvFilter::new("firestash=debug,info"),
            2 => EnvFilter::new("firestash=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}

/// Loads the config file (if any) and layers flag/environment overrides on top
fn load_effective_config(cli: &Cli) -> anyhow::Result<Config> {
    let mut config = load_config_or_default(cli.config.as_deref())
        .with_context(|| match &cli.config {
            Some(path) => format!("Failed to load configuration from {}", path.display()),
            None => "Failed to build default configuration".to_string(),
        })?;

    if let Some(url) = &cli.api_url {
        config.api.base_url = url.clone();
    }
    if let Some(key) = &cli.api_key {
        config.api.api_key = Some(key.clone());
    }
    if let Some(url) = &cli.store_url {
        config.store.rest_url = Some(url.clone());
    }
    if let Some(key) = &cli.store_key {
        config.store.rest_key = Some(key.clone());
    }

    validate(&config).context("Invalid configuration")?;
    Ok(config)
}

/// Handles `crawl`: create job, poll, render, then save/export on request
async fn handle_crawl(
    config: &Config,
    url: &str,
    crawl_options: Vec<CrawlField>,
    actions: Actions,
) -> anyhow::Result<()> {
    if actions.save {
        validate_store_for_save(&config.store).context("Cannot save results")?;
    }

    let client = ApiClient::new(&config.api)?;
    let mut flow = CrawlFlow::new(client, config.polling.clone());
    flow.update_crawl_options(crawl_options);
    flow.update_page_options(actions.page_options);

    tracing::info!("Starting crawl of {}", url);
    flow.submit(url).await?;

    let mut stdout = std::io::stdout().lock();
    if actions.json {
        serde_json::to_writer_pretty(&mut stdout, flow.results())?;
        writeln!(stdout)?;
    } else {
        render_crawl(&mut stdout, flow.job_id().unwrap_or_default(), flow.results())?;
    }
    drop(stdout);

    if actions.download {
        if let Some(path) = flow.download(Path::new(&config.export.directory))? {
            println!("Exported to {}", path.display());
        }
    }

    if actions.save {
        let store = open_store(&config.store)?;
        if let Some(report) = flow.save(store.as_ref()).await {
            render_persist_report(&mut std::io::stdout(), &report)?;
        }
    }

    Ok(())
}

/// Handles `scrape`: one request, render, then save/export on request
async fn handle_scrape(config: &Config, url: &str, actions: Actions) -> anyhow::Result<()> {
    if actions.save {
        validate_store_for_save(&config.store).context("Cannot save results")?;
    }

    let client = ApiClient::new(&config.api)?;
    let mut flow = ScrapeFlow::new(client);
    flow.update_page_options(actions.page_options);

    tracing::info!("Scraping {}", url);
    let result = flow.submit(url).await?;

    let mut stdout = std::io::stdout().lock();
    if actions.json {
        serde_json::to_writer_pretty(&mut stdout, result)?;
        writeln!(stdout)?;
    } else {
        render_scrape(&mut stdout, result)?;
    }
    drop(stdout);

    if actions.download {
        if let Some(path) = flow.download(Path::new(&config.export.directory))? {
            println!("Exported to {}", path.display());
        }
    }

    if actions.save {
        let store = open_store(&config.store)?;
        if let Some(report) = flow.save(store.as_ref()).await {
            render_persist_report(&mut std::io::stdout(), &report)?;
        }
    }

    Ok(())
}

/// Handles `show-config`: prints the effective configuration with keys masked
fn handle_show_config(config: &Config) -> anyhow::Result<()> {
    let mut shown = config.clone();
    shown.api.api_key = shown.api.api_key.as_deref().map(mask);
    shown.store.rest_key = shown.store.rest_key.as_deref().map(mask);

    println!("=== Firestash Configuration ===\n");
    print!("{}", toml::to_string_pretty(&shown)?);
    Ok(())
}

fn mask(secret: &str) -> String {
    let visible: String = secret.chars().take(4).collect();
    format!("{}…", visible)
}
