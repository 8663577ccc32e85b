//! pubcontent - `PublishedContent` listing CLI.

/// Application configuration (TOML).
mod config;

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::instrument;
use tracing_subscriber::filter::EnvFilter;
#[cfg(not(feature = "otel"))]
use tracing_subscriber::fmt;
#[cfg(feature = "otel")]
use tracing_subscriber::layer::SubscriberExt;
#[cfg(feature = "otel")]
use tracing_subscriber::util::SubscriberInitExt;

use crate::config::AppConfig;
use pubcontent_api::listing::{
    ContentListingApi, ContentListingClient, ListingPath, collect_files,
};

/// CLI argument parser.
#[derive(Parser)]
#[command(about, version)]
struct Cli {
    /// Override config directory.
    #[arg(long, global = true)]
    dir: Option<PathBuf>,

    /// Listing host (overrides `server.hostname` in the config file).
    #[arg(long, global = true)]
    host: Option<String>,

    /// Subcommand to run.
    #[command(subcommand)]
    command: Commands,
}

/// Available subcommands.
#[derive(Subcommand)]
enum Commands {
    /// List the roots available on the host.
    Paths,
    /// List directories and files under a root.
    Items(ItemsArgs),
    /// Recursively list every file under a root.
    Walk(ItemsArgs),
    /// Fetch a published XML file and print it as JSON.
    File(FileArgs),
    /// Show or update the config file.
    Config(ConfigCommand),
}

/// Arguments for the `items` and `walk` subcommands.
#[derive(clap::Args)]
struct ItemsArgs {
    /// Listing root (e.g. `BestBets`). See `pubcontent paths`.
    #[arg(long, required = true)]
    root: String,

    /// Path under the root (e.g. "/about-cancer").
    #[arg(long, default_value = "/")]
    path: String,
}

/// Arguments for the `file` subcommand.
#[derive(clap::Args)]
struct FileArgs {
    /// Full web path of the file (e.g. `/PublishedContent/BestBets/1045389.xml`).
    #[arg(long, required = true)]
    path: String,
}

/// Arguments for the `config` subcommand.
#[derive(clap::Args)]
struct ConfigCommand {
    /// Config subcommand to run.
    #[command(subcommand)]
    command: ConfigSubcommands,
}

/// Available config subcommands.
#[derive(Subcommand)]
enum ConfigSubcommands {
    /// Print the effective configuration.
    Show,
    /// Update values in the config file.
    Set(ConfigSetArgs),
}

/// Arguments for the `config set` subcommand.
#[derive(clap::Args)]
struct ConfigSetArgs {
    /// Listing host to store.
    #[arg(long)]
    hostname: Option<String>,

    /// User-Agent to store.
    #[arg(long)]
    user_agent: Option<String>,
}

/// Builds a listing client from the config file and `--host`.
fn build_client(host: Option<&str>, dir: Option<&Path>) -> Result<ContentListingClient> {
    let (_, config) = AppConfig::load_from(dir).context("failed to load config")?;
    let hostname = config.resolve_hostname(host);

    tracing::debug!(%hostname, "Using listing host");

    let mut builder = ContentListingClient::builder().hostname(hostname);
    if let Some(ua) = config.server.user_agent {
        builder = builder.user_agent(ua);
    }
    builder.build().context("failed to build API client")
}

/// Runs the `paths` subcommand.
///
/// # Errors
///
/// Returns an error if the request fails.
#[instrument(skip_all)]
async fn run_paths(client: &ContentListingClient) -> Result<()> {
    let paths = client
        .list_available_paths()
        .await
        .context("failed to list available paths")?;

    tracing::info!("Root\t\t\tDisplayName\t\t\tUrl");
    for p in &paths {
        tracing::info!(
            "{}\t\t{}\t\t{}",
            p.root.as_deref().unwrap_or("-"),
            p.display_name,
            p.url
        );
    }
    tracing::info!("Total: {} roots", paths.len());

    Ok(())
}

/// Runs the `items` subcommand.
///
/// # Errors
///
/// Returns an error if the listing request fails.
#[instrument(skip_all)]
async fn run_items(client: &ContentListingClient, args: &ItemsArgs) -> Result<()> {
    let path = ListingPath::from(args.path.as_str());
    let listing = client
        .get_items_for_path(&args.root, &path)
        .await
        .context("failed to list items")?;

    for dir in &listing.directories {
        tracing::info!("{}/", path.join(dir));
    }
    for file in &listing.files {
        tracing::info!(
            "{}\t{}\t{}",
            file.full_web_path,
            file.creation_time,
            file.last_write_time
        );
    }
    tracing::info!(
        "Total: {} directories, {} files",
        listing.directories.len(),
        listing.files.len()
    );

    Ok(())
}

/// Runs the `walk` subcommand.
///
/// # Errors
///
/// Returns an error if any listing request fails.
#[instrument(skip_all)]
async fn run_walk(client: &ContentListingClient, args: &ItemsArgs) -> Result<()> {
    let start = ListingPath::from(args.path.as_str());
    let files = collect_files(client, &args.root, &start)
        .await
        .with_context(|| format!("failed to walk {} under {}", start, args.root))?;

    for file in &files {
        tracing::info!("{}\t{}", file.full_web_path, file.last_write_time);
    }
    tracing::info!("Total: {} files", files.len());

    Ok(())
}

/// Runs the `file` subcommand.
///
/// # Errors
///
/// Returns an error if the file cannot be fetched or is not valid XML.
#[instrument(skip_all)]
async fn run_file(client: &ContentListingClient, args: &FileArgs) -> Result<()> {
    let value = client
        .fetch_published_file(&args.path)
        .await
        .context("failed to fetch published file")?;

    let json = serde_json::to_string_pretty(&value).context("failed to render XML as JSON")?;
    tracing::info!("{json}");

    Ok(())
}

/// Runs the `config` subcommand.
///
/// # Errors
///
/// Returns an error if the config file cannot be read or written.
fn run_config(cmd: &ConfigCommand, host: Option<&str>, dir: Option<&Path>) -> Result<()> {
    let (config_path, mut config) = AppConfig::load_from(dir).context("failed to load config")?;

    match &cmd.command {
        ConfigSubcommands::Show => {
            tracing::info!("Config file: {}", config_path.display());
            tracing::info!("hostname = {}", config.resolve_hostname(host));
            tracing::info!(
                "user_agent = {}",
                config.server.user_agent.as_deref().unwrap_or("(default)")
            );
        }
        ConfigSubcommands::Set(args) => {
            if args.hostname.is_none() && args.user_agent.is_none() {
                anyhow::bail!("nothing to set: pass --hostname and/or --user-agent");
            }
            if let Some(ref hostname) = args.hostname {
                config.server.hostname = Some(hostname.clone());
            }
            if let Some(ref ua) = args.user_agent {
                config.server.user_agent = Some(ua.clone());
            }
            config.save(&config_path).context("failed to save config")?;
            tracing::info!("Saved {}", config_path.display());
        }
    }

    Ok(())
}

/// Entry point.
///
/// # Errors
///
/// Returns an error if subcommand execution fails.
#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    #[cfg(not(feature = "otel"))]
    {
        fmt()
            .with_env_filter(
                EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
            )
            .with_target(false)
            .init();
    }

    #[cfg(feature = "otel")]
    {
        let env_filter =
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
        let fmt_layer = tracing_subscriber::fmt::layer().with_target(false);

        let otel_layer = std::env::var("OTEL_EXPORTER_OTLP_ENDPOINT")
            .ok()
            .and_then(|_| {
                let exporter = opentelemetry_otlp::SpanExporter::builder()
                    .with_http()
                    .build()
                    .ok()?;

                let tracer_provider = opentelemetry_sdk::trace::SdkTracerProvider::builder()
                    .with_simple_exporter(exporter)
                    .build();

                let tracer = opentelemetry::trace::TracerProvider::tracer(
                    &tracer_provider,
                    env!("CARGO_PKG_NAME"),
                );
                opentelemetry::global::set_tracer_provider(tracer_provider);

                Some(tracing_opentelemetry::layer().with_tracer(tracer))
            });

        tracing_subscriber::registry()
            .with(env_filter)
            .with(fmt_layer)
            .with(otel_layer)
            .init();
    }

    let cli = Cli::parse();
    let host = cli.host.as_deref();
    let dir = cli.dir.as_deref();

    match &cli.command {
        Commands::Config(cmd) => run_config(cmd, host, dir),
        Commands::Paths => run_paths(&build_client(host, dir)?).await,
        Commands::Items(args) => run_items(&build_client(host, dir)?, args).await,
        Commands::Walk(args) => run_walk(&build_client(host, dir)?, args).await,
        Commands::File(args) => run_file(&build_client(host, dir)?, args).await,
    }
}
