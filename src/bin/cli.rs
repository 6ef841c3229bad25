//! eduroam discovery CLI
//!
//! Local execution entry point. For AWS Lambda, use `discovery-lambda`.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use eduroam_discovery::{
    config::load_config,
    error::Result,
    pipeline::{self, PublishOutcome, Snapshot},
    services::ProfileClassifier,
    storage::{LocalStorage, SnapshotStorage},
    utils::http,
};

/// eduroam discovery feed generator
#[derive(Parser, Debug)]
#[command(
    name = "discovery",
    version,
    about = "Generate the eduroam discovery feed from the CAT catalog"
)]
struct Cli {
    /// Path to the configuration file
    #[arg(short, long, default_value = "discovery.toml")]
    config: PathBuf,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Fetch the catalog and write the feed if it changed
    Generate {
        /// Output file (default: output.file_path from the config)
        #[arg(long)]
        file_path: Option<PathBuf>,

        /// Write even when the institutions did not change
        #[arg(long)]
        force: bool,

        /// HTTPS prefix to route letswifi endpoints through
        #[arg(long)]
        stub_prefix: Option<String>,

        /// Host that keeps its own letswifi endpoint (repeatable)
        #[arg(long = "stub-exempt")]
        stub_exempt: Vec<String>,
    },

    /// Validate configuration
    Validate,

    /// Show stored snapshot info
    Info {
        /// Snapshot file (default: output.file_path from the config)
        #[arg(long)]
        file_path: Option<PathBuf>,
    },
}

/// Initialize logging based on verbosity flag.
fn init_logging(verbose: bool) {
    let level = if verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp_secs()
        .init();
}

/// Main entry point for the CLI application.
#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let mut config = load_config(&cli.config);
    log::debug!("Loaded configuration from {}", cli.config.display());

    match cli.command {
        Command::Generate {
            file_path,
            force,
            stub_prefix,
            stub_exempt,
        } => {
            if stub_prefix.is_some() {
                config.discovery.stub_prefix = stub_prefix;
            }
            if !stub_exempt.is_empty() {
                config.discovery.stub_exempt_hosts = stub_exempt;
            }
            config.validate()?;

            let path = file_path.unwrap_or_else(|| PathBuf::from(&config.output.file_path));
            let storage = LocalStorage::new(path);
            let client = http::create_async_client(&config.catalog)?;

            match pipeline::run_publish(&config, &storage, &client, force).await? {
                PublishOutcome::Published {
                    seq,
                    institutions,
                    location,
                    ..
                } => {
                    println!("Storing discovery seq {seq}");
                    log::info!("{institutions} institutions written to {location}");
                }
                PublishOutcome::Unchanged { seq } => println!("Unchanged {seq}"),
            }
        }

        Command::Validate => {
            log::info!("Validating configuration...");

            if let Err(e) = config.validate() {
                log::error!("Config validation failed: {}", e);
                return Err(e);
            }
            ProfileClassifier::new(&config)?;

            log::info!("Catalog: {}", config.catalog.listing_url());
            log::info!("Sigil: {}", config.discovery.sigil);
            match &config.discovery.stub_prefix {
                Some(prefix) => log::info!(
                    "Stub prefix: {} ({} exempt hosts)",
                    prefix,
                    config.discovery.stub_exempt_hosts.len()
                ),
                None => log::info!("Stub prefix: none"),
            }
            log::info!(
                "Hidden: {} institutions, {} profiles",
                config.discovery.hidden_institutions.len(),
                config.discovery.hidden_profiles.len()
            );
            log::info!("All validations passed!");
        }

        Command::Info { file_path } => {
            let path = file_path.unwrap_or_else(|| PathBuf::from(&config.output.file_path));
            let storage = LocalStorage::new(path);
            let sigil = config.discovery.sigil.as_str();

            match storage.read_snapshot().await? {
                None => log::info!("No snapshot found at {}", storage.location()),
                Some(bytes) => match Snapshot::parse(&bytes, sigil) {
                    Some(snapshot) => {
                        log::info!("Snapshot: {}", storage.location());
                        log::info!("Sigil: {sigil}");
                        match snapshot.seq(sigil) {
                            Some(seq) => log::info!("Seq: {seq}"),
                            None => log::warn!("Seq: missing or invalid"),
                        }
                        match snapshot.institutions(sigil) {
                            Some(list) => log::info!("Institutions: {}", list.len()),
                            None => log::warn!("Institutions: missing or not a list"),
                        }
                    }
                    None => log::warn!("Snapshot at {} is unreadable", storage.location()),
                },
            }
        }
    }

    Ok(())
}
