// ABOUTME: Entry point for the tagtrim CLI application.
// ABOUTME: Parses arguments, resolves configuration, and dispatches to command handlers.

mod cli;

use clap::Parser;
use cli::{Cli, Commands, RetentionArgs, TargetArgs};
use serde::Serialize;
use std::env;
use std::path::Path;
use tagtrim::cleanup;
use tagtrim::config::{self, CONFIG_FILENAME, Config, FileConfig, Overrides};
use tagtrim::error::Result;
use tagtrim::output::{Output, OutputMode};
use tagtrim::protect::ProtectionSet;
use tagtrim::registry::{HubClient, Session};
use tagtrim::types::{Tag, format_mb};
use tracing_subscriber::EnvFilter;

#[tokio::main(flavor = "current_thread")]
async fn main() {
    let cli = Cli::parse();

    // --verbose wins over RUST_LOG
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();

    let mode = if cli.json {
        OutputMode::Json
    } else if cli.quiet {
        OutputMode::Quiet
    } else {
        OutputMode::Normal
    };
    let mut output = Output::new(mode);
    output.start_timer();

    if let Err(e) = run(cli, &output).await {
        output.error(&e.to_string());
        std::process::exit(1);
    }
}

async fn run(cli: Cli, output: &Output) -> Result<()> {
    let config_path = cli.config;
    match cli.command {
        Commands::Init { repository, force } => {
            let cwd = env::current_dir()?;
            config::init_config(&cwd, repository.as_deref(), force)?;
            output.success(&format!("Created {CONFIG_FILENAME}"), &CONFIG_FILENAME);
            Ok(())
        }
        Commands::Run {
            target,
            retention,
            dry_run,
        } => {
            let config = load_config(config_path.as_deref(), overrides(target, Some(retention)))?;
            cleanup_repository(config, dry_run, output).await
        }
        Commands::List { target } => {
            let config = load_config(config_path.as_deref(), overrides(target, None))?;
            list_tags(config, output).await
        }
    }
}

fn overrides(target: TargetArgs, retention: Option<RetentionArgs>) -> Overrides {
    let mut overrides = Overrides {
        repository: target.repository,
        username: target.username,
        password: target.password,
        registry_url: target.registry_url,
        ..Default::default()
    };
    if let Some(retention) = retention {
        overrides.keep_count = retention.keep_count;
        overrides.max_size_mb = retention.max_size_mb;
        overrides.protect_file = retention.skip_tags_file;
    }
    overrides
}

fn load_config(path: Option<&Path>, overrides: Overrides) -> Result<Config> {
    let file = match path {
        Some(path) => FileConfig::load(path)?,
        None => FileConfig::discover(&env::current_dir()?)?,
    };
    Config::resolve(file, overrides)
}

async fn login(config: &Config) -> Result<Session> {
    let client = HubClient::new(&config.registry)?;
    let session = client
        .login(&config.credentials.username, &config.credentials.password)
        .await?;
    Ok(session)
}

/// Apply the retention policy to the configured repository.
async fn cleanup_repository(config: Config, dry_run: bool, output: &Output) -> Result<()> {
    let protected = ProtectionSet::load_optional(config.protect_file.as_deref())?;
    if let Some(ref path) = config.protect_file {
        output.progress(&format!(
            "Loaded {} protected tags from {}",
            protected.len(),
            path.display()
        ));
    }

    if config.policy.is_unbounded() {
        output.progress("No retention limits configured; nothing will be deleted");
    }

    let session = login(&config).await?;
    let summary = cleanup::run(
        &session,
        &config.repository,
        &protected,
        &config.policy,
        dry_run,
        output,
    )
    .await?;

    output.success(&summary.message(), &summary);
    Ok(())
}

#[derive(Serialize)]
struct Listing<'a> {
    repository: String,
    count: usize,
    total_bytes: u64,
    tags: &'a [Tag],
}

/// Print the repository's tags, newest first.
async fn list_tags(config: Config, output: &Output) -> Result<()> {
    let session = login(&config).await?;
    let inventory = cleanup::fetch_inventory(&session, &config.repository).await?;

    for tag in inventory.as_slice() {
        let updated = tag
            .last_updated
            .map(|t| t.to_rfc3339())
            .unwrap_or_else(|| "-".to_string());
        output.progress(&format!(
            "{:<40} {:>12} {}",
            tag.name,
            format_mb(tag.full_size),
            updated
        ));
    }

    let listing = Listing {
        repository: config.repository.to_string(),
        count: inventory.len(),
        total_bytes: inventory.total_size(),
        tags: inventory.as_slice(),
    };
    output.success(
        &format!(
            "{}: {} tags, total size: {}",
            listing.repository,
            listing.count,
            format_mb(listing.total_bytes)
        ),
        &listing,
    );
    Ok(())
}
