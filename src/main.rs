//! # voxlingo
//!
//! Service binary: loads configuration, wires the adapters and serves the
//! HTTP API until interrupted.

#![deny(unsafe_code)]

mod wiring;

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use tracing::{info, warn};
use voxlingo_core::{ArtifactStore, LanguageTable};
use voxlingo_server::{AppState, ShutdownCoordinator};
use voxlingo_settings::{AppConfig, LoggingSettings, Settings};
use voxlingo_store::{spawn_reaper, DiskArtifactStore};
use voxlingo_telemetry::{init_telemetry, TelemetryConfig};

/// Voice translation service.
#[derive(Parser, Debug)]
#[command(name = "voxlingo", version, about = "Speak once, hear it in every configured language")]
struct Cli {
    /// Settings file (defaults to $VOXLINGO_CONFIG, then ./voxlingo.json).
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the HTTP server (default).
    Serve {
        /// Bind address, overriding the settings file.
        #[arg(long)]
        host: Option<String>,
        /// Bind port, overriding the settings file (0 for auto-assign).
        #[arg(long)]
        port: Option<u16>,
    },
    /// Delete staged audio older than the retention window and exit.
    Sweep {
        /// Age threshold in hours; the configured retention when omitted.
        #[arg(long)]
        max_age_hours: Option<u64>,
    },
    /// Print the configured languages.
    Languages,
}

fn hours(h: u64) -> Duration {
    Duration::from_secs(h.saturating_mul(3600))
}

fn init_logging(logging: &LoggingSettings) -> Result<()> {
    init_telemetry(&TelemetryConfig::from_level_name(&logging.level, logging.json))
        .context("failed to initialise logging")
}

/// Settings without the API key, for commands that never call out.
fn load_settings(explicit: Option<&Path>) -> Result<Settings> {
    voxlingo_settings::load_env_file();
    let path = voxlingo_settings::settings_path(explicit);
    if explicit.is_some() && !path.exists() {
        bail!("settings file not found: {}", path.display());
    }
    voxlingo_settings::load_settings_from_path(&path)
        .with_context(|| format!("failed to load settings from {}", path.display()))
}

async fn serve(config: Option<&Path>, host: Option<String>, port: Option<u16>) -> Result<()> {
    let AppConfig {
        mut settings,
        languages,
        assemblyai_api_key,
    } = voxlingo_settings::load_config(config).context("failed to load configuration")?;
    if let Some(host) = host {
        settings.server.host = host;
    }
    if let Some(port) = port {
        settings.server.port = port;
    }
    init_logging(&settings.logging)?;

    let staging = settings.storage.resolved_dir();
    let store: Arc<dyn ArtifactStore> = Arc::new(DiskArtifactStore::new(&staging));
    let retention = hours(settings.storage.retention_hours);
    match store.sweep(retention).await {
        Ok(removed) => info!(removed, dir = %staging.display(), "startup sweep"),
        Err(e) => warn!(error = %e, dir = %staging.display(), "startup sweep failed"),
    }

    let language_count = languages.len();
    let orchestrator =
        wiring::build_orchestrator(&settings, languages, assemblyai_api_key, Arc::clone(&store))
            .context("failed to build service clients")?;

    let shutdown = ShutdownCoordinator::new();
    let mut tasks = Vec::new();
    if let Some(secs) = settings.storage.sweep_interval_secs {
        tasks.push(spawn_reaper(
            Arc::clone(&store),
            Duration::from_secs(secs),
            retention,
            shutdown.token(),
        ));
    }

    let state = AppState::new(Arc::new(orchestrator), settings.server.expose_error_details);
    let handle = voxlingo_server::start(&settings.server, state, shutdown.token())
        .await
        .with_context(|| {
            format!(
                "failed to bind {}:{}",
                settings.server.host, settings.server.port
            )
        })?;
    info!(
        port = handle.port(),
        languages = language_count,
        fan_out = ?settings.pipeline.fan_out,
        "voxlingo ready"
    );
    tasks.push(handle.into_task());

    tokio::signal::ctrl_c()
        .await
        .context("failed to listen for shutdown signal")?;
    info!("shutdown requested");
    shutdown.graceful_shutdown(tasks, None).await;
    Ok(())
}

async fn sweep(config: Option<&Path>, max_age_hours: Option<u64>) -> Result<()> {
    let settings = load_settings(config)?;
    init_logging(&settings.logging)?;

    let store = DiskArtifactStore::new(settings.storage.resolved_dir());
    let max_age = hours(max_age_hours.unwrap_or(settings.storage.retention_hours));
    let removed = store
        .sweep(max_age)
        .await
        .with_context(|| format!("failed to sweep {}", store.root().display()))?;
    println!("removed {removed} artifact(s) from {}", store.root().display());
    Ok(())
}

fn languages(config: Option<&Path>) -> Result<()> {
    let settings = load_settings(config)?;
    let table = LanguageTable::new(settings.languages, &settings.default_language)
        .context("invalid language table")?;
    let default = table.default_language().name.clone();
    for lang in table.iter() {
        let marker = if lang.name == default { " (default)" } else { "" };
        println!(
            "{:<10} {:<4} voice={}{marker}",
            lang.name,
            lang.code,
            lang.voice_id.as_deref().unwrap_or("-")
        );
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = cli.config.as_deref();
    match cli.command.unwrap_or(Command::Serve {
        host: None,
        port: None,
    }) {
        Command::Serve { host, port } => serve(config, host, port).await,
        Command::Sweep { max_age_hours } => sweep(config, max_age_hours).await,
        Command::Languages => languages(config),
    }
}
