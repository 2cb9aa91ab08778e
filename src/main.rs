mod config;
mod error;
mod features;
mod gpx;
mod layer;
mod portal;
#[cfg(test)]
mod test_server;
mod upload;

use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use std::time::Duration;
use tracing::{Level, info};

use crate::error::AppendError;
use crate::upload::{UploadSummary, append_features_to_service};

#[derive(Parser)]
#[command(
    name = "gpx-append",
    about = "Append GPX waypoints and tracks to hosted feature layers"
)]
struct Cli {
    /// GPX file to upload
    file: PathBuf,

    /// Portal used to sign in
    #[arg(long, env = "GPX_APPEND_PORTAL_URL", default_value = config::DEFAULT_PORTAL_URL)]
    portal_url: String,

    /// Portal username
    #[arg(short, long, env = "GPX_APPEND_USERNAME")]
    username: String,

    /// Portal password
    #[arg(short, long, env = "GPX_APPEND_PASSWORD", hide_env_values = true)]
    password: String,

    /// URL of the point layer receiving waypoints
    #[arg(long)]
    waypoints_layer: String,

    /// URL of the polyline layer receiving tracks
    #[arg(long)]
    tracks_layer: String,

    /// Project number written on every feature
    #[arg(long)]
    project_number: String,

    /// Surveyor name written on every feature
    #[arg(long)]
    surveyor: String,

    /// Parse the file and report what would be uploaded
    #[arg(long)]
    dry_run: bool,

    /// HTTP request timeout in seconds
    #[arg(long, default_value_t = config::DEFAULT_TIMEOUT_SECS)]
    timeout: u64,

    /// Log debug output
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Debug, Default)]
struct RunSummary {
    waypoints: UploadSummary,
    tracks: UploadSummary,
}

async fn run(cli: &Cli) -> Result<RunSummary, AppendError> {
    if !cli.file.exists() {
        return Err(AppendError::MissingInput(cli.file.clone()));
    }

    if cli.dry_run {
        let parsed = gpx::parse_gpx_file(&cli.file, &cli.project_number, &cli.surveyor)?;
        info!(
            "Dry run: would append {} waypoints to {} and {} tracks to {}",
            parsed.waypoints.len(),
            cli.waypoints_layer,
            parsed.tracks.len(),
            cli.tracks_layer
        );
        return Ok(RunSummary::default());
    }

    let client = portal::build_client(Duration::from_secs(cli.timeout))
        .map_err(|e| AppendError::connect(&cli.portal_url, e))?;
    let session = portal::connect(client, &cli.portal_url, &cli.username, &cli.password).await?;
    let (waypoints_layer, tracks_layer) =
        layer::resolve_targets(&session, &cli.waypoints_layer, &cli.tracks_layer).await?;

    let parsed = gpx::parse_gpx_file(&cli.file, &cli.project_number, &cli.surveyor)?;

    let waypoints = append_features_to_service(&waypoints_layer, &parsed.waypoints).await?;
    let tracks = append_features_to_service(&tracks_layer, &parsed.tracks).await?;

    Ok(RunSummary { waypoints, tracks })
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_max_level(if cli.verbose {
            Level::DEBUG
        } else {
            Level::INFO
        })
        .init();

    let summary = run(&cli)
        .await
        .with_context(|| format!("Failed to append {}", cli.file.display()))?;

    if !cli.dry_run {
        info!(
            "Done: {}/{} waypoints and {}/{} tracks appended",
            summary.waypoints.succeeded,
            summary.waypoints.submitted,
            summary.tracks.succeeded,
            summary.tracks.submitted,
        );
    }

    Ok(())
}
