/// Class Portal - Main entry point
///
/// Opens the local store, attaches cloud sync when a remote URL is given,
/// and runs one command.
use anyhow::Context;
use clap::Parser;
use class_portal::cli::{self, Args};
use class_portal::{CloudSync, LocalStore, Repository, SyncQueue};
use log::info;
use std::sync::Arc;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let log_level = if args.verbose {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Info
    };

    env_logger::Builder::from_default_env()
        .filter_level(log_level)
        .format_timestamp_millis()
        .init();

    let data_dir = args.data_dir()?;
    std::fs::create_dir_all(&data_dir)
        .with_context(|| format!("Failed to create data directory {}", data_dir.display()))?;
    info!("Data directory: {}", data_dir.display());

    let store = LocalStore::new(data_dir.join("portal.db"))
        .with_context(|| format!("Failed to open local store in {}", data_dir.display()))?;

    let cloud = Arc::new(CloudSync::new(args.cloud_config()?)?);
    if cloud.enabled() {
        info!("Cloud sync enabled: {}", args.remote_url.as_deref().unwrap_or_default());
    } else {
        info!("Cloud sync disabled; working offline");
    }

    let (queue, worker) = SyncQueue::spawn(Arc::clone(&cloud));
    let repo = Repository::with_sync(store, queue.clone());
    repo.init(&args.admin_seed())?;

    let outcome = cli::run(args.command, &repo, &cloud).await;

    // Let queued upserts reach the remote before exiting
    queue.shutdown().await;
    worker.await.context("Sync queue worker panicked")?;

    outcome?;
    Ok(())
}
