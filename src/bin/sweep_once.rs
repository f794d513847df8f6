use bookshelf::logger::*;
use bookshelf::server::*;
use bookshelf::settings::*;
use std::time::Duration;

/// Runs a single reconciliation pass against the configured store and prints every torn pair.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let logger = Logger::new_bootstrap(cli.log_format);

    let mut project_settings = parse_settings(cli.settings.as_deref())?;
    logger.reload_from_config(&LogConfig {
        filter: project_settings.log.filter.clone(),
    })?;
    project_settings.sweep.enabled = false;

    let server = Server::try_new(&project_settings).await?;
    let report = server
        .reconciliation_sweep(Duration::from_secs(project_settings.sweep.interval_secs))
        .sweep_once()
        .await?;

    println!(
        "scanned {} users, checked {} pairs",
        report.users_scanned, report.pairs_checked
    );
    for pair in &report.torn {
        println!("{} -> {}: {:?}", pair.owner, pair.peer, pair.kind);
    }
    for owner in &report.unreadable_owners {
        println!("{owner}: relationships could not be listed");
    }
    if report.pairs_skipped > 0 {
        println!("{} pairs skipped after failed mirror reads", report.pairs_skipped);
    }
    server.shutdown().await;
    Ok(())
}
