mod config;
mod cycle;
mod error;
mod incident;
mod monitoring;
mod notifier;
mod rules;
mod store;

use std::sync::Arc;

use anyhow::Result;
use clap::{Parser, Subcommand};
use logger::init_tracing;

use config::Config;
use cycle::Monitor;
use monitoring::{Prober, ReqwestFetcher};
use notifier::Transports;
use notifier::email::EmailNotifier;
use rules::source::DnsTxtSource;
use store::cache::StoreCache;
use store::libsql::LibsqlStore;

#[derive(Parser)]
#[command(name = "vigil", about = "Rule-driven HTTP uptime monitor")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run one poll cycle over all configured rule sources
    Poll,
    /// Poll continuously on the configured interval
    Run,
    /// Dump the cached incident state
    Status,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    init_tracing();

    let cli = Cli::parse();
    let config = Config::from_env()?;

    // The cache load must complete before any cycle touches state
    let backing =
        Arc::new(LibsqlStore::connect(&config.database_path, &config.table_name).await?);
    let cache = StoreCache::load(backing).await?;

    if let Command::Status = cli.command {
        // Stub: raw dump of the cached incident state
        for record in cache.records() {
            let since = if record.has_active_error() {
                chrono::DateTime::from_timestamp_millis(record.first_error_at)
                    .map(|t| t.to_rfc3339())
                    .unwrap_or_else(|| record.first_error_at.to_string())
            } else {
                "-".to_string()
            };
            println!("{} first_error_at={since} expiring={}", record.url, record.expiring);
        }
        return Ok(());
    }

    let email = match &config.smtp {
        Some(smtp) => {
            Some(EmailNotifier::new(smtp, config.from.clone(), config.template.clone())?)
        }
        None => None,
    };
    let notifier = Arc::new(Transports::new(email));
    let prober =
        Prober::new(ReqwestFetcher::new()?, config.max_redirects, config.max_cert_age());
    let source = Arc::new(DnsTxtSource::from_system_conf()?);

    let poll_interval = config.poll_interval;
    let mut monitor = Monitor::new(config, prober, source, notifier, cache);

    match cli.command {
        Command::Poll => monitor.poll().await,
        Command::Run => {
            let mut timer = tokio::time::interval(poll_interval);
            loop {
                timer.tick().await;
                monitor.poll().await;
            }
        }
        Command::Status => unreachable!("handled above"),
    }

    Ok(())
}
