//! `opsync` -- one-shot maintenance actions over the operational material
//! databases.
//!
//! # Environment variables
//!
//! Every flag can also be set from the environment (a `.env` file is
//! loaded first).
//!
//! | Variable                 | Flag                | Required | Default |
//! |--------------------------|---------------------|----------|---------|
//! | `OPSYNC_ACTION`          | `--action`          | yes      | --      |
//! | `MONGO_DNS`              | `--mongo-dns`       | yes      | --      |
//! | `OPSYNC_TIMEOUT_MINUTES` | `--timeout`         | no       | `1`     |
//! | `BMALL_MONGO_DNS`        | `--bmall-mongo-dns` | for `mapOfBmallAndOPS` | -- |
//! | `OPSYNC_OUTPUT_DIR`      | `--output-dir`      | no       | `.`     |
//! | `OPSYNC_SCOPES`          | `--scopes`          | no       | built-in table |
//!
//! Kafka is configured through `KAFKA_BROKERS`, `KAFKA_BATCH_SIZE` and
//! `KAFKA_CLIENT_ID`; see `opsync_events::KafkaConfig`.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use clap::Parser;
use opsync_core::scope::ScopeTable;
use opsync_events::{EventBus, EventLogger, KafkaConfig};
use opsync_pipeline::report::write_report;
use opsync_pipeline::{actions, Action, Connections, RunContext};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// How long the event logger may take to drain after the run.
const LOGGER_DRAIN: Duration = Duration::from_secs(5);

#[derive(Parser)]
#[command(name = "opsync")]
#[command(about = "Migrate and repair operational material data", long_about = None)]
struct Cli {
    /// Action to run, e.g. syncMaterials
    #[arg(long, env = "OPSYNC_ACTION")]
    action: Action,

    /// MongoDB connection string of the operational cluster
    #[arg(long, env = "MONGO_DNS")]
    mongo_dns: String,

    /// Wall-clock limit of the whole run, in minutes
    #[arg(long, env = "OPSYNC_TIMEOUT_MINUTES", default_value_t = 1)]
    timeout: u64,

    /// MongoDB connection string of the cluster holding the bmall database
    #[arg(long, env = "BMALL_MONGO_DNS")]
    bmall_mongo_dns: Option<String>,

    /// Directory the failure report is written to
    #[arg(long, env = "OPSYNC_OUTPUT_DIR", default_value = ".")]
    output_dir: PathBuf,

    /// Scope table, e.g. "camera360:prod,qa;icc:dev"
    #[arg(long, env = "OPSYNC_SCOPES")]
    scopes: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "opsync=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();

    let scopes = match cli.scopes.as_deref() {
        Some(spec) => ScopeTable::parse(spec).context("invalid OPSYNC_SCOPES")?,
        None => ScopeTable::default(),
    };
    let kafka = KafkaConfig::from_env().context("invalid Kafka configuration")?;

    let mongo = opsync_db::connect(&cli.mongo_dns)
        .await
        .context("connecting to MONGO_DNS")?;
    opsync_db::health_check(&mongo)
        .await
        .context("MONGO_DNS is not reachable")?;

    let bmall = match cli.bmall_mongo_dns.as_deref() {
        Some(uri) => {
            let client = opsync_db::connect(uri)
                .await
                .context("connecting to BMALL_MONGO_DNS")?;
            opsync_db::health_check(&client)
                .await
                .context("BMALL_MONGO_DNS is not reachable")?;
            Some(client)
        }
        None => None,
    };
    let conns = Connections { mongo, bmall };

    let bus = Arc::new(EventBus::default());
    let logger = tokio::spawn(EventLogger::run(bus.subscribe()));
    let sender = kafka
        .build_sender(Arc::clone(&bus))
        .context("building the event sender")?;
    drop(bus);

    let ctx = Arc::new(RunContext::new(scopes, sender).with_batch_size(kafka.batch_size));

    tracing::info!(
        action = %cli.action,
        timeout_minutes = cli.timeout,
        kafka = kafka.is_enabled(),
        "Starting opsync",
    );

    let limit = Duration::from_secs(cli.timeout.saturating_mul(60));
    match tokio::time::timeout(limit, actions::run(cli.action, Arc::clone(&ctx), &conns)).await {
        Ok(Ok(summary)) => tracing::info!(action = %cli.action, %summary, "run complete"),
        Ok(Err(e)) => tracing::error!(action = %cli.action, error = %e, "run failed"),
        Err(_) => tracing::error!(action = %cli.action, minutes = cli.timeout, "run timed out"),
    }

    let records = ctx.errors.snapshot();
    match write_report(&cli.output_dir, cli.action, &records) {
        Ok(Some(_)) => {}
        Ok(None) => tracing::info!("no failed documents"),
        Err(e) => tracing::error!(error = %e, "failure report not written"),
    }

    drop(ctx);
    match tokio::time::timeout(LOGGER_DRAIN, logger).await {
        Ok(Ok(logged)) => tracing::debug!(logged, "event logger stopped"),
        Ok(Err(e)) => tracing::warn!(error = %e, "event logger failed"),
        Err(_) => tracing::debug!("event logger still running at exit"),
    }

    Ok(())
}
