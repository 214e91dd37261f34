//! queuedesk - service point orchestrator CLI
//!
//! 設定の読み込み・ロギング初期化・アダプタのワイヤリングを行う薄い入口です。

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use tracing::{error, info};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use queuedesk_core::app::ServiceBuilder;
use queuedesk_core::config::{CONFIG_PATH_ENV, Config};
use queuedesk_core::domain::{ServicePointId, ServicePointRequest};
use queuedesk_core::impls::InMemoryQueueGateway;
use queuedesk_core::sharding::ShardRouter;

#[derive(Parser, Debug)]
#[command(name = "queuedesk")]
#[command(about = "Service point records and ticket orchestration")]
struct Args {
    /// Configuration file path (YAML). Falls back to $CONFIG_PATH.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Override log.level (RUST_LOG still wins)
    #[arg(long, global = true)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the partition each id routes to
    Shard {
        #[arg(required = true)]
        ids: Vec<String>,
    },
    /// Load and validate configuration
    CheckConfig,
    /// In-process walk-through with the in-memory queueing engine
    Demo {
        /// Override stream.path
        #[arg(long)]
        stream: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();

    let mut config = match load_config(args.config.as_ref()) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("configuration error: {e}");
            return ExitCode::FAILURE;
        }
    };
    if let Some(level) = &args.log_level {
        config.log.level = level.clone();
    }

    if let Err(e) = init_logging(&config.log.level) {
        eprintln!("failed to initialize logging: {e}");
        return ExitCode::FAILURE;
    }

    let outcome = match args.command {
        Command::Shard { ids } => shard(&config, &ids),
        Command::CheckConfig => check_config(&config, config_source(args.config.as_ref())),
        Command::Demo { stream } => {
            if let Some(path) = stream {
                config.stream.path = path;
            }
            demo(&config).await
        }
    };

    match outcome {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!(error = %e, "command failed");
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn load_config(path: Option<&PathBuf>) -> Result<Config, queuedesk_core::config::ConfigError> {
    match path {
        Some(path) => Config::from_file(path),
        None => Config::from_env(),
    }
}

fn init_logging(level: &str) -> Result<(), Box<dyn std::error::Error>> {
    let filter = EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new(level))?;
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;
    Ok(())
}

fn shard(config: &Config, ids: &[String]) -> Result<(), Box<dyn std::error::Error>> {
    let router = ShardRouter::new(config.storage.shard_count)?;
    for raw in ids {
        let id: ServicePointId = raw.parse()?;
        let partition = router.shard_for(&id.routing_key());
        println!("{raw}\t{partition}");
    }
    Ok(())
}

fn config_source(flag: Option<&PathBuf>) -> String {
    match flag {
        Some(path) => path.display().to_string(),
        None => std::env::var(CONFIG_PATH_ENV)
            .ok()
            .filter(|p| !p.is_empty())
            .unwrap_or_else(|| "(defaults)".to_string()),
    }
}

fn check_config(config: &Config, source: String) -> Result<(), Box<dyn std::error::Error>> {
    config.validate()?;
    info!(%source, "configuration is valid");
    println!("source:             {source}");
    println!("shard_count:        {}", config.storage.shard_count);
    println!("storage backend:    {:?}", config.storage.backend);
    println!("storage data_dir:   {}", config.storage.data_dir.display());
    println!("queue_engine:       {}", config.queue_engine.base_url);
    println!("engine timeout:     {:?}", config.queue_engine.request_timeout());
    println!("stream:             {}", config.stream.path.display());
    match config.service.request_timeout() {
        Some(timeout) => println!("request timeout:    {timeout:?}"),
        None => println!("request timeout:    none"),
    }
    println!("log level:          {}", config.log.level);
    Ok(())
}

async fn demo(config: &Config) -> Result<(), Box<dyn std::error::Error>> {
    let router = ShardRouter::new(config.storage.shard_count)?;
    let service = ServiceBuilder::from_config(config)
        .await?
        .gateway(Arc::new(InMemoryQueueGateway::new()))
        .build()?;

    let created = service
        .create(
            &service.context(),
            &ServicePointRequest::new("Front desk", "FD", "101"),
        )
        .await?;
    println!("create   {}", serde_json::to_string(&created)?);

    let upserted = service
        .upsert(
            &service.context(),
            "42",
            &ServicePointRequest::new("Passport office", "PO", "202"),
        )
        .await?;
    println!("upsert   {}", serde_json::to_string(&upserted)?);

    for id in [created.id, upserted.id] {
        let ticket = service.enqueue(&service.context(), &id.to_string()).await?;
        println!(
            "enqueue  id={id} {} ticket={ticket}",
            router.shard_for(&id.routing_key())
        );
    }

    let ticket = service.dequeue(&service.context(), "42").await?;
    println!("dequeue  id=42 ticket={ticket}");
    println!("stream   {}", config.stream.path.display());
    println!(
        "storage  {:?} {}",
        config.storage.backend,
        config.storage.data_dir.display()
    );
    Ok(())
}
