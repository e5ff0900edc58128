use clap::Parser;
use schema_auditor::cli::{AuditArgs, Cli, Commands, InitArgs, ScanArgs, ServeArgs};
use schema_auditor::config::{Config, DEFAULT_CONFIG};
use schema_auditor::evaluator::PolicyEvaluator;
use schema_auditor::fetch::Fetcher;
use schema_auditor::policy::Policy;
use schema_auditor::server::{self, AppState};
use schema_auditor::{AuditStatus, Auditor, llm, render};
use std::sync::Arc;
use tracing::{debug, error, info};

const EXIT_FAILURE: i32 = 1;

#[tokio::main]
async fn main() {
    // Load .env before clap reads OPENAI_API_KEY
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_new(&cli.log_level)
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let result = match cli.command {
        Commands::Init(args) => init(&args),
        Commands::Serve(args) => serve(args).await,
        Commands::Scan(args) => scan(args).await,
    };

    if let Err(e) = result {
        error!("{:#}", e);
        std::process::exit(EXIT_FAILURE);
    }
}

fn init(args: &InitArgs) -> anyhow::Result<()> {
    if std::path::Path::new(&args.config).exists() && !args.r#override {
        anyhow::bail!(
            "Config file {} already exists (use --override to replace it)",
            args.config
        );
    }
    std::fs::write(&args.config, DEFAULT_CONFIG)?;
    info!("Wrote default config to {}", args.config);
    Ok(())
}

/// Construct the pipeline once per process; the capability is shared by all requests
fn build_auditor(args: &AuditArgs) -> anyhow::Result<(Config, Auditor)> {
    let config = Config::load(&args.config, &args.config_overrides)?;
    debug!("Loaded config: {:?}", config);

    let capability = llm::create_capability(&config.llm, args.api_key.as_deref())?;
    let policy = Arc::new(Policy::builtin()?);
    info!(
        "Loaded policy v{} with {} rules",
        policy.version,
        policy.rules.len()
    );

    let evaluator = PolicyEvaluator::new(capability, policy, config.audit.max_visible_chars);
    let fetcher = Fetcher::new(&config.fetch)?;
    let auditor = Auditor::new(fetcher, evaluator, config.audit.max_visible_chars);
    Ok((config, auditor))
}

async fn serve(args: ServeArgs) -> anyhow::Result<()> {
    let (config, auditor) = build_auditor(&args.audit)?;
    let bind = args.bind.unwrap_or(config.server.bind);
    let state = Arc::new(AppState { auditor });
    server::serve(&bind, state).await
}

async fn scan(args: ScanArgs) -> anyhow::Result<()> {
    let (_, auditor) = build_auditor(&args.audit)?;
    let result = auditor.audit(&args.url).await?;

    match args.output.as_deref() {
        Some(path) if path.ends_with(".json") => {
            std::fs::write(path, serde_json::to_string_pretty(&result)?)?;
            info!("Wrote JSON report to {}", path);
        }
        Some(path) => {
            std::fs::write(path, render::format_report(&args.url, &result))?;
            info!("Wrote Markdown report to {}", path);
        }
        None => println!("{}", render::format_report(&args.url, &result)),
    }

    if result.status == AuditStatus::Fail {
        std::process::exit(EXIT_FAILURE);
    }
    Ok(())
}
