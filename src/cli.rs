use clap::{Parser, Subcommand};

// Display order for API key option (placed at top of help text)
const API_KEY_DISPLAY_ORDER: usize = 0;
// Display order for log level option (placed at end of help text)
const LOG_LEVEL_DISPLAY_ORDER: usize = 100;

/// CLI arguments
#[derive(Parser)]
#[command(name = "schema-auditor", version, about = "Audit a page's structured data against what readers can see", long_about = None)]
pub struct Cli {
    /// Log level (see https://docs.rs/tracing-subscriber/latest/tracing_subscriber/filter/struct.EnvFilter.html)
    /// [env: AUDITOR_LOG=] [default: info]
    #[arg(
        long,
        env = "AUDITOR_LOG",
        default_value = "info",
        global = true,
        hide_default_value = true,
        hide_env = true,
        display_order = LOG_LEVEL_DISPLAY_ORDER,
        verbatim_doc_comment
    )]
    pub log_level: String,

    #[command(subcommand)]
    pub command: Commands,
}

/// CLI subcommands
#[derive(Subcommand)]
pub enum Commands {
    /// Initialize a default auditor.toml config file
    Init(InitArgs),
    /// Serve the scan API over HTTP
    Serve(ServeArgs),
    /// Audit a single URL and print the report
    Scan(ScanArgs),
}

/// Arguments for the init command
#[derive(Parser)]
pub struct InitArgs {
    /// Path to config file
    #[arg(long, default_value = "auditor.toml")]
    pub config: String,

    /// Override existing config file
    #[arg(long)]
    pub r#override: bool,
}

/// Options shared by commands that run audits
#[derive(Parser, Debug, Clone)]
pub struct AuditArgs {
    /// Path to config file (initialize with `schema-auditor init`)
    #[arg(long, default_value = "auditor.toml")]
    pub config: String,

    /// Override config values using dot notation (e.g. llm.model=gpt-4o-mini)
    #[arg(long = "config-override")]
    pub config_overrides: Vec<String>,

    /// LLM API key
    #[arg(long, env = "OPENAI_API_KEY", hide_env_values = true, display_order = API_KEY_DISPLAY_ORDER)]
    pub api_key: Option<String>,
}

/// Arguments for the serve command
#[derive(Parser, Debug)]
pub struct ServeArgs {
    #[command(flatten)]
    pub audit: AuditArgs,

    /// Address to listen on [default: server.bind from config]
    #[arg(long)]
    pub bind: Option<String>,
}

/// Arguments for the scan command
#[derive(Parser, Debug)]
pub struct ScanArgs {
    /// URL of the page to audit
    pub url: String,

    #[command(flatten)]
    pub audit: AuditArgs,

    /// Output file path (.md or .json)
    #[arg(long)]
    pub output: Option<String>,
}
