mod app;
mod check;

use std::path::PathBuf;

use {
    clap::{Parser, Subcommand},
    tracing::{debug, info},
    tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt},
};

#[derive(Parser)]
#[command(name = "nurph", about = "Nurph, a chat bot for SMS and webhooks", version)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Config file (default: ./nurph.{toml,yaml,yml,json}, then the user config dir).
    #[arg(long, global = true, env = "NURPH_CONFIG")]
    config: Option<PathBuf>,

    /// Env file loaded before the config is read.
    #[arg(long, global = true, default_value = "envfile")]
    envfile: PathBuf,

    /// Log level (trace, debug, info, warn, error).
    #[arg(long, global = true, default_value = "info")]
    log_level: String,

    /// Output logs as JSON instead of human-readable.
    #[arg(long, global = true, default_value_t = false)]
    json_logs: bool,

    /// Address to bind to (overrides config value).
    #[arg(long, global = true)]
    bind: Option<String>,

    /// Port to listen on (overrides config value).
    #[arg(long, global = true)]
    port: Option<u16>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the bot (default when no subcommand is provided).
    Serve,
    /// Validate the configuration and report problems.
    Check {
        /// Show informational diagnostics too.
        #[arg(long)]
        verbose: bool,
    },
}

fn init_telemetry(cli: &Cli) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&cli.log_level));

    let registry = tracing_subscriber::registry().with(filter);

    if cli.json_logs {
        registry
            .with(fmt::layer().json().with_target(true).with_thread_ids(false))
            .init();
    } else {
        registry
            .with(
                fmt::layer()
                    .with_target(false)
                    .with_thread_ids(false)
                    .with_ansi(true),
            )
            .init();
    }
}

fn load_config(cli: &Cli) -> anyhow::Result<nurph_config::NurphConfig> {
    match &cli.config {
        Some(path) => Ok(nurph_config::load_config(path)?),
        None => Ok(nurph_config::discover_and_load()),
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let envfile_loaded = cli.envfile.exists() && dotenvy::from_path(&cli.envfile).is_ok();

    init_telemetry(&cli);
    if envfile_loaded {
        debug!(path = %cli.envfile.display(), "loaded envfile");
    }

    match &cli.command {
        None | Some(Commands::Serve) => {
            info!(version = env!("CARGO_PKG_VERSION"), "nurph starting");
            let mut config = load_config(&cli)?;
            // CLI args override config values
            if let Some(bind) = cli.bind.clone() {
                config.server.bind = bind;
            }
            if let Some(port) = cli.port {
                config.server.port = port;
            }
            let app = app::App::build(&config, |_| Ok(())).await?;
            app.serve(&config.server.bind, config.server.port).await
        },
        Some(Commands::Check { verbose }) => check::run(cli.config.as_deref(), *verbose),
    }
}
