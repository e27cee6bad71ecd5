use clap::Parser;
use taskdesk::cli::commands::Cli;
use taskdesk::cli::handlers;
use taskdesk::io::config_io;
use taskdesk::model::config::AppConfig;
use tracing_subscriber::EnvFilter;

/// Environment variable that overrides `[log] level` from config.toml
const LOG_ENV: &str = "TASKDESK_LOG";

fn init_tracing(config_level: &str) {
    let filter = EnvFilter::try_from_env(LOG_ENV)
        .or_else(|_| EnvFilter::try_new(config_level))
        .unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn main() {
    let cli = Cli::parse();

    // A malformed config falls back to defaults; `td config set` can still fix it
    let config = config_io::read_config(&config_io::config_path());
    let level = match &config {
        Ok(c) => c.log.level.clone(),
        Err(_) => AppConfig::default().log.level,
    };
    init_tracing(&level);
    let config = config.unwrap_or_else(|e| {
        tracing::warn!(error = %e, "ignoring config file");
        AppConfig::default()
    });

    if let Err(e) = handlers::dispatch(cli, config) {
        eprintln!("error: {}", e);
        std::process::exit(1);
    }
}
