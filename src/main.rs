//! sqlgate - Validation and failure classification for LLM-generated SQL.

mod cli;

use std::path::Path;
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::Context;
use cli::Cli;
use sqlgate::config::Config;
use sqlgate::engine::HttpEngine;
use sqlgate::generation::{GenerationOutcome, ResultClassifier};
use sqlgate::logging;
use tracing::{debug, error, info};

/// Exit code for a candidate the engine rejected.
const EXIT_INVALID: u8 = 2;

#[tokio::main]
async fn main() -> ExitCode {
    // A missing .env file is fine
    let _ = dotenvy::dotenv();

    let cli = Cli::parse_args();
    let config_path = cli.config_path();

    // Logging depends on the config, so failures here go straight to stderr.
    let config = match load_config(&cli, &config_path) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            return ExitCode::FAILURE;
        }
    };

    let target = logging::init(&config.logging);
    info!("Loaded config from: {}", config_path.display());
    debug!("Logging to {:?}", target);

    match run(cli, config).await {
        Ok(outcome) if outcome.is_valid() => ExitCode::SUCCESS,
        Ok(outcome) if outcome.is_empty() => ExitCode::FAILURE,
        Ok(_) => ExitCode::from(EXIT_INVALID),
        Err(e) => {
            error!("{:#}", e);
            ExitCode::FAILURE
        }
    }
}

/// Precedence: CLI arguments, then environment, then config file.
fn load_config(cli: &Cli, path: &Path) -> anyhow::Result<Config> {
    let mut config = Config::load_from_file(path)?;
    config.engine.apply_env_overrides()?;
    cli.apply_to(&mut config);
    Ok(config)
}

async fn run(cli: Cli, config: Config) -> anyhow::Result<GenerationOutcome> {
    let engine = HttpEngine::new(config.engine.clone()).context("Invalid engine settings")?;
    let classifier = ResultClassifier::new(Arc::new(engine));

    let reply = cli.read_reply()?;
    let request = config.validation.to_request();
    let outcome = classifier.run(&[reply], &request).await;

    println!("{}", serde_json::to_string_pretty(&outcome)?);
    Ok(outcome)
}
