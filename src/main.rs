//! Herald CLI entrypoint for repository activity reporting.

use std::io::{self, Write};
use std::process::ExitCode;

use herald::{HeraldConfig, ReportError};
use ortho_config::OrthoConfig;

#[tokio::main]
async fn main() -> ExitCode {
    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            if writeln!(io::stderr().lock(), "{error}").is_err() {
                return ExitCode::FAILURE;
            }
            ExitCode::FAILURE
        }
    }
}

async fn run() -> Result<(), ReportError> {
    let config = load_config()?;
    herald::cli::run(config).await
}

/// Loads configuration from CLI, environment, and files.
///
/// # Errors
///
/// Returns [`ReportError::Configuration`] when ortho-config fails to
/// parse arguments or load configuration files.
fn load_config() -> Result<HeraldConfig, ReportError> {
    HeraldConfig::load().map_err(|error| ReportError::Configuration {
        message: error.to_string(),
    })
}
