mod cli;
mod error;
mod logging;
mod settings;

use std::io::IsTerminal;
use std::process::ExitCode;

use clap::Parser;
use hm_core::{UpdateOutcome, Updater};
use log::{error, info};

use crate::cli::Args;
use crate::error::CliError;
use crate::settings::{DEFAULT_MAX_LOG_SIZE_BYTES, Settings};

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let args = Args::parse();
    let pause = !args.no_pause && std::io::stdin().is_terminal();

    let settings = Settings::load(args.config.as_deref());
    let (debug_enabled, max_log_size) = match &settings {
        Ok(settings) => (
            args.debug || settings.debug_logging,
            settings.max_log_size_bytes,
        ),
        Err(_) => (args.debug, DEFAULT_MAX_LOG_SIZE_BYTES),
    };
    let log_path = logging::init_logging(debug_enabled, max_log_size);

    let result = match settings {
        Ok(settings) => run(settings, &args).await,
        Err(error) => Err(error.into()),
    };

    let code = match result {
        Ok(UpdateOutcome::UpToDate { tag }) => {
            info!("Nothing to do, {tag} is installed.");
            ExitCode::SUCCESS
        }
        Ok(UpdateOutcome::Updated { tag, previous, tool }) => {
            match previous {
                Some(previous) => info!("Updated {previous} -> {tag} using {tool}."),
                None => info!("Installed {tag} using {tool}."),
            }
            ExitCode::SUCCESS
        }
        Err(error) => {
            error!("Error: {error}");
            if let Some(path) = &log_path {
                info!("Details were written to {}", path.display());
            }
            ExitCode::FAILURE
        }
    };

    if pause {
        wait_for_enter();
    }
    code
}

async fn run(settings: Settings, args: &Args) -> Result<UpdateOutcome, CliError> {
    let config = settings.into_config(args);
    let client = hm_core::http_client(&config)?;
    let outcome = Updater::new(&config, &client).run().await?;
    Ok(outcome)
}

fn wait_for_enter() {
    println!("Press Enter to exit...");
    let mut line = String::new();
    let _ = std::io::stdin().read_line(&mut line);
}
