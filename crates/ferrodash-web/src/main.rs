mod bootstrap;
mod cli;
mod commands;
mod error;
mod logging;
mod page;
mod server;
mod session;

use clap::Parser;
use std::process::ExitCode;

use crate::cli::Cli;
use crate::error::WebError;

#[tokio::main]
async fn main() -> ExitCode {
    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            eprintln!("error: {error}");
            ExitCode::from(error.exit_code())
        }
    }
}

async fn run() -> Result<(), WebError> {
    let cli = Cli::parse();
    logging::init(cli.log_json)?;
    commands::run(&cli).await
}
