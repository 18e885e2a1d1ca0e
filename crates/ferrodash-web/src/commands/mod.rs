mod serve;
mod snapshot;

use crate::cli::{Cli, Command};
use crate::error::WebError;

pub async fn run(cli: &Cli) -> Result<(), WebError> {
    match &cli.command {
        Command::Serve(args) => serve::run(cli, args).await,
        Command::Snapshot(args) => snapshot::run(cli, args).await,
    }
}
