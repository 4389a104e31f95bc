use std::process::ExitCode;

use clap::Parser;

use poptart::app_config::{load_config, load_or_default};
use poptart::error::error_chain;
use poptart::reader::read_stdin;
use poptart::{Cli, ToastError, logging, session};

#[tokio::main]
async fn main() -> ExitCode {
    logging::init();
    let cli = Cli::parse();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            tracing::error!("{}", error_chain(&err));
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<(), ToastError> {
    let config = match cli.config.as_deref() {
        Some(path) => load_config(Some(path))?,
        None => load_or_default(),
    };

    let Some(options) = cli.into_options(config, read_stdin)? else {
        return Ok(());
    };

    let mut overlay = session::open_overlay(&options)?;
    session::run(&options, &mut overlay).await
}
