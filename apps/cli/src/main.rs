//! brdgen CLI — business-requirements document generator.
//!
//! Converts a JSON payload of form answers, narrative text, and optional
//! attachments into a formatted BRD, optionally drafting prose sections
//! through a chat-completion API.

mod commands;

use clap::Parser;
use clap::error::ErrorKind;
use color_eyre::eyre::Result;

use commands::Cli;

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;

    // Usage errors exit 1 (not clap's default 2); help/version exit 0.
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            let code = match e.kind() {
                ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => 0,
                _ => 1,
            };
            let _ = e.print();
            std::process::exit(code);
        }
    };

    commands::init_tracing(&cli);
    commands::run(cli).await
}
