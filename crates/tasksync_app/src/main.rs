use clap::Parser;

mod cli;
mod commands;
mod exit_codes;
mod logging;
mod render;
mod session_store;

use cli::{Cli, Command};
use commands::Context;
use logging::LogDestination;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    logging::initialize(
        LogDestination::from_option(cli.log_file.clone()),
        sync_logging::level_for_verbosity(cli.verbose),
    );

    let exit_code = match run(cli).await {
        Ok(code) => code,
        Err(err) => {
            eprintln!("Error: {err:#}");
            exit_codes::FAILURE
        }
    };

    std::process::exit(exit_code);
}

async fn run(cli: Cli) -> anyhow::Result<i32> {
    let ctx = Context::from_cli(&cli)?;
    match cli.command {
        Command::Login(args) => commands::session::login(&ctx, args),
        Command::Logout => commands::session::logout(&ctx),
        Command::Upload(args) => commands::upload::execute(&ctx, args).await,
        Command::Watch(args) => commands::watch::execute(&ctx, args).await,
    }
}
