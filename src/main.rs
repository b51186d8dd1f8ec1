use std::process::ExitCode;

use clap::{Parser, Subcommand};
use benchmake::command;

#[derive(Parser)]
#[command(version, about)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    Consensus(command::ConsensusCMD),
    Typing(command::TypingCMD),
    Align(command::AlignCMD),
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Consensus(mut cmd) => cmd.try_execute(),
        Commands::Typing(mut cmd) => cmd.try_execute(),
        Commands::Align(mut cmd) => cmd.try_execute(),
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        return ExitCode::FAILURE;
    }
    return ExitCode::SUCCESS;
}
