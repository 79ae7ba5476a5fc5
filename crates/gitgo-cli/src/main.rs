mod commands;

use std::process::ExitCode;

use clap::Parser;

use commands::Commands;

#[derive(Parser)]
#[command(name = "gitgo", about = "A minimal content-addressed version-control engine")]
pub struct Cli {
    #[command(subcommand)]
    command: Commands,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    match commands::run(&cli.command) {
        Ok(code) => ExitCode::from(code as u8),
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::from(1)
        }
    }
}
