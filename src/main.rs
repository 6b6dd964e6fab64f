use clap::Parser;
use matrix_ai::cli::Cli;
use std::process::ExitCode;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    matrix_ai::cli::run(cli).await
}
