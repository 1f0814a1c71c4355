use clap::Parser;
use color_eyre::Result;
use desk::cli::Cli;

#[tokio::main]
async fn main() -> Result<()> {
    desk::run(Cli::parse()).await
}
