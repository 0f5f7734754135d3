use clap::Parser;
use eyre::Result;
use starknet_scripts::cli::CliArgs;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(EnvFilter::from_default_env())
        .init();

    let CliArgs { session, command } = CliArgs::parse();
    command.run(session).await
}
