use clap::Parser;
use pair_arcade_lib::Cli;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Optional .env next to the binary's working directory.
    let _ = dotenvy::dotenv();

    pair_arcade_lib::run(Cli::parse()).await
}
