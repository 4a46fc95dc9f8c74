//! OWID CLI - fetch the COVID-19 dataset and render dashboard views.

use clap::Parser;

#[derive(Parser)]
#[command(
    name = "owid-cli",
    version,
    about = "COVID-19 dashboard toolkit for the Our World in Data dataset"
)]
struct Cli {
    #[command(subcommand)]
    command: owid_cmd::Command,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::init();
    let cli = Cli::parse();
    log::debug!("{:?}", cli.command);
    owid_cmd::run(cli.command).await
}
