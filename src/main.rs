use clap::{Parser, Subcommand};
use anyhow::Result;
use dotenvy::dotenv;

mod detect;
mod extractor;
mod meta;
mod output;
mod rip;
mod spotify;
mod telemetry;

#[derive(Parser)]
#[command(name = "mms", about = "Scrape music metadata from Bing, Google, AllMusic, Discogs and Spotify pages")]
struct Cli {
    /// Emit JSON instead of tab-separated title/artist/album lines; logs go to stderr
    #[arg(global = true, long, default_value_t = false)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    Rip(rip::RipCmd),
    Detect(detect::DetectCmd),
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv().ok();
    let cli = Cli::parse();
    telemetry::config::set_json_mode(cli.json);

    // initialize logging/tracing (stderr). Respect RUST_LOG and MMS_LOG_FORMAT
    telemetry::config::init_tracing();

    match cli.command {
        Commands::Rip(args) => rip::run(args, output::OutputConfig::resolve(cli.json)).await?,
        Commands::Detect(args) => detect::run(args)?,
    }

    Ok(())
}
