use clap::{Parser, Subcommand};

mod commands;

use commands::{PriceArgs, RunArgs, WatchArgs, WatchlistArgs};

#[derive(Parser)]
#[command(name = "price-alert")]
#[command(about = "Telegram-controlled crypto price increase alerts", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the Telegram bot and the price monitor
    Run(RunArgs),
    /// Monitor symbols headless, logging alerts instead of sending them
    Watch(WatchArgs),
    /// Look up the current price of a symbol
    Price(PriceArgs),
    /// Inspect or edit the stored watchlist
    Watchlist(WatchlistArgs),
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    match cli.command {
        Commands::Run(args) => commands::run::run(args).await?,
        Commands::Watch(args) => commands::watch::run(args).await?,
        Commands::Price(args) => commands::price::run(args).await?,
        Commands::Watchlist(args) => commands::watchlist::run(args).await?,
    }

    Ok(())
}
