use super::{binance_client, ConfigArgs};
use anyhow::{Context, Result};
use clap::Args;
use price_alert_core::Symbol;

/// Arguments for the one-shot price lookup.
#[derive(Args, Debug)]
pub struct PriceArgs {
    #[command(flatten)]
    pub config: ConfigArgs,

    /// Base asset (e.g. BTC)
    pub symbol: String,
}

pub async fn run(args: PriceArgs) -> Result<()> {
    let config = args.config.load()?;
    let symbol = Symbol::parse(&args.symbol)
        .with_context(|| format!("invalid symbol {:?}", args.symbol))?;
    let client = binance_client(&config)?;

    let ticker = client
        .ticker_price(symbol.as_str())
        .await
        .with_context(|| format!("price lookup failed for {}", symbol.pair(client.quote_asset())))?;

    println!("{}: {}", ticker.symbol, ticker.price.normalize());
    Ok(())
}
