use anyhow::Context;
use idex_connector::core::config::ExchangeConfig;
use idex_connector::exchanges::idex::build_connector;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();

    let config = ExchangeConfig::from_env();
    let connector = build_connector(config)?;

    let ticker = connector
        .ticker("ETH_SAN")
        .await
        .context("fetching ETH_SAN ticker")?;
    println!("{:#?}", ticker);

    Ok(())
}
