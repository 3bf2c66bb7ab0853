//! Walks every fill for a product, oldest pages last.
//!
//! ```sh
//! GDAX_KEY=... GDAX_SECRET=... GDAX_PASSPHRASE=... \
//!     RUST_LOG=info cargo run --example fills --features tracing -- BTC-USD
//! ```

use std::env;

use futures::StreamExt as _;
use gdax_client_sdk::{Client, ClientConfig, Credentials, Direction, PaginationParams};
use secrecy::SecretString;
use serde::Deserialize;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Deserialize)]
struct Fill {
    trade_id: u64,
    price: String,
    size: String,
    side: String,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let product = env::args().nth(1).unwrap_or_else(|| "BTC-USD".to_owned());
    let credentials = Credentials::new(
        env::var("GDAX_KEY")?,
        SecretString::from(env::var("GDAX_SECRET")?),
        SecretString::from(env::var("GDAX_PASSPHRASE")?),
    );
    let client = Client::with_config(ClientConfig::from_env()?, credentials)?;

    let mut params = PaginationParams::builder().limit(100).build();
    params.add_extra_param("product_id", product);

    let pages = client.stream_pages::<Vec<Fill>>("/fills", params, Direction::Next);
    futures::pin_mut!(pages);
    while let Some(page) = pages.next().await {
        match page {
            Ok(page) => log_fills(&page.body),
            Err(e) => {
                warn!(error = %e, "stopping");
                return Err(e.into());
            }
        }
    }

    Ok(())
}

fn log_fills(fills: &[Fill]) {
    for fill in fills {
        info!(
            trade_id = fill.trade_id,
            price = %fill.price,
            size = %fill.size,
            side = %fill.side,
            "fill"
        );
    }
}
