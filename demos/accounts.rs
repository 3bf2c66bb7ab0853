//! Lists account balances.
//!
//! ```sh
//! GDAX_KEY=... GDAX_SECRET=... GDAX_PASSPHRASE=... \
//!     RUST_LOG=debug cargo run --example accounts --features tracing
//! ```
//!
//! Set `GDAX_SANDBOX=1` to target the public sandbox, whose clock may need
//! `TEST_COINBASE_OFFSET`.

use std::env;

use gdax_client_sdk::{Client, ClientConfig, Credentials, SANDBOX};
use secrecy::SecretString;
use serde::Deserialize;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Deserialize)]
struct Account {
    id: String,
    currency: String,
    balance: String,
    available: String,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let credentials = Credentials::new(
        env::var("GDAX_KEY")?,
        SecretString::from(env::var("GDAX_SECRET")?),
        SecretString::from(env::var("GDAX_PASSPHRASE")?),
    );

    let mut config = ClientConfig::from_env()?;
    if env::var_os("GDAX_SANDBOX").is_some() {
        config.base_url = SANDBOX.to_owned();
    }

    let client = Client::with_config(config, credentials)?;
    let response = client.get::<Vec<Account>>("/accounts").await?;

    for account in &response.body {
        info!(
            id = %account.id,
            currency = %account.currency,
            balance = %account.balance,
            available = %account.available,
            "account"
        );
    }

    Ok(())
}
