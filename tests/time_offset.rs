//! Reads the timestamp offset from the process environment.
//!
//! Kept in its own test binary with a single test so nothing else mutates
//! the environment concurrently.

use gdax_client_sdk::error::Kind;
use gdax_client_sdk::rest::OFFSET_VARIABLE;
use gdax_client_sdk::{Client, ClientConfig, Credentials, TimePolicy};
use httpmock::prelude::*;
use secrecy::SecretString;
use serde_json::json;

const NOW: i64 = 1_700_000_000;

fn client(server: &MockServer) -> anyhow::Result<Client> {
    let config = ClientConfig::builder()
        .base_url(server.base_url())
        .time(TimePolicy::Environment)
        .build();
    let credentials = Credentials::new(
        "key-id".to_owned(),
        SecretString::from("c2VjcmV0LWtleS1ieXRlcw=="),
        SecretString::from("hunter2"),
    );
    Ok(Client::with_config(config, credentials)?)
}

#[tokio::test]
async fn offset_variable_drives_time_policy() -> anyhow::Result<()> {
    let server = MockServer::start_async().await;
    let mock = server
        .mock_async(|when, then| {
            when.method(GET).path("/time");
            then.status(200).json_body(json!({"epoch": 1}));
        })
        .await;
    let client = client(&server)?;

    // SAFETY: this binary runs a single test, so no other thread reads the environment.
    unsafe { std::env::set_var(OFFSET_VARIABLE, "5") };

    assert_eq!(TimePolicy::Environment.timestamp(NOW)?, NOW + 5);
    assert_eq!(ClientConfig::from_env()?.time, TimePolicy::Offset(5));
    client.get::<serde_json::Value>("/time").await?;
    mock.assert_hits_async(1).await;

    // SAFETY: as above.
    unsafe { std::env::set_var(OFFSET_VARIABLE, "abc") };

    let err = ClientConfig::from_env().unwrap_err();
    assert_eq!(err.kind(), Kind::Config);
    let err = TimePolicy::Environment.timestamp(NOW).unwrap_err();
    assert_eq!(err.kind(), Kind::Config);

    let err = client.get::<serde_json::Value>("/time").await.unwrap_err();
    assert_eq!(err.kind(), Kind::Config);
    assert!(err.response().is_none(), "no round trip happened");
    mock.assert_hits_async(1).await;

    // SAFETY: as above.
    unsafe { std::env::remove_var(OFFSET_VARIABLE) };

    assert_eq!(ClientConfig::from_env()?.time, TimePolicy::Local);
    assert_eq!(TimePolicy::Environment.timestamp(NOW)?, NOW);

    Ok(())
}
