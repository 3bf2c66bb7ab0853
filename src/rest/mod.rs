//! Signed REST client.
//!
//! Every call goes through one flow:
//! - serialize the optional JSON payload
//! - sign `timestamp + method + path + body` and attach the `CB-ACCESS-*` headers
//! - execute once, without retries
//! - decode the success body, or the exchange's error body on any status but `200`

mod client;
mod config;
mod policy;

pub use client::Client;
pub use config::{ClientConfig, DEFAULT_TIMEOUT, DEFAULT_USER_AGENT, PRODUCTION, SANDBOX};
pub use policy::{OFFSET_VARIABLE, TimePolicy};
