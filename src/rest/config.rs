use std::time::Duration;

use bon::Builder;
use reqwest::header::HeaderValue;
use url::Url;

use crate::Result;
use crate::error::Error;
use crate::rest::policy::TimePolicy;

/// Production REST endpoint.
pub const PRODUCTION: &str = "https://api.gdax.com";
/// Public sandbox REST endpoint.
pub const SANDBOX: &str = "https://api-public.sandbox.gdax.com";

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(15);
pub const DEFAULT_USER_AGENT: &str = concat!("Rust GDAX Client/", env!("CARGO_PKG_VERSION"));

/// Client configuration.
///
/// `base_url` is prefixed verbatim to every request path, so it should not end
/// with a `/`.
#[non_exhaustive]
#[derive(Clone, Debug, Builder)]
pub struct ClientConfig {
    #[builder(into, default = PRODUCTION.to_owned())]
    pub base_url: String,
    /// Overall per-request timeout applied by the transport.
    #[builder(default = DEFAULT_TIMEOUT)]
    pub timeout: Duration,
    #[builder(into, default = DEFAULT_USER_AGENT.to_owned())]
    pub user_agent: String,
    #[builder(default)]
    pub time: TimePolicy,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self::builder().build()
    }
}

impl ClientConfig {
    /// Configuration targeting the public sandbox.
    #[must_use]
    pub fn sandbox() -> Self {
        Self::builder().base_url(SANDBOX).build()
    }

    /// Default configuration with the timestamp offset resolved from the
    /// environment once, up front.
    pub fn from_env() -> Result<Self> {
        Ok(Self::builder().time(TimePolicy::from_env()?).build())
    }

    /// Checks the base URL and returns the user agent as a header value.
    pub(crate) fn validate(&self) -> Result<HeaderValue> {
        Url::parse(&self.base_url)?;
        HeaderValue::from_str(&self.user_agent)
            .map_err(|e| Error::validation(format!("invalid user agent: {e}")))
    }
}
