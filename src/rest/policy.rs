use std::env;

use crate::error::Error;
use crate::{Result, Timestamp};

/// Environment variable holding a signed number of seconds to add to request
/// timestamps. Used to compensate for sandbox clock drift.
pub const OFFSET_VARIABLE: &str = "TEST_COINBASE_OFFSET";

/// How the `CB-ACCESS-TIMESTAMP` header is derived from the local clock.
#[non_exhaustive]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum TimePolicy {
    /// Local unix time, unchanged.
    #[default]
    Local,
    /// Local unix time shifted by a fixed number of seconds.
    Offset(i64),
    /// Local unix time shifted by [`OFFSET_VARIABLE`], read on every request.
    Environment,
}

impl TimePolicy {
    /// Reads [`OFFSET_VARIABLE`] once and pins the result.
    pub fn from_env() -> Result<Self> {
        Ok(match read_offset()? {
            Some(offset) => TimePolicy::Offset(offset),
            None => TimePolicy::Local,
        })
    }

    /// Applies the policy to `now`.
    pub fn timestamp(self, now: Timestamp) -> Result<Timestamp> {
        let offset = match self {
            TimePolicy::Local => 0,
            TimePolicy::Offset(offset) => offset,
            TimePolicy::Environment => read_offset()?.unwrap_or(0),
        };

        Ok(now.saturating_add(offset))
    }
}

fn read_offset() -> Result<Option<i64>> {
    let value = env::var_os(OFFSET_VARIABLE).map(|v| v.to_string_lossy().into_owned());
    parse_offset(value)
}

/// Unset and empty both mean "no offset".
fn parse_offset(value: Option<String>) -> Result<Option<i64>> {
    match value {
        None => Ok(None),
        Some(value) if value.is_empty() => Ok(None),
        Some(value) => match value.parse::<i64>() {
            Ok(offset) => Ok(Some(offset)),
            Err(e) => Err(Error::configuration(OFFSET_VARIABLE, value, e)),
        },
    }
}
