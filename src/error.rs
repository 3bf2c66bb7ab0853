use std::backtrace::Backtrace;
use std::error::Error as StdError;
use std::fmt;
use std::num::ParseIntError;

use reqwest::{Method, StatusCode};

use crate::types::ResponseMeta;

/// Broad classification of everything that can go wrong while talking to the exchange.
#[non_exhaustive]
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Kind {
    /// The request payload could not be serialized to JSON.
    Encoding,
    /// A configuration value (e.g. the timestamp offset variable) is malformed.
    Config,
    /// The API secret is not valid base64 or a credential is not a valid header value.
    Credential,
    /// The request never completed a round trip.
    Transport,
    /// The exchange answered with a non-200 status.
    Remote,
    /// The response body did not match the expected JSON shape.
    Decoding,
    /// A locally constructed value (URL, header) was rejected before sending.
    Validation,
}

#[derive(Debug)]
pub struct Error {
    kind: Kind,
    source: Option<Box<dyn StdError + Send + Sync + 'static>>,
    response: Option<Box<ResponseMeta>>,
    backtrace: Backtrace,
}

impl Error {
    pub fn with_source<S: StdError + Send + Sync + 'static>(kind: Kind, source: S) -> Self {
        Self {
            kind,
            source: Some(Box::new(source)),
            response: None,
            backtrace: Backtrace::capture(),
        }
    }

    #[must_use]
    pub fn kind(&self) -> Kind {
        self.kind
    }

    #[must_use]
    pub fn backtrace(&self) -> &Backtrace {
        &self.backtrace
    }

    /// Status and headers of the round trip that produced this error, if one completed.
    #[must_use]
    pub fn response(&self) -> Option<&ResponseMeta> {
        self.response.as_deref()
    }

    #[must_use]
    pub fn inner(&self) -> Option<&(dyn StdError + Send + Sync + 'static)> {
        self.source.as_deref()
    }

    pub fn downcast_ref<E: StdError + 'static>(&self) -> Option<&E> {
        let e = self.source.as_deref()?;
        e.downcast_ref::<E>()
    }

    /// The exchange-reported failure, when this is a [`Kind::Remote`] error.
    #[must_use]
    pub fn exchange(&self) -> Option<&ExchangeError> {
        self.downcast_ref::<ExchangeError>()
    }

    pub fn validation<S: Into<String>>(message: S) -> Self {
        Validation {
            reason: message.into(),
        }
        .into()
    }

    pub fn credential<S: Into<String>>(message: S) -> Self {
        Self::with_source(
            Kind::Credential,
            Validation {
                reason: message.into(),
            },
        )
    }

    pub fn encoding(source: serde_json::Error) -> Self {
        Self::with_source(Kind::Encoding, source)
    }

    pub fn decoding<S: StdError + Send + Sync + 'static>(source: S) -> Self {
        Self::with_source(Kind::Decoding, source)
    }

    pub fn remote<S: Into<String>>(
        status_code: StatusCode,
        method: Method,
        path: String,
        message: S,
    ) -> Self {
        ExchangeError {
            status_code,
            method,
            path,
            message: message.into(),
        }
        .into()
    }

    pub(crate) fn configuration(
        variable: &'static str,
        value: String,
        source: ParseIntError,
    ) -> Self {
        Configuration {
            variable,
            value,
            source,
        }
        .into()
    }

    #[must_use]
    pub(crate) fn with_response(mut self, response: ResponseMeta) -> Self {
        self.response = Some(Box::new(response));
        self
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.source {
            Some(src) => write!(f, "{:?}: {}", self.kind, src),
            None => write!(f, "{:?}", self.kind),
        }
    }
}

impl StdError for Error {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        self.source
            .as_deref()
            .map(|e| e as &(dyn StdError + 'static))
    }
}

/// Failure reported by the exchange in its JSON error body.
#[non_exhaustive]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExchangeError {
    pub status_code: StatusCode,
    pub method: Method,
    pub path: String,
    pub message: String,
}

impl fmt::Display for ExchangeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "error({}) making {} call to {} with {}",
            self.status_code, self.method, self.path, self.message
        )
    }
}

impl StdError for ExchangeError {}

#[non_exhaustive]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Validation {
    pub reason: String,
}

impl fmt::Display for Validation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid: {}", self.reason)
    }
}

impl StdError for Validation {}

/// A configuration variable held a value that could not be parsed.
#[non_exhaustive]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Configuration {
    pub variable: &'static str,
    pub value: String,
    pub source: ParseIntError,
}

impl fmt::Display for Configuration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} must be an integer, got `{}`: {}",
            self.variable, self.value, self.source
        )
    }
}

impl StdError for Configuration {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        Some(&self.source)
    }
}

impl From<ExchangeError> for Error {
    fn from(e: ExchangeError) -> Self {
        Error::with_source(Kind::Remote, e)
    }
}

impl From<Validation> for Error {
    fn from(e: Validation) -> Self {
        Error::with_source(Kind::Validation, e)
    }
}

impl From<Configuration> for Error {
    fn from(e: Configuration) -> Self {
        Error::with_source(Kind::Config, e)
    }
}

impl From<reqwest::Error> for Error {
    fn from(e: reqwest::Error) -> Self {
        if e.is_decode() {
            Error::with_source(Kind::Decoding, e)
        } else {
            Error::with_source(Kind::Transport, e)
        }
    }
}

impl From<url::ParseError> for Error {
    fn from(e: url::ParseError) -> Self {
        Error::with_source(Kind::Validation, e)
    }
}

impl From<base64::DecodeError> for Error {
    fn from(e: base64::DecodeError) -> Self {
        Error::with_source(Kind::Credential, e)
    }
}

impl From<reqwest::header::InvalidHeaderValue> for Error {
    fn from(e: reqwest::header::InvalidHeaderValue) -> Self {
        Error::with_source(Kind::Credential, e)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn remote_error_is_downcastable() {
        let err = Error::remote(
            StatusCode::BAD_REQUEST,
            Method::POST,
            "/orders".to_owned(),
            "Insufficient funds",
        );

        assert_eq!(err.kind(), Kind::Remote);
        let exchange = err.exchange().expect("remote error carries exchange payload");
        assert_eq!(exchange.message, "Insufficient funds");
        assert_eq!(
            err.to_string(),
            "Remote: error(400 Bad Request) making POST call to /orders with Insufficient funds"
        );
    }

    #[test]
    fn configuration_error_exposes_parse_failure() {
        let source = "five".parse::<i64>().unwrap_err();
        let err = Error::configuration("TEST_COINBASE_OFFSET", "five".to_owned(), source);

        assert_eq!(err.kind(), Kind::Config);
        assert!(err.response().is_none(), "no round trip happened");
        let config = err
            .downcast_ref::<Configuration>()
            .expect("config error carries variable details");
        assert_eq!(config.variable, "TEST_COINBASE_OFFSET");
        assert_eq!(config.value, "five");
    }

    #[test]
    fn base64_failure_is_a_credential_error() {
        use base64::Engine as _;

        let err: Error = base64::engine::general_purpose::STANDARD
            .decode("not base64!")
            .unwrap_err()
            .into();
        assert_eq!(err.kind(), Kind::Credential);
    }
}
