#![cfg_attr(doc, doc = include_str!("../README.md"))]

pub mod auth;
pub mod error;
pub mod pagination;
pub mod rest;
pub mod types;

use reqwest::header::HeaderMap;
use reqwest::{Client as ReqwestClient, Method, Request, StatusCode};
use serde::Deserialize;
use serde::de::DeserializeOwned;

pub use crate::auth::Credentials;
pub use crate::error::{Error, Kind};
pub use crate::pagination::{Direction, PaginationParams};
pub use crate::rest::{Client, ClientConfig, PRODUCTION, SANDBOX, TimePolicy};
pub use crate::types::{Response, ResponseMeta};

pub type Result<T> = std::result::Result<T, Error>;

/// Unix timestamp in seconds.
pub type Timestamp = i64;

/// JSON body the exchange sends with every non-200 response.
#[derive(Debug, Default, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    message: String,
}

/// Executes `request` and splits off the response metadata.
///
/// Any status other than `200 OK` is turned into a [`Kind::Remote`] error
/// carrying the exchange's message; the success body is left unread.
pub(crate) async fn send(
    client: &ReqwestClient,
    mut request: Request,
    headers: HeaderMap,
    path: &str,
) -> Result<(ResponseMeta, reqwest::Response)> {
    let method = request.method().clone();
    request.headers_mut().extend(headers);

    #[cfg(feature = "tracing")]
    tracing::debug!(method = %method, path = %path, "sending request");

    let response = client.execute(request).await?;
    let meta = ResponseMeta::from_response(&response);

    if meta.status == StatusCode::OK {
        return Ok((meta, response));
    }

    let bytes = response
        .bytes()
        .await
        .map_err(|e| Error::with_source(Kind::Transport, e).with_response(meta.clone()))?;
    let body: ErrorBody = decode(&bytes).map_err(|e| e.with_response(meta.clone()))?;

    #[cfg(feature = "tracing")]
    tracing::warn!(
        status = %meta.status,
        method = %method,
        path = %path,
        message = %body.message,
        "exchange rejected request"
    );

    Err(error_for(meta, method, path, body.message))
}

fn error_for(meta: ResponseMeta, method: Method, path: &str, message: String) -> Error {
    Error::remote(meta.status, method, path.to_owned(), message).with_response(meta)
}

/// Reads the rest of `response` and decodes it as `T`.
pub(crate) async fn read_json<T: DeserializeOwned>(
    meta: &ResponseMeta,
    response: reqwest::Response,
) -> Result<T> {
    let bytes = response
        .bytes()
        .await
        .map_err(|e| Error::with_source(Kind::Transport, e).with_response(meta.clone()))?;

    decode(&bytes).map_err(|e| e.with_response(meta.clone()))
}

#[cfg(not(feature = "tracing"))]
fn decode<T: DeserializeOwned>(bytes: &[u8]) -> Result<T> {
    serde_json::from_slice(bytes).map_err(Error::decoding)
}

#[cfg(feature = "tracing")]
fn decode<T: DeserializeOwned>(bytes: &[u8]) -> Result<T> {
    let mut de = serde_json::Deserializer::from_slice(bytes);
    let mut report = |path: serde_ignored::Path<'_>| {
        tracing::debug!(%path, "ignoring unknown response field");
    };
    let ignored = serde_ignored::Deserializer::new(&mut de, &mut report);
    let value = serde_path_to_error::deserialize(ignored).map_err(Error::decoding)?;
    de.end().map_err(Error::decoding)?;

    Ok(value)
}
