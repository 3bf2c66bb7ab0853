use async_stream::try_stream;
use chrono::Utc;
use futures::Stream;
use reqwest::header::HeaderValue;
use reqwest::{Client as ReqwestClient, Method, Request};
use serde::Serialize;
use serde::de::DeserializeOwned;
use url::Url;

use crate::auth::{self, Credentials};
use crate::error::Error;
use crate::pagination::{Direction, PaginationParams};
use crate::rest::{ClientConfig, TimePolicy};
use crate::types::{Response, ResponseMeta};
use crate::{Result, Timestamp};

/// Authenticated client for the exchange REST API.
///
/// Cloning is cheap: clones share the pooled transport and the credentials.
#[derive(Clone, Debug)]
pub struct Client {
    base_url: String,
    base_path: String,
    user_agent: HeaderValue,
    time: TimePolicy,
    credentials: Credentials,
    client: ReqwestClient,
}

impl Client {
    /// Creates a client for the production endpoint with default settings.
    pub fn new(credentials: Credentials) -> Result<Self> {
        Self::with_config(ClientConfig::default(), credentials)
    }

    pub fn with_config(config: ClientConfig, credentials: Credentials) -> Result<Self> {
        let client = ReqwestClient::builder().timeout(config.timeout).build()?;
        Self::with_config_and_client(config, credentials, client)
    }

    /// Creates a client around a caller-supplied transport.
    ///
    /// `config.timeout` is not applied; configure it on `client` instead.
    pub fn with_config_and_client(
        config: ClientConfig,
        credentials: Credentials,
        client: ReqwestClient,
    ) -> Result<Self> {
        let user_agent = config.validate()?;
        let base_path = base_path(&config.base_url)?;

        Ok(Self {
            base_url: config.base_url,
            base_path,
            user_agent,
            time: config.time,
            credentials,
            client,
        })
    }

    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    #[must_use]
    pub fn credentials(&self) -> &Credentials {
        &self.credentials
    }

    /// Performs one signed round trip and decodes a `200 OK` body as `T`.
    ///
    /// `path` is appended verbatim to the base URL and is signed exactly as
    /// given, query string included. A path the URL parser would rewrite
    /// (dot segments, unescaped spaces, a fragment) is rejected with
    /// [`Kind::Validation`](crate::error::Kind::Validation).
    pub async fn request<B, T>(
        &self,
        method: Method,
        path: &str,
        body: Option<&B>,
    ) -> Result<Response<T>>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let (meta, response) = self.send(method, path, body).await?;
        let body = crate::read_json(&meta, response).await?;

        Ok(Response::new(meta, body))
    }

    /// Performs one signed round trip without reading a `200 OK` body.
    pub async fn execute<B>(
        &self,
        method: Method,
        path: &str,
        body: Option<&B>,
    ) -> Result<ResponseMeta>
    where
        B: Serialize + ?Sized,
    {
        let (meta, _) = self.send(method, path, body).await?;
        Ok(meta)
    }

    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<Response<T>> {
        self.request(Method::GET, path, None::<&()>).await
    }

    pub async fn post<B, T>(&self, path: &str, body: &B) -> Result<Response<T>>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        self.request(Method::POST, path, Some(body)).await
    }

    pub async fn delete<T: DeserializeOwned>(&self, path: &str) -> Result<Response<T>> {
        self.request(Method::DELETE, path, None::<&()>).await
    }

    /// Fetches the page of `path` selected by `params` in `direction`.
    pub async fn page<T: DeserializeOwned>(
        &self,
        path: &str,
        params: &PaginationParams,
        direction: Direction,
    ) -> Result<Response<T>> {
        let query = params.encode(direction);
        if query.is_empty() {
            self.get(path).await
        } else {
            self.get(&format!("{path}?{query}")).await
        }
    }

    /// Streams pages of `path` in `direction`, following the cursors the
    /// exchange returns.
    ///
    /// The stream ends after the first error, or after a page that leaves no
    /// cursor to follow.
    pub fn stream_pages<'a, T: DeserializeOwned + 'a>(
        &'a self,
        path: &'a str,
        mut params: PaginationParams,
        direction: Direction,
    ) -> impl Stream<Item = Result<Response<T>>> + 'a {
        try_stream! {
            loop {
                let page = self.page::<T>(path, &params, direction).await?;
                params.advance(&page.meta);
                let exhausted = params.done() || params.cursor(direction).is_empty();

                yield page;

                if exhausted {
                    break;
                }
            }
        }
    }

    async fn send<B>(
        &self,
        method: Method,
        path: &str,
        body: Option<&B>,
    ) -> Result<(ResponseMeta, reqwest::Response)>
    where
        B: Serialize + ?Sized,
    {
        let (request, headers) = self.build_request(method, path, body, Utc::now().timestamp())?;
        crate::send(&self.client, request, headers, path).await
    }

    /// Builds the request and its signed headers for the clock reading `now`.
    ///
    /// The signature covers the body bytes already attached to the request,
    /// so what is signed is exactly what goes on the wire.
    pub(crate) fn build_request<B>(
        &self,
        method: Method,
        path: &str,
        body: Option<&B>,
        now: Timestamp,
    ) -> Result<(Request, reqwest::header::HeaderMap)>
    where
        B: Serialize + ?Sized,
    {
        let payload = body
            .map(serde_json::to_vec)
            .transpose()
            .map_err(Error::encoding)?;

        let url = Url::parse(&format!("{}{}", self.base_url, path))?;
        let expected = format!("{}{}", self.base_path, path);
        let target = request_target(&url);
        if target != expected {
            return Err(Error::validation(format!(
                "path `{path}` would be sent as `{target}`"
            )));
        }

        let mut builder = self.client.request(method.clone(), url);
        if let Some(payload) = payload {
            builder = builder.body(payload);
        }
        let request = builder.build()?;

        let timestamp = self.time.timestamp(now)?;
        let body = request
            .body()
            .and_then(reqwest::Body::as_bytes)
            .unwrap_or_default();
        let headers = auth::create_headers(
            &self.credentials,
            &self.user_agent,
            timestamp,
            &method,
            path,
            body,
        )?;

        Ok((request, headers))
    }
}

/// Path prefix the base URL contributes to every request target.
fn base_path(base_url: &str) -> Result<String> {
    let url = Url::parse(base_url)?;
    if url.path() == "/" && !base_url.ends_with('/') {
        return Ok(String::new());
    }

    Ok(url.path().to_owned())
}

fn request_target(url: &Url) -> String {
    match url.query() {
        Some(query) => format!("{}?{query}", url.path()),
        None => url.path().to_owned(),
    }
}
