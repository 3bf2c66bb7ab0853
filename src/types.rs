use reqwest::StatusCode;
use reqwest::header::HeaderMap;

/// Response header carrying the cursor to request newer items.
pub const BEFORE_HEADER: &str = "cb-before";
/// Response header carrying the cursor to request older items.
pub const AFTER_HEADER: &str = "cb-after";

/// Status line and headers of a completed round trip.
///
/// Returned with every successful response and attached to every error raised
/// after the exchange answered, so pagination cursors and rate-limit headers
/// stay reachable on failure paths.
#[non_exhaustive]
#[derive(Clone, Debug)]
pub struct ResponseMeta {
    pub status: StatusCode,
    pub headers: HeaderMap,
}

impl ResponseMeta {
    #[must_use]
    pub fn new(status: StatusCode, headers: HeaderMap) -> Self {
        Self { status, headers }
    }

    pub(crate) fn from_response(response: &reqwest::Response) -> Self {
        Self::new(response.status(), response.headers().clone())
    }

    /// Cursor for the page before this one, if the exchange sent one.
    #[must_use]
    pub fn before(&self) -> Option<&str> {
        self.header(BEFORE_HEADER)
    }

    /// Cursor for the page after this one, if the exchange sent one.
    #[must_use]
    pub fn after(&self) -> Option<&str> {
        self.header(AFTER_HEADER)
    }

    fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }
}

/// A decoded response body together with the metadata of its round trip.
#[non_exhaustive]
#[derive(Clone, Debug)]
pub struct Response<T> {
    pub meta: ResponseMeta,
    pub body: T,
}

impl<T> Response<T> {
    #[must_use]
    pub fn new(meta: ResponseMeta, body: T) -> Self {
        Self { meta, body }
    }

    #[must_use]
    pub fn into_body(self) -> T {
        self.body
    }

    #[must_use]
    pub fn into_parts(self) -> (ResponseMeta, T) {
        (self.meta, self.body)
    }
}

#[cfg(test)]
mod tests {
    use reqwest::header::HeaderValue;

    use super::*;

    #[test]
    fn cursors_read_from_headers() {
        let mut headers = HeaderMap::new();
        headers.insert(BEFORE_HEADER, HeaderValue::from_static("1071"));
        headers.insert(AFTER_HEADER, HeaderValue::from_static("1050"));

        let meta = ResponseMeta::new(StatusCode::OK, headers);
        assert_eq!(meta.before(), Some("1071"));
        assert_eq!(meta.after(), Some("1050"));
    }

    #[test]
    fn missing_cursor_headers_are_none() {
        let meta = ResponseMeta::new(StatusCode::OK, HeaderMap::new());
        assert_eq!(meta.before(), None);
        assert_eq!(meta.after(), None);
    }
}
