//! Request authentication for the exchange's `CB-ACCESS-*` header scheme.
//!
//! Every private request carries the API key, the passphrase, the request
//! timestamp and a signature. The signature is the base64-encoded
//! HMAC-SHA256 of `timestamp + method + path + body`, keyed with the
//! base64-decoded API secret.

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use hmac::{Hmac, Mac as _};
use reqwest::Method;
use reqwest::header::{ACCEPT, CONTENT_TYPE, HeaderMap, HeaderName, HeaderValue, USER_AGENT};
use secrecy::{ExposeSecret as _, SecretString};
use serde::Deserialize;
use sha2::Sha256;

use crate::error::Error;
use crate::{Result, Timestamp};

pub const ACCESS_KEY: &str = "cb-access-key";
pub const ACCESS_PASSPHRASE: &str = "cb-access-passphrase";
pub const ACCESS_TIMESTAMP: &str = "cb-access-timestamp";
pub const ACCESS_SIGN: &str = "cb-access-sign";

const APPLICATION_JSON: &str = "application/json";

/// API key, secret and passphrase issued by the exchange.
///
/// The secret and passphrase never show up in `Debug` output.
#[non_exhaustive]
#[derive(Clone, Debug, Deserialize)]
pub struct Credentials {
    key: String,
    secret: SecretString,
    passphrase: SecretString,
}

impl Credentials {
    #[must_use]
    pub fn new(key: String, secret: SecretString, passphrase: SecretString) -> Self {
        Self {
            key,
            secret,
            passphrase,
        }
    }

    /// Public key identifier, sent as `CB-ACCESS-KEY`.
    #[must_use]
    pub fn key(&self) -> &str {
        &self.key
    }

    pub(crate) fn secret(&self) -> &SecretString {
        &self.secret
    }

    pub(crate) fn passphrase(&self) -> &SecretString {
        &self.passphrase
    }
}

/// Signs `timestamp + method + path + body` with the base64-encoded `secret`.
///
/// `body` must be the exact bytes sent on the wire; pass an empty slice for
/// requests without a payload.
pub fn sign(
    secret: &SecretString,
    timestamp: &str,
    method: &Method,
    path: &str,
    body: &[u8],
) -> Result<String> {
    let key = STANDARD.decode(secret.expose_secret())?;

    let mut mac = Hmac::<Sha256>::new_from_slice(&key)
        .map_err(|e| Error::credential(format!("unusable API secret: {e}")))?;
    mac.update(timestamp.as_bytes());
    mac.update(method.as_str().as_bytes());
    mac.update(path.as_bytes());
    mac.update(body);

    Ok(STANDARD.encode(mac.finalize().into_bytes()))
}

/// Builds the full header set for one request.
pub(crate) fn create_headers(
    credentials: &Credentials,
    user_agent: &HeaderValue,
    timestamp: Timestamp,
    method: &Method,
    path: &str,
    body: &[u8],
) -> Result<HeaderMap> {
    let timestamp = timestamp.to_string();
    let signature = sign(credentials.secret(), &timestamp, method, path, body)?;

    let mut passphrase = HeaderValue::from_str(credentials.passphrase().expose_secret())?;
    passphrase.set_sensitive(true);
    let mut signature = HeaderValue::from_str(&signature)?;
    signature.set_sensitive(true);

    let mut map = HeaderMap::with_capacity(7);
    map.insert(ACCEPT, HeaderValue::from_static(APPLICATION_JSON));
    map.insert(CONTENT_TYPE, HeaderValue::from_static(APPLICATION_JSON));
    map.insert(USER_AGENT, user_agent.clone());
    map.insert(
        HeaderName::from_static(ACCESS_KEY),
        HeaderValue::from_str(credentials.key())?,
    );
    map.insert(HeaderName::from_static(ACCESS_PASSPHRASE), passphrase);
    map.insert(
        HeaderName::from_static(ACCESS_TIMESTAMP),
        HeaderValue::from_str(&timestamp)?,
    );
    map.insert(HeaderName::from_static(ACCESS_SIGN), signature);

    Ok(map)
}

#[cfg(test)]
mod tests {
    use base64::Engine as _;
    use hmac::Mac as _;

    use crate::error::Kind;

    use super::*;

    // "secret-key-bytes" base64-encoded
    const SECRET: &str = "c2VjcmV0LWtleS1ieXRlcw==";

    fn credentials() -> Credentials {
        Credentials::new(
            "key-id".to_owned(),
            SecretString::from(SECRET),
            SecretString::from("hunter2"),
        )
    }

    fn independent_signature(message: &str) -> String {
        let key = STANDARD.decode(SECRET).expect("valid base64");
        let mut mac = Hmac::<Sha256>::new_from_slice(&key).expect("any key length");
        mac.update(message.as_bytes());
        STANDARD.encode(mac.finalize().into_bytes())
    }

    #[test]
    fn signature_matches_hmac_over_canonical_string() {
        let body = br#"{"size":"1.0","side":"buy"}"#;
        let signature = sign(
            &SecretString::from(SECRET),
            "1500000000",
            &Method::POST,
            "/orders",
            body,
        )
        .expect("signing succeeds");

        assert_eq!(
            signature,
            independent_signature(r#"1500000000POST/orders{"size":"1.0","side":"buy"}"#)
        );
    }

    #[test]
    fn empty_body_signs_prefix_only() {
        let signature = sign(
            &SecretString::from(SECRET),
            "1500000000",
            &Method::GET,
            "/accounts?limit=5",
            &[],
        )
        .expect("signing succeeds");

        assert_eq!(signature, independent_signature("1500000000GET/accounts?limit=5"));
    }

    #[test]
    fn invalid_base64_secret_is_credential_error() {
        let err = sign(
            &SecretString::from("%%% not base64 %%%"),
            "1",
            &Method::GET,
            "/",
            &[],
        )
        .unwrap_err();

        assert_eq!(err.kind(), Kind::Credential);
    }

    #[test]
    fn headers_carry_credentials_and_signature() {
        let headers = create_headers(
            &credentials(),
            &HeaderValue::from_static("test-agent"),
            1_500_000_000,
            &Method::GET,
            "/accounts",
            &[],
        )
        .expect("headers build");

        assert_eq!(headers[ACCEPT], "application/json");
        assert_eq!(headers[CONTENT_TYPE], "application/json");
        assert_eq!(headers[USER_AGENT], "test-agent");
        assert_eq!(headers[ACCESS_KEY], "key-id");
        assert_eq!(headers[ACCESS_PASSPHRASE], "hunter2");
        assert_eq!(headers[ACCESS_TIMESTAMP], "1500000000");
        assert_eq!(
            headers[ACCESS_SIGN],
            independent_signature("1500000000GET/accounts").as_str()
        );
        assert!(headers[ACCESS_PASSPHRASE].is_sensitive(), "passphrase is masked");
    }

    #[test]
    fn debug_output_hides_secrets() {
        let debug = format!("{:?}", credentials());

        assert!(debug.contains("key-id"), "key id stays visible: {debug}");
        assert!(!debug.contains(SECRET), "secret leaked: {debug}");
        assert!(!debug.contains("hunter2"), "passphrase leaked: {debug}");
    }

    #[test]
    fn credentials_deserialize_from_json() {
        let credentials: Credentials = serde_json::from_str(&format!(
            r#"{{"key":"key-id","secret":"{SECRET}","passphrase":"hunter2"}}"#
        ))
        .expect("valid credentials json");

        assert_eq!(credentials.key(), "key-id");
        assert_eq!(credentials.secret().expose_secret(), SECRET);
    }
}
