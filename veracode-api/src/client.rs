//! Core Veracode API client implementation.
//!
//! This module contains the foundational client for making authenticated requests
//! to the Veracode API, including HMAC authentication and response inspection.

use hmac::{Hmac, Mac};
use log::{debug, info};
use reqwest::header::AUTHORIZATION;
use reqwest::{Client, Method};
use serde::Serialize;
use serde::de::DeserializeOwned;
use sha2::Sha256;
use std::time::{SystemTime, UNIX_EPOCH};
use url::Url;
use uuid::Uuid;

use crate::sca::ScaApi;
use crate::{VeracodeConfig, VeracodeError};

type HmacSha256 = Hmac<Sha256>;

const INVALID_URL_MSG: &str = "Invalid URL";
const INVALID_API_KEY_MSG: &str = "Invalid API key format - must be hex string";
const INVALID_NONCE_MSG: &str = "Invalid nonce format";
const HMAC_CREATION_FAILED_MSG: &str = "Failed to create HMAC";
const SIGNING_VERSION: &str = "vcode_request_version_1";
const AUTH_SCHEME: &str = "VERACODE-HMAC-SHA-256";

/// Core Veracode API client.
///
/// Every request goes through [`VeracodeClient::execute`], which signs it,
/// logs the exchange and turns non-2xx statuses into errors.
#[derive(Clone)]
pub struct VeracodeClient {
    config: VeracodeConfig,
    client: Client,
}

impl VeracodeClient {
    /// Create a new Veracode API client.
    ///
    /// # Errors
    ///
    /// Returns `InvalidConfig` if the base URL cannot be parsed, or `Http` if
    /// the underlying HTTP client cannot be built.
    pub fn new(config: VeracodeConfig) -> Result<Self, VeracodeError> {
        Url::parse(&config.base_url).map_err(|e| {
            VeracodeError::InvalidConfig(format!("Invalid base URL '{}': {e}", config.base_url))
        })?;

        // No explicit timeouts: requests block until the transport gives up.
        let client = Client::builder().build().map_err(VeracodeError::Http)?;
        Ok(Self { config, client })
    }

    /// Get the base URL for API requests.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.config.base_url
    }

    /// Get access to the configuration
    #[must_use]
    pub fn config(&self) -> &VeracodeConfig {
        &self.config
    }

    /// Get an SCA API instance (workspaces, projects, linking).
    #[must_use]
    pub fn sca_api(&self) -> ScaApi<'_> {
        ScaApi::new(self)
    }

    fn build_url(&self, endpoint: &str) -> String {
        let mut url =
            String::with_capacity(self.config.base_url.len().saturating_add(endpoint.len()));
        url.push_str(&self.config.base_url);
        url.push_str(endpoint);
        url
    }

    /// Generate HMAC signature for authentication based on official Veracode JavaScript implementation
    fn generate_hmac_signature(
        &self,
        method: &str,
        url: &str,
        timestamp: u64,
        nonce: &str,
    ) -> Result<String, VeracodeError> {
        let url_parsed = Url::parse(url)
            .map_err(|_| VeracodeError::Authentication(INVALID_URL_MSG.to_string()))?;

        let path_and_query = match url_parsed.query() {
            Some(query) => format!("{}?{}", url_parsed.path(), query),
            None => url_parsed.path().to_string(),
        };

        let host = url_parsed.host_str().unwrap_or("");

        let data = format!(
            "id={}&host={}&url={}&method={}",
            self.config.credentials.expose_api_id(),
            host,
            path_and_query,
            method
        );

        let key_bytes = hex::decode(self.config.credentials.expose_api_key())
            .map_err(|_| VeracodeError::Authentication(INVALID_API_KEY_MSG.to_string()))?;

        let nonce_bytes = hex::decode(nonce)
            .map_err(|_| VeracodeError::Authentication(INVALID_NONCE_MSG.to_string()))?;

        // Key derivation chain: key -> nonce -> timestamp -> version string -> data
        let hashed_nonce = hmac_sha256(&key_bytes, &nonce_bytes)?;
        let hashed_timestamp = hmac_sha256(&hashed_nonce, timestamp.to_string().as_bytes())?;
        let hashed_ver_str = hmac_sha256(&hashed_timestamp, SIGNING_VERSION.as_bytes())?;
        let signature = hmac_sha256(&hashed_ver_str, data.as_bytes())?;

        Ok(hex::encode(signature))
    }

    /// Generate authorization header for HMAC authentication
    ///
    /// A fresh timestamp (milliseconds) and 16-byte nonce are used for every call.
    ///
    /// # Errors
    ///
    /// Returns `Authentication` if the URL is invalid, the API key is not hex,
    /// or the system clock is before the Unix epoch.
    pub fn generate_auth_header(&self, method: &str, url: &str) -> Result<String, VeracodeError> {
        #[allow(clippy::cast_possible_truncation)]
        let timestamp = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map_err(|e| VeracodeError::Authentication(format!("System time error: {e}")))?
            .as_millis() as u64;

        let nonce_bytes: [u8; 16] = rand::random();
        let nonce = hex::encode(nonce_bytes);

        let signature = self.generate_hmac_signature(method, url, timestamp, &nonce)?;
        debug!("Signed {method} {url} with nonce {nonce}");

        Ok(format!(
            "{AUTH_SCHEME} id={},ts={},nonce={},sig={}",
            self.config.credentials.expose_api_id(),
            timestamp,
            nonce,
            signature
        ))
    }

    /// Per-request headers sent alongside `Authorization`.
    fn request_headers() -> Result<Vec<(&'static str, String)>, VeracodeError> {
        let timestamp = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map_err(|e| VeracodeError::Authentication(format!("System time error: {e}")))?
            .as_secs();

        Ok(vec![
            ("x-request-timestamp", timestamp.to_string()),
            ("x-request-nonce", Uuid::new_v4().to_string()),
            ("Content-Type", "application/json".to_string()),
        ])
    }

    /// Perform one signed request and return the raw response body.
    ///
    /// The request URL, headers (without `Authorization`), response status and
    /// response body are logged before any status check, so failure context is
    /// always visible.
    ///
    /// # Errors
    ///
    /// * `Authentication` - the request could not be signed
    /// * `Http` - the request could not be sent or the body could not be read
    /// * `HttpStatus` - the platform answered with a non-2xx status
    pub async fn execute(
        &self,
        method: Method,
        endpoint: &str,
        body: Option<String>,
    ) -> Result<String, VeracodeError> {
        let url = self.build_url(endpoint);
        let headers = Self::request_headers()?;
        let auth_header = self.generate_auth_header(method.as_str(), &url)?;

        info!("Request URL: {method} {url}");
        info!("Headers: {}", format_headers(&headers));

        let mut request = self
            .client
            .request(method, url.as_str())
            .header(AUTHORIZATION, auth_header);
        for (name, value) in &headers {
            request = request.header(*name, value.as_str());
        }
        if let Some(body) = body {
            request = request.body(body);
        }

        let response = request.send().await?;
        let status = response.status();
        let response_text = response.text().await?;

        info!("Response Status Code: {}", status.as_u16());
        info!("Response Body: {response_text}");

        if !status.is_success() {
            return Err(VeracodeError::HttpStatus {
                status: status.as_u16(),
                url,
                body: response_text,
            });
        }

        Ok(response_text)
    }

    /// Make a GET request and deserialize the JSON response.
    ///
    /// # Errors
    ///
    /// Any error from [`VeracodeClient::execute`], or `Serialization` if the
    /// body is not valid JSON of the expected shape.
    pub async fn get_json<T: DeserializeOwned>(&self, endpoint: &str) -> Result<T, VeracodeError> {
        let response_text = self.execute(Method::GET, endpoint, None).await?;
        Ok(serde_json::from_str(&response_text)?)
    }

    /// Make a PUT request with a JSON body and return the raw response body.
    ///
    /// # Errors
    ///
    /// Any error from [`VeracodeClient::execute`], or `Serialization` if the
    /// body cannot be serialized.
    pub async fn put_json<B: Serialize + ?Sized>(
        &self,
        endpoint: &str,
        body: &B,
    ) -> Result<String, VeracodeError> {
        let serialized = serde_json::to_string(body)?;
        self.execute(Method::PUT, endpoint, Some(serialized)).await
    }
}

fn hmac_sha256(key: &[u8], message: &[u8]) -> Result<Vec<u8>, VeracodeError> {
    let mut mac = HmacSha256::new_from_slice(key)
        .map_err(|_| VeracodeError::Authentication(HMAC_CREATION_FAILED_MSG.to_string()))?;
    mac.update(message);
    Ok(mac.finalize().into_bytes().to_vec())
}

fn format_headers(headers: &[(&str, String)]) -> String {
    headers
        .iter()
        .map(|(name, value)| format!("{name}: {value}"))
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::{Matcher, Server};
    use serde::Deserialize;

    const TEST_API_ID: &str = "abc123";
    const TEST_API_KEY: &str = "3ddaeeb10ca690df3fee5e3bd1c329fa";

    fn test_client(base_url: &str) -> VeracodeClient {
        let config = VeracodeConfig::new(TEST_API_ID.to_string(), TEST_API_KEY.to_string())
            .with_base_url(base_url);
        VeracodeClient::new(config).unwrap()
    }

    #[derive(Debug, Deserialize)]
    struct Echo {
        value: String,
    }

    #[test]
    fn test_hmac_signature_known_vector() {
        let client = test_client("https://api.veracode.com");
        let signature = client
            .generate_hmac_signature(
                "GET",
                "https://api.veracode.com/srcclr/v3/workspaces",
                1_700_000_000_000,
                "00112233445566778899aabbccddeeff",
            )
            .unwrap();

        assert_eq!(
            signature,
            "8bed69a505938ecbd53d20bb857a945ac13cacfdeb73d35e63b05e51bacd67e9"
        );
    }

    #[test]
    fn test_hmac_signature_includes_query_string() {
        let client = test_client("https://api.veracode.com");
        let signature = client
            .generate_hmac_signature(
                "GET",
                "https://api.veracode.com/appsec/v1/applications?page=0",
                1_700_000_000_000,
                "00112233445566778899aabbccddeeff",
            )
            .unwrap();

        assert_eq!(
            signature,
            "1a9f5c52ad23d7d70e8cf2b5e693fd8bec1da07534dea4c1935f137429b40982"
        );
    }

    #[test]
    fn test_hmac_signature_depends_on_method() {
        let client = test_client("https://api.veracode.com");
        let url = "https://api.veracode.com/srcclr/v3/applications/A1/projects/P1";
        let nonce = "00112233445566778899aabbccddeeff";

        let get = client
            .generate_hmac_signature("GET", url, 1, nonce)
            .unwrap();
        let put = client
            .generate_hmac_signature("PUT", url, 1, nonce)
            .unwrap();

        assert_ne!(get, put);
        assert_eq!(put.len(), 64);
    }

    #[test]
    fn test_auth_header_format_and_fresh_nonce() {
        let client = test_client("https://api.veracode.com");
        let url = "https://api.veracode.com/srcclr/v3/workspaces";

        let first = client.generate_auth_header("GET", url).unwrap();
        let second = client.generate_auth_header("GET", url).unwrap();

        assert!(first.starts_with("VERACODE-HMAC-SHA-256 id=abc123,ts="));
        assert!(first.contains(",nonce="));
        assert!(first.contains(",sig="));
        assert_ne!(first, second);
    }

    #[test]
    fn test_non_hex_api_key_fails_signing() {
        let config = VeracodeConfig::new(TEST_API_ID.to_string(), "not-hex".to_string());
        let client = VeracodeClient::new(config).unwrap();

        let result = client.generate_auth_header("GET", "https://api.veracode.com/x");
        assert!(matches!(result, Err(VeracodeError::Authentication(msg)) if msg == INVALID_API_KEY_MSG));
    }

    #[test]
    fn test_invalid_base_url_rejected() {
        let config = VeracodeConfig::new(TEST_API_ID.to_string(), TEST_API_KEY.to_string())
            .with_base_url("not a url");

        assert!(matches!(
            VeracodeClient::new(config),
            Err(VeracodeError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_format_headers() {
        let headers = vec![
            ("x-request-nonce", "n".to_string()),
            ("Content-Type", "application/json".to_string()),
        ];
        assert_eq!(
            format_headers(&headers),
            "x-request-nonce: n, Content-Type: application/json"
        );
    }

    #[tokio::test]
    async fn test_request_carries_signed_headers() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("GET", "/echo")
            .match_header("x-request-timestamp", Matcher::Regex(r"^\d+$".to_string()))
            .match_header(
                "x-request-nonce",
                Matcher::Regex(r"^[0-9a-f]{8}-[0-9a-f]{4}-4[0-9a-f]{3}-".to_string()),
            )
            .match_header("content-type", "application/json")
            .match_header(
                "authorization",
                Matcher::Regex(
                    r"^VERACODE-HMAC-SHA-256 id=abc123,ts=\d+,nonce=[0-9a-f]{32},sig=[0-9a-f]{64}$"
                        .to_string(),
                ),
            )
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"value": "ok"}"#)
            .expect(1)
            .create_async()
            .await;

        let client = test_client(&server.url());
        let echo: Echo = client.get_json("/echo").await.unwrap();

        assert_eq!(echo.value, "ok");
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_non_success_status_is_error_with_body() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("GET", "/echo")
            .with_status(403)
            .with_body("forbidden")
            .create_async()
            .await;

        let client = test_client(&server.url());
        let result = client.get_json::<Echo>("/echo").await;

        match result {
            Err(VeracodeError::HttpStatus { status, url, body }) => {
                assert_eq!(status, 403);
                assert_eq!(body, "forbidden");
                assert!(url.ends_with("/echo"));
            }
            other => panic!("expected HttpStatus error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_malformed_json_is_serialization_error() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("GET", "/echo")
            .with_status(200)
            .with_body("<html>not json</html>")
            .create_async()
            .await;

        let client = test_client(&server.url());
        let result = client.get_json::<Echo>("/echo").await;

        assert!(matches!(result, Err(VeracodeError::Serialization(_))));
    }

    #[tokio::test]
    async fn test_put_sends_json_body() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("PUT", "/thing")
            .match_body(Matcher::Json(serde_json::json!({})))
            .with_status(200)
            .with_body("")
            .expect(1)
            .create_async()
            .await;

        let client = test_client(&server.url());
        let body = client
            .put_json("/thing", &serde_json::Map::new())
            .await
            .unwrap();

        assert!(body.is_empty());
        mock.assert_async().await;
    }
}
