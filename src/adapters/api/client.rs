//! Futures HTTP Client - Rate-limited, Signed REST Client
//!
//! Wraps reqwest with client-side rate limiting, HMAC request signing and
//! venue error decoding. It never retries on its own: retry policy belongs
//! to the caller, so one call here is exactly one request on the wire.

use std::num::NonZeroU32;
use std::time::Duration;

use anyhow::{Context, Result, bail};
use governor::{DefaultDirectRateLimiter, Quota, RateLimiter};
use reqwest::header::HeaderValue;
use reqwest::{Client, Method, Request, Response, StatusCode};
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use super::auth::{API_KEY_HEADER, RequestSigner};
use super::types::{ApiError, WeightUsage};
use crate::config::VenueConfig;
use crate::domain::Credentials;

/// Header with the request weight used in the current minute.
const USED_WEIGHT_HEADER: &str = "x-mbx-used-weight-1m";

/// Configuration for the futures HTTP client.
#[derive(Debug, Clone)]
pub struct FuturesClientConfig {
  /// Base URL for the REST API.
  pub base_url: String,
  /// Request timeout.
  pub timeout: Duration,
  /// Validity window for signed requests (ms).
  pub recv_window_ms: u64,
  /// Requests allowed per minute before the client waits.
  pub max_requests_per_minute: u32,
}

impl Default for FuturesClientConfig {
  fn default() -> Self {
    Self::from_venue(&VenueConfig::default())
  }
}

impl FuturesClientConfig {
  /// Build from the `[venue]` config section.
  pub fn from_venue(venue: &VenueConfig) -> Self {
    Self {
      base_url: venue.resolved_base_url(),
      timeout: Duration::from_secs(venue.timeout_seconds),
      recv_window_ms: venue.recv_window_ms,
      max_requests_per_minute: venue.max_requests_per_minute,
    }
  }
}

/// Rate-limited HTTP client for the futures REST API.
pub struct FuturesClient {
  /// Underlying HTTP client.
  http: Client,
  /// Request signer holding the credentials.
  signer: RequestSigner,
  /// Client configuration.
  config: FuturesClientConfig,
  /// Client-side request budget.
  limiter: DefaultDirectRateLimiter,
  /// Last weight usage reported by the venue.
  last_weight: tokio::sync::RwLock<Option<WeightUsage>>,
}

impl FuturesClient {
  /// Create a new client.
  pub fn new(credentials: Credentials, config: FuturesClientConfig) -> Result<Self> {
    let http = Client::builder()
      .timeout(config.timeout)
      .pool_max_idle_per_host(2)
      .build()
      .context("Failed to build HTTP client")?;

    let per_minute = NonZeroU32::new(config.max_requests_per_minute)
      .context("max_requests_per_minute must be positive")?;
    let limiter = RateLimiter::direct(Quota::per_minute(per_minute));

    Ok(Self {
      http,
      signer: RequestSigner::new(credentials, config.recv_window_ms),
      config,
      limiter,
      last_weight: tokio::sync::RwLock::new(None),
    })
  }

  fn url(&self, path: &str) -> String {
    format!("{}{}", self.config.base_url.trim_end_matches('/'), path)
  }

  /// Execute an unsigned GET request.
  pub async fn get_public<T: DeserializeOwned>(
    &self,
    path: &str,
    params: &[(&str, String)],
  ) -> Result<T> {
    let request = self
      .http
      .get(self.url(path))
      .query(params)
      .build()
      .context("Failed to build request")?;
    self.execute(request, path).await
  }

  /// Execute a signed GET request.
  pub async fn get_signed<T: DeserializeOwned>(
    &self,
    path: &str,
    params: &[(&str, String)],
  ) -> Result<T> {
    self.send_signed(Method::GET, path, params).await
  }

  /// Execute a signed POST request (parameters in the query string).
  pub async fn post_signed<T: DeserializeOwned>(
    &self,
    path: &str,
    params: &[(&str, String)],
  ) -> Result<T> {
    self.send_signed(Method::POST, path, params).await
  }

  /// Sign the encoded query string and attach the API key header.
  async fn send_signed<T: DeserializeOwned>(
    &self,
    method: Method,
    path: &str,
    params: &[(&str, String)],
  ) -> Result<T> {
    let timestamp = RequestSigner::timestamp_ms();

    let mut request = self
      .http
      .request(method, self.url(path))
      .query(params)
      .query(&[
        ("recvWindow", self.signer.recv_window_ms()),
        ("timestamp", timestamp),
      ])
      .build()
      .context("Failed to build signed request")?;

    let payload = request.url().query().unwrap_or_default().to_string();
    let signature = self.signer.sign(&payload);
    request
      .url_mut()
      .query_pairs_mut()
      .append_pair("signature", &signature);

    let key = HeaderValue::from_str(self.signer.api_key())
      .context("API key is not a valid header value")?;
    request.headers_mut().insert(API_KEY_HEADER, key);

    self.execute(request, path).await
  }

  /// Send one request and decode the JSON body or the venue error.
  async fn execute<T: DeserializeOwned>(&self, request: Request, path: &str) -> Result<T> {
    self.limiter.until_ready().await;

    let method = request.method().clone();
    debug!(%method, path, "Sending venue request");

    let response = self
      .http
      .execute(request)
      .await
      .with_context(|| format!("{method} {path} failed"))?;

    self.update_weight(&response).await;

    let status = response.status();
    if status.is_success() {
      return response
        .json::<T>()
        .await
        .with_context(|| format!("Failed to decode {path} response"));
    }

    if status == StatusCode::TOO_MANY_REQUESTS || status == StatusCode::IM_A_TEAPOT {
      warn!(%status, path, "Rate limited by venue");
    }

    let body = response.text().await.unwrap_or_default();
    match serde_json::from_str::<ApiError>(&body) {
      Ok(api) => bail!("venue error {} ({status}): {}", api.code, api.msg),
      Err(_) => bail!("HTTP {status} from {path}: {body}"),
    }
  }

  /// Extract and cache the weight usage header.
  async fn update_weight(&self, response: &Response) {
    let used = response
      .headers()
      .get(USED_WEIGHT_HEADER)
      .and_then(|v| v.to_str().ok())
      .and_then(|v| v.parse().ok());

    if let Some(used_1m) = used {
      let mut guard = self.last_weight.write().await;
      *guard = Some(WeightUsage { used_1m });
    }
  }

  /// Get the last reported weight usage.
  pub async fn weight_usage(&self) -> Option<WeightUsage> {
    *self.last_weight.read().await
  }

  /// Base URL requests are sent to.
  pub fn base_url(&self) -> &str {
    &self.config.base_url
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use tokio::io::{AsyncReadExt, AsyncWriteExt};
  use tokio::net::TcpListener;
  use tokio::task::JoinHandle;

  fn client(base_url: &str) -> FuturesClient {
    let config = FuturesClientConfig {
      base_url: base_url.to_string(),
      ..FuturesClientConfig::default()
    };
    FuturesClient::new(Credentials::new("key", "secret").unwrap(), config).unwrap()
  }

  fn http_response(status: &str, headers: &[(&str, &str)], body: &str) -> String {
    let mut out = format!(
      "HTTP/1.1 {status}\r\ncontent-type: application/json\r\ncontent-length: {}\r\nconnection: close\r\n",
      body.len()
    );
    for (name, value) in headers {
      out.push_str(&format!("{name}: {value}\r\n"));
    }
    out.push_str("\r\n");
    out.push_str(body);
    out
  }

  /// Serve one canned response on a local port; the handle yields the
  /// raw request head that was received.
  async fn serve_once(response: String) -> (String, JoinHandle<String>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let handle = tokio::spawn(async move {
      let (mut socket, _) = listener.accept().await.unwrap();
      let mut head = Vec::new();
      let mut chunk = [0u8; 1024];
      while !head.windows(4).any(|w| w == b"\r\n\r\n") {
        let n = socket.read(&mut chunk).await.unwrap();
        if n == 0 {
          break;
        }
        head.extend_from_slice(&chunk[..n]);
      }
      socket.write_all(response.as_bytes()).await.unwrap();
      let _ = socket.shutdown().await;
      String::from_utf8_lossy(&head).into_owned()
    });
    (format!("http://{addr}"), handle)
  }

  /// Path and query of the request line, e.g. `/fapi/v1/order?a=1`.
  fn request_target(head: &str) -> &str {
    head.lines().next().unwrap().split(' ').nth(1).unwrap()
  }

  #[test]
  fn test_default_config_targets_testnet() {
    let config = FuturesClientConfig::default();
    assert_eq!(config.base_url, "https://testnet.binancefuture.com");
    assert_eq!(config.recv_window_ms, 5_000);
    assert_eq!(config.timeout, Duration::from_secs(10));
  }

  #[test]
  fn test_url_joins_without_double_slash() {
    let c = client("http://localhost:9/");
    assert_eq!(c.url("/fapi/v1/ping"), "http://localhost:9/fapi/v1/ping");
  }

  #[test]
  fn test_zero_rate_budget_rejected() {
    let config = FuturesClientConfig {
      max_requests_per_minute: 0,
      ..FuturesClientConfig::default()
    };
    assert!(FuturesClient::new(Credentials::new("k", "s").unwrap(), config).is_err());
  }

  #[tokio::test]
  async fn test_venue_error_body_is_decoded() {
    let body = r#"{"code":-2019,"msg":"Margin is insufficient."}"#;
    let (base, server) = serve_once(http_response("400 Bad Request", &[], body)).await;
    let c = client(&base);

    let result: Result<serde_json::Value> = c.get_public("/fapi/v1/ping", &[]).await;
    let msg = format!("{:#}", result.unwrap_err());

    assert!(msg.contains("venue error -2019"), "{msg}");
    assert!(msg.contains("Margin is insufficient."), "{msg}");
    server.await.unwrap();
  }

  #[tokio::test]
  async fn test_non_json_error_body_falls_back_to_status() {
    let (base, server) =
      serve_once(http_response("502 Bad Gateway", &[], "<html>bad gateway</html>")).await;
    let c = client(&base);

    let result: Result<serde_json::Value> = c.get_public("/fapi/v1/ping", &[]).await;
    let msg = format!("{:#}", result.unwrap_err());

    assert!(msg.contains("HTTP 502"), "{msg}");
    assert!(msg.contains("bad gateway"), "{msg}");
    server.await.unwrap();
  }

  #[tokio::test]
  async fn test_signed_request_appends_signature_last_and_sends_key() {
    let (base, server) = serve_once(http_response("200 OK", &[], "{}")).await;
    let c = client(&base);

    let _: serde_json::Value = c
      .post_signed("/fapi/v1/order", &[("symbol", "BTCUSDT".to_string())])
      .await
      .unwrap();
    let head = server.await.unwrap();

    assert!(head.starts_with("POST "), "{head}");
    let target = request_target(&head);
    let (path, query) = target.split_once('?').unwrap();
    assert_eq!(path, "/fapi/v1/order");

    let (signed, signature) = query.rsplit_once("&signature=").unwrap();
    assert!(signed.starts_with("symbol=BTCUSDT&recvWindow=5000&timestamp="));
    assert!(!signature.contains('&'));
    assert_eq!(signature, c.signer.sign(signed));

    let key_header = head
      .lines()
      .find_map(|line| {
        let (name, value) = line.split_once(':')?;
        name.eq_ignore_ascii_case(API_KEY_HEADER).then(|| value.trim().to_string())
      })
      .unwrap();
    assert_eq!(key_header, "key");
  }

  #[tokio::test]
  async fn test_used_weight_header_is_recorded() {
    let response = http_response("200 OK", &[("x-mbx-used-weight-1m", "17")], "{}");
    let (base, server) = serve_once(response).await;
    let c = client(&base);
    assert!(c.weight_usage().await.is_none());

    let _: serde_json::Value = c.get_public("/fapi/v1/ping", &[]).await.unwrap();
    server.await.unwrap();

    assert_eq!(c.weight_usage().await, Some(WeightUsage { used_1m: 17 }));
  }

  #[tokio::test]
  async fn test_unreachable_host_is_an_error() {
    // Port 9 (discard) on localhost is not expected to speak HTTP.
    let c = client("http://127.0.0.1:9");
    let result: Result<serde_json::Value> = c.get_public("/fapi/v1/ping", &[]).await;
    assert!(result.is_err());
    assert!(c.weight_usage().await.is_none());
  }
}
