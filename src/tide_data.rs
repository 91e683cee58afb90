//! # Tide Height Fetching
//!
//! This module handles the network side of the application: fetching tide
//! height predictions for one location from a WorldTides-compatible HTTP API
//! and turning them into an ordered [`Sample`] series.
//!
//! ## Request
//! `GET {base_url}/heights?lat=..&lon=..&start=..&end=..&apikey=..`, where
//! `start` and `end` are Unix seconds for `now - 24h` and `now + 24h`.
//!
//! ## Response
//! ```json
//! { "status": 200, "heights": [ { "dt": 1700000000, "height": 1.23 }, ... ] }
//! ```
//! A non-success HTTP status or an `error` field in the body is reported as
//! [`TideError::Api`].
//!
//! ## High/Low Classification
//! Each height is tagged [`TideKind::High`] when strictly above the mean of
//! the whole batch, otherwise [`TideKind::Low`]. This is a batch-relative
//! threshold, not turning-point detection.
//!
//! Nothing is cached: every call performs one request.

use crate::location::Location;
use crate::{check_series, ChartError, Sample, TideKind};
use chrono::{DateTime, Duration, Utc};
use serde::Deserialize;
use thiserror::Error;

/// Hours on each side of "now" covered by a fetch.
pub const WINDOW_HOURS: i64 = 24;

/// Errors that can occur while fetching and decoding tide heights.
#[derive(Error, Debug)]
pub enum TideError {
    /// HTTP request failed (network, server, or protocol error)
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The API answered with an error status or message
    #[error("tide API error: {0}")]
    Api(String),

    /// The response body was not the expected JSON
    #[error("invalid response: {0}")]
    Decode(#[from] serde_json::Error),

    /// The returned heights are not in strictly increasing time order
    #[error(transparent)]
    Series(#[from] ChartError),

    /// `now` is too close to the representable time limits
    #[error("invalid date range")]
    InvalidDateRange,
}

/// Raw API response.
#[derive(Debug, Deserialize)]
pub struct TideResponse {
    #[serde(default)]
    pub status: Option<u16>,
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub heights: Vec<Height>,
}

/// One predicted height.
#[derive(Clone, Copy, Debug, Deserialize)]
pub struct Height {
    /// Unix seconds
    pub dt: i64,
    /// Meters
    pub height: f64,
}

/// Client for the tide-height API.
#[derive(Clone, Debug)]
pub struct WorldTidesClient {
    base_url: String,
    api_key: String,
    http: reqwest::Client,
}

impl WorldTidesClient {
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
            http: reqwest::Client::new(),
        }
    }

    /// Fetch heights for `[now - 24h, now + 24h]` at `location`.
    ///
    /// # Example
    /// ```no_run
    /// use tide_chart_lib::{location::Location, tide_data::WorldTidesClient};
    ///
    /// # async fn run() -> Result<(), Box<dyn std::error::Error>> {
    /// let client = WorldTidesClient::new("https://www.worldtides.info/api/v3", "key");
    /// let location = Location::new("Lisbon", 38.72, -9.14)?;
    /// let samples = client.fetch_samples(&location, chrono::Utc::now()).await?;
    /// println!("{} samples", samples.len());
    /// # Ok(())
    /// # }
    /// ```
    pub async fn fetch_samples(
        &self,
        location: &Location,
        now: DateTime<Utc>,
    ) -> Result<Vec<Sample>, TideError> {
        let (start, end) = window(now)?;
        let url = format!("{}/heights", self.base_url);
        tracing::info!(
            location = %location.name,
            lat = location.latitude,
            lon = location.longitude,
            "fetching tide heights"
        );

        let response = self
            .http
            .get(&url)
            .query(&query_params(location, start, end, &self.api_key))
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            // Prefer the API's own message when the body carries one
            let message = serde_json::from_str::<TideResponse>(&body)
                .ok()
                .and_then(|r| r.error)
                .unwrap_or_else(|| format!("HTTP status {}", status));
            return Err(TideError::Api(message));
        }

        let samples = parse_response(&body)?;
        tracing::debug!(count = samples.len(), "decoded tide heights");
        Ok(samples)
    }
}

/// Unix-second bounds of the fetch window around `now`.
pub fn window(now: DateTime<Utc>) -> Result<(i64, i64), TideError> {
    let span = Duration::hours(WINDOW_HOURS);
    let start = now.checked_sub_signed(span).ok_or(TideError::InvalidDateRange)?;
    let end = now.checked_add_signed(span).ok_or(TideError::InvalidDateRange)?;
    Ok((start.timestamp(), end.timestamp()))
}

fn query_params(
    location: &Location,
    start: i64,
    end: i64,
    api_key: &str,
) -> Vec<(&'static str, String)> {
    vec![
        ("lat", location.latitude.to_string()),
        ("lon", location.longitude.to_string()),
        ("start", start.to_string()),
        ("end", end.to_string()),
        ("apikey", api_key.to_string()),
    ]
}

/// Decode a response body into a classified sample series.
pub fn parse_response(body: &str) -> Result<Vec<Sample>, TideError> {
    let response: TideResponse = serde_json::from_str(body)?;
    if let Some(error) = response.error {
        return Err(TideError::Api(error));
    }
    if let Some(status) = response.status.filter(|s| !(200..300).contains(s)) {
        return Err(TideError::Api(format!("API status {}", status)));
    }
    samples_from_heights(&response.heights)
}

/// Convert raw heights into samples tagged against the batch mean.
pub fn samples_from_heights(heights: &[Height]) -> Result<Vec<Sample>, TideError> {
    let kinds = classify_by_mean(heights.iter().map(|h| h.height));
    let samples = heights
        .iter()
        .zip(kinds)
        .map(|(h, kind)| -> Result<Sample, TideError> {
            let timestamp = DateTime::from_timestamp(h.dt, 0).ok_or(TideError::InvalidDateRange)?;
            Ok(Sample {
                timestamp,
                height: h.height,
                kind,
            })
        })
        .collect::<Result<Vec<_>, _>>()?;

    check_series(&samples)?;
    Ok(samples)
}

/// Tag each height `High` if strictly above the batch mean, else `Low`.
pub fn classify_by_mean<I>(heights: I) -> Vec<TideKind>
where
    I: IntoIterator<Item = f64>,
    I::IntoIter: Clone,
{
    let heights = heights.into_iter();
    let (sum, count) = heights.clone().fold((0.0, 0usize), |(s, n), h| (s + h, n + 1));
    if count == 0 {
        return Vec::new();
    }
    let mean = sum / count as f64;
    heights
        .map(|h| if h > mean { TideKind::High } else { TideKind::Low })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    #[test]
    fn test_classify_by_mean() {
        let kinds = classify_by_mean(vec![0.5, 1.5, 1.0, 2.0]);
        // Mean is 1.25
        assert_eq!(
            kinds,
            vec![TideKind::Low, TideKind::High, TideKind::Low, TideKind::High]
        );
        assert!(classify_by_mean(Vec::<f64>::new()).is_empty());
        // Equal to the mean is not above it
        assert_eq!(classify_by_mean(vec![1.0, 1.0]), vec![TideKind::Low; 2]);
    }

    #[test]
    fn test_window_spans_48_hours() {
        let now = Utc.timestamp_opt(1_700_000_000, 0).unwrap();
        let (start, end) = window(now).unwrap();
        assert_eq!(start, 1_700_000_000 - 86_400);
        assert_eq!(end, 1_700_000_000 + 86_400);
    }

    #[test]
    fn test_parse_response() {
        let body = r#"{
            "status": 200,
            "callCount": 1,
            "heights": [
                { "dt": 1700000000, "date": "2023-11-14T22:13+0000", "height": 0.4 },
                { "dt": 1700001800, "date": "2023-11-14T22:43+0000", "height": 1.6 },
                { "dt": 1700003600, "date": "2023-11-14T23:13+0000", "height": 1.0 }
            ]
        }"#;
        let samples = parse_response(body).unwrap();
        assert_eq!(samples.len(), 3);
        assert_eq!(samples[0].timestamp.timestamp(), 1_700_000_000);
        assert_eq!(samples[1].height, 1.6);
        assert_eq!(samples[0].kind, TideKind::Low);
        assert_eq!(samples[1].kind, TideKind::High);
        assert_eq!(samples[2].kind, TideKind::Low);
    }

    #[test]
    fn test_parse_empty_heights() {
        let samples = parse_response(r#"{ "status": 200, "heights": [] }"#).unwrap();
        assert!(samples.is_empty());
    }

    #[test]
    fn test_parse_api_error() {
        let err = parse_response(r#"{ "status": 400, "error": "Invalid api key" }"#).unwrap_err();
        assert!(matches!(err, TideError::Api(ref m) if m == "Invalid api key"));

        let err = parse_response(r#"{ "status": 503 }"#).unwrap_err();
        assert!(matches!(err, TideError::Api(_)));
    }

    #[test]
    fn test_parse_rejects_unordered_heights() {
        let body = r#"{ "heights": [ { "dt": 100, "height": 1.0 }, { "dt": 50, "height": 1.1 } ] }"#;
        let err = parse_response(body).unwrap_err();
        assert!(matches!(
            err,
            TideError::Series(ChartError::MalformedSeries { index: 1 })
        ));
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!(matches!(
            parse_response("<html>oops</html>"),
            Err(TideError::Decode(_))
        ));
    }

    /// Serve exactly one canned HTTP response and hand back the request line.
    async fn one_shot_server(
        status_line: &'static str,
        body: &'static str,
    ) -> (String, tokio::task::JoinHandle<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let handle = tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut buf = vec![0u8; 8192];
            let n = socket.read(&mut buf).await.unwrap();
            let request = String::from_utf8_lossy(&buf[..n]).to_string();
            let response = format!(
                "{}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                status_line,
                body.len(),
                body
            );
            socket.write_all(response.as_bytes()).await.unwrap();
            socket.shutdown().await.ok();
            request.lines().next().unwrap_or_default().to_string()
        });
        (format!("http://{}", addr), handle)
    }

    #[tokio::test]
    async fn test_fetch_samples_from_server() {
        let (base, server) = one_shot_server(
            "HTTP/1.1 200 OK",
            r#"{"status":200,"heights":[{"dt":1699913600,"height":0.2},{"dt":1700000000,"height":1.8}]}"#,
        )
        .await;

        let client = WorldTidesClient::new(format!("{}/", base), "secret");
        let location = Location::new("Test Harbor", 38.5, -9.25).unwrap();
        let now = Utc.timestamp_opt(1_700_000_000, 0).unwrap();
        let samples = client.fetch_samples(&location, now).await.unwrap();

        assert_eq!(samples.len(), 2);
        assert_eq!(samples[1].kind, TideKind::High);

        let request_line = server.await.unwrap();
        assert!(request_line.starts_with("GET /heights?"), "{request_line}");
        assert!(request_line.contains("lat=38.5"));
        assert!(request_line.contains("lon=-9.25"));
        assert!(request_line.contains("start=1699913600"));
        assert!(request_line.contains("end=1700086400"));
        assert!(request_line.contains("apikey=secret"));
    }

    #[tokio::test]
    async fn test_fetch_reports_http_failure() {
        let (base, server) =
            one_shot_server("HTTP/1.1 401 Unauthorized", r#"{"status":401,"error":"Bad key"}"#).await;

        let client = WorldTidesClient::new(base, "wrong");
        let location = Location::new("Test Harbor", 0.0, 0.0).unwrap();
        let err = client
            .fetch_samples(&location, Utc.timestamp_opt(1_700_000_000, 0).unwrap())
            .await
            .unwrap_err();

        assert!(matches!(err, TideError::Api(ref m) if m == "Bad key"));
        server.await.unwrap();
    }
}
