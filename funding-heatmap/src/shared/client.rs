//! REST client for the funding endpoint

use async_trait::async_trait;
use reqwest::Client;
use tracing::debug;
use url::Url;

use super::{
    catalog::Snapshot,
    config::HeatmapConfig,
    error::FetchError,
    scheduler::AssetSource,
    types::DataResponse,
};

/// Polls `GET {base}/api/hyperliquid/data`
#[derive(Debug, Clone)]
pub struct HttpAssetSource {
    client: Client,
    url: Url,
}

impl HttpAssetSource {
    pub fn new(config: &HeatmapConfig) -> Result<Self, FetchError> {
        let client = Client::builder().timeout(config.request_timeout).build()?;
        Ok(Self {
            client,
            url: config.data_url(),
        })
    }

    pub fn url(&self) -> &Url {
        &self.url
    }
}

#[async_trait]
impl AssetSource for HttpAssetSource {
    async fn fetch(&self) -> Result<Snapshot, FetchError> {
        let response = self
            .client
            .get(self.url.clone())
            .send()
            .await
            .map_err(|e| FetchError::Transport(format!("HTTP request failed: {e}")))?;

        if !response.status().is_success() {
            return Err(FetchError::Transport(format!("HTTP error: {}", response.status())));
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| FetchError::Transport(format!("HTTP body read failed: {e}")))?;

        debug!(bytes = body.len(), url = %self.url, "Received funding response");
        parse_response(&body)
    }
}

/// Decode a response body into a snapshot
///
/// The envelope must be well-formed; individual asset records that fail
/// validation are dropped.
pub fn parse_response(body: &[u8]) -> Result<Snapshot, FetchError> {
    let response: DataResponse = serde_json::from_slice(body)?;

    if !response.success {
        return Err(FetchError::Application(response.error));
    }

    let assets = response
        .assets
        .ok_or_else(|| FetchError::Malformed("success response without assets".to_string()))?;

    Ok(Snapshot::from_values(assets))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_success_response() {
        let body = br#"{
            "success": true,
            "assets": [
                {"name": "BTC", "funding_rate": 0.0000125, "annualized_return": 10.95,
                 "mark_price": 67012.5, "liquidity_usd": 1500000000.0,
                 "day_volume": 3200000000.0, "premium": 0.0001},
                {"name": "kPEPE", "funding_rate": -0.0001, "annualized_return": -87.6,
                 "mark_price": 0.0123, "liquidity_usd": 45000000.0,
                 "day_volume": 12000000.0, "premium": -0.0004},
                {"name": "ETH", "funding_rate": 0.00003, "annualized_return": 26.28,
                 "mark_price": 3120.0, "liquidity_usd": 800000000.0,
                 "day_volume": 1100000000.0, "premium": 0.0002}
            ]
        }"#;

        let snapshot = parse_response(body).unwrap();
        let names: Vec<_> = snapshot.assets().iter().map(|a| a.name.as_str()).collect();
        assert_eq!(names, vec!["kPEPE", "ETH", "BTC"]);
        assert_eq!(snapshot.dropped(), 0);
    }

    #[test]
    fn test_parse_application_error() {
        let result = parse_response(br#"{"success": false, "error": "rate limited"}"#);
        assert_eq!(result, Err(FetchError::Application(Some("rate limited".to_string()))));

        let result = parse_response(br#"{"success": false}"#);
        assert_eq!(result, Err(FetchError::Application(None)));
    }

    #[test]
    fn test_parse_malformed_responses() {
        struct TestCase {
            input: &'static [u8],
            name: &'static str,
        }

        let tests = vec![
            TestCase { input: b"<html>502 Bad Gateway</html>", name: "html body" },
            TestCase { input: br#"{"assets": []}"#, name: "missing success" },
            TestCase { input: br#"{"success": "yes"}"#, name: "success not bool" },
            TestCase { input: br#"{"success": true}"#, name: "missing assets" },
            TestCase { input: br#"{"success": true, "assets": {}}"#, name: "assets not array" },
        ];

        for test in tests {
            assert!(
                matches!(parse_response(test.input), Err(FetchError::Malformed(_))),
                "{} should be malformed",
                test.name
            );
        }
    }

    #[test]
    fn test_http_source_targets_data_path() {
        let config = HeatmapConfig::new("http://localhost:8001").unwrap();
        let source = HttpAssetSource::new(&config).unwrap();
        assert_eq!(source.url().as_str(), "http://localhost:8001/api/hyperliquid/data");
    }
}
