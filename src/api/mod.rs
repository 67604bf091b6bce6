//! HTTP stock API client
//!
//! A single configured client supplies stock lines and their trend records
//! from the distributor's back office. It is built once from [`ApiSettings`]
//! and passed to whatever needs it.

use std::time::Duration;

use futures::future::join_all;
use serde::de::DeserializeOwned;
use thiserror::Error;

use crate::config::ApiSettings;
use crate::models::{StockItem, StockTrendRecord};
use crate::trends::{normalize_records, TimeWindow, TrendError};

/// API errors
#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Stock API base URL is not configured")]
    NotConfigured,

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Unexpected status {status} from {url}")]
    Status { status: u16, url: String },

    #[error(transparent)]
    Trend(#[from] TrendError),
}

/// Client for the stock API
#[derive(Debug, Clone)]
pub struct ApiClient {
    client: reqwest::Client,
    base_url: String,
    token: Option<String>,
}

impl ApiClient {
    /// Build a client from settings
    pub fn new(settings: &ApiSettings) -> Result<Self, ApiError> {
        let base_url = settings
            .base_url
            .as_deref()
            .map(|url| url.trim_end_matches('/').to_string())
            .filter(|url| !url.is_empty())
            .ok_or(ApiError::NotConfigured)?;

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(settings.timeout_secs))
            .build()?;

        Ok(Self {
            client,
            base_url,
            token: settings.token.clone(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// URL listing all stock lines
    pub fn stocks_url(&self) -> String {
        format!("{}/stocks", self.base_url)
    }

    /// URL of one stock line's trend records over a window
    pub fn trends_url(&self, stock_id: i64, window: TimeWindow) -> String {
        format!(
            "{}/stocks/{}/trends?period={}",
            self.base_url,
            stock_id,
            urlencoding::encode(window.as_str())
        )
    }

    async fn get_json<T: DeserializeOwned>(&self, url: String) -> Result<T, ApiError> {
        tracing::debug!("GET {}", url);

        let mut request = self.client.get(&url);
        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }

        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(ApiError::Status {
                status: status.as_u16(),
                url,
            });
        }

        Ok(response.json::<T>().await?)
    }

    /// Fetch all stock lines
    pub async fn fetch_stock_items(&self) -> Result<Vec<StockItem>, ApiError> {
        self.get_json(self.stocks_url()).await
    }

    /// Fetch one stock line's trend records, validated and sorted
    pub async fn fetch_stock_trends(
        &self,
        stock_id: i64,
        window: TimeWindow,
    ) -> Result<Vec<StockTrendRecord>, ApiError> {
        let records: Vec<StockTrendRecord> = self.get_json(self.trends_url(stock_id, window)).await?;
        Ok(normalize_records(records)?)
    }

    /// Fetch trend records for several stock lines concurrently
    ///
    /// Results keep the order of `stock_ids`; one failure does not abort
    /// the others.
    pub async fn fetch_trends_for(
        &self,
        stock_ids: &[i64],
        window: TimeWindow,
    ) -> Vec<(i64, Result<Vec<StockTrendRecord>, ApiError>)> {
        let fetches = stock_ids.iter().map(|&id| async move {
            (id, self.fetch_stock_trends(id, window).await)
        });
        join_all(fetches).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    fn settings(base_url: &str) -> ApiSettings {
        ApiSettings {
            base_url: Some(base_url.to_string()),
            token: Some("test-token".to_string()),
            timeout_secs: 5,
        }
    }

    /// Serve one canned response per connection; returns the base URL and
    /// a handle yielding the raw requests received
    async fn serve(
        responses: Vec<(u16, &'static str)>,
    ) -> (String, tokio::task::JoinHandle<Vec<String>>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        let handle = tokio::spawn(async move {
            let mut requests = Vec::new();
            for (status, body) in responses {
                let (mut socket, _) = listener.accept().await.unwrap();
                let mut buf = vec![0u8; 8192];
                let n = socket.read(&mut buf).await.unwrap();
                requests.push(String::from_utf8_lossy(&buf[..n]).to_string());

                let reply = format!(
                    "HTTP/1.1 {} X\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                    status,
                    body.len(),
                    body
                );
                socket.write_all(reply.as_bytes()).await.unwrap();
                socket.shutdown().await.ok();
            }
            requests
        });

        (format!("http://{}/api", addr), handle)
    }

    #[test]
    fn test_new_requires_base_url() {
        assert!(matches!(
            ApiClient::new(&ApiSettings::default()),
            Err(ApiError::NotConfigured)
        ));
        assert!(matches!(
            ApiClient::new(&settings("  ".trim())),
            Err(ApiError::NotConfigured)
        ));
    }

    #[test]
    fn test_urls() {
        let client = ApiClient::new(&settings("https://erp.example.com/api/")).unwrap();
        assert_eq!(client.base_url(), "https://erp.example.com/api");
        assert_eq!(client.stocks_url(), "https://erp.example.com/api/stocks");
        assert_eq!(
            client.trends_url(42, TimeWindow::Last7Days),
            "https://erp.example.com/api/stocks/42/trends?period=7d"
        );
    }

    #[tokio::test]
    async fn test_fetch_stock_trends_sends_token_and_sorts() {
        let body = r#"[
            {"date": "2026-03-02T00:00:00Z", "quantity": 8, "min_quantity": 2, "alert_threshold": 5},
            {"date": "2026-03-01T00:00:00Z", "quantity": 10, "min_quantity": 2, "alert_threshold": 5}
        ]"#;
        let (base, server) = serve(vec![(200, body)]).await;

        let client = ApiClient::new(&settings(&base)).unwrap();
        let records = client.fetch_stock_trends(7, TimeWindow::Last30Days).await.unwrap();

        assert_eq!(records.len(), 2);
        assert_eq!(records[0].quantity, 10);

        let requests = server.await.unwrap();
        assert!(requests[0].starts_with("GET /api/stocks/7/trends?period=30d"));
        assert!(requests[0].to_lowercase().contains("authorization: bearer test-token"));
    }

    #[tokio::test]
    async fn test_fetch_status_error() {
        let (base, server) = serve(vec![(503, "{}")]).await;

        let client = ApiClient::new(&settings(&base)).unwrap();
        let err = client.fetch_stock_items().await.unwrap_err();
        assert!(matches!(err, ApiError::Status { status: 503, .. }));

        server.await.unwrap();
    }

    #[tokio::test]
    async fn test_fetch_stock_items() {
        let body = r#"[{"id": 1, "reference": "OIL-5W30", "part_name": "Engine oil", "quantity": 0}]"#;
        let (base, server) = serve(vec![(200, body)]).await;

        let client = ApiClient::new(&settings(&base)).unwrap();
        let items = client.fetch_stock_items().await.unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].reference, "OIL-5W30");

        server.await.unwrap();
    }
}
