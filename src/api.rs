use std::future::Future;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::de::DeserializeOwned;
use tracing::debug;
use url::Url;

use crate::types::{ActivityRecord, LeaderboardEntry, Position, ViewFilters};

/// Page size for every list endpoint. There is no pagination beyond this.
pub const LIST_LIMIT: usize = 50;

/// Positions smaller than this many units are not shown.
pub const MIN_POSITION_SIZE: Decimal = dec!(0.01);

/// Failure of a single read request.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ApiError {
    /// Transport error, non-success status, or a body that could not be decoded.
    #[error("request to {url} failed: {reason}")]
    RequestFailed { url: String, reason: String },
}

impl ApiError {
    fn request_failed(url: &Url, reason: impl ToString) -> Self {
        Self::RequestFailed {
            url: url.to_string(),
            reason: reason.to_string(),
        }
    }
}

/// Read-only source of leaderboard and per-wallet data.
pub trait DataSource: Send + Sync + 'static {
    fn fetch_leaderboard(
        &self,
        filters: ViewFilters,
    ) -> impl Future<Output = Result<Vec<LeaderboardEntry>, ApiError>> + Send;

    fn fetch_positions(
        &self,
        wallet: &str,
    ) -> impl Future<Output = Result<Vec<Position>, ApiError>> + Send;

    fn fetch_activity(
        &self,
        wallet: &str,
    ) -> impl Future<Output = Result<Vec<ActivityRecord>, ApiError>> + Send;
}

/// HTTP client for the public Polymarket data API (no auth required).
#[derive(Debug, Clone)]
pub struct DataApiClient {
    http: reqwest::Client,
    base: Url,
}

impl DataApiClient {
    /// Build a client for `base_url`. `timeout` of `None` keeps the transport default.
    pub fn new(base_url: &str, timeout: Option<Duration>) -> Result<Self> {
        let base = Url::parse(base_url).with_context(|| format!("invalid base URL {base_url}"))?;
        if base.cannot_be_a_base() {
            anyhow::bail!("base URL {base_url} cannot carry a path");
        }
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let http = builder.build().context("failed to build HTTP client")?;
        Ok(Self { http, base })
    }

    fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.base.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    pub fn leaderboard_url(&self, filters: &ViewFilters) -> Url {
        let mut url = self.endpoint(&["v1", "leaderboard"]);
        url.query_pairs_mut()
            .append_pair("category", filters.category.as_str())
            .append_pair("timePeriod", filters.time_period.as_str())
            .append_pair("orderBy", filters.order_by.as_str())
            .append_pair("limit", &LIST_LIMIT.to_string());
        url
    }

    pub fn positions_url(&self, wallet: &str) -> Url {
        let mut url = self.endpoint(&["positions"]);
        url.query_pairs_mut()
            .append_pair("user", wallet)
            .append_pair("limit", &LIST_LIMIT.to_string())
            .append_pair("sortBy", "VALUE")
            .append_pair("sizeThreshold", &MIN_POSITION_SIZE.to_string());
        url
    }

    pub fn activity_url(&self, wallet: &str) -> Url {
        let mut url = self.endpoint(&["activity"]);
        url.query_pairs_mut()
            .append_pair("user", wallet)
            .append_pair("limit", &LIST_LIMIT.to_string());
        url
    }

    /// One round trip; a `null` body is treated as an empty list.
    async fn get_list<T: DeserializeOwned>(&self, url: Url) -> Result<Vec<T>, ApiError> {
        let start = Instant::now();
        let resp = self
            .http
            .get(url.clone())
            .send()
            .await
            .map_err(|e| ApiError::request_failed(&url, e))?;
        let status = resp.status();
        if !status.is_success() {
            return Err(ApiError::request_failed(&url, format!("HTTP {status}")));
        }
        let items: Option<Vec<T>> = resp
            .json()
            .await
            .map_err(|e| ApiError::request_failed(&url, e))?;
        let items = items.unwrap_or_default();
        debug!(
            "GET {} -> {} item(s) in {:?}",
            url.path(),
            items.len(),
            start.elapsed()
        );
        Ok(items)
    }
}

impl DataSource for DataApiClient {
    async fn fetch_leaderboard(
        &self,
        filters: ViewFilters,
    ) -> Result<Vec<LeaderboardEntry>, ApiError> {
        let mut entries = self.get_list(self.leaderboard_url(&filters)).await?;
        entries.truncate(LIST_LIMIT);
        Ok(entries)
    }

    async fn fetch_positions(&self, wallet: &str) -> Result<Vec<Position>, ApiError> {
        let positions = self.get_list(self.positions_url(wallet)).await?;
        Ok(shape_positions(positions))
    }

    async fn fetch_activity(&self, wallet: &str) -> Result<Vec<ActivityRecord>, ApiError> {
        let mut records = self.get_list(self.activity_url(wallet)).await?;
        records.truncate(LIST_LIMIT);
        Ok(records)
    }
}

/// Drop dust positions, order by current value (largest first), cap the page.
///
/// The server is asked for the same shape; this keeps the contract when it
/// ignores a parameter.
pub fn shape_positions(mut positions: Vec<Position>) -> Vec<Position> {
    positions.retain(|p| p.size() >= MIN_POSITION_SIZE);
    positions.sort_by(|a, b| b.current_value().cmp(&a.current_value()));
    positions.truncate(LIST_LIMIT);
    positions
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Category, OrderBy, TimePeriod};
    use serde_json::json;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    fn client(base: &str) -> DataApiClient {
        DataApiClient::new(base, None).unwrap()
    }

    fn position(size: f64, cur_price: f64) -> Position {
        serde_json::from_value(json!({
            "title": format!("market {size}@{cur_price}"),
            "outcome": "Yes",
            "size": size,
            "curPrice": cur_price,
            "avgPrice": 0.5
        }))
        .unwrap()
    }

    /// Serve exactly one canned HTTP response on a local port.
    async fn serve_once(status_line: &'static str, body: &'static str) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let (mut sock, _) = listener.accept().await.unwrap();
            let mut buf = vec![0u8; 4096];
            let mut read = 0;
            while !buf[..read].windows(4).any(|w| w == b"\r\n\r\n") {
                let n = sock.read(&mut buf[read..]).await.unwrap();
                if n == 0 {
                    break;
                }
                read += n;
            }
            let resp = format!(
                "HTTP/1.1 {status_line}\r\ncontent-type: application/json\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{body}",
                body.len()
            );
            sock.write_all(resp.as_bytes()).await.unwrap();
            sock.shutdown().await.ok();
        });
        format!("http://{addr}")
    }

    #[test]
    fn leaderboard_url_carries_all_filters() {
        let c = client("https://data-api.polymarket.com");
        let filters = ViewFilters {
            category: Category::Politics,
            time_period: TimePeriod::Week,
            order_by: OrderBy::Vol,
        };
        assert_eq!(
            c.leaderboard_url(&filters).as_str(),
            "https://data-api.polymarket.com/v1/leaderboard?category=POLITICS&timePeriod=WEEK&orderBy=VOL&limit=50"
        );
    }

    #[test]
    fn positions_and_activity_urls() {
        let c = client("https://data-api.polymarket.com/");
        assert_eq!(
            c.positions_url("0xabc").as_str(),
            "https://data-api.polymarket.com/positions?user=0xabc&limit=50&sortBy=VALUE&sizeThreshold=0.01"
        );
        assert_eq!(
            c.activity_url("0xabc").as_str(),
            "https://data-api.polymarket.com/activity?user=0xabc&limit=50"
        );
    }

    #[test]
    fn rejects_unusable_base_url() {
        assert!(DataApiClient::new("not a url", None).is_err());
        assert!(DataApiClient::new("mailto:someone@example.com", None).is_err());
    }

    #[test]
    fn shape_positions_filters_sorts_and_caps() {
        let mut raw = vec![position(0.001, 0.9), position(10.0, 0.1), position(5.0, 0.8)];
        raw.extend((0..60).map(|i| position(1.0 + i as f64, 0.01)));
        let shaped = shape_positions(raw);

        assert_eq!(shaped.len(), LIST_LIMIT);
        assert!(shaped.iter().all(|p| p.size() >= MIN_POSITION_SIZE));
        assert_eq!(shaped[0].size(), dec!(5));
        assert!(shaped
            .windows(2)
            .all(|w| w[0].current_value() >= w[1].current_value()));
    }

    #[tokio::test]
    async fn non_success_status_is_request_failed() {
        let base = serve_once("500 Internal Server Error", "").await;
        let err = client(&base)
            .fetch_activity("0xabc")
            .await
            .unwrap_err();
        let ApiError::RequestFailed { url, reason } = err;
        assert!(url.ends_with("/activity?user=0xabc&limit=50"));
        assert!(reason.contains("500"));
    }

    #[tokio::test]
    async fn successful_body_is_parsed() {
        let base = serve_once(
            "200 OK",
            r#"[{"rank":1,"proxyWallet":"0x1","userName":"a","pnl":10,"vol":20}]"#,
        )
        .await;
        let entries = client(&base)
            .fetch_leaderboard(ViewFilters::default())
            .await
            .unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].proxy_wallet, "0x1");
    }

    #[tokio::test]
    async fn null_body_is_empty_list() {
        let base = serve_once("200 OK", "null").await;
        let positions = client(&base).fetch_positions("0x1").await.unwrap();
        assert!(positions.is_empty());
    }

    #[tokio::test]
    async fn connection_refused_is_request_failed() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);
        let result = client(&format!("http://{addr}"))
            .fetch_leaderboard(ViewFilters::default())
            .await;
        assert!(matches!(result, Err(ApiError::RequestFailed { .. })));
    }
}
