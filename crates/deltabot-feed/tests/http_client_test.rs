//! Market data clients against a local HTTP server.

mod common;

use std::sync::Arc;

use common::MockHttpServer;
use deltabot_core::{FixedClock, ProductId, Resolution};
use deltabot_feed::{DeltaRestClient, FeedError, YahooChartClient};

const NOW: i64 = 1_700_000_000;
const USER_AGENT: &str = "deltabot-test/0.1";

fn candles_body() -> String {
    format!(
        r#"{{"success":true,"result":[
            {{"time":{},"close":"64010.5","volume":"12"}},
            {{"time":{},"close":64000.0,"volume":10}},
            {{"time":{},"close":64020.0}}
        ]}}"#,
        NOW - 60,
        NOW - 180,
        NOW - 120
    )
}

fn chart_body() -> String {
    format!(
        r#"{{"chart":{{"result":[{{
            "timestamp":[{},{},{}],
            "indicators":{{"quote":[{{"close":[1980.5,null,1981.25]}}]}}
        }}],"error":null}}}}"#,
        NOW - 120,
        NOW - 60,
        NOW
    )
}

fn exchange(market: &MockHttpServer, trading: &MockHttpServer) -> DeltaRestClient {
    DeltaRestClient::new(market.url(), trading.url(), USER_AGENT)
        .unwrap()
        .with_clock(Arc::new(FixedClock::from_secs(NOW)))
}

fn yahoo(server: &MockHttpServer) -> YahooChartClient {
    YahooChartClient::new(server.url(), USER_AGENT)
        .unwrap()
        .with_clock(Arc::new(FixedClock::from_secs(NOW)))
}

#[tokio::test]
async fn test_candles_query_covers_window_on_market_host() {
    let market = MockHttpServer::start(&candles_body()).await;
    let trading = MockHttpServer::start("{}").await;
    let client = exchange(&market, &trading);

    let bars = client
        .fetch_candles("BTCUSD", Resolution::OneMinute, 3)
        .await
        .unwrap();
    assert_eq!(bars.len(), 3);
    assert_eq!(bars[0].time.timestamp(), NOW - 180);
    assert_eq!(bars[2].close, 64010.5);
    assert_eq!(bars[2].volume, 12.0);

    let requests = market.requests().await;
    assert_eq!(requests.len(), 1);
    let req = &requests[0];
    assert_eq!(req.method, "GET");
    assert_eq!(
        req.path,
        format!(
            "/v2/history/candles?symbol=BTCUSD&resolution=1m&start={}&end={}",
            NOW - 180,
            NOW
        )
    );
    assert_eq!(req.headers.get("user-agent").map(String::as_str), Some(USER_AGENT));
    assert!(req.body.is_empty());
    assert!(trading.requests().await.is_empty());

    market.shutdown().await;
    trading.shutdown().await;
}

#[tokio::test]
async fn test_hourly_candles_start_scales_with_step() {
    let market = MockHttpServer::start(r#"{"result":[]}"#).await;
    let trading = MockHttpServer::start("{}").await;
    let client = exchange(&market, &trading);

    let bars = client
        .fetch_candles("BTCUSD", Resolution::OneHour, 200)
        .await
        .unwrap();
    assert!(bars.is_empty());

    let path = &market.requests().await[0].path;
    assert!(path.contains("resolution=1h"));
    assert!(path.ends_with(&format!("start={}&end={}", NOW - 200 * 3600, NOW)));

    market.shutdown().await;
    trading.shutdown().await;
}

#[tokio::test]
async fn test_ticker_and_product_go_to_trading_host() {
    let market = MockHttpServer::start("{}").await;
    let trading =
        MockHttpServer::start(r#"{"result":{"id":27,"mark_price":"64000.5","close":63990}}"#).await;
    let client = exchange(&market, &trading);

    assert_eq!(client.fetch_ticker("BTCUSD").await.unwrap(), 64000.5);
    assert_eq!(client.fetch_product_id("BTCUSD").await.unwrap(), ProductId(27));

    let paths: Vec<String> = trading.requests().await.into_iter().map(|r| r.path).collect();
    assert_eq!(paths, vec!["/v2/tickers/BTCUSD", "/v2/products/BTCUSD"]);
    assert!(trading
        .requests()
        .await
        .iter()
        .all(|r| r.headers.get("user-agent").map(String::as_str) == Some(USER_AGENT)));
    assert!(market.requests().await.is_empty());

    market.shutdown().await;
    trading.shutdown().await;
}

#[tokio::test]
async fn test_non_success_status_is_http_client_error() {
    let market = MockHttpServer::start("{}").await;
    let trading = MockHttpServer::start("{}").await;
    market.respond_with(503, r#"{"error":"maintenance"}"#).await;
    trading.respond_with(404, r#"{"error":"not_found"}"#).await;
    let client = exchange(&market, &trading);

    let err = client
        .fetch_candles("BTCUSD", Resolution::OneMinute, 10)
        .await
        .unwrap_err();
    assert!(matches!(err, FeedError::HttpClient(_)), "got {err:?}");
    assert!(err.is_retryable());

    let err = client.fetch_ticker("BTCUSD").await.unwrap_err();
    assert!(matches!(err, FeedError::HttpClient(_)), "got {err:?}");

    let err = client.fetch_product_id("NOPE").await.unwrap_err();
    assert!(matches!(err, FeedError::HttpClient(_)), "got {err:?}");

    market.shutdown().await;
    trading.shutdown().await;
}

#[tokio::test]
async fn test_ticker_without_result_is_invalid() {
    let market = MockHttpServer::start("{}").await;
    let trading = MockHttpServer::start(r#"{"success":false}"#).await;
    let client = exchange(&market, &trading);

    let err = client.fetch_ticker("BTCUSD").await.unwrap_err();
    assert!(matches!(err, FeedError::InvalidTicker(_)), "got {err:?}");

    trading.respond_with(200, r#"{"result":{"mark_price":"0","close":"0"}}"#).await;
    let err = client.fetch_ticker("BTCUSD").await.unwrap_err();
    assert!(matches!(err, FeedError::InvalidTicker(_)), "got {err:?}");

    market.shutdown().await;
    trading.shutdown().await;
}

#[tokio::test]
async fn test_yahoo_minute_bars_use_relative_range() {
    let server = MockHttpServer::start(&chart_body()).await;
    let client = yahoo(&server);

    let bars = client
        .fetch_chart("GC=F", Resolution::OneMinute, 200)
        .await
        .unwrap();
    assert_eq!(bars.len(), 2);
    assert_eq!(bars[1].close, 1981.25);
    assert_eq!(bars[1].time.timestamp(), NOW);

    let requests = server.requests().await;
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].path, "/v8/finance/chart/GC=F?interval=1m&range=5d");
    assert_eq!(
        requests[0].headers.get("user-agent").map(String::as_str),
        Some(USER_AGENT)
    );

    server.shutdown().await;
}

#[tokio::test]
async fn test_yahoo_hourly_and_daily_use_absolute_period() {
    let server = MockHttpServer::start(&chart_body()).await;
    let client = yahoo(&server);

    client
        .fetch_chart("DX=F", Resolution::OneHour, 10)
        .await
        .unwrap();
    client
        .fetch_chart("DX=F", Resolution::OneDay, 10)
        .await
        .unwrap();

    let paths: Vec<String> = server.requests().await.into_iter().map(|r| r.path).collect();
    assert_eq!(
        paths,
        vec![
            format!(
                "/v8/finance/chart/DX=F?interval=60m&period1={}&period2={}",
                NOW - 15 * 3600,
                NOW
            ),
            format!(
                "/v8/finance/chart/DX=F?interval=1d&period1={}&period2={}",
                NOW - 12 * 86_400,
                NOW
            ),
        ]
    );
    assert!(paths.iter().all(|p| !p.contains("range=")));

    server.shutdown().await;
}

#[tokio::test]
async fn test_yahoo_error_statuses() {
    let server = MockHttpServer::start("{}").await;
    let client = yahoo(&server);

    server.respond_with(429, "Too Many Requests").await;
    let err = client
        .fetch_chart("GC=F", Resolution::OneMinute, 10)
        .await
        .unwrap_err();
    assert!(matches!(err, FeedError::HttpClient(_)), "got {err:?}");

    server
        .respond_with(
            404,
            r#"{"chart":{"result":null,"error":{"code":"Not Found","description":"No data found"}}}"#,
        )
        .await;
    let err = client
        .fetch_chart("XX=F", Resolution::OneMinute, 10)
        .await
        .unwrap_err();
    assert!(matches!(err, FeedError::DataUnavailable(_)), "got {err:?}");

    server.shutdown().await;
}
