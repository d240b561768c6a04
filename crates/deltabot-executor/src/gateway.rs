//! Order gateway.
//!
//! `OrderGateway` is the seam between the position state machine and the
//! exchange. `place_order` never fails: any error means "no confirmed fill"
//! and yields `None`.

use std::pin::Pin;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use deltabot_core::{OrderResult, OrderSide, ProductId};
use deltabot_telemetry::Metrics;
use parking_lot::Mutex;
use reqwest::header::CONTENT_TYPE;
use reqwest::{Client, StatusCode};
use tracing::{error, info, warn};

use crate::error::{ExecutorError, ExecutorResult};
use crate::order::{interpret_response, OrderRequest};
use crate::signer::RequestSigner;

/// Boxed future for dyn-compatible async trait methods.
pub type BoxFuture<'a, T> = Pin<Box<dyn std::future::Future<Output = T> + Send + 'a>>;

/// Order placement path.
pub const ORDERS_ENDPOINT: &str = "/v2/orders";

/// Default timeout for order requests.
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Submits market orders and reports confirmed fills.
pub trait OrderGateway: Send + Sync {
    /// Returns `None` when no fill could be confirmed.
    fn place_order(
        &self,
        product_id: ProductId,
        side: OrderSide,
        size: i64,
    ) -> BoxFuture<'_, Option<OrderResult>>;
}

/// REST implementation of `OrderGateway`.
pub struct RestOrderGateway {
    client: Client,
    base_url: String,
    signer: RequestSigner,
}

impl RestOrderGateway {
    /// # Arguments
    /// * `base_url` - trading host, e.g. "https://cdn-ind.testnet.deltaex.org"
    /// * `user_agent` - sent on every request
    /// * `signer` - holds the API key pair
    pub fn new(
        base_url: impl Into<String>,
        user_agent: &str,
        signer: RequestSigner,
    ) -> ExecutorResult<Self> {
        let client = Client::builder()
            .timeout(DEFAULT_TIMEOUT)
            .user_agent(user_agent)
            .build()
            .map_err(|e| ExecutorError::Network(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            signer,
        })
    }

    /// Sign and submit one market order.
    pub async fn submit(
        &self,
        product_id: ProductId,
        side: OrderSide,
        size: i64,
    ) -> ExecutorResult<OrderResult> {
        let request = OrderRequest::market(product_id, side, size);
        let body = request.canonical_body()?;
        let signed = self.signer.sign("POST", ORDERS_ENDPOINT, "", &body)?;
        let url = format!("{}{}", self.base_url, ORDERS_ENDPOINT);

        info!(%product_id, %side, size, "Submitting market order");

        let response = self
            .client
            .post(&url)
            .header("api-key", &signed.api_key)
            .header("timestamp", &signed.timestamp)
            .header("signature", &signed.signature)
            .header(CONTENT_TYPE, "application/json")
            .body(body)
            .send()
            .await
            .map_err(|e| ExecutorError::Network(e.to_string()))?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| ExecutorError::Network(format!("Failed to read body: {e}")))?;

        if status == StatusCode::UNAUTHORIZED {
            return Err(ExecutorError::Unauthorized(text));
        }
        if !status.is_success() {
            return Err(ExecutorError::Rejected {
                status: status.as_u16(),
                body: text,
            });
        }

        let json: serde_json::Value = serde_json::from_str(&text)
            .map_err(|e| ExecutorError::MalformedResponse(format!("{e}: {text}")))?;
        interpret_response(&json, &request)
    }
}

impl OrderGateway for RestOrderGateway {
    fn place_order(
        &self,
        product_id: ProductId,
        side: OrderSide,
        size: i64,
    ) -> BoxFuture<'_, Option<OrderResult>> {
        Box::pin(async move {
            match self.submit(product_id, side, size).await {
                Ok(fill) => {
                    info!(status = %fill.status, side = %fill.side, filled = fill.size, "Order confirmed");
                    Some(fill)
                }
                Err(e @ ExecutorError::Unauthorized(_)) => {
                    error!(error = %e, "Order unauthorized: check API key, environment, IP whitelist or permissions");
                    Metrics::order_error(e.kind());
                    None
                }
                Err(e) => {
                    warn!(error = %e, "Order not confirmed");
                    Metrics::order_error(e.kind());
                    None
                }
            }
        })
    }
}

/// Recorded `place_order` call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlacedOrder {
    pub product_id: ProductId,
    pub side: OrderSide,
    pub size: i64,
}

/// Mock gateway for testing.
///
/// Fills the requested size with status `closed` unless scripted otherwise.
#[derive(Debug, Default)]
pub struct MockOrderGateway {
    calls: Mutex<Vec<PlacedOrder>>,
    /// `Some(None)` scripts "no fill"; `None` means fill as requested.
    next: Mutex<Option<Option<OrderResult>>>,
    count: AtomicUsize,
}

impl MockOrderGateway {
    pub fn new() -> Self {
        Self::default()
    }

    /// Script the next response for every later call.
    pub fn set_next_result(&self, result: Option<OrderResult>) {
        *self.next.lock() = Some(result);
    }

    /// Go back to filling every order in full.
    pub fn fill_all(&self) {
        *self.next.lock() = None;
    }

    pub fn calls(&self) -> Vec<PlacedOrder> {
        self.calls.lock().clone()
    }

    pub fn call_count(&self) -> usize {
        self.count.load(Ordering::SeqCst)
    }
}

impl OrderGateway for MockOrderGateway {
    fn place_order(
        &self,
        product_id: ProductId,
        side: OrderSide,
        size: i64,
    ) -> BoxFuture<'_, Option<OrderResult>> {
        Box::pin(async move {
            self.count.fetch_add(1, Ordering::SeqCst);
            self.calls.lock().push(PlacedOrder {
                product_id,
                side,
                size,
            });
            match self.next.lock().clone() {
                Some(scripted) => scripted,
                None => Some(OrderResult {
                    status: "closed".to_string(),
                    side,
                    size,
                    instrument_id: product_id,
                }),
            }
        })
    }
}
