//! Order request body and fill interpretation.

use deltabot_core::{OrderResult, OrderSide, ProductId};
use serde::Serialize;
use serde_json::Value;

use crate::error::{ExecutorError, ExecutorResult};

/// Status reported when the response carries neither `status` nor `state`.
pub const DEFAULT_STATUS: &str = "submitted";

/// Market order body.
///
/// Field order is part of the canonical form and must not change.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OrderRequest {
    pub order_type: &'static str,
    pub size: i64,
    pub side: OrderSide,
    pub product_id: ProductId,
}

impl OrderRequest {
    pub fn market(product_id: ProductId, side: OrderSide, size: i64) -> Self {
        Self {
            order_type: "market_order",
            size,
            side,
            product_id,
        }
    }

    /// Serialize once. The result is both signed and sent as the payload.
    pub fn canonical_body(&self) -> ExecutorResult<String> {
        Ok(serde_json::to_string(self)?)
    }
}

fn as_i64(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64().or_else(|| n.as_f64().map(|f| f as i64)),
        Value::String(s) => s.trim().parse::<f64>().ok().map(|f| f as i64),
        _ => None,
    }
}

/// Interpret a successful response body as a confirmed fill.
///
/// - status: `status`, else `state`, else `"submitted"`
/// - side: reported side, else the requested side
/// - size: `size - unfilled_size`, clamped to `[0, requested]`
/// - product: reported `product_id`, else the requested one
pub fn interpret_response(body: &Value, request: &OrderRequest) -> ExecutorResult<OrderResult> {
    let result = body
        .get("result")
        .filter(|r| r.is_object())
        .ok_or_else(|| ExecutorError::MalformedResponse(format!("no result object in {body}")))?;

    let status = ["status", "state"]
        .iter()
        .find_map(|k| result.get(*k).and_then(Value::as_str))
        .unwrap_or(DEFAULT_STATUS)
        .to_string();

    let side = result
        .get("side")
        .and_then(Value::as_str)
        .and_then(|s| s.parse::<OrderSide>().ok())
        .unwrap_or(request.side);

    let size = result.get("size").and_then(as_i64).unwrap_or(request.size);
    let unfilled = result.get("unfilled_size").and_then(as_i64).unwrap_or(0);
    let filled = (size - unfilled).clamp(0, request.size.max(0));

    let instrument_id = result
        .get("product_id")
        .and_then(Value::as_u64)
        .map(ProductId)
        .unwrap_or(request.product_id);

    Ok(OrderResult {
        status,
        side,
        size: filled,
        instrument_id,
    })
}
