//! Position state machine.
//!
//! Holds the net position, asks the decision table whether a signal implies
//! an order, and mutates the position only on a confirmed fill. The new value
//! is persisted before `on_signal` returns.

use deltabot_core::{OrderResult, OrderSide, ProductId, Signal};
use deltabot_executor::OrderGateway;
use deltabot_telemetry::Metrics;
use tracing::{error, info, warn};

use crate::store::PositionStore;
use crate::table::{decide, PositionSign};

/// Ledger status for cycles without a confirmed fill.
pub const HOLD_STATUS: &str = "hold";
/// Ledger status for actionable signals in observation mode.
pub const OBSERVED_STATUS: &str = "observed";

/// Outcome of one `on_signal` call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Transition {
    /// Signal not actionable at the current position.
    NoAction,
    /// Actionable, but no gateway was supplied.
    Observed { side: OrderSide },
    /// Order attempted, no fill confirmed. Position unchanged.
    Unconfirmed { side: OrderSide },
    /// Confirmed fill, already applied and persisted.
    Filled(OrderResult),
}

impl Transition {
    pub fn order_status(&self) -> &str {
        match self {
            Self::Filled(fill) => &fill.status,
            Self::Observed { .. } => OBSERVED_STATUS,
            Self::NoAction | Self::Unconfirmed { .. } => HOLD_STATUS,
        }
    }

    /// Side recorded in the ledger; empty unless something was observed or filled.
    pub fn side(&self) -> Option<OrderSide> {
        match self {
            Self::Filled(fill) => Some(fill.side),
            Self::Observed { side } => Some(*side),
            Self::NoAction | Self::Unconfirmed { .. } => None,
        }
    }

    pub fn instrument_id(&self) -> Option<ProductId> {
        match self {
            Self::Filled(fill) => Some(fill.instrument_id),
            _ => None,
        }
    }

    pub fn is_fill(&self) -> bool {
        matches!(self, Self::Filled(_))
    }
}

pub struct PositionStateMachine {
    store: PositionStore,
    product_id: ProductId,
    trade_size: i64,
    position: i64,
}

impl PositionStateMachine {
    /// Restore from `store`.
    pub fn load(store: PositionStore, product_id: ProductId, trade_size: i64) -> Self {
        let position = store.load();
        info!(position, path = %store.path().display(), "Loaded position");
        Metrics::position_set(position);
        Self {
            store,
            product_id,
            trade_size,
            position,
        }
    }

    pub fn position(&self) -> i64 {
        self.position
    }

    pub fn sign(&self) -> PositionSign {
        PositionSign::of(self.position)
    }

    pub fn trade_size(&self) -> i64 {
        self.trade_size
    }

    /// Side `signal` would trade at the current position.
    pub fn actionable(&self, signal: Signal) -> Option<OrderSide> {
        decide(signal, self.sign())
    }

    /// Act on one signal.
    ///
    /// With `gateway == None` actionable signals are only observed.
    pub async fn on_signal(
        &mut self,
        signal: Signal,
        gateway: Option<&dyn OrderGateway>,
    ) -> Transition {
        let Some(side) = self.actionable(signal) else {
            return Transition::NoAction;
        };

        let Some(gateway) = gateway else {
            info!(%signal, %side, position = self.position, "Observation mode, order not placed");
            return Transition::Observed { side };
        };

        info!(%side, size = self.trade_size, product_id = %self.product_id, "Placing order");
        let Some(mut fill) = gateway
            .place_order(self.product_id, side, self.trade_size)
            .await
        else {
            warn!(%side, "No fill confirmed, position unchanged");
            Metrics::order_submitted(side.as_str(), false);
            return Transition::Unconfirmed { side };
        };

        fill.size = fill.size.clamp(0, self.trade_size.max(0));
        self.apply(&fill);
        Metrics::order_submitted(side.as_str(), fill.size > 0);
        Transition::Filled(fill)
    }

    fn apply(&mut self, fill: &OrderResult) {
        self.position += fill.signed_size();
        Metrics::position_set(self.position);
        info!(
            status = %fill.status,
            side = %fill.side,
            filled = fill.size,
            position = self.position,
            "Fill applied"
        );

        if let Err(e) = self.store.save(self.position) {
            error!(error = %e, position = self.position, "Failed to persist position");
            Metrics::persistence_failed("state");
        }
    }
}
