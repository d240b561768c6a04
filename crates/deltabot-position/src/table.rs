//! Signal-to-order decision table.
//!
//! The rule is one-directional: a buy opens or covers into long, a sell
//! only closes a long. The system never opens a short from a sell.
//!
//! | signal \ sign | Short | Flat | Long |
//! |---------------|-------|------|------|
//! | buy           | buy   | buy  | -    |
//! | sell          | -     | -    | sell |
//! | hold          | -     | -    | -    |

use deltabot_core::{OrderSide, Signal};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Sign of a net position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PositionSign {
    Short,
    Flat,
    Long,
}

impl PositionSign {
    pub fn of(position: i64) -> Self {
        match position {
            p if p > 0 => Self::Long,
            p if p < 0 => Self::Short,
            _ => Self::Flat,
        }
    }

    fn column(self) -> usize {
        match self {
            Self::Short => 0,
            Self::Flat => 1,
            Self::Long => 2,
        }
    }
}

impl fmt::Display for PositionSign {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Short => "short",
            Self::Flat => "flat",
            Self::Long => "long",
        })
    }
}

const BUY: Option<OrderSide> = Some(OrderSide::Buy);
const SELL: Option<OrderSide> = Some(OrderSide::Sell);

/// Rows: buy, sell, hold. Columns: short, flat, long.
const TABLE: [[Option<OrderSide>; 3]; 3] = [
    [BUY, BUY, None],
    [None, None, SELL],
    [None, None, None],
];

/// Order side implied by `signal` at the given position sign, if any.
pub fn decide(signal: Signal, sign: PositionSign) -> Option<OrderSide> {
    let row = match signal {
        Signal::Buy => 0,
        Signal::Sell => 1,
        Signal::Hold => 2,
    };
    TABLE[row][sign.column()]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sign_of() {
        assert_eq!(PositionSign::of(0), PositionSign::Flat);
        assert_eq!(PositionSign::of(3), PositionSign::Long);
        assert_eq!(PositionSign::of(-1), PositionSign::Short);
    }

    #[test]
    fn test_buy_opens_or_covers() {
        assert_eq!(decide(Signal::Buy, PositionSign::Flat), BUY);
        assert_eq!(decide(Signal::Buy, PositionSign::Short), BUY);
        assert_eq!(decide(Signal::Buy, PositionSign::Long), None);
    }

    #[test]
    fn test_sell_only_closes_long() {
        assert_eq!(decide(Signal::Sell, PositionSign::Long), SELL);
        assert_eq!(decide(Signal::Sell, PositionSign::Flat), None);
        assert_eq!(decide(Signal::Sell, PositionSign::Short), None);
    }

    #[test]
    fn test_hold_never_acts() {
        for sign in [PositionSign::Short, PositionSign::Flat, PositionSign::Long] {
            assert_eq!(decide(Signal::Hold, sign), None);
        }
    }
}
