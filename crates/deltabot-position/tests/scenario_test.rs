//! Position scenarios across signals, fills and restarts.

use deltabot_core::{OrderSide, ProductId, Signal};
use deltabot_executor::{MockOrderGateway, PlacedOrder};
use deltabot_position::{PositionStateMachine, PositionStore, Transition, HOLD_STATUS};
use tempfile::TempDir;

const PRODUCT: ProductId = ProductId(27);
const BUY: f64 = 0.00015;
const SELL: f64 = -0.00015;

fn read_state(dir: &TempDir) -> serde_json::Value {
    let text = std::fs::read_to_string(dir.path().join("position_state.json")).unwrap();
    serde_json::from_str(&text).unwrap()
}

fn machine(dir: &TempDir) -> PositionStateMachine {
    PositionStateMachine::load(
        PositionStore::new(dir.path().join("position_state.json")),
        PRODUCT,
        1,
    )
}

#[tokio::test]
async fn test_buy_then_sell_round_trip() {
    let dir = TempDir::new().unwrap();
    let gateway = MockOrderGateway::new();
    let mut m = machine(&dir);

    let t = m
        .on_signal(Signal::from_score(0.0002, BUY, SELL), Some(&gateway))
        .await;
    assert!(t.is_fill());
    assert_eq!(m.position(), 1);
    assert_eq!(read_state(&dir)["current_position"], 1);

    let t = m
        .on_signal(Signal::from_score(-0.0003, BUY, SELL), Some(&gateway))
        .await;
    assert_eq!(t.side(), Some(OrderSide::Sell));
    assert_eq!(t.instrument_id(), Some(PRODUCT));
    assert_eq!(m.position(), 0);
    assert_eq!(read_state(&dir)["current_position"], 0);

    assert_eq!(
        gateway.calls(),
        vec![
            PlacedOrder {
                product_id: PRODUCT,
                side: OrderSide::Buy,
                size: 1
            },
            PlacedOrder {
                product_id: PRODUCT,
                side: OrderSide::Sell,
                size: 1
            },
        ]
    );
}

#[tokio::test]
async fn test_inside_thresholds_never_orders() {
    let dir = TempDir::new().unwrap();
    let gateway = MockOrderGateway::new();
    let mut m = machine(&dir);

    for _ in 0..3 {
        let t = m
            .on_signal(Signal::from_score(0.0001, BUY, SELL), Some(&gateway))
            .await;
        assert_eq!(t, Transition::NoAction);
    }
    assert_eq!(gateway.call_count(), 0);
}

#[tokio::test]
async fn test_repeated_buys_open_once() {
    let dir = TempDir::new().unwrap();
    let gateway = MockOrderGateway::new();
    let mut m = machine(&dir);

    m.on_signal(Signal::Buy, Some(&gateway)).await;
    m.on_signal(Signal::Buy, Some(&gateway)).await;
    m.on_signal(Signal::Sell, Some(&gateway)).await;
    m.on_signal(Signal::Sell, Some(&gateway)).await;

    assert_eq!(gateway.call_count(), 2);
    assert_eq!(m.position(), 0);
}

#[tokio::test]
async fn test_unconfirmed_order_is_logged_as_hold() {
    let dir = TempDir::new().unwrap();
    let gateway = MockOrderGateway::new();
    gateway.set_next_result(None);
    let mut m = machine(&dir);

    let t = m.on_signal(Signal::Buy, Some(&gateway)).await;
    assert_eq!(t, Transition::Unconfirmed { side: OrderSide::Buy });
    assert_eq!(t.order_status(), HOLD_STATUS);
    assert_eq!(t.side(), None);
    assert_eq!(m.position(), 0);
    assert!(!dir.path().join("position_state.json").exists());

    // Retried next cycle once the gateway recovers
    gateway.fill_all();
    assert!(m.on_signal(Signal::Buy, Some(&gateway)).await.is_fill());
    assert_eq!(m.position(), 1);
}

#[tokio::test]
async fn test_restart_restores_position() {
    let dir = TempDir::new().unwrap();
    let gateway = MockOrderGateway::new();
    {
        let mut m = machine(&dir);
        m.on_signal(Signal::Buy, Some(&gateway)).await;
    }

    let mut restarted = machine(&dir);
    assert_eq!(restarted.position(), 1);
    assert_eq!(
        restarted.on_signal(Signal::Buy, Some(&gateway)).await,
        Transition::NoAction
    );
    assert_eq!(gateway.call_count(), 1);
}

#[tokio::test]
async fn test_short_position_covers_on_buy() {
    let dir = TempDir::new().unwrap();
    std::fs::write(
        dir.path().join("position_state.json"),
        r#"{"current_position":-2,"updated_at":"2024-05-01 12:00:00"}"#,
    )
    .unwrap();
    let gateway = MockOrderGateway::new();
    let mut m = machine(&dir);

    assert_eq!(m.on_signal(Signal::Sell, Some(&gateway)).await, Transition::NoAction);
    m.on_signal(Signal::Buy, Some(&gateway)).await;
    assert_eq!(m.position(), -1);
}

#[tokio::test]
async fn test_position_equals_sum_of_fills() {
    let dir = TempDir::new().unwrap();
    let gateway = MockOrderGateway::new();
    let mut m = machine(&dir);
    let signals = [
        Signal::Buy,
        Signal::Hold,
        Signal::Sell,
        Signal::Sell,
        Signal::Buy,
        Signal::Buy,
        Signal::Hold,
        Signal::Sell,
    ];

    let mut expected = 0;
    for signal in signals {
        let before = m.position();
        if let Transition::Filled(fill) = m.on_signal(signal, Some(&gateway)).await {
            expected += fill.signed_size();
        }
        assert!((m.position() - before).abs() <= m.trade_size());
    }
    assert_eq!(m.position(), expected);
}
