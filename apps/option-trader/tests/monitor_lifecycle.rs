//! Order lifecycle integration tests with a mocked broker gateway and
//! scripted keyboard input.

use std::collections::VecDeque;
use std::time::Duration;

use async_trait::async_trait;
use mockall::Sequence;
use mockall::mock;
use mockall::predicate::eq;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use tokio_util::sync::CancellationToken;

use option_trader::domain::{
    OrderOutcome, OrderSide, OrderStatus, PositionIntent, Quote, TrackedOrder,
};
use option_trader::error::ClientError;
use option_trader::gateway::{OrderGateway, OrderSnapshot, PlaceOrderRequest, Position, QuoteSource};
use option_trader::monitor::orphan::OrphanScan;
use option_trader::monitor::roundtrip::RoundTripCoordinator;
use option_trader::monitor::{CommandInput, MonitorCommand, MonitorConfig, OrderMonitor, Prompter};

mock! {
    Gateway {}

    #[async_trait]
    impl OrderGateway for Gateway {
        async fn place_order(
            &self,
            request: &PlaceOrderRequest,
        ) -> Result<OrderSnapshot, ClientError>;
        async fn replace_order(
            &self,
            order_id: &str,
            limit_price: Decimal,
        ) -> Result<OrderSnapshot, ClientError>;
        async fn cancel_order(&self, order_id: &str) -> Result<(), ClientError>;
        async fn get_order(&self, order_id: &str) -> Result<OrderSnapshot, ClientError>;
        async fn open_orders(&self) -> Result<Vec<OrderSnapshot>, ClientError>;
        async fn positions(&self) -> Result<Vec<Position>, ClientError>;
    }
}

/// Quote source with one fixed quote for every symbol.
struct FixedQuotes(Option<Quote>);

impl QuoteSource for FixedQuotes {
    fn get_quote(&self, _symbol: &str) -> Option<Quote> {
        self.0
    }
}

/// Keyboard input fed from a fixed script; ticks past the script's end
/// produce no command.
struct ScriptedInput {
    commands: VecDeque<Option<MonitorCommand>>,
}

impl ScriptedInput {
    fn new(commands: impl IntoIterator<Item = Option<MonitorCommand>>) -> Self {
        Self {
            commands: commands.into_iter().collect(),
        }
    }
}

#[async_trait]
impl CommandInput for ScriptedInput {
    async fn next_command(
        &mut self,
        _timeout: Duration,
    ) -> Result<Option<MonitorCommand>, ClientError> {
        Ok(self.commands.pop_front().flatten())
    }
}

/// Prompter answering from fixed scripts and recording notices.
#[derive(Default)]
struct ScriptedPrompter {
    confirms: VecDeque<bool>,
    prices: VecDeque<Option<Decimal>>,
    notices: Vec<String>,
}

#[async_trait]
impl Prompter for ScriptedPrompter {
    fn status_line(&mut self, _text: &str) {}

    fn notice(&mut self, text: &str) {
        self.notices.push(text.to_string());
    }

    async fn confirm(&mut self, _prompt: &str) -> Result<bool, ClientError> {
        Ok(self.confirms.pop_front().unwrap_or(false))
    }

    async fn prompt_price(&mut self, _prompt: &str) -> Result<Option<Decimal>, ClientError> {
        Ok(self.prices.pop_front().unwrap_or(None))
    }
}

fn fast_config() -> MonitorConfig {
    MonitorConfig {
        poll_interval: Duration::ZERO,
        command_poll_timeout: Duration::ZERO,
        cancel_wait_interval: Duration::ZERO,
        max_cancel_polls: 5,
    }
}

fn snapshot(id: &str, status: OrderStatus) -> OrderSnapshot {
    OrderSnapshot {
        id: id.to_string(),
        symbol: "AAPL240119C00190000".to_string(),
        qty: 1,
        side: OrderSide::Buy,
        status,
        limit_price: Some(dec!(1.50)),
    }
}

fn tracked(id: &str) -> TrackedOrder {
    TrackedOrder::new(
        id,
        "AAPL240119C00190000",
        1,
        OrderSide::Buy,
        dec!(1.50),
        PositionIntent::Open,
    )
}

#[tokio::test]
async fn fill_sequence_ends_with_filled_and_no_mutations() {
    let mut gateway = MockGateway::new();
    let mut seq = Sequence::new();
    for status in [
        OrderStatus::New,
        OrderStatus::PartiallyFilled,
        OrderStatus::Filled,
    ] {
        gateway
            .expect_get_order()
            .with(eq("ord-1"))
            .times(1)
            .in_sequence(&mut seq)
            .returning(move |_| Ok(snapshot("ord-1", status)));
    }
    // No cancel_order / replace_order / place_order expectations:
    // any such call fails the test.

    let quotes = FixedQuotes(None);
    let monitor = OrderMonitor::new(
        &gateway,
        &quotes,
        fast_config(),
        CancellationToken::new(),
    );
    let mut order = tracked("ord-1");
    let mut input = ScriptedInput::new(std::iter::repeat_n(None, 8));
    let mut prompter = ScriptedPrompter::default();

    let outcome = monitor
        .run(&mut order, &mut input, &mut prompter)
        .await
        .unwrap();

    assert_eq!(outcome, OrderOutcome::Filled);
    assert_eq!(order.order_id, "ord-1");
    assert!(order.last_adjusted_at.is_none());
}

#[tokio::test]
async fn adjust_under_accepted_cancels_waits_and_places() {
    let mut gateway = MockGateway::new();
    let mut seq = Sequence::new();

    // Adjust re-fetches status and sees a not-yet-replaceable order.
    gateway
        .expect_get_order()
        .with(eq("ord-1"))
        .times(1)
        .in_sequence(&mut seq)
        .returning(|_| Ok(snapshot("ord-1", OrderStatus::Accepted)));
    gateway
        .expect_cancel_order()
        .with(eq("ord-1"))
        .times(1)
        .in_sequence(&mut seq)
        .returning(|_| Ok(()));
    // One pending poll, then confirmed canceled.
    gateway
        .expect_get_order()
        .with(eq("ord-1"))
        .times(1)
        .in_sequence(&mut seq)
        .returning(|_| Ok(snapshot("ord-1", OrderStatus::PendingCancel)));
    gateway
        .expect_get_order()
        .with(eq("ord-1"))
        .times(1)
        .in_sequence(&mut seq)
        .returning(|_| Ok(snapshot("ord-1", OrderStatus::Canceled)));
    gateway
        .expect_place_order()
        .withf(|r| r.limit_price == dec!(2.00) && r.side == OrderSide::Buy)
        .times(1)
        .in_sequence(&mut seq)
        .returning(|_| Ok(snapshot("ord-2", OrderStatus::New)));
    // Monitoring resumes under the new id.
    gateway
        .expect_get_order()
        .with(eq("ord-2"))
        .times(1)
        .in_sequence(&mut seq)
        .returning(|_| Ok(snapshot("ord-2", OrderStatus::Filled)));
    // replace_order is never expected: an in-place replace here fails
    // the test.

    let quotes = FixedQuotes(Some(Quote::new(dec!(1.90), dec!(2.10))));
    let monitor = OrderMonitor::new(
        &gateway,
        &quotes,
        fast_config(),
        CancellationToken::new(),
    );
    let mut order = tracked("ord-1");
    let mut input = ScriptedInput::new(
        std::iter::once(Some(MonitorCommand::Adjust)).chain(std::iter::repeat_n(None, 8)),
    );
    let mut prompter = ScriptedPrompter {
        prices: VecDeque::from([Some(dec!(2.00))]),
        ..Default::default()
    };

    let outcome = monitor
        .run(&mut order, &mut input, &mut prompter)
        .await
        .unwrap();

    assert_eq!(outcome, OrderOutcome::Filled);
    assert_eq!(order.order_id, "ord-2");
    assert_eq!(order.limit_price, dec!(2.00));
    assert!(order.last_adjusted_at.is_some());
}

#[tokio::test]
async fn unconfirmed_cancel_abandons_the_adjustment() {
    let mut gateway = MockGateway::new();
    let mut seq = Sequence::new();

    gateway
        .expect_get_order()
        .with(eq("ord-1"))
        .times(1)
        .in_sequence(&mut seq)
        .returning(|_| Ok(snapshot("ord-1", OrderStatus::Accepted)));
    gateway
        .expect_cancel_order()
        .with(eq("ord-1"))
        .times(1)
        .in_sequence(&mut seq)
        .returning(|_| Ok(()));
    // The status never goes terminal within the poll cap.
    gateway
        .expect_get_order()
        .with(eq("ord-1"))
        .times(5)
        .in_sequence(&mut seq)
        .returning(|_| Ok(snapshot("ord-1", OrderStatus::PendingCancel)));
    // Monitoring resumes under the original id; no replacement is
    // placed. place_order / replace_order expectations are absent, so
    // any such call fails the test.
    gateway
        .expect_get_order()
        .with(eq("ord-1"))
        .times(1)
        .in_sequence(&mut seq)
        .returning(|_| Ok(snapshot("ord-1", OrderStatus::Filled)));

    let quotes = FixedQuotes(None);
    let monitor = OrderMonitor::new(
        &gateway,
        &quotes,
        fast_config(),
        CancellationToken::new(),
    );
    let mut order = tracked("ord-1");
    let mut input = ScriptedInput::new(
        std::iter::once(Some(MonitorCommand::Adjust)).chain(std::iter::repeat_n(None, 4)),
    );
    let mut prompter = ScriptedPrompter {
        prices: VecDeque::from([Some(dec!(2.00))]),
        ..Default::default()
    };

    let outcome = monitor
        .run(&mut order, &mut input, &mut prompter)
        .await
        .unwrap();

    assert_eq!(outcome, OrderOutcome::Filled);
    assert_eq!(order.order_id, "ord-1");
    assert_eq!(order.limit_price, dec!(1.50));
    assert!(order.last_adjusted_at.is_none());
    assert!(prompter.notices.iter().any(|n| n.contains("abandoned")));
}

#[tokio::test]
async fn adjust_under_new_replaces_in_place() {
    let mut gateway = MockGateway::new();
    let mut seq = Sequence::new();

    gateway
        .expect_get_order()
        .with(eq("ord-1"))
        .times(1)
        .in_sequence(&mut seq)
        .returning(|_| Ok(snapshot("ord-1", OrderStatus::New)));
    gateway
        .expect_replace_order()
        .with(eq("ord-1"), eq(dec!(1.75)))
        .times(1)
        .in_sequence(&mut seq)
        .returning(|_, _| Ok(snapshot("ord-2", OrderStatus::New)));
    gateway
        .expect_get_order()
        .with(eq("ord-2"))
        .times(1)
        .in_sequence(&mut seq)
        .returning(|_| Ok(snapshot("ord-2", OrderStatus::Filled)));
    // cancel_order is never expected here.

    let quotes = FixedQuotes(None);
    let monitor = OrderMonitor::new(
        &gateway,
        &quotes,
        fast_config(),
        CancellationToken::new(),
    );
    let mut order = tracked("ord-1");
    let mut input = ScriptedInput::new(
        std::iter::once(Some(MonitorCommand::Adjust)).chain(std::iter::repeat_n(None, 8)),
    );
    let mut prompter = ScriptedPrompter {
        prices: VecDeque::from([Some(dec!(1.75))]),
        ..Default::default()
    };

    let outcome = monitor
        .run(&mut order, &mut input, &mut prompter)
        .await
        .unwrap();

    assert_eq!(outcome, OrderOutcome::Filled);
    assert_eq!(order.order_id, "ord-2");
    assert_eq!(order.limit_price, dec!(1.75));
}

#[tokio::test]
async fn aborted_price_prompt_leaves_order_untouched() {
    let mut gateway = MockGateway::new();
    let mut seq = Sequence::new();

    gateway
        .expect_get_order()
        .with(eq("ord-1"))
        .times(1)
        .in_sequence(&mut seq)
        .returning(|_| Ok(snapshot("ord-1", OrderStatus::New)));
    gateway
        .expect_get_order()
        .with(eq("ord-1"))
        .times(1)
        .in_sequence(&mut seq)
        .returning(|_| Ok(snapshot("ord-1", OrderStatus::Filled)));

    let quotes = FixedQuotes(None);
    let monitor = OrderMonitor::new(
        &gateway,
        &quotes,
        fast_config(),
        CancellationToken::new(),
    );
    let mut order = tracked("ord-1");
    let mut input = ScriptedInput::new(
        std::iter::once(Some(MonitorCommand::Adjust)).chain(std::iter::repeat_n(None, 4)),
    );
    // Empty price input aborts the adjustment.
    let mut prompter = ScriptedPrompter {
        prices: VecDeque::from([None]),
        ..Default::default()
    };

    let outcome = monitor
        .run(&mut order, &mut input, &mut prompter)
        .await
        .unwrap();

    assert_eq!(outcome, OrderOutcome::Filled);
    assert_eq!(order.order_id, "ord-1");
    assert_eq!(order.limit_price, dec!(1.50));
    assert!(order.last_adjusted_at.is_none());
}

#[tokio::test]
async fn confirmed_cancel_ends_the_session() {
    let mut gateway = MockGateway::new();
    gateway
        .expect_cancel_order()
        .with(eq("ord-1"))
        .times(1)
        .returning(|_| Ok(()));

    let quotes = FixedQuotes(None);
    let monitor = OrderMonitor::new(
        &gateway,
        &quotes,
        fast_config(),
        CancellationToken::new(),
    );
    let mut order = tracked("ord-1");
    let mut input = ScriptedInput::new([Some(MonitorCommand::Cancel)]);
    let mut prompter = ScriptedPrompter {
        confirms: VecDeque::from([true]),
        ..Default::default()
    };

    let outcome = monitor
        .run(&mut order, &mut input, &mut prompter)
        .await
        .unwrap();

    assert_eq!(outcome, OrderOutcome::Canceled);
}

#[tokio::test]
async fn declined_cancel_returns_to_monitoring() {
    let mut gateway = MockGateway::new();
    gateway
        .expect_get_order()
        .with(eq("ord-1"))
        .times(1)
        .returning(|_| Ok(snapshot("ord-1", OrderStatus::Filled)));
    // cancel_order is never expected.

    let quotes = FixedQuotes(None);
    let monitor = OrderMonitor::new(
        &gateway,
        &quotes,
        fast_config(),
        CancellationToken::new(),
    );
    let mut order = tracked("ord-1");
    let mut input = ScriptedInput::new(
        std::iter::once(Some(MonitorCommand::Cancel)).chain(std::iter::repeat_n(None, 4)),
    );
    let mut prompter = ScriptedPrompter {
        confirms: VecDeque::from([false]),
        ..Default::default()
    };

    let outcome = monitor
        .run(&mut order, &mut input, &mut prompter)
        .await
        .unwrap();

    assert_eq!(outcome, OrderOutcome::Filled);
}

/// Input source that fails once, then goes quiet.
struct FlakyInput {
    failed: bool,
}

#[async_trait]
impl CommandInput for FlakyInput {
    async fn next_command(
        &mut self,
        _timeout: Duration,
    ) -> Result<Option<MonitorCommand>, ClientError> {
        if self.failed {
            return Ok(None);
        }
        self.failed = true;
        Err(ClientError::Transport("input device unavailable".into()))
    }
}

#[tokio::test]
async fn input_error_does_not_end_the_session() {
    let mut gateway = MockGateway::new();
    let mut seq = Sequence::new();
    gateway
        .expect_get_order()
        .with(eq("ord-1"))
        .times(1)
        .in_sequence(&mut seq)
        .returning(|_| Ok(snapshot("ord-1", OrderStatus::New)));
    gateway
        .expect_get_order()
        .with(eq("ord-1"))
        .times(1)
        .in_sequence(&mut seq)
        .returning(|_| Ok(snapshot("ord-1", OrderStatus::Filled)));

    let quotes = FixedQuotes(None);
    let monitor = OrderMonitor::new(
        &gateway,
        &quotes,
        fast_config(),
        CancellationToken::new(),
    );
    let mut order = tracked("ord-1");
    let mut input = FlakyInput { failed: false };
    let mut prompter = ScriptedPrompter::default();

    let outcome = monitor
        .run(&mut order, &mut input, &mut prompter)
        .await
        .unwrap();
    assert_eq!(outcome, OrderOutcome::Filled);
}

#[tokio::test]
async fn shutdown_token_interrupts_the_loop() {
    let gateway = MockGateway::new();
    let quotes = FixedQuotes(None);
    let token = CancellationToken::new();
    token.cancel();

    let monitor = OrderMonitor::new(&gateway, &quotes, fast_config(), token);
    let mut order = tracked("ord-1");
    let mut input = ScriptedInput::new([]);
    let mut prompter = ScriptedPrompter::default();

    let err = monitor
        .run(&mut order, &mut input, &mut prompter)
        .await
        .unwrap_err();
    assert!(matches!(err, ClientError::Interrupted));
}

#[tokio::test]
async fn opening_fill_offers_inverted_closing_order() {
    let mut gateway = MockGateway::new();
    gateway
        .expect_place_order()
        .withf(|r| {
            r.side == OrderSide::Sell
                && r.symbol == "AAPL240119C00190000"
                && r.qty == 1
                && r.limit_price == dec!(2.25)
        })
        .times(1)
        .returning(|_| {
            let mut s = snapshot("ord-close", OrderStatus::New);
            s.side = OrderSide::Sell;
            Ok(s)
        });

    let quotes = FixedQuotes(Some(Quote::new(dec!(2.20), dec!(2.30))));
    let coordinator = RoundTripCoordinator::new(&gateway, &quotes);
    let filled = tracked("ord-1");
    let mut prompter = ScriptedPrompter {
        prices: VecDeque::from([Some(dec!(2.25))]),
        ..Default::default()
    };

    let closing = coordinator
        .offer_closing_order(&filled, &mut prompter)
        .await
        .unwrap()
        .expect("closing order");

    assert_eq!(closing.order_id, "ord-close");
    assert_eq!(closing.side, OrderSide::Sell);
    assert_eq!(closing.intent, PositionIntent::Close);
    assert_eq!(closing.limit_price, dec!(2.25));
}

#[tokio::test]
async fn closing_fill_completes_the_round_trip() {
    let gateway = MockGateway::new();
    // place_order is never expected.
    let quotes = FixedQuotes(None);
    let coordinator = RoundTripCoordinator::new(&gateway, &quotes);

    let mut filled = tracked("ord-1");
    filled.intent = PositionIntent::Close;
    let mut prompter = ScriptedPrompter::default();

    let closing = coordinator
        .offer_closing_order(&filled, &mut prompter)
        .await
        .unwrap();
    assert!(closing.is_none());
}

#[tokio::test]
async fn skipped_closing_price_leaves_position_open() {
    let gateway = MockGateway::new();
    let quotes = FixedQuotes(Some(Quote::new(dec!(2.20), dec!(2.30))));
    let coordinator = RoundTripCoordinator::new(&gateway, &quotes);

    let filled = tracked("ord-1");
    let mut prompter = ScriptedPrompter {
        prices: VecDeque::from([None]),
        ..Default::default()
    };

    let closing = coordinator
        .offer_closing_order(&filled, &mut prompter)
        .await
        .unwrap();
    assert!(closing.is_none());
}

#[tokio::test]
async fn orphan_scan_filters_and_derives_intent() {
    let mut gateway = MockGateway::new();
    gateway.expect_open_orders().times(1).returning(|| {
        Ok(vec![
            snapshot("ord-option", OrderStatus::New),
            // A plain stock order does not decode as an option symbol.
            OrderSnapshot {
                id: "ord-stock".to_string(),
                symbol: "AAPL".to_string(),
                qty: 10,
                side: OrderSide::Buy,
                status: OrderStatus::New,
                limit_price: Some(dec!(190)),
            },
            // Different underlying.
            OrderSnapshot {
                id: "ord-spy".to_string(),
                symbol: "SPY250321P00455500".to_string(),
                qty: 1,
                side: OrderSide::Buy,
                status: OrderStatus::New,
                limit_price: Some(dec!(1.00)),
            },
        ])
    });
    // Short one contract: a buy closes.
    gateway.expect_positions().times(1).returning(|| {
        Ok(vec![Position {
            symbol: "AAPL240119C00190000".to_string(),
            signed_qty: dec!(-1),
        }])
    });

    let scan = OrphanScan::new(&gateway);
    let orphans = scan.find("aapl").await.unwrap();
    assert_eq!(orphans.len(), 1);
    assert_eq!(orphans[0].id, "ord-option");

    let adopted = scan.adopt(&orphans[0]).await.unwrap();
    assert_eq!(adopted.order_id, "ord-option");
    assert_eq!(adopted.intent, PositionIntent::Close);
    assert_eq!(adopted.limit_price, dec!(1.50));
}

#[tokio::test]
async fn orphan_without_limit_price_is_rejected() {
    let gateway = MockGateway::new();
    let scan = OrphanScan::new(&gateway);

    let mut market_order = snapshot("ord-market", OrderStatus::New);
    market_order.limit_price = None;

    let err = scan.adopt(&market_order).await.unwrap_err();
    assert!(matches!(err, ClientError::Validation(_)));
}
