use std::sync::Arc;
use trading::testing::{RecordingExecutionService, RecordingPriceSource};
use trigger_strategy::{Lifecycle, StrategyConfig, StrategyError, TradingStrategy};

const THRESHOLD: f64 = 100.0;
const BELOW_THRESHOLD: f64 = 50.0;
const ABOVE_THRESHOLD: f64 = 110.0;
const LOTS: i64 = 5000;

struct Fixture {
    executor: Arc<RecordingExecutionService>,
    source: Arc<RecordingPriceSource>,
    subject: Arc<TradingStrategy>,
}

impl Fixture {
    fn connected() -> Self {
        let executor = Arc::new(RecordingExecutionService::new());
        let source = Arc::new(RecordingPriceSource::new());
        let subject = TradingStrategy::new(
            StrategyConfig::new("IBM", THRESHOLD, LOTS),
            executor.clone(),
            source.clone(),
        );
        subject.connect().unwrap();
        Self {
            executor,
            source,
            subject,
        }
    }

    fn publish(&self, price: f64) {
        self.source.publish("IBM", price).unwrap();
    }
}

#[test]
fn test_registers_listener_on_connect() {
    let f = Fixture::connected();
    assert_eq!(f.source.add_count(), 1);
    assert_eq!(f.source.listener_count(), 1);
    assert!(f.subject.is_connected());
}

#[test]
fn test_registers_listener_once() {
    let f = Fixture::connected();
    f.subject.connect().unwrap();
    f.subject.connect().unwrap();
    assert_eq!(f.source.add_count(), 1);
    assert_eq!(f.source.listener_count(), 1);
}

#[test]
fn test_removes_listener_on_every_disconnect() {
    let f = Fixture::connected();
    f.subject.disconnect().unwrap();
    assert_eq!(f.source.remove_count(), 1);
    assert_eq!(f.source.listener_count(), 0);

    f.subject.disconnect().unwrap();
    assert_eq!(f.source.remove_count(), 2);
    assert!(!f.subject.is_connected());
}

#[test]
fn test_executes_buy_order_below_threshold() {
    let f = Fixture::connected();
    f.publish(BELOW_THRESHOLD);

    assert_eq!(f.executor.times_called_with("ibm", BELOW_THRESHOLD, LOTS), 1);
    assert_eq!(f.executor.call_count(), 1);
    assert!(!f.subject.is_connected());
    assert!(f.subject.has_fired());
    assert_eq!(f.source.remove_count(), 1);
}

#[test]
fn test_executes_buy_order_once_only() {
    let f = Fixture::connected();
    f.publish(BELOW_THRESHOLD);
    assert_eq!(f.executor.times_called_with("ibm", BELOW_THRESHOLD, LOTS), 1);

    f.publish(BELOW_THRESHOLD);
    // Direct delivery bypasses the source, which already dropped the listener.
    f.subject.on_price("IBM", BELOW_THRESHOLD).unwrap();
    assert_eq!(f.executor.call_count(), 1);
}

#[test]
fn test_executes_each_buy_order_once_only() {
    let f = Fixture::connected();
    let another = TradingStrategy::new(
        StrategyConfig::new("IBM", 45.0, LOTS),
        f.executor.clone(),
        f.source.clone(),
    );
    another.connect().unwrap();

    f.publish(BELOW_THRESHOLD);
    assert_eq!(f.executor.times_called_with("ibm", BELOW_THRESHOLD, LOTS), 1);
    assert_eq!(f.executor.call_count(), 1);
    assert!(another.is_connected());

    f.source.publish("ibm", 40.0).unwrap();
    assert_eq!(f.executor.times_called_with("ibm", 40.0, LOTS), 1);
    assert_eq!(f.executor.call_count(), 2);

    f.source.publish("IBM", 10.0).unwrap();
    assert_eq!(f.executor.call_count(), 2);
}

#[test]
fn test_ignores_price_tick_at_threshold() {
    let f = Fixture::connected();
    f.publish(THRESHOLD);
    assert_eq!(f.executor.call_count(), 0);
    assert!(f.subject.is_connected());
}

#[test]
fn test_ignores_price_tick_above_threshold() {
    let f = Fixture::connected();
    f.publish(ABOVE_THRESHOLD);
    assert_eq!(f.executor.call_count(), 0);
    assert!(f.subject.is_connected());
}

#[test]
fn test_ignores_nan_price() {
    let f = Fixture::connected();
    f.publish(f64::NAN);
    assert_eq!(f.executor.call_count(), 0);
    assert!(f.subject.is_connected());
}

#[test]
fn test_does_not_action_price_ticks_for_other_securities() {
    let f = Fixture::connected();
    f.source.publish("DBK", BELOW_THRESHOLD).unwrap();
    f.source.publish("IBMX", BELOW_THRESHOLD).unwrap();
    assert_eq!(f.executor.call_count(), 0);
    assert!(f.subject.is_connected());
}

#[test]
fn test_matches_security_case_insensitively() {
    let f = Fixture::connected();
    f.source.publish("iBm", BELOW_THRESHOLD).unwrap();
    assert_eq!(f.executor.times_called_with("ibm", BELOW_THRESHOLD, LOTS), 1);
}

#[test]
fn test_matches_security_with_final_sigma() {
    let executor = Arc::new(RecordingExecutionService::new());
    let source = Arc::new(RecordingPriceSource::new());
    let subject = TradingStrategy::new(
        StrategyConfig::new("ΟΔΟΣ", THRESHOLD, 1),
        executor.clone(),
        source.clone(),
    );
    subject.connect().unwrap();

    source.publish("ΟΔΟΣ", BELOW_THRESHOLD).unwrap();

    assert_eq!(executor.times_called_with("οδος", BELOW_THRESHOLD, 1), 1);
}

#[test]
fn test_tick_during_disconnect_is_ignored() {
    let f = Fixture::connected();
    f.source.on_remove(|listener| {
        listener.price_update("IBM", BELOW_THRESHOLD).unwrap();
    });

    f.subject.disconnect().unwrap();

    assert_eq!(f.source.remove_count(), 1);
    assert_eq!(f.executor.call_count(), 0);
    assert_eq!(f.subject.lifecycle(), Lifecycle::Idle);
}

#[test]
fn test_does_not_receive_price_ticks_after_disconnect() {
    let f = Fixture::connected();
    f.subject.disconnect().unwrap();
    f.publish(BELOW_THRESHOLD);
    f.subject.on_price("IBM", BELOW_THRESHOLD).unwrap();
    assert_eq!(f.executor.call_count(), 0);
}

#[test]
fn test_ignores_ticks_before_connect() {
    let executor = Arc::new(RecordingExecutionService::new());
    let subject = TradingStrategy::new(
        StrategyConfig::new("IBM", THRESHOLD, LOTS),
        executor.clone(),
        Arc::new(RecordingPriceSource::new()),
    );
    subject.on_price("IBM", BELOW_THRESHOLD).unwrap();
    assert_eq!(executor.call_count(), 0);
    assert_eq!(subject.lifecycle(), Lifecycle::Idle);
}

#[test]
fn test_reconnects_after_explicit_disconnect() {
    let f = Fixture::connected();
    f.subject.disconnect().unwrap();
    f.subject.connect().unwrap();
    assert_eq!(f.source.add_count(), 2);

    f.publish(BELOW_THRESHOLD);
    assert_eq!(f.executor.call_count(), 1);
}

#[test]
fn test_fired_strategy_cannot_be_rearmed() {
    let f = Fixture::connected();
    f.publish(BELOW_THRESHOLD);

    f.subject.connect().unwrap();
    assert_eq!(f.source.add_count(), 1);
    assert_eq!(f.subject.lifecycle(), Lifecycle::Fired);

    f.publish(BELOW_THRESHOLD);
    assert_eq!(f.executor.call_count(), 1);

    f.subject.disconnect().unwrap();
    assert_eq!(f.subject.lifecycle(), Lifecycle::Fired);
}

#[test]
fn test_unvalidated_lots_are_submitted_as_is() {
    let executor = Arc::new(RecordingExecutionService::new());
    let source = Arc::new(RecordingPriceSource::new());
    let subject = TradingStrategy::new(
        StrategyConfig::new("IBM", THRESHOLD, 0),
        executor.clone(),
        source.clone(),
    );
    subject.connect().unwrap();
    source.publish("IBM", BELOW_THRESHOLD).unwrap();
    assert_eq!(executor.times_called_with("ibm", BELOW_THRESHOLD, 0), 1);
}

#[test]
fn test_failed_registration_leaves_strategy_idle() {
    let executor = Arc::new(RecordingExecutionService::new());
    let source = Arc::new(RecordingPriceSource::new());
    source.fail_on_add(true);
    let subject = TradingStrategy::new(
        StrategyConfig::new("IBM", THRESHOLD, LOTS),
        executor,
        source.clone(),
    );

    assert!(matches!(subject.connect(), Err(StrategyError::Feed(_))));
    assert_eq!(subject.lifecycle(), Lifecycle::Idle);

    source.fail_on_add(false);
    subject.connect().unwrap();
    assert!(subject.is_connected());
}

#[test]
fn test_execution_failure_propagates_without_retry() {
    let f = Fixture::connected();
    f.executor.fail_with("exchange offline");

    let err = f.subject.on_price("IBM", BELOW_THRESHOLD).unwrap_err();
    assert!(matches!(err, StrategyError::Execution(_)));
    assert!(err.to_string().contains("exchange offline"));
    assert!(f.subject.has_fired());

    f.subject.on_price("IBM", BELOW_THRESHOLD).unwrap();
    assert_eq!(f.executor.call_count(), 1);
}

#[test]
fn test_deregistration_failure_suppresses_buy() {
    let f = Fixture::connected();
    f.source.fail_on_remove(true);

    let err = f.subject.on_price("IBM", BELOW_THRESHOLD).unwrap_err();
    assert!(matches!(err, StrategyError::Feed(_)));
    assert!(f.subject.has_fired());
    assert_eq!(f.executor.call_count(), 0);
}
