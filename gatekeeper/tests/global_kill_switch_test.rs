//! The process-wide pipeline lives in a static, so this file holds a single
//! test to keep ordering deterministic.

use gatekeeper::global;
use gatekeeper::report::STATUS_DISABLED;
use gatekeeper::{BreakerState, ContentRecord};

#[test]
fn test_kill_switch_thrown_before_first_use() {
    assert!(!global::is_force_disabled());
    global::force_disable();
    assert!(global::is_force_disabled());

    let pipeline = global::pipeline();
    assert!(!pipeline.is_enabled());
    let breaker = pipeline.breaker();
    assert_eq!(breaker.state, BreakerState::Open);
    assert!(breaker.forced);

    let record = global::validate(ContentRecord {
        url: Some("test://global".into()),
        ..Default::default()
    });
    let report = record.validation.unwrap();
    assert_eq!(report.status, STATUS_DISABLED);
    assert!(report.results.is_empty());

    // Resetting the breaker does not undo the kill switch.
    pipeline.reset_breaker();
    assert!(!global::pipeline().should_run("test://global"));
}
