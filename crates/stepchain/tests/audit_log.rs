//! Integration tests for the audit log of a chain execution.

use std::time::Duration;

use stepchain::{ChainBuilder, Failure, StepStatus};

#[derive(Debug, thiserror::Error)]
#[error("{0}")]
struct TestError(String);

#[test]
fn successful_execution_records_every_step() -> anyhow::Result<()> {
    let chain = ChainBuilder::new()
        .step("add_10", |value: i32| (value + 10,))
        .fallback_step("multiply", |value: i32| (value * 2,), |_: Failure, _: i32| ())
        .build()?;

    let (result, audit_log) = chain.execute_with_audit((5_i32,));

    assert_eq!(result?.into_tuple::<(i32,)>(), Some((30,)));
    let records = audit_log.records();
    assert_eq!(records.len(), 2);
    assert_eq!(records[0].name, "add_10");
    assert_eq!(records[0].status, StepStatus::Executed);
    assert_eq!(records[1].name, "multiply");
    assert_eq!(records[1].status, StepStatus::Executed);
    assert!(records.iter().all(|record| record.completed_at.is_some()));
    assert!(records.iter().all(|record| record.attempts == 1));
    Ok(())
}

#[test]
fn steps_after_failure_are_not_recorded() {
    let chain = ChainBuilder::new()
        .step("reserve", || ())
        .step("charge", || -> Result<(), TestError> {
            Err(TestError("declined".to_string()))
        })
        .step("ship", || ())
        .build()
        .expect("chain is valid");

    let (result, audit_log) = chain.execute_with_audit(());

    assert!(result.is_err());
    let names: Vec<_> = audit_log
        .records()
        .iter()
        .map(|record| record.name.as_str())
        .collect();
    assert_eq!(names, vec!["reserve", "charge"]);
    assert_eq!(audit_log.summary(), "✓ reserve\n✗ charge");
}

#[test]
fn repeating_step_records_attempts() {
    let chain = ChainBuilder::new()
        .repeating_fallback_step(
            "charge",
            || -> Result<(), TestError> { Err(TestError("busy".to_string())) },
            |_: Failure| (),
            3,
            Duration::ZERO,
        )
        .build()
        .expect("chain is valid");

    let (result, audit_log) = chain.execute_with_audit(());

    assert!(result.is_err());
    let record = &audit_log.records()[0];
    assert_eq!(record.attempts, 3);
    assert_eq!(record.status, StepStatus::Compensated);
    assert_eq!(audit_log.summary(), "↩ charge");
}
