//! Integration tests for typed data flow between chain steps.

use std::sync::{Arc, Mutex};

use stepchain::{ChainBuilder, ExecutionError, Failure, Values};

#[derive(Debug, thiserror::Error)]
#[error("{0}")]
struct TestError(String);

#[test]
fn single_step_chain_returns_correct_output() -> anyhow::Result<()> {
    let chain = ChainBuilder::new()
        .step("only", |input: String| (input,))
        .build()?;

    let output = chain.execute(("hello".to_string(),))?;

    assert_eq!(output.into_tuple::<(String,)>(), Some(("hello".to_string(),)));
    Ok(())
}

#[test]
fn outputs_are_the_composition_of_all_steps() -> anyhow::Result<()> {
    let chain = ChainBuilder::new()
        .step("add_10", |value: i32| (value + 10,))
        .step("multiply", |value: i32| (value * 3,))
        .step("add_5", |value: i32| (value + 5,))
        .build()?;

    let output = chain.execute((5_i32,))?;

    assert_eq!(output.into_tuple::<(i32,)>(), Some((50,)));
    Ok(())
}

#[test]
fn values_change_type_and_arity_between_steps() -> anyhow::Result<()> {
    let chain = ChainBuilder::new()
        .step("parse", |raw: String| -> Result<(i64,), TestError> {
            raw.parse::<i64>()
                .map(|value| (value,))
                .map_err(|err| TestError(err.to_string()))
        })
        .step("split", |value: i64| (value / 10, value % 10, value < 0))
        .step("render", |tens: i64, ones: i64, negative: bool| {
            (format!("{tens}|{ones}|{negative}"),)
        })
        .build()?;

    let output = chain.execute(("42".to_string(),))?;

    assert_eq!(output.get::<String>(0).map(String::as_str), Some("4|2|false"));
    Ok(())
}

#[test]
fn failure_slot_error_stops_the_chain() {
    let chain = ChainBuilder::new()
        .step("parse", |raw: String| -> Result<(i64,), TestError> {
            raw.parse::<i64>()
                .map(|value| (value,))
                .map_err(|err| TestError(err.to_string()))
        })
        .step("double", |value: i64| (value * 2,))
        .build()
        .expect("chain is valid");

    let failure = chain
        .execute(("not a number".to_string(),))
        .expect_err("parse fails");

    assert!(failure.is::<TestError>());
}

#[test]
fn failure_can_be_returned_directly() {
    let chain = ChainBuilder::new()
        .step("check", |value: u8| -> Result<(u8,), Failure> {
            if value > 100 {
                Err(Failure::msg("too large"))
            } else {
                Ok((value,))
            }
        })
        .build()
        .expect("chain is valid");

    assert!(chain.execute((7_u8,)).is_ok());
    assert_eq!(
        chain
            .execute((200_u8,))
            .expect_err("value is too large")
            .to_string(),
        "too large"
    );
}

#[test]
fn arguments_can_be_passed_as_values() -> anyhow::Result<()> {
    let chain = ChainBuilder::new()
        .step("sum", |a: u16, b: u16| (a + b,))
        .build()?;
    let mut args = Values::new();
    args.push(2_u16);
    args.push(3_u16);

    let output = chain.execute(args)?;

    assert_eq!(output.get::<u16>(0), Some(&5));
    Ok(())
}

#[test]
fn mismatched_arguments_are_reported() {
    let chain = ChainBuilder::new()
        .step("sum", |a: u16, b: u16| (a + b,))
        .build()
        .expect("chain is valid");

    let failure = chain.execute((2_u16,)).expect_err("second argument missing");

    assert_eq!(
        failure.downcast_ref::<ExecutionError>(),
        Some(&ExecutionError::ArgumentMismatch {
            step: "sum".to_string(),
            expected: "u16, u16".to_string(),
            found: "u16".to_string(),
        })
    );
}

#[test]
fn each_step_receives_previous_output() -> anyhow::Result<()> {
    let log = Arc::new(Mutex::new(Vec::new()));
    let (first, second) = (Arc::clone(&log), Arc::clone(&log));

    let chain = ChainBuilder::new()
        .step("first", move |input: String| {
            first
                .lock()
                .expect("lock poisoned")
                .push(format!("first: received '{input}'"));
            (format!("{input}!"),)
        })
        .step("second", move |input: String| {
            second
                .lock()
                .expect("lock poisoned")
                .push(format!("second: received '{input}'"));
        })
        .build()?;

    let output = chain.execute(("hi".to_string(),))?;

    assert!(output.is_empty());
    assert_eq!(
        *log.lock().expect("lock poisoned"),
        vec!["first: received 'hi'", "second: received 'hi!'"]
    );
    Ok(())
}

#[test]
fn chain_exposes_step_signatures() -> anyhow::Result<()> {
    let chain = ChainBuilder::new()
        .name("pipeline")
        .step("parse", |_: String| -> Result<(i64,), TestError> { Ok((1,)) })
        .step("print", |_: i64| ())
        .build()?;

    let signatures: Vec<_> = chain.step_signatures().collect();

    assert_eq!(chain.name(), "pipeline");
    assert_eq!(chain.len(), 2);
    assert_eq!(signatures[0].0, "parse");
    assert!(stepchain::classify(signatures[0].1).produces_failure());
    assert_eq!(signatures[0].1.outputs().len(), 1);
    assert!(!stepchain::classify(signatures[1].1).produces_failure());
    assert_eq!(
        chain.step_names().collect::<Vec<_>>(),
        vec!["parse", "print"]
    );
    Ok(())
}
