use std::cell::Cell;
use std::thread;
use std::time::Duration;

use crate::dispatch::{Callable, dispatch};
use crate::error::ValidationError;
use crate::failure::Failure;
use crate::logger::{ChainEvent, Logger};
use crate::signature::{Classification, Signature, classify};
use crate::validate::{validate_compensation, validate_retry};
use crate::values::Values;

/// Per-call state handed to a step by the executor.
pub(crate) struct StepContext<'a> {
    pub(crate) chain: &'a str,
    pub(crate) logger: &'a dyn Logger,
    attempts: Cell<u32>,
}

impl<'a> StepContext<'a> {
    pub(crate) fn new(chain: &'a str, logger: &'a dyn Logger) -> Self {
        Self {
            chain,
            logger,
            attempts: Cell::new(0),
        }
    }

    /// Number of times a step function was called through this context.
    pub(crate) fn attempts(&self) -> u32 {
        self.attempts.get()
    }

    fn count_attempt(&self) {
        self.attempts.set(self.attempts.get() + 1);
    }
}

/// One unit of work in a chain.
pub(crate) trait Step: Send + Sync {
    fn name(&self) -> &str;

    fn signature(&self) -> &Signature;

    fn classification(&self) -> Classification;

    fn call(&self, ctx: &StepContext<'_>, input: Values) -> Result<Values, Failure>;

    fn validate(&self) -> Result<(), ValidationError> {
        Ok(())
    }

    /// The rollback for this step, if it has one.
    fn compensation(&self) -> Option<&Compensation> {
        None
    }
}

/// A rollback function and its cached classification.
pub(crate) struct Compensation {
    callable: Callable,
    classification: Classification,
}

impl Compensation {
    pub(crate) fn new(callable: Callable) -> Self {
        let classification = classify(callable.signature());
        Self {
            callable,
            classification,
        }
    }

    pub(crate) fn signature(&self) -> &Signature {
        self.callable.signature()
    }

    /// Run the rollback with the triggering failure and the step's recorded input.
    pub(crate) fn invoke(&self, step: &str, failure: &Failure, input: Values) -> Result<(), Failure> {
        dispatch(
            step,
            &self.callable,
            self.classification,
            input.prepend(failure.clone()),
        )
        .map(drop)
    }
}

pub(crate) struct BasicStep {
    name: String,
    callable: Callable,
    classification: Classification,
}

impl BasicStep {
    pub(crate) fn new(name: String, callable: Callable) -> Self {
        let classification = classify(callable.signature());
        Self {
            name,
            callable,
            classification,
        }
    }
}

impl Step for BasicStep {
    fn name(&self) -> &str {
        &self.name
    }

    fn signature(&self) -> &Signature {
        self.callable.signature()
    }

    fn classification(&self) -> Classification {
        self.classification
    }

    fn call(&self, ctx: &StepContext<'_>, input: Values) -> Result<Values, Failure> {
        ctx.count_attempt();
        dispatch(&self.name, &self.callable, self.classification, input)
    }
}

pub(crate) struct CompensatingStep {
    step: BasicStep,
    compensation: Compensation,
}

impl CompensatingStep {
    pub(crate) fn new(step: BasicStep, compensation: Callable) -> Self {
        Self {
            step,
            compensation: Compensation::new(compensation),
        }
    }
}

impl Step for CompensatingStep {
    fn name(&self) -> &str {
        self.step.name()
    }

    fn signature(&self) -> &Signature {
        self.step.signature()
    }

    fn classification(&self) -> Classification {
        self.step.classification()
    }

    fn call(&self, ctx: &StepContext<'_>, input: Values) -> Result<Values, Failure> {
        self.step.call(ctx, input)
    }

    fn validate(&self) -> Result<(), ValidationError> {
        validate_compensation(
            self.name(),
            self.step.signature(),
            self.compensation.signature(),
        )
    }

    fn compensation(&self) -> Option<&Compensation> {
        Some(&self.compensation)
    }
}

/// Repeats the inner step until it succeeds or runs out of attempts.
pub(crate) struct RetryingStep {
    inner: Box<dyn Step>,
    max_attempts: u32,
    interval: Duration,
}

impl RetryingStep {
    pub(crate) fn new(inner: Box<dyn Step>, max_attempts: u32, interval: Duration) -> Self {
        Self {
            inner,
            max_attempts,
            interval,
        }
    }
}

impl Step for RetryingStep {
    fn name(&self) -> &str {
        self.inner.name()
    }

    fn signature(&self) -> &Signature {
        self.inner.signature()
    }

    fn classification(&self) -> Classification {
        self.inner.classification()
    }

    fn call(&self, ctx: &StepContext<'_>, input: Values) -> Result<Values, Failure> {
        let mut attempt = 1;
        loop {
            match self.inner.call(ctx, input.clone()) {
                Ok(output) => return Ok(output),
                Err(failure) if attempt >= self.max_attempts => return Err(failure),
                Err(failure) => {
                    ctx.logger.log(&ChainEvent::RetryScheduled {
                        chain: ctx.chain,
                        step: self.name(),
                        attempt,
                        max_attempts: self.max_attempts,
                        interval: self.interval,
                        failure: &failure,
                    });
                    thread::sleep(self.interval);
                    attempt += 1;
                }
            }
        }
    }

    fn validate(&self) -> Result<(), ValidationError> {
        validate_retry(
            self.name(),
            self.max_attempts,
            self.inner.classification(),
        )?;
        self.inner.validate()
    }

    fn compensation(&self) -> Option<&Compensation> {
        self.inner.compensation()
    }
}
