use std::fmt;
use std::sync::Arc;
use std::time::Instant;

use crate::audit::ChainAuditLog;
use crate::failure::Failure;
use crate::logger::{ChainEvent, Logger};
use crate::signature::Signature;
use crate::step::{Step, StepContext};
use crate::values::{IntoValues, Values};

/// A built chain ready for execution.
///
/// Steps run in order, each step's outputs becoming the next step's
/// arguments. If a step fails, the compensations of that step and every
/// earlier step are called in reverse order with the failure and the inputs
/// each step originally received, then the failure is returned.
///
/// A chain is immutable and can be executed any number of times, including
/// from several threads at once.
pub struct Chain {
    name: String,
    steps: Vec<Box<dyn Step>>,
    logger: Arc<dyn Logger>,
}

impl Chain {
    pub(crate) fn new(name: String, steps: Vec<Box<dyn Step>>, logger: Arc<dyn Logger>) -> Self {
        Self {
            name,
            steps,
            logger,
        }
    }

    /// Display name used in log events.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Number of steps.
    #[must_use]
    pub fn len(&self) -> usize {
        self.steps.len()
    }

    /// Returns `true` if the chain has no steps.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Step names in execution order.
    pub fn step_names(&self) -> impl Iterator<Item = &str> {
        self.steps.iter().map(|step| step.name())
    }

    /// Name and signature of each step, in execution order.
    pub fn step_signatures(&self) -> impl Iterator<Item = (&str, &Signature)> {
        self.steps.iter().map(|step| (step.name(), step.signature()))
    }

    /// Execute the chain, returning the last step's outputs on success.
    ///
    /// An empty chain returns `args` unchanged.
    ///
    /// # Errors
    ///
    /// Returns the failure of the first step that fails, after rolling back.
    /// Failures of compensations are logged, never returned.
    pub fn execute<A: IntoValues>(&self, args: A) -> Result<Values, Failure> {
        let (result, _audit_log) = self.execute_internal(args.into_values());
        result
    }

    /// Execute the chain and return both the result and an audit log.
    pub fn execute_with_audit<A: IntoValues>(
        &self,
        args: A,
    ) -> (Result<Values, Failure>, ChainAuditLog) {
        self.execute_internal(args.into_values())
    }

    fn execute_internal(&self, input: Values) -> (Result<Values, Failure>, ChainAuditLog) {
        let mut audit_log = ChainAuditLog::new();
        let mut frame: Vec<Values> = Vec::with_capacity(self.steps.len());
        let mut current_input = input;

        for step in &self.steps {
            audit_log.record_start(step.name());
            frame.push(current_input.clone());

            let ctx = StepContext::new(&self.name, self.logger.as_ref());
            self.emit(&ChainEvent::StepStarted {
                chain: &self.name,
                step: step.name(),
            });
            let started = Instant::now();
            let result = step.call(&ctx, current_input);
            self.emit(&ChainEvent::StepFinished {
                chain: &self.name,
                step: step.name(),
                elapsed: started.elapsed(),
            });

            match result {
                Ok(output) => {
                    audit_log.record_success(ctx.attempts());
                    current_input = output;
                }
                Err(failure) => {
                    audit_log.record_failure(ctx.attempts());
                    self.emit(&ChainEvent::StepFailed {
                        chain: &self.name,
                        step: step.name(),
                        failure: &failure,
                    });
                    self.roll_back(frame, &failure, &mut audit_log);
                    return (Err(failure), audit_log);
                }
            }
        }

        (Ok(current_input), audit_log)
    }

    /// Compensate every recorded position, most recent first.
    fn roll_back(&self, mut frame: Vec<Values>, failure: &Failure, audit_log: &mut ChainAuditLog) {
        while let Some(input) = frame.pop() {
            let position = frame.len();
            let step = &self.steps[position];
            let Some(compensation) = step.compensation() else {
                continue;
            };

            match compensation.invoke(step.name(), failure, input) {
                Ok(()) => {
                    audit_log.record_compensated(position);
                    self.emit(&ChainEvent::Compensated {
                        chain: &self.name,
                        step: step.name(),
                    });
                }
                Err(compensation_failure) => {
                    audit_log.record_compensation_failed(position);
                    self.emit(&ChainEvent::CompensationFailed {
                        chain: &self.name,
                        step: step.name(),
                        failure: &compensation_failure,
                    });
                }
            }
        }
    }

    fn emit(&self, event: &ChainEvent<'_>) {
        self.logger.log(event);
    }
}

impl fmt::Debug for Chain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Chain")
            .field("name", &self.name)
            .field("steps", &self.step_names().collect::<Vec<_>>())
            .finish_non_exhaustive()
    }
}
