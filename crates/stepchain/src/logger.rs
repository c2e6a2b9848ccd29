use std::fmt;
use std::time::Duration;

use tracing::{debug, error, warn};

use crate::failure::Failure;

/// Something that happened while a chain was executing.
#[derive(Debug, Clone, Copy)]
#[non_exhaustive]
pub enum ChainEvent<'a> {
    /// A step is about to be called.
    StepStarted {
        /// Name of the chain.
        chain: &'a str,
        /// Name of the step.
        step: &'a str,
    },
    /// A step returned, successfully or not.
    StepFinished {
        /// Name of the chain.
        chain: &'a str,
        /// Name of the step.
        step: &'a str,
        /// Time spent in the step, including retries.
        elapsed: Duration,
    },
    /// A step failed and the chain is rolling back.
    StepFailed {
        /// Name of the chain.
        chain: &'a str,
        /// Name of the step.
        step: &'a str,
        /// The failure that stopped the chain.
        failure: &'a Failure,
    },
    /// A repeating step failed and will be attempted again.
    RetryScheduled {
        /// Name of the chain.
        chain: &'a str,
        /// Name of the step.
        step: &'a str,
        /// The attempt that failed, starting at 1.
        attempt: u32,
        /// Maximum number of attempts.
        max_attempts: u32,
        /// Delay before the next attempt.
        interval: Duration,
        /// The failure of this attempt.
        failure: &'a Failure,
    },
    /// A step's compensation ran successfully.
    Compensated {
        /// Name of the chain.
        chain: &'a str,
        /// Name of the step.
        step: &'a str,
    },
    /// A step's compensation failed or panicked.
    CompensationFailed {
        /// Name of the chain.
        chain: &'a str,
        /// Name of the step.
        step: &'a str,
        /// The compensation's own failure.
        failure: &'a Failure,
    },
}

impl ChainEvent<'_> {
    /// Name of the chain that emitted the event.
    #[must_use]
    pub fn chain(&self) -> &str {
        match self {
            Self::StepStarted { chain, .. }
            | Self::StepFinished { chain, .. }
            | Self::StepFailed { chain, .. }
            | Self::RetryScheduled { chain, .. }
            | Self::Compensated { chain, .. }
            | Self::CompensationFailed { chain, .. } => chain,
        }
    }

    /// Name of the step the event is about.
    #[must_use]
    pub fn step(&self) -> &str {
        match self {
            Self::StepStarted { step, .. }
            | Self::StepFinished { step, .. }
            | Self::StepFailed { step, .. }
            | Self::RetryScheduled { step, .. }
            | Self::Compensated { step, .. }
            | Self::CompensationFailed { step, .. } => step,
        }
    }
}

impl fmt::Display for ChainEvent<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] -> [{}] ", self.chain(), self.step())?;
        match self {
            Self::StepStarted { .. } => f.write_str("calling"),
            Self::StepFinished { elapsed, .. } => write!(f, "took {elapsed:?}"),
            Self::StepFailed { failure, .. } => {
                write!(f, "failed, rolling back: {failure}")
            }
            Self::RetryScheduled {
                attempt,
                max_attempts,
                interval,
                failure,
                ..
            } => write!(
                f,
                "attempt {attempt} of {max_attempts} failed, retrying in {interval:?}: {failure}"
            ),
            Self::Compensated { .. } => f.write_str("rolled back"),
            Self::CompensationFailed { failure, .. } => {
                write!(f, "rollback failed: {failure}")
            }
        }
    }
}

/// Receives the events of a chain's executions.
///
/// Any `Fn(&ChainEvent)` closure is a logger.
pub trait Logger: Send + Sync {
    /// Handle one event.
    fn log(&self, event: &ChainEvent<'_>);
}

impl<F> Logger for F
where
    F: Fn(&ChainEvent<'_>) + Send + Sync,
{
    fn log(&self, event: &ChainEvent<'_>) {
        self(event);
    }
}

/// Logger that emits `tracing` events. Used when no logger is configured.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingLogger;

impl Logger for TracingLogger {
    fn log(&self, event: &ChainEvent<'_>) {
        match *event {
            ChainEvent::StepStarted { chain, step } => {
                debug!(chain, step, "calling step");
            }
            ChainEvent::StepFinished {
                chain,
                step,
                elapsed,
            } => {
                debug!(chain, step, ?elapsed, "step finished");
            }
            ChainEvent::StepFailed {
                chain,
                step,
                failure,
            } => {
                warn!(chain, step, %failure, "step failed, rolling back");
            }
            ChainEvent::RetryScheduled {
                chain,
                step,
                attempt,
                max_attempts,
                interval,
                failure,
            } => {
                warn!(
                    chain,
                    step,
                    attempt,
                    max_attempts,
                    ?interval,
                    %failure,
                    "step attempt failed, retrying"
                );
            }
            ChainEvent::Compensated { chain, step } => {
                debug!(chain, step, "step rolled back");
            }
            ChainEvent::CompensationFailed {
                chain,
                step,
                failure,
            } => {
                error!(chain, step, %failure, "step rollback failed");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use super::*;

    #[test]
    fn display_prefixes_chain_and_step() {
        let event = ChainEvent::StepStarted {
            chain: "order",
            step: "reserve",
        };

        assert_eq!(event.to_string(), "[order] -> [reserve] calling");
    }

    #[test]
    fn display_includes_failure() {
        let failure = Failure::msg("declined");
        let event = ChainEvent::StepFailed {
            chain: "order",
            step: "charge",
            failure: &failure,
        };

        assert_eq!(
            event.to_string(),
            "[order] -> [charge] failed, rolling back: declined"
        );
    }

    #[test]
    fn display_retry_includes_attempt_counts() {
        let failure = Failure::msg("busy");
        let event = ChainEvent::RetryScheduled {
            chain: "order",
            step: "ship",
            attempt: 1,
            max_attempts: 3,
            interval: Duration::from_millis(5),
            failure: &failure,
        };

        assert!(event.to_string().contains("attempt 1 of 3 failed"));
    }

    #[test]
    fn closure_is_a_logger() {
        let lines = Mutex::new(Vec::new());
        let logger = |event: &ChainEvent<'_>| {
            lines
                .lock()
                .expect("lock poisoned")
                .push(event.step().to_string());
        };

        logger.log(&ChainEvent::Compensated {
            chain: "order",
            step: "charge",
        });

        assert_eq!(*lines.lock().expect("lock poisoned"), vec!["charge"]);
    }

    #[test]
    fn tracing_logger_accepts_every_event() {
        let failure = Failure::msg("boom");
        let logger = TracingLogger;

        logger.log(&ChainEvent::StepStarted {
            chain: "c",
            step: "s",
        });
        logger.log(&ChainEvent::StepFinished {
            chain: "c",
            step: "s",
            elapsed: Duration::ZERO,
        });
        logger.log(&ChainEvent::CompensationFailed {
            chain: "c",
            step: "s",
            failure: &failure,
        });
    }
}
