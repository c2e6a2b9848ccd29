use thiserror::Error;

/// Error from building a chain.
///
/// Building stops at the first invalid step, in registration order.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[non_exhaustive]
pub enum ValidationError {
    /// The compensation declares no parameters, so it cannot receive the failure.
    #[error("step '{step}': compensation must take the failure as its first parameter")]
    MissingCompensationParameter {
        /// Name of the invalid step.
        step: String,
    },

    /// The compensation's first parameter is not a `Failure`.
    #[error("step '{step}': compensation's first parameter must be `Failure`, found `{found}`")]
    CompensationFirstArgNotFailure {
        /// Name of the invalid step.
        step: String,
        /// Type of the compensation's first parameter.
        found: &'static str,
    },

    /// The compensation does not take the same number of inputs as the step.
    #[error(
        "step '{step}': compensation takes {found} input(s) after the failure, the step takes {expected}"
    )]
    ArityMismatch {
        /// Name of the invalid step.
        step: String,
        /// Number of parameters of the step function.
        expected: usize,
        /// Number of compensation parameters after the failure.
        found: usize,
    },

    /// A compensation input differs in type from the step's parameter.
    #[error(
        "step '{step}': compensation input {position} is `{found}`, the step parameter is `{expected}`"
    )]
    TypeMismatch {
        /// Name of the invalid step.
        step: String,
        /// Zero-based position among the step's parameters.
        position: usize,
        /// Type of the step parameter.
        expected: &'static str,
        /// Type of the compensation parameter.
        found: &'static str,
    },

    /// A repeating step wraps a function that cannot report failure.
    #[error("step '{step}' cannot be repeated: its function does not return a `Result`")]
    RetryRequiresFailureSignal {
        /// Name of the invalid step.
        step: String,
    },

    /// A repeating step allows zero attempts.
    #[error("step '{step}' must allow at least one attempt")]
    InvalidRetryCount {
        /// Name of the invalid step.
        step: String,
    },

    /// A step's parameters do not match the previous step's outputs.
    #[error("step '{step}' takes ({expected}) but the previous step produces ({found})")]
    StepInputMismatch {
        /// Name of the invalid step.
        step: String,
        /// The step's parameter types.
        expected: String,
        /// The previous step's output types.
        found: String,
    },
}

impl ValidationError {
    /// Name of the step that failed validation.
    #[must_use]
    pub fn step(&self) -> &str {
        match self {
            Self::MissingCompensationParameter { step }
            | Self::CompensationFirstArgNotFailure { step, .. }
            | Self::ArityMismatch { step, .. }
            | Self::TypeMismatch { step, .. }
            | Self::RetryRequiresFailureSignal { step }
            | Self::InvalidRetryCount { step }
            | Self::StepInputMismatch { step, .. } => step,
        }
    }
}

/// Failures synthesized by the chain itself rather than returned by a step.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[non_exhaustive]
pub enum ExecutionError {
    /// The step panicked with a payload that is not a `Failure`.
    #[error("step '{step}' failed: {message}")]
    StepFailed {
        /// Name of the step that panicked.
        step: String,
        /// Panic message, when the payload was a string.
        message: String,
    },

    /// The values given to a step do not match its parameters.
    #[error("step '{step}' takes ({expected}) but received ({found})")]
    ArgumentMismatch {
        /// Name of the step.
        step: String,
        /// The step's parameter types.
        expected: String,
        /// Types of the values received.
        found: String,
    },
}
