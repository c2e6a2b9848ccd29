use crate::error::ValidationError;
use crate::failure::Failure;
use crate::signature::{Classification, Signature, describe};
use crate::step::Step;

/// Validate steps in registration order, stopping at the first error.
///
/// Each step is checked on its own, then its parameters are checked against
/// the outputs of the step before it.
pub(crate) fn validate_steps(steps: &[Box<dyn Step>]) -> Result<(), ValidationError> {
    let mut previous: Option<&dyn Step> = None;
    for step in steps {
        step.validate()?;
        if let Some(previous) = previous {
            validate_data_flow(previous, step.as_ref())?;
        }
        previous = Some(step.as_ref());
    }
    Ok(())
}

/// A compensation takes the failure, then exactly the step's parameters.
pub(crate) fn validate_compensation(
    step: &str,
    forward: &Signature,
    compensation: &Signature,
) -> Result<(), ValidationError> {
    let Some((first, inputs)) = compensation.params().split_first() else {
        return Err(ValidationError::MissingCompensationParameter {
            step: step.to_string(),
        });
    };

    if !first.is::<Failure>() {
        return Err(ValidationError::CompensationFirstArgNotFailure {
            step: step.to_string(),
            found: first.name(),
        });
    }

    let params = forward.params();
    if inputs.len() != params.len() {
        return Err(ValidationError::ArityMismatch {
            step: step.to_string(),
            expected: params.len(),
            found: inputs.len(),
        });
    }

    if let Some((position, (expected, found))) = params
        .iter()
        .zip(inputs)
        .enumerate()
        .find(|(_, (expected, found))| expected != found)
    {
        return Err(ValidationError::TypeMismatch {
            step: step.to_string(),
            position,
            expected: expected.name(),
            found: found.name(),
        });
    }

    Ok(())
}

/// A repeating step needs at least one attempt and a failure to retry on.
pub(crate) fn validate_retry(
    step: &str,
    max_attempts: u32,
    inner: Classification,
) -> Result<(), ValidationError> {
    if max_attempts == 0 {
        return Err(ValidationError::InvalidRetryCount {
            step: step.to_string(),
        });
    }
    if !inner.produces_failure() {
        return Err(ValidationError::RetryRequiresFailureSignal {
            step: step.to_string(),
        });
    }
    Ok(())
}

fn validate_data_flow(previous: &dyn Step, step: &dyn Step) -> Result<(), ValidationError> {
    let produced = previous.signature().outputs();
    let expected = step.signature().params();
    if produced == expected {
        Ok(())
    } else {
        Err(ValidationError::StepInputMismatch {
            step: step.name().to_string(),
            expected: describe(expected),
            found: describe(produced),
        })
    }
}
