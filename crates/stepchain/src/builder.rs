use std::time::Duration;

use crate::chain::Chain;
use crate::config::Configuration;
use crate::dispatch::StepFn;
use crate::error::ValidationError;
use crate::logger::Logger;
use crate::step::{BasicStep, CompensatingStep, RetryingStep, Step};
use crate::validate::validate_steps;

/// Builder for a [`Chain`].
///
/// Each registration captures the function's signature and classifies
/// whether it can fail. Compatibility of compensations, retry settings and
/// the data flow between steps is checked once, in [`ChainBuilder::build`].
///
/// ```
/// use stepchain::{ChainBuilder, Failure};
///
/// let chain = ChainBuilder::new()
///     .name("order")
///     .step("reserve", |sku: String| (sku, 2_u32))
///     .fallback_step(
///         "charge",
///         |sku: String, quantity: u32| -> Result<(String,), Failure> { Ok((format!("{sku}x{quantity}"),)) },
///         |_: Failure, _: String, _: u32| (),
///     )
///     .build()
///     .expect("steps are compatible");
///
/// let output = chain.execute(("book".to_string(),)).expect("no step fails");
/// assert_eq!(output.into_tuple::<(String,)>(), Some(("bookx2".to_string(),)));
/// ```
#[derive(Default)]
pub struct ChainBuilder {
    configuration: Configuration,
    steps: Vec<Box<dyn Step>>,
}

impl ChainBuilder {
    /// Create a builder with the default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a builder with the given configuration.
    #[must_use]
    pub fn with_configuration(configuration: Configuration) -> Self {
        Self {
            configuration,
            steps: Vec::new(),
        }
    }

    /// Set the chain's display name.
    #[must_use]
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.configuration.name = name.into();
        self
    }

    /// Set the chain's logger.
    #[must_use]
    pub fn logger(mut self, logger: impl Logger + 'static) -> Self {
        self.configuration = self.configuration.with_logger(logger);
        self
    }

    /// Add a step whose outputs feed the next step.
    #[must_use]
    pub fn step<F, Args>(self, name: impl Into<String>, function: F) -> Self
    where
        F: StepFn<Args>,
    {
        let step = BasicStep::new(name.into(), function.into_callable());
        self.push(step)
    }

    /// Add a step with a compensation.
    ///
    /// If this step or any later step fails, `compensation` is called with
    /// the failure followed by the inputs this step originally received.
    #[must_use]
    pub fn fallback_step<F, Args, C, CArgs>(
        self,
        name: impl Into<String>,
        function: F,
        compensation: C,
    ) -> Self
    where
        F: StepFn<Args>,
        C: StepFn<CArgs>,
    {
        let step = BasicStep::new(name.into(), function.into_callable());
        self.push(CompensatingStep::new(step, compensation.into_callable()))
    }

    /// Add a step that is called up to `max_attempts` times, waiting
    /// `interval` after each failed attempt, until it succeeds.
    #[must_use]
    pub fn repeating_step<F, Args>(
        self,
        name: impl Into<String>,
        function: F,
        max_attempts: u32,
        interval: Duration,
    ) -> Self
    where
        F: StepFn<Args>,
    {
        let step = BasicStep::new(name.into(), function.into_callable());
        self.push(RetryingStep::new(Box::new(step), max_attempts, interval))
    }

    /// Add a repeating step with a compensation.
    ///
    /// The compensation runs at most once during rollback, regardless of how
    /// many attempts were made.
    #[must_use]
    pub fn repeating_fallback_step<F, Args, C, CArgs>(
        self,
        name: impl Into<String>,
        function: F,
        compensation: C,
        max_attempts: u32,
        interval: Duration,
    ) -> Self
    where
        F: StepFn<Args>,
        C: StepFn<CArgs>,
    {
        let step = BasicStep::new(name.into(), function.into_callable());
        let step = CompensatingStep::new(step, compensation.into_callable());
        self.push(RetryingStep::new(Box::new(step), max_attempts, interval))
    }

    fn push(mut self, step: impl Step + 'static) -> Self {
        self.steps.push(Box::new(step));
        self
    }

    /// Validate the steps and build the chain.
    ///
    /// # Errors
    ///
    /// Returns the first [`ValidationError`] found, in registration order.
    pub fn build(self) -> Result<Chain, ValidationError> {
        validate_steps(&self.steps)?;
        let (name, logger) = self.configuration.resolve();
        Ok(Chain::new(name, self.steps, logger))
    }
}
