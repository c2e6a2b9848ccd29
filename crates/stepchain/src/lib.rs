//! Transactional step chains.
//!
//! A chain runs an ordered list of plain functions, feeding each function's
//! outputs to the next one. Steps may register a compensation; when a step
//! fails, the compensations of that step and all earlier steps run in
//! reverse order with the failure and the inputs each step originally
//! received (the saga pattern, in process). Steps may also be repeated a
//! bounded number of times before their failure stops the chain.
//!
//! Function signatures are captured when a step is registered and checked
//! once when the chain is built.

mod audit;
mod builder;
mod chain;
mod cloneable;
mod config;
mod dispatch;
mod error;
mod failure;
mod logger;
mod signature;
mod step;
mod validate;
mod values;

pub use audit::{ChainAuditLog, StepRecord, StepStatus};
pub use builder::ChainBuilder;
pub use chain::Chain;
pub use config::{Configuration, DEFAULT_CHAIN_NAME};
#[doc(hidden)]
pub use dispatch::Callable;
pub use dispatch::StepFn;
pub use error::{ExecutionError, ValidationError};
pub use failure::Failure;
pub use logger::{ChainEvent, Logger, TracingLogger};
#[doc(hidden)]
pub use signature::Returns;
pub use signature::{Classification, Signature, StepReturn, TypeInfo, classify};
pub use values::{FromValues, IntoValues, Values};
