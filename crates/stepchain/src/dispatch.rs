use std::any::Any;
use std::panic::{self, AssertUnwindSafe};

use crate::error::ExecutionError;
use crate::failure::Failure;
use crate::signature::{Classification, Returns, Signature, StepReturn, TypeInfo, describe};
use crate::values::{Values, take};

type Invoke = dyn Fn(Values) -> Option<Returns> + Send + Sync;

/// A type-erased function together with its signature.
pub struct Callable {
    signature: Signature,
    invoke: Box<Invoke>,
}

impl Callable {
    fn new<F>(signature: Signature, invoke: F) -> Self
    where
        F: Fn(Values) -> Option<Returns> + Send + Sync + 'static,
    {
        Self {
            signature,
            invoke: Box::new(invoke),
        }
    }

    pub(crate) fn signature(&self) -> &Signature {
        &self.signature
    }
}

/// Functions usable as steps and compensations.
///
/// Implemented for every `Fn(A₁, …, Aₙ) -> R` with up to eight parameters,
/// where each parameter is `Clone + Send + 'static` and `R` is a
/// [`StepReturn`]. `Args` is the parameter tuple and only guides inference.
pub trait StepFn<Args>: Send + Sync + 'static {
    #[doc(hidden)]
    fn into_callable(self) -> Callable;
}

macro_rules! impl_step_fn {
    ($($param:ident),*) => {
        impl<Func, Ret, $($param,)*> StepFn<($($param,)*)> for Func
        where
            Func: Fn($($param),*) -> Ret + Send + Sync + 'static,
            Ret: StepReturn,
            $($param: Clone + Send + 'static,)*
        {
            #[allow(non_snake_case, unused_mut, unused_variables)]
            fn into_callable(self) -> Callable {
                let signature = Signature::new(vec![$(TypeInfo::of::<$param>()),*], Ret::returns());
                Callable::new(signature, move |values: Values| {
                    let mut items = values.into_items();
                    $(let $param = take::<$param>(&mut items)?;)*
                    Some((self)($($param),*).into_returns())
                })
            }
        }
    };
}

impl_step_fn!();
impl_step_fn!(A);
impl_step_fn!(A, B);
impl_step_fn!(A, B, C);
impl_step_fn!(A, B, C, D);
impl_step_fn!(A, B, C, D, E);
impl_step_fn!(A, B, C, D, E, F);
impl_step_fn!(A, B, C, D, E, F, G);
impl_step_fn!(A, B, C, D, E, F, G, H);

/// Call `callable` with `values` on behalf of the step named `step`.
///
/// Panics inside the call become failures: a `Failure` payload is returned
/// as is, anything else becomes [`ExecutionError::StepFailed`]. When the
/// function is classified as producing failure and its failure slot is set,
/// that failure is returned and the other outputs are dropped.
pub(crate) fn dispatch(
    step: &str,
    callable: &Callable,
    classification: Classification,
    values: Values,
) -> Result<Values, Failure> {
    check_arguments(step, callable.signature(), &values)?;

    let outcome = panic::catch_unwind(AssertUnwindSafe(|| (callable.invoke)(values)));

    let returns = match outcome {
        Ok(Some(returns)) => returns,
        Ok(None) => {
            return Err(Failure::new(ExecutionError::ArgumentMismatch {
                step: step.to_string(),
                expected: describe(callable.signature().params()),
                found: "incompatible values".to_string(),
            }));
        }
        Err(payload) => return Err(failure_from_panic(step, payload)),
    };

    match returns.failure {
        Some(failure) if classification.produces_failure() => Err(failure),
        _ => Ok(returns.values),
    }
}

fn check_arguments(step: &str, signature: &Signature, values: &Values) -> Result<(), Failure> {
    let params = signature.params();
    let matches = params.len() == values.len()
        && params
            .iter()
            .zip(values.type_ids())
            .all(|(param, id)| param.id() == id);

    if matches {
        Ok(())
    } else {
        Err(Failure::new(ExecutionError::ArgumentMismatch {
            step: step.to_string(),
            expected: describe(params),
            found: values.type_names(),
        }))
    }
}

fn failure_from_panic(step: &str, payload: Box<dyn Any + Send>) -> Failure {
    match payload.downcast::<Failure>() {
        Ok(failure) => *failure,
        Err(payload) => Failure::new(ExecutionError::StepFailed {
            step: step.to_string(),
            message: panic_message(payload.as_ref()),
        }),
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}
