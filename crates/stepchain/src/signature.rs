//! Type descriptors captured from step functions at registration.

use std::any::{TypeId, type_name};
use std::error::Error as StdError;
use std::fmt;

use crate::failure::Failure;
use crate::values::Values;

/// Runtime descriptor of a parameter or return type.
///
/// Equality compares the type only.
#[derive(Clone, Copy)]
pub struct TypeInfo {
    id: TypeId,
    name: &'static str,
    failure_slot: bool,
}

impl TypeInfo {
    /// Describe the type `T`.
    #[must_use]
    pub fn of<T: 'static>() -> Self {
        Self {
            id: TypeId::of::<T>(),
            name: type_name::<T>(),
            failure_slot: false,
        }
    }

    /// Describe `E` as the error slot of a `Result` return.
    pub(crate) fn failure_slot<E: 'static>() -> Self {
        Self {
            failure_slot: true,
            ..Self::of::<E>()
        }
    }

    /// Returns `true` if this describes `T`.
    #[must_use]
    pub fn is<T: 'static>(&self) -> bool {
        self.id == TypeId::of::<T>()
    }

    /// Full type name.
    #[must_use]
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Returns `true` if a value in this slot signals failure.
    #[must_use]
    pub fn is_failure_slot(&self) -> bool {
        self.failure_slot
    }

    pub(crate) fn id(&self) -> TypeId {
        self.id
    }
}

impl PartialEq for TypeInfo {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for TypeInfo {}

impl fmt::Debug for TypeInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}

/// Parameter and return types of a step function.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Signature {
    params: Vec<TypeInfo>,
    returns: Vec<TypeInfo>,
}

impl Signature {
    pub(crate) fn new(params: Vec<TypeInfo>, returns: Vec<TypeInfo>) -> Self {
        Self { params, returns }
    }

    /// Declared parameters, in order.
    #[must_use]
    pub fn params(&self) -> &[TypeInfo] {
        &self.params
    }

    /// Declared returns, in order, including the failure slot if any.
    #[must_use]
    pub fn returns(&self) -> &[TypeInfo] {
        &self.returns
    }

    /// Returns that survive a successful call: the failure slot is stripped.
    #[must_use]
    pub fn outputs(&self) -> &[TypeInfo] {
        match classify(self).failure_slot() {
            Some(slot) => &self.returns[..slot],
            None => &self.returns,
        }
    }
}

/// Whether a function reports failure, and where.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Classification {
    failure_slot: Option<usize>,
}

impl Classification {
    /// Returns `true` if the function's last return signals failure.
    #[must_use]
    pub fn produces_failure(&self) -> bool {
        self.failure_slot.is_some()
    }

    /// Index of the failure slot among the declared returns.
    #[must_use]
    pub fn failure_slot(&self) -> Option<usize> {
        self.failure_slot
    }
}

/// Classify a signature by its last declared return.
#[must_use]
pub fn classify(signature: &Signature) -> Classification {
    let failure_slot = match signature.returns.last() {
        Some(last) if last.is_failure_slot() => Some(signature.returns.len() - 1),
        _ => None,
    };
    Classification { failure_slot }
}

pub(crate) fn describe(types: &[TypeInfo]) -> String {
    types
        .iter()
        .map(TypeInfo::name)
        .collect::<Vec<_>>()
        .join(", ")
}

/// What a step function returned, with the failure slot split off.
pub struct Returns {
    pub(crate) values: Values,
    pub(crate) failure: Option<Failure>,
}

mod sealed {
    pub trait Sealed {}
}

/// Return types a step function may declare.
///
/// Implemented for `()`, tuples of up to eight values, and `Result` of
/// those with any `std::error::Error + Send + Sync` error type. The error of
/// a `Result` is the failure slot.
pub trait StepReturn: sealed::Sealed + 'static {
    /// Declared return types, the failure slot last.
    fn returns() -> Vec<TypeInfo>;

    /// Split the returned value into outputs and failure.
    fn into_returns(self) -> Returns;
}

macro_rules! impl_step_return {
    ($($ty:ident),*) => {
        impl<$($ty,)*> sealed::Sealed for ($($ty,)*) where $($ty: Clone + Send + 'static,)* {}

        impl<$($ty,)*> StepReturn for ($($ty,)*)
        where
            $($ty: Clone + Send + 'static,)*
        {
            fn returns() -> Vec<TypeInfo> {
                vec![$(TypeInfo::of::<$ty>()),*]
            }

            #[allow(non_snake_case, unused_mut)]
            fn into_returns(self) -> Returns {
                let ($($ty,)*) = self;
                let mut values = Values::new();
                $(values.push($ty);)*
                Returns { values, failure: None }
            }
        }

        impl<$($ty,)* Err> sealed::Sealed for Result<($($ty,)*), Err>
        where
            $($ty: Clone + Send + 'static,)*
            Err: StdError + Send + Sync + 'static,
        {
        }

        impl<$($ty,)* Err> StepReturn for Result<($($ty,)*), Err>
        where
            $($ty: Clone + Send + 'static,)*
            Err: StdError + Send + Sync + 'static,
        {
            fn returns() -> Vec<TypeInfo> {
                let mut returns = <($($ty,)*) as StepReturn>::returns();
                returns.push(TypeInfo::failure_slot::<Err>());
                returns
            }

            fn into_returns(self) -> Returns {
                match self {
                    Ok(outputs) => outputs.into_returns(),
                    Err(error) => Returns {
                        values: Values::new(),
                        failure: Some(Failure::new(error)),
                    },
                }
            }
        }
    };
}

impl_step_return!();
impl_step_return!(A);
impl_step_return!(A, B);
impl_step_return!(A, B, C);
impl_step_return!(A, B, C, D);
impl_step_return!(A, B, C, D, E);
impl_step_return!(A, B, C, D, E, F);
impl_step_return!(A, B, C, D, E, F, G);
impl_step_return!(A, B, C, D, E, F, G, H);
