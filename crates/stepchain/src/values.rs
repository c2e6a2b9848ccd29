use std::any::TypeId;
use std::fmt;

use crate::cloneable::CloneableAny;

pub(crate) type Value = Box<dyn CloneableAny>;

/// Ordered, type-erased values passed into and out of steps.
///
/// The chain's arguments, each step's outputs and the chain's final result
/// are all `Values`. Read them back with [`Values::get`] or
/// [`Values::into_tuple`].
#[derive(Default)]
pub struct Values {
    items: Vec<Value>,
}

impl Values {
    /// Create an empty list.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of values.
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Returns `true` if there are no values.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Append a value.
    pub fn push<T: Clone + Send + 'static>(&mut self, value: T) {
        self.items.push(Box::new(value));
    }

    /// Borrow the value at `index` if it has type `T`.
    #[must_use]
    pub fn get<T: 'static>(&self, index: usize) -> Option<&T> {
        self.items.get(index)?.as_any().downcast_ref::<T>()
    }

    /// Convert into a tuple of concrete types.
    ///
    /// Returns `None` if the count or any type does not match.
    #[must_use]
    pub fn into_tuple<T: FromValues>(self) -> Option<T> {
        T::from_values(self)
    }

    pub(crate) fn type_ids(&self) -> impl Iterator<Item = TypeId> + '_ {
        self.items.iter().map(|item| item.as_any().type_id())
    }

    pub(crate) fn type_names(&self) -> String {
        self.items
            .iter()
            .map(|item| item.type_name())
            .collect::<Vec<_>>()
            .join(", ")
    }

    /// Put `value` in front of the existing values.
    pub(crate) fn prepend<T: Clone + Send + 'static>(mut self, value: T) -> Self {
        self.items.insert(0, Box::new(value));
        self
    }

    pub(crate) fn into_items(self) -> std::vec::IntoIter<Value> {
        self.items.into_iter()
    }
}

impl Clone for Values {
    fn clone(&self) -> Self {
        Self {
            items: self.items.iter().map(|item| item.clone_box()).collect(),
        }
    }
}

impl fmt::Debug for Values {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list()
            .entries(self.items.iter().map(|item| item.type_name()))
            .finish()
    }
}

/// Take the next value as a `T`.
pub(crate) fn take<T: 'static>(items: &mut impl Iterator<Item = Value>) -> Option<T> {
    items.next()?.into_any().downcast::<T>().ok().map(|value| *value)
}

/// Conversion of a tuple of arguments into [`Values`].
pub trait IntoValues {
    /// Box each element in order.
    fn into_values(self) -> Values;
}

/// Conversion of [`Values`] back into a tuple of concrete types.
pub trait FromValues: Sized {
    /// Unbox each element in order, or `None` on a count or type mismatch.
    fn from_values(values: Values) -> Option<Self>;
}

impl IntoValues for Values {
    fn into_values(self) -> Values {
        self
    }
}

macro_rules! impl_value_tuples {
    ($($ty:ident),*) => {
        impl<$($ty,)*> IntoValues for ($($ty,)*)
        where
            $($ty: Clone + Send + 'static,)*
        {
            #[allow(non_snake_case, unused_mut)]
            fn into_values(self) -> Values {
                let ($($ty,)*) = self;
                let mut values = Values::new();
                $(values.push($ty);)*
                values
            }
        }

        impl<$($ty,)*> FromValues for ($($ty,)*)
        where
            $($ty: 'static,)*
        {
            #[allow(unused_mut)]
            fn from_values(values: Values) -> Option<Self> {
                let mut items = values.into_items();
                let tuple = ($(take::<$ty>(&mut items)?,)*);
                if items.next().is_some() {
                    return None;
                }
                Some(tuple)
            }
        }
    };
}

impl_value_tuples!();
impl_value_tuples!(A);
impl_value_tuples!(A, B);
impl_value_tuples!(A, B, C);
impl_value_tuples!(A, B, C, D);
impl_value_tuples!(A, B, C, D, E);
impl_value_tuples!(A, B, C, D, E, F);
impl_value_tuples!(A, B, C, D, E, F, G);
impl_value_tuples!(A, B, C, D, E, F, G, H);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tuple_converts_into_values_in_order() {
        let values = (1_i32, "two".to_string()).into_values();

        assert_eq!(values.len(), 2);
        assert_eq!(values.get::<i32>(0), Some(&1));
        assert_eq!(values.get::<String>(1).map(String::as_str), Some("two"));
    }

    #[test]
    fn unit_converts_into_empty_values() {
        let values = ().into_values();
        assert!(values.is_empty());
    }

    #[test]
    fn get_with_wrong_type_returns_none() {
        let values = (1_i32,).into_values();

        assert!(values.get::<u64>(0).is_none());
        assert!(values.get::<i32>(1).is_none());
    }

    #[test]
    fn into_tuple_restores_concrete_types() {
        let values = (5_u8, true).into_values();

        let restored: (u8, bool) = values.into_tuple().expect("types should match");

        assert_eq!(restored, (5, true));
    }

    #[test]
    fn into_tuple_rejects_extra_values() {
        let values = (5_u8, true).into_values();
        assert!(values.into_tuple::<(u8,)>().is_none());
    }

    #[test]
    fn into_tuple_rejects_missing_values() {
        let values = (5_u8,).into_values();
        assert!(values.into_tuple::<(u8, bool)>().is_none());
    }

    #[test]
    fn clone_copies_every_value() {
        let values = ("order-1".to_string(), 3_usize).into_values();

        let copy = values.clone();
        drop(values);

        assert_eq!(copy.get::<String>(0).map(String::as_str), Some("order-1"));
        assert_eq!(copy.get::<usize>(1), Some(&3));
    }

    #[test]
    fn prepend_puts_value_first() {
        let values = (2_i32,).into_values().prepend("first");

        assert_eq!(values.get::<&str>(0), Some(&"first"));
        assert_eq!(values.get::<i32>(1), Some(&2));
    }

    #[test]
    fn debug_lists_type_names() {
        let values = (1_i32, 2_u8).into_values();
        assert_eq!(format!("{values:?}"), "[\"i32\", \"u8\"]");
    }
}
