//! # Published argument lists.
//!
//! [`Args`] is the ordered, type-erased argument list of one published event.
//! It is materialized once per publish and shared (cheap `Arc` clone) by every
//! handler in the snapshot.
//!
//! Values are stored as [`ArgValue`] trait objects: any `'static` value that is
//! `Debug + Send + Sync`. `Debug` is required so a failed invocation can report
//! the exact arguments it was called with.
//!
//! ## Example
//! ```rust
//! use topicvisor::{Args, IntoArgs};
//!
//! let args = ("Axing", 1000i32).into_args();
//! assert_eq!(args.len(), 2);
//! assert_eq!(args.get::<i32>(1).ok(), Some(1000));
//! assert!(args.get::<u32>(1).is_err());
//! ```

use std::any::Any;
use std::fmt;
use std::sync::Arc;

use crate::error::SignatureError;

/// A single type-erased argument.
pub trait ArgValue: Any + fmt::Debug + Send + Sync {
    /// Upcasts to `&dyn Any` for downcasting.
    fn as_any(&self) -> &dyn Any;

    /// Returns the concrete type name of the value.
    fn type_name(&self) -> &'static str;
}

impl<T: Any + fmt::Debug + Send + Sync> ArgValue for T {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn type_name(&self) -> &'static str {
        std::any::type_name::<T>()
    }
}

/// Ordered argument list of one published event.
#[derive(Clone)]
pub struct Args {
    values: Arc<[Box<dyn ArgValue>]>,
}

impl Args {
    /// Builds an argument list from already boxed values.
    pub fn from_values(values: Vec<Box<dyn ArgValue>>) -> Self {
        Self {
            values: Arc::from(values),
        }
    }

    /// Number of arguments.
    #[inline]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// True if there are no arguments.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Returns a clone of the argument at `index` if it has exactly type `T`.
    pub fn get<T: Clone + 'static>(&self, index: usize) -> Result<T, SignatureError> {
        let value = self.value(index).ok_or(SignatureError::Arity {
            expected: index + 1,
            found: self.len(),
        })?;
        ArgValue::as_any(value)
            .downcast_ref::<T>()
            .cloned()
            .ok_or_else(|| SignatureError::ArgType {
                index,
                expected: std::any::type_name::<T>(),
                found: ArgValue::type_name(value),
            })
    }

    /// Type names of all arguments, in order.
    pub fn type_names(&self) -> Vec<&'static str> {
        self.values
            .iter()
            .map(|v| ArgValue::type_name(&**v))
            .collect()
    }

    pub(crate) fn expect_arity(&self, expected: usize) -> Result<(), SignatureError> {
        if self.len() == expected {
            Ok(())
        } else {
            Err(SignatureError::Arity {
                expected,
                found: self.len(),
            })
        }
    }

    fn value(&self, index: usize) -> Option<&dyn ArgValue> {
        self.values.get(index).map(|v| &**v)
    }
}

impl Default for Args {
    fn default() -> Self {
        Self::from_values(Vec::new())
    }
}

impl fmt::Debug for Args {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list()
            .entries(self.values.iter().map(|v| &**v))
            .finish()
    }
}

/// Conversion into an [`Args`] list.
///
/// Implemented for [`Args`] itself and for tuples of up to eight values.
pub trait IntoArgs {
    /// Materializes the argument list.
    fn into_args(self) -> Args;
}

impl IntoArgs for Args {
    fn into_args(self) -> Args {
        self
    }
}

impl IntoArgs for () {
    fn into_args(self) -> Args {
        Args::default()
    }
}

macro_rules! impl_into_args {
    ($($ty:ident $var:ident),+) => {
        impl<$($ty),+> IntoArgs for ($($ty,)+)
        where
            $($ty: fmt::Debug + Send + Sync + 'static,)+
        {
            fn into_args(self) -> Args {
                let ($($var,)+) = self;
                Args::from_values(vec![$(Box::new($var) as Box<dyn ArgValue>),+])
            }
        }
    };
}

impl_into_args!(A1 a1);
impl_into_args!(A1 a1, A2 a2);
impl_into_args!(A1 a1, A2 a2, A3 a3);
impl_into_args!(A1 a1, A2 a2, A3 a3, A4 a4);
impl_into_args!(A1 a1, A2 a2, A3 a3, A4 a4, A5 a5);
impl_into_args!(A1 a1, A2 a2, A3 a3, A4 a4, A5 a5, A6 a6);
impl_into_args!(A1 a1, A2 a2, A3 a3, A4 a4, A5 a5, A6 a6, A7 a7);
impl_into_args!(A1 a1, A2 a2, A3 a3, A4 a4, A5 a5, A6 a6, A7 a7, A8 a8);
