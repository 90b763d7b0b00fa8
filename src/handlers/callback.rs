//! # Type-erased handler callables.
//!
//! [`Callback`] wraps a plain closure `Fn(A1, .., An) -> R` (up to eight
//! parameters) behind a uniform signature that takes an [`Args`] list and
//! returns a [`ReturnValue`]. Parameters are extracted by exact type; a
//! mismatch is reported as a [`SignatureError`] when the call is attempted.
//!
//! ## Example
//! ```rust
//! use topicvisor::{Callback, IntoArgs};
//!
//! let cb = Callback::new(|name: String, age: u32| format!("{name}:{age}"));
//! assert_eq!(cb.arity(), 2);
//!
//! let ok = cb.call(&("Axing".to_string(), 24u32).into_args()).unwrap();
//! assert_eq!(ok.downcast::<String>().ok(), Some("Axing:24".to_string()));
//!
//! assert!(cb.call(&("Axing".to_string(),).into_args()).is_err());
//! ```

use std::any::Any;
use std::fmt;
use std::sync::Arc;

use crate::error::SignatureError;
use crate::handlers::args::Args;

type ErasedFn = dyn Fn(&Args) -> Result<ReturnValue, SignatureError> + Send + Sync;

/// The value a handler returned, kept with its type name for diagnostics.
pub struct ReturnValue {
    value: Box<dyn Any + Send>,
    type_name: &'static str,
}

impl ReturnValue {
    /// Wraps a handler return value.
    pub fn new<R: Send + 'static>(value: R) -> Self {
        Self {
            value: Box::new(value),
            type_name: std::any::type_name::<R>(),
        }
    }

    /// Type name of the returned value.
    #[inline]
    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    /// Recovers the returned value if it has exactly type `T`.
    pub fn downcast<T: 'static>(self) -> Result<T, SignatureError> {
        let found = self.type_name;
        self.value
            .downcast::<T>()
            .map(|boxed| *boxed)
            .map_err(|_| SignatureError::ReturnType {
                expected: std::any::type_name::<T>(),
                found,
            })
    }
}

impl fmt::Debug for ReturnValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ReturnValue")
            .field("type_name", &self.type_name)
            .finish_non_exhaustive()
    }
}

/// A type-erased handler callable.
///
/// Cheap to clone (internally `Arc`).
#[derive(Clone)]
pub struct Callback {
    f: Arc<ErasedFn>,
    arity: usize,
    type_name: &'static str,
}

impl Callback {
    /// Wraps a closure taking up to eight parameters.
    pub fn new<M, F: IntoCallback<M>>(f: F) -> Self {
        f.into_callback()
    }

    /// Number of parameters the callable expects.
    #[inline]
    pub fn arity(&self) -> usize {
        self.arity
    }

    /// Type name of the wrapped callable.
    #[inline]
    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    /// Invokes the callable with `args`.
    ///
    /// Panics raised by the callable propagate to the caller.
    pub fn call(&self, args: &Args) -> Result<ReturnValue, SignatureError> {
        (self.f)(args)
    }

    fn from_erased<F>(arity: usize, type_name: &'static str, f: F) -> Self
    where
        F: Fn(&Args) -> Result<ReturnValue, SignatureError> + Send + Sync + 'static,
    {
        Self {
            f: Arc::new(f),
            arity,
            type_name,
        }
    }
}

impl fmt::Debug for Callback {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Callback")
            .field("arity", &self.arity)
            .field("type_name", &self.type_name)
            .finish()
    }
}

/// Conversion of a closure into a [`Callback`].
///
/// `Marker` is the closure's `fn` signature; it only exists to keep the
/// per-arity blanket impls apart and is always inferred.
pub trait IntoCallback<Marker>: Send + Sync + 'static {
    /// Erases the closure.
    fn into_callback(self) -> Callback;
}

macro_rules! impl_into_callback {
    ($arity:expr; $($idx:tt $ty:ident $var:ident),*) => {
        impl<Func, Ret, $($ty,)*> IntoCallback<fn($($ty,)*) -> Ret> for Func
        where
            Func: Fn($($ty),*) -> Ret + Send + Sync + 'static,
            Ret: Send + 'static,
            $($ty: Clone + 'static,)*
        {
            fn into_callback(self) -> Callback {
                Callback::from_erased($arity, std::any::type_name::<Func>(), move |args: &Args| {
                    args.expect_arity($arity)?;
                    $(let $var = args.get::<$ty>($idx)?;)*
                    Ok(ReturnValue::new((self)($($var),*)))
                })
            }
        }
    };
}

impl_into_callback!(0;);
impl_into_callback!(1; 0 A1 a1);
impl_into_callback!(2; 0 A1 a1, 1 A2 a2);
impl_into_callback!(3; 0 A1 a1, 1 A2 a2, 2 A3 a3);
impl_into_callback!(4; 0 A1 a1, 1 A2 a2, 2 A3 a3, 3 A4 a4);
impl_into_callback!(5; 0 A1 a1, 1 A2 a2, 2 A3 a3, 3 A4 a4, 4 A5 a5);
impl_into_callback!(6; 0 A1 a1, 1 A2 a2, 2 A3 a3, 3 A4 a4, 4 A5 a5, 5 A6 a6);
impl_into_callback!(7; 0 A1 a1, 1 A2 a2, 2 A3 a3, 3 A4 a4, 4 A5 a5, 5 A6 a6, 6 A7 a7);
impl_into_callback!(8; 0 A1 a1, 1 A2 a2, 2 A3 a3, 3 A4 a4, 4 A5 a5, 5 A6 a6, 6 A7 a7, 7 A8 a8);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handlers::IntoArgs;

    #[test]
    fn test_zero_arity() {
        let cb = Callback::new(|| 7u8);
        assert_eq!(cb.arity(), 0);
        let ret = cb.call(&Args::default()).unwrap();
        assert_eq!(ret.type_name(), "u8");
        assert_eq!(ret.downcast::<u8>(), Ok(7));
    }

    #[test]
    fn test_arity_mismatch() {
        let cb = Callback::new(|v: i32| v);
        let err = cb.call(&(1i32, 2i32).into_args()).unwrap_err();
        assert_eq!(
            err,
            SignatureError::Arity {
                expected: 1,
                found: 2
            }
        );
    }

    #[test]
    fn test_type_mismatch_reports_position() {
        let cb = Callback::new(|_name: String, _age: u32| ());
        let err = cb.call(&("a".to_string(), 1i32).into_args()).unwrap_err();
        assert!(matches!(err, SignatureError::ArgType { index: 1, .. }));
    }

    #[test]
    fn test_tuple_return() {
        let cb = Callback::new(|v: &'static str| (v.len(), Some(v)));
        let ret = cb.call(&("egg",).into_args()).unwrap();
        assert_eq!(
            ret.downcast::<(usize, Option<&'static str>)>(),
            Ok((3, Some("egg")))
        );
    }

    #[test]
    fn test_return_type_mismatch() {
        let ret = ReturnValue::new(1u8);
        assert!(matches!(
            ret.downcast::<u16>(),
            Err(SignatureError::ReturnType {
                expected: "u16",
                found: "u8"
            })
        ));
    }
}
