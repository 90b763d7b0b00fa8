//! # Result sinks.
//!
//! A [`ResultSink`] receives each handler's return value after that handler
//! completes. The sink's parameter list must match the handler's return shape
//! exactly:
//!
//! ```text
//! handler returns ()             ─► sink: Fn()
//! handler returns R              ─► sink: Fn(R)
//! handler returns (R1, .., Rn)   ─► sink: Fn(R1, .., Rn)     (n = 2..=6)
//! ```
//!
//! A mismatch is a contract violation: it is reported as
//! [`SignatureError::ReturnType`] when the sink is invoked and routed through
//! the failure policy.

use std::fmt;
use std::sync::Arc;

use crate::error::SignatureError;
use crate::handlers::callback::ReturnValue;

type ErasedSink = dyn Fn(ReturnValue) -> Result<(), SignatureError> + Send + Sync;

/// A type-erased result sink.
///
/// Cheap to clone (internally `Arc`); one sink is shared by every handler of a publish.
#[derive(Clone)]
pub struct ResultSink {
    f: Arc<ErasedSink>,
    type_name: &'static str,
}

impl ResultSink {
    /// Wraps a closure matching a handler's return shape.
    pub fn new<M, F: IntoResultSink<M>>(f: F) -> Self {
        f.into_sink()
    }

    /// Type name of the wrapped closure.
    #[inline]
    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    /// Delivers one handler's return value.
    pub fn deliver(&self, value: ReturnValue) -> Result<(), SignatureError> {
        (self.f)(value)
    }

    fn from_erased<F>(type_name: &'static str, f: F) -> Self
    where
        F: Fn(ReturnValue) -> Result<(), SignatureError> + Send + Sync + 'static,
    {
        Self {
            f: Arc::new(f),
            type_name,
        }
    }
}

impl fmt::Debug for ResultSink {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResultSink")
            .field("type_name", &self.type_name)
            .finish()
    }
}

/// Conversion of a closure into a [`ResultSink`].
///
/// `Marker` is the closure's `fn` signature and is always inferred.
pub trait IntoResultSink<Marker>: Send + Sync + 'static {
    /// Erases the closure.
    fn into_sink(self) -> ResultSink;
}

impl<Func> IntoResultSink<fn()> for Func
where
    Func: Fn() + Send + Sync + 'static,
{
    fn into_sink(self) -> ResultSink {
        ResultSink::from_erased(std::any::type_name::<Func>(), move |ret: ReturnValue| {
            ret.downcast::<()>()?;
            (self)();
            Ok(())
        })
    }
}

impl<Func, A1> IntoResultSink<fn(A1)> for Func
where
    Func: Fn(A1) + Send + Sync + 'static,
    A1: 'static,
{
    fn into_sink(self) -> ResultSink {
        ResultSink::from_erased(std::any::type_name::<Func>(), move |ret: ReturnValue| {
            let a1 = ret.downcast::<A1>()?;
            (self)(a1);
            Ok(())
        })
    }
}

macro_rules! impl_into_result_sink {
    ($($ty:ident $var:ident),+) => {
        impl<Func, $($ty),+> IntoResultSink<fn($($ty),+)> for Func
        where
            Func: Fn($($ty),+) + Send + Sync + 'static,
            $($ty: 'static,)+
        {
            fn into_sink(self) -> ResultSink {
                ResultSink::from_erased(std::any::type_name::<Func>(), move |ret: ReturnValue| {
                    let ($($var,)+) = ret.downcast::<($($ty,)+)>()?;
                    (self)($($var),+);
                    Ok(())
                })
            }
        }
    };
}

impl_into_result_sink!(A1 a1, A2 a2);
impl_into_result_sink!(A1 a1, A2 a2, A3 a3);
impl_into_result_sink!(A1 a1, A2 a2, A3 a3, A4 a4);
impl_into_result_sink!(A1 a1, A2 a2, A3 a3, A4 a4, A5 a5);
impl_into_result_sink!(A1 a1, A2 a2, A3 a3, A4 a4, A5 a5, A6 a6);

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::Mutex;

    #[test]
    fn test_pair_sink_destructures_tuple() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let s = Arc::clone(&seen);
        let sink = ResultSink::new(move |v: String, e: Option<String>| {
            s.lock().push((v, e));
        });

        sink.deliver(ReturnValue::new(("first".to_string(), Some("boom".to_string()))))
            .unwrap();
        sink.deliver(ReturnValue::new(("second".to_string(), None::<String>)))
            .unwrap();

        assert_eq!(
            *seen.lock(),
            vec![
                ("first".to_string(), Some("boom".to_string())),
                ("second".to_string(), None),
            ]
        );
    }

    #[test]
    fn test_unit_sink() {
        let sink = ResultSink::new(|| {});
        assert!(sink.deliver(ReturnValue::new(())).is_ok());
        assert!(sink.deliver(ReturnValue::new(1u8)).is_err());
    }

    #[test]
    fn test_single_value_sink_rejects_wrong_type() {
        let sink = ResultSink::new(|_v: u32| {});
        let err = sink.deliver(ReturnValue::new("nope")).unwrap_err();
        assert_eq!(err.as_label(), "signature_return_type");
    }
}
