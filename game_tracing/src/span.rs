#[doc(hidden)]
pub use tracing;

/// Creates a new [`Span`] with the given `name` at the current callsite.
///
/// Optional fields are recorded on the span when spans are enabled:
/// ```
/// # use game_tracing::trace_span;
/// let _span = trace_span!("Body::update", id = 42).entered();
/// ```
#[macro_export]
macro_rules! trace_span {
    ($name:expr) => {
        $crate::__trace_span_impl!($name)
    };
    ($name:expr, $($field:tt)+) => {
        $crate::__trace_span_impl!($name, $($field)+)
    };
}

#[cfg(feature = "spans")]
#[macro_export]
#[doc(hidden)]
macro_rules! __trace_span_impl {
    ($name:expr) => {{
        $crate::span::Span {
            inner: $crate::span::tracing::span!($crate::span::tracing::Level::TRACE, $name),
            _priv: (),
        }
    }};
    ($name:expr, $($field:tt)+) => {{
        $crate::span::Span {
            inner: $crate::span::tracing::span!(
                $crate::span::tracing::Level::TRACE,
                $name,
                $($field)+
            ),
            _priv: (),
        }
    }};
}

#[cfg(not(feature = "spans"))]
#[macro_export]
#[doc(hidden)]
macro_rules! __trace_span_impl {
    ($name:expr) => {{
        $crate::span::Span { _priv: () }
    }};
    ($name:expr, $($field:tt)+) => {{
        $crate::span::Span { _priv: () }
    }};
}

/// A `Span` represents a zone of simulation time in which an operation is being run.
#[derive(Clone, Debug)]
pub struct Span {
    #[cfg(feature = "spans")]
    #[doc(hidden)]
    pub inner: tracing::span::Span,
    #[doc(hidden)]
    pub _priv: (),
}

impl Span {
    /// Enters this span.
    pub fn entered(self) -> EnteredSpan {
        EnteredSpan {
            #[cfg(feature = "spans")]
            _inner: self.inner.entered(),
        }
    }
}

/// A handle to a [`Span`] that is currently active.
#[derive(Debug)]
#[non_exhaustive]
pub struct EnteredSpan {
    #[cfg(feature = "spans")]
    _inner: tracing::span::EnteredSpan,
}

#[cfg(test)]
mod tests {
    #[test]
    fn span_enter_and_drop() {
        let span = trace_span!("test_span", id = 7).entered();
        drop(span);

        let _span = trace_span!("test_span").entered();
    }
}
