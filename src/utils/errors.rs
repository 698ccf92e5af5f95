use std::fmt::Display;

use derive_more::Display;
use tracerr::{Trace, Traced};

/// Representation of an error which has a stable name that can be shown to
/// the user or matched on by the presentation layer.
pub trait Caused {
    /// Returns name of this error.
    fn name(&self) -> &'static str;
}

/// Error prepared for reporting: its name, message and trace information.
#[derive(Clone, Debug, Display)]
#[display(fmt = "{}: {}\n{}", name, message, trace)]
pub struct CallError {
    name: &'static str,
    message: String,
    trace: Trace,
}

impl CallError {
    /// Returns name of this error.
    #[inline]
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Returns message of this error.
    #[inline]
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Returns trace information of this error.
    #[inline]
    pub fn trace(&self) -> &Trace {
        &self.trace
    }

    /// Prints error information with [`log::error!`].
    pub fn print(&self) {
        log::error!("{}", self);
    }
}

impl<E: Caused + Display> From<(E, Trace)> for CallError {
    fn from((err, trace): (E, Trace)) -> Self {
        Self {
            name: err.name(),
            message: err.to_string(),
            trace,
        }
    }
}

impl<E: Caused + Display> From<Traced<E>> for CallError {
    #[inline]
    fn from(traced: Traced<E>) -> Self {
        Self::from(traced.split())
    }
}
