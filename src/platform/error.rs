use std::borrow::Cow;

use derive_more::Display;

/// Error reported by the host platform.
#[derive(Clone, Debug, Display, Eq, PartialEq)]
#[display(fmt = "{}: {}", name, message)]
pub struct Error {
    /// Name of the platform exception.
    name: Cow<'static, str>,

    /// Message of the platform exception.
    message: Cow<'static, str>,
}

impl Error {
    /// Creates a new [`Error`] with the provided `name` and `message`.
    #[inline]
    pub fn new<N, M>(name: N, message: M) -> Self
    where
        N: Into<Cow<'static, str>>,
        M: Into<Cow<'static, str>>,
    {
        Self {
            name: name.into(),
            message: message.into(),
        }
    }

    /// Returns name of this [`Error`].
    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns message of this [`Error`].
    #[inline]
    pub fn message(&self) -> &str {
        &self.message
    }
}
