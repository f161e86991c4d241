use std::{borrow::Cow, fmt};

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString, IntoStaticStr};

use crate::{exception_public::Exception, types::Type};

/// Result type alias for operations that can produce a runtime error.
pub type RunResult<T> = Result<T, RunError>;

/// Exception types the runtime can raise or carry through from host code.
///
/// Uses strum derives for automatic `Display`, `FromStr`, and `Into<&'static str>` implementations.
/// The string representation matches the variant name exactly (e.g., `ValueError` -> "ValueError").
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, IntoStaticStr, Serialize, Deserialize)]
pub enum ExcType {
    /// Root of the hierarchy.
    BaseException,
    /// primary exception class - matches any exception except `BaseException` itself.
    Exception,

    // --- ArithmeticError hierarchy ---
    ArithmeticError,
    OverflowError,
    ZeroDivisionError,

    // --- LookupError hierarchy ---
    LookupError,
    IndexError,
    KeyError,

    // --- RuntimeError hierarchy ---
    RuntimeError,
    NotImplementedError,
    RecursionError,

    /// Raised by the `next` builtin when an iterator is exhausted and no default is given.
    ///
    /// Never raised by the iterator protocol itself: exhaustion is a sentinel there.
    StopIteration,
    TypeError,
    ValueError,

    // --- resource limits ---
    MemoryError,
    TimeoutError,
}

impl ExcType {
    /// Creates a TypeError with the given message.
    #[must_use]
    pub(crate) fn type_error(msg: impl fmt::Display) -> RunError {
        SimpleException::new_msg(Self::TypeError, msg).into()
    }

    /// Creates a TypeError for a value that cannot produce an iterator.
    #[must_use]
    pub(crate) fn type_error_not_iterable(type_: Type) -> RunError {
        SimpleException::new_msg(Self::TypeError, format!("'{type_}' object is not iterable")).into()
    }

    /// Creates a TypeError for a value passed to `next` that is not an iterator.
    #[must_use]
    pub(crate) fn type_error_not_iterator(type_: Type) -> RunError {
        SimpleException::new_msg(Self::TypeError, format!("'{type_}' object is not an iterator")).into()
    }

    /// Creates a TypeError for calling a value that is not callable.
    #[must_use]
    pub(crate) fn type_error_not_callable(type_: Type) -> RunError {
        SimpleException::new_msg(Self::TypeError, format!("'{type_}' object is not callable")).into()
    }

    /// Creates a TypeError for a non-integer where an integer is required.
    #[must_use]
    pub(crate) fn type_error_not_integer(type_: Type) -> RunError {
        SimpleException::new_msg(
            Self::TypeError,
            format!("'{type_}' object cannot be interpreted as an integer"),
        )
        .into()
    }

    /// Creates a TypeError for unsupported operand types of a binary operation.
    #[must_use]
    pub(crate) fn type_error_operands(op: &str, left: Type, right: Type) -> RunError {
        SimpleException::new_msg(
            Self::TypeError,
            format!("unsupported operand type(s) for {op}: '{left}' and '{right}'"),
        )
        .into()
    }

    /// Creates a TypeError for a function that takes a fixed number of arguments.
    #[must_use]
    pub(crate) fn type_error_arg_count(name: &str, expected: usize, actual: usize) -> RunError {
        if expected == 1 {
            SimpleException::new_msg(
                Self::TypeError,
                format!("{name}() takes exactly one argument ({actual} given)"),
            )
            .into()
        } else {
            SimpleException::new_msg(
                Self::TypeError,
                format!("{name} expected {expected} arguments, got {actual}"),
            )
            .into()
        }
    }

    /// Creates a TypeError for when a function receives fewer arguments than required.
    #[must_use]
    pub(crate) fn type_error_at_least(name: &str, min: usize, actual: usize) -> RunError {
        let plural = if min == 1 { "" } else { "s" };
        SimpleException::new_msg(
            Self::TypeError,
            format!("{name} expected at least {min} argument{plural}, got {actual}"),
        )
        .into()
    }

    /// Creates a TypeError for when a function receives more arguments than allowed.
    #[must_use]
    pub(crate) fn type_error_at_most(name: &str, max: usize, actual: usize) -> RunError {
        let plural = if max == 1 { "" } else { "s" };
        SimpleException::new_msg(
            Self::TypeError,
            format!("{name} expected at most {max} argument{plural}, got {actual}"),
        )
        .into()
    }

    /// Creates a TypeError for a function that accepts no keyword arguments.
    #[must_use]
    pub(crate) fn type_error_no_kwargs(name: &str) -> RunError {
        SimpleException::new_msg(Self::TypeError, format!("{name}() takes no keyword arguments")).into()
    }

    /// Creates a TypeError for an unexpected keyword argument.
    #[must_use]
    pub(crate) fn type_error_unexpected_keyword(name: &str, keyword: &str) -> RunError {
        SimpleException::new_msg(
            Self::TypeError,
            format!("{name}() got an unexpected keyword argument '{keyword}'"),
        )
        .into()
    }

    /// Creates a TypeError for an argument given both positionally and by keyword.
    #[must_use]
    pub(crate) fn type_error_multiple_values(name: &str, keyword: &str) -> RunError {
        SimpleException::new_msg(
            Self::TypeError,
            format!("{name}() got multiple values for argument '{keyword}'"),
        )
        .into()
    }

    /// Creates an OverflowError with the given message.
    #[must_use]
    pub(crate) fn overflow_error(msg: impl fmt::Display) -> RunError {
        SimpleException::new_msg(Self::OverflowError, msg).into()
    }

    /// Creates the StopIteration raised by `next` on an exhausted iterator.
    #[must_use]
    pub(crate) fn stop_iteration() -> RunError {
        SimpleException::new(Self::StopIteration, None).into()
    }
}

/// Simple lightweight representation of an exception.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub(crate) struct SimpleException {
    exc_type: ExcType,
    arg: Option<String>,
}

impl fmt::Display for SimpleException {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.arg {
            Some(arg) => write!(f, "{}: {arg}", self.exc_type),
            None => write!(f, "{}", self.exc_type),
        }
    }
}

impl From<Exception> for SimpleException {
    fn from(exc: Exception) -> Self {
        Self {
            exc_type: exc.exc_type(),
            arg: exc.into_message(),
        }
    }
}

impl SimpleException {
    /// Creates a new exception with the given type and optional argument message.
    #[must_use]
    pub fn new(exc_type: ExcType, arg: Option<String>) -> Self {
        Self { exc_type, arg }
    }

    /// Creates a new exception with the given type and argument message.
    #[must_use]
    pub fn new_msg(exc_type: ExcType, arg: impl fmt::Display) -> Self {
        Self {
            exc_type,
            arg: Some(arg.to_string()),
        }
    }

    #[must_use]
    pub fn exc_type(&self) -> ExcType {
        self.exc_type
    }

    /// Converts into the public exception handed to the host.
    #[must_use]
    pub fn into_exception(self) -> Exception {
        Exception::new(self.exc_type, self.arg)
    }
}

/// Runtime error types that can occur during execution.
///
/// Two variants:
/// - `Internal`: bug in the runtime implementation (static message)
/// - `Exc`: an exception raised by the runtime, a resource limit, or host code
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum RunError {
    /// Internal runtime error - indicates a bug in whorl, not user code.
    Internal(Cow<'static, str>),
    /// An exception propagating towards the outermost caller.
    Exc(Box<SimpleException>),
}

impl From<SimpleException> for RunError {
    fn from(exc: SimpleException) -> Self {
        Self::Exc(Box::new(exc))
    }
}

impl From<Exception> for RunError {
    fn from(exc: Exception) -> Self {
        Self::Exc(Box::new(exc.into()))
    }
}

impl RunError {
    /// Converts this runtime error to an `Exception` for the public API.
    ///
    /// Internal errors are converted to `RuntimeError` exceptions.
    #[must_use]
    pub fn into_exception(self) -> Exception {
        match self {
            Self::Exc(exc) => exc.into_exception(),
            Self::Internal(err) => Exception::new(ExcType::RuntimeError, Some(format!("internal error in whorl: {err}"))),
        }
    }

    pub fn internal(msg: impl Into<Cow<'static, str>>) -> Self {
        Self::Internal(msg.into())
    }

    /// Returns the exception type carried by this error, `RuntimeError` for internal errors.
    #[must_use]
    pub fn exc_type(&self) -> ExcType {
        match self {
            Self::Exc(exc) => exc.exc_type(),
            Self::Internal(_) => ExcType::RuntimeError,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use super::*;

    #[test]
    fn names_parse_back_through_strum() {
        assert_eq!(ExcType::from_str("MemoryError"), Ok(ExcType::MemoryError));
        assert_eq!(ExcType::StopIteration.to_string(), "StopIteration");
    }

    #[test]
    fn resource_errors_map_to_host_exceptions() {
        let err: RunError = crate::resource::ResourceError::Allocation { limit: 1, count: 2 }.into();
        assert_eq!(err.exc_type(), ExcType::MemoryError);
        assert_eq!(
            err.into_exception().message(),
            Some("allocation limit exceeded: 2 > 1")
        );
    }
}
