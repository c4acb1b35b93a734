/// Represents all errors reported for invalid use of the configuration and
/// code APIs.
///
/// Unlike [`CodeError`](crate::error::CodeError), these do not point into an
/// expression: they signal that the host asked for something the current
/// state cannot satisfy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// A symbol or argument that does not refer to anything.
    InvalidArgument(String),
    /// An operation that contradicts the current state, such as adding a
    /// duplicate operator.
    LogicError(String),
    /// An index or position outside the valid range.
    OutOfRange(String),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidArgument(details) => write!(f, "Invalid argument: {details}."),
            Self::LogicError(details) => write!(f, "Logic error: {details}."),
            Self::OutOfRange(details) => write!(f, "Out of range: {details}."),
        }
    }
}

impl std::error::Error for ConfigError {}
