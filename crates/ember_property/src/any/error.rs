use thiserror::Error;

/// Outcome of a successful write through the `any` layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnyReturn {
    /// The destination changed.
    Success,
    /// The destination already held the value.
    NothingToDo,
}

/// A failed read or write through the `any` layer.
///
/// No partial write happens when an error is returned.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum AnyError {
    /// The types are compatible but the value could not be converted,
    /// e.g. an expired weak pointer or a different concrete interface type.
    #[error("conversion failed")]
    Fail,
    /// An index or buffer out of range.
    #[error("invalid argument")]
    InvalidArgument,
    /// The source type is not compatible with the destination.
    #[error("incompatible type")]
    IncompatibleType,
    /// The destination is read-only.
    #[error("value is read-only")]
    ReadOnly,
}

/// Result of a write through the `any` layer.
pub type AnyResult = Result<AnyReturn, AnyError>;
