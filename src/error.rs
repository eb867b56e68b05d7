//! Error types for the dependency injection container.

use thiserror::Error;

/// Dependency injection errors
///
/// Every container and context operation reports failure through this type
/// instead of panicking; callers decide whether a missing dependency is fatal.
///
/// # Examples
///
/// ```rust
/// use scene_di::{Container, DiError, Resolver};
///
/// trait Clock: Send + Sync {}
///
/// let container = Container::new();
/// match container.resolve::<dyn Clock>() {
///     Err(DiError::CannotResolve(name)) => assert!(name.contains("Clock")),
///     _ => unreachable!(),
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DiError {
    /// An absent implementation was offered for a contract
    #[error("Null binding for: {0}")]
    NullBinding(&'static str),
    /// The implementation does not satisfy the contract (type-erased binding only)
    #[error("Invalid type {implementation} for contract: {contract}")]
    InvalidType {
        contract: &'static str,
        implementation: &'static str,
    },
    /// No registration for the contract in any searched container
    #[error("Cannot resolve: {0}")]
    CannotResolve(&'static str),
    /// Fabricating a transient instance failed
    #[error("Transient instantiation of {concrete} failed: {reason}")]
    TransientClassInstantiationFailed {
        concrete: &'static str,
        reason: String,
    },
}

impl DiError {
    /// True for the plain "nothing registered" outcome.
    pub fn is_unresolved(&self) -> bool {
        matches!(self, DiError::CannotResolve(_))
    }
}

/// Result type for DI operations
///
/// A convenience type alias for `Result<T, DiError>` used throughout the crate.
///
/// ```rust
/// use scene_di::{DiResult, DiError};
///
/// fn lookup() -> DiResult<u32> {
///     Err(DiError::CannotResolve("u32"))
/// }
///
/// assert!(lookup().is_err());
/// ```
pub type DiResult<T> = Result<T, DiError>;

/// Failure raised by an [`Injectable`](crate::Injectable) constructor.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConstructError {
    /// The type does not provide a constructor for transient fabrication
    #[error("no constructor available")]
    NoConstructor,
    /// A positional constructor argument was missing or of another type
    #[error("argument {index} missing or not a {expected}")]
    BadArgument {
        index: usize,
        expected: &'static str,
    },
    /// Any other constructor failure
    #[error("{0}")]
    Failed(String),
}

impl ConstructError {
    pub fn failed(reason: impl Into<String>) -> Self {
        ConstructError::Failed(reason.into())
    }
}
