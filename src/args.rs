//! Positional constructor arguments for transient fabrication.

use std::any::Any;
use std::fmt;

use crate::error::ConstructError;

/// Ordered, type-erased argument list handed to
/// [`Injectable::construct`](crate::Injectable::construct).
///
/// Singletons ignore arguments entirely; they only matter when a transient
/// registration fabricates a new instance.
///
/// # Examples
///
/// ```
/// use scene_di::ConstructorArgs;
///
/// let args = ConstructorArgs::new().with(8080u16).with("localhost".to_string());
/// assert_eq!(args.len(), 2);
/// assert_eq!(args.get::<u16>(0), Some(&8080));
/// assert_eq!(args.get::<u16>(1), None);
/// assert_eq!(args.required::<String>(1).unwrap(), "localhost");
/// ```
#[derive(Default)]
pub struct ConstructorArgs {
    values: Vec<Box<dyn Any + Send + Sync>>,
}

impl ConstructorArgs {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends an argument, builder style.
    pub fn with<T: Any + Send + Sync>(mut self, value: T) -> Self {
        self.push(value);
        self
    }

    pub fn push<T: Any + Send + Sync>(&mut self, value: T) {
        self.values.push(Box::new(value));
    }

    /// The argument at `index` if present and of type `T`.
    pub fn get<T: Any>(&self, index: usize) -> Option<&T> {
        self.values.get(index).and_then(|value| value.downcast_ref::<T>())
    }

    /// Like [`get`](Self::get) but reports a [`ConstructError::BadArgument`].
    pub fn required<T: Any>(&self, index: usize) -> Result<&T, ConstructError> {
        self.get::<T>(index).ok_or(ConstructError::BadArgument {
            index,
            expected: std::any::type_name::<T>(),
        })
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl fmt::Debug for ConstructorArgs {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConstructorArgs")
            .field("len", &self.values.len())
            .finish()
    }
}
