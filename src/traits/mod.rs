//! Core traits for the dependency injection container.

mod injectable;
mod resolver;

pub use injectable::{Implements, Injectable};
pub use resolver::{Resolver, ResolverCore};
