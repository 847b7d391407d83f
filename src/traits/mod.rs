//! Core traits for dependency injection.

pub(crate) mod resolver;

pub use resolver::{Resolver, ResolverCore};
