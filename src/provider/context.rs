//! Resolver context for dependency injection.
//!
//! This module contains the ResolverContext type which provides
//! the interface for factory functions to resolve dependencies.

use crate::registration::AnyArc;
use crate::traits::ResolverCore;
use crate::{DiResult, Key};

/// Context passed to factory functions for resolving dependencies.
///
/// ResolverContext wraps a resolver (ServiceProvider or Scope) and provides
/// the interface that factory functions use to access other services. This
/// allows factory functions to be independent of the specific resolver type.
///
/// # Examples
///
/// ```
/// use ferrous_wire::{ServiceCollection, Resolver};
/// use std::sync::Arc;
///
/// struct Database { url: String }
/// struct UserService { db: Arc<Database> }
///
/// let mut services = ServiceCollection::new();
/// services.add_singleton(Database {
///     url: "postgres://localhost".to_string()
/// });
/// services.add_transient_factory::<UserService, _>(|resolver| {
///     UserService {
///         db: resolver.get_required::<Database>(),
///     }
/// });
/// ```
#[derive(Clone, Copy)]
pub struct ResolverContext<'a> {
    resolver: &'a dyn ResolverCore,
}

impl<'a> ResolverContext<'a> {
    /// Creates a new ResolverContext wrapping the given resolver.
    pub fn new<T>(resolver: &'a T) -> Self
    where
        T: ResolverCore,
    {
        Self { resolver }
    }
}

impl<'a> ResolverCore for ResolverContext<'a> {
    fn resolve_any(&self, key: &Key) -> DiResult<AnyArc> {
        self.resolver.resolve_any(key)
    }

    fn resolve_many(&self, key: &Key) -> DiResult<Vec<AnyArc>> {
        self.resolver.resolve_many(key)
    }
}
