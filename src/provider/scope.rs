//! Scoped service resolution.
//!
//! This module contains the Scope type for managing request-scoped services.

use std::collections::HashMap;

use parking_lot::Mutex;

use super::{ResolverContext, ServiceProvider};
use crate::internal::with_circular_guard;
use crate::registration::{AnyArc, Registration};
use crate::traits::ResolverCore;
use crate::{DiError, DiResult, Key, Lifetime};

/// Scoped service container for request-scoped dependency resolution.
///
/// A `Scope` provides isolated dependency resolution for scoped services while
/// still accessing singleton services from the root provider.
///
/// # Lifetime Behavior
///
/// - **Singleton**: Resolved and cached in the root provider (shared across all scopes)
/// - **Scoped**: Resolved and cached within this specific scope
/// - **Transient**: Created fresh on every resolution (no caching)
///
/// # Examples
///
/// ```
/// use ferrous_wire::{ServiceCollection, Resolver};
/// use std::sync::Arc;
///
/// struct DatabaseConnection(String);
/// struct UserService {
///     db: Arc<DatabaseConnection>,
/// }
///
/// let mut collection = ServiceCollection::new();
/// collection.add_scoped_factory::<DatabaseConnection, _>(|_| {
///     DatabaseConnection("connection-123".to_string())
/// });
/// collection.add_transient_factory::<UserService, _>(|resolver| {
///     UserService {
///         db: resolver.get_required::<DatabaseConnection>(),
///     }
/// });
///
/// let provider = collection.build();
/// let scope = provider.create_scope();
///
/// let user1 = scope.get_required::<UserService>();
/// let user2 = scope.get_required::<UserService>();
/// assert!(Arc::ptr_eq(&user1.db, &user2.db));
/// ```
pub struct Scope {
    pub(crate) root: ServiceProvider,
    pub(crate) scoped: Mutex<HashMap<usize, AnyArc>>,
}

impl Scope {
    pub(crate) fn new(root: ServiceProvider) -> Self {
        Self { root, scoped: Mutex::new(HashMap::new()) }
    }

    /// The root provider this scope was created from.
    pub fn root(&self) -> &ServiceProvider {
        &self.root
    }

    /// A resolver context over this scope.
    pub fn context(&self) -> ResolverContext<'_> {
        ResolverContext::new(self)
    }

    /// Creates a sibling scope with fresh scoped state.
    pub fn create_child(&self) -> Self {
        Self::new(self.root.clone())
    }

    fn resolve_scoped(&self, slot: usize, reg: &Registration) -> DiResult<AnyArc> {
        if let Some(cached) = self.scoped.lock().get(&slot) {
            return Ok(cached.clone());
        }

        // Factory runs against the scope so scoped dependencies resolve here
        let ctx = ResolverContext::new(self);
        let value = (reg.ctor)(&ctx)?;

        let mut cache = self.scoped.lock();
        Ok(cache.entry(slot).or_insert(value).clone())
    }

    fn resolve_registration(&self, slot: usize, reg: &Registration) -> DiResult<AnyArc> {
        match reg.lifetime {
            Lifetime::Singleton => self.root.resolve_singleton(slot, reg),
            Lifetime::Scoped => self.resolve_scoped(slot, reg),
            Lifetime::Transient => {
                let ctx = ResolverContext::new(self);
                (reg.ctor)(&ctx)
            }
        }
    }
}

impl ResolverCore for Scope {
    fn resolve_any(&self, key: &Key) -> DiResult<AnyArc> {
        let name = key.display_name();
        with_circular_guard(name, || match self.root.inner().registry.get(key) {
            Some((slot, reg)) => self.resolve_registration(slot, reg),
            None => Err(DiError::NotFound(name)),
        })
    }

    fn resolve_many(&self, key: &Key) -> DiResult<Vec<AnyArc>> {
        let name = key.display_name();
        with_circular_guard(name, || {
            self.root
                .inner()
                .registry
                .get_all(key)
                .into_iter()
                .map(|(slot, reg)| self.resolve_registration(slot, reg))
                .collect()
        })
    }
}
