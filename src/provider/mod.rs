//! Service provider module for dependency injection.
//!
//! This module contains the ServiceProvider type and related functionality
//! for resolving registered services from the DI container.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::Mutex;

use crate::internal::with_circular_guard;
use crate::registration::{AnyArc, Registration, Registry};
use crate::traits::ResolverCore;
use crate::{DiError, DiResult, Key, Lifetime, ServiceDescriptor};

pub mod context;
pub mod scope;
pub use context::ResolverContext;
pub use scope::Scope;

/// Service provider for resolving dependencies from the DI container.
///
/// The `ServiceProvider` resolves services according to their registered
/// lifetimes (Singleton, Scoped, Transient). It is the read-only side of the
/// container: registrations are fixed when it is built, singleton instances
/// are created lazily and cached by registration slot.
///
/// The scanner plans registrations against a provider built from a snapshot of
/// the collection, so scanning filters and activators can be services
/// themselves.
///
/// # Thread Safety
///
/// ServiceProvider is fully thread-safe and can be shared across multiple threads.
/// Singleton services are cached with proper synchronization, and the provider
/// can be cloned cheaply (it uses `Arc` internally).
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
/// let mut collection = ServiceCollection::new();
/// collection.add_singleton(Database { url: "postgres://localhost".to_string() });
/// collection.add_transient_factory::<UserService, _>(|resolver| {
///     UserService { db: resolver.get_required::<Database>() }
/// });
///
/// let provider = collection.build();
/// let user_service = provider.get_required::<UserService>();
/// assert_eq!(user_service.db.url, "postgres://localhost");
/// ```
#[derive(Clone)]
pub struct ServiceProvider {
    inner: Arc<ProviderInner>,
}

pub(crate) struct ProviderInner {
    pub(crate) registry: Registry,
    // Keyed by registration slot so multi-registrations cache independently
    pub(crate) singletons: Mutex<HashMap<usize, AnyArc>>,
}

impl ServiceProvider {
    /// Create a new ServiceProvider with the given registry.
    /// This is used internally by ServiceCollection.build().
    pub(crate) fn new(registry: Registry) -> Self {
        Self {
            inner: Arc::new(ProviderInner {
                registry,
                singletons: Mutex::new(HashMap::new()),
            }),
        }
    }

    /// Convenience accessor for the inner provider
    #[inline]
    pub(crate) fn inner(&self) -> &ProviderInner {
        &self.inner
    }

    /// Creates a new scope for resolving scoped services.
    ///
    /// Each scope maintains its own cache of scoped services while still
    /// accessing singleton services from the root provider.
    ///
    /// # Examples
    ///
    /// ```
    /// use ferrous_wire::{ServiceCollection, Resolver};
    /// use std::sync::{Arc, Mutex};
    ///
    /// #[derive(Debug)]
    /// struct RequestId(String);
    ///
    /// let mut collection = ServiceCollection::new();
    /// let counter = Arc::new(Mutex::new(0));
    /// let counter_clone = counter.clone();
    ///
    /// collection.add_scoped_factory::<RequestId, _>(move |_| {
    ///     let mut c = counter_clone.lock().unwrap();
    ///     *c += 1;
    ///     RequestId(format!("req-{}", *c))
    /// });
    ///
    /// let provider = collection.build();
    ///
    /// let scope1 = provider.create_scope();
    /// let scope2 = provider.create_scope();
    ///
    /// let req1a = scope1.get_required::<RequestId>();
    /// let req1b = scope1.get_required::<RequestId>();
    /// let req2 = scope2.get_required::<RequestId>();
    ///
    /// assert!(Arc::ptr_eq(&req1a, &req1b));
    /// assert!(!Arc::ptr_eq(&req1a, &req2));
    /// ```
    pub fn create_scope(&self) -> Scope {
        Scope::new(self.clone())
    }

    /// A resolver context over the root provider.
    ///
    /// Useful for invoking compiled factories or resolutions directly.
    pub fn context(&self) -> ResolverContext<'_> {
        ResolverContext::new(self)
    }

    /// Whether any registration exists for `key`.
    pub fn is_registered(&self, key: &Key) -> bool {
        self.inner().registry.contains_key(key)
    }

    /// Descriptors of every registration, in registration order.
    pub fn service_descriptors(&self) -> Vec<ServiceDescriptor> {
        self.inner()
            .registry
            .iter()
            .map(|(key, reg)| ServiceDescriptor::from_registration(key, reg))
            .collect()
    }

    #[cfg(feature = "diagnostics")]
    pub fn to_debug_string(&self) -> String {
        let mut s = String::new();
        s.push_str("=== Service Provider Debug ===\n");
        for (slot, (k, r)) in self.inner().registry.iter().enumerate() {
            s.push_str(&format!(
                "  [{}] {}: {:?} ({})\n",
                slot,
                k,
                r.lifetime,
                r.implementation.unwrap_or("factory")
            ));
        }
        s
    }

    /// Singleton resolution with double-checked caching.
    ///
    /// The cache lock is never held while the factory runs.
    pub(crate) fn resolve_singleton(&self, slot: usize, reg: &Registration) -> DiResult<AnyArc> {
        if let Some(cached) = self.inner().singletons.lock().get(&slot) {
            return Ok(cached.clone());
        }

        let ctx = ResolverContext::new(self);
        let value = (reg.ctor)(&ctx)?;

        let mut cache = self.inner().singletons.lock();
        Ok(cache.entry(slot).or_insert(value).clone())
    }

    fn resolve_registration(&self, slot: usize, reg: &Registration) -> DiResult<AnyArc> {
        match reg.lifetime {
            Lifetime::Singleton => self.resolve_singleton(slot, reg),
            Lifetime::Scoped => Err(DiError::WrongLifetime(
                "Cannot resolve scoped service from root provider",
            )),
            Lifetime::Transient => {
                let ctx = ResolverContext::new(self);
                (reg.ctor)(&ctx)
            }
        }
    }
}

impl ResolverCore for ServiceProvider {
    fn resolve_any(&self, key: &Key) -> DiResult<AnyArc> {
        let name = key.display_name();
        with_circular_guard(name, || match self.inner().registry.get(key) {
            Some((slot, reg)) => self.resolve_registration(slot, reg),
            None => Err(DiError::NotFound(name)),
        })
    }

    fn resolve_many(&self, key: &Key) -> DiResult<Vec<AnyArc>> {
        let name = key.display_name();
        with_circular_guard(name, || {
            self.inner()
                .registry
                .get_all(key)
                .into_iter()
                .map(|(slot, reg)| self.resolve_registration(slot, reg))
                .collect()
        })
    }
}

impl std::fmt::Debug for ServiceProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServiceProvider")
            .field("registrations", &self.inner().registry.len())
            .finish()
    }
}
