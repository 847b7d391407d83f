//! Service descriptors: the unit of registration produced by scanning.

use std::fmt;
use std::sync::Arc;

use crate::error::DiResult;
use crate::key::Key;
use crate::lifetime::Lifetime;
use crate::provider::ResolverContext;
use crate::registration::{AnyArc, Registration, ServiceFactory};

/// Service descriptor
///
/// An immutable `{service type, lifetime, factory}` triple. The scanner emits
/// descriptors without touching the container; the merge glue applies them to
/// a [`ServiceCollection`](crate::ServiceCollection). Descriptors are also the
/// introspection view of existing registrations.
///
/// # Examples
///
/// ```rust
/// use ferrous_wire::{key_of_type, Lifetime, ServiceCollection, ServiceDescriptor, Resolver};
/// use std::sync::Arc;
///
/// let descriptor = ServiceDescriptor::from_fn(
///     key_of_type::<u32>(),
///     Lifetime::Singleton,
///     |_| Ok(Arc::new(7u32) as ferrous_wire::AnyArc),
/// );
///
/// let mut services = ServiceCollection::new();
/// services.add_descriptor(descriptor);
/// assert_eq!(*services.build().get_required::<u32>(), 7);
/// ```
#[derive(Clone)]
pub struct ServiceDescriptor {
    /// The service key the factory is registered under
    pub service: Key,
    /// Service lifetime
    pub lifetime: Lifetime,
    /// Implementation type name (if available)
    pub implementation: Option<&'static str>,
    factory: ServiceFactory,
}

impl ServiceDescriptor {
    pub fn new(service: Key, lifetime: Lifetime, factory: ServiceFactory) -> Self {
        Self { service, lifetime, implementation: None, factory }
    }

    /// Builds a descriptor from a closure.
    pub fn from_fn<F>(service: Key, lifetime: Lifetime, factory: F) -> Self
    where
        F: for<'a> Fn(&ResolverContext<'a>) -> DiResult<AnyArc> + Send + Sync + 'static,
    {
        Self::new(service, lifetime, Arc::new(factory))
    }

    /// Records the implementation type name for diagnostics.
    pub fn with_implementation(mut self, implementation: &'static str) -> Self {
        self.implementation = Some(implementation);
        self
    }

    /// Get the type/trait name of the service
    pub fn type_name(&self) -> &'static str {
        self.service.display_name()
    }

    /// The construction function.
    pub fn factory(&self) -> &ServiceFactory {
        &self.factory
    }

    /// Runs the factory once against `ctx`, bypassing lifetime caching.
    pub fn invoke(&self, ctx: &ResolverContext<'_>) -> DiResult<AnyArc> {
        (self.factory)(ctx)
    }

    pub(crate) fn from_registration(key: &Key, registration: &Registration) -> Self {
        Self {
            service: *key,
            lifetime: registration.lifetime,
            implementation: registration.implementation,
            factory: Arc::clone(&registration.ctor),
        }
    }

    pub(crate) fn into_registration(self) -> (Key, Registration) {
        (self.service, Registration::new(self.lifetime, self.factory, self.implementation))
    }
}

impl fmt::Debug for ServiceDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ServiceDescriptor")
            .field("service", &self.service.display_name())
            .field("lifetime", &self.lifetime)
            .field("implementation", &self.implementation)
            .finish()
    }
}
