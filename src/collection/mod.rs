//! Service collection module for dependency injection.
//!
//! This module contains the ServiceCollection type and related functionality
//! for registering services and building service providers.

use std::sync::Arc;

use crate::activator::ServiceActivator;
use crate::config::Configuration;
use crate::environment::HostEnvironment;
use crate::provider::ResolverContext;
use crate::registration::{AnyArc, Registration, Registry};
use crate::{key_of_trait, key_of_type, DiResult, Key, Lifetime, ServiceDescriptor, ServiceProvider};

pub mod merge;
pub use merge::MergeStrategy;

/// Mutable registration side of the container.
///
/// Services are added with the `add_*` helpers, as raw [`ServiceDescriptor`]s,
/// or by scanning type metadata with [`scan_types`](ServiceCollection::scan_types).
/// [`build`](ServiceCollection::build) freezes the registrations into a
/// [`ServiceProvider`].
pub struct ServiceCollection {
    registry: Registry,
}

impl std::fmt::Debug for ServiceCollection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServiceCollection")
            .field("registrations", &self.registry.len())
            .finish()
    }
}

impl ServiceCollection {
    /// Creates a new empty service collection.
    pub fn new() -> Self {
        Self { registry: Registry::new() }
    }

    // ----- Concrete Type Registrations -----

    /// Registers a singleton instance that will be shared across the entire application.
    ///
    /// The instance is created immediately and wrapped in an `Arc` for thread-safe sharing.
    /// All requests for this service type will return the same instance.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use ferrous_wire::ServiceCollection;
    /// struct Config {
    ///     database_url: String
    /// }
    ///
    /// let mut services = ServiceCollection::new();
    /// services.add_singleton(Config {
    ///     database_url: "postgres://localhost".to_string()
    /// });
    /// ```
    pub fn add_singleton<T: 'static + Send + Sync>(&mut self, value: T) -> &mut Self {
        let arc = Arc::new(value);
        let ctor = move |_: &ResolverContext| -> DiResult<AnyArc> { Ok(arc.clone()) };
        self.registry.insert(
            key_of_type::<T>(),
            Registration::new(Lifetime::Singleton, Arc::new(ctor), Some(std::any::type_name::<T>())),
        );
        self
    }

    /// Registers a singleton factory that creates the instance on first request.
    ///
    /// The factory is called only once, and the result is cached and shared across
    /// all subsequent requests. The factory receives a `ResolverContext` to resolve
    /// dependencies.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use ferrous_wire::{ServiceCollection, Resolver};
    /// # use std::sync::Arc;
    /// struct Database { url: String }
    /// struct UserService { db: Arc<Database> }
    ///
    /// let mut services = ServiceCollection::new();
    /// services.add_singleton(Database { url: "postgres://localhost".to_string() });
    /// services.add_singleton_factory::<UserService, _>(|resolver| {
    ///     UserService {
    ///         db: resolver.get_required::<Database>()
    ///     }
    /// });
    /// ```
    pub fn add_singleton_factory<T, F>(&mut self, factory: F) -> &mut Self
    where
        T: 'static + Send + Sync,
        F: Fn(&ResolverContext) -> T + Send + Sync + 'static,
    {
        self.add_factory(Lifetime::Singleton, factory)
    }

    /// Registers a scoped factory that creates one instance per scope.
    ///
    /// Each scope gets its own instance, but within a scope, the same instance
    /// is reused.
    pub fn add_scoped_factory<T, F>(&mut self, factory: F) -> &mut Self
    where
        T: 'static + Send + Sync,
        F: Fn(&ResolverContext) -> T + Send + Sync + 'static,
    {
        self.add_factory(Lifetime::Scoped, factory)
    }

    /// Registers a transient factory that creates a new instance on every request.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use ferrous_wire::{ServiceCollection, Resolver};
    /// struct Logger { timestamp: std::time::SystemTime }
    ///
    /// let mut services = ServiceCollection::new();
    /// services.add_transient_factory::<Logger, _>(|_| {
    ///     Logger { timestamp: std::time::SystemTime::now() }
    /// });
    /// ```
    pub fn add_transient_factory<T, F>(&mut self, factory: F) -> &mut Self
    where
        T: 'static + Send + Sync,
        F: Fn(&ResolverContext) -> T + Send + Sync + 'static,
    {
        self.add_factory(Lifetime::Transient, factory)
    }

    fn add_factory<T, F>(&mut self, lifetime: Lifetime, factory: F) -> &mut Self
    where
        T: 'static + Send + Sync,
        F: Fn(&ResolverContext) -> T + Send + Sync + 'static,
    {
        let ctor = move |r: &ResolverContext| -> DiResult<AnyArc> { Ok(Arc::new(factory(r))) };
        self.registry.insert(
            key_of_type::<T>(),
            Registration::new(lifetime, Arc::new(ctor), Some(std::any::type_name::<T>())),
        );
        self
    }

    // ----- Trait Registrations -----

    /// Registers a singleton trait implementation.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use ferrous_wire::{ServiceCollection, Resolver};
    /// # use std::sync::Arc;
    /// trait Logger: Send + Sync {
    ///     fn log(&self, message: &str);
    /// }
    ///
    /// struct FileLogger { path: String }
    /// impl Logger for FileLogger {
    ///     fn log(&self, message: &str) {}
    /// }
    ///
    /// let mut services = ServiceCollection::new();
    /// let logger = Arc::new(FileLogger { path: "/var/log/app.log".to_string() });
    /// services.add_singleton_trait::<dyn Logger>(logger);
    /// ```
    pub fn add_singleton_trait<T>(&mut self, value: Arc<T>) -> &mut Self
    where
        T: ?Sized + 'static + Send + Sync,
    {
        // Stored as Arc<Arc<dyn Trait>> in Any
        let any_arc: AnyArc = Arc::new(value);
        let ctor = move |_: &ResolverContext| -> DiResult<AnyArc> { Ok(any_arc.clone()) };
        self.registry.insert(
            key_of_trait::<T>(),
            Registration::new(Lifetime::Singleton, Arc::new(ctor), None),
        );
        self
    }

    /// Registers a singleton trait factory.
    pub fn add_singleton_trait_factory<Trait, F>(&mut self, factory: F) -> &mut Self
    where
        Trait: ?Sized + 'static + Send + Sync,
        F: Fn(&ResolverContext) -> Arc<Trait> + Send + Sync + 'static,
    {
        self.add_trait_factory_impl(Lifetime::Singleton, factory)
    }

    /// Registers a scoped trait factory.
    pub fn add_scoped_trait_factory<Trait, F>(&mut self, factory: F) -> &mut Self
    where
        Trait: ?Sized + 'static + Send + Sync,
        F: Fn(&ResolverContext) -> Arc<Trait> + Send + Sync + 'static,
    {
        self.add_trait_factory_impl(Lifetime::Scoped, factory)
    }

    /// Registers a transient trait factory.
    pub fn add_transient_trait_factory<Trait, F>(&mut self, factory: F) -> &mut Self
    where
        Trait: ?Sized + 'static + Send + Sync,
        F: Fn(&ResolverContext) -> Arc<Trait> + Send + Sync + 'static,
    {
        self.add_trait_factory_impl(Lifetime::Transient, factory)
    }

    fn add_trait_factory_impl<Trait, F>(&mut self, lifetime: Lifetime, factory: F) -> &mut Self
    where
        Trait: ?Sized + 'static + Send + Sync,
        F: Fn(&ResolverContext) -> Arc<Trait> + Send + Sync + 'static,
    {
        let ctor = move |r: &ResolverContext| -> DiResult<AnyArc> { Ok(Arc::new(factory(r))) };
        self.registry.insert(key_of_trait::<Trait>(), Registration::new(lifetime, Arc::new(ctor), None));
        self
    }

    // ----- Trait Multi-Binding Registrations -----

    /// Appends a trait implementation, keeping earlier ones.
    ///
    /// All implementations are returned by
    /// [`get_all_trait`](crate::Resolver::get_all_trait); single resolution
    /// returns the last one.
    pub fn add_trait_implementation<T>(&mut self, value: Arc<T>, lifetime: Lifetime) -> &mut Self
    where
        T: ?Sized + 'static + Send + Sync,
    {
        let any_arc: AnyArc = Arc::new(value);
        let ctor = move |_: &ResolverContext| -> DiResult<AnyArc> { Ok(any_arc.clone()) };
        self.registry.push(key_of_trait::<T>(), Registration::new(lifetime, Arc::new(ctor), None));
        self
    }

    /// Appends a trait factory, keeping earlier registrations.
    pub fn add_trait_factory<Trait, F>(&mut self, lifetime: Lifetime, factory: F) -> &mut Self
    where
        Trait: ?Sized + 'static + Send + Sync,
        F: Fn(&ResolverContext) -> Arc<Trait> + Send + Sync + 'static,
    {
        let ctor = move |r: &ResolverContext| -> DiResult<AnyArc> { Ok(Arc::new(factory(r))) };
        self.registry.push(key_of_trait::<Trait>(), Registration::new(lifetime, Arc::new(ctor), None));
        self
    }

    // ----- Descriptors -----

    /// Appends a descriptor, keeping any registration for the same service.
    pub fn add_descriptor(&mut self, descriptor: ServiceDescriptor) -> &mut Self {
        let (key, registration) = descriptor.into_registration();
        self.registry.push(key, registration);
        self
    }

    /// Removes every registration for the descriptor's service, then appends it.
    pub fn replace_descriptor(&mut self, descriptor: ServiceDescriptor) -> &mut Self {
        let (key, registration) = descriptor.into_registration();
        self.registry.insert(key, registration);
        self
    }

    /// Appends the descriptor only when its service has no registration yet.
    ///
    /// Returns whether the descriptor was added.
    pub fn try_add_descriptor(&mut self, descriptor: ServiceDescriptor) -> bool {
        if self.registry.contains_key(&descriptor.service) {
            false
        } else {
            self.add_descriptor(descriptor);
            true
        }
    }

    /// Whether any registration exists for `key`.
    pub fn contains(&self, key: &Key) -> bool {
        self.registry.contains_key(key)
    }

    /// Number of registrations, multi-registrations counted individually.
    pub fn len(&self) -> usize {
        self.registry.len()
    }

    pub fn is_empty(&self) -> bool {
        self.registry.len() == 0
    }

    /// Get all service descriptors for introspection and diagnostics.
    ///
    /// # Examples
    ///
    /// ```
    /// use ferrous_wire::{ServiceCollection, Lifetime};
    ///
    /// let mut services = ServiceCollection::new();
    /// services.add_singleton(42usize);
    /// services.add_scoped_factory::<String, _>(|_| "hello".to_string());
    ///
    /// let descriptors = services.service_descriptors();
    /// assert_eq!(descriptors.len(), 2);
    ///
    /// let usize_desc = descriptors.iter()
    ///     .find(|d| d.type_name().contains("usize"))
    ///     .unwrap();
    /// assert_eq!(usize_desc.lifetime, Lifetime::Singleton);
    /// ```
    pub fn service_descriptors(&self) -> Vec<ServiceDescriptor> {
        self.registry
            .iter()
            .map(|(key, reg)| ServiceDescriptor::from_registration(key, reg))
            .collect()
    }

    // ----- Activation Collaborators -----

    /// Registers the configuration source read by configuration injection.
    pub fn add_configuration<C>(&mut self, configuration: C) -> &mut Self
    where
        C: Configuration + 'static,
    {
        self.add_singleton_trait::<dyn Configuration>(Arc::new(configuration))
    }

    /// Registers the host environment consulted by environment selectors.
    pub fn add_host_environment(&mut self, name: impl Into<String>) -> &mut Self {
        self.add_singleton(HostEnvironment::new(name))
    }

    /// Registers the activator used when scanning, replacing any earlier one.
    pub fn add_activator(&mut self, activator: Arc<dyn ServiceActivator>) -> &mut Self {
        self.add_singleton_trait::<dyn ServiceActivator>(activator)
    }

    // ----- Building -----

    /// Builds a read-only provider over the current registrations without
    /// consuming the collection.
    ///
    /// Singleton instances created through the snapshot are not shared with
    /// providers built later.
    pub fn snapshot(&self) -> ServiceProvider {
        ServiceProvider::new(self.registry.clone())
    }

    /// Builds the service provider from this collection.
    ///
    /// # Examples
    ///
    /// ```
    /// use ferrous_wire::{ServiceCollection, Resolver};
    ///
    /// let mut services = ServiceCollection::new();
    /// services.add_singleton(42usize);
    /// services.add_singleton("Hello".to_string());
    ///
    /// let provider = services.build();
    /// let number = provider.get_required::<usize>();
    /// let text = provider.get_required::<String>();
    ///
    /// assert_eq!(*number, 42);
    /// assert_eq!(&*text, "Hello");
    /// ```
    pub fn build(self) -> ServiceProvider {
        ServiceProvider::new(self.registry)
    }
}

impl Default for ServiceCollection {
    fn default() -> Self {
        Self::new()
    }
}
