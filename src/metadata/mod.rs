//! Type metadata: the declarative description scanning works from.
//!
//! A [`TypeMetadata`] lists a type's registration markers, scanning filters,
//! constructors, properties, factory methods and the trait services it may be
//! registered as. It is usually produced by a [`Scannable`] implementation
//! next to the type it describes.
//!
//! # Examples
//!
//! ```
//! use ferrous_wire::{
//!     ConstructorInfo, MergeStrategy, Parameter, RegisterService, Resolver, Scannable,
//!     ServiceCollection, TypeMetadata,
//! };
//! use std::sync::Arc;
//!
//! trait Part: Send + Sync {
//!     fn name(&self) -> String;
//! }
//!
//! struct Widget;
//! impl Part for Widget {
//!     fn name(&self) -> String { "widget".into() }
//! }
//!
//! impl Scannable for Widget {
//!     fn metadata() -> TypeMetadata {
//!         TypeMetadata::builder::<Widget>()
//!             .register(RegisterService::singleton())
//!             .register(RegisterService::transient().service_trait::<dyn Part>())
//!             .implements::<dyn Part, _>(|w| w)
//!             .constructor(ConstructorInfo::new(vec![], |_| Ok(Widget)))
//!             .build()
//!     }
//! }
//!
//! let mut services = ServiceCollection::new();
//! services.scan::<Widget>(MergeStrategy::Replace).unwrap();
//!
//! let provider = services.build();
//! assert_eq!(provider.get_required_trait::<dyn Part>().name(), "widget");
//! ```

use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;

use crate::attributes::{RegisterService, ScanningFilter};
use crate::config::{ConfigBindable, Configuration};
use crate::registration::AnyArc;
use crate::resolution::{DependencyResolver, Resolution};
use crate::{key_of_trait, key_of_type, DiError, DiResult, Key};

mod arguments;
pub(crate) mod members;

pub use arguments::{Argument, Arguments};
pub use members::{Accessor, ConstructorInfo, MethodInfo, PropertyInfo};

/// Binds a configuration key to a type-erased value.
pub type ConfigBinder = fn(&dyn Configuration, &str) -> DiResult<AnyArc>;

fn bind_erased<T: ConfigBindable>(configuration: &dyn Configuration, key: &str) -> DiResult<AnyArc> {
    Ok(Arc::new(T::bind(configuration, key)?))
}

/// The declared type of a parameter or property.
///
/// Carries the service key used for container lookups and, for types that
/// can be read from configuration, the binder used by configuration
/// injection.
#[derive(Clone, Copy)]
pub struct TypeRef {
    key: Key,
    binder: Option<ConfigBinder>,
}

impl TypeRef {
    pub fn of<T: 'static>() -> Self {
        Self { key: key_of_type::<T>(), binder: None }
    }

    pub fn of_trait<T: ?Sized + 'static>() -> Self {
        Self { key: key_of_trait::<T>(), binder: None }
    }

    /// A type that can also be bound from configuration.
    pub fn bindable<T: ConfigBindable>() -> Self {
        Self { key: key_of_type::<T>(), binder: Some(bind_erased::<T>) }
    }

    pub fn key(&self) -> Key {
        self.key
    }

    pub fn binder(&self) -> Option<ConfigBinder> {
        self.binder
    }

    pub fn is_bindable(&self) -> bool {
        self.binder.is_some()
    }
}

impl fmt::Debug for TypeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TypeRef")
            .field("key", &self.key)
            .field("bindable", &self.is_bindable())
            .finish()
    }
}

/// Visibility of a member.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Visibility {
    #[default]
    Public,
    NonPublic,
}

/// A constructor or method parameter.
#[derive(Debug, Clone)]
pub struct Parameter {
    name: &'static str,
    ty: TypeRef,
    resolution: Option<Resolution>,
}

impl Parameter {
    pub fn new(name: &'static str, ty: TypeRef) -> Self {
        Self { name, ty, resolution: None }
    }

    /// A concrete service dependency.
    pub fn service<T: 'static>(name: &'static str) -> Self {
        Self::new(name, TypeRef::of::<T>())
    }

    /// A trait service dependency, e.g. `service_trait::<dyn Logger>("logger")`.
    pub fn service_trait<T: ?Sized + 'static>(name: &'static str) -> Self {
        Self::new(name, TypeRef::of_trait::<T>())
    }

    /// A value bound from the configuration key `key`.
    pub fn setting<T: ConfigBindable>(name: &'static str, key: impl Into<String>) -> Self {
        Self::new(name, TypeRef::bindable::<T>()).configuration(key)
    }

    pub fn inject(mut self, resolution: Resolution) -> Self {
        self.resolution = Some(resolution);
        self
    }

    pub fn optional(self) -> Self {
        self.inject(Resolution::Optional)
    }

    pub fn configuration(self, key: impl Into<String>) -> Self {
        self.inject(Resolution::configuration(key))
    }

    pub fn resolve_with<R: DependencyResolver + 'static>(self, resolver: R) -> Self {
        self.inject(Resolution::custom(resolver))
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn ty(&self) -> &TypeRef {
        &self.ty
    }

    pub fn resolution(&self) -> Option<&Resolution> {
        self.resolution.as_ref()
    }
}

pub(crate) type AliasCast = Arc<dyn Fn(AnyArc) -> DiResult<AnyArc> + Send + Sync>;

/// A trait service an implementation may be registered as.
#[derive(Clone)]
pub struct ServiceAlias {
    pub(crate) source: Key,
    pub(crate) key: Key,
    pub(crate) cast: AliasCast,
}

impl ServiceAlias {
    pub fn new<T, S, C>(cast: C) -> Self
    where
        T: Send + Sync + 'static,
        S: ?Sized + Send + Sync + 'static,
        C: Fn(Arc<T>) -> Arc<S> + Send + Sync + 'static,
    {
        Self {
            source: key_of_type::<T>(),
            key: key_of_trait::<S>(),
            cast: Arc::new(move |value: AnyArc| {
                let concrete = value
                    .downcast::<T>()
                    .map_err(|_| DiError::TypeMismatch(std::any::type_name::<T>()))?;
                // Trait services are stored as Arc<Arc<dyn Trait>>
                Ok(Arc::new(cast(concrete)) as AnyArc)
            }),
        }
    }

    pub fn service(&self) -> Key {
        self.key
    }

    /// Converts an instance of the implementation into the trait service.
    pub fn apply(&self, value: AnyArc) -> DiResult<AnyArc> {
        (self.cast)(value)
    }
}

impl fmt::Debug for ServiceAlias {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} as {}", self.source, self.key)
    }
}

/// Declarative description of a type.
#[derive(Clone)]
pub struct TypeMetadata {
    pub(crate) key: Key,
    pub(crate) generic: bool,
    pub(crate) is_static: bool,
    pub(crate) markers: Vec<RegisterService>,
    pub(crate) filters: Vec<Arc<dyn ScanningFilter>>,
    pub(crate) inject_all_init_only: bool,
    pub(crate) constructors: Vec<ConstructorInfo>,
    pub(crate) properties: Vec<PropertyInfo>,
    pub(crate) methods: Vec<MethodInfo>,
    pub(crate) aliases: Vec<ServiceAlias>,
}

impl TypeMetadata {
    pub fn builder<T: Send + Sync + 'static>() -> TypeMetadataBuilder<T> {
        TypeMetadataBuilder {
            metadata: TypeMetadata {
                key: key_of_type::<T>(),
                generic: false,
                is_static: false,
                markers: Vec::new(),
                filters: Vec::new(),
                inject_all_init_only: false,
                constructors: Vec::new(),
                properties: Vec::new(),
                methods: Vec::new(),
                aliases: Vec::new(),
            },
            inherited: Vec::new(),
            _type: PhantomData,
        }
    }

    pub fn key(&self) -> Key {
        self.key
    }

    pub fn name(&self) -> &'static str {
        self.key.display_name()
    }

    pub fn is_generic(&self) -> bool {
        self.generic
    }

    pub fn is_static(&self) -> bool {
        self.is_static
    }

    pub fn injects_all_init_only(&self) -> bool {
        self.inject_all_init_only
    }

    pub fn markers(&self) -> &[RegisterService] {
        &self.markers
    }

    pub fn filters(&self) -> &[Arc<dyn ScanningFilter>] {
        &self.filters
    }

    pub fn constructors(&self) -> &[ConstructorInfo] {
        &self.constructors
    }

    /// Own properties in declaration order, then inherited ones.
    pub fn properties(&self) -> &[PropertyInfo] {
        &self.properties
    }

    pub fn methods(&self) -> &[MethodInfo] {
        &self.methods
    }

    pub fn aliases(&self) -> &[ServiceAlias] {
        &self.aliases
    }

    /// How an instance is turned into `service`: `Some(None)` when no
    /// conversion is needed, `None` when the type cannot be registered as it.
    pub(crate) fn conversion_to(&self, service: &Key) -> Option<Option<&ServiceAlias>> {
        if service == &self.key {
            Some(None)
        } else {
            self.aliases.iter().find(|alias| &alias.key == service).map(Some)
        }
    }
}

impl fmt::Debug for TypeMetadata {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TypeMetadata")
            .field("key", &self.key)
            .field("generic", &self.generic)
            .field("is_static", &self.is_static)
            .field("markers", &self.markers)
            .field("constructors", &self.constructors.len())
            .field("properties", &self.properties)
            .field("methods", &self.methods)
            .field("aliases", &self.aliases)
            .finish()
    }
}

/// Builder for [`TypeMetadata`] of the type `T`.
pub struct TypeMetadataBuilder<T> {
    metadata: TypeMetadata,
    inherited: Vec<PropertyInfo>,
    _type: PhantomData<fn() -> T>,
}

impl<T: Send + Sync + 'static> TypeMetadataBuilder<T> {
    pub fn register(mut self, marker: RegisterService) -> Self {
        self.metadata.markers.push(marker);
        self
    }

    pub fn filter<F: ScanningFilter + 'static>(mut self, filter: F) -> Self {
        self.metadata.filters.push(Arc::new(filter));
        self
    }

    /// Injects every init-only property, marked or not.
    pub fn inject_all_init_only(mut self) -> Self {
        self.metadata.inject_all_init_only = true;
        self
    }

    /// Marks the type as having open generic parameters.
    pub fn generic(mut self) -> Self {
        self.metadata.generic = true;
        self
    }

    /// Marks the type as a holder of static factory methods only.
    pub fn static_type(mut self) -> Self {
        self.metadata.is_static = true;
        self
    }

    pub fn constructor(mut self, constructor: ConstructorInfo) -> Self {
        self.metadata.constructors.push(constructor);
        self
    }

    pub fn property(mut self, property: PropertyInfo) -> Self {
        self.metadata.properties.push(property);
        self
    }

    pub fn method(mut self, mut method: MethodInfo) -> Self {
        method.declaring_type = Some(self.metadata.key.display_name());
        method.declaring_generic = self.metadata.generic;
        self.metadata.methods.push(method);
        self
    }

    /// Declares that `T` can be registered as the trait `S`.
    pub fn implements<S, C>(mut self, cast: C) -> Self
    where
        S: ?Sized + Send + Sync + 'static,
        C: Fn(Arc<T>) -> Arc<S> + Send + Sync + 'static,
    {
        self.metadata.aliases.push(ServiceAlias::new::<T, S, C>(cast));
        self
    }

    /// Inherits the properties of an embedded base type `B`.
    ///
    /// `project` reaches the base inside `T`. The base's opt-in to init-only
    /// injection carries over.
    pub fn inherit<B: Send + Sync + 'static>(mut self, base: &TypeMetadata, project: fn(&mut T) -> &mut B) -> Self {
        self.metadata.inject_all_init_only |= base.inject_all_init_only;
        self.inherited
            .extend(base.properties.iter().map(|property| property.project::<T, B>(project)));
        self
    }

    pub fn build(mut self) -> TypeMetadata {
        // Methods added before `generic()` still belong to a generic type
        let generic = self.metadata.generic;
        for method in &mut self.metadata.methods {
            method.declaring_generic = generic;
        }
        self.metadata.properties.append(&mut self.inherited);
        self.metadata
    }
}

/// Types that describe themselves for scanning.
pub trait Scannable {
    fn metadata() -> TypeMetadata;
}
