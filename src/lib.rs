//! # ferrous-wire
//!
//! Metadata-driven service scanning and activation for dependency injection,
//! inspired by Microsoft.Extensions.DependencyInjection.
//!
//! ## Features
//!
//! - **Declarative registration**: types and static factory methods carry
//!   registration markers with a lifetime and an optional service type
//! - **Activation**: constructor selection, parameter and property injection
//!   compiled once into reusable factories
//! - **Configuration injection**: values bound from a hierarchical,
//!   case-insensitive configuration into strings, numbers, durations, dates,
//!   URLs, enums and lists
//! - **Scanning filters**: environment, configuration and custom predicates
//! - **Merge strategies**: add, replace, try-add or fail on duplicates
//! - **Container**: Singleton, Scoped and Transient lifetimes, trait
//!   multi-binding, circular dependency detection
//!
//! ## Quick Start
//!
//! ```rust
//! use ferrous_wire::{
//!     ConstructorInfo, MemoryConfiguration, MergeStrategy, Parameter, RegisterService, Resolver,
//!     ServiceCollection, TypeMetadata,
//! };
//! use std::sync::Arc;
//!
//! struct Database {
//!     url: String,
//! }
//!
//! struct UserService {
//!     db: Arc<Database>,
//! }
//!
//! let types = [
//!     TypeMetadata::builder::<Database>()
//!         .register(RegisterService::singleton())
//!         .constructor(ConstructorInfo::new(
//!             vec![Parameter::setting::<String>("url", "Database:Url")],
//!             |args| Ok(Database { url: args.value()? }),
//!         ))
//!         .build(),
//!     TypeMetadata::builder::<UserService>()
//!         .register(RegisterService::transient())
//!         .constructor(ConstructorInfo::new(vec![Parameter::service::<Database>("db")], |args| {
//!             Ok(UserService { db: args.service()? })
//!         }))
//!         .build(),
//! ];
//!
//! let mut services = ServiceCollection::new();
//! services.add_configuration(MemoryConfiguration::from_pairs([("Database:Url", "postgres://localhost")]));
//! services.scan_types(&types, MergeStrategy::Replace).unwrap();
//!
//! let provider = services.build();
//! let users = provider.get_required::<UserService>();
//! assert_eq!(users.db.url, "postgres://localhost");
//! ```
//!
//! ## Service Lifetimes
//!
//! - **Singleton**: Created once and shared across the entire application
//! - **Scoped**: Created once per scope (ideal for web request contexts)
//! - **Transient**: Created fresh on every resolution
//!
//! ## Factory Methods
//!
//! ```rust
//! use ferrous_wire::{MergeStrategy, MethodInfo, RegisterFactory, Resolver, ServiceCollection, TypeMetadata};
//! use std::sync::Arc;
//!
//! trait Clock: Send + Sync {
//!     fn now(&self) -> u64;
//! }
//!
//! struct FixedClock(u64);
//! impl Clock for FixedClock {
//!     fn now(&self) -> u64 { self.0 }
//! }
//!
//! struct Clocks;
//!
//! let clocks = TypeMetadata::builder::<Clocks>()
//!     .static_type()
//!     .method(
//!         MethodInfo::returning_trait::<dyn Clock, _>("system", vec![], |_| Ok(Arc::new(FixedClock(42)) as Arc<dyn Clock>))
//!             .register(RegisterFactory::singleton()),
//!     )
//!     .build();
//!
//! let mut services = ServiceCollection::new();
//! services.scan_types(&[clocks], MergeStrategy::Replace).unwrap();
//!
//! let provider = services.build();
//! assert_eq!(provider.get_required_trait::<dyn Clock>().now(), 42);
//! ```

// Module declarations
pub mod activator;
pub mod attributes;
pub mod collection;
pub mod config;
pub mod descriptors;
pub mod environment;
pub mod error;
pub mod key;
pub mod lifetime;
pub mod metadata;
pub mod provider;
pub mod resolution;
pub mod scanner;
pub mod traits;

// Internal modules
mod internal;
mod registration;

// Re-exports
pub use activator::{DefaultActivator, InstanceFactory, MethodFactory, ServiceActivator};
pub use attributes::{
    ConditionSelector, ConfigurationSelector, EnvironmentSelector, RegisterFactory, RegisterService, ScanningFilter,
};
pub use collection::{MergeStrategy, ServiceCollection};
pub use config::{ConfigBindable, ConfigEntry, ConfigScalar, Configuration, LayeredConfiguration, MemoryConfiguration};
pub use descriptors::ServiceDescriptor;
pub use environment::HostEnvironment;
pub use error::{DiError, DiResult};
pub use key::{key_of_trait, key_of_type, Key};
pub use lifetime::Lifetime;
pub use metadata::{
    Accessor, Argument, Arguments, ConstructorInfo, MethodInfo, Parameter, PropertyInfo, Scannable, ServiceAlias,
    TypeMetadata, TypeMetadataBuilder, TypeRef, Visibility,
};
pub use provider::{ResolverContext, Scope, ServiceProvider};
pub use registration::{AnyArc, ServiceFactory};
pub use resolution::{DependencyResolver, Resolution};
pub use scanner::{plan_registrations, scan_factory_registrations, scan_service_registrations};
pub use traits::{Resolver, ResolverCore};
