//! Error types for the dependency injection container and the activation layer.

use thiserror::Error;

/// Dependency injection errors
///
/// Represents the error conditions that can occur while registering services,
/// scanning type metadata, compiling factories, or resolving services.
///
/// Errors fall into three groups:
///
/// - **Configuration errors** are raised eagerly while scanning or compiling a
///   factory: ambiguous constructors, non-static or generic factory methods,
///   service types that the implementation cannot be registered as, duplicate
///   registrations under [`MergeStrategy::Throw`](crate::MergeStrategy::Throw).
/// - **Resolution errors** are raised when a compiled factory runs: a required
///   dependency is missing or a configuration value cannot be converted.
/// - **Container errors** come from the provider itself: lifetime violations,
///   circular dependencies, type mismatches.
///
/// # Examples
///
/// ```rust
/// use ferrous_wire::{DiError, ServiceCollection, Resolver};
///
/// let provider = ServiceCollection::new().build();
/// match provider.get::<String>() {
///     Err(DiError::NotFound(type_name)) => {
///         assert_eq!(type_name, "alloc::string::String");
///     }
///     _ => unreachable!(),
/// }
/// ```
#[derive(Debug, Clone, Error)]
pub enum DiError {
    /// Service not registered
    #[error("No service for type {0} has been registered.")]
    NotFound(&'static str),
    /// Type downcast failed
    #[error("Type mismatch for: {0}")]
    TypeMismatch(&'static str),
    /// Circular dependency detected (includes path)
    #[error("Circular dependency: {}", .0.join(" -> "))]
    Circular(Vec<&'static str>),
    /// Invalid lifetime resolution (e.g., scoped from root)
    #[error("Lifetime error: {0}")]
    WrongLifetime(&'static str),
    /// Maximum recursion depth exceeded
    #[error("Max depth {0} exceeded")]
    DepthExceeded(usize),

    /// Open generic types cannot be activated
    #[error("The service type {0} must not be generic.")]
    GenericType(&'static str),
    /// No constructor could be selected
    #[error("The type {0} must have exactly one public constructor.")]
    NoUniqueConstructor(&'static str),
    /// More than one constructor carries the designated marker
    #[error("The type {0} has more than one constructor decorated as the service constructor.")]
    AmbiguousConstructor(&'static str),
    /// Factory methods must not take a receiver
    #[error("The factory method {0} must be static.")]
    NonStaticFactory(String),
    /// Factory methods must not be generic nor live on a generic type
    #[error("The factory method {0} must not have any generic parameter.")]
    GenericFactory(String),
    /// Explicit service type not implemented by the concrete type
    #[error("The concrete type {implementation} cannot be used to register service type {service}.")]
    NotAssignable {
        implementation: &'static str,
        service: &'static str,
    },
    /// Explicit service type not implemented by a factory method's return type
    #[error("The method {method} with return type {return_type} cannot be used to register service type {service}.")]
    FactoryNotAssignable {
        method: String,
        return_type: &'static str,
        service: &'static str,
    },
    /// A configuration resolution was attached to a type with no binder
    #[error("The member {member} of {owner} has type {target}, which cannot be bound from configuration.")]
    NotBindable {
        owner: &'static str,
        member: &'static str,
        target: &'static str,
    },
    /// Conflicting registration under the throw merge strategy
    #[error("The service of type {0} has already been added.")]
    AlreadyRegistered(&'static str),

    /// A dependency of a constructor, property or method could not be produced
    #[error("Unable to resolve {member} of {owner}: {source}")]
    Unresolvable {
        owner: &'static str,
        member: &'static str,
        #[source]
        source: Box<DiError>,
    },
    /// A configuration value is present but not convertible to the target type
    #[error("Cannot convert '{value}' to {target}.")]
    Conversion { target: &'static str, value: String },
    /// A non-nullable configuration target has no value
    #[error("The configuration key '{key}' has no value to bind to {target}.")]
    MissingConfiguration { key: String, target: &'static str },
    /// A factory produced no value for a registered service
    #[error("The factory for service {0} returned no value.")]
    NullService(&'static str),
    /// A constructor or setter read an argument it was not given
    #[error("Invalid argument access: {0}")]
    Argument(String),
    /// Error raised by user supplied resolvers or filters
    #[error("{0}")]
    Custom(String),
}

impl DiError {
    /// Whether this error is a plain "service not registered" miss.
    pub fn is_not_found(&self) -> bool {
        matches!(self, DiError::NotFound(_))
    }
}

/// Result type for DI operations
///
/// A convenience type alias for `Result<T, DiError>` used throughout ferrous-wire.
pub type DiResult<T> = Result<T, DiError>;
