//! Dependency resolution strategies for parameters and properties.

use std::fmt;
use std::sync::Arc;

use crate::config::Configuration;
use crate::metadata::TypeRef;
use crate::provider::ResolverContext;
use crate::registration::AnyArc;
use crate::traits::{Resolver, ResolverCore};
use crate::{DiError, DiResult};

/// User supplied resolution logic.
///
/// Returning `Ok(None)` produces an absent argument, which only optional
/// accessors accept.
pub trait DependencyResolver: Send + Sync {
    fn resolve(&self, ctx: &ResolverContext<'_>, target: &TypeRef) -> DiResult<Option<AnyArc>>;
}

/// How the value of a parameter or property is obtained.
///
/// Members without an explicit resolution use [`Resolution::Required`].
///
/// # Examples
///
/// ```
/// use ferrous_wire::{MemoryConfiguration, Resolution, ServiceCollection, TypeRef};
/// use std::time::Duration;
///
/// let mut services = ServiceCollection::new();
/// services.add_configuration(MemoryConfiguration::from_pairs([("Http:Timeout", "00:00:30")]));
/// let provider = services.build();
///
/// let timeout = Resolution::configuration("Http:Timeout")
///     .resolve(&provider.context(), &TypeRef::bindable::<Duration>())
///     .unwrap()
///     .unwrap();
/// assert_eq!(*timeout.downcast::<Duration>().unwrap(), Duration::from_secs(30));
/// ```
#[derive(Clone)]
pub enum Resolution {
    /// Container lookup; a missing registration is an error
    Required,
    /// Container lookup; a missing registration or a null factory result yields no value
    Optional,
    /// Binds the configuration value under the given key
    Configuration(String),
    /// Delegates to user logic
    Custom(Arc<dyn DependencyResolver>),
}

impl Resolution {
    pub fn configuration(key: impl Into<String>) -> Self {
        Resolution::Configuration(key.into())
    }

    pub fn custom<R: DependencyResolver + 'static>(resolver: R) -> Self {
        Resolution::Custom(Arc::new(resolver))
    }

    /// Produces the value for `target`. Nothing is cached between calls.
    pub fn resolve(&self, ctx: &ResolverContext<'_>, target: &TypeRef) -> DiResult<Option<AnyArc>> {
        match self {
            Resolution::Required => ctx.resolve_any(&target.key()).map(Some),
            Resolution::Optional => match ctx.resolve_any(&target.key()) {
                Ok(value) => Ok(Some(value)),
                // Only the target itself being unregistered or null counts as absence
                Err(DiError::NotFound(name) | DiError::NullService(name))
                    if name == target.key().display_name() =>
                {
                    Ok(None)
                }
                Err(e) => Err(e),
            },
            Resolution::Configuration(key) => {
                let bind = target.binder().ok_or_else(|| {
                    DiError::Custom(format!(
                        "The type {} cannot be bound from configuration.",
                        target.key()
                    ))
                })?;
                let configuration = ctx.get_trait::<dyn Configuration>()?;
                bind(configuration.as_ref(), key).map(Some)
            }
            Resolution::Custom(resolver) => resolver.resolve(ctx, target),
        }
    }
}

impl fmt::Debug for Resolution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Resolution::Required => f.write_str("Required"),
            Resolution::Optional => f.write_str("Optional"),
            Resolution::Configuration(key) => f.debug_tuple("Configuration").field(key).finish(),
            Resolution::Custom(_) => f.write_str("Custom"),
        }
    }
}
