//! Resolver traits for service resolution.

use std::sync::Arc;

use crate::error::{DiError, DiResult};
use crate::key::{key_of_trait, key_of_type, Key};
use crate::registration::AnyArc;

/// Core resolver trait for object-safe service resolution.
///
/// This is what compiled factories, scanning filters and custom dependency
/// resolvers see of the container. It is implemented by
/// [`ServiceProvider`](crate::ServiceProvider), [`Scope`](crate::Scope) and
/// [`ResolverContext`](crate::ResolverContext).
///
/// Most callers use the [`Resolver`] extension methods instead.
pub trait ResolverCore: Send + Sync {
    /// Resolves the last registration for `key`.
    ///
    /// Returns [`DiError::NotFound`] when nothing is registered under the key.
    fn resolve_any(&self, key: &Key) -> DiResult<AnyArc>;

    /// Resolves every registration for `key`, in registration order.
    ///
    /// An unregistered key yields an empty vector.
    fn resolve_many(&self, key: &Key) -> DiResult<Vec<AnyArc>>;
}

/// High-level resolver interface with generic methods for type-safe service resolution.
///
/// Implemented for every [`ResolverCore`], trait objects included.
///
/// # Examples
///
/// ```
/// use ferrous_wire::{ServiceCollection, Resolver};
/// use std::sync::Arc;
///
/// trait Logger: Send + Sync {
///     fn log(&self, msg: &str);
/// }
///
/// struct ConsoleLogger;
/// impl Logger for ConsoleLogger {
///     fn log(&self, msg: &str) {
///         println!("LOG: {}", msg);
///     }
/// }
///
/// let mut collection = ServiceCollection::new();
/// collection.add_singleton(42usize);
/// collection.add_singleton_trait(Arc::new(ConsoleLogger) as Arc<dyn Logger>);
///
/// let provider = collection.build();
/// assert_eq!(*provider.get_required::<usize>(), 42);
/// provider.get_required_trait::<dyn Logger>().log("resolved");
/// assert!(provider.get_optional::<String>().unwrap().is_none());
/// ```
pub trait Resolver: ResolverCore {
    /// Resolves a concrete service type.
    fn get<T: 'static + Send + Sync>(&self) -> DiResult<Arc<T>> {
        let any = self.resolve_any(&key_of_type::<T>())?;
        any.downcast::<T>()
            .map_err(|_| DiError::TypeMismatch(std::any::type_name::<T>()))
    }

    /// Resolves a single trait implementation (the last one registered).
    fn get_trait<T: ?Sized + 'static + Send + Sync>(&self) -> DiResult<Arc<T>>
    where
        Arc<T>: 'static,
    {
        let any = self.resolve_any(&key_of_trait::<T>())?;
        downcast_trait::<T>(any)
    }

    /// Resolves a concrete service type, yielding `None` when it is not registered.
    fn get_optional<T: 'static + Send + Sync>(&self) -> DiResult<Option<Arc<T>>> {
        match self.get::<T>() {
            Ok(value) => Ok(Some(value)),
            Err(DiError::NotFound(_)) => Ok(None),
            Err(e) => Err(e),
        }
    }

    /// Resolves a trait implementation, yielding `None` when it is not registered.
    fn get_optional_trait<T: ?Sized + 'static + Send + Sync>(&self) -> DiResult<Option<Arc<T>>>
    where
        Arc<T>: 'static,
    {
        match self.get_trait::<T>() {
            Ok(value) => Ok(Some(value)),
            Err(DiError::NotFound(_)) => Ok(None),
            Err(e) => Err(e),
        }
    }

    /// Resolves every registration of a concrete type.
    fn get_all<T: 'static + Send + Sync>(&self) -> DiResult<Vec<Arc<T>>> {
        self.resolve_many(&key_of_type::<T>())?
            .into_iter()
            .map(|any| {
                any.downcast::<T>()
                    .map_err(|_| DiError::TypeMismatch(std::any::type_name::<T>()))
            })
            .collect()
    }

    /// Resolves every registered implementation of a trait.
    fn get_all_trait<T: ?Sized + 'static + Send + Sync>(&self) -> DiResult<Vec<Arc<T>>>
    where
        Arc<T>: 'static,
    {
        self.resolve_many(&key_of_trait::<T>())?
            .into_iter()
            .map(downcast_trait::<T>)
            .collect()
    }

    /// Resolves a concrete service type, panicking on failure.
    fn get_required<T: 'static + Send + Sync>(&self) -> Arc<T> {
        self.get::<T>()
            .unwrap_or_else(|e| panic!("Failed to resolve {}: {}", std::any::type_name::<T>(), e))
    }

    /// Resolves a trait implementation, panicking on failure.
    fn get_required_trait<T: ?Sized + 'static + Send + Sync>(&self) -> Arc<T>
    where
        Arc<T>: 'static,
    {
        self.get_trait::<T>()
            .unwrap_or_else(|e| panic!("Failed to resolve trait {}: {}", std::any::type_name::<T>(), e))
    }
}

impl<R: ResolverCore + ?Sized> Resolver for R {}

/// Trait services are stored as `Arc<Arc<dyn Trait>>`.
pub(crate) fn downcast_trait<T: ?Sized + 'static + Send + Sync>(any: AnyArc) -> DiResult<Arc<T>> {
    any.downcast::<Arc<T>>()
        .map(|boxed| (*boxed).clone())
        .map_err(|_| DiError::TypeMismatch(std::any::type_name::<T>()))
}
