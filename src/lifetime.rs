//! Service lifetime definitions.

/// Service lifetimes controlling instance caching behavior
///
/// A lifetime is carried by every registration marker and every
/// [`ServiceDescriptor`](crate::ServiceDescriptor). The activation layer never
/// caches instances itself; the provider applies the lifetime when it invokes
/// a compiled factory.
///
/// # Examples
///
/// ```rust
/// use ferrous_wire::{ServiceCollection, Resolver};
/// use std::sync::Arc;
///
/// struct Database { url: String }
/// struct Repository { db_url: String }
///
/// let mut services = ServiceCollection::new();
/// services.add_singleton(Database { url: "postgres://localhost".to_string() });
/// services.add_scoped_factory::<Repository, _>(|r| {
///     let db = r.get_required::<Database>();
///     Repository { db_url: db.url.clone() }
/// });
///
/// let provider = services.build();
/// let scope = provider.create_scope();
/// let a = scope.get_required::<Repository>();
/// let b = scope.get_required::<Repository>();
/// assert!(Arc::ptr_eq(&a, &b)); // Same within scope
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Lifetime {
    /// Single instance per root provider, cached forever
    Singleton,
    /// Single instance per scope, cached for scope lifetime
    Scoped,
    /// New instance per resolution, never cached
    Transient,
}
