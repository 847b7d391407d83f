//! Service key types for the dependency injection container.

use std::any::TypeId;

/// Key for service storage and lookup.
///
/// A key is the "service type" of a registration: either a concrete type or a
/// trait object. Trait objects are stored as `Arc<Arc<dyn Trait>>` inside the
/// type-erased value so they can be downcast back to `Arc<dyn Trait>`.
///
/// # Examples
///
/// ```rust
/// use ferrous_wire::{key_of_trait, key_of_type, Key};
///
/// trait Logger: Send + Sync {}
///
/// let number = key_of_type::<u32>();
/// let logger = key_of_trait::<dyn Logger>();
///
/// assert_eq!(number.display_name(), "u32");
/// assert!(matches!(logger, Key::Trait(_)));
/// assert_ne!(number, logger);
/// ```
#[derive(Debug, Clone, Copy)]
pub enum Key {
    /// Concrete type key with TypeId and name for diagnostics
    Type(TypeId, &'static str),
    /// Trait object key, identified by the trait object's type name
    Trait(&'static str),
}

impl Key {
    /// Get the type or trait name for display
    ///
    /// This is the `std::any::type_name` of the service type and is what
    /// error messages refer to.
    pub fn display_name(&self) -> &'static str {
        match self {
            Key::Type(_, name) => name,
            Key::Trait(name) => name,
        }
    }

    /// The `TypeId` of a concrete type key.
    pub fn type_id(&self) -> Option<TypeId> {
        match self {
            Key::Type(id, _) => Some(*id),
            Key::Trait(_) => None,
        }
    }
}

// TypeId-only comparison for concrete types
impl PartialEq for Key {
    #[inline(always)]
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Key::Type(a, _), Key::Type(b, _)) => a == b,
            (Key::Trait(a), Key::Trait(b)) => a == b,
            _ => false,
        }
    }
}

impl Eq for Key {}

impl std::hash::Hash for Key {
    #[inline(always)]
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        match self {
            Key::Type(id, _) => {
                0u8.hash(state);
                id.hash(state);
            }
            Key::Trait(name) => {
                1u8.hash(state);
                name.hash(state);
            }
        }
    }
}

impl std::fmt::Display for Key {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.display_name())
    }
}

/// Key of a concrete service type.
#[inline(always)]
pub fn key_of_type<T: 'static>() -> Key {
    Key::Type(TypeId::of::<T>(), std::any::type_name::<T>())
}

/// Key of a trait object service type, e.g. `key_of_trait::<dyn Logger>()`.
#[inline(always)]
pub fn key_of_trait<T: ?Sized + 'static>() -> Key {
    Key::Trait(std::any::type_name::<T>())
}
