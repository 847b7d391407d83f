//! Declarative markers attached to type metadata.
//!
//! Registration markers say under which service type and lifetime a type or
//! factory method is registered. Scanning filters decide whether a type or
//! method is visited at all.

use crate::key::{key_of_trait, key_of_type, Key};
use crate::lifetime::Lifetime;

mod filters;

pub use filters::{ConditionSelector, ConfigurationSelector, EnvironmentSelector, ScanningFilter};

macro_rules! registration_marker {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq)]
        pub struct $name {
            /// Lifetime of the emitted registration
            pub lifetime: Lifetime,
            /// Explicit service type; `None` registers the element's own type
            pub service_type: Option<Key>,
        }

        impl $name {
            pub fn new(lifetime: Lifetime) -> Self {
                Self { lifetime, service_type: None }
            }

            pub fn singleton() -> Self {
                Self::new(Lifetime::Singleton)
            }

            pub fn scoped() -> Self {
                Self::new(Lifetime::Scoped)
            }

            pub fn transient() -> Self {
                Self::new(Lifetime::Transient)
            }

            /// Registers under the concrete type `S` instead.
            pub fn service<S: 'static>(mut self) -> Self {
                self.service_type = Some(key_of_type::<S>());
                self
            }

            /// Registers under the trait object `S`, e.g. `service_trait::<dyn Logger>()`.
            pub fn service_trait<S: ?Sized + 'static>(mut self) -> Self {
                self.service_type = Some(key_of_trait::<S>());
                self
            }
        }
    };
}

registration_marker! {
    /// Registers a type as a service built through its constructor.
    ///
    /// A type may carry several markers; each one yields its own registration.
    ///
    /// # Examples
    ///
    /// ```
    /// use ferrous_wire::{key_of_trait, Lifetime, RegisterService};
    ///
    /// trait Clock: Send + Sync {}
    ///
    /// let marker = RegisterService::scoped().service_trait::<dyn Clock>();
    /// assert_eq!(marker.lifetime, Lifetime::Scoped);
    /// assert_eq!(marker.service_type, Some(key_of_trait::<dyn Clock>()));
    /// ```
    RegisterService
}

registration_marker! {
    /// Registers a static method as a factory for its return type.
    RegisterFactory
}
