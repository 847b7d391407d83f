//! Service registration types.

use std::any::Any;
use std::sync::Arc;

use crate::error::DiResult;
use crate::key::Key;
use crate::lifetime::Lifetime;
use crate::provider::ResolverContext;

/// Type-erased shared service instance.
///
/// Concrete services are stored as `Arc<T>`; trait services as
/// `Arc<Arc<dyn Trait>>`.
pub type AnyArc = Arc<dyn Any + Send + Sync>;

/// Type-erased construction function shared by registrations and descriptors.
pub type ServiceFactory = Arc<dyn for<'a> Fn(&ResolverContext<'a>) -> DiResult<AnyArc> + Send + Sync>;

/// Service registration with lifetime and constructor
#[derive(Clone)]
pub(crate) struct Registration {
    pub(crate) lifetime: Lifetime,
    pub(crate) ctor: ServiceFactory,
    /// Implementation type name for diagnostics
    pub(crate) implementation: Option<&'static str>,
}

impl Registration {
    pub(crate) fn new(lifetime: Lifetime, ctor: ServiceFactory, implementation: Option<&'static str>) -> Self {
        Self { lifetime, ctor, implementation }
    }
}

/// Ordered registration list.
///
/// Registrations keep their insertion order. Several registrations may share a
/// key; single resolution uses the last one, [`get_all`](Registry::get_all)
/// returns all of them in order. Slots are indices into the list and are what
/// the provider and scopes cache instances by.
#[derive(Clone, Default)]
pub(crate) struct Registry {
    entries: Vec<(Key, Registration)>,
}

impl Registry {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Appends a registration, keeping any existing one for the same key.
    pub(crate) fn push(&mut self, key: Key, registration: Registration) {
        self.entries.push((key, registration));
    }

    /// Removes every registration for `key`, returning how many were removed.
    pub(crate) fn remove_all(&mut self, key: &Key) -> usize {
        let before = self.entries.len();
        self.entries.retain(|(k, _)| k != key);
        before - self.entries.len()
    }

    /// Replaces all registrations for `key` with a single new one.
    pub(crate) fn insert(&mut self, key: Key, registration: Registration) {
        self.remove_all(&key);
        self.push(key, registration);
    }

    /// Last registration for `key`, together with its slot.
    #[inline(always)]
    pub(crate) fn get(&self, key: &Key) -> Option<(usize, &Registration)> {
        self.entries
            .iter()
            .enumerate()
            .rev()
            .find(|(_, (k, _))| k == key)
            .map(|(slot, (_, reg))| (slot, reg))
    }

    /// All registrations for `key`, in registration order.
    pub(crate) fn get_all(&self, key: &Key) -> Vec<(usize, &Registration)> {
        self.entries
            .iter()
            .enumerate()
            .filter(|(_, (k, _))| k == key)
            .map(|(slot, (_, reg))| (slot, reg))
            .collect()
    }

    #[inline(always)]
    pub(crate) fn contains_key(&self, key: &Key) -> bool {
        self.entries.iter().any(|(k, _)| k == key)
    }

    pub(crate) fn len(&self) -> usize {
        self.entries.len()
    }

    pub(crate) fn iter(&self) -> impl Iterator<Item = (&Key, &Registration)> {
        self.entries.iter().map(|(k, r)| (k, r))
    }
}
