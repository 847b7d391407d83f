//! Merging planned descriptors into a collection, and scanning entry points.

use std::sync::Arc;

use rayon::prelude::*;
use tracing::debug;

use super::ServiceCollection;
use crate::activator::{DefaultActivator, ServiceActivator};
use crate::metadata::{Scannable, TypeMetadata};
use crate::scanner::plan_registrations;
use crate::{key_of_trait, DiError, DiResult, ServiceDescriptor};

/// How a descriptor is applied when its service may already be registered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MergeStrategy {
    /// Append; earlier registrations stay resolvable through `get_all`
    Add,
    /// Remove every registration for the service, then append
    #[default]
    Replace,
    /// Append only when the service has no registration
    TryAdd,
    /// Fail when the service already has a registration
    Throw,
}

impl ServiceCollection {
    /// Applies one descriptor with the given strategy.
    ///
    /// # Examples
    ///
    /// ```
    /// use ferrous_wire::{key_of_type, DiError, Lifetime, MergeStrategy, ServiceCollection, ServiceDescriptor};
    /// use std::sync::Arc;
    ///
    /// let descriptor = ServiceDescriptor::from_fn(key_of_type::<u8>(), Lifetime::Transient, |_| {
    ///     Ok(Arc::new(1u8) as ferrous_wire::AnyArc)
    /// });
    ///
    /// let mut services = ServiceCollection::new();
    /// services.add_singleton(0u8);
    /// let result = services.merge(descriptor, MergeStrategy::Throw);
    /// assert!(matches!(result, Err(DiError::AlreadyRegistered(_))));
    /// assert_eq!(services.len(), 1);
    /// ```
    pub fn merge(&mut self, descriptor: ServiceDescriptor, strategy: MergeStrategy) -> DiResult<&mut Self> {
        let service = descriptor.service;
        match strategy {
            MergeStrategy::Add => {
                self.add_descriptor(descriptor);
            }
            MergeStrategy::Replace => {
                self.replace_descriptor(descriptor);
            }
            MergeStrategy::TryAdd => {
                if !self.try_add_descriptor(descriptor) {
                    debug!(service = %service, "Skipped registration, service already present");
                }
            }
            MergeStrategy::Throw => {
                if self.contains(&service) {
                    return Err(DiError::AlreadyRegistered(service.display_name()));
                }
                self.add_descriptor(descriptor);
            }
        }
        Ok(self)
    }

    /// Applies descriptors in order. Stops at the first failure; descriptors
    /// merged before it stay applied.
    pub fn merge_all<I>(&mut self, descriptors: I, strategy: MergeStrategy) -> DiResult<&mut Self>
    where
        I: IntoIterator<Item = ServiceDescriptor>,
    {
        for descriptor in descriptors {
            self.merge(descriptor, strategy)?;
        }
        Ok(self)
    }

    /// Plans registrations for every type and merges them.
    ///
    /// Types are planned in parallel against a snapshot of the collection, so
    /// filters and activators see the registrations made before the call.
    /// Descriptors are merged in type order.
    pub fn scan_types(&mut self, types: &[TypeMetadata], strategy: MergeStrategy) -> DiResult<&mut Self> {
        if !self.contains(&key_of_trait::<dyn ServiceActivator>()) {
            self.add_activator(Arc::new(DefaultActivator));
        }

        let provider = self.snapshot();
        let planned = types
            .par_iter()
            .map(|metadata| plan_registrations(metadata, &provider))
            .collect::<DiResult<Vec<_>>>()?;

        debug!(
            types = types.len(),
            descriptors = planned.iter().map(Vec::len).sum::<usize>(),
            ?strategy,
            "Planned scanned registrations"
        );
        self.merge_all(planned.into_iter().flatten(), strategy)
    }

    /// Like [`scan_types`](Self::scan_types), restricted to the types accepted
    /// by `predicate`.
    pub fn scan_types_where<P>(&mut self, types: &[TypeMetadata], predicate: P, strategy: MergeStrategy) -> DiResult<&mut Self>
    where
        P: Fn(&TypeMetadata) -> bool,
    {
        let selected: Vec<TypeMetadata> = types.iter().filter(|t| predicate(t)).cloned().collect();
        self.scan_types(&selected, strategy)
    }

    /// Scans a single self-describing type.
    pub fn scan<T: Scannable>(&mut self, strategy: MergeStrategy) -> DiResult<&mut Self> {
        self.scan_types(&[T::metadata()], strategy)
    }
}
