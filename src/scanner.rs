//! Registration planning: turning type metadata into service descriptors.
//!
//! Planning never touches the collection. It reads filters and the activator
//! from a provider snapshot and returns descriptors for the merge step.

use std::sync::Arc;

use tracing::debug;

use crate::activator::{DefaultActivator, ServiceActivator};
use crate::attributes::ScanningFilter;
use crate::metadata::{MethodInfo, TypeMetadata, Visibility};
use crate::provider::ResolverContext;
use crate::registration::AnyArc;
use crate::traits::Resolver;
use crate::{DiError, DiResult, ServiceDescriptor, ServiceProvider};

fn activator(provider: &ServiceProvider) -> DiResult<Arc<dyn ServiceActivator>> {
    Ok(provider
        .get_optional_trait::<dyn ServiceActivator>()?
        .unwrap_or_else(|| Arc::new(DefaultActivator)))
}

fn accepts(filters: &[Arc<dyn ScanningFilter>], provider: &ServiceProvider) -> DiResult<bool> {
    for filter in filters {
        if !filter.can_scan(provider)? {
            return Ok(false);
        }
    }
    Ok(true)
}

/// Descriptors for the `RegisterService` markers of a type.
///
/// Static types and types rejected by a filter yield nothing. Every marker's
/// service type is checked before the factory is compiled.
pub fn scan_service_registrations(metadata: &TypeMetadata, provider: &ServiceProvider) -> DiResult<Vec<ServiceDescriptor>> {
    if metadata.is_static() || metadata.markers().is_empty() || !accepts(metadata.filters(), provider)? {
        return Ok(Vec::new());
    }

    let implementation = metadata.name();
    let targets = metadata
        .markers()
        .iter()
        .map(|marker| {
            let service = marker.service_type.unwrap_or(metadata.key());
            metadata
                .conversion_to(&service)
                .map(|alias| (marker, service, alias.cloned()))
                .ok_or(DiError::NotAssignable { implementation, service: service.display_name() })
        })
        .collect::<DiResult<Vec<_>>>()?;

    let factory = activator(provider)?.instance_factory(metadata)?;

    let descriptors = targets
        .into_iter()
        .map(|(marker, service, alias)| {
            debug!(
                service = %service,
                implementation,
                lifetime = ?marker.lifetime,
                "Planned service registration"
            );
            let descriptor = match alias {
                None => ServiceDescriptor::new(service, marker.lifetime, factory.service_factory()),
                Some(alias) => {
                    let factory = factory.clone();
                    ServiceDescriptor::from_fn(service, marker.lifetime, move |ctx| alias.apply(factory.create(ctx)?))
                }
            };
            descriptor.with_implementation(implementation)
        })
        .collect();
    Ok(descriptors)
}

fn is_candidate(method: &MethodInfo) -> bool {
    method.is_static() && method.visibility() == Visibility::Public && !method.markers().is_empty()
}

/// Descriptors for the `RegisterFactory` markers on a type's static methods.
pub fn scan_factory_registrations(metadata: &TypeMetadata, provider: &ServiceProvider) -> DiResult<Vec<ServiceDescriptor>> {
    if !accepts(metadata.filters(), provider)? {
        return Ok(Vec::new());
    }

    let mut descriptors = Vec::new();
    for method in metadata.methods().iter().filter(|m| is_candidate(m)) {
        if !accepts(method.filters(), provider)? {
            debug!(method = %method.display_name(), "Factory method rejected by filter");
            continue;
        }

        let returns = method.return_type();
        let targets = method
            .markers()
            .iter()
            .map(|marker| {
                let service = marker.service_type.unwrap_or(returns);
                if service == returns {
                    return Ok((marker, service, None));
                }
                method
                    .alias_for(&service)
                    .map(|alias| (marker, service, Some(alias.clone())))
                    .ok_or_else(|| DiError::FactoryNotAssignable {
                        method: method.display_name(),
                        return_type: returns.display_name(),
                        service: service.display_name(),
                    })
            })
            .collect::<DiResult<Vec<_>>>()?;

        let factory = activator(provider)?.method_factory(method)?;
        for (marker, service, alias) in targets {
            debug!(
                service = %service,
                method = %factory.method(),
                lifetime = ?marker.lifetime,
                "Planned factory registration"
            );
            let factory = factory.clone();
            let name = service.display_name();
            let descriptor = ServiceDescriptor::from_fn(service, marker.lifetime, move |ctx: &ResolverContext<'_>| {
                let value: AnyArc = factory.invoke(ctx)?.ok_or(DiError::NullService(name))?;
                match &alias {
                    Some(alias) => alias.apply(value),
                    None => Ok(value),
                }
            });
            descriptors.push(descriptor.with_implementation(returns.display_name()));
        }
    }
    Ok(descriptors)
}

/// Service registrations followed by factory registrations.
pub fn plan_registrations(metadata: &TypeMetadata, provider: &ServiceProvider) -> DiResult<Vec<ServiceDescriptor>> {
    let mut descriptors = scan_service_registrations(metadata, provider)?;
    descriptors.extend(scan_factory_registrations(metadata, provider)?);
    Ok(descriptors)
}
