//! Activation: compiling type metadata into service factories.
//!
//! An activator turns a [`TypeMetadata`] into a factory that builds the type
//! through its selected constructor and injects its selected properties, and a
//! [`MethodInfo`] into a factory that calls the method with resolved
//! arguments. All selection work happens once, when the factory is compiled;
//! the returned closures only resolve and invoke.

use std::fmt;
use std::sync::Arc;

use tracing::trace;

use crate::metadata::members::{ErasedConstructor, ErasedInvoker, ErasedSetter};
use crate::metadata::{
    Accessor, Argument, Arguments, ConstructorInfo, MethodInfo, Parameter, PropertyInfo, TypeMetadata, TypeRef,
};
use crate::provider::ResolverContext;
use crate::registration::{AnyArc, ServiceFactory};
use crate::resolution::Resolution;
use crate::{DiError, DiResult};

/// Factory compiled from a type's constructor and properties.
#[derive(Clone)]
pub struct InstanceFactory {
    type_name: &'static str,
    create: ServiceFactory,
}

impl InstanceFactory {
    /// Builds a new instance, resolving dependencies from `ctx`.
    pub fn create(&self, ctx: &ResolverContext<'_>) -> DiResult<AnyArc> {
        (self.create)(ctx)
    }

    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    /// The factory as a container construction function.
    pub fn service_factory(&self) -> ServiceFactory {
        Arc::clone(&self.create)
    }
}

impl fmt::Debug for InstanceFactory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InstanceFactory").field("type_name", &self.type_name).finish()
    }
}

type MethodInvoke = Arc<dyn for<'a> Fn(&ResolverContext<'a>) -> DiResult<Option<AnyArc>> + Send + Sync>;

/// Factory compiled from a static method.
#[derive(Clone)]
pub struct MethodFactory {
    method: String,
    returns: crate::Key,
    invoke: MethodInvoke,
}

impl MethodFactory {
    /// Calls the method; `None` when a nullable method returned nothing.
    pub fn invoke(&self, ctx: &ResolverContext<'_>) -> DiResult<Option<AnyArc>> {
        (self.invoke)(ctx)
    }

    pub fn method(&self) -> &str {
        &self.method
    }

    pub fn returns(&self) -> crate::Key {
        self.returns
    }
}

impl fmt::Debug for MethodFactory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MethodFactory")
            .field("method", &self.method)
            .field("returns", &self.returns)
            .finish()
    }
}

/// Compiles metadata into factories.
///
/// The scanner looks the activator up in the container as
/// `dyn ServiceActivator`, so it can be replaced, e.g. by a test double.
pub trait ServiceActivator: Send + Sync {
    fn instance_factory(&self, metadata: &TypeMetadata) -> DiResult<InstanceFactory>;

    fn method_factory(&self, method: &MethodInfo) -> DiResult<MethodFactory>;
}

/// Activator driven by the injection markers in the metadata.
///
/// # Examples
///
/// ```
/// use ferrous_wire::{
///     ConstructorInfo, DefaultActivator, Parameter, Resolver, ServiceActivator, ServiceCollection,
///     TypeMetadata,
/// };
/// use std::sync::Arc;
///
/// struct Gear;
/// struct Widget { gear: Arc<Gear> }
///
/// let metadata = TypeMetadata::builder::<Widget>()
///     .constructor(ConstructorInfo::new(vec![Parameter::service::<Gear>("gear")], |args| {
///         Ok(Widget { gear: args.service::<Gear>()? })
///     }))
///     .build();
///
/// let mut services = ServiceCollection::new();
/// services.add_singleton(Gear);
/// let provider = services.build();
///
/// let factory = DefaultActivator.instance_factory(&metadata).unwrap();
/// let widget = factory.create(&provider.context()).unwrap().downcast::<Widget>().unwrap();
/// assert!(Arc::ptr_eq(&widget.gear, &provider.get_required::<Gear>()));
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultActivator;

/// A parameter or property with its effective resolution.
struct Member {
    name: &'static str,
    ty: TypeRef,
    resolution: Resolution,
}

impl Member {
    fn compile(owner: &'static str, name: &'static str, ty: TypeRef, resolution: Option<&Resolution>) -> DiResult<Self> {
        let resolution = resolution.cloned().unwrap_or(Resolution::Required);
        if matches!(resolution, Resolution::Configuration(_)) && !ty.is_bindable() {
            return Err(DiError::NotBindable {
                owner,
                member: name,
                target: ty.key().display_name(),
            });
        }
        Ok(Self { name, ty, resolution })
    }

    fn resolve(&self, owner: &'static str, ctx: &ResolverContext<'_>) -> DiResult<Argument> {
        self.resolution
            .resolve(ctx, &self.ty)
            .map(|value| Argument::new(self.name, value))
            .map_err(|source| unresolvable(owner, self.name, source))
    }
}

fn unresolvable(owner: &'static str, member: &'static str, source: DiError) -> DiError {
    match source {
        DiError::Circular(_) | DiError::DepthExceeded(_) => source,
        source => DiError::Unresolvable { owner, member, source: Box::new(source) },
    }
}

fn compile_parameters(owner: &'static str, parameters: &[Parameter]) -> DiResult<Vec<Member>> {
    parameters
        .iter()
        .map(|p| Member::compile(owner, p.name(), *p.ty(), p.resolution()))
        .collect()
}

fn resolve_all(owner: &'static str, members: &[Member], ctx: &ResolverContext<'_>) -> DiResult<Arguments> {
    let values = members
        .iter()
        .map(|member| member.resolve(owner, ctx))
        .collect::<DiResult<Vec<_>>>()?;
    Ok(Arguments::new(owner, values))
}

fn select_constructor(metadata: &TypeMetadata) -> DiResult<&ConstructorInfo> {
    let name = metadata.name();
    if let [only] = metadata.constructors() {
        return Ok(only);
    }

    let mut designated = metadata.constructors().iter().filter(|c| c.is_designated());
    match (designated.next(), designated.next()) {
        (Some(ctor), None) => Ok(ctor),
        (None, _) => Err(DiError::NoUniqueConstructor(name)),
        (Some(_), Some(_)) => Err(DiError::AmbiguousConstructor(name)),
    }
}

fn is_injected(metadata: &TypeMetadata, property: &PropertyInfo) -> bool {
    if property.setter.is_none() {
        return false;
    }
    property.resolution().is_some()
        || (property.accessor() == Accessor::InitOnly && metadata.injects_all_init_only())
}

impl ServiceActivator for DefaultActivator {
    fn instance_factory(&self, metadata: &TypeMetadata) -> DiResult<InstanceFactory> {
        let owner = metadata.name();
        if metadata.is_generic() {
            return Err(DiError::GenericType(owner));
        }

        let constructor = select_constructor(metadata)?;
        if constructor.produces != metadata.key() {
            return Err(DiError::TypeMismatch(owner));
        }
        let parameters = compile_parameters(owner, constructor.parameters())?;
        let construct: ErasedConstructor = Arc::clone(&constructor.construct);

        let properties = metadata
            .properties()
            .iter()
            .filter(|p| is_injected(metadata, p))
            .filter_map(|p| {
                let setter = p.setter.clone()?;
                Some(Member::compile(owner, p.name(), *p.ty(), p.resolution()).map(|m| (m, setter)))
            })
            .collect::<DiResult<Vec<(Member, ErasedSetter)>>>()?;

        trace!(
            service = owner,
            parameters = parameters.len(),
            properties = properties.len(),
            "Compiled instance factory"
        );

        let create = move |ctx: &ResolverContext<'_>| -> DiResult<AnyArc> {
            let mut args = resolve_all(owner, &parameters, ctx)?;
            let mut instance = construct(&mut args)?;
            for (member, setter) in &properties {
                let value = member.resolve(owner, ctx)?;
                setter(instance.as_mut(), value)?;
            }
            Ok(Arc::from(instance))
        };

        Ok(InstanceFactory { type_name: owner, create: Arc::new(create) })
    }

    fn method_factory(&self, method: &MethodInfo) -> DiResult<MethodFactory> {
        let name = method.display_name();
        if !method.is_static() {
            return Err(DiError::NonStaticFactory(name));
        }
        if method.is_generic() {
            return Err(DiError::GenericFactory(name));
        }

        let owner = method.name();
        let parameters = compile_parameters(owner, method.parameters())?;
        let invoker: ErasedInvoker = Arc::clone(&method.invoke);

        trace!(method = %name, parameters = parameters.len(), "Compiled method factory");

        let invoke = move |ctx: &ResolverContext<'_>| -> DiResult<Option<AnyArc>> {
            let mut args = resolve_all(owner, &parameters, ctx)?;
            invoker(&mut args)
        };

        Ok(MethodFactory { method: name, returns: method.return_type(), invoke: Arc::new(invoke) })
    }
}
