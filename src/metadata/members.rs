//! Constructors, properties and factory methods of a described type.

use std::any::Any;
use std::fmt;
use std::sync::Arc;

use super::arguments::{Argument, Arguments};
use super::{Parameter, ServiceAlias, TypeRef, Visibility};
use crate::attributes::{RegisterFactory, ScanningFilter};
use crate::registration::AnyArc;
use crate::resolution::{DependencyResolver, Resolution};
use crate::{key_of_trait, key_of_type, DiError, DiResult, Key};

pub(crate) type ErasedConstructor =
    Arc<dyn Fn(&mut Arguments) -> DiResult<Box<dyn Any + Send + Sync>> + Send + Sync>;
pub(crate) type ErasedSetter =
    Arc<dyn Fn(&mut (dyn Any + Send + Sync), Argument) -> DiResult<()> + Send + Sync>;
pub(crate) type ErasedInvoker = Arc<dyn Fn(&mut Arguments) -> DiResult<Option<AnyArc>> + Send + Sync>;

/// A constructor: its parameters and the code building the instance.
#[derive(Clone)]
pub struct ConstructorInfo {
    pub(crate) parameters: Vec<Parameter>,
    pub(crate) visibility: Visibility,
    pub(crate) designated: bool,
    pub(crate) produces: Key,
    pub(crate) construct: ErasedConstructor,
}

impl ConstructorInfo {
    pub fn new<T, F>(parameters: Vec<Parameter>, construct: F) -> Self
    where
        T: Send + Sync + 'static,
        F: Fn(&mut Arguments) -> DiResult<T> + Send + Sync + 'static,
    {
        Self {
            parameters,
            visibility: Visibility::Public,
            designated: false,
            produces: key_of_type::<T>(),
            construct: Arc::new(move |args: &mut Arguments| {
                construct(args).map(|value| Box::new(value) as Box<dyn Any + Send + Sync>)
            }),
        }
    }

    /// Marks this constructor as the one to use when a type has several.
    pub fn designated(mut self) -> Self {
        self.designated = true;
        self
    }

    pub fn non_public(mut self) -> Self {
        self.visibility = Visibility::NonPublic;
        self
    }

    pub fn parameters(&self) -> &[Parameter] {
        &self.parameters
    }

    pub fn visibility(&self) -> Visibility {
        self.visibility
    }

    pub fn is_designated(&self) -> bool {
        self.designated
    }
}

impl fmt::Debug for ConstructorInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConstructorInfo")
            .field("parameters", &self.parameters)
            .field("visibility", &self.visibility)
            .field("designated", &self.designated)
            .finish()
    }
}

/// How a property can be assigned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Accessor {
    /// No setter
    ReadOnly,
    /// Assignable at any time
    Mutable,
    /// Assignable only while the instance is being built
    InitOnly,
}

/// An instance property.
#[derive(Clone)]
pub struct PropertyInfo {
    pub(crate) name: &'static str,
    pub(crate) ty: TypeRef,
    pub(crate) accessor: Accessor,
    pub(crate) visibility: Visibility,
    pub(crate) resolution: Option<Resolution>,
    pub(crate) setter: Option<ErasedSetter>,
}

fn erase_setter<T, F>(setter: F) -> ErasedSetter
where
    T: Send + Sync + 'static,
    F: Fn(&mut T, Argument) -> DiResult<()> + Send + Sync + 'static,
{
    Arc::new(move |target: &mut (dyn Any + Send + Sync), value: Argument| {
        let target = target
            .downcast_mut::<T>()
            .ok_or(DiError::TypeMismatch(std::any::type_name::<T>()))?;
        setter(target, value)
    })
}

impl PropertyInfo {
    /// A plain settable property. Only injected when it carries a resolution.
    pub fn mutable<T, F>(name: &'static str, ty: TypeRef, setter: F) -> Self
    where
        T: Send + Sync + 'static,
        F: Fn(&mut T, Argument) -> DiResult<()> + Send + Sync + 'static,
    {
        Self::with_setter(name, ty, Accessor::Mutable, Some(erase_setter(setter)))
    }

    /// A property assignable only during construction.
    pub fn init_only<T, F>(name: &'static str, ty: TypeRef, setter: F) -> Self
    where
        T: Send + Sync + 'static,
        F: Fn(&mut T, Argument) -> DiResult<()> + Send + Sync + 'static,
    {
        Self::with_setter(name, ty, Accessor::InitOnly, Some(erase_setter(setter)))
    }

    /// A property without setter. Never injected.
    pub fn read_only(name: &'static str, ty: TypeRef) -> Self {
        Self::with_setter(name, ty, Accessor::ReadOnly, None)
    }

    fn with_setter(name: &'static str, ty: TypeRef, accessor: Accessor, setter: Option<ErasedSetter>) -> Self {
        Self {
            name,
            ty,
            accessor,
            visibility: Visibility::Public,
            resolution: None,
            setter,
        }
    }

    pub fn inject(mut self, resolution: Resolution) -> Self {
        self.resolution = Some(resolution);
        self
    }

    pub fn required(self) -> Self {
        self.inject(Resolution::Required)
    }

    pub fn optional(self) -> Self {
        self.inject(Resolution::Optional)
    }

    pub fn configuration(self, key: impl Into<String>) -> Self {
        self.inject(Resolution::configuration(key))
    }

    pub fn resolve_with<R: DependencyResolver + 'static>(self, resolver: R) -> Self {
        self.inject(Resolution::custom(resolver))
    }

    pub fn non_public(mut self) -> Self {
        self.visibility = Visibility::NonPublic;
        self
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn ty(&self) -> &TypeRef {
        &self.ty
    }

    pub fn accessor(&self) -> Accessor {
        self.accessor
    }

    pub fn visibility(&self) -> Visibility {
        self.visibility
    }

    pub fn resolution(&self) -> Option<&Resolution> {
        self.resolution.as_ref()
    }

    /// Rebinds the setter to a derived type holding this property's owner.
    pub(crate) fn project<T, B>(&self, project: fn(&mut T) -> &mut B) -> Self
    where
        T: Send + Sync + 'static,
        B: Send + Sync + 'static,
    {
        let setter = self.setter.clone().map(|base| -> ErasedSetter {
            Arc::new(move |target: &mut (dyn Any + Send + Sync), value: Argument| {
                let derived = target
                    .downcast_mut::<T>()
                    .ok_or(DiError::TypeMismatch(std::any::type_name::<T>()))?;
                base(project(derived) as &mut (dyn Any + Send + Sync), value)
            })
        });
        Self { setter, ..self.clone() }
    }
}

impl fmt::Debug for PropertyInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PropertyInfo")
            .field("name", &self.name)
            .field("ty", &self.ty.key())
            .field("accessor", &self.accessor)
            .field("visibility", &self.visibility)
            .field("resolution", &self.resolution)
            .finish()
    }
}

/// A method that may serve as a service factory.
///
/// # Examples
///
/// ```
/// use ferrous_wire::{MethodInfo, Parameter, RegisterFactory};
///
/// struct Gear { teeth: u32 }
///
/// let make = MethodInfo::new("make_gear", vec![Parameter::setting::<u32>("teeth", "Gear:Teeth")], |args| {
///     Ok(Gear { teeth: args.value::<u32>()? })
/// })
/// .register(RegisterFactory::singleton());
///
/// assert!(make.is_static());
/// ```
#[derive(Clone)]
pub struct MethodInfo {
    pub(crate) name: &'static str,
    pub(crate) declaring_type: Option<&'static str>,
    pub(crate) is_static: bool,
    pub(crate) generic: bool,
    pub(crate) declaring_generic: bool,
    pub(crate) visibility: Visibility,
    pub(crate) parameters: Vec<Parameter>,
    pub(crate) returns: Key,
    pub(crate) aliases: Vec<ServiceAlias>,
    pub(crate) filters: Vec<Arc<dyn ScanningFilter>>,
    pub(crate) markers: Vec<RegisterFactory>,
    pub(crate) invoke: ErasedInvoker,
}

impl MethodInfo {
    /// A static method returning `R`.
    pub fn new<R, F>(name: &'static str, parameters: Vec<Parameter>, invoke: F) -> Self
    where
        R: Send + Sync + 'static,
        F: Fn(&mut Arguments) -> DiResult<R> + Send + Sync + 'static,
    {
        Self::from_invoker(
            name,
            parameters,
            key_of_type::<R>(),
            Arc::new(move |args: &mut Arguments| invoke(args).map(|value| Some(Arc::new(value) as AnyArc))),
        )
    }

    /// A static method whose result may be absent.
    pub fn nullable<R, F>(name: &'static str, parameters: Vec<Parameter>, invoke: F) -> Self
    where
        R: Send + Sync + 'static,
        F: Fn(&mut Arguments) -> DiResult<Option<R>> + Send + Sync + 'static,
    {
        Self::from_invoker(
            name,
            parameters,
            key_of_type::<R>(),
            Arc::new(move |args: &mut Arguments| {
                invoke(args).map(|value| value.map(|v| Arc::new(v) as AnyArc))
            }),
        )
    }

    /// A static method returning a trait object, e.g. `Arc<dyn Logger>`.
    pub fn returning_trait<R, F>(name: &'static str, parameters: Vec<Parameter>, invoke: F) -> Self
    where
        R: ?Sized + Send + Sync + 'static,
        F: Fn(&mut Arguments) -> DiResult<Arc<R>> + Send + Sync + 'static,
    {
        Self::from_invoker(
            name,
            parameters,
            key_of_trait::<R>(),
            Arc::new(move |args: &mut Arguments| invoke(args).map(|value| Some(Arc::new(value) as AnyArc))),
        )
    }

    fn from_invoker(name: &'static str, parameters: Vec<Parameter>, returns: Key, invoke: ErasedInvoker) -> Self {
        Self {
            name,
            declaring_type: None,
            is_static: true,
            generic: false,
            declaring_generic: false,
            visibility: Visibility::Public,
            parameters,
            returns,
            aliases: Vec::new(),
            filters: Vec::new(),
            markers: Vec::new(),
            invoke,
        }
    }

    /// Marks the method as taking a receiver.
    pub fn instance(mut self) -> Self {
        self.is_static = false;
        self
    }

    /// Marks the method as having its own generic parameters.
    pub fn generic(mut self) -> Self {
        self.generic = true;
        self
    }

    pub fn non_public(mut self) -> Self {
        self.visibility = Visibility::NonPublic;
        self
    }

    pub fn register(mut self, marker: RegisterFactory) -> Self {
        self.markers.push(marker);
        self
    }

    pub fn filter<F: ScanningFilter + 'static>(mut self, filter: F) -> Self {
        self.filters.push(Arc::new(filter));
        self
    }

    /// Declares that the returned `R` can be registered as the trait `S`.
    pub fn implements<R, S, C>(mut self, cast: C) -> Self
    where
        R: Send + Sync + 'static,
        S: ?Sized + Send + Sync + 'static,
        C: Fn(Arc<R>) -> Arc<S> + Send + Sync + 'static,
    {
        self.aliases.push(ServiceAlias::new::<R, S, C>(cast));
        self
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    /// `Type::method` when the declaring type is known, else the bare name.
    pub fn display_name(&self) -> String {
        match self.declaring_type {
            Some(owner) => format!("{}::{}", owner, self.name),
            None => self.name.to_string(),
        }
    }

    pub fn is_static(&self) -> bool {
        self.is_static
    }

    pub fn is_generic(&self) -> bool {
        self.generic || self.declaring_generic
    }

    pub fn visibility(&self) -> Visibility {
        self.visibility
    }

    pub fn parameters(&self) -> &[Parameter] {
        &self.parameters
    }

    pub fn return_type(&self) -> Key {
        self.returns
    }

    pub fn markers(&self) -> &[RegisterFactory] {
        &self.markers
    }

    pub fn filters(&self) -> &[Arc<dyn ScanningFilter>] {
        &self.filters
    }

    pub(crate) fn alias_for(&self, service: &Key) -> Option<&ServiceAlias> {
        self.aliases
            .iter()
            .find(|alias| alias.source == self.returns && &alias.key == service)
    }
}

impl fmt::Debug for MethodInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MethodInfo")
            .field("name", &self.display_name())
            .field("is_static", &self.is_static)
            .field("generic", &self.is_generic())
            .field("returns", &self.returns)
            .field("markers", &self.markers)
            .finish()
    }
}
