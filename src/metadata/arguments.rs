//! Resolved values handed to constructors, setters and factory methods.

use std::sync::Arc;

use crate::registration::AnyArc;
use crate::traits::resolver::downcast_trait;
use crate::{DiError, DiResult};

/// One resolved value.
///
/// Concrete services arrive as `Arc<T>`, trait services as `Arc<dyn Trait>`,
/// configuration values as the bound type. Optional resolutions may carry no
/// value at all.
pub struct Argument {
    name: &'static str,
    value: Option<AnyArc>,
}

impl Argument {
    pub(crate) fn new(name: &'static str, value: Option<AnyArc>) -> Self {
        Self { name, value }
    }

    /// Name of the parameter or property this value was resolved for.
    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn is_present(&self) -> bool {
        self.value.is_some()
    }

    /// The type-erased value.
    pub fn into_raw(self) -> Option<AnyArc> {
        self.value
    }

    fn require(self) -> DiResult<AnyArc> {
        let name = self.name;
        self.value
            .ok_or_else(|| DiError::Argument(format!("'{}' has no value", name)))
    }

    /// A concrete service or configuration value.
    pub fn service<T: Send + Sync + 'static>(self) -> DiResult<Arc<T>> {
        self.require()?
            .downcast::<T>()
            .map_err(|_| DiError::TypeMismatch(std::any::type_name::<T>()))
    }

    /// A trait service.
    pub fn service_trait<T: ?Sized + Send + Sync + 'static>(self) -> DiResult<Arc<T>> {
        downcast_trait::<T>(self.require()?)
    }

    pub fn optional<T: Send + Sync + 'static>(self) -> DiResult<Option<Arc<T>>> {
        match self.value {
            Some(_) => self.service::<T>().map(Some),
            None => Ok(None),
        }
    }

    pub fn optional_trait<T: ?Sized + Send + Sync + 'static>(self) -> DiResult<Option<Arc<T>>> {
        match self.value {
            Some(_) => self.service_trait::<T>().map(Some),
            None => Ok(None),
        }
    }

    /// An owned value; cloned when the instance is shared.
    pub fn value<T: Clone + Send + Sync + 'static>(self) -> DiResult<T> {
        let shared = self.service::<T>()?;
        Ok(Arc::try_unwrap(shared).unwrap_or_else(|shared| (*shared).clone()))
    }
}

/// The resolved values of a parameter list, consumed in declaration order.
///
/// # Examples
///
/// ```
/// use ferrous_wire::{ConstructorInfo, Parameter};
/// use std::sync::Arc;
///
/// struct Engine;
/// struct Car { engine: Arc<Engine>, name: String }
///
/// let ctor = ConstructorInfo::new(
///     vec![Parameter::service::<Engine>("engine"), Parameter::setting::<String>("name", "Car:Name")],
///     |args| Ok(Car { engine: args.service::<Engine>()?, name: args.value::<String>()? }),
/// );
/// assert_eq!(ctor.parameters().len(), 2);
/// ```
pub struct Arguments {
    owner: &'static str,
    items: std::vec::IntoIter<Argument>,
}

impl Arguments {
    pub(crate) fn new(owner: &'static str, items: Vec<Argument>) -> Self {
        Self { owner, items: items.into_iter() }
    }

    /// The next argument.
    pub fn next_arg(&mut self) -> DiResult<Argument> {
        self.items.next().ok_or_else(|| {
            DiError::Argument(format!("{} reads more arguments than it declares", self.owner))
        })
    }

    pub fn remaining(&self) -> usize {
        self.items.len()
    }

    pub fn service<T: Send + Sync + 'static>(&mut self) -> DiResult<Arc<T>> {
        self.next_arg()?.service()
    }

    pub fn service_trait<T: ?Sized + Send + Sync + 'static>(&mut self) -> DiResult<Arc<T>> {
        self.next_arg()?.service_trait()
    }

    pub fn optional<T: Send + Sync + 'static>(&mut self) -> DiResult<Option<Arc<T>>> {
        self.next_arg()?.optional()
    }

    pub fn optional_trait<T: ?Sized + Send + Sync + 'static>(&mut self) -> DiResult<Option<Arc<T>>> {
        self.next_arg()?.optional_trait()
    }

    pub fn value<T: Clone + Send + Sync + 'static>(&mut self) -> DiResult<T> {
        self.next_arg()?.value()
    }
}
