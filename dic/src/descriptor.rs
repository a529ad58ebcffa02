//! Registered shape of a constructible type.
//!
//! A [`TypeDescriptor`] records what a reflective runtime would otherwise
//! discover on its own: the ordered constructor parameters, the lifecycle
//! markers, and the constructor itself. The container never calls a
//! constructor directly with its own values; it resolves every declared
//! parameter first and hands the results over in an [`Arguments`] cursor.
//!
//! # Examples
//!
//! ```
//! use dic::{Container, Registry, TypeDescriptor};
//!
//! struct Engine;
//! struct Car {
//!     engine: dic::Shared<Engine>,
//! }
//!
//! let registry = Registry::new()
//!     .register(TypeDescriptor::of::<Engine>().constructor(|_| Ok(Engine)))?
//!     .register(
//!         TypeDescriptor::of::<Car>()
//!             .param::<Engine>()
//!             .constructor(|args| Ok(Car { engine: args.next()? })),
//!     )?;
//!
//! let container = Container::new(registry);
//! let car = container.get::<Car>()?;
//! # let _ = &car.engine;
//! # Ok::<(), dic::Error>(())
//! ```

use std::vec::IntoIter;

use crate::injectable::{Injectable, downcast, into_instance, type_key};
use crate::scope::{Marker, Scope};
use crate::types::{Constructor, Instance};
use crate::{Container, Error, Shared, WeakContainer};

/// One declared constructor parameter.
#[derive(Clone, PartialEq, Eq)]
#[cfg_attr(feature = "debug", derive(Debug))]
pub enum Parameter {
    /// A parameter whose type the container can resolve.
    Typed(String),
    /// A parameter without a resolvable type (a primitive, a builtin). It is
    /// always passed as nothing.
    Untyped,
}

impl Parameter {
    pub fn type_id(&self) -> Option<&str> {
        match self {
            Parameter::Typed(type_id) => Some(type_id),
            Parameter::Untyped => None,
        }
    }
}

/// Describes how to build one type.
pub struct TypeDescriptor {
    type_id: String,
    parameters: Vec<Parameter>,
    markers: Vec<Marker>,
    constructor: Option<Constructor>,
}

#[cfg(feature = "debug")]
impl std::fmt::Debug for TypeDescriptor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TypeDescriptor")
            .field("type_id", &self.type_id)
            .field("parameters", &self.parameters)
            .field("markers", &self.markers)
            .field("constructible", &self.constructor.is_some())
            .finish()
    }
}

impl TypeDescriptor {
    /// Starts a descriptor for the Rust type `T`, identified by [`type_key::<T>()`](type_key).
    pub fn of<T: ?Sized + 'static>() -> Self {
        Self::named(type_key::<T>())
    }

    /// Starts a descriptor for an arbitrary identifier.
    pub fn named(type_id: impl Into<String>) -> Self {
        Self {
            type_id: type_id.into(),
            parameters: Vec::new(),
            markers: Vec::new(),
            constructor: None,
        }
    }

    /// Declares the next constructor parameter as the Rust type `D`.
    pub fn param<D: ?Sized + 'static>(self) -> Self {
        self.param_named(type_key::<D>())
    }

    /// Declares the next constructor parameter by identifier.
    pub fn param_named(mut self, type_id: impl Into<String>) -> Self {
        self.parameters.push(Parameter::Typed(type_id.into()));
        self
    }

    /// Declares the next constructor parameter as untyped; it always receives nothing.
    pub fn untyped(mut self) -> Self {
        self.parameters.push(Parameter::Untyped);
        self
    }

    pub fn single_instance(mut self) -> Self {
        self.markers.push(Marker::SingleInstance);
        self
    }

    pub fn new_instance(mut self) -> Self {
        self.markers.push(Marker::NewInstance);
        self
    }

    pub fn type_id(&self) -> &str {
        &self.type_id
    }

    pub fn parameters(&self) -> &[Parameter] {
        &self.parameters
    }

    pub fn markers(&self) -> &[Marker] {
        &self.markers
    }

    pub fn scope(&self) -> Scope {
        Scope::from_markers(&self.markers)
    }

    pub fn is_constructible(&self) -> bool {
        self.constructor.is_some()
    }

    /// Builds an instance from resolved arguments.
    ///
    /// Fails with `TypeNotFound` when the descriptor has no constructor.
    pub fn construct(&self, mut arguments: Arguments) -> Result<Instance, Error> {
        match &self.constructor {
            Some(constructor) => constructor(&mut arguments),
            None => Err(Error::type_not_found(&self.type_id)),
        }
    }
}

#[cfg(feature = "thread-safe")]
impl TypeDescriptor {
    /// Sets the constructor. It pulls its arguments off the cursor in declaration order.
    pub fn constructor<T, F>(mut self, constructor: F) -> Self
    where
        T: Injectable,
        F: Fn(&mut Arguments) -> Result<T, Error> + Send + Sync + 'static,
    {
        self.constructor = Some(Box::new(move |args: &mut Arguments| {
            constructor(args).map(into_instance)
        }));
        self
    }
}

#[cfg(not(feature = "thread-safe"))]
impl TypeDescriptor {
    /// Sets the constructor. It pulls its arguments off the cursor in declaration order.
    pub fn constructor<T, F>(mut self, constructor: F) -> Self
    where
        T: Injectable,
        F: Fn(&mut Arguments) -> Result<T, Error> + 'static,
    {
        self.constructor = Some(Box::new(move |args: &mut Arguments| {
            constructor(args).map(into_instance)
        }));
        self
    }
}

/// Cursor over the resolved arguments of one constructor call.
pub struct Arguments {
    type_id: String,
    position: usize,
    values: IntoIter<Option<Instance>>,
}

impl Arguments {
    pub fn new(type_id: impl Into<String>, values: Vec<Option<Instance>>) -> Self {
        Self {
            type_id: type_id.into(),
            position: 0,
            values: values.into_iter(),
        }
    }

    /// Identifier of the type being constructed.
    pub fn type_id(&self) -> &str {
        &self.type_id
    }

    /// Arguments not consumed yet.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.len() == 0
    }

    /// Takes the next argument as it was resolved, possibly nothing.
    pub fn next_instance(&mut self) -> Result<Option<Instance>, Error> {
        self.position += 1;
        self.values
            .next()
            .ok_or_else(|| Error::missing_argument(&self.type_id, self.position))
    }

    /// Takes the next argument, which must be present and of type `T`.
    pub fn next<T: Injectable>(&mut self) -> Result<Shared<T>, Error> {
        self.next_optional::<T>()?
            .ok_or_else(|| Error::missing_argument(&self.type_id, self.position))
    }

    /// Takes the next argument, which is either nothing or of type `T`.
    pub fn next_optional<T: Injectable>(&mut self) -> Result<Option<Shared<T>>, Error> {
        match self.next_instance()? {
            Some(instance) => downcast::<T>(instance)
                .map(Some)
                .map_err(|_| Error::type_mismatch(type_key::<T>(), &self.type_id)),
            None => Ok(None),
        }
    }

    /// Takes the next argument as a container handle.
    pub fn next_container(&mut self) -> Result<Container, Error> {
        self.next::<Container>().map(|container| (*container).clone())
    }

    /// Takes the next argument as a handle that does not own the container.
    ///
    /// Single instances that need their container take this one: the
    /// container caches them, so an owning handle would never be released.
    pub fn next_weak_container(&mut self) -> Result<WeakContainer, Error> {
        self.next_container().map(|container| container.downgrade())
    }
}
