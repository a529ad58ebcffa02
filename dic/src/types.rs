use std::any::Any;

use crate::descriptor::Arguments;
use crate::{Container, Error, Reflection, Shared};

/// A type-erased, shared instance produced by the container.
#[cfg(feature = "thread-safe")]
pub type Instance = Shared<dyn Any + Send + Sync>;
#[cfg(not(feature = "thread-safe"))]
pub type Instance = Shared<dyn Any>;

/// Factory stored by an override rule. It receives the container doing the resolving.
#[cfg(feature = "thread-safe")]
pub type OverrideFn = dyn Fn(&Container) -> Result<Option<Instance>, Error> + Send + Sync;
#[cfg(not(feature = "thread-safe"))]
pub type OverrideFn = dyn Fn(&Container) -> Result<Option<Instance>, Error>;

/// Constructor of a registered type, fed with already resolved arguments.
#[cfg(feature = "thread-safe")]
pub type Constructor = Box<dyn Fn(&mut Arguments) -> Result<Instance, Error> + Send + Sync>;
#[cfg(not(feature = "thread-safe"))]
pub type Constructor = Box<dyn Fn(&mut Arguments) -> Result<Instance, Error>>;

/// The introspection facility as held by a container.
#[cfg(feature = "thread-safe")]
pub type DynReflection = dyn Reflection + Send + Sync;
#[cfg(not(feature = "thread-safe"))]
pub type DynReflection = dyn Reflection;
