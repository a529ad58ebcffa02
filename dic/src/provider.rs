//! Call-through traits for types that hand out instances on demand.
//!
//! A provider is constructed with a [`WeakContainer`] and asks the container
//! for instances later, after its own construction. Providers are usually
//! single instances, cached by the container, hence the weak handle.
//! [`Provider`] builds through [`Container::resolve`](crate::Container::resolve);
//! [`GlobalProvider`] goes through the container's [`GlobalInstances`].
//!
//! # Examples
//!
//! ```
//! use dic::{Container, Provider, Registry, Shared, TypeDescriptor, WeakContainer};
//!
//! struct Job;
//!
//! struct JobProvider {
//!     container: WeakContainer,
//! }
//!
//! impl Provider for JobProvider {
//!     fn container(&self) -> &WeakContainer {
//!         &self.container
//!     }
//! }
//!
//! let registry = Registry::new()
//!     .register(TypeDescriptor::of::<Job>().constructor(|_| Ok(Job)))?
//!     .register(
//!         TypeDescriptor::of::<JobProvider>()
//!             .param::<Container>()
//!             .single_instance()
//!             .constructor(|args| Ok(JobProvider { container: args.next_weak_container()? })),
//!     )?;
//!
//! let container = Container::new(registry);
//! let provider = container.get::<JobProvider>()?;
//! let a = provider.get::<Job>()?;
//! let b = provider.get::<Job>()?;
//! assert!(!Shared::ptr_eq(&a, &b));
//! # Ok::<(), dic::Error>(())
//! ```

use crate::global::GlobalInstances;
use crate::injectable::Injectable;
use crate::types::Instance;
use crate::{Error, Shared, WeakContainer};

/// Hands out instances built by the container on every call.
pub trait Provider {
    fn container(&self) -> &WeakContainer;

    fn instance_of(&self, type_id: &str) -> Result<Option<Instance>, Error> {
        self.container().upgrade()?.resolve(type_id)
    }

    fn get<T: Injectable>(&self) -> Result<Shared<T>, Error>
    where
        Self: Sized,
    {
        self.container().upgrade()?.get::<T>()
    }
}

/// Hands out the container-wide global instance of a type.
pub trait GlobalProvider {
    fn container(&self) -> &WeakContainer;

    fn global_instance_of(&self, type_id: &str) -> Result<Option<Instance>, Error> {
        self.container()
            .upgrade()?
            .get::<GlobalInstances>()?
            .global_instance_of(type_id)
    }

    fn global<T: Injectable>(&self) -> Result<Shared<T>, Error>
    where
        Self: Sized,
    {
        self.container()
            .upgrade()?
            .get::<GlobalInstances>()?
            .global::<T>()
    }
}
