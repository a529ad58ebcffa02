//! Opt-in "global" instances, one per type identifier and per container.
//!
//! [`GlobalInstances`] is itself resolved through the container as a single
//! instance that receives a weak handle to the container. It remembers the first instance it
//! resolves for each identifier, whatever the lifecycle of that type, so a
//! transient type asked through it behaves like a shared one while plain
//! `resolve` keeps building fresh instances.
//!
//! # Examples
//!
//! ```
//! use dic::{Container, GlobalInstances, Registry, TypeDescriptor, type_key};
//!
//! struct Session;
//!
//! let registry = Registry::new()
//!     .register(TypeDescriptor::of::<Session>().constructor(|_| Ok(Session)))?;
//! let container = Container::new(registry);
//!
//! let globals = container.get::<GlobalInstances>()?;
//! let first = globals.global::<Session>()?;
//! let second = globals.global::<Session>()?;
//! assert!(dic::Shared::ptr_eq(&first, &second));
//! # Ok::<(), dic::Error>(())
//! ```

use std::collections::HashMap;

#[cfg(feature = "tracing")]
use tracing::debug;

use crate::descriptor::TypeDescriptor;
use crate::injectable::{Injectable, downcast, type_key};
use crate::runtime::{Shared, Store, read, write};
use crate::types::Instance;
use crate::{Container, Error, WeakContainer};

pub struct GlobalInstances {
    container: WeakContainer,
    instances: Store<HashMap<String, Option<Instance>>>,
}

#[cfg(feature = "debug")]
impl std::fmt::Debug for GlobalInstances {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GlobalInstances")
            .field("instances", &read(&self.instances).len())
            .finish()
    }
}

impl GlobalInstances {
    pub fn new(container: WeakContainer) -> Self {
        Self {
            container,
            instances: Store::new(HashMap::new()),
        }
    }

    /// Descriptor registered by [`Registry::new`](crate::Registry::new).
    pub fn descriptor() -> TypeDescriptor {
        TypeDescriptor::of::<GlobalInstances>()
            .param::<Container>()
            .single_instance()
            .constructor(|args| Ok(GlobalInstances::new(args.next_weak_container()?)))
    }

    /// The container this registry resolves through.
    ///
    /// Fails with `ContainerDropped` once that container is gone.
    pub fn container(&self) -> Result<Container, Error> {
        self.container.upgrade()
    }

    /// Returns the remembered instance for `type_id`, resolving it on first request.
    ///
    /// # Errors
    ///
    /// `InvalidArgument` for an empty identifier, `ContainerDropped` when the
    /// container is gone, otherwise whatever [`Container::resolve`] reports.
    pub fn global_instance_of(&self, type_id: &str) -> Result<Option<Instance>, Error> {
        if type_id.is_empty() {
            return Err(Error::invalid_argument("global instance lookup"));
        }

        let remembered = read(&self.instances).get(type_id).cloned();
        if let Some(instance) = remembered {
            return Ok(instance);
        }

        let instance = self.container.upgrade()?.resolve(type_id)?;

        #[cfg(feature = "tracing")]
        debug!("Remembering global instance of {}", type_id);

        // A nested resolution may have remembered one meanwhile; the first one wins.
        Ok(write(&self.instances)
            .entry(type_id.to_string())
            .or_insert(instance)
            .clone())
    }

    /// Typed form of [`global_instance_of`](Self::global_instance_of).
    pub fn global<T: Injectable>(&self) -> Result<Shared<T>, Error> {
        let type_id = type_key::<T>();
        let instance = self
            .global_instance_of(type_id)?
            .ok_or_else(|| Error::type_not_found(type_id))?;

        downcast::<T>(instance).map_err(|_| Error::type_mismatch(type_id, type_id))
    }

    /// Whether an instance for `type_id` has been remembered.
    pub fn has_instance(&self, type_id: &str) -> bool {
        read(&self.instances).contains_key(type_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{ErrorKind, Registry};

    struct Token;

    fn container() -> Container {
        let registry = Registry::new()
            .register(TypeDescriptor::of::<Token>().constructor(|_| Ok(Token)))
            .unwrap();
        Container::new(registry)
    }

    #[test]
    fn empty_identifier_is_rejected() {
        let container = container();
        let globals = container.get::<GlobalInstances>().unwrap();
        let err = globals.global_instance_of("").err().unwrap();
        assert!(err.kind == ErrorKind::InvalidArgument);
        assert!(err.message.contains("can not be empty"));
    }

    #[test]
    fn unknown_type_is_not_remembered() {
        let container = container();
        let globals = container.get::<GlobalInstances>().unwrap();
        let err = globals.global_instance_of("some class").err().unwrap();
        assert!(err.kind == ErrorKind::TypeNotFound);
        assert_eq!(err.message, "Type \"some class\" does not exist");
        assert!(!globals.has_instance("some class"));
    }

    #[test]
    fn remembers_first_instance() {
        let container = container();
        let globals = container.get::<GlobalInstances>().unwrap();

        let first = globals.global::<Token>().unwrap();
        let second = globals.global::<Token>().unwrap();
        assert!(Shared::ptr_eq(&first, &second));
        assert!(globals.has_instance(type_key::<Token>()));

        let fresh = container.get::<Token>().unwrap();
        assert!(!Shared::ptr_eq(&first, &fresh));
    }

    #[test]
    fn is_a_single_instance_holding_its_container() {
        let container = container();
        let a = container.get::<GlobalInstances>().unwrap();
        let b = container.get::<GlobalInstances>().unwrap();

        assert!(Shared::ptr_eq(&a, &b));
        assert!(Container::ptr_eq(&a.container().unwrap(), &container));
    }

    #[test]
    fn outliving_the_container_is_reported() {
        let container = container();
        let globals = container.get::<GlobalInstances>().unwrap();
        drop(container);

        let err = globals.global::<Token>().err().unwrap();
        assert!(err.kind == ErrorKind::ContainerDropped);
        assert!(globals.container().is_err());
    }

    #[test]
    fn scope_is_per_container() {
        let first = container();
        let second = container();
        let one = first.get::<GlobalInstances>().unwrap();
        let two = second.get::<GlobalInstances>().unwrap();

        let from_one = one.global::<Token>().unwrap();
        let from_two = two.global::<Token>().unwrap();
        assert!(!Shared::ptr_eq(&from_one, &from_two));
    }
}
