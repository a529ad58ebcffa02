//! The introspection facility the container consults.
//!
//! The container needs three answers about a type identifier: its ordered
//! constructor parameters, its lifecycle, and a way to construct it once the
//! parameters are resolved. [`Reflection`] is that seam; [`Registry`] answers
//! it from descriptors registered up front.

use std::collections::HashMap;

#[cfg(feature = "tracing")]
use tracing::debug;

use crate::descriptor::{Arguments, Parameter, TypeDescriptor};
use crate::global::GlobalInstances;
use crate::scope::Scope;
use crate::types::Instance;
use crate::Error;

/// Answers structural questions about type identifiers.
///
/// Every method fails with [`ErrorKind::TypeNotFound`](crate::ErrorKind::TypeNotFound)
/// for an identifier it does not know.
pub trait Reflection {
    /// Ordered constructor parameters of the type.
    fn parameters(&self, type_id: &str) -> Result<Vec<Parameter>, Error>;

    /// Lifecycle of the type, derived from its markers.
    fn scope(&self, type_id: &str) -> Result<Scope, Error>;

    /// Constructs the type from resolved arguments.
    fn construct(&self, type_id: &str, arguments: Arguments) -> Result<Instance, Error>;

    /// Whether the identifier names a type that can be constructed.
    fn is_constructible(&self, type_id: &str) -> bool;
}

/// Explicit-registration implementation of [`Reflection`].
///
/// `Registry::new()` already knows [`GlobalInstances`].
pub struct Registry {
    descriptors: HashMap<String, TypeDescriptor>,
}

#[cfg(feature = "debug")]
impl std::fmt::Debug for Registry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut types: Vec<&str> = self.descriptors.keys().map(String::as_str).collect();
        types.sort_unstable();
        f.debug_struct("Registry").field("types", &types).finish()
    }
}

impl Default for Registry {
    fn default() -> Self {
        Self::new()
    }
}

impl Registry {
    pub fn new() -> Self {
        let mut descriptors = HashMap::new();
        let global = GlobalInstances::descriptor();
        descriptors.insert(global.type_id().to_string(), global);

        Self { descriptors }
    }

    /// Adds a descriptor. Fails if one is already registered for the same identifier.
    pub fn register(mut self, descriptor: TypeDescriptor) -> Result<Self, Error> {
        let type_id = descriptor.type_id().to_string();

        if self.descriptors.contains_key(&type_id) {
            return Err(Error::type_already_registered(&type_id));
        }

        #[cfg(feature = "tracing")]
        debug!(
            "Registered {} type {} with {} parameter(s)",
            descriptor.scope(),
            type_id,
            descriptor.parameters().len()
        );

        self.descriptors.insert(type_id, descriptor);
        Ok(self)
    }

    pub fn contains(&self, type_id: &str) -> bool {
        self.descriptors.contains_key(type_id)
    }

    pub fn len(&self) -> usize {
        self.descriptors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.descriptors.is_empty()
    }

    fn descriptor(&self, type_id: &str) -> Result<&TypeDescriptor, Error> {
        self.descriptors
            .get(type_id)
            .ok_or_else(|| Error::type_not_found(type_id))
    }
}

impl Reflection for Registry {
    fn parameters(&self, type_id: &str) -> Result<Vec<Parameter>, Error> {
        self.descriptor(type_id).map(|d| d.parameters().to_vec())
    }

    fn scope(&self, type_id: &str) -> Result<Scope, Error> {
        self.descriptor(type_id).map(TypeDescriptor::scope)
    }

    fn construct(&self, type_id: &str, arguments: Arguments) -> Result<Instance, Error> {
        self.descriptor(type_id)?.construct(arguments)
    }

    fn is_constructible(&self, type_id: &str) -> bool {
        self.descriptors
            .get(type_id)
            .is_some_and(TypeDescriptor::is_constructible)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::injectable::type_key;
    use crate::ErrorKind;

    struct Clock;

    fn registry() -> Registry {
        Registry::new()
            .register(
                TypeDescriptor::of::<Clock>()
                    .untyped()
                    .single_instance()
                    .constructor(|_| Ok(Clock)),
            )
            .unwrap()
    }

    #[test]
    fn new_registry_knows_global_instances() {
        let registry = Registry::new();
        assert_eq!(registry.len(), 1);
        assert!(registry.contains(type_key::<GlobalInstances>()));
        assert!(registry.scope(type_key::<GlobalInstances>()).unwrap().is_singleton());
    }

    #[test]
    fn answers_for_registered_type() {
        let registry = registry();
        let id = type_key::<Clock>();

        assert!(registry.is_constructible(id));
        assert_eq!(registry.parameters(id).unwrap(), vec![Parameter::Untyped]);
        assert!(registry.scope(id).unwrap() == Scope::Singleton);
        assert!(registry.construct(id, Arguments::new(id, vec![None])).is_ok());
    }

    #[test]
    fn unknown_type_is_not_found() {
        let registry = registry();

        assert!(!registry.is_constructible("Nope"));
        assert!(registry.parameters("Nope").unwrap_err().kind == ErrorKind::TypeNotFound);
        assert!(registry.scope("Nope").unwrap_err().kind == ErrorKind::TypeNotFound);
        let err = registry
            .construct("Nope", Arguments::new("Nope", vec![]))
            .err()
            .unwrap();
        assert!(err.message.contains("\"Nope\""));
    }

    #[test]
    fn duplicate_registration_fails() {
        let err = registry()
            .register(TypeDescriptor::of::<Clock>())
            .err()
            .unwrap();
        assert!(err.kind == ErrorKind::TypeAlreadyRegistered);
    }
}
