//! The dependency injection container.
//!
//! Public API:
//! - resolve / get: build (or fetch) an instance, resolving constructor dependencies recursively
//! - resolve_with: construct directly from caller-supplied arguments
//! - with_override_rule: derive a new container where one type resolves through a custom factory
//! - shared: the process-wide default container (see [`crate::shared`])
//!
//! Resolution order for `resolve(type_id)`:
//! 1. an empty identifier yields `None`;
//! 2. an override rule, when present, answers every call;
//! 3. a singleton already built by this container is returned from the cache;
//! 4. otherwise the resolution plan (memoized) is walked in declaration order,
//!    each typed parameter resolved recursively, and the type constructed.
//!    Singletons are cached at that point.
//!
//! Plans and scopes are introspected once per type and kept for the life of
//! the container. Override rules never change after construction;
//! `with_override_rule` returns a new container with fresh caches.
//!
//! Cycle detection is per container: an override factory may ask another
//! container for the same type without tripping it.
//!
//! Instances the container caches must not own it, or the cache keeps the
//! container alive forever. Such collaborators hold a [`WeakContainer`]
//! instead, as [`GlobalInstances`](crate::GlobalInstances) does.

use std::collections::HashMap;

#[cfg(feature = "thread-safe")]
use std::sync::{Mutex, PoisonError};

#[cfg(feature = "tracing")]
use tracing::{debug, info, trace};

use crate::descriptor::{Arguments, Parameter};
use crate::injectable::{Injectable, downcast, type_key};
use crate::reflection::Registry;
use crate::resolve_guard::ResolveGuard;
use crate::runtime::{Shared, Store, WeakShared, read, write};
use crate::scope::Scope;
use crate::types::{DynReflection, Instance, OverrideFn};
use crate::Error;

type OverrideRules = HashMap<String, Shared<OverrideFn>>;

/// The DI container.
///
/// Cloning a `Container` yields another handle to the same container: both
/// share caches and compare equal under [`Container::ptr_eq`].
pub struct Container {
    inner: Shared<ContainerInner>,
}

struct ContainerInner {
    reflection: Shared<DynReflection>,
    override_rules: OverrideRules,
    singletons: Store<HashMap<String, Instance>>,
    plans: Store<HashMap<String, Shared<[Parameter]>>>,
    scopes: Store<HashMap<String, Scope>>,
    #[cfg(feature = "thread-safe")]
    build_locks: Store<HashMap<String, Shared<Mutex<()>>>>,
}

#[cfg(feature = "debug")]
impl std::fmt::Debug for Container {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut rules: Vec<&str> = self
            .inner
            .override_rules
            .keys()
            .map(String::as_str)
            .collect();
        rules.sort_unstable();

        f.debug_struct("Container")
            .field("override_rules", &rules)
            .field("singletons", &read(&self.inner.singletons).len())
            .field("plans", &read(&self.inner.plans).len())
            .finish()
    }
}

impl Clone for Container {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

/// Non-owning handle to a [`Container`].
///
/// Obtained through [`Container::downgrade`] or
/// [`Arguments::next_weak_container`](crate::Arguments::next_weak_container).
#[derive(Clone)]
pub struct WeakContainer {
    inner: WeakShared<ContainerInner>,
}

#[cfg(feature = "debug")]
impl std::fmt::Debug for WeakContainer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WeakContainer")
            .field("alive", &(self.inner.strong_count() > 0))
            .finish()
    }
}

impl WeakContainer {
    /// The container, if it still exists.
    ///
    /// # Errors
    ///
    /// `ContainerDropped` once every owning handle is gone.
    pub fn upgrade(&self) -> Result<Container, Error> {
        self.inner
            .upgrade()
            .map(|inner| Container { inner })
            .ok_or_else(Error::container_dropped)
    }
}

fn resolve_self(container: &Container) -> Result<Option<Instance>, Error> {
    Ok(Some(container.to_instance()))
}

impl Container {
    /// Creates a container over a registry.
    pub fn new(registry: Registry) -> Self {
        Self::with_reflection(Shared::new(registry))
    }

    /// Creates a container over any introspection facility.
    pub fn with_reflection(reflection: Shared<DynReflection>) -> Self {
        let mut override_rules: OverrideRules = HashMap::new();
        let self_rule: Shared<OverrideFn> = Shared::new(resolve_self);
        override_rules.insert(type_key::<Container>().to_string(), self_rule);

        #[cfg(feature = "tracing")]
        info!("Creating new Container instance");

        Self::from_parts(reflection, override_rules)
    }

    fn from_parts(reflection: Shared<DynReflection>, override_rules: OverrideRules) -> Self {
        Self {
            inner: Shared::new(ContainerInner {
                reflection,
                override_rules,
                singletons: Store::new(HashMap::new()),
                plans: Store::new(HashMap::new()),
                scopes: Store::new(HashMap::new()),
                #[cfg(feature = "thread-safe")]
                build_locks: Store::new(HashMap::new()),
            }),
        }
    }

    /// Whether two handles point at the same container.
    pub fn ptr_eq(a: &Container, b: &Container) -> bool {
        Shared::ptr_eq(&a.inner, &b.inner)
    }

    /// A handle that does not keep this container alive.
    pub fn downgrade(&self) -> WeakContainer {
        WeakContainer {
            inner: Shared::downgrade(&self.inner),
        }
    }

    fn owner(&self) -> usize {
        Shared::as_ptr(&self.inner) as usize
    }

    /// This container as a type-erased instance, as handed to constructors.
    pub fn to_instance(&self) -> Instance {
        Shared::new(self.clone())
    }

    /// Whether `type_id` resolves through an override rule.
    pub fn has_override_rule(&self, type_id: &str) -> bool {
        self.inner.override_rules.contains_key(type_id)
    }

    /// The introspection facility behind this container.
    pub fn reflection(&self) -> &DynReflection {
        &*self.inner.reflection
    }

    /// Resolves `type_id` into an instance.
    ///
    /// An empty identifier yields `Ok(None)`. Override rules answer first, then
    /// the singleton cache, then a fresh build with every constructor
    /// dependency resolved in declaration order.
    ///
    /// # Errors
    ///
    /// - `TypeNotFound` when `type_id`, or anything it depends on, is unknown.
    /// - `CircularDependency` when `type_id` depends on itself within this
    ///   container, including an override rule that asks for its own type.
    pub fn resolve(&self, type_id: &str) -> Result<Option<Instance>, Error> {
        if type_id.is_empty() {
            return Ok(None);
        }

        let _guard = ResolveGuard::push_in(self.owner(), type_id)?;

        if let Some(rule) = self.inner.override_rules.get(type_id) {
            #[cfg(feature = "tracing")]
            trace!("Resolving {} through override rule", type_id);

            return rule(self);
        }

        if self.scope_of(type_id)?.is_singleton() {
            return self.resolve_singleton(type_id).map(Some);
        }

        self.build(type_id).map(Some)
    }

    /// Resolves `T` by its [`type_key`] and downcasts the result.
    ///
    /// A resolution that yields nothing is reported as `TypeNotFound`.
    pub fn get<T: Injectable>(&self) -> Result<Shared<T>, Error> {
        let type_id = type_key::<T>();
        let instance = self
            .resolve(type_id)?
            .ok_or_else(|| Error::type_not_found(type_id))?;

        downcast::<T>(instance).map_err(|_| Error::type_mismatch(type_id, type_id))
    }

    /// Constructs `type_id` directly from `arguments`, skipping dependency
    /// resolution.
    ///
    /// Override rules still take precedence. The singleton cache is neither
    /// read nor written: an instance built from caller-chosen arguments is
    /// never the shared one.
    pub fn resolve_with(
        &self,
        type_id: &str,
        arguments: Vec<Option<Instance>>,
    ) -> Result<Option<Instance>, Error> {
        if type_id.is_empty() {
            return Ok(None);
        }

        let _guard = ResolveGuard::push_in(self.owner(), type_id)?;

        if let Some(rule) = self.inner.override_rules.get(type_id) {
            #[cfg(feature = "tracing")]
            trace!("Resolving {} through override rule", type_id);

            return rule(self);
        }

        #[cfg(feature = "tracing")]
        debug!(
            "Constructing {} with {} explicit argument(s)",
            type_id,
            arguments.len()
        );

        self.inner
            .reflection
            .construct(type_id, Arguments::new(type_id, arguments))
            .map(Some)
    }

    fn resolve_singleton(&self, type_id: &str) -> Result<Instance, Error> {
        #[cfg(feature = "thread-safe")]
        let slot = self.build_lock(type_id);
        #[cfg(feature = "thread-safe")]
        let _building = slot.lock().unwrap_or_else(PoisonError::into_inner);

        let cached = read(&self.inner.singletons).get(type_id).cloned();
        if let Some(instance) = cached {
            #[cfg(feature = "tracing")]
            trace!("Found cached singleton instance for type: {}", type_id);

            return Ok(instance);
        }

        let instance = self.build(type_id)?;
        write(&self.inner.singletons).insert(type_id.to_string(), instance.clone());

        #[cfg(feature = "tracing")]
        debug!("Cached singleton instance for type: {}", type_id);

        Ok(instance)
    }

    #[cfg(feature = "thread-safe")]
    fn build_lock(&self, type_id: &str) -> Shared<Mutex<()>> {
        write(&self.inner.build_locks)
            .entry(type_id.to_string())
            .or_default()
            .clone()
    }

    fn build(&self, type_id: &str) -> Result<Instance, Error> {
        let plan = self.plan_of(type_id)?;
        if !self.inner.reflection.is_constructible(type_id) {
            return Err(Error::type_not_found(type_id));
        }

        #[cfg(feature = "tracing")]
        debug!(
            "Building {} with {} dependency(ies)",
            type_id,
            plan.len()
        );

        let mut arguments = Vec::with_capacity(plan.len());
        for parameter in plan.iter() {
            let argument = match parameter {
                Parameter::Typed(dependency) => self.resolve(dependency)?,
                Parameter::Untyped => None,
            };
            arguments.push(argument);
        }

        self.inner
            .reflection
            .construct(type_id, Arguments::new(type_id, arguments))
    }

    fn plan_of(&self, type_id: &str) -> Result<Shared<[Parameter]>, Error> {
        let cached = read(&self.inner.plans).get(type_id).cloned();
        if let Some(plan) = cached {
            return Ok(plan);
        }

        let plan: Shared<[Parameter]> = self.inner.reflection.parameters(type_id)?.into();
        write(&self.inner.plans).insert(type_id.to_string(), plan.clone());

        Ok(plan)
    }

    fn scope_of(&self, type_id: &str) -> Result<Scope, Error> {
        let cached = read(&self.inner.scopes).get(type_id).copied();
        if let Some(scope) = cached {
            return Ok(scope);
        }

        let scope = self.inner.reflection.scope(type_id)?;
        write(&self.inner.scopes).insert(type_id.to_string(), scope);

        Ok(scope)
    }
}

#[cfg(feature = "thread-safe")]
impl Container {
    /// Returns a new container whose rules equal this one's plus `type_id -> factory`.
    ///
    /// The receiver is left untouched. The new container starts with empty
    /// caches and shares the introspection facility. Overriding the container's
    /// own type replaces the self rule.
    pub fn with_override_rule<F>(&self, type_id: impl Into<String>, factory: F) -> Container
    where
        F: Fn(&Container) -> Result<Option<Instance>, Error> + Send + Sync + 'static,
    {
        self.derive(type_id.into(), Shared::new(factory))
    }
}

#[cfg(not(feature = "thread-safe"))]
impl Container {
    /// Returns a new container whose rules equal this one's plus `type_id -> factory`.
    ///
    /// The receiver is left untouched. The new container starts with empty
    /// caches and shares the introspection facility. Overriding the container's
    /// own type replaces the self rule.
    pub fn with_override_rule<F>(&self, type_id: impl Into<String>, factory: F) -> Container
    where
        F: Fn(&Container) -> Result<Option<Instance>, Error> + 'static,
    {
        self.derive(type_id.into(), Shared::new(factory))
    }
}

impl Container {
    fn derive(&self, type_id: String, factory: Shared<OverrideFn>) -> Container {
        #[cfg(feature = "tracing")]
        info!("Deriving container with override rule for {}", type_id);

        let mut override_rules = self.inner.override_rules.clone();
        override_rules.insert(type_id, factory);

        Self::from_parts(self.inner.reflection.clone(), override_rules)
    }
}

#[cfg(test)]
mod tests {
    #[cfg(not(feature = "thread-safe"))]
    use std::cell::Cell;

    use super::*;
    use crate::descriptor::TypeDescriptor;
    use crate::injectable::into_instance;
    #[cfg(not(feature = "thread-safe"))]
    use crate::reflection::Reflection;
    use crate::ErrorKind;

    struct Leaf;

    struct Branch {
        left: Shared<Leaf>,
        right: Shared<Leaf>,
    }

    struct Config;

    #[cfg(not(feature = "thread-safe"))]
    struct Counted {
        inner: Registry,
        parameters: Cell<usize>,
        scopes: Cell<usize>,
    }

    #[cfg(not(feature = "thread-safe"))]
    impl Reflection for Counted {
        fn parameters(&self, type_id: &str) -> Result<Vec<Parameter>, Error> {
            self.parameters.set(self.parameters.get() + 1);
            self.inner.parameters(type_id)
        }

        fn scope(&self, type_id: &str) -> Result<Scope, Error> {
            self.scopes.set(self.scopes.get() + 1);
            self.inner.scope(type_id)
        }

        fn construct(&self, type_id: &str, arguments: Arguments) -> Result<Instance, Error> {
            self.inner.construct(type_id, arguments)
        }

        fn is_constructible(&self, type_id: &str) -> bool {
            self.inner.is_constructible(type_id)
        }
    }

    fn registry() -> Registry {
        Registry::new()
            .register(TypeDescriptor::of::<Leaf>().constructor(|_| Ok(Leaf)))
            .unwrap()
            .register(
                TypeDescriptor::of::<Branch>()
                    .param::<Leaf>()
                    .param::<Leaf>()
                    .constructor(|args| {
                        Ok(Branch {
                            left: args.next()?,
                            right: args.next()?,
                        })
                    }),
            )
            .unwrap()
            .register(
                TypeDescriptor::of::<Config>()
                    .single_instance()
                    .constructor(|_| Ok(Config)),
            )
            .unwrap()
    }

    #[test]
    fn empty_identifier_resolves_to_nothing() {
        let container = Container::new(registry());
        assert!(container.resolve("").unwrap().is_none());
        assert!(container.resolve_with("", vec![]).unwrap().is_none());
    }

    #[test]
    fn transient_dependencies_are_distinct() {
        let container = Container::new(registry());
        let branch = container.get::<Branch>().unwrap();
        assert!(!Shared::ptr_eq(&branch.left, &branch.right));
    }

    #[test]
    fn singleton_is_cached_on_first_build() {
        let container = Container::new(registry());
        let first = container.get::<Config>().unwrap();
        let second = container.get::<Config>().unwrap();
        assert!(Shared::ptr_eq(&first, &second));
    }

    // Cell counters only fit the single-threaded build.
    #[cfg(not(feature = "thread-safe"))]
    #[test]
    fn plans_and_scopes_are_introspected_once() {
        let counted = Shared::new(Counted {
            inner: registry(),
            parameters: Cell::new(0),
            scopes: Cell::new(0),
        });
        let container = Container::with_reflection(counted.clone());

        for _ in 0..3 {
            container.get::<Branch>().unwrap();
        }

        // Branch and Leaf, each looked up once.
        assert_eq!(counted.parameters.get(), 2);
        assert_eq!(counted.scopes.get(), 2);
    }

    #[test]
    fn self_rule_resolves_to_resolving_container() {
        let container = Container::new(registry());
        let resolved = container.get::<Container>().unwrap();
        assert!(Container::ptr_eq(&container, &resolved));
        assert!(container.has_override_rule(type_key::<Container>()));
    }

    #[test]
    fn override_rule_leaves_receiver_untouched() {
        let container = Container::new(registry());
        let derived = container.with_override_rule(type_key::<Leaf>(), |_| Ok(None));

        assert!(!Container::ptr_eq(&container, &derived));
        assert!(!container.has_override_rule(type_key::<Leaf>()));
        assert!(container.resolve(type_key::<Leaf>()).unwrap().is_some());
        assert!(derived.resolve(type_key::<Leaf>()).unwrap().is_none());
    }

    #[test]
    fn explicit_arguments_skip_resolution_and_cache() {
        let container = Container::new(registry());
        let left = into_instance(Leaf);
        let right = into_instance(Leaf);

        let branch = container
            .resolve_with(type_key::<Branch>(), vec![Some(left.clone()), Some(right)])
            .unwrap()
            .unwrap();
        let branch = downcast::<Branch>(branch).ok().unwrap();
        let left = downcast::<Leaf>(left).ok().unwrap();
        assert!(Shared::ptr_eq(&branch.left, &left));

        let explicit = container
            .resolve_with(type_key::<Config>(), vec![])
            .unwrap()
            .unwrap();
        let cached = container.resolve(type_key::<Config>()).unwrap().unwrap();
        assert!(!Shared::ptr_eq(&explicit, &cached));
    }

    #[test]
    fn override_may_delegate_to_another_container() {
        let base = Container::new(registry());
        let inner = base.clone();
        let decorated = base.with_override_rule(type_key::<Leaf>(), move |_| {
            inner.resolve(type_key::<Leaf>())
        });

        let leaf = decorated.resolve(type_key::<Leaf>()).unwrap();
        assert!(leaf.is_some_and(|leaf| leaf.is::<Leaf>()));

        let branch = decorated.get::<Branch>().unwrap();
        assert!(!Shared::ptr_eq(&branch.left, &branch.right));
    }

    #[test]
    fn override_asking_for_its_own_type_is_a_cycle() {
        let container = Container::new(registry())
            .with_override_rule(type_key::<Leaf>(), |c| c.resolve(type_key::<Leaf>()));
        let err = container.resolve(type_key::<Leaf>()).err().unwrap();
        assert!(err.kind == ErrorKind::CircularDependency);

        let container = Container::new(registry()).with_override_rule(type_key::<Leaf>(), |c| {
            c.resolve_with(type_key::<Leaf>(), vec![])
        });
        let err = container
            .resolve_with(type_key::<Leaf>(), vec![])
            .err()
            .unwrap();
        assert!(err.kind == ErrorKind::CircularDependency);
    }

    #[test]
    fn weak_handle_does_not_keep_container_alive() {
        let container = Container::new(registry());
        let weak = container.downgrade();
        assert!(Container::ptr_eq(&weak.upgrade().unwrap(), &container));

        drop(container);
        let err = weak.upgrade().err().unwrap();
        assert!(err.kind == ErrorKind::ContainerDropped);
    }

    #[test]
    fn unknown_type_is_reported() {
        let container = Container::new(registry());
        let err = container.resolve("Missing").err().unwrap();
        assert!(err.kind == ErrorKind::TypeNotFound);
        assert!(err.message.contains("Missing"));
    }
}
