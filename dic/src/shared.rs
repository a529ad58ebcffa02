//! The process-wide default container.
//!
//! [`Container::shared`] creates one container on first access and returns the
//! same one afterwards. [`Container::init_shared`] installs a registry as that
//! container, provided nothing has accessed it yet.
//!
//! With the `thread-safe` feature the container lives in a `OnceLock` and is
//! visible from every thread. Without it the container holds `Rc`s and cannot
//! cross threads, so each thread lazily gets its own.
//!
//! Prefer building a container at start-up and passing it along; tests that
//! need isolation must construct their own.

#[cfg(feature = "thread-safe")]
use std::sync::OnceLock;

#[cfg(not(feature = "thread-safe"))]
use std::cell::OnceCell;

use crate::{Container, Error, Registry};

#[cfg(feature = "thread-safe")]
static SHARED: OnceLock<Container> = OnceLock::new();

#[cfg(not(feature = "thread-safe"))]
thread_local! {
    static SHARED: OnceCell<Container> = const { OnceCell::new() };
}

#[cfg(feature = "thread-safe")]
impl Container {
    /// Returns the shared container, creating it over an empty [`Registry`] on first access.
    pub fn shared() -> Container {
        SHARED
            .get_or_init(|| Container::new(Registry::new()))
            .clone()
    }

    /// Installs `registry` as the shared container.
    ///
    /// Fails with `SharedAlreadyInitialized` once the shared container exists.
    pub fn init_shared(registry: Registry) -> Result<Container, Error> {
        let container = Container::new(registry);
        SHARED
            .set(container.clone())
            .map_err(|_| Error::shared_already_initialized())?;
        Ok(container)
    }
}

#[cfg(not(feature = "thread-safe"))]
impl Container {
    /// Returns the shared container, creating it over an empty [`Registry`] on first access.
    pub fn shared() -> Container {
        SHARED.with(|cell| cell.get_or_init(|| Container::new(Registry::new())).clone())
    }

    /// Installs `registry` as the shared container.
    ///
    /// Fails with `SharedAlreadyInitialized` once the shared container exists.
    pub fn init_shared(registry: Registry) -> Result<Container, Error> {
        let container = Container::new(registry);
        SHARED.with(|cell| {
            cell.set(container.clone())
                .map_err(|_| Error::shared_already_initialized())
        })?;
        Ok(container)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ErrorKind;

    #[test]
    fn shared_returns_same_container() {
        let first = Container::shared();
        let second = Container::shared();
        assert!(Container::ptr_eq(&first, &second));

        let own = Container::new(Registry::new());
        assert!(!Container::ptr_eq(&own, &first));
    }

    #[test]
    fn init_after_access_fails() {
        let _ = Container::shared();
        let err = Container::init_shared(Registry::new()).err().unwrap();
        assert!(err.kind == ErrorKind::SharedAlreadyInitialized);
    }

    #[cfg(not(feature = "thread-safe"))]
    #[test]
    fn init_installs_registry_on_fresh_thread() {
        std::thread::spawn(|| {
            let installed = Container::init_shared(Registry::new()).unwrap();
            assert!(Container::ptr_eq(&installed, &Container::shared()));
        })
        .join()
        .unwrap();
    }
}
