//! Runtime type definitions for shared ownership and interior mutability.
//!
//! This module provides conditional type aliases based on the `thread-safe` feature flag:
//!
//! - When `thread-safe` is enabled: Uses thread-safe types (`Arc` and `RwLock`)
//! - When `thread-safe` is disabled: Uses single-threaded types (`Rc` and `RefCell`)
//!
//! The [`read`] and [`write`] helpers give the container one access path over
//! both flavours of [`Store`]. A poisoned lock is recovered rather than
//! propagated: the maps it guards are only ever inserted into, so a panic in
//! another thread cannot leave them half-updated.
//!
//! # Examples
//!
//! ```
//! use dic::runtime::{self, Shared, Store};
//!
//! let shared = Shared::new(Store::new(vec![1, 2]));
//! runtime::write(&shared).push(3);
//! assert_eq!(runtime::read(&shared).len(), 3);
//! ```

#[cfg(feature = "thread-safe")]
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard, Weak};

#[cfg(not(feature = "thread-safe"))]
use std::{
    cell::{Ref, RefCell, RefMut},
    rc::{Rc, Weak},
};

/// Type alias for shared ownership of data.
///
/// [`Arc<T>`] with the `thread-safe` feature, [`Rc<T>`] otherwise.
#[cfg(feature = "thread-safe")]
pub type Shared<T> = Arc<T>;
#[cfg(not(feature = "thread-safe"))]
pub type Shared<T> = Rc<T>;

/// Non-owning counterpart of [`Shared`].
///
/// [`std::sync::Weak<T>`] with the `thread-safe` feature, [`std::rc::Weak<T>`] otherwise.
pub type WeakShared<T> = Weak<T>;

/// Type alias for interior mutability.
///
/// [`RwLock<T>`] with the `thread-safe` feature, [`RefCell<T>`] otherwise.
#[cfg(feature = "thread-safe")]
pub type Store<T> = RwLock<T>;
#[cfg(not(feature = "thread-safe"))]
pub type Store<T> = RefCell<T>;

/// Borrows the content of a store for reading.
#[cfg(feature = "thread-safe")]
pub fn read<T>(store: &Store<T>) -> RwLockReadGuard<'_, T> {
    store.read().unwrap_or_else(PoisonError::into_inner)
}

/// Borrows the content of a store for reading.
#[cfg(not(feature = "thread-safe"))]
pub fn read<T>(store: &Store<T>) -> Ref<'_, T> {
    store.borrow()
}

/// Borrows the content of a store for writing.
#[cfg(feature = "thread-safe")]
pub fn write<T>(store: &Store<T>) -> RwLockWriteGuard<'_, T> {
    store.write().unwrap_or_else(PoisonError::into_inner)
}

/// Borrows the content of a store for writing.
#[cfg(not(feature = "thread-safe"))]
pub fn write<T>(store: &Store<T>) -> RefMut<'_, T> {
    store.borrow_mut()
}
