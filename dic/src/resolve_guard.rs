//! Thread-local stack guard for circular dependency detection.
//!
//! [`ResolveGuard`] tracks the chain of type identifiers being resolved on the
//! current thread. Each entry belongs to an owner, the container doing the
//! resolving, so one container asking another for the same type is not a cycle.
//! Pushing an identifier that is already on the stack for the same owner fails
//! with a [`CircularDependency`](crate::ErrorKind::CircularDependency) error
//! whose message spells out the cycle.
//!
//! # Example
//! ```
//! use dic::{ErrorKind, ResolveGuard};
//!
//! let _g1 = ResolveGuard::push("A").unwrap();
//! let _g2 = ResolveGuard::push("B").unwrap();
//! let err = ResolveGuard::push("A").unwrap_err();
//! assert!(matches!(err.kind, ErrorKind::CircularDependency));
//! assert!(err.message.contains("A -> B -> A"));
//!
//! // Another owner may resolve "A" while the first one is still at it.
//! let _g3 = ResolveGuard::push_in(1, "A").unwrap();
//! ```

use std::cell::RefCell;

use crate::Error;

thread_local! {
    static RESOLVE_STACK: RefCell<Vec<(usize, String)>> = const { RefCell::new(Vec::new()) };
}

/// Guard that pops the last pushed type identifier from the thread-local stack on drop.
#[derive(Debug)]
pub struct ResolveGuard {
    pub owner: usize,
    pub type_id: String,
}

impl ResolveGuard {
    /// Try to push a type identifier onto the thread-local stack, for the default owner.
    pub fn push(type_id: &str) -> Result<Self, Error> {
        Self::push_in(0, type_id)
    }

    /// Try to push a type identifier resolved by `owner` onto the thread-local stack.
    ///
    /// Returns `Err(Error::circular_dependency(..))` if the same owner already has
    /// the identifier on the stack, with the chain starting at its first occurrence.
    pub fn push_in(owner: usize, type_id: &str) -> Result<Self, Error> {
        RESOLVE_STACK.with(|stack| {
            let mut v = stack.borrow_mut();
            if let Some(pos) = v.iter().position(|(o, s)| *o == owner && s == type_id) {
                let mut chain: Vec<&str> = v[pos..]
                    .iter()
                    .filter(|(o, _)| *o == owner)
                    .map(|(_, s)| s.as_str())
                    .collect();
                chain.push(type_id);
                return Err(Error::circular_dependency(&chain));
            }
            v.push((owner, type_id.to_string()));
            Ok(ResolveGuard {
                owner,
                type_id: type_id.to_string(),
            })
        })
    }

    /// Number of resolutions in flight on this thread.
    pub fn depth() -> usize {
        RESOLVE_STACK.with(|stack| stack.borrow().len())
    }
}

impl Drop for ResolveGuard {
    fn drop(&mut self) {
        RESOLVE_STACK.with(|stack| {
            stack.borrow_mut().pop();
        });
    }
}
