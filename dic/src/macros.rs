//! Macros for composing registries and containers in one expression.
//!
//! - [`registry!`]: register several descriptors, yielding `Result<Registry, Error>`.
//! - [`container!`]: the same, wrapped into a [`Container`](crate::Container).
//!
//! # Example
//! ```
//! use dic::{container, TypeDescriptor};
//!
//! struct Clock;
//! struct Scheduler {
//!     clock: dic::Shared<Clock>,
//! }
//!
//! let container = container![
//!     TypeDescriptor::of::<Clock>().single_instance().constructor(|_| Ok(Clock)),
//!     TypeDescriptor::of::<Scheduler>()
//!         .param::<Clock>()
//!         .constructor(|args| Ok(Scheduler { clock: args.next()? })),
//! ]?;
//!
//! let a = container.get::<Scheduler>()?;
//! let b = container.get::<Scheduler>()?;
//! assert!(dic::Shared::ptr_eq(&a.clock, &b.clock));
//! # Ok::<(), dic::Error>(())
//! ```

/// Builds a [`Registry`](crate::Registry) from descriptors.
///
/// Evaluates to `Result<Registry, Error>`; the first duplicate registration
/// stops the build.
#[macro_export]
macro_rules! registry {
    ($($descriptor:expr),* $(,)?) => {{
        (|| -> ::core::result::Result<$crate::Registry, $crate::Error> {
            let registry = $crate::Registry::new();
            $(
                let registry = registry.register($descriptor)?;
            )*
            ::core::result::Result::Ok(registry)
        })()
    }};
}

/// Builds a [`Container`](crate::Container) over a [`registry!`].
///
/// Evaluates to `Result<Container, Error>`.
#[macro_export]
macro_rules! container {
    ($($descriptor:expr),* $(,)?) => {{
        $crate::registry!($($descriptor),*).map($crate::Container::new)
    }};
}
