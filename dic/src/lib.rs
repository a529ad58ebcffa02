pub mod container;
pub mod descriptor;
pub mod error;
pub mod global;
pub mod injectable;
pub mod macros;
pub mod provider;
pub mod reflection;
pub mod resolve_guard;
pub mod runtime;
pub mod scope;
pub mod shared;
pub mod types;

pub use container::*;
pub use descriptor::*;
pub use error::*;
pub use global::*;
pub use injectable::*;
pub use provider::*;
pub use reflection::*;
pub use resolve_guard::*;
pub use runtime::{Shared, Store, WeakShared};
pub use scope::*;
pub use types::*;
