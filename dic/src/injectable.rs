use std::any::Any;

use crate::runtime::Shared;
use crate::types::Instance;

/// A trait for types that can be resolved by the container.
///
/// Any `'static` type qualifies; with the `thread-safe` feature the type must
/// also be `Send + Sync` so that it can live inside an `Arc<dyn Any + Send + Sync>`.
#[cfg(feature = "thread-safe")]
pub trait Injectable: Any + Send + Sync {}
#[cfg(feature = "thread-safe")]
impl<T: Any + Send + Sync> Injectable for T {}

/// A trait for types that can be resolved by the container.
///
/// Any `'static` type qualifies; with the `thread-safe` feature the type must
/// also be `Send + Sync` so that it can live inside an `Arc<dyn Any + Send + Sync>`.
#[cfg(not(feature = "thread-safe"))]
pub trait Injectable: Any {}
#[cfg(not(feature = "thread-safe"))]
impl<T: Any> Injectable for T {}

/// Returns the type identifier the container uses for `T`.
///
/// ```
/// struct Mailer;
/// assert!(dic::type_key::<Mailer>().ends_with("Mailer"));
/// ```
pub fn type_key<T: ?Sized + 'static>() -> &'static str {
    std::any::type_name::<T>()
}

/// Wraps a value into a type-erased [`Instance`].
pub fn into_instance<T: Injectable>(value: T) -> Instance {
    Shared::new(value)
}

/// Recovers the concrete type behind an [`Instance`].
///
/// The instance is handed back untouched when it holds another type.
pub fn downcast<T: Injectable>(instance: Instance) -> Result<Shared<T>, Instance> {
    instance.downcast::<T>()
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Probe(u8);

    #[test]
    fn downcast_recovers_concrete_type() {
        let instance = into_instance(Probe(7));
        let probe = downcast::<Probe>(instance).ok().unwrap();
        assert_eq!(probe.0, 7);
    }

    #[test]
    fn downcast_returns_instance_on_mismatch() {
        let instance = into_instance(Probe(1));
        let back = downcast::<String>(instance.clone()).err().unwrap();
        assert!(Shared::ptr_eq(&back, &instance));
    }

    #[test]
    fn type_key_is_stable() {
        assert_eq!(type_key::<Probe>(), type_key::<Probe>());
        assert_ne!(type_key::<Probe>(), type_key::<String>());
    }
}
