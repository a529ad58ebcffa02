/// Lifecycle tag a type carries in its descriptor.
#[derive(Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "debug", derive(Debug))]
pub enum Marker {
    /// One instance per container, cached on first construction.
    SingleInstance,
    /// Always build a fresh instance, even if `SingleInstance` is also present.
    NewInstance,
}

/// How the container treats instances of a type.
#[derive(Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "debug", derive(Debug))]
pub enum Scope {
    Singleton,
    Transient,
}

impl Scope {
    pub fn is_singleton(self) -> bool {
        matches!(self, Scope::Singleton)
    }

    /// Derives the scope from a set of markers. `NewInstance` wins over `SingleInstance`.
    pub fn from_markers(markers: &[Marker]) -> Self {
        let single = markers.contains(&Marker::SingleInstance);
        let fresh = markers.contains(&Marker::NewInstance);

        if single && !fresh {
            Scope::Singleton
        } else {
            Scope::Transient
        }
    }
}

impl std::fmt::Display for Scope {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Scope::Singleton => write!(f, "singleton"),
            Scope::Transient => write!(f, "transient"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_markers_is_transient() {
        assert!(Scope::from_markers(&[]) == Scope::Transient);
    }

    #[test]
    fn single_instance_is_singleton() {
        assert!(Scope::from_markers(&[Marker::SingleInstance]).is_singleton());
    }

    #[test]
    fn new_instance_takes_precedence() {
        let scope = Scope::from_markers(&[Marker::SingleInstance, Marker::NewInstance]);
        assert!(scope == Scope::Transient);

        let scope = Scope::from_markers(&[Marker::NewInstance, Marker::SingleInstance]);
        assert!(!scope.is_singleton());
    }

    #[test]
    fn display_names() {
        assert_eq!(Scope::Singleton.to_string(), "singleton");
        assert_eq!(Scope::Transient.to_string(), "transient");
    }
}
