//! The accessor view: what constructed objects use to reach the container.
//!
//! Every constructor receives an [`Accessor`] for the container that is
//! building it. `accessor.get("key")` is the property-style read; the
//! typed helpers and [`FromAccessor`] cover the rest.

use std::any::Any;
use std::sync::Arc;

use crate::container::Container;
use crate::error::Result;
use crate::value::{Args, Value};

/// Read-only façade over a [`Container`].
#[derive(Clone, Copy)]
pub struct Accessor<'c> {
    container: &'c Container,
}

impl<'c> Accessor<'c> {
    pub(crate) fn new(container: &'c Container) -> Self {
        Self { container }
    }

    /// The container behind this view.
    pub fn container(&self) -> &'c Container {
        self.container
    }

    /// Property-style read: the value for `key`, or `None` (logged) on failure.
    pub fn get(&self, key: &str) -> Option<Value> {
        self.container.get(key)
    }

    /// Typed property-style read.
    pub fn get_as<T: Any + Send + Sync>(&self, key: &str) -> Option<Arc<T>> {
        self.container.get_as::<T>(key)
    }

    /// The value for `key`, propagating failures.
    pub fn resolve(&self, key: &str) -> Result<Value> {
        self.container.resolve(key)
    }

    /// The value for `key`, built with `args` when it is constructed.
    pub fn resolve_with(&self, key: &str, args: Args) -> Result<Value> {
        self.container.resolve_with(key, args)
    }

    /// The value for `key` as a shared `T`.
    pub fn resolve_as<T: Any + Send + Sync>(&self, key: &str) -> Result<Arc<T>> {
        self.container.resolve_as::<T>(key)
    }

    /// Pulls `key` out in whatever shape `T` asks for.
    pub fn inject<T: Inject>(&self, key: &str) -> Result<T> {
        T::inject(self, key)
    }
}

impl std::fmt::Debug for Accessor<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Accessor").field("container", self.container).finish()
    }
}

/// A field type that can be pulled from one key.
pub trait Inject: Sized {
    fn inject(accessor: &Accessor<'_>, key: &str) -> Result<Self>;
}

impl<T: Any + Send + Sync> Inject for Arc<T> {
    fn inject(accessor: &Accessor<'_>, key: &str) -> Result<Self> {
        accessor.resolve_as::<T>(key)
    }
}

impl Inject for Value {
    fn inject(accessor: &Accessor<'_>, key: &str) -> Result<Self> {
        accessor.resolve(key)
    }
}

/// Absent keys become `None`; every other failure still propagates.
impl<T: Inject> Inject for Option<T> {
    fn inject(accessor: &Accessor<'_>, key: &str) -> Result<Self> {
        match T::inject(accessor, key) {
            Ok(value) => Ok(Some(value)),
            Err(err) if err.is_not_registered(key) => Ok(None),
            Err(err) => Err(err),
        }
    }
}

/// A typed view assembled from several keys at once.
///
/// Usually derived:
///
/// ```rust,ignore
/// #[derive(FromAccessor)]
/// struct Services {
///     config: Arc<Config>,
///     #[khazina(key = "db")]
///     database: Arc<Database>,
///     cache: Option<Arc<Cache>>,
/// }
///
/// let services: Services = container.view()?;
/// ```
pub trait FromAccessor: Sized {
    fn from_accessor(accessor: &Accessor<'_>) -> Result<Self>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constructor::Constructor;
    use crate::descriptor::Descriptor;
    use crate::error::KhazinaError;

    struct Config {
        name: &'static str,
    }

    struct Services {
        config: Arc<Config>,
        cache: Option<Arc<u32>>,
    }

    impl FromAccessor for Services {
        fn from_accessor(accessor: &Accessor<'_>) -> Result<Self> {
            Ok(Self {
                config: accessor.inject("config")?,
                cache: accessor.inject("cache")?,
            })
        }
    }

    fn container() -> Container {
        let container = Container::new();
        container
            .register([Descriptor::constant("config", Config { name: "app" })])
            .unwrap();
        container
    }

    #[test]
    fn property_style_read() {
        let container = container();
        let accessor = container.accessor();
        assert!(accessor.get("config").is_some());
        assert!(accessor.get("nope").is_none());
        assert_eq!(accessor.get_as::<Config>("config").unwrap().name, "app");
    }

    #[test]
    fn optional_injection_of_absent_key() {
        let container = container();
        let services: Services = container.view().unwrap();
        assert_eq!(services.config.name, "app");
        assert!(services.cache.is_none());
    }

    #[test]
    fn optional_injection_keeps_type_errors() {
        let container = container();
        let err = container.accessor().inject::<Option<Arc<String>>>("config").unwrap_err();
        assert!(matches!(err, KhazinaError::TypeMismatch { .. }));
    }

    #[test]
    fn optional_injection_keeps_nested_missing_keys() {
        let container = container();
        container
            .register([Descriptor::transient(
                "report",
                Constructor::of::<u8>(|ctx, _| {
                    ctx.resolve("printer")?;
                    Ok(0)
                }),
            )])
            .unwrap();

        let err = container.accessor().inject::<Option<Value>>("report").unwrap_err();
        assert!(err.is_not_registered("printer"));
    }
}
