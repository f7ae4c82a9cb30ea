//! Dependency identification keys.
//!
//! [`DependencyKey`] uniquely identifies a descriptor within the container.
//! Keys are plain names; lookups accept `&str` directly.

use std::borrow::Borrow;
use std::fmt;
use std::sync::Arc;

/// Uniquely identifies a dependency in the container.
///
/// Cloning is cheap: the name is shared behind an [`Arc`].
///
/// # Examples
/// ```
/// use khazina_container::key::DependencyKey;
///
/// let key = DependencyKey::new("database");
/// assert_eq!(key.as_str(), "database");
/// assert_eq!(key, DependencyKey::from("database"));
/// ```
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DependencyKey(Arc<str>);

impl DependencyKey {
    /// Creates a key from any string-like name.
    #[inline]
    pub fn new(name: impl AsRef<str>) -> Self {
        Self(Arc::from(name.as_ref()))
    }

    /// Returns the key name.
    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns `true` for the empty name, which `register` rejects.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<&str> for DependencyKey {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

impl From<String> for DependencyKey {
    fn from(name: String) -> Self {
        Self(Arc::from(name))
    }
}

impl From<&String> for DependencyKey {
    fn from(name: &String) -> Self {
        Self::new(name)
    }
}

impl From<&DependencyKey> for DependencyKey {
    fn from(key: &DependencyKey) -> Self {
        key.clone()
    }
}

// Hash and Eq are those of the inner `str`, so `&str` lookups agree.
impl Borrow<str> for DependencyKey {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for DependencyKey {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl PartialEq<str> for DependencyKey {
    fn eq(&self, other: &str) -> bool {
        &*self.0 == other
    }
}

impl PartialEq<&str> for DependencyKey {
    fn eq(&self, other: &&str) -> bool {
        &*self.0 == *other
    }
}

impl fmt::Debug for DependencyKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "DependencyKey({:?})", &*self.0)
    }
}

impl fmt::Display for DependencyKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
