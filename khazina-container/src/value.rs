//! Type-erased values handed around by the container.
//!
//! Producers, bound arguments and constructed instances all travel as
//! [`Value`]: a shared, `Send + Sync` handle that remembers the Rust type
//! it was built from. [`Args`] is the ordered argument list a
//! constructor receives.

use std::any::{Any, type_name};
use std::fmt;
use std::sync::Arc;

use khazina_support::rendering::shorten_type_name;

use crate::error::{KhazinaError, Result};

/// A shared, type-erased value.
///
/// Clones share the same allocation, so [`Value::ptr_eq`] is the identity
/// check used for memoized instances.
///
/// # Examples
/// ```
/// use khazina_container::value::Value;
///
/// let value = Value::new(42i32);
/// assert_eq!(value.downcast_ref::<i32>(), Some(&42));
/// assert!(Value::ptr_eq(&value, &value.clone()));
/// ```
#[derive(Clone)]
pub struct Value {
    inner: Arc<dyn Any + Send + Sync>,
    type_name: &'static str,
}

impl Value {
    /// Wraps `value`. Passing an `Arc<T>` stores the `Arc` itself; use
    /// [`Value::from_arc`] to share an existing allocation instead.
    pub fn new<T: Any + Send + Sync>(value: T) -> Self {
        Self {
            inner: Arc::new(value),
            type_name: type_name::<T>(),
        }
    }

    /// Shares an existing allocation without re-boxing it.
    pub fn from_arc<T: Any + Send + Sync>(value: Arc<T>) -> Self {
        Self {
            inner: value,
            type_name: type_name::<T>(),
        }
    }

    /// The nullish value (`()`).
    pub fn null() -> Self {
        Self::new(())
    }

    pub fn is_null(&self) -> bool {
        self.is::<()>()
    }

    pub fn is<T: Any>(&self) -> bool {
        (*self.inner).is::<T>()
    }

    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        (*self.inner).downcast_ref::<T>()
    }

    /// Returns a typed handle sharing this value's allocation.
    pub fn downcast<T: Any + Send + Sync>(&self) -> Option<Arc<T>> {
        Arc::clone(&self.inner).downcast::<T>().ok()
    }

    /// Like [`Value::downcast`], but reports what was found instead.
    pub fn downcast_or_mismatch<T: Any + Send + Sync>(&self, subject: impl Into<String>) -> Result<Arc<T>> {
        self.downcast::<T>().ok_or_else(|| KhazinaError::TypeMismatch {
            subject: subject.into(),
            expected: type_name::<T>(),
            found: self.type_name,
        })
    }

    /// Full Rust type name of the wrapped value.
    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    /// Identity comparison: `true` when both handles share one allocation.
    pub fn ptr_eq(a: &Value, b: &Value) -> bool {
        Arc::ptr_eq(&a.inner, &b.inner)
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Value({})", shorten_type_name(self.type_name))
    }
}

/// Ordered constructor arguments: bound arguments first, then call-time ones.
#[derive(Clone, Debug, Default)]
pub struct Args(Vec<Value>);

impl Args {
    pub fn new() -> Self {
        Self(Vec::new())
    }

    pub fn push(&mut self, value: Value) {
        self.0.push(value);
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Value> {
        self.0.iter()
    }

    pub fn into_vec(self) -> Vec<Value> {
        self.0
    }

    /// The erased argument at `index`.
    ///
    /// # Errors
    /// [`KhazinaError::MissingArgument`] when fewer arguments were passed.
    pub fn value(&self, index: usize) -> Result<&Value> {
        self.0.get(index).ok_or(KhazinaError::MissingArgument {
            index,
            expected: "any value",
            received: self.0.len(),
        })
    }

    /// The argument at `index` as a shared `T`.
    pub fn get<T: Any + Send + Sync>(&self, index: usize) -> Result<Arc<T>> {
        let value = self.0.get(index).ok_or(KhazinaError::MissingArgument {
            index,
            expected: type_name::<T>(),
            received: self.0.len(),
        })?;
        value.downcast_or_mismatch::<T>(format!("argument #{index}"))
    }

    /// The argument at `index`, cloned out as an owned `T`.
    pub fn cloned<T: Any + Send + Sync + Clone>(&self, index: usize) -> Result<T> {
        self.get::<T>(index).map(|value| (*value).clone())
    }

    /// The argument at `index` as `T`, or `None` when absent.
    pub fn optional<T: Any + Send + Sync>(&self, index: usize) -> Result<Option<Arc<T>>> {
        match self.0.get(index) {
            Some(value) => value.downcast_or_mismatch::<T>(format!("argument #{index}")).map(Some),
            None => Ok(None),
        }
    }

    /// Appends `tail` after the current arguments.
    pub(crate) fn concat(mut self, tail: Args) -> Self {
        self.0.extend(tail.0);
        self
    }
}

impl From<Vec<Value>> for Args {
    fn from(values: Vec<Value>) -> Self {
        Self(values)
    }
}

impl FromIterator<Value> for Args {
    fn from_iter<I: IntoIterator<Item = Value>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl IntoIterator for Args {
    type Item = Value;
    type IntoIter = std::vec::IntoIter<Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

/// Builds [`Args`] from plain Rust values.
///
/// ```
/// use khazina_container::args;
///
/// let args = args![1i32, "two"];
/// assert_eq!(args.len(), 2);
/// assert_eq!(args.cloned::<i32>(0).unwrap(), 1);
/// ```
#[macro_export]
macro_rules! args {
    () => {
        $crate::value::Args::new()
    };
    ($($value:expr),+ $(,)?) => {
        $crate::value::Args::from(vec![$($crate::value::Value::new($value)),+])
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn downcast_shares_allocation() {
        let value = Value::new(String::from("hello"));
        let a = value.downcast::<String>().unwrap();
        let b = value.downcast::<String>().unwrap();
        assert!(Arc::ptr_eq(&a, &b));
        assert!(value.downcast::<i32>().is_none());
    }

    #[test]
    fn from_arc_keeps_identity() {
        let shared = Arc::new(7u8);
        let value = Value::from_arc(shared.clone());
        assert!(Arc::ptr_eq(&shared, &value.downcast::<u8>().unwrap()));
    }

    #[test]
    fn null_value() {
        assert!(Value::null().is_null());
        assert!(!Value::new(0i32).is_null());
    }

    #[test]
    fn distinct_values_are_not_identical() {
        assert!(!Value::ptr_eq(&Value::new(1i32), &Value::new(1i32)));
    }

    #[test]
    fn debug_shows_short_type() {
        assert_eq!(format!("{:?}", Value::new(String::new())), "Value(String)");
    }

    #[test]
    fn missing_argument() {
        let args = crate::args![1i32];
        match args.get::<i32>(3).unwrap_err() {
            KhazinaError::MissingArgument { index, received, .. } => {
                assert_eq!(index, 3);
                assert_eq!(received, 1);
            }
            other => panic!("Expected MissingArgument, got: {other:?}"),
        }
    }

    #[test]
    fn mismatched_argument() {
        let args = crate::args!["text"];
        let err = args.get::<i32>(0).unwrap_err();
        assert!(matches!(err, KhazinaError::TypeMismatch { .. }));
        assert!(err.to_string().contains("argument #0"));
    }

    #[test]
    fn optional_argument() {
        let args = crate::args![5u32];
        assert_eq!(*args.optional::<u32>(0).unwrap().unwrap(), 5);
        assert!(args.optional::<u32>(1).unwrap().is_none());
    }

    #[test]
    fn concat_keeps_order() {
        let args = crate::args![1i32].concat(crate::args![2i32, 3i32]);
        let values: Vec<i32> = (0..3).map(|i| args.cloned::<i32>(i).unwrap()).collect();
        assert_eq!(values, vec![1, 2, 3]);
    }
}
