//! Invocable producers.
//!
//! A [`Constructor`] builds one value from the caller's [`Accessor`] and
//! an [`Args`] list. The accessor is how constructed objects reach back
//! into the container that built them.

use std::any::{Any, type_name};
use std::fmt;
use std::sync::Arc;

use khazina_support::rendering::shorten_type_name;

use crate::accessor::Accessor;
use crate::error::Result;
use crate::value::{Args, Value};

/// Signature every constructor is erased to. Held behind an `Arc`, so
/// clones share one closure.
pub type ConstructFn = dyn Fn(&Accessor<'_>, Args) -> Result<Value> + Send + Sync;

/// Plain function form of a constructor, usable in statics.
pub type ConstructPtr = fn(&Accessor<'_>, Args) -> Result<Value>;

/// A named, shareable constructor.
///
/// # Examples
/// ```
/// use khazina_container::constructor::Constructor;
///
/// struct Greeter { name: String }
///
/// let ctor = Constructor::of::<Greeter>(|_, args| {
///     Ok(Greeter { name: args.cloned::<String>(0)? })
/// });
/// assert!(ctor.name().contains("Greeter"));
/// ```
#[derive(Clone)]
pub struct Constructor {
    name: &'static str,
    func: Arc<ConstructFn>,
}

impl Constructor {
    /// Wraps a typed factory; the result is boxed into a [`Value`].
    pub fn of<T: Any + Send + Sync>(
        factory: impl Fn(&Accessor<'_>, Args) -> Result<T> + Send + Sync + 'static,
    ) -> Self {
        Self::new(type_name::<T>(), move |accessor: &Accessor<'_>, args: Args| {
            factory(accessor, args).map(Value::new)
        })
    }

    /// Wraps a factory that already returns an erased [`Value`].
    pub fn new<F>(name: &'static str, factory: F) -> Self
    where
        F: Fn(&Accessor<'_>, Args) -> Result<Value> + Send + Sync + 'static,
    {
        Self {
            name,
            func: Arc::new(factory),
        }
    }

    /// Wraps a plain function pointer.
    pub fn from_fn(name: &'static str, func: ConstructPtr) -> Self {
        Self::new(name, func)
    }

    /// Diagnostic name (the produced type for [`Constructor::of`]).
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Runs the constructor with exactly `args`; nothing is prepended.
    pub fn call(&self, accessor: &Accessor<'_>, args: Args) -> Result<Value> {
        (self.func)(accessor, args)
    }

    /// `true` when both handles wrap the same closure.
    pub fn ptr_eq(a: &Constructor, b: &Constructor) -> bool {
        Arc::ptr_eq(&a.func, &b.func)
    }
}

impl fmt::Debug for Constructor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Constructor({})", shorten_type_name(self.name))
    }
}

/// A constructor with its bound arguments already resolved.
///
/// Invoking it passes the bound values first and the call-time
/// arguments after them.
#[derive(Clone)]
pub struct BoundConstructor {
    target: Constructor,
    bound: Vec<Value>,
}

impl BoundConstructor {
    pub fn new(target: Constructor, bound: Vec<Value>) -> Self {
        Self { target, bound }
    }

    /// A bound constructor with nothing bound.
    pub fn unbound(target: Constructor) -> Self {
        Self::new(target, Vec::new())
    }

    pub fn target(&self) -> &Constructor {
        &self.target
    }

    pub fn bound_args(&self) -> &[Value] {
        &self.bound
    }

    /// Builds a new instance: bound arguments, then `args`.
    pub fn construct(&self, accessor: &Accessor<'_>, args: Args) -> Result<Value> {
        let all = Args::from(self.bound.clone()).concat(args);
        self.target.call(accessor, all)
    }
}

impl fmt::Debug for BoundConstructor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BoundConstructor")
            .field("target", &self.target)
            .field("bound", &self.bound)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::container::Container;

    struct Pair {
        left: i32,
        right: i32,
    }

    fn pair() -> Constructor {
        Constructor::of::<Pair>(|_, args| {
            Ok(Pair {
                left: args.cloned(0)?,
                right: args.cloned(1)?,
            })
        })
    }

    #[test]
    fn bound_args_come_first() {
        let container = Container::new();
        let bound = BoundConstructor::new(pair(), vec![Value::new(1i32)]);

        let value = bound.construct(&container.accessor(), crate::args![2i32]).unwrap();
        let pair = value.downcast_ref::<Pair>().unwrap();
        assert_eq!((pair.left, pair.right), (1, 2));
    }

    #[test]
    fn each_construct_is_fresh() {
        let container = Container::new();
        let bound = BoundConstructor::new(pair(), vec![Value::new(1i32), Value::new(1i32)]);
        let a = bound.construct(&container.accessor(), Args::new()).unwrap();
        let b = bound.construct(&container.accessor(), Args::new()).unwrap();
        assert!(!Value::ptr_eq(&a, &b));
    }

    #[test]
    fn from_fn_pointer() {
        fn answer(_: &Accessor<'_>, _: Args) -> Result<Value> {
            Ok(Value::new(42u64))
        }

        let container = Container::new();
        let ctor = Constructor::from_fn("answer", answer);
        let value = ctor.call(&container.accessor(), Args::new()).unwrap();
        assert_eq!(value.downcast_ref::<u64>(), Some(&42));
        assert_eq!(ctor.name(), "answer");
    }

    #[test]
    fn clones_share_closure() {
        let ctor = pair();
        assert!(Constructor::ptr_eq(&ctor, &ctor.clone()));
        assert!(!Constructor::ptr_eq(&ctor, &pair()));
    }
}
