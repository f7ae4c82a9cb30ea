//! Dependency descriptors: the unit of registration.
//!
//! A [`Descriptor`] says which key it fills, which [`Kind`] of production
//! applies, and what [`Producer`] to use. Descriptors are checked when
//! they are registered, not when they are built, so a half-filled
//! descriptor is representable and rejected by `register`.
//!
//! # Examples
//! ```
//! use khazina_container::prelude::*;
//!
//! struct Mailer { host: String }
//!
//! let container = Container::new();
//! container.register([
//!     Descriptor::constant("smtp_host", String::from("mail.local")),
//!     Descriptor::shared("mailer", Constructor::of::<Mailer>(|_, args| {
//!         Ok(Mailer { host: args.cloned(0)? })
//!     }))
//!     .bind_key("smtp_host"),
//! ]).unwrap();
//!
//! let mailer = container.resolve_as::<Mailer>("mailer").unwrap();
//! assert_eq!(mailer.host, "mail.local");
//! ```

use std::any::Any;
use std::fmt;

use crate::constructor::Constructor;
use crate::error::ValidationError;
use crate::key::DependencyKey;
use crate::kind::Kind;
use crate::value::Value;

/// What a descriptor produces from.
#[derive(Clone)]
pub enum Producer {
    /// A constructor invoked for transient and shared kinds.
    Invocable(Constructor),
    /// An identifier handed to the container's module loader.
    External(String),
    /// A fixed value.
    Constant(Value),
    /// An already-built instance, with the constructor that built it
    /// when known. Shared memoization stores this variant.
    Instance {
        value: Value,
        constructor: Option<Constructor>,
    },
}

impl Producer {
    /// A present but nullish producer.
    pub fn null() -> Self {
        Producer::Constant(Value::null())
    }

    pub fn constant<T: Any + Send + Sync>(value: T) -> Self {
        Producer::Constant(Value::new(value))
    }

    /// The live value for `Instance` producers and for constants that
    /// do not hold a [`Constructor`].
    pub fn instance(&self) -> Option<&Value> {
        match self {
            Producer::Instance { value, .. } => Some(value),
            Producer::Constant(value) if !value.is::<Constructor>() => Some(value),
            Producer::Constant(_) | Producer::Invocable(_) | Producer::External(_) => None,
        }
    }

    /// The producer itself as a value, as returned for [`Kind::Const`].
    ///
    /// Invocables come back as a [`Value`] holding the [`Constructor`],
    /// identifiers as a `String`.
    pub fn to_value(&self) -> Value {
        match self {
            Producer::Invocable(ctor) => Value::new(ctor.clone()),
            Producer::External(identifier) => Value::new(identifier.clone()),
            Producer::Constant(value) | Producer::Instance { value, .. } => value.clone(),
        }
    }

    /// Short label used in diagnostics.
    pub fn describe(&self) -> String {
        match self {
            Producer::Invocable(ctor) => format!("{ctor:?}"),
            Producer::External(identifier) => format!("module {identifier:?}"),
            Producer::Constant(value) => format!("constant {value:?}"),
            Producer::Instance { value, .. } => format!("instance {value:?}"),
        }
    }
}

impl fmt::Debug for Producer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.describe())
    }
}

impl From<Constructor> for Producer {
    fn from(ctor: Constructor) -> Self {
        Producer::Invocable(ctor)
    }
}

impl From<Value> for Producer {
    fn from(value: Value) -> Self {
        Producer::Constant(value)
    }
}

/// A constructor argument declared at registration time.
#[derive(Clone, Debug)]
pub enum BoundArg {
    /// Passed through untouched.
    Literal(Value),
    /// Replaced by the resolved value of this key when it is registered
    /// at binding time; otherwise the key text is passed as a `String`.
    Key(DependencyKey),
}

impl BoundArg {
    pub fn literal<T: Any + Send + Sync>(value: T) -> Self {
        BoundArg::Literal(Value::new(value))
    }

    pub fn key(key: impl Into<DependencyKey>) -> Self {
        BoundArg::Key(key.into())
    }
}

/// The kind as written by the caller; checked at registration.
#[derive(Clone, Debug, PartialEq, Eq)]
enum KindSpec {
    Missing,
    Known(Kind),
    Unknown(String),
}

/// Callback fired once after a descriptor is stored.
pub type OnRegistered = Box<dyn FnOnce()>;

/// Describes how to produce the value for one key.
pub struct Descriptor {
    key: DependencyKey,
    kind: KindSpec,
    producer: Option<Producer>,
    bound_args: Vec<BoundArg>,
    overwrite: bool,
    on_registered: Option<OnRegistered>,
}

impl Descriptor {
    /// An empty descriptor for `key`. Kind and producer still have to be set.
    pub fn new(key: impl Into<DependencyKey>) -> Self {
        Self {
            key: key.into(),
            kind: KindSpec::Missing,
            producer: None,
            bound_args: Vec::new(),
            overwrite: false,
            on_registered: None,
        }
    }

    // ── Shorthands ──

    /// A [`Kind::Const`] descriptor holding `value`.
    pub fn constant<T: Any + Send + Sync>(key: impl Into<DependencyKey>, value: T) -> Self {
        Self::new(key).kind(Kind::Const).producer(Producer::constant(value))
    }

    /// A [`Kind::Transient`] descriptor built by `ctor`.
    pub fn transient(key: impl Into<DependencyKey>, ctor: Constructor) -> Self {
        Self::new(key).kind(Kind::Transient).producer(Producer::Invocable(ctor))
    }

    /// A [`Kind::Shared`] descriptor built by `ctor` on first use.
    pub fn shared(key: impl Into<DependencyKey>, ctor: Constructor) -> Self {
        Self::new(key).kind(Kind::Shared).producer(Producer::Invocable(ctor))
    }

    /// A descriptor whose constructor comes from the module loader.
    pub fn external(key: impl Into<DependencyKey>, kind: Kind, identifier: impl Into<String>) -> Self {
        Self::new(key).kind(kind).producer(Producer::External(identifier.into()))
    }

    // ── Fields ──

    pub fn kind(mut self, kind: Kind) -> Self {
        self.kind = KindSpec::Known(kind);
        self
    }

    /// Sets the kind from its textual form. Unknown text is kept and
    /// rejected when the descriptor is registered.
    pub fn kind_named(mut self, kind: &str) -> Self {
        self.kind = match kind.parse::<Kind>() {
            Ok(kind) => KindSpec::Known(kind),
            Err(_) => KindSpec::Unknown(kind.to_string()),
        };
        self
    }

    pub fn producer(mut self, producer: impl Into<Producer>) -> Self {
        self.producer = Some(producer.into());
        self
    }

    /// Appends a bound argument.
    pub fn bind(mut self, arg: BoundArg) -> Self {
        self.bound_args.push(arg);
        self
    }

    /// Appends a bound argument that refers to another key.
    pub fn bind_key(self, key: impl Into<DependencyKey>) -> Self {
        self.bind(BoundArg::Key(key.into()))
    }

    /// Appends a literal bound argument.
    pub fn bind_value<T: Any + Send + Sync>(self, value: T) -> Self {
        self.bind(BoundArg::literal(value))
    }

    /// Replace any existing entry under the same key.
    pub fn overwrite(mut self, overwrite: bool) -> Self {
        self.overwrite = overwrite;
        self
    }

    /// Called synchronously, once, if the descriptor ends up stored.
    pub fn on_registered(mut self, callback: impl FnOnce() + 'static) -> Self {
        self.on_registered = Some(Box::new(callback));
        self
    }

    pub fn key(&self) -> &DependencyKey {
        &self.key
    }

    /// Checks required fields and splits off the registration hooks.
    pub(crate) fn validate(self) -> Result<Validated, ValidationError> {
        if self.key.is_empty() {
            return Err(ValidationError::MissingKey);
        }

        let kind = match self.kind {
            KindSpec::Known(kind) => kind,
            KindSpec::Missing => {
                return Err(ValidationError::InvalidKind { key: self.key, kind: None });
            }
            KindSpec::Unknown(kind) => {
                return Err(ValidationError::InvalidKind { key: self.key, kind: Some(kind) });
            }
        };

        let Some(producer) = self.producer else {
            return Err(ValidationError::MissingProducer { key: self.key });
        };

        Ok(Validated {
            registration: Registration::new(self.key, kind, producer, self.bound_args),
            overwrite: self.overwrite,
            on_registered: self.on_registered,
        })
    }
}

impl fmt::Debug for Descriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Descriptor")
            .field("key", &self.key)
            .field("kind", &self.kind)
            .field("producer", &self.producer)
            .field("bound_args", &self.bound_args)
            .field("overwrite", &self.overwrite)
            .field("on_registered", &self.on_registered.is_some())
            .finish()
    }
}

/// A descriptor that passed validation.
pub(crate) struct Validated {
    pub registration: Registration,
    pub overwrite: bool,
    pub on_registered: Option<OnRegistered>,
}

/// What the registry stores for a key.
#[derive(Clone)]
pub struct Registration {
    key: DependencyKey,
    kind: Kind,
    producer: Producer,
    bound_args: Vec<BoundArg>,
}

impl Registration {
    pub fn new(key: DependencyKey, kind: Kind, producer: Producer, bound_args: Vec<BoundArg>) -> Self {
        Self {
            key,
            kind,
            producer,
            bound_args,
        }
    }

    pub fn key(&self) -> &DependencyKey {
        &self.key
    }

    pub fn kind(&self) -> Kind {
        self.kind
    }

    pub fn producer(&self) -> &Producer {
        &self.producer
    }

    pub fn bound_args(&self) -> &[BoundArg] {
        &self.bound_args
    }
}

impl fmt::Debug for Registration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Registration")
            .field("key", &self.key)
            .field("kind", &self.kind)
            .field("producer", &self.producer)
            .field("bound_args", &self.bound_args)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn complete_descriptor_validates() {
        let validated = Descriptor::constant("port", 8080u16)
            .overwrite(true)
            .validate()
            .unwrap();

        assert_eq!(validated.registration.key().as_str(), "port");
        assert_eq!(validated.registration.kind(), Kind::Const);
        assert!(validated.overwrite);
        assert!(validated.on_registered.is_none());
    }

    #[test]
    fn empty_key_rejected() {
        let err = Descriptor::constant("", 1i32).validate().err().unwrap();
        assert_eq!(err, ValidationError::MissingKey);
    }

    #[test]
    fn missing_kind_rejected() {
        let err = Descriptor::new("x").producer(Producer::null()).validate().err().unwrap();
        assert!(matches!(err, ValidationError::InvalidKind { kind: None, .. }));
    }

    #[test]
    fn unknown_kind_rejected() {
        let err = Descriptor::new("x")
            .kind_named("factory")
            .producer(Producer::null())
            .validate()
            .err()
            .unwrap();
        assert!(matches!(err, ValidationError::InvalidKind { kind: Some(ref k), .. } if k == "factory"));
    }

    #[test]
    fn missing_producer_rejected_but_null_accepted() {
        let err = Descriptor::new("x").kind(Kind::Const).validate().err().unwrap();
        assert!(matches!(err, ValidationError::MissingProducer { .. }));

        let ok = Descriptor::new("x").kind(Kind::Const).producer(Producer::null()).validate();
        assert!(ok.is_ok());
    }

    #[test]
    fn bound_args_keep_order() {
        let validated = Descriptor::new("svc")
            .kind_named("transient")
            .producer(Producer::External("app::Service".into()))
            .bind_key("config")
            .bind_value(3i32)
            .validate()
            .unwrap();

        let args = validated.registration.bound_args();
        assert!(matches!(&args[0], BoundArg::Key(k) if k.as_str() == "config"));
        assert!(matches!(&args[1], BoundArg::Literal(v) if v.downcast_ref::<i32>() == Some(&3)));
    }

    #[test]
    fn const_producer_as_value() {
        let producer = Producer::External("app::Clock".into());
        assert_eq!(producer.to_value().downcast_ref::<String>().map(String::as_str), Some("app::Clock"));
        assert!(producer.instance().is_none());
        assert!(Producer::constant(1i32).instance().is_some());
    }

    #[test]
    fn constructor_constant_is_not_an_instance() {
        let ctor = Constructor::of::<u8>(|_, _| Ok(1));
        assert!(Producer::Constant(Value::new(ctor.clone())).instance().is_none());

        let built = Producer::Instance {
            value: Value::new(ctor),
            constructor: None,
        };
        assert!(built.instance().is_some());
    }
}
