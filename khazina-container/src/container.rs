//! # The Container — heart of Khazina
//!
//! Registers descriptors under keys and resolves keys into values,
//! binding constructor arguments and memoizing shared instances.
//!
//! # Architecture
//! ```text
//! ContainerBuilder ──build()──> Container ──accessor()──> Accessor
//!                                   │                        │
//!                               Registry  <── get/resolve ───┘
//! ```
//!
//! # Examples
//! ```rust
//! use khazina_container::prelude::*;
//! use std::sync::Arc;
//!
//! struct Config { url: String }
//! struct Database { url: String }
//! struct UserService { db: Arc<Database>, user: u64 }
//!
//! let container = Container::new();
//! container
//!     .register([
//!         Descriptor::constant("config", Config { url: "postgres://localhost".into() }),
//!         Descriptor::shared("db", Constructor::of::<Database>(|ctx, _| {
//!             let config: Arc<Config> = ctx.resolve_as("config")?;
//!             Ok(Database { url: config.url.clone() })
//!         })),
//!     ])
//!     .unwrap()
//!     .register([
//!         Descriptor::transient("users", Constructor::of::<UserService>(|_, args| {
//!             Ok(UserService { db: args.get(0)?, user: args.cloned(1)? })
//!         }))
//!         .bind_key("db"),
//!     ])
//!     .unwrap();
//!
//! let users = container.resolve_with("users", khazina_container::args![7u64]).unwrap();
//! let users = users.downcast_ref::<UserService>().unwrap();
//! assert_eq!(users.db.url, "postgres://localhost");
//! assert_eq!(users.user, 7);
//! ```
//!
//! # Cycles
//! A key whose resolution requires itself (directly or through other
//! keys) is not detected. It recurses until the stack is exhausted.

use std::any::Any;
use std::cell::RefCell;
use std::fmt;
use std::sync::Arc;

use khazina_support::rendering::{shorten_type_name, suggest_similar};
use parking_lot::ReentrantMutex;
use tracing::{debug, error, info, instrument, trace, warn};

use crate::accessor::{Accessor, FromAccessor};
use crate::constructor::{BoundConstructor, Constructor};
use crate::descriptor::{BoundArg, Descriptor, Producer, Registration, Validated};
use crate::error::{KhazinaError, NotAConstructorError, NotRegisteredError, Result};
use crate::key::DependencyKey;
use crate::kind::Kind;
use crate::loader::{LoadedUnit, ModuleLoader};
use crate::manifest::Manifest;
use crate::provider::{Provider, ProviderRegistry};
use crate::registry::Registry;
use crate::value::{Args, Value};

const MAX_SUGGESTIONS: usize = 3;

// ============================================================
// ContainerBuilder
// ============================================================

/// Builds a [`Container`] with a module loader and initial descriptors.
///
/// # Examples
/// ```rust,ignore
/// let container = Container::builder()
///     .module_loader(InventoryLoader)
///     .register(Descriptor::constant("config", Config::load()))
///     .add_provider(&DatabaseProvider)
///     .build()?;
/// ```
pub struct ContainerBuilder {
    loader: Option<Arc<dyn ModuleLoader>>,
    pending: Vec<Descriptor>,
}

impl ContainerBuilder {
    fn new() -> Self {
        Self {
            loader: None,
            pending: Vec::new(),
        }
    }

    /// Loader used for [`Producer::External`] identifiers.
    pub fn module_loader(self, loader: impl ModuleLoader + 'static) -> Self {
        self.shared_module_loader(Arc::new(loader))
    }

    /// Like [`ContainerBuilder::module_loader`], for a loader already behind an `Arc`.
    pub fn shared_module_loader(mut self, loader: Arc<dyn ModuleLoader>) -> Self {
        self.loader = Some(loader);
        self
    }

    /// Queue a descriptor; it is registered by [`build()`](ContainerBuilder::build).
    pub fn register(mut self, descriptor: Descriptor) -> Self {
        self.pending.push(descriptor);
        self
    }

    /// Queue every descriptor of a [`Provider`].
    pub fn add_provider(mut self, provider: &dyn Provider) -> Self {
        debug!(provider = provider.name(), "Adding provider");
        provider.register(&mut self);
        self
    }

    /// Build the container and register the queued descriptors in order.
    ///
    /// # Errors
    /// The first [`KhazinaError::Validation`] raised by a queued descriptor.
    #[instrument(skip(self), name = "container_build")]
    pub fn build(self) -> Result<Container> {
        info!(queued = self.pending.len(), "Building container");

        let container = Container::from_parts(self.loader);
        container.register(self.pending)?;

        info!(registered = container.len(), "Container built successfully ✓");
        Ok(container)
    }
}

impl ProviderRegistry for ContainerBuilder {
    fn add(&mut self, descriptor: Descriptor) {
        self.pending.push(descriptor);
    }
}

impl fmt::Debug for ContainerBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ContainerBuilder")
            .field("queued", &self.pending.len())
            .field("module_loader", &self.loader.is_some())
            .finish()
    }
}

// ═══════════════════════════════════════════
// Container
// ═══════════════════════════════════════════

struct State {
    registry: Registry,
    /// Keys currently being resolved on the lock-holding thread, outermost first.
    resolving: Vec<DependencyKey>,
}

/// Keyed dependency injection container.
///
/// Every resolution runs inside one re-entrant critical section, so a
/// shared instance is never built twice, even when several threads ask
/// for it first at the same time. Constructors may call back into the
/// container through their [`Accessor`]; they must not block on another
/// thread that uses the same container.
pub struct Container {
    state: ReentrantMutex<RefCell<State>>,
    loader: Option<Arc<dyn ModuleLoader>>,
}

impl Container {
    /// An empty container without a module loader.
    pub fn new() -> Self {
        Self::from_parts(None)
    }

    /// Create a new builder.
    pub fn builder() -> ContainerBuilder {
        ContainerBuilder::new()
    }

    fn from_parts(loader: Option<Arc<dyn ModuleLoader>>) -> Self {
        Self {
            state: ReentrantMutex::new(RefCell::new(State {
                registry: Registry::new(),
                resolving: Vec::new(),
            })),
            loader,
        }
    }

    /// The accessor view handed to constructors.
    pub fn accessor(&self) -> Accessor<'_> {
        Accessor::new(self)
    }

    // ── Registration ──

    /// Register descriptors, in order.
    ///
    /// An existing key is kept unless the new descriptor asks to
    /// overwrite it; a skipped duplicate is logged, not an error.
    /// `on_registered` callbacks run right after their descriptor is stored.
    ///
    /// # Errors
    /// [`KhazinaError::Validation`] for the first invalid descriptor.
    /// Descriptors before it stay registered.
    pub fn register<I>(&self, descriptors: I) -> Result<&Self>
    where
        I: IntoIterator<Item = Descriptor>,
    {
        for descriptor in descriptors {
            let Validated {
                registration,
                overwrite,
                on_registered,
            } = descriptor.validate().map_err(|err| {
                warn!(error = %err, "Rejected descriptor");
                KhazinaError::Validation(err)
            })?;

            if self.store(registration, overwrite) {
                if let Some(callback) = on_registered {
                    callback();
                }
            }
        }

        Ok(self)
    }

    /// Register every descriptor a [`Provider`] declares.
    pub fn register_provider(&self, provider: &dyn Provider) -> Result<&Self> {
        let mut descriptors: Vec<Descriptor> = Vec::new();
        provider.register(&mut descriptors);
        debug!(provider = provider.name(), count = descriptors.len(), "Registering provider");
        self.register(descriptors)
    }

    /// Register the entries of a [`Manifest`], in order.
    #[instrument(skip_all, fields(entries = manifest.len()))]
    pub fn load_manifest(&self, manifest: Manifest) -> Result<&Self> {
        self.register(manifest.into_descriptors()?)
    }

    /// Returns `true` if the registration was stored.
    fn store(&self, registration: Registration, overwrite: bool) -> bool {
        let guard = self.state.lock();
        let mut state = guard.borrow_mut();
        let key = registration.key().clone();

        if overwrite {
            let replaced = state.registry.delete(key.as_str()).is_some();
            debug!(key = %key, kind = %registration.kind(), replaced, "Registered dependency (overwrite)");
            state.registry.set(key, registration);
            true
        } else if state.registry.has(key.as_str()) {
            warn!(key = %key, "Dependency already registered; keeping the existing descriptor");
            false
        } else {
            debug!(key = %key, kind = %registration.kind(), "Registered dependency");
            state.registry.set(key, registration);
            true
        }
    }

    // ── Resolution ──

    /// Resolve `key` with no call-time arguments.
    ///
    /// ```rust,ignore
    /// let port = container.resolve("port")?;
    /// ```
    pub fn resolve(&self, key: &str) -> Result<Value> {
        self.resolve_with(key, Args::new())
    }

    /// Resolve `key`, passing `args` after any bound arguments when an
    /// instance is constructed. Arguments are ignored for constants and
    /// for shared instances that already exist.
    pub fn resolve_with(&self, key: &str, args: Args) -> Result<Value> {
        let _lock = self.state.lock();
        let registration = self.lookup(key)?;
        let _frame = ResolvingFrame::enter(self, registration.key().clone());

        trace!(key, kind = %registration.kind(), "Resolving");
        self.instantiate_registration(&registration, args)
    }

    /// Resolve `key` as a shared `T`.
    pub fn resolve_as<T: Any + Send + Sync>(&self, key: &str) -> Result<Arc<T>> {
        self.resolve(key)?.downcast_or_mismatch::<T>(format!("dependency {key:?}"))
    }

    /// Non-fatal [`Container::resolve`]: failures are logged and become `None`.
    pub fn get(&self, key: &str) -> Option<Value> {
        self.get_with(key, Args::new())
    }

    /// Non-fatal [`Container::resolve_with`].
    pub fn get_with(&self, key: &str, args: Args) -> Option<Value> {
        self.resolve_with(key, args)
            .inspect_err(|err| report_failure(key, err))
            .ok()
    }

    /// Non-fatal [`Container::resolve_as`].
    pub fn get_as<T: Any + Send + Sync>(&self, key: &str) -> Option<Arc<T>> {
        self.resolve_as::<T>(key)
            .inspect_err(|err| report_failure(key, err))
            .ok()
    }

    /// The constructor for `key`, without building anything.
    ///
    /// Bound arguments are resolved (which may build *their* shared
    /// instances), but a shared `key` itself stays unbuilt.
    pub fn try_get_constructor(&self, key: &str) -> Result<BoundConstructor> {
        let _lock = self.state.lock();
        let registration = self.lookup(key)?;
        let _frame = ResolvingFrame::enter(self, registration.key().clone());

        trace!(key, kind = %registration.kind(), "Resolving constructor");
        self.constructor_for(&registration)
    }

    /// Non-fatal [`Container::try_get_constructor`].
    pub fn get_constructor(&self, key: &str) -> Option<BoundConstructor> {
        self.try_get_constructor(key)
            .inspect_err(|err| report_failure(key, err))
            .ok()
    }

    /// The constructor a producer stands for, bypassing the registry.
    pub fn constructor_from(&self, producer: &Producer) -> Result<Constructor> {
        self.materialize(None, producer)
    }

    /// Non-fatal [`Container::constructor_from`].
    pub fn get_constructor_from(&self, producer: &Producer) -> Option<Constructor> {
        self.constructor_from(producer)
            .inspect_err(|err| report_failure(&producer.describe(), err))
            .ok()
    }

    /// Build a brand new instance for `key` with `args`.
    ///
    /// Never memoizes, even for shared keys.
    pub fn instantiate(&self, key: &str, args: Args) -> Result<Value> {
        let _lock = self.state.lock();
        let ctor = self.try_get_constructor(key)?;
        ctor.construct(&self.accessor(), args)
    }

    /// Non-fatal [`Container::instantiate`].
    pub fn get_instance(&self, key: &str, args: Args) -> Option<Value> {
        self.instantiate(key, args)
            .inspect_err(|err| report_failure(key, err))
            .ok()
    }

    /// Assemble a typed view from several keys.
    pub fn view<T: FromAccessor>(&self) -> Result<T> {
        let _lock = self.state.lock();
        T::from_accessor(&self.accessor())
    }

    // ── Introspection ──

    pub fn contains(&self, key: &str) -> bool {
        self.state.lock().borrow().registry.has(key)
    }

    /// Snapshot of the registration stored for `key`.
    pub fn registration(&self, key: &str) -> Option<Registration> {
        self.state.lock().borrow().registry.get(key).cloned()
    }

    /// Registered keys in registry order.
    pub fn keys(&self) -> Vec<DependencyKey> {
        self.state.lock().borrow().registry.keys()
    }

    pub fn len(&self) -> usize {
        self.state.lock().borrow().registry.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    // ── Internal ──

    fn lookup(&self, key: &str) -> Result<Registration> {
        let guard = self.state.lock();
        let state = guard.borrow();
        match state.registry.get(key) {
            Some(registration) => Ok(registration.clone()),
            None => Err(not_registered(key, &state)),
        }
    }

    /// Turns a registration into a value.
    fn instantiate_registration(&self, registration: &Registration, args: Args) -> Result<Value> {
        match registration.kind() {
            Kind::Const => Ok(registration.producer().to_value()),
            Kind::Transient => {
                let ctor = self.issue_constructor(registration)?;
                ctor.construct(&self.accessor(), args)
            }
            Kind::Shared => {
                if let Some(instance) = registration.producer().instance() {
                    return Ok(instance.clone());
                }

                let ctor = self.issue_constructor(registration)?;
                let instance = ctor.construct(&self.accessor(), args)?;
                self.memoize(registration.key(), instance, ctor.target().clone())
            }
        }
    }

    /// Turns a registration into its constructor without building it.
    fn constructor_for(&self, registration: &Registration) -> Result<BoundConstructor> {
        let producer = registration.producer();
        match registration.kind() {
            // Constants and live shared instances offer whatever their value can.
            Kind::Const => self.materialize(Some(registration.key()), producer).map(BoundConstructor::unbound),
            Kind::Shared if producer.instance().is_some() => {
                self.materialize(Some(registration.key()), producer).map(BoundConstructor::unbound)
            }
            Kind::Transient | Kind::Shared => self.issue_constructor(registration),
        }
    }

    /// The registration's constructor with its bound arguments resolved.
    fn issue_constructor(&self, registration: &Registration) -> Result<BoundConstructor> {
        let target = self.materialize(Some(registration.key()), registration.producer())?;
        let bound = registration
            .bound_args()
            .iter()
            .map(|arg| self.resolve_bound_arg(arg))
            .collect::<Result<Vec<_>>>()?;

        Ok(BoundConstructor::new(target, bound))
    }

    fn resolve_bound_arg(&self, arg: &BoundArg) -> Result<Value> {
        match arg {
            BoundArg::Literal(value) => Ok(value.clone()),
            BoundArg::Key(key) if self.contains(key.as_str()) => self.resolve(key.as_str()),
            BoundArg::Key(key) => {
                trace!(key = %key, "Bound key is not registered; passing it literally");
                Ok(Value::new(key.as_str().to_string()))
            }
        }
    }

    fn materialize(&self, key: Option<&DependencyKey>, producer: &Producer) -> Result<Constructor> {
        match producer {
            Producer::Invocable(ctor) => Ok(ctor.clone()),
            Producer::External(identifier) => self.load_module(key, identifier),
            Producer::Instance {
                constructor: Some(ctor),
                ..
            } => Ok(ctor.clone()),
            Producer::Instance {
                value,
                constructor: None,
            }
            | Producer::Constant(value) => value
                .downcast_ref::<Constructor>()
                .cloned()
                .ok_or_else(|| not_a_constructor(key, shorten_type_name(value.type_name()))),
        }
    }

    fn load_module(&self, key: Option<&DependencyKey>, identifier: &str) -> Result<Constructor> {
        let loader = self.loader.as_ref().ok_or_else(|| KhazinaError::ModuleLoad {
            identifier: identifier.to_string(),
            reason: "no module loader configured".to_string(),
        })?;

        match loader.load(identifier)? {
            LoadedUnit::Invocable(ctor) => Ok(ctor),
            LoadedUnit::Module { default: Some(ctor) } => {
                trace!(identifier, "Using default export");
                Ok(ctor)
            }
            LoadedUnit::Module { default: None } => Err(not_a_constructor(
                key,
                format!("module {identifier:?} without a default export"),
            )),
        }
    }

    /// Replaces the entry for `key` with the live instance and returns
    /// the stored value.
    fn memoize(&self, key: &DependencyKey, instance: Value, constructor: Constructor) -> Result<Value> {
        let guard = self.state.lock();
        let mut state = guard.borrow_mut();

        let memoized = Registration::new(
            key.clone(),
            Kind::Shared,
            Producer::Instance {
                value: instance,
                constructor: Some(constructor),
            },
            Vec::new(),
        );
        state.registry.delete(key.as_str());
        state.registry.set(key.clone(), memoized);
        debug!(key = %key, "Memoized shared instance");

        state
            .registry
            .get(key.as_str())
            .and_then(|registration| registration.producer().instance().cloned())
            .ok_or_else(|| not_registered(key.as_str(), &state))
    }
}

impl Default for Container {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Container {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Container")
            .field("registered", &self.len())
            .field("module_loader", &self.loader.is_some())
            .finish()
    }
}

/// Tracks the key being resolved for error messages; pops on drop.
struct ResolvingFrame<'a> {
    container: &'a Container,
}

impl<'a> ResolvingFrame<'a> {
    fn enter(container: &'a Container, key: DependencyKey) -> Self {
        container.state.lock().borrow_mut().resolving.push(key);
        Self { container }
    }
}

impl Drop for ResolvingFrame<'_> {
    fn drop(&mut self) {
        self.container.state.lock().borrow_mut().resolving.pop();
    }
}

fn not_registered(key: &str, state: &State) -> KhazinaError {
    let available = state.registry.keys();
    KhazinaError::NotRegistered(NotRegisteredError {
        requested: DependencyKey::new(key),
        resolution_path: state.resolving.clone(),
        suggestions: suggest_similar(key, available.as_slice(), MAX_SUGGESTIONS),
    })
}

fn not_a_constructor(key: Option<&DependencyKey>, found: String) -> KhazinaError {
    KhazinaError::NotAConstructor(NotAConstructorError {
        key: key.cloned(),
        found,
    })
}

fn report_failure(key: &str, err: &KhazinaError) {
    error!(key, error = %err, "Failed to resolve dependency");
}

// ═══════════════════════════════════════════
// Prelude
// ═══════════════════════════════════════════

pub mod prelude {
    pub use super::{Container, ContainerBuilder};
    pub use crate::accessor::{Accessor, FromAccessor, Inject};
    pub use crate::constructor::{BoundConstructor, Constructor};
    pub use crate::descriptor::{BoundArg, Descriptor, Producer};
    pub use crate::error::{KhazinaError, Result};
    pub use crate::key::DependencyKey;
    pub use crate::kind::Kind;
    pub use crate::loader::{InventoryLoader, LoadedUnit, ModuleLoader, ModuleTable};
    pub use crate::manifest::Manifest;
    pub use crate::provider::{Provider, ProviderRegistry};
    pub use crate::value::{Args, Value};
}

// ═══════════════════════════════════════════
// Tests
// ═══════════════════════════════════════════
