//! Module loaders — resolve string identifiers to constructors.
//!
//! A descriptor with a [`Producer::External`](crate::descriptor::Producer::External)
//! names a unit by identifier. The container asks its [`ModuleLoader`] for
//! that unit and unwraps the default export of module-style units.
//!
//! Two loaders ship with the crate:
//! - [`ModuleTable`]: an explicit in-memory table
//! - [`InventoryLoader`]: units submitted anywhere in the binary with
//!   [`inventory::submit!`]
//!
//! ```rust
//! use khazina_container::prelude::*;
//! use khazina_container::loader::{ModuleEntry, InventoryLoader};
//!
//! struct Clock;
//!
//! fn make_clock(_: &Accessor<'_>, _: Args) -> Result<Value> {
//!     Ok(Value::new(Clock))
//! }
//!
//! khazina_container::inventory::submit! {
//!     ModuleEntry::new("doc::Clock", make_clock)
//! }
//!
//! let container = Container::builder()
//!     .module_loader(InventoryLoader)
//!     .register(Descriptor::external("clock", Kind::Shared, "doc::Clock"))
//!     .build()
//!     .unwrap();
//!
//! assert!(container.resolve_as::<Clock>("clock").is_ok());
//! ```

use std::collections::HashMap;
use std::fmt;

use once_cell::sync::Lazy;
use tracing::debug;

use crate::constructor::{ConstructPtr, Constructor};
use crate::error::{KhazinaError, Result};

/// What a loader hands back for an identifier.
#[derive(Clone)]
pub enum LoadedUnit {
    /// The unit is itself invocable.
    Invocable(Constructor),
    /// The unit wraps its primary export; `default` is used when present.
    Module { default: Option<Constructor> },
}

impl fmt::Debug for LoadedUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LoadedUnit::Invocable(ctor) => write!(f, "Invocable({ctor:?})"),
            LoadedUnit::Module { default } => f.debug_struct("Module").field("default", default).finish(),
        }
    }
}

/// Resolves identifiers to loadable units.
///
/// Loading is synchronous. Implementations must not call back into the
/// container that is asking.
pub trait ModuleLoader: Send + Sync {
    /// Loads the unit named `identifier`.
    ///
    /// # Errors
    /// [`KhazinaError::ModuleLoad`] when no such unit exists.
    fn load(&self, identifier: &str) -> Result<LoadedUnit>;
}

fn unknown_module(identifier: &str) -> KhazinaError {
    KhazinaError::ModuleLoad {
        identifier: identifier.to_string(),
        reason: "no such module".to_string(),
    }
}

// ═══════════════════════════════════════════
// ModuleTable
// ═══════════════════════════════════════════

/// An in-memory identifier → unit table.
#[derive(Debug, Default, Clone)]
pub struct ModuleTable {
    units: HashMap<String, LoadedUnit>,
}

impl ModuleTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a directly invocable unit.
    pub fn with(mut self, identifier: impl Into<String>, ctor: Constructor) -> Self {
        self.insert(identifier, LoadedUnit::Invocable(ctor));
        self
    }

    /// Adds a module-style unit whose default export is `ctor`.
    pub fn with_default_export(mut self, identifier: impl Into<String>, ctor: Constructor) -> Self {
        self.insert(identifier, LoadedUnit::Module { default: Some(ctor) });
        self
    }

    pub fn insert(&mut self, identifier: impl Into<String>, unit: LoadedUnit) {
        self.units.insert(identifier.into(), unit);
    }

    pub fn len(&self) -> usize {
        self.units.len()
    }

    pub fn is_empty(&self) -> bool {
        self.units.is_empty()
    }
}

impl ModuleLoader for ModuleTable {
    fn load(&self, identifier: &str) -> Result<LoadedUnit> {
        self.units.get(identifier).cloned().ok_or_else(|| unknown_module(identifier))
    }
}

// ═══════════════════════════════════════════
// InventoryLoader
// ═══════════════════════════════════════════

/// A unit submitted with [`inventory::submit!`].
pub struct ModuleEntry {
    identifier: &'static str,
    construct: ConstructPtr,
    default_export: bool,
}

impl ModuleEntry {
    /// A directly invocable unit.
    pub const fn new(identifier: &'static str, construct: ConstructPtr) -> Self {
        Self {
            identifier,
            construct,
            default_export: false,
        }
    }

    /// A module-style unit exporting `construct` as its default.
    pub const fn with_default_export(identifier: &'static str, construct: ConstructPtr) -> Self {
        Self {
            identifier,
            construct,
            default_export: true,
        }
    }

    pub fn identifier(&self) -> &'static str {
        self.identifier
    }

    fn unit(&self) -> LoadedUnit {
        let ctor = Constructor::from_fn(self.identifier, self.construct);
        if self.default_export {
            LoadedUnit::Module { default: Some(ctor) }
        } else {
            LoadedUnit::Invocable(ctor)
        }
    }
}

impl fmt::Debug for ModuleEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ModuleEntry")
            .field("identifier", &self.identifier)
            .field("default_export", &self.default_export)
            .finish()
    }
}

inventory::collect!(ModuleEntry);

static INVENTORY: Lazy<HashMap<&'static str, &'static ModuleEntry>> = Lazy::new(|| {
    let index: HashMap<_, _> = inventory::iter::<ModuleEntry>
        .into_iter()
        .map(|entry| (entry.identifier, entry))
        .collect();
    debug!(modules = index.len(), "Indexed submitted modules");
    index
});

/// Loads units submitted with [`inventory::submit!`].
///
/// The submitted entries are indexed once, on first use. When two
/// entries share an identifier, which one wins is unspecified.
#[derive(Debug, Default, Clone, Copy)]
pub struct InventoryLoader;

impl InventoryLoader {
    /// Identifiers of every submitted unit, sorted.
    pub fn identifiers() -> Vec<&'static str> {
        let mut identifiers: Vec<_> = INVENTORY.keys().copied().collect();
        identifiers.sort_unstable();
        identifiers
    }
}

impl ModuleLoader for InventoryLoader {
    fn load(&self, identifier: &str) -> Result<LoadedUnit> {
        INVENTORY
            .get(identifier)
            .map(|entry| entry.unit())
            .ok_or_else(|| unknown_module(identifier))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::accessor::Accessor;
    use crate::value::{Args, Value};

    fn make_answer(_: &Accessor<'_>, _: Args) -> Result<Value> {
        Ok(Value::new(42i32))
    }

    inventory::submit! {
        ModuleEntry::new("loader_tests::answer", make_answer)
    }

    inventory::submit! {
        ModuleEntry::with_default_export("loader_tests::wrapped", make_answer)
    }

    #[test]
    fn table_loads_registered_units() {
        let table = ModuleTable::new()
            .with("a", Constructor::from_fn("a", make_answer))
            .with_default_export("b", Constructor::from_fn("b", make_answer));

        assert_eq!(table.len(), 2);
        assert!(matches!(table.load("a").unwrap(), LoadedUnit::Invocable(_)));
        assert!(matches!(table.load("b").unwrap(), LoadedUnit::Module { default: Some(_) }));
    }

    #[test]
    fn table_unknown_identifier() {
        let err = ModuleTable::new().load("nope").unwrap_err();
        assert!(matches!(err, KhazinaError::ModuleLoad { ref identifier, .. } if identifier == "nope"));
    }

    #[test]
    fn inventory_finds_submitted_units() {
        let ids = InventoryLoader::identifiers();
        assert!(ids.contains(&"loader_tests::answer"));

        assert!(matches!(
            InventoryLoader.load("loader_tests::answer").unwrap(),
            LoadedUnit::Invocable(_)
        ));
        assert!(matches!(
            InventoryLoader.load("loader_tests::wrapped").unwrap(),
            LoadedUnit::Module { default: Some(_) }
        ));
        assert!(InventoryLoader.load("loader_tests::missing").is_err());
    }
}
