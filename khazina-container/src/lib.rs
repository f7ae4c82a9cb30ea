//! Core container implementation for Khazina DI.

pub mod accessor;
pub mod constructor;
pub mod container;
pub mod descriptor;
pub mod error;
pub mod key;
pub mod kind;
pub mod loader;
pub mod manifest;
pub mod provider;
pub mod registry;
pub mod value;

pub use inventory;

pub use container::{prelude, Container, ContainerBuilder};
pub use error::{KhazinaError, Result};
pub use key::DependencyKey;
pub use kind::Kind;
