//! # Khazina — keyed dependency injection for Rust
//!
//! Register descriptors under string keys, then resolve them as
//! constants, fresh instances, or lazily built shared instances.
//!
//! ```rust
//! use khazina::prelude::*;
//! use std::sync::Arc;
//!
//! struct Database { url: String }
//!
//! #[derive(FromAccessor)]
//! struct Services {
//!     #[khazina(key = "db")]
//!     database: Arc<Database>,
//!     port: Arc<u16>,
//! }
//!
//! let container = Container::new();
//! container
//!     .register([
//!         Descriptor::constant("url", String::from("postgres://localhost")),
//!         Descriptor::constant("port", 5432u16),
//!         Descriptor::shared("db", Constructor::of::<Database>(|_, args| {
//!             Ok(Database { url: args.cloned(0)? })
//!         }))
//!         .bind_key("url"),
//!     ])
//!     .unwrap();
//!
//! let services: Services = container.view().unwrap();
//! assert_eq!(services.database.url, "postgres://localhost");
//! assert_eq!(*services.port, 5432);
//! ```

pub use khazina_container::*;
pub use khazina_derive::*;
pub use khazina_support::*;

pub mod prelude {
    pub use khazina_container::prelude::*;
    pub use khazina_derive::FromAccessor;
}
