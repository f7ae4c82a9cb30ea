//! Provider trait: a bundle of related descriptors.
//!
//! # Examples
//! ```rust
//! use khazina_container::prelude::*;
//!
//! struct Database;
//! struct MailProvider;
//!
//! impl Provider for MailProvider {
//!     fn register(&self, registry: &mut dyn ProviderRegistry) {
//!         registry.add(Descriptor::constant("mail.host", String::from("smtp.local")));
//!         registry.add(Descriptor::shared("db", Constructor::of::<Database>(|_, _| Ok(Database))));
//!     }
//! }
//!
//! let container = Container::builder().add_provider(&MailProvider).build().unwrap();
//! assert!(container.contains("mail.host"));
//! assert!(container.contains("db"));
//! ```

use crate::descriptor::Descriptor;

/// A module that contributes related descriptors to a container.
///
/// Split registrations by domain instead of one giant block:
///
/// ```rust,ignore
/// let container = Container::builder()
///     .add_provider(&DatabaseProvider)
///     .add_provider(&MailProvider)
///     .build()?;
/// ```
pub trait Provider: Send + Sync {
    /// Add this provider's descriptors, in registration order.
    fn register(&self, registry: &mut dyn ProviderRegistry);

    /// Human-readable name for log messages.
    fn name(&self) -> &str {
        std::any::type_name::<Self>()
    }
}

/// Sink that providers add descriptors to.
///
/// Implemented by [`ContainerBuilder`](crate::container::ContainerBuilder)
/// and by `Vec<Descriptor>`, which lets providers be tested alone.
pub trait ProviderRegistry {
    fn add(&mut self, descriptor: Descriptor);
}

impl ProviderRegistry for Vec<Descriptor> {
    fn add(&mut self, descriptor: Descriptor) {
        self.push(descriptor);
    }
}
