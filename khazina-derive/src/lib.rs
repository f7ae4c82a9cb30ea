//! Derive macros for Khazina.

pub use khazina_macros::FromAccessor;
