//! # Khazina Support
//!
//! Shared utilities for the Khazina DI container.
//!
//! This crate provides:
//! - Text rendering for error messages
//! - "Did you mean?" suggestions for mistyped keys

pub mod rendering;
