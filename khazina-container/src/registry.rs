//! Dependency registry: the container's key → registration storage.
//!
//! The registry does no validation; the container decides what gets
//! stored. Iteration follows insertion order, and a key that is deleted
//! and inserted again moves to the end.

use std::collections::HashMap;

use tracing::trace;

use crate::descriptor::Registration;
use crate::key::DependencyKey;

#[derive(Debug)]
struct Entry {
    seq: u64,
    registration: Registration,
}

/// Ordered map of registrations.
#[derive(Debug, Default)]
pub struct Registry {
    entries: HashMap<DependencyKey, Entry>,
    next_seq: u64,
}

impl Registry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `true` if `key` has a registration.
    pub fn has(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    /// Looks up a registration by key.
    pub fn get(&self, key: &str) -> Option<&Registration> {
        self.entries.get(key).map(|entry| &entry.registration)
    }

    /// Inserts or replaces the registration under `key`.
    ///
    /// Replacing keeps the key's position; use [`Registry::delete`] first
    /// to move it to the end.
    pub fn set(&mut self, key: DependencyKey, registration: Registration) {
        trace!(key = %key, kind = %registration.kind(), "Storing registration");
        match self.entries.get_mut(key.as_str()) {
            Some(entry) => entry.registration = registration,
            None => {
                let seq = self.next_seq;
                self.next_seq += 1;
                self.entries.insert(key, Entry { seq, registration });
            }
        }
    }

    /// Removes the registration under `key`, returning it.
    pub fn delete(&mut self, key: &str) -> Option<Registration> {
        self.entries.remove(key).map(|entry| entry.registration)
    }

    /// Returns the number of registered keys.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if nothing is registered.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// All keys, in insertion order.
    pub fn keys(&self) -> Vec<DependencyKey> {
        let mut keyed: Vec<(u64, &DependencyKey)> =
            self.entries.iter().map(|(key, entry)| (entry.seq, key)).collect();
        keyed.sort_unstable_by_key(|(seq, _)| *seq);
        keyed.into_iter().map(|(_, key)| key.clone()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::descriptor::Producer;
    use crate::kind::Kind;

    fn make_reg(key: &str, value: i32) -> Registration {
        Registration::new(DependencyKey::new(key), Kind::Const, Producer::constant(value), vec![])
    }

    fn value_of(reg: &Registry, key: &str) -> i32 {
        let producer = reg.get(key).unwrap().producer();
        *producer.instance().unwrap().downcast_ref::<i32>().unwrap()
    }

    #[test]
    fn set_and_get() {
        let mut reg = Registry::new();
        reg.set(DependencyKey::new("a"), make_reg("a", 1));
        assert!(reg.has("a"));
        assert!(!reg.has("b"));
        assert_eq!(value_of(&reg, "a"), 1);
        assert_eq!(reg.len(), 1);
    }

    #[test]
    fn set_replaces_in_place() {
        let mut reg = Registry::new();
        reg.set(DependencyKey::new("a"), make_reg("a", 1));
        reg.set(DependencyKey::new("b"), make_reg("b", 2));
        reg.set(DependencyKey::new("a"), make_reg("a", 3));

        assert_eq!(value_of(&reg, "a"), 3);
        assert_eq!(reg.keys(), vec![DependencyKey::new("a"), DependencyKey::new("b")]);
    }

    #[test]
    fn delete_then_set_moves_to_end() {
        let mut reg = Registry::new();
        reg.set(DependencyKey::new("a"), make_reg("a", 1));
        reg.set(DependencyKey::new("b"), make_reg("b", 2));

        assert!(reg.delete("a").is_some());
        reg.set(DependencyKey::new("a"), make_reg("a", 4));

        assert_eq!(reg.keys(), vec![DependencyKey::new("b"), DependencyKey::new("a")]);
    }

    #[test]
    fn delete_missing_is_none() {
        let mut reg = Registry::new();
        assert!(reg.delete("nothing").is_none());
        assert!(reg.is_empty());
    }
}
