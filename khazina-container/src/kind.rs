//! Production strategies for registered descriptors.
//!
//! The kind decides what a resolution hands back:
//! - [`Kind::Const`]: the producer itself, verbatim
//! - [`Kind::Transient`]: a fresh instance on every request
//! - [`Kind::Shared`]: one lazily built instance, memoized in the registry

use std::fmt;
use std::str::FromStr;

/// Declares how a descriptor's producer turns into a value.
///
/// # Examples
/// ```
/// use khazina_container::kind::Kind;
///
/// assert_eq!("shared".parse::<Kind>().unwrap(), Kind::Shared);
/// assert_eq!(Kind::Transient.as_str(), "transient");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Kind {
    /// The producer is returned as-is. Nothing is ever constructed.
    ///
    /// # When to use
    /// - Configuration values
    /// - Pre-built handles owned elsewhere
    Const,

    /// A new instance is built on every resolve call.
    ///
    /// Never cached. Each `get()` runs the constructor again.
    ///
    /// # When to use
    /// - Command/query handlers
    /// - Objects with mutable state that shouldn't be shared
    Transient,

    /// One instance, built on first resolve.
    ///
    /// The registry entry is replaced by the live instance, so every
    /// later request returns the very same value.
    ///
    /// # When to use
    /// - Connection pools
    /// - Shared caches
    Shared,
}

impl Kind {
    /// All kinds, in declaration order.
    pub const ALL: [Kind; 3] = [Kind::Const, Kind::Transient, Kind::Shared];

    /// The textual form used by manifests and [`FromStr`].
    pub fn as_str(&self) -> &'static str {
        match self {
            Kind::Const => "const",
            Kind::Transient => "transient",
            Kind::Shared => "shared",
        }
    }
}

/// Returned when a textual kind names none of [`Kind::ALL`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownKind(pub String);

impl fmt::Display for UnknownKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown dependency kind {:?} (expected const, transient or shared)", self.0)
    }
}

impl std::error::Error for UnknownKind {}

impl FromStr for Kind {
    type Err = UnknownKind;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Kind::ALL
            .into_iter()
            .find(|kind| kind.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| UnknownKind(s.to_string()))
    }
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Kind::Const => write!(f, "Const"),
            Kind::Transient => write!(f, "Transient"),
            Kind::Shared => write!(f, "Shared"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_kinds() {
        assert_eq!("const".parse::<Kind>(), Ok(Kind::Const));
        assert_eq!("Transient".parse::<Kind>(), Ok(Kind::Transient));
        assert_eq!(" SHARED ".parse::<Kind>(), Ok(Kind::Shared));
    }

    #[test]
    fn parse_unknown_kind() {
        let err = "singleton".parse::<Kind>().unwrap_err();
        assert_eq!(err, UnknownKind("singleton".into()));
        assert!(err.to_string().contains("singleton"));
    }

    #[test]
    fn textual_form_round_trips() {
        for kind in Kind::ALL {
            assert_eq!(kind.as_str().parse::<Kind>(), Ok(kind));
        }
    }

    #[test]
    fn kind_display() {
        assert_eq!(format!("{}", Kind::Const), "Const");
        assert_eq!(format!("{}", Kind::Transient), "Transient");
        assert_eq!(format!("{}", Kind::Shared), "Shared");
    }
}
