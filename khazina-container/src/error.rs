//! Error types for Khazina container operations.
//!
//! Two families matter to callers:
//! - validation errors, raised by `register` and always propagated;
//! - resolution errors, raised while turning a key into a value.
//!
//! [`KhazinaError::is_validation`] and [`KhazinaError::is_resolution`]
//! tell them apart.

use std::fmt;

use khazina_support::rendering::{render_chain, shorten_type_name};

use crate::key::DependencyKey;

/// Main error type for all Khazina operations.
#[derive(Debug, thiserror::Error)]
pub enum KhazinaError {
    /// A descriptor was rejected by `register`.
    #[error("{}", .0)]
    Validation(ValidationError),

    /// Requested key was never registered.
    #[error("{}", .0)]
    NotRegistered(NotRegisteredError),

    /// A producer could not be turned into something invocable.
    #[error("{}", .0)]
    NotAConstructor(NotAConstructorError),

    /// The module loader failed to provide a unit.
    #[error("Failed to load module {identifier:?}: {reason}")]
    ModuleLoad { identifier: String, reason: String },

    /// A value did not have the type the caller asked for.
    #[error("Type mismatch for {subject}: expected {}, found {}", shorten_type_name(.expected), shorten_type_name(.found))]
    TypeMismatch {
        subject: String,
        expected: &'static str,
        found: &'static str,
    },

    /// A constructor asked for an argument that was not passed.
    #[error("Missing argument #{index} (expected {}); {received} argument(s) received", shorten_type_name(.expected))]
    MissingArgument {
        index: usize,
        expected: &'static str,
        received: usize,
    },

    /// Constructor returned an error of its own.
    #[error("Failed to construct {key}: {source}")]
    ConstructionFailed {
        key: DependencyKey,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// A dependency manifest was not valid JSON for the expected shape.
    #[error("Invalid dependency manifest: {0}")]
    ManifestParse(#[source] serde_json::Error),

    /// A manifest entry was well-formed JSON but contradictory.
    #[error("Invalid dependency manifest entry #{index}: {reason}")]
    InvalidManifest { index: usize, reason: String },
}

impl KhazinaError {
    /// Wraps a foreign error raised inside a constructor.
    pub fn construction(
        key: impl Into<DependencyKey>,
        source: impl Into<Box<dyn std::error::Error + Send + Sync>>,
    ) -> Self {
        KhazinaError::ConstructionFailed {
            key: key.into(),
            source: source.into(),
        }
    }

    /// `true` for errors raised by `register` descriptor checks.
    pub fn is_validation(&self) -> bool {
        matches!(self, KhazinaError::Validation(_))
    }

    /// `true` for errors raised while resolving a key.
    pub fn is_resolution(&self) -> bool {
        matches!(
            self,
            KhazinaError::NotRegistered(_)
                | KhazinaError::NotAConstructor(_)
                | KhazinaError::ModuleLoad { .. }
                | KhazinaError::TypeMismatch { .. }
                | KhazinaError::MissingArgument { .. }
                | KhazinaError::ConstructionFailed { .. }
        )
    }

    /// `true` when this is exactly "`key` is not registered".
    pub fn is_not_registered(&self, key: &str) -> bool {
        matches!(self, KhazinaError::NotRegistered(e) if e.requested == *key)
    }
}

impl From<ValidationError> for KhazinaError {
    fn from(err: ValidationError) -> Self {
        KhazinaError::Validation(err)
    }
}

/// Why a descriptor was rejected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// The key is empty.
    MissingKey,
    /// The kind is missing or is not one of const/transient/shared.
    InvalidKind {
        key: DependencyKey,
        kind: Option<String>,
    },
    /// No producer was given at all.
    MissingProducer { key: DependencyKey },
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationError::MissingKey => write!(f, "Descriptor key is not specified"),
            ValidationError::InvalidKind { key, kind: Some(kind) } => write!(
                f,
                "Descriptor {:?} has an invalid kind {kind:?}\n  Hint: use const, transient or shared",
                key.as_str()
            ),
            ValidationError::InvalidKind { key, kind: None } => write!(
                f,
                "Descriptor {:?} has no kind\n  Hint: use const, transient or shared",
                key.as_str()
            ),
            ValidationError::MissingProducer { key } => write!(
                f,
                "Descriptor {:?} has no producer\n  Hint: pass Producer::null() for an intentionally empty value",
                key.as_str()
            ),
        }
    }
}

impl std::error::Error for ValidationError {}

/// Error when a key was not registered.
///
/// Includes helpful hints about what went wrong.
#[derive(Debug)]
pub struct NotRegisteredError {
    /// The key that was requested
    pub requested: DependencyKey,
    /// Keys being resolved when the lookup failed, outermost first
    pub resolution_path: Vec<DependencyKey>,
    /// Similar keys that ARE registered (for "did you mean?" suggestions)
    pub suggestions: Vec<String>,
}

impl fmt::Display for NotRegisteredError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Dependency not registered: {:?}", self.requested.as_str())?;

        if !self.resolution_path.is_empty() {
            write!(f, "\n  Required by: {}", render_chain(&self.resolution_path))?;
        }

        if !self.suggestions.is_empty() {
            write!(f, "\n  Did you mean one of:")?;
            for suggestion in &self.suggestions {
                write!(f, "\n    - {suggestion}")?;
            }
        }

        Ok(())
    }
}

/// Error when a producer has no constructor to offer.
#[derive(Debug)]
pub struct NotAConstructorError {
    /// The key whose producer was inspected, if any
    pub key: Option<DependencyKey>,
    /// What the producer held instead
    pub found: String,
}

impl fmt::Display for NotAConstructorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.key {
            Some(key) => write!(f, "Producer of {:?} is not a constructor", key.as_str())?,
            None => write!(f, "Producer is not a constructor")?,
        }
        write!(f, " (found {})", self.found)
    }
}

/// Convenient Result type for Khazina operations.
pub type Result<T> = std::result::Result<T, KhazinaError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_registered_error_display() {
        let err = KhazinaError::NotRegistered(NotRegisteredError {
            requested: DependencyKey::new("databse"),
            resolution_path: vec![DependencyKey::new("user_service"), DependencyKey::new("user_repo")],
            suggestions: vec!["database".into()],
        });

        let msg = format!("{err}");
        assert!(msg.contains("not registered"));
        assert!(msg.contains("user_service → user_repo"));
        assert!(msg.contains("- database"));
        assert!(err.is_resolution());
        assert!(err.is_not_registered("databse"));
        assert!(!err.is_not_registered("database"));
    }

    #[test]
    fn validation_error_display() {
        let err = KhazinaError::from(ValidationError::InvalidKind {
            key: DependencyKey::new("db"),
            kind: Some("singleton".into()),
        });

        let msg = format!("{err}");
        assert!(msg.contains("invalid kind"));
        assert!(msg.contains("singleton"));
        assert!(err.is_validation());
        assert!(!err.is_resolution());
    }

    #[test]
    fn not_a_constructor_display() {
        let err = KhazinaError::NotAConstructor(NotAConstructorError {
            key: Some(DependencyKey::new("port")),
            found: "u16".into(),
        });
        assert_eq!(err.to_string(), "Producer of \"port\" is not a constructor (found u16)");
    }

    #[test]
    fn construction_wraps_source() {
        let err = KhazinaError::construction("mailer", "smtp host unreachable");
        assert!(err.to_string().contains("mailer"));
        assert!(std::error::Error::source(&err).is_some());
    }
}
