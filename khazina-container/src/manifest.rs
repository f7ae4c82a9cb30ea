//! Declarative JSON manifests of descriptors.
//!
//! ```json
//! {
//!   "dependencies": [
//!     { "key": "port", "kind": "const", "value": 8080 },
//!     { "key": "server", "kind": "shared", "module": "app::Server", "args": ["port"] }
//!   ]
//! }
//! ```
//!
//! `module` names an identifier for the container's module loader;
//! `value` is a constant (`null` included). String `args` are bound
//! keys, anything else is passed literally.

use std::io;

use serde::{Deserialize, Deserializer};

use crate::descriptor::{BoundArg, Descriptor, Producer};
use crate::error::{KhazinaError, Result};
use crate::value::Value;

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Manifest {
    #[serde(default)]
    pub dependencies: Vec<ManifestEntry>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ManifestEntry {
    #[serde(default)]
    pub key: String,
    #[serde(default)]
    pub kind: Option<String>,
    #[serde(default)]
    pub module: Option<String>,
    /// `Some(Null)` for an explicit `null`, `None` when the field is absent.
    #[serde(default, deserialize_with = "present")]
    pub value: Option<serde_json::Value>,
    #[serde(default)]
    pub args: Vec<serde_json::Value>,
    #[serde(default)]
    pub overwrite: bool,
}

fn present<'de, D>(deserializer: D) -> std::result::Result<Option<serde_json::Value>, D::Error>
where
    D: Deserializer<'de>,
{
    serde_json::Value::deserialize(deserializer).map(Some)
}

impl Manifest {
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(KhazinaError::ManifestParse)
    }

    pub fn from_reader(reader: impl io::Read) -> Result<Self> {
        serde_json::from_reader(reader).map_err(KhazinaError::ManifestParse)
    }

    pub fn len(&self) -> usize {
        self.dependencies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dependencies.is_empty()
    }

    /// Convert every entry into a [`Descriptor`], in order.
    ///
    /// Only contradictions are rejected here; missing keys, kinds and
    /// producers are left for registration to report.
    pub fn into_descriptors(self) -> Result<Vec<Descriptor>> {
        self.dependencies
            .into_iter()
            .enumerate()
            .map(|(index, entry)| entry.into_descriptor(index))
            .collect()
    }
}

impl ManifestEntry {
    fn into_descriptor(self, index: usize) -> Result<Descriptor> {
        let mut descriptor = Descriptor::new(self.key);

        if let Some(kind) = &self.kind {
            descriptor = descriptor.kind_named(kind);
        }

        descriptor = match (self.module, self.value) {
            (Some(_), Some(_)) => {
                return Err(KhazinaError::InvalidManifest {
                    index,
                    reason: "`module` and `value` are mutually exclusive".to_string(),
                });
            }
            (Some(module), None) => descriptor.producer(Producer::External(module)),
            (None, Some(value)) => descriptor.producer(Producer::Constant(json_value(value))),
            (None, None) => descriptor,
        };

        for arg in self.args {
            descriptor = descriptor.bind(match arg {
                serde_json::Value::String(key) => BoundArg::key(key),
                other => BoundArg::Literal(json_value(other)),
            });
        }

        Ok(descriptor.overwrite(self.overwrite))
    }
}

/// Scalars become their Rust counterparts; arrays and objects stay JSON.
fn json_value(json: serde_json::Value) -> Value {
    match json {
        serde_json::Value::Null => Value::null(),
        serde_json::Value::Bool(b) => Value::new(b),
        serde_json::Value::String(s) => Value::new(s),
        serde_json::Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                Value::new(i)
            } else if let Some(u) = n.as_u64() {
                Value::new(u)
            } else {
                Value::new(n.as_f64().unwrap_or(f64::NAN))
            }
        }
        other => Value::new(other),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constructor::Constructor;
    use crate::container::Container;
    use crate::kind::Kind;
    use crate::loader::ModuleTable;
    use std::sync::Arc;

    struct Server {
        port: i64,
        name: String,
    }

    fn server() -> Constructor {
        Constructor::of::<Server>(|_, args| {
            Ok(Server {
                port: args.cloned(0)?,
                name: args.cloned(1)?,
            })
        })
    }

    #[test]
    fn parses_entries() {
        let manifest = Manifest::from_json(
            r#"{"dependencies": [
                {"key": "port", "kind": "const", "value": 8080},
                {"key": "nothing", "kind": "const", "value": null},
                {"key": "server", "kind": "shared", "module": "app::Server", "args": ["port", "main"], "overwrite": true}
            ]}"#,
        )
        .unwrap();

        assert_eq!(manifest.len(), 3);
        assert_eq!(manifest.dependencies[0].value, Some(serde_json::json!(8080)));
        assert_eq!(manifest.dependencies[1].value, Some(serde_json::Value::Null));
        assert_eq!(manifest.dependencies[2].value, None);
        assert!(manifest.dependencies[2].overwrite);
    }

    #[test]
    fn loads_into_container() {
        let container = Container::builder()
            .module_loader(ModuleTable::new().with("app::Server", server()))
            .build()
            .unwrap();

        let manifest = Manifest::from_json(
            r#"{"dependencies": [
                {"key": "port", "kind": "const", "value": 8080},
                {"key": "nothing", "kind": "CONST", "value": null},
                {"key": "server", "kind": "shared", "module": "app::Server", "args": ["port", "main"]}
            ]}"#,
        )
        .unwrap();
        container.load_manifest(manifest).unwrap();

        assert!(container.resolve("nothing").unwrap().is_null());
        assert_eq!(container.registration("server").unwrap().kind(), Kind::Shared);

        let server: Arc<Server> = container.resolve_as("server").unwrap();
        assert_eq!(server.port, 8080);
        // "main" is not a registered key, so it is passed as text
        assert_eq!(server.name, "main");
    }

    #[test]
    fn literal_args_keep_json_types() {
        let descriptors = Manifest::from_json(
            r#"{"dependencies": [{"key": "k", "kind": "transient", "module": "m", "args": [1, true, [1, 2]]}]}"#,
        )
        .unwrap()
        .into_descriptors()
        .unwrap();

        let container = Container::builder()
            .module_loader(ModuleTable::new().with(
                "m",
                Constructor::of::<(i64, bool, serde_json::Value)>(|_, args| {
                    Ok((args.cloned(0)?, args.cloned(1)?, args.cloned(2)?))
                }),
            ))
            .build()
            .unwrap();
        container.register(descriptors).unwrap();

        let value = container.resolve_as::<(i64, bool, serde_json::Value)>("k").unwrap();
        assert_eq!(*value, (1, true, serde_json::json!([1, 2])));
    }

    #[test]
    fn module_and_value_conflict() {
        let err = Manifest::from_json(r#"{"dependencies": [{"key": "a", "kind": "const", "module": "m", "value": 1}]}"#)
            .unwrap()
            .into_descriptors()
            .unwrap_err();

        assert!(matches!(err, KhazinaError::InvalidManifest { index: 0, .. }));
    }

    #[test]
    fn incomplete_entries_fail_registration() {
        let container = Container::new();
        let manifest = Manifest::from_json(r#"{"dependencies": [{"key": "a", "kind": "const"}]}"#).unwrap();

        let err = container.load_manifest(manifest).unwrap_err();
        assert!(err.is_validation());
        assert!(container.is_empty());
    }

    #[test]
    fn malformed_json() {
        assert!(matches!(
            Manifest::from_json("{not json").unwrap_err(),
            KhazinaError::ManifestParse(_)
        ));
        assert!(matches!(
            Manifest::from_json(r#"{"dependencies": [{"key": "a", "producer": 1}]}"#).unwrap_err(),
            KhazinaError::ManifestParse(_)
        ));
    }
}
