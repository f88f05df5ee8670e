// ABOUTME: Resource object model consumed by the deploy engine.
// ABOUTME: Loads Kubernetes manifests from YAML/JSON and resolves namespaces.

use serde::{Deserialize, Serialize, Serializer};
use serde_json::Value;
use std::fmt;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Namespace used for objects that do not name one.
pub const DEFAULT_NAMESPACE: &str = "default";

/// Minimal capability surface of a deployable object.
///
/// The serialized form is what ends up in the manifest archive, so it must be
/// a complete Kubernetes object.
pub trait Resource: Serialize {
    fn kind(&self) -> &str;
    fn name(&self) -> &str;
    fn namespace(&self) -> Option<&str>;

    /// Owned identity of this object with its namespace resolved.
    fn object_ref(&self) -> ObjectRef {
        ObjectRef::new(self.kind(), self.name(), self.namespace())
    }
}

/// Kind, name and resolved namespace of an object.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ObjectRef {
    kind: String,
    name: String,
    namespace: String,
}

impl ObjectRef {
    /// An empty or missing namespace resolves to [`DEFAULT_NAMESPACE`].
    pub fn new(kind: impl Into<String>, name: impl Into<String>, namespace: Option<&str>) -> Self {
        let namespace = match namespace {
            Some(ns) if !ns.is_empty() => ns.to_string(),
            _ => DEFAULT_NAMESPACE.to_string(),
        };
        Self {
            kind: kind.into(),
            name: name.into(),
            namespace,
        }
    }

    pub fn kind(&self) -> &str {
        &self.kind
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }
}

impl fmt::Display for ObjectRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{} (namespace {})", self.kind, self.name, self.namespace)
    }
}

#[derive(Debug, Error)]
pub enum ManifestError {
    #[error("failed to read {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("invalid manifest document: {0}")]
    Parse(#[from] serde_yaml::Error),

    #[error("manifest document {index} is not an object")]
    NotAnObject { index: usize },

    #[error("manifest document {index} is missing '{field}'")]
    MissingField { index: usize, field: &'static str },
}

/// A Kubernetes object held as raw JSON.
#[derive(Debug, Clone, PartialEq)]
pub struct Manifest {
    kind: String,
    name: String,
    namespace: Option<String>,
    body: Value,
}

impl Manifest {
    /// Wrap a JSON object, extracting `kind`, `metadata.name` and `metadata.namespace`.
    pub fn from_value(body: Value) -> Result<Self, ManifestError> {
        Self::from_document(0, body)
    }

    fn from_document(index: usize, body: Value) -> Result<Self, ManifestError> {
        if !body.is_object() {
            return Err(ManifestError::NotAnObject { index });
        }

        let kind = body
            .get("kind")
            .and_then(Value::as_str)
            .filter(|k| !k.is_empty())
            .ok_or(ManifestError::MissingField {
                index,
                field: "kind",
            })?
            .to_string();
        let metadata = body.get("metadata");
        let name = metadata
            .and_then(|m| m.get("name"))
            .and_then(Value::as_str)
            .filter(|n| !n.is_empty())
            .ok_or(ManifestError::MissingField {
                index,
                field: "metadata.name",
            })?
            .to_string();
        let namespace = metadata
            .and_then(|m| m.get("namespace"))
            .and_then(Value::as_str)
            .map(str::to_string);

        Ok(Self {
            kind,
            name,
            namespace,
            body,
        })
    }

    /// Parse every document in a YAML (or JSON) stream.
    ///
    /// Empty documents are skipped and `kind: List` documents are expanded
    /// into their items.
    pub fn parse_all(text: &str) -> Result<Vec<Self>, ManifestError> {
        let mut manifests = Vec::new();
        let mut index = 0;

        for document in serde_yaml::Deserializer::from_str(text) {
            let value = Value::deserialize(document)?;
            if value.is_null() {
                continue;
            }

            if value.get("kind").and_then(Value::as_str) == Some("List") {
                let items = value
                    .get("items")
                    .and_then(Value::as_array)
                    .cloned()
                    .unwrap_or_default();
                for item in items {
                    manifests.push(Self::from_document(index, item)?);
                    index += 1;
                }
                continue;
            }

            manifests.push(Self::from_document(index, value)?);
            index += 1;
        }

        Ok(manifests)
    }

    /// Load all manifests from a file.
    pub fn load(path: &Path) -> Result<Vec<Self>, ManifestError> {
        let text = std::fs::read_to_string(path).map_err(|source| ManifestError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse_all(&text)
    }

    pub fn body(&self) -> &Value {
        &self.body
    }
}

impl Serialize for Manifest {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.body.serialize(serializer)
    }
}

impl Resource for Manifest {
    fn kind(&self) -> &str {
        &self.kind
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn namespace(&self) -> Option<&str> {
        self.namespace.as_deref()
    }
}
