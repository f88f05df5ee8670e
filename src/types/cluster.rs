// ABOUTME: Managed cluster handle parsed from a resource id.
// ABOUTME: Validates the subscription, resource group and cluster name segments.

use std::fmt;
use thiserror::Error;

const PROVIDER: &str = "Microsoft.ContainerService";
const RESOURCE_TYPE: &str = "managedClusters";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ClusterIdError {
    #[error("cluster id cannot be empty")]
    Empty,

    #[error("cluster id must start with '/subscriptions/': {0}")]
    NotAbsolute(String),

    #[error("cluster id has a segment without a value: {0}")]
    Malformed(String),

    #[error("cluster id is missing the '{segment}' segment: {id}")]
    MissingSegment { segment: &'static str, id: String },

    #[error("resource is not a managed cluster: {0}")]
    NotManagedCluster(String),
}

/// Identifies the cluster commands are sent to. Immutable once constructed.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ClusterHandle {
    id: String,
    name: String,
    subscription: String,
    resource_group: String,
}

impl ClusterHandle {
    /// Parse a resource id such as
    /// `/subscriptions/<sub>/resourceGroups/<rg>/providers/Microsoft.ContainerService/managedClusters/<name>`.
    pub fn parse(id: &str) -> Result<Self, ClusterIdError> {
        let trimmed = id.trim().trim_end_matches('/');
        if trimmed.is_empty() {
            return Err(ClusterIdError::Empty);
        }
        if !trimmed
            .get(..15)
            .is_some_and(|p| p.eq_ignore_ascii_case("/subscriptions/"))
        {
            return Err(ClusterIdError::NotAbsolute(trimmed.to_string()));
        }

        let segments: Vec<&str> = trimmed[1..].split('/').collect();
        if segments.len() % 2 != 0 || segments.iter().any(|s| s.is_empty()) {
            return Err(ClusterIdError::Malformed(trimmed.to_string()));
        }

        let lookup = |key: &str| {
            segments
                .chunks(2)
                .find(|pair| pair[0].eq_ignore_ascii_case(key))
                .map(|pair| pair[1].to_string())
        };
        let missing = |segment: &'static str| ClusterIdError::MissingSegment {
            segment,
            id: trimmed.to_string(),
        };

        let subscription = lookup("subscriptions").ok_or_else(|| missing("subscriptions"))?;
        let resource_group = lookup("resourceGroups").ok_or_else(|| missing("resourceGroups"))?;
        let provider = lookup("providers").ok_or_else(|| missing("providers"))?;
        if !provider.eq_ignore_ascii_case(PROVIDER) {
            return Err(ClusterIdError::NotManagedCluster(trimmed.to_string()));
        }
        let name = lookup(RESOURCE_TYPE)
            .ok_or_else(|| ClusterIdError::NotManagedCluster(trimmed.to_string()))?;

        Ok(Self {
            id: trimmed.to_string(),
            name,
            subscription,
            resource_group,
        })
    }

    /// Build a handle from its parts.
    pub fn new(
        subscription: impl Into<String>,
        resource_group: impl Into<String>,
        name: impl Into<String>,
    ) -> Self {
        let subscription = subscription.into();
        let resource_group = resource_group.into();
        let name = name.into();
        let id = format!(
            "/subscriptions/{subscription}/resourceGroups/{resource_group}/providers/{PROVIDER}/{RESOURCE_TYPE}/{name}"
        );
        Self {
            id,
            name,
            subscription,
            resource_group,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn subscription(&self) -> &str {
        &self.subscription
    }

    pub fn resource_group(&self) -> &str {
        &self.resource_group
    }
}

impl fmt::Display for ClusterHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ID: &str = "/subscriptions/0000/resourceGroups/rg-e2e/providers/Microsoft.ContainerService/managedClusters/cluster-1";

    #[test]
    fn parses_full_resource_id() {
        let handle = ClusterHandle::parse(ID).unwrap();
        assert_eq!(handle.subscription(), "0000");
        assert_eq!(handle.resource_group(), "rg-e2e");
        assert_eq!(handle.name(), "cluster-1");
        assert_eq!(handle.id(), ID);
    }

    #[test]
    fn segment_keys_are_case_insensitive() {
        let id = "/SUBSCRIPTIONS/0000/resourcegroups/rg/providers/microsoft.containerservice/managedclusters/c";
        let handle = ClusterHandle::parse(id).unwrap();
        assert_eq!(handle.resource_group(), "rg");
        assert_eq!(handle.name(), "c");
    }

    #[test]
    fn trailing_slash_is_ignored() {
        let handle = ClusterHandle::parse(&format!("{ID}/")).unwrap();
        assert_eq!(handle.id(), ID);
    }

    #[test]
    fn new_builds_parseable_id() {
        let handle = ClusterHandle::new("0000", "rg-e2e", "cluster-1");
        assert_eq!(handle.id(), ID);
        assert_eq!(ClusterHandle::parse(handle.id()).unwrap(), handle);
    }

    #[test]
    fn rejects_empty() {
        assert_eq!(ClusterHandle::parse("  "), Err(ClusterIdError::Empty));
    }

    #[test]
    fn rejects_relative_id() {
        assert!(matches!(
            ClusterHandle::parse("resourceGroups/rg"),
            Err(ClusterIdError::NotAbsolute(_))
        ));
    }

    #[test]
    fn rejects_other_resource_types() {
        let id = "/subscriptions/0000/resourceGroups/rg/providers/Microsoft.ContainerRegistry/registries/acr";
        assert!(matches!(
            ClusterHandle::parse(id),
            Err(ClusterIdError::NotManagedCluster(_))
        ));
    }

    #[test]
    fn rejects_missing_resource_group() {
        let id = "/subscriptions/0000/providers/Microsoft.ContainerService/managedClusters/c";
        assert_eq!(
            ClusterHandle::parse(id),
            Err(ClusterIdError::MissingSegment {
                segment: "resourceGroups",
                id: id.to_string()
            })
        );
    }

    #[test]
    fn rejects_dangling_segment() {
        assert!(matches!(
            ClusterHandle::parse("/subscriptions/0000/resourceGroups"),
            Err(ClusterIdError::Malformed(_))
        ));
    }
}
