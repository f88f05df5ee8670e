// ABOUTME: Custom serde deserializers for config types.
// ABOUTME: Parses cluster resource ids and checks the endpoint URL shape.

use serde::Deserialize;

use crate::types::ClusterHandle;

pub fn deserialize_cluster<'de, D>(deserializer: D) -> Result<ClusterHandle, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let s = String::deserialize(deserializer)?;
    ClusterHandle::parse(&s).map_err(serde::de::Error::custom)
}

pub fn deserialize_endpoint<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let s = String::deserialize(deserializer)?;
    if !(s.starts_with("https://") || s.starts_with("http://")) {
        return Err(serde::de::Error::custom(format!(
            "endpoint must be an http(s) URL, got {s:?}"
        )));
    }
    Ok(s.trim_end_matches('/').to_string())
}
