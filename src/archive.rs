// ABOUTME: Manifest packaging into the zip archive carried by run-command requests.
// ABOUTME: Entry i is manifests/<i>.json holding the JSON form of object i.

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use std::io::{Cursor, Write};
use thiserror::Error;
use zip::CompressionMethod;
use zip::ZipWriter;
use zip::write::SimpleFileOptions;

use crate::object::{ObjectRef, Resource};

/// Directory the manifests are unpacked into on the remote side.
pub const MANIFEST_DIR: &str = "manifests";

#[derive(Debug, Error)]
pub enum ArchiveError {
    #[error("failed to serialize object {index} ({object}): {source}")]
    Serialization {
        index: usize,
        object: ObjectRef,
        source: serde_json::Error,
    },

    #[error("failed to write zip archive: {0}")]
    Zip(#[from] zip::result::ZipError),

    #[error("failed to write zip entry: {0}")]
    Io(#[from] std::io::Error),
}

/// Path of the archive entry holding object `index`.
pub fn entry_path(index: usize) -> String {
    format!("{MANIFEST_DIR}/{index}.json")
}

/// A single file inside the archive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchiveEntry {
    path: String,
    contents: Vec<u8>,
}

impl ArchiveEntry {
    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn contents(&self) -> &[u8] {
        &self.contents
    }
}

/// Ordered, write-once set of serialized manifests.
#[derive(Debug, Clone, Default)]
pub struct ManifestArchive {
    entries: Vec<ArchiveEntry>,
}

impl ManifestArchive {
    /// Serialize every object in order. Any failure aborts the whole archive.
    pub fn build<R: Resource>(objects: &[R]) -> Result<Self, ArchiveError> {
        let entries = objects
            .iter()
            .enumerate()
            .map(|(index, object)| {
                let contents =
                    serde_json::to_vec(object).map_err(|source| ArchiveError::Serialization {
                        index,
                        object: object.object_ref(),
                        source,
                    })?;
                Ok(ArchiveEntry {
                    path: entry_path(index),
                    contents,
                })
            })
            .collect::<Result<Vec<_>, ArchiveError>>()?;

        Ok(Self { entries })
    }

    pub fn entries(&self) -> &[ArchiveEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Render the archive as zip bytes. An empty archive is a valid empty zip.
    pub fn to_zip(&self) -> Result<Vec<u8>, ArchiveError> {
        let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
        let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);

        for entry in &self.entries {
            writer.start_file(entry.path.as_str(), options)?;
            writer.write_all(&entry.contents)?;
        }

        Ok(writer.finish()?.into_inner())
    }

    /// Zip and base64-encode the archive for the request's context field.
    pub fn encode(&self) -> Result<String, ArchiveError> {
        Ok(STANDARD.encode(self.to_zip()?))
    }
}
