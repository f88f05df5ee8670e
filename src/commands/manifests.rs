// ABOUTME: Loads manifest files given on the command line.
// ABOUTME: Objects keep the order of files and of documents within each file.

use settle::error::Result;
use settle::object::Manifest;
use std::path::PathBuf;

pub fn load(files: &[PathBuf]) -> Result<Vec<Manifest>> {
    let mut objects = Vec::new();
    for file in files {
        let loaded = Manifest::load(file)?;
        tracing::debug!(path = %file.display(), objects = loaded.len(), "loaded manifests");
        objects.extend(loaded);
    }
    Ok(objects)
}
