// ABOUTME: Integration tests for manifest packaging.
// ABOUTME: Checks entry naming and order, empty archives, and all-or-nothing serialization.

mod support;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use proptest::prelude::*;
use serde::Serialize;
use settle::archive::{ArchiveError, ManifestArchive, entry_path};
use settle::object::{Manifest, Resource};
use std::collections::HashMap;
use std::io::{Cursor, Read};
use support::manifest;

fn zip_names(bytes: Vec<u8>) -> Vec<String> {
    let archive = zip::ZipArchive::new(Cursor::new(bytes)).unwrap();
    archive.file_names().map(str::to_string).collect::<Vec<_>>()
}

/// serde_json refuses maps with non-string keys.
#[derive(Serialize)]
struct TupleKeyed {
    data: HashMap<(u8, u8), String>,
}

impl Resource for TupleKeyed {
    fn kind(&self) -> &str {
        "ConfigMap"
    }

    fn name(&self) -> &str {
        "tuple-keyed"
    }

    fn namespace(&self) -> Option<&str> {
        Some("tools")
    }
}

#[test]
fn entries_follow_input_order() {
    let objects = vec![
        manifest("Namespace", "prod", ""),
        manifest("Deployment", "web", "prod"),
        manifest("Service", "web", "prod"),
    ];

    let archive = ManifestArchive::build(&objects).unwrap();

    let paths: Vec<_> = archive.entries().iter().map(|e| e.path()).collect();
    assert_eq!(paths, ["manifests/0.json", "manifests/1.json", "manifests/2.json"]);
    let second: serde_json::Value = serde_json::from_slice(archive.entries()[1].contents()).unwrap();
    assert_eq!(second, *objects[1].body());
}

#[test]
fn zip_holds_one_json_file_per_object() {
    let objects = vec![
        manifest("Deployment", "web", "prod"),
        manifest("Job", "migrate", "batch"),
    ];

    let encoded = ManifestArchive::build(&objects).unwrap().encode().unwrap();
    let bytes = STANDARD.decode(encoded).unwrap();

    let mut archive = zip::ZipArchive::new(Cursor::new(bytes)).unwrap();
    assert_eq!(archive.len(), 2);
    let mut contents = String::new();
    archive
        .by_name("manifests/1.json")
        .unwrap()
        .read_to_string(&mut contents)
        .unwrap();
    let job: serde_json::Value = serde_json::from_str(&contents).unwrap();
    assert_eq!(job["kind"], "Job");
    assert_eq!(job["metadata"]["name"], "migrate");
}

#[test]
fn empty_input_is_a_valid_empty_archive() {
    let archive = ManifestArchive::build::<Manifest>(&[]).unwrap();

    assert!(archive.is_empty());
    assert!(zip_names(archive.to_zip().unwrap()).is_empty());
    assert!(!archive.encode().unwrap().is_empty());
}

#[test]
fn one_bad_object_fails_the_whole_archive() {
    let objects = vec![TupleKeyed {
        data: HashMap::from([((1, 2), "x".to_string())]),
    }];

    let err = ManifestArchive::build(&objects).unwrap_err();

    match err {
        ArchiveError::Serialization { index, object, .. } => {
            assert_eq!(index, 0);
            assert_eq!(object.kind(), "ConfigMap");
            assert_eq!(object.namespace(), "tools");
        }
        other => panic!("expected serialization error, got {other:?}"),
    }
}

proptest! {
    #[test]
    fn entry_count_and_names_match_objects(names in prop::collection::vec("[a-z][a-z0-9-]{0,20}", 1..24)) {
        let objects: Vec<_> = names
            .iter()
            .map(|name| manifest("ConfigMap", name, "default"))
            .collect();

        let archive = ManifestArchive::build(&objects).unwrap();
        let zipped = zip_names(archive.to_zip().unwrap());

        prop_assert_eq!(archive.len(), objects.len());
        prop_assert_eq!(zipped.len(), objects.len());
        for (i, entry) in archive.entries().iter().enumerate() {
            prop_assert_eq!(entry.path(), entry_path(i));
            let body: serde_json::Value = serde_json::from_slice(entry.contents()).unwrap();
            prop_assert_eq!(&body["metadata"]["name"], &serde_json::json!(names[i]));
        }
    }
}
