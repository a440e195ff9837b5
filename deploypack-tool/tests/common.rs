//! Shared helpers for the deploypack integration tests.

#![allow(dead_code)]

pub use assert_cmd::Command;
use std::collections::BTreeMap;
use std::fs;
use std::io::Read;
use std::path::Path;

pub fn deploypack_cmd() -> Command {
    let mut cmd = Command::cargo_bin("deploypack").expect("Failed to find deploypack binary for testing");
    cmd.env_remove("DEPLOYPACK_SOURCE")
        .env_remove("DEPLOYPACK_OUTPUT")
        .env_remove("DEPLOYPACK_CONFIG")
        .env_remove("DEPLOYPACK_DRY")
        .env_remove("RUST_LOG");
    cmd
}

/// Writes `content` at `root/rel`, creating parent directories.
pub fn write_file(root: &Path, rel: &str, content: &[u8]) {
    let path = root.join(rel);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, content).unwrap();
}

/// Decompressed contents of every entry, keyed by entry name.
pub fn read_archive(zip_path: &Path) -> BTreeMap<String, Vec<u8>> {
    let file = fs::File::open(zip_path).expect("archive should exist");
    let mut archive = zip::ZipArchive::new(file).expect("archive should be a valid zip");
    let mut entries = BTreeMap::new();
    for i in 0..archive.len() {
        let mut entry = archive.by_index(i).unwrap();
        let mut data = Vec::new();
        entry.read_to_end(&mut data).unwrap();
        let previous = entries.insert(entry.name().to_string(), data);
        assert!(previous.is_none(), "duplicate entry {}", entry.name());
    }
    entries
}
