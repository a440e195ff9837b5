use anyhow::{Context, Result};
use deploypack_lib::{EntryKind, PackPolicy};
use std::path::{Path, PathBuf};
use tokio::runtime::Builder;

use crate::packaging::zip::write_zip_async;

pub mod zip;

/// A file to include in the ZIP archive.
#[derive(Debug, Clone, PartialEq)]
pub struct FileEntry {
    pub path: PathBuf,
    pub name_in_archive: String,
    pub kind: EntryKind,
}

/// Pairs each listed file with its archive name and classification.
///
/// Fails on the first path that is not valid UTF-8, since ZIP entry names are stored as UTF-8.
pub fn prepare_entries(
    source: &Path,
    files: Vec<PathBuf>,
    policy: &PackPolicy,
) -> Result<Vec<FileEntry>> {
    files
        .into_iter()
        .map(|path| {
            let name_in_archive = archive_name(source, &path)?;
            let file_name = path.file_name().and_then(|n| n.to_str()).unwrap_or_default();
            Ok(FileEntry {
                kind: policy.classify(file_name),
                name_in_archive,
                path,
            })
        })
        .collect()
}

/// Path of `path` relative to `source`, joined with `/` whatever the host separator is.
pub fn archive_name(source: &Path, path: &Path) -> Result<String> {
    let components = path
        .strip_prefix(source)
        .unwrap_or(path)
        .components()
        .map(|c| {
            c.as_os_str()
                .to_str()
                .with_context(|| format!("file name {path:?} is not valid UTF-8"))
        })
        .collect::<Result<Vec<_>>>()?;
    Ok(components.join("/"))
}

/// Writes `entries` to a fresh ZIP at `zip_path`, managing its own async runtime.
///
/// The runtime is current-thread: entries are read and written one after another.
pub fn create_zip_sync(entries: &[FileEntry], zip_path: &Path) -> Result<usize> {
    let rt = Builder::new_current_thread().enable_all().build()?;
    rt.block_on(write_zip_async(entries, zip_path))
}
