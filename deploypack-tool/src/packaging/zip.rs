use anyhow::{Context, Result};
use async_zip::base::write::ZipFileWriter;
use async_zip::{Compression, ZipDateTime, ZipEntryBuilder};
use chrono::{DateTime, Utc};
use deploypack_lib::{EntryKind, NormalizeError, normalize_line_endings};
use std::fs::Metadata;
use std::path::Path;
use std::time::SystemTime;
use tokio::fs::File;
use tokio::io::AsyncWriteExt;
use tracing::debug;

use super::FileEntry;

/// 1980-01-01T00:00:00Z, the earliest time a ZIP entry can carry.
const ZIP_EPOCH_SECS: i64 = 315_532_800;

/// Writes every entry into a new DEFLATE-compressed ZIP at `zip_path`.
///
/// An existing file at `zip_path` is truncated. Returns the number of entries written.
pub async fn write_zip_async(entries: &[FileEntry], zip_path: &Path) -> Result<usize> {
    let mut file = File::create(zip_path)
        .await
        .with_context(|| format!("creating archive {zip_path:?}"))?;
    let mut writer = ZipFileWriter::with_tokio(&mut file);

    for fe in entries {
        let data = entry_contents(fe).await?;
        let metadata = tokio::fs::metadata(&fe.path)
            .await
            .with_context(|| format!("reading metadata of {:?}", fe.path))?;

        debug!(
            "adding {} ({}, {} bytes)",
            fe.name_in_archive,
            fe.kind.label(),
            data.len()
        );
        writer
            .write_entry_whole(entry_builder(fe, &metadata), &data)
            .await
            .with_context(|| format!("writing entry {}", fe.name_in_archive))?;
    }

    writer
        .close()
        .await
        .with_context(|| format!("finalizing archive {zip_path:?}"))?;
    file.flush()
        .await
        .with_context(|| format!("flushing archive {zip_path:?}"))?;

    Ok(entries.len())
}

/// Bytes to store for `fe`: normalized for text files when that succeeds, raw otherwise.
async fn entry_contents(fe: &FileEntry) -> Result<Vec<u8>> {
    if fe.kind == EntryKind::Text {
        return normalized_or_raw(read_normalized(&fe.path).await, &fe.path).await;
    }
    read_raw(&fe.path).await
}

/// Keeps a successful normalization, otherwise stores the raw bytes of `path`.
async fn normalized_or_raw(
    attempt: Result<Vec<u8>, NormalizeError>,
    path: &Path,
) -> Result<Vec<u8>> {
    match attempt {
        Ok(data) => Ok(data),
        Err(e) => {
            debug!("{e}, storing raw bytes");
            read_raw(path).await
        }
    }
}

async fn read_raw(path: &Path) -> Result<Vec<u8>> {
    tokio::fs::read(path)
        .await
        .with_context(|| format!("reading {path:?}"))
}

async fn read_normalized(path: &Path) -> Result<Vec<u8>, NormalizeError> {
    let raw = tokio::fs::read(path)
        .await
        .map_err(|source| NormalizeError::Read {
            path: path.to_path_buf(),
            source,
        })?;
    Ok(normalize_line_endings(&raw))
}

fn entry_builder(fe: &FileEntry, metadata: &Metadata) -> ZipEntryBuilder {
    let mut builder = ZipEntryBuilder::new(fe.name_in_archive.clone().into(), Compression::Deflate);

    if let Ok(modified) = metadata.modified() {
        builder = builder.last_modification_date(ZipDateTime::from_chrono(&entry_timestamp(modified)));
    }

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        builder = builder.unix_permissions(metadata.permissions().mode() as u16);
    }

    builder
}

/// Modification time as stored in the archive, clamped to the ZIP epoch.
fn entry_timestamp(modified: SystemTime) -> DateTime<Utc> {
    let dt = DateTime::<Utc>::from(modified);
    if dt.timestamp() < ZIP_EPOCH_SECS {
        DateTime::from_timestamp(ZIP_EPOCH_SECS, 0).unwrap_or(dt)
    } else {
        dt
    }
}
