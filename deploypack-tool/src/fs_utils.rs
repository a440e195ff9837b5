use anyhow::{Context, Result, bail};
use deploypack_lib::PackPolicy;
use std::{
    fs,
    path::{Path, PathBuf},
};
use tracing::debug;

/// Recursively lists every file under `source`, pruning directories the policy excludes.
///
/// Entries within a directory are visited in name order. Directory symlinks are
/// not followed; symlinks to files are listed like regular files.
pub fn list_source_files(source: &Path, policy: &PackPolicy) -> Result<Vec<PathBuf>> {
    if !source.is_dir() {
        bail!("source directory {source:?} does not exist or is not a directory");
    }

    fn walk_dir(dir: &Path, policy: &PackPolicy, result: &mut Vec<PathBuf>) -> Result<()> {
        let mut entries = fs::read_dir(dir)
            .with_context(|| format!("reading directory {dir:?}"))?
            .collect::<std::io::Result<Vec<_>>>()
            .with_context(|| format!("reading directory {dir:?}"))?;
        entries.sort_by_key(|e| e.file_name());

        for entry in entries {
            let path = entry.path();
            let file_type = entry
                .file_type()
                .with_context(|| format!("reading file type of {path:?}"))?;

            if file_type.is_dir() {
                if policy.is_excluded_dir(&entry.file_name()) {
                    debug!("pruning {}", path.display());
                    continue;
                }
                walk_dir(&path, policy, result)?;
            } else if file_type.is_symlink() && path.is_dir() {
                debug!("not following directory symlink {}", path.display());
            } else {
                result.push(path);
            }
        }
        Ok(())
    }

    let mut result = Vec::new();
    walk_dir(source, policy, &mut result)?;
    Ok(result)
}

/// Total size in bytes of all listed files.
pub fn total_size(files: &[PathBuf]) -> Result<u64> {
    let mut total: u64 = 0;
    for path in files {
        let meta = fs::metadata(path).with_context(|| format!("reading metadata of {path:?}"))?;
        total += meta.len();
    }
    Ok(total)
}

/// Convert bytes into a human-friendly string using binary (KiB, MiB, GiB...) units.
pub fn encode_size(bytes: u64) -> String {
    const UNITS: [&str; 6] = ["B", "KiB", "MiB", "GiB", "TiB", "PiB"];

    if bytes == 0 {
        return "0 B".to_string();
    }

    let mut size = bytes as f64;
    let mut unit_index = 0;

    while size >= 1024.0 && unit_index < UNITS.len() - 1 {
        size /= 1024.0;
        unit_index += 1;
    }

    // 1.0 MiB prints as 1 MiB
    if (size * 10.0).round() % 10.0 == 0.0 {
        format!("{:.0} {}", size, UNITS[unit_index])
    } else {
        format!("{:.1} {}", size, UNITS[unit_index])
    }
}
