//! Fixed packaging policy: which directories are pruned and which files get
//! their line endings rewritten before they go into the archive.

use std::ffi::OsStr;
use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// How a file's bytes are treated when written to the archive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    /// CRLF is rewritten to LF.
    Text,
    /// Bytes are copied untouched.
    Binary,
}

impl EntryKind {
    pub fn label(self) -> &'static str {
        match self {
            EntryKind::Text => "text",
            EntryKind::Binary => "binary",
        }
    }
}

/// Failure while producing the normalized form of a text file.
#[derive(Debug, Error)]
pub enum NormalizeError {
    #[error("reading {path:?} for line ending normalization")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

#[derive(Debug, Clone)]
pub struct PackPolicy {
    /// Directory names that are never descended into.
    pub excluded_dirs: &'static [&'static str],
    /// Lowercase extensions, dot included. The empty string stands for "no extension".
    pub text_extensions: &'static [&'static str],
    /// Exact, case-sensitive file names treated as text regardless of extension.
    pub text_filenames: &'static [&'static str],
}

impl Default for PackPolicy {
    fn default() -> Self {
        Self {
            excluded_dirs: &["node_modules"],
            text_extensions: &[".js", ".json", ".ts", ".md", ".txt", ""],
            text_filenames: &["Procfile", ".env"],
        }
    }
}

impl PackPolicy {
    pub fn is_excluded_dir(&self, name: &OsStr) -> bool {
        self.excluded_dirs.iter().any(|d| OsStr::new(d) == name)
    }

    /// Classifies a bare file name (no directory part).
    pub fn classify(&self, file_name: &str) -> EntryKind {
        let ext = split_extension(file_name).to_lowercase();
        if self.text_extensions.contains(&ext.as_str()) || self.text_filenames.contains(&file_name)
        {
            EntryKind::Text
        } else {
            EntryKind::Binary
        }
    }
}

/// Returns the extension of `file_name` including its leading dot, or `""`.
///
/// Leading dots do not start an extension, so `.env` has none, while a trailing
/// dot counts: `notes.` yields `"."`.
pub fn split_extension(file_name: &str) -> &str {
    match file_name.rfind('.') {
        Some(dot) if file_name[..dot].bytes().any(|b| b != b'.') => &file_name[dot..],
        _ => "",
    }
}

/// Replaces every `\r\n` pair with `\n`. Lone `\r` bytes are kept.
pub fn normalize_line_endings(raw: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(raw.len());
    let mut bytes = raw.iter().copied().peekable();
    while let Some(b) = bytes.next() {
        if b == b'\r' && bytes.peek() == Some(&b'\n') {
            continue;
        }
        out.push(b);
    }
    out
}
