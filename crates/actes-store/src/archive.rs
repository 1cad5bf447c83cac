//! Local-directory storage publisher

use crate::StoreError;
use actes_domain::{CollaboratorError, StoragePublisher};
use std::fs::{self, OpenOptions};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use tracing::debug;

const MAX_COLLISIONS: usize = 10_000;

/// Publishes certificate images by copying them into an archive directory
///
/// The returned reference is the path of the written file. A second upload
/// under the same display name gets a numbered suffix instead of overwriting.
#[derive(Debug, Clone)]
pub struct ArchivePublisher {
    root: PathBuf,
}

impl ArchivePublisher {
    /// Create a publisher writing under `root` (created on first publish)
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Archive directory
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Write `bytes` under a file name derived from `display_name`
    pub fn store(&self, bytes: &[u8], display_name: &str) -> Result<PathBuf, StoreError> {
        fs::create_dir_all(&self.root)?;

        let file_name = sanitize_file_name(display_name);
        if file_name.is_empty() {
            return Err(StoreError::InvalidData(format!(
                "display name '{}' has no usable characters",
                display_name
            )));
        }

        let (stem, extension) = split_extension(&file_name);
        for attempt in 1..=MAX_COLLISIONS {
            let candidate = if attempt == 1 {
                file_name.clone()
            } else {
                format!("{} ({}){}", stem, attempt, extension)
            };
            let path = self.root.join(&candidate);

            // create_new keeps concurrent publishers from clobbering each other
            match OpenOptions::new().write(true).create_new(true).open(&path) {
                Ok(file) => {
                    write_or_remove(file, &path, bytes)?;
                    debug!(path = %path.display(), bytes = bytes.len(), "image archived");
                    return Ok(path);
                }
                Err(e) if e.kind() == ErrorKind::AlreadyExists => continue,
                Err(e) => return Err(e.into()),
            }
        }

        Err(StoreError::InvalidData(format!(
            "too many archived files named '{}'",
            file_name
        )))
    }
}

impl StoragePublisher for ArchivePublisher {
    fn publish(&self, bytes: &[u8], display_name: &str) -> Result<String, CollaboratorError> {
        let path = self
            .store(bytes, display_name)
            .map_err(|e| CollaboratorError::publisher(e.to_string()))?;
        Ok(path.to_string_lossy().into_owned())
    }
}

/// Write `bytes` to the freshly created `path`, removing it if the write fails
fn write_or_remove<W: Write>(mut file: W, path: &Path, bytes: &[u8]) -> std::io::Result<()> {
    let result = file.write_all(bytes).and_then(|()| file.flush());
    if result.is_err() {
        drop(file);
        let _ = fs::remove_file(path);
    }
    result
}

/// Replace path separators and control characters, trim dots and spaces
fn sanitize_file_name(name: &str) -> String {
    let replaced: String = name
        .chars()
        .map(|c| match c {
            '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '_',
            c if c.is_control() => '_',
            c => c,
        })
        .collect();
    replaced.trim_matches(|c: char| c == '.' || c.is_whitespace()).to_string()
}

fn split_extension(file_name: &str) -> (&str, &str) {
    match file_name.rfind('.') {
        Some(idx) if idx > 0 => file_name.split_at(idx),
        _ => (file_name, ""),
    }
}
