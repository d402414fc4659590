//! In-memory zip archives for Lambda function and layer deployment.
//!
//! Every entry is written with Unix host metadata, `0o777` permissions and a
//! fixed modification time, so the same inputs yield byte-identical archives
//! whichever platform builds them. Archives are returned as a cursor rewound to
//! the start, ready to be handed to an upload call.

use std::fs;
use std::io::{Cursor, Write};
use std::path::{Path, PathBuf};

use tracing::{debug, info};
use walkdir::WalkDir;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, DateTime, ZipWriter};

use crate::error::Result;

/// Entry name used for single-file function archives.
pub const DEFAULT_ENTRY_NAME: &str = "handler";

/// Directory marker skipped by default when archiving a tree.
pub const DEFAULT_SKIP_MARKER: &str = "__pycache__";

/// Permission bits applied to every archive entry.
pub const ENTRY_MODE: u32 = 0o777;

/// A file discovered while walking a directory tree for packaging.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TreeFile {
    /// Location of the file on disk.
    pub path: PathBuf,
    /// Name the file receives inside the archive (root-relative, `/`-separated).
    pub entry_name: String,
}

/// Build an archive holding one file under `entry_name`.
pub fn build_single_file_archive(path: &Path, entry_name: &str) -> Result<Cursor<Vec<u8>>> {
    let content = fs::read(path)?;
    debug!(
        source = %path.display(),
        entry = %entry_name,
        bytes = content.len(),
        "building single-file archive"
    );

    let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
    writer.start_file(entry_name, entry_options())?;
    writer.write_all(&content)?;
    finish(writer)
}

/// Build an archive holding every file below `root`.
///
/// Directories whose root-relative path contains `skip_marker` are skipped
/// together with everything beneath them. Directories without files produce
/// no entries.
pub fn build_tree_archive(root: &Path, skip_marker: Option<&str>) -> Result<Cursor<Vec<u8>>> {
    let files = files_in_tree(root, skip_marker)?;
    info!(
        root = %root.display(),
        files = files.len(),
        "building tree archive"
    );

    let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
    for file in &files {
        let content = fs::read(&file.path)?;
        writer.start_file(file.entry_name.as_str(), entry_options())?;
        writer.write_all(&content)?;
    }
    finish(writer)
}

/// List the files [`build_tree_archive`] would package, in entry-name order.
pub fn files_in_tree(root: &Path, skip_marker: Option<&str>) -> Result<Vec<TreeFile>> {
    let walker = WalkDir::new(root)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|entry| {
            if !entry.file_type().is_dir() {
                return true;
            }
            match skip_marker {
                Some(marker) if !marker.is_empty() => {
                    !relative_name(root, entry.path()).contains(marker)
                }
                _ => true,
            }
        });

    let mut files = Vec::new();
    for entry in walker {
        let entry = entry?;
        // Symlinks are not followed by the walk; a link to a file is packaged
        // with the target's contents.
        let is_file = entry.file_type().is_file()
            || (entry.path_is_symlink() && entry.path().is_file());
        if !is_file {
            continue;
        }
        files.push(TreeFile {
            path: entry.path().to_path_buf(),
            entry_name: relative_name(root, entry.path()),
        });
    }

    Ok(files)
}

/// Load deployable bytes for a function source.
///
/// Paths ending in `.zip` are read verbatim; anything else is wrapped with
/// [`build_single_file_archive`].
pub fn load_function_archive(path: &Path, entry_name: &str) -> Result<Vec<u8>> {
    let is_zip = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.eq_ignore_ascii_case("zip"))
        .unwrap_or(false);

    if is_zip {
        return Ok(fs::read(path)?);
    }

    Ok(build_single_file_archive(path, entry_name)?.into_inner())
}

fn entry_options() -> SimpleFileOptions {
    SimpleFileOptions::default()
        .compression_method(CompressionMethod::Deflated)
        .unix_permissions(ENTRY_MODE)
        .last_modified_time(DateTime::default())
        .large_file(false)
}

fn finish(writer: ZipWriter<Cursor<Vec<u8>>>) -> Result<Cursor<Vec<u8>>> {
    let mut cursor = writer.finish()?;
    cursor.set_position(0);
    Ok(cursor)
}

fn relative_name(root: &Path, path: &Path) -> String {
    let relative = path.strip_prefix(root).unwrap_or(path);
    relative
        .components()
        .map(|component| component.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}
