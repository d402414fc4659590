//! Package command handlers for function and layer archives.

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Serialize;
use tracing::info;

use madeira_lib::{
    build_tree_archive, files_in_tree, hash_bytes, load_function_archive, HashAlgorithm,
};

use crate::output::OutputFormat;

/// Output structure for the package commands.
#[derive(Debug, Clone, Serialize)]
pub struct PackageOutput {
    pub output: String,
    pub bytes: usize,
    /// Base64 SHA-256 of the archive, as Lambda reports `CodeSha256`.
    pub code_sha256: String,
}

impl PackageOutput {
    fn new(output: &Path, archive: &[u8]) -> Self {
        Self {
            output: output.display().to_string(),
            bytes: archive.len(),
            code_sha256: hash_bytes(archive, HashAlgorithm::Sha256),
        }
    }
}

impl fmt::Display for PackageOutput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Wrote {} ({} bytes, sha256 {})",
            self.output, self.bytes, self.code_sha256
        )
    }
}

/// Files a layer archive would contain, for `package layer --list`.
#[derive(Debug, Clone, Serialize)]
pub struct LayerListing {
    pub root: String,
    pub entries: Vec<String>,
}

impl fmt::Display for LayerListing {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.entries.join("\n"))
    }
}

/// Handle `package function`.
pub fn handle_package_function(
    source: &Path,
    output: &Path,
    entry_name: &str,
    format: OutputFormat,
) -> Result<()> {
    let archive = load_function_archive(source, entry_name)
        .with_context(|| format!("failed to package {}", source.display()))?;
    write_archive(output, &archive)?;
    format.render(&PackageOutput::new(output, &archive))
}

/// Handle `package layer`.
pub fn handle_package_layer(
    root: &Path,
    output: Option<&Path>,
    exclude: Option<&str>,
    list: bool,
    format: OutputFormat,
) -> Result<()> {
    if list {
        let entries = files_in_tree(root, exclude)
            .with_context(|| format!("failed to walk {}", root.display()))?
            .into_iter()
            .map(|file| file.entry_name)
            .collect();
        return format.render(&LayerListing {
            root: root.display().to_string(),
            entries,
        });
    }

    let output = output
        .map(Path::to_path_buf)
        .unwrap_or_else(|| default_layer_output(root));
    let archive = build_tree_archive(root, exclude)
        .with_context(|| format!("failed to package layer {}", root.display()))?
        .into_inner();
    write_archive(&output, &archive)?;
    format.render(&PackageOutput::new(&output, &archive))
}

fn write_archive(output: &Path, archive: &[u8]) -> Result<()> {
    if let Some(parent) = output.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("failed to create {}", parent.display()))?;
    }
    fs::write(output, archive).with_context(|| format!("failed to write {}", output.display()))?;
    info!(path = %output.display(), bytes = archive.len(), "archive written");
    Ok(())
}

/// `<root>.zip` next to the layer directory.
fn default_layer_output(root: &Path) -> PathBuf {
    let name = root
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .filter(|name| !name.is_empty())
        .unwrap_or_else(|| "layer".to_string());
    root.with_file_name(format!("{}.zip", name))
}
