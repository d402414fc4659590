//! Hash command handlers.

use std::fmt;
use std::fs;
use std::io;
use std::path::Path;

use anyhow::{Context, Result};
use serde::Serialize;

use madeira_lib::{
    hash_bytes, hash_file, hash_reader, hash_remote_zip_member, hash_zip_member, HashAlgorithm,
};

use crate::output::OutputFormat;

/// Output structure for every hash subcommand.
#[derive(Debug, Clone, Serialize)]
pub struct HashOutput {
    pub source: String,
    pub algorithm: String,
    pub digest: String,
}

impl HashOutput {
    fn new(source: impl Into<String>, algorithm: HashAlgorithm, digest: String) -> Self {
        Self {
            source: source.into(),
            algorithm: algorithm.to_string(),
            digest,
        }
    }
}

impl fmt::Display for HashOutput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}  {}", self.digest, self.source)
    }
}

/// Parse an algorithm name given on the command line.
pub fn parse_algorithm(name: &str) -> Result<HashAlgorithm> {
    name.parse::<HashAlgorithm>()
        .with_context(|| format!("unsupported hash algorithm '{}'", name))
}

/// Handle `hash file`.
pub fn handle_hash_file(path: &Path, algorithm: HashAlgorithm, format: OutputFormat) -> Result<()> {
    let digest = hash_file(path, algorithm)
        .with_context(|| format!("failed to hash {}", path.display()))?;
    format.render(&HashOutput::new(
        path.display().to_string(),
        algorithm,
        digest,
    ))
}

/// Handle `hash data`: hash the UTF-8 bytes of `text`.
pub fn handle_hash_data(text: &str, algorithm: HashAlgorithm, format: OutputFormat) -> Result<()> {
    let digest = hash_bytes(text.as_bytes(), algorithm);
    format.render(&HashOutput::new("<data>", algorithm, digest))
}

/// Handle `hash stdin`.
pub fn handle_hash_stdin(algorithm: HashAlgorithm, format: OutputFormat) -> Result<()> {
    let digest = hash_reader(io::stdin().lock(), algorithm).context("failed to hash stdin")?;
    format.render(&HashOutput::new("-", algorithm, digest))
}

/// Handle `hash zip-member`.
///
/// `archive` may be a local path or an `http(s)://` URL.
pub fn handle_hash_zip_member(
    archive: &str,
    member: &str,
    algorithm: HashAlgorithm,
    format: OutputFormat,
) -> Result<()> {
    let digest = if is_url(archive) {
        hash_remote_zip_member(archive, member, algorithm)
            .with_context(|| format!("failed to hash {} in {}", member, archive))?
    } else {
        let bytes = fs::read(archive).with_context(|| format!("failed to read {}", archive))?;
        hash_zip_member(&bytes, member, algorithm)
            .with_context(|| format!("failed to hash {} in {}", member, archive))?
    };

    format.render(&HashOutput::new(
        format!("{}!{}", archive, member),
        algorithm,
        digest,
    ))
}

fn is_url(source: &str) -> bool {
    source.starts_with("http://") || source.starts_with("https://")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_algorithm() {
        assert_eq!(parse_algorithm("sha384").unwrap(), HashAlgorithm::Sha384);
        let err = parse_algorithm("md5").unwrap_err();
        assert!(err.to_string().contains("unsupported hash algorithm 'md5'"));
    }

    #[test]
    fn test_is_url() {
        assert!(is_url("https://example.com/layer.zip"));
        assert!(is_url("http://localhost:9000/a.zip"));
        assert!(!is_url("dist/layer.zip"));
    }

    #[test]
    fn test_hash_output_display() {
        let output = HashOutput::new("a.txt", HashAlgorithm::Sha256, "abc=".to_string());
        assert_eq!(output.to_string(), "abc=  a.txt");
    }
}
