//! Base64-encoded content digests for deployment artifacts.
//!
//! Lambda and S3 report artifact checksums as base64 digests, so every helper
//! here returns the standard base64 encoding of the raw digest bytes. The same
//! content produces the same digest regardless of whether it is read from a
//! file, an in-memory buffer, a stream, or a member of a remote zip archive.

use std::fmt;
use std::fs::File;
use std::io::{Cursor, ErrorKind, Read};
use std::path::Path;
use std::str::FromStr;

use base64::Engine;
use sha2::digest::DynDigest;
use sha2::{Sha224, Sha256, Sha384, Sha512, Sha512_224, Sha512_256};
use tracing::debug;
use zip::ZipArchive;

use crate::client::build_client;
use crate::error::{Error, Result};

/// Block size used when hashing files from disk.
pub const FILE_BLOCK_SIZE: usize = 64 * 1024;

/// Block size used when hashing arbitrary readers.
pub const STREAM_BLOCK_SIZE: usize = 1024 * 1024;

const MAX_PREALLOCATION: u64 = 16 * 1024 * 1024;

/// Supported digest algorithms.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum HashAlgorithm {
    Sha224,
    #[default]
    Sha256,
    Sha384,
    Sha512,
    Sha512_224,
    Sha512_256,
}

impl HashAlgorithm {
    pub fn name(&self) -> &'static str {
        match self {
            HashAlgorithm::Sha224 => "sha224",
            HashAlgorithm::Sha256 => "sha256",
            HashAlgorithm::Sha384 => "sha384",
            HashAlgorithm::Sha512 => "sha512",
            HashAlgorithm::Sha512_224 => "sha512_224",
            HashAlgorithm::Sha512_256 => "sha512_256",
        }
    }

    fn hasher(&self) -> Box<dyn DynDigest> {
        match self {
            HashAlgorithm::Sha224 => Box::new(Sha224::default()),
            HashAlgorithm::Sha256 => Box::new(Sha256::default()),
            HashAlgorithm::Sha384 => Box::new(Sha384::default()),
            HashAlgorithm::Sha512 => Box::new(Sha512::default()),
            HashAlgorithm::Sha512_224 => Box::new(Sha512_224::default()),
            HashAlgorithm::Sha512_256 => Box::new(Sha512_256::default()),
        }
    }
}

impl FromStr for HashAlgorithm {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "sha224" => Ok(HashAlgorithm::Sha224),
            "sha256" => Ok(HashAlgorithm::Sha256),
            "sha384" => Ok(HashAlgorithm::Sha384),
            "sha512" => Ok(HashAlgorithm::Sha512),
            "sha512_224" => Ok(HashAlgorithm::Sha512_224),
            "sha512_256" => Ok(HashAlgorithm::Sha512_256),
            _ => Err(Error::UnknownAlgorithm {
                name: s.to_string(),
            }),
        }
    }
}

impl fmt::Display for HashAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Hash an in-memory buffer.
pub fn hash_bytes(data: &[u8], algorithm: HashAlgorithm) -> String {
    let mut hasher = algorithm.hasher();
    hasher.update(data);
    encode_digest(hasher)
}

/// Hash a file on disk, reading it in [`FILE_BLOCK_SIZE`] blocks.
pub fn hash_file(path: &Path, algorithm: HashAlgorithm) -> Result<String> {
    debug!(path = %path.display(), %algorithm, "hashing file");
    let file = File::open(path)?;
    digest_reader(file, algorithm, FILE_BLOCK_SIZE)
}

/// Hash everything a reader yields, in [`STREAM_BLOCK_SIZE`] blocks.
pub fn hash_reader<R: Read>(reader: R, algorithm: HashAlgorithm) -> Result<String> {
    digest_reader(reader, algorithm, STREAM_BLOCK_SIZE)
}

/// Hash a single member of a zip archive held in memory.
pub fn hash_zip_member(archive: &[u8], member: &str, algorithm: HashAlgorithm) -> Result<String> {
    let mut archive = ZipArchive::new(Cursor::new(archive))?;
    let mut entry = match archive.by_name(member) {
        Ok(entry) => entry,
        Err(zip::result::ZipError::FileNotFound) => {
            return Err(Error::ArchiveMemberMissing {
                member: member.to_string(),
            })
        }
        Err(err) => return Err(err.into()),
    };

    let mut contents = Vec::with_capacity(preallocation_hint(entry.size()));
    entry.read_to_end(&mut contents)?;
    Ok(hash_bytes(&contents, algorithm))
}

/// Download a zip archive and hash one of its members.
///
/// The whole archive is fetched before the member is read.
pub fn hash_remote_zip_member(url: &str, member: &str, algorithm: HashAlgorithm) -> Result<String> {
    debug!(%url, %member, "fetching archive for member hash");
    let client = build_client()?;
    let response = client.get(url).send()?.error_for_status()?;
    let archive = response.bytes()?;
    hash_zip_member(&archive, member, algorithm)
}

fn digest_reader<R: Read>(
    mut reader: R,
    algorithm: HashAlgorithm,
    block_size: usize,
) -> Result<String> {
    let mut hasher = algorithm.hasher();
    let mut buffer = vec![0u8; block_size];
    loop {
        let read = match reader.read(&mut buffer) {
            Ok(0) => break,
            Ok(read) => read,
            Err(err) if err.kind() == ErrorKind::Interrupted => continue,
            Err(err) => return Err(err.into()),
        };
        hasher.update(&buffer[..read]);
    }
    Ok(encode_digest(hasher))
}

/// Buffer size to reserve for a member whose size the archive declares.
fn preallocation_hint(declared: u64) -> usize {
    declared.min(MAX_PREALLOCATION) as usize
}

fn encode_digest(hasher: Box<dyn DynDigest>) -> String {
    base64::engine::general_purpose::STANDARD.encode(hasher.finalize())
}
