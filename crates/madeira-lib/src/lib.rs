//! Madeira library entry points.
//!
//! This crate bundles the out-of-band helpers used when deploying and
//! provisioning Lambda-based applications: the logger factory, content hashing,
//! deployable zip construction, and DNS record management. The Lambda request
//! layer lives in `madeira-lambda-shared`; consumers (CLI, Lambdas) should only
//! depend on the functions exported here instead of reimplementing behavior.

#![deny(warnings)]

pub mod archive;
mod client;
pub mod dns;
pub mod error;
pub mod hash;
pub mod logging;

pub use archive::{
    build_single_file_archive, build_tree_archive, files_in_tree, load_function_archive,
    TreeFile, DEFAULT_ENTRY_NAME, DEFAULT_SKIP_MARKER,
};
pub use dns::{
    wait_for_value, DnsProvider, DnsProviderConfig, DnsRecord, DohResolver, Lookup, Resolver,
    WaitPolicy, DEFAULT_TTL,
};
pub use error::{Error, Result};
pub use hash::{
    hash_bytes, hash_file, hash_reader, hash_remote_zip_member, hash_zip_member, HashAlgorithm,
};
pub use logging::{get_logger, LevelFilter, LogFormat, Logger, LoggingConfig};
