//! Shared infrastructure for Madeira API Lambda functions.
//!
//! This crate provides the pieces every API function is assembled from:
//!
//! - [`Router`]: Maps `/api/<module>` paths and HTTP methods to [`Handler`]s
//! - [`enforce_content_length`]: Rejects oversized request bodies before dispatch
//! - [`ApiResponse`]: API Gateway proxy responses with JSON bodies
//! - [`ProblemDetails`]: RFC 9457 Problem Details for consistent error responses
//! - [`ApiPersistence`]: S3-backed JSON objects, shared or scoped to the caller
//!
//! # Testing Support
//!
//! The `test_utils` module provides event builders for handler testing, and
//! `MemoryObjectStore` stands in for S3. Enable the `test-utils` feature to
//! access both from dependent crates.

#![deny(warnings)]

mod context;
mod error;
mod event;
#[cfg(any(test, feature = "test-utils"))]
mod memory;
mod middleware;
mod persistence;
mod problem;
mod response;
mod router;
mod s3;
mod store;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

pub use context::RequestContext;
pub use error::{Error, Result, StoreError};
pub use event::{Authorizer, HttpDetails, InvocationEvent, InvocationRequestContext};
pub use middleware::{enforce_content_length, ContentLengthGuard, CONTENT_LENGTH_LIMIT};
pub use persistence::{user_object_key, ApiPersistence};
pub use problem::{
    from_error, ProblemDetails, PROBLEM_INTERNAL_ERROR, PROBLEM_INVALID_REQUEST,
    PROBLEM_METHOD_NOT_ALLOWED, PROBLEM_ROUTE_NOT_FOUND, PROBLEM_UNAUTHORIZED,
};
pub use response::ApiResponse;
pub use router::{module_for_path, Handler, Router, ROUTE_PREFIX};
pub use s3::S3ObjectStore;
#[cfg(any(test, feature = "test-utils"))]
pub use memory::MemoryObjectStore;
pub use store::{ObjectStore, ObjectStoreAdapter, PutAck};
