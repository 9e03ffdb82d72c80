//! # cotodo Shared Library
//!
//! This crate contains the data layer and auth primitives shared by the
//! cotodo API server and its integration tests.
//!
//! ## Module Organization
//!
//! - `models`: Database models and data structures
//! - `auth`: Session tokens and password hashing
//! - `db`: Connection pool and migrations

pub mod auth;
pub mod db;
pub mod models;

/// Current version of the cotodo shared library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
