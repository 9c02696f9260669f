//! GitHubContentStore integration tests.
//!
//! Starts an axum mock of the contents API and drives the blocking client
//! against it.

#![cfg(feature = "github")]
