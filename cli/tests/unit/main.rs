//! Unit tests for the cfdeploy CLI
//!
//! These tests drive operations and requests against an in-memory controller
//! and run fast without network I/O.

mod operations;
mod requests;
