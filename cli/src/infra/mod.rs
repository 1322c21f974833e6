//! Infrastructure layer — concrete implementations of application port traits.
//!
//! This module contains all I/O-performing code: the controller HTTP client,
//! configuration and module files, and the in-process projection sinks.
//!
//! Imports from `crate::domain` and `crate::application::ports` are allowed.
//! Imports from `crate::commands` or `crate::output` are forbidden.

pub mod config;
pub mod controller;
pub mod events;
pub mod projection;
pub mod refresh;
pub mod store;
