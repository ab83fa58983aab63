//! Common utilities shared by the immutype crates.
//!
//! This crate provides the foundational pieces the solver builds on:
//! - Centralized limits and capacity hints
//! - Tracing subscriber configuration driven by environment variables

// Centralized limits and thresholds
pub mod limits;

// Tracing subscriber setup (IMMUTYPE_LOG / IMMUTYPE_LOG_FORMAT)
pub mod tracing_config;
pub use tracing_config::{LogFormat, init_tracing};
