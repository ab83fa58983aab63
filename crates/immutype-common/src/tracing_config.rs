//! Tracing configuration for debugging classifications.
//!
//! Supports three output formats controlled by `IMMUTYPE_LOG_FORMAT`:
//!
//! - `text` (default): Standard `tracing-subscriber` flat output
//! - `tree`: Hierarchical indented output via `tracing-tree`
//! - `json`: One JSON object per span/event
//!
//! ## Quick start
//!
//! ```bash
//! # Every frame push/resolve of the worklist, as an indented tree
//! IMMUTYPE_LOG=immutype_solver=trace IMMUTYPE_LOG_FORMAT=tree cargo test -p immutype-solver
//!
//! # Query start/end events only, machine-readable
//! IMMUTYPE_LOG=immutype::query_json=trace IMMUTYPE_LOG_FORMAT=json my-lint-tool
//! ```
//!
//! The subscriber is only initialised when `IMMUTYPE_LOG` (or `RUST_LOG`) is
//! set, so there is zero overhead in normal runs.

use tracing_subscriber::prelude::*;
use tracing_subscriber::{EnvFilter, Registry, fmt};

/// Tracing output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    /// Standard flat text lines (default).
    Text,
    /// Hierarchical indented tree via `tracing-tree`.
    Tree,
    /// Newline-delimited JSON objects.
    Json,
}

impl LogFormat {
    /// Parse a format name. Unrecognised names fall back to [`LogFormat::Text`].
    pub fn parse(value: &str) -> Self {
        match value.trim().to_lowercase().as_str() {
            "tree" => Self::Tree,
            "json" => Self::Json,
            _ => Self::Text,
        }
    }

    /// Read from the `IMMUTYPE_LOG_FORMAT` environment variable.
    fn from_env() -> Self {
        Self::parse(&std::env::var("IMMUTYPE_LOG_FORMAT").unwrap_or_default())
    }
}

/// Build an `EnvFilter` from `IMMUTYPE_LOG`, falling back to `RUST_LOG`.
fn build_filter() -> EnvFilter {
    if let Ok(val) = std::env::var("IMMUTYPE_LOG") {
        EnvFilter::builder().parse_lossy(val)
    } else {
        EnvFilter::from_default_env()
    }
}

/// Initialise the global tracing subscriber.
///
/// Does nothing when neither `IMMUTYPE_LOG` nor `RUST_LOG` is set. Returns
/// `true` only when this call installed the subscriber; a second call (or a
/// subscriber installed elsewhere) leaves the existing one in place.
///
/// All output goes to stderr.
pub fn init_tracing() -> bool {
    let has_own_log = std::env::var("IMMUTYPE_LOG").is_ok();
    let has_rust_log = std::env::var("RUST_LOG").is_ok();
    if !has_own_log && !has_rust_log {
        return false;
    }

    let filter = build_filter();
    match LogFormat::from_env() {
        LogFormat::Tree => {
            let tree_layer = tracing_tree::HierarchicalLayer::default()
                .with_indent_amount(2)
                .with_indent_lines(true)
                .with_deferred_spans(true)
                .with_targets(true);

            Registry::default()
                .with(filter)
                .with(tree_layer)
                .try_init()
                .is_ok()
        }
        LogFormat::Json => {
            let json_layer = fmt::layer().json().with_writer(std::io::stderr);

            Registry::default()
                .with(filter)
                .with(json_layer)
                .try_init()
                .is_ok()
        }
        LogFormat::Text => tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .try_init()
            .is_ok(),
    }
}
