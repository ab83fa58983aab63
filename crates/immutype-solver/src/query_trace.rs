//! Structured query tracing for classification entry points.
//!
//! Events use target `immutype::query_json` and are intended to be consumed with:
//! `IMMUTYPE_LOG=immutype::query_json=trace IMMUTYPE_LOG_FORMAT=json`.
//!
//! Environment:
//! - `IMMUTYPE_QUERY_RUN_ID`: optional run identifier attached to every event.

use crate::immutability::Immutability;
use crate::types::TypeId;
use std::sync::OnceLock;
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::{Level, trace};

static NEXT_QUERY_ID: AtomicU64 = AtomicU64::new(1);
static QUERY_RUN_ID: OnceLock<String> = OnceLock::new();

#[inline]
pub(crate) fn enabled() -> bool {
    tracing::enabled!(target: "immutype::query_json", Level::TRACE)
}

#[inline]
pub(crate) fn next_query_id() -> u64 {
    NEXT_QUERY_ID.fetch_add(1, Ordering::Relaxed)
}

#[inline]
fn run_id() -> &'static str {
    QUERY_RUN_ID
        .get_or_init(|| {
            std::env::var("IMMUTYPE_QUERY_RUN_ID").unwrap_or_else(|_| "default".to_string())
        })
        .as_str()
}

#[inline]
pub(crate) fn classify_start(query_id: u64, input: TypeId, threshold: Immutability) {
    trace!(
        target: "immutype::query_json",
        event = "query",
        phase = "start",
        run_id = run_id(),
        query_id,
        op = "get_type_immutability",
        input_type_id = input.0,
        threshold = threshold.as_str()
    );
}

#[inline]
pub(crate) fn classify_end(query_id: u64, result: Immutability, cache_hit: bool) {
    trace!(
        target: "immutype::query_json",
        event = "query",
        phase = "end",
        run_id = run_id(),
        query_id,
        op = "get_type_immutability",
        result = result.as_str(),
        cache_hit
    );
}
