//! Launch configuration name generation
//!
//! Names are either given verbatim, derived from a prefix, or fully
//! generated. Generated suffixes sort by creation time.

use chrono::{DateTime, Utc};
use std::sync::atomic::{AtomicU32, Ordering};

/// Prefix used when neither `name` nor `name_prefix` is configured
pub const DEFAULT_NAME_PREFIX: &str = "launchconf-";

/// Length of the generated suffix appended to a prefix
pub const UNIQUE_ID_SUFFIX_LENGTH: usize = 26;

static COUNTER: AtomicU32 = AtomicU32::new(0);

fn suffix_at(now: DateTime<Utc>, counter: u32) -> String {
    format!(
        "{}{:04}{:08x}",
        now.format("%Y%m%d%H%M%S"),
        now.timestamp_subsec_micros() / 100,
        counter
    )
}

/// `prefix` followed by a unique, time-ordered 26-character suffix
pub fn prefixed_unique_id(prefix: &str) -> String {
    let counter = COUNTER.fetch_add(1, Ordering::Relaxed);
    format!("{prefix}{}", suffix_at(Utc::now(), counter))
}

/// A unique name using [`DEFAULT_NAME_PREFIX`]
pub fn unique_id() -> String {
    prefixed_unique_id(DEFAULT_NAME_PREFIX)
}

/// Pick the launch configuration name: explicit name, then prefix, then generated.
pub fn resolve_name(name: Option<&str>, name_prefix: Option<&str>) -> String {
    match (name, name_prefix) {
        (Some(name), _) if !name.is_empty() => name.to_string(),
        (_, Some(prefix)) if !prefix.is_empty() => prefixed_unique_id(prefix),
        _ => unique_id(),
    }
}
