//! AWS test utilities
//!
//! Provides region detection and unique names for AWS integration tests.

use chrono::Utc;
use launchconf_common::defaults::DEFAULT_REGION;

/// Get the AWS region for tests.
///
/// Checks environment variables in order:
/// 1. AWS_REGION
/// 2. AWS_DEFAULT_REGION
/// 3. Falls back to us-east-1
///
/// # Example
///
/// ```
/// use launchconf_test_utils::aws::get_test_region;
///
/// let region = get_test_region();
/// assert!(!region.is_empty());
/// ```
pub fn get_test_region() -> String {
    std::env::var("AWS_REGION")
        .or_else(|_| std::env::var("AWS_DEFAULT_REGION"))
        .unwrap_or_else(|_| DEFAULT_REGION.to_string())
}

/// Generate a unique launch configuration name for test resources.
///
/// Format: `launchconf-test-{timestamp_ms}-{counter}`, so names stay unique
/// even when tests start simultaneously.
///
/// # Example
///
/// ```
/// use launchconf_test_utils::aws::test_launch_configuration_name;
///
/// let name = test_launch_configuration_name();
/// assert!(name.starts_with("launchconf-test-"));
/// ```
pub fn test_launch_configuration_name() -> String {
    use std::sync::atomic::{AtomicU32, Ordering};
    static COUNTER: AtomicU32 = AtomicU32::new(0);

    let ts = Utc::now().timestamp_millis();
    let counter = COUNTER.fetch_add(1, Ordering::Relaxed);
    format!("launchconf-test-{ts}-{counter}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_name_format() {
        let name = test_launch_configuration_name();
        let parts: Vec<&str> = name
            .strip_prefix("launchconf-test-")
            .unwrap()
            .split('-')
            .collect();
        assert_eq!(parts.len(), 2);
        parts[0].parse::<i64>().expect("Should be valid timestamp");
        parts[1].parse::<u32>().expect("Should be valid counter");
    }

    #[test]
    fn test_names_unique() {
        let a = test_launch_configuration_name();
        let b = test_launch_configuration_name();
        assert_ne!(a, b);
    }
}
