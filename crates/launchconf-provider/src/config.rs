//! Configuration types for the provider

use crate::wait::RetryConfig;
use launchconf_common::defaults::{
    DEFAULT_CREATE_RETRY_TIMEOUT_SECS, DEFAULT_READ_AFTER_CREATE_TIMEOUT_SECS, DEFAULT_REGION,
};
use std::time::Duration;

/// AWS connection configuration
#[derive(Debug, Clone)]
pub struct AwsConfig {
    /// AWS region
    pub region: String,
    /// AWS profile name (overrides default credential resolution)
    pub aws_profile: Option<String>,
}

impl Default for AwsConfig {
    fn default() -> Self {
        Self {
            region: DEFAULT_REGION.to_string(),
            aws_profile: None,
        }
    }
}

/// Retry windows for eventually consistent calls
#[derive(Debug, Clone)]
pub struct RetrySettings {
    /// Create retry window while an IAM instance profile propagates
    pub create: RetryConfig,
    /// Read-back window right after create
    pub read_after_create: RetryConfig,
}

impl Default for RetrySettings {
    fn default() -> Self {
        Self {
            create: RetryConfig::with_timeout(Duration::from_secs(
                DEFAULT_CREATE_RETRY_TIMEOUT_SECS,
            )),
            read_after_create: RetryConfig::with_timeout(Duration::from_secs(
                DEFAULT_READ_AFTER_CREATE_TIMEOUT_SECS,
            )),
        }
    }
}

/// Provider configuration
///
/// Composed of focused sub-configs: how to reach AWS and how long to wait
/// for it to become consistent.
#[derive(Debug, Clone, Default)]
pub struct ProviderConfig {
    pub aws: AwsConfig,
    pub retry: RetrySettings,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_windows() {
        let config = ProviderConfig::default();
        assert_eq!(config.aws.region, "us-east-1");
        assert_eq!(config.retry.create.timeout, Duration::from_secs(90));
        assert_eq!(config.retry.read_after_create.timeout, Duration::from_secs(30));
    }
}
