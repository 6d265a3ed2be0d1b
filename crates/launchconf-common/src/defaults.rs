//! Default configuration values and attribute limits
//!
//! These constants keep the provider, the host binary and the tests in
//! agreement about retry windows and schema bounds.

/// Default AWS region when neither a flag nor the environment names one
pub const DEFAULT_REGION: &str = "us-east-1";

/// Window during which CreateLaunchConfiguration is retried on IAM propagation errors
pub const DEFAULT_CREATE_RETRY_TIMEOUT_SECS: u64 = 90;

/// Window during which the read after a successful create is retried
pub const DEFAULT_READ_AFTER_CREATE_TIMEOUT_SECS: u64 = 30;

/// Default path of the host state file
pub const DEFAULT_STATE_FILE: &str = "launchconf.state.json";

/// Maximum length of a launch configuration name
pub const MAX_NAME_LENGTH: usize = 255;

/// Maximum length of the raw user data payload
pub const MAX_USER_DATA_LENGTH: usize = 16384;

// Serde default functions for struct field defaults

/// Returns `true`, used for `enable_monitoring` and `delete_on_termination`
pub fn default_true() -> bool {
    true
}
