//! Misconfiguration and consistency errors raised by the resource itself

use launchconf_common::ValidationError;
use thiserror::Error;

/// Errors detected by the resource rather than returned by AWS
#[derive(Debug, Error)]
pub enum ResourceError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("Root device ({0}) declared as an 'ebs_block_device'.  Use 'root_block_device' keyword.")]
    RootDeclaredAsEbs(String),

    #[error("Expected to find a Root Device name for AMI ({0}), but got none")]
    MissingRootDeviceName(String),

    #[error("block_device_mapping entry needs a device_name or is_root_device = true")]
    MissingDeviceName,

    #[error("Unable to find launch configuration: expected {expected}, got {actual}")]
    IdentifierMismatch { expected: String, actual: String },

    #[error("launch configuration {0} is not visible yet")]
    NotYetVisible(String),
}
