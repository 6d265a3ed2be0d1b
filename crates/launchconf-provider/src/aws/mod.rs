//! AWS client modules for the launch configuration resource
//!
//! This module provides wrappers around AWS SDK clients for:
//! - Auto Scaling: launch configuration create/describe/delete
//! - EC2: image lookup for the root-device name
//!
//! The SDK clients sit behind the traits in [`operations`] so the resource
//! logic can run against in-memory fakes.

pub mod autoscaling;
pub mod context;
pub mod ec2;
pub mod error;
pub mod operations;
pub mod types;

pub use autoscaling::AutoscalingClient;
pub use context::AwsContext;
pub use ec2::{Ec2Client, fetch_root_device_name};
pub use error::{AwsError, classify_aws_error, classify_sdk_error};
pub use operations::{ImageOperations, LaunchConfigurationOperations};
pub use types::{
    DeviceMapping, EbsSpec, ImageDescription, LaunchConfigurationDescription,
    LaunchConfigurationRequest,
};
