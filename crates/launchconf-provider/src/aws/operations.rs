//! Operation traits for testing
//!
//! These traits abstract the SDK client calls the resource lifecycle needs so
//! the lifecycle can be driven by in-memory fakes without hitting real AWS.

use super::error::AwsError;
use super::types::{ImageDescription, LaunchConfigurationDescription, LaunchConfigurationRequest};
use std::future::Future;

/// Auto Scaling launch configuration calls
pub trait LaunchConfigurationOperations: Send + Sync {
    /// Create a launch configuration
    fn create_launch_configuration(
        &self,
        request: &LaunchConfigurationRequest,
    ) -> impl Future<Output = Result<(), AwsError>> + Send;

    /// Describe the launch configuration with the given name.
    ///
    /// An empty vector means AWS knows no such launch configuration.
    fn describe_launch_configuration(
        &self,
        name: &str,
    ) -> impl Future<Output = Result<Vec<LaunchConfigurationDescription>, AwsError>> + Send;

    /// Delete the launch configuration with the given name
    fn delete_launch_configuration(
        &self,
        name: &str,
    ) -> impl Future<Output = Result<(), AwsError>> + Send;
}

/// EC2 image metadata lookup
pub trait ImageOperations: Send + Sync {
    /// Describe a single image; `None` when the image does not exist
    fn describe_image(
        &self,
        image_id: &str,
    ) -> impl Future<Output = Result<Option<ImageDescription>, AwsError>> + Send;
}
