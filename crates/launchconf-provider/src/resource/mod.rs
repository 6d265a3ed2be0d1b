//! The launch configuration resource
//!
//! [`LaunchConfigurationResource`] implements [`ResourceLifecycle`] on top
//! of the Auto Scaling and EC2 operation traits. Each lifecycle step lives in
//! its own module; the block-device translation they share is pure and kept
//! in [`block_device`].

pub mod block_device;
mod create;
mod data;
mod delete;
mod error;
pub mod plan;
mod read;

pub use data::{ResourceData, ResourceLifecycle};
pub use error::ResourceError;
pub use plan::{PlanAction, plan};

use crate::aws::{
    AutoscalingClient, AwsContext, Ec2Client, ImageOperations, LaunchConfigurationOperations,
};
use crate::config::RetrySettings;
use launchconf_common::{ResourceSchema, launch_configuration_schema};

/// A string attribute's value, with an empty string treated as unset
pub(crate) fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.is_empty())
}

/// Launch configuration resource backed by an Auto Scaling and an image client
pub struct LaunchConfigurationResource<A, I> {
    autoscaling: A,
    images: I,
    retry: RetrySettings,
}

impl<A, I> LaunchConfigurationResource<A, I>
where
    A: LaunchConfigurationOperations,
    I: ImageOperations,
{
    pub fn new(autoscaling: A, images: I, retry: RetrySettings) -> Self {
        Self {
            autoscaling,
            images,
            retry,
        }
    }
}

impl LaunchConfigurationResource<AutoscalingClient, Ec2Client> {
    /// Resource using real AWS clients built from a pre-loaded context
    pub fn from_context(ctx: &AwsContext, retry: RetrySettings) -> Self {
        Self::new(
            AutoscalingClient::from_context(ctx),
            Ec2Client::from_context(ctx),
            retry,
        )
    }
}

impl<A, I> ResourceLifecycle for LaunchConfigurationResource<A, I>
where
    A: LaunchConfigurationOperations,
    I: ImageOperations,
{
    fn schema(&self) -> ResourceSchema {
        launch_configuration_schema()
    }

    async fn create(&self, data: &mut ResourceData) -> anyhow::Result<()> {
        self.create_launch_configuration(data).await
    }

    async fn read(&self, data: &mut ResourceData) -> anyhow::Result<()> {
        self.read_launch_configuration(data).await
    }

    async fn delete(&self, data: &mut ResourceData) -> anyhow::Result<()> {
        self.delete_launch_configuration(data).await
    }

    fn import(&self, id: &str) -> anyhow::Result<Vec<ResourceData>> {
        Ok(vec![ResourceData::from_id(id)])
    }
}
