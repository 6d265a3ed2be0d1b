//! Launch configuration deletion

use super::{LaunchConfigurationResource, ResourceData};
use crate::aws::{ImageOperations, LaunchConfigurationOperations};
use anyhow::{Context, Result};
use tracing::{debug, info};

impl<A, I> LaunchConfigurationResource<A, I>
where
    A: LaunchConfigurationOperations,
    I: ImageOperations,
{
    /// Delete the launch configuration; one that is already gone counts as deleted
    pub async fn delete_launch_configuration(&self, data: &mut ResourceData) -> Result<()> {
        let id = data.id().to_string();
        info!(name = %id, "Deleting launch configuration");

        match self.autoscaling.delete_launch_configuration(&id).await {
            Ok(()) => {}
            Err(e) if e.is_not_found() => {
                debug!(name = %id, "Launch configuration not found, nothing to delete");
            }
            Err(e) => {
                return Err(e).with_context(|| format!("Error deleting launch configuration {id}"));
            }
        }

        data.clear_id();
        Ok(())
    }
}
