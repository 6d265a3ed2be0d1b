//! Launch configuration refresh

use super::block_device::{flatten_block_device_mappings, split_legacy_block_devices};
use super::{LaunchConfigurationResource, ResourceData, ResourceError};
use crate::aws::{
    ImageOperations, LaunchConfigurationDescription, LaunchConfigurationOperations,
    fetch_root_device_name,
};
use anyhow::{Context, Result};
use launchconf_common::LaunchConfigurationAttributes;
use tracing::{debug, warn};

impl<A, I> LaunchConfigurationResource<A, I>
where
    A: LaunchConfigurationOperations,
    I: ImageOperations,
{
    /// Refresh `data` from AWS.
    ///
    /// A launch configuration that no longer exists clears the id instead of
    /// failing. `user_data` and `placement_tenancy` are not returned by AWS
    /// and keep their previous values.
    pub async fn read_launch_configuration(&self, data: &mut ResourceData) -> Result<()> {
        let id = data.id().to_string();

        let found = match self.autoscaling.describe_launch_configuration(&id).await {
            Ok(found) => found,
            Err(e) if e.is_not_found() => {
                warn!(name = %id, "Launch configuration not found, removing from state");
                data.clear_id();
                return Ok(());
            }
            Err(e) => return Err(e).context("Error retrieving launch configuration"),
        };

        let Some(lc) = found.into_iter().next() else {
            warn!(name = %id, "Launch configuration not found, removing from state");
            data.clear_id();
            return Ok(());
        };

        if lc.name != id {
            return Err(ResourceError::IdentifierMismatch {
                expected: id,
                actual: lc.name,
            }
            .into());
        }

        let root = if lc.block_device_mappings.is_empty() {
            None
        } else {
            fetch_root_device_name(&self.images, &lc.image_id).await?
        };

        debug!(
            name = %id,
            block_devices = lc.block_device_mappings.len(),
            root = ?root,
            "Launch configuration found"
        );
        apply_description(&mut data.attributes, lc, root.as_deref());
        Ok(())
    }
}

/// Copy the returned launch configuration into state attributes
fn apply_description(
    attrs: &mut LaunchConfigurationAttributes,
    lc: LaunchConfigurationDescription,
    root_device_name: Option<&str>,
) {
    attrs.block_device_mapping =
        flatten_block_device_mappings(&lc.block_device_mappings, root_device_name);
    let legacy = split_legacy_block_devices(&lc.block_device_mappings, root_device_name);
    attrs.ebs_block_device = legacy.ebs;
    attrs.ephemeral_block_device = legacy.ephemeral;
    attrs.root_block_device = legacy.root;

    attrs.name = Some(lc.name);
    attrs.image_id = lc.image_id;
    attrs.instance_type = lc.instance_type;
    attrs.key_name = lc.key_name;
    attrs.iam_instance_profile = lc.iam_instance_profile;
    attrs.ebs_optimized = lc.ebs_optimized;
    attrs.spot_price = lc.spot_price;
    if let Some(enabled) = lc.monitoring_enabled {
        attrs.enable_monitoring = enabled;
    }
    attrs.security_groups = lc.security_groups.into_iter().collect();
    attrs.associate_public_ip_address = lc.associate_public_ip_address.unwrap_or(false);
    attrs.vpc_classic_link_id = lc.classic_link_vpc_id;
    attrs.vpc_classic_link_security_groups =
        lc.classic_link_vpc_security_groups.into_iter().collect();
}
