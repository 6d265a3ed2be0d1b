//! Launch configuration creation

use super::block_device::{
    expand_block_device_mappings, expand_legacy_block_devices, needs_root_device_name,
};
use super::{LaunchConfigurationResource, ResourceData, ResourceError, non_empty};
use crate::aws::{
    AwsError, DeviceMapping, ImageOperations, LaunchConfigurationOperations,
    LaunchConfigurationRequest, fetch_root_device_name,
};
use crate::wait::retry_within;
use anyhow::{Context, Result};
use launchconf_common::schema::LEGACY_BLOCK_DEVICE_DEPRECATION;
use launchconf_common::{
    LaunchConfigurationAttributes, launch_configuration_schema, naming, user_data, validate,
};
use tracing::{debug, info, warn};

impl<A, I> LaunchConfigurationResource<A, I>
where
    A: LaunchConfigurationOperations,
    I: ImageOperations,
{
    /// Create the launch configuration described by `data.attributes`.
    ///
    /// Creation is retried while a freshly created IAM instance profile is
    /// not yet visible to Auto Scaling, and the result is read back until it
    /// shows up. Once AWS accepts the create, `data` carries the id and the
    /// `user_data` digest even if the read-back then fails, so the caller can
    /// record the launch configuration.
    pub async fn create_launch_configuration(&self, data: &mut ResourceData) -> Result<()> {
        validate(&data.attributes).map_err(ResourceError::from)?;
        for attribute in launch_configuration_schema().deprecated_in_use(&data.attributes) {
            warn!(attribute, "{}", LEGACY_BLOCK_DEVICE_DEPRECATION);
        }

        let mut request = launch_configuration_request(&data.attributes);
        request.block_device_mappings = self.expand_block_devices(&data.attributes).await?;
        let name = request.name.clone();

        info!(
            name = %name,
            image_id = %request.image_id,
            instance_type = %request.instance_type,
            "Creating launch configuration"
        );

        retry_within(
            self.retry.create.clone(),
            || self.autoscaling.create_launch_configuration(&request),
            AwsError::is_propagation_delay,
            "create launch configuration",
        )
        .await
        .context("Error creating launch configuration")?;

        data.set_id(name.as_str());
        data.attributes.name = Some(name.clone());
        data.attributes.user_data =
            non_empty(&data.attributes.user_data).map(user_data::state_value);
        info!(name = %name, "Launch configuration created");

        let refreshed = retry_within(
            self.retry.read_after_create.clone(),
            || {
                let mut attempt = data.clone();
                let name = name.clone();
                async move {
                    self.read_launch_configuration(&mut attempt).await?;
                    if attempt.is_gone() {
                        return Err(ResourceError::NotYetVisible(name).into());
                    }
                    Ok::<_, anyhow::Error>(attempt)
                }
            },
            |_| true,
            "read launch configuration after create",
        )
        .await?;

        *data = refreshed;
        Ok(())
    }

    /// Request mappings for whichever block-device family the attributes use
    async fn expand_block_devices(
        &self,
        attrs: &LaunchConfigurationAttributes,
    ) -> Result<Vec<DeviceMapping>> {
        if !attrs.block_device_mapping.is_empty() {
            let root = if needs_root_device_name(&attrs.block_device_mapping) {
                fetch_root_device_name(&self.images, &attrs.image_id).await?
            } else {
                None
            };
            return Ok(expand_block_device_mappings(
                &attrs.block_device_mapping,
                &attrs.image_id,
                root.as_deref(),
            )?);
        }

        if !attrs.uses_legacy_block_devices() {
            return Ok(Vec::new());
        }

        let root = fetch_root_device_name(&self.images, &attrs.image_id).await?;
        debug!(image_id = %attrs.image_id, root = ?root, "Resolved root device");
        Ok(expand_legacy_block_devices(
            &attrs.ebs_block_device,
            &attrs.ephemeral_block_device,
            attrs.root_block_device.as_ref(),
            &attrs.image_id,
            root.as_deref(),
        )?)
    }
}

/// Build the create request from desired attributes, without block devices
pub(crate) fn launch_configuration_request(
    attrs: &LaunchConfigurationAttributes,
) -> LaunchConfigurationRequest {
    LaunchConfigurationRequest {
        name: naming::resolve_name(attrs.name.as_deref(), attrs.name_prefix.as_deref()),
        image_id: attrs.image_id.clone(),
        instance_type: attrs.instance_type.clone(),
        ebs_optimized: attrs.ebs_optimized.unwrap_or(false),
        user_data: non_empty(&attrs.user_data).map(user_data::encode),
        monitoring_enabled: attrs.enable_monitoring,
        iam_instance_profile: non_empty(&attrs.iam_instance_profile).map(str::to_string),
        placement_tenancy: non_empty(&attrs.placement_tenancy).map(str::to_string),
        associate_public_ip_address: attrs.associate_public_ip_address.then_some(true),
        key_name: non_empty(&attrs.key_name).map(str::to_string),
        spot_price: non_empty(&attrs.spot_price).map(str::to_string),
        security_groups: attrs.security_groups.iter().cloned().collect(),
        classic_link_vpc_id: non_empty(&attrs.vpc_classic_link_id).map(str::to_string),
        classic_link_vpc_security_groups: attrs
            .vpc_classic_link_security_groups
            .iter()
            .cloned()
            .collect(),
        block_device_mappings: Vec::new(),
    }
}
