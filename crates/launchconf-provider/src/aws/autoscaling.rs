//! Auto Scaling launch configuration client

use crate::aws::context::AwsContext;
use crate::aws::error::{AwsError, classify_sdk_error};
use crate::aws::operations::LaunchConfigurationOperations;
use crate::aws::types::{
    DeviceMapping, EbsSpec, LaunchConfigurationDescription, LaunchConfigurationRequest,
};
use aws_sdk_autoscaling::{
    Client,
    types::{BlockDeviceMapping, Ebs, InstanceMonitoring, LaunchConfiguration},
};
use tracing::debug;

/// Auto Scaling client for managing launch configurations
pub struct AutoscalingClient {
    client: Client,
}

impl AutoscalingClient {
    /// Create a new Auto Scaling client (loads AWS config from environment)
    pub async fn new(region: &str) -> Self {
        let ctx = AwsContext::new(region).await;
        Self::from_context(&ctx)
    }

    /// Create an Auto Scaling client from a pre-loaded AWS context
    pub fn from_context(ctx: &AwsContext) -> Self {
        Self {
            client: ctx.autoscaling_client(),
        }
    }
}

impl LaunchConfigurationOperations for AutoscalingClient {
    async fn create_launch_configuration(
        &self,
        request: &LaunchConfigurationRequest,
    ) -> Result<(), AwsError> {
        let mappings = request
            .block_device_mappings
            .iter()
            .map(to_sdk_mapping)
            .collect::<Result<Vec<_>, _>>()?;

        debug!(
            name = %request.name,
            image_id = %request.image_id,
            instance_type = %request.instance_type,
            block_devices = mappings.len(),
            "Creating launch configuration"
        );

        self.client
            .create_launch_configuration()
            .launch_configuration_name(&request.name)
            .image_id(&request.image_id)
            .instance_type(&request.instance_type)
            .ebs_optimized(request.ebs_optimized)
            .set_user_data(request.user_data.clone())
            .instance_monitoring(
                InstanceMonitoring::builder()
                    .enabled(request.monitoring_enabled)
                    .build(),
            )
            .set_iam_instance_profile(request.iam_instance_profile.clone())
            .set_placement_tenancy(request.placement_tenancy.clone())
            .set_associate_public_ip_address(request.associate_public_ip_address)
            .set_key_name(request.key_name.clone())
            .set_spot_price(request.spot_price.clone())
            .set_security_groups(non_empty(&request.security_groups))
            .set_classic_link_vpc_id(request.classic_link_vpc_id.clone())
            .set_classic_link_vpc_security_groups(non_empty(
                &request.classic_link_vpc_security_groups,
            ))
            .set_block_device_mappings((!mappings.is_empty()).then_some(mappings))
            .send()
            .await
            .map_err(|e| classify_sdk_error(&e))?;

        Ok(())
    }

    async fn describe_launch_configuration(
        &self,
        name: &str,
    ) -> Result<Vec<LaunchConfigurationDescription>, AwsError> {
        debug!(name = %name, "Describing launch configuration");

        let response = self
            .client
            .describe_launch_configurations()
            .launch_configuration_names(name)
            .send()
            .await
            .map_err(|e| classify_sdk_error(&e))?;

        Ok(response
            .launch_configurations()
            .iter()
            .map(from_sdk_launch_configuration)
            .collect())
    }

    async fn delete_launch_configuration(&self, name: &str) -> Result<(), AwsError> {
        debug!(name = %name, "Deleting launch configuration");

        self.client
            .delete_launch_configuration()
            .launch_configuration_name(name)
            .send()
            .await
            .map_err(|e| classify_sdk_error(&e))?;

        Ok(())
    }
}

fn non_empty(values: &[String]) -> Option<Vec<String>> {
    (!values.is_empty()).then(|| values.to_vec())
}

fn to_sdk_mapping(mapping: &DeviceMapping) -> Result<BlockDeviceMapping, AwsError> {
    BlockDeviceMapping::builder()
        .device_name(&mapping.device_name)
        .set_virtual_name(mapping.virtual_name.clone())
        .set_no_device(mapping.no_device)
        .set_ebs(mapping.ebs.as_ref().map(to_sdk_ebs))
        .build()
        .map_err(|e| AwsError::Sdk {
            code: None,
            message: format!("invalid block device mapping {}: {e}", mapping.device_name),
        })
}

fn to_sdk_ebs(ebs: &EbsSpec) -> Ebs {
    Ebs::builder()
        .set_delete_on_termination(ebs.delete_on_termination)
        .set_encrypted(ebs.encrypted)
        .set_iops(ebs.iops)
        .set_snapshot_id(ebs.snapshot_id.clone())
        .set_volume_size(ebs.volume_size)
        .set_volume_type(ebs.volume_type.clone())
        .build()
}

fn from_sdk_mapping(mapping: &BlockDeviceMapping) -> DeviceMapping {
    DeviceMapping {
        device_name: mapping.device_name().to_string(),
        virtual_name: mapping.virtual_name().map(str::to_string),
        no_device: mapping.no_device(),
        ebs: mapping.ebs().map(|ebs| EbsSpec {
            delete_on_termination: ebs.delete_on_termination(),
            encrypted: ebs.encrypted(),
            iops: ebs.iops(),
            snapshot_id: ebs.snapshot_id().map(str::to_string),
            volume_size: ebs.volume_size(),
            volume_type: ebs.volume_type().map(str::to_string),
        }),
    }
}

fn from_sdk_launch_configuration(lc: &LaunchConfiguration) -> LaunchConfigurationDescription {
    LaunchConfigurationDescription {
        name: lc.launch_configuration_name().to_string(),
        image_id: lc.image_id().to_string(),
        instance_type: lc.instance_type().to_string(),
        key_name: lc.key_name().map(str::to_string),
        iam_instance_profile: lc.iam_instance_profile().map(str::to_string),
        ebs_optimized: lc.ebs_optimized(),
        spot_price: lc.spot_price().map(str::to_string),
        monitoring_enabled: lc.instance_monitoring().and_then(|m| m.enabled()),
        associate_public_ip_address: lc.associate_public_ip_address(),
        placement_tenancy: lc.placement_tenancy().map(str::to_string),
        security_groups: lc.security_groups().to_vec(),
        classic_link_vpc_id: lc.classic_link_vpc_id().map(str::to_string),
        classic_link_vpc_security_groups: lc.classic_link_vpc_security_groups().to_vec(),
        block_device_mappings: lc.block_device_mappings().iter().map(from_sdk_mapping).collect(),
    }
}
