//! SDK-free request and response shapes
//!
//! The block-device translator and the lifecycle functions work on these
//! types so they can be exercised without the AWS SDK. The client wrappers
//! in [`super::autoscaling`] and [`super::ec2`] convert to and from SDK types.

/// EBS parameters of a block-device mapping as sent to / returned by AWS
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EbsSpec {
    pub delete_on_termination: Option<bool>,
    pub encrypted: Option<bool>,
    pub iops: Option<i32>,
    pub snapshot_id: Option<String>,
    pub volume_size: Option<i32>,
    pub volume_type: Option<String>,
}

/// One block-device mapping entry of a launch configuration
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeviceMapping {
    pub device_name: String,
    pub virtual_name: Option<String>,
    pub no_device: Option<bool>,
    pub ebs: Option<EbsSpec>,
}

/// Parameters of a CreateLaunchConfiguration call
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LaunchConfigurationRequest {
    pub name: String,
    pub image_id: String,
    pub instance_type: String,
    pub ebs_optimized: bool,
    /// Base64-encoded user data
    pub user_data: Option<String>,
    pub monitoring_enabled: bool,
    pub iam_instance_profile: Option<String>,
    pub placement_tenancy: Option<String>,
    /// Only sent when `Some(true)`
    pub associate_public_ip_address: Option<bool>,
    pub key_name: Option<String>,
    pub spot_price: Option<String>,
    pub security_groups: Vec<String>,
    pub classic_link_vpc_id: Option<String>,
    pub classic_link_vpc_security_groups: Vec<String>,
    pub block_device_mappings: Vec<DeviceMapping>,
}

/// A launch configuration as returned by DescribeLaunchConfigurations
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LaunchConfigurationDescription {
    pub name: String,
    pub image_id: String,
    pub instance_type: String,
    pub key_name: Option<String>,
    pub iam_instance_profile: Option<String>,
    pub ebs_optimized: Option<bool>,
    pub spot_price: Option<String>,
    pub monitoring_enabled: Option<bool>,
    pub associate_public_ip_address: Option<bool>,
    pub placement_tenancy: Option<String>,
    pub security_groups: Vec<String>,
    pub classic_link_vpc_id: Option<String>,
    pub classic_link_vpc_security_groups: Vec<String>,
    pub block_device_mappings: Vec<DeviceMapping>,
}

impl From<&LaunchConfigurationRequest> for LaunchConfigurationDescription {
    fn from(request: &LaunchConfigurationRequest) -> Self {
        Self {
            name: request.name.clone(),
            image_id: request.image_id.clone(),
            instance_type: request.instance_type.clone(),
            key_name: request.key_name.clone(),
            iam_instance_profile: request.iam_instance_profile.clone(),
            ebs_optimized: Some(request.ebs_optimized),
            spot_price: request.spot_price.clone(),
            monitoring_enabled: Some(request.monitoring_enabled),
            associate_public_ip_address: request.associate_public_ip_address,
            placement_tenancy: request.placement_tenancy.clone(),
            security_groups: request.security_groups.clone(),
            classic_link_vpc_id: request.classic_link_vpc_id.clone(),
            classic_link_vpc_security_groups: request.classic_link_vpc_security_groups.clone(),
            block_device_mappings: request.block_device_mappings.clone(),
        }
    }
}

/// The parts of an EC2 image needed to resolve its root device
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImageDescription {
    pub image_id: String,
    pub root_device_name: Option<String>,
    /// Root device type is `instance-store`
    pub instance_store_backed: bool,
    /// Device names of the image's block-device mappings, in API order
    pub mapping_device_names: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn description_from_request_mirrors_sent_fields() {
        let request = LaunchConfigurationRequest {
            name: "web".into(),
            image_id: "ami-123".into(),
            instance_type: "t3.micro".into(),
            monitoring_enabled: true,
            security_groups: vec!["sg-1".into()],
            ..Default::default()
        };

        let description = LaunchConfigurationDescription::from(&request);
        assert_eq!(description.name, "web");
        assert_eq!(description.ebs_optimized, Some(false));
        assert_eq!(description.monitoring_enabled, Some(true));
        assert_eq!(description.associate_public_ip_address, None);
        assert_eq!(description.security_groups, vec!["sg-1".to_string()]);
    }
}
