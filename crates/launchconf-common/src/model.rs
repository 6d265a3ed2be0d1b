//! Launch configuration attribute model
//!
//! `LaunchConfigurationAttributes` is the record the host hands to the
//! provider. It is used both for desired configuration (parsed from the
//! user's attribute file) and for state (written back after create/read).

use crate::defaults::default_true;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// EBS volume parameters shared by the consolidated and legacy block-device forms
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EbsVolume {
    #[serde(default = "default_true")]
    pub delete_on_termination: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iops: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub snapshot_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub volume_size: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub volume_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub encrypted: Option<bool>,
}

impl Default for EbsVolume {
    fn default() -> Self {
        Self {
            delete_on_termination: true,
            iops: None,
            snapshot_id: None,
            volume_size: None,
            volume_type: None,
            encrypted: None,
        }
    }
}

/// Which storage a block-device mapping describes
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display, strum::AsRefStr)]
#[strum(serialize_all = "snake_case")]
pub enum BlockDeviceKind {
    /// EBS-backed volume
    Ebs,
    /// Instance-store (ephemeral) volume
    Ephemeral,
    /// Suppresses a device the image would otherwise attach
    NoDevice,
}

/// Consolidated block-device mapping entry (`block_device_mapping`)
#[derive(
    Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(deny_unknown_fields, default)]
pub struct BlockDeviceMapping {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub device_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub virtual_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub no_device: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_root_device: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ebs: Option<EbsVolume>,
}

impl BlockDeviceMapping {
    /// Classify the entry by which optional sub-fields are populated.
    ///
    /// Returns `None` for an entry that carries only a device name.
    pub fn kind(&self) -> Option<BlockDeviceKind> {
        if self.no_device == Some(true) {
            Some(BlockDeviceKind::NoDevice)
        } else if self.virtual_name.as_deref().is_some_and(|v| !v.is_empty()) {
            Some(BlockDeviceKind::Ephemeral)
        } else if self.ebs.is_some() {
            Some(BlockDeviceKind::Ebs)
        } else {
            None
        }
    }

    /// Whether the entry is flagged as the image's root volume
    pub fn is_root(&self) -> bool {
        self.is_root_device == Some(true)
    }
}

/// Legacy EBS block device (`ebs_block_device`)
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EbsBlockDevice {
    pub device_name: String,
    #[serde(default = "default_true")]
    pub delete_on_termination: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iops: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub snapshot_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub volume_size: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub volume_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub encrypted: Option<bool>,
}

impl EbsBlockDevice {
    /// The volume parameters of this device in consolidated form
    pub fn volume(&self) -> EbsVolume {
        EbsVolume {
            delete_on_termination: self.delete_on_termination,
            iops: self.iops,
            snapshot_id: self.snapshot_id.clone(),
            volume_size: self.volume_size,
            volume_type: self.volume_type.clone(),
            encrypted: self.encrypted,
        }
    }
}

/// Legacy instance-store block device (`ephemeral_block_device`)
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EphemeralBlockDevice {
    pub device_name: String,
    pub virtual_name: String,
}

/// Legacy root block device (`root_block_device`)
///
/// Only size, type, iops and delete-on-termination can be changed for the
/// root volume, so there is no device name, snapshot or encryption flag.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RootBlockDevice {
    #[serde(default = "default_true")]
    pub delete_on_termination: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iops: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub volume_size: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub volume_type: Option<String>,
}

impl Default for RootBlockDevice {
    fn default() -> Self {
        Self {
            delete_on_termination: true,
            iops: None,
            volume_size: None,
            volume_type: None,
        }
    }
}

impl RootBlockDevice {
    /// The volume parameters of the root device in consolidated form
    pub fn volume(&self) -> EbsVolume {
        EbsVolume {
            delete_on_termination: self.delete_on_termination,
            iops: self.iops,
            volume_size: self.volume_size,
            volume_type: self.volume_type.clone(),
            ..Default::default()
        }
    }
}

/// Launch configuration attributes
///
/// Every attribute forces replacement of the launch configuration; the
/// record is never updated in place. Length limits are checked via
/// `garde::Validate`, cross-attribute rules in [`crate::validation`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, garde::Validate)]
#[serde(deny_unknown_fields, default)]
pub struct LaunchConfigurationAttributes {
    /// Launch configuration name; generated when unset
    #[serde(skip_serializing_if = "Option::is_none")]
    #[garde(length(min = 1, max = 255))]
    pub name: Option<String>,

    /// Prefix for a generated name
    #[serde(skip_serializing_if = "Option::is_none")]
    #[garde(length(min = 1, max = 229))]
    pub name_prefix: Option<String>,

    /// AMI the instances are launched from
    #[garde(length(min = 1))]
    pub image_id: String,

    /// EC2 instance type (e.g., "t3.micro")
    #[garde(length(min = 1))]
    pub instance_type: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    #[garde(skip)]
    pub iam_instance_profile: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    #[garde(skip)]
    pub key_name: Option<String>,

    /// Raw user data in configuration, its SHA-1 digest in state
    #[serde(skip_serializing_if = "Option::is_none")]
    #[garde(length(min = 1, max = 16384))]
    pub user_data: Option<String>,

    #[serde(skip_serializing_if = "BTreeSet::is_empty")]
    #[garde(skip)]
    pub security_groups: BTreeSet<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    #[garde(skip)]
    pub vpc_classic_link_id: Option<String>,

    #[serde(skip_serializing_if = "BTreeSet::is_empty")]
    #[garde(skip)]
    pub vpc_classic_link_security_groups: BTreeSet<String>,

    #[garde(skip)]
    pub associate_public_ip_address: bool,

    #[serde(skip_serializing_if = "Option::is_none")]
    #[garde(skip)]
    pub spot_price: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    #[garde(skip)]
    pub ebs_optimized: Option<bool>,

    #[serde(skip_serializing_if = "Option::is_none")]
    #[garde(skip)]
    pub placement_tenancy: Option<String>,

    #[garde(skip)]
    pub enable_monitoring: bool,

    #[serde(skip_serializing_if = "BTreeSet::is_empty")]
    #[garde(skip)]
    pub block_device_mapping: BTreeSet<BlockDeviceMapping>,

    #[serde(skip_serializing_if = "BTreeSet::is_empty")]
    #[garde(skip)]
    pub ebs_block_device: BTreeSet<EbsBlockDevice>,

    #[serde(skip_serializing_if = "BTreeSet::is_empty")]
    #[garde(skip)]
    pub ephemeral_block_device: BTreeSet<EphemeralBlockDevice>,

    #[serde(skip_serializing_if = "Option::is_none")]
    #[garde(skip)]
    pub root_block_device: Option<RootBlockDevice>,
}

impl Default for LaunchConfigurationAttributes {
    fn default() -> Self {
        Self {
            name: None,
            name_prefix: None,
            image_id: String::new(),
            instance_type: String::new(),
            iam_instance_profile: None,
            key_name: None,
            user_data: None,
            security_groups: BTreeSet::new(),
            vpc_classic_link_id: None,
            vpc_classic_link_security_groups: BTreeSet::new(),
            associate_public_ip_address: false,
            spot_price: None,
            ebs_optimized: None,
            placement_tenancy: None,
            enable_monitoring: true,
            block_device_mapping: BTreeSet::new(),
            ebs_block_device: BTreeSet::new(),
            ephemeral_block_device: BTreeSet::new(),
            root_block_device: None,
        }
    }
}

impl LaunchConfigurationAttributes {
    /// Create attributes with the two required fields set
    pub fn new(image_id: impl Into<String>, instance_type: impl Into<String>) -> Self {
        Self {
            image_id: image_id.into(),
            instance_type: instance_type.into(),
            ..Default::default()
        }
    }

    /// Whether the named attribute holds a non-zero value.
    ///
    /// Empty strings, empty sets and `false` count as unset. Unknown names
    /// are never set.
    pub fn is_set(&self, attribute: &str) -> bool {
        fn text(v: &Option<String>) -> bool {
            v.as_deref().is_some_and(|s| !s.is_empty())
        }

        match attribute {
            "name" => text(&self.name),
            "name_prefix" => text(&self.name_prefix),
            "image_id" => !self.image_id.is_empty(),
            "instance_type" => !self.instance_type.is_empty(),
            "iam_instance_profile" => text(&self.iam_instance_profile),
            "key_name" => text(&self.key_name),
            "user_data" => text(&self.user_data),
            "security_groups" => !self.security_groups.is_empty(),
            "vpc_classic_link_id" => text(&self.vpc_classic_link_id),
            "vpc_classic_link_security_groups" => {
                !self.vpc_classic_link_security_groups.is_empty()
            }
            "associate_public_ip_address" => self.associate_public_ip_address,
            "spot_price" => text(&self.spot_price),
            "ebs_optimized" => self.ebs_optimized == Some(true),
            "placement_tenancy" => text(&self.placement_tenancy),
            "enable_monitoring" => self.enable_monitoring,
            "block_device_mapping" => !self.block_device_mapping.is_empty(),
            "ebs_block_device" => !self.ebs_block_device.is_empty(),
            "ephemeral_block_device" => !self.ephemeral_block_device.is_empty(),
            "root_block_device" => self.root_block_device.is_some(),
            _ => false,
        }
    }

    /// Whether any of the deprecated block-device attributes is populated
    pub fn uses_legacy_block_devices(&self) -> bool {
        !self.ebs_block_device.is_empty()
            || !self.ephemeral_block_device.is_empty()
            || self.root_block_device.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_schema() {
        let attrs = LaunchConfigurationAttributes::default();
        assert!(attrs.enable_monitoring);
        assert!(!attrs.associate_public_ip_address);
        assert!(attrs.ebs_optimized.is_none());
        assert!(EbsVolume::default().delete_on_termination);
        assert!(RootBlockDevice::default().delete_on_termination);
    }

    #[test]
    fn deserialize_applies_defaults() {
        let attrs: LaunchConfigurationAttributes = serde_json::from_str(
            r#"{
                "image_id": "ami-123",
                "instance_type": "t3.micro",
                "ebs_block_device": [{ "device_name": "/dev/sdb" }],
                "root_block_device": { "volume_size": 20 }
            }"#,
        )
        .unwrap();

        assert!(attrs.enable_monitoring);
        let ebs = attrs.ebs_block_device.iter().next().unwrap();
        assert!(ebs.delete_on_termination);
        assert_eq!(attrs.root_block_device.unwrap().volume_size, Some(20));
    }

    #[test]
    fn length_limits_follow_shared_constants() {
        use crate::defaults::{MAX_NAME_LENGTH, MAX_USER_DATA_LENGTH};
        use crate::naming::UNIQUE_ID_SUFFIX_LENGTH;
        use garde::Validate;

        let max_prefix = MAX_NAME_LENGTH - UNIQUE_ID_SUFFIX_LENGTH;
        let cases: [(usize, fn(&mut LaunchConfigurationAttributes, String)); 3] = [
            (MAX_NAME_LENGTH, |a, v| a.name = Some(v)),
            (max_prefix, |a, v| a.name_prefix = Some(v)),
            (MAX_USER_DATA_LENGTH, |a, v| a.user_data = Some(v)),
        ];

        for (max, set) in cases {
            let mut attrs = LaunchConfigurationAttributes::new("ami-123", "t3.micro");
            set(&mut attrs, "a".repeat(max));
            assert!(attrs.validate().is_ok(), "{max} characters should be accepted");

            set(&mut attrs, "a".repeat(max + 1));
            assert!(attrs.validate().is_err(), "{} characters should be rejected", max + 1);
        }
    }

    #[test]
    fn deserialize_rejects_unknown_fields() {
        let result: Result<LaunchConfigurationAttributes, _> = serde_json::from_str(
            r#"{ "image_id": "ami-123", "instance_type": "t3.micro", "imageid": "x" }"#,
        );
        assert!(result.is_err());
    }

    #[test]
    fn mapping_kind_by_populated_fields() {
        let ebs = BlockDeviceMapping {
            device_name: Some("/dev/sdb".into()),
            ebs: Some(EbsVolume::default()),
            ..Default::default()
        };
        assert_eq!(ebs.kind(), Some(BlockDeviceKind::Ebs));

        let ephemeral = BlockDeviceMapping {
            device_name: Some("/dev/sdc".into()),
            virtual_name: Some("ephemeral0".into()),
            ..Default::default()
        };
        assert_eq!(ephemeral.kind(), Some(BlockDeviceKind::Ephemeral));

        let none = BlockDeviceMapping {
            device_name: Some("/dev/sdd".into()),
            no_device: Some(true),
            ..Default::default()
        };
        assert_eq!(none.kind(), Some(BlockDeviceKind::NoDevice));

        let bare = BlockDeviceMapping {
            device_name: Some("/dev/sde".into()),
            ..Default::default()
        };
        assert_eq!(bare.kind(), None);
    }

    #[test]
    fn is_set_treats_zero_values_as_unset() {
        let mut attrs = LaunchConfigurationAttributes::new("ami-123", "t3.micro");
        attrs.name = Some(String::new());
        attrs.enable_monitoring = false;

        assert!(attrs.is_set("image_id"));
        assert!(!attrs.is_set("name"));
        assert!(!attrs.is_set("enable_monitoring"));
        assert!(!attrs.is_set("security_groups"));
        assert!(!attrs.is_set("no_such_attribute"));
    }

    #[test]
    fn legacy_detection() {
        let mut attrs = LaunchConfigurationAttributes::new("ami-123", "t3.micro");
        assert!(!attrs.uses_legacy_block_devices());
        attrs.root_block_device = Some(RootBlockDevice::default());
        assert!(attrs.uses_legacy_block_devices());
    }
}
