//! Block-device mapping translation
//!
//! Converts between the attribute forms (consolidated `block_device_mapping`
//! and the legacy `ebs_block_device` / `ephemeral_block_device` /
//! `root_block_device` trio) and the request/response mappings. All functions
//! are pure: the image's root-device name is looked up by the caller and
//! passed in.

use crate::aws::types::{DeviceMapping, EbsSpec};
use crate::resource::error::ResourceError;
use crate::resource::non_empty;
use launchconf_common::{
    BlockDeviceMapping, EbsBlockDevice, EbsVolume, EphemeralBlockDevice, RootBlockDevice,
};
use std::collections::BTreeSet;

/// The legacy block-device attributes read back from a launch configuration
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LegacyBlockDevices {
    pub ebs: BTreeSet<EbsBlockDevice>,
    pub ephemeral: BTreeSet<EphemeralBlockDevice>,
    pub root: Option<RootBlockDevice>,
}

/// Request form of an EBS volume.
///
/// Zero sizes, non-positive iops and empty strings are left unset;
/// `encrypted` is only sent when true.
pub fn expand_ebs(volume: &EbsVolume) -> EbsSpec {
    EbsSpec {
        delete_on_termination: Some(volume.delete_on_termination),
        encrypted: volume.encrypted.filter(|&e| e),
        iops: volume.iops.filter(|&iops| iops > 0),
        snapshot_id: non_empty(&volume.snapshot_id).map(str::to_string),
        volume_size: volume.volume_size.filter(|&size| size != 0),
        volume_type: non_empty(&volume.volume_type).map(str::to_string),
    }
}

fn flatten_ebs(ebs: &EbsSpec) -> EbsVolume {
    EbsVolume {
        delete_on_termination: ebs.delete_on_termination.unwrap_or(true),
        iops: ebs.iops,
        snapshot_id: ebs.snapshot_id.clone(),
        volume_size: ebs.volume_size,
        volume_type: ebs.volume_type.clone(),
        encrypted: ebs.encrypted,
    }
}

/// Whether expanding `mappings` needs the image's root-device name
pub fn needs_root_device_name(mappings: &BTreeSet<BlockDeviceMapping>) -> bool {
    mappings
        .iter()
        .any(|m| m.is_root() && m.device_name.as_deref().is_none_or(str::is_empty))
}

/// Request form of the consolidated `block_device_mapping` attribute.
///
/// An explicit non-empty `device_name` always wins; otherwise an entry
/// flagged `is_root_device` takes the image's root-device name.
pub fn expand_block_device_mappings(
    mappings: &BTreeSet<BlockDeviceMapping>,
    image_id: &str,
    root_device_name: Option<&str>,
) -> Result<Vec<DeviceMapping>, ResourceError> {
    mappings
        .iter()
        .map(|mapping| {
            let device_name = match non_empty(&mapping.device_name) {
                Some(name) => name.to_string(),
                None if mapping.is_root() => root_device_name
                    .map(str::to_string)
                    .ok_or_else(|| ResourceError::MissingRootDeviceName(image_id.to_string()))?,
                None => return Err(ResourceError::MissingDeviceName),
            };

            Ok(DeviceMapping {
                device_name,
                virtual_name: non_empty(&mapping.virtual_name).map(str::to_string),
                no_device: mapping.no_device,
                ebs: mapping.ebs.as_ref().map(expand_ebs),
            })
        })
        .collect()
}

/// Request form of the legacy block-device attributes.
///
/// Order: EBS devices, then ephemeral devices, then the root device. A
/// missing root-device name only matters when `root` is set; for the EBS
/// check it is treated as empty.
pub fn expand_legacy_block_devices(
    ebs: &BTreeSet<EbsBlockDevice>,
    ephemeral: &BTreeSet<EphemeralBlockDevice>,
    root: Option<&RootBlockDevice>,
    image_id: &str,
    root_device_name: Option<&str>,
) -> Result<Vec<DeviceMapping>, ResourceError> {
    let root_name = root_device_name.unwrap_or_default();
    let mut out = Vec::with_capacity(ebs.len() + ephemeral.len() + 1);

    for device in ebs {
        if device.device_name == root_name {
            return Err(ResourceError::RootDeclaredAsEbs(root_name.to_string()));
        }
        out.push(DeviceMapping {
            device_name: device.device_name.clone(),
            ebs: Some(expand_ebs(&device.volume())),
            ..Default::default()
        });
    }

    for device in ephemeral {
        out.push(DeviceMapping {
            device_name: device.device_name.clone(),
            virtual_name: Some(device.virtual_name.clone()),
            ..Default::default()
        });
    }

    if let Some(root) = root {
        let Some(name) = root_device_name else {
            return Err(ResourceError::MissingRootDeviceName(image_id.to_string()));
        };
        out.push(DeviceMapping {
            device_name: name.to_string(),
            ebs: Some(expand_ebs(&root.volume())),
            ..Default::default()
        });
    }

    Ok(out)
}

/// Consolidated attribute form of returned mappings
pub fn flatten_block_device_mappings(
    mappings: &[DeviceMapping],
    root_device_name: Option<&str>,
) -> BTreeSet<BlockDeviceMapping> {
    mappings
        .iter()
        .map(|m| BlockDeviceMapping {
            device_name: Some(m.device_name.clone()),
            virtual_name: m.virtual_name.clone(),
            no_device: m.no_device,
            is_root_device: Some(root_device_name == Some(m.device_name.as_str())),
            ebs: m.ebs.as_ref().map(flatten_ebs),
        })
        .collect()
}

/// Legacy attribute form of returned mappings.
///
/// The mapping named like the root device becomes `root` and is excluded
/// from the other lists. No-device entries have no legacy form.
pub fn split_legacy_block_devices(
    mappings: &[DeviceMapping],
    root_device_name: Option<&str>,
) -> LegacyBlockDevices {
    let mut legacy = LegacyBlockDevices::default();

    for mapping in mappings {
        let volume = mapping.ebs.as_ref().map(flatten_ebs).unwrap_or_default();

        if root_device_name == Some(mapping.device_name.as_str()) {
            legacy.root = Some(RootBlockDevice {
                delete_on_termination: volume.delete_on_termination,
                iops: volume.iops,
                volume_size: volume.volume_size,
                volume_type: volume.volume_type,
            });
        } else if let Some(virtual_name) = &mapping.virtual_name {
            legacy.ephemeral.insert(EphemeralBlockDevice {
                device_name: mapping.device_name.clone(),
                virtual_name: virtual_name.clone(),
            });
        } else if mapping.no_device != Some(true) {
            legacy.ebs.insert(EbsBlockDevice {
                device_name: mapping.device_name.clone(),
                delete_on_termination: volume.delete_on_termination,
                iops: volume.iops,
                snapshot_id: volume.snapshot_id,
                volume_size: volume.volume_size,
                volume_type: volume.volume_type,
                encrypted: volume.encrypted,
            });
        }
    }

    legacy
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    const ROOT: &str = "/dev/xvda";

    fn ebs_device(name: &str, size: i32) -> EbsBlockDevice {
        EbsBlockDevice {
            device_name: name.into(),
            delete_on_termination: true,
            iops: None,
            snapshot_id: None,
            volume_size: Some(size),
            volume_type: Some("gp3".into()),
            encrypted: None,
        }
    }

    #[test]
    fn zero_values_are_omitted() {
        let spec = expand_ebs(&EbsVolume {
            delete_on_termination: false,
            iops: Some(0),
            snapshot_id: Some(String::new()),
            volume_size: Some(0),
            volume_type: Some(String::new()),
            encrypted: Some(false),
        });

        assert_eq!(
            spec,
            EbsSpec {
                delete_on_termination: Some(false),
                ..Default::default()
            }
        );
    }

    #[test]
    fn negative_iops_are_omitted() {
        let spec = expand_ebs(&EbsVolume {
            iops: Some(-1),
            ..Default::default()
        });
        assert_eq!(spec.iops, None);
        assert_eq!(spec.delete_on_termination, Some(true));
    }

    #[test]
    fn root_flag_takes_image_root_name() {
        let mut mappings = BTreeSet::new();
        mappings.insert(BlockDeviceMapping {
            is_root_device: Some(true),
            ebs: Some(EbsVolume {
                volume_size: Some(30),
                ..Default::default()
            }),
            ..Default::default()
        });

        assert!(needs_root_device_name(&mappings));
        let out = expand_block_device_mappings(&mappings, "ami-1", Some(ROOT)).unwrap();
        assert_eq!(out[0].device_name, ROOT);
        assert_eq!(out[0].ebs.as_ref().unwrap().volume_size, Some(30));
    }

    #[test]
    fn explicit_device_name_wins_over_root_flag() {
        let mut mappings = BTreeSet::new();
        mappings.insert(BlockDeviceMapping {
            device_name: Some("/dev/sda1".into()),
            is_root_device: Some(true),
            ..Default::default()
        });

        assert!(!needs_root_device_name(&mappings));
        let out = expand_block_device_mappings(&mappings, "ami-1", Some(ROOT)).unwrap();
        assert_eq!(out[0].device_name, "/dev/sda1");
    }

    #[test]
    fn root_flag_without_image_root_is_an_error() {
        let mut mappings = BTreeSet::new();
        mappings.insert(BlockDeviceMapping {
            is_root_device: Some(true),
            ..Default::default()
        });

        let err = expand_block_device_mappings(&mappings, "ami-1", None).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Expected to find a Root Device name for AMI (ami-1), but got none"
        );
    }

    #[test]
    fn unnamed_mapping_is_an_error() {
        let mut mappings = BTreeSet::new();
        mappings.insert(BlockDeviceMapping {
            virtual_name: Some("ephemeral0".into()),
            ..Default::default()
        });

        let err = expand_block_device_mappings(&mappings, "ami-1", Some(ROOT)).unwrap_err();
        assert!(matches!(err, ResourceError::MissingDeviceName));
    }

    #[test]
    fn legacy_order_is_ebs_ephemeral_root() {
        let ebs = BTreeSet::from([ebs_device("/dev/sdb", 10)]);
        let ephemeral = BTreeSet::from([EphemeralBlockDevice {
            device_name: "/dev/sdc".into(),
            virtual_name: "ephemeral0".into(),
        }]);
        let root = RootBlockDevice {
            volume_size: Some(40),
            ..Default::default()
        };

        let out =
            expand_legacy_block_devices(&ebs, &ephemeral, Some(&root), "ami-1", Some(ROOT))
                .unwrap();
        let names: Vec<_> = out.iter().map(|m| m.device_name.as_str()).collect();
        assert_eq!(names, vec!["/dev/sdb", "/dev/sdc", ROOT]);
        assert_eq!(out[1].virtual_name.as_deref(), Some("ephemeral0"));
        assert!(out[1].ebs.is_none());
        assert_eq!(out[2].ebs.as_ref().unwrap().volume_size, Some(40));
    }

    #[test]
    fn ebs_device_on_root_name_is_rejected() {
        let ebs = BTreeSet::from([ebs_device(ROOT, 10)]);
        let err = expand_legacy_block_devices(&ebs, &BTreeSet::new(), None, "ami-1", Some(ROOT))
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            "Root device (/dev/xvda) declared as an 'ebs_block_device'.  Use 'root_block_device' keyword."
        );
    }

    #[test]
    fn legacy_root_without_image_root_is_an_error() {
        let root = RootBlockDevice::default();
        let err = expand_legacy_block_devices(
            &BTreeSet::new(),
            &BTreeSet::new(),
            Some(&root),
            "ami-1",
            None,
        )
        .unwrap_err();
        assert!(matches!(err, ResourceError::MissingRootDeviceName(ref ami) if ami == "ami-1"));
    }

    #[test]
    fn legacy_ebs_without_image_root_is_accepted() {
        let ebs = BTreeSet::from([ebs_device("/dev/sdb", 10)]);
        let out =
            expand_legacy_block_devices(&ebs, &BTreeSet::new(), None, "ami-1", None).unwrap();
        assert_eq!(out.len(), 1);
    }

    #[test]
    fn split_skips_no_device_entries() {
        let mappings = vec![DeviceMapping {
            device_name: "/dev/sdd".into(),
            no_device: Some(true),
            ..Default::default()
        }];
        assert_eq!(
            split_legacy_block_devices(&mappings, Some(ROOT)),
            LegacyBlockDevices::default()
        );
    }

    #[test]
    fn flatten_without_root_name_marks_nothing_root() {
        let mappings = vec![DeviceMapping {
            device_name: ROOT.into(),
            ebs: Some(EbsSpec::default()),
            ..Default::default()
        }];
        let flat = flatten_block_device_mappings(&mappings, None);
        assert_eq!(flat.iter().next().unwrap().is_root_device, Some(false));
    }

    fn ebs_volume() -> impl Strategy<Value = EbsVolume> {
        (
            any::<bool>(),
            prop::option::of(100..3000i32),
            prop::option::of("snap-[0-9a-f]{8}"),
            prop::option::of(1..2000i32),
            prop::option::of(prop::sample::select(vec!["gp2", "gp3", "io1"])),
            prop::option::of(Just(true)),
        )
            .prop_map(
                |(delete_on_termination, iops, snapshot_id, volume_size, volume_type, encrypted)| {
                    EbsVolume {
                        delete_on_termination,
                        iops,
                        snapshot_id,
                        volume_size,
                        volume_type: volume_type.map(str::to_string),
                        encrypted,
                    }
                },
            )
    }

    fn legacy_ebs() -> impl Strategy<Value = EbsBlockDevice> {
        ("/dev/sd[b-m]", ebs_volume()).prop_map(|(device_name, v)| EbsBlockDevice {
            device_name,
            delete_on_termination: v.delete_on_termination,
            iops: v.iops,
            snapshot_id: v.snapshot_id,
            volume_size: v.volume_size,
            volume_type: v.volume_type,
            encrypted: v.encrypted,
        })
    }

    fn legacy_ephemeral() -> impl Strategy<Value = EphemeralBlockDevice> {
        ("/dev/sd[n-z]", "ephemeral[0-3]").prop_map(|(device_name, virtual_name)| {
            EphemeralBlockDevice {
                device_name,
                virtual_name,
            }
        })
    }

    fn legacy_root() -> impl Strategy<Value = RootBlockDevice> {
        ebs_volume().prop_map(|v| RootBlockDevice {
            delete_on_termination: v.delete_on_termination,
            iops: v.iops,
            volume_size: v.volume_size,
            volume_type: v.volume_type,
        })
    }

    fn consolidated() -> impl Strategy<Value = BlockDeviceMapping> {
        (prop::sample::select(vec![ROOT, "/dev/sdb", "/dev/sdc", "/dev/sdf"]), ebs_volume())
            .prop_map(|(name, ebs)| BlockDeviceMapping {
                device_name: Some(name.to_string()),
                virtual_name: None,
                no_device: None,
                is_root_device: Some(name == ROOT),
                ebs: Some(ebs),
            })
    }

    proptest! {
        #[test]
        fn legacy_round_trip_preserves_devices(
            ebs in prop::collection::btree_set(legacy_ebs(), 0..4),
            ephemeral in prop::collection::btree_set(legacy_ephemeral(), 0..4),
            root in prop::option::of(legacy_root()),
        ) {
            let out = expand_legacy_block_devices(&ebs, &ephemeral, root.as_ref(), "ami-1", Some(ROOT))
                .unwrap();
            let legacy = split_legacy_block_devices(&out, Some(ROOT));

            prop_assert_eq!(legacy.ebs, ebs);
            prop_assert_eq!(legacy.ephemeral, ephemeral);
            prop_assert_eq!(legacy.root, root);
        }

        #[test]
        fn consolidated_round_trip_preserves_devices(
            mappings in prop::collection::btree_set(consolidated(), 0..5),
        ) {
            let out = expand_block_device_mappings(&mappings, "ami-1", Some(ROOT)).unwrap();
            prop_assert_eq!(flatten_block_device_mappings(&out, Some(ROOT)), mappings);
        }

        #[test]
        fn root_named_device_is_always_root(
            others in prop::collection::vec(("/dev/sd[b-z]", prop::option::of("ephemeral[0-3]")), 0..5),
            root_ebs in ebs_volume(),
        ) {
            let mut mappings: Vec<DeviceMapping> = others
                .into_iter()
                .map(|(device_name, virtual_name)| DeviceMapping {
                    ebs: virtual_name.is_none().then(EbsSpec::default),
                    device_name,
                    virtual_name,
                    no_device: None,
                })
                .collect();
            mappings.push(DeviceMapping {
                device_name: ROOT.into(),
                ebs: Some(expand_ebs(&root_ebs)),
                ..Default::default()
            });

            let legacy = split_legacy_block_devices(&mappings, Some(ROOT));
            prop_assert!(legacy.root.is_some());
            prop_assert!(legacy.ebs.iter().all(|d| d.device_name != ROOT));
            prop_assert!(legacy.ephemeral.iter().all(|d| d.device_name != ROOT));

            let flat = flatten_block_device_mappings(&mappings, Some(ROOT));
            for mapping in flat {
                let is_root = mapping.device_name.as_deref() == Some(ROOT);
                prop_assert_eq!(mapping.is_root_device, Some(is_root));
            }
        }

        #[test]
        fn zero_numerics_never_sent(size in -5..5i32, iops in -5..5i32) {
            let spec = expand_ebs(&EbsVolume {
                volume_size: Some(size),
                iops: Some(iops),
                ..Default::default()
            });
            prop_assert_eq!(spec.volume_size.is_some(), size != 0);
            prop_assert_eq!(spec.iops.is_some(), iops > 0);
        }
    }
}
