//! Desired-versus-recorded diff
//!
//! A launch configuration is never updated in place: any difference in a
//! compared attribute plans a replacement. Computed attributes are compared
//! only when the configuration sets them, since AWS fills them in otherwise.

use super::block_device::expand_ebs;
use super::{ResourceData, non_empty};
use launchconf_common::{
    BlockDeviceMapping, EbsBlockDevice, EbsVolume, LaunchConfigurationAttributes,
    launch_configuration_schema, user_data,
};
use std::collections::BTreeSet;
use tracing::warn;

/// What applying a configuration would do
#[derive(Debug, Clone, PartialEq, Eq, strum::Display, strum::AsRefStr)]
#[strum(serialize_all = "snake_case")]
pub enum PlanAction {
    /// No launch configuration is recorded yet
    Create,
    /// Recorded state already matches
    NoOp,
    /// Delete and recreate because these attributes differ
    Replace { attributes: Vec<&'static str> },
}

/// Diff desired attributes against the recorded resource
pub fn plan(desired: &LaunchConfigurationAttributes, prior: Option<&ResourceData>) -> PlanAction {
    for attribute in launch_configuration_schema().deprecated_in_use(desired) {
        warn!(attribute, "Deprecated attribute in use, use 'block_device_mapping' instead");
    }

    let Some(prior) = prior.filter(|p| !p.is_gone()) else {
        return PlanAction::Create;
    };
    let actual = &prior.attributes;
    let mut changed = Vec::new();

    let desired_name = non_empty(&desired.name);
    if desired_name.is_some() && desired_name != non_empty(&actual.name) {
        changed.push("name");
    }
    if non_empty(&desired.name_prefix) != non_empty(&actual.name_prefix) {
        changed.push("name_prefix");
    }
    if desired.image_id != actual.image_id {
        changed.push("image_id");
    }
    if desired.instance_type != actual.instance_type {
        changed.push("instance_type");
    }
    if non_empty(&desired.iam_instance_profile) != non_empty(&actual.iam_instance_profile) {
        changed.push("iam_instance_profile");
    }
    let desired_key_name = non_empty(&desired.key_name);
    if desired_key_name.is_some() && desired_key_name != non_empty(&actual.key_name) {
        changed.push("key_name");
    }
    let desired_user_data = non_empty(&desired.user_data).map(user_data::state_value);
    if desired_user_data.as_deref() != non_empty(&actual.user_data) {
        changed.push("user_data");
    }
    if desired.security_groups != actual.security_groups {
        changed.push("security_groups");
    }
    if non_empty(&desired.vpc_classic_link_id) != non_empty(&actual.vpc_classic_link_id) {
        changed.push("vpc_classic_link_id");
    }
    if desired.vpc_classic_link_security_groups != actual.vpc_classic_link_security_groups {
        changed.push("vpc_classic_link_security_groups");
    }
    if desired.associate_public_ip_address != actual.associate_public_ip_address {
        changed.push("associate_public_ip_address");
    }
    if non_empty(&desired.spot_price) != non_empty(&actual.spot_price) {
        changed.push("spot_price");
    }
    if desired.ebs_optimized.is_some() && desired.ebs_optimized != actual.ebs_optimized {
        changed.push("ebs_optimized");
    }
    if non_empty(&desired.placement_tenancy) != non_empty(&actual.placement_tenancy) {
        changed.push("placement_tenancy");
    }
    if desired.enable_monitoring != actual.enable_monitoring {
        changed.push("enable_monitoring");
    }

    if !desired.block_device_mapping.is_empty() {
        if !mappings_match(&desired.block_device_mapping, &actual.block_device_mapping) {
            changed.push("block_device_mapping");
        }
    } else if desired.uses_legacy_block_devices() {
        if !desired.ebs_block_device.is_empty()
            && !ebs_devices_match(&desired.ebs_block_device, &actual.ebs_block_device)
        {
            changed.push("ebs_block_device");
        }
        if desired.ephemeral_block_device != actual.ephemeral_block_device {
            changed.push("ephemeral_block_device");
        }
        if let Some(root) = &desired.root_block_device {
            let matches = actual
                .root_block_device
                .as_ref()
                .is_some_and(|a| volume_matches(&root.volume(), &a.volume()));
            if !matches {
                changed.push("root_block_device");
            }
        }
    } else if !actual.block_device_mapping.is_empty() {
        // AWS only reports mappings that were requested, so any left over
        // were dropped from the configuration
        changed.push("block_device_mapping");
    }

    if changed.is_empty() {
        PlanAction::NoOp
    } else {
        PlanAction::Replace {
            attributes: changed,
        }
    }
}

/// Whether every value the configuration sends is reflected in `actual`
fn volume_matches(desired: &EbsVolume, actual: &EbsVolume) -> bool {
    let want = expand_ebs(desired);
    want.delete_on_termination == Some(actual.delete_on_termination)
        && want.iops.is_none_or(|v| actual.iops == Some(v))
        && want.volume_size.is_none_or(|v| actual.volume_size == Some(v))
        && want
            .volume_type
            .as_ref()
            .is_none_or(|v| actual.volume_type.as_ref() == Some(v))
        && want
            .snapshot_id
            .as_ref()
            .is_none_or(|v| actual.snapshot_id.as_ref() == Some(v))
        && want.encrypted.is_none_or(|v| actual.encrypted == Some(v))
}

fn mapping_matches(desired: &BlockDeviceMapping, actual: &BlockDeviceMapping) -> bool {
    let name_matches = match non_empty(&desired.device_name) {
        Some(name) => non_empty(&actual.device_name) == Some(name),
        None => desired.is_root() && actual.is_root(),
    };
    let root_matches = !desired.is_root() || actual.is_root();
    let virtual_matches = non_empty(&desired.virtual_name)
        .is_none_or(|v| non_empty(&actual.virtual_name) == Some(v));
    let no_device_matches = desired
        .no_device
        .is_none_or(|v| actual.no_device.unwrap_or(false) == v);
    let ebs_matches = match (&desired.ebs, &actual.ebs) {
        (None, _) => true,
        (Some(want), Some(have)) => volume_matches(want, have),
        (Some(_), None) => false,
    };

    name_matches && root_matches && virtual_matches && no_device_matches && ebs_matches
}

/// Pair every desired entry with a distinct recorded entry
fn pairs_up<D, A>(
    desired: &BTreeSet<D>,
    actual: &BTreeSet<A>,
    matches: impl Fn(&D, &A) -> bool,
) -> bool {
    if desired.len() != actual.len() {
        return false;
    }
    let mut used = vec![false; actual.len()];
    desired.iter().all(|want| {
        let found = actual
            .iter()
            .enumerate()
            .find(|(i, have)| !used[*i] && matches(want, *have));
        match found {
            Some((i, _)) => {
                used[i] = true;
                true
            }
            None => false,
        }
    })
}

fn mappings_match(
    desired: &BTreeSet<BlockDeviceMapping>,
    actual: &BTreeSet<BlockDeviceMapping>,
) -> bool {
    pairs_up(desired, actual, mapping_matches)
}

fn ebs_devices_match(
    desired: &BTreeSet<EbsBlockDevice>,
    actual: &BTreeSet<EbsBlockDevice>,
) -> bool {
    pairs_up(desired, actual, |want, have| {
        want.device_name == have.device_name && volume_matches(&want.volume(), &have.volume())
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use launchconf_common::RootBlockDevice;

    fn desired() -> LaunchConfigurationAttributes {
        let mut attrs = LaunchConfigurationAttributes::new("ami-1", "t3.micro");
        attrs.name = Some("web".into());
        attrs
    }

    fn recorded(attrs: &LaunchConfigurationAttributes) -> ResourceData {
        let mut data = ResourceData::new(attrs.clone());
        data.set_id("web");
        data
    }

    #[test]
    fn nothing_recorded_plans_create() {
        assert_eq!(plan(&desired(), None), PlanAction::Create);

        let gone = ResourceData::new(desired());
        assert_eq!(plan(&desired(), Some(&gone)), PlanAction::Create);
    }

    #[test]
    fn identical_state_is_noop() {
        let attrs = desired();
        assert_eq!(plan(&attrs, Some(&recorded(&attrs))), PlanAction::NoOp);
    }

    #[test]
    fn changed_image_replaces() {
        let prior = recorded(&desired());
        let mut attrs = desired();
        attrs.image_id = "ami-2".into();
        attrs.enable_monitoring = false;

        assert_eq!(
            plan(&attrs, Some(&prior)),
            PlanAction::Replace {
                attributes: vec!["image_id", "enable_monitoring"]
            }
        );
    }

    #[test]
    fn computed_attributes_only_compared_when_configured() {
        let mut state = desired();
        state.key_name = Some("ops".into());
        state.ebs_optimized = Some(false);
        let prior = recorded(&state);

        assert_eq!(plan(&desired(), Some(&prior)), PlanAction::NoOp);

        let mut attrs = desired();
        attrs.key_name = Some("other".into());
        assert!(matches!(
            plan(&attrs, Some(&prior)),
            PlanAction::Replace { ref attributes } if attributes == &vec!["key_name"]
        ));
    }

    #[test]
    fn user_data_compared_by_digest() {
        let mut attrs = desired();
        attrs.user_data = Some("#!/bin/sh\n".into());

        let mut state = desired();
        state.user_data = Some(user_data::state_value("#!/bin/sh\n"));
        assert_eq!(plan(&attrs, Some(&recorded(&state))), PlanAction::NoOp);

        state.user_data = Some(user_data::state_value("#!/bin/bash\n"));
        assert_ne!(plan(&attrs, Some(&recorded(&state))), PlanAction::NoOp);
    }

    #[test]
    fn consolidated_mappings_ignore_values_filled_by_aws() {
        let mut attrs = desired();
        attrs.block_device_mapping.insert(BlockDeviceMapping {
            is_root_device: Some(true),
            ebs: Some(EbsVolume {
                volume_size: Some(30),
                ..Default::default()
            }),
            ..Default::default()
        });

        let mut state = desired();
        state.block_device_mapping.insert(BlockDeviceMapping {
            device_name: Some("/dev/xvda".into()),
            is_root_device: Some(true),
            ebs: Some(EbsVolume {
                volume_size: Some(30),
                volume_type: Some("gp2".into()),
                ..Default::default()
            }),
            ..Default::default()
        });
        state.root_block_device = Some(RootBlockDevice {
            volume_size: Some(30),
            volume_type: Some("gp2".into()),
            ..Default::default()
        });

        assert_eq!(plan(&attrs, Some(&recorded(&state))), PlanAction::NoOp);

        attrs.block_device_mapping.clear();
        attrs.block_device_mapping.insert(BlockDeviceMapping {
            is_root_device: Some(true),
            ebs: Some(EbsVolume {
                volume_size: Some(50),
                ..Default::default()
            }),
            ..Default::default()
        });
        assert_eq!(
            plan(&attrs, Some(&recorded(&state))),
            PlanAction::Replace {
                attributes: vec!["block_device_mapping"]
            }
        );
    }

    #[test]
    fn dropping_all_mappings_replaces() {
        let mut state = desired();
        state.block_device_mapping.insert(BlockDeviceMapping {
            device_name: Some("/dev/xvda".into()),
            is_root_device: Some(true),
            ebs: Some(EbsVolume {
                volume_size: Some(30),
                ..Default::default()
            }),
            ..Default::default()
        });
        state.root_block_device = Some(RootBlockDevice {
            volume_size: Some(30),
            ..Default::default()
        });

        assert_eq!(
            plan(&desired(), Some(&recorded(&state))),
            PlanAction::Replace {
                attributes: vec!["block_device_mapping"]
            }
        );
    }

    #[test]
    fn legacy_root_is_computed() {
        let mut state = desired();
        state.root_block_device = Some(RootBlockDevice {
            volume_size: Some(8),
            ..Default::default()
        });
        let prior = recorded(&state);

        assert_eq!(plan(&desired(), Some(&prior)), PlanAction::NoOp);

        let mut attrs = desired();
        attrs.root_block_device = Some(RootBlockDevice {
            volume_size: Some(20),
            ..Default::default()
        });
        assert_eq!(
            plan(&attrs, Some(&prior)),
            PlanAction::Replace {
                attributes: vec!["root_block_device"]
            }
        );
    }

    #[test]
    fn action_names() {
        assert_eq!(PlanAction::NoOp.to_string(), "no_op");
        assert_eq!(PlanAction::Replace { attributes: vec![] }.as_ref(), "replace");
    }
}
