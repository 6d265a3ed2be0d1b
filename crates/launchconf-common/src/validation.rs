//! Synchronous attribute validation
//!
//! Runs before any remote call. Length rules come from `garde`, conflict
//! rules from the resource schema.

use crate::model::{BlockDeviceKind, LaunchConfigurationAttributes};
use crate::schema::launch_configuration_schema;
use thiserror::Error;

/// Reasons a configuration is rejected before contacting the provider
#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("invalid attributes: {0}")]
    Invalid(#[from] garde::Report),

    #[error("\"{attribute}\": conflicts with {conflicting}")]
    Conflict {
        attribute: &'static str,
        conflicting: &'static str,
    },

    #[error("block_device_mapping ({device}): \"{field}\" cannot be combined with \"ebs\"")]
    MappingConflict { device: String, field: &'static str },
}

/// Validate desired attributes.
pub fn validate(attrs: &LaunchConfigurationAttributes) -> Result<(), ValidationError> {
    garde::Validate::validate(attrs)?;

    for (attribute, conflicting) in launch_configuration_schema().conflict_pairs() {
        if attrs.is_set(attribute) && attrs.is_set(conflicting) {
            return Err(ValidationError::Conflict {
                attribute,
                conflicting,
            });
        }
    }

    for mapping in &attrs.block_device_mapping {
        if mapping.ebs.is_none() {
            continue;
        }
        let field = match mapping.kind() {
            Some(BlockDeviceKind::Ephemeral) => "virtual_name",
            Some(BlockDeviceKind::NoDevice) => "no_device",
            _ => continue,
        };
        return Err(ValidationError::MappingConflict {
            device: mapping.device_name.clone().unwrap_or_default(),
            field,
        });
    }

    Ok(())
}
