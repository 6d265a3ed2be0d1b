//! Declarative schema for the launch configuration resource
//!
//! The schema is data only: the host uses it to print the resource shape,
//! to warn about deprecated attributes and to derive conflict rules.

use crate::defaults::{MAX_NAME_LENGTH, MAX_USER_DATA_LENGTH};
use crate::model::LaunchConfigurationAttributes;
use crate::naming::UNIQUE_ID_SUFFIX_LENGTH;
use serde::Serialize;

/// Message attached to the three legacy block-device attributes
pub const LEGACY_BLOCK_DEVICE_DEPRECATION: &str = "Use 'block_device_mapping' instead.";

/// Value shape of an attribute
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, strum::Display, strum::AsRefStr)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum AttributeKind {
    String,
    Bool,
    Int,
    /// Unordered set of strings
    StringSet,
    /// Unordered set of nested blocks
    BlockSet,
    /// Ordered list of nested blocks
    BlockList,
}

/// Schema for a single attribute
#[derive(Debug, Clone, Serialize)]
pub struct AttributeSchema {
    pub name: &'static str,
    pub kind: AttributeKind,
    pub required: bool,
    pub computed: bool,
    pub force_new: bool,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub conflicts_with: Vec<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deprecated: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub length: Option<(usize, usize)>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_items: Option<usize>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub block: Vec<AttributeSchema>,
}

impl AttributeSchema {
    /// Start an optional attribute; every attribute of this resource forces replacement
    pub fn new(name: &'static str, kind: AttributeKind) -> Self {
        Self {
            name,
            kind,
            required: false,
            computed: false,
            force_new: true,
            conflicts_with: Vec::new(),
            deprecated: None,
            default: None,
            length: None,
            max_items: None,
            block: Vec::new(),
        }
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub fn computed(mut self) -> Self {
        self.computed = true;
        self
    }

    /// Mark a container attribute whose members (not the container) force replacement
    pub fn not_force_new(mut self) -> Self {
        self.force_new = false;
        self
    }

    pub fn conflicts_with(mut self, others: &[&'static str]) -> Self {
        self.conflicts_with.extend_from_slice(others);
        self
    }

    pub fn deprecated(mut self, message: &'static str) -> Self {
        self.deprecated = Some(message);
        self
    }

    pub fn default_value(mut self, value: &'static str) -> Self {
        self.default = Some(value);
        self
    }

    /// Inclusive length bounds for string values
    pub fn length(mut self, min: usize, max: usize) -> Self {
        self.length = Some((min, max));
        self
    }

    pub fn max_items(mut self, max: usize) -> Self {
        self.max_items = Some(max);
        self
    }

    /// Attach the nested block schema for set/list-of-block attributes
    pub fn block(mut self, attributes: Vec<AttributeSchema>) -> Self {
        self.block = attributes;
        self
    }
}

/// Schema of a whole resource
#[derive(Debug, Clone, Serialize)]
pub struct ResourceSchema {
    pub type_name: &'static str,
    pub importable: bool,
    pub attributes: Vec<AttributeSchema>,
}

impl ResourceSchema {
    pub fn new(type_name: &'static str) -> Self {
        Self {
            type_name,
            importable: false,
            attributes: Vec::new(),
        }
    }

    pub fn importable(mut self) -> Self {
        self.importable = true;
        self
    }

    pub fn attribute(mut self, attribute: AttributeSchema) -> Self {
        self.attributes.push(attribute);
        self
    }

    /// Look up a top-level attribute by name
    pub fn get(&self, name: &str) -> Option<&AttributeSchema> {
        self.attributes.iter().find(|a| a.name == name)
    }

    /// Names of deprecated attributes that `attrs` populates
    pub fn deprecated_in_use(&self, attrs: &LaunchConfigurationAttributes) -> Vec<&'static str> {
        self.attributes
            .iter()
            .filter(|a| a.deprecated.is_some() && attrs.is_set(a.name))
            .map(|a| a.name)
            .collect()
    }

    /// Every pair of attributes declared as conflicting, each pair reported once
    pub fn conflict_pairs(&self) -> Vec<(&'static str, &'static str)> {
        let mut pairs: Vec<(&'static str, &'static str)> = Vec::new();
        for attribute in &self.attributes {
            for other in &attribute.conflicts_with {
                let pair = if attribute.name <= *other {
                    (attribute.name, *other)
                } else {
                    (*other, attribute.name)
                };
                if !pairs.contains(&pair) {
                    pairs.push(pair);
                }
            }
        }
        pairs
    }
}

fn ebs_volume_block(with_device_name: bool, with_snapshot: bool) -> Vec<AttributeSchema> {
    let mut block = Vec::new();
    if with_device_name {
        block.push(AttributeSchema::new("device_name", AttributeKind::String).required());
    }
    block.push(
        AttributeSchema::new("delete_on_termination", AttributeKind::Bool).default_value("true"),
    );
    block.push(AttributeSchema::new("iops", AttributeKind::Int).computed());
    if with_snapshot {
        block.push(AttributeSchema::new("snapshot_id", AttributeKind::String).computed());
    }
    block.push(AttributeSchema::new("volume_size", AttributeKind::Int).computed());
    block.push(AttributeSchema::new("volume_type", AttributeKind::String).computed());
    if with_snapshot {
        block.push(AttributeSchema::new("encrypted", AttributeKind::Bool).computed());
    }
    block
}

/// Returns the schema for the launch configuration resource
pub fn launch_configuration_schema() -> ResourceSchema {
    use AttributeKind::*;

    ResourceSchema::new("launch_configuration")
        .importable()
        .attribute(
            AttributeSchema::new("name", String)
                .computed()
                .conflicts_with(&["name_prefix"])
                .length(1, MAX_NAME_LENGTH),
        )
        .attribute(
            AttributeSchema::new("name_prefix", String)
                .length(1, MAX_NAME_LENGTH - UNIQUE_ID_SUFFIX_LENGTH),
        )
        .attribute(AttributeSchema::new("image_id", String).required())
        .attribute(AttributeSchema::new("instance_type", String).required())
        .attribute(AttributeSchema::new("iam_instance_profile", String))
        .attribute(AttributeSchema::new("key_name", String).computed())
        .attribute(AttributeSchema::new("user_data", String).length(1, MAX_USER_DATA_LENGTH))
        .attribute(AttributeSchema::new("security_groups", StringSet))
        .attribute(AttributeSchema::new("vpc_classic_link_id", String))
        .attribute(AttributeSchema::new("vpc_classic_link_security_groups", StringSet))
        .attribute(
            AttributeSchema::new("associate_public_ip_address", Bool).default_value("false"),
        )
        .attribute(AttributeSchema::new("spot_price", String))
        .attribute(AttributeSchema::new("ebs_optimized", Bool).computed())
        .attribute(AttributeSchema::new("placement_tenancy", String))
        .attribute(AttributeSchema::new("enable_monitoring", Bool).default_value("true"))
        .attribute(
            AttributeSchema::new("block_device_mapping", BlockSet)
                .conflicts_with(&[
                    "ebs_block_device",
                    "ephemeral_block_device",
                    "root_block_device",
                ])
                .block(vec![
                    AttributeSchema::new("device_name", String),
                    AttributeSchema::new("virtual_name", String),
                    AttributeSchema::new("no_device", Bool),
                    AttributeSchema::new("is_root_device", Bool),
                    AttributeSchema::new("ebs", BlockList)
                        .max_items(1)
                        .block(ebs_volume_block(false, true)),
                ]),
        )
        .attribute(
            AttributeSchema::new("ebs_block_device", BlockSet)
                .computed()
                .not_force_new()
                .deprecated(LEGACY_BLOCK_DEVICE_DEPRECATION)
                .block(ebs_volume_block(true, true)),
        )
        .attribute(
            AttributeSchema::new("ephemeral_block_device", BlockSet)
                .deprecated(LEGACY_BLOCK_DEVICE_DEPRECATION)
                .block(vec![
                    AttributeSchema::new("device_name", String).required(),
                    AttributeSchema::new("virtual_name", String).required(),
                ]),
        )
        .attribute(
            AttributeSchema::new("root_block_device", BlockList)
                .computed()
                .not_force_new()
                .max_items(1)
                .deprecated(LEGACY_BLOCK_DEVICE_DEPRECATION)
                .block(ebs_volume_block(false, false)),
        )
}
