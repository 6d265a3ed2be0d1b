//! launchconf-common - Shared types for the launch configuration resource
//!
//! This crate holds everything that does not need the AWS SDK: the attribute
//! model, the declarative schema, validation, and the small helpers used to
//! derive request values from configuration.
//!
//! ## Modules
//!
//! - [`defaults`]: Default configuration values and limits
//! - [`model`]: Launch configuration attributes and block-device records
//! - [`naming`]: Launch configuration name generation
//! - [`schema`]: Declarative attribute schema
//! - [`user_data`]: User data encoding and state digest
//! - [`validation`]: Synchronous attribute validation

pub mod defaults;
pub mod model;
pub mod naming;
pub mod schema;
pub mod user_data;
pub mod validation;

// Re-export commonly used types
pub use model::{
    BlockDeviceKind, BlockDeviceMapping, EbsBlockDevice, EbsVolume, EphemeralBlockDevice,
    LaunchConfigurationAttributes, RootBlockDevice,
};
pub use schema::{AttributeKind, AttributeSchema, ResourceSchema, launch_configuration_schema};
pub use validation::{ValidationError, validate};
