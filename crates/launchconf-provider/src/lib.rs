//! launchconf-provider - Auto Scaling launch configuration resource
//!
//! This crate provides the resource lifecycle (create, read, delete, import)
//! for an AWS Auto Scaling launch configuration, the AWS client wrappers it
//! runs on, and the host-side commands used by the `launchconf` binary.

pub mod aws;
pub mod config;
pub mod host;
pub mod resource;
pub mod state;
pub mod wait;

pub use resource::{LaunchConfigurationResource, PlanAction, ResourceData, ResourceLifecycle};
