//! Shared test utilities for launchconf
//!
//! This crate provides common test helpers that can be used across
//! multiple test modules without circular dependencies.
//!
//! ## Modules
//!
//! - [`aws`]: AWS region detection and unique test resource names
//! - [`fakes`]: In-memory Auto Scaling and EC2 implementations

pub mod aws;
pub mod fakes;

// Re-export commonly used items
pub use aws::{get_test_region, test_launch_configuration_name};
pub use fakes::{FakeAutoscaling, FakeImages, fast_retry_settings};
