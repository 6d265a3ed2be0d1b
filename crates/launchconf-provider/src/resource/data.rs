//! The record exchanged with the provisioning host

use launchconf_common::{LaunchConfigurationAttributes, ResourceSchema};
use serde::{Deserialize, Serialize};
use std::future::Future;

/// A resource record: its remote identifier plus its attributes.
///
/// An empty id means the resource does not exist (or no longer exists).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceData {
    id: String,
    pub attributes: LaunchConfigurationAttributes,
}

impl ResourceData {
    /// A record for desired attributes that has not been created yet
    pub fn new(attributes: LaunchConfigurationAttributes) -> Self {
        Self {
            id: String::new(),
            attributes,
        }
    }

    /// A record known only by identifier, as produced by import
    pub fn from_id(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            attributes: LaunchConfigurationAttributes::default(),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn set_id(&mut self, id: impl Into<String>) {
        self.id = id.into();
    }

    /// Mark the record as gone so the host drops it from state
    pub fn clear_id(&mut self) {
        self.id.clear();
    }

    pub fn is_gone(&self) -> bool {
        self.id.is_empty()
    }
}

/// Lifecycle contract between a provisioning host and a resource.
///
/// Create, read and delete operate on a mutable record. Read clears the id
/// when the remote object has disappeared instead of failing.
pub trait ResourceLifecycle: Send + Sync {
    /// Schema describing the resource's attributes
    fn schema(&self) -> ResourceSchema;

    /// Create the remote object from `data.attributes` and set the id
    fn create(&self, data: &mut ResourceData) -> impl Future<Output = anyhow::Result<()>> + Send;

    /// Refresh `data.attributes` from the remote object identified by `data.id()`
    fn read(&self, data: &mut ResourceData) -> impl Future<Output = anyhow::Result<()>> + Send;

    /// Delete the remote object identified by `data.id()`
    fn delete(&self, data: &mut ResourceData) -> impl Future<Output = anyhow::Result<()>> + Send;

    /// Build records for an existing remote object; the host reads them afterwards
    fn import(&self, id: &str) -> anyhow::Result<Vec<ResourceData>>;
}
