//! Host-side commands driving a [`ResourceLifecycle`]
//!
//! These mirror what a provisioning host does with a resource: refresh the
//! recorded state, diff it against the configuration, and create, replace
//! or destroy accordingly. The caller persists the [`StateFile`] afterwards,
//! including after a failure, so partial progress is kept.

use crate::resource::{PlanAction, ResourceData, ResourceLifecycle, plan};
use crate::state::StateFile;
use anyhow::{Context, Result};
use launchconf_common::LaunchConfigurationAttributes;
use tracing::info;

/// Re-read the recorded resource, dropping it when it no longer exists
pub async fn refresh<L: ResourceLifecycle>(lifecycle: &L, state: &mut StateFile) -> Result<()> {
    let Some(mut data) = state.resource.take() else {
        return Ok(());
    };

    let result = lifecycle.read(&mut data).await;
    if !data.is_gone() {
        state.resource = Some(data);
    }
    result
}

/// Bring the remote launch configuration in line with `desired`.
///
/// Refreshes first, then creates, leaves alone, or replaces
/// (delete, then create) according to [`plan`]. A launch configuration that
/// was created but failed a later step is still recorded in `state`.
pub async fn apply<L: ResourceLifecycle>(
    lifecycle: &L,
    desired: LaunchConfigurationAttributes,
    state: &mut StateFile,
) -> Result<PlanAction> {
    refresh(lifecycle, state)
        .await
        .context("Failed to refresh recorded launch configuration")?;

    let action = plan(&desired, state.resource.as_ref());
    match &action {
        PlanAction::NoOp => {
            info!("Launch configuration is up to date");
            return Ok(action);
        }
        PlanAction::Replace { attributes } => {
            info!(attributes = ?attributes, "Replacing launch configuration");
            destroy(lifecycle, state).await?;
        }
        PlanAction::Create => {}
    }

    let mut data = ResourceData::new(desired);
    let result = lifecycle.create(&mut data).await;
    if !data.is_gone() {
        state.resource = Some(data);
    }
    result.map(|()| action)
}

/// Delete the recorded resource, if any
pub async fn destroy<L: ResourceLifecycle>(lifecycle: &L, state: &mut StateFile) -> Result<()> {
    let Some(mut data) = state.resource.take() else {
        info!("No launch configuration recorded, nothing to destroy");
        return Ok(());
    };

    if let Err(e) = lifecycle.delete(&mut data).await {
        state.resource = Some(data);
        return Err(e);
    }
    Ok(())
}

/// Start managing an existing launch configuration by name
pub async fn import<L: ResourceLifecycle>(
    lifecycle: &L,
    id: &str,
    state: &mut StateFile,
) -> Result<()> {
    if let Some(existing) = &state.resource {
        anyhow::bail!(
            "State already manages launch configuration {}; destroy it or use another state file",
            existing.id()
        );
    }

    for mut data in lifecycle.import(id)? {
        lifecycle.read(&mut data).await?;
        if data.is_gone() {
            anyhow::bail!("Cannot import non-existent launch configuration {id}");
        }
        info!(name = %data.id(), "Imported launch configuration");
        state.resource = Some(data);
    }
    Ok(())
}
