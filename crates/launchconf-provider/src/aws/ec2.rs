//! EC2 image lookup for root-device resolution

use crate::aws::context::AwsContext;
use crate::aws::error::{AwsError, classify_sdk_error};
use crate::aws::operations::ImageOperations;
use crate::aws::types::ImageDescription;
use anyhow::{Context, Result};
use aws_sdk_ec2::{
    Client,
    types::{DeviceType, Image},
};
use tracing::debug;

/// EC2 client for image metadata
pub struct Ec2Client {
    client: Client,
}

impl Ec2Client {
    /// Create a new EC2 client (loads AWS config from environment)
    pub async fn new(region: &str) -> Self {
        let ctx = AwsContext::new(region).await;
        Self::from_context(&ctx)
    }

    /// Create an EC2 client from a pre-loaded AWS context
    pub fn from_context(ctx: &AwsContext) -> Self {
        Self {
            client: ctx.ec2_client(),
        }
    }
}

impl ImageOperations for Ec2Client {
    async fn describe_image(&self, image_id: &str) -> Result<Option<ImageDescription>, AwsError> {
        debug!(image_id = %image_id, "Describing image");

        let response = match self.client.describe_images().image_ids(image_id).send().await {
            Ok(response) => response,
            Err(e) => {
                let err = classify_sdk_error(&e);
                if err.is_not_found() {
                    return Ok(None);
                }
                return Err(err);
            }
        };

        Ok(response.images().first().map(describe))
    }
}

fn describe(image: &Image) -> ImageDescription {
    ImageDescription {
        image_id: image.image_id().unwrap_or_default().to_string(),
        root_device_name: image.root_device_name().map(str::to_string),
        instance_store_backed: image.root_device_type() == Some(&DeviceType::InstanceStore),
        mapping_device_names: image
            .block_device_mappings()
            .iter()
            .filter_map(|m| m.device_name())
            .map(str::to_string)
            .collect(),
    }
}

/// Look up the root-device name of an image.
///
/// Returns `None` when the image does not exist or is instance-store backed.
/// Some images report a root-device name (e.g. `/dev/sda1`) that does not
/// appear among their own mappings (which list `/dev/xvda` instead); the
/// first mapping's device name is used in that case.
pub async fn fetch_root_device_name<I: ImageOperations>(
    images: &I,
    image_id: &str,
) -> Result<Option<String>> {
    if image_id.is_empty() {
        anyhow::bail!("Cannot fetch root device name for blank AMI ID.");
    }

    let Some(image) = images
        .describe_image(image_id)
        .await
        .with_context(|| format!("Error describing AMI ({image_id})"))?
    else {
        debug!(image_id = %image_id, "Image not found, no root device");
        return Ok(None);
    };

    if image.instance_store_backed {
        debug!(image_id = %image_id, "Instance-store image, no root device");
        return Ok(None);
    }

    match resolve_root_device_name(&image) {
        Some(name) => Ok(Some(name)),
        None => anyhow::bail!("Error finding Root Device Name for AMI ({image_id})"),
    }
}

/// Pick the root-device name of an EBS-backed image
fn resolve_root_device_name(image: &ImageDescription) -> Option<String> {
    let listed = image
        .root_device_name
        .as_ref()
        .is_some_and(|root| image.mapping_device_names.contains(root));

    match image.mapping_device_names.first() {
        Some(first) if !listed => Some(first.clone()),
        _ => image.root_device_name.clone(),
    }
}
