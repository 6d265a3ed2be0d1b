//! In-memory fakes of the AWS operation traits
//!
//! Both fakes are cheap to clone and share their state, so a test can hand
//! one clone to the resource and inspect the other afterwards.

use launchconf_provider::aws::{
    AwsError, ImageDescription, ImageOperations, LaunchConfigurationDescription,
    LaunchConfigurationOperations, LaunchConfigurationRequest, classify_aws_error,
};
use launchconf_provider::config::RetrySettings;
use launchconf_provider::wait::RetryConfig;
use std::collections::{BTreeMap, HashMap, VecDeque};
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Short retry windows so failing tests finish quickly
pub fn fast_retry_settings(create: Duration, read_after_create: Duration) -> RetrySettings {
    let fast = |timeout| RetryConfig {
        initial_delay: Duration::from_millis(5),
        max_delay: Duration::from_millis(20),
        timeout,
        jitter: false,
    };
    RetrySettings {
        create: fast(create),
        read_after_create: fast(read_after_create),
    }
}

/// An AWS error as the SDK error classification would produce it
pub fn aws_error(code: &str, message: &str) -> AwsError {
    classify_aws_error(Some(code), Some(message))
}

/// The create error Auto Scaling returns while an instance profile propagates
pub fn iam_propagation_error() -> AwsError {
    aws_error(
        "ValidationError",
        "Invalid IamInstanceProfile: launchconf-test-profile",
    )
}

#[derive(Default)]
struct AutoscalingState {
    launch_configurations: BTreeMap<String, LaunchConfigurationDescription>,
    requests: Vec<LaunchConfigurationRequest>,
    create_errors: VecDeque<AwsError>,
    describe_errors: VecDeque<AwsError>,
    delete_errors: VecDeque<AwsError>,
    hidden_reads: u32,
    described_name: Option<String>,
    create_calls: u32,
    describe_calls: u32,
    delete_calls: u32,
}

/// In-memory Auto Scaling launch configuration store
#[derive(Clone, Default)]
pub struct FakeAutoscaling {
    state: Arc<Mutex<AutoscalingState>>,
}

impl FakeAutoscaling {
    pub fn new() -> Self {
        Self::default()
    }

    fn with_state<T>(&self, f: impl FnOnce(&mut AutoscalingState) -> T) -> T {
        let mut state = self.state.lock().expect("fake state lock poisoned");
        f(&mut state)
    }

    /// Seed an existing launch configuration
    pub fn insert(&self, description: LaunchConfigurationDescription) {
        self.with_state(|s| {
            s.launch_configurations
                .insert(description.name.clone(), description);
        });
    }

    pub fn get(&self, name: &str) -> Option<LaunchConfigurationDescription> {
        self.with_state(|s| s.launch_configurations.get(name).cloned())
    }

    /// Delete a launch configuration behind the resource's back
    pub fn remove(&self, name: &str) -> Option<LaunchConfigurationDescription> {
        self.with_state(|s| s.launch_configurations.remove(name))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Every create request received, in order
    pub fn requests(&self) -> Vec<LaunchConfigurationRequest> {
        self.with_state(|s| s.requests.clone())
    }

    /// Fail the next create call with `error`; calls queue up
    pub fn fail_next_create(&self, error: AwsError) {
        self.with_state(|s| s.create_errors.push_back(error));
    }

    /// Fail the next describe call with `error`; calls queue up
    pub fn fail_next_describe(&self, error: AwsError) {
        self.with_state(|s| s.describe_errors.push_back(error));
    }

    /// Fail the next delete call with `error`; calls queue up
    pub fn fail_next_delete(&self, error: AwsError) {
        self.with_state(|s| s.delete_errors.push_back(error));
    }

    /// Answer the next `count` describe calls with an empty result
    pub fn hide_next_reads(&self, count: u32) {
        self.with_state(|s| s.hidden_reads = count);
    }

    /// Report every described launch configuration under `name`
    pub fn describe_as(&self, name: impl Into<String>) {
        let name = name.into();
        self.with_state(|s| s.described_name = Some(name));
    }

    pub fn create_calls(&self) -> u32 {
        self.with_state(|s| s.create_calls)
    }

    pub fn describe_calls(&self) -> u32 {
        self.with_state(|s| s.describe_calls)
    }

    pub fn delete_calls(&self) -> u32 {
        self.with_state(|s| s.delete_calls)
    }
}

impl LaunchConfigurationOperations for FakeAutoscaling {
    async fn create_launch_configuration(
        &self,
        request: &LaunchConfigurationRequest,
    ) -> Result<(), AwsError> {
        self.with_state(|s| {
            s.create_calls += 1;
            s.requests.push(request.clone());
            if let Some(error) = s.create_errors.pop_front() {
                return Err(error);
            }
            if s.launch_configurations.contains_key(&request.name) {
                return Err(aws_error(
                    "AlreadyExists",
                    &format!("Launch Configuration by this name already exists - {}", request.name),
                ));
            }
            s.launch_configurations.insert(
                request.name.clone(),
                LaunchConfigurationDescription::from(request),
            );
            Ok(())
        })
    }

    async fn describe_launch_configuration(
        &self,
        name: &str,
    ) -> Result<Vec<LaunchConfigurationDescription>, AwsError> {
        self.with_state(|s| {
            s.describe_calls += 1;
            if let Some(error) = s.describe_errors.pop_front() {
                return Err(error);
            }
            if s.hidden_reads > 0 {
                s.hidden_reads -= 1;
                return Ok(Vec::new());
            }
            let found = s.launch_configurations.get(name).cloned().map(|mut lc| {
                if let Some(described) = &s.described_name {
                    lc.name = described.clone();
                }
                lc
            });
            Ok(found.into_iter().collect())
        })
    }

    async fn delete_launch_configuration(&self, name: &str) -> Result<(), AwsError> {
        self.with_state(|s| {
            s.delete_calls += 1;
            if let Some(error) = s.delete_errors.pop_front() {
                return Err(error);
            }
            match s.launch_configurations.remove(name) {
                Some(_) => Ok(()),
                None => Err(aws_error(
                    "InvalidConfiguration.NotFound",
                    &format!("Launch configuration name not found - {name}"),
                )),
            }
        })
    }
}

#[derive(Default)]
struct ImageState {
    images: HashMap<String, ImageDescription>,
    describe_calls: u32,
}

/// In-memory EC2 image catalog
#[derive(Clone, Default)]
pub struct FakeImages {
    state: Arc<Mutex<ImageState>>,
}

impl FakeImages {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an EBS-backed image whose root device is listed in its mappings
    pub fn with_ebs_image(self, image_id: &str, root_device_name: &str) -> Self {
        self.with_image(ImageDescription {
            image_id: image_id.to_string(),
            root_device_name: Some(root_device_name.to_string()),
            instance_store_backed: false,
            mapping_device_names: vec![root_device_name.to_string()],
        })
    }

    /// Register an instance-store backed image
    pub fn with_instance_store_image(self, image_id: &str) -> Self {
        self.with_image(ImageDescription {
            image_id: image_id.to_string(),
            root_device_name: Some("/dev/sda1".to_string()),
            instance_store_backed: true,
            mapping_device_names: Vec::new(),
        })
    }

    pub fn with_image(self, image: ImageDescription) -> Self {
        self.state
            .lock()
            .expect("fake state lock poisoned")
            .images
            .insert(image.image_id.clone(), image);
        self
    }

    pub fn describe_calls(&self) -> u32 {
        self.state.lock().expect("fake state lock poisoned").describe_calls
    }
}

impl ImageOperations for FakeImages {
    async fn describe_image(&self, image_id: &str) -> Result<Option<ImageDescription>, AwsError> {
        let mut state = self.state.lock().expect("fake state lock poisoned");
        state.describe_calls += 1;
        Ok(state.images.get(image_id).cloned())
    }
}
