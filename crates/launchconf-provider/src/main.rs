//! launchconf: manage one AWS Auto Scaling launch configuration
//!
//! Reads desired attributes from a JSON file, keeps the managed launch
//! configuration in a local state file, and drives create, read and delete
//! calls against AWS.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use launchconf_common::defaults::{
    DEFAULT_CREATE_RETRY_TIMEOUT_SECS, DEFAULT_READ_AFTER_CREATE_TIMEOUT_SECS, DEFAULT_REGION,
    DEFAULT_STATE_FILE,
};
use launchconf_common::{LaunchConfigurationAttributes, launch_configuration_schema, validate};
use launchconf_provider::aws::{AutoscalingClient, AwsContext, AwsError, Ec2Client};
use launchconf_provider::config::{AwsConfig, ProviderConfig, RetrySettings};
use launchconf_provider::state::StateFile;
use launchconf_provider::wait::RetryConfig;
use launchconf_provider::{LaunchConfigurationResource, PlanAction, host, resource};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::info;

#[derive(Parser, Debug)]
#[command(name = "launchconf")]
#[command(about = "Manage an AWS Auto Scaling launch configuration")]
#[command(version)]
struct Args {
    #[command(flatten)]
    global: GlobalArgs,

    #[command(subcommand)]
    command: Command,
}

#[derive(clap::Args, Debug)]
struct GlobalArgs {
    /// AWS region
    #[arg(long, env = "AWS_REGION", default_value = DEFAULT_REGION, global = true)]
    region: String,

    /// AWS profile to use
    #[arg(long, env = "AWS_PROFILE", global = true)]
    aws_profile: Option<String>,

    /// Path of the state file
    #[arg(long, default_value = DEFAULT_STATE_FILE, global = true)]
    state: PathBuf,

    /// How long to retry create while an IAM instance profile propagates
    #[arg(long, default_value_t = DEFAULT_CREATE_RETRY_TIMEOUT_SECS, global = true)]
    create_timeout_secs: u64,

    /// How long to wait for a new launch configuration to become readable
    #[arg(long, default_value_t = DEFAULT_READ_AFTER_CREATE_TIMEOUT_SECS, global = true)]
    read_timeout_secs: u64,
}

impl From<&GlobalArgs> for ProviderConfig {
    fn from(args: &GlobalArgs) -> Self {
        Self {
            aws: AwsConfig {
                region: args.region.clone(),
                aws_profile: args.aws_profile.clone(),
            },
            retry: RetrySettings {
                create: RetryConfig::with_timeout(Duration::from_secs(args.create_timeout_secs)),
                read_after_create: RetryConfig::with_timeout(Duration::from_secs(
                    args.read_timeout_secs,
                )),
            },
        }
    }
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Show what apply would do, using the recorded state
    Plan {
        /// JSON file with the desired attributes
        #[arg(long)]
        config: PathBuf,
    },

    /// Create or replace the launch configuration to match the desired attributes
    Apply {
        /// JSON file with the desired attributes
        #[arg(long)]
        config: PathBuf,
    },

    /// Re-read the recorded launch configuration from AWS
    Refresh,

    /// Delete the recorded launch configuration
    Destroy,

    /// Start managing an existing launch configuration
    Import {
        /// Launch configuration name
        name: String,
    },

    /// Print the resource schema as JSON
    Schema,
}

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        print_error(&e);
        std::process::exit(1);
    }
}

/// Print error in a user-friendly way
fn print_error(e: &anyhow::Error) {
    use std::io::Write;

    let mut stderr = std::io::stderr();

    let _ = writeln!(stderr, "\n\x1b[1;31mError:\x1b[0m {e}");

    let mut source = e.source();
    while let Some(cause) = source {
        let _ = writeln!(stderr, "  \x1b[33mCaused by:\x1b[0m {cause}");
        source = cause.source();
    }

    if let Some(hint) = e
        .chain()
        .find_map(|cause| cause.downcast_ref::<AwsError>())
        .and_then(AwsError::suggestion)
    {
        let _ = writeln!(stderr, "\n\x1b[36mHint:\x1b[0m {hint}");
    }

    if std::env::var("RUST_BACKTRACE").is_err() {
        let _ = writeln!(
            stderr,
            "\n\x1b[2mSet RUST_BACKTRACE=1 for a detailed backtrace\x1b[0m"
        );
    } else {
        let backtrace = e.backtrace();
        if backtrace.status() == std::backtrace::BacktraceStatus::Captured {
            let _ = writeln!(stderr, "\n\x1b[2mBacktrace:\x1b[0m\n{backtrace}");
        }
    }
}

fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        tracing_subscriber::EnvFilter::new(
            "info,aws_config=warn,aws_smithy_runtime=warn,aws_sdk_autoscaling=warn,aws_sdk_ec2=warn",
        )
    });

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

async fn load_attributes(path: &Path) -> Result<LaunchConfigurationAttributes> {
    let contents = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("Failed to read {}", path.display()))?;
    let attrs: LaunchConfigurationAttributes = serde_json::from_str(&contents)
        .with_context(|| format!("Failed to parse attributes in {}", path.display()))?;
    validate(&attrs).with_context(|| format!("Invalid attributes in {}", path.display()))?;
    Ok(attrs)
}

async fn connect(
    config: &ProviderConfig,
) -> LaunchConfigurationResource<AutoscalingClient, Ec2Client> {
    if let Some(profile) = &config.aws.aws_profile {
        info!(profile = %profile, "Using AWS profile");
    }
    let aws =
        AwsContext::with_profile(&config.aws.region, config.aws.aws_profile.as_deref()).await;
    LaunchConfigurationResource::from_context(&aws, config.retry.clone())
}

fn print_plan(action: &PlanAction) {
    match action {
        PlanAction::Create => println!("launch configuration will be created"),
        PlanAction::NoOp => println!("launch configuration is up to date"),
        PlanAction::Replace { attributes } => {
            println!("launch configuration will be replaced; changed attributes:");
            for attribute in attributes {
                println!("  - {attribute}");
            }
        }
    }
}

async fn run() -> Result<()> {
    let args = Args::parse();
    init_tracing();

    let config = ProviderConfig::from(&args.global);
    let state_path = args.global.state.as_path();

    match args.command {
        Command::Schema => {
            let schema = launch_configuration_schema();
            println!("{}", serde_json::to_string_pretty(&schema)?);
        }

        Command::Plan { config: path } => {
            let desired = load_attributes(&path).await?;
            let state = StateFile::load(state_path).await?;
            print_plan(&resource::plan(&desired, state.resource.as_ref()));
        }

        Command::Apply { config: path } => {
            let desired = load_attributes(&path).await?;
            let mut state = StateFile::load(state_path).await?;
            let lifecycle = connect(&config).await;

            let result = host::apply(&lifecycle, desired, &mut state).await;
            state.save(state_path).await?;
            let action = result?;

            print_plan(&action);
            if let Some(data) = &state.resource {
                println!("id: {}", data.id());
            }
        }

        Command::Refresh => {
            let mut state = StateFile::load(state_path).await?;
            let lifecycle = connect(&config).await;

            let result = host::refresh(&lifecycle, &mut state).await;
            state.save(state_path).await?;
            result?;

            match &state.resource {
                Some(data) => println!("{}", serde_json::to_string_pretty(data)?),
                None => println!("no launch configuration recorded"),
            }
        }

        Command::Destroy => {
            let mut state = StateFile::load(state_path).await?;
            let lifecycle = connect(&config).await;

            let result = host::destroy(&lifecycle, &mut state).await;
            state.save(state_path).await?;
            result?;
        }

        Command::Import { name } => {
            let mut state = StateFile::load(state_path).await?;
            let lifecycle = connect(&config).await;

            host::import(&lifecycle, &name, &mut state).await?;
            state.save(state_path).await?;
            println!("imported {name}");
        }
    }

    Ok(())
}
