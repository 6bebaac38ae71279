//! webstack: deploy and tear down a basic AWS web-application stack

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use tracing::info;
use uuid::Uuid;
use webstack_common::defaults::*;
use webstack_deployer::aws::{
    AwsContext, AwsStack, FromAwsContext, classify_anyhow_error, get_current_account_id,
};
use webstack_deployer::config::{
    AwsConfig, ComputeConfig, LoadBalancingConfig, NetworkConfig, NotificationConfig,
    ScalingConfig, StackConfig, StorageConfig,
};
use webstack_deployer::orchestrator::{self, DeployOutputs, TeardownTargets};
use webstack_deployer::state::{self, StateRecorder};

/// AWS SDK crates are capped at `warn` unless `RUST_LOG` says otherwise
const DEFAULT_LOG_FILTER: &str = "info,aws_config=warn,aws_smithy_runtime=warn,\
aws_smithy_runtime_api=warn,aws_sdk_s3=warn,aws_sdk_ec2=warn,\
aws_sdk_elasticloadbalancingv2=warn,aws_sdk_autoscaling=warn,aws_sdk_sns=warn,aws_sdk_sts=warn";

#[derive(Parser, Debug)]
#[command(name = "webstack")]
#[command(about = "Provision and tear down a basic AWS web-application stack")]
#[command(version)]
struct Args {
    #[command(subcommand)]
    command: Command,
}

#[derive(clap::Args, Debug)]
struct DeployArgs {
    /// AWS region
    #[arg(long, env = "WEBSTACK_REGION", default_value = DEFAULT_REGION)]
    region: String,

    /// AWS profile to use (overrides AWS_PROFILE env var)
    #[arg(long, env = "WEBSTACK_AWS_PROFILE")]
    aws_profile: Option<String>,

    /// S3 bucket name (must be globally unique)
    #[arg(long, env = "WEBSTACK_BUCKET_NAME", default_value = DEFAULT_BUCKET_NAME)]
    bucket_name: String,

    /// AMI for the web server and the auto-scaling group
    #[arg(long, env = "WEBSTACK_IMAGE_ID", default_value = DEFAULT_IMAGE_ID)]
    image_id: String,

    #[arg(long, env = "WEBSTACK_INSTANCE_TYPE", default_value = DEFAULT_INSTANCE_TYPE)]
    instance_type: String,

    /// EC2 key pair name
    #[arg(long, env = "WEBSTACK_KEY_NAME", default_value = DEFAULT_KEY_NAME)]
    key_name: String,

    /// Security group of the web server instance
    #[arg(long, env = "WEBSTACK_SECURITY_GROUP_ID", default_value = DEFAULT_SECURITY_GROUP_ID)]
    security_group_id: String,

    /// Security group of the load balancer
    #[arg(
        long,
        env = "WEBSTACK_LOAD_BALANCER_SECURITY_GROUP_ID",
        default_value = DEFAULT_LOAD_BALANCER_SECURITY_GROUP_ID
    )]
    load_balancer_security_group_id: String,

    /// Comma-separated subnet IDs (at least two availability zones)
    #[arg(long, env = "WEBSTACK_SUBNET_IDS", value_delimiter = ',')]
    subnet_ids: Vec<String>,

    #[arg(long, env = "WEBSTACK_VPC_ID", default_value = DEFAULT_VPC_ID)]
    vpc_id: String,

    #[arg(long, env = "WEBSTACK_LOAD_BALANCER_NAME", default_value = DEFAULT_LOAD_BALANCER_NAME)]
    load_balancer_name: String,

    #[arg(long, env = "WEBSTACK_TARGET_GROUP_NAME", default_value = DEFAULT_TARGET_GROUP_NAME)]
    target_group_name: String,

    #[arg(long, env = "WEBSTACK_ASG_NAME", default_value = DEFAULT_ASG_NAME)]
    asg_name: String,

    #[arg(long, env = "WEBSTACK_TOPIC_NAME", default_value = DEFAULT_TOPIC_NAME)]
    topic_name: String,

    /// Address subscribed to the alert topic
    #[arg(long, env = "WEBSTACK_ALERT_EMAIL", default_value = DEFAULT_ALERT_EMAIL)]
    alert_email: String,

    /// Write the teardown record as JSON to this file
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Don't record the deployment in the local state database
    #[arg(long)]
    no_state: bool,
}

impl From<DeployArgs> for StackConfig {
    fn from(args: DeployArgs) -> Self {
        let defaults = StackConfig::default();
        let subnet_ids = if args.subnet_ids.is_empty() {
            default_subnet_ids()
        } else {
            args.subnet_ids
        };

        Self {
            aws: AwsConfig {
                region: args.region,
                aws_profile: args.aws_profile,
            },
            storage: StorageConfig {
                bucket_name: args.bucket_name,
            },
            compute: ComputeConfig {
                image_id: args.image_id,
                instance_type: args.instance_type,
                key_name: args.key_name,
                ..defaults.compute
            },
            network: NetworkConfig {
                security_group_id: args.security_group_id,
                load_balancer_security_group_id: args.load_balancer_security_group_id,
                subnet_ids,
                vpc_id: args.vpc_id,
            },
            load_balancing: LoadBalancingConfig {
                load_balancer_name: args.load_balancer_name,
                target_group_name: args.target_group_name,
                ..defaults.load_balancing
            },
            scaling: ScalingConfig {
                asg_name: args.asg_name,
                ..defaults.scaling
            },
            notification: NotificationConfig {
                topic_name: args.topic_name,
                alert_email: args.alert_email,
            },
        }
    }
}

#[derive(clap::Args, Debug)]
struct TeardownArgs {
    /// AWS region (defaults to the recorded region, then us-east-1)
    #[arg(long, env = "WEBSTACK_REGION")]
    region: Option<String>,

    #[arg(long, env = "WEBSTACK_AWS_PROFILE")]
    aws_profile: Option<String>,

    /// Tear down a deployment recorded in the state database
    #[arg(long, conflicts_with = "from_file")]
    deployment_id: Option<String>,

    /// Tear down from a JSON record written by `deploy --output`
    #[arg(long)]
    from_file: Option<PathBuf>,

    #[command(flatten)]
    explicit: ExplicitTargets,

    /// Don't update the local state database
    #[arg(long, conflicts_with = "deployment_id")]
    no_state: bool,
}

/// Identifiers given directly on the command line; all or none
#[derive(clap::Args, Debug, Default)]
struct ExplicitTargets {
    #[arg(long)]
    asg_name: Option<String>,

    #[arg(long)]
    load_balancer_arn: Option<String>,

    #[arg(long)]
    target_group_arn: Option<String>,

    /// Instance to terminate (repeatable)
    #[arg(long = "instance-id")]
    instance_ids: Vec<String>,

    #[arg(long)]
    bucket_name: Option<String>,

    #[arg(long)]
    topic_arn: Option<String>,
}

impl ExplicitTargets {
    fn is_empty(&self) -> bool {
        self.asg_name.is_none()
            && self.load_balancer_arn.is_none()
            && self.target_group_arn.is_none()
            && self.instance_ids.is_empty()
            && self.bucket_name.is_none()
            && self.topic_arn.is_none()
    }

    fn into_targets(self) -> Result<TeardownTargets> {
        let mut missing = Vec::new();
        if self.asg_name.is_none() {
            missing.push("--asg-name");
        }
        if self.load_balancer_arn.is_none() {
            missing.push("--load-balancer-arn");
        }
        if self.target_group_arn.is_none() {
            missing.push("--target-group-arn");
        }
        if self.instance_ids.is_empty() {
            missing.push("--instance-id");
        }
        if self.bucket_name.is_none() {
            missing.push("--bucket-name");
        }
        if self.topic_arn.is_none() {
            missing.push("--topic-arn");
        }
        if !missing.is_empty() {
            bail!(
                "Explicit teardown needs every identifier; missing {}",
                missing.join(", ")
            );
        }

        Ok(TeardownTargets {
            asg_name: self.asg_name,
            load_balancer_arn: self.load_balancer_arn,
            target_group_arn: self.target_group_arn,
            instance_ids: self.instance_ids,
            bucket_name: self.bucket_name,
            topic_arn: self.topic_arn,
        })
    }
}

/// Where the teardown identifiers come from
#[derive(Debug, PartialEq)]
enum TargetSource {
    Deployment(String),
    File(PathBuf),
    Explicit(TeardownTargets),
}

impl TeardownArgs {
    fn target_source(&mut self) -> Result<TargetSource> {
        let explicit = std::mem::take(&mut self.explicit);
        let sources = [
            self.deployment_id.is_some(),
            self.from_file.is_some(),
            !explicit.is_empty(),
        ]
        .into_iter()
        .filter(|given| *given)
        .count();

        if sources != 1 {
            bail!(
                "Specify exactly one of --deployment-id, --from-file or the explicit identifiers"
            );
        }

        if let Some(id) = self.deployment_id.take() {
            return Ok(TargetSource::Deployment(id));
        }
        if let Some(path) = self.from_file.take() {
            return Ok(TargetSource::File(path));
        }
        Ok(TargetSource::Explicit(explicit.into_targets()?))
    }
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Provision the full stack
    Deploy(Box<DeployArgs>),

    /// Delete a previously deployed stack
    Teardown(Box<TeardownArgs>),

    /// Inspect the local state database
    State {
        #[command(subcommand)]
        action: StateAction,
    },
}

#[derive(Subcommand, Debug)]
enum StateAction {
    /// List tracked resources that have not been deleted
    List,
    /// List recorded deployments
    Deployments,
    /// Remove records older than 30 days
    Prune,
}

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        print_error(&e);
        std::process::exit(1);
    }
}

/// Print the error, its cause chain and a hint for well-known AWS errors
fn print_error(e: &anyhow::Error) {
    use std::io::Write;

    let mut stderr = std::io::stderr();

    let _ = writeln!(stderr, "\n\x1b[1;31mError:\x1b[0m {e}");

    let mut source = e.source();
    while let Some(cause) = source {
        let _ = writeln!(stderr, "  \x1b[33mCaused by:\x1b[0m {cause}");
        source = cause.source();
    }

    if let Some(suggestion) = classify_anyhow_error(e).and_then(|aws| aws.suggestion()) {
        let _ = writeln!(stderr, "\n\x1b[36mHint:\x1b[0m {suggestion}");
    }
}

async fn run() -> Result<()> {
    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(DEFAULT_LOG_FILTER)),
        )
        .init();

    match args.command {
        Command::Deploy(deploy_args) => handle_deploy(*deploy_args).await,
        Command::Teardown(teardown_args) => handle_teardown(*teardown_args).await,
        Command::State { action } => handle_state(action).await,
    }
}

async fn handle_deploy(args: DeployArgs) -> Result<()> {
    let output = args.output.clone();
    let no_state = args.no_state;
    let config: StackConfig = args.into();

    if let Some(profile) = &config.aws.aws_profile {
        info!(profile = %profile, "Using AWS profile");
    }
    let aws = AwsContext::with_profile(config.region(), config.aws.aws_profile.as_deref()).await;

    let deployment_id = Uuid::new_v4().to_string();
    let recorder = if no_state {
        StateRecorder::detached()
    } else {
        let account_id = get_current_account_id(&aws).await?;
        let pool = state::open_db().await?;
        StateRecorder::for_deployment(pool, &deployment_id, account_id, config.region())
    };

    let ops = AwsStack::from_context(&aws);
    let outputs = orchestrator::deploy(&ops, &config, &deployment_id, &recorder).await?;
    let mut targets = TeardownTargets::from_deployment(&config, &deployment_id, &outputs);
    if recorder.is_detached() {
        targets.deployment_id = None;
    }

    if let Some(path) = &output {
        write_targets(path, &targets)?;
        println!("Teardown record written to {}", path.display());
    }

    print_summary(&deployment_id, &outputs, recorder.is_detached());
    Ok(())
}

fn print_summary(deployment_id: &str, outputs: &DeployOutputs, detached: bool) {
    println!();
    println!("Deployment ID:      {deployment_id}");
    println!("Load balancer ARN:  {}", outputs.load_balancer_arn);
    println!("Target group ARN:   {}", outputs.target_group_arn);
    println!("Instance IDs:       {}", outputs.instance_ids.join(", "));
    println!("SNS topic ARN:      {}", outputs.topic_arn);
    if !detached {
        println!("\nTear down with: webstack teardown --deployment-id {deployment_id}");
    }
}

fn write_targets(path: &Path, targets: &TeardownTargets) -> Result<()> {
    let json = serde_json::to_string_pretty(targets)?;
    std::fs::write(path, json)
        .with_context(|| format!("Failed to write teardown record to {}", path.display()))
}

fn read_targets(path: &Path) -> Result<TeardownTargets> {
    let json = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read teardown record {}", path.display()))?;
    serde_json::from_str(&json)
        .with_context(|| format!("Invalid teardown record {}", path.display()))
}

async fn handle_teardown(mut args: TeardownArgs) -> Result<()> {
    let source = args.target_source()?;

    let (targets, recorder, recorded_region) = match source {
        TargetSource::Deployment(deployment_id) => {
            let pool = state::open_db().await?;
            let deployment = state::get_deployment(&pool, &deployment_id)
                .await?
                .with_context(|| format!("No recorded deployment {deployment_id}"))?;
            let resources = state::get_deployment_resources(&pool, &deployment_id).await?;
            let targets = TeardownTargets::from_resources(&resources);
            if targets.is_empty() {
                bail!("Deployment {deployment_id} has no live resources");
            }
            let recorder = StateRecorder::for_teardown(pool, Some(deployment_id));
            (targets, recorder, Some(deployment.region))
        }
        TargetSource::File(path) => {
            let targets = read_targets(&path)?;
            let recorder = file_recorder(args.no_state, targets.deployment_id.clone()).await?;
            (targets, recorder, None)
        }
        TargetSource::Explicit(targets) => {
            (targets, file_recorder(args.no_state, None).await?, None)
        }
    };

    let region = resolve_region(args.region, targets.region.clone(), recorded_region);
    let aws = AwsContext::with_profile(&region, args.aws_profile.as_deref()).await;

    let ops = AwsStack::from_context(&aws);
    orchestrator::teardown(&ops, &targets, &recorder).await?;

    println!("\nTeardown complete.");
    Ok(())
}

/// Recorder for a teardown driven by a JSON record or explicit identifiers.
/// A record carrying its deployment id moves that deployment to `torn-down`.
async fn file_recorder(no_state: bool, deployment_id: Option<String>) -> Result<StateRecorder> {
    if no_state {
        return Ok(StateRecorder::detached());
    }
    Ok(StateRecorder::for_teardown(state::open_db().await?, deployment_id))
}

/// `--region`, then the record's region, then the recorded deployment's,
/// then the default
fn resolve_region(
    flag: Option<String>,
    record: Option<String>,
    recorded_deployment: Option<String>,
) -> String {
    flag.or(record)
        .or(recorded_deployment)
        .unwrap_or_else(|| DEFAULT_REGION.to_string())
}

async fn handle_state(action: StateAction) -> Result<()> {
    let pool = state::open_db().await?;

    match action {
        StateAction::List => state::list_resources(&pool).await,
        StateAction::Deployments => state::list_deployments_table(&pool).await,
        StateAction::Prune => state::prune_database(&pool).await.map(|_| ()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    fn teardown_args(argv: &[&str]) -> TeardownArgs {
        let mut full = vec!["webstack", "teardown"];
        full.extend_from_slice(argv);
        let args = Args::try_parse_from(full).unwrap();
        match args.command {
            Command::Teardown(args) => *args,
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn cli_definition_is_valid() {
        Args::command().debug_assert();
    }

    #[test]
    fn deploy_defaults_match_stack_defaults() {
        let args = Args::try_parse_from(["webstack", "deploy"]).unwrap();
        let Command::Deploy(deploy_args) = args.command else {
            panic!("expected deploy");
        };
        let config: StackConfig = (*deploy_args).into();

        let expected = StackConfig::default();
        assert_eq!(config.storage, expected.storage);
        assert_eq!(config.compute, expected.compute);
        assert_eq!(config.scaling, expected.scaling);
        assert_eq!(config.network, expected.network);
    }

    #[test]
    fn deploy_flags_override_defaults() {
        let args = Args::try_parse_from([
            "webstack",
            "deploy",
            "--bucket-name",
            "my-bucket",
            "--subnet-ids",
            "subnet-a,subnet-b,subnet-c",
            "--alert-email",
            "ops@example.org",
            "--load-balancer-security-group-id",
            "sg-lb",
        ])
        .unwrap();
        let Command::Deploy(deploy_args) = args.command else {
            panic!("expected deploy");
        };
        let config: StackConfig = (*deploy_args).into();

        assert_eq!(config.storage.bucket_name, "my-bucket");
        assert_eq!(
            config.network.subnet_ids,
            vec!["subnet-a", "subnet-b", "subnet-c"]
        );
        assert_eq!(config.notification.alert_email, "ops@example.org");
        assert_eq!(config.load_balancer().security_group_ids, vec!["sg-lb"]);
        assert_eq!(config.network.security_group_id, DEFAULT_SECURITY_GROUP_ID);
        assert_eq!(config.compute.user_data, DEFAULT_USER_DATA);
    }

    #[test]
    fn teardown_by_deployment_id() {
        let mut args = teardown_args(&["--deployment-id", "dep-1"]);
        assert_eq!(
            args.target_source().unwrap(),
            TargetSource::Deployment("dep-1".to_string())
        );
    }

    #[test]
    fn teardown_from_file() {
        let mut args = teardown_args(&["--from-file", "stack.json"]);
        assert_eq!(
            args.target_source().unwrap(),
            TargetSource::File(PathBuf::from("stack.json"))
        );
    }

    #[test]
    fn teardown_with_every_explicit_identifier() {
        let mut args = teardown_args(&[
            "--asg-name",
            "webstack-asg",
            "--load-balancer-arn",
            "arn:lb:1",
            "--target-group-arn",
            "arn:tg:1",
            "--instance-id",
            "i-1",
            "--instance-id",
            "i-2",
            "--bucket-name",
            "bucket",
            "--topic-arn",
            "arn:topic:1",
        ]);

        let TargetSource::Explicit(targets) = args.target_source().unwrap() else {
            panic!("expected explicit targets");
        };
        assert_eq!(
            targets,
            TeardownTargets::new(
                "webstack-asg",
                "arn:lb:1",
                "arn:tg:1",
                vec!["i-1".to_string(), "i-2".to_string()],
                "bucket",
                "arn:topic:1",
            )
        );
    }

    #[test]
    fn teardown_rejects_partial_explicit_identifiers() {
        let mut args = teardown_args(&["--asg-name", "webstack-asg", "--topic-arn", "arn:t"]);
        let err = args.target_source().unwrap_err().to_string();
        assert!(err.contains("--load-balancer-arn"));
        assert!(err.contains("--instance-id"));
    }

    #[test]
    fn teardown_rejects_mixed_sources() {
        let mut args = teardown_args(&["--deployment-id", "dep-1", "--bucket-name", "b"]);
        assert!(args.target_source().is_err());

        let mut args = teardown_args(&[]);
        assert!(args.target_source().is_err());
    }

    #[test]
    fn conflicting_flags_rejected_by_parser() {
        assert!(
            Args::try_parse_from([
                "webstack",
                "teardown",
                "--deployment-id",
                "dep-1",
                "--from-file",
                "x.json"
            ])
            .is_err()
        );
    }

    #[test]
    fn teardown_record_file_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("stack.json");
        let targets = TeardownTargets::new(
            "asg",
            "arn:lb:1",
            "arn:tg:1",
            vec!["i-1234".to_string()],
            "bucket",
            "arn:topic:1",
        );

        write_targets(&path, &targets).unwrap();
        assert_eq!(read_targets(&path).unwrap(), targets);
    }

    #[test]
    fn record_region_drives_teardown() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("stack.json");

        let mut config = StackConfig::default();
        config.aws.region = "eu-west-1".to_string();
        let outputs = DeployOutputs {
            load_balancer_arn: "arn:lb:1".to_string(),
            target_group_arn: "arn:tg:1".to_string(),
            instance_ids: vec!["i-1234".to_string()],
            topic_arn: "arn:topic:1".to_string(),
        };
        write_targets(
            &path,
            &TeardownTargets::from_deployment(&config, "dep-eu", &outputs),
        )
        .unwrap();

        let record = read_targets(&path).unwrap();
        assert_eq!(record.region.as_deref(), Some("eu-west-1"));
        assert_eq!(record.deployment_id.as_deref(), Some("dep-eu"));
        assert_eq!(resolve_region(None, record.region.clone(), None), "eu-west-1");
        assert_eq!(
            resolve_region(Some("us-west-2".to_string()), record.region, None),
            "us-west-2"
        );
    }

    #[test]
    fn region_falls_back_to_recorded_then_default() {
        assert_eq!(
            resolve_region(None, None, Some("ap-south-1".to_string())),
            "ap-south-1"
        );
        assert_eq!(
            resolve_region(None, Some("eu-west-1".to_string()), Some("ap-south-1".to_string())),
            "eu-west-1"
        );
        assert_eq!(resolve_region(None, None, None), DEFAULT_REGION);
    }

    #[test]
    fn record_without_region_still_parses() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("old.json");
        std::fs::write(&path, r#"{"bucket_name":"b","instance_ids":[]}"#).unwrap();

        let record = read_targets(&path).unwrap();
        assert!(record.region.is_none());
        assert!(record.deployment_id.is_none());
    }

    #[test]
    fn unreadable_record_reports_path() {
        let err = read_targets(Path::new("/nonexistent/stack.json")).unwrap_err();
        assert!(err.to_string().contains("/nonexistent/stack.json"));
    }
}
