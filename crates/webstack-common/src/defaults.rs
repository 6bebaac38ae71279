//! Default stack parameters
//!
//! The stack is described by literal values. Every value here can be
//! overridden from the command line or a `WEBSTACK_*` environment variable.

/// Default AWS region
pub const DEFAULT_REGION: &str = "us-east-1";

/// S3 bucket holding the web application's assets
pub const DEFAULT_BUCKET_NAME: &str = "webstack-webapp-bucket";

/// AMI used for the web server (Ubuntu, so user data uses apt)
pub const DEFAULT_IMAGE_ID: &str = "ami-05134c8ef96964280";

/// EC2 instance type for the web server
pub const DEFAULT_INSTANCE_TYPE: &str = "t2.micro";

/// Existing EC2 key pair for SSH access
pub const DEFAULT_KEY_NAME: &str = "webstack-key";

/// Security group of the web server instance
pub const DEFAULT_SECURITY_GROUP_ID: &str = "sg-0ff7dc4e0c607385a";

/// Security group of the load balancer
pub const DEFAULT_LOAD_BALANCER_SECURITY_GROUP_ID: &str = "sg-123abc";

/// Two subnets in different availability zones (ALBs require two AZs)
pub const DEFAULT_SUBNET_IDS: [&str; 2] = ["subnet-0f30c30418def6379", "subnet-09bd0e0acc92d4efa"];

/// VPC containing the subnets
pub const DEFAULT_VPC_ID: &str = "vpc-0321f38a7b594180d";

/// `Name` tag of the web server instance
pub const DEFAULT_INSTANCE_NAME: &str = "webstack-web-server";

/// Application load balancer name
pub const DEFAULT_LOAD_BALANCER_NAME: &str = "webstack-load-balancer";

/// Target group name
pub const DEFAULT_TARGET_GROUP_NAME: &str = "webstack-target-group";

/// Target group port (HTTP)
pub const DEFAULT_TARGET_PORT: i32 = 80;

/// Auto Scaling group name
pub const DEFAULT_ASG_NAME: &str = "webstack-asg";

/// Auto Scaling group bounds
pub const DEFAULT_ASG_MIN_SIZE: i32 = 1;
pub const DEFAULT_ASG_MAX_SIZE: i32 = 3;
pub const DEFAULT_ASG_DESIRED_CAPACITY: i32 = 1;

/// Scale-out policy
pub const DEFAULT_SCALING_POLICY_NAME: &str = "scale-out-policy";
pub const DEFAULT_SCALING_ADJUSTMENT: i32 = 1;
pub const DEFAULT_SCALING_COOLDOWN_SECS: i32 = 300;

/// SNS topic for infrastructure alerts
pub const DEFAULT_TOPIC_NAME: &str = "infra-alerts";

/// Address subscribed to the alert topic
pub const DEFAULT_ALERT_EMAIL: &str = "admin@example.com";

/// Maximum time to wait for instances to terminate during teardown
pub const DEFAULT_TERMINATION_WAIT_TIMEOUT_SECS: u64 = 600;

/// Boot script installing nginx as the reverse proxy
pub const DEFAULT_USER_DATA: &str = "#!/bin/bash
sudo apt update
sudo apt install -y nginx
sudo systemctl start nginx
sudo systemctl enable nginx
";

/// Returns the default subnets as owned strings
pub fn default_subnet_ids() -> Vec<String> {
    DEFAULT_SUBNET_IDS.iter().map(|s| s.to_string()).collect()
}
