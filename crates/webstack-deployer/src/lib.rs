//! webstack-deployer: provision and tear down a basic AWS web-application
//! stack (S3 bucket, EC2 web server, application load balancer, auto-scaling
//! group, SNS alert topic).

pub mod aws;
pub mod config;
pub mod orchestrator;
pub mod state;
pub mod wait;
