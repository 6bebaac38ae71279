//! Provisioning sequencer
//!
//! Runs the fixed deploy and teardown call sequences against a
//! [`StackOperations`](crate::aws::StackOperations) implementation. Steps run
//! strictly one after another and the first error stops the sequence.

mod deploy;
mod teardown;
mod types;

pub use deploy::{Deployer, deploy};
pub use teardown::teardown;
pub use types::{DeployOutputs, TeardownTargets};
