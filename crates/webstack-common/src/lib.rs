//! webstack-common - Shared types and defaults
//!
//! This crate holds the pieces of the provisioner that do not talk to AWS:
//! the literal stack parameters, the resource kinds and their teardown
//! order, and the tag schema applied to created resources.
//!
//! ## Modules
//!
//! - [`defaults`]: Default stack parameters (AMI, subnets, names, ...)
//! - [`resource_kind`]: Resource kinds and teardown ordering
//! - [`tags`]: AWS resource tag constants

pub mod defaults;
pub mod resource_kind;
pub mod tags;

pub use resource_kind::ResourceKind;
