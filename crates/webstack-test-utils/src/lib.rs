//! Shared test utilities for webstack
//!
//! ## Modules
//!
//! - [`aws`]: AWS region detection and unique resource names
//! - [`db`]: In-memory SQLite pools

pub mod aws;
pub mod db;

pub use aws::{get_test_region, test_bucket_name, test_deployment_id};
pub use db::open_test_db;
