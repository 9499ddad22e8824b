//! Deployment module

pub mod fanout;
pub mod manager;
pub mod status;

pub use manager::{DeploymentManager, TeardownReceipt};
pub use status::{DeploymentStatus, OverallStatus};
