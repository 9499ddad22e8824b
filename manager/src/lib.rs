//! Stackman Library
//!
//! Deploys service templates to an orchestration adapter and manages the
//! resulting services as one deployment.

pub mod adapter;
pub mod convert;
pub mod deploy;
pub mod errors;
pub mod filesys;
pub mod logs;
pub mod models;
pub mod storage;
pub mod template;
pub mod utils;
