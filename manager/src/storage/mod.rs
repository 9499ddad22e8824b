//! Storage: layout, settings and deployment records

pub mod layout;
pub mod memory;
pub mod settings;
pub mod store;

pub use memory::MemoryStore;
pub use store::{DeploymentStore, FileStore};
