//! Stores.
//!
//! A [`MemoryStore`] holds values in memory and implements both the synchronous and asynchronous storage traits.
//! A [`FilesystemStore`] maps keys to files under a base directory.

mod filesystem_store;
mod memory_store;

pub use filesystem_store::{FilesystemStore, FilesystemStoreCreateError};
pub use memory_store::MemoryStore;
