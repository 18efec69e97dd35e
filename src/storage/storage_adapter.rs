//! Storage adapters. Includes a [usage log](UsageLogStorageAdapter) implementation.
//!
//! An adapter wraps another store and has the same interface as a store.

mod usage_log;

pub use self::usage_log::UsageLogStorageAdapter;
