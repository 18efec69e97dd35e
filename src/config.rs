//! Global configuration options.

use std::sync::{OnceLock, RwLock, RwLockReadGuard, RwLockWriteGuard};

/// Global configuration options for the `zarrs_core` crate.
///
/// Retrieve the global [`Config`] with [`global_config`] and modify it with [`global_config_mut`].
///
/// ## Chunk Concurrent Limit
/// > default: [`std::thread::available_parallelism`]`()`, or 1 if unavailable
///
/// The default limit on the number of chunks fetched, decoded, and scattered concurrently by a single array read or write.
/// It bounds the number of simultaneous store requests issued for very large selections.
/// A limit of zero places no limit on the number of concurrent chunks.
///
/// Note that the default chunk concurrent limit can be overridden for any array operation with [`ArrayOptions`](crate::array::ArrayOptions).
///
/// ## Metadata Key Suffix
/// > default: `".json"`
///
/// The metadata key suffix written to the entry point of a newly created [`Hierarchy`](crate::hierarchy::Hierarchy).
#[derive(Debug)]
pub struct Config {
    chunk_concurrent_limit: usize,
    metadata_key_suffix: String,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            chunk_concurrent_limit: std::thread::available_parallelism()
                .map_or(1, std::num::NonZeroUsize::get),
            metadata_key_suffix: ".json".to_string(),
        }
    }
}

impl Config {
    /// Get the [chunk concurrent limit](#chunk-concurrent-limit) configuration.
    #[must_use]
    pub fn chunk_concurrent_limit(&self) -> usize {
        self.chunk_concurrent_limit
    }

    /// Set the [chunk concurrent limit](#chunk-concurrent-limit) configuration.
    pub fn set_chunk_concurrent_limit(&mut self, concurrent_limit: usize) {
        self.chunk_concurrent_limit = concurrent_limit;
    }

    /// Get the [metadata key suffix](#metadata-key-suffix) configuration.
    #[must_use]
    pub fn metadata_key_suffix(&self) -> &str {
        &self.metadata_key_suffix
    }

    /// Set the [metadata key suffix](#metadata-key-suffix) configuration.
    pub fn set_metadata_key_suffix(&mut self, metadata_key_suffix: impl Into<String>) {
        self.metadata_key_suffix = metadata_key_suffix.into();
    }
}

static CONFIG: OnceLock<RwLock<Config>> = OnceLock::new();

/// Returns a reference to the global configuration.
///
/// # Panics
/// This function panics if the underlying lock has been poisoned and might panic if the global config is already held by the current thread.
pub fn global_config() -> RwLockReadGuard<'static, Config> {
    CONFIG
        .get_or_init(|| RwLock::new(Config::default()))
        .read()
        .unwrap()
}

/// Returns a mutable reference to the global configuration.
///
/// # Panics
/// This function panics if the underlying lock has been poisoned and might panic if the global config is already held by the current thread.
pub fn global_config_mut() -> RwLockWriteGuard<'static, Config> {
    CONFIG
        .get_or_init(|| RwLock::new(Config::default()))
        .write()
        .unwrap()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_chunk_concurrent_limit() {
        let limit = global_config().chunk_concurrent_limit();
        assert!(limit > 0);
        global_config_mut().set_chunk_concurrent_limit(limit + 1);
        assert_eq!(global_config().chunk_concurrent_limit(), limit + 1);
        global_config_mut().set_chunk_concurrent_limit(limit);
    }

    #[test]
    fn config_metadata_key_suffix() {
        assert_eq!(global_config().metadata_key_suffix(), ".json");
    }
}
