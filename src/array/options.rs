//! Array operation options.

use crate::config::global_config;

/// Options for array read and write operations.
#[derive(Debug, Clone)]
pub struct ArrayOptions {
    concurrent_target: usize,
}

impl Default for ArrayOptions {
    fn default() -> Self {
        Self {
            concurrent_target: global_config().chunk_concurrent_limit(),
        }
    }
}

impl ArrayOptions {
    /// Create a new array options builder.
    #[must_use]
    pub fn builder() -> ArrayOptionsBuilder {
        ArrayOptionsBuilder::new()
    }

    /// Return the concurrent target.
    #[must_use]
    pub fn concurrent_target(&self) -> usize {
        self.concurrent_target
    }

    /// Set the concurrent target.
    pub fn set_concurrent_target(&mut self, concurrent_target: usize) {
        self.concurrent_target = concurrent_target;
    }

    /// The number of chunks of `num_chunks` to process concurrently.
    ///
    /// A concurrent target of zero places no limit.
    pub(crate) fn chunk_concurrent_limit(&self, num_chunks: usize) -> usize {
        if self.concurrent_target == 0 {
            num_chunks.max(1)
        } else {
            self.concurrent_target.min(num_chunks).max(1)
        }
    }
}

/// Builder for [`ArrayOptions`].
#[derive(Debug, Clone)]
pub struct ArrayOptionsBuilder {
    concurrent_target: usize,
}

impl Default for ArrayOptionsBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl ArrayOptionsBuilder {
    /// Create a new array options builder.
    #[must_use]
    pub fn new() -> Self {
        Self {
            concurrent_target: global_config().chunk_concurrent_limit(),
        }
    }

    /// Build into array options.
    #[must_use]
    pub fn build(&self) -> ArrayOptions {
        ArrayOptions {
            concurrent_target: self.concurrent_target,
        }
    }

    /// Set the concurrent target for parallel operations.
    #[must_use]
    pub fn concurrent_target(mut self, concurrent_target: usize) -> Self {
        self.concurrent_target = concurrent_target;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn array_options_chunk_concurrent_limit() {
        let options = ArrayOptions::builder().concurrent_target(4).build();
        assert_eq!(options.concurrent_target(), 4);
        assert_eq!(options.chunk_concurrent_limit(10), 4);
        assert_eq!(options.chunk_concurrent_limit(2), 2);
        assert_eq!(options.chunk_concurrent_limit(0), 1);

        let mut options = options;
        options.set_concurrent_target(0);
        assert_eq!(options.chunk_concurrent_limit(10), 10);
    }
}
