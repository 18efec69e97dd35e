//! A chunked, compressed, N-dimensional array engine for the Zarr core protocol 3.0 (draft) storage layout.
//!
//! A flat key-value [store](storage) holds a [hierarchy] of [arrays](array::Array) and [groups](group).
//! Each array is split into independently addressable, independently compressed chunks which are retrieved by arbitrary multi-dimensional [selections](indexer::ArraySelection).
//!
//! ## Getting Started
//! - [`hierarchy::Hierarchy`] creates, opens, and resolves nodes.
//! - [`array::Array`] reads and writes selections of array data.
//! - [`storage`] defines the store interface and includes in-memory and filesystem stores.
//!
//! ## Example
//! ```rust
//! # use std::sync::Arc;
//! use zarrs_core::{
//!     array::ArrayBuilder,
//!     hierarchy::Hierarchy,
//!     indexer::{ArraySelection, DimensionSelection},
//!     storage::store::MemoryStore,
//! };
//!
//! let store = Arc::new(MemoryStore::new());
//! let hierarchy = Hierarchy::create(store)?;
//! let array = hierarchy.create_array(
//!     "/group/array",
//!     ArrayBuilder::new(vec![10], "u1", vec![3], 0u8.into()).build_metadata(),
//! )?;
//!
//! array.store_selection_broadcast(&ArraySelection::new(vec![DimensionSelection::Index(7)]), 5u8)?;
//! let elements = array.retrieve_selection_elements::<u8>(&ArraySelection::full())?;
//! assert_eq!(elements, vec![0, 0, 0, 0, 0, 0, 0, 5, 0, 0]);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! ## Crate Features
//! #### Default
//!  - `ndarray`: [`ndarray`] utility functions for [`Array`](crate::array::Array).
//!  - Compressors: `gzip`, `zstd`.
//!  - `async`: an asynchronous API for [`stores`](storage), [`Hierarchy`](hierarchy::Hierarchy), and [`Array`](crate::array::Array).
//!
//! ## Licence
//! `zarrs_core` is licensed under either of
//!  - the Apache License, Version 2.0 <http://www.apache.org/licenses/LICENSE-2.0> or
//!  - the MIT license <http://opensource.org/licenses/MIT>, at your option.

#![warn(unused_variables)]
#![warn(dead_code)]
#![deny(missing_docs)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![deny(clippy::missing_panics_doc)]
#![cfg_attr(docsrs, feature(doc_auto_cfg))]

pub mod array;
pub mod config;
pub mod group;
pub mod hierarchy;
pub mod indexer;
pub mod metadata;
pub mod node;
pub mod plugin;
pub mod storage;
