//! A headless virtualized tree view engine.
//!
//! For adapter-level utilities (animated render transitions, frame sampling), see the
//! `virtualtree-adapter` crate.
//!
//! This crate focuses on the bookkeeping needed to present a lazily loaded tree as a flat,
//! scrollable list: an on-demand unrolled row list with stable ids, expand/collapse splicing
//! with ancestor descendant counts, and windowed visibility over a fixed row height.
//!
//! It is UI-agnostic. A TUI/GUI layer is expected to provide:
//! - the tree data source (async children fetcher + leaf predicate)
//! - a per-row drawing callback
//! - viewport size and scroll offsets
#![cfg_attr(not(feature = "std"), no_std)]
#![forbid(unsafe_code)]

extern crate alloc;

#[cfg(test)]
extern crate std;

#[macro_use]
mod macros;

mod error;
mod options;
mod tree;
mod types;


pub use error::{FetchError, TreeError};
pub use options::{
    ChildFuture, DrawNode, GetChildren, IsLeaf, OnChangeCallback, TreeOptions, DEFAULT_ROW_SIZE,
};
pub use tree::{PendingExpand, VirtualTree};
pub use types::{
    Row, RowId, ScrollDirection, TreeState, Viewport, VisibleRange, VisibleRow,
};
