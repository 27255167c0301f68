//! Adapter utilities for the `virtualtree` crate.
//!
//! The `virtualtree` crate is UI-agnostic and focuses on the row-list bookkeeping and
//! windowing math. This crate provides the framework-neutral pieces a UI adapter needs on
//! top of that:
//!
//! - The three-phase animated render transition (fade out, reposition, fade in)
//! - Per-row frame sampling with easing, keyed enter/exit classification by row id
//! - Deferred handling of renders requested before the root fetch completes
//! - A small controller wrapping the common workflows
//!
//! This crate is intentionally framework-agnostic (no ratatui/egui bindings).
#![cfg_attr(not(feature = "std"), no_std)]
#![forbid(unsafe_code)]

extern crate alloc;

#[cfg(test)]
extern crate std;

mod controller;
mod renderer;
mod transition;

#[cfg(test)]
mod tests;

pub use controller::TreeController;
pub use renderer::{
    ContentBounds, RenderPass, Renderer, RowFrame, RowLifecycle, RENDER_RETRY_DELAY_MS,
};
pub use transition::{Easing, PhaseDurations, PhaseTimeline, RenderPhase};
