use alloc::collections::BTreeMap;
use alloc::vec::Vec;

use virtualtree::{RowId, TreeState, Viewport, VirtualTree, VisibleRow};

use crate::transition::{Easing, PhaseDurations, PhaseTimeline, RenderPhase};

/// Delay before retrying a render that arrived while the tree was still fetching its roots.
///
/// A scheduling accommodation, not a fault: the root fetch is unobservable to the caller
/// synchronously, so the render is simply asked again a beat later.
pub const RENDER_RETRY_DELAY_MS: u64 = 100;

/// Lifecycle of a row within one render pass, classified by stable row id against the
/// previous pass.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum RowLifecycle {
    Entering,
    Surviving,
    Exiting,
}

/// Overall content size: widest drawn row × total row height, floored at the viewport.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ContentBounds {
    pub width: u32,
    pub height: u64,
}

/// Outcome of asking the renderer to start a pass.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum RenderPass {
    /// The tree has not finished its root fetch; ask again after the delay.
    Deferred { retry_after_ms: u64 },
    /// A transition has begun; sample frames until the timeline completes.
    Began {
        bounds: ContentBounds,
        timeline: PhaseTimeline,
    },
}

/// One sampled row, ready for the host to paint.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RowFrame {
    pub id: RowId,
    /// Index into the current row list; `None` for exiting rows that have already been
    /// removed from it.
    pub index: Option<usize>,
    pub lifecycle: RowLifecycle,
    /// Indentation in pixels.
    pub x: u32,
    pub y: f32,
    pub opacity: f32,
    /// Expand indicator rotation in degrees (0 collapsed, 90 expanded); `None` for leaf
    /// rows, whose indicator is hidden.
    pub rotation_deg: Option<f32>,
}

#[derive(Clone, Copy, Debug)]
struct PrevRow {
    y: i64,
    indent: u32,
    rotation_deg: f32,
    leaf: bool,
}

#[derive(Clone, Copy, Debug)]
struct PlannedRow {
    id: RowId,
    index: Option<usize>,
    lifecycle: RowLifecycle,
    x: u32,
    from_y: f32,
    to_y: f32,
    from_rotation: f32,
    to_rotation: f32,
    indicator: bool,
}

#[derive(Clone, Debug)]
struct ActivePass {
    timeline: PhaseTimeline,
    rows: Vec<PlannedRow>,
    bounds: ContentBounds,
}

/// Drives animated render passes over a [`VirtualTree`].
///
/// The renderer remembers which row ids it painted last pass (plus their resting offsets)
/// and classifies the next pass into entering / surviving / exiting rows. It holds no UI
/// objects and no clock; the adapter supplies `now_ms`.
#[derive(Clone, Debug)]
pub struct Renderer {
    durations: PhaseDurations,
    easing: Easing,
    prev: BTreeMap<RowId, PrevRow>,
    active: Option<ActivePass>,
    scratch: Vec<VisibleRow>,
}

impl Renderer {
    pub fn new() -> Self {
        Self {
            durations: PhaseDurations::default(),
            easing: Easing::EaseInOutCubic,
            prev: BTreeMap::new(),
            active: None,
            scratch: Vec::new(),
        }
    }

    pub fn with_durations(mut self, durations: PhaseDurations) -> Self {
        self.durations = durations;
        self
    }

    pub fn with_easing(mut self, easing: Easing) -> Self {
        self.easing = easing;
        self
    }

    pub fn durations(&self) -> PhaseDurations {
        self.durations
    }

    pub fn is_animating(&self) -> bool {
        self.active.is_some()
    }

    pub fn bounds(&self) -> Option<ContentBounds> {
        self.active.as_ref().map(|pass| pass.bounds)
    }

    /// Cancels any active pass and forgets the previous frame, so the next pass treats
    /// every row as entering.
    pub fn reset(&mut self) {
        self.prev.clear();
        self.active = None;
    }

    /// Starts a render pass: snapshots the visible window, invokes the host draw callback
    /// once per windowed row to size the content bounds, classifies rows against the
    /// previous pass by id, and arms the three-phase timeline.
    ///
    /// Replaces any pass still in flight, the way a freshly triggered transition cuts off
    /// the previous one.
    pub fn begin_pass<N, R>(
        &mut self,
        tree: &VirtualTree<N, R>,
        target: &mut R,
        viewport: Viewport,
        now_ms: u64,
    ) -> RenderPass {
        if tree.state() != TreeState::Ready {
            return RenderPass::Deferred {
                retry_after_ms: RENDER_RETRY_DELAY_MS,
            };
        }

        tree.collect_visible_rows(viewport, &mut self.scratch);
        let exit_y = self.scratch.first().map(|row| row.end_y).unwrap_or(0);

        let mut planned = Vec::with_capacity(self.scratch.len() + self.prev.len());
        let mut next_prev = BTreeMap::new();
        let mut width = 0u32;

        for vis in &self.scratch {
            let Some(row) = tree.row(vis.index) else {
                continue;
            };
            width = width.max(tree.draw_row(target, vis.index).unwrap_or(0));
            let x = tree.indent_for(row.depth);
            let to_rotation = if row.is_expanded() { 90.0 } else { 0.0 };
            let planned_row = match self.prev.get(&vis.id) {
                Some(prev) => PlannedRow {
                    id: vis.id,
                    index: Some(vis.index),
                    lifecycle: RowLifecycle::Surviving,
                    x,
                    from_y: prev.y as f32,
                    to_y: vis.y as f32,
                    from_rotation: prev.rotation_deg,
                    to_rotation,
                    indicator: !row.is_leaf,
                },
                None => PlannedRow {
                    id: vis.id,
                    index: Some(vis.index),
                    lifecycle: RowLifecycle::Entering,
                    x,
                    from_y: vis.start_y as f32,
                    to_y: vis.y as f32,
                    from_rotation: 0.0,
                    to_rotation,
                    indicator: !row.is_leaf,
                },
            };
            planned.push(planned_row);
            next_prev.insert(
                vis.id,
                PrevRow {
                    y: vis.y,
                    indent: x,
                    rotation_deg: to_rotation,
                    leaf: row.is_leaf,
                },
            );
        }

        for (&id, prev) in &self.prev {
            if next_prev.contains_key(&id) {
                continue;
            }
            planned.push(PlannedRow {
                id,
                index: None,
                lifecycle: RowLifecycle::Exiting,
                x: prev.indent,
                from_y: prev.y as f32,
                to_y: exit_y as f32,
                from_rotation: prev.rotation_deg,
                to_rotation: prev.rotation_deg,
                indicator: !prev.leaf,
            });
        }

        let bounds = ContentBounds {
            width: width.max(viewport.width),
            height: tree.total_height().max(viewport.height as u64),
        };
        let timeline = PhaseTimeline::new(now_ms, self.durations);
        self.prev = next_prev;
        self.active = Some(ActivePass {
            timeline,
            rows: planned,
            bounds,
        });
        RenderPass::Began { bounds, timeline }
    }

    /// Samples the active pass at `now_ms` into `out` (cleared first).
    ///
    /// Returns the phase in progress, or `None` when nothing is animating; on completion
    /// the final resting frames are emitted one last time and the pass is retired.
    pub fn sample_frames(&mut self, now_ms: u64, out: &mut Vec<RowFrame>) -> Option<RenderPhase> {
        out.clear();
        let pass = self.active.as_ref()?;
        let phase = pass.timeline.phase_at(now_ms);
        let easing = self.easing;

        for row in &pass.rows {
            let frame = match phase {
                Some((RenderPhase::FadeOut, t)) => {
                    let k = easing.sample(t);
                    match row.lifecycle {
                        RowLifecycle::Exiting => Some(RowFrame {
                            y: lerp(row.from_y, row.to_y, k),
                            opacity: 1.0 - k,
                            rotation_deg: row.indicator.then_some(row.to_rotation),
                            ..frame_base(row)
                        }),
                        RowLifecycle::Surviving => Some(RowFrame {
                            y: row.from_y,
                            opacity: 1.0,
                            rotation_deg: row
                                .indicator
                                .then_some(lerp(row.from_rotation, row.to_rotation, k)),
                            ..frame_base(row)
                        }),
                        RowLifecycle::Entering => Some(RowFrame {
                            y: row.from_y,
                            opacity: 0.0,
                            rotation_deg: row
                                .indicator
                                .then_some(lerp(row.from_rotation, row.to_rotation, k)),
                            ..frame_base(row)
                        }),
                    }
                }
                Some((RenderPhase::Reposition, t)) => match row.lifecycle {
                    RowLifecycle::Exiting => None,
                    RowLifecycle::Surviving => Some(RowFrame {
                        y: lerp(row.from_y, row.to_y, easing.sample(t)),
                        opacity: 1.0,
                        rotation_deg: row.indicator.then_some(row.to_rotation),
                        ..frame_base(row)
                    }),
                    RowLifecycle::Entering => Some(RowFrame {
                        y: row.from_y,
                        opacity: 0.0,
                        rotation_deg: row.indicator.then_some(row.to_rotation),
                        ..frame_base(row)
                    }),
                },
                Some((RenderPhase::FadeIn, t)) => match row.lifecycle {
                    RowLifecycle::Exiting => None,
                    RowLifecycle::Surviving => Some(RowFrame {
                        y: row.to_y,
                        opacity: 1.0,
                        rotation_deg: row.indicator.then_some(row.to_rotation),
                        ..frame_base(row)
                    }),
                    RowLifecycle::Entering => {
                        let k = easing.sample(t);
                        Some(RowFrame {
                            y: lerp(row.from_y, row.to_y, k),
                            opacity: k,
                            rotation_deg: row.indicator.then_some(row.to_rotation),
                            ..frame_base(row)
                        })
                    }
                },
                None => match row.lifecycle {
                    RowLifecycle::Exiting => None,
                    _ => Some(RowFrame {
                        y: row.to_y,
                        opacity: 1.0,
                        rotation_deg: row.indicator.then_some(row.to_rotation),
                        ..frame_base(row)
                    }),
                },
            };
            if let Some(frame) = frame {
                out.push(frame);
            }
        }

        if phase.is_none() {
            self.active = None;
        }
        phase.map(|(p, _)| p)
    }
}

impl Default for Renderer {
    fn default() -> Self {
        Self::new()
    }
}

fn frame_base(row: &PlannedRow) -> RowFrame {
    RowFrame {
        id: row.id,
        index: row.index,
        lifecycle: row.lifecycle,
        x: row.x,
        y: 0.0,
        opacity: 0.0,
        rotation_deg: None,
    }
}

fn lerp(from: f32, to: f32, t: f32) -> f32 {
    from + (to - from) * t
}
