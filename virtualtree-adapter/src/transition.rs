/// One phase of the animated render transition.
///
/// Phases run in strict sequence; each starts only after the previous one has completed.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum RenderPhase {
    /// Exiting rows fade out and drift toward their exit position; expand indicators
    /// rotate to their new state.
    FadeOut,
    /// Surviving rows move to their new index-derived offsets; content bounds resize.
    Reposition,
    /// Entering rows fade in while moving from their origin to their resting position.
    FadeIn,
}

/// Per-phase durations in milliseconds.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PhaseDurations {
    pub fade_out_ms: u64,
    pub reposition_ms: u64,
    pub fade_in_ms: u64,
}

impl PhaseDurations {
    pub const fn uniform(ms: u64) -> Self {
        Self {
            fade_out_ms: ms,
            reposition_ms: ms,
            fade_in_ms: ms,
        }
    }

    pub fn total_ms(&self) -> u64 {
        self.fade_out_ms
            .saturating_add(self.reposition_ms)
            .saturating_add(self.fade_in_ms)
    }
}

impl Default for PhaseDurations {
    fn default() -> Self {
        Self::uniform(500)
    }
}

/// A started transition, sampled by wall-clock milliseconds supplied by the adapter.
///
/// Holds no timers; `phase_at(now_ms)` maps a timestamp onto the phase sequence.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PhaseTimeline {
    start_ms: u64,
    durations: PhaseDurations,
}

impl PhaseTimeline {
    pub fn new(start_ms: u64, durations: PhaseDurations) -> Self {
        Self {
            start_ms,
            durations,
        }
    }

    pub fn start_ms(&self) -> u64 {
        self.start_ms
    }

    pub fn durations(&self) -> PhaseDurations {
        self.durations
    }

    pub fn end_ms(&self) -> u64 {
        self.start_ms.saturating_add(self.durations.total_ms())
    }

    pub fn is_done(&self, now_ms: u64) -> bool {
        now_ms.saturating_sub(self.start_ms) >= self.durations.total_ms()
    }

    /// Returns the phase active at `now_ms` plus its progress in `[0, 1)`, or `None` once
    /// the whole sequence has completed. Zero-duration phases are skipped.
    pub fn phase_at(&self, now_ms: u64) -> Option<(RenderPhase, f32)> {
        let mut elapsed = now_ms.saturating_sub(self.start_ms);
        let phases = [
            (RenderPhase::FadeOut, self.durations.fade_out_ms),
            (RenderPhase::Reposition, self.durations.reposition_ms),
            (RenderPhase::FadeIn, self.durations.fade_in_ms),
        ];
        for (phase, duration_ms) in phases {
            if duration_ms == 0 {
                continue;
            }
            if elapsed < duration_ms {
                return Some((phase, elapsed as f32 / duration_ms as f32));
            }
            elapsed -= duration_ms;
        }
        None
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Easing {
    Linear,
    SmoothStep,
    EaseInOutCubic,
}

impl Easing {
    pub fn sample(self, t: f32) -> f32 {
        match self {
            Self::Linear => t,
            Self::SmoothStep => t * t * (3.0 - 2.0 * t),
            Self::EaseInOutCubic => {
                if t < 0.5 {
                    4.0 * t * t * t
                } else {
                    let u = -2.0 * t + 2.0;
                    1.0 - (u * u * u) / 2.0
                }
            }
        }
    }
}
