use crate::*;

use alloc::vec;
use alloc::vec::Vec;

use futures::FutureExt;
use virtualtree::{ChildFuture, RowId, TreeOptions, Viewport};

type DrawLog = Vec<(&'static str, u32)>;

const VIEWPORT: Viewport = Viewport {
    width: 320,
    height: 200,
};

fn fixture_children(parent: Option<&'static str>) -> Vec<&'static str> {
    match parent {
        None => vec!["A", "B", "C"],
        Some("A") => vec!["A1", "A2"],
        Some("B") => vec!["B1"],
        _ => Vec::new(),
    }
}

fn fixture_options() -> TreeOptions<&'static str, DrawLog> {
    TreeOptions::new()
        .with_get_children(|parent: Option<&&'static str>| -> ChildFuture<&'static str> {
            let children = fixture_children(parent.copied());
            async move { Ok(children) }.boxed()
        })
        .with_is_leaf(|node: &&'static str| fixture_children(Some(*node)).is_empty())
        .with_draw_node(|target: &mut DrawLog, node: &&'static str, indent| {
            target.push((node, indent));
            indent + node.len() as u32 * 8
        })
        .with_row_size(20)
}

async fn ready_controller() -> TreeController<&'static str, DrawLog> {
    let mut controller = TreeController::new(fixture_options()).unwrap();
    controller.refresh().await.unwrap();
    controller
}

fn settle(controller: &mut TreeController<&'static str, DrawLog>, now_ms: u64) {
    let mut frames = Vec::new();
    assert!(controller.tick(now_ms, &mut frames).is_none());
    assert!(!controller.is_animating());
}

fn frame_for(frames: &[RowFrame], id: RowId) -> RowFrame {
    *frames
        .iter()
        .find(|frame| frame.id == id)
        .unwrap_or_else(|| panic!("no frame for row {id}"))
}

#[test]
fn phase_timeline_runs_the_phases_in_strict_sequence() {
    let timeline = PhaseTimeline::new(1_000, PhaseDurations::default());
    assert_eq!(timeline.end_ms(), 2_500);

    // Before the start the first phase is pinned at zero progress.
    assert_eq!(timeline.phase_at(0), Some((RenderPhase::FadeOut, 0.0)));
    assert_eq!(timeline.phase_at(1_000), Some((RenderPhase::FadeOut, 0.0)));
    assert!(matches!(
        timeline.phase_at(1_499),
        Some((RenderPhase::FadeOut, _))
    ));
    assert_eq!(timeline.phase_at(1_500), Some((RenderPhase::Reposition, 0.0)));
    assert_eq!(timeline.phase_at(2_000), Some((RenderPhase::FadeIn, 0.0)));
    assert!(matches!(
        timeline.phase_at(2_499),
        Some((RenderPhase::FadeIn, _))
    ));
    assert_eq!(timeline.phase_at(2_500), None);
    assert!(timeline.is_done(2_500));
    assert!(!timeline.is_done(2_499));
}

#[test]
fn zero_duration_phases_are_skipped() {
    let timeline = PhaseTimeline::new(
        0,
        PhaseDurations {
            fade_out_ms: 0,
            reposition_ms: 100,
            fade_in_ms: 0,
        },
    );
    assert_eq!(timeline.phase_at(0), Some((RenderPhase::Reposition, 0.0)));
    assert_eq!(timeline.phase_at(100), None);
}

#[test]
fn easing_is_pinned_at_the_endpoints() {
    for easing in [Easing::Linear, Easing::SmoothStep, Easing::EaseInOutCubic] {
        assert_eq!(easing.sample(0.0), 0.0);
        assert_eq!(easing.sample(1.0), 1.0);
    }
    assert!(Easing::EaseInOutCubic.sample(0.25) < 0.25);
}

#[tokio::test]
async fn render_is_deferred_until_the_root_fetch_completes() {
    let mut controller = TreeController::new(fixture_options()).unwrap();
    let mut log = DrawLog::new();

    let pass = controller.render(&mut log, VIEWPORT, 0);
    assert_eq!(
        pass,
        RenderPass::Deferred {
            retry_after_ms: RENDER_RETRY_DELAY_MS
        }
    );
    assert!(log.is_empty());
    assert!(!controller.is_animating());

    controller.refresh().await.unwrap();
    let pass = controller.render(&mut log, VIEWPORT, 0);
    assert!(matches!(pass, RenderPass::Began { .. }));
    assert_eq!(log.len(), 3);
}

#[tokio::test]
async fn initial_pass_fades_every_row_in() {
    let mut controller = ready_controller().await;
    let mut log = DrawLog::new();
    controller.render(&mut log, VIEWPORT, 0);

    let mut frames = Vec::new();
    assert_eq!(
        controller.tick(0, &mut frames),
        Some(RenderPhase::FadeOut)
    );
    assert_eq!(frames.len(), 3);
    assert!(frames
        .iter()
        .all(|frame| frame.lifecycle == RowLifecycle::Entering && frame.opacity == 0.0));

    // Halfway through the fade-in, entering rows are partially visible.
    assert_eq!(
        controller.tick(1_250, &mut frames),
        Some(RenderPhase::FadeIn)
    );
    assert!(frames
        .iter()
        .all(|frame| frame.opacity > 0.0 && frame.opacity < 1.0));

    // Once the timeline completes, the resting frames are emitted and the pass retires.
    assert!(controller.tick(1_500, &mut frames).is_none());
    assert!(!controller.is_animating());
    let ys: Vec<f32> = frames.iter().map(|frame| frame.y).collect();
    assert_eq!(ys, [0.0, 20.0, 40.0]);
    assert!(frames.iter().all(|frame| frame.opacity == 1.0));
}

#[tokio::test]
async fn expand_pass_fans_new_rows_out_of_the_anchor() {
    let mut controller = ready_controller().await;
    let mut log = DrawLog::new();
    controller.render(&mut log, VIEWPORT, 0);
    settle(&mut controller, 1_500);

    controller.expand(0).await.unwrap();
    controller.render(&mut log, VIEWPORT, 10_000);

    let mut frames = Vec::new();
    controller.tick(10_000, &mut frames);
    assert_eq!(frames.len(), 5);

    // The children of row 1 ("A") got ids 4 and 5 and start at the anchor's position.
    for id in [4, 5] {
        let frame = frame_for(&frames, id);
        assert_eq!(frame.lifecycle, RowLifecycle::Entering);
        assert_eq!(frame.y, 0.0);
        assert_eq!(frame.opacity, 0.0);
    }

    // The expanded row's indicator rotates during the fade-out phase.
    let parent = frame_for(&frames, 1);
    assert_eq!(parent.rotation_deg, Some(0.0));
    controller.tick(10_250, &mut frames);
    let parent = frame_for(&frames, 1);
    let rotation = parent.rotation_deg.unwrap();
    assert!(rotation > 0.0 && rotation < 90.0);

    // Surviving rows reposition during phase two: "B" moves from y=20 to y=60.
    controller.tick(10_500, &mut frames);
    let b = frame_for(&frames, 2);
    assert_eq!(b.y, 20.0);
    controller.tick(10_999, &mut frames);
    let b = frame_for(&frames, 2);
    assert!(b.y > 20.0);

    controller.tick(11_500, &mut frames);
    let parent = frame_for(&frames, 1);
    assert_eq!(parent.rotation_deg, Some(90.0));
    let b = frame_for(&frames, 2);
    assert_eq!(b.y, 60.0);
}

#[tokio::test]
async fn collapse_pass_retires_removed_rows_toward_the_anchor() {
    let mut controller = ready_controller().await;
    let mut log = DrawLog::new();
    controller.render(&mut log, VIEWPORT, 0);
    settle(&mut controller, 1_500);

    controller.expand(0).await.unwrap();
    controller.render(&mut log, VIEWPORT, 2_000);
    settle(&mut controller, 3_500);

    let removed = controller.collapse(0).unwrap();
    assert_eq!(removed.len(), 2);
    controller.render(&mut log, VIEWPORT, 5_000);

    let mut frames = Vec::new();
    controller.tick(5_000, &mut frames);
    // 3 surviving + 2 exiting.
    assert_eq!(frames.len(), 5);
    for id in [4, 5] {
        let frame = frame_for(&frames, id);
        assert_eq!(frame.lifecycle, RowLifecycle::Exiting);
        assert_eq!(frame.index, None);
        assert_eq!(frame.opacity, 1.0);
    }

    // Mid fade-out the exiting rows are translucent and drifting toward the anchor (y=0).
    controller.tick(5_250, &mut frames);
    for id in [4, 5] {
        let frame = frame_for(&frames, id);
        assert!(frame.opacity < 1.0);
        assert!(frame.y < 40.0 + f32::EPSILON);
    }

    // Exiting rows are gone once repositioning starts.
    controller.tick(5_500, &mut frames);
    assert_eq!(frames.len(), 3);
    assert!(frames.iter().all(|frame| frame.lifecycle != RowLifecycle::Exiting));
}

#[tokio::test]
async fn bounds_floor_at_the_viewport() {
    let mut controller = ready_controller().await;
    let mut log = DrawLog::new();

    // 3 rows of 20 px in a 320x200 viewport; drawn widths stay under 320.
    let pass = controller.render(&mut log, VIEWPORT, 0);
    let RenderPass::Began { bounds, .. } = pass else {
        panic!("expected a started pass");
    };
    assert_eq!(bounds.width, 320);
    assert_eq!(bounds.height, 200);
}

#[tokio::test]
async fn wide_rows_stretch_the_content_bounds() {
    let mut controller = TreeController::new(
        fixture_options().with_draw_node(|target: &mut DrawLog, node: &&'static str, indent| {
            target.push((node, indent));
            1_000
        }),
    )
    .unwrap();
    controller.refresh().await.unwrap();

    let mut log = DrawLog::new();
    let RenderPass::Began { bounds, .. } = controller.render(&mut log, VIEWPORT, 0) else {
        panic!("expected a started pass");
    };
    assert_eq!(bounds.width, 1_000);
}

#[tokio::test]
async fn leaf_rows_hide_their_indicator() {
    let mut controller = ready_controller().await;
    let mut log = DrawLog::new();
    controller.render(&mut log, VIEWPORT, 0);

    let mut frames = Vec::new();
    controller.tick(0, &mut frames);
    // "A" and "B" have children; "C" is a leaf.
    assert!(frame_for(&frames, 1).rotation_deg.is_some());
    assert!(frame_for(&frames, 2).rotation_deg.is_some());
    assert!(frame_for(&frames, 3).rotation_deg.is_none());
}

#[tokio::test]
async fn staged_expand_flows_through_the_controller() {
    let mut controller = ready_controller().await;
    let pending = controller.request_expand(0).unwrap();
    let row_id = pending.row_id;

    let fetched = pending.fetch.await;
    let inserted = controller.complete_expand(row_id, fetched).unwrap();
    assert_eq!(inserted, 2);
    assert_eq!(controller.tree().len(), 5);
}

#[tokio::test]
async fn toggle_expands_collapses_and_ignores_leaves() {
    let mut controller = ready_controller().await;

    controller.toggle(0).await.unwrap();
    assert_eq!(controller.tree().len(), 5);
    controller.toggle(0).await.unwrap();
    assert_eq!(controller.tree().len(), 3);

    // "C" is a leaf; toggling it is a quiet no-op.
    controller.toggle(2).await.unwrap();
    assert_eq!(controller.tree().len(), 3);
}
