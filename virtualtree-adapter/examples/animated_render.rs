//! Drives a fake clock through an expand transition, printing sampled row frames.

use futures::FutureExt;
use virtualtree::{ChildFuture, TreeOptions, Viewport};
use virtualtree_adapter::{RenderPass, TreeController};

fn children(parent: Option<&str>) -> Vec<&'static str> {
    match parent {
        None => vec!["vendors", "sprints", "archive"],
        Some("vendors") => vec!["acme", "initech"],
        _ => Vec::new(),
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let mut controller = TreeController::new(
        TreeOptions::new()
            .with_get_children(|parent: Option<&&'static str>| -> ChildFuture<&'static str> {
                let nodes = children(parent.copied());
                async move { Ok(nodes) }.boxed()
            })
            .with_is_leaf(|node: &&'static str| children(Some(*node)).is_empty())
            .with_draw_node(|_target: &mut (), node: &&'static str, indent| {
                indent + node.len() as u32 * 8
            })
            .with_row_size(20),
    )?;

    let viewport = Viewport {
        width: 320,
        height: 200,
    };

    // A render asked for before the roots arrive is deferred, not an error.
    let pass = controller.render(&mut (), viewport, 0);
    println!("before init: {pass:?}");

    controller.refresh().await?;
    controller.expand(0).await?;

    let RenderPass::Began { bounds, timeline } = controller.render(&mut (), viewport, 100) else {
        panic!("tree is ready; the pass must start");
    };
    println!("content bounds: {}x{} px", bounds.width, bounds.height);

    let mut frames = Vec::new();
    for now_ms in [100, 350, 600, 850, 1_100, 1_350, timeline.end_ms()] {
        let phase = controller.tick(now_ms, &mut frames);
        println!("t={now_ms:>5} phase={phase:?}");
        for frame in &frames {
            println!(
                "  row {:>2} {:<10} y={:>6.1} opacity={:.2} rotation={:?}",
                frame.id,
                format!("{:?}", frame.lifecycle),
                frame.y,
                frame.opacity,
                frame.rotation_deg
            );
        }
    }
    Ok(())
}
