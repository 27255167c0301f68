//! Scroll a flat 1000-row list and print the windowed slice at a few offsets.

use futures::FutureExt;
use virtualtree::{ChildFuture, TreeOptions, Viewport, VirtualTree};

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let mut tree = VirtualTree::new(
        TreeOptions::new()
            .with_get_children(|parent: Option<&u32>| -> ChildFuture<u32> {
                let children = match parent {
                    None => (0..1000).collect(),
                    Some(_) => Vec::new(),
                };
                async move { Ok(children) }.boxed()
            })
            .with_is_leaf(|_node: &u32| true)
            .with_draw_node(|_target: &mut (), _node: &u32, indent| indent + 120)
            .with_row_size(16),
    )?;
    tree.init_rows().await?;

    let viewport = Viewport {
        width: 320,
        height: 96,
    };
    println!("total height: {} px", tree.total_height());

    for scroll_top in [0u64, 500, 40] {
        tree.apply_scroll_event_clamped(scroll_top, viewport);
        let range = tree.visible_range(viewport);
        println!(
            "scroll_top={}: rows {}..{}",
            tree.scroll_top(),
            range.first_index,
            range.last_index
        );
        tree.for_each_visible_row(viewport, |row| {
            println!("  row {:>3} at y={:>3} (enters from y={})", row.index, row.y, row.start_y);
        });
    }
    Ok(())
}
