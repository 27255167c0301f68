//! Expand and collapse a small static tree, printing the flattened row list.

use futures::FutureExt;
use virtualtree::{ChildFuture, TreeOptions, VirtualTree};

fn children(parent: Option<&str>) -> Vec<&'static str> {
    match parent {
        None => vec!["src", "tests", "README.md"],
        Some("src") => vec!["lib.rs", "tree", "util.rs"],
        Some("tree") => vec!["mod.rs", "node.rs"],
        Some("tests") => vec!["smoke.rs"],
        _ => Vec::new(),
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let mut tree = VirtualTree::new(
        TreeOptions::new()
            .with_get_children(|parent: Option<&&'static str>| -> ChildFuture<&'static str> {
                let nodes = children(parent.copied());
                async move { Ok(nodes) }.boxed()
            })
            .with_is_leaf(|node: &&'static str| children(Some(*node)).is_empty())
            .with_draw_node(|_target: &mut (), node: &&'static str, indent| {
                indent + node.len() as u32 * 8
            }),
    )?;

    tree.init_rows().await?;
    tree.expand(0).await?; // src
    tree.expand(2).await?; // src/tree

    for row in tree.rows() {
        println!(
            "{:indent$}{} (id={}, visible descendants={})",
            "",
            row.node,
            row.id,
            row.num_visible_descendants,
            indent = row.depth * 2
        );
    }

    let removed = tree.collapse(0)?;
    println!("collapsed {} rows; {} remain", removed.len(), tree.len());
    Ok(())
}
