use alloc::vec::Vec;

use virtualtree::{
    FetchError, PendingExpand, Row, RowId, TreeError, TreeOptions, Viewport, VirtualTree,
};

use crate::renderer::{RenderPass, Renderer, RowFrame};
use crate::transition::RenderPhase;

/// A framework-neutral controller pairing a [`VirtualTree`] with a [`Renderer`].
///
/// This type does not hold any UI objects. Adapters drive it by calling:
/// - `on_scroll` when the UI reports a scroll offset
/// - `request_expand` / `complete_expand` (or the `expand` convenience) and `collapse` on
///   indicator clicks
/// - `render` when a pass is wanted, then `tick(now_ms)` each frame until the transition
///   settles
pub struct TreeController<N, R> {
    tree: VirtualTree<N, R>,
    renderer: Renderer,
}

impl<N, R> TreeController<N, R> {
    pub fn new(options: TreeOptions<N, R>) -> Result<Self, TreeError> {
        Ok(Self {
            tree: VirtualTree::new(options)?,
            renderer: Renderer::new(),
        })
    }

    pub fn from_parts(tree: VirtualTree<N, R>, renderer: Renderer) -> Self {
        Self { tree, renderer }
    }

    pub fn tree(&self) -> &VirtualTree<N, R> {
        &self.tree
    }

    pub fn tree_mut(&mut self) -> &mut VirtualTree<N, R> {
        &mut self.tree
    }

    pub fn renderer(&self) -> &Renderer {
        &self.renderer
    }

    pub fn renderer_mut(&mut self) -> &mut Renderer {
        &mut self.renderer
    }

    /// (Re)fetches the roots: the initial load and the external refresh hook alike.
    /// Returns the number of root rows.
    pub async fn refresh(&mut self) -> Result<usize, TreeError> {
        let rows = self.tree.init_rows().await?;
        Ok(rows.len())
    }

    /// Call when the UI reports a scroll offset change (wheel/drag). Clamps to the
    /// scrollable range and switches animation origins to direction-based edges.
    pub fn on_scroll(&mut self, scroll_top: u64, viewport: Viewport) {
        self.tree.apply_scroll_event_clamped(scroll_top, viewport);
    }

    /// Validates and starts an expand; the caller awaits the ticket's fetch and hands the
    /// outcome back to [`Self::complete_expand`].
    pub fn request_expand(&self, index: usize) -> Result<PendingExpand<N>, TreeError> {
        self.tree.begin_expand(index)
    }

    /// Applies a resolved expand fetch. Returns the number of inserted rows.
    pub fn complete_expand(
        &mut self,
        row_id: RowId,
        fetched: Result<Vec<N>, FetchError>,
    ) -> Result<usize, TreeError> {
        let children = fetched.map_err(TreeError::Fetch)?;
        let inserted = self.tree.apply_expand(row_id, children)?;
        Ok(inserted.len())
    }

    /// Fetch-and-splice in one await. Returns the number of inserted rows.
    pub async fn expand(&mut self, index: usize) -> Result<usize, TreeError> {
        let inserted = self.tree.expand(index).await?;
        Ok(inserted.len())
    }

    pub fn collapse(&mut self, index: usize) -> Result<Vec<Row<N>>, TreeError> {
        self.tree.collapse(index)
    }

    /// Indicator-click behavior: collapse if expanded, expand otherwise; leaves are
    /// ignored.
    pub async fn toggle(&mut self, index: usize) -> Result<(), TreeError> {
        let row = self.tree.row(index).ok_or(TreeError::OutOfBounds {
            index,
            len: self.tree.len(),
        })?;
        if row.is_leaf {
            return Ok(());
        }
        if row.is_expanded() {
            self.tree.collapse(index)?;
        } else {
            self.tree.expand(index).await?;
        }
        Ok(())
    }

    /// Starts a render pass (see [`Renderer::begin_pass`]).
    pub fn render(&mut self, target: &mut R, viewport: Viewport, now_ms: u64) -> RenderPass {
        self.renderer.begin_pass(&self.tree, target, viewport, now_ms)
    }

    /// Advances the active transition (see [`Renderer::sample_frames`]).
    pub fn tick(&mut self, now_ms: u64, out: &mut Vec<RowFrame>) -> Option<RenderPhase> {
        self.renderer.sample_frames(now_ms, out)
    }

    pub fn is_animating(&self) -> bool {
        self.renderer.is_animating()
    }
}

impl<N: core::fmt::Debug, R> core::fmt::Debug for TreeController<N, R> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("TreeController")
            .field("tree", &self.tree)
            .field("renderer", &self.renderer)
            .finish()
    }
}
