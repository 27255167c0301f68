use alloc::sync::Arc;
use alloc::vec::Vec;

use futures::future::BoxFuture;

use crate::error::FetchError;
use crate::tree::VirtualTree;

/// Future returned by a host `get_children` capability.
///
/// The future is `'static`: the capability must clone whatever it needs out of the borrowed
/// node before returning.
pub type ChildFuture<N> = BoxFuture<'static, Result<Vec<N>, FetchError>>;

/// Fetches the ordered children of a node; `None` fetches the roots.
///
/// The resolved ordering must be stable for the same node within one expand.
pub type GetChildren<N> = Arc<dyn Fn(Option<&N>) -> ChildFuture<N> + Send + Sync>;

/// Pure, synchronous leaf predicate.
pub type IsLeaf<N> = Arc<dyn Fn(&N) -> bool + Send + Sync>;

/// Draws one row's content into the host render target at the given indent (pixels) and
/// returns the rendered width in pixels. Side effects must stay confined to the target.
pub type DrawNode<N, R> = Arc<dyn Fn(&mut R, &N, u32) -> u32 + Send + Sync>;

/// A callback fired when the tree's row list or scroll state changes.
pub type OnChangeCallback<N, R> = Arc<dyn Fn(&VirtualTree<N, R>) + Send + Sync>;

/// Default fixed per-row height in pixels.
pub const DEFAULT_ROW_SIZE: u32 = 24;

/// Configuration for [`crate::VirtualTree`].
///
/// The three host capabilities (`get_children`, `is_leaf`, `draw_node`) are required;
/// `VirtualTree::new` rejects options that are missing any of them. Heavy fields are stored
/// in `Arc`s so the struct stays cheap to clone.
pub struct TreeOptions<N, R = ()> {
    pub get_children: Option<GetChildren<N>>,
    pub is_leaf: Option<IsLeaf<N>>,
    pub draw_node: Option<DrawNode<N, R>>,

    /// Fixed per-row height in pixels.
    pub row_size: u32,

    /// Optional callback fired after every row-list or scroll mutation.
    pub on_change: Option<OnChangeCallback<N, R>>,
}

impl<N, R> TreeOptions<N, R> {
    pub fn new() -> Self {
        Self {
            get_children: None,
            is_leaf: None,
            draw_node: None,
            row_size: DEFAULT_ROW_SIZE,
            on_change: None,
        }
    }

    pub fn with_get_children(
        mut self,
        get_children: impl Fn(Option<&N>) -> ChildFuture<N> + Send + Sync + 'static,
    ) -> Self {
        self.get_children = Some(Arc::new(get_children));
        self
    }

    pub fn with_is_leaf(mut self, is_leaf: impl Fn(&N) -> bool + Send + Sync + 'static) -> Self {
        self.is_leaf = Some(Arc::new(is_leaf));
        self
    }

    pub fn with_draw_node(
        mut self,
        draw_node: impl Fn(&mut R, &N, u32) -> u32 + Send + Sync + 'static,
    ) -> Self {
        self.draw_node = Some(Arc::new(draw_node));
        self
    }

    pub fn with_row_size(mut self, row_size: u32) -> Self {
        self.row_size = row_size;
        self
    }

    pub fn with_on_change(
        mut self,
        on_change: Option<impl Fn(&VirtualTree<N, R>) + Send + Sync + 'static>,
    ) -> Self {
        self.on_change = on_change.map(|f| Arc::new(f) as _);
        self
    }
}

impl<N, R> Default for TreeOptions<N, R> {
    fn default() -> Self {
        Self::new()
    }
}

impl<N, R> Clone for TreeOptions<N, R> {
    fn clone(&self) -> Self {
        Self {
            get_children: self.get_children.clone(),
            is_leaf: self.is_leaf.clone(),
            draw_node: self.draw_node.clone(),
            row_size: self.row_size,
            on_change: self.on_change.clone(),
        }
    }
}

impl<N, R> core::fmt::Debug for TreeOptions<N, R> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("TreeOptions")
            .field("get_children", &self.get_children.is_some())
            .field("is_leaf", &self.is_leaf.is_some())
            .field("draw_node", &self.draw_node.is_some())
            .field("row_size", &self.row_size)
            .finish_non_exhaustive()
    }
}
