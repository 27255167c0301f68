use alloc::sync::Arc;
use alloc::vec::Vec;
use core::cell::Cell;
use core::cmp;

use crate::error::TreeError;
use crate::options::{
    ChildFuture, DrawNode, GetChildren, IsLeaf, OnChangeCallback, TreeOptions,
};
use crate::types::{Row, RowId, ScrollDirection, TreeState, Viewport, VisibleRange, VisibleRow};

/// A child fetch started by [`VirtualTree::begin_expand`] but not yet applied.
///
/// The expand is keyed by the target's row id, not its index: the row may shift while the
/// fetch is in flight, and [`VirtualTree::apply_expand`] re-locates it before splicing.
/// Dropping the ticket abandons the expand; nothing is applied.
pub struct PendingExpand<N> {
    pub row_id: RowId,
    pub fetch: ChildFuture<N>,
}

impl<N> core::fmt::Debug for PendingExpand<N> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("PendingExpand")
            .field("row_id", &self.row_id)
            .finish_non_exhaustive()
    }
}

/// A headless virtualized tree view.
///
/// This type is intentionally UI-agnostic:
/// - It does not hold any UI objects.
/// - The host supplies the tree data source and per-row drawing at construction, and drives
///   scroll state through `apply_scroll_event*`.
/// - Windowed visibility is exposed via zero-allocation iteration (`for_each_visible_row`).
///
/// The row list is always a pre-order flattening of the currently expanded subset of the
/// tree: for the row at index `i` with depth `d`, every following row until the next row
/// with depth ≤ `d` is one of its descendants, and `num_visible_descendants` equals exactly
/// that count.
pub struct VirtualTree<N, R = ()> {
    get_children: GetChildren<N>,
    is_leaf: IsLeaf<N>,
    draw_node: DrawNode<N, R>,
    row_size: u32,
    on_change: Option<OnChangeCallback<N, R>>,

    rows: Vec<Row<N>>,
    next_row_id: RowId,
    state: TreeState,

    scroll_top: u64,
    last_scroll_top: Option<u64>,
    /// Index of the most recent expand/collapse target; cleared by scroll events. While
    /// set, entering/exiting rows animate from/to this row's position.
    anchor: Option<usize>,

    notify_depth: Cell<usize>,
    notify_pending: Cell<bool>,
}

impl<N, R> VirtualTree<N, R> {
    /// Creates a new tree from options.
    ///
    /// Fails with [`TreeError::MissingCapability`] if any of the three host capabilities is
    /// absent. The tree starts [`TreeState::Uninitialized`]; call [`Self::init_rows`] to
    /// fetch the roots.
    pub fn new(options: TreeOptions<N, R>) -> Result<Self, TreeError> {
        let TreeOptions {
            get_children,
            is_leaf,
            draw_node,
            row_size,
            on_change,
        } = options;
        let get_children = get_children.ok_or(TreeError::MissingCapability {
            capability: "get_children",
        })?;
        let is_leaf = is_leaf.ok_or(TreeError::MissingCapability {
            capability: "is_leaf",
        })?;
        let draw_node = draw_node.ok_or(TreeError::MissingCapability {
            capability: "draw_node",
        })?;
        tdebug!(row_size, "VirtualTree::new");
        Ok(Self {
            get_children,
            is_leaf,
            draw_node,
            row_size,
            on_change,
            rows: Vec::new(),
            next_row_id: 0,
            state: TreeState::Uninitialized,
            scroll_top: 0,
            last_scroll_top: None,
            anchor: None,
            notify_depth: Cell::new(0),
            notify_pending: Cell::new(false),
        })
    }

    pub fn state(&self) -> TreeState {
        self.state
    }

    pub fn rows(&self) -> &[Row<N>] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn row(&self, index: usize) -> Option<&Row<N>> {
        self.rows.get(index)
    }

    /// Locates a row by its stable id. Linear scan; expand/collapse traffic is low-frequency.
    pub fn find_row(&self, id: RowId) -> Option<usize> {
        self.rows.iter().position(|row| row.id == id)
    }

    pub fn row_size(&self) -> u32 {
        self.row_size
    }

    pub fn set_row_size(&mut self, row_size: u32) {
        if self.row_size == row_size {
            return;
        }
        self.row_size = row_size;
        self.notify();
    }

    pub fn scroll_top(&self) -> u64 {
        self.scroll_top
    }

    /// Direction of the last scroll event, if any offset delta has been observed.
    pub fn scroll_direction(&self) -> Option<ScrollDirection> {
        let last = self.last_scroll_top?;
        Some(if self.scroll_top >= last {
            ScrollDirection::Down
        } else {
            ScrollDirection::Up
        })
    }

    /// Index of the most recent expand/collapse target, until the next scroll event.
    pub fn expansion_anchor(&self) -> Option<usize> {
        self.anchor
    }

    pub fn set_on_change(
        &mut self,
        on_change: Option<impl Fn(&VirtualTree<N, R>) + Send + Sync + 'static>,
    ) {
        self.on_change = on_change.map(|f| Arc::new(f) as _);
        self.notify();
    }

    fn notify_now(&self) {
        if let Some(cb) = &self.on_change {
            cb(self);
        }
    }

    fn notify(&self) {
        if self.notify_depth.get() > 0 {
            self.notify_pending.set(true);
            return;
        }
        self.notify_now();
    }

    /// Batches multiple updates into a single `on_change` notification.
    pub fn batch_update(&mut self, f: impl FnOnce(&mut Self)) {
        let depth = self.notify_depth.get();
        self.notify_depth.set(depth.saturating_add(1));

        f(self);

        let depth = self.notify_depth.get();
        debug_assert!(depth > 0, "notify_depth underflow");
        let next = depth.saturating_sub(1);
        self.notify_depth.set(next);

        if next == 0 && self.notify_pending.replace(false) {
            self.notify_now();
        }
    }

    fn create_row(&mut self, node: N, depth: usize) -> Row<N> {
        self.next_row_id += 1;
        let is_leaf = (self.is_leaf)(&node);
        Row {
            id: self.next_row_id,
            depth,
            is_leaf,
            num_visible_descendants: 0,
            node,
        }
    }

    /// Fetches the roots and (re)builds the row list, transitioning to [`TreeState::Ready`].
    ///
    /// This is also the refresh hook: re-running it rebuilds the list from the data source.
    /// The id counter is never reset, so ids stay unique across refreshes.
    pub async fn init_rows(&mut self) -> Result<&[Row<N>], TreeError> {
        let fetch = (self.get_children)(None);
        let roots = fetch.await.map_err(TreeError::Fetch)?;
        tdebug!(roots = roots.len(), "init_rows");
        let mut rows = Vec::with_capacity(roots.len());
        for node in roots {
            let row = self.create_row(node, 0);
            rows.push(row);
        }
        self.rows = rows;
        self.state = TreeState::Ready;
        self.anchor = None;
        self.notify();
        Ok(&self.rows)
    }

    /// Finds the nearest ancestor of the row at `index`: the closest preceding row with a
    /// strictly smaller depth. Returns `None` for root-depth rows.
    ///
    /// Backward linear scan exploiting the pre-order flattening; no parent pointers are
    /// stored.
    pub fn parent_index(&self, index: usize) -> Option<usize> {
        let depth = self.rows.get(index)?.depth;
        self.rows[..index].iter().rposition(|row| row.depth < depth)
    }

    fn adjust_visible_counts(&mut self, index: usize, delta: i64) {
        let mut cursor = Some(index);
        while let Some(i) = cursor {
            let count = self.rows[i].num_visible_descendants as i64 + delta;
            debug_assert!(count >= 0, "descendant count underflow (idx={i}, delta={delta})");
            self.rows[i].num_visible_descendants = count.max(0) as usize;
            cursor = self.parent_index(i);
        }
    }

    /// Starts expanding the row at `index`: validates the preconditions and kicks off the
    /// child fetch without mutating the row list.
    ///
    /// Await the ticket's `fetch`, then pass the children to [`Self::apply_expand`].
    /// Fails with [`TreeError::AlreadyExpanded`] when the row's children are already
    /// visible; the row list is left untouched.
    pub fn begin_expand(&self, index: usize) -> Result<PendingExpand<N>, TreeError> {
        let len = self.rows.len();
        let row = self.rows.get(index).ok_or(TreeError::OutOfBounds { index, len })?;
        if row.is_expanded() {
            return Err(TreeError::AlreadyExpanded { index });
        }
        ttrace!(index, row_id = row.id, "begin_expand");
        Ok(PendingExpand {
            row_id: row.id,
            fetch: (self.get_children)(Some(&row.node)),
        })
    }

    /// Applies a resolved child fetch: splices one row per child (depth + 1, fresh ids)
    /// directly after the target and increments the descendant count of the target and
    /// every transitive ancestor.
    ///
    /// The target is re-located by `row_id`; if it was collapsed away while the fetch was
    /// in flight, nothing is spliced and [`TreeError::StaleExpand`] is returned. A
    /// concurrent expand that landed first surfaces as [`TreeError::AlreadyExpanded`].
    ///
    /// Records the target as the expansion anchor and returns the newly inserted rows.
    pub fn apply_expand(&mut self, row_id: RowId, children: Vec<N>) -> Result<&[Row<N>], TreeError> {
        let index = self
            .find_row(row_id)
            .ok_or(TreeError::StaleExpand { row_id })?;
        if self.rows[index].is_expanded() {
            return Err(TreeError::AlreadyExpanded { index });
        }
        let depth = self.rows[index].depth + 1;
        let mut added = Vec::with_capacity(children.len());
        for node in children {
            let row = self.create_row(node, depth);
            added.push(row);
        }
        let count = added.len();
        tdebug!(index, row_id, count, "apply_expand");
        self.rows.splice(index + 1..index + 1, added);
        self.adjust_visible_counts(index, count as i64);
        self.anchor = Some(index);
        self.notify();
        Ok(&self.rows[index + 1..index + 1 + count])
    }

    /// Expands the row at `index`: fetch, then splice. Equivalent to
    /// [`Self::begin_expand`] + [`Self::apply_expand`] back to back.
    pub async fn expand(&mut self, index: usize) -> Result<&[Row<N>], TreeError> {
        let PendingExpand { row_id, fetch } = self.begin_expand(index)?;
        let children = fetch.await.map_err(TreeError::Fetch)?;
        self.apply_expand(row_id, children)
    }

    /// Collapses the row at `index`, removing its `num_visible_descendants` following rows
    /// (a contiguous drain, correct by the pre-order invariant) and decrementing the count
    /// on the row and every transitive ancestor.
    ///
    /// Returns the removed rows. Collapsing a row with no visible descendants is a no-op
    /// that still records the anchor and returns an empty `Vec`.
    pub fn collapse(&mut self, index: usize) -> Result<Vec<Row<N>>, TreeError> {
        let len = self.rows.len();
        let row = self.rows.get(index).ok_or(TreeError::OutOfBounds { index, len })?;
        let count = row.num_visible_descendants;
        if count == 0 {
            self.anchor = Some(index);
            self.notify();
            return Ok(Vec::new());
        }
        tdebug!(index, count, "collapse");
        let removed: Vec<Row<N>> = self.rows.drain(index + 1..index + 1 + count).collect();
        self.adjust_visible_counts(index, -(count as i64));
        self.anchor = Some(index);
        self.notify();
        Ok(removed)
    }

    /// Applies a scroll offset update from the UI layer.
    ///
    /// Remembers the previous offset for direction inference and clears the expansion
    /// anchor: after a scroll, enter/exit animation falls back to direction-based edges.
    pub fn apply_scroll_event(&mut self, scroll_top: u64) {
        ttrace!(scroll_top, "apply_scroll_event");
        self.last_scroll_top = Some(self.scroll_top);
        self.scroll_top = scroll_top;
        self.anchor = None;
        self.notify();
    }

    /// Same as [`Self::apply_scroll_event`], but clamps the offset to the scrollable range.
    pub fn apply_scroll_event_clamped(&mut self, scroll_top: u64, viewport: Viewport) {
        let clamped = self.clamp_scroll_top(scroll_top, viewport);
        self.apply_scroll_event(clamped);
    }

    /// Total content height in pixels: `len * row_size`.
    pub fn total_height(&self) -> u64 {
        self.rows.len() as u64 * self.row_size as u64
    }

    pub fn max_scroll_top(&self, viewport: Viewport) -> u64 {
        self.total_height().saturating_sub(viewport.height as u64)
    }

    pub fn clamp_scroll_top(&self, scroll_top: u64, viewport: Viewport) -> u64 {
        scroll_top.min(self.max_scroll_top(viewport))
    }

    /// Computes the index range of rows intersecting the viewport at the current scroll
    /// offset. Empty until the tree is [`TreeState::Ready`].
    pub fn visible_range(&self, viewport: Viewport) -> VisibleRange {
        let len = self.rows.len();
        if self.state != TreeState::Ready || len == 0 || self.row_size == 0 {
            return VisibleRange {
                first_index: 0,
                last_index: 0,
            };
        }
        let row_size = self.row_size as u64;
        let first = cmp::min((self.scroll_top / row_size) as usize, len);
        let bottom = self.scroll_top.saturating_add(viewport.height as u64);
        let last = cmp::min(bottom.div_ceil(row_size) as usize, len);
        VisibleRange {
            first_index: first,
            last_index: cmp::max(last, first),
        }
    }

    /// Iterates over the windowed rows without allocations.
    ///
    /// Holds no state beyond the last scroll offset and the expansion anchor; it can be
    /// re-run at any time the row list changes.
    pub fn for_each_visible_row(&self, viewport: Viewport, mut f: impl FnMut(VisibleRow)) {
        let range = self.visible_range(viewport);
        if range.is_empty() {
            return;
        }
        let row_size = self.row_size as i64;
        let first = range.first_index;
        let offset = first as i64 * row_size - self.scroll_top as i64;
        let (start_y, end_y) = self.animation_origin(offset, first, viewport);
        for (visible_index, index) in (range.first_index..range.last_index).enumerate() {
            f(VisibleRow {
                id: self.rows[index].id,
                index,
                visible_index,
                y: offset + visible_index as i64 * row_size,
                start_y,
                end_y,
            });
        }
    }

    /// Collects the windowed rows into `out` (clears `out` first).
    ///
    /// Convenience wrapper around [`Self::for_each_visible_row`]; adapters that care about
    /// allocations should reuse a scratch buffer.
    pub fn collect_visible_rows(&self, viewport: Viewport, out: &mut Vec<VisibleRow>) {
        out.clear();
        self.for_each_visible_row(viewport, |row| out.push(row));
    }

    /// Where entering rows start and exiting rows end, in viewport pixels.
    ///
    /// Right after an expand/collapse both are the anchor row's position, so rows fan out
    /// from the expansion point. After a plain scroll they are the viewport edges implied
    /// by the scroll direction; with no recorded delta, scrolling down is assumed.
    fn animation_origin(&self, offset: i64, first_index: usize, viewport: Viewport) -> (i64, i64) {
        let row_size = self.row_size as i64;
        if let Some(anchor) = self.anchor {
            let y = offset + (anchor as i64 - first_index as i64) * row_size;
            return (y, y);
        }
        let top = -row_size;
        let bottom = viewport.height as i64 + row_size;
        match self.scroll_direction() {
            Some(ScrollDirection::Up) => (top, bottom),
            _ => (bottom, top),
        }
    }

    /// Pixel indentation for a row at `depth`: `(depth + 1.5) * row_size`.
    pub fn indent_for(&self, depth: usize) -> u32 {
        (depth as u32)
            .saturating_add(1)
            .saturating_mul(self.row_size)
            .saturating_add(self.row_size / 2)
    }

    /// Invokes the host draw callback for the row at `index` and returns the rendered
    /// width in pixels.
    pub fn draw_row(&self, target: &mut R, index: usize) -> Result<u32, TreeError> {
        let len = self.rows.len();
        let row = self.rows.get(index).ok_or(TreeError::OutOfBounds { index, len })?;
        Ok((self.draw_node)(target, &row.node, self.indent_for(row.depth)))
    }
}

impl<N: Clone, R> Clone for VirtualTree<N, R> {
    fn clone(&self) -> Self {
        Self {
            get_children: Arc::clone(&self.get_children),
            is_leaf: Arc::clone(&self.is_leaf),
            draw_node: Arc::clone(&self.draw_node),
            row_size: self.row_size,
            on_change: self.on_change.clone(),
            rows: self.rows.clone(),
            next_row_id: self.next_row_id,
            state: self.state,
            scroll_top: self.scroll_top,
            last_scroll_top: self.last_scroll_top,
            anchor: self.anchor,
            notify_depth: Cell::new(0),
            notify_pending: Cell::new(false),
        }
    }
}

impl<N: core::fmt::Debug, R> core::fmt::Debug for VirtualTree<N, R> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("VirtualTree")
            .field("state", &self.state)
            .field("rows", &self.rows)
            .field("next_row_id", &self.next_row_id)
            .field("row_size", &self.row_size)
            .field("scroll_top", &self.scroll_top)
            .field("anchor", &self.anchor)
            .finish_non_exhaustive()
    }
}
