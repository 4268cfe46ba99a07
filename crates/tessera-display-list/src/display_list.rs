//! Sealed display lists.

use std::fmt;
use std::ops::Range;
use std::sync::OnceLock;
use std::sync::atomic::{AtomicU32, Ordering};

#[cfg(feature = "dispatch-trace")]
use std::cell::Cell;

use crate::bounds::BoundsAccumulator;
use crate::canvas::{Canvas, CanvasDispatcher};
use crate::dispatcher::Dispatcher;
use crate::equality;
use crate::geometry::Rect;
use crate::op::OpKind;
use crate::record::DisplayOp;
use crate::resource::ResourceTable;
use crate::storage::OpStorage;

/// Source of [`DisplayList::unique_id`]. Zero is never handed out.
static NEXT_UNIQUE_ID: AtomicU32 = AtomicU32::new(1);

fn next_unique_id() -> u32 {
    loop {
        let id = NEXT_UNIQUE_ID.fetch_add(1, Ordering::Relaxed);
        if id != 0 {
            return id;
        }
    }
}

#[cfg(feature = "dispatch-trace")]
thread_local! {
    static DISPATCH_DEPTH: Cell<usize> = const { Cell::new(0) };
}

/// Nesting depth of the dispatch in progress on this thread; restored on
/// drop.
#[cfg(feature = "dispatch-trace")]
struct DispatchDepth(usize);

#[cfg(feature = "dispatch-trace")]
impl DispatchDepth {
    fn enter() -> Self {
        Self(DISPATCH_DEPTH.with(|d| {
            let current = d.get();
            d.set(current + 1);
            current
        }))
    }
}

#[cfg(feature = "dispatch-trace")]
impl Drop for DispatchDepth {
    fn drop(&mut self) {
        DISPATCH_DEPTH.with(|d| d.set(self.0));
    }
}

/// An immutable, replayable recording of drawing calls.
///
/// Created by [`DisplayListBuilder::build`](crate::DisplayListBuilder::build).
/// A display list can be shared across threads and dispatched, compared
/// and queried for bounds concurrently.
pub struct DisplayList {
    storage: OpStorage,
    resources: ResourceTable,
    op_count: usize,
    op_count_nested: usize,
    byte_count_nested: usize,
    cull_rect: Rect,
    bounds: OnceLock<Rect>,
    unique_id: u32,
}

impl DisplayList {
    pub(crate) fn new(
        mut storage: OpStorage,
        resources: ResourceTable,
        op_count: usize,
        cull_rect: Rect,
    ) -> Self {
        storage.shrink_to_fit();
        let (op_count_nested, byte_count_nested) = resources.nested_lists().fold(
            (op_count, storage.used()),
            |(ops, bytes), nested| (ops + nested.op_count_nested, bytes + nested.byte_count_nested),
        );
        Self {
            storage,
            resources,
            op_count,
            op_count_nested,
            byte_count_nested,
            cull_rect,
            bounds: OnceLock::new(),
            unique_id: next_unique_id(),
        }
    }

    /// Number of recorded ops.
    #[must_use]
    pub const fn op_count(&self) -> usize {
        self.op_count
    }

    /// Number of recorded ops, counting every op of nested lists and
    /// pictures each time they are drawn.
    #[must_use]
    pub const fn op_count_nested(&self) -> usize {
        self.op_count_nested
    }

    /// Size of the op buffer in bytes.
    #[must_use]
    pub fn byte_count(&self) -> usize {
        self.storage.used()
    }

    /// Size of the op buffer in bytes, including nested lists and
    /// pictures each time they are drawn.
    #[must_use]
    pub const fn byte_count_nested(&self) -> usize {
        self.byte_count_nested
    }

    /// The cull rect supplied when recording began.
    #[must_use]
    pub const fn cull_rect(&self) -> &Rect {
        &self.cull_rect
    }

    /// Identity of this list, unique for the life of the process and
    /// never zero. Two lists with identical content have different ids.
    #[must_use]
    pub const fn unique_id(&self) -> u32 {
        self.unique_id
    }

    /// The kind of each recorded op, in order.
    pub fn kinds(&self) -> impl Iterator<Item = OpKind> + '_ {
        self.storage.records().map(|record| record.header.kind)
    }

    /// Replay every op into `dispatcher`.
    pub fn dispatch(&self, dispatcher: &mut dyn Dispatcher) {
        self.dispatch_range(dispatcher, 0..self.op_count);
    }

    /// Replay the ops whose indices fall in `ops`. Indices past the end
    /// are ignored.
    ///
    /// A range that does not start at zero may begin inside a save or end
    /// with saves still open; balancing them is up to the caller.
    pub fn dispatch_range(&self, dispatcher: &mut dyn Dispatcher, ops: Range<usize>) {
        #[cfg(feature = "dispatch-trace")]
        let depth = DispatchDepth::enter();
        #[cfg(feature = "dispatch-trace")]
        eprintln!(
            "{:indent$}[DISPATCH] list {} ops {:?} of {}",
            "",
            self.unique_id,
            ops,
            self.op_count,
            indent = depth.0 * 2
        );

        for record in self.storage.records().take(ops.end).skip(ops.start) {
            #[cfg(feature = "dispatch-trace")]
            eprintln!(
                "{:indent$}[DISPATCH] @{} {} ({} bytes)",
                "",
                record.offset,
                record.header.kind,
                record.header.size,
                indent = depth.0 * 2 + 2
            );
            DisplayOp::decode(record.header.kind, record.body, &self.resources).dispatch(dispatcher);
        }
    }

    /// Replay every op onto `canvas`.
    pub fn render_to(&self, canvas: &mut dyn Canvas) {
        let mut adapter = CanvasDispatcher::new(canvas);
        self.dispatch(&mut adapter);
    }

    /// Conservative bounds of everything the list draws.
    ///
    /// Computed on first use and cached. Ops that are not bounded by their
    /// geometry (filling the clip, unbounded blend modes or filters) are
    /// bounded by the clip in effect, which starts as the cull rect.
    pub fn bounds(&self) -> Rect {
        *self
            .bounds
            .get_or_init(|| BoundsAccumulator::measure(self, &self.cull_rect))
    }

    /// True if both lists record the same ops with the same arguments.
    ///
    /// A list is always equal to itself. Otherwise both lists must have the
    /// same size and op count and match record by record.
    #[must_use]
    pub fn equals(&self, other: &Self) -> bool {
        equality::lists_equal(self, other)
    }

    pub(crate) const fn storage(&self) -> &OpStorage {
        &self.storage
    }

    pub(crate) const fn resources(&self) -> &ResourceTable {
        &self.resources
    }
}

impl PartialEq for DisplayList {
    fn eq(&self, other: &Self) -> bool {
        self.equals(other)
    }
}

impl fmt::Debug for DisplayList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DisplayList")
            .field("unique_id", &self.unique_id)
            .field("op_count", &self.op_count)
            .field("byte_count", &self.storage.used())
            .field("resources", &self.resources.len())
            .field("cull_rect", &self.cull_rect)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unique_ids_are_distinct_and_nonzero() {
        let a = DisplayList::new(OpStorage::default(), ResourceTable::default(), 0, Rect::LARGEST);
        let b = DisplayList::new(OpStorage::default(), ResourceTable::default(), 0, Rect::LARGEST);
        assert_ne!(a.unique_id(), 0);
        assert_ne!(a.unique_id(), b.unique_id());
        assert!(b.unique_id() > a.unique_id());
    }

    #[test]
    fn test_empty_list() {
        let list = DisplayList::new(OpStorage::default(), ResourceTable::default(), 0, Rect::LARGEST);
        assert_eq!(list.op_count(), 0);
        assert_eq!(list.byte_count(), 0);
        assert!(list.bounds().is_empty());
        assert!(list.equals(&list));
    }

    #[test]
    fn test_display_list_is_send_and_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<DisplayList>();
    }
}
