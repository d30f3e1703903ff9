use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;

use crate::store::{DirtyFields, Field};

/// Coalesces the mutations of one unit of work into a single dirty set.
///
/// The batcher only does bookkeeping; [`Store`](crate::Store) drives the
/// actual flush. `depth` counts open batches (nested batches run inline and
/// the outermost one owns the flush), `flushing` keeps a flush from recursing
/// into itself when a subscriber mutates state: those mutations are picked up
/// by the outer flush loop as a fresh pass.
pub(crate) struct Batcher {
    depth: AtomicUsize,
    flushing: AtomicBool,
    dirty: Mutex<DirtyFields>,
}

impl Batcher {
    pub(crate) fn new() -> Self {
        Self {
            depth: AtomicUsize::new(0),
            flushing: AtomicBool::new(false),
            dirty: Mutex::new(DirtyFields::new()),
        }
    }

    pub(crate) fn enter(&self) {
        self.depth.fetch_add(1, Ordering::SeqCst);
    }

    /// Close one batch level, returning the remaining depth.
    pub(crate) fn exit(&self) -> usize {
        self.depth.fetch_sub(1, Ordering::SeqCst) - 1
    }

    pub(crate) fn idle(&self) -> bool {
        self.depth.load(Ordering::SeqCst) == 0
    }

    pub(crate) fn mark<I: IntoIterator<Item = Field>>(&self, fields: I) {
        self.dirty.lock().unwrap().extend(fields);
    }

    pub(crate) fn take_dirty(&self) -> DirtyFields {
        std::mem::take(&mut *self.dirty.lock().unwrap())
    }

    /// Returns false when a flush is already running on this batcher.
    pub(crate) fn begin_flush(&self) -> bool {
        !self.flushing.swap(true, Ordering::SeqCst)
    }

    pub(crate) fn end_flush(&self) {
        self.flushing.store(false, Ordering::SeqCst);
    }
}
