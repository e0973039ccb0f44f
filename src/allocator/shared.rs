//! Thread-safe quick-fit allocator
//!
//! Each size class sits behind its own lock, so calls on different
//! classes never contend. `status()` holds every class lock at once,
//! taken in class order, which makes the snapshot atomic across classes.

use super::block::BlockId;
use super::quick_fit::{allocate_in, build_classes, deallocate_in, ClassTable};
use super::size_class::SizeClass;
use super::stats::AllocatorStatus;
use crate::config::AllocatorConfig;
use crate::error::Result;
use parking_lot::{Mutex, MutexGuard};

/// Quick-fit allocator usable through `&self` from many threads
#[derive(Debug)]
pub struct SharedQuickFit {
    table: ClassTable,
    classes: Vec<Mutex<SizeClass>>,
}

impl SharedQuickFit {
    pub fn new(sizes: &[usize]) -> Result<Self> {
        Self::with_config(AllocatorConfig::with_sizes(sizes))
    }

    pub fn with_config(config: AllocatorConfig) -> Result<Self> {
        let (table, classes) = build_classes(&config)?;
        Ok(Self {
            table,
            classes: classes.into_iter().map(Mutex::new).collect(),
        })
    }

    /// Allocate a block of exactly `size` bytes
    pub fn allocate(&self, size: usize) -> Result<BlockId> {
        let index = self.table.index_of(size)?;
        allocate_in(&mut self.classes[index].lock())
    }

    /// Return `id` to the free stack of class `size`
    pub fn deallocate(&self, size: usize, id: BlockId) -> Result<()> {
        let index = self.table.index_of(size)?;
        deallocate_in(&mut self.classes[index].lock(), id)
    }

    /// Snapshot of all classes taken under every class lock
    pub fn status(&self) -> AllocatorStatus {
        let guards: Vec<MutexGuard<'_, SizeClass>> =
            self.classes.iter().map(|c| c.lock()).collect();

        AllocatorStatus {
            size_classes: guards.iter().map(|sc| sc.status()).collect(),
        }
    }

    pub fn supports(&self, size: usize) -> bool {
        self.table.find(size).is_some()
    }

    pub fn is_allocated(&self, size: usize, id: BlockId) -> bool {
        self.table
            .find(size)
            .is_some_and(|index| self.classes[index].lock().is_used(id))
    }
}
