//! Quick-fit allocator over a fixed set of size classes

use super::block::BlockId;
use super::size_class::SizeClass;
use super::stats::AllocatorStatus;
use crate::config::AllocatorConfig;
use crate::error::{Error, Result};
use tracing::{debug, info, warn};

/// Sorted `(size, class index)` pairs, built once at construction
#[derive(Debug, Clone)]
pub(crate) struct ClassTable {
    entries: Vec<(usize, usize)>,
}

impl ClassTable {
    pub(crate) fn new(sizes: &[usize]) -> Self {
        let mut entries: Vec<_> = sizes.iter().enumerate().map(|(i, &s)| (s, i)).collect();
        entries.sort_unstable();
        Self { entries }
    }

    pub(crate) fn find(&self, size: usize) -> Option<usize> {
        self.entries
            .binary_search_by_key(&size, |&(s, _)| s)
            .ok()
            .map(|pos| self.entries[pos].1)
    }

    pub(crate) fn index_of(&self, size: usize) -> Result<usize> {
        self.find(size).ok_or_else(|| {
            warn!(size, "Size class not supported");
            Error::UnsupportedSizeClass { size }
        })
    }
}

/// Builds the per-class state described by `config`
pub(crate) fn build_classes(config: &AllocatorConfig) -> Result<(ClassTable, Vec<SizeClass>)> {
    config.validate()?;

    let classes = config
        .sizes
        .iter()
        .enumerate()
        .map(|(index, &size)| SizeClass::new(index, size, config.max_blocks_per_class))
        .collect();

    info!(
        "Initializing quick-fit allocator with {} size classes: {:?}",
        config.sizes.len(),
        config.sizes
    );

    Ok((ClassTable::new(&config.sizes), classes))
}

pub(crate) fn allocate_in(class: &mut SizeClass) -> Result<BlockId> {
    if let Some(id) = class.pop_free() {
        debug!(size = class.block_size, %id, "Allocated reused block");
        return Ok(id);
    }

    match class.mint() {
        Ok(id) => {
            debug!(size = class.block_size, %id, "Allocated new block");
            Ok(id)
        }
        Err(e) => {
            warn!(size = class.block_size, "Allocation failed: {}", e);
            Err(e)
        }
    }
}

pub(crate) fn deallocate_in(class: &mut SizeClass, id: BlockId) -> Result<()> {
    class.release(id).inspect_err(|_| {
        warn!(size = class.block_size, %id, "Block not found");
    })?;
    debug!(size = class.block_size, %id, "Deallocated block");
    Ok(())
}

/// Single-threaded quick-fit allocator
///
/// Each configured size gets its own free stack and used set. Requests
/// must name a configured size exactly; there is no rounding up to a
/// larger class.
#[derive(Debug, Clone)]
pub struct QuickFitAllocator {
    table: ClassTable,
    classes: Vec<SizeClass>,
}

impl QuickFitAllocator {
    /// Create an allocator for the given sizes
    ///
    /// Fails with [`Error::InvalidConfig`] if `sizes` is empty, holds a
    /// zero, or names a size twice.
    pub fn new(sizes: &[usize]) -> Result<Self> {
        Self::with_config(AllocatorConfig::with_sizes(sizes))
    }

    pub fn with_config(config: AllocatorConfig) -> Result<Self> {
        let (table, classes) = build_classes(&config)?;
        Ok(Self { table, classes })
    }

    /// Allocate a block of exactly `size` bytes
    ///
    /// Reuses the most recently freed block of that class when there is
    /// one, otherwise mints the next id.
    pub fn allocate(&mut self, size: usize) -> Result<BlockId> {
        let index = self.table.index_of(size)?;
        allocate_in(&mut self.classes[index])
    }

    /// Return `id` to the free stack of class `size`
    ///
    /// Fails with [`Error::BlockNotFound`] if `id` is not currently
    /// allocated in that class, which covers double frees.
    pub fn deallocate(&mut self, size: usize, id: BlockId) -> Result<()> {
        let index = self.table.index_of(size)?;
        deallocate_in(&mut self.classes[index], id)
    }

    /// Free and used counts per class
    pub fn status(&self) -> AllocatorStatus {
        AllocatorStatus {
            size_classes: self.classes.iter().map(SizeClass::status).collect(),
        }
    }

    /// Configured sizes in construction order
    pub fn sizes(&self) -> Vec<usize> {
        self.classes.iter().map(|c| c.block_size).collect()
    }

    pub fn supports(&self, size: usize) -> bool {
        self.table.find(size).is_some()
    }

    /// Whether `id` is currently allocated in class `size`
    pub fn is_allocated(&self, size: usize, id: BlockId) -> bool {
        self.table
            .find(size)
            .is_some_and(|index| self.classes[index].is_used(id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn allocator() -> QuickFitAllocator {
        QuickFitAllocator::new(&[16, 32, 64, 128]).unwrap()
    }

    #[test]
    fn test_class_table_lookup() {
        let table = ClassTable::new(&[64, 16, 128, 32]);
        assert_eq!(table.index_of(64).unwrap(), 0);
        assert_eq!(table.index_of(16).unwrap(), 1);
        assert_eq!(table.index_of(32).unwrap(), 3);
        assert!(matches!(
            table.index_of(48),
            Err(Error::UnsupportedSizeClass { size: 48 })
        ));
    }

    #[test]
    fn test_rejects_bad_sizes() {
        assert!(QuickFitAllocator::new(&[]).is_err());
        assert!(QuickFitAllocator::new(&[16, 16]).is_err());
        assert!(QuickFitAllocator::new(&[0]).is_err());
    }

    #[test]
    fn test_ids_are_scoped_per_class() -> Result<()> {
        let mut alloc = allocator();
        assert_eq!(alloc.allocate(16)?, BlockId::new(0));
        assert_eq!(alloc.allocate(32)?, BlockId::new(0));
        assert_eq!(alloc.allocate(16)?, BlockId::new(1));

        assert!(alloc.is_allocated(16, BlockId::new(1)));
        assert!(!alloc.is_allocated(32, BlockId::new(1)));
        Ok(())
    }

    #[test]
    fn test_lifo_reuse() -> Result<()> {
        let mut alloc = allocator();
        let a = alloc.allocate(64)?;
        let b = alloc.allocate(64)?;

        alloc.deallocate(64, a)?;
        alloc.deallocate(64, b)?;

        assert_eq!(alloc.allocate(64)?, b);
        assert_eq!(alloc.allocate(64)?, a);
        assert_eq!(alloc.allocate(64)?, BlockId::new(2));
        Ok(())
    }

    #[test]
    fn test_unsupported_size_leaves_state_untouched() -> Result<()> {
        let mut alloc = allocator();
        alloc.allocate(16)?;
        let before = alloc.status();

        assert!(matches!(
            alloc.allocate(24),
            Err(Error::UnsupportedSizeClass { size: 24 })
        ));
        assert!(matches!(
            alloc.deallocate(24, BlockId::new(0)),
            Err(Error::UnsupportedSizeClass { size: 24 })
        ));
        assert_eq!(alloc.status(), before);
        assert!(!alloc.supports(24));
        Ok(())
    }

    #[test]
    fn test_wrong_class_is_block_not_found() -> Result<()> {
        let mut alloc = allocator();
        let id = alloc.allocate(16)?;

        let err = alloc.deallocate(32, id).unwrap_err();
        assert!(matches!(err, Error::BlockNotFound { size: 32, .. }));
        assert!(alloc.is_allocated(16, id));
        Ok(())
    }

    #[test]
    fn test_capacity_reports_out_of_memory() -> Result<()> {
        let config = AllocatorConfig::with_sizes(&[16]).max_blocks_per_class(2);
        let mut alloc = QuickFitAllocator::with_config(config)?;
        alloc.allocate(16)?;
        let b = alloc.allocate(16)?;

        assert!(matches!(
            alloc.allocate(16),
            Err(Error::OutOfMemory { size: 16, capacity: 2 })
        ));

        alloc.deallocate(16, b)?;
        assert_eq!(alloc.allocate(16)?, b);
        Ok(())
    }

    #[test]
    fn test_status_of_huge_class_does_not_overflow() -> Result<()> {
        let size = usize::MAX / 2 + 1;
        let mut alloc = QuickFitAllocator::new(&[size])?;
        alloc.allocate(size)?;
        alloc.allocate(size)?;

        let status = alloc.status();
        assert_eq!(status.used_bytes(), 2 * size as u128);
        assert_eq!(status.total_used(), 2);
        Ok(())
    }

    #[test]
    fn test_sizes_keep_construction_order() -> Result<()> {
        let alloc = QuickFitAllocator::new(&[128, 16, 64])?;
        assert_eq!(alloc.sizes(), vec![128, 16, 64]);
        let reported: Vec<_> = alloc.status().size_classes.iter().map(|c| c.size).collect();
        assert_eq!(reported, vec![128, 16, 64]);
        Ok(())
    }
}
