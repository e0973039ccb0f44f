//! Per-size-class bookkeeping
//!
//! Every id minted for a class is in exactly one of two places: the free
//! stack or the used set. The used set is a dense bitmap indexed by id,
//! since ids are always `0..next_id`.

use super::block::BlockId;
use super::stats::SizeClassStatus;
use crate::error::{Error, Result};

/// Free stack, used set and mint counter for one block size
#[derive(Debug, Clone)]
pub struct SizeClass {
    /// Block size served by this class (bytes)
    pub block_size: usize,
    /// Position of this class in construction order
    pub index: usize,
    /// Freed ids, most recently freed last
    free: Vec<BlockId>,
    /// `live[id]` is true while `id` is in the used set
    live: Vec<bool>,
    used: usize,
    /// Maximum number of ids this class may mint
    capacity: Option<u64>,
}

impl SizeClass {
    /// Create an empty size class
    pub fn new(index: usize, block_size: usize, capacity: Option<u64>) -> Self {
        Self {
            block_size,
            index,
            free: Vec::new(),
            live: Vec::new(),
            used: 0,
            capacity,
        }
    }

    /// Take the most recently freed id, if any
    pub fn pop_free(&mut self) -> Option<BlockId> {
        let id = self.free.pop()?;
        if let Some(live) = self.slot_mut(id) {
            *live = true;
        }
        self.used += 1;
        Some(id)
    }

    /// Mint a brand-new id and mark it used
    pub fn mint(&mut self) -> Result<BlockId> {
        let next = self.minted();
        if let Some(capacity) = self.capacity {
            if next >= capacity {
                return Err(Error::OutOfMemory {
                    size: self.block_size,
                    capacity,
                });
            }
        }

        self.live.push(true);
        self.used += 1;
        Ok(BlockId::new(next))
    }

    /// Move a used id onto the free stack
    pub fn release(&mut self, id: BlockId) -> Result<()> {
        match self.slot_mut(id) {
            Some(live) if *live => {
                *live = false;
                self.used -= 1;
                self.free.push(id);
                Ok(())
            }
            _ => Err(Error::BlockNotFound {
                size: self.block_size,
                id,
            }),
        }
    }

    /// Whether `id` is currently allocated
    pub fn is_used(&self, id: BlockId) -> bool {
        id.index()
            .and_then(|i| self.live.get(i))
            .copied()
            .unwrap_or(false)
    }

    fn slot_mut(&mut self, id: BlockId) -> Option<&mut bool> {
        id.index().and_then(|i| self.live.get_mut(i))
    }

    pub fn free_count(&self) -> usize {
        self.free.len()
    }

    pub fn used_count(&self) -> usize {
        self.used
    }

    /// Number of ids ever minted; also the next id to mint
    pub fn minted(&self) -> u64 {
        self.live.len() as u64
    }

    /// Point-in-time counters for this class
    pub fn status(&self) -> SizeClassStatus {
        SizeClassStatus {
            size: self.block_size,
            free: self.free_count(),
            used: self.used_count(),
            minted: self.minted(),
        }
    }
}
