// QuickFit - fixed size-class memory allocator
// O(1) allocate and free over a predeclared set of block sizes

#![warn(rust_2018_idioms)]

pub mod allocator;
pub mod config;
pub mod replay;

// Re-exports for convenience
pub use allocator::{AllocatorStatus, BlockId, QuickFitAllocator, SharedQuickFit, SizeClassStatus};
pub use config::AllocatorConfig;

/// QuickFit error types
pub mod error {
    use crate::allocator::BlockId;
    use thiserror::Error;

    #[derive(Error, Debug)]
    pub enum Error {
        #[error("Size {size} is not supported")]
        UnsupportedSizeClass { size: usize },

        #[error("Block {id} of size {size} not found")]
        BlockNotFound { size: usize, id: BlockId },

        #[error("Out of memory: size class {size} is full ({capacity} blocks)")]
        OutOfMemory { size: usize, capacity: u64 },

        #[error("Invalid configuration: {0}")]
        InvalidConfig(String),

        #[error("Parse error on line {line}: {message}")]
        Parse { line: usize, message: String },
    }

    pub type Result<T> = std::result::Result<T, Error>;
}

/// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
