//! Quick-fit allocator
//!
//! Services requests against a fixed set of block sizes. Every size has
//! its own class with a LIFO free stack, a used set and a mint counter,
//! so allocate and free are O(1) with no searching.
//!
//! # Architecture
//!
//! ```text
//! QuickFitAllocator
//!   ├─→ SizeClass(16B)   → Free: [2, 0]   Used: {1, 3}   next_id: 4
//!   ├─→ SizeClass(32B)   → Free: []       Used: {0}      next_id: 1
//!   ├─→ SizeClass(64B)   → Free: [0]      Used: {}       next_id: 1
//!   └─→ SizeClass(128B)  → Free: []       Used: {}       next_id: 0
//! ```
//!
//! Block ids are scoped to their class. A freed id goes on top of the
//! free stack and is the next one handed out for that size.
//!
//! [`QuickFitAllocator`] is the single-threaded form. [`SharedQuickFit`]
//! puts each class behind its own lock.
//!
//! Blocks are abstract ids; no backing memory is reserved. A capacity
//! set through [`AllocatorConfig`](crate::config::AllocatorConfig) bounds
//! minting and makes exhausted classes fail with `OutOfMemory`.

pub mod block;
pub mod quick_fit;
pub mod shared;
pub mod size_class;
pub mod stats;

pub use block::BlockId;
pub use quick_fit::QuickFitAllocator;
pub use shared::SharedQuickFit;
pub use size_class::SizeClass;
pub use stats::{AllocatorStatus, SizeClassStatus};
