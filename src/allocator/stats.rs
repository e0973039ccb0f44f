//! Allocator status snapshots

use serde::{Deserialize, Serialize};
use std::fmt;

/// Counters for one size class at a single point in time
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SizeClassStatus {
    pub size: usize,
    pub free: usize,
    pub used: usize,
    pub minted: u64,
}

/// Snapshot of every size class, in construction order
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AllocatorStatus {
    pub size_classes: Vec<SizeClassStatus>,
}

impl AllocatorStatus {
    /// Counters for a single class
    pub fn class(&self, size: usize) -> Option<&SizeClassStatus> {
        self.size_classes.iter().find(|c| c.size == size)
    }

    pub fn total_free(&self) -> usize {
        self.size_classes.iter().map(|c| c.free).sum()
    }

    pub fn total_used(&self) -> usize {
        self.size_classes.iter().map(|c| c.used).sum()
    }

    pub fn total_minted(&self) -> u64 {
        self.size_classes.iter().map(|c| c.minted).sum()
    }

    /// Bytes held by live blocks
    ///
    /// Widened to `u128` so very large classes cannot overflow.
    pub fn used_bytes(&self) -> u128 {
        self.size_classes
            .iter()
            .map(|c| c.used as u128 * c.size as u128)
            .sum()
    }
}

impl fmt::Display for AllocatorStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Memory status:")?;
        for class in &self.size_classes {
            writeln!(
                f,
                "  Size {} - Free: {}, Used: {}",
                class.size, class.free, class.used
            )?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> AllocatorStatus {
        AllocatorStatus {
            size_classes: vec![
                SizeClassStatus { size: 16, free: 1, used: 1, minted: 2 },
                SizeClassStatus { size: 32, free: 0, used: 1, minted: 1 },
            ],
        }
    }

    #[test]
    fn test_totals() {
        let status = sample();
        assert_eq!(status.total_free(), 1);
        assert_eq!(status.total_used(), 2);
        assert_eq!(status.total_minted(), 3);
        assert_eq!(status.used_bytes(), 48);
        assert_eq!(status.class(32).map(|c| c.used), Some(1));
        assert!(status.class(64).is_none());
    }

    #[test]
    fn test_used_bytes_with_huge_class() {
        let size = usize::MAX / 2 + 1;
        let status = AllocatorStatus {
            size_classes: vec![
                SizeClassStatus { size, free: 0, used: 2, minted: 2 },
                SizeClassStatus { size: usize::MAX, free: 0, used: 3, minted: 3 },
            ],
        };
        let expected = 2 * size as u128 + 3 * usize::MAX as u128;
        assert_eq!(status.used_bytes(), expected);
    }

    #[test]
    fn test_display_report() {
        let report = sample().to_string();
        assert_eq!(
            report,
            "Memory status:\n  Size 16 - Free: 1, Used: 1\n  Size 32 - Free: 0, Used: 1\n"
        );
    }

    #[test]
    fn test_json_shape() {
        let json = serde_json::to_value(sample()).unwrap();
        assert_eq!(json["size_classes"][0]["size"], 16);
        assert_eq!(json["size_classes"][1]["minted"], 1);
    }
}
