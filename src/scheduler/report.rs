//! Inventory availability reporting.

use super::assignment::AssignmentStatus;
use super::block::{Block, BlockRegistry};
use super::store::AssignmentStore;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Per-block line of an [`AvailabilityReport`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockDetail {
    /// Registrant-group prefix
    pub prefix: String,
    /// Registrant code
    pub registrant_code: String,
    /// First sequence number
    pub start: u64,
    /// Last sequence number
    pub end: u64,
    /// Total numbers in the block
    pub capacity: u64,
    /// Numbers drawn
    pub used: u64,
    /// Numbers left
    pub available: u64,
    /// Imprint the block is earmarked for
    pub imprint: Option<String>,
}

impl From<&Block> for BlockDetail {
    fn from(block: &Block) -> Self {
        Self {
            prefix: block.prefix.clone(),
            registrant_code: block.registrant_code.clone(),
            start: block.start,
            end: block.end,
            capacity: block.capacity(),
            used: block.used,
            available: block.available(),
            imprint: block.imprint.clone(),
        }
    }
}

/// Capacity and usage across all blocks, plus assignment counts per status.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AvailabilityReport {
    /// Number of registered blocks
    pub total_blocks: usize,
    /// Sum of block capacities
    pub total_capacity: u64,
    /// Numbers drawn across all blocks
    pub used: u64,
    /// Numbers still available
    pub available: u64,
    /// Assignment count per status
    pub by_status: BTreeMap<AssignmentStatus, usize>,
    /// One line per block, in registration order
    pub per_block_detail: Vec<BlockDetail>,
}

impl AvailabilityReport {
    /// Build a report from the current registry and store.
    #[must_use]
    pub fn build(registry: &BlockRegistry, store: &AssignmentStore) -> Self {
        Self {
            total_blocks: registry.len(),
            total_capacity: registry.total_capacity(),
            used: registry.total_used(),
            available: registry.total_available(),
            by_status: store.count_by_status(),
            per_block_detail: registry.blocks().iter().map(BlockDetail::from).collect(),
        }
    }

    /// Fraction of total capacity already drawn, `0.0` with no blocks.
    #[must_use]
    pub fn utilization(&self) -> f64 {
        if self.total_capacity == 0 {
            0.0
        } else {
            self.used as f64 / self.total_capacity as f64
        }
    }

    /// Count for one status.
    #[must_use]
    pub fn count(&self, status: AssignmentStatus) -> usize {
        self.by_status.get(&status).copied().unwrap_or(0)
    }
}
