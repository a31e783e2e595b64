//! Inventory blocks of sequence numbers and the registry that draws from them.

use super::checksum::{format_identifier, sequence_width};
use super::error::ScheduleError;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, trace};

/// Index of a block in registration order.
pub type BlockId = usize;

/// A contiguous, inclusive range of sequence numbers owned by one
/// prefix / registrant-code pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Block {
    /// Three-digit registrant-group prefix, e.g. `"978"`
    pub prefix: String,

    /// Publisher registrant code
    pub registrant_code: String,

    /// First sequence number in the block (inclusive)
    pub start: u64,

    /// Last sequence number in the block (inclusive)
    pub end: u64,

    /// How many sequence numbers have been drawn so far
    #[serde(default)]
    pub used: u64,

    /// Imprint this block is earmarked for, if any
    #[serde(default)]
    pub imprint: Option<String>,
}

impl Block {
    /// Total number of sequence numbers in the block.
    #[must_use]
    #[inline]
    pub fn capacity(&self) -> u64 {
        // saturates for a full u64 range; such a block never validates
        self.end.saturating_sub(self.start).saturating_add(1)
    }

    /// Sequence numbers not yet drawn.
    #[must_use]
    #[inline]
    pub fn available(&self) -> u64 {
        self.capacity().saturating_sub(self.used)
    }

    /// True once every sequence number has been drawn.
    #[must_use]
    #[inline]
    pub fn is_exhausted(&self) -> bool {
        self.available() == 0
    }

    /// The sequence number the next draw would return.
    #[must_use]
    pub fn peek_next(&self) -> Option<u64> {
        (!self.is_exhausted()).then(|| self.start + self.used)
    }

    /// Draw the next unused sequence number, consuming it permanently.
    ///
    /// # Errors
    ///
    /// Returns [`ScheduleError::CapacityExhausted`] when the block is full.
    pub fn draw_next(&mut self) -> Result<u64, ScheduleError> {
        let sequence = self.peek_next().ok_or(ScheduleError::CapacityExhausted)?;
        self.used += 1;
        trace!(
            "drew sequence {} from block {}-{} ({} left)",
            sequence,
            self.prefix,
            self.registrant_code,
            self.available()
        );
        Ok(sequence)
    }

    /// Format a sequence number of this block as a full identifier.
    #[must_use]
    pub fn identifier_for(&self, sequence_number: u64) -> String {
        format_identifier(&self.prefix, &self.registrant_code, sequence_number)
    }

    /// The digits every identifier issued from this block starts with.
    #[must_use]
    pub fn identifier_stem(&self) -> String {
        format!("{}{}", self.prefix, self.registrant_code)
    }

    /// Whether `identifier` carries this block's prefix and registrant code.
    #[must_use]
    pub fn matches_identifier(&self, identifier: &str) -> bool {
        identifier.starts_with(&self.identifier_stem())
    }

    /// Whether two blocks of the same prefix/registrant pair share sequence numbers.
    #[must_use]
    pub fn overlaps(&self, other: &Block) -> bool {
        self.prefix == other.prefix
            && self.registrant_code == other.registrant_code
            && self.start <= other.end
            && other.start <= self.end
    }

    /// Check the structural invariants of a block.
    ///
    /// # Errors
    ///
    /// Returns [`ScheduleError::InvalidBlock`] describing the first violated
    /// invariant.
    pub fn validate(&self) -> Result<(), ScheduleError> {
        let invalid = |message: String| Err(ScheduleError::InvalidBlock { message });

        if self.prefix.is_empty() || !self.prefix.bytes().all(|b| b.is_ascii_digit()) {
            return invalid(format!("prefix {:?} must be digits", self.prefix));
        }
        if self.registrant_code.is_empty()
            || !self.registrant_code.bytes().all(|b| b.is_ascii_digit())
        {
            return invalid(format!(
                "registrant code {:?} must be digits",
                self.registrant_code
            ));
        }
        if self.end < self.start {
            return invalid(format!("end {} is before start {}", self.end, self.start));
        }

        let width = sequence_width(&self.prefix, &self.registrant_code);
        if width == 0 {
            return invalid(format!(
                "prefix {} and registrant code {} leave no sequence digits",
                self.prefix, self.registrant_code
            ));
        }
        // consecutive numbers stay distinct after keeping the rightmost
        // `width` digits only while the range is no larger than 10^width
        let room = 10u64.pow(width as u32);
        if self.end - self.start >= room {
            return invalid(format!(
                "range {}..={} holds {} numbers but only {} fit in {} digits",
                self.start,
                self.end,
                self.capacity(),
                room,
                width
            ));
        }
        if self.used > self.capacity() {
            return invalid(format!(
                "used count {} exceeds capacity {}",
                self.used,
                self.capacity()
            ));
        }
        Ok(())
    }
}

/// Ordered collection of blocks with first-fit drawing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BlockRegistry {
    blocks: Vec<Block>,
}

impl BlockRegistry {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild a registry from persisted blocks, keeping their order.
    ///
    /// # Errors
    ///
    /// Returns the first [`ScheduleError::InvalidBlock`] found.
    pub fn from_blocks(blocks: Vec<Block>) -> Result<Self, ScheduleError> {
        for block in &blocks {
            block.validate()?;
        }
        Ok(Self { blocks })
    }

    /// Register a new block with zero used count.
    ///
    /// # Errors
    ///
    /// Returns [`ScheduleError::InvalidBlock`] if the block is malformed or
    /// overlaps a block already registered for the same prefix and
    /// registrant code.
    pub fn add_block(
        &mut self,
        prefix: &str,
        start: u64,
        end: u64,
        registrant_code: &str,
        imprint: Option<String>,
    ) -> Result<BlockId, ScheduleError> {
        let block = Block {
            prefix: prefix.trim().to_string(),
            registrant_code: registrant_code.trim().to_string(),
            start,
            end,
            used: 0,
            imprint,
        };
        block.validate()?;

        if let Some(existing) = self.blocks.iter().find(|b| b.overlaps(&block)) {
            return Err(ScheduleError::InvalidBlock {
                message: format!(
                    "range {}..={} overlaps existing block {}..={} for {}",
                    block.start,
                    block.end,
                    existing.start,
                    existing.end,
                    existing.identifier_stem()
                ),
            });
        }

        let id = self.blocks.len();
        info!(
            "Added block {} for {}: {}..={} ({} numbers)",
            id,
            block.identifier_stem(),
            block.start,
            block.end,
            block.capacity()
        );
        self.blocks.push(block);
        Ok(id)
    }

    /// Draw the next sequence number from a specific block.
    ///
    /// # Errors
    ///
    /// Returns [`ScheduleError::NotFound`] for an unknown block and
    /// [`ScheduleError::CapacityExhausted`] when the block is full.
    pub fn draw_next(&mut self, id: BlockId) -> Result<u64, ScheduleError> {
        let block = self.blocks.get_mut(id).ok_or_else(|| ScheduleError::NotFound {
            key: format!("block {id}"),
        })?;
        block.draw_next()
    }

    /// First block, in registration order, with remaining capacity.
    #[must_use]
    pub fn first_block_with_capacity(&self) -> Option<BlockId> {
        let found = self.blocks.iter().position(|b| !b.is_exhausted());
        debug!("first block with capacity: {:?}", found);
        found
    }

    /// Draw from the first block with capacity, returning the block used and
    /// the formatted identifier.
    ///
    /// # Errors
    ///
    /// Returns [`ScheduleError::CapacityExhausted`] when every block is full.
    pub fn draw_identifier(&mut self) -> Result<(BlockId, String), ScheduleError> {
        let id = self
            .first_block_with_capacity()
            .ok_or(ScheduleError::CapacityExhausted)?;
        let sequence = self.draw_next(id)?;
        Ok((id, self.blocks[id].identifier_for(sequence)))
    }

    /// Get a block by id.
    #[must_use]
    pub fn get(&self, id: BlockId) -> Option<&Block> {
        self.blocks.get(id)
    }

    /// All blocks in registration order.
    #[must_use]
    pub fn blocks(&self) -> &[Block] {
        &self.blocks
    }

    /// The block an identifier was drawn from, matched by prefix and
    /// registrant code.
    #[must_use]
    pub fn block_for_identifier(&self, identifier: &str) -> Option<&Block> {
        self.blocks.iter().find(|b| b.matches_identifier(identifier))
    }

    /// Number of registered blocks.
    #[must_use]
    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    /// True when no block is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    /// Sum of all block capacities.
    #[must_use]
    pub fn total_capacity(&self) -> u64 {
        self.blocks.iter().map(Block::capacity).sum()
    }

    /// Sum of all used counts.
    #[must_use]
    pub fn total_used(&self) -> u64 {
        self.blocks.iter().map(|b| b.used).sum()
    }

    /// Numbers still available across every block.
    #[must_use]
    pub fn total_available(&self) -> u64 {
        self.blocks.iter().map(Block::available).sum()
    }
}
