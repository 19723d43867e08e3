//! Memory manager
//!
//! A flat simulated byte arena with a bump allocator and a region registry.
//! Addresses are zero-based offsets into the arena; reads and writes are
//! bounds-checked against the arena size. `free` only drops the registry
//! entry; bump allocation never reclaims space.

use crate::error::{Result, VmError};
use bdi_core::RegionId;
use std::collections::HashMap;
use tracing::{debug, warn};

/// A contiguous allocated range inside the arena
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MemoryRegion {
    pub id: RegionId,
    pub base: u64,
    pub size: usize,
    /// Stored for introspection; not enforced on writes in this core
    pub read_only: bool,
}

/// Flat byte arena with bump allocation
#[derive(Debug)]
pub struct MemoryManager {
    arena: Vec<u8>,
    next_offset: usize,
    regions: HashMap<RegionId, MemoryRegion>,
    next_region_id: RegionId,
}

impl MemoryManager {
    pub fn new(total_bytes: usize) -> Self {
        debug!(total_bytes, "memory arena initialized");
        Self {
            arena: vec![0u8; total_bytes],
            next_offset: 0,
            regions: HashMap::new(),
            next_region_id: 1,
        }
    }

    /// Allocate a fresh region of `size` bytes
    ///
    /// Region ids are monotonic starting at 1. Fails when the cursor would
    /// pass the arena end; freed space is never reused.
    pub fn allocate(&mut self, size: usize, read_only: bool) -> Result<RegionId> {
        let end = self.next_offset.checked_add(size).ok_or(VmError::OutOfMemory {
            requested: size,
            available: self.arena.len() - self.next_offset,
        })?;
        if end > self.arena.len() {
            return Err(VmError::OutOfMemory {
                requested: size,
                available: self.arena.len() - self.next_offset,
            });
        }
        let id = self.next_region_id;
        self.next_region_id += 1;
        let region = MemoryRegion {
            id,
            base: self.next_offset as u64,
            size,
            read_only,
        };
        self.next_offset = end;
        self.regions.insert(id, region);
        debug!(region = id, base = region.base, size, "region allocated");
        Ok(id)
    }

    /// Drop a region's registry entry
    ///
    /// Advisory only: the underlying bytes stay allocated until the manager
    /// is dropped.
    pub fn free(&mut self, id: RegionId) -> bool {
        if self.regions.remove(&id).is_some() {
            debug!(region = id, "region freed (space not reclaimed)");
            true
        } else {
            warn!(region = id, "free of unknown region");
            false
        }
    }

    pub fn region(&self, id: RegionId) -> Option<&MemoryRegion> {
        self.regions.get(&id)
    }

    pub fn region_count(&self) -> usize {
        self.regions.len()
    }

    /// Read `buf.len()` bytes starting at `addr`
    pub fn read(&self, addr: u64, buf: &mut [u8]) -> Result<()> {
        let range = self.checked_range(addr, buf.len())?;
        buf.copy_from_slice(&self.arena[range]);
        Ok(())
    }

    /// Write `bytes` starting at `addr`
    ///
    /// Region `read_only` flags are not consulted; bounds are the only
    /// enforcement this core performs.
    pub fn write(&mut self, addr: u64, bytes: &[u8]) -> Result<()> {
        let range = self.checked_range(addr, bytes.len())?;
        self.arena[range].copy_from_slice(bytes);
        Ok(())
    }

    /// Copy `len` bytes from `src` to `dst` inside the arena (memmove)
    pub fn copy_within(&mut self, dst: u64, src: u64, len: usize) -> Result<()> {
        let src_range = self.checked_range(src, len)?;
        self.checked_range(dst, len)?;
        self.arena.copy_within(src_range, dst as usize);
        Ok(())
    }

    /// Fill `len` bytes starting at `addr` with `value`
    pub fn fill(&mut self, addr: u64, value: u8, len: usize) -> Result<()> {
        let range = self.checked_range(addr, len)?;
        self.arena[range].fill(value);
        Ok(())
    }

    pub fn capacity(&self) -> usize {
        self.arena.len()
    }

    /// Bytes consumed by the bump cursor
    pub fn used(&self) -> usize {
        self.next_offset
    }

    fn checked_range(&self, addr: u64, len: usize) -> Result<std::ops::Range<usize>> {
        let oob = || VmError::MemoryOutOfBounds {
            addr,
            len,
            capacity: self.arena.len(),
        };
        let start = usize::try_from(addr).map_err(|_| oob())?;
        let end = start.checked_add(len).ok_or_else(oob)?;
        if end > self.arena.len() {
            return Err(oob());
        }
        Ok(start..end)
    }
}

// ================================================================================================
// Tests
// ================================================================================================
