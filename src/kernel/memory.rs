//! Copies across the trust boundary between a caller and the registry.
//!
//! Caller memory is only ever reached through [`UserMemory`]. Every access is
//! range-checked first; a range the caller does not own is reported as
//! `BoundaryFault` and nothing is copied.

use std::collections::BTreeMap;
use std::fmt;

use crate::error::{KeymapError, KeymapResult};

const CODEPOINT_SIZE: usize = std::mem::size_of::<u32>();

/// Address in caller memory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct UserPtr(usize);

impl UserPtr {
    /// The null address; never mapped.
    pub const NULL: Self = Self(0);

    /// Wraps a raw caller address.
    #[must_use]
    pub const fn new(addr: usize) -> Self {
        Self(addr)
    }

    /// Raw address value.
    #[must_use]
    pub const fn addr(self) -> usize {
        self.0
    }

    /// Address `bytes` past this one.
    ///
    /// # Errors
    ///
    /// Returns `BoundaryFault` if the address would wrap.
    pub fn offset(self, bytes: usize) -> KeymapResult<Self> {
        self.0
            .checked_add(bytes)
            .map(Self)
            .ok_or(KeymapError::BoundaryFault {
                address: self.0,
                len: bytes,
            })
    }
}

impl fmt::Display for UserPtr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#x}", self.0)
    }
}

/// Caller-owned source range: a pointer and an element count.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct UserSlice {
    /// Start of the range
    pub ptr: UserPtr,
    /// Number of elements (codepoints for entries, bytes for names)
    pub len: usize,
}

impl UserSlice {
    /// Creates a source range.
    #[must_use]
    pub const fn new(ptr: UserPtr, len: usize) -> Self {
        Self { ptr, len }
    }
}

/// Caller-owned destination range: a pointer and how many elements fit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct UserBuffer {
    /// Start of the range
    pub ptr: UserPtr,
    /// Number of elements the caller made room for
    pub capacity: usize,
}

impl UserBuffer {
    /// Creates a destination range.
    #[must_use]
    pub const fn new(ptr: UserPtr, capacity: usize) -> Self {
        Self { ptr, capacity }
    }
}

/// Copy primitives for one caller's memory.
pub trait UserMemory {
    /// Checks that `len` bytes at `src` may be read.
    fn verify_read(&self, src: UserPtr, len: usize) -> KeymapResult<()>;

    /// Copies `dst.len()` bytes from caller memory at `src`.
    fn copy_from_user(&self, src: UserPtr, dst: &mut [u8]) -> KeymapResult<()>;

    /// Copies `src` into caller memory at `dst`.
    fn copy_to_user(&mut self, dst: UserPtr, src: &[u8]) -> KeymapResult<()>;
}

fn fault(address: UserPtr, len: usize) -> KeymapError {
    KeymapError::BoundaryFault {
        address: address.addr(),
        len,
    }
}

/// Copies an entry's codepoints out of caller memory into an owned buffer.
///
/// # Errors
///
/// * `BoundaryFault` - the range is not readable, or its byte size overflows
/// * `AllocationFailure` - the owned buffer could not be reserved
pub fn copy_codepoints_from_user<M: UserMemory + ?Sized>(
    memory: &M,
    src: UserSlice,
) -> KeymapResult<Vec<u32>> {
    let byte_len = src
        .len
        .checked_mul(CODEPOINT_SIZE)
        .ok_or_else(|| fault(src.ptr, usize::MAX))?;
    memory.verify_read(src.ptr, byte_len)?;

    let mut codepoints: Vec<u32> = Vec::new();
    codepoints
        .try_reserve_exact(src.len)
        .map_err(|_| KeymapError::AllocationFailure {
            requested: src.len,
        })?;
    let mut bytes: Vec<u8> = Vec::new();
    bytes
        .try_reserve_exact(byte_len)
        .map_err(|_| KeymapError::AllocationFailure {
            requested: src.len,
        })?;
    bytes.resize(byte_len, 0);

    memory.copy_from_user(src.ptr, &mut bytes)?;
    codepoints.extend(
        bytes
            .chunks_exact(CODEPOINT_SIZE)
            .map(|chunk| u32::from_ne_bytes([chunk[0], chunk[1], chunk[2], chunk[3]])),
    );
    Ok(codepoints)
}

/// Copies codepoints into caller memory.
///
/// # Errors
///
/// Returns `BoundaryFault` if the destination is not writable.
pub fn copy_codepoints_to_user<M: UserMemory + ?Sized>(
    memory: &mut M,
    dst: UserPtr,
    codepoints: &[u32],
) -> KeymapResult<()> {
    let bytes: Vec<u8> = codepoints
        .iter()
        .flat_map(|cp| cp.to_ne_bytes())
        .collect();
    memory.copy_to_user(dst, &bytes)
}

/// Copies a single `u32` into caller memory.
///
/// # Errors
///
/// Returns `BoundaryFault` if the destination is not writable.
pub fn copy_u32_to_user<M: UserMemory + ?Sized>(
    memory: &mut M,
    dst: UserPtr,
    value: u32,
) -> KeymapResult<()> {
    memory.copy_to_user(dst, &value.to_ne_bytes())
}

#[derive(Debug, Clone)]
struct Region {
    data: Vec<u8>,
    writable: bool,
}

/// In-process caller address space made of independent mapped regions.
///
/// Regions are separated by unmapped guard gaps, so running off the end of
/// one region always faults.
#[derive(Debug, Clone)]
pub struct AddressSpace {
    regions: BTreeMap<usize, Region>,
    next_base: usize,
}

impl AddressSpace {
    /// First address handed out by [`AddressSpace::map`].
    pub const BASE: usize = 0x1000_0000;

    /// Alignment and guard gap between regions.
    pub const PAGE_SIZE: usize = 0x1000;

    /// Creates an empty address space.
    #[must_use]
    pub fn new() -> Self {
        Self {
            regions: BTreeMap::new(),
            next_base: Self::BASE,
        }
    }

    /// Maps a zero-filled region of `len` bytes.
    pub fn map(&mut self, len: usize, writable: bool) -> UserPtr {
        let base = self.next_base;
        let pages = len.div_ceil(Self::PAGE_SIZE).max(1);
        // One extra page stays unmapped as a guard.
        self.next_base = base + (pages + 1) * Self::PAGE_SIZE;
        self.regions.insert(
            base,
            Region {
                data: vec![0; len],
                writable,
            },
        );
        UserPtr::new(base)
    }

    /// Maps a read-only region holding `bytes`.
    pub fn map_bytes(&mut self, bytes: &[u8]) -> UserPtr {
        let ptr = self.map(bytes.len(), false);
        if let Some(region) = self.regions.get_mut(&ptr.addr()) {
            region.data.copy_from_slice(bytes);
        }
        ptr
    }

    /// Maps a read-only region holding `codepoints`.
    pub fn map_codepoints(&mut self, codepoints: &[u32]) -> UserSlice {
        let bytes: Vec<u8> = codepoints
            .iter()
            .flat_map(|cp| cp.to_ne_bytes())
            .collect();
        UserSlice::new(self.map_bytes(&bytes), codepoints.len())
    }

    /// Unmaps the region starting at `ptr`. Returns false if none starts there.
    pub fn unmap(&mut self, ptr: UserPtr) -> bool {
        self.regions.remove(&ptr.addr()).is_some()
    }

    /// Number of mapped regions.
    #[must_use]
    pub fn region_count(&self) -> usize {
        self.regions.len()
    }

    /// Reads `len` bytes at `ptr`.
    ///
    /// # Errors
    ///
    /// Returns `BoundaryFault` if the range is not mapped.
    pub fn read_bytes(&self, ptr: UserPtr, len: usize) -> KeymapResult<Vec<u8>> {
        let mut bytes = vec![0; len];
        self.copy_from_user(ptr, &mut bytes)?;
        Ok(bytes)
    }

    /// Reads `count` codepoints at `ptr`.
    ///
    /// # Errors
    ///
    /// Returns `BoundaryFault` if the range is not mapped.
    pub fn read_codepoints(&self, ptr: UserPtr, count: usize) -> KeymapResult<Vec<u32>> {
        copy_codepoints_from_user(self, UserSlice::new(ptr, count))
    }

    fn locate(&self, ptr: UserPtr, len: usize) -> KeymapResult<(usize, usize)> {
        let addr = ptr.addr();
        let (&base, region) = self
            .regions
            .range(..=addr)
            .next_back()
            .ok_or_else(|| fault(ptr, len))?;
        let offset = addr - base;
        let end = offset.checked_add(len).ok_or_else(|| fault(ptr, len))?;
        if end > region.data.len() {
            return Err(fault(ptr, len));
        }
        Ok((base, offset))
    }
}

impl Default for AddressSpace {
    fn default() -> Self {
        Self::new()
    }
}

impl UserMemory for AddressSpace {
    fn verify_read(&self, src: UserPtr, len: usize) -> KeymapResult<()> {
        if len == 0 {
            return Ok(());
        }
        self.locate(src, len).map(|_| ())
    }

    fn copy_from_user(&self, src: UserPtr, dst: &mut [u8]) -> KeymapResult<()> {
        if dst.is_empty() {
            return Ok(());
        }
        let (base, offset) = self.locate(src, dst.len())?;
        let region = &self.regions[&base];
        dst.copy_from_slice(&region.data[offset..offset + dst.len()]);
        Ok(())
    }

    fn copy_to_user(&mut self, dst: UserPtr, src: &[u8]) -> KeymapResult<()> {
        if src.is_empty() {
            return Ok(());
        }
        let (base, offset) = self.locate(dst, src.len())?;
        let region = self
            .regions
            .get_mut(&base)
            .ok_or_else(|| fault(dst, src.len()))?;
        if !region.writable {
            return Err(fault(dst, src.len()));
        }
        region.data[offset..offset + src.len()].copy_from_slice(src);
        Ok(())
    }
}
