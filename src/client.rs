//! Caller-side marshalling for the keymap entry points.
//!
//! [`set_keymap`] lays a [`CharacterMap`] out in the caller's address space
//! and invokes the install operation; [`get_keymap`] maps destination buffers,
//! invokes the query operation and reads the result back. Both unmap
//! everything they mapped before returning.

use tracing::debug;

use crate::constants::{CHAR_MAP_SIZE, MAP_NAME_MAX_LEN};
use crate::error::{KeymapError, KeymapResult};
use crate::kernel::{
    sys_getkeymap, sys_setkeymap, AddressSpace, GetKeymapParams, KeymapRegistry, Process,
    SetKeymapParams, UserBuffer, UserPtr, UserSlice,
};
use crate::models::{CharacterMap, CharacterMapBuilder, Entry, Modifier};

/// Codepoints reserved per key on the first query attempt.
pub const QUERY_ENTRY_CAPACITY: usize = 0xff;

const CODEPOINT_SIZE: usize = std::mem::size_of::<u32>();

/// A character map laid out in caller memory, ready to install.
#[derive(Debug)]
pub struct InstallRequest {
    params: SetKeymapParams,
    data: UserPtr,
    name: UserPtr,
}

impl InstallRequest {
    /// Copies every entry and the name of `map` into fresh read-only regions.
    pub fn marshal(map: &CharacterMap, memory: &mut AddressSpace) -> Self {
        let mut codepoints = Vec::with_capacity(map.codepoint_count());
        for (_, layer) in map.layers() {
            for entry in layer {
                codepoints.extend_from_slice(entry.codepoints());
            }
        }
        let data = memory.map_codepoints(&codepoints).ptr;
        let name = memory.map_bytes(map.name().as_bytes());

        let mut params = SetKeymapParams::default();
        let mut cursor = 0;
        for ((_, layer), dest) in map.layers().zip(params.layers.iter_mut()) {
            for (entry, slot) in layer.iter().zip(dest.entries.iter_mut()) {
                let ptr = UserPtr::new(data.addr() + cursor * CODEPOINT_SIZE);
                *slot = UserSlice::new(ptr, entry.len());
                cursor += entry.len();
            }
        }
        params.map_name = UserSlice::new(name, map.name().len());

        Self { params, data, name }
    }

    /// Parameters to pass to the install operation.
    #[must_use]
    pub const fn params(&self) -> &SetKeymapParams {
        &self.params
    }

    /// Unmaps the regions backing this request.
    pub fn release(self, memory: &mut AddressSpace) {
        memory.unmap(self.data);
        memory.unmap(self.name);
    }
}

/// Destination buffers for a query, mapped in caller memory.
#[derive(Debug)]
pub struct QueryRequest {
    params: GetKeymapParams,
    sizes: UserPtr,
    data: UserPtr,
}

impl QueryRequest {
    /// Maps writable buffers with room for `entry_capacity` codepoints per key
    /// and `name_capacity` name bytes.
    pub fn allocate(memory: &mut AddressSpace, entry_capacity: usize, name_capacity: usize) -> Self {
        let keys = Modifier::ALL.len() * CHAR_MAP_SIZE;
        let sizes = memory.map(keys * CODEPOINT_SIZE, true);
        let data = memory.map(keys * entry_capacity * CODEPOINT_SIZE, true);
        let name = memory.map(name_capacity, true);

        let mut params = GetKeymapParams::default();
        for (layer_index, dest) in params.layers.iter_mut().enumerate() {
            let first_key = layer_index * CHAR_MAP_SIZE;
            dest.entry_sizes = UserPtr::new(sizes.addr() + first_key * CODEPOINT_SIZE);
            for (key, buffer) in dest.entries.iter_mut().enumerate() {
                let offset = (first_key + key) * entry_capacity * CODEPOINT_SIZE;
                *buffer = UserBuffer::new(UserPtr::new(data.addr() + offset), entry_capacity);
            }
        }
        params.map_name = UserBuffer::new(name, name_capacity);

        Self {
            params,
            sizes,
            data,
        }
    }

    /// Parameters to pass to the query operation.
    #[must_use]
    pub const fn params(&self) -> &GetKeymapParams {
        &self.params
    }

    /// Reads the queried map back out of caller memory.
    ///
    /// # Errors
    ///
    /// Returns `BoundaryFault` if a reported size exceeds its buffer, and
    /// `Utf8Decode` if the name is not UTF-8.
    pub fn unmarshal(&self, memory: &AddressSpace) -> KeymapResult<CharacterMap> {
        let mut name = memory.read_bytes(self.params.map_name.ptr, self.params.map_name.capacity)?;
        if let Some(end) = name.iter().position(|&b| b == 0) {
            name.truncate(end);
        }
        let name = String::from_utf8(name).map_err(|e| KeymapError::Utf8Decode {
            context: "queried map name".to_string(),
            source: e.utf8_error(),
        })?;

        let mut builder = CharacterMapBuilder::new();
        for (modifier, dest) in Modifier::ALL.into_iter().zip(&self.params.layers) {
            let sizes = memory.read_codepoints(dest.entry_sizes, CHAR_MAP_SIZE)?;
            for (&size, buffer) in sizes.iter().zip(&dest.entries) {
                let len = size as usize;
                if len > buffer.capacity {
                    return Err(KeymapError::BoundaryFault {
                        address: buffer.ptr.addr(),
                        len: len * CODEPOINT_SIZE,
                    });
                }
                let codepoints = memory.read_codepoints(buffer.ptr, len)?;
                builder.push(modifier, Entry::new(codepoints))?;
            }
        }
        builder.build(name)
    }

    /// Largest entry size the query operation has written so far.
    ///
    /// Sizes are written before each entry's capacity is checked, so after a
    /// `BoundaryFault` this covers the entry that did not fit.
    ///
    /// # Errors
    ///
    /// Returns `BoundaryFault` if the size tables are no longer mapped.
    pub fn largest_entry(&self, memory: &AddressSpace) -> KeymapResult<usize> {
        let mut largest = 0;
        for dest in &self.params.layers {
            let sizes = memory.read_codepoints(dest.entry_sizes, CHAR_MAP_SIZE)?;
            largest = sizes
                .into_iter()
                .map(|size| size as usize)
                .fold(largest, usize::max);
        }
        Ok(largest)
    }

    /// Unmaps the regions backing this request.
    pub fn release(self, memory: &mut AddressSpace) {
        memory.unmap(self.sizes);
        memory.unmap(self.data);
        memory.unmap(self.params.map_name.ptr);
    }
}

/// Installs `map` on behalf of `process`.
///
/// # Errors
///
/// Propagates every error of the install operation.
pub fn set_keymap(
    registry: &KeymapRegistry,
    process: &mut Process<AddressSpace>,
    map: &CharacterMap,
) -> KeymapResult<()> {
    let request = InstallRequest::marshal(map, process.memory_mut());
    let result = sys_setkeymap(registry, process, request.params());
    request.release(process.memory_mut());
    debug!("setkeymap('{}') -> {:?}", map.name(), result.as_ref().err());
    result
}

/// Reads the active map on behalf of `process`.
///
/// The first attempt reserves [`QUERY_ENTRY_CAPACITY`] codepoints per key.
/// When an entry does not fit, the buffers are mapped again with room for the
/// largest reported entry and the query is repeated.
/// A failed query yields no map at all; partially written buffers are discarded.
///
/// # Errors
///
/// Propagates every error of the query operation.
pub fn get_keymap(
    registry: &KeymapRegistry,
    process: &mut Process<AddressSpace>,
) -> KeymapResult<CharacterMap> {
    let mut entry_capacity = QUERY_ENTRY_CAPACITY;
    loop {
        let request =
            QueryRequest::allocate(process.memory_mut(), entry_capacity, MAP_NAME_MAX_LEN + 1);
        let result = sys_getkeymap(registry, process, request.params())
            .and_then(|()| request.unmarshal(process.memory()));
        let grown = match &result {
            Err(KeymapError::BoundaryFault { .. }) => request
                .largest_entry(process.memory())
                .ok()
                .filter(|&largest| largest > entry_capacity),
            _ => None,
        };
        request.release(process.memory_mut());

        match grown {
            Some(largest) => {
                debug!("getkeymap: entry of {largest} codepoints, growing query buffers");
                entry_capacity = largest;
            }
            None => return result,
        }
    }
}
