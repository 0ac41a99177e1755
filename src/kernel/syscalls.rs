//! Install and query entry points for the active character map.
//!
//! `sys_setkeymap` copies a caller-described map into owned storage and
//! swaps it into the registry. Nothing becomes visible unless the whole map
//! was copied. `sys_getkeymap` copies the active map out while holding the
//! registry's read lock; a fault part way leaves earlier writes in place.

use tracing::{debug, info, warn};

use crate::constants::CHAR_MAP_SIZE;
use crate::error::{KeymapError, KeymapResult};
use crate::kernel::memory::{
    copy_codepoints_from_user, copy_codepoints_to_user, copy_u32_to_user, UserBuffer, UserMemory,
    UserPtr, UserSlice,
};
use crate::kernel::process::{Process, Promises};
use crate::kernel::registry::KeymapRegistry;
use crate::models::{CharacterMap, CharacterMapBuilder, Entry, Modifier};

/// Source description of one layer: a `(pointer, length)` pair per key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstallLayer {
    /// Codepoint ranges, one per key position
    pub entries: [UserSlice; CHAR_MAP_SIZE],
}

impl Default for InstallLayer {
    fn default() -> Self {
        Self {
            entries: [UserSlice::default(); CHAR_MAP_SIZE],
        }
    }
}

/// Parameters of `sys_setkeymap`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SetKeymapParams {
    /// Layers in [`Modifier::ALL`] order
    pub layers: [InstallLayer; 5],
    /// Map name bytes
    pub map_name: UserSlice,
}

impl SetKeymapParams {
    /// Source description of the layer for `modifier`.
    pub fn layer_mut(&mut self, modifier: Modifier) -> &mut InstallLayer {
        &mut self.layers[modifier.index()]
    }
}

/// Destination description of one layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryLayer {
    /// Array of 128 `u32` slots that receive each entry's length
    pub entry_sizes: UserPtr,
    /// Codepoint buffers, one per key position
    pub entries: [UserBuffer; CHAR_MAP_SIZE],
}

impl Default for QueryLayer {
    fn default() -> Self {
        Self {
            entry_sizes: UserPtr::NULL,
            entries: [UserBuffer::default(); CHAR_MAP_SIZE],
        }
    }
}

/// Parameters of `sys_getkeymap`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GetKeymapParams {
    /// Layers in [`Modifier::ALL`] order
    pub layers: [QueryLayer; 5],
    /// Buffer for the map name bytes
    pub map_name: UserBuffer,
}

impl GetKeymapParams {
    /// Destination description of the layer for `modifier`.
    pub fn layer_mut(&mut self, modifier: Modifier) -> &mut QueryLayer {
        &mut self.layers[modifier.index()]
    }
}

fn copy_map_name<M: UserMemory>(memory: &M, map_name: UserSlice) -> KeymapResult<String> {
    CharacterMap::validate_name_len(map_name.len)?;

    let mut bytes = vec![0; map_name.len];
    memory.copy_from_user(map_name.ptr, &mut bytes)?;
    String::from_utf8(bytes).map_err(|e| KeymapError::Utf8Decode {
        context: "map name".to_string(),
        source: e.utf8_error(),
    })
}

/// Installs a caller-supplied character map.
///
/// Checks run in order: promise, superuser, name, then every entry. The new
/// map is assembled privately and swapped in only after all 640 entries were
/// copied; on any error the partial copy is dropped and the registry keeps
/// its previous map.
///
/// # Errors
///
/// * `PermissionDenied` - missing `SETKEYMAP` promise or not superuser
/// * `NameTooLong` - name longer than 50 bytes
/// * `Utf8Decode` - name is not UTF-8
/// * `BoundaryFault` - a name or entry range is not readable
/// * `AllocationFailure` - an entry buffer could not be reserved
pub fn sys_setkeymap<M: UserMemory>(
    registry: &KeymapRegistry,
    process: &Process<M>,
    params: &SetKeymapParams,
) -> KeymapResult<()> {
    process.require_promise(Promises::SETKEYMAP, "setkeymap")?;
    if !process.credentials().is_superuser() {
        warn!("pid {} attempted setkeymap without superuser", process.pid());
        return Err(KeymapError::PermissionDenied {
            operation: "setkeymap",
            requirement: "superuser",
        });
    }

    let map_name = copy_map_name(process.memory(), params.map_name)?;

    let mut builder = CharacterMapBuilder::new();
    for modifier in Modifier::ALL {
        for &slice in &params.layers[modifier.index()].entries {
            let codepoints = copy_codepoints_from_user(process.memory(), slice)?;
            builder.push(modifier, Entry::new(codepoints))?;
        }
    }
    let map = builder.build(map_name)?;

    info!("pid {} installed keymap '{}'", process.pid(), map.name());
    registry.set_map(map);
    Ok(())
}

/// Copies the active character map into caller-supplied buffers.
///
/// The name is written first, followed by a NUL when the buffer has room.
/// Then, per layer and key, the entry length goes to `entry_sizes[i]` and the
/// codepoints to `entries[i]`.
///
/// # Errors
///
/// * `PermissionDenied` - missing `GETKEYMAP` promise
/// * `NameTooLong` - the name buffer is smaller than the name; nothing is written
/// * `BoundaryFault` - a destination is not writable or is smaller than its
///   entry; entries copied before the fault stay written
pub fn sys_getkeymap<M: UserMemory>(
    registry: &KeymapRegistry,
    process: &mut Process<M>,
    params: &GetKeymapParams,
) -> KeymapResult<()> {
    process.require_promise(Promises::GETKEYMAP, "getkeymap")?;
    let pid = process.pid();
    let memory = process.memory_mut();

    registry.with_current(|map| {
        let name = map.name().as_bytes();
        if params.map_name.capacity < name.len() {
            return Err(KeymapError::NameTooLong {
                len: name.len(),
                max: params.map_name.capacity,
            });
        }
        memory.copy_to_user(params.map_name.ptr, name)?;
        if params.map_name.capacity > name.len() {
            memory.copy_to_user(params.map_name.ptr.offset(name.len())?, &[0])?;
        }

        for (modifier, layer) in map.layers() {
            let dest = &params.layers[modifier.index()];
            for (index, (entry, buffer)) in layer.iter().zip(&dest.entries).enumerate() {
                let size_slot = dest
                    .entry_sizes
                    .offset(index * std::mem::size_of::<u32>())?;
                let len = u32::try_from(entry.len()).map_err(|_| KeymapError::BoundaryFault {
                    address: size_slot.addr(),
                    len: std::mem::size_of::<u32>(),
                })?;
                copy_u32_to_user(memory, size_slot, len)?;

                if entry.len() > buffer.capacity {
                    return Err(KeymapError::BoundaryFault {
                        address: buffer.ptr.addr(),
                        len: entry.len() * std::mem::size_of::<u32>(),
                    });
                }
                copy_codepoints_to_user(memory, buffer.ptr, entry.codepoints())?;
            }
        }

        debug!("pid {} read keymap '{}'", pid, map.name());
        Ok(())
    })
}
