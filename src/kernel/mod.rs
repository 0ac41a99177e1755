//! Privileged side of the keymap boundary.
//!
//! This module holds the registry of the active character map and the two
//! entry points that move maps across the trust boundary: install
//! (`sys_setkeymap`) and query (`sys_getkeymap`). Caller memory is reached
//! only through the copy primitives in [`memory`].

pub mod memory;
pub mod process;
pub mod registry;
pub mod syscalls;

pub use memory::{AddressSpace, UserBuffer, UserMemory, UserPtr, UserSlice};
pub use process::{Credentials, Process, Promises};
pub use registry::KeymapRegistry;
pub use syscalls::{
    sys_getkeymap, sys_setkeymap, GetKeymapParams, InstallLayer, QueryLayer, SetKeymapParams,
};
