//! Process-wide holder of the active character map.

use parking_lot::RwLock;
use tracing::debug;

use crate::models::{default_character_map, CharacterMap};

/// Holds the single active character map.
///
/// Created at startup with the built-in map and replaced wholesale on every
/// successful install. Readers always see one complete map: replacements are
/// built elsewhere and swapped in under the write lock.
#[derive(Debug)]
pub struct KeymapRegistry {
    current: RwLock<CharacterMap>,
}

impl KeymapRegistry {
    /// Creates a registry holding the built-in `en-us` map.
    #[must_use]
    pub fn new() -> Self {
        Self::with_map(default_character_map())
    }

    /// Creates a registry holding `map`.
    #[must_use]
    pub fn with_map(map: CharacterMap) -> Self {
        Self {
            current: RwLock::new(map),
        }
    }

    /// Replaces the active map.
    ///
    /// The write lock is held only for the swap; the previous map is released
    /// after the lock is dropped.
    pub(crate) fn set_map(&self, map: CharacterMap) {
        let previous = {
            let mut current = self.current.write();
            std::mem::replace(&mut *current, map)
        };
        debug!("Released previous keymap '{}'", previous.name());
    }

    /// Runs `f` against the active map while holding the read lock.
    pub fn with_current<R>(&self, f: impl FnOnce(&CharacterMap) -> R) -> R {
        f(&*self.current.read())
    }

    /// Name of the active map.
    #[must_use]
    pub fn current_name(&self) -> String {
        self.with_current(|map| map.name().to_string())
    }

    /// Copy of the active map.
    #[must_use]
    pub fn snapshot(&self) -> CharacterMap {
        self.with_current(CharacterMap::clone)
    }
}

impl Default for KeymapRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Entry, Modifier};
    use std::sync::Arc;
    use std::thread;

    fn uniform_map(name: &str, c: char) -> CharacterMap {
        let mut map = CharacterMap::blank(name);
        for modifier in Modifier::ALL {
            for index in 0..crate::constants::CHAR_MAP_SIZE {
                map.layer_mut(modifier).set_entry(index, Entry::from_char(c));
            }
        }
        map
    }

    #[test]
    fn test_starts_with_default_map() {
        let registry = KeymapRegistry::new();
        assert_eq!(registry.current_name(), "en-us");
    }

    #[test]
    fn test_set_map_replaces_wholesale() {
        let registry = KeymapRegistry::new();
        registry.set_map(uniform_map("first", 'a'));
        registry.set_map(uniform_map("second", 'b'));

        let snapshot = registry.snapshot();
        assert_eq!(snapshot, uniform_map("second", 'b'));
    }

    #[test]
    fn test_readers_never_observe_mixed_maps() {
        let registry = Arc::new(KeymapRegistry::with_map(uniform_map("a", 'a')));

        let writer = {
            let registry = Arc::clone(&registry);
            thread::spawn(move || {
                for round in 0..200 {
                    let (name, c) = if round % 2 == 0 { ("b", 'b') } else { ("a", 'a') };
                    registry.set_map(uniform_map(name, c));
                }
            })
        };

        for _ in 0..200 {
            registry.with_current(|map| {
                let expected = Entry::from_char(map.name().chars().next().unwrap());
                for (_, layer) in map.layers() {
                    assert!(layer.iter().all(|entry| *entry == expected));
                }
            });
        }

        writer.join().unwrap();
    }
}
