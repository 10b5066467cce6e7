//! Fixed-slot storage handing out small reusable integer keys.
//!
//! Unlike a plain id counter, every allocation that may grow the backing
//! storage goes through [Vec::try_reserve], so running out of memory is
//! reported to the caller instead of aborting.
use alloc::{collections::TryReserveError, vec::Vec};

pub struct Slab<T> {
    entries: Vec<Option<T>>,
    /// Keys of vacant entries, most recently freed last.
    ///
    /// Capacity is kept at least `entries.len()` so [Slab::remove] never allocates.
    recycled: Vec<usize>,
    len: usize,
}

impl<T> Slab<T> {
    pub const fn new() -> Slab<T> {
        Slab {
            entries: Vec::new(),
            recycled: Vec::new(),
            len: 0,
        }
    }

    /// Store `value` and return its key.
    ///
    /// Recently freed keys are handed out again before the slab grows.
    pub fn try_insert(&mut self, value: T) -> Result<usize, TryReserveError> {
        if let Some(key) = self.recycled.pop() {
            self.entries[key] = Some(value);
            self.len += 1;
            return Ok(key);
        }
        self.entries.try_reserve(1)?;
        let wanted = self.entries.len() + 1 - self.recycled.len();
        self.recycled.try_reserve(wanted)?;
        let key = self.entries.len();
        self.entries.push(Some(value));
        self.len += 1;
        Ok(key)
    }

    /// Take the value stored under `key`, if any.
    pub fn remove(&mut self, key: usize) -> Option<T> {
        let value = self.entries.get_mut(key)?.take()?;
        self.recycled.push(key);
        self.len -= 1;
        Some(value)
    }

    pub fn get(&self, key: usize) -> Option<&T> {
        self.entries.get(key)?.as_ref()
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn iter(&self) -> impl Iterator<Item = (usize, &T)> {
        self.entries
            .iter()
            .enumerate()
            .filter_map(|(key, entry)| entry.as_ref().map(|value| (key, value)))
    }
}

impl<T> Default for Slab<T> {
    fn default() -> Self {
        Self::new()
    }
}
