use std::collections::HashMap;

use crate::{error::{Error, Result}, sql::types::Value};

/// Unique hash index over one column
///
/// Maps a column value to the slot (position in the table's row store) of
/// the row holding it, plus the inverse slot -> value map. The owning table
/// keeps exactly one entry per row.
#[derive(Debug, Clone)]
pub struct Index {
    column: String,
    forward: HashMap<Value, usize>,
    reverse: HashMap<usize, Value>,
}

impl Index {
    pub fn new(column: impl Into<String>) -> Self {
        Self {
            column: column.into(),
            forward: HashMap::new(),
            reverse: HashMap::new(),
        }
    }

    pub fn column(&self) -> &str {
        &self.column
    }

    /// Records `value -> slot`, failing if the value is already indexed
    pub fn add(&mut self, value: Value, slot: usize) -> Result<()> {
        if self.forward.contains_key(&value) {
            return Err(Error::Constraint(format!(
                "duplicate value '{}' for indexed column {}",
                value, self.column
            )));
        }
        self.reverse.insert(slot, value.clone());
        self.forward.insert(value, slot);
        Ok(())
    }

    pub fn get(&self, value: &Value) -> Option<usize> {
        self.forward.get(value).copied()
    }

    pub fn contains(&self, value: &Value) -> bool {
        self.forward.contains_key(value)
    }

    /// Removes the entry for `slot`
    ///
    /// The forward entry is only dropped if it still points at `slot`, so a
    /// stale caller cannot evict another row's value.
    pub fn remove(&mut self, value: &Value, slot: usize) {
        if self.forward.get(value) == Some(&slot) {
            self.forward.remove(value);
        }
        self.reverse.remove(&slot);
    }

    /// Shifts every entry above `deleted_slot` down by one
    ///
    /// The entry at `deleted_slot` must already have been removed.
    pub fn adjust_for_deletion(&mut self, deleted_slot: usize) {
        let mut forward = HashMap::with_capacity(self.forward.len());
        let mut reverse = HashMap::with_capacity(self.reverse.len());
        for (value, slot) in self.forward.drain() {
            let slot = match slot {
                s if s > deleted_slot => s - 1,
                s if s < deleted_slot => s,
                _ => continue,
            };
            reverse.insert(slot, value.clone());
            forward.insert(value, slot);
        }
        self.forward = forward;
        self.reverse = reverse;
    }

    /// Moves `slot` from `old` to `new`
    ///
    /// The conflict check runs before anything is removed, so a rejected
    /// update leaves the index exactly as it was.
    pub fn update(&mut self, old: &Value, new: Value, slot: usize) -> Result<()> {
        match self.get(&new) {
            Some(existing) if existing != slot => {
                return Err(Error::Constraint(format!(
                    "duplicate value '{}' for indexed column {}",
                    new, self.column
                )));
            }
            _ => {}
        }
        self.remove(old, slot);
        self.add(new, slot)
    }

    /// Value currently recorded for `slot`
    pub fn value_at(&self, slot: usize) -> Option<&Value> {
        self.reverse.get(&slot)
    }

    pub fn len(&self) -> usize {
        self.forward.len()
    }

    pub fn is_empty(&self) -> bool {
        self.forward.is_empty()
    }
}
