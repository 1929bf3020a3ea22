use std::collections::{BTreeMap, HashSet};

use serde::{Deserialize, Serialize};

use crate::{
    error::{Error, Result},
    sql::{
        schema::Column,
        types::{Conditions, Row, Value},
    },
    storage::index::Index,
};

/// Stable row identifier
///
/// Assigned from a per-table counter at insert time. Unlike a slot it never
/// changes when earlier rows are deleted, and it is never reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct RowId(pub u64);

#[derive(Debug, Clone)]
struct Record {
    id: RowId,
    values: Vec<Value>,
}

/// Resolved WHERE clause
enum Filter {
    All,
    /// A literal could not be coerced to its column type, so nothing matches
    Nothing,
    Match(Vec<(usize, Value)>),
}

/// A table: ordered columns, a dense row store and one unique index per
/// PRIMARY KEY / UNIQUE column
///
/// Slots are the positions `0..len()` of the row store. Deleting a row
/// shifts every later row down by one and every index is renumbered the same
/// way. Records stay sorted by `RowId`, which is what `slot_of` relies on.
#[derive(Debug, Clone)]
pub struct Table {
    name: String,
    columns: Vec<Column>,
    records: Vec<Record>,
    /// Keyed by column position
    indexes: BTreeMap<usize, Index>,
    next_row_id: u64,
}

impl Table {
    pub fn new(name: impl Into<String>, columns: Vec<Column>) -> Result<Self> {
        let name = name.into();
        if columns.is_empty() {
            return Err(Error::Schema(format!("table {} has no columns", name)));
        }
        if columns.iter().filter(|c| c.primary_key).count() > 1 {
            return Err(Error::Schema(format!(
                "multiple primary keys for table {}",
                name
            )));
        }
        let mut seen = HashSet::new();
        for col in columns.iter() {
            if !seen.insert(col.name.as_str()) {
                return Err(Error::Schema(format!(
                    "duplicate column {} in table {}",
                    col.name, name
                )));
            }
        }

        let indexes = columns
            .iter()
            .enumerate()
            .filter(|(_, c)| c.is_indexed())
            .map(|(pos, c)| (pos, Index::new(c.name.clone())))
            .collect();

        Ok(Self {
            name,
            columns,
            records: Vec::new(),
            indexes,
            next_row_id: 0,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// The unique index on `column`, if that column has one
    pub fn index(&self, column: &str) -> Option<&Index> {
        let pos = self.columns.iter().position(|c| c.name == column)?;
        self.indexes.get(&pos)
    }

    /// Row ids in slot order
    pub fn row_ids(&self) -> Vec<RowId> {
        self.records.iter().map(|r| r.id).collect()
    }

    /// Current slot of a row
    pub fn slot_of(&self, id: RowId) -> Option<usize> {
        self.records.binary_search_by_key(&id, |r| r.id).ok()
    }

    /// Value copy of a row by id
    pub fn get(&self, id: RowId) -> Option<Row> {
        self.slot_of(id).map(|slot| self.to_row(&self.records[slot]))
    }

    /// Inserts one row, values given in declared column order
    ///
    /// Every value is validated and every unique index checked before the
    /// row store is touched, so a rejected insert leaves no trace.
    pub fn insert(&mut self, values: Vec<Value>) -> Result<RowId> {
        if values.len() != self.columns.len() {
            return Err(Error::ValueCount {
                expected: self.columns.len(),
                got: values.len(),
            });
        }

        let mut row = Vec::with_capacity(values.len());
        for (pos, (col, value)) in self.columns.iter().zip(values).enumerate() {
            let value = col.validate(value)?;
            if let Some(index) = self.indexes.get(&pos) {
                if index.contains(&value) {
                    return Err(self.duplicate(col, &value));
                }
            }
            row.push(value);
        }

        let slot = self.records.len();
        for (pos, index) in self.indexes.iter_mut() {
            index.add(row[*pos].clone(), slot)?;
        }
        let id = RowId(self.next_row_id);
        self.next_row_id += 1;
        self.records.push(Record { id, values: row });
        Ok(id)
    }

    /// Returns value copies of the rows matching every condition
    pub fn select(&self, conditions: Option<&Conditions>) -> Result<Vec<Row>> {
        Ok(self
            .matching_slots(conditions)?
            .into_iter()
            .map(|slot| self.to_row(&self.records[slot]))
            .collect())
    }

    /// Applies `assignments` to every matching row, returns the count
    ///
    /// All assignments are coerced and all uniqueness checks run before the
    /// first write; any failure leaves the table unchanged.
    pub fn update(&mut self, assignments: &Conditions, conditions: Option<&Conditions>) -> Result<usize> {
        let mut changes = Vec::with_capacity(assignments.len());
        for (name, value) in assignments {
            let pos = self.column_position(name)?;
            changes.push((pos, self.columns[pos].validate(value.clone())?));
        }

        let slots = self.matching_slots(conditions)?;
        for (pos, value) in changes.iter() {
            let Some(index) = self.indexes.get(pos) else {
                continue;
            };
            let col = &self.columns[*pos];
            if slots.len() > 1 {
                return Err(Error::Constraint(format!(
                    "cannot assign '{}' to {} rows: {} column {} in table {}",
                    value,
                    slots.len(),
                    constraint_kind(col),
                    col.name,
                    self.name
                )));
            }
            for slot in slots.iter() {
                match index.get(value) {
                    Some(existing) if existing != *slot => return Err(self.duplicate(col, value)),
                    _ => {}
                }
            }
        }

        for slot in slots.iter().copied() {
            let record = &mut self.records[slot];
            for (pos, value) in changes.iter() {
                if let Some(index) = self.indexes.get_mut(pos) {
                    index.update(&record.values[*pos], value.clone(), slot)?;
                }
                record.values[*pos] = value.clone();
            }
        }

        tracing::debug!(table = %self.name, count = slots.len(), "updated rows");
        Ok(slots.len())
    }

    /// Removes every matching row, returns the count
    pub fn delete(&mut self, conditions: Option<&Conditions>) -> Result<usize> {
        let mut slots = self.matching_slots(conditions)?;
        // Highest slot first: compaction only moves rows above the one removed
        slots.sort_unstable_by(|a, b| b.cmp(a));

        for slot in slots.iter().copied() {
            let record = &self.records[slot];
            for (pos, index) in self.indexes.iter_mut() {
                index.remove(&record.values[*pos], slot);
                index.adjust_for_deletion(slot);
            }
            self.records.remove(slot);
        }

        tracing::debug!(table = %self.name, count = slots.len(), "deleted rows");
        Ok(slots.len())
    }

    fn column_position(&self, name: &str) -> Result<usize> {
        self.columns
            .iter()
            .position(|c| c.name == name)
            .ok_or(Error::Schema(format!(
                "column {} not found in table {}",
                name, self.name
            )))
    }

    fn filter(&self, conditions: Option<&Conditions>) -> Result<Filter> {
        let conditions = match conditions {
            Some(c) if !c.is_empty() => c,
            _ => return Ok(Filter::All),
        };

        // Every column is resolved before any literal can short-circuit
        let mut resolved = Vec::with_capacity(conditions.len());
        let mut uncoercible = false;
        for (name, value) in conditions {
            let pos = self.column_position(name)?;
            match self.columns[pos].validate(value.clone()) {
                Ok(value) => resolved.push((pos, value)),
                Err(_) => uncoercible = true,
            }
        }
        if uncoercible {
            return Ok(Filter::Nothing);
        }
        Ok(Filter::Match(resolved))
    }

    /// Slots of the rows satisfying every condition, in ascending order
    fn matching_slots(&self, conditions: Option<&Conditions>) -> Result<Vec<usize>> {
        let resolved = match self.filter(conditions)? {
            Filter::All => return Ok((0..self.records.len()).collect()),
            Filter::Nothing => return Ok(Vec::new()),
            Filter::Match(resolved) => resolved,
        };

        if let [(pos, value)] = resolved.as_slice() {
            if let Some(index) = self.indexes.get(pos) {
                tracing::trace!(table = %self.name, column = index.column(), "index lookup");
                return Ok(index.get(value).into_iter().collect());
            }
        }

        tracing::trace!(table = %self.name, conditions = resolved.len(), "full scan");
        Ok(self
            .records
            .iter()
            .enumerate()
            .filter(|(_, r)| resolved.iter().all(|(pos, v)| r.values[*pos] == *v))
            .map(|(slot, _)| slot)
            .collect())
    }

    fn to_row(&self, record: &Record) -> Row {
        self.columns
            .iter()
            .zip(record.values.iter())
            .map(|(c, v)| (c.name.clone(), v.clone()))
            .collect()
    }

    fn duplicate(&self, col: &Column, value: &Value) -> Error {
        Error::Constraint(format!(
            "duplicate value '{}' for {} column {} in table {}",
            value,
            constraint_kind(col),
            col.name,
            self.name
        ))
    }
}

fn constraint_kind(col: &Column) -> &'static str {
    if col.primary_key { "PRIMARY KEY" } else { "UNIQUE" }
}
