//! Columnar attribute tables for nodes and faces.
//!
//! Values are stored per column in contiguous vectors indexed by row (the
//! node or face index), so a scan that reads one attribute for every row
//! touches a single allocation.

use crate::graph::PropertyValue;
use std::collections::HashMap;

/// Typed accessor over a row-indexed attribute table
///
/// Missing rows, missing columns and type mismatches all read as the type's
/// default (`0`, `0.0`, `""`).
pub trait AttributeTable {
    fn get_int(&self, row: usize, column: &str) -> i32;
    fn get_int64(&self, row: usize, column: &str) -> i64;
    fn get_double(&self, row: usize, column: &str) -> f64;
    fn get_text(&self, row: usize, column: &str) -> &str;
    fn set_value(&mut self, row: usize, column: &str, value: PropertyValue);
}

/// A single attribute column.
#[derive(Debug, Clone)]
pub enum Column {
    Int(Vec<Option<i64>>),
    Float(Vec<Option<f64>>),
    Text(Vec<Option<String>>),
    Bool(Vec<Option<bool>>),
}

impl Column {
    fn for_value(value: &PropertyValue) -> Option<Self> {
        match value {
            PropertyValue::Int(_) => Some(Column::Int(Vec::new())),
            PropertyValue::Float(_) => Some(Column::Float(Vec::new())),
            PropertyValue::Text(_) => Some(Column::Text(Vec::new())),
            PropertyValue::Boolean(_) => Some(Column::Bool(Vec::new())),
            PropertyValue::Null => None,
        }
    }

    pub fn set(&mut self, idx: usize, value: PropertyValue) {
        fn put<T: Clone>(v: &mut Vec<Option<T>>, idx: usize, val: Option<T>) {
            if idx >= v.len() {
                v.resize(idx + 1, None);
            }
            v[idx] = val;
        }

        match (self, value) {
            (Column::Int(v), PropertyValue::Int(val)) => put(v, idx, Some(val)),
            (Column::Int(v), PropertyValue::Boolean(val)) => put(v, idx, Some(val as i64)),
            (Column::Float(v), PropertyValue::Float(val)) => put(v, idx, Some(val)),
            (Column::Float(v), PropertyValue::Int(val)) => put(v, idx, Some(val as f64)),
            (Column::Text(v), PropertyValue::Text(val)) => put(v, idx, Some(val)),
            (Column::Bool(v), PropertyValue::Boolean(val)) => put(v, idx, Some(val)),
            (Column::Int(v), PropertyValue::Null) => put(v, idx, None),
            (Column::Float(v), PropertyValue::Null) => put(v, idx, None),
            (Column::Text(v), PropertyValue::Null) => put(v, idx, None),
            (Column::Bool(v), PropertyValue::Null) => put(v, idx, None),
            // A column keeps the type of its first value
            _ => {}
        }
    }

    pub fn get(&self, idx: usize) -> PropertyValue {
        match self {
            Column::Int(v) => v.get(idx).and_then(|&o| o).map(PropertyValue::Int).unwrap_or_default(),
            Column::Float(v) => v.get(idx).and_then(|&o| o).map(PropertyValue::Float).unwrap_or_default(),
            Column::Bool(v) => v.get(idx).and_then(|&o| o).map(PropertyValue::Boolean).unwrap_or_default(),
            Column::Text(v) => v
                .get(idx)
                .and_then(|o| o.as_ref())
                .map(|s| PropertyValue::Text(s.clone()))
                .unwrap_or_default(),
        }
    }

    /// Move row `from` into row `to`, leaving `from` empty
    fn move_row(&mut self, from: usize, to: usize) {
        fn mv<T>(v: &mut Vec<Option<T>>, from: usize, to: usize) {
            let val = v.get_mut(from).and_then(Option::take);
            if to >= v.len() {
                v.resize_with(to + 1, || None);
            }
            v[to] = val;
            v.truncate(from.max(to));
        }

        match self {
            Column::Int(v) => mv(v, from, to),
            Column::Float(v) => mv(v, from, to),
            Column::Text(v) => mv(v, from, to),
            Column::Bool(v) => mv(v, from, to),
        }
    }
}

/// Manages multiple attribute columns.
#[derive(Debug, Default, Clone)]
pub struct ColumnStore {
    /// Mapping from column name -> Column
    columns: HashMap<String, Column>,
}

impl ColumnStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_property(&mut self, idx: usize, key: &str, value: PropertyValue) {
        if let Some(col) = self.columns.get_mut(key) {
            col.set(idx, value);
        } else if let Some(mut col) = Column::for_value(&value) {
            col.set(idx, value);
            self.columns.insert(key.to_string(), col);
        }
    }

    pub fn get_property(&self, idx: usize, key: &str) -> PropertyValue {
        self.columns.get(key).map(|col| col.get(idx)).unwrap_or_default()
    }

    pub fn get_column(&self, key: &str) -> Option<&Column> {
        self.columns.get(key)
    }

    /// Row compaction counterpart of a swap-remove: row `last` moves to `idx`
    pub fn swap_remove_row(&mut self, idx: usize, last: usize) {
        for col in self.columns.values_mut() {
            if idx == last {
                col.set(idx, PropertyValue::Null);
            } else {
                col.move_row(last, idx);
            }
        }
    }

    pub fn clear(&mut self) {
        self.columns.clear();
    }
}

impl AttributeTable for ColumnStore {
    fn get_int(&self, row: usize, column: &str) -> i32 {
        self.get_int64(row, column) as i32
    }

    fn get_int64(&self, row: usize, column: &str) -> i64 {
        self.get_property(row, column).as_int().unwrap_or(0)
    }

    fn get_double(&self, row: usize, column: &str) -> f64 {
        self.get_property(row, column).as_float().unwrap_or(0.0)
    }

    fn get_text(&self, row: usize, column: &str) -> &str {
        match self.columns.get(column) {
            Some(Column::Text(v)) => v.get(row).and_then(|o| o.as_deref()).unwrap_or(""),
            _ => "",
        }
    }

    fn set_value(&mut self, row: usize, column: &str, value: PropertyValue) {
        self.set_property(row, column, value);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_typed_access() {
        let mut table = ColumnStore::new();
        table.set_value(3, "source", PropertyValue::Int(7));
        table.set_value(3, "name", "#rust".into());
        table.set_value(1, "score", PropertyValue::Float(0.5));

        assert_eq!(table.get_int(3, "source"), 7);
        assert_eq!(table.get_int64(3, "source"), 7);
        assert_eq!(table.get_text(3, "name"), "#rust");
        assert_eq!(table.get_double(1, "score"), 0.5);

        // Missing rows and columns read as defaults
        assert_eq!(table.get_int(0, "source"), 0);
        assert_eq!(table.get_text(9, "name"), "");
        assert_eq!(table.get_double(0, "missing"), 0.0);
    }

    #[test]
    fn test_column_keeps_first_type() {
        let mut table = ColumnStore::new();
        table.set_value(0, "id", PropertyValue::Int(1));
        table.set_value(1, "id", "not a number".into());
        assert!(table.get_property(1, "id").is_null());
    }

    #[test]
    fn test_swap_remove_row() {
        let mut table = ColumnStore::new();
        table.set_value(0, "name", "a".into());
        table.set_value(1, "name", "b".into());
        table.set_value(2, "name", "c".into());

        table.swap_remove_row(0, 2);
        assert_eq!(table.get_text(0, "name"), "c");
        assert_eq!(table.get_text(1, "name"), "b");
        assert_eq!(table.get_text(2, "name"), "");
    }
}
