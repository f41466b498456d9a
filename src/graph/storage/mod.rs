//! Attribute storage backing node and face tables

pub mod columnar;

pub use columnar::{AttributeTable, Column, ColumnStore};
