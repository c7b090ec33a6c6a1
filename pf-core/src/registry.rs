// SPDX-License-Identifier: AGPL-3.0-or-later
//! Content registry contract
//!
//! The registry is the external service that owns provider-backed resources.
//! This crate only consumes it; implementations live with the platform glue
//! (or, for tests, in `pf_providers::memory`).

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::{
    documents,
    error::{PfError, PfResult},
    locator::Locator,
};

/// Requested access for a permission check
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AccessMode {
    Read,
    Write,
}

/// Single cell of a query result or update record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum CellValue {
    Null,
    Integer(i64),
    Text(String),
}

impl From<i64> for CellValue {
    fn from(v: i64) -> Self {
        CellValue::Integer(v)
    }
}

impl From<&str> for CellValue {
    fn from(v: &str) -> Self {
        CellValue::Text(v.to_string())
    }
}

impl From<String> for CellValue {
    fn from(v: String) -> Self {
        CellValue::Text(v)
    }
}

impl<T: Into<CellValue>> From<Option<T>> for CellValue {
    fn from(v: Option<T>) -> Self {
        v.map(Into::into).unwrap_or(CellValue::Null)
    }
}

/// Column → value record submitted with an update
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ContentValues {
    values: BTreeMap<String, CellValue>,
}

impl ContentValues {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn put(&mut self, column: impl Into<String>, value: impl Into<CellValue>) -> &mut Self {
        self.values.insert(column.into(), value.into());
        self
    }

    pub fn get(&self, column: &str) -> Option<&CellValue> {
        self.values.get(column)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &CellValue)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// Query result handle
///
/// Positioned before the first row when returned. Holding a cursor pins a
/// registry-side resource until [`Cursor::close`] is called or it is dropped.
pub trait Cursor: Send {
    fn count(&self) -> usize;
    fn move_to_first(&mut self) -> bool;
    fn move_to_next(&mut self) -> bool;
    fn get_string(&self, column: usize) -> PfResult<Option<String>>;
    fn get_long(&self, column: usize) -> PfResult<i64>;
    fn close(&mut self) -> PfResult<()>;
}

/// Content registry
pub trait ContentRegistry: Send + Sync {
    /// Query `projection` columns of the rows addressed by `uri`.
    /// `Ok(None)` means the registry produced no result set at all.
    fn query(&self, uri: &Locator, projection: &[&str]) -> PfResult<Option<Box<dyn Cursor>>>;

    /// Apply `values` to the rows addressed by `uri`; returns rows affected.
    fn update(&self, uri: &Locator, values: &ContentValues) -> PfResult<usize>;

    /// Delete the rows addressed by `uri`; returns rows affected.
    fn delete(&self, uri: &Locator) -> PfResult<usize>;

    fn check_uri_permission(&self, uri: &Locator, mode: AccessMode) -> bool;

    /// Create a document under the directory `parent`.
    fn create_document(
        &self,
        parent: &Locator,
        mime_type: &str,
        display_name: &str,
    ) -> PfResult<Option<Locator>>;

    /// Rename a document. The provider may issue a new locator.
    fn rename_document(&self, uri: &Locator, display_name: &str) -> PfResult<Option<Locator>>;

    fn delete_document(&self, uri: &Locator) -> PfResult<bool>;

    /// Whether `authority` is served by a document provider.
    fn is_document_provider(&self, authority: &str) -> bool;

    /// Enumerate children of `parent_document_id` inside the tree of `tree_uri`.
    fn query_children(
        &self,
        tree_uri: &Locator,
        parent_document_id: &str,
        projection: &[&str],
    ) -> PfResult<Option<Box<dyn Cursor>>> {
        let children = documents::build_child_documents_uri_using_tree(tree_uri, parent_document_id)
            .ok_or_else(|| PfError::InvalidLocator(tree_uri.to_string()))?;
        self.query(&children, projection)
    }
}

/// In-memory result set for registries that materialize rows eagerly
#[derive(Debug, Clone)]
pub struct RowCursor {
    columns: Vec<String>,
    rows: Vec<Vec<CellValue>>,
    position: Option<usize>,
    closed: bool,
}

impl RowCursor {
    pub fn new(columns: Vec<String>, rows: Vec<Vec<CellValue>>) -> Self {
        Self {
            columns,
            rows,
            position: None,
            closed: false,
        }
    }

    pub fn empty(columns: Vec<String>) -> Self {
        Self::new(columns, Vec::new())
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    fn cell(&self, column: usize) -> PfResult<&CellValue> {
        if self.closed {
            return Err(PfError::Column("cursor is closed".into()));
        }
        let row = self
            .position
            .and_then(|p| self.rows.get(p))
            .ok_or_else(|| PfError::Column("cursor is not positioned on a row".into()))?;
        row.get(column)
            .ok_or_else(|| PfError::Column(format!("column index {column} out of range")))
    }
}

impl Cursor for RowCursor {
    fn count(&self) -> usize {
        self.rows.len()
    }

    fn move_to_first(&mut self) -> bool {
        if self.rows.is_empty() {
            self.position = None;
            false
        } else {
            self.position = Some(0);
            true
        }
    }

    fn move_to_next(&mut self) -> bool {
        let next = self.position.map_or(0, |p| p + 1);
        if next < self.rows.len() {
            self.position = Some(next);
            true
        } else {
            self.position = Some(self.rows.len());
            false
        }
    }

    fn get_string(&self, column: usize) -> PfResult<Option<String>> {
        Ok(match self.cell(column)? {
            CellValue::Null => None,
            CellValue::Integer(v) => Some(v.to_string()),
            CellValue::Text(s) => Some(s.clone()),
        })
    }

    fn get_long(&self, column: usize) -> PfResult<i64> {
        match self.cell(column)? {
            CellValue::Null => Ok(0),
            CellValue::Integer(v) => Ok(*v),
            CellValue::Text(s) => s
                .trim()
                .parse()
                .map_err(|_| PfError::Column(format!("'{s}' is not an integer"))),
        }
    }

    fn close(&mut self) -> PfResult<()> {
        self.closed = true;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cursor() -> RowCursor {
        RowCursor::new(
            vec!["_display_name".into(), "_size".into()],
            vec![
                vec!["a.txt".into(), 42i64.into()],
                vec![CellValue::Null, "17".into()],
                vec!["c".into(), "big".into()],
            ],
        )
    }

    #[test]
    fn test_iteration() {
        let mut c = cursor();
        assert_eq!(c.count(), 3);
        let mut names = Vec::new();
        while c.move_to_next() {
            names.push(c.get_string(0).unwrap());
        }
        assert_eq!(names, vec![Some("a.txt".into()), None, Some("c".into())]);
        assert!(!c.move_to_next());
    }

    #[test]
    fn test_get_long_conversions() {
        let mut c = cursor();
        assert!(c.move_to_first());
        assert_eq!(c.get_long(1).unwrap(), 42);
        assert!(c.move_to_next());
        assert_eq!(c.get_long(1).unwrap(), 17);
        assert_eq!(c.get_long(0).unwrap(), 0);
        assert!(c.move_to_next());
        assert!(matches!(c.get_long(1), Err(PfError::Column(_))));
    }

    #[test]
    fn test_unpositioned_and_closed() {
        let mut c = cursor();
        assert!(c.get_string(0).is_err());
        c.move_to_first();
        assert!(c.get_string(5).is_err());
        c.close().unwrap();
        assert!(c.is_closed());
        assert!(c.get_string(0).is_err());
    }

    #[test]
    fn test_empty_cursor() {
        let mut c = RowCursor::empty(vec!["_id".into()]);
        assert_eq!(c.count(), 0);
        assert!(!c.move_to_first());
        assert!(!c.move_to_next());
    }

    #[test]
    fn test_content_values() {
        let mut values = ContentValues::new();
        values.put("_display_name", "renamed.jpg").put("_size", 10i64);
        assert_eq!(values.len(), 2);
        assert_eq!(
            values.get("_display_name"),
            Some(&CellValue::Text("renamed.jpg".into()))
        );
        assert_eq!(values.get("_size"), Some(&CellValue::Integer(10)));
        assert!(values.get("missing").is_none());
    }
}
