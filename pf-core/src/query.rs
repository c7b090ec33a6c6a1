// SPDX-License-Identifier: AGPL-3.0-or-later
//! Registry query helpers
//!
//! Every lookup here is total: registry failures are logged and replaced
//! by the caller's default. Cursors are released on every path through
//! [`CursorGuard`].

use std::ops::{Deref, DerefMut};

use crate::{
    error::PfResult,
    locator::Locator,
    registry::{AccessMode, ContentRegistry, Cursor},
};

/// Owns a cursor and closes it when dropped
pub struct CursorGuard {
    cursor: Box<dyn Cursor>,
}

impl CursorGuard {
    pub fn new(cursor: Box<dyn Cursor>) -> Self {
        Self { cursor }
    }
}

impl Deref for CursorGuard {
    type Target = dyn Cursor;

    fn deref(&self) -> &Self::Target {
        self.cursor.as_ref()
    }
}

impl DerefMut for CursorGuard {
    fn deref_mut(&mut self) -> &mut Self::Target {
        self.cursor.as_mut()
    }
}

impl Drop for CursorGuard {
    fn drop(&mut self) {
        close_quietly(self.cursor.as_mut());
    }
}

/// Close a cursor, logging instead of propagating a failed close.
pub fn close_quietly(cursor: &mut dyn Cursor) {
    if let Err(e) = cursor.close() {
        tracing::warn!(error = %e, "failed to close cursor");
    }
}

/// Run a query and wrap the result set in a [`CursorGuard`].
pub fn open_query(
    registry: &dyn ContentRegistry,
    uri: &Locator,
    projection: &[&str],
) -> PfResult<Option<CursorGuard>> {
    Ok(registry.query(uri, projection)?.map(CursorGuard::new))
}

/// Column types readable with [`query_scalar`]
pub trait ColumnValue: Sized {
    /// `None` when the cell holds no value.
    fn read(cursor: &dyn Cursor, column: usize) -> PfResult<Option<Self>>;
}

impl ColumnValue for String {
    fn read(cursor: &dyn Cursor, column: usize) -> PfResult<Option<Self>> {
        cursor.get_string(column)
    }
}

impl ColumnValue for i64 {
    fn read(cursor: &dyn Cursor, column: usize) -> PfResult<Option<Self>> {
        cursor.get_long(column).map(Some)
    }
}

/// First-row value of `column`, or `None` when absent or on failure.
pub fn query_optional<T: ColumnValue>(
    registry: &dyn ContentRegistry,
    uri: &Locator,
    column: &str,
) -> Option<T> {
    let result = (|| -> PfResult<Option<T>> {
        let Some(mut cursor) = open_query(registry, uri, &[column])? else {
            return Ok(None);
        };
        if !cursor.move_to_first() {
            return Ok(None);
        }
        T::read(&*cursor, 0)
    })();

    match result {
        Ok(value) => value,
        Err(e) => {
            tracing::warn!(uri = %uri, column, error = %e, "query failed");
            None
        }
    }
}

/// First-row value of `column`, or `default`.
pub fn query_scalar<T: ColumnValue>(
    registry: &dyn ContentRegistry,
    uri: &Locator,
    column: &str,
    default: T,
) -> T {
    query_optional(registry, uri, column).unwrap_or(default)
}

pub fn query_for_string(
    registry: &dyn ContentRegistry,
    uri: &Locator,
    column: &str,
    default: Option<&str>,
) -> Option<String> {
    query_optional::<String>(registry, uri, column).or_else(|| default.map(str::to_string))
}

pub fn query_for_long(registry: &dyn ContentRegistry, uri: &Locator, column: &str, default: i64) -> i64 {
    query_scalar(registry, uri, column, default)
}

/// Number of rows `uri` resolves to, 0 on failure.
pub fn query_row_count(registry: &dyn ContentRegistry, uri: &Locator, column: &str) -> usize {
    match open_query(registry, uri, &[column]) {
        Ok(Some(cursor)) => cursor.count(),
        Ok(None) => 0,
        Err(e) => {
            tracing::warn!(uri = %uri, column, error = %e, "count query failed");
            0
        }
    }
}

pub fn can_read(registry: &dyn ContentRegistry, uri: &Locator) -> bool {
    registry.check_uri_permission(uri, AccessMode::Read)
}

pub fn can_write(registry: &dyn ContentRegistry, uri: &Locator) -> bool {
    registry.check_uri_permission(uri, AccessMode::Write)
}

/// Row-level delete; true when at least one row went away.
pub fn delete(registry: &dyn ContentRegistry, uri: &Locator) -> bool {
    match registry.delete(uri) {
        Ok(rows) => rows > 0,
        Err(e) => {
            tracing::warn!(uri = %uri, error = %e, "delete failed");
            false
        }
    }
}
