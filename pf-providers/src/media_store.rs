// SPDX-License-Identifier: AGPL-3.0-or-later
//! Media index metadata lookups

use pf_core::{
    columns::media::*,
    query::{query_for_long, query_for_string, query_row_count},
    ContentRegistry, ContentValues, Locator,
};

pub fn get_name(registry: &dyn ContentRegistry, uri: &Locator) -> Option<String> {
    query_for_string(registry, uri, COLUMN_DISPLAY_NAME, None)
}

pub fn get_type(registry: &dyn ContentRegistry, uri: &Locator) -> Option<String> {
    query_for_string(registry, uri, COLUMN_MIME_TYPE, None)
}

/// The index stores seconds; handles report milliseconds.
pub fn last_modified(registry: &dyn ContentRegistry, uri: &Locator) -> i64 {
    query_for_long(registry, uri, COLUMN_DATE_MODIFIED, 0).saturating_mul(1000)
}

pub fn length(registry: &dyn ContentRegistry, uri: &Locator) -> u64 {
    query_for_long(registry, uri, COLUMN_SIZE, 0).max(0) as u64
}

pub fn exists(registry: &dyn ContentRegistry, uri: &Locator) -> bool {
    query_row_count(registry, uri, COLUMN_ID) > 0
}

/// Rename by rewriting the display name column; true when a row changed.
pub fn rename_to(registry: &dyn ContentRegistry, uri: &Locator, display_name: &str) -> bool {
    let mut values = ContentValues::new();
    values.put(COLUMN_DISPLAY_NAME, display_name);

    match registry.update(uri, &values) {
        Ok(rows) => rows > 0,
        Err(e) => {
            tracing::warn!(uri = %uri, error = %e, "failed to rename media entry");
            false
        }
    }
}
