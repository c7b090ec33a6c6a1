// SPDX-License-Identifier: AGPL-3.0-or-later
//! Document provider metadata lookups shared by single and tree handles

use pf_core::{
    columns::document::*,
    documents,
    query::{self, query_for_long, query_for_string, query_row_count},
    ContentRegistry, Locator,
};

pub fn is_document_uri(registry: &dyn ContentRegistry, uri: &Locator) -> bool {
    documents::has_document_shape(uri) && registry.is_document_provider(uri.authority())
}

pub fn is_virtual(registry: &dyn ContentRegistry, uri: &Locator) -> bool {
    if !is_document_uri(registry, uri) {
        return false;
    }
    get_flags(registry, uri) & FLAG_VIRTUAL_DOCUMENT != 0
}

pub fn get_name(registry: &dyn ContentRegistry, uri: &Locator) -> Option<String> {
    query_for_string(registry, uri, COLUMN_DISPLAY_NAME, None)
}

/// MIME type as stored, including the directory type.
pub fn get_raw_type(registry: &dyn ContentRegistry, uri: &Locator) -> Option<String> {
    query_for_string(registry, uri, COLUMN_MIME_TYPE, None)
}

pub fn get_type(registry: &dyn ContentRegistry, uri: &Locator) -> Option<String> {
    get_raw_type(registry, uri).filter(|t| t != MIME_TYPE_DIR)
}

pub fn get_flags(registry: &dyn ContentRegistry, uri: &Locator) -> i64 {
    query_for_long(registry, uri, COLUMN_FLAGS, 0)
}

pub fn is_directory(registry: &dyn ContentRegistry, uri: &Locator) -> bool {
    get_raw_type(registry, uri).as_deref() == Some(MIME_TYPE_DIR)
}

pub fn is_file(registry: &dyn ContentRegistry, uri: &Locator) -> bool {
    matches!(get_raw_type(registry, uri), Some(t) if !t.is_empty() && t != MIME_TYPE_DIR)
}

pub fn last_modified(registry: &dyn ContentRegistry, uri: &Locator) -> i64 {
    query_for_long(registry, uri, COLUMN_LAST_MODIFIED, 0)
}

pub fn length(registry: &dyn ContentRegistry, uri: &Locator) -> u64 {
    query_for_long(registry, uri, COLUMN_SIZE, 0).max(0) as u64
}

/// Read grant plus a known type; documents without a type can't be opened.
pub fn can_read(registry: &dyn ContentRegistry, uri: &Locator) -> bool {
    if !query::can_read(registry, uri) {
        return false;
    }
    get_raw_type(registry, uri).is_some_and(|t| !t.is_empty())
}

pub fn can_write(registry: &dyn ContentRegistry, uri: &Locator) -> bool {
    if !query::can_write(registry, uri) {
        return false;
    }

    let Some(mime_type) = get_raw_type(registry, uri).filter(|t| !t.is_empty()) else {
        return false;
    };
    let flags = get_flags(registry, uri);

    if flags & FLAG_SUPPORTS_DELETE != 0 {
        return true;
    }
    if mime_type == MIME_TYPE_DIR {
        flags & FLAG_DIR_SUPPORTS_CREATE != 0
    } else {
        flags & FLAG_SUPPORTS_WRITE != 0
    }
}

pub fn exists(registry: &dyn ContentRegistry, uri: &Locator) -> bool {
    query_row_count(registry, uri, COLUMN_DOCUMENT_ID) > 0
}

/// Provider-level delete; refusals and failures are `false`.
pub fn delete_document(registry: &dyn ContentRegistry, uri: &Locator) -> bool {
    match registry.delete_document(uri) {
        Ok(deleted) => deleted,
        Err(e) => {
            tracing::warn!(uri = %uri, error = %e, "failed to delete document");
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::MemoryRegistry;
    use pf_core::AccessMode;

    fn setup() -> (MemoryRegistry, Locator, Locator) {
        let registry = MemoryRegistry::new("com.example.docs");
        let dir = registry.add_directory("root", "Photos");
        let file = registry.add_file("root", "a.txt", "text/plain", 42);
        let tree = registry.tree_uri();
        (
            registry.clone(),
            documents::build_document_uri_using_tree(&tree, &dir).unwrap(),
            documents::build_document_uri_using_tree(&tree, &file).unwrap(),
        )
    }

    #[test]
    fn test_classification() {
        let (registry, dir, file) = setup();
        assert!(is_directory(&registry, &dir));
        assert!(!is_file(&registry, &dir));
        assert!(get_type(&registry, &dir).is_none());
        assert_eq!(get_raw_type(&registry, &dir).as_deref(), Some(MIME_TYPE_DIR));

        assert!(is_file(&registry, &file));
        assert!(!is_directory(&registry, &file));
        assert_eq!(get_type(&registry, &file).as_deref(), Some("text/plain"));
        assert_eq!(get_name(&registry, &file).as_deref(), Some("a.txt"));
        assert_eq!(length(&registry, &file), 42);
        assert!(exists(&registry, &file));
    }

    #[test]
    fn test_virtual_flag() {
        let (registry, _, file) = setup();
        assert!(!is_virtual(&registry, &file));
        let id = registry.add_file("root", "sheet", "application/x-sheet", 0);
        registry.set_flags(&id, FLAG_VIRTUAL_DOCUMENT);
        let uri = documents::build_document_uri_using_tree(&registry.tree_uri(), &id).unwrap();
        assert!(is_virtual(&registry, &uri));
    }

    #[test]
    fn test_can_read_requires_grant() {
        let (registry, _, file) = setup();
        assert!(!can_read(&registry, &file));
        registry.grant(&registry.tree_uri(), AccessMode::Read);
        assert!(can_read(&registry, &file));
        assert!(!can_write(&registry, &file));
    }

    #[test]
    fn test_can_write_follows_flags() {
        let (registry, dir, file) = setup();
        registry.grant(&registry.tree_uri(), AccessMode::Write);

        let file_id = documents::get_document_id(&file).unwrap();
        registry.set_flags(&file_id, 0);
        assert!(!can_write(&registry, &file));
        registry.set_flags(&file_id, FLAG_SUPPORTS_WRITE);
        assert!(can_write(&registry, &file));

        let dir_id = documents::get_document_id(&dir).unwrap();
        registry.set_flags(&dir_id, FLAG_SUPPORTS_WRITE);
        assert!(!can_write(&registry, &dir));
        registry.set_flags(&dir_id, FLAG_DIR_SUPPORTS_CREATE);
        assert!(can_write(&registry, &dir));
        registry.set_flags(&dir_id, FLAG_SUPPORTS_DELETE);
        assert!(can_write(&registry, &dir));
    }

    #[test]
    fn test_missing_document() {
        let (registry, _, _) = setup();
        let missing = documents::build_document_uri_using_tree(&registry.tree_uri(), "404").unwrap();
        assert!(!exists(&registry, &missing));
        assert!(get_name(&registry, &missing).is_none());
        assert_eq!(last_modified(&registry, &missing), 0);
        assert!(!delete_document(&registry, &missing));
    }
}
