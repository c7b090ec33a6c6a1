// SPDX-License-Identifier: AGPL-3.0-or-later
//! In-memory content registry
//!
//! A small document provider plus media index held entirely in memory.
//! Intended for tests and examples; it tracks open cursors so callers can
//! check that every query handle was released.
//!
//! Provider behaviour worth knowing when writing assertions:
//! - `create_document` appends the MIME type's extension to file names
//!   (`pic` + `image/png` → `pic.png`) unless disabled.
//! - sibling names are unique; duplicates are rejected.
//! - `rename_document` issues a fresh document id, so the locator changes.

use parking_lot::Mutex;
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use pf_core::{
    columns::{document, media},
    documents, mime, AccessMode, CellValue, ContentRegistry, ContentValues, Cursor, Locator,
    PfError, PfResult, RowCursor,
};

pub const ROOT_ID: &str = "root";
pub const MEDIA_AUTHORITY: &str = "media";

const EPOCH_MILLIS: i64 = 1_700_000_000_000;

const DEFAULT_FILE_FLAGS: i64 =
    document::FLAG_SUPPORTS_WRITE | document::FLAG_SUPPORTS_DELETE | document::FLAG_SUPPORTS_RENAME;
const DEFAULT_DIR_FLAGS: i64 =
    document::FLAG_DIR_SUPPORTS_CREATE | document::FLAG_SUPPORTS_DELETE | document::FLAG_SUPPORTS_RENAME;

#[derive(Debug, Clone)]
struct Document {
    parent: Option<String>,
    name: String,
    mime_type: String,
    size: u64,
    last_modified: i64,
    flags: i64,
}

impl Document {
    fn is_directory(&self) -> bool {
        self.mime_type == document::MIME_TYPE_DIR
    }
}

#[derive(Debug, Clone)]
struct MediaItem {
    name: String,
    mime_type: String,
    size: u64,
    date_modified_secs: i64,
}

#[derive(Debug)]
struct State {
    documents: BTreeMap<String, Document>,
    media: BTreeMap<u64, MediaItem>,
    grants: Vec<(String, AccessMode)>,
    next_id: u64,
    clock: i64,
    failing: bool,
    append_extensions: bool,
}

impl State {
    fn issue_id(&mut self) -> u64 {
        self.next_id += 1;
        self.next_id
    }

    fn tick(&mut self) -> i64 {
        self.clock += 1;
        EPOCH_MILLIS + self.clock * 1000
    }

    fn child_named(&self, parent: &str, name: &str) -> Option<&String> {
        self.documents
            .iter()
            .find(|(_, d)| d.parent.as_deref() == Some(parent) && d.name == name)
            .map(|(id, _)| id)
    }

    fn is_descendant(&self, ancestor: &str, id: &str) -> bool {
        let mut current = Some(id.to_string());
        while let Some(cur) = current {
            if cur == ancestor {
                return true;
            }
            current = self.documents.get(&cur).and_then(|d| d.parent.clone());
        }
        false
    }

    fn remove_subtree(&mut self, id: &str) {
        let children: Vec<String> = self
            .documents
            .iter()
            .filter(|(_, d)| d.parent.as_deref() == Some(id))
            .map(|(child, _)| child.clone())
            .collect();
        for child in children {
            self.remove_subtree(&child);
        }
        self.documents.remove(id);
    }
}

#[derive(Debug)]
struct Inner {
    authority: String,
    state: Mutex<State>,
    open_cursors: Arc<AtomicUsize>,
}

/// In-memory document provider and media index
#[derive(Debug, Clone)]
pub struct MemoryRegistry {
    inner: Arc<Inner>,
}

impl MemoryRegistry {
    /// Registry serving documents under `authority`, with an empty root
    /// directory whose id is [`ROOT_ID`].
    pub fn new(authority: impl Into<String>) -> Self {
        let mut documents = BTreeMap::new();
        documents.insert(
            ROOT_ID.to_string(),
            Document {
                parent: None,
                name: "Root".to_string(),
                mime_type: document::MIME_TYPE_DIR.to_string(),
                size: 0,
                last_modified: EPOCH_MILLIS,
                flags: DEFAULT_DIR_FLAGS,
            },
        );

        Self {
            inner: Arc::new(Inner {
                authority: authority.into(),
                state: Mutex::new(State {
                    documents,
                    media: BTreeMap::new(),
                    grants: Vec::new(),
                    next_id: 0,
                    clock: 0,
                    failing: false,
                    append_extensions: true,
                }),
                open_cursors: Arc::new(AtomicUsize::new(0)),
            }),
        }
    }

    pub fn authority(&self) -> &str {
        &self.inner.authority
    }

    /// Tree locator granting access to the whole registry.
    pub fn tree_uri(&self) -> Locator {
        documents::build_tree_document_uri(&self.inner.authority, ROOT_ID)
    }

    /// Tree-scoped locator for `document_id`.
    pub fn document_uri(&self, document_id: &str) -> Locator {
        Locator::content(
            &self.inner.authority,
            &[documents::PATH_TREE, ROOT_ID, documents::PATH_DOCUMENT, document_id],
        )
    }

    /// Locator for `document_id` outside of any tree.
    pub fn single_document_uri(&self, document_id: &str) -> Locator {
        documents::build_document_uri(&self.inner.authority, document_id)
    }

    pub fn add_directory(&self, parent_id: &str, name: &str) -> String {
        self.insert(parent_id, name, document::MIME_TYPE_DIR, 0, DEFAULT_DIR_FLAGS)
    }

    pub fn add_file(&self, parent_id: &str, name: &str, mime_type: &str, size: u64) -> String {
        self.insert(parent_id, name, mime_type, size, DEFAULT_FILE_FLAGS)
    }

    fn insert(&self, parent_id: &str, name: &str, mime_type: &str, size: u64, flags: i64) -> String {
        let mut state = self.inner.state.lock();
        let id = state.issue_id().to_string();
        let last_modified = state.tick();
        state.documents.insert(
            id.clone(),
            Document {
                parent: Some(parent_id.to_string()),
                name: name.to_string(),
                mime_type: mime_type.to_string(),
                size,
                last_modified,
                flags,
            },
        );
        id
    }

    /// Add a media index entry; returns its locator.
    pub fn add_media(&self, name: &str, mime_type: &str, size: u64, date_modified_secs: i64) -> Locator {
        let mut state = self.inner.state.lock();
        let id = state.issue_id();
        state.media.insert(
            id,
            MediaItem {
                name: name.to_string(),
                mime_type: mime_type.to_string(),
                size,
                date_modified_secs,
            },
        );
        let id = id.to_string();
        Locator::content(MEDIA_AUTHORITY, &["external", "images", "media", id.as_str()])
    }

    pub fn set_flags(&self, document_id: &str, flags: i64) {
        if let Some(doc) = self.inner.state.lock().documents.get_mut(document_id) {
            doc.flags = flags;
        }
    }

    /// Grant `mode` on `uri` and every locator under it.
    pub fn grant(&self, uri: &Locator, mode: AccessMode) {
        self.inner.state.lock().grants.push((uri.as_str().to_string(), mode));
    }

    pub fn revoke_all(&self) {
        self.inner.state.lock().grants.clear();
    }

    /// Make every registry call fail until switched off.
    pub fn set_failing(&self, failing: bool) {
        self.inner.state.lock().failing = failing;
    }

    pub fn set_append_extensions(&self, append: bool) {
        self.inner.state.lock().append_extensions = append;
    }

    /// Cursors handed out and not yet closed.
    pub fn open_cursors(&self) -> usize {
        self.inner.open_cursors.load(Ordering::SeqCst)
    }

    pub fn document_count(&self) -> usize {
        self.inner.state.lock().documents.len()
    }

    pub fn contains_document(&self, document_id: &str) -> bool {
        self.inner.state.lock().documents.contains_key(document_id)
    }

    fn guard(&self, state: &State) -> PfResult<()> {
        if state.failing {
            Err(PfError::provider(&self.inner.authority, "registry unavailable"))
        } else {
            Ok(())
        }
    }

    /// Document id addressed by `uri`, checked against the tree it is scoped to.
    fn resolve(&self, state: &State, uri: &Locator) -> PfResult<String> {
        if uri.authority() != self.inner.authority {
            return Err(PfError::provider(uri.authority(), "unknown authority"));
        }
        let id = documents::get_document_id(uri)
            .or_else(|| documents::get_tree_document_id(uri))
            .ok_or_else(|| PfError::InvalidLocator(uri.to_string()))?;
        if let Some(tree_id) = documents::get_tree_document_id(uri) {
            if state.documents.contains_key(&id) && !state.is_descendant(&tree_id, &id) {
                return Err(PfError::PermissionDenied(format!("{id} is outside tree {tree_id}")));
            }
        }
        Ok(id)
    }

    fn rebuild_uri(&self, like: &Locator, document_id: &str) -> Locator {
        documents::build_document_uri_using_tree(like, document_id)
            .unwrap_or_else(|| documents::build_document_uri(&self.inner.authority, document_id))
    }

    fn cursor(&self, projection: &[&str], rows: Vec<Vec<CellValue>>) -> Box<dyn Cursor> {
        self.inner.open_cursors.fetch_add(1, Ordering::SeqCst);
        Box::new(MemoryCursor {
            inner: RowCursor::new(projection.iter().map(|c| c.to_string()).collect(), rows),
            open: Arc::clone(&self.inner.open_cursors),
            released: false,
        })
    }

    fn document_row(id: &str, doc: &Document, projection: &[&str]) -> Vec<CellValue> {
        projection
            .iter()
            .map(|column| match *column {
                document::COLUMN_DOCUMENT_ID => CellValue::from(id),
                document::COLUMN_DISPLAY_NAME => CellValue::from(doc.name.as_str()),
                document::COLUMN_MIME_TYPE => CellValue::from(doc.mime_type.as_str()),
                document::COLUMN_LAST_MODIFIED => CellValue::Integer(doc.last_modified),
                document::COLUMN_SIZE if doc.is_directory() => CellValue::Null,
                document::COLUMN_SIZE => CellValue::Integer(doc.size as i64),
                document::COLUMN_FLAGS => CellValue::Integer(doc.flags),
                _ => CellValue::Null,
            })
            .collect()
    }

    fn media_row(id: u64, item: &MediaItem, projection: &[&str]) -> Vec<CellValue> {
        projection
            .iter()
            .map(|column| match *column {
                media::COLUMN_ID => CellValue::Integer(id as i64),
                media::COLUMN_DISPLAY_NAME => CellValue::from(item.name.as_str()),
                media::COLUMN_MIME_TYPE => CellValue::from(item.mime_type.as_str()),
                media::COLUMN_DATE_MODIFIED => CellValue::Integer(item.date_modified_secs),
                media::COLUMN_SIZE => CellValue::Integer(item.size as i64),
                _ => CellValue::Null,
            })
            .collect()
    }

    fn media_id(uri: &Locator) -> PfResult<u64> {
        uri.path_segments()
            .last()
            .and_then(|s| s.parse().ok())
            .ok_or_else(|| PfError::InvalidLocator(uri.to_string()))
    }
}

/// A grant covers its own locator and anything below it, never a sibling
/// that merely shares the same leading characters.
fn grant_covers(prefix: &str, uri: &str) -> bool {
    match uri.strip_prefix(prefix) {
        Some(rest) => rest.is_empty() || rest.starts_with('/') || prefix.ends_with('/'),
        None => false,
    }
}

impl ContentRegistry for MemoryRegistry {
    fn query(&self, uri: &Locator, projection: &[&str]) -> PfResult<Option<Box<dyn Cursor>>> {
        let state = self.inner.state.lock();
        self.guard(&state)?;

        if uri.authority() == MEDIA_AUTHORITY {
            let id = Self::media_id(uri)?;
            let rows = state
                .media
                .get(&id)
                .map(|item| vec![Self::media_row(id, item, projection)])
                .unwrap_or_default();
            return Ok(Some(self.cursor(projection, rows)));
        }

        let id = self.resolve(&state, uri)?;
        let listing_children = uri.path_segments().last().map(String::as_str) == Some(documents::PATH_CHILDREN);

        let rows = if listing_children {
            let mut children: Vec<(&String, &Document)> = state
                .documents
                .iter()
                .filter(|(_, d)| d.parent.as_deref() == Some(id.as_str()))
                .collect();
            children.sort_by(|a, b| a.1.name.cmp(&b.1.name));
            children
                .into_iter()
                .map(|(child_id, doc)| Self::document_row(child_id, doc, projection))
                .collect()
        } else {
            state
                .documents
                .get(&id)
                .map(|doc| vec![Self::document_row(&id, doc, projection)])
                .unwrap_or_default()
        };

        Ok(Some(self.cursor(projection, rows)))
    }

    fn update(&self, uri: &Locator, values: &ContentValues) -> PfResult<usize> {
        let mut state = self.inner.state.lock();
        self.guard(&state)?;
        if uri.authority() != MEDIA_AUTHORITY {
            return Err(PfError::provider(uri.authority(), "update is only supported for media"));
        }

        let id = Self::media_id(uri)?;
        let Some(item) = state.media.get_mut(&id) else {
            return Ok(0);
        };
        for (column, value) in values.iter() {
            match (column, value) {
                (media::COLUMN_DISPLAY_NAME, CellValue::Text(name)) => item.name = name.clone(),
                (media::COLUMN_MIME_TYPE, CellValue::Text(mime_type)) => item.mime_type = mime_type.clone(),
                (media::COLUMN_DATE_MODIFIED, CellValue::Integer(secs)) => item.date_modified_secs = *secs,
                _ => return Err(PfError::Column(format!("cannot update column {column}"))),
            }
        }
        Ok(1)
    }

    fn delete(&self, uri: &Locator) -> PfResult<usize> {
        if uri.authority() == MEDIA_AUTHORITY {
            let mut state = self.inner.state.lock();
            self.guard(&state)?;
            let id = Self::media_id(uri)?;
            return Ok(usize::from(state.media.remove(&id).is_some()));
        }
        self.delete_document(uri).map(usize::from)
    }

    fn check_uri_permission(&self, uri: &Locator, mode: AccessMode) -> bool {
        let state = self.inner.state.lock();
        state
            .grants
            .iter()
            .any(|(prefix, granted)| *granted == mode && grant_covers(prefix, uri.as_str()))
    }

    fn create_document(
        &self,
        parent: &Locator,
        mime_type: &str,
        display_name: &str,
    ) -> PfResult<Option<Locator>> {
        let mut state = self.inner.state.lock();
        self.guard(&state)?;

        let parent_id = self.resolve(&state, parent)?;
        match state.documents.get(&parent_id) {
            Some(doc) if doc.is_directory() => {}
            Some(_) => return Err(PfError::provider(&self.inner.authority, "parent is not a directory")),
            None => return Err(PfError::NotFound(parent.to_string())),
        }
        if display_name.is_empty() || display_name.contains('/') {
            return Err(PfError::provider(&self.inner.authority, "invalid display name"));
        }

        let mut name = display_name.to_string();
        if mime_type != document::MIME_TYPE_DIR && state.append_extensions {
            if let Some(ext) = mime::extension_from_mime_type(mime_type) {
                let suffix = format!(".{ext}");
                if !name.to_ascii_lowercase().ends_with(&suffix) {
                    name.push_str(&suffix);
                }
            }
        }
        if state.child_named(&parent_id, &name).is_some() {
            return Err(PfError::AlreadyExists(name));
        }

        let flags = if mime_type == document::MIME_TYPE_DIR {
            DEFAULT_DIR_FLAGS
        } else {
            DEFAULT_FILE_FLAGS
        };
        let id = state.issue_id().to_string();
        let last_modified = state.tick();
        state.documents.insert(
            id.clone(),
            Document {
                parent: Some(parent_id),
                name,
                mime_type: mime_type.to_string(),
                size: 0,
                last_modified,
                flags,
            },
        );
        Ok(Some(self.rebuild_uri(parent, &id)))
    }

    fn rename_document(&self, uri: &Locator, display_name: &str) -> PfResult<Option<Locator>> {
        let mut state = self.inner.state.lock();
        self.guard(&state)?;

        let id = self.resolve(&state, uri)?;
        if id == ROOT_ID {
            return Err(PfError::provider(&self.inner.authority, "cannot rename the root"));
        }
        let Some(mut doc) = state.documents.get(&id).cloned() else {
            return Err(PfError::NotFound(uri.to_string()));
        };
        if display_name.is_empty() || display_name.contains('/') {
            return Err(PfError::provider(&self.inner.authority, "invalid display name"));
        }
        if let Some(parent) = doc.parent.as_deref() {
            if matches!(state.child_named(parent, display_name), Some(other) if *other != id) {
                return Err(PfError::AlreadyExists(display_name.to_string()));
            }
        }

        doc.name = display_name.to_string();
        if !doc.is_directory() {
            if let Some(mime_type) = display_name
                .rsplit_once('.')
                .and_then(|(_, ext)| mime::mime_type_from_extension(ext))
            {
                doc.mime_type = mime_type.to_string();
            }
        }
        doc.last_modified = state.tick();

        let new_id = state.issue_id().to_string();
        state.documents.remove(&id);
        state.documents.insert(new_id.clone(), doc);
        for child in state.documents.values_mut() {
            if child.parent.as_deref() == Some(id.as_str()) {
                child.parent = Some(new_id.clone());
            }
        }
        Ok(Some(self.rebuild_uri(uri, &new_id)))
    }

    fn delete_document(&self, uri: &Locator) -> PfResult<bool> {
        let mut state = self.inner.state.lock();
        self.guard(&state)?;

        let id = self.resolve(&state, uri)?;
        if id == ROOT_ID {
            return Err(PfError::provider(&self.inner.authority, "cannot delete the root"));
        }
        if !state.documents.contains_key(&id) {
            return Err(PfError::NotFound(uri.to_string()));
        }
        state.remove_subtree(&id);
        Ok(true)
    }

    fn is_document_provider(&self, authority: &str) -> bool {
        authority == self.inner.authority
    }
}

/// Row cursor that reports itself to the registry's open-cursor count
struct MemoryCursor {
    inner: RowCursor,
    open: Arc<AtomicUsize>,
    released: bool,
}

impl MemoryCursor {
    fn release(&mut self) {
        if !self.released {
            self.released = true;
            self.open.fetch_sub(1, Ordering::SeqCst);
        }
    }
}

impl Cursor for MemoryCursor {
    fn count(&self) -> usize {
        self.inner.count()
    }

    fn move_to_first(&mut self) -> bool {
        self.inner.move_to_first()
    }

    fn move_to_next(&mut self) -> bool {
        self.inner.move_to_next()
    }

    fn get_string(&self, column: usize) -> PfResult<Option<String>> {
        self.inner.get_string(column)
    }

    fn get_long(&self, column: usize) -> PfResult<i64> {
        self.inner.get_long(column)
    }

    fn close(&mut self) -> PfResult<()> {
        self.release();
        self.inner.close()
    }
}

impl Drop for MemoryCursor {
    fn drop(&mut self) {
        self.release();
    }
}
