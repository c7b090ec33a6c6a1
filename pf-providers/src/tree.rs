// SPDX-License-Identifier: AGPL-3.0-or-later
//! Documents inside a granted provider tree
//!
//! Children are addressed by combining the tree root carried in the handle's
//! locator with the document ids the provider reports for each child.

use parking_lot::RwLock;
use std::fmt;
use std::sync::{Arc, Weak};

use pf_core::{
    columns::document::{COLUMN_DOCUMENT_ID, MIME_TYPE_DIR},
    documents,
    query::CursorGuard,
    FileKind, FileRef, Locator, ParentRef, PfResult, ProviderContext, ProviderFile,
};

use crate::document_contract as contract;

/// Handle over a tree-scoped document locator
///
/// The locator is replaced when the provider re-issues it on rename.
pub struct TreeDocumentFile {
    this: Weak<TreeDocumentFile>,
    parent: Option<ParentRef>,
    uri: RwLock<Locator>,
    ctx: ProviderContext,
}

impl TreeDocumentFile {
    pub fn new(parent: Option<ParentRef>, ctx: ProviderContext, uri: Locator) -> Arc<Self> {
        tracing::debug!(uri = %uri, "tree document handle");
        Arc::new_cyclic(|this| Self {
            this: this.clone(),
            parent,
            uri: RwLock::new(uri),
            ctx,
        })
    }

    fn child(&self, uri: Locator) -> FileRef {
        let parent: ParentRef = self.this.clone();
        TreeDocumentFile::new(Some(parent), self.ctx.clone(), uri)
    }

    fn child_locators(&self, uri: &Locator) -> PfResult<Vec<Locator>> {
        let Some(document_id) = documents::get_document_id(uri) else {
            tracing::warn!(uri = %uri, "locator names no document");
            return Ok(Vec::new());
        };

        let registry = self.ctx.registry();
        let Some(cursor) = registry.query_children(uri, &document_id, &[COLUMN_DOCUMENT_ID])? else {
            return Ok(Vec::new());
        };
        let mut cursor = CursorGuard::new(cursor);

        let mut locators = Vec::with_capacity(cursor.count());
        while cursor.move_to_next() {
            let child_id = match cursor.get_string(0) {
                Ok(Some(child_id)) => child_id,
                Ok(None) => continue,
                Err(e) => {
                    tracing::warn!(uri = %uri, error = %e, "unreadable child row, listing truncated");
                    break;
                }
            };
            if let Some(child) = documents::build_document_uri_using_tree(uri, &child_id) {
                locators.push(child);
            }
        }
        Ok(locators)
    }
}

impl fmt::Debug for TreeDocumentFile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TreeDocumentFile")
            .field("uri", &*self.uri.read())
            .finish_non_exhaustive()
    }
}

impl ProviderFile for TreeDocumentFile {
    fn kind(&self) -> FileKind {
        FileKind::Tree
    }

    fn parent_ref(&self) -> Option<&ParentRef> {
        self.parent.as_ref()
    }

    /// The provider decides the final display name; it may append an
    /// extension or refuse a name that is already taken.
    fn create_file(&self, mime_type: &str, display_name: &str) -> PfResult<Option<FileRef>> {
        let uri = self.uri();
        match self.ctx.registry().create_document(&uri, mime_type, display_name) {
            Ok(Some(created)) => Ok(Some(self.child(created))),
            Ok(None) => {
                tracing::warn!(uri = %uri, name = display_name, "provider declined to create document");
                Ok(None)
            }
            Err(e) => {
                tracing::warn!(uri = %uri, name = display_name, error = %e, "failed to create document");
                Ok(None)
            }
        }
    }

    fn create_directory(&self, display_name: &str) -> PfResult<Option<FileRef>> {
        self.create_file(MIME_TYPE_DIR, display_name)
    }

    fn uri(&self) -> Locator {
        self.uri.read().clone()
    }

    fn name(&self) -> Option<String> {
        contract::get_name(self.ctx.registry(), &self.uri())
    }

    fn mime_type(&self) -> Option<String> {
        contract::get_type(self.ctx.registry(), &self.uri())
    }

    fn is_directory(&self) -> bool {
        contract::is_directory(self.ctx.registry(), &self.uri())
    }

    fn is_file(&self) -> bool {
        contract::is_file(self.ctx.registry(), &self.uri())
    }

    fn is_virtual(&self) -> bool {
        contract::is_virtual(self.ctx.registry(), &self.uri())
    }

    fn last_modified(&self) -> i64 {
        contract::last_modified(self.ctx.registry(), &self.uri())
    }

    fn length(&self) -> u64 {
        contract::length(self.ctx.registry(), &self.uri())
    }

    fn can_read(&self) -> bool {
        contract::can_read(self.ctx.registry(), &self.uri())
    }

    fn can_write(&self) -> bool {
        contract::can_write(self.ctx.registry(), &self.uri())
    }

    fn delete(&self) -> bool {
        contract::delete_document(self.ctx.registry(), &self.uri())
    }

    fn exists(&self) -> bool {
        contract::exists(self.ctx.registry(), &self.uri())
    }

    fn list_files(&self) -> PfResult<Vec<FileRef>> {
        let uri = self.uri();
        let locators = match self.child_locators(&uri) {
            Ok(locators) => locators,
            Err(e) => {
                tracing::warn!(uri = %uri, error = %e, "failed to list children");
                Vec::new()
            }
        };
        Ok(locators.into_iter().map(|child| self.child(child)).collect())
    }

    fn rename_to(&self, display_name: &str) -> PfResult<bool> {
        let mut uri = self.uri.write();
        match self.ctx.registry().rename_document(&uri, display_name) {
            Ok(Some(renamed)) => {
                tracing::debug!(from = %*uri, to = %renamed, "renamed document");
                *uri = renamed;
                Ok(true)
            }
            Ok(None) => {
                tracing::warn!(uri = %*uri, name = display_name, "provider declined rename");
                Ok(false)
            }
            Err(e) => {
                tracing::warn!(uri = %*uri, name = display_name, error = %e, "failed to rename document");
                Ok(false)
            }
        }
    }
}
