// SPDX-License-Identifier: AGPL-3.0-or-later
//! Media index entries

use std::sync::Arc;

use pf_core::{
    query, FileKind, FileRef, Locator, ParentRef, PfError, PfResult, ProviderContext, ProviderFile,
};

use crate::media_store as store;

/// Handle over one media index row; always a file
#[derive(Debug)]
pub struct MediaDocumentFile {
    parent: Option<ParentRef>,
    uri: Locator,
    ctx: ProviderContext,
}

impl MediaDocumentFile {
    pub fn new(parent: Option<ParentRef>, ctx: ProviderContext, uri: Locator) -> Arc<Self> {
        tracing::debug!(uri = %uri, "media handle");
        Arc::new(Self { parent, uri, ctx })
    }
}

impl ProviderFile for MediaDocumentFile {
    fn kind(&self) -> FileKind {
        FileKind::Media
    }

    fn parent_ref(&self) -> Option<&ParentRef> {
        self.parent.as_ref()
    }

    fn create_file(&self, _mime_type: &str, _display_name: &str) -> PfResult<Option<FileRef>> {
        Err(PfError::unsupported("create_file on a media entry"))
    }

    fn create_directory(&self, _display_name: &str) -> PfResult<Option<FileRef>> {
        Err(PfError::unsupported("create_directory on a media entry"))
    }

    fn uri(&self) -> Locator {
        self.uri.clone()
    }

    fn name(&self) -> Option<String> {
        store::get_name(self.ctx.registry(), &self.uri)
    }

    fn mime_type(&self) -> Option<String> {
        store::get_type(self.ctx.registry(), &self.uri)
    }

    fn is_directory(&self) -> bool {
        false
    }

    fn is_file(&self) -> bool {
        true
    }

    fn is_virtual(&self) -> bool {
        false
    }

    fn last_modified(&self) -> i64 {
        store::last_modified(self.ctx.registry(), &self.uri)
    }

    fn length(&self) -> u64 {
        store::length(self.ctx.registry(), &self.uri)
    }

    fn can_read(&self) -> bool {
        query::can_read(self.ctx.registry(), &self.uri)
    }

    fn can_write(&self) -> bool {
        query::can_write(self.ctx.registry(), &self.uri)
    }

    fn delete(&self) -> bool {
        query::delete(self.ctx.registry(), &self.uri)
    }

    fn exists(&self) -> bool {
        store::exists(self.ctx.registry(), &self.uri)
    }

    fn list_files(&self) -> PfResult<Vec<FileRef>> {
        Err(PfError::unsupported("list_files on a media entry"))
    }

    /// Rewrites the display name; the locator stays the same.
    fn rename_to(&self, display_name: &str) -> PfResult<bool> {
        Ok(store::rename_to(self.ctx.registry(), &self.uri, display_name))
    }
}
