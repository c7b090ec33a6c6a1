// SPDX-License-Identifier: AGPL-3.0-or-later
//! Standalone provider documents

use std::sync::Arc;

use pf_core::{
    FileKind, FileRef, Locator, ParentRef, PfError, PfResult, ProviderContext, ProviderFile,
};

use crate::document_contract as contract;

/// Handle over one provider locator with no children
///
/// Structural operations fail with [`PfError::Unsupported`].
#[derive(Debug)]
pub struct SingleDocumentFile {
    parent: Option<ParentRef>,
    uri: Locator,
    ctx: ProviderContext,
}

impl SingleDocumentFile {
    pub fn new(parent: Option<ParentRef>, ctx: ProviderContext, uri: Locator) -> Arc<Self> {
        tracing::debug!(uri = %uri, "single document handle");
        Arc::new(Self { parent, uri, ctx })
    }
}

impl ProviderFile for SingleDocumentFile {
    fn kind(&self) -> FileKind {
        FileKind::Single
    }

    fn parent_ref(&self) -> Option<&ParentRef> {
        self.parent.as_ref()
    }

    fn create_file(&self, _mime_type: &str, _display_name: &str) -> PfResult<Option<FileRef>> {
        Err(PfError::unsupported("create_file on a single document"))
    }

    fn create_directory(&self, _display_name: &str) -> PfResult<Option<FileRef>> {
        Err(PfError::unsupported("create_directory on a single document"))
    }

    fn uri(&self) -> Locator {
        self.uri.clone()
    }

    fn name(&self) -> Option<String> {
        contract::get_name(self.ctx.registry(), &self.uri)
    }

    fn mime_type(&self) -> Option<String> {
        contract::get_type(self.ctx.registry(), &self.uri)
    }

    fn is_directory(&self) -> bool {
        contract::is_directory(self.ctx.registry(), &self.uri)
    }

    fn is_file(&self) -> bool {
        contract::is_file(self.ctx.registry(), &self.uri)
    }

    fn is_virtual(&self) -> bool {
        contract::is_virtual(self.ctx.registry(), &self.uri)
    }

    fn last_modified(&self) -> i64 {
        contract::last_modified(self.ctx.registry(), &self.uri)
    }

    fn length(&self) -> u64 {
        contract::length(self.ctx.registry(), &self.uri)
    }

    fn can_read(&self) -> bool {
        contract::can_read(self.ctx.registry(), &self.uri)
    }

    fn can_write(&self) -> bool {
        contract::can_write(self.ctx.registry(), &self.uri)
    }

    fn delete(&self) -> bool {
        contract::delete_document(self.ctx.registry(), &self.uri)
    }

    fn exists(&self) -> bool {
        contract::exists(self.ctx.registry(), &self.uri)
    }

    fn list_files(&self) -> PfResult<Vec<FileRef>> {
        Err(PfError::unsupported("list_files on a single document"))
    }

    fn rename_to(&self, _display_name: &str) -> PfResult<bool> {
        Err(PfError::unsupported("rename_to on a single document"))
    }
}
