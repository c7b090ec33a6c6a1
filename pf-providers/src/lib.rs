// SPDX-License-Identifier: AGPL-3.0-or-later
//! Document handles for ProviderFile
//!
//! Four backing stores behind one [`pf_core::ProviderFile`] contract: native paths,
//! standalone provider documents, provider trees and media index entries.
//! Pick one with the factory functions below.

pub mod document_contract;
pub mod media_store;

mod media;
mod raw;
mod single;
mod tree;

#[cfg(any(test, feature = "memory"))]
pub mod memory;

pub use media::MediaDocumentFile;
pub use raw::RawDocumentFile;
pub use single::SingleDocumentFile;
pub use tree::TreeDocumentFile;

use std::path::Path;
use std::sync::Arc;

use pf_core::{documents, FileRef, Locator, PfError, PfResult, ProviderContext, ProviderFileConfig};

/// Handle over a native path with the default configuration.
pub fn from_file(path: impl AsRef<Path>) -> FileRef {
    from_file_with_config(path, ProviderFileConfig::default())
}

pub fn from_file_with_config(path: impl AsRef<Path>, config: ProviderFileConfig) -> FileRef {
    RawDocumentFile::new(None, path.as_ref(), Arc::new(config))
}

/// Handle over a single provider document. Never fails; an unresolvable
/// locator just produces a handle whose queries all come back empty.
pub fn from_single_uri(ctx: &ProviderContext, uri: Locator) -> FileRef {
    SingleDocumentFile::new(None, ctx.clone(), uri)
}

/// Handle for the document a tree locator points at.
///
/// Accepts a bare tree locator (resolves to the tree root) or a
/// tree-scoped document locator (resolves to that document).
pub fn from_tree_uri(ctx: &ProviderContext, tree_uri: &Locator) -> PfResult<FileRef> {
    let document_id = if is_document_uri(ctx, tree_uri) {
        documents::get_document_id(tree_uri)
    } else {
        documents::get_tree_document_id(tree_uri)
    };

    let uri = document_id
        .and_then(|id| documents::build_document_uri_using_tree(tree_uri, &id))
        .ok_or_else(|| PfError::InvalidLocator(tree_uri.to_string()))?;
    Ok(TreeDocumentFile::new(None, ctx.clone(), uri))
}

pub fn from_media_uri(ctx: &ProviderContext, uri: Locator) -> FileRef {
    MediaDocumentFile::new(None, ctx.clone(), uri)
}

/// Whether `uri` names a document served by a document provider.
pub fn is_document_uri(ctx: &ProviderContext, uri: &Locator) -> bool {
    document_contract::is_document_uri(ctx.registry(), uri)
}
