// SPDX-License-Identifier: AGPL-3.0-or-later
//! Document handle contract

use std::fmt;
use std::sync::{Arc, Weak};

use crate::{error::PfResult, locator::Locator};

/// Shared handle to any document variant
pub type FileRef = Arc<dyn ProviderFile>;

/// Non-owning back-reference from a child to the handle that produced it
pub type ParentRef = Weak<dyn ProviderFile>;

/// Backing store a handle was created over
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FileKind {
    /// Native filesystem entry
    Raw,
    /// Standalone provider document
    Single,
    /// Document inside a granted provider tree
    Tree,
    /// Media index entry
    Media,
}

impl fmt::Display for FileKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            FileKind::Raw => "raw",
            FileKind::Single => "single",
            FileKind::Tree => "tree",
            FileKind::Media => "media",
        };
        f.write_str(name)
    }
}

/// A file-like resource, whichever store it lives in.
///
/// Queries are total: a failed lookup yields `None`, `0` or `false`.
/// Structural operations return `Err(PfError::Unsupported)` on variants
/// without structure and `Ok(None)`/`Ok(false)` when the store refuses.
pub trait ProviderFile: Send + Sync + fmt::Debug {
    fn kind(&self) -> FileKind;

    /// Back-reference to the handle this one was derived from.
    ///
    /// Only a convenience: stores define parent → child, so the reverse link
    /// goes stale if the tree is restructured behind our back.
    fn parent_ref(&self) -> Option<&ParentRef>;

    /// Create a file as a direct child of this directory.
    ///
    /// `display_name` carries no extension; whether one is appended is up to
    /// the variant (raw handles append the MIME type's extension, provider
    /// trees leave it to the provider).
    fn create_file(&self, mime_type: &str, display_name: &str) -> PfResult<Option<FileRef>>;

    fn create_directory(&self, display_name: &str) -> PfResult<Option<FileRef>>;

    /// Locator of the underlying resource.
    fn uri(&self) -> Locator;

    fn name(&self) -> Option<String>;

    /// `None` for directories and unknown types.
    fn mime_type(&self) -> Option<String>;

    fn is_directory(&self) -> bool;

    fn is_file(&self) -> bool;

    fn is_virtual(&self) -> bool;

    /// Milliseconds since the epoch, 0 when unknown.
    fn last_modified(&self) -> i64;

    /// Size in bytes, 0 when unknown. Undefined for directories.
    fn length(&self) -> u64;

    fn can_read(&self) -> bool;

    fn can_write(&self) -> bool;

    fn delete(&self) -> bool;

    fn exists(&self) -> bool;

    /// Children of this directory, re-queried on every call.
    fn list_files(&self) -> PfResult<Vec<FileRef>>;

    /// Rename in place.
    ///
    /// The store may assign a new locator and MIME type; children listed
    /// before the rename may no longer be valid.
    fn rename_to(&self, display_name: &str) -> PfResult<bool>;

    fn parent_file(&self) -> Option<FileRef> {
        self.parent_ref().and_then(Weak::upgrade)
    }

    /// First child of [`ProviderFile::list_files`] named `display_name`.
    fn find_file(&self, display_name: &str) -> PfResult<Option<FileRef>> {
        Ok(self
            .list_files()?
            .into_iter()
            .find(|child| child.name().as_deref() == Some(display_name)))
    }
}
