// SPDX-License-Identifier: AGPL-3.0-or-later
//! ProviderFile Core
//!
//! Core traits and types for document handles over native files and
//! content-provider backed resources.

pub mod columns;
pub mod config;
pub mod context;
pub mod documents;
pub mod error;
pub mod file;
pub mod locator;
pub mod mime;
pub mod query;
pub mod registry;

pub use config::ProviderFileConfig;
pub use context::ProviderContext;
pub use error::{PfError, PfResult};
pub use file::{FileKind, FileRef, ParentRef, ProviderFile};
pub use locator::Locator;
pub use registry::{AccessMode, CellValue, ContentRegistry, ContentValues, Cursor, RowCursor};
