// SPDX-License-Identifier: AGPL-3.0-or-later
//! Column names and flag bits understood by content registries

/// Document provider columns
pub mod document {
    pub const COLUMN_DOCUMENT_ID: &str = "document_id";
    pub const COLUMN_DISPLAY_NAME: &str = "_display_name";
    pub const COLUMN_MIME_TYPE: &str = "mime_type";
    pub const COLUMN_LAST_MODIFIED: &str = "last_modified";
    pub const COLUMN_SIZE: &str = "_size";
    pub const COLUMN_FLAGS: &str = "flags";

    /// MIME type reported for directories.
    pub const MIME_TYPE_DIR: &str = "vnd.android.document/directory";

    pub const FLAG_SUPPORTS_WRITE: i64 = 1 << 1;
    pub const FLAG_SUPPORTS_DELETE: i64 = 1 << 2;
    pub const FLAG_DIR_SUPPORTS_CREATE: i64 = 1 << 3;
    pub const FLAG_SUPPORTS_RENAME: i64 = 1 << 6;
    pub const FLAG_VIRTUAL_DOCUMENT: i64 = 1 << 9;
}

/// Media index columns
pub mod media {
    pub const COLUMN_ID: &str = "_id";
    pub const COLUMN_DISPLAY_NAME: &str = "_display_name";
    pub const COLUMN_MIME_TYPE: &str = "mime_type";
    /// Seconds since the epoch.
    pub const COLUMN_DATE_MODIFIED: &str = "date_modified";
    pub const COLUMN_SIZE: &str = "_size";
}
