// SPDX-License-Identifier: AGPL-3.0-or-later
//! Extension ↔ MIME type mapping

pub const OCTET_STREAM: &str = "application/octet-stream";

// First entry for a MIME type is its preferred extension.
static TABLE: &[(&str, &str)] = &[
    ("txt", "text/plain"),
    ("text", "text/plain"),
    ("log", "text/plain"),
    ("csv", "text/csv"),
    ("htm", "text/html"),
    ("html", "text/html"),
    ("css", "text/css"),
    ("xml", "text/xml"),
    ("md", "text/markdown"),
    ("json", "application/json"),
    ("js", "application/javascript"),
    ("pdf", "application/pdf"),
    ("zip", "application/zip"),
    ("gz", "application/gzip"),
    ("tar", "application/x-tar"),
    ("apk", "application/vnd.android.package-archive"),
    ("doc", "application/msword"),
    ("docx", "application/vnd.openxmlformats-officedocument.wordprocessingml.document"),
    ("xls", "application/vnd.ms-excel"),
    ("xlsx", "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet"),
    ("ppt", "application/vnd.ms-powerpoint"),
    ("pptx", "application/vnd.openxmlformats-officedocument.presentationml.presentation"),
    ("odt", "application/vnd.oasis.opendocument.text"),
    ("png", "image/png"),
    ("jpg", "image/jpeg"),
    ("jpeg", "image/jpeg"),
    ("gif", "image/gif"),
    ("webp", "image/webp"),
    ("bmp", "image/bmp"),
    ("svg", "image/svg+xml"),
    ("heic", "image/heic"),
    ("ico", "image/x-icon"),
    ("mp3", "audio/mpeg"),
    ("flac", "audio/flac"),
    ("ogg", "audio/ogg"),
    ("wav", "audio/x-wav"),
    ("m4a", "audio/mp4"),
    ("aac", "audio/aac"),
    ("mp4", "video/mp4"),
    ("webm", "video/webm"),
    ("mkv", "video/x-matroska"),
    ("3gp", "video/3gpp"),
    ("mov", "video/quicktime"),
    ("avi", "video/x-msvideo"),
];

/// MIME type registered for `extension` (case-insensitive, without the dot).
pub fn mime_type_from_extension(extension: &str) -> Option<&'static str> {
    let extension = extension.to_ascii_lowercase();
    TABLE
        .iter()
        .find(|(ext, _)| *ext == extension)
        .map(|(_, mime)| *mime)
}

/// Preferred extension for `mime_type`.
pub fn extension_from_mime_type(mime_type: &str) -> Option<&'static str> {
    let mime_type = mime_type.to_ascii_lowercase();
    TABLE
        .iter()
        .find(|(_, mime)| *mime == mime_type)
        .map(|(ext, _)| *ext)
}

/// Guess from the text after the last dot of `name`, or `fallback`.
pub fn mime_type_for_name<'a>(name: &str, fallback: &'a str) -> &'a str {
    name.rsplit_once('.')
        .and_then(|(_, ext)| mime_type_from_extension(ext))
        .unwrap_or(fallback)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_extension() {
        assert_eq!(mime_type_from_extension("png"), Some("image/png"));
        assert_eq!(mime_type_from_extension("JPG"), Some("image/jpeg"));
        assert!(mime_type_from_extension("nope").is_none());
    }

    #[test]
    fn test_preferred_extension() {
        assert_eq!(extension_from_mime_type("image/jpeg"), Some("jpg"));
        assert_eq!(extension_from_mime_type("text/plain"), Some("txt"));
        assert_eq!(extension_from_mime_type("Image/PNG"), Some("png"));
        assert!(extension_from_mime_type(OCTET_STREAM).is_none());
    }

    #[test]
    fn test_for_name() {
        assert_eq!(mime_type_for_name("a.txt", OCTET_STREAM), "text/plain");
        assert_eq!(mime_type_for_name("archive.tar.gz", OCTET_STREAM), "application/gzip");
        assert_eq!(mime_type_for_name("README", OCTET_STREAM), OCTET_STREAM);
        assert_eq!(mime_type_for_name("weird.", "x/y"), "x/y");
    }
}
