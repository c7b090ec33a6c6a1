// SPDX-License-Identifier: AGPL-3.0-or-later
//! Opaque resource locators
//!
//! A [`Locator`] is a URI-shaped identifier issued by a content registry or
//! derived from a local path. Calling code passes locators around and never
//! builds or parses them; only this crate's helpers look inside.

use crate::error::{PfError, PfResult};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use url::Url;

pub const SCHEME_FILE: &str = "file";
pub const SCHEME_CONTENT: &str = "content";

/// Opaque locator for a file-like resource
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Locator(String);

impl Locator {
    /// Wrap an externally supplied locator string.
    pub fn parse(raw: impl Into<String>) -> PfResult<Self> {
        let raw = raw.into();
        match raw.split_once("://") {
            Some((scheme, _)) if is_valid_scheme(scheme) => Ok(Self(raw)),
            _ => Err(PfError::InvalidLocator(raw)),
        }
    }

    /// `file://` locator for a native path. Relative paths are resolved
    /// against the current directory.
    pub fn from_file(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        let absolute = if path.is_absolute() {
            path.to_path_buf()
        } else {
            std::env::current_dir()
                .map(|cwd| cwd.join(path))
                .unwrap_or_else(|_| path.to_path_buf())
        };

        match Url::from_file_path(&absolute) {
            Ok(url) => Self(url.into()),
            Err(()) => {
                let encoded = absolute
                    .to_string_lossy()
                    .split('/')
                    .filter(|s| !s.is_empty())
                    .map(encode_component)
                    .collect::<Vec<_>>()
                    .join("/");
                Self(format!("{SCHEME_FILE}:///{encoded}"))
            }
        }
    }

    /// `content://authority/seg/seg` with every segment encoded.
    pub fn content<S: AsRef<str>>(authority: &str, segments: &[S]) -> Self {
        let mut raw = format!("{SCHEME_CONTENT}://{authority}");
        for segment in segments {
            raw.push('/');
            raw.push_str(&encode_component(segment.as_ref()));
        }
        Self(raw)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn scheme(&self) -> &str {
        self.0.split_once("://").map(|(s, _)| s).unwrap_or("")
    }

    pub fn authority(&self) -> &str {
        let rest = self.after_scheme();
        match rest.find('/') {
            Some(idx) => &rest[..idx],
            None => rest,
        }
    }

    /// Decoded, non-empty path segments.
    pub fn path_segments(&self) -> Vec<String> {
        self.raw_path()
            .split('/')
            .filter(|s| !s.is_empty())
            .map(decode_component)
            .collect()
    }

    pub fn is_file(&self) -> bool {
        self.scheme() == SCHEME_FILE
    }

    pub fn is_content(&self) -> bool {
        self.scheme() == SCHEME_CONTENT
    }

    /// Native path of a `file://` locator, byte for byte.
    pub fn to_file_path(&self) -> Option<PathBuf> {
        if !self.is_file() {
            return None;
        }
        Url::parse(&self.0).ok()?.to_file_path().ok()
    }

    fn after_scheme(&self) -> &str {
        let rest = self.0.split_once("://").map(|(_, r)| r).unwrap_or(&self.0);
        match rest.find(['?', '#']) {
            Some(idx) => &rest[..idx],
            None => rest,
        }
    }

    fn raw_path(&self) -> &str {
        let rest = self.after_scheme();
        match rest.find('/') {
            Some(idx) => &rest[idx..],
            None => "",
        }
    }
}

impl fmt::Display for Locator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::str::FromStr for Locator {
    type Err = PfError;

    fn from_str(s: &str) -> PfResult<Self> {
        Self::parse(s)
    }
}

fn is_valid_scheme(scheme: &str) -> bool {
    let mut chars = scheme.chars();
    matches!(chars.next(), Some(c) if c.is_ascii_alphabetic())
        && chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'))
}

/// Percent-encode a single locator component.
pub fn encode_component(component: &str) -> String {
    urlencoding::encode(component).into_owned()
}

/// Decode a percent-encoded component. Malformed escapes are kept verbatim.
pub fn decode_component(component: &str) -> String {
    match urlencoding::decode(component) {
        Ok(decoded) => decoded.into_owned(),
        Err(_) => String::from_utf8_lossy(&urlencoding::decode_binary(component.as_bytes())).into_owned(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse() {
        let loc = Locator::parse("content://com.example.docs/document/42").unwrap();
        assert_eq!(loc.scheme(), "content");
        assert_eq!(loc.authority(), "com.example.docs");
        assert_eq!(loc.path_segments(), vec!["document", "42"]);
    }

    #[test]
    fn test_parse_invalid() {
        assert!(Locator::parse("/data/local/tmp").is_err());
        assert!(Locator::parse("://nothing").is_err());
        assert!(Locator::parse("1abc://x").is_err());
    }

    #[test]
    fn test_from_file() {
        let loc = Locator::from_file("/data/local/tmp/a.txt");
        assert_eq!(loc.as_str(), "file:///data/local/tmp/a.txt");
        assert!(loc.is_file());
        assert_eq!(loc.authority(), "");
        assert_eq!(loc.to_file_path(), Some(PathBuf::from("/data/local/tmp/a.txt")));
    }

    #[test]
    fn test_from_file_encodes_segments() {
        let loc = Locator::from_file("/tmp/my file#1.txt");
        assert_eq!(loc.as_str(), "file:///tmp/my%20file%231.txt");
        assert_eq!(loc.to_file_path(), Some(PathBuf::from("/tmp/my file#1.txt")));
    }

    #[cfg(unix)]
    #[test]
    fn test_from_file_keeps_non_utf8_bytes() {
        use std::ffi::OsStr;
        use std::os::unix::ffi::OsStrExt;

        let path = PathBuf::from(OsStr::from_bytes(b"/tmp/caf\xe9.txt"));
        let loc = Locator::from_file(&path);
        assert_eq!(loc.as_str(), "file:///tmp/caf%E9.txt");
        assert_eq!(loc.to_file_path(), Some(path));
    }

    #[test]
    fn test_from_relative_file_is_absolute() {
        let loc = Locator::from_file("relative.txt");
        let path = loc.to_file_path().unwrap();
        assert!(path.is_absolute());
        assert!(path.ends_with("relative.txt"));
    }

    #[test]
    fn test_content_encodes_ids() {
        let loc = Locator::content("com.example.docs", &["document", "primary:Download/a b"]);
        assert_eq!(
            loc.as_str(),
            "content://com.example.docs/document/primary%3ADownload%2Fa%20b"
        );
        assert_eq!(loc.path_segments(), vec!["document", "primary:Download/a b"]);
    }

    #[test]
    fn test_query_and_fragment_ignored() {
        let loc = Locator::parse("content://media/external/images/media/7?limit=1#x").unwrap();
        assert_eq!(loc.path_segments(), vec!["external", "images", "media", "7"]);
    }

    #[test]
    fn test_to_file_path_on_content() {
        let loc = Locator::parse("content://media/external/7").unwrap();
        assert!(loc.to_file_path().is_none());
    }

    #[test]
    fn test_decode_malformed() {
        assert_eq!(decode_component("100%"), "100%");
        assert_eq!(decode_component("%zz%41"), "%zzA");
    }

    #[test]
    fn test_display() {
        let loc = Locator::content("media", &["external", "images"]);
        assert_eq!(format!("{}", loc), "content://media/external/images");
    }
}
