// SPDX-License-Identifier: AGPL-3.0-or-later
//! Native filesystem handles

use parking_lot::RwLock;
use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Weak};
use std::time::UNIX_EPOCH;

use pf_core::{
    mime, FileKind, FileRef, Locator, ParentRef, PfResult, ProviderFile, ProviderFileConfig,
};

/// Handle over a path on the local filesystem
///
/// The path is owned by the handle and replaced on a successful rename.
pub struct RawDocumentFile {
    this: Weak<RawDocumentFile>,
    parent: Option<ParentRef>,
    path: RwLock<PathBuf>,
    config: Arc<ProviderFileConfig>,
}

impl RawDocumentFile {
    pub fn new(
        parent: Option<ParentRef>,
        path: impl Into<PathBuf>,
        config: Arc<ProviderFileConfig>,
    ) -> Arc<Self> {
        let path = path.into();
        tracing::debug!(path = %path.display(), "raw handle");
        Arc::new_cyclic(|this| Self {
            this: this.clone(),
            parent,
            path: RwLock::new(path),
            config,
        })
    }

    /// Current path; changes after a successful rename.
    pub fn path(&self) -> PathBuf {
        self.path.read().clone()
    }

    fn child(&self, path: PathBuf) -> FileRef {
        let parent: ParentRef = self.this.clone();
        RawDocumentFile::new(Some(parent), path, Arc::clone(&self.config))
    }

    fn metadata(&self) -> Option<fs::Metadata> {
        fs::metadata(&*self.path.read()).ok()
    }
}

impl fmt::Debug for RawDocumentFile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RawDocumentFile")
            .field("path", &*self.path.read())
            .finish_non_exhaustive()
    }
}

impl ProviderFile for RawDocumentFile {
    fn kind(&self) -> FileKind {
        FileKind::Raw
    }

    fn parent_ref(&self) -> Option<&ParentRef> {
        self.parent.as_ref()
    }

    fn create_file(&self, mime_type: &str, display_name: &str) -> PfResult<Option<FileRef>> {
        if !is_valid_name(display_name) {
            tracing::warn!(name = display_name, "invalid file name");
            return Ok(None);
        }

        let mut name = display_name.to_string();
        if self.config.raw.append_extension {
            if let Some(ext) = mime::extension_from_mime_type(mime_type) {
                name.push('.');
                name.push_str(ext);
            }
        }

        let target = self.path.read().join(&name);
        match fs::OpenOptions::new().write(true).create_new(true).open(&target) {
            Ok(_) => Ok(Some(self.child(target))),
            Err(e) => {
                tracing::warn!(path = %target.display(), error = %e, "failed to create file");
                Ok(None)
            }
        }
    }

    fn create_directory(&self, display_name: &str) -> PfResult<Option<FileRef>> {
        if !is_valid_name(display_name) {
            tracing::warn!(name = display_name, "invalid directory name");
            return Ok(None);
        }

        let target = self.path.read().join(display_name);
        if target.is_dir() {
            return Ok(Some(self.child(target)));
        }
        match fs::create_dir(&target) {
            Ok(()) => Ok(Some(self.child(target))),
            Err(e) => {
                tracing::warn!(path = %target.display(), error = %e, "failed to create directory");
                Ok(None)
            }
        }
    }

    fn uri(&self) -> Locator {
        Locator::from_file(&*self.path.read())
    }

    fn name(&self) -> Option<String> {
        self.path
            .read()
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
    }

    fn mime_type(&self) -> Option<String> {
        if self.is_directory() {
            return None;
        }
        let name = self.name()?;
        Some(mime::mime_type_for_name(&name, &self.config.fallback_mime_type).to_string())
    }

    fn is_directory(&self) -> bool {
        self.path.read().is_dir()
    }

    fn is_file(&self) -> bool {
        self.path.read().is_file()
    }

    fn is_virtual(&self) -> bool {
        false
    }

    fn last_modified(&self) -> i64 {
        self.metadata()
            .and_then(|meta| meta.modified().ok())
            .and_then(|time| time.duration_since(UNIX_EPOCH).ok())
            .map(|elapsed| elapsed.as_millis() as i64)
            .unwrap_or(0)
    }

    fn length(&self) -> u64 {
        self.metadata().map(|meta| meta.len()).unwrap_or(0)
    }

    fn can_read(&self) -> bool {
        access::readable(&self.path.read())
    }

    fn can_write(&self) -> bool {
        access::writable(&self.path.read())
    }

    fn delete(&self) -> bool {
        let path = self.path.read();
        delete_tree(&path, &mut remove_entry)
    }

    fn exists(&self) -> bool {
        self.path.read().exists()
    }

    fn list_files(&self) -> PfResult<Vec<FileRef>> {
        let path = self.path();
        let read_dir = match fs::read_dir(&path) {
            Ok(read_dir) => read_dir,
            Err(e) => {
                tracing::debug!(path = %path.display(), error = %e, "not listable");
                return Ok(Vec::new());
            }
        };

        let mut paths = Vec::new();
        for entry in read_dir {
            match entry {
                Ok(entry) => paths.push(entry.path()),
                Err(e) => tracing::warn!(path = %path.display(), error = %e, "skipping unreadable entry"),
            }
        }
        if self.config.raw.sort_listings {
            paths.sort_by(|a, b| a.file_name().cmp(&b.file_name()));
        }

        Ok(paths.into_iter().map(|p| self.child(p)).collect())
    }

    fn rename_to(&self, display_name: &str) -> PfResult<bool> {
        if !is_valid_name(display_name) {
            tracing::warn!(name = display_name, "invalid rename target");
            return Ok(false);
        }

        let mut path = self.path.write();
        let Some(parent) = path.parent() else {
            return Ok(false);
        };
        let target = parent.join(display_name);
        if fs::symlink_metadata(&target).is_ok() {
            tracing::warn!(path = %target.display(), "rename target already exists");
            return Ok(false);
        }

        match fs::rename(&*path, &target) {
            Ok(()) => {
                tracing::debug!(from = %path.display(), to = %target.display(), "renamed");
                *path = target;
                Ok(true)
            }
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "failed to rename");
                Ok(false)
            }
        }
    }
}

fn is_valid_name(name: &str) -> bool {
    !name.is_empty()
        && name != "."
        && name != ".."
        && !name.contains('/')
        && !name.contains(std::path::MAIN_SEPARATOR)
}

/// Remove a file, symlink or empty directory without following links.
fn remove_entry(path: &Path) -> io::Result<()> {
    if fs::symlink_metadata(path)?.is_dir() {
        fs::remove_dir(path)
    } else {
        fs::remove_file(path)
    }
}

/// Remove `path` and, when it is a real directory rather than a link to
/// one, everything under it first.
fn delete_tree<F>(path: &Path, remove: &mut F) -> bool
where
    F: FnMut(&Path) -> io::Result<()>,
{
    let is_dir = fs::symlink_metadata(path)
        .map(|meta| meta.is_dir())
        .unwrap_or(false);
    let contents = !is_dir || delete_contents(path, remove);

    let removed = match remove(path) {
        Ok(()) => true,
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "failed to delete");
            false
        }
    };
    contents && removed
}

/// Depth-first removal of everything under `dir`.
///
/// Keeps going after a failure; the result is true only if every entry,
/// nested ones included, went away.
fn delete_contents<F>(dir: &Path, remove: &mut F) -> bool
where
    F: FnMut(&Path) -> io::Result<()>,
{
    let Ok(read_dir) = fs::read_dir(dir) else {
        return true;
    };

    let mut success = true;
    for entry in read_dir {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                tracing::warn!(path = %dir.display(), error = %e, "unreadable entry");
                success = false;
                continue;
            }
        };
        let path = entry.path();
        let is_dir = entry.file_type().map(|t| t.is_dir()).unwrap_or(false);
        if is_dir {
            success &= delete_contents(&path, remove);
        }
        if let Err(e) = remove(&path) {
            tracing::warn!(path = %path.display(), error = %e, "failed to delete");
            success = false;
        }
    }
    success
}

#[cfg(unix)]
mod access {
    use std::ffi::CString;
    use std::os::unix::ffi::OsStrExt;
    use std::path::Path;

    fn check(path: &Path, mode: libc::c_int) -> bool {
        let Ok(c_path) = CString::new(path.as_os_str().as_bytes()) else {
            return false;
        };
        // SAFETY: c_path is a valid NUL-terminated string for the duration of the call.
        unsafe { libc::access(c_path.as_ptr(), mode) == 0 }
    }

    pub fn readable(path: &Path) -> bool {
        check(path, libc::R_OK)
    }

    pub fn writable(path: &Path) -> bool {
        check(path, libc::W_OK)
    }
}

#[cfg(not(unix))]
mod access {
    use std::path::Path;

    pub fn readable(path: &Path) -> bool {
        path.exists()
    }

    pub fn writable(path: &Path) -> bool {
        std::fs::metadata(path)
            .map(|meta| !meta.permissions().readonly())
            .unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn root(dir: &TempDir) -> Arc<RawDocumentFile> {
        RawDocumentFile::new(None, dir.path(), Arc::new(ProviderFileConfig::default()))
    }

    #[test]
    fn test_existing_file() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("data.txt");
        fs::write(&path, [7u8; 42]).unwrap();

        let file = RawDocumentFile::new(None, &path, Arc::new(ProviderFileConfig::default()));
        assert_eq!(file.kind(), FileKind::Raw);
        assert!(file.exists());
        assert_eq!(file.length(), 42);
        assert!(file.is_file());
        assert!(!file.is_directory());
        assert!(!file.is_virtual());
        assert!(file.can_read());
        assert!(file.last_modified() > 0);
        assert_eq!(file.name().as_deref(), Some("data.txt"));
        assert_eq!(file.mime_type().as_deref(), Some("text/plain"));
        assert_eq!(file.uri().to_file_path(), Some(path));
        assert!(file.list_files().unwrap().is_empty());
    }

    #[test]
    fn test_missing_file() {
        let tmp = TempDir::new().unwrap();
        let file = RawDocumentFile::new(
            None,
            tmp.path().join("nope.bin"),
            Arc::new(ProviderFileConfig::default()),
        );
        assert!(!file.exists());
        assert_eq!(file.length(), 0);
        assert_eq!(file.last_modified(), 0);
        assert!(!file.can_read());
        assert_eq!(file.mime_type().as_deref(), Some("application/octet-stream"));
    }

    #[test]
    fn test_create_file_appends_extension() {
        let tmp = TempDir::new().unwrap();
        let dir = root(&tmp);

        let pic = dir.create_file("image/png", "pic").unwrap().unwrap();
        assert_eq!(pic.name().as_deref(), Some("pic.png"));
        assert_eq!(pic.mime_type().as_deref(), Some("image/png"));
        assert!(tmp.path().join("pic.png").is_file());
        assert_eq!(pic.parent_file().map(|p| p.uri()), Some(dir.uri()));

        // Second attempt collides with the first.
        assert!(dir.create_file("image/png", "pic").unwrap().is_none());

        let blob = dir.create_file("application/x-unknown", "blob").unwrap().unwrap();
        assert_eq!(blob.name().as_deref(), Some("blob"));
        assert_eq!(blob.mime_type().as_deref(), Some("application/octet-stream"));
    }

    #[test]
    fn test_create_file_without_extension() {
        let tmp = TempDir::new().unwrap();
        let mut config = ProviderFileConfig::default();
        config.raw.append_extension = false;
        let dir = RawDocumentFile::new(None, tmp.path(), Arc::new(config));

        let pic = dir.create_file("image/png", "pic").unwrap().unwrap();
        assert_eq!(pic.name().as_deref(), Some("pic"));
    }

    #[test]
    fn test_invalid_names() {
        let tmp = TempDir::new().unwrap();
        let dir = root(&tmp);
        assert!(dir.create_file("text/plain", "").unwrap().is_none());
        assert!(dir.create_directory("a/b").unwrap().is_none());
        assert!(!dir.create_file("text/plain", "x").unwrap().unwrap().rename_to("..").unwrap());
    }

    #[test]
    fn test_list_and_find() {
        let tmp = TempDir::new().unwrap();
        let dir = root(&tmp);
        dir.create_directory("b-dir").unwrap().unwrap();
        dir.create_file("text/plain", "c").unwrap().unwrap();
        dir.create_file("text/plain", "a").unwrap().unwrap();

        let names: Vec<_> = dir
            .list_files()
            .unwrap()
            .iter()
            .filter_map(|f| f.name())
            .collect();
        assert_eq!(names, vec!["a.txt", "b-dir", "c.txt"]);

        let found = dir.find_file("b-dir").unwrap().unwrap();
        assert!(found.is_directory());
        assert!(found.mime_type().is_none());
        assert!(dir.find_file("missing").unwrap().is_none());

        // Existing directories are handed back rather than refused.
        assert!(dir.create_directory("b-dir").unwrap().is_some());
    }

    #[test]
    fn test_rename() {
        let tmp = TempDir::new().unwrap();
        let dir = root(&tmp);
        let file = dir.create_file("text/plain", "old").unwrap().unwrap();
        dir.create_file("text/plain", "taken").unwrap().unwrap();
        let before = file.uri();

        assert!(file.rename_to("new.md").unwrap());
        assert_eq!(file.name().as_deref(), Some("new.md"));
        assert_eq!(file.mime_type().as_deref(), Some("text/markdown"));
        assert_ne!(file.uri(), before);
        assert!(tmp.path().join("new.md").is_file());
        assert!(!tmp.path().join("old.txt").exists());

        assert!(!file.rename_to("taken.txt").unwrap());
        assert_eq!(file.name().as_deref(), Some("new.md"));
    }

    #[test]
    fn test_delete_recursive() {
        let tmp = TempDir::new().unwrap();
        let dir = root(&tmp);
        let top = dir.create_directory("top").unwrap().unwrap();
        let nested = top.create_directory("nested").unwrap().unwrap();
        nested.create_file("text/plain", "leaf").unwrap().unwrap();
        top.create_file("text/plain", "sibling").unwrap().unwrap();

        assert!(top.delete());
        assert!(!top.exists());
        assert!(!nested.exists());
        assert!(!top.delete());
    }

    #[test]
    fn test_delete_reports_undeletable_leaf() {
        let tmp = TempDir::new().unwrap();
        let top = tmp.path().join("top");
        fs::create_dir_all(top.join("nested")).unwrap();
        fs::write(top.join("nested/stuck.txt"), b"x").unwrap();
        fs::write(top.join("nested/loose.txt"), b"x").unwrap();
        fs::write(top.join("sibling.txt"), b"x").unwrap();

        let stuck = top.join("nested/stuck.txt");
        let mut remove = |path: &Path| {
            if path == stuck {
                Err(io::Error::new(io::ErrorKind::PermissionDenied, "locked"))
            } else {
                remove_entry(path)
            }
        };

        assert!(!delete_tree(&top, &mut remove));
        assert!(stuck.exists());
        assert!(!top.join("nested/loose.txt").exists());
        assert!(!top.join("sibling.txt").exists());
    }

    #[cfg(unix)]
    #[test]
    fn test_delete_does_not_follow_symlinks() {
        let tmp = TempDir::new().unwrap();
        let outside = tmp.path().join("outside");
        fs::create_dir(&outside).unwrap();
        fs::write(outside.join("keep.txt"), b"x").unwrap();

        let dir = root(&tmp);
        let top = dir.create_directory("top").unwrap().unwrap();
        std::os::unix::fs::symlink(&outside, tmp.path().join("top/link")).unwrap();

        assert!(top.delete());
        assert!(outside.join("keep.txt").exists());
    }

    #[cfg(unix)]
    #[test]
    fn test_delete_on_symlinked_directory_removes_only_the_link() {
        let tmp = TempDir::new().unwrap();
        let outside = tmp.path().join("outside");
        fs::create_dir(&outside).unwrap();
        fs::write(outside.join("keep.txt"), b"x").unwrap();
        let link = tmp.path().join("link");
        std::os::unix::fs::symlink(&outside, &link).unwrap();

        let handle = RawDocumentFile::new(None, link.clone(), Arc::new(ProviderFileConfig::default()));
        assert!(handle.delete());
        assert!(fs::symlink_metadata(&link).is_err());
        assert!(outside.join("keep.txt").exists());
    }

    #[test]
    fn test_parent_reference_is_weak() {
        let tmp = TempDir::new().unwrap();
        let dir = root(&tmp);
        let child = dir.create_file("text/plain", "a").unwrap().unwrap();
        assert!(child.parent_file().is_some());
        drop(dir);
        assert!(child.parent_file().is_none());
        assert!(child.exists());
    }
}
