// SPDX-License-Identifier: AGPL-3.0-or-later
//! CLI command implementations

use chrono::{DateTime, Utc};
use console::style;
use pf_core::{FileRef, PfError, PfResult, ProviderFile, ProviderFileConfig};
use std::path::Path;
use tabled::{Table, Tabled};

fn open(config: &ProviderFileConfig, path: &str) -> FileRef {
    pf_providers::from_file_with_config(path, config.clone())
}

fn open_existing(config: &ProviderFileConfig, path: &str) -> PfResult<FileRef> {
    let file = open(config, path);
    if file.exists() {
        Ok(file)
    } else {
        Err(PfError::NotFound(path.to_string()))
    }
}

/// Split `path` into a handle on its parent directory and the final name.
fn parent_and_name(config: &ProviderFileConfig, path: &str) -> PfResult<(FileRef, String)> {
    let path = Path::new(path);
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .ok_or_else(|| PfError::Other(format!("no file name in {}", path.display())))?;

    let parent = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p.to_string_lossy().into_owned(),
        _ => ".".to_string(),
    };
    let dir = open(config, &parent);
    if !dir.is_directory() {
        return Err(PfError::NotFound(format!("Parent directory does not exist: {parent}")));
    }
    Ok((dir, name))
}

/// Format epoch milliseconds for display
fn format_time(millis: i64) -> String {
    if millis <= 0 {
        return "-".to_string();
    }
    DateTime::<Utc>::from_timestamp_millis(millis)
        .map(|t| t.format("%Y-%m-%d %H:%M").to_string())
        .unwrap_or_else(|| "-".to_string())
}

/// Format file size
fn format_size(size: u64, human: bool) -> String {
    if human {
        bytesize::ByteSize(size).to_string()
    } else {
        size.to_string()
    }
}

fn format_kind(file: &dyn ProviderFile) -> String {
    if file.is_directory() {
        style("d").cyan().to_string()
    } else if file.is_virtual() {
        style("v").magenta().to_string()
    } else if file.is_file() {
        "-".to_string()
    } else {
        "?".to_string()
    }
}

fn format_access(file: &dyn ProviderFile) -> String {
    let r = if file.can_read() { 'r' } else { '-' };
    let w = if file.can_write() { 'w' } else { '-' };
    format!("{r}{w}")
}

fn is_hidden(file: &dyn ProviderFile) -> bool {
    file.name().map(|n| n.starts_with('.')).unwrap_or(false)
}

#[derive(Tabled)]
struct LsEntry {
    #[tabled(rename = "Type")]
    kind: String,
    #[tabled(rename = "Access")]
    access: String,
    #[tabled(rename = "Size")]
    size: String,
    #[tabled(rename = "Modified")]
    modified: String,
    #[tabled(rename = "MIME")]
    mime: String,
    #[tabled(rename = "Name")]
    name: String,
}

impl LsEntry {
    fn new(file: &dyn ProviderFile, human: bool) -> Self {
        let size = if file.is_directory() {
            "-".to_string()
        } else {
            format_size(file.length(), human)
        };
        Self {
            kind: format_kind(file),
            access: format_access(file),
            size,
            modified: format_time(file.last_modified()),
            mime: file.mime_type().unwrap_or_else(|| "-".to_string()),
            name: file.name().unwrap_or_else(|| "?".to_string()),
        }
    }
}

/// List directory contents
pub fn ls(config: &ProviderFileConfig, path: &str, long: bool, all: bool, human: bool) -> PfResult<()> {
    let target = open_existing(config, path)?;
    tracing::debug!(uri = %target.uri(), "listing");

    let entries: Vec<FileRef> = if target.is_directory() {
        target
            .list_files()?
            .into_iter()
            .filter(|f| all || !is_hidden(f.as_ref()))
            .collect()
    } else {
        vec![target]
    };

    if entries.is_empty() {
        println!("(empty directory)");
        return Ok(());
    }

    if long {
        let rows: Vec<LsEntry> = entries.iter().map(|f| LsEntry::new(f.as_ref(), human)).collect();
        println!("{}", Table::new(rows));
    } else {
        for entry in &entries {
            let name = entry.name().unwrap_or_else(|| "?".to_string());
            if entry.is_directory() {
                println!("{}", style(name).cyan());
            } else {
                println!("{name}");
            }
        }
    }

    Ok(())
}

/// Show file/directory information
pub fn stat(config: &ProviderFileConfig, path: &str) -> PfResult<()> {
    let file = open_existing(config, path)?;

    println!("  Locator: {}", file.uri());
    println!("  Handle: {}", file.kind());
    println!("  Type: {}", if file.is_directory() { "directory" } else { "file" });
    if let Some(mime) = file.mime_type() {
        println!("  MIME: {mime}");
    }
    if !file.is_directory() {
        let size = file.length();
        println!("  Size: {} ({})", size, bytesize::ByteSize(size));
    }
    println!("  Modified: {}", format_time(file.last_modified()));

    let yes_no = |b: bool| if b { style("yes").green() } else { style("no").red() };
    println!("  Readable: {}", yes_no(file.can_read()));
    println!("  Writable: {}", yes_no(file.can_write()));

    Ok(())
}

/// Create directories
pub fn mkdir(config: &ProviderFileConfig, paths: &[String]) -> PfResult<()> {
    for path in paths {
        let (parent, name) = parent_and_name(config, path)?;
        tracing::debug!(parent = %parent.uri(), name = %name, "creating directory");

        parent
            .create_directory(&name)?
            .ok_or_else(|| PfError::Other(format!("cannot create directory {path}")))?;
        println!("Created {path}");
    }
    Ok(())
}

/// Create an empty file
pub fn touch(config: &ProviderFileConfig, path: &str, mime_type: &str) -> PfResult<()> {
    let (parent, name) = parent_and_name(config, path)?;
    tracing::debug!(parent = %parent.uri(), name = %name, mime_type, "creating file");

    let created = parent
        .create_file(mime_type, &name)?
        .ok_or_else(|| PfError::Other(format!("cannot create file {path}")))?;
    println!("Created {}", created.name().unwrap_or(name));
    Ok(())
}

/// Remove files or directories
pub fn rm(config: &ProviderFileConfig, paths: &[String]) -> PfResult<()> {
    for path in paths {
        let file = open_existing(config, path)?;
        tracing::debug!(uri = %file.uri(), "removing");

        if !file.delete() {
            return Err(PfError::Other(format!("failed to remove {path}")));
        }
        println!("Removed {path}");
    }
    Ok(())
}

/// Rename in place
pub fn mv(config: &ProviderFileConfig, path: &str, new_name: &str) -> PfResult<()> {
    let file = open_existing(config, path)?;
    if !file.rename_to(new_name)? {
        return Err(PfError::Other(format!("cannot rename {path} to {new_name}")));
    }
    println!("Renamed {path} -> {new_name}");
    Ok(())
}

/// Find a direct child by name
pub fn find(config: &ProviderFileConfig, dir: &str, name: &str) -> PfResult<()> {
    let parent = open_existing(config, dir)?;
    match parent.find_file(name)? {
        Some(found) => {
            println!("{}", found.uri());
            Ok(())
        }
        None => Err(PfError::NotFound(format!("{name} in {dir}"))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn path_str(dir: &TempDir, name: &str) -> String {
        dir.path().join(name).to_string_lossy().into_owned()
    }

    #[test]
    fn test_format_time() {
        assert_eq!(format_time(0), "-");
        assert_eq!(format_time(1_700_000_000_000), "2023-11-14 22:13");
    }

    #[test]
    fn test_format_size() {
        assert_eq!(format_size(1536, false), "1536");
        assert_ne!(format_size(1536, true), "1536");
    }

    #[test]
    fn test_mkdir_touch_mv_rm() {
        let tmp = TempDir::new().unwrap();
        let config = ProviderFileConfig::default();

        mkdir(&config, &[path_str(&tmp, "docs")]).unwrap();
        assert!(tmp.path().join("docs").is_dir());

        touch(&config, &path_str(&tmp, "docs/readme"), "text/plain").unwrap();
        assert!(tmp.path().join("docs/readme.txt").is_file());
        assert!(touch(&config, &path_str(&tmp, "docs/readme"), "text/plain").is_err());

        mv(&config, &path_str(&tmp, "docs/readme.txt"), "notes.txt").unwrap();
        assert!(tmp.path().join("docs/notes.txt").is_file());

        find(&config, &path_str(&tmp, "docs"), "notes.txt").unwrap();
        assert!(find(&config, &path_str(&tmp, "docs"), "readme.txt").is_err());

        ls(&config, &path_str(&tmp, "docs"), true, false, true).unwrap();
        stat(&config, &path_str(&tmp, "docs/notes.txt")).unwrap();

        rm(&config, &[path_str(&tmp, "docs")]).unwrap();
        assert!(!tmp.path().join("docs").exists());
    }

    #[test]
    fn test_missing_paths() {
        let tmp = TempDir::new().unwrap();
        let config = ProviderFileConfig::default();

        assert!(matches!(
            stat(&config, &path_str(&tmp, "nope")),
            Err(PfError::NotFound(_))
        ));
        assert!(rm(&config, &[path_str(&tmp, "nope")]).is_err());
        assert!(mkdir(&config, &[path_str(&tmp, "a/b")]).is_err());
    }

    #[test]
    fn test_hidden_entries() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join(".hidden"), b"").unwrap();
        let dir = pf_providers::from_file(tmp.path());
        let hidden = dir.find_file(".hidden").unwrap().unwrap();
        assert!(is_hidden(hidden.as_ref()));
        assert_eq!(format_kind(hidden.as_ref()), "-");
    }
}
