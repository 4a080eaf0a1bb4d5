use crate::config::CopierConfig;
use crate::error::{Result, TechSignalError};
use std::fs;
use std::path::{Path, PathBuf};

/// Outcome of a copy run
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CopyReport {
    /// Files written into the destination
    pub copied: Vec<PathBuf>,
    /// Matching files left out (excluded name or empty)
    pub skipped: usize,
    /// Source files that could not be read or written, with the reason
    pub failed: Vec<(PathBuf, String)>,
}

/// Duplicates selected text files into a flat folder as `<stem>_<extension>.txt`.
pub struct FileCopier {
    config: CopierConfig,
}

impl FileCopier {
    pub fn new(config: CopierConfig) -> Self {
        Self { config }
    }

    /// Flat pass over the top level of `source`, then a recursive pass over the whole tree.
    pub fn run<P: AsRef<Path>, Q: AsRef<Path>>(&self, source: P, destination: Q) -> Result<CopyReport> {
        let source = source.as_ref();
        let destination = destination.as_ref();

        if !source.is_dir() {
            return Err(TechSignalError::Validation(format!(
                "Source {} is not a directory",
                source.display()
            )));
        }
        fs::create_dir_all(destination)?;

        let mut report = CopyReport::default();

        for path in Self::list_files(source)? {
            if Self::matches(&path, &self.config.flat_extensions) {
                self.copy_one(&path, destination, &mut report);
            }
        }

        let mut files = Vec::new();
        Self::walk(source, &mut files);
        for path in files {
            if !Self::matches(&path, &self.config.recursive_extensions) {
                continue;
            }
            if self.is_excluded(&path) {
                log::debug!("Skipping {}", path.display());
                report.skipped += 1;
                continue;
            }
            self.copy_one(&path, destination, &mut report);
        }

        log::info!(
            "Copied {} files to {} ({} skipped, {} failed)",
            report.copied.len(),
            destination.display(),
            report.skipped,
            report.failed.len()
        );
        Ok(report)
    }

    fn is_excluded(&self, path: &Path) -> bool {
        let name = path.file_name().and_then(|n| n.to_str()).unwrap_or_default();
        if self.config.excluded_names.iter().any(|excluded| excluded == name) {
            return true;
        }
        matches!(fs::metadata(path), Ok(meta) if meta.len() == 0)
    }

    fn copy_one(&self, path: &Path, destination: &Path, report: &mut CopyReport) {
        let target = destination.join(renamed_file_name(path));
        let result = fs::read(path)
            .and_then(|bytes| fs::write(&target, decode_dropping_invalid(&bytes)));

        match result {
            Ok(()) => {
                log::debug!("{} -> {}", path.display(), target.display());
                report.copied.push(target);
            }
            Err(e) => {
                log::error!("Error processing file {}: {}", path.display(), e);
                report.failed.push((path.to_path_buf(), e.to_string()));
            }
        }
    }

    fn matches(path: &Path, extensions: &[String]) -> bool {
        path.file_name()
            .and_then(|n| n.to_str())
            .map(|name| extensions.iter().any(|ext| name.ends_with(ext.as_str())))
            .unwrap_or(false)
    }

    /// Regular files directly inside `dir`, sorted by name.
    fn list_files(dir: &Path) -> Result<Vec<PathBuf>> {
        let mut files = Vec::new();
        for entry in fs::read_dir(dir)? {
            let path = entry?.path();
            if path.is_file() {
                files.push(path);
            }
        }
        files.sort();
        Ok(files)
    }

    fn walk(dir: &Path, files: &mut Vec<PathBuf>) {
        let entries = match fs::read_dir(dir) {
            Ok(entries) => entries,
            Err(e) => {
                log::warn!("Cannot read directory {}: {}", dir.display(), e);
                return;
            }
        };

        // `DirEntry::file_type` does not follow links, so linked directories are never entered.
        let mut children: Vec<(PathBuf, fs::FileType)> = entries
            .filter_map(|e| e.ok())
            .filter_map(|e| e.file_type().ok().map(|kind| (e.path(), kind)))
            .collect();
        children.sort_by(|a, b| a.0.cmp(&b.0));

        for (path, kind) in children {
            if kind.is_dir() {
                Self::walk(&path, files);
            } else if kind.is_file() || (kind.is_symlink() && path.is_file()) {
                files.push(path);
            }
        }
    }
}

impl Default for FileCopier {
    fn default() -> Self {
        Self::new(CopierConfig::default())
    }
}

/// UTF-8 text of `bytes` with every invalid sequence removed.
fn decode_dropping_invalid(bytes: &[u8]) -> String {
    bytes.utf8_chunks().map(|chunk| chunk.valid()).collect()
}

/// `main.cpp` becomes `main_cpp.txt`; `.env` becomes `.env_.txt`.
pub fn renamed_file_name(path: &Path) -> String {
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let extension = path
        .extension()
        .map(|e| e.to_string_lossy().into_owned())
        .unwrap_or_default();
    format!("{}_{}.txt", stem, extension)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_renamed_file_name() {
        assert_eq!(renamed_file_name(Path::new("src/main.cpp")), "main_cpp.txt");
        assert_eq!(renamed_file_name(Path::new("notes.md")), "notes_md.txt");
        assert_eq!(renamed_file_name(Path::new("archive.tar.py")), "archive.tar_py.txt");
        assert_eq!(renamed_file_name(Path::new(".env")), ".env_.txt");
    }

    #[test]
    fn test_extension_matching() {
        let exts = vec![".h".to_string(), ".ino".to_string()];
        assert!(FileCopier::matches(Path::new("a.h"), &exts));
        assert!(FileCopier::matches(Path::new("sketch.ino"), &exts));
        assert!(!FileCopier::matches(Path::new("a.hpp"), &exts));
    }

    #[test]
    fn test_invalid_bytes_are_dropped() {
        assert_eq!(decode_dropping_invalid(b"ok\xff!"), "ok!");
        assert_eq!(decode_dropping_invalid(b"\xe2\x82caf\xc3\xa9"), "caf\u{e9}");
        assert_eq!(decode_dropping_invalid("plain".as_bytes()), "plain");
    }
}
