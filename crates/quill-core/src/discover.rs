//! Source file discovery

use std::io;
use std::path::{Path, PathBuf};

/// Extension of script source files
pub const SOURCE_EXTENSION: &str = "psc";

/// Collect `.psc` files under a directory, recursively.
///
/// Hidden directories are skipped. The result is sorted so runs are
/// reproducible regardless of directory iteration order.
pub fn collect_source_files(dir: &Path) -> io::Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    collect_into(dir, &mut files)?;
    files.sort();
    Ok(files)
}

fn collect_into(dir: &Path, files: &mut Vec<PathBuf>) -> io::Result<()> {
    for entry in std::fs::read_dir(dir)? {
        let path = entry?.path();

        if path.is_file() {
            if is_source_file(&path) {
                files.push(path);
            }
        } else if path.is_dir() {
            if let Some(name) = path.file_name().and_then(|n| n.to_str()) {
                if !name.starts_with('.') {
                    collect_into(&path, files)?;
                }
            }
        }
    }
    Ok(())
}

/// Check whether a path has the source extension, ignoring case
pub fn is_source_file(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case(SOURCE_EXTENSION))
}
