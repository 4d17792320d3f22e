//! Executable lookup
//!
//! Resolves the external CLI to a concrete executable path, either from an
//! explicit configured location or by scanning `PATH`.

use std::env;
use std::ffi::OsStr;
use std::path::{Path, PathBuf};

/// Extensions tried on Windows when `PATHEXT` is unset
#[cfg(windows)]
const DEFAULT_PATHEXT: &str = ".COM;.EXE;.BAT;.CMD";

/// Check if a file is executable
#[cfg(unix)]
pub fn is_executable(path: &Path) -> bool {
    use std::os::unix::fs::PermissionsExt;

    match path.metadata() {
        Ok(metadata) if metadata.is_file() => (metadata.permissions().mode() & 0o111) != 0,
        _ => false,
    }
}

/// Check if a file is executable
#[cfg(not(unix))]
pub fn is_executable(path: &Path) -> bool {
    if !path.is_file() {
        return false;
    }
    match path.extension().and_then(|e| e.to_str()) {
        Some(ext) => executable_extensions().contains(&format!(".{}", ext.to_lowercase())),
        None => false,
    }
}

/// Suffixes to try after a bare program name, the empty suffix first
#[cfg(windows)]
fn executable_extensions() -> Vec<String> {
    let pathext = env::var("PATHEXT").unwrap_or_else(|_| DEFAULT_PATHEXT.to_string());
    parse_pathext(&pathext)
}

#[cfg(not(windows))]
fn executable_extensions() -> Vec<String> {
    vec![String::new()]
}

/// Split a `PATHEXT` value into lowercase extensions, keeping the bare name first
pub fn parse_pathext(pathext: &str) -> Vec<String> {
    let mut extensions = vec![String::new()];
    for ext in pathext.split(';').map(str::trim).filter(|e| !e.is_empty()) {
        let ext = if ext.starts_with('.') {
            ext.to_lowercase()
        } else {
            format!(".{}", ext.to_lowercase())
        };
        if !extensions.contains(&ext) {
            extensions.push(ext);
        }
    }
    extensions
}

/// Find `program` in the directories listed by `path_var`
pub fn find_in_path(program: &str, path_var: &OsStr) -> Option<PathBuf> {
    let extensions = executable_extensions();
    for dir in env::split_paths(path_var) {
        for ext in &extensions {
            let candidate = dir.join(format!("{}{}", program, ext));
            if is_executable(&candidate) {
                return Some(candidate);
            }
        }
    }
    None
}

/// Resolve the executable for `program`
///
/// An explicit `configured` path wins when it points at an executable file.
/// A program name containing a path separator is checked as-is. Otherwise
/// the directories of the current `PATH` are searched in order.
pub fn find_executable(program: &str, configured: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = configured {
        if is_executable(path) {
            return Some(path.to_path_buf());
        }
        warn!(
            "Configured executable {} is missing or not executable, searching PATH",
            path.display()
        );
    }

    let as_path = Path::new(program);
    if as_path.components().count() > 1 {
        return is_executable(as_path).then(|| as_path.to_path_buf());
    }

    let path_var = env::var_os("PATH")?;
    find_in_path(program, &path_var)
}
