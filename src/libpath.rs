//! Locating native dynamic libraries: platform-specific file names and
//! search-path helpers.
//!
//! Ancillary to the handle core: these run once at process startup to
//! find the shared library before any handle exists. Loading the library
//! is out of scope; this module only builds names and resolves paths.

use std::env;
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Result from path resolution helpers.
pub type Result<T> = std::result::Result<T, LibPathError>;

#[derive(Debug, Error)]
pub enum LibPathError {
    #[error("library name cannot be empty")]
    EmptyLibraryName,

    /// No candidate file exists in the searched directories.
    #[error("could not find native library {file_name:?} within the directories of the {env_var:?} environment variable")]
    NotFound { file_name: String, env_var: String },

    /// A search directory contained the platform path separator and
    /// cannot be joined into an environment value.
    #[error("invalid search path entry")]
    InvalidPathEntry(#[from] env::JoinPathsError),
}

/// Platforms with distinct shared-library naming conventions.
///
/// Other unix-likes follow the Linux `lib<name>.so` convention and are
/// treated as `Linux` by `current()`.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Platform {
    Linux,
    MacOs,
    Windows,
}

impl Platform {
    pub fn current() -> Self {
        if cfg!(windows) {
            Platform::Windows
        } else if cfg!(target_os = "macos") {
            Platform::MacOs
        } else {
            Platform::Linux
        }
    }

    /// Environment variable conventionally searched for shared libraries.
    pub fn default_search_env_var(self) -> &'static str {
        match self {
            Platform::Windows => "PATH",
            _ => "LD_LIBRARY_PATH",
        }
    }
}

/// The platform-specific short file name for a library: `'R'` becomes
/// `libR.so` on Linux, `R.dll` on Windows and `libR.dylib` on macOS.
pub fn library_short_filename(library_name: &str, platform: Platform) -> Result<String> {
    if library_name.is_empty() {
        return Err(LibPathError::EmptyLibraryName);
    }
    Ok(match platform {
        Platform::Linux => format!("lib{library_name}.so"),
        Platform::MacOs => format!("lib{library_name}.dylib"),
        Platform::Windows => format!("{library_name}.dll"),
    })
}

/// Full paths to `short_name` under `directories`, existing files only,
/// input order preserved.
pub fn find_full_paths(short_name: &str, directories: &[PathBuf]) -> Vec<PathBuf> {
    directories
        .iter()
        .map(|d| d.join(short_name))
        .filter(|p| p.exists())
        .collect()
}

/// Full paths to `short_name` under the directories listed in `env_var`
/// (split on the platform's path-list separator).
pub fn find_full_paths_env_var(short_name: &str, env_var: &str) -> Vec<PathBuf> {
    let dirs: Vec<PathBuf> = match env::var_os(env_var) {
        Some(value) => env::split_paths(&value).collect(),
        None => Vec::new(),
    };
    find_full_paths(short_name, &dirs)
}

/// Resolve a library file name to the first existing full path.
///
/// An absolute `file_name` is checked directly. Otherwise the directories
/// of `env_var` are searched, defaulting to the platform's conventional
/// variable (`PATH` on Windows, `LD_LIBRARY_PATH` elsewhere).
pub fn find_first_full_path(
    file_name: &str,
    env_var: Option<&str>,
    platform: Platform,
) -> Result<PathBuf> {
    if file_name.is_empty() {
        return Err(LibPathError::EmptyLibraryName);
    }
    let as_path = Path::new(file_name);
    if as_path.is_absolute() {
        if as_path.exists() {
            return Ok(as_path.to_path_buf());
        }
        return Err(LibPathError::NotFound {
            file_name: file_name.to_owned(),
            env_var: String::new(),
        });
    }
    let env_var = env_var.unwrap_or_else(|| platform.default_search_env_var());
    let candidates = find_full_paths_env_var(file_name, env_var);
    candidates
        .into_iter()
        .next()
        .ok_or_else(|| LibPathError::NotFound {
            file_name: file_name.to_owned(),
            env_var: env_var.to_owned(),
        })
}

/// Search the `lib*` directories directly under an installation prefix
/// for `library_name`, e.g. `<prefix>/lib64/libR.so`. Directories are
/// visited in name order so the result is deterministic.
pub fn find_in_prefix(prefix: &Path, library_name: &str, platform: Platform) -> Option<PathBuf> {
    let short_name = library_short_filename(library_name, platform).ok()?;
    let entries = std::fs::read_dir(prefix).ok()?;
    let mut lib_dirs: Vec<PathBuf> = entries
        .filter_map(|e| e.ok())
        .filter(|e| e.file_name().to_string_lossy().starts_with("lib"))
        .map(|e| e.path())
        .filter(|p| p.is_dir())
        .collect();
    lib_dirs.sort();
    lib_dirs
        .into_iter()
        .map(|d| d.join(&short_name))
        .find(|p| p.exists())
}

/// Build a new value for a PATH-like environment variable, appending (or
/// prepending) `added_paths` to the variable's current content. Only
/// directories that exist are added; `subfolder`, when given, is joined
/// onto each added path first. The environment is not mutated.
pub fn augment_path_env(
    added_paths: &[PathBuf],
    subfolder: Option<&str>,
    to_env: &str,
    prepend: bool,
) -> Result<OsString> {
    let prior: Vec<PathBuf> = match env::var_os(to_env) {
        Some(value) => env::split_paths(&value).collect(),
        None => Vec::new(),
    };
    let added: Vec<PathBuf> = added_paths
        .iter()
        .map(|p| match subfolder {
            Some(sub) if !sub.is_empty() => p.join(sub),
            _ => p.clone(),
        })
        .filter(|p| p.exists())
        .collect();
    let joined = if prepend {
        env::join_paths(added.into_iter().chain(prior))?
    } else {
        env::join_paths(prior.into_iter().chain(added))?
    };
    Ok(joined)
}

/// Propose an update of `to_env` from the paths listed in `from_env`,
/// applying the Windows architecture-subfolder convention. When
/// `from_env` is unset the prior `to_env` value is returned unchanged.
/// Effectively useful on Windows only, where loaders search `PATH`.
pub fn build_new_path_env(from_env: &str, to_env: &str, platform: Platform) -> Result<OsString> {
    match env::var_os(from_env) {
        Some(shared_lib_paths) => {
            let subfolder = win_architecture_subfolder(platform);
            let added: Vec<PathBuf> = env::split_paths(&shared_lib_paths).collect();
            augment_path_env(&added, subfolder.as_deref(), to_env, false)
        }
        None => Ok(env::var_os(to_env).unwrap_or_default()),
    }
}

/// `"64"`/`"32"` subfolder convention on Windows, nothing elsewhere.
fn win_architecture_subfolder(platform: Platform) -> Option<String> {
    if platform != Platform::Windows {
        return None;
    }
    let arch = env::var("PROCESSOR_ARCHITECTURE").unwrap_or_default();
    Some(if arch == "AMD64" { "64" } else { "32" }.to_owned())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_filename_per_platform() {
        assert_eq!(
            library_short_filename("Blah", Platform::Linux).unwrap(),
            "libBlah.so"
        );
        assert_eq!(
            library_short_filename("Blah", Platform::Windows).unwrap(),
            "Blah.dll"
        );
        assert_eq!(
            library_short_filename("Blah", Platform::MacOs).unwrap(),
            "libBlah.dylib"
        );
        assert!(matches!(
            library_short_filename("", Platform::Linux),
            Err(LibPathError::EmptyLibraryName)
        ));
    }

    #[test]
    fn default_search_var() {
        assert_eq!(Platform::Windows.default_search_env_var(), "PATH");
        assert_eq!(Platform::Linux.default_search_env_var(), "LD_LIBRARY_PATH");
        assert_eq!(Platform::MacOs.default_search_env_var(), "LD_LIBRARY_PATH");
    }

    #[test]
    fn find_full_paths_keeps_only_existing() {
        let missing = PathBuf::from("/definitely/not/a/real/dir");
        let tmp = env::temp_dir();
        // temp_dir exists but does not contain this file name.
        let hits = find_full_paths("no_such_library_file.so", &[missing, tmp]);
        assert!(hits.is_empty());
    }
}
