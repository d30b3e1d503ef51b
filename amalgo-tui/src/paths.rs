//! Platform-specific directory paths.
//!
//! Uses XDG on Linux, standard locations on macOS/Windows.

use std::path::PathBuf;

use directories::ProjectDirs;

const QUALIFIER: &str = "dev";
const ORGANIZATION: &str = "amalgo";
const APPLICATION: &str = "amalgo-tui";

/// Get project directories, or None if home directory cannot be determined.
fn project_dirs() -> Option<ProjectDirs> {
    ProjectDirs::from(QUALIFIER, ORGANIZATION, APPLICATION)
}

/// Get the cache directory for temporary/regenerable data.
///
/// - Linux: `$XDG_CACHE_HOME/amalgo-tui` or `~/.cache/amalgo-tui`
/// - macOS: `~/Library/Caches/dev.amalgo.amalgo-tui`
/// - Windows: `C:\Users\<User>\AppData\Local\amalgo\amalgo-tui\cache`
pub fn cache_dir() -> Option<PathBuf> {
    project_dirs().map(|dirs| dirs.cache_dir().to_path_buf())
}

/// Get the config directory for configuration files.
///
/// - Linux: `$XDG_CONFIG_HOME/amalgo-tui` or `~/.config/amalgo-tui`
/// - macOS: `~/Library/Application Support/dev.amalgo.amalgo-tui`
/// - Windows: `C:\Users\<User>\AppData\Roaming\amalgo\amalgo-tui\config`
pub fn config_dir() -> Option<PathBuf> {
    project_dirs().map(|dirs| dirs.config_dir().to_path_buf())
}

/// Options file used when no path is given on the command line.
pub fn options_file() -> Option<PathBuf> {
    config_dir().map(|dir| dir.join("options.json"))
}

/// Get the path to the latest log file.
pub fn log_file() -> Option<PathBuf> {
    cache_dir().map(|dir| dir.join("latest.log"))
}
