// crates/stakewatch-store/src/paths.rs
//
// Default checkpoint locations.
//
// Files live in a per-OS application data directory:
//   - Linux:   ~/.local/share/StakeWatch
//   - macOS:   ~/Library/Application Support/StakeWatch
//   - Windows: %APPDATA%\StakeWatch
// falling back to ~/StakeWatch, then to a relative `StakeWatch` directory.

use std::path::PathBuf;

/// Name of the application data directory.
pub const DATA_DIR_NAME: &str = "StakeWatch";

/// File holding the next block height to process.
pub const CURSOR_FILE_NAME: &str = "latest_block";

/// File holding the last committed ranked snapshot.
pub const SNAPSHOT_FILE_NAME: &str = "stake_info.rlp";

pub fn default_data_dir() -> PathBuf {
    dirs::data_dir()
        .or_else(dirs::home_dir)
        .map(|base| base.join(DATA_DIR_NAME))
        .unwrap_or_else(|| PathBuf::from(DATA_DIR_NAME))
}

pub fn default_cursor_file() -> PathBuf {
    default_data_dir().join(CURSOR_FILE_NAME)
}

pub fn default_snapshot_file() -> PathBuf {
    default_data_dir().join(SNAPSHOT_FILE_NAME)
}

/// Expand `~` at the start of a path to the user's home directory.
pub fn expand_tilde(path: &str) -> PathBuf {
    if let Some(rest) = path.strip_prefix("~/") {
        if let Some(home) = dirs::home_dir() {
            return home.join(rest);
        }
    }
    PathBuf::from(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_files_share_the_data_dir() {
        let dir = default_data_dir();
        assert!(dir.ends_with(DATA_DIR_NAME));
        assert_eq!(default_cursor_file().parent(), Some(dir.as_path()));
        assert_eq!(default_snapshot_file().parent(), Some(dir.as_path()));
    }

    #[test]
    fn expand_tilde_leaves_plain_paths_alone() {
        assert_eq!(expand_tilde("/var/lib/x"), PathBuf::from("/var/lib/x"));
        assert_eq!(expand_tilde("rel/path"), PathBuf::from("rel/path"));
    }

    #[test]
    fn expand_tilde_uses_home() {
        if let Some(home) = dirs::home_dir() {
            assert_eq!(expand_tilde("~/watch/latest_block"), home.join("watch/latest_block"));
        }
    }
}
