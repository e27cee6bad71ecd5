pub mod activity_io;
pub mod config_io;
pub mod store_io;

use std::path::PathBuf;

/// Get the user's home directory
pub(crate) fn home_dir() -> PathBuf {
    std::env::var("HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("/"))
}
