//! Runtime configuration
//!
//! Everything is read from the environment.

use std::path::{Path, PathBuf};

/// Overrides the database file location
pub const DATABASE_PATH_VAR: &str = "NUTRICALC_DATABASE_PATH";

/// Log directive applied on top of `RUST_LOG`
pub const DEFAULT_LOG_DIRECTIVE: &str = "nutricalc=info";

/// Get the database path from environment or use default
pub fn database_path() -> PathBuf {
    std::env::var(DATABASE_PATH_VAR)
        .map(PathBuf::from)
        .unwrap_or_else(|_| {
            let exe_dir = std::env::current_exe()
                .ok()
                .and_then(|p| p.parent().map(|p| p.to_path_buf()))
                .unwrap_or_else(|| PathBuf::from("."));
            default_database_path(&exe_dir)
        })
}

/// `<project>/data/nutricalc.db`, stepping out of `target/{debug,release}`
fn default_database_path(exe_dir: &Path) -> PathBuf {
    let mut path = exe_dir.to_path_buf();

    if path.ends_with("release") || path.ends_with("debug") {
        if let Some(grandparent) = path.parent().and_then(|p| p.parent()) {
            path = grandparent.to_path_buf();
        }
    }

    path.push("data");
    path.push("nutricalc.db");
    path
}
