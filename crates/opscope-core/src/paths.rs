use std::path::{Path, PathBuf};

// ---------------------------------------------------------------------------
// Directory constants
// ---------------------------------------------------------------------------

pub const OPSCOPE_DIR: &str = ".opscope";
pub const CONFIG_FILE: &str = ".opscope/config.yaml";

// ---------------------------------------------------------------------------
// Path helpers
// ---------------------------------------------------------------------------

pub fn opscope_dir(root: &Path) -> PathBuf {
    root.join(OPSCOPE_DIR)
}

pub fn config_path(root: &Path) -> PathBuf {
    root.join(CONFIG_FILE)
}

pub fn db_path(root: &Path, db_file: &str) -> PathBuf {
    opscope_dir(root).join(db_file)
}
