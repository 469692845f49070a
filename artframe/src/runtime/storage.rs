use std::path::PathBuf;

use directories_next::BaseDirs;

pub const PAGE_FILE: &str = "page.yaml";

pub fn config_dir() -> Option<PathBuf> {
    BaseDirs::new().map(|base| base.config_dir().join("Artframe"))
}

/// Where the gallery looks for its page when none is given.
pub fn default_page_path() -> Option<PathBuf> {
    config_dir().map(|dir| dir.join(PAGE_FILE))
}
