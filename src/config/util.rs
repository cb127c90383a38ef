//! Configuration utility functions.

use std::path::{Path, PathBuf};

/// Find `config_name` by walking up from `start`.
///
/// ```text
/// /home/user/app/src/main/js/   ← start
/// /home/user/app/uberpack.toml  ← found
/// ```
pub fn find_config_file(start: &Path, config_name: &Path) -> Option<PathBuf> {
    if config_name.is_absolute() {
        return config_name.exists().then(|| config_name.to_path_buf());
    }

    start
        .ancestors()
        .map(|dir| dir.join(config_name))
        .find(|candidate| candidate.exists())
}
