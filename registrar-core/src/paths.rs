//! Data directory resolution.
//!
//! ```text
//! <home>/.registrar/
//!   data/
//!     course_types.yaml
//!     courses.yaml
//!     offerings.yaml
//!     students.yaml
//!     registrations.yaml
//! ```
//!
//! Like the store API, every function has an `_at(home)` form so tests can
//! point at a `TempDir` instead of the real home directory.

use std::path::{Path, PathBuf};

use crate::error::StoreError;

/// Environment variable that overrides the data directory outright.
pub const DATA_DIR_ENV: &str = "REGISTRAR_HOME";

pub fn registrar_root(home: &Path) -> PathBuf {
    home.join(".registrar")
}

/// `<home>/.registrar/data`
pub fn data_dir_at(home: &Path) -> PathBuf {
    registrar_root(home).join("data")
}

/// Resolve the data directory: explicit override, then `$REGISTRAR_HOME`,
/// then `<home>/.registrar/data`.
pub fn resolve_data_dir(explicit: Option<PathBuf>) -> Result<PathBuf, StoreError> {
    if let Some(dir) = explicit {
        return Ok(dir);
    }
    if let Some(dir) = std::env::var_os(DATA_DIR_ENV).filter(|v| !v.is_empty()) {
        return Ok(PathBuf::from(dir));
    }
    Ok(data_dir_at(&home()?))
}

fn home() -> Result<PathBuf, StoreError> {
    dirs::home_dir().ok_or(StoreError::HomeNotFound)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn data_dir_is_under_dot_registrar() {
        let dir = data_dir_at(Path::new("/home/asha"));
        assert!(dir.ends_with(".registrar/data"));
    }

    #[test]
    fn explicit_dir_wins() {
        let dir = resolve_data_dir(Some(PathBuf::from("/tmp/reg"))).expect("resolve");
        assert_eq!(dir, PathBuf::from("/tmp/reg"));
    }
}
