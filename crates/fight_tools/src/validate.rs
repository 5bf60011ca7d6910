//! Duel configuration validation.

use std::path::{Path, PathBuf};

use fight_core::config::DuelConfig;

use crate::error::{read_file, Result, ToolError};

/// Outcome of validating one or more configuration files.
#[derive(Debug, Default)]
pub struct ValidationReport {
    /// Files that parsed and validated.
    pub passed: Vec<PathBuf>,
    /// Files that failed, with the reason.
    pub failed: Vec<(PathBuf, String)>,
}

impl ValidationReport {
    /// Whether every checked file passed.
    #[must_use]
    pub fn is_ok(&self) -> bool {
        self.failed.is_empty()
    }

    /// Number of files checked.
    #[must_use]
    pub fn checked(&self) -> usize {
        self.passed.len() + self.failed.len()
    }
}

/// Parse and validate a single duel configuration file.
///
/// # Errors
///
/// Returns an error if the file cannot be read, is not valid RON, or fails
/// validation.
pub fn validate_config_file(path: &Path) -> Result<DuelConfig> {
    let text = read_file(path)?;
    let config = DuelConfig::from_ron_str(&text)?;
    tracing::debug!(
        "{}: {} + {} commands",
        path.display(),
        config.player_one.commands.len(),
        config.player_two.commands.len()
    );
    Ok(config)
}

/// Validate a configuration file, or every `.ron` file in a directory.
///
/// Directory entries are checked in name order. Individual failures are
/// collected in the report rather than aborting the run.
///
/// # Errors
///
/// Returns an error if the path (or the directory listing) cannot be read.
pub fn validate_path(path: &Path) -> Result<ValidationReport> {
    let files = if path.is_dir() {
        let entries = std::fs::read_dir(path).map_err(|source| ToolError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let mut files: Vec<PathBuf> = entries
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .filter(|p| p.extension().is_some_and(|ext| ext == "ron"))
            .collect();
        files.sort();
        files
    } else {
        vec![path.to_path_buf()]
    };

    let mut report = ValidationReport::default();
    for file in files {
        match validate_config_file(&file) {
            Ok(_) => report.passed.push(file),
            Err(e @ ToolError::Io { .. }) if !path.is_dir() => return Err(e),
            Err(e) => {
                tracing::warn!("{}: {e}", file.display());
                report.failed.push((file, e.to_string()));
            }
        }
    }
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scratch_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("fight_tools_{name}_{}", std::process::id()));
        let _ = std::fs::remove_dir_all(&dir);
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[test]
    fn test_validates_default_config() {
        let dir = scratch_dir("single");
        let path = dir.join("default.ron");
        std::fs::write(&path, DuelConfig::default().to_ron_string().unwrap()).unwrap();

        let config = validate_config_file(&path).unwrap();
        assert_eq!(config, DuelConfig::default());
    }

    #[test]
    fn test_directory_collects_failures() {
        let dir = scratch_dir("dir");
        std::fs::write(dir.join("a_good.ron"), "DuelConfig(spawn_one: -150.0)").unwrap();
        std::fs::write(
            dir.join("b_bad.ron"),
            "DuelConfig(player_one: FighterConfig(input_capacity: 0))",
        )
        .unwrap();
        std::fs::write(dir.join("notes.txt"), "not a config").unwrap();

        let report = validate_path(&dir).unwrap();

        assert_eq!(report.checked(), 2);
        assert_eq!(report.passed, vec![dir.join("a_good.ron")]);
        assert_eq!(report.failed.len(), 1);
        assert!(!report.is_ok());
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let missing = scratch_dir("missing").join("nope.ron");
        assert!(matches!(validate_path(&missing), Err(ToolError::Io { .. })));
    }
}
