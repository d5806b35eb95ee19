//! User settings read from `settings.toml`.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use directories::ProjectDirs;
use serde::Deserialize;
use thiserror::Error;

use crate::logging::LogFormat;

pub const SETTINGS_FILE: &str = "settings.toml";

/// Defaults applied when the matching command-line flag is absent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Settings {
    pub default_output_dir: Option<PathBuf>,
    pub default_region: Option<String>,
    pub log_format: Option<LogFormat>,
}

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("failed to read settings {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("invalid settings {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

/// Platform location of the settings file, e.g.
/// `~/.config/habitat/settings.toml` on Linux.
pub fn settings_path() -> Option<PathBuf> {
    ProjectDirs::from("", "", "habitat").map(|dirs| dirs.config_dir().join(SETTINGS_FILE))
}

/// Reads the settings at `path`, or at [`settings_path`] when `None`.
///
/// A missing file gives the defaults.
pub fn load_settings(path: Option<&Path>) -> Result<Settings, SettingsError> {
    let path = match path {
        Some(path) => path.to_path_buf(),
        None => match settings_path() {
            Some(path) => path,
            None => return Ok(Settings::default()),
        },
    };
    let content = match fs::read_to_string(&path) {
        Ok(content) => content,
        Err(error) if error.kind() == io::ErrorKind::NotFound => return Ok(Settings::default()),
        Err(source) => return Err(SettingsError::Read { path, source }),
    };
    toml::from_str(&content).map_err(|source| SettingsError::Parse { path, source })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let settings = load_settings(Some(&dir.path().join(SETTINGS_FILE))).unwrap();
        assert_eq!(settings, Settings::default());
    }

    #[test]
    fn test_reads_every_field() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(SETTINGS_FILE);
        fs::write(
            &path,
            "default_output_dir = \"/srv/rapports\"\n\
             default_region = \"Tlemcen\"\n\
             log_format = \"compact\"\n",
        )
        .unwrap();

        let settings = load_settings(Some(&path)).unwrap();
        assert_eq!(settings.default_output_dir, Some(PathBuf::from("/srv/rapports")));
        assert_eq!(settings.default_region.as_deref(), Some("Tlemcen"));
        assert_eq!(settings.log_format, Some(LogFormat::Compact));
    }

    #[test]
    fn test_partial_file_keeps_other_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(SETTINGS_FILE);
        fs::write(&path, "default_region = \"Oran\"\n").unwrap();

        let settings = load_settings(Some(&path)).unwrap();
        assert_eq!(settings.default_region.as_deref(), Some("Oran"));
        assert_eq!(settings.default_output_dir, None);
    }

    #[test]
    fn test_malformed_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(SETTINGS_FILE);
        fs::write(&path, "log_format = \"verbose\"\n").unwrap();

        let error = load_settings(Some(&path)).unwrap_err();
        assert!(matches!(error, SettingsError::Parse { .. }));
        assert!(error.to_string().contains(SETTINGS_FILE));
    }

    #[test]
    fn test_unknown_key_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(SETTINGS_FILE);
        fs::write(&path, "default_wilaya = \"Oran\"\n").unwrap();
        assert!(load_settings(Some(&path)).is_err());
    }
}
