use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;
use tracing::debug;

use super::path::{expand, settings_path};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("I/O error reading settings at {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse settings {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

/// Runtime settings. Every field has a default, so a missing file is fine.
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    /// `tracing` filter used when `RUST_LOG` is unset.
    pub log_level: String,
    pub sysctl_binary: PathBuf,
    pub paths: Paths,
}

/// Filesystem locations the pipeline touches.
#[derive(Debug, Clone, PartialEq)]
pub struct Paths {
    pub legacy_conf: PathBuf,
    pub fragment_dir: PathBuf,
    pub fragment_name: String,
    pub backup_root: PathBuf,
    pub debian_marker: PathBuf,
}

impl Paths {
    /// Full path of the file the tuning profile is written to.
    pub fn fragment_file(&self) -> PathBuf {
        self.fragment_dir.join(&self.fragment_name)
    }

    /// All paths re-rooted under `root`. Used to run the pipeline against a
    /// scratch tree instead of `/etc`.
    pub fn rooted_at(root: &Path) -> Self {
        Paths {
            legacy_conf: root.join("etc/sysctl.conf"),
            fragment_dir: root.join("etc/sysctl.d"),
            fragment_name: DEFAULT_FRAGMENT_NAME.to_string(),
            backup_root: root.join("var/backups/nettune"),
            debian_marker: root.join("etc/debian_version"),
        }
    }
}

const DEFAULT_FRAGMENT_NAME: &str = "99-sysctl.conf";

impl Default for Paths {
    fn default() -> Self {
        Paths::rooted_at(Path::new("/"))
    }
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            log_level: "warn".to_string(),
            sysctl_binary: PathBuf::from("sysctl"),
            paths: Paths::default(),
        }
    }
}

// On-disk shape: everything optional, string paths so `~` can be expanded.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawSettings {
    log_level: Option<String>,
    sysctl_binary: Option<String>,
    #[serde(default)]
    paths: RawPaths,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawPaths {
    legacy_conf: Option<String>,
    fragment_dir: Option<String>,
    fragment_name: Option<String>,
    backup_root: Option<String>,
    debian_marker: Option<String>,
}

impl From<RawSettings> for Settings {
    fn from(raw: RawSettings) -> Self {
        let d = Settings::default();
        let p = raw.paths;
        Settings {
            log_level: raw.log_level.unwrap_or(d.log_level),
            sysctl_binary: raw.sysctl_binary.map(|s| expand(&s)).unwrap_or(d.sysctl_binary),
            paths: Paths {
                legacy_conf: p.legacy_conf.map(|s| expand(&s)).unwrap_or(d.paths.legacy_conf),
                fragment_dir: p.fragment_dir.map(|s| expand(&s)).unwrap_or(d.paths.fragment_dir),
                fragment_name: p.fragment_name.unwrap_or(d.paths.fragment_name),
                backup_root: p.backup_root.map(|s| expand(&s)).unwrap_or(d.paths.backup_root),
                debian_marker: p.debian_marker.map(|s| expand(&s)).unwrap_or(d.paths.debian_marker),
            },
        }
    }
}

/// Parse settings from TOML text.
pub fn parse_settings(text: &str, origin: &Path) -> Result<Settings, ConfigError> {
    toml::from_str::<RawSettings>(text)
        .map(Settings::from)
        .map_err(|source| ConfigError::Parse { path: origin.to_path_buf(), source })
}

/// Load settings from `path`; an absent file yields the defaults.
pub fn load_settings_from(path: &Path) -> Result<Settings, ConfigError> {
    match fs::read_to_string(path) {
        Ok(text) => {
            debug!(path = %path.display(), "loading settings");
            parse_settings(&text, path)
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            debug!(path = %path.display(), "no settings file, using defaults");
            Ok(Settings::default())
        }
        Err(source) => Err(ConfigError::Io { path: path.to_path_buf(), source }),
    }
}

/// Load settings from the standard location.
pub fn load_settings() -> Result<Settings, ConfigError> {
    load_settings_from(&settings_path())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_point_at_etc() {
        let s = Settings::default();
        assert_eq!(s.paths.legacy_conf, PathBuf::from("/etc/sysctl.conf"));
        assert_eq!(s.paths.fragment_dir, PathBuf::from("/etc/sysctl.d"));
        assert_eq!(s.paths.fragment_file(), PathBuf::from("/etc/sysctl.d/99-sysctl.conf"));
        assert_eq!(s.paths.debian_marker, PathBuf::from("/etc/debian_version"));
        assert_eq!(s.log_level, "warn");
    }

    #[test]
    fn empty_toml_yields_defaults() {
        let s = parse_settings("", Path::new("config.toml")).unwrap();
        assert_eq!(s, Settings::default());
    }

    #[test]
    fn partial_toml_overrides_only_given_fields() {
        let text = r#"
log_level = "debug"

[paths]
backup_root = "/srv/backups"
"#;
        let s = parse_settings(text, Path::new("config.toml")).unwrap();
        assert_eq!(s.log_level, "debug");
        assert_eq!(s.paths.backup_root, PathBuf::from("/srv/backups"));
        assert_eq!(s.paths.fragment_dir, PathBuf::from("/etc/sysctl.d"));
        assert_eq!(s.sysctl_binary, PathBuf::from("sysctl"));
    }

    #[test]
    fn unknown_keys_are_rejected() {
        let err = parse_settings("colour = true", Path::new("config.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
    }

    #[test]
    fn invalid_toml_is_an_error() {
        let err = parse_settings("[[[ nope", Path::new("config.toml")).unwrap_err();
        assert!(err.to_string().contains("config.toml"));
    }

    #[test]
    fn missing_file_is_not_an_error() {
        let s = load_settings_from(Path::new("/nonexistent/nettune/config.toml")).unwrap();
        assert_eq!(s, Settings::default());
    }

    #[test]
    fn rooted_paths_stay_under_root() {
        let root = Path::new("/tmp/scratch");
        let p = Paths::rooted_at(root);
        for path in [&p.legacy_conf, &p.fragment_dir, &p.backup_root, &p.debian_marker] {
            assert!(path.starts_with(root), "{} escapes root", path.display());
        }
    }
}
