use std::fmt;
use std::path::PathBuf;

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};

use crate::error::TuneError;

/// What to do with IPv6 after the base block.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Ipv6Policy {
    Disable,
    Enable,
    Skip,
}

impl Ipv6Policy {
    pub const ALL: [Ipv6Policy; 3] = [Ipv6Policy::Disable, Ipv6Policy::Enable, Ipv6Policy::Skip];

    /// Validate one menu answer (`1`, `2` or `3`).
    pub fn from_menu(input: &str) -> Result<Self, TuneError> {
        match input.trim() {
            "1" => Ok(Ipv6Policy::Disable),
            "2" => Ok(Ipv6Policy::Enable),
            "3" => Ok(Ipv6Policy::Skip),
            other => Err(TuneError::InvalidMenuChoice(other.to_string())),
        }
    }

    /// Parse the word form used on the command line.
    pub fn from_word(input: &str) -> Option<Self> {
        match input.trim().to_ascii_lowercase().as_str() {
            "disable" | "off" => Some(Ipv6Policy::Disable),
            "enable" | "on" => Some(Ipv6Policy::Enable),
            "skip" | "none" => Some(Ipv6Policy::Skip),
            _ => None,
        }
    }

    pub fn menu_number(self) -> u8 {
        match self {
            Ipv6Policy::Disable => 1,
            Ipv6Policy::Enable => 2,
            Ipv6Policy::Skip => 3,
        }
    }
}

impl fmt::Display for Ipv6Policy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Ipv6Policy::Disable => "disable IPv6",
            Ipv6Policy::Enable => "enable IPv6 with forwarding and RA tuning",
            Ipv6Policy::Skip => "leave IPv6 untouched",
        };
        f.write_str(s)
    }
}

/// Contents of `manifest.json` inside a backup directory.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct BackupManifest {
    pub created_at: DateTime<Local>,
    /// Where the legacy file lived, and whether it existed.
    pub legacy_conf: PathBuf,
    #[serde(default)]
    pub legacy_present: bool,
    pub fragment_dir: PathBuf,
    #[serde(default)]
    pub fragment_present: bool,
    /// Paths relative to the backed-up fragment directory.
    #[serde(default)]
    pub fragment_files: Vec<PathBuf>,
}

/// A finished backup: the directory plus what went into it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackupRecord {
    pub dir: PathBuf,
    pub manifest: BackupManifest,
}

/// Outcome of comparing one runtime value to what the profile expects.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Check {
    Match { key: String, value: String },
    Mismatch { key: String, expected: String, actual: String },
    Unreadable { key: String, reason: String },
}

impl Check {
    pub fn key(&self) -> &str {
        match self {
            Check::Match { key, .. } | Check::Mismatch { key, .. } | Check::Unreadable { key, .. } => key,
        }
    }

    pub fn is_match(&self) -> bool {
        matches!(self, Check::Match { .. })
    }
}

/// How a pipeline run ended when it did not abort.
#[derive(Debug)]
pub enum RunOutcome {
    Declined,
    Completed { backup: BackupRecord, policy: Ipv6Policy, checks: Vec<Check> },
    ApplyFailed { backup: BackupRecord, policy: Ipv6Policy, error: TuneError },
}

impl RunOutcome {
    pub fn exit_code(&self) -> i32 {
        match self {
            RunOutcome::Declined | RunOutcome::Completed { .. } => 0,
            RunOutcome::ApplyFailed { .. } => 1,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn menu_numbers_map_to_policies() {
        for p in Ipv6Policy::ALL {
            assert_eq!(Ipv6Policy::from_menu(&p.menu_number().to_string()).unwrap(), p);
        }
        assert_eq!(Ipv6Policy::from_menu(" 2 \n").unwrap(), Ipv6Policy::Enable);
    }

    #[test]
    fn invalid_menu_input_is_rejected() {
        for bad in ["", "0", "4", "one", "1 2"] {
            assert!(matches!(
                Ipv6Policy::from_menu(bad),
                Err(TuneError::InvalidMenuChoice(_))
            ), "{bad:?} should be rejected");
        }
    }

    #[test]
    fn words_parse_case_insensitively() {
        assert_eq!(Ipv6Policy::from_word("Disable"), Some(Ipv6Policy::Disable));
        assert_eq!(Ipv6Policy::from_word("enable"), Some(Ipv6Policy::Enable));
        assert_eq!(Ipv6Policy::from_word("skip"), Some(Ipv6Policy::Skip));
        assert_eq!(Ipv6Policy::from_word("maybe"), None);
    }

    #[test]
    fn manifest_survives_json_with_missing_optional_fields() {
        let json = r#"{
            "created_at": "2026-01-02T03:04:05+00:00",
            "legacy_conf": "/etc/sysctl.conf",
            "fragment_dir": "/etc/sysctl.d"
        }"#;
        let m: BackupManifest = serde_json::from_str(json).unwrap();
        assert!(!m.legacy_present);
        assert!(!m.fragment_present);
        assert!(m.fragment_files.is_empty());
    }
}
