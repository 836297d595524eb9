use std::path::PathBuf;

/// Location of the optional settings file: `<config_dir>/nettune/config.toml`.
pub fn settings_path() -> PathBuf {
    let base = dirs::config_dir().unwrap_or_else(|| {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".config")
    });
    base.join("nettune/config.toml")
}

/// Expand a leading `~` the way the shell would.
pub fn expand(path: &str) -> PathBuf {
    PathBuf::from(shellexpand::tilde(path).to_string())
}
