//! Centralized path resolution for roscfg
//!
//! # Environment Variables
//!
//! - `ROSCFG_CONFIG_DIR` - Override config directory (e.g., `~/dotfiles/roscfg`)
//! - `ROSCFG_STATE_DIR` - Override state directory
//!
//! # Path Resolution Priority
//!
//! For config_dir():
//! 1. `ROSCFG_CONFIG_DIR` environment variable
//! 2. `XDG_CONFIG_HOME/roscfg` (if set)
//! 3. `~/.config/roscfg`
//!
//! For state_dir():
//! 1. `ROSCFG_STATE_DIR` environment variable
//! 2. `XDG_STATE_HOME/roscfg` (if set)
//! 3. `~/.local/state/roscfg`
//!
//! `--config` and `--state` on the command line win over all of these.

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

/// Environment variable for config directory override
pub const ENV_CONFIG_DIR: &str = "ROSCFG_CONFIG_DIR";

/// Environment variable for state directory override
pub const ENV_STATE_DIR: &str = "ROSCFG_STATE_DIR";

const APP: &str = "roscfg";

/// Get the roscfg config directory path
pub fn config_dir() -> Result<PathBuf> {
    if let Ok(dir) = std::env::var(ENV_CONFIG_DIR) {
        let path = expand(&dir);
        log::debug!(
            "Using config dir from {}: {}",
            ENV_CONFIG_DIR,
            path.display()
        );
        return Ok(path);
    }

    if let Ok(xdg_config) = std::env::var("XDG_CONFIG_HOME") {
        let path = PathBuf::from(xdg_config).join(APP);
        log::debug!("Using XDG_CONFIG_HOME: {}", path.display());
        return Ok(path);
    }

    let home = dirs::home_dir().context("Could not determine home directory")?;
    let path = home.join(".config").join(APP);
    log::debug!("Using default config dir: {}", path.display());
    Ok(path)
}

/// Get the roscfg state directory path
pub fn state_dir() -> Result<PathBuf> {
    if let Ok(dir) = std::env::var(ENV_STATE_DIR) {
        let path = expand(&dir);
        log::debug!("Using state dir from {}: {}", ENV_STATE_DIR, path.display());
        return Ok(path);
    }

    if let Ok(xdg_state) = std::env::var("XDG_STATE_HOME") {
        let path = PathBuf::from(xdg_state).join(APP);
        log::debug!("Using XDG_STATE_HOME: {}", path.display());
        return Ok(path);
    }

    let home = dirs::home_dir().context("Could not determine home directory")?;
    let path = home.join(".local").join("state").join(APP);
    log::debug!("Using default state dir: {}", path.display());
    Ok(path)
}

/// Config file to load: the `--config` flag, or `config.toml` in [`config_dir`].
pub fn config_file(flag: Option<&Path>) -> Result<PathBuf> {
    match flag {
        Some(path) => Ok(expand(&path.to_string_lossy())),
        None => Ok(config_dir()?.join("config.toml")),
    }
}

/// State file to use: the `--state` flag, or `state.toml` in [`state_dir`].
pub fn state_file(flag: Option<&Path>) -> Result<PathBuf> {
    match flag {
        Some(path) => Ok(expand(&path.to_string_lossy())),
        None => Ok(state_dir()?.join("state.toml")),
    }
}

/// Expand ~ and environment variables in a path string.
pub fn expand(path: &str) -> PathBuf {
    let expanded = shellexpand::full(path).unwrap_or(std::borrow::Cow::Borrowed(path));
    PathBuf::from(expanded.as_ref())
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;

    /// Helper to run a test with temporary env var
    ///
    /// # Safety
    /// This function uses unsafe env::set_var/remove_var which can cause issues
    /// if other threads read environment variables concurrently.
    /// Only use in single-threaded test contexts.
    fn with_env_var<F, R>(key: &str, value: &str, f: F) -> R
    where
        F: FnOnce() -> R,
    {
        let original = env::var(key).ok();
        // SAFETY: Tests run in isolation and don't read env vars concurrently
        unsafe { env::set_var(key, value) };
        let result = f();
        match original {
            // SAFETY: Tests run in isolation
            Some(v) => unsafe { env::set_var(key, v) },
            None => unsafe { env::remove_var(key) },
        }
        result
    }

    #[test]
    fn test_config_dir_env_override() {
        with_env_var(ENV_CONFIG_DIR, "/custom/config/path", || {
            let result = config_dir().unwrap();
            assert_eq!(result, PathBuf::from("/custom/config/path"));
            assert_eq!(
                config_file(None).unwrap(),
                PathBuf::from("/custom/config/path/config.toml")
            );
        });
    }

    #[test]
    fn test_state_dir_env_override() {
        with_env_var(ENV_STATE_DIR, "/custom/state/path", || {
            let result = state_dir().unwrap();
            assert_eq!(result, PathBuf::from("/custom/state/path"));
            assert_eq!(
                state_file(None).unwrap(),
                PathBuf::from("/custom/state/path/state.toml")
            );
        });
    }

    #[test]
    fn test_flag_wins() {
        let flag = PathBuf::from("/etc/roscfg/lab.toml");
        assert_eq!(config_file(Some(&flag)).unwrap(), flag);
        assert_eq!(state_file(Some(&flag)).unwrap(), flag);
    }

    #[test]
    fn test_expand_with_tilde() {
        let result = expand("~/test/path");
        let home = dirs::home_dir().unwrap();
        assert_eq!(result, home.join("test").join("path"));
    }

    #[test]
    fn test_expand_absolute() {
        let result = expand("/absolute/path");
        assert_eq!(result, PathBuf::from("/absolute/path"));
    }

    #[test]
    fn test_expand_unknown_env_var_unchanged() {
        // Unknown env vars are left as-is by shellexpand::full
        let result = expand("/path/$NONEXISTENT_VAR_12345/file");
        assert_eq!(result, PathBuf::from("/path/$NONEXISTENT_VAR_12345/file"));
    }
}
