//! CLI utilities for binaries
//!
//! Resolves the dashboard config path from `--config <path>`, then
//! `DASHBOARD_CONFIG_PATH`, then the default location.

use anyhow::{bail, Result};
use std::path::PathBuf;
use tokenfeed::infrastructure::config::DEFAULT_CONFIG_PATH;

/// Environment variable naming the dashboard config file
pub const CONFIG_PATH_VAR: &str = "DASHBOARD_CONFIG_PATH";

/// Config path for this process, from its arguments and environment
///
/// # Examples
/// ```no_run
/// use token_dashboard::bin_common::resolve_config_path;
///
/// let path = resolve_config_path().unwrap();
/// ```
pub fn resolve_config_path() -> Result<PathBuf> {
    config_path_from(std::env::args().skip(1), |name| std::env::var(name).ok())
}

/// Resolve a config path from explicit arguments and a variable lookup
///
/// Arguments other than `--config` / `--config=<path>` are ignored.
pub fn config_path_from<I, F>(args: I, lookup: F) -> Result<PathBuf>
where
    I: IntoIterator<Item = String>,
    F: Fn(&str) -> Option<String>,
{
    let mut args = args.into_iter();
    while let Some(arg) = args.next() {
        if arg == "--config" {
            match args.next() {
                Some(path) if !path.starts_with("--") => return Ok(path.into()),
                _ => bail!("--config requires a path"),
            }
        }
        if let Some(path) = arg.strip_prefix("--config=") {
            if path.is_empty() {
                bail!("--config requires a path");
            }
            return Ok(path.into());
        }
    }

    Ok(lookup(CONFIG_PATH_VAR)
        .filter(|path| !path.is_empty())
        .unwrap_or_else(|| DEFAULT_CONFIG_PATH.to_string())
        .into())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_default_path() {
        let path = config_path_from(args(&[]), |_| None).unwrap();
        assert_eq!(path, PathBuf::from("config/dashboard.yaml"));

        let path = config_path_from(args(&[]), |_| Some(String::new())).unwrap();
        assert_eq!(path, PathBuf::from("config/dashboard.yaml"));
    }

    #[test]
    fn test_env_var_path() {
        let lookup = |name: &str| (name == CONFIG_PATH_VAR).then(|| "env/dashboard.yaml".to_string());
        let path = config_path_from(args(&[]), lookup).unwrap();
        assert_eq!(path, PathBuf::from("env/dashboard.yaml"));
    }

    #[test]
    fn test_flag_beats_env_var() {
        let lookup = |_: &str| Some("env/dashboard.yaml".to_string());

        let path = config_path_from(args(&["--config", "cli.yaml"]), lookup).unwrap();
        assert_eq!(path, PathBuf::from("cli.yaml"));

        let path = config_path_from(args(&["-v", "--config=other.yaml"]), lookup).unwrap();
        assert_eq!(path, PathBuf::from("other.yaml"));
    }

    #[test]
    fn test_flag_without_path() {
        assert!(config_path_from(args(&["--config"]), |_| None).is_err());
        assert!(config_path_from(args(&["--config", "--verbose"]), |_| None).is_err());
        assert!(config_path_from(args(&["--config="]), |_| None).is_err());
    }
}
