use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::env;
use std::path::{Path, PathBuf};

use crate::storage::{DEFAULT_STORAGE_KEY, is_valid_key};

/// Environment variable overriding the data directory.
pub const DATA_DIR_ENV: &str = "TICKETY_DATA_DIR";

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct StorageConfig {
    /// Directory holding the ticket slot files.
    #[serde(default)]
    pub dir: Option<PathBuf>,
    /// Key the ticket collection is stored under.
    #[serde(default)]
    pub key: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct UserConfig {
    #[serde(default)]
    pub output: Option<String>,
    #[serde(default)]
    pub storage: StorageConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EffectiveConfig {
    pub user: UserConfig,
    pub data_dir: PathBuf,
    pub storage_key: String,
}

/// Path of the user config file, if the platform has a config directory.
#[must_use]
pub fn user_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("tickety/config.toml"))
}

/// Load the user config file, or defaults when there is none.
///
/// # Errors
///
/// Returns an error if the config file exists but cannot be read or parsed.
pub fn load_user_config() -> Result<UserConfig> {
    user_config_path().map_or_else(|| Ok(UserConfig::default()), |path| load_config_file(&path))
}

/// Load a config file, falling back to defaults when it does not exist.
///
/// # Errors
///
/// Returns an error if the file exists but cannot be read or is not valid
/// TOML for [`UserConfig`].
pub fn load_config_file(path: &Path) -> Result<UserConfig> {
    if !path.exists() {
        return Ok(UserConfig::default());
    }

    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;

    toml::from_str::<UserConfig>(&content)
        .with_context(|| format!("Failed to parse {}", path.display()))
}

/// Resolve where tickets live.
///
/// Precedence: explicit flag, then `TICKETY_DATA_DIR`, then the config file,
/// then the platform data directory.
///
/// # Errors
///
/// Returns an error when no data directory can be determined, or when the
/// configured `storage.key` cannot name a storage file.
pub fn resolve_config(data_dir_flag: Option<&Path>, user: UserConfig) -> Result<EffectiveConfig> {
    let env_dir = env::var_os(DATA_DIR_ENV).map(PathBuf::from);
    let data_dir = resolve_data_dir(
        data_dir_flag,
        env_dir,
        user.storage.dir.clone(),
        dirs::data_dir(),
    )?;

    let storage_key = user
        .storage
        .key
        .clone()
        .map(|key| key.trim().to_string())
        .filter(|key| !key.is_empty())
        .unwrap_or_else(|| DEFAULT_STORAGE_KEY.to_string());
    if !is_valid_key(&storage_key) {
        anyhow::bail!(
            "invalid storage.key '{storage_key}': use letters, digits, '.', '_' or '-', \
             not starting with '.'"
        );
    }

    Ok(EffectiveConfig {
        user,
        data_dir,
        storage_key,
    })
}

fn resolve_data_dir(
    flag: Option<&Path>,
    env_dir: Option<PathBuf>,
    config_dir: Option<PathBuf>,
    platform_data_dir: Option<PathBuf>,
) -> Result<PathBuf> {
    if let Some(dir) = flag {
        return Ok(dir.to_path_buf());
    }

    if let Some(dir) = env_dir.filter(|d| !d.as_os_str().is_empty()) {
        return Ok(dir);
    }

    if let Some(dir) = config_dir {
        return Ok(dir);
    }

    platform_data_dir
        .map(|dir| dir.join("tickety"))
        .context("No data directory available; pass --data-dir or set TICKETY_DATA_DIR")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_config_file_uses_defaults() {
        let dir = tempfile::tempdir().expect("temp dir must be created");
        let cfg = load_config_file(&dir.path().join("config.toml")).expect("load should succeed");
        assert!(cfg.output.is_none());
        assert!(cfg.storage.dir.is_none());
        assert!(cfg.storage.key.is_none());
    }

    #[test]
    fn config_file_parses_storage_section() {
        let dir = tempfile::tempdir().expect("temp dir must be created");
        let path = dir.path().join("config.toml");
        std::fs::write(
            &path,
            r#"
output = "json"

[storage]
dir = "/home/alice/.tickets"
key = "work_tickets"
"#,
        )
        .expect("write config");

        let cfg = load_config_file(&path).expect("parse");
        assert_eq!(cfg.output.as_deref(), Some("json"));
        assert_eq!(cfg.storage.dir, Some(PathBuf::from("/home/alice/.tickets")));
        assert_eq!(cfg.storage.key.as_deref(), Some("work_tickets"));
    }

    #[test]
    fn invalid_config_reports_path() {
        let dir = tempfile::tempdir().expect("temp dir must be created");
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "output = [").expect("write config");

        let err = load_config_file(&path).expect_err("parse should fail");
        assert!(format!("{err:#}").contains("config.toml"));
    }

    #[test]
    fn flag_wins_over_env_and_config() {
        let dir = resolve_data_dir(
            Some(Path::new("/flag")),
            Some(PathBuf::from("/env")),
            Some(PathBuf::from("/config")),
            Some(PathBuf::from("/data")),
        )
        .expect("resolve");
        assert_eq!(dir, PathBuf::from("/flag"));
    }

    #[test]
    fn env_wins_over_config() {
        let dir = resolve_data_dir(
            None,
            Some(PathBuf::from("/env")),
            Some(PathBuf::from("/config")),
            None,
        )
        .expect("resolve");
        assert_eq!(dir, PathBuf::from("/env"));
    }

    #[test]
    fn empty_env_falls_through() {
        let dir = resolve_data_dir(
            None,
            Some(PathBuf::new()),
            Some(PathBuf::from("/config")),
            None,
        )
        .expect("resolve");
        assert_eq!(dir, PathBuf::from("/config"));
    }

    #[test]
    fn platform_dir_is_last_resort() {
        let dir =
            resolve_data_dir(None, None, None, Some(PathBuf::from("/data"))).expect("resolve");
        assert_eq!(dir, PathBuf::from("/data/tickety"));

        assert!(resolve_data_dir(None, None, None, None).is_err());
    }

    #[test]
    fn storage_key_defaults_when_blank() {
        let user = UserConfig {
            output: None,
            storage: StorageConfig {
                dir: None,
                key: Some("  ".to_string()),
            },
        };
        let cfg = resolve_config(Some(Path::new("/flag")), user).expect("resolve");
        assert_eq!(cfg.storage_key, DEFAULT_STORAGE_KEY);
        assert_eq!(cfg.data_dir, PathBuf::from("/flag"));
    }

    fn with_key(key: &str) -> UserConfig {
        UserConfig {
            output: None,
            storage: StorageConfig {
                dir: None,
                key: Some(key.to_string()),
            },
        }
    }

    #[test]
    fn storage_key_must_name_a_file() {
        for key in ["work/tickets", "../escape", ".hidden", "two words"] {
            let err = resolve_config(Some(Path::new("/flag")), with_key(key))
                .expect_err("key should be rejected");
            assert!(err.to_string().contains("storage.key"), "{key}: {err}");
        }

        let cfg = resolve_config(Some(Path::new("/flag")), with_key(" work-tickets.v2 "))
            .expect("plain key is accepted");
        assert_eq!(cfg.storage_key, "work-tickets.v2");
    }
}
