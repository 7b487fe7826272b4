// config.rs

use std::fs::{File, create_dir_all};
use std::io::{self, BufReader, BufWriter};
use std::path::{Path, PathBuf};

use directories::ProjectDirs;
use serde::{Deserialize, Serialize};

/// Connection settings for the hosted backend, persisted between runs.
///
/// The access token is written back after a successful sign-in so a restart
/// picks up the same session; it is validated against the backend before use.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct GatewayConfig {
    pub base_url: String,
    pub anon_key: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub access_token: Option<String>,
}

impl GatewayConfig {
    pub fn is_complete(&self) -> bool {
        !self.base_url.trim().is_empty() && !self.anon_key.trim().is_empty()
    }

    /// Environment variables win over the config file so the client can be
    /// pointed at another deployment without editing state on disk.
    pub fn apply_env(&mut self) {
        if let Ok(url) = std::env::var("MYTODO_URL") {
            if !url.trim().is_empty() {
                self.base_url = url;
            }
        }
        if let Ok(key) = std::env::var("MYTODO_ANON_KEY") {
            if !key.trim().is_empty() {
                self.anon_key = key;
            }
        }
    }
}

pub fn config_dir() -> PathBuf {
    ProjectDirs::from("", "", "MyTodoTui")
        .map(|dirs| dirs.config_dir().to_path_buf())
        .unwrap_or_else(|| PathBuf::from("."))
}

pub fn config_path() -> PathBuf {
    config_dir().join("gateway.json")
}

pub fn log_path() -> PathBuf {
    config_dir().join("mytodo.log")
}

pub fn load_from<P: AsRef<Path>>(path: P) -> Option<GatewayConfig> {
    let file = File::open(path).ok()?;
    let reader = BufReader::new(file);
    serde_json::from_reader(reader).ok()
}

pub fn save_to<P: AsRef<Path>>(path: P, cfg: &GatewayConfig) -> io::Result<()> {
    if let Some(dir) = path.as_ref().parent() {
        create_dir_all(dir)?;
    }
    let file = File::create(path)?;
    let writer = BufWriter::new(file);
    serde_json::to_writer_pretty(writer, cfg).map_err(io::Error::other)
}

/// Loads the persisted config (or an empty one), then applies env overrides.
pub fn load() -> GatewayConfig {
    let mut cfg = load_from(config_path()).unwrap_or_default();
    cfg.apply_env();
    cfg
}

pub fn save(cfg: &GatewayConfig) -> io::Result<()> {
    save_to(config_path(), cfg)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn config_round_trips_through_disk() {
        let temp = tempdir().expect("tempdir");
        let path = temp.path().join("nested").join("gateway.json");

        let cfg = GatewayConfig {
            base_url: "https://example.supabase.co".to_string(),
            anon_key: "anon".to_string(),
            email: "me@example.com".to_string(),
            access_token: Some("jwt".to_string()),
        };
        save_to(&path, &cfg).expect("save config");

        let loaded = load_from(&path).expect("load config");
        assert_eq!(loaded.base_url, cfg.base_url);
        assert_eq!(loaded.anon_key, cfg.anon_key);
        assert_eq!(loaded.email, cfg.email);
        assert_eq!(loaded.access_token, cfg.access_token);
        assert!(loaded.is_complete());
    }

    #[test]
    fn missing_file_yields_none() {
        let temp = tempdir().expect("tempdir");
        assert!(load_from(temp.path().join("absent.json")).is_none());
    }
}
