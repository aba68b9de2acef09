use anyhow::{Context, Result};
use serde::Deserialize;
use std::{fs, path::PathBuf};
use tokio::net::TcpListener;

pub const CONFIG_ENV: &str = "BIKE_DEMAND_CONFIG";

/// Optional JSON file; any field left out falls back to the environment.
#[derive(Deserialize, Debug, Default)]
pub struct FileConfig {
    pub model_path: Option<PathBuf>,
    pub meta_path: Option<PathBuf>,
    pub bind_addr: Option<String>,
    pub port: Option<u16>,
    pub log_predictions: Option<bool>,
}

impl FileConfig {
    pub fn load(path: &str) -> Result<Self> {
        let data = fs::read_to_string(path)
            .with_context(|| format!("config file not found at {path}"))?;
        serde_json::from_str(&data).with_context(|| format!("invalid config JSON in {path}"))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    pub model_path: PathBuf,
    pub meta_path: PathBuf,
    pub bind_addr: String,
    pub port: u16,
    /// Log a summary of every feature vector sent to the model.
    pub log_predictions: bool,
}

impl AppConfig {
    pub fn from_env() -> Result<Self> {
        let file = match std::env::var(CONFIG_ENV) {
            Ok(path) => FileConfig::load(&path)?,
            Err(_) => FileConfig::default(),
        };
        Self::resolve(file, |k| std::env::var(k).ok())
    }

    /// Environment wins over the file.
    pub fn resolve(file: FileConfig, env: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let model_path = env("MODEL_PATH")
            .map(PathBuf::from)
            .or(file.model_path)
            .context("MODEL_PATH not set")?;
        let meta_path = env("META_PATH")
            .map(PathBuf::from)
            .or(file.meta_path)
            .context("META_PATH not set")?;
        let port = match env("PORT") {
            Some(s) => s.parse().with_context(|| format!("invalid PORT {s:?}"))?,
            None => file.port.unwrap_or(8080),
        };
        let bind_addr = env("BIND_ADDR")
            .or(file.bind_addr)
            .unwrap_or_else(|| "0.0.0.0".to_string());
        let log_predictions = match env("LOG_PRED") {
            Some(v) => v == "1",
            None => file.log_predictions.unwrap_or(false),
        };

        Ok(Self {
            model_path,
            meta_path,
            bind_addr,
            port,
            log_predictions,
        })
    }

    /// Binds the listener. `bind_addr` may be an IP or a host name.
    pub async fn listen(&self) -> Result<TcpListener> {
        TcpListener::bind((self.bind_addr.as_str(), self.port))
            .await
            .with_context(|| format!("failed to bind {}:{}", self.bind_addr, self.port))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |k: &str| map.get(k).cloned()
    }

    #[test]
    fn env_only() {
        let cfg = AppConfig::resolve(
            FileConfig::default(),
            env(&[("MODEL_PATH", "m.pt"), ("META_PATH", "meta.json")]),
        )
        .unwrap();
        assert_eq!(cfg.model_path, PathBuf::from("m.pt"));
        assert_eq!(cfg.port, 8080);
        assert!(!cfg.log_predictions);
        assert_eq!(cfg.bind_addr, "0.0.0.0");
    }

    #[tokio::test]
    async fn host_name_bind_addr_listens() {
        let cfg = AppConfig::resolve(
            FileConfig::default(),
            env(&[("MODEL_PATH", "m"), ("META_PATH", "j"), ("BIND_ADDR", "localhost"), ("PORT", "0")]),
        )
        .unwrap();
        let listener = cfg.listen().await.unwrap();
        assert!(listener.local_addr().unwrap().ip().is_loopback());
    }

    #[test]
    fn env_overrides_file() {
        let file: FileConfig = serde_json::from_str(
            r#"{"model_path":"file.pt","meta_path":"file.json","port":9000,"log_predictions":true}"#,
        )
        .unwrap();
        let cfg = AppConfig::resolve(file, env(&[("MODEL_PATH", "env.pt"), ("LOG_PRED", "0")])).unwrap();
        assert_eq!(cfg.model_path, PathBuf::from("env.pt"));
        assert_eq!(cfg.meta_path, PathBuf::from("file.json"));
        assert_eq!(cfg.port, 9000);
        assert!(!cfg.log_predictions);
    }

    #[test]
    fn missing_model_path_is_an_error() {
        let err = AppConfig::resolve(FileConfig::default(), env(&[("META_PATH", "m.json")])).unwrap_err();
        assert!(err.to_string().contains("MODEL_PATH"));
    }

    #[test]
    fn bad_port_is_an_error() {
        let res = AppConfig::resolve(
            FileConfig::default(),
            env(&[("MODEL_PATH", "m"), ("META_PATH", "j"), ("PORT", "eighty")]),
        );
        assert!(res.is_err());
    }
}
