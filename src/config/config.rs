use serde::Deserialize;
use std::fs;
use std::io;
use std::path::Path;

use once_cell::sync::Lazy;
use std::sync::Mutex;
use tracing::{info, warn};

pub static CONFIG: Lazy<Mutex<Config>> = Lazy::new(|| Mutex::new(Config::load(None)));

#[derive(Deserialize, Debug, Clone)]
pub struct Config {
    #[serde(default = "default_listen_host")]
    pub listen_host: String,

    #[serde(default = "default_listen_port")]
    pub listen_port: u16,

    #[serde(default = "default_records_path")]
    pub records_path: String,
}

fn default_listen_host() -> String {
    "0.0.0.0".to_string()
}

fn default_listen_port() -> u16 {
    8080
}

fn default_records_path() -> String {
    "records.json".to_string()
}

impl Config {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, Box<dyn std::error::Error>> {
        let content = fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }

    pub fn load(config_path: Option<&str>) -> Self {
        let default_paths = vec!["config.toml", "/etc/callhome/config.toml"];

        let paths = if let Some(path) = config_path {
            vec![path]
                .into_iter()
                .chain(default_paths.into_iter())
                .collect()
        } else {
            default_paths
        };

        for path in paths {
            match Self::from_file(path) {
                Ok(config) => {
                    info!("config loaded from {}", path);
                    return config;
                }
                Err(err) => {
                    if let Some(io_err) = err.downcast_ref::<io::Error>() {
                        if io_err.kind() == io::ErrorKind::NotFound {
                            continue;
                        }
                    }
                    warn!("{} failed to load: {}", path, err);
                }
            }
        }

        info!("falling back to default config");
        Config {
            listen_host: default_listen_host(),
            listen_port: default_listen_port(),
            records_path: default_records_path(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn defaults_when_no_file_found() {
        let config = Config::load(Some("/nonexistent/callhome.toml"));
        assert_eq!(config.listen_host, "0.0.0.0");
        assert_eq!(config.listen_port, 8080);
        assert_eq!(config.records_path, "records.json");
    }

    #[test]
    fn partial_file_fills_in_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "listen_port = 9000").unwrap();

        let config = Config::from_file(file.path()).unwrap();
        assert_eq!(config.listen_port, 9000);
        assert_eq!(config.listen_host, "0.0.0.0");
        assert_eq!(config.records_path, "records.json");
    }

    #[test]
    fn full_file_overrides_everything() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            "listen_host = \"127.0.0.1\"\nlisten_port = 3000\nrecords_path = \"/var/lib/callhome/records.json\""
        )
        .unwrap();

        let config = Config::from_file(file.path()).unwrap();
        assert_eq!(config.listen_host, "127.0.0.1");
        assert_eq!(config.listen_port, 3000);
        assert_eq!(config.records_path, "/var/lib/callhome/records.json");
    }
}
