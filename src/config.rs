use anyhow::{anyhow, Result};
use config::Config;
use serde::Serialize;
use std::collections::HashMap;
use std::path::Path;

/// Library configuration
///
/// Resolves where the cache database lives. Values come from an optional TOML
/// file and from `OTACACHE_`-prefixed environment variables, with the
/// environment taking precedence.
#[derive(Debug, Clone, Serialize)]
pub struct OtaCacheConfig {
    /// Path to the directory that holds the cache database and any archived
    /// copies of corrupted database files.
    pub data_dir: String,
}

const EMPTY_CONFIG: &str = r#"### otacache configuration file

### directory for the update cache database
# data_dir = "~/.otacache"
"#;

impl Default for OtaCacheConfig {
    fn default() -> Self {
        let home_dir = dirs::home_dir()
            .map(|h| h.to_string_lossy().to_string())
            .unwrap_or_else(|| ".".to_string());

        Self {
            data_dir: format!("{}/.otacache", home_dir),
        }
    }
}

impl OtaCacheConfig {
    /// Create and initialize a new configuration
    ///
    /// With `path` set, that TOML file is loaded (and created with a commented
    /// template if missing). Without it, `~/.otacache/otacache.toml` is used.
    /// `OTACACHE_DATA_DIR` overrides the file in either case.
    pub fn new(path: &Option<String>) -> Result<OtaCacheConfig> {
        let mut builder = Config::builder();

        let home_dir = dirs::home_dir()
            .ok_or_else(|| anyhow!("Could not find home directory"))?
            .to_str()
            .ok_or_else(|| anyhow!("Could not convert home directory path to string"))?
            .to_owned();

        let default_dir = format!("{}/.otacache", home_dir.as_str());

        match path {
            Some(p) => {
                let path = Path::new(p.as_str());
                if path.exists() {
                    let path_str = path
                        .to_str()
                        .ok_or_else(|| anyhow!("Could not convert path to string"))?;
                    builder = builder.add_source(config::File::with_name(path_str));
                } else {
                    std::fs::write(p.as_str(), EMPTY_CONFIG)
                        .map_err(|e| anyhow!("Unable to create config file: {}", e))?;
                }
            }
            None => {
                std::fs::create_dir_all(default_dir.as_str())
                    .map_err(|e| anyhow!("Unable to create otacache directory: {}", e))?;
                let p = format!("{}/otacache.toml", default_dir.as_str());
                if Path::new(p.as_str()).exists() {
                    builder = builder.add_source(config::File::with_name(p.as_str()));
                } else {
                    std::fs::write(p.as_str(), EMPTY_CONFIG).map_err(|e| {
                        anyhow!("Unable to create config file {}: {}", p.as_str(), e)
                    })?;
                }
            }
        }

        // Settings from the environment, e.g. OTACACHE_DATA_DIR=/tmp/cache
        builder = builder.add_source(config::Environment::with_prefix("OTACACHE"));

        let settings = builder
            .build()
            .map_err(|e| anyhow!("Failed to build configuration: {}", e))?;

        let config = settings
            .try_deserialize::<HashMap<String, String>>()
            .map_err(|e| anyhow!("Failed to deserialize configuration: {}", e))?;

        let data_dir = match config.get("data_dir") {
            Some(p) => p.trim_end_matches('/').to_string(),
            None => default_dir,
        };

        Ok(OtaCacheConfig { data_dir })
    }
}
