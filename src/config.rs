use anyhow::Result;
use clap::Parser;
use serde::Deserialize;
use serde_yaml;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

pub const MEMORY_DATABASE: &str = ":memory:";

#[derive(Parser, Debug)]
#[command(name = "bookmarks")]
#[command(about = "Runs the bookmarks api service", long_about = None)]
pub struct Cli {
    #[arg(short = 'c', long = "config")]
    pub config_path: Option<String>,
}

pub fn default_config_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".bookmarks")
}

pub fn default_config_path() -> PathBuf {
    default_config_dir().join("config.yaml")
}

#[derive(Debug, Deserialize, Clone)]
pub struct App {
    database: String,
    port: u16,
    #[serde(default)]
    api_token: String,
}

impl App {
    pub fn get_db(&self) -> &str {
        &self.database
    }

    pub fn get_port(&self) -> u16 {
        self.port
    }

    pub fn get_api_token(&self) -> &str {
        &self.api_token
    }

    /// Resolves the configured database against the data directory.
    /// Absolute paths and `:memory:` are used as-is.
    pub fn database_location(&self, data_dir: &Path) -> String {
        let database = self.get_db();
        if database == MEMORY_DATABASE || Path::new(database).is_absolute() {
            return database.to_string();
        }
        data_dir.join(database).to_string_lossy().into_owned()
    }
}

#[derive(Debug, Deserialize)]
pub struct Config {
    pub app: App,
}

impl Config {
    pub fn new(path: &str) -> Result<Self> {
        let yaml_str = fs::read_to_string(path)?;
        Config::from_yaml(&yaml_str, |name| env::var(name).ok())
    }

    pub fn from_yaml<F>(yaml_str: &str, lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let yaml_with_env = Config::substitute_env_vars(yaml_str, lookup)?;
        let config: Config = serde_yaml::from_str(&yaml_with_env)?;

        if config.app.api_token.trim().is_empty() {
            anyhow::bail!("app.api_token must be set");
        }

        Ok(config)
    }

    fn substitute_env_vars<F>(yaml_str: &str, lookup: F) -> Result<String>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut result = yaml_str.to_string();
        let mut offset = 0;

        while let Some(start) = result[offset..].find("${") {
            let actual_start = offset + start;
            if let Some(end) = result[actual_start..].find("}") {
                let var_name = &result[actual_start + 2..actual_start + end];

                // ${VAR:-default}
                let env_value = if let Some(default_start) = var_name.find(":-") {
                    let actual_var = &var_name[..default_start];
                    let default_val = &var_name[default_start + 2..];
                    lookup(actual_var).unwrap_or_else(|| default_val.to_string())
                } else {
                    lookup(var_name).unwrap_or_else(|| {
                        tracing::warn!(var = var_name, "environment variable not found");
                        String::new()
                    })
                };

                result.replace_range(actual_start..actual_start + end + 1, &env_value);
                offset = actual_start + env_value.len();
            } else {
                break;
            }
        }

        Ok(result)
    }
}
