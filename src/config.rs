use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use reflights_creds::hasher::DEFAULT_COST;
use reflights_creds::pipeline::DEFAULT_INDENT;
use reflights_creds::Policy;

/// Source of a configuration value
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ConfigSource {
    Default,
    File,
    Environment,
    Argument,
}

impl std::fmt::Display for ConfigSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigSource::Default => write!(f, "default"),
            ConfigSource::File => write!(f, "file"),
            ConfigSource::Environment => write!(f, "environment"),
            ConfigSource::Argument => write!(f, "argument"),
        }
    }
}

/// A configuration value with its source
#[derive(Debug, Clone, Serialize)]
pub struct ConfigValue<T> {
    pub value: T,
    pub source: ConfigSource,
}

impl<T> ConfigValue<T> {
    pub fn new(value: T, source: ConfigSource) -> Self {
        Self { value, source }
    }

    /// Replaces the value if a command-line argument was given.
    pub fn override_with(&mut self, value: Option<T>) {
        if let Some(value) = value {
            *self = Self::new(value, ConfigSource::Argument);
        }
    }
}

/// Application configuration with source tracking
#[derive(Debug, Clone, Serialize)]
pub struct Config {
    /// Credentials file to read
    pub input_path: ConfigValue<PathBuf>,
    /// Where the hashed document is written
    pub output_path: ConfigValue<PathBuf>,
    /// bcrypt cost factor
    pub cost: ConfigValue<u32>,
    /// Validation policy for secondary admins, users and superuser
    pub policy: ConfigValue<Policy>,
    /// Indent width of the written JSON
    pub indent: ConfigValue<usize>,
    /// Config file path used (if any)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub config_file: Option<PathBuf>,
}

/// Internal struct for deserializing config file
#[derive(Debug, Deserialize, Default)]
#[serde(default)]
struct ConfigFile {
    input_path: Option<PathBuf>,
    output_path: Option<PathBuf>,
    cost: Option<u32>,
    policy: Option<Policy>,
    indent: Option<usize>,
}

impl Config {
    /// Load configuration with priority: env vars > config file > defaults
    pub fn load(config_path: Option<PathBuf>) -> Result<Self, ConfigError> {
        let mut input_path =
            ConfigValue::new(PathBuf::from("./config/meet_creds_2.json"), ConfigSource::Default);
        let mut output_path =
            ConfigValue::new(PathBuf::from("./config/meet_creds.json"), ConfigSource::Default);
        let mut cost = ConfigValue::new(DEFAULT_COST, ConfigSource::Default);
        let mut policy = ConfigValue::new(Policy::default(), ConfigSource::Default);
        let mut indent = ConfigValue::new(DEFAULT_INDENT, ConfigSource::Default);
        let mut config_file = None;

        // Try to load from config file
        let path = config_path.unwrap_or_else(Self::default_config_path);
        if path.exists() {
            let contents = std::fs::read_to_string(&path)
                .map_err(|e| ConfigError::ReadError(path.clone(), e))?;
            let file_config: ConfigFile = serde_yaml::from_str(&contents)
                .map_err(|e| ConfigError::ParseError(path.clone(), e))?;

            config_file = Some(path.clone());

            // Relative paths resolve against the config file's directory
            let resolve = |p: PathBuf| {
                if p.is_relative() {
                    path.parent().map(|dir| dir.join(&p)).unwrap_or(p)
                } else {
                    p
                }
            };

            if let Some(p) = file_config.input_path {
                input_path = ConfigValue::new(resolve(p), ConfigSource::File);
            }
            if let Some(p) = file_config.output_path {
                output_path = ConfigValue::new(resolve(p), ConfigSource::File);
            }
            if let Some(c) = file_config.cost {
                cost = ConfigValue::new(c, ConfigSource::File);
            }
            if let Some(p) = file_config.policy {
                policy = ConfigValue::new(p, ConfigSource::File);
            }
            if let Some(i) = file_config.indent {
                indent = ConfigValue::new(i, ConfigSource::File);
            }
        }

        // Apply environment variable overrides
        if let Ok(p) = std::env::var("REFLIGHTS_CREDS_INPUT") {
            input_path = ConfigValue::new(PathBuf::from(p), ConfigSource::Environment);
        }
        if let Ok(p) = std::env::var("REFLIGHTS_CREDS_OUTPUT") {
            output_path = ConfigValue::new(PathBuf::from(p), ConfigSource::Environment);
        }
        if let Ok(c) = std::env::var("REFLIGHTS_CREDS_COST") {
            let c = c
                .parse()
                .map_err(|_| ConfigError::InvalidEnv("REFLIGHTS_CREDS_COST", c.clone()))?;
            cost = ConfigValue::new(c, ConfigSource::Environment);
        }
        if let Ok(p) = std::env::var("REFLIGHTS_CREDS_POLICY") {
            let p = p
                .parse()
                .map_err(|_| ConfigError::InvalidEnv("REFLIGHTS_CREDS_POLICY", p.clone()))?;
            policy = ConfigValue::new(p, ConfigSource::Environment);
        }

        Ok(Self {
            input_path,
            output_path,
            cost,
            policy,
            indent,
            config_file,
        })
    }

    /// Default config directory (platform-specific):
    /// - Linux: ~/.config/reflights-creds/
    /// - macOS: ~/Library/Application Support/reflights-creds/
    /// - Windows: %APPDATA%/reflights-creds/
    pub fn default_config_dir() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("reflights-creds")
    }

    /// Default config file path (platform-specific config dir + config.yaml)
    pub fn default_config_path() -> PathBuf {
        Self::default_config_dir().join("config.yaml")
    }
}

#[derive(Debug)]
pub enum ConfigError {
    ReadError(PathBuf, std::io::Error),
    ParseError(PathBuf, serde_yaml::Error),
    InvalidEnv(&'static str, String),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::ReadError(path, e) => {
                write!(f, "Failed to read config file '{}': {}", path.display(), e)
            }
            ConfigError::ParseError(path, e) => {
                write!(f, "Failed to parse config file '{}': {}", path.display(), e)
            }
            ConfigError::InvalidEnv(name, value) => {
                write!(f, "Invalid value for {}: '{}'", name, value)
            }
        }
    }
}

impl std::error::Error for ConfigError {}
