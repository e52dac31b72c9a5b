//! Configuration system
//!
//! Every tunable constant of the cage lives in a serde-backed struct whose
//! `Default` reproduces the reference arena. Files are TOML or RON, picked by
//! extension.

mod settings;

pub use serde::{Serialize, Deserialize};
pub use settings::{CageConfig, WorldConfig, EaterConfig, SensorConfig};

/// On-disk formats, picked by file extension
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    /// `.toml`
    Toml,
    /// `.ron`
    Ron,
}

impl Format {
    /// Format of `path`, if its extension is known
    pub fn of(path: &str) -> Result<Self, ConfigError> {
        match std::path::Path::new(path).extension().and_then(|e| e.to_str()) {
            Some("toml") => Ok(Self::Toml),
            Some("ron") => Ok(Self::Ron),
            _ => Err(ConfigError::UnsupportedFormat(path.to_string())),
        }
    }
}

/// Loadable and savable settings
pub trait Config: Serialize + for<'de> Deserialize<'de> + Default {
    /// Parse settings from `path`; missing fields take their defaults
    fn load_from_file(path: &str) -> Result<Self, ConfigError> {
        let format = Format::of(path)?;
        let contents = std::fs::read_to_string(path)?;
        match format {
            Format::Toml => {
                toml::from_str(&contents).map_err(|e| ConfigError::Parse(e.to_string()))
            }
            Format::Ron => ron::from_str(&contents).map_err(|e| ConfigError::Parse(e.to_string())),
        }
    }

    /// Write settings to `path`
    fn save_to_file(&self, path: &str) -> Result<(), ConfigError> {
        let contents = match Format::of(path)? {
            Format::Toml => {
                toml::to_string_pretty(self).map_err(|e| ConfigError::Serialize(e.to_string()))?
            }
            Format::Ron => ron::ser::to_string_pretty(self, ron::ser::PrettyConfig::default())
                .map_err(|e| ConfigError::Serialize(e.to_string()))?,
        };
        std::fs::write(path, contents)?;
        Ok(())
    }
}

impl Config for CageConfig {}

/// Errors raised while loading or saving settings
#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    /// Reading or writing the file failed
    #[error("config file I/O failed: {0}")]
    Io(#[from] std::io::Error),
    
    /// The file content does not match the settings layout
    #[error("config parse failed: {0}")]
    Parse(String),
    
    /// The settings could not be written in the requested format
    #[error("config serialization failed: {0}")]
    Serialize(String),
    
    /// Neither `.toml` nor `.ron`
    #[error("unsupported config format: {0}")]
    UnsupportedFormat(String),
}
