//! Configuration management for regcreator
//!
//! Supports loading configuration from:
//! - Default values
//! - Config file (regcreator.toml)
//! - Environment variables (REGCREATOR__*)
//!
//! ## Example config file (regcreator.toml):
//! ```toml
//! [output]
//! remove_suffix = "-remove"
//! write_remove_file = true
//! line_ending = "crlf"
//!
//! [header]
//! comments = ["Context menu for the pipeline tools"]
//! ```

use config_crate::{Config, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};

use crate::regfile::LineEnding;

/// Main configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RegConfig {
    /// Output settings
    #[serde(default)]
    pub output: OutputConfig,

    /// Header settings
    #[serde(default)]
    pub header: HeaderConfig,
}

/// Output configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Suffix appended to the file stem of the removal file
    #[serde(default = "default_remove_suffix")]
    pub remove_suffix: String,

    /// Also write the removal file
    #[serde(default = "default_true")]
    pub write_remove_file: bool,

    /// Line terminator of generated files
    #[serde(default)]
    pub line_ending: LineEnding,
}

/// Header comment configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct HeaderConfig {
    /// Comments added to the header of every generated file
    #[serde(default)]
    pub comments: Vec<String>,
}

fn default_remove_suffix() -> String {
    "-remove".to_string()
}

fn default_true() -> bool {
    true
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            remove_suffix: default_remove_suffix(),
            write_remove_file: true,
            line_ending: LineEnding::Lf,
        }
    }
}

impl RegConfig {
    /// Load configuration from default locations
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(None)
    }

    /// Load configuration, with an optional explicit file taking precedence
    /// over the default locations
    pub fn load_from(config_path: Option<&str>) -> Result<Self, ConfigError> {
        let mut builder = Config::builder();

        let config_locations = [
            "regcreator.toml",
            ".regcreator.toml",
            "config/regcreator.toml",
        ];

        for location in config_locations {
            builder = builder.add_source(File::with_name(location).required(false));
        }

        // XDG config directory
        if let Some(config_dir) = directories::ProjectDirs::from("dev", "regcreator", "regcreator") {
            let xdg_config = config_dir.config_dir().join("regcreator.toml");
            if xdg_config.exists() {
                builder = builder.add_source(File::from(xdg_config).required(false));
            }
        }

        if let Some(path) = config_path {
            builder = builder.add_source(File::with_name(path).required(true));
        }

        // REGCREATOR__OUTPUT__REMOVE_SUFFIX=-undo
        builder = builder.add_source(
            Environment::with_prefix("REGCREATOR")
                .prefix_separator("__")
                .separator("__")
                .try_parsing(true),
        );

        let config = builder.build()?;
        config.try_deserialize()
    }

    /// Save configuration to a file
    pub fn save(&self, path: &str) -> std::io::Result<()> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;
        std::fs::write(path, content)
    }
}
