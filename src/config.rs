//! Configuration types for tnnlib.

use serde::Deserialize;

/// Top-level configuration.
#[derive(Debug, Default, Deserialize)]
pub struct Config {
    /// Wrapper library configuration.
    #[serde(default)]
    pub library: LibraryConfig,

    /// Model configuration.
    #[serde(default)]
    pub model: ModelConfig,
}

/// Wrapper library configuration.
#[derive(Debug, Default, Deserialize)]
pub struct LibraryConfig {
    /// Explicit path to the wrapper library. When unset, the library is
    /// loaded by its fixed name from the platform search path.
    #[serde(default)]
    pub path: Option<String>,
}

/// Model configuration.
#[derive(Debug, Deserialize)]
pub struct ModelConfig {
    /// Path to the model description (proto) file.
    #[serde(default)]
    pub proto_path: Option<String>,

    /// Path to the model weights file.
    #[serde(default)]
    pub model_path: Option<String>,

    /// Device string passed through to the engine.
    #[serde(default = "default_device")]
    pub device: String,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            proto_path: None,
            model_path: None,
            device: default_device(),
        }
    }
}

fn default_device() -> String {
    crate::binding::device::ARM.to_string()
}

impl Config {
    /// Load configuration from a YAML file.
    pub fn from_yaml_file(path: impl AsRef<std::path::Path>) -> crate::error::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = serde_yaml::from_str(&content)?;
        Ok(config)
    }

    /// Load configuration from a YAML string.
    pub fn from_yaml_str(yaml: &str) -> crate::error::Result<Self> {
        let config: Config = serde_yaml::from_str(yaml)?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = Config::default();
        assert!(config.library.path.is_none());
        assert!(config.model.proto_path.is_none());
        assert_eq!(config.model.device, "ARM");
    }

    #[test]
    fn parse_yaml() {
        let yaml = r#"
library:
  path: /opt/tnn/libtnn_wrapper.so
model:
  proto_path: squeezenet.tnnproto
  model_path: squeezenet.tnnmodel
  device: OPENCL
"#;
        let config = Config::from_yaml_str(yaml).unwrap();
        assert_eq!(
            config.library.path.as_deref(),
            Some("/opt/tnn/libtnn_wrapper.so")
        );
        assert_eq!(config.model.proto_path.as_deref(), Some("squeezenet.tnnproto"));
        assert_eq!(config.model.device, "OPENCL");
    }

    #[test]
    fn partial_yaml_fills_defaults() {
        let config = Config::from_yaml_str("model:\n  proto_path: a.tnnproto\n").unwrap();
        assert!(config.library.path.is_none());
        assert_eq!(config.model.device, "ARM");
    }
}
