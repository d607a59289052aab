//! Configuration loading and validation

mod schema;

pub use schema::*;

use anyhow::{Context, Result};
use std::path::Path;

/// Load configuration from a YAML file
pub fn load_config(path: &Path) -> Result<TanpuraConfig> {
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read config: {:?}", path))?;
    let config: TanpuraConfig = serde_yaml::from_str(&contents)?;
    config.validate()?;
    Ok(config)
}

/// Load `path` if it exists, otherwise fall back to defaults
pub fn load_or_default(path: &Path) -> Result<TanpuraConfig> {
    if path.exists() {
        load_config(path)
    } else {
        Ok(TanpuraConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_load_minimal_config() {
        let yaml = r#"
audio:
  sample_rate: 48000
  buffer_size: 256

drone:
  note: "G2"
  volume: 0.7
"#;
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(yaml.as_bytes()).unwrap();

        let config = load_config(file.path()).unwrap();
        assert_eq!(config.audio.sample_rate, 48000);
        assert_eq!(config.drone.note, "G2");
        assert_eq!(config.drone.volume, 0.7);
        assert_eq!(config.drone.reference_a4, 440.0);
    }

    #[test]
    fn test_load_empty_sections() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(b"{}").unwrap();

        let config = load_config(file.path()).unwrap();
        assert_eq!(config.audio.sample_rate, 44100);
        assert_eq!(config.drone.note, "A3");
    }

    #[test]
    fn test_load_rejects_invalid() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(b"drone:\n  smoothing_factor: 2.0\n").unwrap();

        assert!(load_config(file.path()).is_err());
    }

    #[test]
    fn test_example_config_is_valid() {
        let config: TanpuraConfig =
            serde_yaml::from_str(include_str!("../../tanpura.example.yaml")).unwrap();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_missing_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = load_or_default(&dir.path().join("tanpura.yaml")).unwrap();
        assert_eq!(config.drone.smoothing_factor, 0.002);
    }
}
