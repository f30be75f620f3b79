use std::env;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::{Paths, ScadaConfig};

/// Configuration loader with a builder pattern, modeled on the layered
/// source precedence described in §7.4.
pub struct ConfigLoader {
    project_dir: PathBuf,
    env_prefix: String,
}

impl ConfigLoader {
    pub fn new() -> Self {
        Self {
            project_dir: env::current_dir().unwrap_or_else(|_| PathBuf::from(".")),
            env_prefix: "SCADA".to_string(),
        }
    }

    pub fn with_project_dir(mut self, dir: impl AsRef<Path>) -> Self {
        self.project_dir = dir.as_ref().to_path_buf();
        self
    }

    pub fn with_env_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.env_prefix = prefix.into();
        self
    }

    pub fn load(self) -> Result<ScadaConfig> {
        let mut builder = config::Config::builder();

        let defaults = ScadaConfig::default();
        builder = builder.add_source(config::Config::try_from(&defaults)?);

        let paths = Paths::new();
        if let Ok(user_config_file) = paths.user_config_file() {
            if user_config_file.exists() {
                builder = builder.add_source(
                    config::File::from(user_config_file).required(false).format(config::FileFormat::Toml),
                );
            }
        }

        let project_config_file = Paths::project_config_file(&self.project_dir);
        if project_config_file.exists() {
            builder = builder.add_source(
                config::File::from(project_config_file).required(false).format(config::FileFormat::Toml),
            );
        }

        let local_config_file = Paths::local_config_file(&self.project_dir);
        if local_config_file.exists() {
            builder = builder.add_source(
                config::File::from(local_config_file).required(false).format(config::FileFormat::Toml),
            );
        }

        builder = builder.add_source(
            config::Environment::with_prefix(&self.env_prefix).separator("_").try_parsing(true),
        );

        let built = builder.build().context("failed to build configuration")?;
        built.try_deserialize().context("failed to deserialize configuration")
    }

    pub fn load_or_default(self) -> ScadaConfig {
        self.load().unwrap_or_default()
    }
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn loads_defaults_with_no_files_present() {
        let temp = tempdir().unwrap();
        let config = ConfigLoader::new().with_project_dir(temp.path()).load().unwrap();
        assert_eq!(config.supervisor.bind_addr, "0.0.0.0:7000");
        assert_eq!(config.reactor.lim_br10, 1000);
    }

    #[test]
    fn project_file_overrides_defaults() {
        let temp = tempdir().unwrap();
        fs::write(
            temp.path().join("scada.toml"),
            r#"
[reactor]
bind_addr = "0.0.0.0:9100"
unit_id = 3

[thresholds]
high_temp_k = 1500.0
"#,
        )
        .unwrap();

        let config = ConfigLoader::new().with_project_dir(temp.path()).load().unwrap();
        assert_eq!(config.reactor.bind_addr, "0.0.0.0:9100");
        assert_eq!(config.reactor.unit_id, 3);
        assert_eq!(config.thresholds.high_temp_k, 1500.0);
        // untouched fields keep their defaults
        assert_eq!(config.reactor.lim_br10, 1000);
    }

    #[test]
    fn local_file_overrides_project_file() {
        let temp = tempdir().unwrap();
        fs::write(temp.path().join("scada.toml"), "[supervisor]\nbind_addr = \"0.0.0.0:7000\"\n").unwrap();
        fs::write(temp.path().join("scada.local.toml"), "[supervisor]\nbind_addr = \"0.0.0.0:7999\"\n")
            .unwrap();

        let config = ConfigLoader::new().with_project_dir(temp.path()).load().unwrap();
        assert_eq!(config.supervisor.bind_addr, "0.0.0.0:7999");
    }
}
