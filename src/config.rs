use std::{
    collections::HashMap,
    path::{Path, PathBuf},
};

use config::{Config, ConfigError, Environment, File, FileFormat};
use home::home_dir;
use serde::Deserialize;

const CONFIG_FILE: &str = ".artifetch/config.toml";

pub struct ArtifetchConfig {
    pub local_repository: Option<PathBuf>,
    pub remote_repositories: Option<Vec<String>>,
    pub offline: Option<bool>,
}

impl ArtifetchConfig {
    /// Reads `config_file` (or `$HOME/.artifetch/config.toml` if present) and
    /// `ARTIFETCH_*` environment variables, the latter taking precedence.
    pub fn load(config_file: Option<&Path>) -> anyhow::Result<Self> {
        let file = match config_file {
            Some(path) => Some((path.to_path_buf(), true)),
            None => home_dir().map(|home| (home.join(CONFIG_FILE), false)),
        };
        let raw_config = RawConfig::load(file, None)?;

        Ok(Self {
            local_repository: raw_config.repository.local,
            remote_repositories: raw_config.repository.remote.map(StringList::into_vec),
            offline: raw_config.repository.offline,
        })
    }
}

#[derive(Default, Debug, Deserialize, PartialEq, Eq)]
struct RawConfig {
    #[serde(default)]
    repository: RepositoryConfig,
}

#[derive(Default, Debug, Deserialize, PartialEq, Eq)]
struct RepositoryConfig {
    local: Option<PathBuf>,
    remote: Option<StringList>,
    offline: Option<bool>,
}

/// A TOML array, or a comma-separated string as found in the environment.
#[derive(Debug, Deserialize, PartialEq, Eq)]
#[serde(untagged)]
enum StringList {
    Many(Vec<String>),
    One(String),
}

impl StringList {
    fn into_vec(self) -> Vec<String> {
        match self {
            StringList::Many(values) => values,
            StringList::One(value) => value
                .split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_owned)
                .collect(),
        }
    }
}

impl RawConfig {
    fn load(
        file: Option<(PathBuf, bool)>,
        env: Option<HashMap<String, String>>,
    ) -> Result<Self, ConfigError> {
        let mut builder = Config::builder();
        if let Some((path, required)) = file {
            builder = builder.add_source(
                File::from(path.as_path())
                    .format(FileFormat::Toml)
                    .required(required),
            );
        }
        builder
            .add_source(
                Environment::with_prefix("ARTIFETCH")
                    .separator("_")
                    .source(env),
            )
            .build()?
            .try_deserialize()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use pretty_assertions::assert_eq;

    #[test]
    fn load_empty() {
        let env = HashMap::from([]);
        let config = RawConfig::load(None, Some(env)).unwrap();
        assert_eq!(
            config,
            RawConfig {
                repository: RepositoryConfig {
                    local: None,
                    remote: None,
                    offline: None
                }
            }
        )
    }

    #[test]
    fn load_environment() {
        let env = HashMap::from([
            ("ARTIFETCH_REPOSITORY_LOCAL".to_owned(), "/repo".to_owned()),
            (
                "ARTIFETCH_REPOSITORY_REMOTE".to_owned(),
                "https://a.example/maven2, https://b.example/maven2".to_owned(),
            ),
            ("ARTIFETCH_REPOSITORY_OFFLINE".to_owned(), "true".to_owned()),
        ]);
        let config = RawConfig::load(None, Some(env)).unwrap();
        assert_eq!(config.repository.local, Some("/repo".into()));
        assert_eq!(config.repository.offline, Some(true));
        assert_eq!(
            config.repository.remote.map(StringList::into_vec),
            Some(vec![
                "https://a.example/maven2".to_owned(),
                "https://b.example/maven2".to_owned()
            ])
        );
    }

    #[test]
    fn load_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(
            &path,
            r#"
[repository]
local = "/from/file"
remote = ["https://a.example/maven2", "/srv/mirror"]
"#,
        )
        .unwrap();

        let config = RawConfig::load(Some((path, true)), Some(HashMap::new())).unwrap();
        assert_eq!(config.repository.local, Some("/from/file".into()));
        assert_eq!(
            config.repository.remote.map(StringList::into_vec),
            Some(vec![
                "https://a.example/maven2".to_owned(),
                "/srv/mirror".to_owned()
            ])
        );
    }

    #[test]
    fn environment_overrides_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[repository]\nlocal = \"/from/file\"\noffline = false\n").unwrap();
        let env = HashMap::from([("ARTIFETCH_REPOSITORY_LOCAL".to_owned(), "/from/env".to_owned())]);

        let config = RawConfig::load(Some((path, true)), Some(env)).unwrap();
        assert_eq!(config.repository.local, Some("/from/env".into()));
        assert_eq!(config.repository.offline, Some(false));
    }

    #[test]
    fn missing_optional_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("absent.toml");
        assert!(RawConfig::load(Some((path.clone(), false)), Some(HashMap::new())).is_ok());
        assert!(RawConfig::load(Some((path, true)), Some(HashMap::new())).is_err());
    }
}
