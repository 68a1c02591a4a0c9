use std::path::{Path, PathBuf};

use log::{error, info};
use thiserror::Error;

use crate::{
    archive::{ArchiveExtractor, ExtractError},
    model::ResolvedArtifact,
};

#[derive(Error, Debug)]
pub enum MaterializeError {
    #[error("Artifact file not resolved for artifact: {0}")]
    FileNotResolved(String),
    #[error("Cannot name {count} artifacts `{name}`: an output file name needs a single artifact")]
    ExplicitNameConflict { name: String, count: usize },
    #[error("Could not create output directory {path}: {source}")]
    OutputDirectory {
        path: String,
        source: std::io::Error,
    },
    #[error("Error copying the file of {artifact}: {source}")]
    Copy {
        artifact: String,
        source: std::io::Error,
    },
    #[error("Error unpacking {artifact}: {source}")]
    Extract {
        artifact: String,
        source: ExtractError,
    },
    #[error("{} artifacts could not be materialized: {}", .0.len(), join_errors(.0))]
    Multiple(Vec<MaterializeError>),
}

fn join_errors(errors: &[MaterializeError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

/// Places resolved artifacts into an output directory, copied or unpacked.
pub struct ArtifactMaterializer<E> {
    extractor: E,
}

impl<E: ArchiveExtractor> ArtifactMaterializer<E> {
    pub fn new(extractor: E) -> Self {
        Self { extractor }
    }

    /// Copies (or, with `unpack`, extracts) every artifact into `output_directory`.
    ///
    /// Every artifact is attempted; artifacts placed before a failure stay in place.
    /// `explicit_name` renames the copied file and is ignored when unpacking.
    pub fn materialize(
        &self,
        artifacts: &[ResolvedArtifact],
        output_directory: &Path,
        unpack: bool,
        explicit_name: Option<&str>,
    ) -> Result<(), MaterializeError> {
        let explicit_name = explicit_name.filter(|name| !name.is_empty());
        if let Some(name) = explicit_name {
            if !unpack && artifacts.len() > 1 {
                return Err(MaterializeError::ExplicitNameConflict {
                    name: name.to_owned(),
                    count: artifacts.len(),
                });
            }
        }

        create_output_directory(output_directory)?;

        let mut failures = Vec::new();
        for artifact in artifacts {
            match self.materialize_one(artifact, output_directory, unpack, explicit_name) {
                Ok(path) => info!("Placed {} at {}", artifact.coordinate, path.display()),
                Err(err) => {
                    error!("{}", err);
                    failures.push(err);
                }
            }
        }

        match failures.len() {
            0 => Ok(()),
            1 => Err(failures.remove(0)),
            _ => Err(MaterializeError::Multiple(failures)),
        }
    }

    fn materialize_one(
        &self,
        artifact: &ResolvedArtifact,
        output_directory: &Path,
        unpack: bool,
        explicit_name: Option<&str>,
    ) -> Result<PathBuf, MaterializeError> {
        let file = artifact
            .existing_file()
            .ok_or_else(|| MaterializeError::FileNotResolved(artifact.coordinate.to_string()))?;

        if unpack {
            self.extractor
                .extract(file, output_directory)
                .map_err(|source| MaterializeError::Extract {
                    artifact: artifact.coordinate.to_string(),
                    source,
                })?;
            return Ok(output_directory.to_path_buf());
        }

        let file_name = match explicit_name {
            Some(name) => name.into(),
            None => file
                .file_name()
                .map(|name| name.to_os_string())
                .ok_or_else(|| MaterializeError::FileNotResolved(artifact.coordinate.to_string()))?,
        };
        let destination = output_directory.join(file_name);
        std::fs::copy(file, &destination).map_err(|source| MaterializeError::Copy {
            artifact: artifact.coordinate.to_string(),
            source,
        })?;
        Ok(destination)
    }
}

/// Creates `path` and its parents if absent.
pub fn create_output_directory(path: &Path) -> Result<(), MaterializeError> {
    if !path.is_dir() {
        std::fs::create_dir_all(path).map_err(|source| MaterializeError::OutputDirectory {
            path: path.display().to_string(),
            source,
        })?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::{
        archive::{tests::write_zip, DefaultArchiveExtractor},
        model::ArtifactCoordinate,
    };

    use pretty_assertions::assert_eq;

    fn artifact(dir: &Path, coordinate: &str, content: &str) -> ResolvedArtifact {
        let coordinate: ArtifactCoordinate = coordinate.parse().unwrap();
        let file = dir.join(coordinate.file_name(&coordinate.version));
        std::fs::write(&file, content).unwrap();
        let version = coordinate.version.clone();
        ResolvedArtifact::new(coordinate, file, version)
    }

    fn missing(dir: &Path, coordinate: &str) -> ResolvedArtifact {
        let coordinate: ArtifactCoordinate = coordinate.parse().unwrap();
        let file = dir.join(coordinate.file_name(&coordinate.version));
        let version = coordinate.version.clone();
        ResolvedArtifact::new(coordinate, file, version)
    }

    fn listing(dir: &Path) -> Vec<String> {
        let mut names: Vec<String> = std::fs::read_dir(dir)
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().to_string())
            .collect();
        names.sort();
        names
    }

    fn materializer() -> ArtifactMaterializer<DefaultArchiveExtractor> {
        ArtifactMaterializer::new(DefaultArchiveExtractor)
    }

    #[test]
    fn copy_keeps_file_names() {
        let repo = tempfile::tempdir().unwrap();
        let out = tempfile::tempdir().unwrap();
        let artifacts = vec![
            artifact(repo.path(), "org.x:core:1.0", "core"),
            artifact(repo.path(), "org.x:util:1.0", "util"),
        ];

        materializer()
            .materialize(&artifacts, out.path(), false, None)
            .unwrap();
        assert_eq!(listing(out.path()), vec!["core-1.0.jar", "util-1.0.jar"]);
    }

    #[test]
    fn copy_with_explicit_name_overwrites() {
        let repo = tempfile::tempdir().unwrap();
        let out = tempfile::tempdir().unwrap();
        std::fs::write(out.path().join("core.jar"), "stale").unwrap();
        let artifacts = vec![artifact(repo.path(), "org.x:core:1.0", "fresh")];

        materializer()
            .materialize(&artifacts, out.path(), false, Some("core.jar"))
            .unwrap();
        assert_eq!(listing(out.path()), vec!["core.jar"]);
        assert_eq!(
            std::fs::read_to_string(out.path().join("core.jar")).unwrap(),
            "fresh"
        );
    }

    #[test]
    fn explicit_name_needs_single_artifact() {
        let repo = tempfile::tempdir().unwrap();
        let out = tempfile::tempdir().unwrap();
        let artifacts = vec![
            artifact(repo.path(), "org.x:core:1.0", "core"),
            artifact(repo.path(), "org.x:util:1.0", "util"),
        ];

        let error = materializer()
            .materialize(&artifacts, out.path(), false, Some("core.jar"))
            .unwrap_err();
        assert!(matches!(
            error,
            MaterializeError::ExplicitNameConflict { count: 2, .. }
        ));
        assert!(listing(out.path()).is_empty());
    }

    #[test]
    fn creates_output_directory() {
        let repo = tempfile::tempdir().unwrap();
        let out = tempfile::tempdir().unwrap();
        let nested = out.path().join("a/b/c");
        let artifacts = vec![artifact(repo.path(), "org.x:core:1.0", "core")];

        materializer()
            .materialize(&artifacts, &nested, false, None)
            .unwrap();
        assert!(nested.join("core-1.0.jar").is_file());
    }

    #[test]
    fn missing_file_is_reported_and_others_are_placed() {
        let repo = tempfile::tempdir().unwrap();
        let out = tempfile::tempdir().unwrap();
        let artifacts = vec![
            missing(repo.path(), "org.x:gone:1.0"),
            artifact(repo.path(), "org.x:util:1.0", "util"),
        ];

        let error = materializer()
            .materialize(&artifacts, out.path(), false, None)
            .unwrap_err();
        match error {
            MaterializeError::FileNotResolved(coordinate) => {
                assert_eq!(coordinate, "org.x:gone:1.0:jar")
            }
            other => panic!("unexpected error {other}"),
        }
        assert_eq!(listing(out.path()), vec!["util-1.0.jar"]);
    }

    #[test]
    fn unresolved_artifact_is_reported() {
        let out = tempfile::tempdir().unwrap();
        let coordinate: ArtifactCoordinate = "org.x:core:1.0".parse().unwrap();
        let artifacts = vec![ResolvedArtifact::unresolved(coordinate)];

        let error = materializer()
            .materialize(&artifacts, out.path(), true, None)
            .unwrap_err();
        assert!(error.to_string().contains("org.x:core:1.0"));
    }

    #[test]
    fn several_failures_are_collected() {
        let repo = tempfile::tempdir().unwrap();
        let out = tempfile::tempdir().unwrap();
        let artifacts = vec![
            missing(repo.path(), "org.x:a:1.0"),
            missing(repo.path(), "org.x:b:1.0"),
        ];

        let error = materializer()
            .materialize(&artifacts, out.path(), false, None)
            .unwrap_err();
        match &error {
            MaterializeError::Multiple(errors) => assert_eq!(errors.len(), 2),
            other => panic!("unexpected error {other}"),
        }
        let message = error.to_string();
        assert!(message.contains("org.x:a:1.0") && message.contains("org.x:b:1.0"));
    }

    #[test]
    fn unpack_ignores_explicit_name() {
        let repo = tempfile::tempdir().unwrap();
        let out = tempfile::tempdir().unwrap();
        let coordinate: ArtifactCoordinate = "org.x:core:1.0".parse().unwrap();
        let jar = repo.path().join("core-1.0.jar");
        write_zip(&jar, &[("org/x/Core.class", "class"), ("core.properties", "a=b")]);
        let artifacts = vec![ResolvedArtifact::new(coordinate, jar, "1.0")];

        materializer()
            .materialize(&artifacts, out.path(), true, Some("renamed.jar"))
            .unwrap();
        assert_eq!(listing(out.path()), vec!["core.properties", "org"]);
    }

    #[test]
    fn unpack_unsupported_format() {
        let repo = tempfile::tempdir().unwrap();
        let out = tempfile::tempdir().unwrap();
        let artifacts = vec![artifact(repo.path(), "org.x:core:1.0:pom", "<project/>")];

        let error = materializer()
            .materialize(&artifacts, out.path(), true, None)
            .unwrap_err();
        assert!(matches!(
            error,
            MaterializeError::Extract {
                source: ExtractError::UnsupportedFormat(_),
                ..
            }
        ));
    }
}
