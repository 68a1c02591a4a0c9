pub mod transport;

use std::{
    fmt::Display,
    path::{Path, PathBuf},
    str::FromStr,
};

use log::{debug, info, trace, warn};

use crate::{
    model::{
        ArtifactCoordinate, ArtifactDescriptor, DependencyEdge, ParseError, ResolvedArtifact,
        Version, VersionConstraint,
    },
    resolver::{RepositoryResolver, ResolutionContext, ResolveError},
};

use transport::{list_version_directories, FileTransport, HttpTransport, Transport, TransportError};

pub const DEFAULT_REMOTE_REPOSITORY: &str = "https://repo.maven.apache.org/maven2";

/// Location of a remote repository: an http(s) URL, a `file://` URL or a directory.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum RemoteRepository {
    Http { url: String },
    Directory { path: PathBuf },
}

impl RemoteRepository {
    pub fn transport(&self) -> Result<Box<dyn Transport>, TransportError> {
        match self {
            RemoteRepository::Http { url } => Ok(Box::new(HttpTransport::new(url)?)),
            RemoteRepository::Directory { path } => Ok(Box::new(FileTransport::new(path))),
        }
    }
}

impl FromStr for RemoteRepository {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() {
            return Err(ParseError::UnsupportedRepositoryUrl(s.to_owned()));
        }
        let lower = s.to_ascii_lowercase();
        if lower.starts_with("http://") || lower.starts_with("https://") {
            Ok(RemoteRepository::Http {
                url: s.trim_end_matches('/').to_owned(),
            })
        } else if let Some(path) = s.strip_prefix("file://") {
            Ok(RemoteRepository::Directory {
                path: PathBuf::from(path),
            })
        } else if s.contains("://") {
            Err(ParseError::UnsupportedRepositoryUrl(s.to_owned()))
        } else {
            Ok(RemoteRepository::Directory {
                path: PathBuf::from(s),
            })
        }
    }
}

impl Display for RemoteRepository {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            RemoteRepository::Http { url } => f.write_str(url),
            RemoteRepository::Directory { path } => write!(f, "file://{}", path.display()),
        }
    }
}

/// Resolves artifacts from a local repository, downloading missing files from
/// the configured remotes in order.
pub struct MavenLayoutResolver {
    context: ResolutionContext,
    remotes: Vec<(RemoteRepository, Box<dyn Transport>)>,
}

impl MavenLayoutResolver {
    pub fn new(context: ResolutionContext) -> Result<Self, TransportError> {
        let remotes = context
            .remote_repositories
            .iter()
            .map(|remote| remote.transport().map(|t| (remote.clone(), t)))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { context, remotes })
    }

    /// Appends a remote served by a custom transport.
    pub fn with_transport(mut self, remote: RemoteRepository, transport: Box<dyn Transport>) -> Self {
        self.remotes.push((remote, transport));
        self
    }

    pub fn context(&self) -> &ResolutionContext {
        &self.context
    }

    fn concrete_version(&self, coordinate: &ArtifactCoordinate) -> Result<String, ResolveError> {
        let constraint = VersionConstraint::from_str(&coordinate.version).map_err(|source| {
            ResolveError::InvalidVersion {
                coordinate: coordinate.to_string(),
                source,
            }
        })?;
        if !constraint.is_range() {
            return Ok(coordinate.version.trim().to_owned());
        }

        let (candidates, failures) = self.available_versions(coordinate)?;
        match constraint.select(&candidates) {
            Some(version) => {
                debug!("Resolved version range of {} to {}", coordinate, version);
                Ok(version.as_str().to_owned())
            }
            None if !failures.is_empty() && failures.len() == self.remotes.len() => {
                Err(ResolveError::Network {
                    coordinate: coordinate.to_string(),
                    message: failures.join("; "),
                })
            }
            None => Err(ResolveError::NotFound {
                coordinate: coordinate.to_string(),
                reason: format!(
                    "no version matches the range among {} available version(s)",
                    candidates.len()
                ),
            }),
        }
    }

    /// Versions known locally and to the remotes, with the listing failures of
    /// remotes that could not be reached.
    fn available_versions(
        &self,
        coordinate: &ArtifactCoordinate,
    ) -> Result<(Vec<Version>, Vec<String>), ResolveError> {
        let artifact_path = coordinate.to_artifact_path();
        let mut names =
            list_version_directories(&self.context.local_repository.join(&artifact_path))?;

        let mut failures = Vec::new();
        if !self.context.offline {
            for (remote, transport) in &self.remotes {
                match transport.list_versions(&artifact_path) {
                    Ok(versions) => names.extend(versions),
                    Err(error) => {
                        warn!(
                            "Could not list versions of {} in {}: {}",
                            coordinate, remote, error
                        );
                        failures.push(format!("{remote}: {error}"));
                    }
                }
            }
        }

        names.sort();
        names.dedup();
        let versions = names.iter().map(|name| Version::parse(name)).collect();
        Ok((versions, failures))
    }

    /// Local path of the repository-relative file, downloading it first if needed.
    fn fetch_file(
        &self,
        coordinate: &ArtifactCoordinate,
        relative: &Path,
    ) -> Result<Option<PathBuf>, ResolveError> {
        let local = self.context.local_repository.join(relative);
        if local.is_file() {
            trace!("Found {} in the local repository", relative.display());
            return Ok(Some(local));
        }
        if self.context.offline || self.remotes.is_empty() {
            return Ok(None);
        }

        let file_name = local
            .file_name()
            .map(|name| name.to_string_lossy().to_string())
            .unwrap_or_default();
        let partial = local.with_file_name(format!("{file_name}.part"));
        if let Some(parent) = local.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let mut failures = Vec::new();
        for (remote, transport) in &self.remotes {
            match transport.download(relative, &partial) {
                Ok(true) => {
                    std::fs::rename(&partial, &local)?;
                    info!("Downloaded {} from {}", relative.display(), remote);
                    return Ok(Some(local));
                }
                Ok(false) => trace!("{} not found in {}", relative.display(), remote),
                Err(error) => {
                    warn!(
                        "Could not transfer {} from {}: {}",
                        relative.display(),
                        remote,
                        error
                    );
                    let _ = std::fs::remove_file(&partial);
                    failures.push(format!("{remote}: {error}"));
                }
            }
        }

        if failures.len() == self.remotes.len() {
            return Err(ResolveError::Network {
                coordinate: coordinate.to_string(),
                message: failures.join("; "),
            });
        }
        Ok(None)
    }
}

impl RepositoryResolver for MavenLayoutResolver {
    fn resolve_binary(
        &self,
        coordinate: &ArtifactCoordinate,
    ) -> Result<ResolvedArtifact, ResolveError> {
        let version = self.concrete_version(coordinate)?;
        let relative = coordinate.binary_path(&version);
        match self.fetch_file(coordinate, &relative)? {
            Some(file) => Ok(ResolvedArtifact::new(coordinate.clone(), file, version)),
            None => Err(ResolveError::NotFound {
                coordinate: coordinate.to_string(),
                reason: format!(
                    "{} is not in the local repository or any of {} remote repositories",
                    relative.display(),
                    if self.context.offline { 0 } else { self.remotes.len() }
                ),
            }),
        }
    }

    fn fetch_dependencies(
        &self,
        coordinate: &ArtifactCoordinate,
    ) -> Result<Vec<DependencyEdge>, ResolveError> {
        let version = self.concrete_version(coordinate)?;
        let relative = coordinate.descriptor_path(&version);
        let path = self
            .fetch_file(coordinate, &relative)?
            .ok_or_else(|| ResolveError::MissingDescriptor {
                coordinate: coordinate.to_string(),
            })?;
        let descriptor =
            ArtifactDescriptor::from_file(&path).map_err(|source| ResolveError::Descriptor {
                coordinate: coordinate.to_string(),
                source,
            })?;

        Ok(descriptor
            .dependencies_in(&self.context.scopes)
            .cloned()
            .collect())
    }
}
