mod closure;
mod memo;

use std::path::PathBuf;

use thiserror::Error;

use crate::{
    model::{ArtifactCoordinate, DependencyEdge, ParseError, ResolvedArtifact, Scope},
    repository::RemoteRepository,
};

pub use closure::{ClosureResolver, ClosureResult};
pub use memo::MemoizingResolver;

/// Access to a package repository: locating binaries and reading the
/// dependencies their descriptors declare.
pub trait RepositoryResolver {
    /// Locates (downloading if needed) the file backing `coordinate`.
    /// Version ranges are resolved to a concrete version here.
    fn resolve_binary(
        &self,
        coordinate: &ArtifactCoordinate,
    ) -> Result<ResolvedArtifact, ResolveError>;

    /// The direct dependencies declared by the descriptor of `coordinate`,
    /// in declaration order, after scope filtering. Does not resolve any of them.
    fn fetch_dependencies(
        &self,
        coordinate: &ArtifactCoordinate,
    ) -> Result<Vec<DependencyEdge>, ResolveError>;
}

impl<R> RepositoryResolver for &R
where
    R: RepositoryResolver + ?Sized,
{
    fn resolve_binary(
        &self,
        coordinate: &ArtifactCoordinate,
    ) -> Result<ResolvedArtifact, ResolveError> {
        (**self).resolve_binary(coordinate)
    }

    fn fetch_dependencies(
        &self,
        coordinate: &ArtifactCoordinate,
    ) -> Result<Vec<DependencyEdge>, ResolveError> {
        (**self).fetch_dependencies(coordinate)
    }
}

#[derive(Error, Debug)]
pub enum ResolveError {
    #[error("Could not find artifact {coordinate}: {reason}")]
    NotFound { coordinate: String, reason: String },
    #[error("Could not transfer artifact {coordinate}: {message}")]
    Network { coordinate: String, message: String },
    #[error("Missing descriptor for {coordinate}")]
    MissingDescriptor { coordinate: String },
    #[error("Could not build descriptor for {coordinate}: {source}")]
    Descriptor {
        coordinate: String,
        source: ParseError,
    },
    #[error("Invalid dependency {dependency} declared by {parent}: {source}")]
    InvalidDependency {
        parent: String,
        dependency: String,
        source: ParseError,
    },
    #[error("Invalid version for {coordinate}: {source}")]
    InvalidVersion {
        coordinate: String,
        source: ParseError,
    },
    #[error("IO error: {0}")]
    IO(#[from] std::io::Error),
}

/// Session settings handed to a repository resolver.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolutionContext {
    pub local_repository: PathBuf,
    pub remote_repositories: Vec<RemoteRepository>,
    pub offline: bool,
    /// Dependency scopes followed by `fetch_dependencies`.
    pub scopes: Vec<Scope>,
}

impl ResolutionContext {
    pub fn new(local_repository: impl Into<PathBuf>) -> Self {
        ResolutionContext {
            local_repository: local_repository.into(),
            remote_repositories: Vec::new(),
            offline: false,
            scopes: Scope::TRANSITIVE.to_vec(),
        }
    }

    pub fn with_remote_repositories(mut self, remotes: Vec<RemoteRepository>) -> Self {
        self.remote_repositories = remotes;
        self
    }

    pub fn with_offline(mut self, offline: bool) -> Self {
        self.offline = offline;
        self
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use std::{
        cell::RefCell,
        collections::{HashMap, HashSet},
        path::PathBuf,
    };

    use super::*;

    /// In-memory repository: every known coordinate resolves to a fake path,
    /// and every call is recorded.
    #[derive(Default)]
    pub struct FakeRepository {
        pub dependencies: HashMap<ArtifactCoordinate, Vec<DependencyEdge>>,
        pub missing_descriptors: HashSet<ArtifactCoordinate>,
        pub resolve_calls: RefCell<Vec<ArtifactCoordinate>>,
        pub fetch_calls: RefCell<Vec<ArtifactCoordinate>>,
    }

    impl FakeRepository {
        pub fn with(mut self, coordinate: &str, dependencies: &[&str]) -> Self {
            let edges = dependencies
                .iter()
                .map(|d| {
                    let c: ArtifactCoordinate = d.parse().unwrap();
                    DependencyEdge::new(c.group, c.name, c.version)
                })
                .collect();
            self.dependencies.insert(coordinate.parse().unwrap(), edges);
            self
        }

        pub fn without_descriptor(mut self, coordinate: &str) -> Self {
            let coordinate: ArtifactCoordinate = coordinate.parse().unwrap();
            self.dependencies.insert(coordinate.clone(), vec![]);
            self.missing_descriptors.insert(coordinate);
            self
        }

        pub fn call_count(&self) -> usize {
            self.resolve_calls.borrow().len() + self.fetch_calls.borrow().len()
        }
    }

    impl RepositoryResolver for FakeRepository {
        fn resolve_binary(
            &self,
            coordinate: &ArtifactCoordinate,
        ) -> Result<ResolvedArtifact, ResolveError> {
            self.resolve_calls.borrow_mut().push(coordinate.clone());
            if !self.dependencies.contains_key(coordinate) {
                return Err(ResolveError::NotFound {
                    coordinate: coordinate.to_string(),
                    reason: "not in fake repository".to_owned(),
                });
            }
            Ok(ResolvedArtifact::new(
                coordinate.clone(),
                PathBuf::from(coordinate.file_name(&coordinate.version)),
                &coordinate.version,
            ))
        }

        fn fetch_dependencies(
            &self,
            coordinate: &ArtifactCoordinate,
        ) -> Result<Vec<DependencyEdge>, ResolveError> {
            self.fetch_calls.borrow_mut().push(coordinate.clone());
            if self.missing_descriptors.contains(coordinate) {
                return Err(ResolveError::MissingDescriptor {
                    coordinate: coordinate.to_string(),
                });
            }
            self.dependencies
                .get(coordinate)
                .cloned()
                .ok_or_else(|| ResolveError::MissingDescriptor {
                    coordinate: coordinate.to_string(),
                })
        }
    }
}
