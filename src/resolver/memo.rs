use dashmap::DashMap;
use log::trace;

use crate::model::{ArtifactCoordinate, DependencyEdge, ResolvedArtifact};

use super::{RepositoryResolver, ResolveError};

/// Remembers successful lookups of the inner resolver by coordinate.
///
/// Only lookups are cached. A coordinate reached again with more levels left is
/// still expanded by the closure resolver, so the resulting set is unchanged.
pub struct MemoizingResolver<R> {
    inner: R,
    binaries: DashMap<ArtifactCoordinate, ResolvedArtifact>,
    dependencies: DashMap<ArtifactCoordinate, Vec<DependencyEdge>>,
}

impl<R> MemoizingResolver<R> {
    pub fn new(inner: R) -> Self {
        Self {
            inner,
            binaries: DashMap::new(),
            dependencies: DashMap::new(),
        }
    }

    pub fn into_inner(self) -> R {
        self.inner
    }
}

impl<R> RepositoryResolver for MemoizingResolver<R>
where
    R: RepositoryResolver,
{
    fn resolve_binary(
        &self,
        coordinate: &ArtifactCoordinate,
    ) -> Result<ResolvedArtifact, ResolveError> {
        if let Some(artifact) = self.binaries.get(coordinate) {
            trace!("{} already resolved to {}", coordinate, artifact.version);
            return Ok(artifact.clone());
        }
        let artifact = self.inner.resolve_binary(coordinate)?;
        self.binaries.insert(coordinate.clone(), artifact.clone());
        Ok(artifact)
    }

    fn fetch_dependencies(
        &self,
        coordinate: &ArtifactCoordinate,
    ) -> Result<Vec<DependencyEdge>, ResolveError> {
        if let Some(dependencies) = self.dependencies.get(coordinate) {
            trace!("Dependencies of {} already fetched", coordinate);
            return Ok(dependencies.clone());
        }
        let dependencies = self.inner.fetch_dependencies(coordinate)?;
        self.dependencies
            .insert(coordinate.clone(), dependencies.clone());
        Ok(dependencies)
    }
}
