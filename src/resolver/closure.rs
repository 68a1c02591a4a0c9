use std::collections::HashMap;

use log::{debug, info, trace};

use crate::model::{ArtifactCoordinate, ResolvedArtifact};

use super::{RepositoryResolver, ResolveError};

/// Artifacts produced by one closure resolution, unique by requested coordinate,
/// in the order they were first reached.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClosureResult {
    artifacts: Vec<ResolvedArtifact>,
    index: HashMap<ArtifactCoordinate, usize>,
}

impl ClosureResult {
    /// Adds `artifact` unless its coordinate is already present. An existing
    /// entry is never replaced.
    pub fn insert(&mut self, artifact: ResolvedArtifact) -> bool {
        if self.index.contains_key(&artifact.coordinate) {
            return false;
        }
        self.index
            .insert(artifact.coordinate.clone(), self.artifacts.len());
        self.artifacts.push(artifact);
        true
    }

    pub fn contains(&self, coordinate: &ArtifactCoordinate) -> bool {
        self.index.contains_key(coordinate)
    }

    pub fn get(&self, coordinate: &ArtifactCoordinate) -> Option<&ResolvedArtifact> {
        self.index.get(coordinate).map(|&i| &self.artifacts[i])
    }

    /// The requested artifact. Present in every successful result.
    pub fn root(&self) -> Option<&ResolvedArtifact> {
        self.artifacts.first()
    }

    pub fn len(&self) -> usize {
        self.artifacts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.artifacts.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ResolvedArtifact> {
        self.artifacts.iter()
    }

    pub fn as_slice(&self) -> &[ResolvedArtifact] {
        &self.artifacts
    }
}

impl IntoIterator for ClosureResult {
    type Item = ResolvedArtifact;
    type IntoIter = std::vec::IntoIter<ResolvedArtifact>;

    fn into_iter(self) -> Self::IntoIter {
        self.artifacts.into_iter()
    }
}

impl<'a> IntoIterator for &'a ClosureResult {
    type Item = &'a ResolvedArtifact;
    type IntoIter = std::slice::Iter<'a, ResolvedArtifact>;

    fn into_iter(self) -> Self::IntoIter {
        self.artifacts.iter()
    }
}

/// Expands a root coordinate into the artifacts reachable within a number of
/// dependency levels.
pub struct ClosureResolver<R> {
    resolver: R,
}

impl<R: RepositoryResolver> ClosureResolver<R> {
    pub fn new(resolver: R) -> Self {
        Self { resolver }
    }

    /// Depth 0 yields the root only, depth 1 adds its direct dependencies, and so on.
    ///
    /// Any artifact or descriptor failure inside the bound fails the whole closure.
    pub fn resolve(
        &self,
        root: &ArtifactCoordinate,
        max_depth: u32,
    ) -> Result<ClosureResult, ResolveError> {
        // `expanded` holds the most levels each coordinate was already walked with.
        // Reaching it again with no more levels left cannot add members.
        fn go<R: RepositoryResolver>(
            resolver: &R,
            coordinate: &ArtifactCoordinate,
            depth: u32,
            expanded: &mut HashMap<ArtifactCoordinate, u32>,
            result: &mut ClosureResult,
        ) -> Result<(), ResolveError> {
            if expanded.get(coordinate).is_some_and(|&seen| seen >= depth) {
                trace!("{} is already part of the closure", coordinate);
                return Ok(());
            }
            expanded.insert(coordinate.clone(), depth);
            trace!("Resolving {} with {} level(s) left", coordinate, depth);

            let resolved_coordinate = match result.get(coordinate) {
                Some(artifact) => artifact.resolved_coordinate(),
                None => {
                    let artifact = resolver.resolve_binary(coordinate)?;
                    let resolved_coordinate = artifact.resolved_coordinate();
                    result.insert(artifact);
                    resolved_coordinate
                }
            };

            if depth == 0 {
                return Ok(());
            }

            debug!("Resolving dependencies for artifact {}...", coordinate);
            let dependencies = resolver.fetch_dependencies(&resolved_coordinate)?;
            debug!("Number of dependencies of {}: {}", coordinate, dependencies.len());

            for edge in &dependencies {
                let dependency =
                    edge.to_coordinate()
                        .map_err(|source| ResolveError::InvalidDependency {
                            parent: coordinate.to_string(),
                            dependency: format!("{}:{}:{}", edge.group, edge.name, edge.version),
                            source,
                        })?;
                go(resolver, &dependency, depth - 1, expanded, result)?;
            }

            Ok(())
        }

        info!("Resolving {} with dependency depth {}", root, max_depth);
        let mut result = ClosureResult::default();
        go(
            &self.resolver,
            root,
            max_depth,
            &mut HashMap::new(),
            &mut result,
        )?;
        info!("Resolved {} artifact(s) for {}", result.len(), root);
        Ok(result)
    }
}
