use std::path::PathBuf;

use log::info;
use thiserror::Error;

use crate::{
    archive::ArchiveExtractor,
    materialize::{create_output_directory, ArtifactMaterializer, MaterializeError},
    model::ArtifactCoordinate,
    resolver::{ClosureResolver, RepositoryResolver, ResolveError},
};

pub const DEFAULT_OUTPUT_DIRECTORY: &str = "target";

#[derive(Error, Debug)]
pub enum FetchError {
    #[error("Invalid fetch configuration: {0}")]
    Configuration(String),
    #[error("Couldn't download artifact: {0}")]
    Resolution(#[from] ResolveError),
    #[error("Couldn't place artifacts: {0}")]
    Materialization(#[from] MaterializeError),
}

/// One invocation: which artifact, how deep, and where to put it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchRequest {
    pub coordinate: ArtifactCoordinate,
    pub output_directory: PathBuf,
    pub output_file_name: Option<String>,
    pub unpack: bool,
    pub dependency_depth: u32,
    pub skip: bool,
}

impl FetchRequest {
    pub fn new(coordinate: ArtifactCoordinate) -> Self {
        FetchRequest {
            coordinate,
            output_directory: PathBuf::from(DEFAULT_OUTPUT_DIRECTORY),
            output_file_name: None,
            unpack: false,
            dependency_depth: 0,
            skip: false,
        }
    }

    pub fn output_directory(mut self, path: impl Into<PathBuf>) -> Self {
        self.output_directory = path.into();
        self
    }

    pub fn output_file_name(mut self, name: impl Into<String>) -> Self {
        self.output_file_name = Some(name.into());
        self
    }

    pub fn unpack(mut self, unpack: bool) -> Self {
        self.unpack = unpack;
        self
    }

    pub fn dependency_depth(mut self, depth: u32) -> Self {
        self.dependency_depth = depth;
        self
    }

    pub fn skip(mut self, skip: bool) -> Self {
        self.skip = skip;
        self
    }

    /// The output file name, with an empty one counting as absent.
    pub fn explicit_name(&self) -> Option<&str> {
        self.output_file_name
            .as_deref()
            .filter(|name| !name.is_empty())
    }

    pub fn validate(&self) -> Result<(), FetchError> {
        self.coordinate
            .validate()
            .map_err(|error| FetchError::Configuration(error.to_string()))?;
        if let Some(name) = self.explicit_name() {
            if self.dependency_depth > 0 {
                return Err(FetchError::Configuration(format!(
                    "cannot use output file name `{}` with dependency depth {}: \
                     several artifacts would share one name",
                    name, self.dependency_depth
                )));
            }
        }
        Ok(())
    }
}

/// Resolves the closure of `request.coordinate` and places it in the output directory.
pub fn fetch<R, E>(
    resolver: &R,
    materializer: &ArtifactMaterializer<E>,
    request: &FetchRequest,
) -> Result<(), FetchError>
where
    R: RepositoryResolver + ?Sized,
    E: ArchiveExtractor,
{
    if request.skip {
        info!("artifact fetch skipped");
        return Ok(());
    }

    request.validate()?;
    create_output_directory(&request.output_directory)?;

    let closure =
        ClosureResolver::new(resolver).resolve(&request.coordinate, request.dependency_depth)?;

    materializer.materialize(
        closure.as_slice(),
        &request.output_directory,
        request.unpack,
        request.explicit_name(),
    )?;
    Ok(())
}
