use std::path::PathBuf;

use anyhow::bail;
use clap::{Args, Parser, Subcommand};

use crate::{
    fetch::{FetchRequest, DEFAULT_OUTPUT_DIRECTORY},
    model::{coordinate::DEFAULT_TYPE, ArtifactCoordinate},
};

/// Fetches an artifact, and optionally its dependencies, from Maven-layout repositories.
#[derive(Debug, Parser)]
#[clap(version)]
pub struct CliArgs {
    #[clap(subcommand)]
    pub cmd: Command,
    /// Location of the local repository.
    /// Defaults to `$HOME/.artifetch/repository`.
    #[clap(long, global = true)]
    pub local_repository: Option<PathBuf>,
    /// Remote repository url or directory, consulted in the order given.
    /// Defaults to Maven Central.
    #[clap(long = "remote-repository", global = true)]
    pub remote_repositories: Vec<String>,
    /// Only use artifacts already present in the local repository.
    #[clap(long, global = true)]
    pub offline: bool,
    /// Configuration file.
    /// Defaults to `$HOME/.artifetch/config.toml` when it exists.
    #[clap(long, global = true)]
    pub config: Option<PathBuf>,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Downloads an artifact and copies or unpacks it into the output directory
    Fetch(FetchArgs),
    /// Deletes everything stored in the local repository
    ClearCache,
}

#[derive(Debug, Args)]
pub struct FetchArgs {
    /// Artifact as group:name:version[:type[:classifier]]
    #[clap(
        short,
        long,
        conflicts_with_all = ["group_id", "artifact_id", "version", "kind", "classifier"]
    )]
    pub artifact: Option<String>,
    #[clap(long)]
    pub group_id: Option<String>,
    #[clap(long)]
    pub artifact_id: Option<String>,
    /// Version or version range, e.g. `[1.0,2.0)`
    #[clap(long)]
    pub version: Option<String>,
    #[clap(long = "type")]
    pub kind: Option<String>,
    #[clap(long)]
    pub classifier: Option<String>,
    #[clap(short, long, default_value = DEFAULT_OUTPUT_DIRECTORY)]
    pub output_directory: PathBuf,
    /// Name of the copied file. Only valid without dependencies.
    #[clap(long)]
    pub output_file_name: Option<String>,
    /// Unpack the artifacts instead of copying them
    #[clap(short, long)]
    pub unpack: bool,
    /// Levels of transitive dependencies to fetch along with the artifact
    #[clap(short = 'd', long, default_value_t = 0)]
    pub dependency_depth: u32,
    #[clap(long, env = "ARTIFETCH_SKIP")]
    pub skip: bool,
}

impl FetchArgs {
    pub fn coordinate(&self) -> anyhow::Result<ArtifactCoordinate> {
        if let Some(artifact) = &self.artifact {
            return Ok(artifact.parse()?);
        }
        let (Some(group), Some(name), Some(version)) =
            (&self.group_id, &self.artifact_id, &self.version)
        else {
            bail!("Either --artifact or all of --group-id, --artifact-id and --version must be given");
        };
        let coordinate = ArtifactCoordinate::new(group, name, version)
            .with_kind(self.kind.as_deref().unwrap_or(DEFAULT_TYPE))
            .with_classifier(self.classifier.clone());
        coordinate.validate()?;
        Ok(coordinate)
    }

    pub fn to_request(&self) -> anyhow::Result<FetchRequest> {
        let mut request = FetchRequest::new(self.coordinate()?)
            .output_directory(&self.output_directory)
            .unpack(self.unpack)
            .dependency_depth(self.dependency_depth)
            .skip(self.skip);
        request.output_file_name = self.output_file_name.clone();
        Ok(request)
    }
}
