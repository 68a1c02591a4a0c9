use thiserror::Error;

pub mod artifact;
pub mod coordinate;
pub mod descriptor;
pub mod version;

pub use artifact::{DependencyEdge, ResolvedArtifact, Scope};
pub use coordinate::ArtifactCoordinate;
pub use descriptor::ArtifactDescriptor;
pub use version::{Version, VersionConstraint};

#[derive(Error, Debug)]
pub enum ParseError {
    #[error("IO error reading descriptor: {0}")]
    IO(#[from] std::io::Error),
    #[error("TOML parsing error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Invalid artifact coordinate `{0}`, expected <group>:<name>:<version>[:<type>[:<classifier>]]")]
    InvalidCoordinate(String),
    #[error("Invalid {component} in artifact coordinate `{coordinate}`")]
    InvalidCoordinateComponent {
        component: String,
        coordinate: String,
    },
    #[error("Missing coordinate component `{0}` in `{1}`")]
    MissingCoordinateComponent(String, String),
    #[error("Invalid version specification `{spec}`: {reason}")]
    InvalidVersion { spec: String, reason: String },
    #[error("Invalid dependency scope `{0}`")]
    InvalidScope(String),
    #[error("Unsupported repository url `{0}`, expected http(s)://, file:// or a directory path")]
    UnsupportedRepositoryUrl(String),
}
