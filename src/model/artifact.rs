use std::{
    fmt::Display,
    path::{Path, PathBuf},
    str::FromStr,
};

use serde::{Deserialize, Serialize};

use crate::model::{coordinate::DEFAULT_TYPE, ArtifactCoordinate, ParseError, VersionConstraint};

/// An artifact located by a repository, with the file backing it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedArtifact {
    /// The coordinate as requested, possibly carrying a version range.
    pub coordinate: ArtifactCoordinate,
    pub file: Option<PathBuf>,
    pub resolved: bool,
    /// Concrete version the request resolved to.
    pub version: String,
}

impl ResolvedArtifact {
    pub fn new(coordinate: ArtifactCoordinate, file: PathBuf, version: impl Into<String>) -> Self {
        ResolvedArtifact {
            coordinate,
            file: Some(file),
            resolved: true,
            version: version.into(),
        }
    }

    pub fn unresolved(coordinate: ArtifactCoordinate) -> Self {
        let version = coordinate.version.clone();
        ResolvedArtifact {
            coordinate,
            file: None,
            resolved: false,
            version,
        }
    }

    /// The requested coordinate pinned to the concrete version.
    pub fn resolved_coordinate(&self) -> ArtifactCoordinate {
        self.coordinate.with_version(&self.version)
    }

    /// The backing file, if it exists and is a regular file.
    pub fn existing_file(&self) -> Option<&Path> {
        self.file.as_deref().filter(|file| file.is_file())
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Scope {
    #[default]
    Compile,
    Runtime,
    Provided,
    Test,
    System,
}

impl Scope {
    /// Scopes followed when expanding dependencies of a dependency.
    pub const TRANSITIVE: [Scope; 2] = [Scope::Compile, Scope::Runtime];
}

impl FromStr for Scope {
    type Err = ParseError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.to_ascii_lowercase().as_str() {
            "compile" => Ok(Scope::Compile),
            "runtime" => Ok(Scope::Runtime),
            "provided" => Ok(Scope::Provided),
            "test" => Ok(Scope::Test),
            "system" => Ok(Scope::System),
            _ => Err(ParseError::InvalidScope(value.to_owned())),
        }
    }
}

impl Display for Scope {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            Scope::Compile => f.write_str("compile"),
            Scope::Runtime => f.write_str("runtime"),
            Scope::Provided => f.write_str("provided"),
            Scope::Test => f.write_str("test"),
            Scope::System => f.write_str("system"),
        }
    }
}

fn default_type() -> String {
    DEFAULT_TYPE.to_owned()
}

fn is_default_type(kind: &str) -> bool {
    kind == DEFAULT_TYPE
}

fn is_false(value: &bool) -> bool {
    !value
}

/// A dependency declared by an artifact descriptor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DependencyEdge {
    pub group: String,
    pub name: String,
    /// A soft version (`1.0`) or a range (`[1.0,2.0)`).
    pub version: String,
    #[serde(rename = "type", default = "default_type", skip_serializing_if = "is_default_type")]
    pub kind: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub classifier: Option<String>,
    #[serde(default)]
    pub scope: Scope,
    #[serde(default, skip_serializing_if = "is_false")]
    pub optional: bool,
}

impl DependencyEdge {
    pub fn new(
        group: impl Into<String>,
        name: impl Into<String>,
        version: impl Into<String>,
    ) -> Self {
        DependencyEdge {
            group: group.into(),
            name: name.into(),
            version: version.into(),
            kind: default_type(),
            classifier: None,
            scope: Scope::default(),
            optional: false,
        }
    }

    pub fn with_scope(mut self, scope: Scope) -> Self {
        self.scope = scope;
        self
    }

    pub fn with_optional(mut self, optional: bool) -> Self {
        self.optional = optional;
        self
    }

    /// The coordinate to resolve for this edge.
    ///
    /// The version string is kept as declared; it is only validated here so a
    /// malformed range or a component escaping the repository fails before any lookup.
    pub fn to_coordinate(&self) -> Result<ArtifactCoordinate, ParseError> {
        VersionConstraint::from_str(&self.version)?;
        let coordinate = ArtifactCoordinate::new(&self.group, &self.name, self.version.trim())
            .with_kind(&self.kind)
            .with_classifier(self.classifier.clone());
        coordinate.validate()?;
        Ok(coordinate)
    }
}
