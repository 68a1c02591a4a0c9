use std::{
    fmt::Display,
    path::{Path, PathBuf},
    str::FromStr,
};

use regex_lite::Regex;

use crate::model::ParseError;

pub const DEFAULT_TYPE: &str = "jar";

/// Identity of a single publishable unit in a repository.
///
/// Equality and hashing cover all five fields verbatim: a version range such as
/// `[1.0,2.0)` is a different coordinate from the `1.5` it may resolve to.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Ord, PartialOrd)]
pub struct ArtifactCoordinate {
    pub group: String,
    pub name: String,
    pub version: String,
    pub kind: String,
    pub classifier: Option<String>,
}

impl ArtifactCoordinate {
    pub fn new(
        group: impl Into<String>,
        name: impl Into<String>,
        version: impl Into<String>,
    ) -> ArtifactCoordinate {
        ArtifactCoordinate {
            group: group.into(),
            name: name.into(),
            version: version.into(),
            kind: DEFAULT_TYPE.to_owned(),
            classifier: None,
        }
    }

    pub fn with_kind(mut self, kind: impl Into<String>) -> Self {
        self.kind = kind.into();
        self
    }

    pub fn with_classifier(mut self, classifier: Option<String>) -> Self {
        self.classifier = classifier.filter(|c| !c.is_empty());
        self
    }

    pub fn with_version(&self, version: impl Into<String>) -> Self {
        ArtifactCoordinate {
            version: version.into(),
            ..self.clone()
        }
    }

    /// Rejects components that would not stay a single path segment inside a
    /// repository: empty, `.`, `..`, or containing a separator or `:`.
    pub fn validate(&self) -> Result<(), ParseError> {
        let mut components = vec![
            ("name", self.name.as_str()),
            ("version", self.version.as_str()),
            ("type", self.kind.as_str()),
        ];
        components.extend(self.group.split('.').map(|segment| ("group", segment)));
        if let Some(classifier) = &self.classifier {
            components.push(("classifier", classifier.as_str()));
        }
        for (component, value) in components {
            let value = value.trim();
            if value.is_empty()
                || value == "."
                || value == ".."
                || value.contains(['/', '\\', ':'])
            {
                return Err(ParseError::InvalidCoordinateComponent {
                    component: component.to_owned(),
                    coordinate: self.to_string(),
                });
            }
        }
        Ok(())
    }

    /// File extension implied by the artifact type.
    pub fn extension(&self) -> &str {
        match self.kind.as_str() {
            "test-jar" | "ejb-client" | "java-source" | "javadoc" | "maven-plugin" | "ejb"
            | "bundle" => "jar",
            other => other,
        }
    }

    /// The explicit classifier, or the one implied by the artifact type.
    pub fn effective_classifier(&self) -> Option<&str> {
        if let Some(classifier) = self.classifier.as_deref() {
            return Some(classifier);
        }
        match self.kind.as_str() {
            "test-jar" => Some("tests"),
            "ejb-client" => Some("client"),
            "java-source" => Some("sources"),
            "javadoc" => Some("javadoc"),
            _ => None,
        }
    }

    /// `<group as path>/<name>`, relative to a repository root.
    pub fn to_artifact_path(&self) -> PathBuf {
        let mut result = PathBuf::new();
        for segment in self.group.split('.') {
            result.push(segment);
        }
        result.push(&self.name);
        result
    }

    /// Directory holding the files of `version`, relative to a repository root.
    pub fn to_version_path(&self, version: &str) -> PathBuf {
        self.to_artifact_path().join(version)
    }

    pub fn file_name(&self, version: &str) -> String {
        match self.effective_classifier() {
            Some(classifier) => format!(
                "{}-{}-{}.{}",
                self.name,
                version,
                classifier,
                self.extension()
            ),
            None => format!("{}-{}.{}", self.name, version, self.extension()),
        }
    }

    pub fn descriptor_file_name(&self, version: &str) -> String {
        format!("{}-{}.toml", self.name, version)
    }

    /// Repository-relative path of the binary for `version`.
    pub fn binary_path(&self, version: &str) -> PathBuf {
        self.to_version_path(version).join(self.file_name(version))
    }

    /// Repository-relative path of the descriptor for `version`.
    pub fn descriptor_path(&self, version: &str) -> PathBuf {
        self.to_version_path(version)
            .join(self.descriptor_file_name(version))
    }
}

impl FromStr for ArtifactCoordinate {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let re: Regex = Regex::new(
            r"^(?P<group>[^:]+):(?P<name>[^:]+):(?P<version>[^:]+)(?::(?P<kind>[^:]+)(?::(?P<classifier>[^:]+))?)?$",
        )
        .unwrap();
        let captures = re
            .captures(s.trim())
            .ok_or_else(|| ParseError::InvalidCoordinate(s.to_owned()))?;
        let component = |name: &str| {
            captures
                .name(name)
                .map(|m| m.as_str().to_owned())
                .ok_or_else(|| ParseError::MissingCoordinateComponent(name.to_owned(), s.to_owned()))
        };

        let coordinate = ArtifactCoordinate::new(
            component("group")?,
            component("name")?,
            component("version")?,
        );
        let coordinate = match captures.name("kind") {
            Some(kind) => coordinate.with_kind(kind.as_str()),
            None => coordinate,
        };
        let coordinate =
            coordinate.with_classifier(captures.name("classifier").map(|c| c.as_str().to_owned()));
        coordinate.validate()?;
        Ok(coordinate)
    }
}

impl Display for ArtifactCoordinate {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(
            f,
            "{}:{}:{}:{}",
            self.group, self.name, self.version, self.kind
        )?;
        if let Some(classifier) = &self.classifier {
            write!(f, ":{}", classifier)?;
        }
        Ok(())
    }
}

/// Joins a repository-relative path onto a URL-ish base with forward slashes.
pub fn join_url(base: &str, relative: &Path) -> String {
    let mut url = base.trim_end_matches('/').to_owned();
    for component in relative.components() {
        url.push('/');
        url.push_str(&component.as_os_str().to_string_lossy());
    }
    url
}
