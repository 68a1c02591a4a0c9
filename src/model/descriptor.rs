use std::path::Path;

use log::{debug, error};
use serde::{Deserialize, Serialize};

use crate::model::{DependencyEdge, ParseError, Scope};

/// Declarative metadata stored next to an artifact, listing its direct dependencies.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ArtifactDescriptor {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub dependencies: Vec<DependencyEdge>,
}

impl ArtifactDescriptor {
    pub fn from_file(path: &Path) -> Result<ArtifactDescriptor, ParseError> {
        debug!("Attempting to read descriptor from {}", path.display());
        let contents = std::fs::read_to_string(path)?;

        let descriptor = ArtifactDescriptor::from_toml_str(&contents);
        if let Err(err) = &descriptor {
            error!(
                "Could not build a valid descriptor from {} due to err {err}",
                path.display()
            )
        }
        descriptor
    }

    pub fn from_toml_str(data: &str) -> Result<ArtifactDescriptor, ParseError> {
        Ok(toml::from_str::<ArtifactDescriptor>(data)?)
    }

    pub fn to_toml_string(&self) -> Result<String, toml::ser::Error> {
        toml::to_string_pretty(self)
    }

    /// Dependencies in declaration order, restricted to `scopes`, optional ones dropped.
    pub fn dependencies_in<'a>(
        &'a self,
        scopes: &'a [Scope],
    ) -> impl Iterator<Item = &'a DependencyEdge> + 'a {
        self.dependencies
            .iter()
            .filter(move |edge| !edge.optional && scopes.contains(&edge.scope))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use pretty_assertions::assert_eq;

    #[test]
    fn load_descriptor_with_dependencies() {
        let str = r#"
            description = "core library"

            [[dependencies]]
            group = "org.x"
            name = "util"
            version = "1.0"

            [[dependencies]]
            group = "org.x"
            name = "natives"
            version = "[2.0,3.0)"
            type = "zip"
            classifier = "linux"
            scope = "runtime"

            [[dependencies]]
            group = "junit"
            name = "junit"
            version = "4.13"
            scope = "test"
        "#;
        let descriptor = ArtifactDescriptor::from_toml_str(str).unwrap();
        assert_eq!(
            descriptor,
            ArtifactDescriptor {
                description: Some("core library".to_owned()),
                dependencies: vec![
                    DependencyEdge::new("org.x", "util", "1.0"),
                    DependencyEdge {
                        kind: "zip".to_owned(),
                        classifier: Some("linux".to_owned()),
                        ..DependencyEdge::new("org.x", "natives", "[2.0,3.0)")
                            .with_scope(Scope::Runtime)
                    },
                    DependencyEdge::new("junit", "junit", "4.13").with_scope(Scope::Test),
                ],
            }
        );
    }

    #[test]
    fn load_descriptor_without_dependencies() {
        let descriptor = ArtifactDescriptor::from_toml_str("").unwrap();
        assert_eq!(descriptor, ArtifactDescriptor::default());
    }

    #[test]
    fn reject_unknown_keys() {
        let str = r#"
            [[dependencies]]
            group = "org.x"
            name = "util"
            version = "1.0"
            exclusions = []
        "#;
        assert!(ArtifactDescriptor::from_toml_str(str).is_err());
    }

    #[test]
    fn reject_missing_version() {
        let str = r#"
            [[dependencies]]
            group = "org.x"
            name = "util"
        "#;
        assert!(matches!(
            ArtifactDescriptor::from_toml_str(str),
            Err(ParseError::Toml(_))
        ));
    }

    #[test]
    fn filter_dependencies_by_scope() {
        let descriptor = ArtifactDescriptor {
            description: None,
            dependencies: vec![
                DependencyEdge::new("org.x", "a", "1"),
                DependencyEdge::new("org.x", "b", "1").with_scope(Scope::Test),
                DependencyEdge::new("org.x", "c", "1").with_scope(Scope::Runtime),
                DependencyEdge::new("org.x", "d", "1").with_optional(true),
                DependencyEdge::new("org.x", "e", "1").with_scope(Scope::Provided),
            ],
        };
        let names: Vec<&str> = descriptor
            .dependencies_in(&Scope::TRANSITIVE)
            .map(|edge| edge.name.as_str())
            .collect();
        assert_eq!(names, vec!["a", "c"]);
    }

    #[test]
    fn write_then_read_descriptor() {
        let descriptor = ArtifactDescriptor {
            description: None,
            dependencies: vec![DependencyEdge::new("org.x", "util", "1.0")],
        };
        let text = descriptor.to_toml_string().unwrap();
        assert_eq!(ArtifactDescriptor::from_toml_str(&text).unwrap(), descriptor);
    }
}
