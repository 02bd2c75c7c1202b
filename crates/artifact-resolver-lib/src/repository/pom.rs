//! Reading `maven-metadata.xml` and `.pom` files.

use roxmltree::{Document, Node};

use crate::artifact::ArtifactSpec;
use super::RepositoryError;

/// Scopes which aren't needed to use the artifact.
const SKIPPED_SCOPES: [&str; 3] = ["test", "provided", "system"];

/// The parts of a POM the resolver cares about.
#[derive(Debug, Default, Clone, PartialEq)]
pub(super) struct Pom {
	pub packaging: Option<String>,
	pub dependencies: Vec<ArtifactSpec>,
}

impl Pom {
	pub fn parse(xml: &str) -> Result<Self, RepositoryError> {
		let document = Document::parse(xml).map_err(|e| RepositoryError::Metadata(format!("failed to parse POM: {}", e)))?;
		let project = document.root_element();
		if project.tag_name().name() != "project" {
			return Err(RepositoryError::Metadata("POM is missing <project>".to_string()))
		}

		let dependencies = match child(&project, "dependencies") {
			Some(deps) => deps.children()
				.filter(|c| c.is_element() && c.tag_name().name() == "dependency")
				.filter_map(|d| parse_dependency(&d))
				.collect(),
			None => Vec::new(),
		};

		Ok(Pom {
			packaging: node_text(&project, "packaging"),
			dependencies,
		})
	}
}

/// Versions listed under `metadata/versioning/versions`.
pub(super) fn parse_metadata_versions(xml: &str) -> Result<Vec<String>, RepositoryError> {
	let document = Document::parse(xml).map_err(|e| RepositoryError::Metadata(format!("failed to parse maven-metadata.xml: {}", e)))?;
	let versions = child(&document.root_element(), "versioning")
		.and_then(|versioning| child(&versioning, "versions"))
		.map(|versions| {
			versions.children()
				.filter(|c| c.is_element() && c.tag_name().name() == "version")
				.filter_map(|c| c.text())
				.map(|t| t.trim().to_string())
				.filter(|t| !t.is_empty())
				.collect()
		})
		.unwrap_or_default();
	Ok(versions)
}

/// Returns `None` for dependencies that don't need resolving.
fn parse_dependency(node: &Node<'_, '_>) -> Option<ArtifactSpec> {
	let group = node_text(node, "groupId")?;
	let artifact = node_text(node, "artifactId")?;

	if let Some(scope) = node_text(node, "scope") {
		if SKIPPED_SCOPES.contains(&scope.as_str()) {
			log::trace!("Skipping {}:{} with scope {}", group, artifact, scope);
			return None
		}
	}
	if node_text(node, "optional").map_or(false, |o| o.eq_ignore_ascii_case("true")) {
		log::trace!("Skipping optional {}:{}", group, artifact);
		return None
	}

	let version = match node_text(node, "version") {
		Some(v) => maven_range_to_specifier(&v),
		None => "LATEST".to_string(),
	};

	Some(ArtifactSpec::new(group, artifact, version))
}

/// Maven writes pinned versions as `[1.2.3]`, any other range has no equivalent specifier.
fn maven_range_to_specifier(version: &str) -> String {
	let is_range = version.starts_with('[') || version.starts_with('(');
	if !is_range {
		return version.to_string()
	}

	let inner = version.trim_matches(|c| matches!(c, '[' | ']' | '(' | ')'));
	if version.starts_with('[') && version.ends_with(']') && !inner.contains(',') {
		inner.trim().to_string()
	} else {
		log::warn!("Unsupported version range {}, using LATEST", version);
		"LATEST".to_string()
	}
}

fn child<'a, 'input>(node: &Node<'a, 'input>, tag: &str) -> Option<Node<'a, 'input>> {
	node.children().find(|c| c.is_element() && c.tag_name().name() == tag)
}

fn node_text(node: &Node<'_, '_>, tag: &str) -> Option<String> {
	child(node, tag)
		.and_then(|c| c.text())
		.map(|t| t.trim().to_string())
		.filter(|t| !t.is_empty())
}

#[cfg(test)]
mod test {
	use super::*;

	const POM: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<project xmlns="http://maven.apache.org/POM/4.0.0">
  <modelVersion>4.0.0</modelVersion>
  <groupId>com.google.android.gms</groupId>
  <artifactId>play-services-ads</artifactId>
  <version>9.8.0</version>
  <packaging>aar</packaging>
  <dependencies>
    <dependency>
      <groupId>com.google.android.gms</groupId>
      <artifactId>play-services-basement</artifactId>
      <version>[9.8.0]</version>
    </dependency>
    <dependency>
      <groupId>com.android.support</groupId>
      <artifactId>support-v4</artifactId>
      <version>24.0.0</version>
      <scope>compile</scope>
    </dependency>
    <dependency>
      <groupId>junit</groupId>
      <artifactId>junit</artifactId>
      <version>4.12</version>
      <scope>test</scope>
    </dependency>
    <dependency>
      <groupId>com.example</groupId>
      <artifactId>extra</artifactId>
      <optional>true</optional>
    </dependency>
    <dependency>
      <groupId>com.example</groupId>
      <artifactId>unversioned</artifactId>
    </dependency>
  </dependencies>
</project>"#;

	#[test]
	fn pom_reads_dependencies() {
		let pom = Pom::parse(POM).unwrap();
		assert_eq!(pom.packaging.as_deref(), Some("aar"));
		assert_eq!(pom.dependencies, vec![
			ArtifactSpec::new("com.google.android.gms", "play-services-basement", "9.8.0"),
			ArtifactSpec::new("com.android.support", "support-v4", "24.0.0"),
			ArtifactSpec::new("com.example", "unversioned", "LATEST"),
		]);
	}

	#[test]
	fn pom_without_dependencies() {
		let pom = Pom::parse("<project><packaging>jar</packaging></project>").unwrap();
		assert!(pom.dependencies.is_empty());
	}

	#[test]
	fn pom_rejects_other_documents() {
		assert!(Pom::parse("<metadata/>").is_err());
		assert!(Pom::parse("not xml").is_err());
	}

	#[test]
	fn maven_ranges() {
		assert_eq!(maven_range_to_specifier("[1.2.3]"), "1.2.3");
		assert_eq!(maven_range_to_specifier("1.2+"), "1.2+");
		assert_eq!(maven_range_to_specifier("[1.0,2.0)"), "LATEST");
	}

	#[test]
	fn metadata_versions() {
		let xml = r#"<metadata>
  <groupId>test</groupId>
  <artifactId>artifact</artifactId>
  <versioning>
    <release>2.0</release>
    <versions>
      <version>1.0</version>
      <version>2.0</version>
    </versions>
  </versioning>
</metadata>"#;
		assert_eq!(parse_metadata_versions(xml).unwrap(), vec!["1.0", "2.0"]);
	}
}
