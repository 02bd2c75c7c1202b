//! Various helper functions for testing
//!
//! functions in this module should use results and not use any panics to avoid confusion in callers

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use artifact_resolver::artifact::versionless_key;
use artifact_resolver::repository::RepositoryError;
use artifact_resolver::{ArtifactSpec, MavenDirectoryRepository, Repository};

#[derive(Debug, thiserror::Error)]
pub enum FixtureError {
	#[error("IO error: {0}")]
	IO(#[from] std::io::Error),
	#[error("{0}")]
	Resolver(#[from] artifact_resolver::Error),
}

/// Artifacts and their declared dependencies kept in memory.
///
/// ```ignore
/// let repo = MemoryRepository::new()
/// 	.artifact("test", "app", &["1.0", "2.0"])
/// 	.depends("test", "app", "2.0", "test:lib:1.0+");
/// ```
#[derive(Debug, Default, Clone)]
pub struct MemoryRepository {
	/// Versionless key to version to dependency specs.
	artifacts: BTreeMap<String, BTreeMap<String, Vec<String>>>,
}

impl MemoryRepository {
	pub fn new() -> Self {
		Self::default()
	}

	/// Adds versions of an artifact with no dependencies.
	pub fn artifact(mut self, group: &str, artifact: &str, versions: &[&str]) -> Self {
		let entry = self.artifacts.entry(versionless_key(group, artifact)).or_default();
		for v in versions {
			entry.entry(v.to_string()).or_default();
		}
		self
	}

	/// Makes `version` of the artifact depend on `spec`, adding the version if needed.
	pub fn depends(mut self, group: &str, artifact: &str, version: &str, spec: &str) -> Self {
		self.artifacts.entry(versionless_key(group, artifact)).or_default()
			.entry(version.to_string()).or_default()
			.push(spec.to_string());
		self
	}
}

impl Repository for MemoryRepository {
	fn list_available_versions(&self, group: &str, artifact: &str) -> Result<Vec<String>, RepositoryError> {
		self.artifacts.get(&versionless_key(group, artifact))
			.map(|versions| versions.keys().cloned().collect())
			.ok_or(RepositoryError::NotFound)
	}

	fn declared_dependencies(&self, group: &str, artifact: &str, version: &str) -> Result<Vec<ArtifactSpec>, RepositoryError> {
		let specs = self.artifacts.get(&versionless_key(group, artifact))
			.and_then(|versions| versions.get(version))
			.ok_or(RepositoryError::NotFound)?;
		specs.iter()
			.map(|s| s.parse::<ArtifactSpec>().map_err(|e| RepositoryError::Metadata(e.to_string())))
			.collect()
	}
}

/// A Maven directory layout inside a temporary directory, removed on drop.
#[derive(Debug)]
pub struct MavenTree {
	dir: tempfile::TempDir,
}

impl MavenTree {
	pub fn new() -> Result<Self, FixtureError> {
		Ok(Self { dir: tempfile::tempdir()? })
	}

	pub fn path(&self) -> &Path {
		self.dir.path()
	}

	pub fn repository(&self) -> MavenDirectoryRepository {
		MavenDirectoryRepository::new(self.path())
	}

	pub fn artifact_dir(&self, group: &str, artifact: &str) -> PathBuf {
		group.split('.')
			.fold(self.path().to_path_buf(), |path, part| path.join(part))
			.join(artifact)
	}

	/// Writes `maven-metadata.xml` listing `versions`.
	pub fn metadata(&self, group: &str, artifact: &str, versions: &[&str]) -> Result<PathBuf, FixtureError> {
		let dir = self.artifact_dir(group, artifact);
		std::fs::create_dir_all(&dir)?;

		let versions: String = versions.iter()
			.map(|v| format!("      <version>{}</version>\n", v))
			.collect();
		let xml = format!(
"<?xml version=\"1.0\" encoding=\"UTF-8\"?>
<metadata>
  <groupId>{group}</groupId>
  <artifactId>{artifact}</artifactId>
  <versioning>
    <versions>
{versions}    </versions>
  </versioning>
</metadata>
");
		let path = dir.join("maven-metadata.xml");
		std::fs::write(&path, xml)?;
		Ok(path)
	}

	/// Writes the POM for a version, `dependencies` are `group:artifact[:version]` specs.
	///
	/// `LATEST` dependencies are written without a version.
	pub fn pom(&self, group: &str, artifact: &str, version: &str, packaging: &str, dependencies: &[&str]) -> Result<PathBuf, FixtureError> {
		let dir = self.artifact_dir(group, artifact).join(version);
		std::fs::create_dir_all(&dir)?;

		let mut deps = String::new();
		for d in dependencies {
			let spec: ArtifactSpec = d.parse()?;
			deps += "    <dependency>\n";
			deps += &format!("      <groupId>{}</groupId>\n      <artifactId>{}</artifactId>\n", spec.group, spec.artifact);
			if !spec.version.eq_ignore_ascii_case("LATEST") {
				deps += &format!("      <version>{}</version>\n", spec.version);
			}
			deps += "    </dependency>\n";
		}
		let xml = format!(
"<?xml version=\"1.0\" encoding=\"UTF-8\"?>
<project xmlns=\"http://maven.apache.org/POM/4.0.0\">
  <modelVersion>4.0.0</modelVersion>
  <groupId>{group}</groupId>
  <artifactId>{artifact}</artifactId>
  <version>{version}</version>
  <packaging>{packaging}</packaging>
  <dependencies>
{deps}  </dependencies>
</project>
");
		let path = dir.join(format!("{}-{}.pom", artifact, version));
		std::fs::write(&path, xml)?;
		Ok(path)
	}

	/// Creates an empty artifact file next to the POM.
	pub fn artifact_file(&self, group: &str, artifact: &str, version: &str, extension: &str) -> Result<PathBuf, FixtureError> {
		let dir = self.artifact_dir(group, artifact).join(version);
		std::fs::create_dir_all(&dir)?;
		let path = dir.join(format!("{}-{}.{}", artifact, version, extension));
		std::fs::File::create(&path)?;
		Ok(path)
	}
}
