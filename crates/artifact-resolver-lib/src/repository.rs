//! Where the resolver learns which versions exist and what each version depends on.
//!
//! The resolver only talks to the [`Repository`] trait. [`MavenDirectoryRepository`] reads a Maven
//! layout on disk and [`RepositorySet`] searches several repositories as one.

use std::path::PathBuf;

use crate::artifact::ArtifactSpec;

mod maven_directory;
pub use maven_directory::MavenDirectoryRepository;

mod pom;

#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
	/// The repository has no record of the artifact or version.
	#[error("not found")]
	NotFound,
	#[error("IO error: {0}")]
	IO(#[from] std::io::Error),
	/// Metadata exists but couldn't be read.
	#[error("metadata error: {0}")]
	Metadata(String),
}

/// A source of artifact versions and their metadata.
pub trait Repository: std::fmt::Debug + Send + Sync {
	/// Every version of the artifact this repository holds, in no particular order.
	fn list_available_versions(&self, group: &str, artifact: &str) -> Result<Vec<String>, RepositoryError>;

	/// The dependencies `version` of the artifact declares for itself.
	fn declared_dependencies(&self, group: &str, artifact: &str, version: &str) -> Result<Vec<ArtifactSpec>, RepositoryError>;

	/// Path to the file for the artifact version, if the repository stores files.
	fn artifact_location(&self, _group: &str, _artifact: &str, _version: &str) -> Option<PathBuf> {
		None
	}
}

/// Several repositories searched as one.
///
/// - Versions are the union of every member.
/// - Metadata comes from the first member that has the version.
/// - [`RepositoryError::NotFound`] is only returned when no member has the artifact,
/// other member errors are logged and skipped.
#[derive(Debug, Default)]
pub struct RepositorySet {
	repositories: Vec<Box<dyn Repository>>,
}

impl RepositorySet {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn add(&mut self, repository: impl Repository + 'static) {
		self.repositories.push(Box::new(repository));
	}

	pub fn with(mut self, repository: impl Repository + 'static) -> Self {
		self.add(repository);
		self
	}

	pub fn len(&self) -> usize {
		self.repositories.len()
	}

	pub fn is_empty(&self) -> bool {
		self.repositories.is_empty()
	}
}

impl Repository for RepositorySet {
	fn list_available_versions(&self, group: &str, artifact: &str) -> Result<Vec<String>, RepositoryError> {
		let mut found = false;
		let mut versions = Vec::<String>::new();
		for repository in &self.repositories {
			match repository.list_available_versions(group, artifact) {
				Ok(v) => {
					found = true;
					for version in v {
						if !versions.contains(&version) {
							versions.push(version);
						}
					}
				},
				Err(RepositoryError::NotFound) => {},
				Err(e) => log::warn!("Skipping repository {:?} while listing {}:{}: {}", repository, group, artifact, e),
			}
		}

		if found { Ok(versions) } else { Err(RepositoryError::NotFound) }
	}

	fn declared_dependencies(&self, group: &str, artifact: &str, version: &str) -> Result<Vec<ArtifactSpec>, RepositoryError> {
		for repository in &self.repositories {
			match repository.declared_dependencies(group, artifact, version) {
				Ok(deps) => return Ok(deps),
				Err(RepositoryError::NotFound) => {},
				Err(e) => log::warn!("Skipping repository {:?} while reading {}:{}:{}: {}", repository, group, artifact, version, e),
			}
		}
		Err(RepositoryError::NotFound)
	}

	fn artifact_location(&self, group: &str, artifact: &str, version: &str) -> Option<PathBuf> {
		self.repositories.iter().find_map(|r| r.artifact_location(group, artifact, version))
	}
}
