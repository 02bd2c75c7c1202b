use std::path::{Path, PathBuf};

use crate::artifact::ArtifactSpec;
use super::{Repository, RepositoryError};
use super::pom::{Pom, parse_metadata_versions};

/// File extensions tried when the POM doesn't say what the artifact is packaged as.
const PACKAGING_FALLBACKS: [&str; 3] = ["aar", "jar", "srcaar"];

/// A Maven repository laid out on disk, such as the ones shipped in the Android SDK's `extras` directory.
///
/// Artifacts are found under `<root>/<group with '.' as '/'>/<artifact>/<version>/`.
#[derive(Debug, Clone)]
pub struct MavenDirectoryRepository {
	root: PathBuf,
}

impl MavenDirectoryRepository {
	pub fn new(root: impl Into<PathBuf>) -> Self {
		Self { root: root.into() }
	}

	pub fn root(&self) -> &Path {
		&self.root
	}

	fn artifact_dir(&self, group: &str, artifact: &str) -> PathBuf {
		group.split('.')
			.fold(self.root.clone(), |path, part| path.join(part))
			.join(artifact)
	}

	fn pom_path(&self, group: &str, artifact: &str, version: &str) -> PathBuf {
		self.artifact_dir(group, artifact)
			.join(version)
			.join(format!("{}-{}.pom", artifact, version))
	}

	fn read_pom(&self, group: &str, artifact: &str, version: &str) -> Result<Pom, RepositoryError> {
		let path = self.pom_path(group, artifact, version);
		let xml = match std::fs::read_to_string(&path) {
			Ok(xml) => xml,
			Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Err(RepositoryError::NotFound),
			Err(e) => return Err(e.into()),
		};
		log::trace!("Reading POM {}", path.display());
		Pom::parse(&xml)
	}

	/// Versions are the sub-directories holding a matching POM.
	fn scan_version_dirs(&self, artifact_dir: &Path, artifact: &str) -> Result<Vec<String>, RepositoryError> {
		let mut versions = Vec::new();
		for entry in walkdir::WalkDir::new(artifact_dir).min_depth(1).max_depth(1).sort_by_file_name() {
			let entry = entry.map_err(|e| RepositoryError::Metadata(e.to_string()))?;
			if !entry.file_type().is_dir() {
				continue;
			}
			if let Some(version) = entry.file_name().to_str() {
				if entry.path().join(format!("{}-{}.pom", artifact, version)).is_file() {
					versions.push(version.to_string());
				}
			}
		}
		Ok(versions)
	}
}

impl Repository for MavenDirectoryRepository {
	fn list_available_versions(&self, group: &str, artifact: &str) -> Result<Vec<String>, RepositoryError> {
		let artifact_dir = self.artifact_dir(group, artifact);
		if !artifact_dir.is_dir() {
			return Err(RepositoryError::NotFound)
		}

		let metadata = artifact_dir.join("maven-metadata.xml");
		let versions = if metadata.is_file() {
			log::trace!("Reading versions from {}", metadata.display());
			parse_metadata_versions(&std::fs::read_to_string(metadata)?)?
		} else {
			log::trace!("No maven-metadata.xml in {}, scanning version directories", artifact_dir.display());
			self.scan_version_dirs(&artifact_dir, artifact)?
		};

		log::debug!("Found {} version(s) of {}:{} in {}", versions.len(), group, artifact, self.root.display());
		Ok(versions)
	}

	fn declared_dependencies(&self, group: &str, artifact: &str, version: &str) -> Result<Vec<ArtifactSpec>, RepositoryError> {
		Ok(self.read_pom(group, artifact, version)?.dependencies)
	}

	fn artifact_location(&self, group: &str, artifact: &str, version: &str) -> Option<PathBuf> {
		let version_dir = self.artifact_dir(group, artifact).join(version);
		let packaging = self.read_pom(group, artifact, version).ok().and_then(|p| p.packaging);

		let location = packaging.iter().map(String::as_str)
			.chain(PACKAGING_FALLBACKS)
			.map(|ext| version_dir.join(format!("{}-{}.{}", artifact, version, ext)))
			.find(|path| path.is_file());
		location
	}
}
