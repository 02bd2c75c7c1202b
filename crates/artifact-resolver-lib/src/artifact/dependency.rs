use std::collections::BTreeSet;

use serde::{Serialize, Deserialize};

use super::*;

/// A requirement on a single artifact along with the versions known to satisfy it.
///
/// The possible versions start empty and are filled from a repository scan using [`Dependency::add_version`],
/// the resolver then narrows them down with [`Dependency::refine_version_range`] and [`Dependency::remove_possible_version`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Dependency {
	group: String,
	artifact: String,
	/// The specifier as it was written by the requester.
	version: String,
	specifier: VersionSpecifier,
	possible_versions: BTreeSet<Version>,
	/// SDK packages which provide this artifact.
	package_ids: Vec<String>,
	/// Extra repositories the requester wants searched for this artifact.
	repositories: Vec<String>,
}

impl Dependency {
	pub fn new(group: impl Into<String>, artifact: impl Into<String>, version: impl Into<String>) -> Self {
		let version = version.into();
		Self {
			group: group.into(),
			artifact: artifact.into(),
			specifier: VersionSpecifier::parse(&version),
			version,
			possible_versions: Default::default(),
			package_ids: Default::default(),
			repositories: Default::default(),
		}
	}

	pub fn with_package_ids(mut self, package_ids: impl IntoIterator<Item = impl Into<String>>) -> Self {
		self.package_ids = package_ids.into_iter().map(Into::into).collect();
		self
	}

	pub fn with_repositories(mut self, repositories: impl IntoIterator<Item = impl Into<String>>) -> Self {
		self.repositories = repositories.into_iter().map(Into::into).collect();
		self
	}

	/* Fields */

	pub fn group(&self) -> &str {
		&self.group
	}

	pub fn artifact(&self) -> &str {
		&self.artifact
	}

	/// The version specifier string.
	pub fn version(&self) -> &str {
		&self.version
	}

	pub fn specifier(&self) -> &VersionSpecifier {
		&self.specifier
	}

	pub fn package_ids(&self) -> &[String] {
		&self.package_ids
	}

	pub fn repositories(&self) -> &[String] {
		&self.repositories
	}

	/// `group:artifact:version`
	pub fn key(&self) -> String {
		format!("{}:{}", self.versionless_key(), self.version)
	}

	/// `group:artifact`
	pub fn versionless_key(&self) -> String {
		versionless_key(&self.group, &self.artifact)
	}

	/* Possible Versions */

	pub fn is_acceptable_version(&self, version: &Version) -> bool {
		self.specifier.matches(version)
	}

	/// Registers `version` as a candidate if the specifier accepts it.
	///
	/// An exact specifier keeps at most one possible version, later additions are dropped.
	///
	/// Returns `true` if the version was added.
	pub fn add_version(&mut self, version: impl Into<Version>) -> bool {
		let version = version.into();
		if !self.is_acceptable_version(&version) {
			return false
		}
		if self.specifier.is_exact() && !self.possible_versions.is_empty() {
			return false
		}
		self.possible_versions.insert(version)
	}

	/// Returns `true` if the version was present.
	pub fn remove_possible_version(&mut self, version: &Version) -> bool {
		self.possible_versions.remove(version)
	}

	/// Possible versions, newest first.
	pub fn possible_versions(&self) -> impl Iterator<Item = &Version> {
		self.possible_versions.iter().rev()
	}

	/// The newest possible version, `None` when there are no possible versions.
	pub fn best_version(&self) -> Option<&Version> {
		self.possible_versions().find(|v| self.is_acceptable_version(v))
	}

	pub fn has_possible_versions(&self) -> bool {
		self.best_version().is_some()
	}

	/// Narrows the possible versions to the ones `other` also accepts.
	///
	/// Returns `false` when nothing is left, the two requirements can't agree on a version.
	pub fn refine_version_range(&mut self, other: &Dependency) -> bool {
		self.possible_versions.retain(|v| other.is_acceptable_version(v));
		self.has_possible_versions()
	}

	/// Folds the package ids and repositories of `other` into this dependency.
	pub(crate) fn merge_metadata(&mut self, other: &Dependency) {
		for id in &other.package_ids {
			if !self.package_ids.contains(id) {
				self.package_ids.push(id.clone());
			}
		}
		for repository in &other.repositories {
			if !self.repositories.contains(repository) {
				self.repositories.push(repository.clone());
			}
		}
	}
}

impl std::fmt::Display for Dependency {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		write!(f, "{}", self.key())
	}
}

impl From<&ArtifactSpec> for Dependency {
	fn from(spec: &ArtifactSpec) -> Self {
		Dependency::new(spec.group.clone(), spec.artifact.clone(), spec.version.clone())
	}
}
