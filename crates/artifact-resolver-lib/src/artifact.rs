//! Artifact coordinates, versions and the dependency type the resolver works with.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Serialize, Deserialize};

mod version;
pub use version::Version;
pub use version::compare;

mod version_specifier;
pub use version_specifier::VersionSpecifier;

mod dependency;
pub use dependency::Dependency;

static SPEC_PATTERN: Lazy<Regex> = Lazy::new(|| {
	Regex::new(r"^([^:\s]+):([^:\s]+)(?::([^:\s]+))?$").expect("artifact spec pattern should compile.")
});

/// `group:artifact`, identifies an artifact regardless of version.
pub fn versionless_key(group: &str, artifact: &str) -> String {
	format!("{}:{}", group, artifact)
}

/// Splits a versionless key back into `(group, artifact)`.
pub fn split_versionless_key(key: &str) -> Option<(&str, &str)> {
	key.split_once(':')
}

/// An artifact coordinate with a version specifier, written `group:artifact[:version]`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ArtifactSpec {
	pub group: String,
	pub artifact: String,
	pub version: String,
}

impl ArtifactSpec {
	pub fn new(group: impl Into<String>, artifact: impl Into<String>, version: impl Into<String>) -> Self {
		Self {
			group: group.into(),
			artifact: artifact.into(),
			version: version.into(),
		}
	}

	pub fn versionless_key(&self) -> String {
		versionless_key(&self.group, &self.artifact)
	}
}

impl std::str::FromStr for ArtifactSpec {
	type Err = crate::Error;
	/// A missing version is `LATEST`.
	fn from_str(s: &str) -> Result<Self, Self::Err> {
		let captures = SPEC_PATTERN.captures(s.trim())
			.ok_or_else(|| crate::Error::Parse(format!("\"{}\" is not a group:artifact[:version] spec", s)))?;
		Ok(ArtifactSpec::new(
			&captures[1],
			&captures[2],
			captures.get(3).map_or("LATEST", |m| m.as_str()),
		))
	}
}

impl std::fmt::Display for ArtifactSpec {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		write!(f, "{}:{}:{}", self.group, self.artifact, self.version)
	}
}
