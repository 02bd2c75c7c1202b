//! JSON description of what each client depends on.
//!
//! ```json
//! {
//! 	"clients": {
//! 		"play-games": [
//! 			{ "spec": "com.google.android.gms:play-services-games:9.8.0+", "package_ids": ["extra-google-m2repository"] }
//! 		]
//! 	}
//! }
//! ```

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Serialize, Deserialize};

use crate::artifact::{ArtifactSpec, Dependency};
use crate::ResolutionContext;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ManifestEntry {
	/// `group:artifact[:version]`
	pub spec: String,
	#[serde(default, skip_serializing_if = "Vec::is_empty")]
	pub package_ids: Vec<String>,
	#[serde(default, skip_serializing_if = "Vec::is_empty")]
	pub repositories: Vec<String>,
}

impl ManifestEntry {
	pub fn to_dependency(&self) -> crate::Result<Dependency> {
		let spec: ArtifactSpec = self.spec.parse()?;
		Ok(Dependency::from(&spec)
			.with_package_ids(self.package_ids.iter().cloned())
			.with_repositories(self.repositories.iter().cloned()))
	}
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DependencyManifest {
	pub clients: BTreeMap<String, Vec<ManifestEntry>>,
}

impl DependencyManifest {
	pub fn load_from_file(path: impl AsRef<Path>) -> crate::Result<Self> {
		let f = std::fs::File::open(path)?;
		Ok(serde_json::from_reader(std::io::BufReader::new(f))?)
	}

	pub fn save_to_file(&self, path: impl AsRef<Path>) -> crate::Result<()> {
		let f = std::fs::File::create(path)?;
		serde_json::to_writer_pretty(f, self)?;
		Ok(())
	}

	/// Builds a manifest from the requests currently in `context`.
	pub fn from_context(context: &ResolutionContext) -> Self {
		let mut manifest = Self::default();
		for name in context.clients() {
			manifest.clients.entry(name).or_default();
		}
		for (client, dependency) in context.all_dependencies() {
			manifest.clients.entry(client).or_default().push(ManifestEntry {
				spec: dependency.key(),
				package_ids: dependency.package_ids().to_vec(),
				repositories: dependency.repositories().to_vec(),
			});
		}
		manifest
	}

	/// Registers every client and its dependencies with `context`.
	///
	/// Every spec is parsed before anything is registered so a bad entry leaves the context unchanged.
	pub fn register(&self, context: &ResolutionContext) -> crate::Result<()> {
		let clients = self.clients.iter()
			.map(|(name, entries)| {
				let dependencies = entries.iter().map(ManifestEntry::to_dependency).collect::<crate::Result<Vec<_>>>()?;
				Ok((name, dependencies))
			})
			.collect::<crate::Result<Vec<_>>>()?;

		for (name, dependencies) in clients {
			let client = context.register_client(name.as_str());
			for dependency in dependencies {
				client.add_dependency(dependency);
			}
		}
		Ok(())
	}
}
