//! The result of a successful resolve.

use std::collections::BTreeMap;
use std::path::PathBuf;

use serde::Serialize;

use crate::artifact::{Dependency, Version};
use super::{DependencyGraph, Requester};

/// An artifact and the version picked for it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResolvedDependency {
	/// The merged requirement, its possible versions are every version left acceptable.
	pub dependency: Dependency,
	/// The best version of `dependency`.
	pub version: Version,
	pub requested_by: Vec<Requester>,
	/// Where the repository keeps the artifact file, when it knows.
	pub artifact_path: Option<PathBuf>,
}

impl ResolvedDependency {
	/// `group:artifact:version` using the resolved version.
	pub fn coordinate(&self) -> String {
		format!("{}:{}", self.dependency.versionless_key(), self.version)
	}

	/// `true` when no client asked for this artifact directly.
	pub fn is_transitive(&self) -> bool {
		!self.requested_by.iter().any(|r| matches!(r, Requester::Client(_)))
	}
}

#[derive(Debug, Clone, Serialize)]
pub struct Resolution {
	dependencies: BTreeMap<String, ResolvedDependency>,
	#[serde(skip)]
	dep_graph: DependencyGraph,
}

impl Resolution {
	pub(super) fn new(dependencies: BTreeMap<String, ResolvedDependency>, dep_graph: DependencyGraph) -> Self {
		Self {
			dependencies,
			dep_graph,
		}
	}

	/// Looks up an artifact by versionless key.
	pub fn get(&self, key: &str) -> Option<&ResolvedDependency> {
		self.dependencies.get(key)
	}

	/// The resolved version of the artifact, by versionless key.
	pub fn version_of(&self, key: &str) -> Option<&Version> {
		self.get(key).map(|d| &d.version)
	}

	/// Resolved artifacts ordered by versionless key.
	pub fn iter(&self) -> impl Iterator<Item = (&String, &ResolvedDependency)> {
		self.dependencies.iter()
	}

	pub fn len(&self) -> usize {
		self.dependencies.len()
	}

	pub fn is_empty(&self) -> bool {
		self.dependencies.is_empty()
	}

	pub fn get_graph(&self) -> &DependencyGraph {
		&self.dep_graph
	}

	/// Artifacts which require `key` with the resolved versions.
	pub fn dependents_of(&self, key: &str) -> Vec<&Requester> {
		self.get(key).map(|d| d.requested_by.iter().collect()).unwrap_or_default()
	}

	/// Versionless keys of the artifacts the resolved version of `key` depends on.
	pub fn requirements_of(&self, key: &str) -> Vec<&String> {
		self.dep_graph.get_node_index(key)
			.map(|i| self.dep_graph.requirements_of_node(i))
			.unwrap_or_default()
	}

	pub fn into_dependencies(self) -> BTreeMap<String, ResolvedDependency> {
		self.dependencies
	}
}
