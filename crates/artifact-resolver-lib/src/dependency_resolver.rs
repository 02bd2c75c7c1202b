//! Picks one concrete version for every artifact requested directly or pulled in transitively.
//!
//! # Usage
//! 1. Create a [`ResolverBuilder`] with the [`Repository`](crate::repository::Repository) to scan.
//! 1. Use the builder to add requests and choose the resolution mode.
//! 1. [`ResolverBuilder::build()`] to get a [`ResolverProcessor`]
//! 1. [`ResolverProcessor::resolve()`] to get a [`Resolution`] or the [`ResolutionError`] that stopped it.
//!
//! Most callers should go through [`ResolutionContext`](crate::ResolutionContext) which keeps the requests of every client.
//!
//! # Modes
//! - Strict: every requirement on an artifact must agree on a version. When a transitive requirement can't be met
//! the version that introduced it is dropped and the next best version is tried.
//! - Use latest: top level requests win over transitive pins and otherwise the newest requirement wins.
//! It never invents versions, if a requirement matches nothing it still fails.

use serde::{Serialize, Deserialize};

use crate::artifact::Dependency;

mod dependency_graph;
pub use dependency_graph::DependencyGraph;
pub use dependency_graph::NodeData;
pub use dependency_graph::EdgeData;

mod resolver_builder;
pub use resolver_builder::ResolverBuilder;
mod processing_resolver;
pub use processing_resolver::ResolverProcessor;
mod finalized_resolver;
pub use finalized_resolver::Resolution;
pub use finalized_resolver::ResolvedDependency;

/// A direct request from a client for the resolver to fulfill.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResolveRequest {
	pub client: String,
	pub dependency: Dependency,
}

/// Who placed a requirement on an artifact.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Requester {
	/// Requested directly by a client.
	Client(String),
	/// A dependency declared by `version` of the artifact `key`.
	Artifact { key: String, version: String },
}

impl std::fmt::Display for Requester {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		match self {
			Requester::Client(name) => write!(f, "client '{}'", name),
			Requester::Artifact { key, version } => write!(f, "{}:{}", key, version),
		}
	}
}

/// These errors halt the resolver.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ResolutionError {
	/// No repository has any version of the artifact.
	#[error("artifact {key} not found in any repository")]
	ArtifactNotFound { key: String },
	/// The requirements placed on the artifact have no version in common.
	#[error("no version of {key} satisfies all requirements: {}", .specifiers.join(", "))]
	Conflict {
		key: String,
		/// Each requirement as `specifier (required by requester)`.
		specifiers: Vec<String>,
	},
}

impl ResolutionError {
	/// Versionless key of the artifact that couldn't be resolved.
	pub fn key(&self) -> &str {
		match self {
			ResolutionError::ArtifactNotFound { key } | ResolutionError::Conflict { key, .. } => key,
		}
	}
}
