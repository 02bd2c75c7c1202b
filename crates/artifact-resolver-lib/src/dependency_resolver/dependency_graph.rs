//! Module for only DependencyGraph functions not related to the overall resolving process.

use petgraph::prelude::*;
use serde::{Serialize, Deserialize};

use crate::artifact::Dependency;
use super::Requester;

/// Records who requires which artifact during a resolution pass.
///
/// Every artifact gets one node, every requirement placed on it is an incoming edge.
/// Requirements from clients come from the `Meta` node.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DependencyGraph {
	pub graph: StableDiGraph<NodeData, EdgeData>,
	pub meta_node: NodeIndex,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum NodeData {
	/// Control node for giving the clients requests a presence in the graph.
	Meta,
	/// An artifact identified by its versionless key.
	Artifact(String),
}

/// A requirement from the source node on the target artifact.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EdgeData {
	pub requester: Requester,
	/// The requirement as written, without any possible versions.
	pub dependency: Dependency,
}

impl DependencyGraph {
	pub fn get_node_index(&self, key: &str) -> Option<NodeIndex> {
		self.graph.node_indices()
			.find(|i| matches!(&self.graph[*i], NodeData::Artifact(k) if k == key))
	}

	/// Returns the index of the existing node or a new node for `key`
	pub fn get_or_add_node_index(&mut self, key: &str) -> NodeIndex {
		self.get_node_index(key)
			.unwrap_or_else(|| self.graph.add_node(NodeData::Artifact(key.to_string())))
	}

	pub fn get_node_identifier(&self, src: NodeIndex) -> Option<&String> {
		if let NodeData::Artifact(key) = self.graph.node_weight(src)? {
			Some(key)
		} else {
			None
		}
	}

	/// Adds a requirement on `dependency` from `src`, creating the artifact node if needed.
	pub fn add_requirement(&mut self, src: NodeIndex, requester: Requester, dependency: Dependency) -> NodeIndex {
		let target = self.get_or_add_node_index(&dependency.versionless_key());
		self.graph.add_edge(src, target, EdgeData { requester, dependency });
		target
	}

	/// Every requirement placed on `src` in the order they were added.
	pub fn requirements_for_node(&self, src: NodeIndex) -> Vec<&EdgeData> {
		let mut edges: Vec<_> = self.graph.edges_directed(src, Incoming).collect();
		edges.sort_by_key(|e| e.id());
		edges.into_iter().map(|e| e.weight()).collect()
	}

	pub fn has_top_level_requirement(&self, src: NodeIndex) -> bool {
		self.graph.edges_directed(src, Incoming).any(|e| e.source() == self.meta_node)
	}

	/// Artifacts `src` requires, by versionless key.
	pub fn requirements_of_node(&self, src: NodeIndex) -> Vec<&String> {
		let mut edges: Vec<_> = self.graph.edges_directed(src, Outgoing).collect();
		edges.sort_by_key(|e| e.id());
		edges.into_iter()
			.filter_map(|e| self.get_node_identifier(e.target()))
			.collect()
	}
}

impl Default for DependencyGraph {
	fn default() -> Self {
		let mut graph = StableDiGraph::<NodeData, EdgeData>::default();
		let meta_node = graph.add_node(NodeData::Meta);
		Self { graph, meta_node }
	}
}

#[cfg(test)]
mod test {
	use super::*;

	#[test]
	fn dependency_graph_tracks_requirements_in_order() {
		let mut g = DependencyGraph::default();
		let meta = g.meta_node;
		let a = g.add_requirement(meta, Requester::Client("first".into()), Dependency::new("test", "a", "1.0+"));
		let b = g.add_requirement(a, Requester::Artifact { key: "test:a".into(), version: "1.0".into() }, Dependency::new("test", "b", "2.0"));
		g.add_requirement(meta, Requester::Client("second".into()), Dependency::new("test", "b", "2+"));

		assert_eq!(g.get_node_index("test:b"), Some(b));
		assert!(g.has_top_level_requirement(a));
		assert!(g.has_top_level_requirement(b));

		let versions: Vec<_> = g.requirements_for_node(b).iter().map(|e| e.dependency.version().to_string()).collect();
		assert_eq!(versions, vec!["2.0", "2+"]);
		assert_eq!(g.requirements_of_node(a), vec!["test:b"]);
	}

	#[test]
	fn dependency_graph_reuses_nodes() {
		let mut g = DependencyGraph::default();
		let first = g.get_or_add_node_index("test:a");
		let second = g.get_or_add_node_index("test:a");
		assert_eq!(first, second);
		assert_eq!(g.get_node_identifier(first).map(String::as_str), Some("test:a"));
		assert_eq!(g.get_node_identifier(g.meta_node), None);
	}
}
