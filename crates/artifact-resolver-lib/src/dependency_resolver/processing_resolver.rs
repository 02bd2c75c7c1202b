use std::collections::{BTreeMap, HashMap, VecDeque};

use petgraph::prelude::*;

use crate::artifact::*;
use crate::repository::{Repository, RepositoryError};
use super::*;

/// Where a single artifact is within a pass.
#[derive(Debug, Clone, PartialEq)]
enum CandidateState {
	/// Constrained but its dependencies haven't been read yet.
	Unresolved,
	/// The dependencies of this version have been added to the graph.
	Selected(Version),
}

#[derive(Debug, Clone)]
struct Candidate {
	dependency: Dependency,
	state: CandidateState,
}

/// Outcome of a single pass over the requests.
enum PassStatus {
	Complete(Resolution),
	/// `version` of `key` can't be used, remove it and run another pass.
	Retry { key: String, version: Version, cause: ResolutionError },
	/// `version` of `key` was selected before a later requirement ruled it out in this pass.
	Narrowed { key: String, version: Version, cause: ResolutionError },
	Failed(ResolutionError),
}

/// Resolves a fixed set of requests against a repository.
///
/// # Process
/// Resolving runs in passes, each pass starts from an empty [`DependencyGraph`]:
/// 1. Every request is added as a requirement from the meta node and each requested artifact is constrained.
/// Top level requests that can't agree fail the resolve straight away.
/// 1. Artifacts are visited breadth first. Visiting selects the best version and adds the
/// dependencies that version declares as requirements, constraining each dependency again.
/// 1. When a requirement can't be met the version which introduced it is rejected and the pass restarts.
/// 1. When an artifact that was already visited ends up with a different best version, the old version
/// is skipped and the pass restarts.
///
/// Rejected versions stay rejected for the remaining passes. Skipped versions only depend on the requirements
/// of the current selection so they are forgotten whenever a version is rejected, and they are ignored when
/// skipping would leave an artifact without versions. Every restart either rejects a version or skips a new
/// one so the resolve always ends.
#[derive(Debug)]
pub struct ResolverProcessor<'r> {
	repository: &'r dyn Repository,
	use_latest: bool,
	requests: Vec<ResolveRequest>,

	/// Versions found for each versionless key, `None` when the artifact wasn't found.
	available: HashMap<String, Option<Vec<Version>>>,
	/// Dependencies declared by each `(versionless key, version)`.
	declared: HashMap<(String, String), Vec<ArtifactSpec>>,

	/// Versions ruled out by earlier passes.
	rejected: HashMap<String, Vec<Version>>,
	/// Versions to skip while the rejected set stays the same.
	skipped: HashMap<String, Vec<Version>>,
	/// Why the last version of an artifact was rejected.
	rejection_causes: HashMap<String, ResolutionError>,
	passes: usize,
}

impl<'r> ResolverProcessor<'r> {
	pub(super) fn new(repository: &'r dyn Repository, requests: Vec<ResolveRequest>, use_latest: bool) -> Self {
		ResolverProcessor {
			repository,
			use_latest,
			requests,
			available: Default::default(),
			declared: Default::default(),
			rejected: Default::default(),
			skipped: Default::default(),
			rejection_causes: Default::default(),
			passes: 0,
		}
	}

	/// Number of passes run so far.
	pub fn passes(&self) -> usize {
		self.passes
	}

	/// Run passes until every artifact has a version or an artifact can't be resolved.
	pub fn resolve(mut self) -> Result<Resolution, ResolutionError> {
		log::debug!("Resolving {} request(s), use latest: {}", self.requests.len(), self.use_latest);
		loop {
			self.passes += 1;
			log::trace!("Starting resolution pass {}", self.passes);

			match self.run_pass() {
				PassStatus::Complete(resolution) => {
					log::info!("Resolved {} artifact(s) in {} pass(es)", resolution.len(), self.passes);
					return Ok(resolution)
				},
				PassStatus::Retry { key, version, cause } => self.reject(key, version, cause),
				PassStatus::Narrowed { key, version, cause } => {
					let skipped = self.skipped.entry(key.clone()).or_default();
					if skipped.contains(&version) {
						/* Skipping it already failed to keep it out */
						self.reject(key, version, cause);
					} else {
						log::debug!("Skipping {}:{} until a version is rejected", key, version);
						skipped.push(version);
					}
				},
				PassStatus::Failed(e) => {
					log::debug!("Resolution failed after {} pass(es): {}", self.passes, e);
					return Err(e)
				},
			}
		}
	}

	fn reject(&mut self, key: String, version: Version, cause: ResolutionError) {
		log::debug!("Rejecting {}:{}: {}", key, version, cause);
		self.rejected.entry(key.clone()).or_default().push(version);
		self.rejection_causes.insert(key, cause);
		self.skipped.clear();
	}

	fn run_pass(&mut self) -> PassStatus {
		let mut dep_graph = DependencyGraph::default();
		let mut candidates = HashMap::<String, Candidate>::new();
		let mut queue = VecDeque::<String>::new();

		/* Seed with the top level requests */
		for request in &self.requests {
			let key = request.dependency.versionless_key();
			dep_graph.add_requirement(dep_graph.meta_node, Requester::Client(request.client.clone()), request.dependency.clone());
			if !queue.contains(&key) {
				queue.push_back(key);
			}
		}

		for key in &queue {
			let node = dep_graph.get_or_add_node_index(key);
			match self.constrain(&dep_graph, node, key) {
				Ok(dependency) => {
					candidates.insert(key.clone(), Candidate { dependency, state: CandidateState::Unresolved });
				},
				Err(e) => return PassStatus::Failed(e),
			}
		}

		/* Breadth First Search */
		while let Some(key) = queue.pop_front() {
			let (group, artifact, best) = {
				let Some(candidate) = candidates.get_mut(&key) else { continue };
				if let CandidateState::Selected(_) = candidate.state {
					continue;
				}
				let Some(best) = candidate.dependency.best_version().cloned() else {
					/* `constrain` never returns a dependency without possible versions */
					let node = dep_graph.get_or_add_node_index(&key);
					return PassStatus::Failed(self.conflict(&dep_graph, node, &key));
				};
				log::trace!("Selected {}:{}", key, best);
				candidate.state = CandidateState::Selected(best.clone());
				(candidate.dependency.group().to_string(), candidate.dependency.artifact().to_string(), best)
			};

			let node = dep_graph.get_or_add_node_index(&key);
			let requester = Requester::Artifact { key: key.clone(), version: best.to_string() };

			for spec in self.declared_dependencies(&group, &artifact, &best) {
				let child_key = spec.versionless_key();
				let child_node = dep_graph.add_requirement(node, requester.clone(), Dependency::from(&spec));

				let constrained = match self.constrain(&dep_graph, child_node, &child_key) {
					Ok(d) => d,
					Err(cause) => return PassStatus::Retry { key, version: best, cause },
				};

				match candidates.get_mut(&child_key) {
					None => {
						candidates.insert(child_key.clone(), Candidate { dependency: constrained, state: CandidateState::Unresolved });
						queue.push_back(child_key);
					},
					Some(existing) => {
						if let CandidateState::Selected(selected) = &existing.state {
							if constrained.best_version() != Some(selected) {
								/* The dependencies of `selected` are already in the graph and may no longer apply */
								let cause = self.conflict(&dep_graph, child_node, &child_key);
								return PassStatus::Narrowed { key: child_key, version: selected.clone(), cause };
							}
						}
						existing.dependency = constrained;
					},
				}
			}
		}

		PassStatus::Complete(self.finalize(dep_graph, candidates))
	}

	/// Builds the dependency for `key` from every requirement on `node`.
	///
	/// The returned dependency always has possible versions.
	fn constrain(&mut self, dep_graph: &DependencyGraph, node: NodeIndex, key: &str) -> Result<Dependency, ResolutionError> {
		let rejected = self.rejected.get(key).cloned().unwrap_or_default();
		match self.skipped.get(key) {
			Some(skipped) if !skipped.is_empty() => {
				let excluded: Vec<Version> = rejected.iter().chain(skipped).cloned().collect();
				self.constrain_excluding(dep_graph, node, key, &excluded)
					.or_else(|_| self.constrain_excluding(dep_graph, node, key, &rejected))
			},
			_ => self.constrain_excluding(dep_graph, node, key, &rejected),
		}
	}

	fn constrain_excluding(&mut self, dep_graph: &DependencyGraph, node: NodeIndex, key: &str, rejected: &[Version]) -> Result<Dependency, ResolutionError> {
		let requirements = dep_graph.requirements_for_node(node);
		let Some(first) = requirements.first() else {
			return Err(self.conflict(dep_graph, node, key))
		};
		let available = self.available_versions(first.dependency.group(), first.dependency.artifact())?;

		let populate = |template: &Dependency, skip_rejected: bool| -> Dependency {
			let mut dependency = template.clone();
			for version in &available {
				dependency.add_version(version.clone());
			}
			if skip_rejected {
				for version in rejected {
					dependency.remove_possible_version(version);
				}
			}
			dependency
		};

		let merged = if self.use_latest {
			let has_top_level = dep_graph.has_top_level_requirement(node);
			let mut merged: Option<Dependency> = None;

			/* Top level requirements go first so transitive pins can't push them out */
			let (top_level, transitive): (Vec<&&EdgeData>, Vec<&&EdgeData>) = requirements.iter()
				.partition(|e| matches!(e.requester, Requester::Client(_)));

			for edge in top_level.into_iter().chain(transitive) {
				let is_top_level = matches!(edge.requester, Requester::Client(_));
				let dependency = populate(&edge.dependency, true);
				if !dependency.has_possible_versions() {
					if has_top_level && !is_top_level {
						log::warn!("Ignoring {}:{} required by {}, no such version and {} was requested directly", key, edge.dependency.version(), edge.requester, key);
						continue;
					}
					/* Relaxing never makes up versions */
					return Err(self.unsatisfiable(dep_graph, node, key, &populate(&edge.dependency, false)))
				}

				merged = Some(match merged {
					None => dependency,
					Some(current) => {
						let mut trial = current.clone();
						if trial.refine_version_range(&dependency) {
							trial.merge_metadata(&dependency);
							trial
						} else if has_top_level && !is_top_level {
							log::warn!("Ignoring {}:{} required by {}, a newer version was requested directly", key, edge.dependency.version(), edge.requester);
							current
						} else {
							let newest = newest_of(current, dependency);
							log::warn!("Conflicting requirements on {}, using the newest: {}", key, newest.version());
							newest
						}
					},
				});
			}

			merged
		} else {
			let mut merged: Option<Dependency> = None;
			for edge in &requirements {
				let dependency = populate(&edge.dependency, true);
				merged = Some(match merged {
					None => dependency,
					Some(mut current) => {
						current.refine_version_range(&dependency);
						current.merge_metadata(&dependency);
						current
					},
				});
			}
			merged
		};

		match merged {
			Some(dependency) if dependency.has_possible_versions() => Ok(dependency),
			_ => {
				/* Check if earlier passes are the reason nothing is left */
				let mut unrestricted = populate(&first.dependency, false);
				for edge in &requirements[1..] {
					unrestricted.refine_version_range(&edge.dependency);
				}
				Err(self.unsatisfiable(dep_graph, node, key, &unrestricted))
			},
		}
	}

	/// The error for an artifact left without versions.
	///
	/// `unrestricted` is the same requirement ignoring rejected versions, if it has versions then
	/// rejections emptied it and the reason for the last rejection is returned.
	fn unsatisfiable(&self, dep_graph: &DependencyGraph, node: NodeIndex, key: &str, unrestricted: &Dependency) -> ResolutionError {
		if unrestricted.has_possible_versions() {
			if let Some(cause) = self.rejection_causes.get(key) {
				return cause.clone()
			}
		}
		self.conflict(dep_graph, node, key)
	}

	fn conflict(&self, dep_graph: &DependencyGraph, node: NodeIndex, key: &str) -> ResolutionError {
		ResolutionError::Conflict {
			key: key.to_string(),
			specifiers: dep_graph.requirements_for_node(node).iter()
				.map(|e| format!("{} (required by {})", e.dependency.version(), e.requester))
				.collect(),
		}
	}

	/// Scans the repository once per artifact.
	fn available_versions(&mut self, group: &str, artifact: &str) -> Result<Vec<Version>, ResolutionError> {
		let key = versionless_key(group, artifact);
		let repository = self.repository;
		let found = self.available.entry(key.clone()).or_insert_with(|| {
			match repository.list_available_versions(group, artifact) {
				Ok(versions) if !versions.is_empty() => {
					log::debug!("Found {} version(s) of {}", versions.len(), versionless_key(group, artifact));
					Some(versions.iter().map(|v| Version::parse(v)).collect())
				},
				Ok(_) | Err(RepositoryError::NotFound) => None,
				Err(e) => {
					log::warn!("Failed to list versions of {}: {}", versionless_key(group, artifact), e);
					None
				},
			}
		});
		found.clone().ok_or(ResolutionError::ArtifactNotFound { key })
	}

	/// Reads the dependencies declared by an artifact version, missing metadata means no dependencies.
	fn declared_dependencies(&mut self, group: &str, artifact: &str, version: &Version) -> Vec<ArtifactSpec> {
		let repository = self.repository;
		self.declared.entry((versionless_key(group, artifact), version.to_string()))
			.or_insert_with(|| {
				match repository.declared_dependencies(group, artifact, version.as_str()) {
					Ok(deps) => deps,
					Err(RepositoryError::NotFound) => {
						log::debug!("No metadata for {}:{}:{}", group, artifact, version);
						Vec::new()
					},
					Err(e) => {
						log::warn!("Failed to read dependencies of {}:{}:{}: {}", group, artifact, version, e);
						Vec::new()
					},
				}
			})
			.clone()
	}

	fn finalize(&self, dep_graph: DependencyGraph, candidates: HashMap<String, Candidate>) -> Resolution {
		let mut dependencies = BTreeMap::new();
		for (key, candidate) in candidates {
			let version = match candidate.state {
				CandidateState::Selected(v) => v,
				CandidateState::Unresolved => match candidate.dependency.best_version() {
					Some(v) => v.clone(),
					None => continue,
				},
			};

			let requested_by = dep_graph.get_node_index(&key)
				.map(|node| dep_graph.requirements_for_node(node).into_iter().map(|e| e.requester.clone()).collect())
				.unwrap_or_default();
			let artifact_path = self.repository.artifact_location(candidate.dependency.group(), candidate.dependency.artifact(), version.as_str());

			dependencies.insert(key, ResolvedDependency {
				dependency: candidate.dependency,
				version,
				requested_by,
				artifact_path,
			});
		}

		Resolution::new(dependencies, dep_graph)
	}
}

/// The dependency with the newer best version, `current` on a tie.
fn newest_of(current: Dependency, other: Dependency) -> Dependency {
	if other.best_version() > current.best_version() { other } else { current }
}

#[cfg(test)]
mod test {
	use super::*;

	/// Artifact versions and the dependencies each version declares.
	#[derive(Debug, Default)]
	struct TableRepository {
		artifacts: HashMap<String, Vec<(&'static str, Vec<ArtifactSpec>)>>,
	}

	impl TableRepository {
		fn version(mut self, key: &str, version: &'static str, deps: &[&str]) -> Self {
			self.artifacts.entry(key.to_string()).or_default()
				.push((version, deps.iter().map(|d| d.parse().unwrap()).collect()));
			self
		}
	}

	impl Repository for TableRepository {
		fn list_available_versions(&self, group: &str, artifact: &str) -> Result<Vec<String>, RepositoryError> {
			self.artifacts.get(&versionless_key(group, artifact))
				.map(|v| v.iter().map(|(version, _)| version.to_string()).collect())
				.ok_or(RepositoryError::NotFound)
		}

		fn declared_dependencies(&self, group: &str, artifact: &str, version: &str) -> Result<Vec<ArtifactSpec>, RepositoryError> {
			self.artifacts.get(&versionless_key(group, artifact))
				.and_then(|v| v.iter().find(|(v, _)| *v == version))
				.map(|(_, deps)| deps.clone())
				.ok_or(RepositoryError::NotFound)
		}
	}

	fn resolve(repo: &TableRepository, requests: &[&str], use_latest: bool) -> Result<Resolution, ResolutionError> {
		let mut builder = ResolverBuilder::new(repo).use_latest(use_latest);
		for r in requests {
			let spec: ArtifactSpec = r.parse().unwrap();
			builder = builder.add_request("test", Dependency::from(&spec));
		}
		builder.build().resolve()
	}

	fn version_of(resolution: &Resolution, key: &str) -> String {
		resolution.version_of(key).unwrap().to_string()
	}

	#[test]
	fn strict_backtracks_to_older_parent() {
		let repo = TableRepository::default()
			.version("test:app", "2.0", &["test:lib:2.0"])
			.version("test:app", "1.0", &["test:lib:1.0"])
			.version("test:lib", "1.0", &[])
			.version("test:lib", "2.0", &[]);

		let resolution = resolve(&repo, &["test:app:1+", "test:lib:1.0"], false).unwrap();
		assert_eq!(version_of(&resolution, "test:app"), "1.0");
		assert_eq!(version_of(&resolution, "test:lib"), "1.0");
	}

	#[test]
	fn strict_revisits_artifact_narrowed_after_selection() {
		/* `c` is selected at 1.1 before `b` pins it to 1.0 */
		let repo = TableRepository::default()
			.version("test:a", "1.0", &["test:c:1.0+"])
			.version("test:x", "1.0", &["test:b:1.0"])
			.version("test:b", "1.0", &["test:c:1.0"])
			.version("test:c", "1.0", &["test:d:1.0"])
			.version("test:c", "1.1", &["test:d:2.0"])
			.version("test:d", "1.0", &[])
			.version("test:d", "2.0", &[]);

		let resolution = resolve(&repo, &["test:a", "test:x"], false).unwrap();
		assert_eq!(version_of(&resolution, "test:c"), "1.0");
		assert_eq!(version_of(&resolution, "test:d"), "1.0");
	}

	#[test]
	fn strict_forgets_skipped_version_after_rejection() {
		/* `b` narrows `c` to 1.0, then `x` 2.0 is rejected and nothing pins `c` anymore */
		let repo = TableRepository::default()
			.version("test:a", "1.0", &["test:c:1.0+"])
			.version("test:x", "1.0", &[])
			.version("test:x", "2.0", &["test:b:1.0", "test:z:1.0"])
			.version("test:b", "1.0", &["test:c:1.0"])
			.version("test:z", "1.0", &["test:missing:1.0"])
			.version("test:c", "1.0", &[])
			.version("test:c", "1.1", &[]);

		let resolution = resolve(&repo, &["test:a", "test:x"], false).unwrap();
		assert_eq!(version_of(&resolution, "test:x"), "1.0");
		assert_eq!(version_of(&resolution, "test:c"), "1.1");
		assert!(resolution.get("test:b").is_none());
	}

	#[test]
	fn use_latest_ignores_transitive_pin_to_missing_version() {
		let repo = TableRepository::default()
			.version("test:transdep", "1.0.0", &["test:subdep:0.9"])
			.version("test:subdep", "1.0", &[])
			.version("test:subdep", "1.1.0", &[]);

		assert!(resolve(&repo, &["test:transdep:1.0.0", "test:subdep:1.0+"], false).is_err());
		let resolution = resolve(&repo, &["test:transdep:1.0.0", "test:subdep:1.0+"], true).unwrap();
		assert_eq!(version_of(&resolution, "test:subdep"), "1.1.0");
	}

	#[test]
	fn use_latest_missing_pin_without_direct_request_fails() {
		let repo = TableRepository::default()
			.version("test:transdep", "1.0.0", &["test:subdep:0.9"])
			.version("test:subdep", "1.0", &[]);

		let e = resolve(&repo, &["test:transdep"], true).unwrap_err();
		assert_eq!(e.key(), "test:subdep");
	}

	#[test]
	fn dependency_cycles_terminate() {
		let repo = TableRepository::default()
			.version("test:a", "1.0", &["test:b:1.0"])
			.version("test:b", "1.0", &["test:a:1.0"]);

		let resolution = resolve(&repo, &["test:a:1.0"], false).unwrap();
		assert_eq!(resolution.len(), 2);
		assert_eq!(resolution.dependents_of("test:a").len(), 2);
	}

	#[test]
	fn missing_transitive_artifact_is_reported() {
		let repo = TableRepository::default()
			.version("test:a", "1.0", &["test:missing:1.0"]);

		let e = resolve(&repo, &["test:a"], false).unwrap_err();
		assert_eq!(e, ResolutionError::ArtifactNotFound { key: "test:missing".to_string() });
	}

	#[test]
	fn artifact_without_dependencies() {
		let repo = TableRepository::default().version("test:a", "1.0", &[]);
		let resolution = resolve(&repo, &["test:a"], false).unwrap();
		assert!(resolution.requirements_of("test:a").is_empty());
	}

	#[test]
	fn use_latest_prefers_newest_transitive_pin() {
		let repo = TableRepository::default()
			.version("test:a", "1.0", &["test:c:1.0"])
			.version("test:b", "1.0", &["test:c:2.0"])
			.version("test:c", "1.0", &[])
			.version("test:c", "2.0", &[]);

		assert!(resolve(&repo, &["test:a", "test:b"], false).is_err());
		let resolution = resolve(&repo, &["test:a", "test:b"], true).unwrap();
		assert_eq!(version_of(&resolution, "test:c"), "2.0");
	}

	#[test]
	fn use_latest_does_not_invent_versions() {
		let repo = TableRepository::default()
			.version("test:a", "1.0", &[])
			.version("test:a", "2.0", &[]);

		let e = resolve(&repo, &["test:a:3.0"], true).unwrap_err();
		assert_eq!(e.key(), "test:a");
	}
}
