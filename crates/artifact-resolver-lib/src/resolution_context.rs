//! The pool of requests shared by every client in a process.
//!
//! Each client registers its own direct requests but resolving always covers every client,
//! so all clients see the same versions for the same artifacts.

use parking_lot::Mutex;

use crate::artifact::Dependency;
use crate::dependency_resolver::{Resolution, ResolutionError, ResolveRequest, ResolverBuilder};
use crate::repository::Repository;

#[derive(Debug, Default)]
struct ClientRecord {
	name: String,
	dependencies: Vec<Dependency>,
}

#[derive(Debug, Default)]
struct ContextState {
	/// In registration order.
	clients: Vec<ClientRecord>,
	last_resolution: Option<Resolution>,
}

impl ContextState {
	fn client_mut(&mut self, name: &str) -> &mut ClientRecord {
		if let Some(i) = self.clients.iter().position(|c| c.name == name) {
			&mut self.clients[i]
		} else {
			self.clients.push(ClientRecord { name: name.to_string(), ..Default::default() });
			let last = self.clients.len() - 1;
			&mut self.clients[last]
		}
	}
}

/// Shared dependency pool.
///
/// Resolves are serialized and work on a snapshot of the requests, a failed resolve leaves
/// the context untouched.
#[derive(Debug, Default)]
pub struct ResolutionContext {
	state: Mutex<ContextState>,
	/// Held for the duration of a resolve.
	pass_lock: Mutex<()>,
}

impl ResolutionContext {
	pub fn new() -> Self {
		Self::default()
	}

	/// Gets a handle for the client named `name`, registering it if needed.
	pub fn register_client(&self, name: impl Into<String>) -> ClientHandle<'_> {
		let name = name.into();
		self.state.lock().client_mut(&name);
		log::trace!("Registered client {}", name);
		ClientHandle { context: self, name }
	}

	/// Names of every registered client.
	pub fn clients(&self) -> Vec<String> {
		self.state.lock().clients.iter().map(|c| c.name.clone()).collect()
	}

	/// Every direct request as `(client, dependency)`.
	pub fn all_dependencies(&self) -> Vec<(String, Dependency)> {
		self.state.lock().clients.iter()
			.flat_map(|c| c.dependencies.iter().map(|d| (c.name.clone(), d.clone())))
			.collect()
	}

	/// Checks if any client requests the artifact, `key` can be versionless or include the specifier.
	pub fn dependency_exists(&self, key: &str) -> bool {
		self.state.lock().clients.iter()
			.flat_map(|c| &c.dependencies)
			.any(|d| d.versionless_key() == key || d.key() == key)
	}

	/// Repositories requested by every dependency of every client, without duplicates.
	pub fn repositories(&self) -> Vec<String> {
		let mut repositories = Vec::<String>::new();
		for (_, dependency) in self.all_dependencies() {
			for r in dependency.repositories() {
				if !repositories.contains(r) {
					repositories.push(r.clone());
				}
			}
		}
		repositories
	}

	/// The result of the last successful resolve.
	pub fn last_resolution(&self) -> Option<Resolution> {
		self.state.lock().last_resolution.clone()
	}

	/// Resolves the requests of every client against `repository`.
	///
	/// On success the result is also kept as [`last_resolution()`](Self::last_resolution).
	pub fn resolve_dependencies(&self, repository: &dyn Repository, use_latest: bool) -> Result<Resolution, ResolutionError> {
		let _pass = self.pass_lock.lock();

		let requests: Vec<ResolveRequest> = self.state.lock().clients.iter()
			.flat_map(|c| c.dependencies.iter().map(|d| ResolveRequest { client: c.name.clone(), dependency: d.clone() }))
			.collect();

		let resolution = ResolverBuilder::new(repository)
			.add_requests(requests)
			.use_latest(use_latest)
			.build()
			.resolve()?;

		self.state.lock().last_resolution = Some(resolution.clone());
		Ok(resolution)
	}

	fn add_dependency(&self, client: &str, dependency: Dependency) {
		let mut state = self.state.lock();
		let record = state.client_mut(client);
		log::debug!("Client {} depends on {}", client, dependency);
		if !record.dependencies.contains(&dependency) {
			record.dependencies.push(dependency);
		}
	}

	fn client_dependencies(&self, client: &str) -> Vec<Dependency> {
		self.state.lock().clients.iter()
			.find(|c| c.name == client)
			.map(|c| c.dependencies.clone())
			.unwrap_or_default()
	}

	fn clear_client(&self, client: &str) {
		let mut state = self.state.lock();
		if let Some(record) = state.clients.iter_mut().find(|c| c.name == client) {
			log::debug!("Clearing {} dependencies of client {}", record.dependencies.len(), client);
			record.dependencies.clear();
		}
	}

	fn remove_client(&self, client: &str) {
		let mut state = self.state.lock();
		state.clients.retain(|c| c.name != client);
		log::debug!("Removed client {}", client);
	}
}

/// A named client of a [`ResolutionContext`].
#[derive(Debug, Clone)]
pub struct ClientHandle<'ctx> {
	context: &'ctx ResolutionContext,
	name: String,
}

impl<'ctx> ClientHandle<'ctx> {
	pub fn name(&self) -> &str {
		&self.name
	}

	pub fn context(&self) -> &'ctx ResolutionContext {
		self.context
	}

	/// Requests `group:artifact` at `version`, which may be exact, a `+` range or `LATEST`.
	pub fn depend_on(&self, group: &str, artifact: &str, version: &str) {
		self.add_dependency(Dependency::new(group, artifact, version));
	}

	/// Requests a dependency carrying extra metadata such as package ids or repositories.
	pub fn add_dependency(&self, dependency: Dependency) {
		self.context.add_dependency(&self.name, dependency);
	}

	/// This client's direct requests.
	pub fn dependencies(&self) -> Vec<Dependency> {
		self.context.client_dependencies(&self.name)
	}

	/// Removes this client's direct requests, the client stays registered.
	pub fn clear_dependencies(&self) {
		self.context.clear_client(&self.name);
	}

	/// Removes this client's direct requests and unregisters it.
	///
	/// The handle can still be used, adding a dependency registers the client again.
	pub fn reset_dependencies(&self) {
		self.context.remove_client(&self.name);
	}

	/// Resolves every client in the context, not just this one.
	pub fn resolve_dependencies(&self, repository: &dyn Repository, use_latest: bool) -> Result<Resolution, ResolutionError> {
		self.context.resolve_dependencies(repository, use_latest)
	}
}
