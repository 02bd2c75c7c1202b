use super::ResolverProcessor;
use super::ResolveRequest;
use crate::artifact::Dependency;
use crate::repository::Repository;

pub struct ResolverBuilder<'r> {
	repository: &'r dyn Repository,
	use_latest: bool,

	requests: Vec<ResolveRequest>,
}

impl<'r> ResolverBuilder<'r> {
	pub fn new(repository: &'r dyn Repository) -> Self {
		Self {
			repository,
			use_latest: false,
			requests: Default::default(),
		}
	}

	pub fn add_requests(mut self, requests: impl IntoIterator<Item = ResolveRequest>) -> Self {
		for request in requests {
			self.requests.push(request);
		}
		self
	}

	pub fn add_request(mut self, client: impl Into<String>, dependency: Dependency) -> Self {
		self.requests.push(ResolveRequest { client: client.into(), dependency });
		self
	}

	/// Relax conflicts by preferring newer versions, see the [module docs](super) for details.
	pub fn use_latest(mut self, use_latest: bool) -> Self {
		self.use_latest = use_latest;
		self
	}

	pub fn build(self) -> ResolverProcessor<'r> {
		ResolverProcessor::new(self.repository, self.requests, self.use_latest)
	}
}
