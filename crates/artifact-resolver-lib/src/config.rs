use std::path::{Path, PathBuf};

use serde::{Serialize, Deserialize};

use crate::repository::{MavenDirectoryRepository, RepositorySet};

/// Maven repositories bundled with the Android SDK, relative to the SDK root.
const SDK_REPOSITORIES: [&str; 2] = ["extras/google/m2repository", "extras/android/m2repository"];

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
	/// Maven repository directories searched before the SDK's.
	repositories: Vec<PathBuf>,
	android_sdk: Option<PathBuf>,
	use_latest: bool,
}

impl Config {
	/// Default config with the SDK root taken from `ANDROID_HOME` or `ANDROID_SDK_ROOT`.
	pub fn from_env() -> Self {
		let android_sdk = ["ANDROID_HOME", "ANDROID_SDK_ROOT"].iter()
			.filter_map(std::env::var_os)
			.find(|v| !v.is_empty())
			.map(PathBuf::from);
		log::debug!("Android SDK from environment: {:?}", android_sdk);
		Self { android_sdk, ..Default::default() }
	}

	pub fn load_from_file(path: impl AsRef<Path>) -> crate::Result<Self> {
		let f = std::fs::File::open(path)?;
		Ok(serde_json::from_reader(std::io::BufReader::new(f))?)
	}

	pub fn save_to_file(&self, path: impl AsRef<Path>) -> crate::Result<()> {
		let f = std::fs::File::create(path)?;
		serde_json::to_writer_pretty(f, self)?;
		Ok(())
	}

	pub fn repositories(&self) -> &[PathBuf] {
		&self.repositories
	}
	pub fn add_repository(&mut self, path: impl Into<PathBuf>) {
		let path = path.into();
		if !self.repositories.contains(&path) {
			self.repositories.push(path);
		}
	}

	pub fn android_sdk(&self) -> Option<&Path> {
		self.android_sdk.as_deref()
	}
	pub fn set_android_sdk(&mut self, android_sdk: Option<PathBuf>) {
		self.android_sdk = android_sdk;
	}

	pub fn use_latest(&self) -> bool {
		self.use_latest
	}
	pub fn set_use_latest(&mut self, use_latest: bool) {
		self.use_latest = use_latest;
	}

	/// Repository directories in search order.
	///
	/// SDK repositories are only included when they exist.
	pub fn search_paths(&self) -> Vec<PathBuf> {
		let mut paths = self.repositories.clone();
		if let Some(sdk) = &self.android_sdk {
			paths.extend(
				SDK_REPOSITORIES.iter()
					.map(|r| sdk.join(r))
					.filter(|p| p.is_dir())
			);
		}
		paths
	}

	/// A [`RepositorySet`] over [`search_paths()`](Self::search_paths).
	pub fn repository_set(&self) -> RepositorySet {
		let mut set = RepositorySet::new();
		for path in self.search_paths() {
			log::trace!("Adding repository {}", path.display());
			set.add(MavenDirectoryRepository::new(path));
		}
		set
	}
}
