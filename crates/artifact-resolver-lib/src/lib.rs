pub mod error;
pub use error::Result;
pub use error::Error;

pub mod config;
pub use config::Config;

pub mod artifact;
pub use artifact::ArtifactSpec;
pub use artifact::Dependency;
pub use artifact::Version;
pub use artifact::VersionSpecifier;

pub mod repository;
pub use repository::Repository;
pub use repository::RepositorySet;
pub use repository::MavenDirectoryRepository;

pub mod dependency_resolver;
pub use dependency_resolver::Resolution;
pub use dependency_resolver::ResolutionError;

pub mod resolution_context;
pub use resolution_context::ResolutionContext;
pub use resolution_context::ClientHandle;

pub mod manifest;
pub use manifest::DependencyManifest;
