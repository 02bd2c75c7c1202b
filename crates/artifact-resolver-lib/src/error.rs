//! Library error type.

pub type Result<T> = std::result::Result<T, Error>;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
	#[error("IO error: {0}")]
	IO(#[from] std::io::Error),
	#[error("JSON error: {0}")]
	SerdeJSON(#[from] serde_json::Error),
	#[error("parsing error: {0}")]
	Parse(String),
	#[error("repository error: {0}")]
	Repository(#[from] crate::repository::RepositoryError),
	#[error("resolution failed: {0}")]
	Resolution(#[from] crate::dependency_resolver::ResolutionError),
}
