//! Error types for datatable views

use thiserror::Error;

/// Result type used throughout this crate
pub type Result<T> = std::result::Result<T, DatatableError>;

/// Errors raised while resolving a view's data source or rendering its response
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum DatatableError {
	/// The view declares neither a queryset nor a model
	#[error("Improperly configured: {0}")]
	ImproperlyConfigured(String),

	/// Evaluating the lazy query or default manager failed
	#[error("Data source error: {0}")]
	Source(String),

	/// The grid engine failed to compute its output
	#[error("DataTables server error: {0}")]
	Engine(String),

	/// The inbound request could not be assembled
	#[error("Invalid request: {0}")]
	InvalidRequest(String),

	#[error("Serialization error: {0}")]
	Serialization(#[from] serde_json::Error),

	#[error("Settings error: {0}")]
	Settings(#[from] toml::de::Error),

	#[error("IO error: {0}")]
	Io(#[from] std::io::Error),
}

impl DatatableError {
	/// HTTP status code a host should answer with when this error escapes a view
	///
	/// # Examples
	///
	/// ```
	/// use reinhardt_datatables::DatatableError;
	///
	/// let error = DatatableError::ImproperlyConfigured("no source".to_string());
	/// assert_eq!(error.status_code(), 500);
	/// ```
	pub fn status_code(&self) -> u16 {
		match self {
			DatatableError::InvalidRequest(_) => 400,
			DatatableError::ImproperlyConfigured(_)
			| DatatableError::Source(_)
			| DatatableError::Engine(_)
			| DatatableError::Serialization(_)
			| DatatableError::Settings(_)
			| DatatableError::Io(_) => 500,
		}
	}
}
