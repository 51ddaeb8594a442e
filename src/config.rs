//! View configuration
//!
//! Views are configured with an explicit builder instead of attributes, and
//! the configuration is checked when the view is built. A view without a data
//! source fails at startup, not on its first request.

use crate::error::{DatatableError, Result};
use crate::json::JsonEncoding;
use crate::server::DataTablesServerFactory;
use crate::source::{DataSource, LazyQuery, Manager, Model, Queryset};
use crate::view::ServerSideDatatableView;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::sync::Arc;

/// Settings for a datatable view that can live in a TOML file
///
/// # Examples
///
/// ```
/// use reinhardt_datatables::DatatableSettings;
///
/// let settings = DatatableSettings::from_toml_str(r#"
///     columns = ["id", "customer", "total"]
///     ensure_ascii = false
/// "#).unwrap();
///
/// assert_eq!(settings.columns, vec!["id", "customer", "total"]);
/// assert!(!settings.ensure_ascii);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatatableSettings {
	#[serde(default)]
	pub columns: Vec<String>,
	#[serde(default = "default_ensure_ascii")]
	pub ensure_ascii: bool,
}

fn default_ensure_ascii() -> bool {
	true
}

impl Default for DatatableSettings {
	fn default() -> Self {
		Self {
			columns: Vec::new(),
			ensure_ascii: default_ensure_ascii(),
		}
	}
}

impl DatatableSettings {
	/// Parse settings from a TOML document
	pub fn from_toml_str(source: &str) -> Result<Self> {
		Ok(toml::from_str(source)?)
	}

	/// Read and parse a TOML settings file
	pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
		let path = path.as_ref();
		let content = fs::read_to_string(path)?;
		tracing::debug!(path = %path.display(), "loaded datatable settings");
		Self::from_toml_str(&content)
	}

	/// Encoding options derived from these settings
	pub fn json_encoding(&self) -> JsonEncoding {
		JsonEncoding {
			ensure_ascii: self.ensure_ascii,
		}
	}
}

/// Builder for [`ServerSideDatatableView`]
///
/// When both a queryset and a model are configured the queryset wins.
///
/// # Examples
///
/// ```
/// use reinhardt_datatables::{DatatableError, PassthroughServer, ServerSideDatatableView};
///
/// let view = ServerSideDatatableView::<u32>::builder()
///     .name("NumbersView")
///     .columns(["value"])
///     .iterable(vec![1, 2, 3])
///     .server(PassthroughServer)
///     .build()
///     .unwrap();
/// assert_eq!(view.columns(), ["value"]);
///
/// let result = ServerSideDatatableView::<u32>::builder()
///     .name("EmptyView")
///     .server(PassthroughServer)
///     .build();
/// assert!(matches!(result, Err(DatatableError::ImproperlyConfigured(_))));
/// ```
pub struct DatatableViewBuilder<T> {
	name: Option<String>,
	columns: Vec<String>,
	queryset: Option<Queryset<T>>,
	model: Option<Arc<dyn Manager<T>>>,
	server: Option<Arc<dyn DataTablesServerFactory<T>>>,
	encoding: JsonEncoding,
}

impl<T> Default for DatatableViewBuilder<T> {
	fn default() -> Self {
		Self {
			name: None,
			columns: Vec::new(),
			queryset: None,
			model: None,
			server: None,
			encoding: JsonEncoding::default(),
		}
	}
}

impl<T> DatatableViewBuilder<T>
where
	T: Clone + Send + Sync + 'static,
{
	pub fn new() -> Self {
		Self::default()
	}

	/// Name reported in errors and logs
	pub fn name(mut self, name: impl Into<String>) -> Self {
		self.name = Some(name.into());
		self
	}

	pub fn columns<I, S>(mut self, columns: I) -> Self
	where
		I: IntoIterator<Item = S>,
		S: Into<String>,
	{
		self.columns = columns.into_iter().map(Into::into).collect();
		self
	}

	/// Apply columns and encoding from loaded settings
	pub fn settings(mut self, settings: DatatableSettings) -> Self {
		self.encoding = settings.json_encoding();
		self.columns = settings.columns;
		self
	}

	pub fn json_encoding(mut self, encoding: JsonEncoding) -> Self {
		self.encoding = encoding;
		self
	}

	/// Back the view with a lazy query
	pub fn queryset(mut self, query: Arc<dyn LazyQuery<T>>) -> Self {
		self.queryset = Some(Queryset::Lazy(query));
		self
	}

	/// Back the view with records that are already materialized
	pub fn iterable(mut self, records: Vec<T>) -> Self {
		self.queryset = Some(Queryset::Iterable(records));
		self
	}

	/// Back the view with a model's default manager
	pub fn model<M>(self) -> Self
	where
		M: Model<Record = T>,
	{
		self.manager(M::default_manager())
	}

	/// Back the view with an explicit manager
	pub fn manager(mut self, manager: Arc<dyn Manager<T>>) -> Self {
		self.model = Some(manager);
		self
	}

	pub fn server<F>(self, factory: F) -> Self
	where
		F: DataTablesServerFactory<T> + 'static,
	{
		self.server_arc(Arc::new(factory))
	}

	/// Use an engine factory shared with other views
	pub fn server_arc(mut self, factory: Arc<dyn DataTablesServerFactory<T>>) -> Self {
		self.server = Some(factory);
		self
	}

	/// Validate the configuration and build the view
	pub fn build(self) -> Result<ServerSideDatatableView<T>> {
		let name = self
			.name
			.unwrap_or_else(|| "ServerSideDatatableView".to_string());

		let source = match (self.queryset, self.model) {
			(Some(queryset), model) => {
				if model.is_some() {
					tracing::debug!(view = %name, "queryset takes precedence over model");
				}
				DataSource::from(queryset)
			}
			(None, Some(manager)) => DataSource::ModelDefaultManager(manager),
			(None, None) => {
				tracing::error!(view = %name, "datatable view has no data source");
				return Err(DatatableError::ImproperlyConfigured(format!(
					"{name} is missing a QuerySet. Define {name}.model or {name}.queryset."
				)));
			}
		};

		let server = self.server.ok_or_else(|| {
			DatatableError::ImproperlyConfigured(format!(
				"{name} has no DataTables server configured."
			))
		})?;

		Ok(ServerSideDatatableView::new(
			name,
			self.columns,
			source,
			server,
			self.encoding,
		))
	}
}
