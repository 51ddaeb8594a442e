//! Views and HTTP method dispatch

use crate::config::DatatableViewBuilder;
use crate::error::Result;
use crate::json::JsonEncoding;
use crate::mixin::ServerSideDatatableMixin;
use crate::request::Request;
use crate::response::Response;
use crate::server::DataTablesServerFactory;
use crate::source::{DataSource, Manager, Queryset};
use async_trait::async_trait;
use hyper::Method;
use std::fmt;
use std::sync::Arc;

/// Base trait for all views
#[async_trait]
pub trait View: Send + Sync {
	async fn dispatch(&self, request: Request) -> Result<Response>;

	/// Returns the list of HTTP methods allowed by this view
	fn allowed_methods(&self) -> Vec<&'static str> {
		vec!["GET", "HEAD", "OPTIONS"]
	}
}

/// Entry point a server loop calls for every request routed to a view
#[async_trait]
pub trait Handler: Send + Sync {
	async fn handle(&self, request: Request) -> Result<Response>;
}

/// A ready-to-route view answering DataTables server-side processing requests
///
/// Build it with [`ServerSideDatatableView::builder`]; the builder refuses to
/// produce a view without a data source or engine.
pub struct ServerSideDatatableView<T> {
	name: String,
	columns: Vec<String>,
	source: DataSource<T>,
	server: Arc<dyn DataTablesServerFactory<T>>,
	encoding: JsonEncoding,
}

impl<T> ServerSideDatatableView<T>
where
	T: Clone + Send + Sync + 'static,
{
	/// Create a view from an already validated configuration
	pub fn new(
		name: impl Into<String>,
		columns: Vec<String>,
		source: DataSource<T>,
		server: Arc<dyn DataTablesServerFactory<T>>,
		encoding: JsonEncoding,
	) -> Self {
		Self {
			name: name.into(),
			columns,
			source,
			server,
			encoding,
		}
	}

	pub fn builder() -> DatatableViewBuilder<T> {
		DatatableViewBuilder::new()
	}

	pub fn name(&self) -> &str {
		&self.name
	}

	pub fn columns(&self) -> &[String] {
		&self.columns
	}

	pub fn source(&self) -> &DataSource<T> {
		&self.source
	}

	pub fn encoding(&self) -> JsonEncoding {
		self.encoding
	}
}

impl<T> fmt::Debug for ServerSideDatatableView<T> {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("ServerSideDatatableView")
			.field("name", &self.name)
			.field("columns", &self.columns)
			.field("source", &self.source)
			.field("encoding", &self.encoding)
			.finish_non_exhaustive()
	}
}

impl<T> ServerSideDatatableMixin for ServerSideDatatableView<T>
where
	T: Clone + Send + Sync + 'static,
{
	type Record = T;

	fn queryset(&self) -> Option<Queryset<T>> {
		match &self.source {
			DataSource::Iterable(records) => Some(Queryset::Iterable(records.clone())),
			DataSource::LazyQuery(query) => Some(Queryset::Lazy(Arc::clone(query))),
			DataSource::ModelDefaultManager(_) => None,
		}
	}

	fn model(&self) -> Option<Arc<dyn Manager<T>>> {
		match &self.source {
			DataSource::ModelDefaultManager(manager) => Some(Arc::clone(manager)),
			_ => None,
		}
	}

	fn columns(&self) -> &[String] {
		&self.columns
	}

	fn server_factory(&self) -> Arc<dyn DataTablesServerFactory<T>> {
		Arc::clone(&self.server)
	}

	fn json_encoding(&self) -> JsonEncoding {
		self.encoding
	}

	fn view_name(&self) -> &str {
		&self.name
	}

	fn data_source(&self) -> Result<DataSource<T>> {
		Ok(self.source.clone())
	}
}

/// Every datatable mixin implementor is a view
#[async_trait]
impl<V> View for V
where
	V: ServerSideDatatableMixin,
{
	async fn dispatch(&self, request: Request) -> Result<Response> {
		match request.method {
			Method::GET => self.get(&request).await,
			Method::HEAD => Ok(self.get(&request).await?.without_body()),
			Method::OPTIONS => Ok(Response::ok()
				.with_header("Allow", &self.allowed_methods().join(", "))
				.with_header("Content-Length", "0")),
			_ => {
				tracing::warn!(
					view = self.view_name(),
					method = %request.method,
					path = request.path(),
					"Method Not Allowed"
				);
				Ok(Response::method_not_allowed(&self.allowed_methods()))
			}
		}
	}
}

#[async_trait]
impl<V> Handler for V
where
	V: View,
{
	async fn handle(&self, request: Request) -> Result<Response> {
		self.dispatch(request).await
	}
}
