//! Server-side processing mixin for views backing a DataTables grid

use crate::error::{DatatableError, Result};
use crate::json::JsonEncoding;
use crate::request::Request;
use crate::response::Response;
use crate::server::DataTablesServerFactory;
use crate::source::{DataSource, Manager, Queryset};
use async_trait::async_trait;
use std::sync::Arc;

/// Trait for views that answer DataTables server-side processing requests
///
/// Implementors declare a `queryset`, a `model`, or both, plus the columns
/// and engine factory. The provided [`get_queryset`] and [`get`] methods do
/// the rest, and every implementor is a [`View`] whose `dispatch` routes
/// GET, HEAD and OPTIONS to them.
///
/// [`get_queryset`]: ServerSideDatatableMixin::get_queryset
/// [`get`]: ServerSideDatatableMixin::get
/// [`View`]: crate::view::View
///
/// # Examples
///
/// ```
/// use reinhardt_datatables::{
///     PassthroughServer, Queryset, Request, ServerSideDatatableMixin, View,
///     server::DataTablesServerFactory,
/// };
/// use hyper::{Method, StatusCode};
/// use serde_json::{json, Value};
/// use std::sync::Arc;
///
/// struct TagsView {
///     columns: Vec<String>,
///     server: Arc<dyn DataTablesServerFactory<Value>>,
/// }
///
/// impl ServerSideDatatableMixin for TagsView {
///     type Record = Value;
///
///     fn queryset(&self) -> Option<Queryset<Value>> {
///         Some(Queryset::Iterable(vec![json!({"id": "1", "data": "data"})]))
///     }
///
///     fn columns(&self) -> &[String] {
///         &self.columns
///     }
///
///     fn server_factory(&self) -> Arc<dyn DataTablesServerFactory<Value>> {
///         Arc::clone(&self.server)
///     }
/// }
///
/// #[tokio::main]
/// async fn main() {
///     let view = TagsView {
///         columns: vec!["id".into(), "data".into()],
///         server: Arc::new(PassthroughServer),
///     };
///     let request = Request::builder().uri("/tags/?draw=1").build().unwrap();
///     let response = view.get(&request).await.unwrap();
///     assert_eq!(response.body.as_ref(), br#"[{"id": "1", "data": "data"}]"#);
///
///     let request = Request::builder().method(Method::POST).uri("/tags/").build().unwrap();
///     let response = view.dispatch(request).await.unwrap();
///     assert_eq!(response.status, StatusCode::METHOD_NOT_ALLOWED);
/// }
/// ```
#[async_trait]
pub trait ServerSideDatatableMixin: Send + Sync {
	/// Record type produced by the data source and handed to the engine
	type Record: Clone + Send + Sync + 'static;

	/// The view's queryset, lazy or already materialized
	fn queryset(&self) -> Option<Queryset<Self::Record>> {
		None
	}

	/// The default manager of the view's model
	fn model(&self) -> Option<Arc<dyn Manager<Self::Record>>> {
		None
	}

	/// Ordered field names handed to the engine
	fn columns(&self) -> &[String];

	/// Factory for the engine that computes the grid output
	fn server_factory(&self) -> Arc<dyn DataTablesServerFactory<Self::Record>>;

	/// How the engine output is written to the response body
	fn json_encoding(&self) -> JsonEncoding {
		JsonEncoding::default()
	}

	/// Name used in configuration errors and logs
	fn view_name(&self) -> &str {
		std::any::type_name::<Self>()
	}

	/// Pick the data source: the queryset first, then the model's manager
	fn data_source(&self) -> Result<DataSource<Self::Record>> {
		if let Some(queryset) = self.queryset() {
			return Ok(queryset.into());
		}
		if let Some(manager) = self.model() {
			return Ok(DataSource::ModelDefaultManager(manager));
		}

		let name = self.view_name();
		tracing::error!(view = name, "datatable view has no data source");
		Err(DatatableError::ImproperlyConfigured(format!(
			"{name} is missing a QuerySet. Define {name}.model, {name}.queryset, or override {name}.get_queryset()."
		)))
	}

	/// Resolve the data source into concrete records
	async fn get_queryset(&self) -> Result<Vec<Self::Record>> {
		let source = self.data_source()?;
		tracing::debug!(
			view = self.view_name(),
			source = source.kind(),
			"resolving datatable source"
		);
		source.resolve().await
	}

	/// Handle a GET: run the engine over the records and return its output as JSON
	async fn get(&self, request: &Request) -> Result<Response> {
		let data = self.get_queryset().await?;
		let record_count = data.len();

		let server = self
			.server_factory()
			.create(request, self.columns(), data)?;
		let output = server.get_output_result()?;

		let response = Response::ok().with_json_encoding(&output, self.json_encoding())?;
		tracing::debug!(
			view = self.view_name(),
			records = record_count,
			bytes = response.body.len(),
			"rendered datatable response"
		);
		Ok(response)
	}
}
