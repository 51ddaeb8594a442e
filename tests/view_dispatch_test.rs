//! Dispatch tests for views built with `ServerSideDatatableView::builder`

use async_trait::async_trait;
use bytes::Bytes;
use http_body_util::BodyExt;
use hyper::{Method, StatusCode};
use mockall::mock;
use reinhardt_datatables::{
	DataSource, DataTablesServer, DatatableError, DatatableSettings, Handler, JsonEncoding,
	LazyQuery, Manager, Model, PassthroughServer, Request, Result, ServerSideDatatableMixin,
	ServerSideDatatableView, View,
};
use rstest::*;
use serde::Serialize;
use serde_json::{Value, json};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

#[derive(Debug, Clone, PartialEq, Serialize)]
struct Customer {
	id: i64,
	name: String,
}

mock! {
	pub Query {}

	#[async_trait]
	impl LazyQuery<Customer> for Query {
		async fn all(&self) -> Result<Vec<Customer>>;
	}
}

mock! {
	pub CustomerManager {}

	#[async_trait]
	impl Manager<Customer> for CustomerManager {
		async fn all(&self) -> Result<Vec<Customer>>;
	}
}

#[fixture]
fn customers() -> Vec<Customer> {
	vec![
		Customer {
			id: 1,
			name: "Amélie".to_string(),
		},
		Customer {
			id: 2,
			name: "Bob".to_string(),
		},
	]
}

#[fixture]
fn customer_view(customers: Vec<Customer>) -> ServerSideDatatableView<Customer> {
	ServerSideDatatableView::builder()
		.name("CustomerView")
		.columns(["id", "name"])
		.iterable(customers)
		.server(PassthroughServer)
		.build()
		.unwrap()
}

fn request(method: Method, uri: &str) -> Request {
	Request::builder().method(method).uri(uri).build().unwrap()
}

static CUSTOMER_MANAGER_CALLS: AtomicUsize = AtomicUsize::new(0);

struct StaticCustomerManager;

#[async_trait]
impl Manager<Customer> for StaticCustomerManager {
	async fn all(&self) -> Result<Vec<Customer>> {
		CUSTOMER_MANAGER_CALLS.fetch_add(1, Ordering::SeqCst);
		Ok(vec![Customer {
			id: 7,
			name: "Grace".to_string(),
		}])
	}
}

struct CustomerModel;

impl Model for CustomerModel {
	type Record = Customer;

	fn default_manager() -> Arc<dyn Manager<Customer>> {
		Arc::new(StaticCustomerManager)
	}
}

#[rstest]
#[tokio::test]
async fn test_get_escapes_non_ascii(customer_view: ServerSideDatatableView<Customer>) {
	let response = customer_view
		.dispatch(request(Method::GET, "/customers/?draw=1"))
		.await
		.unwrap();

	assert_eq!(response.status, StatusCode::OK);
	assert_eq!(
		response.body.as_ref(),
		br#"[{"id": 1, "name": "Am\u00e9lie"}, {"id": 2, "name": "Bob"}]"#
	);
}

#[rstest]
#[tokio::test]
async fn test_get_without_ascii_escaping(customers: Vec<Customer>) {
	let view = ServerSideDatatableView::builder()
		.columns(["id", "name"])
		.iterable(customers)
		.json_encoding(JsonEncoding {
			ensure_ascii: false,
		})
		.server(PassthroughServer)
		.build()
		.unwrap();

	let response = view
		.dispatch(request(Method::GET, "/customers/"))
		.await
		.unwrap();

	assert_eq!(
		std::str::from_utf8(&response.body).unwrap(),
		r#"[{"id": 1, "name": "Amélie"}, {"id": 2, "name": "Bob"}]"#
	);
}

#[rstest]
#[tokio::test]
async fn test_head_has_headers_but_no_body(customer_view: ServerSideDatatableView<Customer>) {
	let response = customer_view
		.dispatch(request(Method::HEAD, "/customers/"))
		.await
		.unwrap();

	assert_eq!(response.status, StatusCode::OK);
	assert_eq!(
		response.headers.get("content-type").unwrap(),
		"application/json"
	);
	assert!(response.body.is_empty());
}

#[rstest]
#[case(Method::POST)]
#[case(Method::PUT)]
#[case(Method::PATCH)]
#[case(Method::DELETE)]
#[tokio::test]
async fn test_unsupported_methods_are_rejected(
	customer_view: ServerSideDatatableView<Customer>,
	#[case] method: Method,
) {
	let response = customer_view
		.dispatch(request(method, "/customers/"))
		.await
		.unwrap();

	assert_eq!(response.status, StatusCode::METHOD_NOT_ALLOWED);
	assert_eq!(response.headers.get("allow").unwrap(), "GET, HEAD, OPTIONS");
	assert!(response.body.is_empty());
}

#[rstest]
fn test_builder_without_source_fails() {
	let result = ServerSideDatatableView::<Customer>::builder()
		.name("CustomerView")
		.columns(["id"])
		.server(PassthroughServer)
		.build();

	match result {
		Err(DatatableError::ImproperlyConfigured(message)) => assert_eq!(
			message,
			"CustomerView is missing a QuerySet. Define CustomerView.model or CustomerView.queryset."
		),
		_ => panic!("expected ImproperlyConfigured"),
	}
}

#[rstest]
#[tokio::test]
async fn test_builder_prefers_queryset_over_model(customers: Vec<Customer>) {
	let mut query = MockQuery::new();
	let returned = customers.clone();
	query
		.expect_all()
		.times(1)
		.returning(move || Ok(returned.clone()));

	let mut manager = MockCustomerManager::new();
	manager.expect_all().never();

	let view = ServerSideDatatableView::<Customer>::builder()
		.manager(Arc::new(manager))
		.queryset(Arc::new(query))
		.server(PassthroughServer)
		.build()
		.unwrap();

	assert_eq!(view.source().kind(), "lazy_query");
	assert!(view.model().is_none());
	assert_eq!(view.get_queryset().await.unwrap(), customers);
}

#[rstest]
#[tokio::test]
async fn test_lazy_query_evaluated_per_request(customers: Vec<Customer>) {
	let mut query = MockQuery::new();
	let returned = customers.clone();
	query
		.expect_all()
		.times(2)
		.returning(move || Ok(returned.clone()));

	let view = ServerSideDatatableView::<Customer>::builder()
		.queryset(Arc::new(query))
		.server(PassthroughServer)
		.build()
		.unwrap();

	for _ in 0..2 {
		let response = view
			.dispatch(request(Method::GET, "/customers/"))
			.await
			.unwrap();
		assert_eq!(response.status, StatusCode::OK);
	}
}

#[rstest]
#[tokio::test]
async fn test_model_default_manager() {
	let view = ServerSideDatatableView::builder()
		.name("ModelBackedView")
		.model::<CustomerModel>()
		.server(PassthroughServer)
		.build()
		.unwrap();

	let before = CUSTOMER_MANAGER_CALLS.load(Ordering::SeqCst);
	let response = view
		.dispatch(request(Method::GET, "/customers/"))
		.await
		.unwrap();

	assert_eq!(CUSTOMER_MANAGER_CALLS.load(Ordering::SeqCst), before + 1);
	assert_eq!(response.body.as_ref(), br#"[{"id": 7, "name": "Grace"}]"#);
}

struct ArchivedCustomerModel;

impl Model for ArchivedCustomerModel {
	type Record = Customer;

	fn default_manager() -> Arc<dyn Manager<Customer>> {
		let mut manager = MockCustomerManager::new();
		manager.expect_all().times(2).returning(|| {
			Ok(vec![Customer {
				id: 9,
				name: "Ada".to_string(),
			}])
		});
		Arc::new(manager)
	}
}

#[rstest]
#[tokio::test]
async fn test_data_source_from_model() {
	let source = DataSource::from_model::<ArchivedCustomerModel>();
	assert_eq!(source.kind(), "model_default_manager");

	let view = ServerSideDatatableView::new(
		"ArchivedCustomerView",
		vec!["id".to_string(), "name".to_string()],
		source,
		Arc::new(PassthroughServer),
		JsonEncoding::default(),
	);

	assert!(view.model().is_some());
	let expected = vec![Customer {
		id: 9,
		name: "Ada".to_string(),
	}];
	assert_eq!(view.get_queryset().await.unwrap(), expected);
	let response = view
		.dispatch(request(Method::GET, "/customers/archived/"))
		.await
		.unwrap();
	assert_eq!(response.body.as_ref(), br#"[{"id": 9, "name": "Ada"}]"#);
}

struct EnvelopeServer {
	draw: String,
	total: usize,
	columns: Vec<String>,
}

impl DataTablesServer for EnvelopeServer {
	fn get_output_result(&self) -> Result<Value> {
		Ok(json!({
			"draw": self.draw,
			"recordsTotal": self.total,
			"recordsFiltered": self.total,
			"columns": self.columns,
		}))
	}
}

#[rstest]
#[tokio::test]
async fn test_closure_engine_sees_request_and_columns(customers: Vec<Customer>) {
	let view = ServerSideDatatableView::builder()
		.columns(["id", "name"])
		.iterable(customers)
		.server(|request: &Request, columns: &[String], data: Vec<Customer>| {
			Ok::<_, DatatableError>(Box::new(EnvelopeServer {
				draw: request.query_params.get("draw").cloned().unwrap_or_default(),
				total: data.len(),
				columns: columns.to_vec(),
			}) as Box<dyn DataTablesServer>)
		})
		.build()
		.unwrap();

	let response = view
		.dispatch(request(Method::GET, "/customers/?draw=4"))
		.await
		.unwrap();

	assert_eq!(
		response.body.as_ref(),
		br#"{"draw": "4", "recordsTotal": 2, "recordsFiltered": 2, "columns": ["id", "name"]}"#
	);
}

#[rstest]
#[tokio::test]
async fn test_settings_file_configures_view(customers: Vec<Customer>) {
	let dir = tempfile::tempdir().unwrap();
	let path = dir.path().join("customers.toml");
	std::fs::write(&path, "columns = [\"name\"]\nensure_ascii = false\n").unwrap();

	let settings = DatatableSettings::from_file(&path).unwrap();
	let view = ServerSideDatatableView::builder()
		.settings(settings)
		.iterable(customers)
		.server(PassthroughServer)
		.build()
		.unwrap();

	assert_eq!(view.columns(), ["name"]);
	assert!(!view.encoding().ensure_ascii);
}

#[rstest]
fn test_missing_settings_file() {
	let dir = tempfile::tempdir().unwrap();
	let result = DatatableSettings::from_file(dir.path().join("absent.toml"));
	assert!(matches!(result, Err(DatatableError::Io(_))));
}

#[rstest]
#[tokio::test]
async fn test_shared_view_across_tasks(customer_view: ServerSideDatatableView<Customer>) {
	let view = Arc::new(customer_view);

	let handles: Vec<_> = (0..4)
		.map(|draw| {
			let view = Arc::clone(&view);
			tokio::spawn(async move {
				let uri = format!("/customers/?draw={}", draw);
				view.handle(request(Method::GET, &uri)).await
			})
		})
		.collect();

	for handle in handles {
		let response = handle.await.unwrap().unwrap();
		assert_eq!(response.status, StatusCode::OK);
	}
}

#[rstest]
#[tokio::test]
async fn test_hyper_round_trip(customer_view: ServerSideDatatableView<Customer>) {
	let (parts, _) = hyper::Request::builder()
		.method(Method::GET)
		.uri("/customers/?draw=1")
		.body(())
		.unwrap()
		.into_parts();

	let response = customer_view
		.handle(Request::from_parts(parts, Bytes::new()))
		.await
		.unwrap()
		.into_hyper();

	assert_eq!(response.status(), StatusCode::OK);
	let body = response.into_body().collect().await.unwrap().to_bytes();
	assert!(body.starts_with(br#"[{"id": 1"#));
}
