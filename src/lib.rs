//! Server-side processing views for DataTables grids
//!
//! This crate adapts a data source to the request/response contract of a
//! server-side-processed data grid. A view resolves its records from a lazy
//! query, an already materialized list, or a model's default manager, hands
//! them to a pluggable engine together with the request and the configured
//! columns, and writes the engine's output back as JSON.
//!
//! # Architecture
//!
//! ```mermaid
//! graph TD
//!     A[Request] --> B[ServerSideDatatableView]
//!     B --> C[DataSource]
//!     C --> D[Iterable]
//!     C --> E[LazyQuery]
//!     C --> F[Model default manager]
//!     B --> G[DataTablesServerFactory]
//!     G --> H[DataTablesServer]
//!     H --> I[JSON Response]
//! ```
//!
//! # Example
//!
//! ```rust
//! use reinhardt_datatables::{PassthroughServer, Request, ServerSideDatatableView, View};
//! use serde_json::json;
//!
//! #[tokio::main]
//! async fn main() {
//!     let view = ServerSideDatatableView::builder()
//!         .name("SampleView")
//!         .columns(["id", "data"])
//!         .iterable(vec![
//!             json!({"id": "1", "data": "data"}),
//!             json!({"id": "2", "data": "data"}),
//!         ])
//!         .server(PassthroughServer)
//!         .build()
//!         .unwrap();
//!
//!     let request = Request::builder().uri("/sample/?draw=1").build().unwrap();
//!     let response = view.dispatch(request).await.unwrap();
//!
//!     assert_eq!(
//!         response.body.as_ref(),
//!         br#"[{"id": "1", "data": "data"}, {"id": "2", "data": "data"}]"#
//!     );
//! }
//! ```

#![warn(rustdoc::broken_intra_doc_links)]

pub mod config;
pub mod error;
pub mod json;
pub mod mixin;
pub mod request;
pub mod response;
pub mod server;
pub mod source;
pub mod view;

// Re-exports for convenience
pub use config::{DatatableSettings, DatatableViewBuilder};
pub use error::{DatatableError, Result};
pub use json::JsonEncoding;
pub use mixin::ServerSideDatatableMixin;
pub use request::Request;
pub use response::Response;
pub use server::{DataTablesServer, DataTablesServerFactory, PassthroughServer};
pub use source::{DataSource, LazyQuery, Manager, Model, Queryset};
pub use view::{Handler, ServerSideDatatableView, View};
