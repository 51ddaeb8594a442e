//! Interface to the DataTables server-side processing engine
//!
//! The engine that reads `draw`, `start`, `length`, `search[value]`,
//! `order[i][column]` and friends from the request and pages, filters and
//! sorts the records is pluggable. A view only constructs it through a
//! [`DataTablesServerFactory`] and serializes whatever
//! [`DataTablesServer::get_output_result`] returns.

use crate::error::Result;
use crate::request::Request;
use serde::Serialize;
use serde_json::Value;

/// A constructed engine, bound to one request
pub trait DataTablesServer: Send {
	/// Compute the JSON document to send back to the grid
	fn get_output_result(&self) -> Result<Value>;
}

/// Builds a [`DataTablesServer`] from a request, the view's columns and the
/// resolved records
///
/// Any `Fn(&Request, &[String], Vec<T>) -> Result<Box<dyn DataTablesServer>>`
/// closure is a factory.
pub trait DataTablesServerFactory<T>: Send + Sync {
	fn create(
		&self,
		request: &Request,
		columns: &[String],
		data: Vec<T>,
	) -> Result<Box<dyn DataTablesServer>>;
}

impl<T, F> DataTablesServerFactory<T> for F
where
	F: Fn(&Request, &[String], Vec<T>) -> Result<Box<dyn DataTablesServer>> + Send + Sync,
{
	fn create(
		&self,
		request: &Request,
		columns: &[String],
		data: Vec<T>,
	) -> Result<Box<dyn DataTablesServer>> {
		self(request, columns, data)
	}
}

/// Engine that returns the records as they are, without paging or filtering
///
/// Useful for small grids that page on the client, and for exercising views
/// without a real engine.
///
/// # Examples
///
/// ```
/// use reinhardt_datatables::server::{DataTablesServer, DataTablesServerFactory, PassthroughServer};
/// use reinhardt_datatables::Request;
/// use serde_json::json;
///
/// let request = Request::builder().uri("/orders/?draw=1").build().unwrap();
/// let server = PassthroughServer
///     .create(&request, &["id".to_string()], vec![json!({"id": 1})])
///     .unwrap();
/// assert_eq!(server.get_output_result().unwrap(), json!([{"id": 1}]));
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct PassthroughServer;

struct PassthroughOutput {
	output: Value,
}

impl DataTablesServer for PassthroughOutput {
	fn get_output_result(&self) -> Result<Value> {
		Ok(self.output.clone())
	}
}

impl<T> DataTablesServerFactory<T> for PassthroughServer
where
	T: Serialize,
{
	fn create(
		&self,
		_request: &Request,
		_columns: &[String],
		data: Vec<T>,
	) -> Result<Box<dyn DataTablesServer>> {
		let output = serde_json::to_value(&data)?;
		Ok(Box::new(PassthroughOutput { output }))
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::error::DatatableError;
	use rstest::rstest;
	use serde_json::json;

	struct CountServer {
		total: usize,
		draw: String,
	}

	impl DataTablesServer for CountServer {
		fn get_output_result(&self) -> Result<Value> {
			Ok(json!({"draw": self.draw, "recordsTotal": self.total}))
		}
	}

	#[rstest]
	fn test_closure_factory() {
		let factory = |request: &Request, _columns: &[String], data: Vec<u32>| {
			let draw = request
				.query_params
				.get("draw")
				.cloned()
				.unwrap_or_default();
			Ok::<_, DatatableError>(Box::new(CountServer {
				total: data.len(),
				draw,
			}) as Box<dyn DataTablesServer>)
		};

		let request = Request::builder().uri("/grid/?draw=7").build().unwrap();
		let server = factory.create(&request, &[], vec![1, 2, 3]).unwrap();
		assert_eq!(
			server.get_output_result().unwrap(),
			json!({"draw": "7", "recordsTotal": 3})
		);
	}

	#[rstest]
	fn test_factory_error_propagates() {
		let factory = |_: &Request, columns: &[String], _: Vec<u32>| {
			Err::<Box<dyn DataTablesServer>, _>(DatatableError::Engine(format!(
				"{} columns configured, none searchable",
				columns.len()
			)))
		};

		let request = Request::builder().build().unwrap();
		let result = factory.create(&request, &["id".to_string()], vec![]);
		assert!(matches!(result, Err(DatatableError::Engine(_))));
	}
}
