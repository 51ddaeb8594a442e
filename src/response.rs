//! HTTP responses produced by datatable views

use crate::error::{DatatableError, Result};
use crate::json::JsonEncoding;
use bytes::Bytes;
use http_body_util::Full;
use hyper::header::{self, HeaderName, HeaderValue};
use hyper::{HeaderMap, StatusCode};
use serde::Serialize;

/// HTTP Response representation
#[derive(Debug, Clone)]
pub struct Response {
	pub status: StatusCode,
	pub headers: HeaderMap,
	pub body: Bytes,
}

impl Response {
	/// Create a new Response with the given status code
	///
	/// # Examples
	///
	/// ```
	/// use reinhardt_datatables::Response;
	/// use hyper::StatusCode;
	///
	/// let response = Response::new(StatusCode::OK);
	/// assert_eq!(response.status, StatusCode::OK);
	/// assert!(response.body.is_empty());
	/// ```
	pub fn new(status: StatusCode) -> Self {
		Self {
			status,
			headers: HeaderMap::new(),
			body: Bytes::new(),
		}
	}

	/// Create a Response with HTTP 200 OK status
	pub fn ok() -> Self {
		Self::new(StatusCode::OK)
	}

	/// Create a Response with HTTP 405 Method Not Allowed, advertising `allowed`
	///
	/// # Examples
	///
	/// ```
	/// use reinhardt_datatables::Response;
	/// use hyper::StatusCode;
	///
	/// let response = Response::method_not_allowed(&["GET", "HEAD"]);
	/// assert_eq!(response.status, StatusCode::METHOD_NOT_ALLOWED);
	/// assert_eq!(response.headers.get("allow").unwrap(), "GET, HEAD");
	/// ```
	pub fn method_not_allowed(allowed: &[&str]) -> Self {
		Self::new(StatusCode::METHOD_NOT_ALLOWED).with_header("Allow", &allowed.join(", "))
	}

	/// Create a Response with HTTP 500 Internal Server Error status
	pub fn internal_server_error() -> Self {
		Self::new(StatusCode::INTERNAL_SERVER_ERROR)
	}

	/// Set the response body
	pub fn with_body(mut self, body: impl Into<Bytes>) -> Self {
		self.body = body.into();
		self
	}

	/// Add a custom header, silently skipping invalid names or values
	pub fn with_header(mut self, name: &str, value: &str) -> Self {
		if let Ok(header_name) = HeaderName::from_bytes(name.as_bytes())
			&& let Ok(header_value) = HeaderValue::from_str(value)
		{
			self.headers.insert(header_name, header_value);
		}
		self
	}

	/// Set the response body to JSON and add the `application/json` Content-Type
	///
	/// Uses the default [`JsonEncoding`], so separators are spaced and
	/// non-ASCII characters are escaped.
	///
	/// # Examples
	///
	/// ```
	/// use reinhardt_datatables::Response;
	/// use serde_json::json;
	///
	/// let response = Response::ok()
	///     .with_json(&json!([{"id": "1", "data": "data"}]))
	///     .unwrap();
	///
	/// assert_eq!(response.body.as_ref(), br#"[{"id": "1", "data": "data"}]"#);
	/// assert_eq!(
	///     response.headers.get("content-type").unwrap().to_str().unwrap(),
	///     "application/json"
	/// );
	/// ```
	pub fn with_json<T: Serialize + ?Sized>(self, data: &T) -> Result<Self> {
		self.with_json_encoding(data, JsonEncoding::default())
	}

	/// Same as [`with_json`](Response::with_json) with explicit encoding options
	pub fn with_json_encoding<T: Serialize + ?Sized>(
		self,
		data: &T,
		encoding: JsonEncoding,
	) -> Result<Self> {
		let body = encoding.encode(data)?;
		let mut response = self.with_body(body);
		response.headers.insert(
			header::CONTENT_TYPE,
			HeaderValue::from_static("application/json"),
		);
		Ok(response)
	}

	/// Drop the body while keeping status and headers, as a HEAD response does
	pub fn without_body(mut self) -> Self {
		self.body = Bytes::new();
		self
	}

	/// Convert into a hyper response for a server loop
	pub fn into_hyper(self) -> hyper::Response<Full<Bytes>> {
		let mut response = hyper::Response::new(Full::new(self.body));
		*response.status_mut() = self.status;
		*response.headers_mut() = self.headers;
		response
	}
}

impl From<DatatableError> for Response {
	fn from(error: DatatableError) -> Self {
		let status =
			StatusCode::from_u16(error.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
		let body = serde_json::json!({
			"error": error.to_string(),
		});

		Response::new(status)
			.with_json(&body)
			.unwrap_or_else(|_| Response::internal_server_error().with_body("Internal Server Error"))
	}
}
