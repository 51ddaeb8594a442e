//! Inbound HTTP request handed to datatable views

use crate::error::{DatatableError, Result};
use bytes::Bytes;
use hyper::http::request::Parts;
use hyper::{HeaderMap, Method, Uri, Version};
use percent_encoding::percent_decode_str;
use std::collections::HashMap;
use std::fmt::Display;

/// HTTP request as seen by a view
///
/// Query parameters are kept raw (not percent-decoded) because the grid
/// engine decides how to interpret them. Use
/// [`decoded_query_params`](Request::decoded_query_params) for a decoded copy.
#[derive(Debug, Clone)]
pub struct Request {
	pub method: Method,
	pub uri: Uri,
	pub version: Version,
	pub headers: HeaderMap,
	pub body: Bytes,
	/// Raw query parameters; when a key repeats, the last value wins.
	/// Re-parse `uri` to see every value of a repeated key.
	pub query_params: HashMap<String, String>,
}

impl Request {
	/// Create a request from its raw parts
	///
	/// # Examples
	///
	/// ```
	/// use reinhardt_datatables::Request;
	/// use hyper::{HeaderMap, Method, Uri, Version};
	/// use bytes::Bytes;
	///
	/// let request = Request::new(
	///     Method::GET,
	///     "/orders/?draw=1&start=0".parse::<Uri>().unwrap(),
	///     Version::HTTP_11,
	///     HeaderMap::new(),
	///     Bytes::new(),
	/// );
	/// assert_eq!(request.query_params.get("draw"), Some(&"1".to_string()));
	/// ```
	pub fn new(method: Method, uri: Uri, version: Version, headers: HeaderMap, body: Bytes) -> Self {
		let query_params = Self::parse_query_params(&uri);
		Self {
			method,
			uri,
			version,
			headers,
			body,
			query_params,
		}
	}

	/// Start building a request
	pub fn builder() -> RequestBuilder {
		RequestBuilder::default()
	}

	/// Create a request from the parts of a collected hyper request
	pub fn from_parts(parts: Parts, body: Bytes) -> Self {
		Self::new(parts.method, parts.uri, parts.version, parts.headers, body)
	}

	fn parse_query_params(uri: &Uri) -> HashMap<String, String> {
		uri.query()
			.map(|q| {
				q.split('&')
					.filter(|pair| !pair.is_empty())
					.filter_map(|pair| {
						// Split on first '=' only to preserve '=' in values
						let mut parts = pair.splitn(2, '=');
						Some((
							parts.next()?.to_string(),
							parts.next().unwrap_or("").to_string(),
						))
					})
					.collect()
			})
			.unwrap_or_default()
	}

	/// Get the request path
	pub fn path(&self) -> &str {
		self.uri.path()
	}

	/// Get URL-decoded query parameters
	///
	/// `+` is treated as a space, matching how browsers encode form-style
	/// query strings sent by grid widgets.
	///
	/// # Examples
	///
	/// ```
	/// use reinhardt_datatables::Request;
	///
	/// let request = Request::builder()
	///     .uri("/orders/?search%5Bvalue%5D=John+Doe")
	///     .build()
	///     .unwrap();
	///
	/// let decoded = request.decoded_query_params();
	/// assert_eq!(decoded.get("search[value]"), Some(&"John Doe".to_string()));
	/// ```
	pub fn decoded_query_params(&self) -> HashMap<String, String> {
		self.query_params
			.iter()
			.map(|(k, v)| (Self::decode_component(k), Self::decode_component(v)))
			.collect()
	}

	fn decode_component(raw: &str) -> String {
		let spaced = raw.replace('+', " ");
		percent_decode_str(&spaced).decode_utf8_lossy().into_owned()
	}
}

/// Builder for [`Request`]
#[derive(Debug)]
pub struct RequestBuilder {
	method: Method,
	uri: std::result::Result<Uri, String>,
	version: Version,
	headers: HeaderMap,
	body: Bytes,
}

impl Default for RequestBuilder {
	fn default() -> Self {
		Self {
			method: Method::GET,
			uri: Ok(Uri::from_static("/")),
			version: Version::HTTP_11,
			headers: HeaderMap::new(),
			body: Bytes::new(),
		}
	}
}

impl RequestBuilder {
	pub fn method(mut self, method: Method) -> Self {
		self.method = method;
		self
	}

	pub fn uri<U>(mut self, uri: U) -> Self
	where
		U: TryInto<Uri>,
		U::Error: Display,
	{
		self.uri = uri.try_into().map_err(|e| e.to_string());
		self
	}

	pub fn version(mut self, version: Version) -> Self {
		self.version = version;
		self
	}

	pub fn headers(mut self, headers: HeaderMap) -> Self {
		self.headers = headers;
		self
	}

	/// Add a single header, ignoring names or values that are not valid HTTP
	pub fn header(mut self, name: &str, value: &str) -> Self {
		if let Ok(header_name) = hyper::header::HeaderName::from_bytes(name.as_bytes())
			&& let Ok(header_value) = hyper::header::HeaderValue::from_str(value)
		{
			self.headers.insert(header_name, header_value);
		}
		self
	}

	pub fn body(mut self, body: impl Into<Bytes>) -> Self {
		self.body = body.into();
		self
	}

	/// Finish the request, failing if the URI could not be parsed
	pub fn build(self) -> Result<Request> {
		let uri = self.uri.map_err(DatatableError::InvalidRequest)?;
		Ok(Request::new(
			self.method,
			uri,
			self.version,
			self.headers,
			self.body,
		))
	}
}
