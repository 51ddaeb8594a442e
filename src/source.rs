//! Data sources a datatable view can be backed by
//!
//! A view is configured with exactly one [`DataSource`]. The variant is chosen
//! when the view is configured, so resolving it never has to guess whether a
//! value is a lazy query or an already materialized list.

use crate::error::Result;
use async_trait::async_trait;
use std::fmt;
use std::sync::Arc;

/// A deferred query that only hits its backing store when evaluated
#[async_trait]
pub trait LazyQuery<T>: Send + Sync {
	/// Evaluate the query and return every matching record
	async fn all(&self) -> Result<Vec<T>>;
}

/// A model's standard accessor for all of its records
#[async_trait]
pub trait Manager<T>: Send + Sync {
	/// Fetch all records of the model
	async fn all(&self) -> Result<Vec<T>>;
}

/// A model type exposing a default manager
///
/// # Examples
///
/// ```
/// use async_trait::async_trait;
/// use reinhardt_datatables::source::{Manager, Model};
/// use reinhardt_datatables::Result;
/// use std::sync::Arc;
///
/// #[derive(Clone)]
/// struct Order {
///     id: i64,
/// }
///
/// struct OrderManager;
///
/// #[async_trait]
/// impl Manager<Order> for OrderManager {
///     async fn all(&self) -> Result<Vec<Order>> {
///         Ok(vec![Order { id: 1 }])
///     }
/// }
///
/// impl Model for Order {
///     type Record = Order;
///
///     fn default_manager() -> Arc<dyn Manager<Order>> {
///         Arc::new(OrderManager)
///     }
/// }
/// ```
pub trait Model {
	/// Record type produced by the manager
	type Record;

	/// Return the default manager for this model
	fn default_manager() -> Arc<dyn Manager<Self::Record>>;
}

/// The `queryset` attribute of a view: either lazy or already concrete
pub enum Queryset<T> {
	Lazy(Arc<dyn LazyQuery<T>>),
	Iterable(Vec<T>),
}

impl<T: Clone> Clone for Queryset<T> {
	fn clone(&self) -> Self {
		match self {
			Queryset::Lazy(query) => Queryset::Lazy(Arc::clone(query)),
			Queryset::Iterable(records) => Queryset::Iterable(records.clone()),
		}
	}
}

impl<T> fmt::Debug for Queryset<T> {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Queryset::Lazy(_) => f.write_str("Queryset::Lazy(..)"),
			Queryset::Iterable(records) => write!(f, "Queryset::Iterable(len={})", records.len()),
		}
	}
}

/// Where a view's records come from
pub enum DataSource<T> {
	/// Records that are already materialized; returned unchanged
	Iterable(Vec<T>),
	/// A lazy query evaluated on every resolution
	LazyQuery(Arc<dyn LazyQuery<T>>),
	/// A model's default manager, asked for all records on every resolution
	ModelDefaultManager(Arc<dyn Manager<T>>),
}

impl<T> DataSource<T>
where
	T: Clone + Send + Sync,
{
	/// Back the source with a model's default manager
	pub fn from_model<M>() -> Self
	where
		M: Model<Record = T>,
	{
		DataSource::ModelDefaultManager(M::default_manager())
	}

	/// Evaluate the source into a concrete list of records
	///
	/// Nothing is cached: lazy queries and managers are evaluated again on
	/// every call.
	///
	/// # Examples
	///
	/// ```
	/// use reinhardt_datatables::DataSource;
	///
	/// #[tokio::main]
	/// async fn main() {
	///     let source = DataSource::Iterable(vec!["a", "b"]);
	///     assert_eq!(source.resolve().await.unwrap(), vec!["a", "b"]);
	/// }
	/// ```
	pub async fn resolve(&self) -> Result<Vec<T>> {
		match self {
			DataSource::Iterable(records) => Ok(records.clone()),
			DataSource::LazyQuery(query) => query.all().await,
			DataSource::ModelDefaultManager(manager) => manager.all().await,
		}
	}
}

impl<T> DataSource<T> {
	/// Short name of the variant, used in logs
	pub fn kind(&self) -> &'static str {
		match self {
			DataSource::Iterable(_) => "iterable",
			DataSource::LazyQuery(_) => "lazy_query",
			DataSource::ModelDefaultManager(_) => "model_default_manager",
		}
	}
}

impl<T> From<Queryset<T>> for DataSource<T> {
	fn from(queryset: Queryset<T>) -> Self {
		match queryset {
			Queryset::Lazy(query) => DataSource::LazyQuery(query),
			Queryset::Iterable(records) => DataSource::Iterable(records),
		}
	}
}

impl<T: Clone> Clone for DataSource<T> {
	fn clone(&self) -> Self {
		match self {
			DataSource::Iterable(records) => DataSource::Iterable(records.clone()),
			DataSource::LazyQuery(query) => DataSource::LazyQuery(Arc::clone(query)),
			DataSource::ModelDefaultManager(manager) => {
				DataSource::ModelDefaultManager(Arc::clone(manager))
			}
		}
	}
}

impl<T> fmt::Debug for DataSource<T> {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			DataSource::Iterable(records) => {
				write!(f, "DataSource::Iterable(len={})", records.len())
			}
			DataSource::LazyQuery(_) => f.write_str("DataSource::LazyQuery(..)"),
			DataSource::ModelDefaultManager(_) => f.write_str("DataSource::ModelDefaultManager(..)"),
		}
	}
}
