//! Model trait describing a table-backed row type

use crate::core::error::QueryError;
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;

/// A typed row stored by a [`Session`](crate::core::session::Session).
///
/// Models travel through the session as JSON objects, so anything serde can
/// round-trip works. The primary key column defaults to `id`.
///
/// # Example
///
/// ```rust,ignore
/// #[derive(Clone, Debug, Serialize, Deserialize)]
/// struct User {
///     id: i64,
///     name: String,
/// }
///
/// impl Model for User {
///     fn table_name() -> &'static str {
///         "user"
///     }
/// }
/// ```
pub trait Model: Serialize + DeserializeOwned + Clone + Send + Sync + 'static {
    /// The table rows of this model live in
    fn table_name() -> &'static str;

    /// The primary key column
    fn primary_key() -> &'static str {
        "id"
    }

    /// Value of the primary key column for this instance
    fn primary_key_value(&self) -> Option<Value> {
        serde_json::to_value(self)
            .ok()
            .and_then(|row| row.get(Self::primary_key()).cloned())
            .filter(|v| !v.is_null())
    }

    /// Encode this instance as a session row
    fn to_row(&self) -> Result<Value, QueryError> {
        serde_json::to_value(self).map_err(|e| QueryError::Encode {
            table: Self::table_name().to_string(),
            message: e.to_string(),
        })
    }

    fn from_row(row: Value) -> Result<Self, QueryError> {
        serde_json::from_value(row).map_err(|e| QueryError::Decode {
            table: Self::table_name().to_string(),
            message: e.to_string(),
        })
    }
}

/// Implement [`Model`] for a struct
///
/// # Example
/// ```rust,ignore
/// impl_model!(User, "user");
/// impl_model!(Tag, "tag", "slug"); // primary key other than `id`
/// ```
#[macro_export]
macro_rules! impl_model {
    ($type:ty, $table:expr) => {
        impl $crate::core::model::Model for $type {
            fn table_name() -> &'static str {
                $table
            }
        }
    };
    ($type:ty, $table:expr, $key:expr) => {
        impl $crate::core::model::Model for $type {
            fn table_name() -> &'static str {
                $table
            }

            fn primary_key() -> &'static str {
                $key
            }
        }
    };
}
