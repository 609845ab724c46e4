//! Query parameter handling.
//!
//! Parameters keep the order in which they were added. Absent values (`None`) never reach the
//! query string, which is different from an empty value (`Some("")` renders `key=`).
//!
//! Array values follow their [`ParamStyle`]:
//!
//! - **Form** (default): arrays are repeated `?tags=a&tags=b&tags=c`
//! - **SpaceDelimited**: arrays are joined with spaces `?tags=a+b+c`
//! - **PipeDelimited**: arrays are joined with pipes `?tags=a%7Cb%7Cc`

use indexmap::IndexMap;

use super::param::{ParamValue, ParameterValue, ResolvedParamValue};
use crate::client::DispatchError;

/// A collection of query parameters.
///
/// # Examples
///
/// ```rust
/// use beam_dispatch::CallQuery;
///
/// let query = CallQuery::new()
///     .add_param("Players", vec!["p1", "p2"])
///     .add_param("includePartitions", true)
///     .add_param("prefix", None::<&str>);
///
/// assert_eq!(
///     query.to_query_string().expect("serializable"),
///     "?Players=p1&Players=p2&includePartitions=true"
/// );
/// ```
#[derive(Debug, Clone, Default)]
pub struct CallQuery {
    params: IndexMap<String, ResolvedParamValue>,
}

impl CallQuery {
    /// Creates a new empty query parameter collection.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a query parameter.
    ///
    /// Re-adding a name replaces its value but keeps its original position. Absent values
    /// (`None`) are not recorded.
    #[must_use]
    pub fn add_param<T: ParameterValue>(
        mut self,
        name: impl Into<String>,
        param: impl Into<ParamValue<T>>,
    ) -> Self {
        let name = name.into();
        let param = param.into();
        if let Some(resolved) = param.resolve() {
            self.params.insert(name, resolved);
        }
        self
    }

    /// Check if the query is empty
    pub fn is_empty(&self) -> bool {
        self.params.is_empty()
    }

    /// Number of recorded parameters.
    pub fn len(&self) -> usize {
        self.params.len()
    }

    /// Flattens the parameters into `(name, value)` pairs, in insertion order.
    fn to_pairs(&self) -> Result<Vec<(&str, String)>, DispatchError> {
        let mut pairs = Vec::with_capacity(self.params.len());
        for (name, resolved) in &self.params {
            for value in resolved.to_query_values()? {
                pairs.push((name.as_str(), value));
            }
        }
        Ok(pairs)
    }

    /// Serializes the parameters as a URL-encoded query string.
    ///
    /// The result starts with `?` unless no pair survives, in which case it is empty.
    pub fn to_query_string(&self) -> Result<String, DispatchError> {
        let pairs = self.to_pairs()?;
        if pairs.is_empty() {
            return Ok(String::new());
        }

        let encoded = serde_urlencoded::to_string(&pairs)?;
        Ok(format!("?{encoded}"))
    }
}
