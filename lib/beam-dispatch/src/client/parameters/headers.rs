use indexmap::IndexMap;

use super::param::{ParamValue, ParameterValue, ResolvedParamValue};
use crate::client::error::DispatchError;

/// Header overrides for an API call.
///
/// Headers use the same [`ParamValue`] pattern as path and query parameters. They are sent
/// after the headers the dispatcher contributes itself, so an override always wins.
#[derive(Debug, Clone, Default)]
pub struct CallHeaders {
    headers: IndexMap<String, ResolvedParamValue>,
}

impl CallHeaders {
    /// Creates a new empty CallHeaders instance.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a header.
    ///
    /// Absent values (`None`) are not recorded.
    ///
    /// # Example
    ///
    /// ```rust
    /// use beam_dispatch::CallHeaders;
    ///
    /// let headers = CallHeaders::new()
    ///     .add_header("X-Request-ID", "abc-123-def")
    ///     .add_header("X-BEAM-GAMERTAG", None::<u64>);
    /// assert_eq!(headers.len(), 1);
    /// ```
    #[must_use]
    pub fn add_header<T: ParameterValue>(
        mut self,
        name: impl Into<String>,
        value: impl Into<ParamValue<T>>,
    ) -> Self {
        let name = name.into();
        let param_value = value.into();
        if let Some(mut resolved) = param_value.resolve() {
            resolved.style = param_value.path_style();
            self.headers.insert(name, resolved);
        }
        self
    }

    /// Merges another CallHeaders instance into this one.
    ///
    /// Headers from the other instance will override headers with the same name in this instance.
    #[must_use]
    pub fn merge(mut self, other: Self) -> Self {
        for (name, value) in other.headers {
            self.headers.insert(name, value);
        }
        self
    }

    /// Checks if the headers collection is empty.
    pub fn is_empty(&self) -> bool {
        self.headers.is_empty()
    }

    /// Returns the number of headers.
    pub fn len(&self) -> usize {
        self.headers.len()
    }

    /// Renders the headers as `(name, value)` pairs, in insertion order.
    pub(in crate::client) fn to_http_headers(
        &self,
    ) -> Result<Vec<(String, String)>, DispatchError> {
        let mut result = Vec::with_capacity(self.headers.len());

        for (name, resolved) in &self.headers {
            let value = resolved.to_string_value()?;
            result.push((name.clone(), value));
        }

        Ok(result)
    }
}
