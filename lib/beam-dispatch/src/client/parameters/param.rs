use std::fmt::Debug;

use serde::Serialize;
use tracing::warn;

use crate::client::error::DispatchError;

/// A trait alias for types that can be used as parameter values.
///
/// All parameter values must be serializable, debuggable and thread-safe.
pub trait ParameterValue: Serialize + Debug + Send + Sync + Clone + 'static {}

// Blanket implementation for all types that satisfy the constraints
impl<T> ParameterValue for T where T: Serialize + Debug + Send + Sync + Clone + 'static {}

/// How array values are laid out in a path segment, query string or header.
///
/// # Examples
///
/// ```rust
/// use beam_dispatch::{ParamStyle, ParamValue};
///
/// // Form style (query default) - arrays are repeated: ?tags=rust&tags=web&tags=api
/// let form = ParamValue::new(vec!["rust", "web", "api"]);
/// assert_eq!(form.query_style(), ParamStyle::Form);
///
/// // Pipe delimited - arrays are joined with pipes: ?tags=rust%7Cweb%7Capi
/// let pipe = ParamValue::with_style(vec!["rust", "web", "api"], ParamStyle::PipeDelimited);
/// assert_eq!(pipe.query_style(), ParamStyle::PipeDelimited);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ParamStyle {
    /// Form for query parameters, Simple for path parameters and headers
    #[default]
    Default,
    /// Form style: `param=value1&param=value2` (query default)
    Form,
    /// Simple style: `value1,value2` (path and header default)
    Simple,
    /// Space delimited: `value1 value2`
    SpaceDelimited,
    /// Pipe delimited: `value1|value2`
    PipeDelimited,
}

/// A parameter value with its serialization style
#[derive(Debug, Clone)]
pub struct ParamValue<T>
where
    T: ParameterValue,
{
    /// The parameter value
    pub value: T,
    /// The serialization style
    pub style: ParamStyle,
}

/// A parameter serialized to JSON, ready to be rendered as text.
#[derive(Debug, Clone, PartialEq)]
pub(in crate::client) struct ResolvedParamValue {
    pub value: serde_json::Value,
    pub style: ParamStyle,
    /// Serialization failure, raised when the value is rendered.
    pub failure: Option<String>,
}

impl<T> ParamValue<T>
where
    T: ParameterValue,
{
    /// Create a new parameter value with default style
    pub fn new(value: T) -> Self {
        Self {
            value,
            style: ParamStyle::Default,
        }
    }

    /// Create a new parameter value with specified style
    pub fn with_style(value: T, style: ParamStyle) -> Self {
        Self { value, style }
    }

    /// Get the actual style to use for query parameters
    pub fn query_style(&self) -> ParamStyle {
        match self.style {
            ParamStyle::Default => ParamStyle::Form,
            style => style,
        }
    }

    /// Get the actual style to use for path parameters and headers
    pub fn path_style(&self) -> ParamStyle {
        match self.style {
            ParamStyle::Default => ParamStyle::Simple,
            style => style,
        }
    }

    /// Serializes the value.
    ///
    /// Returns `None` when the value is absent (serializes to `null`). A value that cannot be
    /// serialized is kept with its failure, so building the request fails later on.
    pub(in crate::client) fn resolve(&self) -> Option<ResolvedParamValue> {
        match serde_json::to_value(&self.value) {
            Ok(serde_json::Value::Null) => None,
            Ok(value) => Some(ResolvedParamValue {
                value,
                style: self.style,
                failure: None,
            }),
            Err(error) => {
                warn!(value = ?self.value, %error, "failed to serialize parameter value");
                Some(ResolvedParamValue {
                    value: serde_json::Value::String(format!("{:?}", self.value)),
                    style: self.style,
                    failure: Some(error.to_string()),
                })
            }
        }
    }
}

impl ResolvedParamValue {
    /// Converts a scalar JSON value to its string form.
    ///
    /// Numbers keep their exact textual representation, so 64-bit integers are never rounded.
    fn json_value_to_string(value: &serde_json::Value) -> Result<Option<String>, DispatchError> {
        match value {
            serde_json::Value::String(text) => Ok(Some(text.clone())),
            serde_json::Value::Number(number) => Ok(Some(number.to_string())),
            serde_json::Value::Bool(flag) => Ok(Some(flag.to_string())),
            serde_json::Value::Null => Ok(None),
            serde_json::Value::Array(_) | serde_json::Value::Object(_) => {
                Err(DispatchError::UnsupportedParameterValue {
                    message: "nested complex values not supported in parameters".to_string(),
                    value: value.clone(),
                })
            }
        }
    }

    /// Converts array items to string values, skipping `null` items.
    fn array_to_string_values(items: &[serde_json::Value]) -> Result<Vec<String>, DispatchError> {
        let mut result = Vec::with_capacity(items.len());
        for item in items {
            if let Some(text) = Self::json_value_to_string(item)? {
                result.push(text);
            }
        }
        Ok(result)
    }

    fn delimiter(&self) -> &'static str {
        match self.style {
            ParamStyle::Default | ParamStyle::Simple | ParamStyle::Form => ",",
            ParamStyle::SpaceDelimited => " ",
            ParamStyle::PipeDelimited => "|",
        }
    }

    fn check_serialized(&self) -> Result<(), DispatchError> {
        match &self.failure {
            Some(error) => Err(DispatchError::UnsupportedParameterValue {
                message: format!("failed to serialize parameter value: {error}"),
                value: self.value.clone(),
            }),
            None => Ok(()),
        }
    }

    fn unsupported_object(&self) -> DispatchError {
        DispatchError::UnsupportedParameterValue {
            message: "object values not supported in parameters".to_string(),
            value: self.value.clone(),
        }
    }

    /// Renders the value as one string, joining arrays with the style delimiter.
    ///
    /// Used for path segments and headers.
    pub(in crate::client) fn to_string_value(&self) -> Result<String, DispatchError> {
        self.check_serialized()?;
        match &self.value {
            serde_json::Value::Array(items) => {
                let values = Self::array_to_string_values(items)?;
                Ok(values.join(self.delimiter()))
            }
            serde_json::Value::Object(_) => Err(self.unsupported_object()),
            value => Ok(Self::json_value_to_string(value)?.unwrap_or_default()),
        }
    }

    /// Renders the value as query values.
    ///
    /// Form style arrays produce one value per element, other styles a single joined value.
    /// An empty array produces no value at all.
    pub(in crate::client) fn to_query_values(&self) -> Result<Vec<String>, DispatchError> {
        self.check_serialized()?;
        match &self.value {
            serde_json::Value::Array(items) => {
                let values = Self::array_to_string_values(items)?;
                match self.style {
                    ParamStyle::Default | ParamStyle::Form => Ok(values),
                    _ if values.is_empty() => Ok(values),
                    _ => Ok(vec![values.join(self.delimiter())]),
                }
            }
            serde_json::Value::Object(_) => Err(self.unsupported_object()),
            value => Ok(Self::json_value_to_string(value)?.into_iter().collect()),
        }
    }
}

impl<T> From<T> for ParamValue<T>
where
    T: ParameterValue,
{
    fn from(value: T) -> Self {
        Self::new(value)
    }
}
