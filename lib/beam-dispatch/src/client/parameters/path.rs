use std::collections::BTreeSet;
use std::sync::LazyLock;

use indexmap::IndexMap;
use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};
use regex::Regex;
use tracing::warn;

use super::param::{ParamValue, ParameterValue, ResolvedParamValue};
use crate::client::DispatchError;

/// Regular expression for matching path parameters in the format `{param_name}`.
#[allow(clippy::expect_used)]
static RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{(?<name>[^{}/]+)}").expect("a valid regex"));

/// Everything but the RFC 3986 unreserved characters.
const PATH_SEGMENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'.')
    .remove(b'_')
    .remove(b'~');

fn replace_path_param(path: &str, param_name: &str, value: &str) -> String {
    let pattern = ["{", param_name, "}"].concat();
    path.replace(&pattern, value)
}

/// `.` and `..` are removed or collapsed by URL normalization, whatever their encoding.
fn is_dot_segment(value: &str) -> bool {
    matches!(value, "." | "..")
}

fn encode_path_param_value(value: &str) -> String {
    utf8_percent_encode(value, PATH_SEGMENT).to_string()
}

/// Values for the `{name}` placeholders of a path template.
///
/// # Examples
///
/// ```rust
/// use beam_dispatch::{ObjectId, PathParams};
///
/// let params = PathParams::new()
///     .add_param("objectId", ObjectId::from(123_456_789_012_345_u64))
///     .add_param("name", "my stat");
///
/// let path = params.resolve("/object/stats/{objectId}/{name}").expect("all bound");
/// assert_eq!(path, "/object/stats/123456789012345/my%20stat");
/// ```
///
/// The same placeholder may appear several times in a template; it is replaced everywhere.
#[derive(Debug, Clone, Default)]
pub struct PathParams {
    args: IndexMap<String, ResolvedParamValue>,
}

impl PathParams {
    /// Creates an empty set of path parameters.
    pub fn new() -> Self {
        Self::default()
    }

    /// Binds a placeholder. Re-binding a name replaces its value.
    ///
    /// Absent values (`None`) are not bound, so the placeholder stays missing.
    #[must_use]
    pub fn add_param<T: ParameterValue>(
        mut self,
        name: impl Into<String>,
        param: impl Into<ParamValue<T>>,
    ) -> Self {
        let name = name.into();
        let param = param.into();
        if let Some(resolved) = param.resolve() {
            self.args.insert(name, resolved);
        }
        self
    }

    /// Checks whether no parameter is bound.
    pub fn is_empty(&self) -> bool {
        self.args.is_empty()
    }

    /// Substitutes the bound values into `template`.
    pub fn resolve(&self, template: &str) -> Result<String, DispatchError> {
        resolve_path(template, self)
    }
}

/// Substitutes `params` into the `{name}` placeholders of `template`.
///
/// Values are percent-encoded as path segments: only ASCII alphanumerics and `-._~` are kept
/// as is. Parameters that the template does not reference are ignored.
///
/// # Errors
///
/// - [`DispatchError::MissingPathParameter`] lists every placeholder without a value.
/// - [`DispatchError::DotSegmentPathParameter`] if a value is `.` or `..`.
/// - [`DispatchError::UnsupportedParameterValue`] if a value cannot be rendered as text.
pub fn resolve_path(template: &str, params: &PathParams) -> Result<String, DispatchError> {
    let mut names: BTreeSet<&str> = RE
        .captures_iter(template)
        .filter_map(|caps| caps.name("name"))
        .map(|found| found.as_str())
        .collect();

    let mut path = template.to_string();
    if names.is_empty() {
        return Ok(path);
    }

    for (name, resolved) in &params.args {
        if !names.remove(name.as_str()) {
            warn!(?name, template, "argument name not found");
            continue;
        }

        let path_value = resolved.to_string_value()?;
        if is_dot_segment(&path_value) {
            return Err(DispatchError::DotSegmentPathParameter {
                template: template.to_string(),
                name: name.clone(),
                value: path_value,
            });
        }
        let encoded_value = encode_path_param_value(&path_value);
        path = replace_path_param(&path, name, &encoded_value);
    }

    if names.is_empty() {
        return Ok(path);
    }

    Err(DispatchError::MissingPathParameter {
        template: template.to_string(),
        missing: names.into_iter().map(ToString::to_string).collect(),
    })
}
