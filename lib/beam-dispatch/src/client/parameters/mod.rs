//! Request parameter types for building API calls.
//!
//! - [`PathParams`] - values substituted into `{name}` placeholders of a path template
//! - [`CallQuery`] - query string parameters
//! - [`CallHeaders`] - header overrides
//! - [`CallBody`] - request body content
//!
//! All of them accept any [`ParameterValue`], optionally wrapped in a [`ParamValue`] to pick a
//! [`ParamStyle`]. `None` values are treated as absent.

mod param;
pub use self::param::{ParamStyle, ParamValue, ParameterValue};

mod path;
pub use self::path::{PathParams, resolve_path};

mod query;
pub use self::query::CallQuery;

mod headers;
pub use self::headers::CallHeaders;

mod body;
pub use self::body::CallBody;
