use serde::Serialize;

use super::{
    CallBody, CallHeaders, CallQuery, DispatchError, ObjectId, ParamValue, ParameterValue,
    PathParams,
};

/// Everything a single call contributes on top of its [`EndpointDescriptor`](super::EndpointDescriptor).
///
/// Consumed by the dispatch, one instance per call.
///
/// # Example
///
/// ```rust
/// use beam_dispatch::{ObjectId, RequestParameters};
///
/// # fn example() -> Result<(), beam_dispatch::DispatchError> {
/// let parameters = RequestParameters::new()
///     .with_path_param("objectId", ObjectId::from(123_456_789_012_345_u64))
///     .with_query_param("scope", "client.public.player")
///     .with_header("X-Request-ID", "abc-123")
///     .with_gamertag(ObjectId::from(9_876_543_210_u64))
///     .with_json(&serde_json::json!({ "set": { "level": 7 } }))?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, Default)]
pub struct RequestParameters {
    pub(in crate::client) path: PathParams,
    pub(in crate::client) query: CallQuery,
    pub(in crate::client) headers: CallHeaders,
    pub(in crate::client) body: Option<CallBody>,
    pub(in crate::client) gamertag: Option<ObjectId>,
}

impl RequestParameters {
    /// Creates empty parameters.
    pub fn new() -> Self {
        Self::default()
    }

    /// Binds a path placeholder.
    #[must_use]
    pub fn with_path_param<T: ParameterValue>(
        mut self,
        name: impl Into<String>,
        value: impl Into<ParamValue<T>>,
    ) -> Self {
        self.path = self.path.add_param(name, value);
        self
    }

    /// Adds a query parameter, `None` values are skipped.
    #[must_use]
    pub fn with_query_param<T: ParameterValue>(
        mut self,
        name: impl Into<String>,
        value: impl Into<ParamValue<T>>,
    ) -> Self {
        self.query = self.query.add_param(name, value);
        self
    }

    /// Adds a header override, `None` values are skipped.
    #[must_use]
    pub fn with_header<T: ParameterValue>(
        mut self,
        name: impl Into<String>,
        value: impl Into<ParamValue<T>>,
    ) -> Self {
        self.headers = self.headers.add_header(name, value);
        self
    }

    /// Replaces all path parameters.
    #[must_use]
    pub fn with_path(mut self, path: PathParams) -> Self {
        self.path = path;
        self
    }

    /// Replaces all query parameters.
    #[must_use]
    pub fn with_query(mut self, query: CallQuery) -> Self {
        self.query = query;
        self
    }

    /// Merges header overrides, the given ones win on conflicts.
    #[must_use]
    pub fn with_headers(mut self, headers: CallHeaders) -> Self {
        self.headers = self.headers.merge(headers);
        self
    }

    /// Sets the request body.
    #[must_use]
    pub fn with_body(mut self, body: CallBody) -> Self {
        self.body = Some(body);
        self
    }

    /// Sets a JSON request body.
    ///
    /// # Errors
    ///
    /// Returns [`DispatchError::Serialization`] if the value cannot be serialized.
    pub fn with_json<T>(self, body: &T) -> Result<Self, DispatchError>
    where
        T: Serialize + ?Sized,
    {
        let body = CallBody::json(body)?;
        Ok(self.with_body(body))
    }

    /// Acts on behalf of another player through the `X-BEAM-GAMERTAG` header.
    ///
    /// `None` leaves the identity inferred from the credential.
    #[must_use]
    pub fn with_gamertag(mut self, gamertag: impl Into<Option<ObjectId>>) -> Self {
        self.gamertag = gamertag.into();
        self
    }
}
