use http::Method;

/// Immutable definition of one API operation.
///
/// Descriptors are meant to be declared once per call site as `const` items and reused for
/// every call.
///
/// ```rust
/// use beam_dispatch::EndpointDescriptor;
/// use http::Method;
///
/// const PUT_ENTRY: EndpointDescriptor =
///     EndpointDescriptor::put("/object/leaderboards/{objectId}/entry").with_auth();
///
/// assert_eq!(PUT_ENTRY.method(), &Method::PUT);
/// assert!(PUT_ENTRY.requires_auth());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct EndpointDescriptor {
    path_template: &'static str,
    method: Method,
    requires_auth: bool,
}

impl EndpointDescriptor {
    /// Creates an anonymous descriptor for any method.
    pub const fn new(method: Method, path_template: &'static str) -> Self {
        Self {
            path_template,
            method,
            requires_auth: false,
        }
    }

    /// `GET` descriptor.
    pub const fn get(path_template: &'static str) -> Self {
        Self::new(Method::GET, path_template)
    }

    /// `POST` descriptor.
    pub const fn post(path_template: &'static str) -> Self {
        Self::new(Method::POST, path_template)
    }

    /// `PUT` descriptor.
    pub const fn put(path_template: &'static str) -> Self {
        Self::new(Method::PUT, path_template)
    }

    /// `DELETE` descriptor.
    pub const fn delete(path_template: &'static str) -> Self {
        Self::new(Method::DELETE, path_template)
    }

    /// Marks the endpoint as requiring credentials.
    ///
    /// The dispatcher only forwards the flag; attaching the credential is the transport's job.
    #[must_use]
    pub const fn with_auth(mut self) -> Self {
        self.requires_auth = true;
        self
    }

    /// The path template, with `{name}` placeholders.
    pub const fn path_template(&self) -> &'static str {
        self.path_template
    }

    /// The HTTP method.
    pub const fn method(&self) -> &Method {
        &self.method
    }

    /// Whether the transport must attach credentials.
    pub const fn requires_auth(&self) -> bool {
        self.requires_auth
    }
}
