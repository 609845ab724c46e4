use bytes::Bytes;
use headers::ContentType;
use serde::Serialize;

use crate::client::DispatchError;

/// The body of an HTTP request with its content type.
///
/// The dispatcher sends the content type as the `Content-Type` header unless the caller
/// overrides it.
#[derive(Clone, derive_more::Debug)]
pub struct CallBody {
    pub(in crate::client) content_type: ContentType,
    #[debug(ignore)]
    pub(in crate::client) data: Bytes,
}

impl CallBody {
    /// Creates a JSON body from a serializable type.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use beam_dispatch::CallBody;
    /// # use serde::Serialize;
    /// # fn example() -> Result<(), Box<dyn std::error::Error>> {
    /// #[derive(Serialize)]
    /// struct DeleteDevicesRequest {
    ///     #[serde(rename = "deviceIds")]
    ///     device_ids: Vec<String>,
    /// }
    ///
    /// let body = CallBody::json(&DeleteDevicesRequest { device_ids: vec!["d-1".into()] })?;
    /// # Ok(())
    /// # }
    /// ```
    pub fn json<T>(data: &T) -> Result<Self, DispatchError>
    where
        T: Serialize + ?Sized,
    {
        let data = serde_json::to_vec(data).map_err(DispatchError::Serialization)?;

        Ok(Self {
            content_type: ContentType::json(),
            data: Bytes::from(data),
        })
    }

    /// Creates an `application/x-www-form-urlencoded` body, as used by the token endpoint.
    pub fn form<T>(data: &T) -> Result<Self, DispatchError>
    where
        T: Serialize + ?Sized,
    {
        let data = serde_urlencoded::to_string(data)?;

        Ok(Self {
            content_type: ContentType::form_url_encoded(),
            data: Bytes::from(data),
        })
    }

    /// Creates an `application/octet-stream` body.
    ///
    /// ```rust
    /// use beam_dispatch::CallBody;
    ///
    /// let body = CallBody::raw(vec![0xFF, 0xFE, 0xFD]);
    /// assert_eq!(body.len(), 3);
    /// ```
    pub fn raw(data: impl Into<Bytes>) -> Self {
        Self::raw_with_content_type(data, ContentType::octet_stream())
    }

    /// Creates a raw body with custom content type.
    pub fn raw_with_content_type(data: impl Into<Bytes>, content_type: ContentType) -> Self {
        Self {
            content_type,
            data: data.into(),
        }
    }

    /// Creates a text body with text/plain content type.
    pub fn text(text: &str) -> Self {
        Self::raw_with_content_type(text.to_string(), ContentType::text())
    }

    /// The content type sent with the body.
    pub fn content_type(&self) -> &ContentType {
        &self.content_type
    }

    /// Size of the body in bytes.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Checks whether the body has no bytes.
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}
