use std::any::type_name;

use bytes::Bytes;
use headers::{ContentType, HeaderMapExt};
use http::header::AsHeaderName;
use http::{HeaderMap, HeaderValue, StatusCode};
use mime::Mime;
use serde::de::DeserializeOwned;

use super::DispatchError;
use super::transport::TransportResponse;

/// Undecoded response body, classified from the `Content-Type` header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RawBody {
    /// No content, either a `204 No Content` or a zero-length body.
    Empty,
    /// A JSON document (`application/json` or a `+json` media type).
    Json(String),
    /// Textual content (`text/*`, or UTF-8 content without a `Content-Type`).
    Text(String),
    /// Anything else.
    Bytes(Bytes),
}

impl RawBody {
    fn classify(status: StatusCode, headers: &HeaderMap, body: Bytes) -> Self {
        if status == StatusCode::NO_CONTENT || body.is_empty() {
            return Self::Empty;
        }

        let Some(content_type) = headers.typed_get::<ContentType>() else {
            return Self::text_or_bytes(body);
        };

        let mime = Mime::from(content_type);
        let is_json = mime.subtype() == mime::JSON || mime.suffix() == Some(mime::JSON);
        if is_json {
            return match String::from_utf8(body.to_vec()) {
                Ok(json) => Self::Json(json),
                Err(_) => Self::Bytes(body),
            };
        }

        if mime.type_() == mime::TEXT {
            Self::text_or_bytes(body)
        } else {
            Self::Bytes(body)
        }
    }

    fn text_or_bytes(body: Bytes) -> Self {
        match String::from_utf8(body.to_vec()) {
            Ok(text) => Self::Text(text),
            Err(_) => Self::Bytes(body),
        }
    }

    /// Returns the body as text, when it is JSON or text.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Json(text) | Self::Text(text) => Some(text),
            Self::Empty | Self::Bytes(_) => None,
        }
    }

    /// Returns true if the response has no body.
    pub fn is_empty(&self) -> bool {
        matches!(self, Self::Empty)
    }
}

/// Uniform result of a dispatched call: status, payload and response headers.
///
/// Whatever the status, the transport response is wrapped as is. Callers decide what a
/// non-success status means for them.
#[derive(Debug, Clone)]
pub struct ResponseEnvelope<T> {
    status_code: StatusCode,
    payload: T,
    headers: HeaderMap,
}

impl<T> ResponseEnvelope<T> {
    /// The HTTP status code of the response.
    pub fn status_code(&self) -> StatusCode {
        self.status_code
    }

    /// Checks whether the status is in the `2xx` range.
    pub fn is_success(&self) -> bool {
        self.status_code.is_success()
    }

    /// The payload of the response.
    pub fn payload(&self) -> &T {
        &self.payload
    }

    /// Consumes the envelope and returns the payload.
    pub fn into_payload(self) -> T {
        self.payload
    }

    /// The response headers.
    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// The first value of a response header.
    pub fn header<K>(&self, name: K) -> Option<&HeaderValue>
    where
        K: AsHeaderName,
    {
        self.headers.get(name)
    }

    /// Transforms the payload, keeping status and headers.
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> ResponseEnvelope<U> {
        ResponseEnvelope {
            status_code: self.status_code,
            payload: f(self.payload),
            headers: self.headers,
        }
    }
}

impl ResponseEnvelope<RawBody> {
    /// Decodes the JSON payload into `R`.
    ///
    /// An empty body is decoded as JSON `null`, so `()` and `Option<_>` accept it.
    ///
    /// # Errors
    ///
    /// - [`DispatchError::Decode`] when the body does not match `R`, with the location of the mismatch
    /// - [`DispatchError::UnsupportedJsonOutput`] when the body is binary
    pub fn decode_json<R>(self) -> Result<ResponseEnvelope<R>, DispatchError>
    where
        R: DeserializeOwned,
    {
        let status = self.status_code;
        let json = match &self.payload {
            RawBody::Empty => "null",
            RawBody::Json(json) | RawBody::Text(json) => json.as_str(),
            RawBody::Bytes(_) => {
                return Err(DispatchError::UnsupportedJsonOutput {
                    status,
                    output: self.payload.clone(),
                    name: type_name::<R>(),
                });
            }
        };
        let payload = deserialize::<R>(status, json)?;

        Ok(self.map(|_| payload))
    }
}

fn deserialize<R>(status: StatusCode, json: &str) -> Result<R, DispatchError>
where
    R: DeserializeOwned,
{
    let deserializer = &mut serde_json::Deserializer::from_str(json);
    serde_path_to_error::deserialize(deserializer).map_err(|err| DispatchError::Decode {
        status,
        path: err.path().to_string(),
        error: err.into_inner(),
        body: json.to_string(),
    })
}

impl From<TransportResponse> for ResponseEnvelope<RawBody> {
    fn from(response: TransportResponse) -> Self {
        let TransportResponse {
            status,
            headers,
            body,
        } = response;
        let payload = RawBody::classify(status, &headers, body);

        Self {
            status_code: status,
            payload,
            headers,
        }
    }
}
