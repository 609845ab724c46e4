use std::fmt;

use base64::Engine;
use http::header::{AUTHORIZATION, HeaderName};
use http::{HeaderValue, Method};
use md5::{Digest, Md5};
use zeroize::{Zeroize, ZeroizeOnDrop};

/// Errors that can occur while turning a credential into a request header.
#[derive(Debug, Clone, PartialEq, Eq, derive_more::Error, derive_more::Display)]
pub enum AuthenticationError {
    /// The endpoint requires authentication but no credential is configured.
    #[display("Endpoint requires authentication but no credential is configured")]
    MissingCredential,

    /// Bearer token contains invalid characters for HTTP headers.
    #[display("Bearer token contains invalid characters: {message}")]
    InvalidBearerToken {
        /// Description of the invalid characters or format issue.
        message: String,
    },

    /// Basic authentication username contains invalid characters.
    #[display("Basic auth username contains invalid characters: {message}")]
    InvalidUsername {
        /// Description of the invalid characters or format issue.
        message: String,
    },

    /// Basic authentication password contains invalid characters.
    #[display("Basic auth password contains invalid characters: {message}")]
    InvalidPassword {
        /// Description of the invalid characters or format issue.
        message: String,
    },

    /// API key header name is invalid.
    #[display("Invalid API key header name '{header_name}': {message}")]
    InvalidHeaderName {
        /// The invalid header name that was provided.
        header_name: String,
        /// Description of why the header name is invalid.
        message: String,
    },

    /// API key value contains invalid characters for HTTP headers.
    #[display("API key contains invalid characters: {message}")]
    InvalidApiKey {
        /// Description of the invalid characters or format issue.
        message: String,
    },

    /// A signed credential was asked for a header without the request to sign.
    #[display("Signed credential needs the request, use `Authentication::to_request_header`")]
    SignatureNeedsRequest,
}

/// Sensitive string that is zeroed from memory on drop.
///
/// Neither `Debug` nor `Display` ever print the full value.
#[derive(Clone, PartialEq, Eq, Zeroize, ZeroizeOnDrop)]
pub struct SecureString(String);

impl SecureString {
    /// Creates a new secure string from the provided value.
    pub fn new(value: String) -> Self {
        Self(value)
    }

    /// Returns a reference to the inner string value.
    ///
    /// The returned reference should not be stored for extended periods.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Checks if the secure string equals the given string slice.
    pub fn equals_str(&self, other: &str) -> bool {
        self.0 == other
    }

    /// Masks the value for display: the first and last four characters of long values.
    fn mask_sensitive(value: &str) -> String {
        let count = value.chars().count();
        if count <= 8 {
            return "***".to_string();
        }

        let head = value.chars().take(4).collect::<String>();
        let tail = value.chars().skip(count - 4).collect::<String>();
        format!("{head}...{tail}")
    }
}

impl fmt::Debug for SecureString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SecureString")
            .field("value", &"[REDACTED]")
            .finish()
    }
}

impl fmt::Display for SecureString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", Self::mask_sensitive(&self.0))
    }
}

impl From<String> for SecureString {
    fn from(value: String) -> Self {
        Self::new(value)
    }
}

impl From<&str> for SecureString {
    fn from(value: &str) -> Self {
        Self::new(value.to_string())
    }
}

/// Credential attached by the transport to endpoints that require authentication.
///
/// Game-services endpoints use a bearer access token. Basic and API-key credentials cover
/// server-to-server calls and tooling.
///
/// # Examples
///
/// ```rust
/// use beam_dispatch::Authentication;
///
/// let player = Authentication::Bearer("access-token".into());
///
/// let tooling = Authentication::Basic {
///     username: "admin".to_string(),
///     password: "pass".into(),
/// };
///
/// let tool = Authentication::ApiKey {
///     header_name: "X-API-Key".to_string(),
///     key: "secret-key".into(),
/// };
///
/// let server = Authentication::Signed {
///     pid: "DE_1338004997867621".to_string(),
///     secret: "realm-secret".into(),
/// };
/// ```
#[derive(Clone)]
pub enum Authentication {
    /// Adds `Authorization: Bearer <token>`.
    Bearer(SecureString),

    /// Adds `Authorization: Basic <base64(username:password)>`.
    Basic {
        /// The username for Basic authentication.
        username: String,
        /// The password for Basic authentication.
        password: SecureString,
    },

    /// Adds `<header_name>: <key>`.
    ApiKey {
        /// The header name for the API key.
        header_name: String,
        /// The API key value.
        key: SecureString,
    },

    /// Signs every request with the realm secret through `X-BEAM-SIGNATURE`.
    ///
    /// The signature is `base64(md5(secret + pid + "1" + path_and_query + body))`, the body
    /// being left out of `GET` and `DELETE` requests.
    Signed {
        /// The project (realm) identifier.
        pid: String,
        /// The realm secret.
        secret: SecureString,
    },
}

/// Header carrying the signature of a server-to-server request.
pub const SIGNATURE_HEADER: HeaderName = HeaderName::from_static("x-beam-signature");

const SIGNATURE_VERSION: &str = "1";

fn request_signature(
    pid: &str,
    secret: &SecureString,
    method: &Method,
    path_and_query: &str,
    body: Option<&[u8]>,
) -> String {
    let mut hasher = Md5::new();
    hasher.update(secret.as_str());
    hasher.update(pid);
    hasher.update(SIGNATURE_VERSION);
    hasher.update(path_and_query);
    if let Some(body) = body
        && *method != Method::GET
        && *method != Method::DELETE
    {
        hasher.update(body);
    }
    base64::engine::general_purpose::STANDARD.encode(hasher.finalize())
}

impl Authentication {
    /// Whether the credential depends on the request it is attached to.
    pub fn is_signed(&self) -> bool {
        matches!(self, Self::Signed { .. })
    }

    /// Converts the credential into the header for a given request.
    ///
    /// `path_and_query` is the path of the absolute URL with its query string, if any.
    ///
    /// # Errors
    ///
    /// Returns `AuthenticationError` if the credential contains characters that are not
    /// allowed in HTTP headers.
    pub fn to_request_header(
        &self,
        method: &Method,
        path_and_query: &str,
        body: Option<&[u8]>,
    ) -> Result<(HeaderName, HeaderValue), AuthenticationError> {
        let Self::Signed { pid, secret } = self else {
            return self.to_header();
        };
        let signature = request_signature(pid, secret, method, path_and_query, body);
        let value = HeaderValue::from_str(&signature).map_err(|err| {
            AuthenticationError::InvalidApiKey {
                message: err.to_string(),
            }
        })?;
        Ok((SIGNATURE_HEADER, value))
    }

    /// Converts a static credential into the header to add to the request.
    ///
    /// # Errors
    ///
    /// Returns `AuthenticationError` if the credential contains characters that are not
    /// allowed in HTTP headers, and [`AuthenticationError::SignatureNeedsRequest`] for a
    /// [`Signed`](Self::Signed) credential.
    pub fn to_header(&self) -> Result<(HeaderName, HeaderValue), AuthenticationError> {
        match self {
            Self::Bearer(token) => {
                let header_value = format!("Bearer {}", token.as_str());
                let value = HeaderValue::from_str(&header_value).map_err(|err| {
                    AuthenticationError::InvalidBearerToken {
                        message: err.to_string(),
                    }
                })?;
                Ok((AUTHORIZATION, value))
            }

            Self::Basic { username, password } => {
                if username.contains(':') {
                    return Err(AuthenticationError::InvalidUsername {
                        message: "Username cannot contain colon (:) character".to_string(),
                    });
                }

                let credentials_str = format!("{username}:{}", password.as_str());
                let credentials = base64::engine::general_purpose::STANDARD.encode(credentials_str);

                let header_value = format!("Basic {credentials}");
                let value = HeaderValue::from_str(&header_value).map_err(|err| {
                    AuthenticationError::InvalidPassword {
                        message: err.to_string(),
                    }
                })?;
                Ok((AUTHORIZATION, value))
            }

            Self::ApiKey { header_name, key } => {
                let header = HeaderName::from_bytes(header_name.as_bytes()).map_err(|err| {
                    AuthenticationError::InvalidHeaderName {
                        header_name: header_name.clone(),
                        message: err.to_string(),
                    }
                })?;
                let value = HeaderValue::from_str(key.as_str()).map_err(|err| {
                    AuthenticationError::InvalidApiKey {
                        message: err.to_string(),
                    }
                })?;
                Ok((header, value))
            }

            Self::Signed { .. } => Err(AuthenticationError::SignatureNeedsRequest),
        }
    }
}

impl fmt::Debug for Authentication {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bearer(_) => f.debug_tuple("Bearer").field(&"[REDACTED]").finish(),
            Self::Basic { username, .. } => f
                .debug_struct("Basic")
                .field("username", username)
                .field("password", &"[REDACTED]")
                .finish(),
            Self::ApiKey { header_name, .. } => f
                .debug_struct("ApiKey")
                .field("header_name", header_name)
                .field("key", &"[REDACTED]")
                .finish(),
            Self::Signed { pid, .. } => f
                .debug_struct("Signed")
                .field("pid", pid)
                .field("secret", &"[REDACTED]")
                .finish(),
        }
    }
}

impl fmt::Display for Authentication {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bearer(token) => write!(f, "Bearer {token}"),
            Self::Basic { username, .. } => write!(f, "Basic (username: {username})"),
            Self::ApiKey { header_name, key } => write!(f, "ApiKey ({header_name}: {key})"),
            Self::Signed { pid, .. } => write!(f, "Signed (pid: {pid})"),
        }
    }
}
