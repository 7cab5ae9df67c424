/*
 * Copyright (c) 2025 Craig Hamilton and Contributors.
 * Licensed under either of
 *  - Apache License, Version 2.0 <http://www.apache.org/licenses/LICENSE-2.0> OR
 *  - MIT license <http://opensource.org/licenses/MIT>
 *  at your option.
 */
use num_enum::TryFromPrimitive;

// Root Flickr REST endpoint
pub const REST_ENDPOINT: &str = "https://www.flickr.com/services/rest/";

// Photo upload endpoint, used with `Session::prepare_upload`
pub const UPLOAD_ENDPOINT: &str = "https://up.flickr.com/services/upload/";

/// Label prefixed to errors written to stderr when no handler is registered
pub const PROGRAM_LABEL: &str = "flickr";

/// Minimum delay between two requests of one session unless configured otherwise
pub const DEFAULT_REQUEST_DELAY_MS: u64 = 1000;

/// Key/value pairs a caller passes for one request
pub type ApiParams<'a> = [(&'a str, &'a str)];

/// Generic error codes any Flickr method may return.
///
/// Method specific codes live below 96 and are not enumerated here.
#[derive(Debug, Clone, Copy, PartialEq, Eq, TryFromPrimitive)]
#[repr(i32)]
pub enum ApiErrorCodes {
    InvalidSignature = 96,
    MissingSignature = 97,
    LoginFailed = 98,
    InsufficientPermissions = 99,
    InvalidApiKey = 100,
    ServiceUnavailable = 105,
    FormatNotFound = 111,
    MethodNotFound = 112,
    InvalidSoapEnvelope = 114,
    InvalidXmlRpcCall = 115,
    BadUrlFound = 116,
}

/// Credentials used to build and sign requests
#[derive(Default, Clone)]
pub struct Creds {
    pub(crate) api_key: Option<String>,
    pub(crate) shared_secret: Option<String>,
    pub(crate) auth_token: Option<String>,
}

impl Creds {
    /// Creates credentials from the provided tokens.
    ///
    /// The shared secret is required before any request can be prepared; the auth token
    /// is only needed for methods that act on behalf of a user.
    pub fn from_tokens(
        api_key: &str,
        shared_secret: Option<&str>,
        auth_token: Option<&str>,
    ) -> Self {
        Self {
            api_key: Some(api_key.to_string()),
            shared_secret: shared_secret.map(str::to_string),
            auth_token: auth_token.map(str::to_string),
        }
    }

    /// Reads `FLICKR_API_KEY`, `FLICKR_SHARED_SECRET` and `FLICKR_AUTH_TOKEN`.
    ///
    /// Unset or empty variables are left as `None`.
    pub fn from_env() -> Self {
        let var = |name: &str| std::env::var(name).ok().filter(|v| !v.is_empty());
        Self {
            api_key: var("FLICKR_API_KEY"),
            shared_secret: var("FLICKR_SHARED_SECRET"),
            auth_token: var("FLICKR_AUTH_TOKEN"),
        }
    }

    pub fn api_key(&self) -> Option<&str> {
        self.api_key.as_deref()
    }

    pub fn shared_secret(&self) -> Option<&str> {
        self.shared_secret.as_deref()
    }

    pub fn auth_token(&self) -> Option<&str> {
        self.auth_token.as_deref()
    }
}

impl std::fmt::Debug for Creds {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mask = |v: &Option<String>| v.as_ref().map(|_| "xxx");
        f.debug_struct("Creds")
            .field("api_key", &mask(&self.api_key))
            .field("shared_secret", &mask(&self.shared_secret))
            .field("auth_token", &mask(&self.auth_token))
            .finish()
    }
}
