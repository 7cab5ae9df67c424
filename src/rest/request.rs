/*
 * Copyright (c) 2025 Craig Hamilton and Contributors.
 * Licensed under either of
 *  - Apache License, Version 2.0 <http://www.apache.org/licenses/LICENSE-2.0> OR
 *  - MIT license <http://opensource.org/licenses/MIT>
 *  at your option.
 */
use crate::rest::errors::FlickrError;
use crate::rest::signer::sign_params;
use crate::rest::{ApiParams, Creds, Params};

/// File attached to an upload request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Upload {
    /// Form field name the file is sent under
    pub field: String,
    /// Local path of the file
    pub value: String,
}

/// A request assembled and ready to be dispatched
#[derive(Debug, Clone)]
pub struct PreparedRequest {
    pub(crate) uri: String,
    pub(crate) method: Option<String>,
    pub(crate) params: Params,
    pub(crate) upload: Option<Upload>,
    pub(crate) signed: bool,
}

impl PreparedRequest {
    pub fn uri(&self) -> &str {
        &self.uri
    }

    pub fn method(&self) -> Option<&str> {
        self.method.as_deref()
    }

    pub fn params(&self) -> &Params {
        &self.params
    }

    pub fn upload(&self) -> Option<&Upload> {
        self.upload.as_ref()
    }

    pub fn is_signed(&self) -> bool {
        self.signed
    }
}

/// Inputs for assembling one request
#[derive(Debug, Clone, Copy)]
pub(crate) struct RequestDraft<'a> {
    pub url: &'a str,
    pub method: Option<&'a str>,
    pub upload_field: Option<&'a str>,
    pub upload_value: Option<&'a str>,
    pub params: &'a ApiParams<'a>,
    pub params_in_url: bool,
    pub need_auth: bool,
}

impl RequestDraft<'_> {
    /// Builds the canonical parameter list, signing it when authentication is in effect
    /// or `sign` is set.
    pub fn assemble(&self, creds: &Creds, sign: bool) -> Result<PreparedRequest, FlickrError> {
        let upload = match (self.upload_field, self.upload_value) {
            (Some(field), Some(value)) => Some(Upload {
                field: field.to_string(),
                value: value.to_string(),
            }),
            (None, None) => None,
            _ => return Err(FlickrError::UploadMismatch()),
        };

        let secret = creds.shared_secret().ok_or(FlickrError::NoSharedSecret())?;
        let api_key = creds.api_key().ok_or(FlickrError::NoApiKey())?;
        url::Url::parse(self.url)?;

        let mut params = Params::from_pairs(self.params);
        if let Some(method) = self.method {
            params.insert("method", method);
        }
        params.insert("api_key", api_key);

        let auth_token = creds.auth_token().filter(|_| self.need_auth);
        if let Some(token) = auth_token {
            params.insert("auth_token", token);
        }

        let signed = auth_token.is_some() || sign;
        if signed {
            sign_params(secret, &mut params);
        }

        let uri = if self.params_in_url {
            let query = params.to_query_string();
            let mut uri = String::with_capacity(self.url.len() + query.len() + 1);
            uri.push_str(self.url);
            if !self.url.ends_with(['?', '&']) {
                uri.push(if self.url.contains('?') { '&' } else { '?' });
            }
            uri.push_str(&query);
            uri
        } else {
            self.url.to_string()
        };
        log::debug!("URI is '{}'", uri);

        Ok(PreparedRequest {
            uri,
            method: self.method.map(str::to_string),
            params,
            upload,
            signed,
        })
    }
}
