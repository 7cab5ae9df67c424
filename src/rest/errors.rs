/*
 * Copyright (c) 2025 Craig Hamilton and Contributors.
 * Licensed under either of
 *  - Apache License, Version 2.0 <http://www.apache.org/licenses/LICENSE-2.0> OR
 *  - MIT license <http://opensource.org/licenses/MIT>
 *  at your option.
 */

use crate::rest::ApiErrorCodes;
use num_enum::TryFromPrimitiveError;
use std::io;
use strum_macros::{Display, IntoStaticStr};
use thiserror::Error;

/// Error conditions that can be returned
#[derive(Error, Debug)]
pub enum FlickrError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("{0}")]
    Request(#[from] reqwest::Error),

    #[error("URL Parse error: {0}")]
    UrlParsing(#[from] url::ParseError),

    #[error("Config file error: {0}")]
    ConfigFile(#[from] toml::de::Error),

    #[error("No shared secret")]
    NoSharedSecret(),

    #[error("No API key")]
    NoApiKey(),

    #[error("No method to prepare")]
    NoMethod(),

    #[error("Upload field and upload value must be given together")]
    UploadMismatch(),

    #[error("No Flickr URI prepared to invoke")]
    NothingPrepared(),

    #[error("XML Parsing failed: {0}")]
    XmlParse(String),

    #[error("XML error: {0}")]
    Xml(#[from] quick_xml::Error),

    #[error("{}", service_failure_message(.method, .code, .msg))]
    ApiResponse {
        method: Option<String>,
        code: i32,
        msg: String,
    },

    #[error("API Response error code is invalid")]
    ApiResponseCode(#[from] TryFromPrimitiveError<ApiErrorCodes>),
}

impl FlickrError {
    /// Classifies this error into one of the four failure families
    pub fn kind(&self) -> ErrorKind {
        use FlickrError as E;
        match self {
            E::UrlParsing(_)
            | E::ConfigFile(_)
            | E::NoSharedSecret()
            | E::NoApiKey()
            | E::NoMethod()
            | E::UploadMismatch()
            | E::NothingPrepared() => ErrorKind::Config,
            E::Io(_) | E::Request(_) => ErrorKind::Transport,
            E::XmlParse(_) | E::Xml(_) => ErrorKind::Parse,
            E::ApiResponse { .. } | E::ApiResponseCode(_) => ErrorKind::Service,
        }
    }

    /// Decodes the service error code into one of the generic codes
    pub fn api_error_code(&self) -> Option<Result<ApiErrorCodes, FlickrError>> {
        match self {
            FlickrError::ApiResponse { code, .. } => {
                Some(ApiErrorCodes::try_from(*code).map_err(FlickrError::from))
            }
            _ => None,
        }
    }
}

fn service_failure_message(method: &Option<String>, code: &i32, msg: &str) -> String {
    match method {
        Some(method) => format!("Method {} failed with error {} - {}", method, code, msg),
        None => format!("Call failed with error {} - {}", code, msg),
    }
}

/// Family a failure belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, IntoStaticStr)]
pub enum ErrorKind {
    Config,
    Transport,
    Parse,
    Service,
}

/// The last failure recorded on a session.
///
/// `code` is only non-zero for service failures, where `message` holds the service's
/// own `msg`. For every other kind `message` is the formatted diagnostic.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorState {
    pub kind: ErrorKind,
    pub code: i32,
    pub message: String,
}

impl From<&FlickrError> for ErrorState {
    fn from(err: &FlickrError) -> Self {
        match err {
            FlickrError::ApiResponse { code, msg, .. } => Self {
                kind: ErrorKind::Service,
                code: *code,
                message: msg.clone(),
            },
            _ => Self {
                kind: err.kind(),
                code: 0,
                message: err.to_string(),
            },
        }
    }
}
