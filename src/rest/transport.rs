/*
 * Copyright (c) 2025 Craig Hamilton and Contributors.
 * Licensed under either of
 *  - Apache License, Version 2.0 <http://www.apache.org/licenses/LICENSE-2.0> OR
 *  - MIT license <http://opensource.org/licenses/MIT>
 *  at your option.
 */
use crate::rest::errors::FlickrError;
use crate::rest::{Params, PushParser, Upload};
use futures::StreamExt;
use reqwest::header::{ACCEPT, CONTENT_TYPE};
use reqwest::multipart::{Form, Part};
use std::path::Path;
use strum_macros::{Display, IntoStaticStr};

/// HTTP verb used for a dispatch
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, IntoStaticStr)]
#[strum(serialize_all = "UPPERCASE")]
pub enum Verb {
    Get,
    Post,
}

/// What is sent along with the request
#[derive(Debug)]
pub(crate) enum Payload<'a> {
    None,
    /// Raw XML body
    Data(&'a [u8]),
    /// Parameters as form fields plus one file field
    Multipart {
        params: &'a Params,
        upload: &'a Upload,
    },
}

/// One HTTP exchange
#[derive(Debug)]
pub(crate) struct Dispatch<'a> {
    pub uri: &'a str,
    pub verb: Verb,
    pub accept: Option<&'a str>,
    pub payload: Payload<'a>,
}

impl Dispatch<'_> {
    /// Sends the request and streams the body into `parser`.
    ///
    /// `status` is set as soon as the response head arrives. Transport failures are
    /// returned as [`FlickrError::Request`] or [`FlickrError::Io`]; a body chunk that does
    /// not parse stops the read with [`FlickrError::XmlParse`]. The HTTP status itself
    /// is never treated as a failure.
    pub async fn perform(
        self,
        http: &reqwest::Client,
        parser: &mut PushParser,
        status: &mut Option<u16>,
    ) -> Result<(), FlickrError> {
        log::debug!("Resolving URI '{}' with method {}", self.uri, self.verb);
        let mut request = match self.verb {
            Verb::Get => http.get(self.uri),
            Verb::Post => http.post(self.uri),
        };
        if let Some(accept) = self.accept {
            request = request.header(ACCEPT, accept);
        }
        request = match self.payload {
            Payload::None => request,
            Payload::Data(data) => request
                .header(CONTENT_TYPE, "application/xml")
                .body(data.to_vec()),
            Payload::Multipart { params, upload } => {
                request.multipart(upload_form(params, upload).await?)
            }
        };

        let resp = request.send().await?;
        *status = Some(resp.status().as_u16());

        let mut body = resp.bytes_stream();
        while let Some(chunk) = body.next().await {
            let chunk = chunk?;
            parser.feed(&chunk)?;
        }
        log::debug!("Got {} bytes content from URI '{}'", parser.total_bytes(), self.uri);
        Ok(())
    }
}

async fn upload_form(params: &Params, upload: &Upload) -> Result<Form, FlickrError> {
    let mut form = Form::new();
    for (name, value) in params.iter() {
        form = form.text(name.to_string(), value.to_string());
    }
    let contents = tokio::fs::read(&upload.value).await?;
    let file_name = Path::new(&upload.value)
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| upload.value.clone());
    let part = Part::bytes(contents).file_name(file_name);
    Ok(form.part(upload.field.clone(), part))
}
