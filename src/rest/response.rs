/*
 * Copyright (c) 2025 Craig Hamilton and Contributors.
 * Licensed under either of
 *  - Apache License, Version 2.0 <http://www.apache.org/licenses/LICENSE-2.0> OR
 *  - MIT license <http://opensource.org/licenses/MIT>
 *  at your option.
 */
use crate::rest::errors::FlickrError;
use crate::rest::{Document, Element, PushParser};

// Root attribute reporting the call outcome
const STATUS_ATTR: &str = "stat";
const STATUS_OK: &str = "ok";
const ERROR_ELEMENT: &str = "err";

/// Finalizes the streamed body and checks the service's reported status.
///
/// Only a root with `stat="ok"` is a success. Anything else becomes a
/// [`FlickrError::ApiResponse`] carrying the `code`/`msg` of the error element.
pub(crate) fn validate(parser: PushParser, method: Option<&str>) -> Result<Document, FlickrError> {
    let doc = parser.finish()?;
    let stat = doc.root().attr(STATUS_ATTR);
    log::debug!("Request returned stat '{}'", stat.unwrap_or_default());
    if stat == Some(STATUS_OK) {
        return Ok(doc);
    }

    let (code, msg) = error_element(doc.root())
        .map(|err| {
            let code = err
                .attr("code")
                .and_then(|c| c.trim().parse::<i32>().ok())
                .unwrap_or(0);
            let msg = err.attr("msg").unwrap_or_default().to_string();
            (code, msg)
        })
        .unwrap_or_default();

    Err(FlickrError::ApiResponse {
        method: method.map(str::to_string),
        code,
        msg,
    })
}

// The error element is named `err`; older responses may use another name, in which case
// the first child element is taken.
fn error_element(root: &Element) -> Option<&Element> {
    root.child(ERROR_ELEMENT)
        .or_else(|| root.child_elements().next())
}
