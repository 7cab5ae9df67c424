/*
 * Copyright (c) 2025 Craig Hamilton and Contributors.
 * Licensed under either of
 *  - Apache License, Version 2.0 <http://www.apache.org/licenses/LICENSE-2.0> OR
 *  - MIT license <http://opensource.org/licenses/MIT>
 *  at your option.
 */
use crate::rest::errors::FlickrError;
use crate::rest::{Document, Session};

impl Session {
    /// Calls `flickr.test.echo`, which returns the sent parameters. Needs no auth token.
    pub async fn test_echo(&mut self, key: &str, value: &str) -> Result<Document, FlickrError> {
        self.prepare_noauth("flickr.test.echo", &[(key, value)])?;
        self.invoke().await
    }

    /// Calls `method` with a single parameter and extracts one value from the response.
    ///
    /// `path` is evaluated with [`Document::find`], e.g. `/rsp/user/@nsid`. Returns
    /// `Ok(None)` when the call succeeded but the path matched nothing.
    pub async fn get_one_string_field(
        &mut self,
        key: &str,
        value: &str,
        method: &str,
        path: &str,
    ) -> Result<Option<String>, FlickrError> {
        self.prepare(method, &[(key, value)])?;
        let doc = self.invoke().await?;
        Ok(doc.find(path))
    }
}
