/*
 * Copyright (c) 2025 Craig Hamilton and Contributors.
 * Licensed under either of
 *  - Apache License, Version 2.0 <http://www.apache.org/licenses/LICENSE-2.0> OR
 *  - MIT license <http://opensource.org/licenses/MIT>
 *  at your option.
 */
use crate::rest::errors::{ErrorState, FlickrError};
use crate::rest::reporter::{ErrorHandler, ErrorReporter};
use crate::rest::request::RequestDraft;
use crate::rest::response::validate;
use crate::rest::transport::{Dispatch, Payload, Verb};
use crate::rest::{
    ApiParams, Config, Creds, Document, Params, PreparedRequest, PushParser, RequestPacer,
    REST_ENDPOINT,
};
use std::time::Duration;
use tokio::time::Instant;

/// A Flickr API session.
///
/// Holds the credentials, the pacing state and the request being worked on. A request is
/// first prepared with one of [`Session::prepare`], [`Session::prepare_noauth`] or
/// [`Session::prepare_upload`] and then sent with [`Session::invoke`].
///
/// ```rust,no_run
/// use flickr::rest::{Creds, Session};
///
/// async fn echo() -> Result<(), flickr::rest::FlickrError> {
///     let mut session = Session::new(Creds::from_tokens("api-key", Some("secret"), None));
///     session.prepare_noauth("flickr.test.echo", &[("hello", "world")])?;
///     let doc = session.invoke().await?;
///     println!("{:?}", doc.find("/rsp/hello"));
///     Ok(())
/// }
/// ```
pub struct Session {
    creds: Creds,
    sign: bool,
    pacer: RequestPacer,
    service_uri: String,
    user_agent: Option<String>,
    proxy: Option<String>,
    http_accept: Option<String>,
    http: Option<reqwest::Client>,

    // Per request state, reset by every prepare
    prepared: Option<PreparedRequest>,
    is_write: bool,
    data: Option<Vec<u8>>,
    status_code: Option<u16>,
    total_bytes: usize,
    error: Option<ErrorState>,

    reporter: ErrorReporter,
}

impl Default for Session {
    fn default() -> Self {
        Self::new(Creds::default())
    }
}

impl Session {
    pub fn new(creds: Creds) -> Self {
        Self {
            creds,
            sign: false,
            pacer: RequestPacer::default(),
            service_uri: REST_ENDPOINT.to_string(),
            user_agent: None,
            proxy: None,
            http_accept: None,
            http: None,
            prepared: None,
            is_write: false,
            data: None,
            status_code: None,
            total_bytes: 0,
            error: None,
            reporter: ErrorReporter::default(),
        }
    }

    /// Creates a session from the settings of a config file
    pub fn from_config(config: &Config) -> Self {
        let mut session = Self::new(config.creds());
        if let Some(delay) = config.request_delay {
            session.set_request_delay(delay);
        }
        session.user_agent = config.user_agent.clone();
        session.proxy = config.proxy.clone();
        session
    }

    pub fn creds(&self) -> &Creds {
        &self.creds
    }

    pub fn set_api_key(&mut self, api_key: &str) {
        self.creds.api_key = Some(api_key.to_string());
    }

    pub fn api_key(&self) -> Option<&str> {
        self.creds.api_key()
    }

    pub fn set_shared_secret(&mut self, secret: &str) {
        self.creds.shared_secret = Some(secret.to_string());
    }

    pub fn shared_secret(&self) -> Option<&str> {
        self.creds.shared_secret()
    }

    pub fn set_auth_token(&mut self, auth_token: &str) {
        self.creds.auth_token = Some(auth_token.to_string());
    }

    pub fn auth_token(&self) -> Option<&str> {
        self.creds.auth_token()
    }

    /// Signs the next dispatched request even without an auth token
    pub fn set_sign(&mut self) {
        self.sign = true;
    }

    /// Minimum time between two requests, in milliseconds
    pub fn set_request_delay(&mut self, delay_msec: u64) {
        self.pacer.set_delay(Duration::from_millis(delay_msec));
    }

    pub fn request_delay(&self) -> Duration {
        self.pacer.delay()
    }

    /// When the previous request was dispatched
    pub fn last_dispatch(&self) -> Option<Instant> {
        self.pacer.last_dispatch()
    }

    /// Replaces the REST endpoint used by [`Session::prepare`] and [`Session::prepare_noauth`]
    pub fn set_service_uri(&mut self, uri: &str) {
        self.service_uri = uri.to_string();
    }

    pub fn set_user_agent(&mut self, user_agent: &str) {
        self.user_agent = Some(user_agent.to_string());
        self.http = None;
    }

    pub fn set_proxy(&mut self, proxy: &str) {
        self.proxy = Some(proxy.to_string());
        self.http = None;
    }

    /// Value of the `Accept` header sent with every request
    pub fn set_http_accept(&mut self, value: &str) {
        self.http_accept = Some(value.to_string());
    }

    /// Routes reported errors to `handler` instead of stderr
    pub fn set_error_handler(&mut self, handler: impl FnMut(&str) + Send + 'static) {
        let handler: ErrorHandler = Box::new(handler);
        self.reporter.set_handler(Some(handler));
    }

    pub fn clear_error_handler(&mut self) {
        self.reporter.set_handler(None);
    }

    /// Sends the prepared request as a POST
    pub fn set_write(&mut self, is_write: bool) {
        self.is_write = is_write;
    }

    /// Sends `data` as an `application/xml` body with the prepared request
    pub fn set_data(&mut self, data: Vec<u8>) {
        self.data = Some(data);
    }

    /// Sends the serialized document as the body of the prepared request
    pub fn set_xml_data(&mut self, doc: &Document) -> Result<(), FlickrError> {
        let data = doc.to_xml()?;
        self.set_data(data);
        Ok(())
    }

    /// Prepares an authenticated call of `method`
    pub fn prepare(&mut self, method: &str, params: &ApiParams<'_>) -> Result<(), FlickrError> {
        let url = self.service_uri.clone();
        self.prepare_method(&url, method, params, true)
    }

    /// Prepares a call of `method` that does not send the auth token
    pub fn prepare_noauth(
        &mut self,
        method: &str,
        params: &ApiParams<'_>,
    ) -> Result<(), FlickrError> {
        let url = self.service_uri.clone();
        self.prepare_method(&url, method, params, false)
    }

    /// Prepares an authenticated multipart upload to `url`.
    ///
    /// `upload_value` is the path of the file sent under the `upload_field` form field.
    /// Both must be given, or neither.
    pub fn prepare_upload(
        &mut self,
        url: &str,
        upload_field: Option<&str>,
        upload_value: Option<&str>,
        params: &ApiParams<'_>,
    ) -> Result<(), FlickrError> {
        self.prepare_common(RequestDraft {
            url,
            method: None,
            upload_field,
            upload_value,
            params,
            params_in_url: false,
            need_auth: true,
        })
    }

    fn prepare_method(
        &mut self,
        url: &str,
        method: &str,
        params: &ApiParams<'_>,
        need_auth: bool,
    ) -> Result<(), FlickrError> {
        if method.is_empty() {
            self.reset();
            return Err(self.fail(FlickrError::NoMethod()));
        }
        self.prepare_common(RequestDraft {
            url,
            method: Some(method),
            upload_field: None,
            upload_value: None,
            params,
            params_in_url: true,
            need_auth,
        })
    }

    fn prepare_common(&mut self, draft: RequestDraft<'_>) -> Result<(), FlickrError> {
        self.reset();
        match draft.assemble(&self.creds, self.sign) {
            Ok(prepared) => {
                self.prepared = Some(prepared);
                Ok(())
            }
            Err(err) => Err(self.fail(err)),
        }
    }

    fn reset(&mut self) {
        self.prepared = None;
        self.is_write = false;
        self.data = None;
        self.error = None;
    }

    /// Dispatches the prepared request and returns the validated response document.
    ///
    /// Waits first if the previous dispatch was less than the request delay ago. Any
    /// failure is recorded in [`Session::error`] and passed to the error handler.
    pub async fn invoke(&mut self) -> Result<Document, FlickrError> {
        if self.prepared.is_none() {
            return Err(self.fail(FlickrError::NothingPrepared()));
        }
        let result = self.dispatch().await;
        // Explicit signing only ever covers one request
        self.sign = false;
        result.map_err(|err| self.fail(err))
    }

    async fn dispatch(&mut self) -> Result<Document, FlickrError> {
        self.error = None;
        self.pacer.wait().await;
        self.status_code = None;
        self.total_bytes = 0;

        let http = self.http_client()?;
        let Some(prepared) = self.prepared.as_ref() else {
            return Err(FlickrError::NothingPrepared());
        };
        let payload = match (&prepared.upload, &self.data) {
            (Some(upload), _) => Payload::Multipart {
                params: &prepared.params,
                upload,
            },
            (None, Some(data)) => Payload::Data(data.as_slice()),
            (None, None) => Payload::None,
        };
        let verb = if self.is_write || !matches!(payload, Payload::None) {
            Verb::Post
        } else {
            Verb::Get
        };
        let dispatch = Dispatch {
            uri: &prepared.uri,
            verb,
            accept: self.http_accept.as_deref(),
            payload,
        };

        let mut parser = PushParser::new();
        let performed = dispatch
            .perform(&http, &mut parser, &mut self.status_code)
            .await;
        self.total_bytes = parser.total_bytes();
        performed?;

        validate(parser, prepared.method())
    }

    fn http_client(&mut self) -> Result<reqwest::Client, FlickrError> {
        if let Some(http) = &self.http {
            return Ok(http.clone());
        }
        let mut builder =
            reqwest::Client::builder().redirect(reqwest::redirect::Policy::limited(10));
        if let Some(user_agent) = &self.user_agent {
            builder = builder.user_agent(user_agent.as_str());
        }
        if let Some(proxy) = &self.proxy {
            builder = builder.proxy(reqwest::Proxy::all(proxy.as_str())?);
        }
        let http = builder.build()?;
        self.http = Some(http.clone());
        Ok(http)
    }

    // Records the failure and hands the message to the reporter
    fn fail(&mut self, err: FlickrError) -> FlickrError {
        self.error = Some(ErrorState::from(&err));
        self.reporter.report(&err.to_string());
        err
    }

    /// The prepared request, if any
    pub fn prepared(&self) -> Option<&PreparedRequest> {
        self.prepared.as_ref()
    }

    /// Target URI of the prepared request
    pub fn uri(&self) -> Option<&str> {
        self.prepared.as_ref().map(|p| p.uri())
    }

    /// Method name of the prepared request
    pub fn method(&self) -> Option<&str> {
        self.prepared.as_ref().and_then(|p| p.method())
    }

    /// Parameters of the prepared request, including any signature
    pub fn params(&self) -> Option<&Params> {
        self.prepared.as_ref().map(|p| p.params())
    }

    pub fn is_write(&self) -> bool {
        self.is_write
    }

    /// HTTP status of the last response
    pub fn status_code(&self) -> Option<u16> {
        self.status_code
    }

    /// Body bytes received for the last request
    pub fn total_bytes(&self) -> usize {
        self.total_bytes
    }

    /// The failure recorded since the last prepare
    pub fn error(&self) -> Option<&ErrorState> {
        self.error.as_ref()
    }

    pub fn failed(&self) -> bool {
        self.error.is_some()
    }

    /// Service error code of the last failure, 0 when there is none
    pub fn error_code(&self) -> i32 {
        self.error.as_ref().map_or(0, |e| e.code)
    }

    pub fn error_msg(&self) -> Option<&str> {
        self.error.as_ref().map(|e| e.message.as_str())
    }
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("creds", &self.creds)
            .field("sign", &self.sign)
            .field("pacer", &self.pacer)
            .field("service_uri", &self.service_uri)
            .field("prepared", &self.prepared.as_ref().map(|p| p.method()))
            .field("status_code", &self.status_code)
            .field("error", &self.error)
            .field("error_handler", &self.reporter.has_handler())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rest::signer::SIGNATURE_PARAM;
    use crate::rest::ErrorKind;
    use std::sync::{Arc, Mutex};

    fn session() -> Session {
        Session::new(Creds::from_tokens("KEY", Some("SECRET"), Some("TOKEN")))
    }

    #[test]
    fn prepare_builds_signed_uri() {
        let mut session = session();
        session.prepare("flickr.photos.getInfo", &[("photo_id", "1")]).unwrap();
        assert_eq!(session.method(), Some("flickr.photos.getInfo"));
        let uri = session.uri().unwrap();
        assert!(uri.starts_with(REST_ENDPOINT));
        assert!(uri.contains("auth_token=TOKEN"));
        assert!(session.params().unwrap().get(SIGNATURE_PARAM).is_some());
    }

    #[test]
    fn prepare_noauth_skips_token_and_signature() {
        let mut session = session();
        session.prepare_noauth("flickr.test.echo", &[]).unwrap();
        let params = session.params().unwrap();
        assert_eq!(params.get("auth_token"), None);
        assert_eq!(params.get(SIGNATURE_PARAM), None);
    }

    #[test]
    fn prepare_replaces_previous_request() {
        let mut session = session();
        session.prepare_noauth("flickr.test.echo", &[("first", "1")]).unwrap();
        session.set_write(true);
        session.set_data(b"<photo/>".to_vec());
        session.prepare_noauth("flickr.test.echo", &[("second", "2")]).unwrap();
        let params = session.params().unwrap();
        assert_eq!(params.get("first"), None);
        assert_eq!(params.get("second"), Some("2"));
        assert!(!session.is_write());
        assert!(session.data.is_none());
    }

    #[test]
    fn prepare_without_secret_is_reported() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = seen.clone();
        let mut session = Session::new(Creds::from_tokens("KEY", None, None));
        session.set_error_handler(move |msg| sink.lock().unwrap().push(msg.to_string()));

        let err = session.prepare_noauth("flickr.test.echo", &[]).unwrap_err();
        assert!(matches!(err, FlickrError::NoSharedSecret()));
        assert!(session.prepared().is_none());
        assert_eq!(session.error().unwrap().kind, ErrorKind::Config);
        assert_eq!(*seen.lock().unwrap(), vec!["No shared secret"]);
    }

    #[test]
    fn prepare_clears_previous_error() {
        let mut session = Session::new(Creds::from_tokens("KEY", None, None));
        session.set_error_handler(|_| {});
        assert!(session.prepare_noauth("flickr.test.echo", &[]).is_err());
        assert!(session.failed());
        session.set_shared_secret("SECRET");
        session.prepare_noauth("flickr.test.echo", &[]).unwrap();
        assert!(!session.failed());
        assert_eq!(session.error_code(), 0);
    }

    #[test]
    fn empty_method_is_rejected() {
        let mut session = session();
        session.set_error_handler(|_| {});
        let err = session.prepare("", &[]).unwrap_err();
        assert!(matches!(err, FlickrError::NoMethod()));
    }

    #[test]
    fn explicit_sign_applies_to_prepare() {
        let mut session = Session::new(Creds::from_tokens("KEY", Some("SECRET"), None));
        session.set_sign();
        session.prepare_noauth("flickr.test.echo", &[]).unwrap();
        assert!(session.prepared().unwrap().is_signed());
    }

    #[tokio::test]
    async fn invoke_without_prepare_fails() {
        let mut session = session();
        session.set_error_handler(|_| {});
        session.set_sign();
        let err = session.invoke().await.unwrap_err();
        assert!(matches!(err, FlickrError::NothingPrepared()));
        assert!(session.last_dispatch().is_none());
        assert!(session.sign);
    }

    #[test]
    fn config_applies_settings() {
        let config = Config::from_toml_str(
            "[flickr]\napi_key = \"KEY\"\nsecret = \"SECRET\"\nrequest_delay = 20\nuser_agent = \"tests/1.0\"",
        )
        .unwrap();
        let session = Session::from_config(&config);
        assert_eq!(session.api_key(), Some("KEY"));
        assert_eq!(session.shared_secret(), Some("SECRET"));
        assert_eq!(session.auth_token(), None);
        assert_eq!(session.request_delay(), Duration::from_millis(20));
        assert_eq!(session.user_agent.as_deref(), Some("tests/1.0"));
    }

    #[test]
    fn set_xml_data_serializes_document() {
        let mut session = session();
        session.prepare("flickr.photos.setMeta", &[]).unwrap();
        let doc = Document::parse(b"<photo id=\"1\"/>").unwrap();
        session.set_xml_data(&doc).unwrap();
        let data = String::from_utf8(session.data.clone().unwrap()).unwrap();
        assert!(data.contains("<photo id=\"1\"/>"));
    }
}
