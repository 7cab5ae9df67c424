/*
 * Copyright (c) 2025 Craig Hamilton and Contributors.
 * Licensed under either of
 *  - Apache License, Version 2.0 <http://www.apache.org/licenses/LICENSE-2.0> OR
 *  - MIT license <http://opensource.org/licenses/MIT>
 *  at your option.
 */

//! # Flickr
//!
//! A session engine for the Flickr REST API.
//!
//! For further details on the Rest API refer to the [Flickr API Docs](https://www.flickr.com/services/api/)
//!
//! ## Features
//!
//! - Request preparation
//!     - Parameters kept in call order, or sorted by name when signed
//!     - MD5 request signatures (`api_sig`) for authenticated or explicitly signed calls
//!     - Multipart photo uploads and raw XML bodies
//! - Request pacing, one request per second by default
//! - Streamed responses parsed incrementally as the body arrives
//! - Service errors decoded from the `<err code msg>` element
//! - Credentials from code, environment or a TOML config file
//!
//! *Obtaining an auth token is left up to the consumer of this library. The
//! [`rest::Session`] handles everything from parameter assembly to response validation.*
//!
//! ## Installation
//!
//! ```toml
//! [dependencies]
//! flickr = "0.1.0"
//! ```
//!
//! ## Usage
//!
//! **You will need to acquire an API key/secret from Flickr prior to using the API**
//!
//! ```rust,no_run
//! use flickr::rest::{Creds, Session};
//!
//! async fn lookup_user(api_key: &str, secret: &str, url: &str) -> anyhow::Result<Option<String>> {
//!     let mut session = Session::new(Creds::from_tokens(api_key, Some(secret), None));
//!
//!     // Errors are also reported here as they happen
//!     session.set_error_handler(|msg| eprintln!("lookup failed: {}", msg));
//!
//!     // Sends flickr.urls.lookupUser and pulls the id out of <rsp><user id="...">
//!     let nsid = session
//!         .get_one_string_field("url", url, "flickr.urls.lookupUser", "/rsp/user/@id")
//!         .await?;
//!
//!     // The session can be reused; the next request waits out the request delay
//!     session.prepare_noauth("flickr.test.echo", &[("ping", "pong")])?;
//!     let doc = session.invoke().await?;
//!     assert_eq!(doc.root().attr("stat"), Some("ok"));
//!     Ok(nsid)
//! }
//! ```
//!
pub mod rest;
