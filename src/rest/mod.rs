/*
 * Copyright (c) 2025 Craig Hamilton and Contributors.
 * Licensed under either of
 *  - Apache License, Version 2.0 <http://www.apache.org/licenses/LICENSE-2.0> OR
 *  - MIT license <http://opensource.org/licenses/MIT>
 *  at your option.
 */

pub mod api;
pub mod config;
pub mod errors;
mod methods;
pub mod pacer;
pub mod params;
mod parsers;
pub mod reporter;
pub mod request;
mod response;
pub mod session;
pub mod signer;
pub mod time;
pub mod transport;
pub mod xml;

pub use api::*;
pub use config::*;
pub use errors::*;
pub use pacer::*;
pub use params::*;
pub use reporter::ErrorHandler;
pub use request::{PreparedRequest, Upload};
pub use session::*;
pub use signer::{sign, SIGNATURE_PARAM};
pub use time::*;
pub use transport::Verb;
pub use xml::*;
