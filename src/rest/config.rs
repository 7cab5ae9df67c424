/*
 * Copyright (c) 2025 Craig Hamilton and Contributors.
 * Licensed under either of
 *  - Apache License, Version 2.0 <http://www.apache.org/licenses/LICENSE-2.0> OR
 *  - MIT license <http://opensource.org/licenses/MIT>
 *  at your option.
 */
use crate::rest::errors::FlickrError;
use crate::rest::parsers::from_empty_str_to_none;
use crate::rest::Creds;
use serde::Deserialize;
use std::path::Path;

/// Session settings read from a TOML file.
///
/// ```toml
/// [flickr]
/// api_key = "0123456789abcdef0123456789abcdef"
/// secret = "fedcba9876543210"
/// auth_token = "1234567-8901234567890123"
/// request_delay = 1000
/// ```
#[derive(Deserialize, Default, Clone)]
pub struct Config {
    #[serde(default, deserialize_with = "from_empty_str_to_none")]
    pub api_key: Option<String>,

    #[serde(default, deserialize_with = "from_empty_str_to_none")]
    pub secret: Option<String>,

    #[serde(default, deserialize_with = "from_empty_str_to_none")]
    pub auth_token: Option<String>,

    /// Milliseconds between requests
    #[serde(default)]
    pub request_delay: Option<u64>,

    #[serde(default, deserialize_with = "from_empty_str_to_none")]
    pub user_agent: Option<String>,

    #[serde(default, deserialize_with = "from_empty_str_to_none")]
    pub proxy: Option<String>,
}

// The settings live under a [flickr] table
#[derive(Deserialize)]
struct ConfigFile {
    flickr: Config,
}

impl Config {
    /// Parses the `[flickr]` table of a TOML document
    pub fn from_toml_str(text: &str) -> Result<Self, FlickrError> {
        Ok(toml::from_str::<ConfigFile>(text)?.flickr)
    }

    /// Reads and parses a config file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, FlickrError> {
        let text = std::fs::read_to_string(path)?;
        Self::from_toml_str(&text)
    }

    pub fn creds(&self) -> Creds {
        Creds {
            api_key: self.api_key.clone(),
            shared_secret: self.secret.clone(),
            auth_token: self.auth_token.clone(),
        }
    }
}

impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("creds", &self.creds())
            .field("request_delay", &self.request_delay)
            .field("user_agent", &self.user_agent)
            .field("proxy", &self.proxy)
            .finish()
    }
}
