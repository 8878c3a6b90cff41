#![forbid(unsafe_code)]

use std::env;

use idp_contracts::stream::DEFAULT_MAX_STRING_LEN;

pub const MAX_REQUEST_BYTES_ENV: &str = "IDP_SSO_MAX_REQUEST_BYTES";
pub const MAX_STRING_LEN_ENV: &str = "IDP_SSO_MAX_STRING_LEN";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SsoInitiationActionConfig {
    /// Upper bound on an inbound payload, wire or REST body.
    pub max_request_bytes: usize,
    /// Upper bound on any single string field, decoded from the wire or parsed from JSON.
    pub max_string_len: usize,
}

impl SsoInitiationActionConfig {
    pub fn mvp_v1() -> Self {
        Self {
            max_request_bytes: 64 * 1024,
            max_string_len: DEFAULT_MAX_STRING_LEN,
        }
    }

    /// Defaults overridden by the environment; unparsable values are ignored.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::mvp_v1();
        let parse = |key: &str, fallback: usize| {
            lookup(key)
                .and_then(|raw| raw.trim().parse::<usize>().ok())
                .unwrap_or(fallback)
        };
        Self {
            max_request_bytes: parse(MAX_REQUEST_BYTES_ENV, defaults.max_request_bytes),
            max_string_len: parse(MAX_STRING_LEN_ENV, defaults.max_string_len),
        }
    }
}

impl Default for SsoInitiationActionConfig {
    fn default() -> Self {
        Self::mvp_v1()
    }
}
