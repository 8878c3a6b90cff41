#![forbid(unsafe_code)]

pub mod config;
pub mod sso_initiation;

pub use config::SsoInitiationActionConfig;
pub use sso_initiation::{ActionError, AssertionBuilder, BuildFailure, SsoInitiationAction};
