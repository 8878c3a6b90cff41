#![forbid(unsafe_code)]

pub mod action;
pub mod common;
pub mod saml_authn_state;
mod serde_util;
pub mod sso_initiation;
pub mod stream;

pub use common::{collect_nested, ContractViolation, Validate, ValidationErrors};
