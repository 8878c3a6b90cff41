#![forbid(unsafe_code)]

use serde::{Deserialize, Serialize};

use crate::stream::{DecodeError, Readable, StreamInput, StreamOutput, Writeable};
use crate::{Validate, ValidationErrors};

/// Correlation data for an in-flight SP-initiated authentication.
///
/// Carried alongside an SSO initiation so the resulting assertion can answer the
/// original `AuthnRequest`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SamlAuthenticationState {
    #[serde(default, deserialize_with = "crate::serde_util::null_as_empty")]
    entity_id: String,
    #[serde(
        default,
        rename = "nameid_format",
        skip_serializing_if = "Option::is_none"
    )]
    requested_name_id_format: Option<String>,
    #[serde(default, deserialize_with = "crate::serde_util::null_as_empty")]
    authn_request_id: String,
}

impl SamlAuthenticationState {
    pub fn v1(
        entity_id: impl Into<String>,
        requested_name_id_format: Option<String>,
        authn_request_id: impl Into<String>,
    ) -> Self {
        Self {
            entity_id: entity_id.into(),
            requested_name_id_format,
            authn_request_id: authn_request_id.into(),
        }
    }

    pub fn entity_id(&self) -> &str {
        &self.entity_id
    }

    pub fn set_entity_id(&mut self, entity_id: impl Into<String>) {
        self.entity_id = entity_id.into();
    }

    pub fn requested_name_id_format(&self) -> Option<&str> {
        self.requested_name_id_format.as_deref()
    }

    pub fn set_requested_name_id_format(&mut self, format: Option<String>) {
        self.requested_name_id_format = format;
    }

    pub fn authn_request_id(&self) -> &str {
        &self.authn_request_id
    }

    pub fn set_authn_request_id(&mut self, authn_request_id: impl Into<String>) {
        self.authn_request_id = authn_request_id.into();
    }
}

impl Validate for SamlAuthenticationState {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        if self.entity_id.is_empty() {
            errors.add("field [entity_id] is required");
        }
        if self.authn_request_id.is_empty() {
            errors.add("field [authn_request_id] is required");
        }
        errors.into_result()
    }
}

impl Writeable for SamlAuthenticationState {
    fn write_to(&self, out: &mut StreamOutput) {
        out.write_string(&self.entity_id);
        out.write_optional_string(self.requested_name_id_format.as_deref());
        out.write_string(&self.authn_request_id);
    }
}

impl Readable for SamlAuthenticationState {
    fn read_from(input: &mut StreamInput<'_>) -> Result<Self, DecodeError> {
        let entity_id = input.read_string()?;
        let requested_name_id_format = input.read_optional_string()?;
        let authn_request_id = input.read_string()?;
        Ok(Self {
            entity_id,
            requested_name_id_format,
            authn_request_id,
        })
    }
}
