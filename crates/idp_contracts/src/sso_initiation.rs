#![forbid(unsafe_code)]

use std::fmt;

use serde::Deserialize;
use thiserror::Error;

use crate::action::{ActionEnvelope, ActionRequest};
use crate::saml_authn_state::SamlAuthenticationState;
use crate::stream::{DecodeError, Readable, StreamInput, StreamOutput, Writeable};
use crate::{collect_nested, Validate, ValidationErrors};

pub const ENTITY_ID_MISSING: &str = "entity_id is missing";
pub const ACS_MISSING: &str = "acs is missing";

#[derive(Debug, Error)]
#[error("malformed sso initiation body: {0}")]
pub struct RequestParseError(#[from] serde_json::Error);

/// Parameters needed to start an IdP SSO flow for one service provider.
///
/// Built empty and filled through setters, or decoded from the wire. Nothing is
/// checked until [`Validate::validate`] is called.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct SsoInitiationRequest {
    envelope: ActionEnvelope,
    sp_entity_id: String,
    assertion_consumer_service: String,
    authentication_state: Option<SamlAuthenticationState>,
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct RestBody {
    #[serde(default, deserialize_with = "crate::serde_util::null_as_empty")]
    entity_id: String,
    #[serde(default, deserialize_with = "crate::serde_util::null_as_empty")]
    acs: String,
    #[serde(default)]
    authn_state: Option<SamlAuthenticationState>,
}

impl SsoInitiationRequest {
    pub fn v1(
        sp_entity_id: impl Into<String>,
        assertion_consumer_service: impl Into<String>,
        authentication_state: Option<SamlAuthenticationState>,
    ) -> Self {
        Self {
            envelope: ActionEnvelope::default(),
            sp_entity_id: sp_entity_id.into(),
            assertion_consumer_service: assertion_consumer_service.into(),
            authentication_state,
        }
    }

    /// Parses the REST body form `{"entity_id", "acs", "authn_state"}`.
    pub fn from_json_slice(body: &[u8]) -> Result<Self, RequestParseError> {
        let body: RestBody = serde_json::from_slice(body)?;
        Ok(Self::v1(body.entity_id, body.acs, body.authn_state))
    }

    pub fn sp_entity_id(&self) -> &str {
        &self.sp_entity_id
    }

    pub fn set_sp_entity_id(&mut self, sp_entity_id: impl Into<String>) {
        self.sp_entity_id = sp_entity_id.into();
    }

    pub fn assertion_consumer_service(&self) -> &str {
        &self.assertion_consumer_service
    }

    pub fn set_assertion_consumer_service(&mut self, acs: impl Into<String>) {
        self.assertion_consumer_service = acs.into();
    }

    pub fn authentication_state(&self) -> Option<&SamlAuthenticationState> {
        self.authentication_state.as_ref()
    }

    pub fn set_authentication_state(&mut self, state: Option<SamlAuthenticationState>) {
        self.authentication_state = state;
    }
}

impl Validate for SsoInitiationRequest {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        if self.sp_entity_id.is_empty() {
            errors.add(ENTITY_ID_MISSING);
        }
        if self.assertion_consumer_service.is_empty() {
            errors.add(ACS_MISSING);
        }
        if let Some(state) = &self.authentication_state {
            collect_nested(&mut errors, state);
        }
        errors.into_result()
    }
}

impl Writeable for SsoInitiationRequest {
    fn write_to(&self, out: &mut StreamOutput) {
        self.envelope.write_to(out);
        out.write_string(&self.sp_entity_id);
        out.write_string(&self.assertion_consumer_service);
        out.write_optional_writeable(self.authentication_state.as_ref());
    }
}

impl Readable for SsoInitiationRequest {
    fn read_from(input: &mut StreamInput<'_>) -> Result<Self, DecodeError> {
        let envelope = ActionEnvelope::read_from(input)?;
        let sp_entity_id = input.read_string()?;
        let assertion_consumer_service = input.read_string()?;
        let authentication_state = input.read_optional_readable()?;
        Ok(Self {
            envelope,
            sp_entity_id,
            assertion_consumer_service,
            authentication_state,
        })
    }
}

impl ActionRequest for SsoInitiationRequest {
    fn envelope(&self) -> &ActionEnvelope {
        &self.envelope
    }

    fn envelope_mut(&mut self) -> &mut ActionEnvelope {
        &mut self.envelope
    }
}

// The authentication state carries correlation data and stays out of both forms.
impl fmt::Display for SsoInitiationRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "SsoInitiationRequest{{spEntityId='{}', acs='{}'}}",
            self.sp_entity_id, self.assertion_consumer_service
        )
    }
}

impl fmt::Debug for SsoInitiationRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SsoInitiationRequest")
            .field("sp_entity_id", &self.sp_entity_id)
            .field("assertion_consumer_service", &self.assertion_consumer_service)
            .finish_non_exhaustive()
    }
}

/// What the assertion builder hands back for the client to post to the SP.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SsoInitiationResponse {
    pub entity_id: String,
    pub post_url: String,
    pub saml_response: String,
}

impl SsoInitiationResponse {
    pub fn v1(
        entity_id: impl Into<String>,
        post_url: impl Into<String>,
        saml_response: impl Into<String>,
    ) -> Self {
        Self {
            entity_id: entity_id.into(),
            post_url: post_url.into(),
            saml_response: saml_response.into(),
        }
    }
}

impl Writeable for SsoInitiationResponse {
    fn write_to(&self, out: &mut StreamOutput) {
        out.write_string(&self.entity_id);
        out.write_string(&self.post_url);
        out.write_string(&self.saml_response);
    }
}

impl Readable for SsoInitiationResponse {
    fn read_from(input: &mut StreamInput<'_>) -> Result<Self, DecodeError> {
        Ok(Self {
            entity_id: input.read_string()?,
            post_url: input.read_string()?,
            saml_response: input.read_string()?,
        })
    }
}
