#![forbid(unsafe_code)]

use idp_contracts::sso_initiation::{
    RequestParseError, SsoInitiationRequest, SsoInitiationResponse,
};
use idp_contracts::stream::{DecodeError, Readable, StreamInput};
use idp_contracts::{ContractViolation, Validate, ValidationErrors};
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::config::SsoInitiationActionConfig;

/// Failure reported by the assertion-building collaborator.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{reason}")]
pub struct BuildFailure {
    pub reason: String,
}

impl BuildFailure {
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}

#[derive(Debug, Error)]
pub enum ActionError {
    #[error("request of {got} bytes exceeds limit of {limit} bytes")]
    PayloadTooLarge { limit: usize, got: usize },
    #[error("unable to decode sso initiation request: {0}")]
    Decode(#[from] DecodeError),
    #[error(transparent)]
    Parse(#[from] RequestParseError),
    #[error("field [{field}] of {got} bytes exceeds limit of {limit} bytes")]
    FieldTooLong {
        field: &'static str,
        limit: usize,
        got: usize,
    },
    #[error("{0}")]
    Validation(ValidationErrors),
    #[error("assertion building failed: {0}")]
    Build(#[from] BuildFailure),
}

impl ActionError {
    /// True when the caller sent something unusable and must correct it.
    pub fn is_client_error(&self) -> bool {
        !matches!(self, Self::Build(_))
    }

    pub fn validation_messages(&self) -> &[String] {
        match self {
            Self::Validation(errors) => errors.messages(),
            _ => &[],
        }
    }
}

/// Downstream logic that turns a validated request into a SAML response.
pub trait AssertionBuilder {
    fn build(&self, req: &SsoInitiationRequest) -> Result<SsoInitiationResponse, BuildFailure>;
}

#[derive(Debug, Clone)]
pub struct SsoInitiationAction<B>
where
    B: AssertionBuilder,
{
    config: SsoInitiationActionConfig,
    builder: B,
}

impl<B> SsoInitiationAction<B>
where
    B: AssertionBuilder,
{
    pub fn new(config: SsoInitiationActionConfig, builder: B) -> Result<Self, ContractViolation> {
        if config.max_request_bytes == 0 {
            return Err(ContractViolation::InvalidValue {
                field: "sso_initiation_action_config.max_request_bytes",
                reason: "must be > 0",
            });
        }
        if config.max_string_len == 0 || config.max_string_len > config.max_request_bytes {
            return Err(ContractViolation::InvalidRange {
                field: "sso_initiation_action_config.max_string_len",
                min: 1,
                max: config.max_request_bytes as u64,
                got: config.max_string_len as u64,
            });
        }
        Ok(Self { config, builder })
    }

    pub fn config(&self) -> &SsoInitiationActionConfig {
        &self.config
    }

    /// Handles a request received on the binary transport.
    pub fn handle_wire(&self, payload: &[u8]) -> Result<SsoInitiationResponse, ActionError> {
        self.check_size(payload)?;
        let mut input = StreamInput::new(payload).with_max_string_len(self.config.max_string_len);
        let request = SsoInitiationRequest::read_from(&mut input)
            .and_then(|request| input.expect_end().map(|()| request))
            .map_err(|err| {
                warn!(error = %err, "rejecting undecodable sso initiation request");
                ActionError::Decode(err)
            })?;
        self.execute(&request)
    }

    /// Handles a request received as a REST JSON body.
    pub fn handle_json(&self, body: &[u8]) -> Result<SsoInitiationResponse, ActionError> {
        self.check_size(body)?;
        let request = SsoInitiationRequest::from_json_slice(body).map_err(|err| {
            warn!(error = %err, "rejecting malformed sso initiation body");
            ActionError::Parse(err)
        })?;
        self.check_field_lengths(&request)?;
        self.execute(&request)
    }

    /// Validates, then hands the request to the assertion builder.
    pub fn execute(
        &self,
        request: &SsoInitiationRequest,
    ) -> Result<SsoInitiationResponse, ActionError> {
        debug!(%request, "sso initiation received");
        if let Err(errors) = request.validate() {
            warn!(
                %request,
                reasons = errors.len(),
                "sso initiation request failed validation"
            );
            return Err(ActionError::Validation(errors));
        }
        let response = self.builder.build(request).map_err(|err| {
            warn!(%request, error = %err, "assertion building failed");
            err
        })?;
        info!(
            sp_entity_id = request.sp_entity_id(),
            post_url = %response.post_url,
            "sso initiation produced saml response"
        );
        Ok(response)
    }

    // The wire decoder enforces the same limit while reading each string.
    fn check_field_lengths(&self, request: &SsoInitiationRequest) -> Result<(), ActionError> {
        let mut fields = vec![
            ("entity_id", request.sp_entity_id()),
            ("acs", request.assertion_consumer_service()),
        ];
        if let Some(state) = request.authentication_state() {
            fields.push(("authn_state.entity_id", state.entity_id()));
            if let Some(format) = state.requested_name_id_format() {
                fields.push(("authn_state.nameid_format", format));
            }
            fields.push(("authn_state.authn_request_id", state.authn_request_id()));
        }
        let limit = self.config.max_string_len;
        match fields.into_iter().find(|(_, value)| value.len() > limit) {
            Some((field, value)) => {
                warn!(
                    field,
                    got = value.len(),
                    limit,
                    "rejecting oversized sso initiation field"
                );
                Err(ActionError::FieldTooLong {
                    field,
                    limit,
                    got: value.len(),
                })
            }
            None => Ok(()),
        }
    }

    fn check_size(&self, payload: &[u8]) -> Result<(), ActionError> {
        if payload.len() > self.config.max_request_bytes {
            warn!(
                got = payload.len(),
                limit = self.config.max_request_bytes,
                "rejecting oversized sso initiation request"
            );
            return Err(ActionError::PayloadTooLarge {
                limit: self.config.max_request_bytes,
                got: payload.len(),
            });
        }
        Ok(())
    }
}
