#![forbid(unsafe_code)]

use idp_contracts::action::{ActionEnvelope, ActionRequest, TaskId};
use idp_contracts::saml_authn_state::SamlAuthenticationState;
use idp_contracts::sso_initiation::{SsoInitiationRequest, ACS_MISSING, ENTITY_ID_MISSING};
use idp_contracts::stream::{DecodeError, Readable, StreamInput, StreamOutput};
use idp_contracts::Validate;

fn decode_exact(bytes: &[u8]) -> Result<SsoInitiationRequest, DecodeError> {
    let mut input = StreamInput::new(bytes);
    let request = SsoInitiationRequest::read_from(&mut input)?;
    input.expect_end()?;
    Ok(request)
}

fn sp_initiated_request() -> SsoInitiationRequest {
    let mut request = SsoInitiationRequest::default();
    request.set_sp_entity_id("https://sp.example.com");
    request.set_assertion_consumer_service("https://sp.example.com/acs");
    request.set_authentication_state(Some(SamlAuthenticationState::v1(
        "https://sp.example.com",
        None,
        "_a9f1e2",
    )));
    *request.envelope_mut() = ActionEnvelope::with_parent(TaskId::new("idp-node-1", 314).unwrap());
    request
}

#[test]
fn at_sso_wire_01_fields_follow_envelope_in_fixed_order() {
    let request = SsoInitiationRequest::v1("sp", "acs", None);

    let mut expected = StreamOutput::new();
    expected.write_string("");
    expected.write_string("sp");
    expected.write_string("acs");
    expected.write_bool(false);

    assert_eq!(request.encode(), expected.into_bytes());
}

#[test]
fn at_sso_wire_02_decoded_request_equals_original() {
    let request = sp_initiated_request();
    let decoded = decode_exact(&request.encode()).unwrap();
    assert_eq!(decoded, request);
    assert_eq!(decoded.envelope().parent_task.as_ref().unwrap().id(), 314);
    assert_eq!(decoded.validate(), Ok(()));
}

#[test]
fn at_sso_wire_03_decoding_precedes_validation() {
    // A well-formed stream carrying semantically empty fields decodes fine.
    let empty = SsoInitiationRequest::default();
    let decoded = decode_exact(&empty.encode()).unwrap();
    assert_eq!(
        decoded.validate().unwrap_err().messages(),
        [ENTITY_ID_MISSING, ACS_MISSING]
    );
}

#[test]
fn at_sso_wire_04_truncation_never_yields_a_value() {
    let bytes = sp_initiated_request().encode();
    for cut in 0..bytes.len() {
        match decode_exact(&bytes[..cut]) {
            Err(DecodeError::UnexpectedEof { .. }) => {}
            other => panic!("cut at {cut}: expected eof, got {other:?}"),
        }
    }
}

#[test]
fn at_sso_wire_05_trailing_bytes_are_rejected() {
    let mut bytes = sp_initiated_request().encode();
    bytes.push(0);
    assert_eq!(
        decode_exact(&bytes),
        Err(DecodeError::TrailingBytes { remaining: 1 })
    );
}

#[test]
fn at_sso_wire_06_oversized_entity_id_is_rejected_by_limit() {
    let request = SsoInitiationRequest::v1("x".repeat(64), "acs", None);
    let bytes = request.encode();
    let mut input = StreamInput::new(&bytes).with_max_string_len(32);
    assert!(matches!(
        SsoInitiationRequest::read_from(&mut input),
        Err(DecodeError::LengthLimitExceeded {
            declared: 64,
            limit: 32,
            ..
        })
    ));
}

#[test]
fn at_sso_wire_07_invalid_nested_state_survives_transport_and_fails_validation() {
    let request = SsoInitiationRequest::v1(
        "https://sp.example.com",
        "https://sp.example.com/acs",
        Some(SamlAuthenticationState::v1("", None, "")),
    );
    let decoded = decode_exact(&request.encode()).unwrap();
    assert_eq!(
        decoded.validate().unwrap_err().messages(),
        [
            "field [entity_id] is required",
            "field [authn_request_id] is required"
        ]
    );
}

#[test]
fn at_sso_wire_08_length_prefix_overflowing_u32_is_corrupt() {
    // Fifth length byte carries bits that do not fit in 32 bits; read naively it is `1`.
    let bytes = [0, 0x81, 0x80, 0x80, 0x80, 0x70, b'e', 1, b'a', 0];
    assert_eq!(
        decode_exact(&bytes),
        Err(DecodeError::VIntOverflow { offset: 1 })
    );
}
