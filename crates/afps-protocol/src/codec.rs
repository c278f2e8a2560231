use crate::{ClientMessage, ProtocolError, ServerMessage, MAX_CLIENT_MESSAGE_BYTES};

/// Decodes a client-to-server message from `bytes`, enforcing the
/// `kMaxClientMessageBytes` size ceiling before attempting to parse JSON.
/// Per-field range validation (see [`crate::validate_input_cmd`]) is a
/// separate step the caller applies once it knows which variant it got.
pub fn decode_client_message(bytes: &[u8]) -> Result<ClientMessage, ProtocolError> {
    if bytes.len() > MAX_CLIENT_MESSAGE_BYTES {
        return Err(ProtocolError::PayloadTooLarge {
            size: bytes.len(),
            limit: MAX_CLIENT_MESSAGE_BYTES,
        });
    }
    Ok(serde_json::from_slice(bytes)?)
}

/// Decodes a server-to-client message. Used by tests and by any tooling
/// that needs to parse what the server sends (the production client is
/// out of scope).
pub fn decode_server_message(bytes: &[u8]) -> Result<ServerMessage, ProtocolError> {
    Ok(serde_json::from_slice(bytes)?)
}

/// Encodes any `Serialize` wire message (a [`ClientMessage`] or
/// [`ServerMessage`]) to its JSON representation. Any stable encoding
/// that round-trips would do; this codec uses `serde_json` since the
/// whole external surface (HTTP bodies included) is JSON-shaped.
pub fn encode_message<T: serde::Serialize>(message: &T) -> Result<Vec<u8>, ProtocolError> {
    Ok(serde_json::to_vec(message)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{ClientHello, InputCmd};

    #[test]
    fn round_trips_client_hello() {
        let hello = ClientMessage::ClientHello(ClientHello {
            protocol_version: 3,
            session_token: "tok".to_owned(),
            connection_id: "conn".to_owned(),
            build: None,
            nickname: Some("Nick".to_owned()),
            character_id: None,
        });
        let bytes = encode_message(&hello).unwrap();
        let decoded = decode_client_message(&bytes).unwrap();
        assert_eq!(decoded, hello);
    }

    #[test]
    fn oversized_payload_is_rejected_before_parsing() {
        let big = vec![b' '; MAX_CLIENT_MESSAGE_BYTES + 1];
        let err = decode_client_message(&big).unwrap_err();
        assert!(matches!(err, ProtocolError::PayloadTooLarge { .. }));
    }

    #[test]
    fn malformed_json_is_rejected() {
        let err = decode_client_message(b"{not json").unwrap_err();
        assert!(matches!(err, ProtocolError::MalformedJson(_)));
    }

    #[test]
    fn input_cmd_preserves_wire_field_names() {
        let cmd = ClientMessage::InputCmd(InputCmd {
            input_seq: 7,
            move_x: 0.5,
            move_y: -0.25,
            look_delta_x: 0.1,
            look_delta_y: 0.2,
            view_yaw: Some(0.0),
            view_pitch: None,
            weapon_slot: Some(1),
            jump: true,
            fire: false,
            sprint: false,
            dash: None,
            grapple: None,
            shield: None,
            shockwave: None,
        });
        let bytes = encode_message(&cmd).unwrap();
        let text = String::from_utf8(bytes).unwrap();
        assert!(text.contains("\"inputSeq\":7"));
        assert!(text.contains("\"moveX\":0.5"));
        assert!(text.contains("\"type\":\"InputCmd\""));
    }
}
