use crate::{ClientHello, InputCmd, ProtocolError};

fn require_finite(field: &'static str, value: f64) -> Result<(), ProtocolError> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(ProtocolError::InvalidField {
            field,
            reason: "must be finite",
        })
    }
}

fn require_range(field: &'static str, value: f64, lo: f64, hi: f64) -> Result<(), ProtocolError> {
    if (lo..=hi).contains(&value) {
        Ok(())
    } else {
        Err(ProtocolError::InvalidField {
            field,
            reason: "out of range",
        })
    }
}

/// Enforces the `InputCmd` invariants from the testable-properties list:
/// `moveX`/`moveY` within `[-1, 1]` and every numeric field finite.
/// `inputSeq`/`weaponSlot` are unsigned integers on the wire so their
/// `>= 0` invariants hold by construction.
pub fn validate_input_cmd(cmd: &InputCmd) -> Result<(), ProtocolError> {
    require_finite("moveX", cmd.move_x)?;
    require_finite("moveY", cmd.move_y)?;
    require_range("moveX", cmd.move_x, -1.0, 1.0)?;
    require_range("moveY", cmd.move_y, -1.0, 1.0)?;
    require_finite("lookDeltaX", cmd.look_delta_x)?;
    require_finite("lookDeltaY", cmd.look_delta_y)?;
    if let Some(yaw) = cmd.view_yaw {
        require_finite("viewYaw", yaw)?;
    }
    if let Some(pitch) = cmd.view_pitch {
        require_finite("viewPitch", pitch)?;
    }
    Ok(())
}

/// Shape validation for a `ClientHello` ahead of session/connection
/// lookup: non-empty identifiers and the exact protocol version. Nickname
/// and character-id normalization (trimming, character allowlists,
/// generating a fallback) is the signaling layer's job since it needs the
/// connection id to derive a deterministic fallback nickname.
pub fn validate_client_hello(hello: &ClientHello) -> Result<(), ProtocolError> {
    if hello.protocol_version != crate::PROTOCOL_VERSION {
        return Err(ProtocolError::InvalidField {
            field: "protocolVersion",
            reason: "does not match server protocol version",
        });
    }
    if hello.session_token.is_empty() {
        return Err(ProtocolError::InvalidField {
            field: "sessionToken",
            reason: "must not be empty",
        });
    }
    if hello.connection_id.is_empty() {
        return Err(ProtocolError::InvalidField {
            field: "connectionId",
            reason: "must not be empty",
        });
    }
    Ok(())
}
