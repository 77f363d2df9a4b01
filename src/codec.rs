//! One-byte request/response protocol.
//!
//! Each byte a client sends is decoded on its own. There is no framing,
//! no length prefix and no acknowledgement; the only reply the server ever
//! sends is the one-byte answer to a state query in the on/off modes.
//!
//! | Mode | Byte | Meaning | Reply |
//! |------|------|---------|-------|
//! | on/off | `off` (0x00) | Disable | none |
//! | on/off | `on` (0x01) | Enable | none |
//! | on/off | `query` (0x03) | State query | `on` or `off` byte |
//! | toggle | `toggle` (0x01) | Toggle | none |
//! | pulse | `pulse` (0x01) | Pulse | none |

use crate::mode::{ActionRequest, Mode, OutputState};

/// Byte values assigned to each protocol role.
///
/// In the on/off modes `off`, `on` and `query` must be pairwise distinct;
/// [`Config::validate`](crate::Config::validate) rejects anything else.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct ProtocolBytes {
    /// Disable request, also the "off" query reply.
    pub off: u8,
    /// Enable request, also the "on" query reply.
    pub on: u8,
    /// State query.
    pub query: u8,
    /// Toggle request.
    pub toggle: u8,
    /// Pulse request.
    pub pulse: u8,
}

impl Default for ProtocolBytes {
    fn default() -> Self {
        Self {
            off: 0x00,
            on: 0x01,
            query: 0x03,
            toggle: 0x01,
            pulse: 0x01,
        }
    }
}

/// What an inbound byte means in the active mode.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Decoded {
    /// Apply an action.
    Action(ActionRequest),
    /// Answer with the current state.
    Query,
    /// Not part of this mode's protocol. Ignored, but still refreshes the
    /// session deadline.
    Unrecognized,
}

/// Mode-specific byte decoder and state encoder.
///
/// # Example
///
/// ```rust
/// use tcp_action::{ActionRequest, Decoded, Mode, OutputState, ProtocolCodec};
/// use tcp_action::codec::ProtocolBytes;
///
/// let codec = ProtocolCodec::new(Mode::OnOff, ProtocolBytes::default());
/// assert_eq!(codec.decode(0x01), Decoded::Action(ActionRequest::Enable));
/// assert_eq!(codec.decode(0x03), Decoded::Query);
/// assert_eq!(codec.decode(0x7f), Decoded::Unrecognized);
/// assert_eq!(codec.encode_state(OutputState::On), Some(0x01));
///
/// let pulse = ProtocolCodec::new(Mode::PulseHigh, ProtocolBytes::default());
/// assert_eq!(pulse.decode(0x03), Decoded::Unrecognized);
/// assert_eq!(pulse.encode_state(OutputState::On), None);
/// ```
#[derive(Clone, Copy, Debug)]
pub struct ProtocolCodec {
    mode: Mode,
    bytes: ProtocolBytes,
}

impl ProtocolCodec {
    /// Create a codec for `mode` using the given byte table.
    pub const fn new(mode: Mode, bytes: ProtocolBytes) -> Self {
        Self { mode, bytes }
    }

    /// The mode this codec decodes for.
    pub const fn mode(&self) -> Mode {
        self.mode
    }

    /// The byte table in use.
    pub const fn bytes(&self) -> &ProtocolBytes {
        &self.bytes
    }

    /// Decode one inbound byte.
    pub fn decode(&self, byte: u8) -> Decoded {
        let b = &self.bytes;
        match self.mode {
            Mode::OnOff | Mode::OnOffInverted => {
                if byte == b.query {
                    Decoded::Query
                } else if byte == b.on {
                    Decoded::Action(ActionRequest::Enable)
                } else if byte == b.off {
                    Decoded::Action(ActionRequest::Disable)
                } else {
                    Decoded::Unrecognized
                }
            }
            Mode::Toggle if byte == b.toggle => Decoded::Action(ActionRequest::Toggle),
            Mode::PulseLow | Mode::PulseHigh if byte == b.pulse => {
                Decoded::Action(ActionRequest::Pulse)
            }
            _ => Decoded::Unrecognized,
        }
    }

    /// Encode `state` as a query reply.
    ///
    /// Returns `None` in modes without a query byte, and for raw-level
    /// states that the on/off modes never hold.
    pub fn encode_state(&self, state: OutputState) -> Option<u8> {
        if !self.mode.supports_query() {
            return None;
        }
        match state {
            OutputState::On => Some(self.bytes.on),
            OutputState::Off => Some(self.bytes.off),
            OutputState::Level(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::traits::Level;

    fn codec(mode: Mode) -> ProtocolCodec {
        ProtocolCodec::new(mode, ProtocolBytes::default())
    }

    // =========================================================================
    // Decode Tests
    // =========================================================================

    #[test]
    fn on_off_table() {
        for mode in [Mode::OnOff, Mode::OnOffInverted] {
            let c = codec(mode);
            assert_eq!(c.decode(0x00), Decoded::Action(ActionRequest::Disable));
            assert_eq!(c.decode(0x01), Decoded::Action(ActionRequest::Enable));
            assert_eq!(c.decode(0x03), Decoded::Query);
            assert_eq!(c.decode(0x02), Decoded::Unrecognized);
            assert_eq!(c.decode(0xff), Decoded::Unrecognized);
        }
    }

    #[test]
    fn toggle_table() {
        let c = codec(Mode::Toggle);
        assert_eq!(c.decode(0x01), Decoded::Action(ActionRequest::Toggle));
        assert_eq!(c.decode(0x00), Decoded::Unrecognized);
        assert_eq!(c.decode(0x03), Decoded::Unrecognized);
    }

    #[test]
    fn pulse_table() {
        for mode in [Mode::PulseLow, Mode::PulseHigh] {
            let c = codec(mode);
            assert_eq!(c.decode(0x01), Decoded::Action(ActionRequest::Pulse));
            assert_eq!(c.decode(0x00), Decoded::Unrecognized);
            assert_eq!(c.decode(0x03), Decoded::Unrecognized);
        }
    }

    #[test]
    fn query_never_decodes_without_query_support() {
        for mode in Mode::ALL.into_iter().filter(|m| !m.supports_query()) {
            let c = codec(mode);
            for byte in 0..=u8::MAX {
                assert_ne!(c.decode(byte), Decoded::Query, "{:?} byte {}", mode, byte);
            }
        }
    }

    #[test]
    fn decoded_actions_belong_to_mode() {
        for mode in Mode::ALL {
            let c = codec(mode);
            for byte in 0..=u8::MAX {
                if let Decoded::Action(req) = c.decode(byte) {
                    assert!(mode.accepts(req), "{:?} decoded {:?}", mode, req);
                }
            }
        }
    }

    #[test]
    fn custom_bytes() {
        let bytes = ProtocolBytes {
            off: b'0',
            on: b'1',
            query: b'?',
            ..ProtocolBytes::default()
        };
        let c = ProtocolCodec::new(Mode::OnOff, bytes);
        assert_eq!(c.decode(b'1'), Decoded::Action(ActionRequest::Enable));
        assert_eq!(c.decode(b'?'), Decoded::Query);
        assert_eq!(c.decode(0x01), Decoded::Unrecognized);
        assert_eq!(c.encode_state(OutputState::Off), Some(b'0'));
    }

    // =========================================================================
    // Encode Tests
    // =========================================================================

    #[test]
    fn encode_state_on_off() {
        let c = codec(Mode::OnOff);
        assert_eq!(c.encode_state(OutputState::On), Some(0x01));
        assert_eq!(c.encode_state(OutputState::Off), Some(0x00));
        assert_ne!(c.encode_state(OutputState::On), Some(c.bytes().query));
    }

    #[test]
    fn encode_state_inverted_matches_logical_state() {
        let c = codec(Mode::OnOffInverted);
        assert_eq!(c.encode_state(OutputState::On), Some(0x01));
        assert_eq!(c.encode_state(OutputState::Off), Some(0x00));
    }

    #[test]
    fn encode_state_absent_without_query() {
        for mode in [Mode::Toggle, Mode::PulseLow, Mode::PulseHigh] {
            assert_eq!(codec(mode).encode_state(OutputState::Level(Level::High)), None);
        }
    }
}
