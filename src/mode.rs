//! Action modes and the values that flow through the core.
//!
//! A firmware build serves exactly one [`Mode`]. The mode decides which
//! [`ActionRequest`]s exist, which protocol bytes mean anything, whether the
//! state can be queried, and what the pin does at boot. Every other
//! component dispatches on it with an exhaustive `match`.
//!
//! # Modes
//!
//! | Mode | Requests | Query | Boot level |
//! |------|----------|-------|------------|
//! | [`OnOff`](Mode::OnOff) | Enable, Disable | yes | configured (On = high) |
//! | [`OnOffInverted`](Mode::OnOffInverted) | Enable, Disable | yes | configured (On = low) |
//! | [`Toggle`](Mode::Toggle) | Toggle | no | configured raw level |
//! | [`PulseLow`](Mode::PulseLow) | Pulse | no | high |
//! | [`PulseHigh`](Mode::PulseHigh) | Pulse | no | low |

use crate::traits::Level;

/// Behavior profile of the action pin.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum Mode {
    /// Pin is switched on (high) or off (low) by two distinct bytes.
    #[default]
    OnOff,
    /// Like [`OnOff`](Self::OnOff) with the electrical levels swapped.
    ///
    /// Typical for active-low relay boards.
    OnOffInverted,
    /// Every request flips the pin.
    Toggle,
    /// Pin rests high and is pulled low for the pulse duration.
    PulseLow,
    /// Pin rests low and is driven high for the pulse duration.
    PulseHigh,
}

impl Mode {
    /// All modes, in declaration order.
    pub const ALL: [Mode; 5] = [
        Mode::OnOff,
        Mode::OnOffInverted,
        Mode::Toggle,
        Mode::PulseLow,
        Mode::PulseHigh,
    ];

    /// Returns the mode as a snake_case string.
    ///
    /// ```
    /// use tcp_action::Mode;
    ///
    /// assert_eq!(Mode::OnOffInverted.as_str(), "on_off_inverted");
    /// ```
    pub const fn as_str(&self) -> &'static str {
        match self {
            Mode::OnOff => "on_off",
            Mode::OnOffInverted => "on_off_inverted",
            Mode::Toggle => "toggle",
            Mode::PulseLow => "pulse_low",
            Mode::PulseHigh => "pulse_high",
        }
    }

    /// Parse a mode from a build-time setting.
    ///
    /// Accepts the snake_case names, the hyphenated form, and the legacy
    /// `MODE_*` spellings. Input is trimmed and case-insensitive.
    ///
    /// ```
    /// use tcp_action::Mode;
    ///
    /// assert_eq!(Mode::from_text("on_off"), Some(Mode::OnOff));
    /// assert_eq!(Mode::from_text("MODE_PULSE_LOW"), Some(Mode::PulseLow));
    /// assert_eq!(Mode::from_text(" toggle "), Some(Mode::Toggle));
    /// assert_eq!(Mode::from_text("pulse-high"), Some(Mode::PulseHigh));
    /// assert_eq!(Mode::from_text("blink"), None);
    /// ```
    pub fn from_text(s: &str) -> Option<Self> {
        let s = s.trim();
        let s = s
            .strip_prefix("MODE_")
            .or_else(|| s.strip_prefix("mode_"))
            .unwrap_or(s);
        Mode::ALL.into_iter().find(|mode| {
            let name = mode.as_str();
            name.len() == s.len()
                && name
                    .bytes()
                    .zip(s.bytes())
                    .all(|(a, b)| a == b.to_ascii_lowercase() || (a == b'_' && b == b'-'))
        })
    }

    /// Whether this is one of the on/off modes.
    #[inline]
    pub const fn is_on_off(&self) -> bool {
        matches!(self, Mode::OnOff | Mode::OnOffInverted)
    }

    /// Whether this is one of the pulse modes.
    #[inline]
    pub const fn is_pulse(&self) -> bool {
        matches!(self, Mode::PulseLow | Mode::PulseHigh)
    }

    /// Whether the protocol has a state-query byte in this mode.
    #[inline]
    pub const fn supports_query(&self) -> bool {
        self.is_on_off()
    }

    /// Electrical level that means "on" in the on/off modes.
    pub const fn on_level(&self) -> Level {
        match self {
            Mode::OnOffInverted => Level::Low,
            _ => Level::High,
        }
    }

    /// Electrical level that means "off" in the on/off modes.
    pub const fn off_level(&self) -> Level {
        match self {
            Mode::OnOffInverted => Level::High,
            _ => Level::Low,
        }
    }

    /// Level the pin is driven to while a pulse is held.
    ///
    /// Only meaningful for pulse modes.
    pub const fn pulse_level(&self) -> Level {
        match self {
            Mode::PulseLow => Level::Low,
            _ => Level::High,
        }
    }

    /// State the pin is put in at boot.
    ///
    /// `boot_on` selects On/Off for the on/off modes and high/low for
    /// toggle mode. Pulse modes always boot at their resting level.
    ///
    /// ```
    /// use tcp_action::{Mode, OutputState};
    /// use tcp_action::traits::Level;
    ///
    /// assert_eq!(Mode::OnOff.boot_state(true), OutputState::On);
    /// assert_eq!(Mode::Toggle.boot_state(false), OutputState::Level(Level::Low));
    /// assert_eq!(Mode::PulseLow.boot_state(false), OutputState::Level(Level::High));
    /// ```
    pub const fn boot_state(&self, boot_on: bool) -> OutputState {
        match self {
            Mode::OnOff | Mode::OnOffInverted => {
                if boot_on {
                    OutputState::On
                } else {
                    OutputState::Off
                }
            }
            Mode::Toggle => OutputState::Level(Level::from_high(boot_on)),
            Mode::PulseLow => OutputState::Level(Level::High),
            Mode::PulseHigh => OutputState::Level(Level::Low),
        }
    }

    /// Electrical level that represents `state` in this mode.
    pub const fn level_of(&self, state: OutputState) -> Level {
        match state {
            OutputState::On => self.on_level(),
            OutputState::Off => self.off_level(),
            OutputState::Level(level) => level,
        }
    }

    /// Whether `request` is one of this mode's action variants.
    pub const fn accepts(&self, request: ActionRequest) -> bool {
        match self {
            Mode::OnOff | Mode::OnOffInverted => {
                matches!(request, ActionRequest::Enable | ActionRequest::Disable)
            }
            Mode::Toggle => matches!(request, ActionRequest::Toggle),
            Mode::PulseLow | Mode::PulseHigh => matches!(request, ActionRequest::Pulse),
        }
    }
}

/// Decoded intent to change or pulse the action pin.
///
/// Produced by the protocol codec or the physical input, consumed by
/// [`ActionController::apply`](crate::ActionController::apply).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum ActionRequest {
    /// Switch on (on/off modes).
    Enable,
    /// Switch off (on/off modes).
    Disable,
    /// Flip the pin (toggle mode).
    Toggle,
    /// Fire one pulse (pulse modes).
    Pulse,
}

/// Current resting state of the action pin.
///
/// On/off modes use [`On`](Self::On)/[`Off`](Self::Off). Toggle mode records
/// the raw level it read back; pulse modes record their resting level, which
/// never changes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum OutputState {
    /// Logically on.
    On,
    /// Logically off.
    Off,
    /// Raw electrical level (toggle and pulse modes).
    Level(Level),
}

impl OutputState {
    /// Returns `true` for [`OutputState::On`].
    #[inline]
    pub const fn is_on(&self) -> bool {
        matches!(self, OutputState::On)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // =========================================================================
    // Polarity Tests
    // =========================================================================

    #[test]
    fn inverted_on_level_is_complement() {
        assert_eq!(Mode::OnOffInverted.on_level(), !Mode::OnOff.on_level());
        assert_eq!(Mode::OnOffInverted.off_level(), !Mode::OnOff.off_level());
    }

    #[test]
    fn on_and_off_levels_differ() {
        for mode in [Mode::OnOff, Mode::OnOffInverted] {
            assert_ne!(mode.on_level(), mode.off_level());
        }
    }

    #[test]
    fn level_of_maps_logical_states() {
        assert_eq!(Mode::OnOff.level_of(OutputState::On), Level::High);
        assert_eq!(Mode::OnOff.level_of(OutputState::Off), Level::Low);
        assert_eq!(Mode::OnOffInverted.level_of(OutputState::On), Level::Low);
        assert_eq!(Mode::OnOffInverted.level_of(OutputState::Off), Level::High);
        assert_eq!(
            Mode::Toggle.level_of(OutputState::Level(Level::High)),
            Level::High
        );
    }

    // =========================================================================
    // Boot State Tests
    // =========================================================================

    #[test]
    fn boot_state_on_off_follows_config() {
        assert_eq!(Mode::OnOff.boot_state(true), OutputState::On);
        assert_eq!(Mode::OnOff.boot_state(false), OutputState::Off);
        assert_eq!(Mode::OnOffInverted.boot_state(true), OutputState::On);
    }

    #[test]
    fn boot_state_pulse_ignores_config() {
        for boot_on in [true, false] {
            assert_eq!(
                Mode::PulseLow.boot_state(boot_on),
                OutputState::Level(Level::High)
            );
            assert_eq!(
                Mode::PulseHigh.boot_state(boot_on),
                OutputState::Level(Level::Low)
            );
        }
    }

    #[test]
    fn pulse_level_is_opposite_of_resting() {
        for mode in [Mode::PulseLow, Mode::PulseHigh] {
            assert_eq!(mode.level_of(mode.boot_state(false)), !mode.pulse_level());
        }
    }

    // =========================================================================
    // Request Acceptance Tests
    // =========================================================================

    #[test]
    fn each_mode_accepts_only_its_requests() {
        use ActionRequest::*;

        assert!(Mode::OnOff.accepts(Enable));
        assert!(Mode::OnOff.accepts(Disable));
        assert!(!Mode::OnOff.accepts(Toggle));
        assert!(!Mode::OnOff.accepts(Pulse));

        assert!(Mode::Toggle.accepts(Toggle));
        assert!(!Mode::Toggle.accepts(Enable));

        assert!(Mode::PulseHigh.accepts(Pulse));
        assert!(!Mode::PulseLow.accepts(Toggle));
    }

    #[test]
    fn only_on_off_modes_support_query() {
        for mode in Mode::ALL {
            assert_eq!(mode.supports_query(), mode.is_on_off());
        }
    }

    // =========================================================================
    // Text Parsing Tests
    // =========================================================================

    #[test]
    fn from_text_round_trips_names() {
        for mode in Mode::ALL {
            assert_eq!(Mode::from_text(mode.as_str()), Some(mode));
        }
    }

    #[test]
    fn from_text_legacy_and_case() {
        assert_eq!(Mode::from_text("MODE_ON_OFF_INVERTED"), Some(Mode::OnOffInverted));
        assert_eq!(Mode::from_text("On_Off"), Some(Mode::OnOff));
        assert_eq!(Mode::from_text("PULSE-LOW"), Some(Mode::PulseLow));
    }

    #[test]
    fn from_text_invalid() {
        assert_eq!(Mode::from_text(""), None);
        assert_eq!(Mode::from_text("on"), None);
        assert_eq!(Mode::from_text("toggles"), None);
        assert_eq!(Mode::from_text("MODE_"), None);
    }
}
